//! Trace signature computation.
//!
//! A signature fingerprints the structural shape of a trace: the root's
//! (service, name, resource, error) plus the set of (service, name, error) of
//! every span. Two traces that differ only in span counts, span ordering, or
//! non-root resources fingerprint identically.

use std::fmt;

use vizsla_trace::{Span, Trace};

// FNV-1a, 32-bit. Cheap, and there is no cryptographic need here.
const OFFSET_32: u32 = 2166136261;
const PRIME_32: u32 = 16777619;

fn write_hash(mut hash: u32, bytes: &[u8]) -> u32 {
    for &b in bytes {
        hash ^= u32::from(b);
        hash = hash.wrapping_mul(PRIME_32);
    }
    hash
}

/// A 64-bit fingerprint of a trace's structural shape.
#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash)]
pub struct Signature(u64);

impl fmt::Display for Signature {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Computes the signature of a trace.
///
/// An empty trace has no root to anchor the fingerprint and maps to the zero signature.
pub fn compute_signature(trace: &Trace) -> Signature {
    let spans = trace.spans();
    let Some(root) = get_root(spans) else {
        return Signature(0);
    };

    let mut trace_hash = compute_root_hash(root);

    // The hash buffer is pre-sized and then appended to, leaving one zero slot per span ahead of
    // the real hashes; the zeros collapse to a single entry in the dedup below and drop out of
    // the XOR.
    let mut span_hashes: Vec<u32> = vec![0; spans.len()];
    for span in spans {
        span_hashes.push(compute_span_hash(span));
    }

    // Sort, dedupe, then merge all the hashes to build the signature. A XOR of the set is crude
    // but order-independent and cheap.
    span_hashes.sort_unstable();
    span_hashes.dedup();

    for h in span_hashes {
        trace_hash ^= h;
    }

    Signature(u64::from(trace_hash))
}

fn compute_span_hash(span: &Span) -> u32 {
    let mut h = OFFSET_32;
    h = write_hash(h, span.service().as_bytes());
    h = write_hash(h, span.name().as_bytes());
    h = write_hash(h, &[span.error() as u8]);
    h
}

fn compute_root_hash(span: &Span) -> u32 {
    let mut h = OFFSET_32;
    h = write_hash(h, span.service().as_bytes());
    h = write_hash(h, span.name().as_bytes());
    h = write_hash(h, span.resource().as_bytes());
    h = write_hash(h, &[span.error() as u8]);
    h
}

/// Extracts the root span from a trace: the last span with no parent, falling back to the last
/// span outright.
///
/// This is not 100% reliable and picks the wrong root for a sub-trace whose local root is not
/// reported at the end.
fn get_root(spans: &[Span]) -> Option<&Span> {
    for span in spans.iter().rev() {
        if span.parent_id() == 0 {
            return Some(span);
        }
    }
    spans.last()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn span(service: &str, name: &str, resource: &str, span_id: u64, parent_id: u64, error: i32) -> Span {
        Span::new(service, name, resource, 1, span_id, parent_id, 0, 1_000, error)
    }

    #[test]
    fn empty_trace_has_zero_signature() {
        assert_eq!(compute_signature(&Trace::default()), Signature(0));
    }

    #[test]
    fn single_span_trace() {
        let trace = Trace::new(vec![span("web", "http.request", "GET /", 1, 0, 0)]);
        let signature = compute_signature(&trace);
        assert_ne!(signature, Signature(0));

        // Stable across calls.
        assert_eq!(compute_signature(&trace), signature);
    }

    #[test]
    fn signature_ignores_span_order_and_repetition() {
        let root = span("web", "http.request", "GET /users", 1, 0, 0);
        let db = span("db", "query", "SELECT ...", 2, 1, 0);
        let cache = span("cache", "get", "users:*", 3, 1, 0);

        let a = Trace::new(vec![db.clone(), cache.clone(), root.clone()]);
        let b = Trace::new(vec![cache.clone(), db.clone(), db.clone(), db.clone(), root.clone()]);

        assert_eq!(compute_signature(&a), compute_signature(&b));
    }

    #[test]
    fn signature_distinguishes_root_resource() {
        let a = Trace::new(vec![span("web", "http.request", "GET /users", 1, 0, 0)]);
        let b = Trace::new(vec![span("web", "http.request", "GET /orders", 1, 0, 0)]);

        assert_ne!(compute_signature(&a), compute_signature(&b));
    }

    #[test]
    fn non_root_resource_does_not_matter() {
        let root = span("web", "http.request", "GET /users", 1, 0, 0);
        let a = Trace::new(vec![span("db", "query", "SELECT a", 2, 1, 0), root.clone()]);
        let b = Trace::new(vec![span("db", "query", "SELECT b", 2, 1, 0), root.clone()]);

        assert_eq!(compute_signature(&a), compute_signature(&b));
    }

    #[test]
    fn error_flag_changes_the_signature() {
        let a = Trace::new(vec![span("web", "http.request", "GET /", 1, 0, 0)]);
        let b = Trace::new(vec![span("web", "http.request", "GET /", 1, 0, 1)]);

        assert_ne!(compute_signature(&a), compute_signature(&b));
    }

    #[test]
    fn root_is_the_last_parentless_span() {
        // Both spans are parentless and share a span hash (resource is ignored off-root), so the
        // signatures can only differ through which span anchors the root hash.
        let root_a = span("web", "http.request", "GET /a", 1, 0, 0);
        let root_b = span("web", "http.request", "GET /b", 2, 0, 0);

        let a_last = Trace::new(vec![root_b.clone(), root_a.clone()]);
        let b_last = Trace::new(vec![root_a, root_b]);

        assert_ne!(compute_signature(&a_last), compute_signature(&b_last));
    }

    #[test]
    fn orphan_trace_falls_back_to_last_span() {
        // No span has parent_id == 0, so the last span anchors the root hash; the two orderings
        // share a span-hash set but end on different resources.
        let a = span("web", "op", "RES-A", 1, 99, 0);
        let b = span("web", "op", "RES-B", 2, 98, 0);

        let a_last = Trace::new(vec![b.clone(), a.clone()]);
        let b_last = Trace::new(vec![a, b]);

        assert_ne!(compute_signature(&a_last), compute_signature(&b_last));
    }
}
