//! Minimal trace data model.
//!
//! This crate carries only the parts of the trace model that the sampling and
//! quantile cores read: identity and hierarchy fields, the structural fields
//! used for fingerprinting, and the span duration fed into per-bucket
//! summaries. Everything else about a span (meta, metrics, origin, and so on)
//! lives with the ingestion pipeline that owns it.
#![deny(warnings)]
#![deny(missing_docs)]

/// A span.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Span {
    service: String,
    name: String,
    resource: String,
    trace_id: u64,
    span_id: u64,
    parent_id: u64,
    start: i64,
    duration: i64,
    error: i32,
}

impl Span {
    /// Creates a new `Span`.
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        service: impl Into<String>, name: impl Into<String>, resource: impl Into<String>, trace_id: u64, span_id: u64,
        parent_id: u64, start: i64, duration: i64, error: i32,
    ) -> Self {
        Self {
            service: service.into(),
            name: name.into(),
            resource: resource.into(),
            trace_id,
            span_id,
            parent_id,
            start,
            duration,
            error,
        }
    }

    /// Name of the service with which this span is associated.
    pub fn service(&self) -> &str {
        &self.service
    }

    /// Operation name of this span.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Resource name of this span, also sometimes called the endpoint (for web spans).
    pub fn resource(&self) -> &str {
        &self.resource
    }

    /// ID of the trace to which this span belongs.
    pub fn trace_id(&self) -> u64 {
        self.trace_id
    }

    /// ID of this span.
    pub fn span_id(&self) -> u64 {
        self.span_id
    }

    /// ID of this span's parent, or zero if this span has no parent.
    pub fn parent_id(&self) -> u64 {
        self.parent_id
    }

    /// Number of nanoseconds between the Unix epoch and the beginning of this span.
    pub fn start(&self) -> i64 {
        self.start
    }

    /// Time length of this span, in nanoseconds.
    pub fn duration(&self) -> i64 {
        self.duration
    }

    /// 1 if there is an error associated with this span, 0 if there is not.
    pub fn error(&self) -> i32 {
        self.error
    }
}

/// A trace: an ordered collection of spans sharing a trace ID.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Trace {
    spans: Vec<Span>,
}

impl Trace {
    /// Creates a new `Trace` from the given spans.
    pub fn new(spans: Vec<Span>) -> Self {
        Self { spans }
    }

    /// The spans of this trace, in the order they were received.
    pub fn spans(&self) -> &[Span] {
        &self.spans
    }

    /// Whether or not this trace has any spans.
    pub fn is_empty(&self) -> bool {
        self.spans.is_empty()
    }

    /// Consumes this trace, returning its spans.
    pub fn into_spans(self) -> Vec<Span> {
        self.spans
    }
}
