//! Greenwald-Khanna approximate quantile summary.

use std::mem;

use serde::{Deserialize, Serialize};

use crate::skiplist::Skiplist;

/// Precision of the rank returned by quantile queries, as a fraction of the observation count.
///
/// A query for quantile `q` over `N` observations returns a value whose rank is within
/// `EPSILON * N` of `floor(q * N + 0.5)`.
pub const EPSILON: f64 = 0.01;

/// A tuple of the summary: a compressed representative of a rank-contiguous band of observations.
#[derive(Clone, Debug, Default, PartialEq, Deserialize, Serialize)]
pub struct Entry {
    /// Observed value.
    pub v: i64,

    /// Number of observations absorbed by this tuple whose rank lies strictly between the
    /// previous tuple's rank and this one's.
    pub g: u32,

    /// Maximum possible error in the rank of `v` within the stream.
    pub delta: u32,

    /// Span IDs witnessing values that collapsed into this tuple.
    pub samples: Vec<u64>,
}

/// An approximation of the distribution of a stream of tagged 64-bit observations.
///
/// Observations are folded into a bounded set of [`Entry`] tuples held in a skiplist, following
/// Greenwald and Khanna, ["Space-Efficient Online Computation of Quantile Summaries"][gk01]. Each
/// observation carries the ID of the span it was reported from, and quantile queries return the
/// witnessing span IDs alongside the estimated value.
///
/// A `Summary` is not internally synchronized; callers serialize access to each instance.
/// Distinct instances share no state and may be updated in parallel.
///
/// [gk01]: http://infolab.stanford.edu/~datar/courses/cs361a/papers/quantiles.pdf
#[derive(Debug)]
pub struct Summary {
    pub(crate) data: Skiplist,
    pub(crate) n: u64,
}

impl Summary {
    /// Creates a new, empty `Summary` with accuracy [`EPSILON`].
    pub fn new() -> Self {
        Self {
            data: Skiplist::new(),
            n: 0,
        }
    }

    /// Number of observations that have been inserted into this summary.
    ///
    /// Compression reduces the tuple count but never this value.
    pub fn n(&self) -> u64 {
        self.n
    }

    /// Whether or not this summary has received any observations.
    pub fn is_empty(&self) -> bool {
        self.n == 0
    }

    /// Inserts the observation `v`, paired with the ID of the span it was reported from.
    pub fn insert(&mut self, v: i64, span_id: u64) {
        let node = self.data.insert(Entry {
            v,
            g: 1,
            delta: 0,
            samples: vec![span_id],
        });

        self.n += 1;

        // Head and tail tuples keep delta = 0 so their rank bounds stay exact; interior tuples
        // receive the full band error at insertion time.
        if !self.data.is_first(node) && !self.data.is_last(node) {
            self.data.entry_mut(node).delta = (2.0 * EPSILON * self.n as f64) as u32;
        }

        if self.n % ((1.0 / (2.0 * EPSILON)) as u64) == 0 {
            self.compress();
        }
    }

    /// Merges adjacent tuples whose combined band stays within the error bound.
    ///
    /// `missing` carries the weight of merged predecessors that still needs accounting on a
    /// later tuple.
    pub(crate) fn compress(&mut self) {
        let mut missing: u32 = 0;

        let eps_n = (2.0 * EPSILON * self.n as f64) as u32;

        let mut elt = self.data.first();
        while let Some(t) = elt {
            let Some(next) = self.data.next(t) else { break };

            let (t_v, t_g) = {
                let e = self.data.entry(t);
                (e.v, e.g)
            };
            let (nt_v, nt_g, nt_delta) = {
                let e = self.data.entry(next);
                (e.v, e.g, e.delta)
            };

            if t_v == nt_v {
                let t_samples = mem::take(&mut self.data.entry_mut(t).samples);
                missing += nt_g;
                let nt = self.data.entry_mut(next);
                nt.delta += missing;
                nt.g = t_g;
                nt.samples.extend(t_samples);
                self.data.remove(t);
            } else if t_g + nt_g + missing + nt_delta < eps_n {
                let t_samples = mem::take(&mut self.data.entry_mut(t).samples);
                let nt = self.data.entry_mut(next);
                nt.g += t_g + missing;
                nt.samples.extend(t_samples);
                missing = 0;
                self.data.remove(t);
            } else {
                self.data.entry_mut(next).g += missing;
                missing = 0;
            }

            elt = Some(next);
        }
    }

    /// Returns an [`EPSILON`]-approximate estimate of the value at quantile `q`, along with the
    /// span IDs witnessing it.
    ///
    /// `q` is clamped into `[0, 1]` before being converted to a rank.
    ///
    /// # Panics
    ///
    /// Panics if the summary holds no observations: with nothing inserted there is no tuple to
    /// answer from, and on a populated summary running past the last tuple would mean the
    /// summary is corrupt.
    pub fn quantile(&self, q: f64) -> (i64, &[u64]) {
        let q = q.clamp(0.0, 1.0);

        // Convert the quantile to a rank.
        let r = (q * self.n as f64 + 0.5) as u64;

        let mut rmin: u64 = 0;
        let eps_n = (EPSILON * self.n as f64) as u64;

        let mut elt = self.data.first();
        while let Some(t) = elt {
            let te = self.data.entry(t);
            rmin += u64::from(te.g);

            let Some(next) = self.data.next(t) else {
                return (te.v, &te.samples);
            };

            let ne = self.data.entry(next);
            if r + eps_n < rmin + u64::from(ne.g) + u64::from(ne.delta) {
                if r + eps_n < rmin + u64::from(ne.g) {
                    return (te.v, &te.samples);
                }
                return (ne.v, &ne.samples);
            }

            elt = Some(next);
        }

        panic!("quantile on a summary with no observations");
    }

    /// Returns the weighted value ranges covered by this summary, in ascending value order.
    ///
    /// The number of slices tracks the tuple count kept for `EPSILON * N` rank precision, so it
    /// is bounded. Weights are upper bounds, not exact counts.
    pub fn by_slices(&self) -> Vec<SummarySlice> {
        let mut slices = Vec::new();

        let mut last = self.data.head();
        let mut cur = self.data.next(last);

        while let Some(c) = cur {
            let last_entry = self.data.entry(last);
            let cur_entry = self.data.entry(c);

            slices.push(SummarySlice {
                start: last_entry.v,
                end: cur_entry.v,
                weight: i64::from(cur_entry.g) + i64::from(cur_entry.delta) - 1,
                samples: cur_entry.samples.clone(),
            });

            last = c;
            cur = self.data.next(c);
        }

        slices
    }

    /// Merges the observations of `other` into this summary.
    ///
    /// The other summary's tuples are inserted as-is, preserving their weights, error terms and
    /// samples, and a compression pass runs afterwards to restore the band bound.
    pub fn merge(&mut self, other: &Summary) {
        if other.n == 0 {
            return;
        }

        self.n += other.n;
        for entry in other.entries() {
            self.data.insert(entry.clone());
        }
        self.compress();
    }

    /// Iterates the summary's tuples in ascending value order.
    pub(crate) fn entries(&self) -> Entries<'_> {
        Entries {
            summary: self,
            cur: self.data.first(),
        }
    }
}

impl Default for Summary {
    fn default() -> Self {
        Self::new()
    }
}

pub(crate) struct Entries<'a> {
    summary: &'a Summary,
    cur: Option<crate::skiplist::NodeRef>,
}

impl<'a> Iterator for Entries<'a> {
    type Item = &'a Entry;

    fn next(&mut self) -> Option<Self::Item> {
        let node = self.cur?;
        self.cur = self.summary.data.next(node);
        Some(self.summary.data.entry(node))
    }
}

/// How many values fall in a `[start, end]` range, and which spans witnessed them.
#[derive(Clone, Debug, PartialEq)]
pub struct SummarySlice {
    /// Lower bound of the range (the preceding tuple's value; zero for the first slice).
    pub start: i64,

    /// Upper bound of the range.
    pub end: i64,

    /// Upper bound on the number of observations in the range.
    pub weight: i64,

    /// Span IDs witnessing values in the range.
    pub samples: Vec<u64>,
}
