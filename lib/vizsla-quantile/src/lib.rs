//! Approximate quantile summaries over streams of tagged 64-bit observations.
//!
//! This crate implements the Greenwald-Khanna epsilon-approximate quantile algorithm over a
//! skiplist-backed tuple store. Each observation carries the ID of the span that reported it, and
//! queries return the witnessing span IDs alongside the estimated value, so a caller can walk
//! back from "the p99 latency is X" to concrete traces exhibiting it.
//!
//! # Quick start
//!
//! ```
//! use vizsla_quantile::Summary;
//!
//! let mut summary = Summary::new();
//! for v in 1..=1000 {
//!     summary.insert(v, v as u64);
//! }
//!
//! let (median, samples) = summary.quantile(0.5);
//! assert!((400..=600).contains(&median));
//! assert!(!samples.is_empty());
//! ```
//!
//! Summaries can be merged, sliced into weighted value ranges, and shipped in either of two wire
//! formats (JSON and a framed binary encoding); see [`Summary`] for the full surface.

#![deny(warnings)]
#![deny(missing_docs)]

mod skiplist;
mod summary;
mod wire;

pub use self::summary::{Entry, Summary, SummarySlice, EPSILON};
pub use self::wire::{DecodeError, EncodeError};
