//! Wire representations of a summary.
//!
//! Live state and wire state are kept apart: the skiplist never appears on the wire, and the
//! flattened form never backs queries. Both formats carry the same logical payload, an ordered
//! array of tuples plus the observation count.
//!
//! The text format is JSON: `{"data": [{"v": ..., "g": ..., "delta": ..., "samples": [...]},
//! ...], "n": ...}` with the array ascending by value. The binary format frames the same payload
//! with bincode using varint length prefixes and little-endian integers; both ends of a transport
//! must agree on these options for round-trips to hold.

use bincode::Options as _;
use serde::{Deserialize, Serialize};
use snafu::{ResultExt as _, Snafu};

use crate::summary::{Entry, Summary};

/// An error encountered while encoding a summary for the wire.
#[derive(Debug, Snafu)]
#[snafu(context(suffix(false)))]
pub enum EncodeError {
    /// The JSON payload could not be produced.
    #[snafu(display("Failed to encode summary as JSON."))]
    JsonEncode {
        /// Error source.
        source: serde_json::Error,
    },

    /// The binary payload could not be produced.
    #[snafu(display("Failed to encode summary as binary."))]
    BinaryEncode {
        /// Error source.
        source: bincode::Error,
    },
}

/// An error encountered while decoding a summary from the wire.
///
/// Decoding builds a fresh summary, so a failure leaves no partially-mutated state behind.
#[derive(Debug, Snafu)]
#[snafu(context(suffix(false)))]
pub enum DecodeError {
    /// The JSON payload was malformed.
    #[snafu(display("Failed to decode JSON summary payload."))]
    JsonDecode {
        /// Error source.
        source: serde_json::Error,
    },

    /// The binary payload was malformed.
    #[snafu(display("Failed to decode binary summary payload."))]
    BinaryDecode {
        /// Error source.
        source: bincode::Error,
    },
}

#[derive(Deserialize, Serialize)]
struct WireSummary {
    data: Vec<Entry>,
    n: u64,
}

impl WireSummary {
    fn from_summary(summary: &Summary) -> Self {
        Self {
            data: summary.entries().cloned().collect(),
            n: summary.n,
        }
    }

    fn into_summary(self) -> Summary {
        // Tuples are re-inserted exactly as stored: weights and error terms are wire state, not
        // something to recompute on this side.
        let mut summary = Summary::new();
        for entry in self.data {
            summary.data.insert(entry);
        }
        summary.n = self.n;
        summary
    }
}

fn bincode_options() -> impl bincode::Options {
    bincode::DefaultOptions::new().with_varint_encoding().with_little_endian()
}

impl Summary {
    /// Encodes this summary in the text format.
    pub fn to_json(&self) -> Result<Vec<u8>, EncodeError> {
        serde_json::to_vec(&WireSummary::from_summary(self)).context(JsonEncode)
    }

    /// Decodes a summary from the text format.
    ///
    /// # Errors
    ///
    /// If the payload is not valid JSON, or does not carry the expected fields, an error is
    /// returned.
    pub fn from_json(payload: &[u8]) -> Result<Summary, DecodeError> {
        let wire: WireSummary = serde_json::from_slice(payload).context(JsonDecode)?;
        Ok(wire.into_summary())
    }

    /// Encodes this summary in the binary format.
    pub fn to_bytes(&self) -> Result<Vec<u8>, EncodeError> {
        bincode_options()
            .serialize(&WireSummary::from_summary(self))
            .context(BinaryEncode)
    }

    /// Decodes a summary from the binary format.
    ///
    /// # Errors
    ///
    /// If the payload does not frame a summary with the expected options, an error is returned.
    pub fn from_bytes(payload: &[u8]) -> Result<Summary, DecodeError> {
        let wire: WireSummary = bincode_options().deserialize(payload).context(BinaryDecode)?;
        Ok(wire.into_summary())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn json_shape_matches_the_documented_format() {
        let mut summary = Summary::new();
        summary.insert(7, 101);
        summary.insert(3, 102);

        let payload = summary.to_json().expect("encoding should succeed");
        let value: serde_json::Value = serde_json::from_slice(&payload).expect("payload should be valid JSON");

        assert_eq!(value["n"], 2);
        assert_eq!(value["data"][0]["v"], 3);
        assert_eq!(value["data"][0]["g"], 1);
        assert_eq!(value["data"][0]["delta"], 0);
        assert_eq!(value["data"][0]["samples"][0], 102);
        assert_eq!(value["data"][1]["v"], 7);
    }

    #[test]
    fn json_round_trip_preserves_observables() {
        let mut summary = Summary::new();
        for v in 1..=500 {
            summary.insert(v, v as u64);
        }

        let payload = summary.to_json().expect("encoding should succeed");
        let decoded = Summary::from_json(&payload).expect("decoding should succeed");

        assert_eq!(decoded.n(), summary.n());
        for q in [0.0, 0.25, 0.5, 0.75, 1.0] {
            assert_eq!(decoded.quantile(q), summary.quantile(q));
        }
        assert_eq!(decoded.by_slices(), summary.by_slices());
    }

    #[test]
    fn binary_round_trip_preserves_observables() {
        let mut summary = Summary::new();
        for v in 1..=500 {
            summary.insert(1000 - v, v as u64);
        }

        let payload = summary.to_bytes().expect("encoding should succeed");
        let decoded = Summary::from_bytes(&payload).expect("decoding should succeed");

        assert_eq!(decoded.n(), summary.n());
        for q in [0.0, 0.25, 0.5, 0.75, 1.0] {
            assert_eq!(decoded.quantile(q), summary.quantile(q));
        }
        assert_eq!(decoded.by_slices(), summary.by_slices());
    }

    #[test]
    fn malformed_payloads_are_rejected() {
        assert!(matches!(
            Summary::from_json(b"{\"data\": 42}"),
            Err(DecodeError::JsonDecode { .. })
        ));
        assert!(matches!(
            Summary::from_bytes(&[0xFF, 0xFF, 0xFF]),
            Err(DecodeError::BinaryDecode { .. })
        ));
    }
}
