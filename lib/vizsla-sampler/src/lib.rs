//! Signature-based trace sampling.
//!
//! The sampler fingerprints every incoming trace with a structural [`Signature`], scores the
//! trace by how recently that signature was last kept, and buffers the traces whose score clears
//! the configured threshold. A rarely-seen shape scores high and gets through; a shape kept
//! moments ago scores near zero. A small multiplicative jitter keeps repeated shapes from
//! locking onto the threshold boundary.
//!
//! Scores range from 0 to 5, with 5 reserved for signatures that have never been seen.
//!
//! The sampler is internally synchronized: a single mutex guards the recency map and the keep
//! buffer, and all operations complete synchronously without blocking on anything but that
//! mutex. [`SignatureSampler::flush`] hands the buffered traces to the caller and starts a fresh
//! buffer; the recency map survives flushes and is pruned separately with
//! [`SignatureSampler::evict_older_than`].
#![deny(warnings)]
#![deny(missing_docs)]

mod signature;

use std::sync::Mutex;
use std::time::Duration;

use metrics::counter;
use rand::{thread_rng, Rng as _};
use tracing::debug;
use vizsla_common::collections::FastHashMap;
use vizsla_common::time::get_unix_timestamp_fractional;
use vizsla_config::{ConfigurationError, GenericConfiguration};
use vizsla_trace::Trace;

pub use self::signature::{compute_signature, Signature};

const DEFAULT_S_MIN: f64 = 1.0;
const DEFAULT_THETA: f64 = 60.0;
const DEFAULT_JITTER: f64 = 0.2;

// Scores are bounded so they can be combined with other score sources later.
const MAX_TIME_SCORE: f64 = 5.0;

/// Configuration for the signature sampler.
#[derive(Clone, Debug)]
pub struct SignatureSamplerConfiguration {
    s_min: f64,
    theta: f64,
    jitter: f64,
}

impl SignatureSamplerConfiguration {
    /// Creates a new `SignatureSamplerConfiguration` from the given configuration.
    ///
    /// The following keys are read, with defaults applied for any that are unset:
    ///
    /// - `sampler.s_min`: score required for a trace to be kept (default: 1.0)
    /// - `sampler.theta`: typical last-seen age, in seconds, after which a signature should be
    ///   sampled again (default: 60.0)
    /// - `sampler.jitter`: multiplicative random coefficient, 0 to 1 (default: 0.2)
    pub fn from_configuration(config: &GenericConfiguration) -> Result<Self, ConfigurationError> {
        Ok(Self {
            s_min: config.try_get_typed("sampler.s_min")?.unwrap_or(DEFAULT_S_MIN),
            theta: config.try_get_typed("sampler.theta")?.unwrap_or(DEFAULT_THETA),
            jitter: config.try_get_typed("sampler.jitter")?.unwrap_or(DEFAULT_JITTER),
        })
    }

    /// Builds a [`SignatureSampler`] from this configuration.
    pub fn build(&self) -> SignatureSampler {
        SignatureSampler::new(self.s_min, self.theta, self.jitter)
    }
}

impl Default for SignatureSamplerConfiguration {
    fn default() -> Self {
        Self {
            s_min: DEFAULT_S_MIN,
            theta: DEFAULT_THETA,
            jitter: DEFAULT_JITTER,
        }
    }
}

#[derive(Default)]
struct State {
    /// Last time a given signature was sampled, as a Unix timestamp in fractional seconds.
    last_seen: FastHashMap<Signature, f64>,

    /// Traces kept until the next flush.
    sampled_traces: Vec<Trace>,
}

/// Samples traces by fingerprinting them and scoring the fingerprint's recency.
pub struct SignatureSampler {
    state: Mutex<State>,

    /// Score required to be sampled: a trace is kept when its score is over `s_min`.
    s_min: f64,

    /// Typical last-seen duration (in seconds) after which a trace should be sampled.
    theta: f64,

    /// Multiplicative random coefficient (0 to 1).
    jitter: f64,
}

impl SignatureSampler {
    /// Creates a new `SignatureSampler`, ready to ingest traces.
    pub fn new(s_min: f64, theta: f64, jitter: f64) -> Self {
        Self {
            state: Mutex::new(State::default()),
            s_min,
            theta,
            jitter,
        }
    }

    /// Samples a trace, keeping it until the next flush when its score clears the threshold.
    pub fn add_trace(&self, trace: Trace) {
        // The signature depends only on the trace, so it is computed outside the lock.
        let signature = compute_signature(&trace);
        let trace_id = trace.spans().first().map(|span| span.trace_id()).unwrap_or(0);

        let (score, sampled) = {
            let mut state = self.state.lock().unwrap();
            let now = get_unix_timestamp_fractional();
            let score = self.score_at(&state, signature, now);
            let sampled = score > self.s_min;
            if sampled {
                state.sampled_traces.push(trace);
                state.last_seen.insert(signature, now);
            }
            (score, sampled)
        };

        if sampled {
            counter!("signature_sampler_traces_kept_total").increment(1);
        } else {
            counter!("signature_sampler_traces_dropped_total").increment(1);
        }
        debug!(
            "trace_id:{} signature:{} score:{} sampled:{}",
            trace_id, signature, score, sampled
        );
    }

    /// Scores a signature, reflecting how strongly it should be sampled right now.
    ///
    /// The time score is spread by the configured jitter: with jitter `j`, the result lands
    /// uniformly within `[1 - j, 1 + j)` times the time score.
    pub fn score(&self, signature: Signature) -> f64 {
        let state = self.state.lock().unwrap();
        self.score_at(&state, signature, get_unix_timestamp_fractional())
    }

    /// Scores a signature based on how long ago it was last sampled.
    ///
    /// Never-seen signatures score the maximum (5). Otherwise the score grows with the square
    /// root of the age relative to `theta`, capped at the maximum.
    pub fn time_score(&self, signature: Signature) -> f64 {
        let state = self.state.lock().unwrap();
        self.time_score_at(&state, signature, get_unix_timestamp_fractional())
    }

    fn score_at(&self, state: &State, signature: Signature, now: f64) -> f64 {
        let time_score = self.time_score_at(state, signature, now);
        time_score * (1.0 + self.jitter * (1.0 - 2.0 * thread_rng().gen::<f64>()))
    }

    fn time_score_at(&self, state: &State, signature: Signature, now: f64) -> f64 {
        let Some(last_seen) = state.last_seen.get(&signature) else {
            return MAX_TIME_SCORE;
        };

        let delta = now - last_seen;
        if delta <= 0.0 {
            return 0.0;
        }

        (delta / self.theta).sqrt().min(MAX_TIME_SCORE)
    }

    /// Returns the traces kept since the last flush, and resets the buffer.
    ///
    /// The recency map is untouched: shapes kept before the flush still score low afterwards.
    pub fn flush(&self) -> Vec<Trace> {
        let mut state = self.state.lock().unwrap();
        std::mem::take(&mut state.sampled_traces)
    }

    /// Drops recency entries for signatures last sampled more than `max_age` ago.
    ///
    /// The map otherwise grows with the number of distinct signatures seen; the embedding agent
    /// is expected to call this periodically, typically from its flush timer.
    pub fn evict_older_than(&self, max_age: Duration) {
        let cutoff = get_unix_timestamp_fractional() - max_age.as_secs_f64();

        let mut state = self.state.lock().unwrap();
        let before = state.last_seen.len();
        state.last_seen.retain(|_, last_seen| *last_seen >= cutoff);

        let evicted = before - state.last_seen.len();
        if evicted > 0 {
            debug!("evicted {} stale signatures", evicted);
        }
    }
}
