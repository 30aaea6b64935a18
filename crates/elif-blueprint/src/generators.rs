//! Value generators for blueprint defaults
//!
//! These pair with [`DefaultField::generated`](crate::field::DefaultField::generated)
//! and [`DefaultField::deferred`](crate::field::DefaultField::deferred) so that
//! each created model gets its own value.

use std::cell::RefCell;
use std::sync::atomic::{AtomicUsize, Ordering};

use chrono::{DateTime, Duration, Utc};
use rand::distributions::Alphanumeric;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use crate::model::Model;

thread_local! {
    static RNG: RefCell<StdRng> = RefCell::new(StdRng::from_entropy());
}

/// Reseed this thread's generator for reproducible output
pub fn seed_generators(seed: u64) {
    RNG.with(|rng| {
        *rng.borrow_mut() = StdRng::seed_from_u64(seed);
    });
}

/// Monotonic counter for unique values
#[derive(Debug)]
pub struct Sequence {
    current: AtomicUsize,
}

impl Sequence {
    pub fn new() -> Self {
        Self::starting_at(0)
    }

    pub fn starting_at(start: usize) -> Self {
        Self {
            current: AtomicUsize::new(start),
        }
    }

    pub fn next(&self) -> usize {
        self.current.fetch_add(1, Ordering::SeqCst)
    }

    pub fn next_string(&self, prefix: &str) -> String {
        format!("{}{}", prefix, self.next())
    }
}

impl Default for Sequence {
    fn default() -> Self {
        Self::new()
    }
}

/// Deferred default yielding `prefix0`, `prefix1`, ...
pub fn sequence(prefix: impl Into<String>) -> impl Fn(&Model) -> String + Send + Sync + 'static {
    let prefix = prefix.into();
    let sequence = Sequence::new();
    move |_| sequence.next_string(&prefix)
}

/// Random alphanumeric string, optionally prefixed as `prefix_xxxxxxxx`
pub fn random_string(prefix: Option<&str>) -> String {
    let suffix: String = RNG.with(|rng| {
        let mut rng = rng.borrow_mut();
        (0..8)
            .map(|_| char::from(rng.sample(Alphanumeric)))
            .collect()
    });

    match prefix {
        Some(p) => format!("{}_{}", p, suffix),
        None => suffix,
    }
}

pub fn random_email() -> String {
    format!("test_{}@example.com", random_string(None).to_lowercase())
}

/// Furthest `past_timestamp` reaches back, in days
pub const MAX_PAST_DAYS: i64 = 100 * 365;

/// Random number between `min` and `max`, both inclusive and in either order
pub fn random_range(min: i64, max: i64) -> i64 {
    let (low, high) = if min <= max { (min, max) } else { (max, min) };
    RNG.with(|rng| rng.borrow_mut().gen_range(low..=high))
}

pub fn random_bool(probability: f64) -> bool {
    RNG.with(|rng| rng.borrow_mut().gen_bool(probability.clamp(0.0, 1.0)))
}

/// Random v4 UUID string (not affected by `seed_generators`)
pub fn random_uuid() -> String {
    uuid::Uuid::new_v4().to_string()
}

/// Current time as RFC 3339
pub fn timestamp() -> String {
    Utc::now().to_rfc3339()
}

/// Random time within the past `days`, capped at [`MAX_PAST_DAYS`]
pub fn past_timestamp(days: i64) -> DateTime<Utc> {
    let days = days.clamp(0, MAX_PAST_DAYS);
    let seconds = random_range(0, days.saturating_mul(24 * 60 * 60));
    Utc::now() - Duration::seconds(seconds)
}
