//! Human-readable ticket numbers
//!
//! Primary form is `PREFIX-YYMM-NNNN`, where `NNNN` is the count of tickets
//! opened on the same UTC day plus one. The sequence restarts daily while the
//! stem only carries year and month, so later days can collide with earlier
//! ones; collisions fall back to `PREFIX-YYMM-XXXXXX` with a random suffix.

use chrono::{DateTime, Duration, NaiveTime, Utc};

const SUFFIX_ALPHABET: [char; 36] = [
    'A', 'B', 'C', 'D', 'E', 'F', 'G', 'H', 'I', 'J', 'K', 'L', 'M', 'N', 'O', 'P', 'Q', 'R',
    'S', 'T', 'U', 'V', 'W', 'X', 'Y', 'Z', '0', '1', '2', '3', '4', '5', '6', '7', '8', '9',
];

const SUFFIX_LEN: usize = 6;

/// Start (inclusive) and end (exclusive) of the UTC day containing `now`
pub fn day_bounds(now: DateTime<Utc>) -> (DateTime<Utc>, DateTime<Utc>) {
    let start = now.date_naive().and_time(NaiveTime::MIN).and_utc();
    (start, start + Duration::days(1))
}

fn stem(prefix: &str, now: DateTime<Utc>) -> String {
    format!("{}-{}", prefix, now.format("%y%m"))
}

/// Sequence-based number for the `created_today + 1`-th ticket of the day
pub fn sequence_number(prefix: &str, now: DateTime<Utc>, created_today: u64) -> String {
    format!("{}-{:04}", stem(prefix, now), created_today + 1)
}

/// Collision fallback with a random suffix
pub fn fallback_number(prefix: &str, now: DateTime<Utc>) -> String {
    format!(
        "{}-{}",
        stem(prefix, now),
        nanoid::nanoid!(SUFFIX_LEN, &SUFFIX_ALPHABET)
    )
}
