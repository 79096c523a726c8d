//! Presence bucketing of raw timestamp samples.
//!
//! Capture runs record one raw timestamp (TSC ticks) per detected keystroke.
//! For visualization those are normalized against an origin and discretized
//! into fixed-width buckets. Each bucket records only whether at least one
//! sample landed in it, never how many.

use thiserror::Error;

/// Errors raised for invalid bucketing parameters.
#[derive(Debug, Error, PartialEq)]
pub enum PresenceError {
    /// The tick-to-bucket scale factor must be strictly positive.
    #[error("scale must be strictly positive, got {0}")]
    NonPositiveScale(f64),
    /// At least one bucket is required.
    #[error("bucket count must be positive")]
    ZeroBucketCount,
}

/// A fixed-length presence indicator built in a single pass.
///
/// The slot array is sized at construction and never resized. Out-of-range
/// samples are not written anywhere; they are only counted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Presence {
    slots: Vec<u8>,
    dropped: usize,
}

impl Presence {
    /// The indicator slots, each 0 or 1.
    pub fn slots(&self) -> &[u8] {
        &self.slots
    }

    /// Number of buckets.
    pub fn len(&self) -> usize {
        self.slots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }

    /// Number of buckets that received at least one sample.
    pub fn occupied(&self) -> usize {
        self.slots.iter().filter(|&&s| s == 1).count()
    }

    /// Number of samples that fell outside the observation window.
    pub fn dropped(&self) -> usize {
        self.dropped
    }
}

/// Build a presence array from raw timestamps.
///
/// Each timestamp is shifted by `origin` and mapped to bucket
/// `floor((t - origin) / scale)`. A bucket covers the half-open interval
/// `[index * scale, (index + 1) * scale)` relative to the origin; the floor
/// rule is what makes those intervals half-open.
///
/// Timestamps mapping outside `[0, bucket_count)` (including timestamps
/// before the origin) lie outside the observation window. They are dropped
/// and surfaced through [`Presence::dropped`] so callers can report them.
///
/// The result does not depend on the order of `timestamps`, and repeated
/// samples in the same bucket collapse to a single 1.
pub fn build_presence(
    timestamps: &[u64],
    origin: u64,
    scale: f64,
    bucket_count: usize,
) -> Result<Presence, PresenceError> {
    if !(scale > 0.0) {
        return Err(PresenceError::NonPositiveScale(scale));
    }
    if bucket_count == 0 {
        return Err(PresenceError::ZeroBucketCount);
    }

    let mut slots = vec![0u8; bucket_count];
    let mut dropped = 0usize;

    for &t in timestamps {
        let shifted = match t.checked_sub(origin) {
            Some(s) => s,
            None => {
                dropped += 1;
                continue;
            }
        };
        // shifted is non-negative, so truncation and floor agree. The
        // float-to-int cast saturates, so absurdly large inputs land in the
        // dropped count instead of wrapping.
        let index = (shifted as f64 / scale).floor() as u64;
        if index < bucket_count as u64 {
            slots[index as usize] = 1;
        } else {
            dropped += 1;
        }
    }

    Ok(Presence { slots, dropped })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_input_yields_all_zeros() {
        let presence = build_presence(&[], 0, 1.0, 8).unwrap();
        assert_eq!(presence.slots(), &[0; 8]);
        assert_eq!(presence.occupied(), 0);
        assert_eq!(presence.dropped(), 0);
    }

    #[test]
    fn test_in_range_timestamp_sets_its_bucket() {
        let presence = build_presence(&[1022], 1000, 10.0, 5).unwrap();
        assert_eq!(presence.slots()[2], 1);
        assert_eq!(presence.occupied(), 1);
    }

    #[test]
    fn test_order_independence() {
        let a = build_presence(&[1005, 1022, 1049], 1000, 10.0, 5).unwrap();
        let b = build_presence(&[1049, 1005, 1022], 1000, 10.0, 5).unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn test_idempotence() {
        let ts = [17, 42, 99, 3];
        let a = build_presence(&ts, 0, 7.0, 20).unwrap();
        let b = build_presence(&ts, 0, 7.0, 20).unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn test_duplicates_collapse_to_single_presence() {
        let presence = build_presence(&[1000, 1000], 1000, 1.0, 5).unwrap();
        assert_eq!(presence.slots(), &[1, 0, 0, 0, 0]);
    }

    #[test]
    fn test_index_at_bucket_count_is_dropped() {
        // origin + scale * 2 maps to index 2, one past the last bucket
        let presence = build_presence(&[1020], 1000, 10.0, 2).unwrap();
        assert_eq!(presence.slots(), &[0, 0]);
        assert_eq!(presence.dropped(), 1);
    }

    #[test]
    fn test_timestamp_before_origin_is_dropped() {
        let presence = build_presence(&[999], 1000, 10.0, 5).unwrap();
        assert_eq!(presence.occupied(), 0);
        assert_eq!(presence.dropped(), 1);
    }

    #[test]
    fn test_concrete_capture_scenario() {
        let presence = build_presence(&[1005, 1022, 1049, 1200], 1000, 10.0, 5).unwrap();
        assert_eq!(presence.slots(), &[1, 0, 1, 0, 1]);
        assert_eq!(presence.dropped(), 1);
    }

    #[test]
    fn test_bucket_boundaries_are_half_open() {
        // exactly scale * k lands in bucket k, one tick less in bucket k - 1
        let presence = build_presence(&[1010, 1009], 1000, 10.0, 5).unwrap();
        assert_eq!(presence.slots(), &[1, 1, 0, 0, 0]);
    }

    #[test]
    fn test_zero_scale_is_rejected() {
        let err = build_presence(&[1], 0, 0.0, 5).unwrap_err();
        assert_eq!(err, PresenceError::NonPositiveScale(0.0));
    }

    #[test]
    fn test_negative_scale_is_rejected() {
        assert!(build_presence(&[1], 0, -3.5, 5).is_err());
    }

    #[test]
    fn test_zero_bucket_count_is_rejected() {
        let err = build_presence(&[1], 0, 1.0, 0).unwrap_err();
        assert_eq!(err, PresenceError::ZeroBucketCount);
    }

    #[test]
    fn test_fractional_scale() {
        let presence = build_presence(&[5], 0, 2.5, 4).unwrap();
        assert_eq!(presence.slots(), &[0, 0, 1, 0]);
    }
}
