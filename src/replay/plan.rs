//! Replay plan construction.
//!
//! A plan walks the ordered press records and pairs consecutive presses: the
//! delay before step `i` is the tick distance from the previous press,
//! converted to wall time through the capture machine's TSC frequency and
//! divided by the speed factor. Release events are not scheduled; the
//! emitter taps (press + release) each key.

use crate::replay::keymap::{KeyCode, KeyMap};
use crate::replay::log::{KeystrokeRecord, RecordKind};
use std::time::Duration;
use thiserror::Error;

/// Errors raised for invalid replay parameters.
#[derive(Debug, Error, PartialEq)]
pub enum PlanError {
    #[error("cpu frequency must be strictly positive, got {0}")]
    NonPositiveFrequency(f64),
    #[error("speed factor must be strictly positive, got {0}")]
    NonPositiveSpeed(f64),
}

/// One keystroke to emit, after waiting `delay`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReplayStep {
    pub key: String,
    pub code: KeyCode,
    pub delay: Duration,
}

/// An ordered replay schedule plus diagnostics about what was left out.
#[derive(Debug, Clone, Default)]
pub struct ReplayPlan {
    pub steps: Vec<ReplayStep>,
    /// Press records whose key symbol is not in the key map.
    pub unmapped: usize,
    /// Consecutive presses with non-monotonic timestamps; their delay is
    /// clamped to zero.
    pub clamped: usize,
}

impl ReplayPlan {
    /// Total scheduled wait time across all steps, saturating at
    /// [`Duration::MAX`].
    pub fn total_delay(&self) -> Duration {
        self.steps.iter().fold(Duration::ZERO, |total, step| {
            total.checked_add(step.delay).unwrap_or(Duration::MAX)
        })
    }
}

/// Build a replay plan from parsed capture records.
///
/// Only press records are replayed. Presses with unmapped key symbols are
/// skipped but still anchor the timeline, so the wall-clock spacing of the
/// surviving keystrokes is preserved. `cpu_freq_ghz` is the TSC rate of the
/// capturing machine; `speed` above 1.0 replays faster than recorded.
pub fn build_plan(
    records: &[KeystrokeRecord],
    keymap: &KeyMap,
    cpu_freq_ghz: f64,
    speed: f64,
) -> Result<ReplayPlan, PlanError> {
    if !(cpu_freq_ghz > 0.0) {
        return Err(PlanError::NonPositiveFrequency(cpu_freq_ghz));
    }
    if !(speed > 0.0) {
        return Err(PlanError::NonPositiveSpeed(speed));
    }

    let ticks_per_sec = cpu_freq_ghz * 1e9;
    let mut plan = ReplayPlan::default();
    let mut last_ticks: Option<u64> = None;

    for record in records.iter().filter(|r| r.kind == RecordKind::Press) {
        let delay = match last_ticks {
            None => Duration::ZERO,
            Some(prev) => match record.time_ticks.checked_sub(prev) {
                Some(ticks) => {
                    // a tiny speed factor can blow the quotient past what
                    // Duration can represent; saturate instead of panicking
                    let secs = ticks as f64 / ticks_per_sec / speed;
                    if secs < Duration::MAX.as_secs_f64() {
                        Duration::from_secs_f64(secs)
                    } else {
                        Duration::MAX
                    }
                }
                None => {
                    plan.clamped += 1;
                    Duration::ZERO
                }
            },
        };
        last_ticks = Some(record.time_ticks);

        let code = match keymap.resolve(&record.key) {
            Some(code) => code,
            None => {
                plan.unmapped += 1;
                continue;
            }
        };

        plan.steps.push(ReplayStep {
            key: record.key.clone(),
            code,
            delay,
        });
    }

    Ok(plan)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn press(key: &str, time_ticks: u64) -> KeystrokeRecord {
        KeystrokeRecord {
            kind: RecordKind::Press,
            key: key.to_string(),
            time_ticks,
            hold_ticks: None,
        }
    }

    fn release(key: &str, time_ticks: u64) -> KeystrokeRecord {
        KeystrokeRecord {
            kind: RecordKind::Release,
            key: key.to_string(),
            time_ticks,
            hold_ticks: Some(1),
        }
    }

    #[test]
    fn test_consecutive_presses_become_timed_steps() {
        // 1 GHz for round numbers: 1e9 ticks = 1 s
        let records = [press("h", 0), press("i", 500_000_000), press("x", 2_500_000_000)];
        let plan = build_plan(&records, &KeyMap::qwerty(), 1.0, 1.0).unwrap();

        assert_eq!(plan.steps.len(), 3);
        assert_eq!(plan.steps[0].delay, Duration::ZERO);
        assert_eq!(plan.steps[1].delay, Duration::from_millis(500));
        assert_eq!(plan.steps[2].delay, Duration::from_secs(2));
    }

    #[test]
    fn test_releases_are_not_scheduled() {
        let records = [press("a", 0), release("a", 100), press("b", 1_000_000_000)];
        let plan = build_plan(&records, &KeyMap::qwerty(), 1.0, 1.0).unwrap();

        assert_eq!(plan.steps.len(), 2);
        // interval measured press-to-press, not press-to-release
        assert_eq!(plan.steps[1].delay, Duration::from_secs(1));
    }

    #[test]
    fn test_speed_factor_scales_delays() {
        let records = [press("a", 0), press("b", 1_000_000_000)];
        let plan = build_plan(&records, &KeyMap::qwerty(), 1.0, 2.0).unwrap();
        assert_eq!(plan.steps[1].delay, Duration::from_millis(500));
    }

    #[test]
    fn test_unmapped_press_keeps_spacing() {
        let records = [
            press("a", 0),
            press("Hyper", 1_000_000_000),
            press("b", 3_000_000_000),
        ];
        let plan = build_plan(&records, &KeyMap::qwerty(), 1.0, 1.0).unwrap();

        assert_eq!(plan.steps.len(), 2);
        assert_eq!(plan.unmapped, 1);
        // b is delayed from the skipped press, not from a
        assert_eq!(plan.steps[1].delay, Duration::from_secs(2));
    }

    #[test]
    fn test_non_monotonic_timestamps_clamp_to_zero() {
        let records = [press("a", 1_000_000_000), press("b", 500_000_000)];
        let plan = build_plan(&records, &KeyMap::qwerty(), 1.0, 1.0).unwrap();

        assert_eq!(plan.clamped, 1);
        assert_eq!(plan.steps[1].delay, Duration::ZERO);
    }

    #[test]
    fn test_invalid_parameters_are_rejected() {
        let records = [press("a", 0)];
        assert_eq!(
            build_plan(&records, &KeyMap::qwerty(), 0.0, 1.0).unwrap_err(),
            PlanError::NonPositiveFrequency(0.0)
        );
        assert_eq!(
            build_plan(&records, &KeyMap::qwerty(), 3.4, -1.0).unwrap_err(),
            PlanError::NonPositiveSpeed(-1.0)
        );
    }

    #[test]
    fn test_extreme_speed_saturates_instead_of_panicking() {
        let records = [
            press("a", 0),
            press("b", 9_000_000_000_000_000_000),
            press("c", 18_000_000_000_000_000_000),
        ];
        let plan = build_plan(&records, &KeyMap::qwerty(), 1.0, 1e-15).unwrap();

        assert_eq!(plan.steps[1].delay, Duration::MAX);
        assert_eq!(plan.steps[2].delay, Duration::MAX);
        // the sum saturates as well
        assert_eq!(plan.total_delay(), Duration::MAX);
    }

    #[test]
    fn test_total_delay_sums_steps() {
        let records = [press("a", 0), press("b", 1_000_000_000), press("c", 1_500_000_000)];
        let plan = build_plan(&records, &KeyMap::qwerty(), 1.0, 1.0).unwrap();
        assert_eq!(plan.total_delay(), Duration::from_millis(1500));
    }
}
