//! End-to-end test of the capture log -> replay plan -> emitter pipeline.

use keytrace::replay::{build_plan, parse_log, KeyEmitter, KeyMap, NullEmitter};
use std::time::Duration;

const SAMPLE_LOG: &str = "\
[    0.000000] keylogging module loaded
[    1.000000] {'type': 'press', 'key-char': 'h', 'keystroke-time': 0}
[    1.000100] {'type': 'release', 'key-char': 'h', 'keystroke-time': 170000000, 'keyhold': 170000000}
[    1.200000] {'type': 'press', 'key-char': 'i', 'keystroke-time': 680000000}
[    1.200100] {'type': 'release', 'key-char': 'i', 'keystroke-time': 850000000, 'keyhold': 170000000}
";

#[test]
fn capture_log_replays_through_null_emitter() {
    let parsed = parse_log(SAMPLE_LOG);
    assert_eq!(parsed.records.len(), 4);
    assert_eq!(parsed.press_count(), 2);
    assert_eq!(parsed.skipped, 1); // the module-loaded banner

    let keymap = KeyMap::qwerty();
    let plan = build_plan(&parsed.records, &keymap, 3.4, 1.0).unwrap();

    assert_eq!(plan.steps.len(), 2);
    assert_eq!(plan.steps[0].key, "h");
    assert_eq!(plan.steps[0].delay, Duration::ZERO);
    assert_eq!(plan.steps[1].key, "i");
    // 680e6 ticks at 3.4 GHz = 200 ms
    assert_eq!(plan.steps[1].delay, Duration::from_millis(200));

    let mut emitter = NullEmitter::new();
    for step in &plan.steps {
        emitter.tap(step.code).unwrap();
    }
    assert_eq!(emitter.taps(), 2);
}

#[test]
fn faster_replay_shrinks_the_schedule() {
    let parsed = parse_log(SAMPLE_LOG);
    let keymap = KeyMap::qwerty();

    let normal = build_plan(&parsed.records, &keymap, 3.4, 1.0).unwrap();
    let double = build_plan(&parsed.records, &keymap, 3.4, 2.0).unwrap();

    assert_eq!(double.total_delay(), normal.total_delay() / 2);
}
