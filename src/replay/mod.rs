//! Keystroke replay.
//!
//! Turns a keystroke capture log back into a stream of synthetic key events:
//! parse the log, build a timed plan from the press records, and emit each
//! step through a platform emitter.

pub mod device;
pub mod keymap;
pub mod log;
pub mod plan;

// Re-export commonly used types
pub use device::{check_permission, EmitError, KeyEmitter, NullEmitter};
pub use keymap::{KeyCode, KeyMap};
pub use log::{parse_log, read_log, KeystrokeRecord, LogError, ParsedLog, RecordKind};
pub use plan::{build_plan, PlanError, ReplayPlan, ReplayStep};

#[cfg(target_os = "linux")]
pub use device::uinput::UinputEmitter;
