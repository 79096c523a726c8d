//! keytrace - keystroke timing visualization and replay toolkit.
//!
//! This library post-processes keystroke timing captures: it renders
//! presence charts showing when keystrokes were detected, and replays
//! recorded keystroke sequences through a synthetic input device with their
//! original timing.
//!
//! # Pipelines
//!
//! ```text
//! ┌──────────────────┐   ┌─────────────┐   ┌──────────────┐
//! │ timestamps       │──▶│  presence   │──▶│    chart     │
//! │ (.bin / .csv)    │   │  buckets    │   │   (.html)    │
//! └──────────────────┘   └─────────────┘   └──────────────┘
//!
//! ┌──────────────────┐   ┌─────────────┐   ┌──────────────┐
//! │ capture log      │──▶│ replay plan │──▶│   virtual    │
//! │ (dmesg records)  │   │ (key,delay) │   │   keyboard   │
//! └──────────────────┘   └─────────────┘   └──────────────┘
//! ```
//!
//! # Example
//!
//! ```
//! use keytrace::core::presence::build_presence;
//!
//! // three keystrokes 5, 22 and 49 units after the origin, 10-unit buckets
//! let presence = build_presence(&[1005, 1022, 1049], 1000, 10.0, 5).unwrap();
//! assert_eq!(presence.slots(), &[1, 0, 1, 0, 1]);
//! ```

pub mod config;
pub mod core;
pub mod input;
pub mod render;
pub mod replay;

// Re-export key types at crate root for convenience
pub use config::{Config, ConfigError};
pub use crate::core::{build_presence, Presence, PresenceError};
pub use input::{read_timestamps, InputError, TimestampFormat};
pub use render::{presence_chart, write_chart, ChartOptions, RenderError};
pub use replay::{
    build_plan, parse_log, read_log, KeyCode, KeyEmitter, KeyMap, KeystrokeRecord, NullEmitter,
    ParsedLog, ReplayPlan, ReplayStep,
};

/// Library version.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
