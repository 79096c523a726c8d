//! Synthetic keystroke emission.
//!
//! On Linux the emitter registers a uinput virtual keyboard and emits
//! press/release pairs through it. Elsewhere (and under `--dry-run`) a null
//! emitter counts taps without touching any device.

use crate::replay::keymap::KeyCode;
use thiserror::Error;

/// Errors that can occur while emitting synthetic keystrokes.
#[derive(Debug, Error)]
pub enum EmitError {
    #[error("could not create virtual device: {0}")]
    DeviceCreate(#[source] std::io::Error),
    #[error("could not emit event: {0}")]
    Emit(#[source] std::io::Error),
}

/// Something that can tap (press and release) a key.
pub trait KeyEmitter {
    fn tap(&mut self, code: KeyCode) -> Result<(), EmitError>;
}

/// Emitter that records taps without emitting anything. Used for dry runs
/// and on platforms without uinput.
#[derive(Debug, Default)]
pub struct NullEmitter {
    taps: usize,
}

impl NullEmitter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of taps requested so far.
    pub fn taps(&self) -> usize {
        self.taps
    }
}

impl KeyEmitter for NullEmitter {
    fn tap(&mut self, _code: KeyCode) -> Result<(), EmitError> {
        self.taps += 1;
        Ok(())
    }
}

/// Check whether this process can open the uinput device for writing.
#[cfg(target_os = "linux")]
pub fn check_permission() -> bool {
    std::fs::OpenOptions::new()
        .write(true)
        .open("/dev/uinput")
        .is_ok()
}

/// Platforms without uinput never grant emission access.
#[cfg(not(target_os = "linux"))]
pub fn check_permission() -> bool {
    false
}

#[cfg(target_os = "linux")]
pub mod uinput {
    //! uinput-backed virtual keyboard.

    use super::{EmitError, KeyEmitter};
    use crate::replay::keymap::{KeyCode, KeyMap};
    use evdev::uinput::{VirtualDevice, VirtualDeviceBuilder};
    use evdev::{AttributeSet, EventType, InputEvent, Key};

    /// Virtual keyboard backed by /dev/uinput.
    pub struct UinputEmitter {
        device: VirtualDevice,
    }

    impl UinputEmitter {
        /// Register a virtual keyboard exposing every key in the map.
        pub fn new(keymap: &KeyMap) -> Result<Self, EmitError> {
            let mut keys = AttributeSet::<Key>::new();
            for code in keymap.codes() {
                keys.insert(Key::new(code.0));
            }

            let device = VirtualDeviceBuilder::new()
                .map_err(EmitError::DeviceCreate)?
                .name("keytrace-replay")
                .with_keys(&keys)
                .map_err(EmitError::DeviceCreate)?
                .build()
                .map_err(EmitError::DeviceCreate)?;

            Ok(Self { device })
        }
    }

    impl KeyEmitter for UinputEmitter {
        fn tap(&mut self, code: KeyCode) -> Result<(), EmitError> {
            // press and release in separate reports so consumers see two
            // distinct key events
            self.device
                .emit(&[InputEvent::new(EventType::KEY, code.0, 1)])
                .map_err(EmitError::Emit)?;
            self.device
                .emit(&[InputEvent::new(EventType::KEY, code.0, 0)])
                .map_err(EmitError::Emit)
        }
    }
}
