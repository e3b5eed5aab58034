//! Capture driver interface (component B).

pub mod device;
pub mod raw;

pub use device::{CaptureDevice, BUFFER_COUNT};
