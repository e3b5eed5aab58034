//! External adapters (component H): contracts toward the decoder,
//! recorder and renderer the scheduler drives but does not implement the
//! internals of.

pub mod decoder;
pub mod recorder;
pub mod renderer;

pub use decoder::{JpegDecoder, TurboJpegDecoder};
pub use recorder::{FrameRecorder, MatroskaRecorder};
pub use renderer::{FrameRenderer, GliumRenderer};
