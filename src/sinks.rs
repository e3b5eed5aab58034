//! The declared output list the scheduler fans a frame out to. A tagged
//! enum rather than `Box<dyn Sink>`: the scheduler needs to ask "does any
//! sink need RGB" and dispatch without virtual calls on the hot per-frame
//! path, the same way the original's `switch (paramsTypes[paramIndex])`
//! does before the compiler gets a chance to devirtualize anything.

use crate::adapters::{FrameRecorder, FrameRenderer};
use crate::envelope::FrameEnvelope;
use crate::error::Error;
use crate::pipe::PipeWriter;
use crate::udp::UdpSender;

pub enum SinkStage {
    Render(Box<dyn FrameRenderer>),
    Record(Box<dyn FrameRecorder>),
    Send { sender: UdpSender, send_rounds: u32 },
    Pipe { writer: PipeWriter, rgb: bool },
}

impl SinkStage {
    /// Whether this sink's `dispatch` call needs the decoded RGB buffer
    /// rather than the raw JPEG bytes.
    pub fn needs_rgb(&self) -> bool {
        matches!(
            self,
            SinkStage::Render(_) | SinkStage::Pipe { rgb: true, .. }
        )
    }

    /// Delivers one frame. `rgb` is `None` unless some sink in the list
    /// returned true from [`Self::needs_rgb`] and the scheduler decoded it.
    pub fn dispatch(&mut self, frame: FrameEnvelope, rgb: Option<&[u8]>) -> Result<(), Error> {
        match self {
            SinkStage::Render(renderer) => {
                let rgb = rgb.expect("render sink dispatched without a decoded RGB buffer");
                renderer.render(rgb)
            }
            SinkStage::Record(recorder) => recorder.record(frame.u_timestamp(), frame.payload()),
            SinkStage::Send { sender, send_rounds } => {
                sender.send_frame(frame.u_timestamp(), frame.payload(), *send_rounds)
            }
            SinkStage::Pipe { writer, rgb: wants_rgb } => {
                let payload = if *wants_rgb {
                    rgb.expect("pipe sink wants rgb but none was decoded")
                } else {
                    frame.payload()
                };
                writer.write_frame(frame.u_timestamp(), payload)
            }
        }
    }
}
