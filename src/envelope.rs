//! The value type threaded between a source and the scheduler's sinks
//! (component G). Non-owning: the source's own storage (a leased mmap
//! buffer, or the receiver's reassembly buffer) outlives the fan-out for
//! exactly one tick, and no sink may retain the view past its own call.

/// A captured or received frame: one capture timestamp plus a borrowed view
/// of the JPEG bytes.
#[derive(Clone, Copy)]
pub struct FrameEnvelope<'a> {
    u_timestamp: u64,
    payload: &'a [u8],
}

impl<'a> FrameEnvelope<'a> {
    pub fn new(u_timestamp: u64, payload: &'a [u8]) -> Self {
        FrameEnvelope {
            u_timestamp,
            payload,
        }
    }

    pub fn u_timestamp(&self) -> u64 {
        self.u_timestamp
    }

    pub fn payload(&self) -> &'a [u8] {
        self.payload
    }

    pub fn length(&self) -> u32 {
        self.payload.len() as u32
    }
}
