use std::io;

/// Fatal error taxonomy for the pipeline.
///
/// Every variant here terminates the process; there is no per-component retry
/// across a frame boundary. `Display` renders "component: detail" so `main`
/// can print it verbatim as the required single diagnostic line.
#[derive(thiserror::Error, Debug)]
pub enum Error {
    #[error("wire: {0}")]
    MalformedHeader(&'static str),

    #[error("capture: device is not a character-special file")]
    NotACharDevice,

    #[error("capture: device does not advertise video capture + streaming capabilities")]
    UnsupportedDevice,

    #[error("capture: driver rejected requested format (got {got_width}x{got_height} fourcc={got_fourcc:08x})")]
    FormatRejected {
        got_width: u32,
        got_height: u32,
        got_fourcc: u32,
    },

    #[error("capture: driver granted {granted} buffers instead of {requested}")]
    BufferCountRejected { requested: u32, granted: u32 },

    #[error("capture: {syscall} failed: {source}")]
    DriverIO {
        syscall: &'static str,
        #[source]
        source: io::Error,
    },

    #[error("udp: payload was empty")]
    EmptyPayload,

    #[error("udp: payload of {len} bytes exceeds max jpeg length {max}")]
    PayloadTooLarge { len: u32, max: u32 },

    #[error("udp: socket was misconfigured non-blocking")]
    SocketMisconfigured,

    #[error("udp receiver: {0}")]
    LengthMismatch(&'static str),

    #[error("udp: {syscall} failed: {source}")]
    SocketIO {
        syscall: &'static str,
        #[source]
        source: io::Error,
    },

    #[error("pipe: short write on {field} ({wrote} of {wanted} bytes)")]
    PipeShortWrite {
        field: &'static str,
        wrote: usize,
        wanted: usize,
    },

    #[error("pipe: write failed: {0}")]
    PipeIO(#[source] io::Error),

    #[error("decoder: {0}")]
    Decode(String),

    #[error("recorder: {0}")]
    Record(String),

    #[error("renderer: {0}")]
    Render(String),

    #[error("cli: {0}")]
    InvalidArgs(String),
}

pub type Result<T> = std::result::Result<T, Error>;
