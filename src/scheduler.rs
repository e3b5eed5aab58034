//! The pipeline loop (component F): pull one frame from the declared
//! source, fan it out across the declared sink list in order, decode RGB
//! at most once per tick only if some sink needs it, then return the
//! source's lease. Grounded on `FastMJPG.c`'s `mainLoop`.

use std::os::raw::c_int;
use std::sync::atomic::{AtomicBool, AtomicI32, Ordering};

use crate::adapters::JpegDecoder;
use crate::error::Error;
use crate::udp::{ReceiveOutcome, UdpReceiver};
use crate::v4l2::CaptureDevice;
use crate::sinks::SinkStage;

/// The two things a pipeline can read frames from; first and only
/// positional argument on the command line.
pub enum Source {
    Capture(CaptureDevice),
    Receive(UdpReceiver),
}

static SHUTDOWN_REQUESTED: AtomicBool = AtomicBool::new(false);
static RECEIVER_SHUTDOWN_FD: AtomicI32 = AtomicI32::new(-1);

extern "C" fn on_sigint(_signum: c_int) {
    SHUTDOWN_REQUESTED.store(true, Ordering::SeqCst);
    let fd = RECEIVER_SHUTDOWN_FD.load(Ordering::SeqCst);
    if fd >= 0 {
        unsafe {
            libc::close(fd);
        }
    }
}

/// Installs the process-wide SIGINT handler. If the source is a UDP
/// receiver, its fd is recorded so the handler can close it out from under
/// a blocked `recvfrom`, the only way to unblock that call without a
/// second thread. Safe to call once per process; a second call re-registers
/// the same handler.
pub fn install_sigint_handler(receiver_fd: Option<c_int>) -> Result<(), Error> {
    RECEIVER_SHUTDOWN_FD.store(receiver_fd.unwrap_or(-1), Ordering::SeqCst);
    unsafe {
        if libc::signal(libc::SIGINT, on_sigint as libc::sighandler_t) == libc::SIG_ERR {
            return Err(Error::DriverIO {
                syscall: "signal(SIGINT)",
                source: std::io::Error::last_os_error(),
            });
        }
    }
    Ok(())
}

pub fn shutdown_requested() -> bool {
    SHUTDOWN_REQUESTED.load(Ordering::SeqCst)
}

pub struct Scheduler {
    source: Source,
    sinks: Vec<SinkStage>,
    decoder: Option<Box<dyn JpegDecoder>>,
}

impl Scheduler {
    pub fn new(source: Source, sinks: Vec<SinkStage>, decoder: Option<Box<dyn JpegDecoder>>) -> Self {
        Scheduler { source, sinks, decoder }
    }

    /// Runs until SIGINT is observed, the receive source reports shutdown,
    /// or a sink reports a fatal error.
    pub fn run(&mut self) -> Result<(), Error> {
        loop {
            if shutdown_requested() {
                return Ok(());
            }

            let frame = match &mut self.source {
                Source::Capture(dev) => dev.get_frame()?,
                Source::Receive(rx) => match rx.receive_frame()? {
                    ReceiveOutcome::Frame(frame) => frame,
                    ReceiveOutcome::Shutdown => return Ok(()),
                },
            };

            dispatch_tick(&mut self.sinks, self.decoder.as_deref_mut(), frame)?;

            if let Source::Capture(dev) = &mut self.source {
                dev.return_frame()?;
            }
        }
    }
}

/// Decodes RGB at most once, only if some sink needs it, then fans the
/// frame out across every sink in order. Factored out of `run` so it takes
/// the sink list and decoder by reference instead of `&mut Scheduler`,
/// which would conflict with `frame`'s borrow of the source; this also
/// makes it exercisable without a real capture device or socket.
fn dispatch_tick(
    sinks: &mut [SinkStage],
    decoder: Option<&mut dyn JpegDecoder>,
    frame: crate::envelope::FrameEnvelope,
) -> Result<(), Error> {
    let needs_rgb = sinks.iter().any(SinkStage::needs_rgb);
    let rgb: Option<&[u8]> = if needs_rgb {
        let decoder = decoder.expect("a sink needs rgb but no decoder was constructed");
        Some(decoder.decode(frame.payload())?)
    } else {
        None
    };

    for sink in sinks.iter_mut() {
        sink.dispatch(frame, rgb)?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::decoder::fakes::CountingDecoder;
    use crate::envelope::FrameEnvelope;
    use std::io::Read;
    use std::os::unix::io::FromRawFd;

    fn pipe_sink(rgb: bool) -> (SinkStage, std::fs::File) {
        let mut fds = [0 as c_int; 2];
        assert_eq!(unsafe { libc::pipe(fds.as_mut_ptr()) }, 0);
        let read_file = unsafe { std::fs::File::from_raw_fd(fds[0]) };
        let writer = crate::pipe::PipeWriter::new(fds[1], 64);
        (SinkStage::Pipe { writer, rgb }, read_file)
    }

    #[test]
    fn decoder_is_not_invoked_when_no_sink_needs_rgb() {
        let (sink, mut read_end) = pipe_sink(false);
        let mut sinks = vec![sink];
        let mut decoder = CountingDecoder::new(3);
        let payload = [1u8, 2, 3, 4];
        let frame = FrameEnvelope::new(42, &payload);

        dispatch_tick(&mut sinks, Some(&mut decoder), frame).unwrap();

        assert_eq!(decoder.calls, 0);
        drop(sinks);
        let mut buf = Vec::new();
        read_end.read_to_end(&mut buf).unwrap();
        assert_eq!(&buf[12..], &payload);
    }

    #[test]
    fn decoder_is_invoked_exactly_once_when_a_sink_needs_rgb() {
        let (sink, mut read_end) = pipe_sink(true);
        let mut sinks = vec![sink];
        let mut decoder = CountingDecoder::new(3);
        decoder.rgb_buffer = vec![9, 9, 9];
        let payload = [1u8, 2, 3, 4];
        let frame = FrameEnvelope::new(42, &payload);

        dispatch_tick(&mut sinks, Some(&mut decoder), frame).unwrap();

        assert_eq!(decoder.calls, 1);
        drop(sinks);
        let mut buf = Vec::new();
        read_end.read_to_end(&mut buf).unwrap();
        assert_eq!(&buf[12..], &[9, 9, 9]);
    }

    #[test]
    fn decoder_is_invoked_once_even_with_two_sinks_needing_rgb() {
        let (sink_a, read_a) = pipe_sink(true);
        let (sink_b, read_b) = pipe_sink(true);
        let mut sinks = vec![sink_a, sink_b];
        let mut decoder = CountingDecoder::new(3);
        let payload = [5u8, 6, 7];
        let frame = FrameEnvelope::new(7, &payload);

        dispatch_tick(&mut sinks, Some(&mut decoder), frame).unwrap();

        assert_eq!(decoder.calls, 1);
        drop(sinks);
        drop(read_a);
        drop(read_b);
    }
}
