//! Capture driver interface (component B): open a V4L2 character device,
//! negotiate an MJPEG format, mmap a fixed ring of buffers and stream from
//! it one lease at a time.
//!
//! Grounded on `VideoCapture.c`: the open/negotiate/request-buffers/mmap/
//! queue/streamon sequence below is that function translated ioctl for
//! ioctl, with the teacher's `Arc<Handle>` + `Drop`-closes-fd style instead
//! of a bare fd and a manual `VideoCaptureFree`.

use std::ffi::CString;
use std::os::raw::c_void;
use std::os::unix::ffi::OsStrExt;
use std::path::Path;
use std::time::{SystemTime, UNIX_EPOCH};
use std::{io, mem, ptr};

use crate::envelope::FrameEnvelope;
use crate::error::Error;
use crate::v4l2::raw::{self, *};

/// The driver must grant exactly this many buffers; a partial ring defeats
/// the at-most-one-outstanding-lease capacity plan the scheduler assumes.
pub const BUFFER_COUNT: u32 = 3;

struct MmapBuffer {
    start: *mut c_void,
    length: usize,
}

unsafe impl Send for MmapBuffer {}

impl Drop for MmapBuffer {
    fn drop(&mut self) {
        if !self.start.is_null() {
            unsafe {
                libc::munmap(self.start, self.length);
            }
        }
    }
}

struct Handle {
    fd: std::os::raw::c_int,
}

impl Drop for Handle {
    fn drop(&mut self) {
        unsafe {
            let mut buf_type = V4L2_BUF_TYPE_VIDEO_CAPTURE;
            let _ = raw::xioctl(
                self.fd,
                VIDIOC_STREAMOFF,
                &mut buf_type as *mut _ as *mut c_void,
            );
            if libc::close(self.fd) == -1 {
                log::warn!("capture: close() on device fd failed: {}", io::Error::last_os_error());
            }
        }
    }
}

/// A negotiated, streaming V4L2 capture device with a fixed mmap buffer
/// ring. Exactly one buffer may be leased (dequeued) at a time.
pub struct CaptureDevice {
    handle: Handle,
    buffers: Vec<MmapBuffer>,
    epoch_shift_us: i64,
    leased: Option<V4l2Buffer>,
}

fn driver_io(syscall: &'static str, err: io::Error) -> Error {
    Error::DriverIO { syscall, source: err }
}

fn epoch_time_shift_us() -> i64 {
    let wall = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap_or_default()
        .as_micros() as i64;
    let mut ts = libc::timespec { tv_sec: 0, tv_nsec: 0 };
    unsafe {
        libc::clock_gettime(libc::CLOCK_MONOTONIC, &mut ts);
    }
    let monotonic = ts.tv_sec * 1_000_000 + (ts.tv_nsec as i64) / 1000;
    wall - monotonic
}

impl CaptureDevice {
    /// Opens `path`, negotiates an MJPEG `width`x`height` format at
    /// `timebase_numerator`/`timebase_denominator`, requests the fixed
    /// buffer ring, maps it and starts streaming.
    pub fn open<P: AsRef<Path>>(
        path: P,
        width: u32,
        height: u32,
        timebase_numerator: u32,
        timebase_denominator: u32,
    ) -> Result<Self, Error> {
        let path = path.as_ref();

        let meta = std::fs::metadata(path).map_err(|e| driver_io("stat", e))?;
        use std::os::unix::fs::FileTypeExt;
        if !meta.file_type().is_char_device() {
            return Err(Error::NotACharDevice);
        }

        let c_path = CString::new(path.as_os_str().as_bytes())
            .map_err(|_| Error::NotACharDevice)?;
        let fd = unsafe { libc::open(c_path.as_ptr(), libc::O_RDWR, 0) };
        if fd == -1 {
            return Err(driver_io("open", io::Error::last_os_error()));
        }
        let handle = Handle { fd };

        let epoch_shift_us = epoch_time_shift_us();

        let mut caps = V4l2Capability::default();
        unsafe {
            raw::xioctl(fd, VIDIOC_QUERYCAP, &mut caps as *mut _ as *mut c_void)
                .map_err(|e| driver_io("VIDIOC_QUERYCAP", e))?;
        }
        if caps.capabilities & V4L2_CAP_VIDEO_CAPTURE == 0
            || caps.capabilities & V4L2_CAP_STREAMING == 0
        {
            return Err(Error::UnsupportedDevice);
        }

        let mut fmt = V4l2Format::default();
        fmt.type_ = V4L2_BUF_TYPE_VIDEO_CAPTURE;
        unsafe {
            fmt.fmt.pix.width = width;
            fmt.fmt.pix.height = height;
            fmt.fmt.pix.pixelformat = V4L2_PIX_FMT_MJPEG;
            raw::xioctl(fd, VIDIOC_TRY_FMT, &mut fmt as *mut _ as *mut c_void)
                .map_err(|e| driver_io("VIDIOC_TRY_FMT", e))?;

            if fmt.fmt.pix.width != width
                || fmt.fmt.pix.height != height
                || fmt.fmt.pix.pixelformat != V4L2_PIX_FMT_MJPEG
            {
                return Err(Error::FormatRejected {
                    got_width: fmt.fmt.pix.width,
                    got_height: fmt.fmt.pix.height,
                    got_fourcc: fmt.fmt.pix.pixelformat,
                });
            }

            raw::xioctl(fd, VIDIOC_S_FMT, &mut fmt as *mut _ as *mut c_void)
                .map_err(|e| driver_io("VIDIOC_S_FMT", e))?;
        }

        let mut parm = V4l2Streamparm::default();
        parm.type_ = V4L2_BUF_TYPE_VIDEO_CAPTURE;
        unsafe {
            parm.parm.capture.timeperframe.numerator = timebase_numerator;
            parm.parm.capture.timeperframe.denominator = timebase_denominator;
            raw::xioctl(fd, VIDIOC_S_PARM, &mut parm as *mut _ as *mut c_void)
                .map_err(|e| driver_io("VIDIOC_S_PARM", e))?;
        }

        let mut reqbufs = V4l2RequestBuffers::default();
        reqbufs.count = BUFFER_COUNT;
        reqbufs.type_ = V4L2_BUF_TYPE_VIDEO_CAPTURE;
        reqbufs.memory = V4L2_MEMORY_MMAP;
        unsafe {
            raw::xioctl(fd, VIDIOC_REQBUFS, &mut reqbufs as *mut _ as *mut c_void)
                .map_err(|e| driver_io("VIDIOC_REQBUFS", e))?;
        }
        if reqbufs.count != BUFFER_COUNT {
            return Err(Error::BufferCountRejected {
                requested: BUFFER_COUNT,
                granted: reqbufs.count,
            });
        }

        let mut buffers = Vec::with_capacity(BUFFER_COUNT as usize);
        for index in 0..BUFFER_COUNT {
            let mut buf = V4l2Buffer::default();
            buf.type_ = V4L2_BUF_TYPE_VIDEO_CAPTURE;
            buf.memory = V4L2_MEMORY_MMAP;
            buf.index = index;
            unsafe {
                raw::xioctl(fd, VIDIOC_QUERYBUF, &mut buf as *mut _ as *mut c_void)
                    .map_err(|e| driver_io("VIDIOC_QUERYBUF", e))?;

                let start = libc::mmap(
                    ptr::null_mut(),
                    buf.length as usize,
                    libc::PROT_READ | libc::PROT_WRITE,
                    libc::MAP_SHARED,
                    fd,
                    buf.m.offset as libc::off_t,
                );
                if start == libc::MAP_FAILED {
                    return Err(driver_io("mmap", io::Error::last_os_error()));
                }
                buffers.push(MmapBuffer {
                    start,
                    length: buf.length as usize,
                });
            }
        }

        for index in 0..BUFFER_COUNT {
            let mut buf = V4l2Buffer::default();
            buf.type_ = V4L2_BUF_TYPE_VIDEO_CAPTURE;
            buf.memory = V4L2_MEMORY_MMAP;
            buf.index = index;
            unsafe {
                raw::xioctl(fd, VIDIOC_QBUF, &mut buf as *mut _ as *mut c_void)
                    .map_err(|e| driver_io("VIDIOC_QBUF", e))?;
            }
        }

        let mut buf_type = V4L2_BUF_TYPE_VIDEO_CAPTURE;
        unsafe {
            raw::xioctl(fd, VIDIOC_STREAMON, &mut buf_type as *mut _ as *mut c_void)
                .map_err(|e| driver_io("VIDIOC_STREAMON", e))?;
        }

        Ok(CaptureDevice {
            handle,
            buffers,
            epoch_shift_us,
            leased: None,
        })
    }

    /// Dequeues a completed buffer and leases it out as a [`FrameEnvelope`].
    /// The lease must be returned via [`Self::return_frame`] before the next
    /// call; the scheduler enforces this by construction (one tick, one
    /// lease).
    pub fn get_frame(&mut self) -> Result<FrameEnvelope<'_>, Error> {
        let mut buf = V4l2Buffer::default();
        buf.type_ = V4L2_BUF_TYPE_VIDEO_CAPTURE;
        buf.memory = V4L2_MEMORY_MMAP;
        unsafe {
            raw::xioctl(
                self.handle.fd,
                VIDIOC_DQBUF,
                &mut buf as *mut _ as *mut c_void,
            )
            .map_err(|e| driver_io("VIDIOC_DQBUF", e))?;
        }

        let index = buf.index as usize;
        let bytesused = buf.bytesused as usize;
        let u_timestamp =
            (buf.timestamp.tv_sec * 1_000_000 + buf.timestamp.tv_usec + self.epoch_shift_us) as u64;
        self.leased = Some(buf);

        let mmap_buf = &self.buffers[index];
        let slice = unsafe {
            std::slice::from_raw_parts(mmap_buf.start as *const u8, bytesused)
        };

        Ok(FrameEnvelope::new(u_timestamp, slice))
    }

    /// Returns the current lease to the driver's queue.
    pub fn return_frame(&mut self) -> Result<(), Error> {
        let mut buf = self
            .leased
            .take()
            .expect("return_frame called without an outstanding lease");
        unsafe {
            raw::xioctl(
                self.handle.fd,
                VIDIOC_QBUF,
                &mut buf as *mut _ as *mut c_void,
            )
            .map_err(|e| driver_io("VIDIOC_QBUF", e))?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn epoch_shift_is_finite_and_recent() {
        let shift = epoch_time_shift_us();
        // Sanity bound: wall clock minus monotonic clock should land somewhere
        // plausible for a machine booted since the epoch, not overflow-wrapped.
        assert!(shift.unsigned_abs() < (i64::MAX / 2) as u64);
    }

    #[test]
    fn buffer_count_is_three() {
        assert_eq!(BUFFER_COUNT, 3);
    }
}
