//! Hand-rolled V4L2 ABI: ioctl request codes and the handful of
//! `linux/videodev2.h` structs the capture driver interface touches.
//!
//! There is no `bindgen` pass here: the field layouts below are written out
//! by hand, repr(C), the way small pure-Rust v4l2 clients (no libv4l2,
//! no generated bindings) do it. The ioctl request numbers are computed
//! with the same `_IOC`/`_IOR`/`_IOW`/`_IOWR` formula as
//! `asm-generic/ioctl.h` rather than copied as magic numbers, but the
//! resulting value still depends on these structs matching the kernel's
//! layout byte for byte. Validate against the target kernel's
//! `linux/videodev2.h` before relying on this on an architecture other
//! than x86_64/aarch64.

use std::os::raw::{c_int, c_ulong};

const IOC_NONE: u32 = 0;
const IOC_WRITE: u32 = 1;
const IOC_READ: u32 = 2;

const IOC_NRSHIFT: u32 = 0;
const IOC_TYPESHIFT: u32 = IOC_NRSHIFT + 8;
const IOC_SIZESHIFT: u32 = IOC_TYPESHIFT + 8;
const IOC_DIRSHIFT: u32 = IOC_SIZESHIFT + 14;

const VIDEO_IOC_TYPE: u32 = b'V' as u32;

const fn ioc(dir: u32, nr: u32, size: usize) -> c_ulong {
    ((dir << IOC_DIRSHIFT) | (VIDEO_IOC_TYPE << IOC_TYPESHIFT) | (nr << IOC_NRSHIFT) | ((size as u32) << IOC_SIZESHIFT))
        as c_ulong
}

const fn ior(nr: u32, size: usize) -> c_ulong {
    ioc(IOC_READ, nr, size)
}

const fn iow(nr: u32, size: usize) -> c_ulong {
    ioc(IOC_WRITE, nr, size)
}

const fn iowr(nr: u32, size: usize) -> c_ulong {
    ioc(IOC_READ | IOC_WRITE, nr, size)
}

pub const VIDIOC_QUERYCAP: c_ulong = ior(0, std::mem::size_of::<V4l2Capability>());
pub const VIDIOC_TRY_FMT: c_ulong = iowr(64, std::mem::size_of::<V4l2Format>());
pub const VIDIOC_S_FMT: c_ulong = iowr(5, std::mem::size_of::<V4l2Format>());
pub const VIDIOC_S_PARM: c_ulong = iowr(22, std::mem::size_of::<V4l2Streamparm>());
pub const VIDIOC_REQBUFS: c_ulong = iowr(8, std::mem::size_of::<V4l2RequestBuffers>());
pub const VIDIOC_QUERYBUF: c_ulong = iowr(9, std::mem::size_of::<V4l2Buffer>());
pub const VIDIOC_QBUF: c_ulong = iowr(15, std::mem::size_of::<V4l2Buffer>());
pub const VIDIOC_DQBUF: c_ulong = iowr(17, std::mem::size_of::<V4l2Buffer>());
pub const VIDIOC_STREAMON: c_ulong = iow(18, std::mem::size_of::<c_int>());
pub const VIDIOC_STREAMOFF: c_ulong = iow(19, std::mem::size_of::<c_int>());

pub const V4L2_CAP_VIDEO_CAPTURE: u32 = 0x0000_0001;
pub const V4L2_CAP_STREAMING: u32 = 0x0400_0000;

pub const V4L2_BUF_TYPE_VIDEO_CAPTURE: u32 = 1;
pub const V4L2_MEMORY_MMAP: u32 = 1;

/// `v4l2_fourcc('M', 'J', 'P', 'G')`.
pub const V4L2_PIX_FMT_MJPEG: u32 = fourcc(b'M', b'J', b'P', b'G');

pub const fn fourcc(a: u8, b: u8, c: u8, d: u8) -> u32 {
    (a as u32) | ((b as u32) << 8) | ((c as u32) << 16) | ((d as u32) << 24)
}

#[repr(C)]
#[derive(Clone, Copy)]
pub struct V4l2Capability {
    pub driver: [u8; 16],
    pub card: [u8; 32],
    pub bus_info: [u8; 32],
    pub version: u32,
    pub capabilities: u32,
    pub device_caps: u32,
    pub reserved: [u32; 3],
}

impl Default for V4l2Capability {
    fn default() -> Self {
        unsafe { std::mem::zeroed() }
    }
}

#[repr(C)]
#[derive(Clone, Copy, Default)]
pub struct V4l2PixFormat {
    pub width: u32,
    pub height: u32,
    pub pixelformat: u32,
    pub field: u32,
    pub bytesperline: u32,
    pub sizeimage: u32,
    pub colorspace: u32,
    pub priv_: u32,
    pub flags: u32,
    pub ycbcr_enc: u32,
    pub quantization: u32,
    pub xfer_func: u32,
}

#[repr(C)]
#[derive(Clone, Copy)]
pub union V4l2FormatUnion {
    pub pix: V4l2PixFormat,
    pub raw_data: [u8; 200],
}

#[repr(C)]
#[derive(Clone, Copy)]
pub struct V4l2Format {
    pub type_: u32,
    pub fmt: V4l2FormatUnion,
}

impl Default for V4l2Format {
    fn default() -> Self {
        unsafe { std::mem::zeroed() }
    }
}

#[repr(C)]
#[derive(Clone, Copy, Default)]
pub struct V4l2Fract {
    pub numerator: u32,
    pub denominator: u32,
}

#[repr(C)]
#[derive(Clone, Copy, Default)]
pub struct V4l2CaptureParm {
    pub capability: u32,
    pub capturemode: u32,
    pub timeperframe: V4l2Fract,
    pub extendedmode: u32,
    pub readbuffers: u32,
    pub reserved: [u32; 4],
}

#[repr(C)]
#[derive(Clone, Copy)]
pub union V4l2StreamparmUnion {
    pub capture: V4l2CaptureParm,
    pub raw_data: [u8; 200],
}

#[repr(C)]
#[derive(Clone, Copy)]
pub struct V4l2Streamparm {
    pub type_: u32,
    pub parm: V4l2StreamparmUnion,
}

impl Default for V4l2Streamparm {
    fn default() -> Self {
        unsafe { std::mem::zeroed() }
    }
}

#[repr(C)]
#[derive(Clone, Copy, Default)]
pub struct V4l2RequestBuffers {
    pub count: u32,
    pub type_: u32,
    pub memory: u32,
    pub capabilities: u32,
    pub flags: u8,
    pub reserved: [u8; 3],
}

#[repr(C)]
#[derive(Clone, Copy, Default)]
pub struct Timeval {
    pub tv_sec: i64,
    pub tv_usec: i64,
}

#[repr(C)]
#[derive(Clone, Copy, Default)]
pub struct V4l2Timecode {
    pub type_: u32,
    pub flags: u32,
    pub frames: u8,
    pub seconds: u8,
    pub minutes: u8,
    pub hours: u8,
    pub userbits: [u8; 4],
}

#[repr(C)]
#[derive(Clone, Copy)]
pub union V4l2BufferM {
    pub offset: u32,
    pub userptr: usize,
    pub fd: i32,
}

#[repr(C)]
#[derive(Clone, Copy)]
pub union V4l2BufferReservedUnion {
    pub request_fd: i32,
    pub reserved: u32,
}

#[repr(C)]
#[derive(Clone, Copy)]
pub struct V4l2Buffer {
    pub index: u32,
    pub type_: u32,
    pub bytesused: u32,
    pub flags: u32,
    pub field: u32,
    pub timestamp: Timeval,
    pub timecode: V4l2Timecode,
    pub sequence: u32,
    pub memory: u32,
    pub m: V4l2BufferM,
    pub length: u32,
    pub reserved2: u32,
    pub reserved_union: V4l2BufferReservedUnion,
}

impl Default for V4l2Buffer {
    fn default() -> Self {
        unsafe { std::mem::zeroed() }
    }
}

/// Retries a V4L2 ioctl transparently across `EINTR`, as every kernel
/// request in the capture driver interface must.
pub unsafe fn xioctl(fd: c_int, request: c_ulong, argp: *mut std::os::raw::c_void) -> std::io::Result<()> {
    loop {
        let ret = libc::ioctl(fd, request, argp);
        if ret == -1 {
            let err = std::io::Error::last_os_error();
            if err.kind() == std::io::ErrorKind::Interrupted {
                continue;
            }
            return Err(err);
        }
        return Ok(());
    }
}
