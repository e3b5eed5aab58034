//! Byte-pipe writer (component E): length-prefixed framing to an arbitrary
//! fd (a named pipe, usually). Grounded on `VideoPipe.c`.
//!
//! Frame layout: an 8 byte big-endian timestamp, a 4 byte big-endian
//! length, then `length` raw JPEG bytes written in chunks no larger than
//! `max_chunk_length` — downstream readers with small pipe buffers still
//! see forward progress instead of one giant write blocking everything.

use std::io::Write;
use std::os::raw::c_int;
use std::os::unix::io::FromRawFd;

use crate::error::Error;

pub struct PipeWriter {
    fd: c_int,
    max_chunk_length: u32,
}

impl PipeWriter {
    pub fn new(fd: c_int, max_chunk_length: u32) -> Self {
        PipeWriter { fd, max_chunk_length }
    }

    pub fn write_frame(&self, u_timestamp: u64, payload: &[u8]) -> Result<(), Error> {
        let mut file = std::mem::ManuallyDrop::new(unsafe { std::fs::File::from_raw_fd(self.fd) });

        write_exact(&mut file, "timestamp", &u_timestamp.to_be_bytes())?;
        write_exact(&mut file, "length", &(payload.len() as u32).to_be_bytes())?;

        let mut remaining = payload;
        while !remaining.is_empty() {
            let chunk_len = remaining.len().min(self.max_chunk_length as usize);
            write_exact(&mut file, "body", &remaining[..chunk_len])?;
            remaining = &remaining[chunk_len..];
        }

        Ok(())
    }
}

impl Drop for PipeWriter {
    fn drop(&mut self) {
        unsafe {
            libc::close(self.fd);
        }
    }
}

fn write_exact(file: &mut std::fs::File, field: &'static str, bytes: &[u8]) -> Result<(), Error> {
    match file.write(bytes) {
        Ok(wrote) if wrote == bytes.len() => Ok(()),
        Ok(wrote) => Err(Error::PipeShortWrite {
            field,
            wrote,
            wanted: bytes.len(),
        }),
        Err(e) => Err(Error::PipeIO(e)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Read;

    #[test]
    fn frame_round_trips_through_a_real_pipe() {
        let (mut read_end, write_end) = {
            let mut fds = [0 as c_int; 2];
            assert_eq!(unsafe { libc::pipe(fds.as_mut_ptr()) }, 0);
            let read_file = unsafe { std::fs::File::from_raw_fd(fds[0]) };
            (read_file, fds[1])
        };

        let writer = PipeWriter::new(write_end, 64);
        let payload = vec![9u8; 500];
        writer.write_frame(0x0102_0304_0506_0708, &payload).unwrap();
        drop(writer);

        let mut buf = Vec::new();
        read_end.read_to_end(&mut buf).unwrap();

        assert_eq!(&buf[0..8], &0x0102_0304_0506_0708u64.to_be_bytes());
        assert_eq!(&buf[8..12], &500u32.to_be_bytes());
        assert_eq!(&buf[12..], payload.as_slice());
    }
}
