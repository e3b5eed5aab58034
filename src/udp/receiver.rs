//! UDP receiver (component D): reassembles one JPEG frame out of datagrams
//! that may arrive lost, reordered or duplicated. Grounded on
//! `VideoUDPReceiver.c`'s `VideoUDPReceiverReceiveFrame`.
//!
//! At most one frame is buffered: a packet whose timestamp differs from the
//! one currently being assembled resets all bookkeeping and starts over, so
//! a frame that never completes is silently abandoned in favor of the next
//! one. A packet index seen twice for the same timestamp is a duplicate and
//! is ignored rather than re-applied.

use std::net::SocketAddrV4;
use std::os::raw::c_int;

use crate::envelope::FrameEnvelope;
use crate::error::Error;
use crate::udp::socket::create_bound_socket;
use crate::wire::{PacketHeader, HEADER_LENGTH};

pub enum ReceiveOutcome<'a> {
    Frame(FrameEnvelope<'a>),
    /// The socket fd was closed out from under `recvfrom`, almost always by
    /// a signal handler reacting to SIGINT. Not an error: the caller should
    /// treat this as a normal shutdown request.
    Shutdown,
}

struct ReassemblyState {
    tracked_u_timestamp: Option<u64>,
    packets_flagged: u32,
    flags: Vec<bool>,
}

pub struct UdpReceiver {
    fd: c_int,
    max_packet_body_length: u32,
    packet: Vec<u8>,
    jpeg_buffer: Vec<u8>,
    jpeg_buffer_length: usize,
    frame_u_timestamp: u64,
    state: ReassemblyState,
}

impl UdpReceiver {
    pub fn new(max_packet_length: u32, max_jpeg_length: u32, local: SocketAddrV4) -> Result<Self, Error> {
        if max_packet_length as usize <= HEADER_LENGTH {
            return Err(Error::InvalidArgs(format!(
                "max packet length {} must exceed the {} byte header",
                max_packet_length, HEADER_LENGTH
            )));
        }

        let fd = create_bound_socket(local)?;
        let max_packet_body_length = max_packet_length - HEADER_LENGTH as u32;
        let max_packets_per_jpeg = (max_jpeg_length / max_packet_body_length) + 1;

        Ok(UdpReceiver {
            fd,
            max_packet_body_length,
            packet: vec![0u8; max_packet_length as usize],
            jpeg_buffer: vec![0u8; max_jpeg_length as usize],
            jpeg_buffer_length: 0,
            frame_u_timestamp: 0,
            state: ReassemblyState {
                tracked_u_timestamp: None,
                packets_flagged: 0,
                flags: vec![false; max_packets_per_jpeg as usize],
            },
        })
    }

    /// Blocks until a full frame is reassembled or the socket is closed out
    /// from under the call.
    pub fn receive_frame(&mut self) -> Result<ReceiveOutcome<'_>, Error> {
        loop {
            let received = unsafe {
                libc::recvfrom(
                    self.fd,
                    self.packet.as_mut_ptr() as *mut libc::c_void,
                    self.packet.len(),
                    0,
                    std::ptr::null_mut(),
                    std::ptr::null_mut(),
                )
            };

            if received < 0 {
                let err = std::io::Error::last_os_error();
                match err.raw_os_error() {
                    Some(libc::EINTR) => continue,
                    Some(libc::EBADF) => return Ok(ReceiveOutcome::Shutdown),
                    Some(libc::EAGAIN) | Some(libc::EWOULDBLOCK) => {
                        return Err(Error::SocketMisconfigured)
                    }
                    _ => return Err(Error::SocketIO { syscall: "recvfrom", source: err }),
                }
            }

            let received = received as usize;
            if received == 0 {
                return Err(Error::LengthMismatch("received a zero length datagram"));
            }
            if received < HEADER_LENGTH {
                return Err(Error::LengthMismatch("datagram shorter than the header"));
            }

            let header = PacketHeader::decode(&self.packet[..HEADER_LENGTH])?;
            if HEADER_LENGTH + header.body_length as usize != received {
                return Err(Error::LengthMismatch(
                    "declared body length does not match the datagram size",
                ));
            }

            let offset = (header.packet_index * self.max_packet_body_length) as usize;
            let body_length = header.body_length as usize;
            self.jpeg_buffer[offset..offset + body_length]
                .copy_from_slice(&self.packet[HEADER_LENGTH..HEADER_LENGTH + body_length]);

            if self.state.tracked_u_timestamp != Some(header.u_timestamp) {
                self.state.tracked_u_timestamp = Some(header.u_timestamp);
                self.state.packets_flagged = 0;
                self.state.flags.iter_mut().for_each(|f| *f = false);
            }

            let packet_index = header.packet_index as usize;
            if self.state.flags[packet_index] {
                continue;
            }

            if header.packet_index == header.packet_count - 1 {
                self.jpeg_buffer_length =
                    (header.packet_count - 1) as usize * self.max_packet_body_length as usize
                        + body_length;
                self.frame_u_timestamp = header.u_timestamp;
            }

            self.state.flags[packet_index] = true;
            self.state.packets_flagged += 1;

            if self.state.packets_flagged == header.packet_count {
                return Ok(ReceiveOutcome::Frame(FrameEnvelope::new(
                    self.frame_u_timestamp,
                    &self.jpeg_buffer[..self.jpeg_buffer_length],
                )));
            }
        }
    }

    pub fn fd(&self) -> c_int {
        self.fd
    }
}

impl Drop for UdpReceiver {
    fn drop(&mut self) {
        unsafe {
            libc::close(self.fd);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::udp::sender::UdpSender;

    fn pair(port_rx: u16) -> (UdpSender, UdpReceiver) {
        let local_tx: SocketAddrV4 = "127.0.0.1:0".parse().unwrap();
        let local_rx: SocketAddrV4 = format!("127.0.0.1:{}", port_rx).parse().unwrap();
        let sender = UdpSender::new(1400, 65536, local_tx, local_rx).unwrap();
        let receiver = UdpReceiver::new(1400, 65536, local_rx).unwrap();
        (sender, receiver)
    }

    #[test]
    fn reassembles_a_single_fragment_frame() {
        let (mut tx, mut rx) = pair(58101);
        let jpeg = vec![7u8; 50];
        tx.send_frame(1234, &jpeg, 1).unwrap();
        match rx.receive_frame().unwrap() {
            ReceiveOutcome::Frame(frame) => {
                assert_eq!(frame.u_timestamp(), 1234);
                assert_eq!(frame.payload(), jpeg.as_slice());
            }
            ReceiveOutcome::Shutdown => panic!("expected a frame"),
        }
    }

    #[test]
    fn reassembles_a_multi_fragment_frame() {
        let (mut tx, mut rx) = pair(58102);
        let jpeg: Vec<u8> = (0..3000u32).map(|i| (i % 256) as u8).collect();
        tx.send_frame(99, &jpeg, 1).unwrap();
        match rx.receive_frame().unwrap() {
            ReceiveOutcome::Frame(frame) => {
                assert_eq!(frame.u_timestamp(), 99);
                assert_eq!(frame.payload(), jpeg.as_slice());
            }
            ReceiveOutcome::Shutdown => panic!("expected a frame"),
        }
    }

    #[test]
    fn duplicate_send_rounds_reassemble_cleanly() {
        let (mut tx, mut rx) = pair(58103);
        let jpeg: Vec<u8> = (0..3000u32).map(|i| (i % 256) as u8).collect();
        tx.send_frame(5, &jpeg, 3).unwrap();
        match rx.receive_frame().unwrap() {
            ReceiveOutcome::Frame(frame) => {
                assert_eq!(frame.payload(), jpeg.as_slice());
            }
            ReceiveOutcome::Shutdown => panic!("expected a frame"),
        }
    }
}
