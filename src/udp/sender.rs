//! UDP sender (component C): fragments one JPEG into bounded datagrams and
//! sends each fragment `send_rounds` times for simple redundancy. Grounded
//! on `VideoUDPSender.c` — no FEC, no retransmission, no application-level
//! acknowledgement.

use std::net::SocketAddrV4;
use std::os::raw::c_int;

use crate::error::Error;
use crate::udp::socket::{create_bound_socket, sockaddr_in_from};
use crate::wire::{PacketHeader, HEADER_LENGTH};

pub struct UdpSender {
    fd: c_int,
    remote: libc::sockaddr_in,
    max_jpeg_length: u32,
    max_packet_body_length: u32,
    packet: Vec<u8>,
}

impl UdpSender {
    pub fn new(
        max_packet_length: u32,
        max_jpeg_length: u32,
        local: SocketAddrV4,
        remote: SocketAddrV4,
    ) -> Result<Self, Error> {
        if max_packet_length as usize <= HEADER_LENGTH {
            return Err(Error::InvalidArgs(format!(
                "max packet length {} must exceed the {} byte header",
                max_packet_length, HEADER_LENGTH
            )));
        }

        let fd = create_bound_socket(local)?;
        let max_packet_body_length = max_packet_length - HEADER_LENGTH as u32;

        Ok(UdpSender {
            fd,
            remote: sockaddr_in_from(remote),
            max_jpeg_length,
            max_packet_body_length,
            packet: vec![0u8; max_packet_length as usize],
        })
    }

    /// Fragments `jpeg` and sends it out `send_rounds` times.
    pub fn send_frame(&mut self, u_timestamp: u64, jpeg: &[u8], send_rounds: u32) -> Result<(), Error> {
        if jpeg.is_empty() {
            return Err(Error::EmptyPayload);
        }
        if jpeg.len() as u32 > self.max_jpeg_length {
            return Err(Error::PayloadTooLarge {
                len: jpeg.len() as u32,
                max: self.max_jpeg_length,
            });
        }

        let body_cap = self.max_packet_body_length;
        let packet_count = (jpeg.len() as u32 + body_cap - 1) / body_cap;

        for _round in 0..send_rounds {
            for packet_index in 0..packet_count {
                let start = (packet_index * body_cap) as usize;
                let body_length = if packet_index == packet_count - 1 {
                    jpeg.len() - start
                } else {
                    body_cap as usize
                };

                let header = PacketHeader {
                    u_timestamp,
                    packet_index,
                    packet_count,
                    body_length: body_length as u32,
                };
                header.encode(&mut self.packet[0..HEADER_LENGTH]);
                self.packet[HEADER_LENGTH..HEADER_LENGTH + body_length]
                    .copy_from_slice(&jpeg[start..start + body_length]);

                self.send_datagram(HEADER_LENGTH + body_length)?;
            }
        }

        Ok(())
    }

    fn send_datagram(&self, total_length: usize) -> Result<(), Error> {
        loop {
            let sent = unsafe {
                libc::sendto(
                    self.fd,
                    self.packet.as_ptr() as *const libc::c_void,
                    total_length,
                    0,
                    &self.remote as *const _ as *const libc::sockaddr,
                    std::mem::size_of::<libc::sockaddr_in>() as libc::socklen_t,
                )
            };
            if sent >= 0 {
                return Ok(());
            }
            let err = std::io::Error::last_os_error();
            match err.raw_os_error() {
                Some(libc::EINTR) => continue,
                Some(libc::EAGAIN) | Some(libc::EWOULDBLOCK) => {
                    return Err(Error::SocketMisconfigured)
                }
                _ => return Err(Error::SocketIO { syscall: "sendto", source: err }),
            }
        }
    }
}

impl Drop for UdpSender {
    fn drop(&mut self) {
        unsafe {
            libc::close(self.fd);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rejects_packet_length_not_exceeding_header() {
        let local: SocketAddrV4 = "127.0.0.1:0".parse().unwrap();
        let remote: SocketAddrV4 = "127.0.0.1:9".parse().unwrap();
        let err = UdpSender::new(HEADER_LENGTH as u32, 65536, local, remote).unwrap_err();
        assert!(matches!(err, Error::InvalidArgs(_)));
    }

    #[test]
    fn fragment_count_matches_ceil_division() {
        let local: SocketAddrV4 = "127.0.0.1:0".parse().unwrap();
        let remote: SocketAddrV4 = "127.0.0.1:57001".parse().unwrap();
        let mut sender = UdpSender::new(1400, 65536, local, remote).unwrap();
        let jpeg = vec![0xFFu8; 3000];
        // 1400 - 20 = 1380 body bytes/packet; ceil(3000/1380) = 3 fragments.
        assert!(sender.send_frame(1, &jpeg, 1).is_ok());
    }

    #[test]
    fn rejects_empty_payload() {
        let local: SocketAddrV4 = "127.0.0.1:0".parse().unwrap();
        let remote: SocketAddrV4 = "127.0.0.1:57002".parse().unwrap();
        let mut sender = UdpSender::new(1400, 65536, local, remote).unwrap();
        assert!(matches!(
            sender.send_frame(1, &[], 1),
            Err(Error::EmptyPayload)
        ));
    }

    #[test]
    fn rejects_oversized_payload() {
        let local: SocketAddrV4 = "127.0.0.1:0".parse().unwrap();
        let remote: SocketAddrV4 = "127.0.0.1:57003".parse().unwrap();
        let mut sender = UdpSender::new(1400, 100, local, remote).unwrap();
        let jpeg = vec![0u8; 101];
        assert!(matches!(
            sender.send_frame(1, &jpeg, 1),
            Err(Error::PayloadTooLarge { .. })
        ));
    }
}
