//! Wire framing for UDP fragments (component A).
//!
//! Fixed 20 byte, big-endian header followed by `body_length` JPEG bytes:
//! `u_timestamp:u64 | packet_index:u32 | packet_count:u32 | body_length:u32`.

use crate::error::Error;

pub const HEADER_LENGTH: usize = 20;

const UTIMESTAMP_OFFSET: usize = 0;
const PACKET_INDEX_OFFSET: usize = 8;
const PACKET_COUNT_OFFSET: usize = 12;
const BODY_LENGTH_OFFSET: usize = 16;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PacketHeader {
    pub u_timestamp: u64,
    pub packet_index: u32,
    pub packet_count: u32,
    pub body_length: u32,
}

impl PacketHeader {
    /// Writes the 20 byte big-endian header into `buffer[0..HEADER_LENGTH]`.
    ///
    /// # Panics
    /// Panics if `buffer` is shorter than [`HEADER_LENGTH`]; callers own a
    /// scratch packet sized at construction time and never pass a short one.
    pub fn encode(&self, buffer: &mut [u8]) {
        buffer[UTIMESTAMP_OFFSET..UTIMESTAMP_OFFSET + 8]
            .copy_from_slice(&self.u_timestamp.to_be_bytes());
        buffer[PACKET_INDEX_OFFSET..PACKET_INDEX_OFFSET + 4]
            .copy_from_slice(&self.packet_index.to_be_bytes());
        buffer[PACKET_COUNT_OFFSET..PACKET_COUNT_OFFSET + 4]
            .copy_from_slice(&self.packet_count.to_be_bytes());
        buffer[BODY_LENGTH_OFFSET..BODY_LENGTH_OFFSET + 4]
            .copy_from_slice(&self.body_length.to_be_bytes());
    }

    pub fn decode(buffer: &[u8]) -> Result<Self, Error> {
        if buffer.len() < HEADER_LENGTH {
            return Err(Error::MalformedHeader("buffer shorter than 20 bytes"));
        }

        let u_timestamp = u64::from_be_bytes(
            buffer[UTIMESTAMP_OFFSET..UTIMESTAMP_OFFSET + 8]
                .try_into()
                .unwrap(),
        );
        let packet_index = u32::from_be_bytes(
            buffer[PACKET_INDEX_OFFSET..PACKET_INDEX_OFFSET + 4]
                .try_into()
                .unwrap(),
        );
        let packet_count = u32::from_be_bytes(
            buffer[PACKET_COUNT_OFFSET..PACKET_COUNT_OFFSET + 4]
                .try_into()
                .unwrap(),
        );
        let body_length = u32::from_be_bytes(
            buffer[BODY_LENGTH_OFFSET..BODY_LENGTH_OFFSET + 4]
                .try_into()
                .unwrap(),
        );

        Ok(PacketHeader {
            u_timestamp,
            packet_index,
            packet_count,
            body_length,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn round_trip() {
        let header = PacketHeader {
            u_timestamp: 0x0102_0304_0506_0708,
            packet_index: 7,
            packet_count: 42,
            body_length: 1350,
        };
        let mut buf = [0u8; HEADER_LENGTH];
        header.encode(&mut buf);
        assert_eq!(PacketHeader::decode(&buf).unwrap(), header);
    }

    #[test]
    fn decode_rejects_short_buffer() {
        let buf = [0u8; HEADER_LENGTH - 1];
        assert!(matches!(
            PacketHeader::decode(&buf),
            Err(Error::MalformedHeader(_))
        ));
    }

    #[test]
    fn encode_is_big_endian() {
        let header = PacketHeader {
            u_timestamp: 1,
            packet_index: 0,
            packet_count: 1,
            body_length: 0,
        };
        let mut buf = [0u8; HEADER_LENGTH];
        header.encode(&mut buf);
        assert_eq!(&buf[0..8], &[0, 0, 0, 0, 0, 0, 0, 1]);
    }
}
