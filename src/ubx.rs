//! # UBX Packet Codec
//!
//! Builds the binary command packets sent to a u-blox receiver and reads back the
//! acknowledgements it answers with.
//!
//! ```text
//!  +------+------+-------+----+--------+---------------+------+------+
//!  | 0xB5 | 0x62 | class | id | len LE | payload (len) | ck_a | ck_b |
//!  +------+------+-------+----+--------+---------------+------+------+
//! ```
//!
//! The checksum covers class, id, length and payload, never the sync pair.
//!
//! ```rust
//! use nmea0183_gnss::ubx::{disable_vtg, set_rate};
//!
//! let mut port = Vec::new();
//! disable_vtg().write_to(&mut port).unwrap();
//! set_rate(5, 1).unwrap().write_to(&mut port).unwrap();
//!
//! assert_eq!(&port[..11], &[0xB5, 0x62, 0x06, 0x01, 0x03, 0x00, 0xF0, 0x05, 0x00, 0xFF, 0x19]);
//! assert_eq!(port.len(), 11 + 14);
//! ```

use log::trace;
use nom::{
    Parser,
    bytes::complete::take,
    number::complete::{le_u16, u8},
};

use crate::{ByteSink, UbxError};

pub const SYNC_CHAR_1: u8 = 0xB5;
pub const SYNC_CHAR_2: u8 = 0x62;

/// Sync pair, class, id and the two length bytes
pub const HEADER_LEN: usize = 6;
pub const CHECKSUM_LEN: usize = 2;

pub const CLASS_ACK: u8 = 0x05;
pub const ACK_NAK: u8 = 0x00;
pub const ACK_ACK: u8 = 0x01;

pub const CLASS_CFG: u8 = 0x06;
pub const CFG_MSG: u8 = 0x01;
pub const CFG_RATE: u8 = 0x08;

/// Class of the standard NMEA messages in CFG-MSG
pub const CLASS_NMEA: u8 = 0xF0;

/// Fletcher-16 checksum as used by UBX, fed one byte or one slice at a time.
#[derive(Debug, Default, Clone, Copy)]
pub struct UbxChecksum {
    ck_a: u8,
    ck_b: u8,
}

impl UbxChecksum {
    pub const fn new() -> Self {
        Self { ck_a: 0, ck_b: 0 }
    }

    pub fn update(&mut self, bytes: &[u8]) {
        for &byte in bytes {
            self.update_byte(byte);
        }
    }

    pub fn update_byte(&mut self, byte: u8) {
        self.ck_a = self.ck_a.wrapping_add(byte);
        self.ck_b = self.ck_b.wrapping_add(self.ck_a);
    }

    pub fn result(self) -> (u8, u8) {
        (self.ck_a, self.ck_b)
    }
}

/// Checksum of a byte slice in one go.
pub fn ubx_checksum(bytes: &[u8]) -> (u8, u8) {
    let mut checksum = UbxChecksum::new();
    checksum.update(bytes);
    checksum.result()
}

/// One UBX packet, without its framing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UbxPacket {
    class: u8,
    id: u8,
    payload: Vec<u8>,
}

/// A reply to a CFG command.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Ack {
    /// ACK-ACK for the given class and id
    Ack { class: u8, id: u8 },
    /// ACK-NAK for the given class and id
    Nak { class: u8, id: u8 },
}

impl UbxPacket {
    pub fn new(class: u8, id: u8, payload: Vec<u8>) -> Result<Self, UbxError> {
        if payload.len() > usize::from(u16::MAX) {
            return Err(UbxError::PayloadTooLong(payload.len()));
        }

        Ok(Self { class, id, payload })
    }

    pub fn class(&self) -> u8 {
        self.class
    }

    pub fn id(&self) -> u8 {
        self.id
    }

    pub fn payload(&self) -> &[u8] {
        &self.payload
    }

    /// Length on the wire, framing included.
    pub fn len(&self) -> usize {
        HEADER_LEN + self.payload.len() + CHECKSUM_LEN
    }

    /// The complete, ready to send packet.
    pub fn to_bytes(&self) -> Vec<u8> {
        // Bounded by `new`, `parse` and the fixed-size builders
        let len = self.payload.len() as u16;

        let mut bytes = Vec::with_capacity(self.len());
        bytes.extend_from_slice(&[SYNC_CHAR_1, SYNC_CHAR_2, self.class, self.id]);
        bytes.extend_from_slice(&len.to_le_bytes());
        bytes.extend_from_slice(&self.payload);

        let (ck_a, ck_b) = ubx_checksum(&bytes[2..]);
        bytes.extend_from_slice(&[ck_a, ck_b]);
        bytes
    }

    /// Hands the packet to a sink. Nothing is read back; see [`UbxPacket::ack`] for reading
    /// the reply.
    pub fn write_to<S: ByteSink + ?Sized>(&self, sink: &mut S) -> std::io::Result<()> {
        let bytes = self.to_bytes();
        trace!(
            "writing UBX {:#04x}/{:#04x}: {:02X?}",
            self.class, self.id, bytes
        );
        sink.write_bytes(&bytes)
    }

    /// Reads one packet from the front of `bytes`.
    ///
    /// Anything before the sync pair is skipped, NMEA text included. Returns the packet and
    /// the number of bytes consumed, so the caller can drop them and look for the next one.
    pub fn parse(bytes: &[u8]) -> Result<(Self, usize), UbxError> {
        let start = bytes
            .windows(2)
            .position(|w| w == [SYNC_CHAR_1, SYNC_CHAR_2])
            .ok_or(UbxError::Incomplete {
                needed: HEADER_LEN + CHECKSUM_LEN,
            })?;
        let packet = &bytes[start..];

        if packet.len() < HEADER_LEN {
            return Err(UbxError::Incomplete {
                needed: HEADER_LEN + CHECKSUM_LEN - packet.len(),
            });
        }

        let header: nom::IResult<&[u8], (u8, u8, u16)> = (u8, u8, le_u16).parse(&packet[2..]);
        let Ok((rest, (class, id, len))) = header else {
            return Err(UbxError::Incomplete {
                needed: HEADER_LEN + CHECKSUM_LEN - packet.len(),
            });
        };

        let total = HEADER_LEN + usize::from(len) + CHECKSUM_LEN;
        if packet.len() < total {
            return Err(UbxError::Incomplete {
                needed: total - packet.len(),
            });
        }

        let body: nom::IResult<&[u8], (&[u8], u8, u8)> = (take(len), u8, u8).parse(rest);
        let Ok((_, (payload, ck_a, ck_b))) = body else {
            return Err(UbxError::Incomplete {
                needed: total - packet.len(),
            });
        };

        let (expected_a, expected_b) = ubx_checksum(&packet[2..HEADER_LEN + usize::from(len)]);
        if (expected_a, expected_b) != (ck_a, ck_b) {
            return Err(UbxError::InvalidChecksum {
                expected: u16::from_le_bytes([expected_a, expected_b]),
                found: u16::from_le_bytes([ck_a, ck_b]),
            });
        }

        let packet = Self {
            class,
            id,
            payload: payload.to_vec(),
        };
        Ok((packet, start + total))
    }

    /// Interprets the packet as an ACK-ACK or ACK-NAK.
    pub fn ack(&self) -> Option<Ack> {
        let [class, id] = self.payload[..] else {
            return None;
        };

        match (self.class, self.id) {
            (CLASS_ACK, ACK_ACK) => Some(Ack::Ack { class, id }),
            (CLASS_ACK, ACK_NAK) => Some(Ack::Nak { class, id }),
            _ => None,
        }
    }
}

/// Standard NMEA sentences and their CFG-MSG ids in class `0xF0`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum NmeaMessage {
    GGA = 0x00,
    GLL = 0x01,
    GSA = 0x02,
    GSV = 0x03,
    RMC = 0x04,
    VTG = 0x05,
}

impl NmeaMessage {
    pub fn id(self) -> u8 {
        self as u8
    }
}

/// CFG-MSG for the port the command arrives on: emit `msg_class`/`msg_id` once every `rate`
/// navigation solutions, `0` to turn it off.
pub fn cfg_msg(msg_class: u8, msg_id: u8, rate: u8) -> UbxPacket {
    UbxPacket {
        class: CLASS_CFG,
        id: CFG_MSG,
        payload: vec![msg_class, msg_id, rate],
    }
}

/// CFG-MSG with one rate per port: I2C, UART1, UART2, USB, SPI, reserved.
pub fn cfg_msg_all_ports(msg_class: u8, msg_id: u8, rates: [u8; 6]) -> UbxPacket {
    let mut payload = vec![msg_class, msg_id];
    payload.extend_from_slice(&rates);

    UbxPacket {
        class: CLASS_CFG,
        id: CFG_MSG,
        payload,
    }
}

/// Stops the receiver from sending `message` on the current port.
pub fn disable_sentence(message: NmeaMessage) -> UbxPacket {
    cfg_msg(CLASS_NMEA, message.id(), 0)
}

/// `B5 62 06 01 03 00 F0 05 00 FF 19`
pub fn disable_vtg() -> UbxPacket {
    disable_sentence(NmeaMessage::VTG)
}

/// CFG-RATE: one measurement every `1000 / rate_hz` ms, one solution every
/// `measurements_per_solution` measurements, aligned to UTC.
///
/// The period is rounded down to whole milliseconds, so 3 Hz becomes 333 ms.
pub fn set_rate(rate_hz: u16, measurements_per_solution: u16) -> Result<UbxPacket, UbxError> {
    if rate_hz == 0 || rate_hz > 1000 {
        return Err(UbxError::InvalidRate(rate_hz));
    }

    let measurement_ms = 1000 / rate_hz;
    let mut payload = Vec::with_capacity(6);
    payload.extend_from_slice(&measurement_ms.to_le_bytes());
    payload.extend_from_slice(&measurements_per_solution.to_le_bytes());
    // Time reference, 0 = UTC
    payload.extend_from_slice(&[0, 0]);

    Ok(UbxPacket {
        class: CLASS_CFG,
        id: CFG_RATE,
        payload,
    })
}
