//! Per-encoding character decoding over a byte window
//!
//! These decoders exist to feed the line-ending scan, so they work on code
//! units rather than full Unicode scalars: UTF-16 surrogate pairs come out
//! as two separate units and malformed input simply ends the stream.

use crate::Encoding;

/// Byte order of a UTF-16 stream
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ByteOrder {
    /// Most significant byte first
    BigEndian,
    /// Least significant byte first
    LittleEndian,
}

impl ByteOrder {
    /// Combine two bytes, in stream order, into a code unit
    #[inline]
    pub fn unit(self, pair: [u8; 2]) -> u16 {
        match self {
            ByteOrder::BigEndian => u16::from_be_bytes(pair),
            ByteOrder::LittleEndian => u16::from_le_bytes(pair),
        }
    }

    /// Split a code unit into two bytes in stream order
    #[inline]
    pub fn bytes(self, unit: u16) -> [u8; 2] {
        match self {
            ByteOrder::BigEndian => unit.to_be_bytes(),
            ByteOrder::LittleEndian => unit.to_le_bytes(),
        }
    }

    /// The byte-order mark announcing this order
    pub fn bom(self) -> [u8; 2] {
        self.bytes(0xFEFF)
    }
}

/// Number of continuation bytes that follow a UTF-8 lead byte.
///
/// Returns `Some(0)` for bytes with the high bit clear, `None` for
/// continuation bytes (10xxxxxx) and for 0xFE/0xFF, which cannot start a
/// sequence. Leads of up to six bytes total are accepted.
#[inline]
pub fn utf8_sequence_len(lead: u8) -> Option<usize> {
    match lead.leading_ones() {
        0 => Some(0),
        n @ 2..=6 => Some(n as usize - 1),
        _ => None,
    }
}

/// Is `byte` a UTF-8 continuation byte (10xxxxxx)?
#[inline]
pub fn is_utf8_continuation(byte: u8) -> bool {
    byte & 0xC0 == 0x80
}

/// Read position within a byte window
#[derive(Debug, Clone)]
pub struct Cursor<'a> {
    bytes: &'a [u8],
    pos: usize,
}

impl<'a> Cursor<'a> {
    /// Cursor at the start of `bytes`
    pub fn new(bytes: &'a [u8]) -> Self {
        Self { bytes, pos: 0 }
    }

    /// Cursor past `bom` if `bytes` begins with it, else at the start
    pub fn after_bom(bytes: &'a [u8], bom: &[u8]) -> Self {
        let pos = if !bom.is_empty() && bytes.starts_with(bom) {
            bom.len()
        } else {
            0
        };
        Self { bytes, pos }
    }

    /// Bytes consumed so far
    pub fn position(&self) -> usize {
        self.pos
    }

    /// Bytes not yet consumed
    pub fn remaining(&self) -> &'a [u8] {
        &self.bytes[self.pos..]
    }

    /// Nothing left to decode
    pub fn is_at_end(&self) -> bool {
        self.pos >= self.bytes.len()
    }

    fn next_byte(&mut self) -> Option<u8> {
        let byte = *self.bytes.get(self.pos)?;
        self.pos += 1;
        Some(byte)
    }

    fn next_pair(&mut self) -> Option<[u8; 2]> {
        match self.remaining() {
            [a, b, ..] => {
                let pair = [*a, *b];
                self.pos += 2;
                Some(pair)
            }
            _ => None,
        }
    }
}

impl Encoding {
    /// Decode the next character at `cursor`, advancing it past the bytes
    /// used. `None` means the stream is over: either the window is
    /// exhausted or the next sequence is malformed. Callers stop either way.
    pub fn decode_next(self, cursor: &mut Cursor<'_>) -> Option<u32> {
        match self {
            Encoding::Ascii | Encoding::Iso8859_1 | Encoding::ExtendedAscii => {
                cursor.next_byte().map(u32::from)
            }
            Encoding::Utf8 | Encoding::Utf8Bom => decode_utf8(cursor),
            Encoding::Utf16Be => decode_utf16(cursor, ByteOrder::BigEndian),
            Encoding::Utf16Le => decode_utf16(cursor, ByteOrder::LittleEndian),
            Encoding::Unknown => None,
        }
    }
}

fn decode_utf8(cursor: &mut Cursor<'_>) -> Option<u32> {
    let lead = cursor.next_byte()?;
    let following = utf8_sequence_len(lead)?;
    if following == 0 {
        return Some(u32::from(lead));
    }

    // The lead carries 6 - following payload bits.
    let mut c = u32::from(lead) & ((1 << (6 - following)) - 1);
    for _ in 0..following {
        let byte = cursor.next_byte()?;
        if !is_utf8_continuation(byte) {
            return None;
        }
        c = (c << 6) | u32::from(byte & 0x3F);
    }
    Some(c)
}

fn decode_utf16(cursor: &mut Cursor<'_>, order: ByteOrder) -> Option<u32> {
    cursor.next_pair().map(|pair| u32::from(order.unit(pair)))
}
