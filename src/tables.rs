//! Byte classification table shared by the single-byte detectors
//!
//! Every byte value falls into exactly one [`ByteCategory`]. The detectors
//! never look at byte values directly; they ask which categories a byte is
//! allowed to be in.

/// Category of a single byte value
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ByteCategory {
    /// Never appears in text of any supported single-byte encoding
    Forbidden,
    /// Printable ASCII, common ASCII control characters, and NEL (0x85)
    AsciiValid,
    /// 0x80..=0x9F (except NEL), used by non-ISO extended ASCII code pages
    ExtendedValid,
    /// 0xA0..=0xFF, the ISO-8859 upper half
    Latin1Valid,
}

use ByteCategory::{AsciiValid as T, ExtendedValid as X, Forbidden as F, Latin1Valid as I};

#[rustfmt::skip]
static BYTE_CATEGORIES: [ByteCategory; 256] = [
    F, F, F, F, F, F, F, T, T, T, T, T, T, T, F, F,
    F, F, F, F, F, F, F, F, F, F, F, T, F, F, F, F,
    T, T, T, T, T, T, T, T, T, T, T, T, T, T, T, T,
    T, T, T, T, T, T, T, T, T, T, T, T, T, T, T, T,
    T, T, T, T, T, T, T, T, T, T, T, T, T, T, T, T,
    T, T, T, T, T, T, T, T, T, T, T, T, T, T, T, T,
    T, T, T, T, T, T, T, T, T, T, T, T, T, T, T, T,
    T, T, T, T, T, T, T, T, T, T, T, T, T, T, T, F,
    X, X, X, X, X, T, X, X, X, X, X, X, X, X, X, X,
    X, X, X, X, X, X, X, X, X, X, X, X, X, X, X, X,
    I, I, I, I, I, I, I, I, I, I, I, I, I, I, I, I,
    I, I, I, I, I, I, I, I, I, I, I, I, I, I, I, I,
    I, I, I, I, I, I, I, I, I, I, I, I, I, I, I, I,
    I, I, I, I, I, I, I, I, I, I, I, I, I, I, I, I,
    I, I, I, I, I, I, I, I, I, I, I, I, I, I, I, I,
    I, I, I, I, I, I, I, I, I, I, I, I, I, I, I, I,
];

/// Look up the category of `byte`
#[inline]
pub fn classify(byte: u8) -> ByteCategory {
    BYTE_CATEGORIES[byte as usize]
}

/// Byte is valid in 7-bit ASCII text
#[inline]
pub fn is_ascii(byte: u8) -> bool {
    classify(byte) == ByteCategory::AsciiValid
}

/// Byte is valid in ISO-8859-1 text
#[inline]
pub fn is_latin1(byte: u8) -> bool {
    matches!(
        classify(byte),
        ByteCategory::AsciiValid | ByteCategory::Latin1Valid
    )
}

/// Byte is valid in some extended ASCII code page (anything but forbidden)
#[inline]
pub fn is_extended_ascii(byte: u8) -> bool {
    classify(byte) != ByteCategory::Forbidden
}
