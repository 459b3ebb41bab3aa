//! Encoding detection by ordered catalog lookup
//!
//! Every [`Encoding`] has a detector that says yes or no for a byte window.
//! Detection walks [`Encoding::CATALOG`] in order and reports the first
//! yes. Detectors are strict and cheap: one pass, no statistics, no
//! confidence scores.

use crate::Encoding;
use crate::abort::AbortSignal;
use crate::decode::{ByteOrder, is_utf8_continuation, utf8_sequence_len};
use crate::line_ending::{LineEnding, find_line_ending};
use crate::tables;

/// Default inspection window, 256 KiB
pub const DEFAULT_SAMPLE_SIZE: usize = 256 * 1024;

const UTF8_BOM: [u8; 3] = [0xEF, 0xBB, 0xBF];

/// Result of sniffing a byte window
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Sniff {
    /// First catalog entry whose detector accepted the window
    pub encoding: Encoding,
    /// First line terminator found when decoding with `encoding`
    pub line_ending: LineEnding,
}

/// Encoding detector over a bounded prefix of the input
#[derive(Debug, Clone)]
pub struct EncodingDetector {
    /// Maximum bytes to analyze for detection
    max_sample_size: usize,
}

impl Default for EncodingDetector {
    fn default() -> Self {
        Self {
            max_sample_size: DEFAULT_SAMPLE_SIZE,
        }
    }
}

impl EncodingDetector {
    /// Create a detector with the default 256 KiB window
    pub fn new() -> Self {
        Self::default()
    }

    /// Create detector with custom sample size
    pub fn with_sample_size(max_sample_size: usize) -> Self {
        Self { max_sample_size }
    }

    /// Maximum bytes inspected per call
    pub fn sample_size(&self) -> usize {
        self.max_sample_size
    }

    fn sample<'a>(&self, data: &'a [u8]) -> &'a [u8] {
        &data[..data.len().min(self.max_sample_size)]
    }

    /// Detect the encoding of `data`.
    ///
    /// Always returns an entry: `Unknown` accepts anything. A raised
    /// `abort` makes every other detector decline, so a cancelled call
    /// also ends at `Unknown`; use [`sniff`](Self::sniff) to tell the two
    /// apart.
    pub fn detect(&self, data: &[u8], abort: &AbortSignal) -> Encoding {
        let sample = self.sample(data);
        Encoding::CATALOG
            .into_iter()
            .find(|encoding| encoding.matches(sample, abort))
            .unwrap_or(Encoding::Unknown)
    }

    /// Detect the encoding and line ending of `data`.
    ///
    /// Returns `None` if `abort` was raised before or during the scan.
    pub fn sniff(&self, data: &[u8], abort: &AbortSignal) -> Option<Sniff> {
        let sample = self.sample(data);
        let encoding = self.detect(sample, abort);
        let line_ending = find_line_ending(sample, encoding, abort);

        if abort.is_requested() {
            log::debug!("sniff of {} byte window cancelled", sample.len());
            return None;
        }

        Some(Sniff {
            encoding,
            line_ending,
        })
    }
}

impl Encoding {
    /// Does this encoding's detector accept `bytes`?
    pub fn matches(self, bytes: &[u8], abort: &AbortSignal) -> bool {
        match self {
            Encoding::Ascii => looks_like(bytes, abort, tables::is_ascii),
            Encoding::Utf8Bom => looks_like_utf8(bytes, abort, true),
            Encoding::Utf8 => looks_like_utf8(bytes, abort, false),
            Encoding::Utf16Be => looks_like_utf16(bytes, abort, ByteOrder::BigEndian),
            Encoding::Utf16Le => looks_like_utf16(bytes, abort, ByteOrder::LittleEndian),
            Encoding::Iso8859_1 => looks_like(bytes, abort, tables::is_latin1),
            Encoding::ExtendedAscii => looks_like(bytes, abort, tables::is_extended_ascii),
            Encoding::Unknown => true,
        }
    }
}

fn looks_like(bytes: &[u8], abort: &AbortSignal, is_valid: impl Fn(u8) -> bool) -> bool {
    bytes
        .iter()
        .all(|&byte| !abort.is_requested() && is_valid(byte))
}

/// UTF-8 check. With `with_bom` the window must start with EF BB BF, which
/// is not scanned; without it at least one multibyte sequence is required
/// so plain ASCII is left to the ASCII detector.
fn looks_like_utf8(bytes: &[u8], abort: &AbortSignal, with_bom: bool) -> bool {
    let body = if with_bom {
        match bytes.strip_prefix(&UTF8_BOM[..]) {
            Some(body) => body,
            None => return false,
        }
    } else {
        bytes
    };

    let mut seen_char = false;
    let mut seen_multibyte = false;
    let mut i = 0;

    while i < body.len() {
        if abort.is_requested() {
            return false;
        }

        let lead = body[i];
        let Some(following) = utf8_sequence_len(lead) else {
            return false;
        };

        if following == 0 {
            if !tables::is_ascii(lead) {
                return false;
            }
            seen_char = true;
            i += 1;
            continue;
        }

        let tail = &body[i + 1..];
        let available = tail.len().min(following);
        if !tail[..available].iter().all(|&b| is_utf8_continuation(b)) {
            return false;
        }
        if available < following {
            // Window cut the last sequence short.
            return seen_char && (with_bom || seen_multibyte);
        }

        seen_char = true;
        seen_multibyte = true;
        i += 1 + following;
    }

    with_bom || seen_multibyte
}

/// UTF-16 check for one byte order. The window must hold whole code units
/// and open with the BOM for `order`. No unit may be a byte-swapped BOM and
/// units below 128 must be valid ASCII. A window whose units all read as
/// ASCII only after swapping their bytes is in the other byte order.
fn looks_like_utf16(bytes: &[u8], abort: &AbortSignal, order: ByteOrder) -> bool {
    if bytes.len() < 2 || bytes.len() % 2 != 0 {
        return false;
    }
    if bytes[..2] != order.bom() {
        return false;
    }

    let mut units = 0usize;
    let mut swapped_ascii = 0usize;

    for pair in bytes[2..].chunks_exact(2) {
        if abort.is_requested() {
            return false;
        }

        let unit = order.unit([pair[0], pair[1]]);
        if unit == 0xFFFE {
            return false;
        }

        units += 1;
        if unit < 128 {
            if !tables::is_ascii(unit as u8) {
                return false;
            }
        } else if unit & 0x00FF == 0 && unit < 0x8000 && tables::is_ascii((unit >> 8) as u8) {
            swapped_ascii += 1;
        }
    }

    swapped_ascii == 0 || swapped_ascii < units
}
