//! Streaming charset conversion for recoding
//!
//! A [`Translator`] converts between the charsets that catalog entries can
//! be recoded from and to. It works in bounded steps: each call to
//! [`Convert::convert`] translates as much input as fits in the caller's
//! output buffer. A sequence split across two calls is held back until the
//! rest arrives; [`Convert::flush`] reports one that never does.

use crate::{Encoding, Error, Result};

/// Longest sequence any supported charset uses for one character
const MAX_SEQUENCE: usize = 4;

/// Outcome of one conversion step
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Progress {
    /// Input bytes used up, including bytes held back for the next call
    pub consumed: usize,
    /// Output bytes written to the start of the output buffer
    pub produced: usize,
}

/// A resumable converter from one byte encoding to another
pub trait Convert {
    /// Translate a prefix of `input` into `output`.
    ///
    /// Stops when the input is used up or the next character does not fit
    /// in what is left of `output`. Any error ends the conversion.
    fn convert(&mut self, input: &[u8], output: &mut [u8]) -> Result<Progress>;

    /// Finish the stream, writing any trailing output. Fails if input
    /// stopped partway through a character.
    fn flush(&mut self, output: &mut [u8]) -> Result<usize>;
}

/// Charsets the converter can read and write
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Charset {
    /// 7-bit ASCII
    Ascii,
    /// UTF-8
    Utf8,
    /// UTF-16, big endian
    Utf16Be,
    /// UTF-16, little endian
    Utf16Le,
    /// ISO-8859-1
    Latin1,
}

impl Charset {
    /// Resolve a converter charset name, ignoring case
    pub fn from_name(name: &str) -> Option<Charset> {
        let charset = match name.to_ascii_uppercase().as_str() {
            "ASCII" | "US-ASCII" => Charset::Ascii,
            "UTF-8" | "UTF8" => Charset::Utf8,
            "UTF-16BE" => Charset::Utf16Be,
            "UTF-16LE" => Charset::Utf16Le,
            "ISO-8859-1" | "LATIN1" => Charset::Latin1,
            _ => return None,
        };
        Some(charset)
    }

    /// Canonical name
    pub fn name(self) -> &'static str {
        match self {
            Charset::Ascii => "ASCII",
            Charset::Utf8 => "UTF-8",
            Charset::Utf16Be => "UTF-16BE",
            Charset::Utf16Le => "UTF-16LE",
            Charset::Latin1 => "ISO-8859-1",
        }
    }

    fn decode(self, bytes: &[u8]) -> Decoded {
        let Some(&first) = bytes.first() else {
            return Decoded::Incomplete;
        };
        match self {
            Charset::Ascii if first < 0x80 => Decoded::Char(char::from(first), 1),
            Charset::Ascii => Decoded::Unmappable(first),
            Charset::Latin1 => Decoded::Char(char::from(first), 1),
            Charset::Utf8 => decode_utf8(bytes),
            Charset::Utf16Be => decode_utf16(bytes, u16::from_be_bytes),
            Charset::Utf16Le => decode_utf16(bytes, u16::from_le_bytes),
        }
    }

    fn encode(self, c: char, out: &mut [u8; MAX_SEQUENCE]) -> Option<usize> {
        match self {
            Charset::Ascii if c.is_ascii() => {
                out[0] = c as u8;
                Some(1)
            }
            Charset::Latin1 if (c as u32) <= 0xFF => {
                out[0] = c as u8;
                Some(1)
            }
            Charset::Ascii | Charset::Latin1 => None,
            Charset::Utf8 => Some(c.encode_utf8(out).len()),
            Charset::Utf16Be => Some(encode_utf16(c, out, u16::to_be_bytes)),
            Charset::Utf16Le => Some(encode_utf16(c, out, u16::to_le_bytes)),
        }
    }
}

enum Decoded {
    Char(char, usize),
    Incomplete,
    Unmappable(u8),
    Invalid(&'static str),
}

fn decode_utf8(bytes: &[u8]) -> Decoded {
    let len = match bytes[0] {
        0x00..=0x7F => 1,
        0xC2..=0xDF => 2,
        0xE0..=0xEF => 3,
        0xF0..=0xF4 => 4,
        _ => return Decoded::Invalid("invalid UTF-8 lead byte"),
    };
    if bytes.len() < len {
        if bytes[1..].iter().any(|&b| b & 0xC0 != 0x80) {
            return Decoded::Invalid("truncated UTF-8 sequence");
        }
        return Decoded::Incomplete;
    }
    match std::str::from_utf8(&bytes[..len]) {
        Ok(s) => match s.chars().next() {
            Some(c) => Decoded::Char(c, len),
            None => Decoded::Invalid("malformed UTF-8 sequence"),
        },
        Err(_) => Decoded::Invalid("malformed UTF-8 sequence"),
    }
}

fn decode_utf16(bytes: &[u8], unit: fn([u8; 2]) -> u16) -> Decoded {
    let [a, b, rest @ ..] = bytes else {
        return Decoded::Incomplete;
    };
    let first = unit([*a, *b]);
    match first {
        0xD800..=0xDBFF => {
            let [c, d, ..] = rest else {
                return Decoded::Incomplete;
            };
            let second = unit([*c, *d]);
            if !(0xDC00..=0xDFFF).contains(&second) {
                return Decoded::Invalid("unpaired UTF-16 high surrogate");
            }
            let scalar = 0x10000 + ((u32::from(first) - 0xD800) << 10) + (u32::from(second) - 0xDC00);
            match char::from_u32(scalar) {
                Some(c) => Decoded::Char(c, 4),
                None => Decoded::Invalid("invalid UTF-16 surrogate pair"),
            }
        }
        0xDC00..=0xDFFF => Decoded::Invalid("unpaired UTF-16 low surrogate"),
        _ => match char::from_u32(u32::from(first)) {
            Some(c) => Decoded::Char(c, 2),
            None => Decoded::Invalid("invalid UTF-16 code unit"),
        },
    }
}

fn encode_utf16(c: char, out: &mut [u8; MAX_SEQUENCE], bytes: fn(u16) -> [u8; 2]) -> usize {
    let mut units = [0u16; 2];
    let units = c.encode_utf16(&mut units);
    for (i, unit) in units.iter().enumerate() {
        out[i * 2..i * 2 + 2].copy_from_slice(&bytes(*unit));
    }
    units.len() * 2
}

enum Step {
    Done { read: usize, written: usize },
    Incomplete,
    OutputFull,
}

/// Converter between two [`Charset`]s
#[derive(Debug, Clone)]
pub struct Translator {
    from: Charset,
    to: Charset,
    /// Start of a character whose remaining bytes have not arrived yet
    pending: Vec<u8>,
    /// Input bytes fully converted so far
    position: u64,
}

impl Translator {
    /// Create a translator between two catalog encodings. Fails for
    /// encodings that have no converter charset.
    pub fn new(from: Encoding, to: Encoding) -> Result<Self> {
        let from_name = from.transcoder_name().ok_or(Error::NotTranscodable {
            encoding: from.name(),
        })?;
        let to_name = to.transcoder_name().ok_or(Error::NotTranscodable {
            encoding: to.name(),
        })?;
        Self::open(from_name, to_name)
    }

    /// Create a translator between two charsets given by name
    pub fn open(from: &str, to: &str) -> Result<Self> {
        match (Charset::from_name(from), Charset::from_name(to)) {
            (Some(from), Some(to)) => Ok(Self::between(from, to)),
            _ => Err(Error::UnsupportedConversion {
                from: from.to_string(),
                to: to.to_string(),
            }),
        }
    }

    /// Create a translator between two known charsets
    pub fn between(from: Charset, to: Charset) -> Self {
        Self {
            from,
            to,
            pending: Vec::with_capacity(MAX_SEQUENCE),
            position: 0,
        }
    }

    /// Get source charset
    pub fn from_charset(&self) -> Charset {
        self.from
    }

    /// Get target charset
    pub fn to_charset(&self) -> Charset {
        self.to
    }

    /// Convert a complete buffer in one go
    pub fn convert_all(&mut self, input: &[u8]) -> Result<Vec<u8>> {
        let mut output = Vec::with_capacity(input.len());
        let mut buffer = [0u8; 4096];
        let mut rest = input;

        while !rest.is_empty() {
            let progress = self.convert(rest, &mut buffer)?;
            output.extend_from_slice(&buffer[..progress.produced]);
            rest = &rest[progress.consumed..];
        }
        let flushed = self.flush(&mut buffer)?;
        output.extend_from_slice(&buffer[..flushed]);

        Ok(output)
    }

    fn step(&self, bytes: &[u8], out: &mut [u8]) -> Result<Step> {
        match self.from.decode(bytes) {
            Decoded::Char(c, read) => {
                let mut encoded = [0u8; MAX_SEQUENCE];
                let written = self.to.encode(c, &mut encoded).ok_or(Error::UnmappableTarget {
                    character: c,
                    position: self.position,
                })?;
                if written > out.len() {
                    return Ok(Step::OutputFull);
                }
                out[..written].copy_from_slice(&encoded[..written]);
                Ok(Step::Done { read, written })
            }
            Decoded::Incomplete => Ok(Step::Incomplete),
            Decoded::Unmappable(byte) => Err(Error::UnmappableSource {
                byte,
                position: self.position,
            }),
            Decoded::Invalid(reason) => Err(Error::InvalidInput {
                position: self.position,
                reason,
            }),
        }
    }

    /// Try to complete the held-back character with the head of `input`
    fn resume(&mut self, input: &[u8], output: &mut [u8]) -> Result<Option<Progress>> {
        let carried = self.pending.len();
        let mut joined = self.pending.clone();
        joined.extend_from_slice(&input[..input.len().min(MAX_SEQUENCE - 1)]);

        match self.step(&joined, output)? {
            Step::Done { read, written } => {
                self.pending.clear();
                self.position += read as u64;
                Ok(Some(Progress {
                    consumed: read - carried,
                    produced: written,
                }))
            }
            Step::Incomplete => {
                let consumed = joined.len() - carried;
                self.pending = joined;
                Ok(Some(Progress {
                    consumed,
                    produced: 0,
                }))
            }
            Step::OutputFull => Ok(None),
        }
    }
}

impl Convert for Translator {
    fn convert(&mut self, input: &[u8], output: &mut [u8]) -> Result<Progress> {
        let mut progress = Progress::default();

        if !self.pending.is_empty() {
            match self.resume(input, output)? {
                Some(resumed) if self.pending.is_empty() => progress = resumed,
                Some(absorbed) => return Ok(absorbed),
                None => return Ok(progress),
            }
        }

        while progress.consumed < input.len() {
            let rest = &input[progress.consumed..];
            match self.step(rest, &mut output[progress.produced..])? {
                Step::Done { read, written } => {
                    progress.consumed += read;
                    progress.produced += written;
                    self.position += read as u64;
                }
                Step::Incomplete => {
                    self.pending.extend_from_slice(rest);
                    progress.consumed = input.len();
                }
                Step::OutputFull => break,
            }
        }

        Ok(progress)
    }

    fn flush(&mut self, _output: &mut [u8]) -> Result<usize> {
        if !self.pending.is_empty() {
            return Err(Error::IncompleteInput {
                pending: self.pending.len(),
            });
        }
        Ok(0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn convert(from: Encoding, to: Encoding, input: &[u8]) -> Result<Vec<u8>> {
        Translator::new(from, to)?.convert_all(input)
    }

    #[test]
    fn test_latin1_to_utf8() {
        let output = convert(Encoding::Iso8859_1, Encoding::Utf8, b"caf\xE9").unwrap();
        assert_eq!(output, "caf\u{e9}".as_bytes());
    }

    #[test]
    fn test_utf8_to_latin1_unmappable() {
        let err = convert(Encoding::Utf8, Encoding::Iso8859_1, "a\u{20AC}".as_bytes()).unwrap_err();
        assert!(matches!(
            err,
            Error::UnmappableTarget {
                character: '\u{20AC}',
                position: 1
            }
        ));
    }

    #[test]
    fn test_ascii_rejects_high_bytes() {
        let err = convert(Encoding::Ascii, Encoding::Utf8, b"ab\xE9").unwrap_err();
        assert!(matches!(
            err,
            Error::UnmappableSource {
                byte: 0xE9,
                position: 2
            }
        ));
    }

    #[test]
    fn test_utf16_endianness_conversion() {
        // "Hi" in UTF-16LE
        let le_input = [0x48, 0x00, 0x69, 0x00];
        let be_output = convert(Encoding::Utf16Le, Encoding::Utf16Be, &le_input).unwrap();
        assert_eq!(be_output, [0x00, 0x48, 0x00, 0x69]);
    }

    #[test]
    fn test_utf8_to_utf16_surrogates() {
        let input = "a\u{1F600}";
        let output = convert(Encoding::Utf8, Encoding::Utf16Le, input.as_bytes()).unwrap();
        assert_eq!(output, [0x61, 0x00, 0x3D, 0xD8, 0x00, 0xDE]);

        let back = convert(Encoding::Utf16Le, Encoding::Utf8, &output).unwrap();
        assert_eq!(back, input.as_bytes());
    }

    #[test]
    fn test_unpaired_surrogate() {
        let err = convert(Encoding::Utf16Be, Encoding::Utf8, &[0xDC, 0x00]).unwrap_err();
        assert!(matches!(err, Error::InvalidInput { position: 0, .. }));
    }

    #[test]
    fn test_not_transcodable() {
        let err = Translator::new(Encoding::ExtendedAscii, Encoding::Utf8).unwrap_err();
        assert!(matches!(err, Error::NotTranscodable { encoding: "Extended ASCII" }));
        let err = Translator::new(Encoding::Utf8, Encoding::Unknown).unwrap_err();
        assert!(matches!(err, Error::NotTranscodable { encoding: "Unknown" }));
    }

    #[test]
    fn test_open_by_name() {
        let translator = Translator::open("utf-8", "ISO-8859-1").unwrap();
        assert_eq!(translator.from_charset(), Charset::Utf8);
        assert_eq!(translator.to_charset(), Charset::Latin1);
        assert!(matches!(
            Translator::open("UTF-8", "EBCDIC"),
            Err(Error::UnsupportedConversion { .. })
        ));
    }

    #[test]
    fn test_sequence_split_across_calls() {
        let mut translator = Translator::new(Encoding::Utf8, Encoding::Utf16Be).unwrap();
        let bytes = "\u{20AC}".as_bytes(); // E2 82 AC
        let mut out = [0u8; 16];

        let first = translator.convert(&bytes[..1], &mut out).unwrap();
        assert_eq!(first, Progress { consumed: 1, produced: 0 });

        let second = translator.convert(&bytes[1..], &mut out).unwrap();
        assert_eq!(second, Progress { consumed: 2, produced: 2 });
        assert_eq!(&out[..2], [0x20, 0xAC]);
        assert_eq!(translator.flush(&mut out).unwrap(), 0);
    }

    #[test]
    fn test_flush_reports_truncated_input() {
        let mut translator = Translator::new(Encoding::Utf8, Encoding::Utf16Le).unwrap();
        let mut out = [0u8; 16];
        let progress = translator.convert(b"a\xE2\x82", &mut out).unwrap();
        assert_eq!(progress, Progress { consumed: 3, produced: 2 });

        let err = translator.flush(&mut out).unwrap_err();
        assert!(matches!(err, Error::IncompleteInput { pending: 2 }));
    }

    #[test]
    fn test_stops_when_output_full() {
        let mut translator = Translator::new(Encoding::Iso8859_1, Encoding::Utf8).unwrap();
        let mut out = [0u8; 3];
        // Each byte becomes two bytes; only one fits.
        let progress = translator.convert(b"\xE9\xE9", &mut out).unwrap();
        assert_eq!(progress, Progress { consumed: 1, produced: 2 });
    }
}
