//! # encsniff - Cheap Encoding and Line-Ending Labels for Files
//!
//! A small heuristic classifier that tells a file manager which character
//! encoding and which line terminator a file most likely uses, and that can
//! rewrite the file into another encoding on request.
//!
//! ## Features
//!
//! - **Ordered detection**: a fixed catalog of candidate encodings is tried
//!   in priority order and the first match wins
//! - **Bounded inspection**: sniffing only ever looks at the first 256 KiB
//! - **Line-ending detection** on decoded characters (LF, CR+LF, CR, LS, NEL)
//! - **Cooperative cancellation** polled once per unit of scan work
//! - **Safe recoding**: the original is only overwritten after the whole
//!   file converted cleanly
//!
//! ## Quick Start
//!
//! ```rust
//! use encsniff::{AbortSignal, Encoding, EncodingDetector, LineEnding};
//!
//! let detector = EncodingDetector::new();
//! let abort = AbortSignal::new();
//!
//! let sniff = detector.sniff(b"hello\r\nworld", &abort).unwrap();
//! assert_eq!(sniff.encoding, Encoding::Ascii);
//! assert_eq!(sniff.line_ending, LineEnding::CrLf);
//! ```

#![deny(missing_docs)]

use std::fmt;
use std::io;
use std::path::PathBuf;

pub mod abort;
pub mod cache;
pub mod config;
pub mod decode;
pub mod detection;
pub mod inspector;
pub mod line_ending;
pub mod recode;
pub mod tables;
pub mod translator;
pub mod window;

pub use abort::AbortSignal;
pub use cache::{Field, ResultCache};
pub use config::Config;
pub use detection::{EncodingDetector, Sniff};
pub use inspector::Inspector;
pub use line_ending::{LineEnding, find_line_ending};
pub use recode::{RecodeReport, Recoder};
pub use translator::{Charset, Convert, Progress, Translator};
pub use window::ByteWindow;

/// Result type for sniffing and recoding operations
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur while sniffing or recoding a file
#[derive(Debug)]
pub enum Error {
    /// I/O error while mapping, reading, or writing a file
    Io(io::Error),
    /// The file has no content to inspect
    EmptyFile(PathBuf),
    /// Encoding cannot be used as a recode source or target
    NotTranscodable {
        /// Display name of the encoding
        encoding: &'static str,
    },
    /// No converter exists between the two encodings
    UnsupportedConversion {
        /// Source encoding name
        from: String,
        /// Target encoding name
        to: String,
    },
    /// Byte value cannot be represented in the source encoding
    UnmappableSource {
        /// The unmappable byte value
        byte: u8,
        /// Position of the byte in the input stream
        position: u64,
    },
    /// Character cannot be encoded in the target encoding
    UnmappableTarget {
        /// The unmappable character
        character: char,
        /// Position of the character in the input stream
        position: u64,
    },
    /// Malformed multibyte sequence in the source data
    InvalidInput {
        /// Position of the first byte of the sequence
        position: u64,
        /// What was wrong with it
        reason: &'static str,
    },
    /// Input ended in the middle of a multibyte sequence
    IncompleteInput {
        /// Number of bytes left over
        pending: usize,
    },
    /// Converter neither consumed input nor produced output
    Stalled {
        /// Input position where conversion stopped
        position: u64,
    },
    /// Catalog index out of range
    NoSuchEncoding(usize),
    /// The field cannot be edited
    ReadOnlyField(&'static str),
    /// Configuration could not be loaded
    Config(String),
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Error::Io(err) => write!(f, "I/O error: {}", err),
            Error::EmptyFile(path) => write!(f, "File is empty: {}", path.display()),
            Error::NotTranscodable { encoding } => {
                write!(f, "Encoding {} cannot be converted", encoding)
            }
            Error::UnsupportedConversion { from, to } => {
                write!(f, "Unsupported conversion from {} to {}", from, to)
            }
            Error::UnmappableSource { byte, position } => {
                write!(
                    f,
                    "Unmappable source byte 0x{:02X} at position {}",
                    byte, position
                )
            }
            Error::UnmappableTarget {
                character,
                position,
            } => {
                write!(
                    f,
                    "Cannot encode character {:?} (U+{:04X}) at position {}",
                    character, *character as u32, position
                )
            }
            Error::InvalidInput { position, reason } => {
                write!(f, "Invalid input at position {}: {}", position, reason)
            }
            Error::IncompleteInput { pending } => {
                write!(f, "Input ends inside a sequence ({} bytes left over)", pending)
            }
            Error::Stalled { position } => {
                write!(f, "Conversion made no progress at position {}", position)
            }
            Error::NoSuchEncoding(index) => write!(f, "No encoding with index {}", index),
            Error::ReadOnlyField(name) => write!(f, "Field {:?} cannot be changed", name),
            Error::Config(msg) => write!(f, "Invalid configuration: {}", msg),
        }
    }
}

impl std::error::Error for Error {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Error::Io(err) => Some(err),
            _ => None,
        }
    }
}

impl From<io::Error> for Error {
    fn from(err: io::Error) -> Self {
        Error::Io(err)
    }
}

/// The candidate encodings, in detection priority order
///
/// Each variant is one catalog entry. Detection tries them in the order of
/// [`Encoding::CATALOG`] and reports the first that matches, so an earlier
/// entry shadows a later one whenever both would accept the same bytes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Encoding {
    /// 7-bit ASCII
    Ascii,
    /// UTF-8 starting with the EF BB BF byte-order mark
    Utf8Bom,
    /// UTF-8 without a byte-order mark
    Utf8,
    /// UTF-16, big endian, starting with FE FF
    Utf16Be,
    /// UTF-16, little endian, starting with FF FE
    Utf16Le,
    /// ISO-8859-1 (Latin-1)
    Iso8859_1,
    /// Some non-ISO extended ASCII code page; cannot be recoded
    ExtendedAscii,
    /// Nothing else matched; cannot be recoded
    Unknown,
}

impl Encoding {
    /// Every encoding, in detection priority order. `Unknown` is last and
    /// matches anything, so detection always finds an entry.
    pub const CATALOG: [Encoding; 8] = [
        Encoding::Ascii,
        Encoding::Utf8Bom,
        Encoding::Utf8,
        Encoding::Utf16Be,
        Encoding::Utf16Le,
        Encoding::Iso8859_1,
        Encoding::ExtendedAscii,
        Encoding::Unknown,
    ];

    /// Name shown to the user
    pub fn name(self) -> &'static str {
        match self {
            Encoding::Ascii => "ASCII",
            Encoding::Utf8Bom => "UTF-8 BOM",
            Encoding::Utf8 => "UTF-8",
            Encoding::Utf16Be => "UTF-16BE",
            Encoding::Utf16Le => "UTF-16LE",
            Encoding::Iso8859_1 => "ISO-8859-1",
            Encoding::ExtendedAscii => "Extended ASCII",
            Encoding::Unknown => "Unknown",
        }
    }

    /// Name of the converter charset, or `None` if this encoding cannot take
    /// part in a recode
    pub fn transcoder_name(self) -> Option<&'static str> {
        match self {
            Encoding::Ascii => Some("ASCII"),
            Encoding::Utf8Bom | Encoding::Utf8 => Some("UTF-8"),
            Encoding::Utf16Be => Some("UTF-16BE"),
            Encoding::Utf16Le => Some("UTF-16LE"),
            Encoding::Iso8859_1 => Some("ISO-8859-1"),
            Encoding::ExtendedAscii | Encoding::Unknown => None,
        }
    }

    /// Byte-order mark written at the start of files in this encoding
    pub fn bom(self) -> &'static [u8] {
        match self {
            Encoding::Utf8Bom => &[0xEF, 0xBB, 0xBF],
            Encoding::Utf16Be => &[0xFE, 0xFF],
            Encoding::Utf16Le => &[0xFF, 0xFE],
            _ => &[],
        }
    }

    /// Position of this encoding in [`Encoding::CATALOG`]
    pub fn index(self) -> usize {
        self as usize
    }

    /// Catalog entry at `index`
    pub fn from_index(index: usize) -> Option<Encoding> {
        Encoding::CATALOG.get(index).copied()
    }

    /// Look up an encoding by display name, converter name, or common alias.
    /// Matching ignores case. Plain "UTF-8" means the variant without BOM.
    pub fn from_name(name: &str) -> Option<Encoding> {
        let wanted = name.trim().to_ascii_uppercase();
        let found = match wanted.as_str() {
            "ASCII" | "US-ASCII" => Encoding::Ascii,
            "UTF-8 BOM" | "UTF-8-BOM" | "UTF8BOM" | "UTF-8 / BOM" => Encoding::Utf8Bom,
            "UTF-8" | "UTF8" => Encoding::Utf8,
            "UTF-16BE" | "UTF16BE" => Encoding::Utf16Be,
            "UTF-16LE" | "UTF16LE" => Encoding::Utf16Le,
            "ISO-8859-1" | "ISO88591" | "ISO-8859" | "LATIN1" | "LATIN-1" => {
                Encoding::Iso8859_1
            }
            "EXTENDED ASCII" | "EXTENDED-ASCII" | "ASCII++" => Encoding::ExtendedAscii,
            "UNKNOWN" => Encoding::Unknown,
            _ => return None,
        };
        Some(found)
    }
}

impl fmt::Display for Encoding {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_catalog_order() {
        let names: Vec<_> = Encoding::CATALOG.iter().map(|e| e.name()).collect();
        assert_eq!(
            names,
            [
                "ASCII",
                "UTF-8 BOM",
                "UTF-8",
                "UTF-16BE",
                "UTF-16LE",
                "ISO-8859-1",
                "Extended ASCII",
                "Unknown"
            ]
        );
        for (i, encoding) in Encoding::CATALOG.iter().enumerate() {
            assert_eq!(encoding.index(), i);
            assert_eq!(Encoding::from_index(i), Some(*encoding));
        }
        assert_eq!(Encoding::from_index(Encoding::CATALOG.len()), None);
    }

    #[test]
    fn test_boms() {
        assert_eq!(Encoding::Utf8Bom.bom(), [0xEF, 0xBB, 0xBF]);
        assert_eq!(Encoding::Utf16Be.bom(), [0xFE, 0xFF]);
        assert_eq!(Encoding::Utf16Le.bom(), [0xFF, 0xFE]);
        for encoding in [
            Encoding::Ascii,
            Encoding::Utf8,
            Encoding::Iso8859_1,
            Encoding::ExtendedAscii,
            Encoding::Unknown,
        ] {
            assert!(encoding.bom().is_empty(), "{encoding}");
        }
    }

    #[test]
    fn test_transcoder_names() {
        assert_eq!(Encoding::Utf8Bom.transcoder_name(), Some("UTF-8"));
        assert_eq!(Encoding::Utf8.transcoder_name(), Some("UTF-8"));
        assert_eq!(Encoding::ExtendedAscii.transcoder_name(), None);
        assert_eq!(Encoding::Unknown.transcoder_name(), None);
    }

    #[test]
    fn test_from_name() {
        assert_eq!(Encoding::from_name("utf-16le"), Some(Encoding::Utf16Le));
        assert_eq!(Encoding::from_name("Latin1"), Some(Encoding::Iso8859_1));
        assert_eq!(Encoding::from_name("utf-8 bom"), Some(Encoding::Utf8Bom));
        assert_eq!(Encoding::from_name("utf-8"), Some(Encoding::Utf8));
        assert_eq!(Encoding::from_name("ebcdic"), None);
        for encoding in Encoding::CATALOG {
            assert_eq!(Encoding::from_name(encoding.name()), Some(encoding));
        }
    }
}
