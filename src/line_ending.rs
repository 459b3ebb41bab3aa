//! Line terminator detection on decoded characters

use std::fmt;

use crate::Encoding;
use crate::abort::AbortSignal;
use crate::decode::Cursor;

const CR: u32 = 0x0D;
const LF: u32 = 0x0A;
const NEXT_LINE: u32 = 0x0085;
const LINE_SEPARATOR: u32 = 0x2028;

/// The line terminator a file uses
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum LineEnding {
    /// No terminator found (or the encoding cannot be decoded)
    Unknown,
    /// Line feed, U+000A
    Lf,
    /// Carriage return followed by line feed
    CrLf,
    /// Carriage return alone, U+000D
    Cr,
    /// Unicode line separator, U+2028
    Ls,
    /// Next line, U+0085
    Nel,
}

impl LineEnding {
    /// All kinds, in presentation order
    pub const ALL: [LineEnding; 6] = [
        LineEnding::Unknown,
        LineEnding::Lf,
        LineEnding::CrLf,
        LineEnding::Cr,
        LineEnding::Ls,
        LineEnding::Nel,
    ];

    /// Name shown to the user
    pub fn name(self) -> &'static str {
        match self {
            LineEnding::Unknown => "-",
            LineEnding::Lf => "LF",
            LineEnding::CrLf => "CR+LF",
            LineEnding::Cr => "CR",
            LineEnding::Ls => "LS",
            LineEnding::Nel => "NEL",
        }
    }

    /// Look up a line ending by its display name
    pub fn from_name(name: &str) -> Option<LineEnding> {
        LineEnding::ALL.into_iter().find(|l| l.name() == name)
    }

    fn from_char(c: u32) -> Option<LineEnding> {
        match c {
            CR => Some(LineEnding::Cr),
            LF => Some(LineEnding::Lf),
            NEXT_LINE => Some(LineEnding::Nel),
            LINE_SEPARATOR => Some(LineEnding::Ls),
            _ => None,
        }
    }
}

impl fmt::Display for LineEnding {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Find the first line terminator in `window` decoded as `encoding`.
///
/// The first terminator decides: LF, NEL and LS are returned as soon as
/// they are seen; a CR looks one character ahead for an LF. A leading BOM
/// of `encoding` is skipped. Returns [`LineEnding::Unknown`] when the
/// window runs out, decoding fails, or `abort` is raised.
pub fn find_line_ending(window: &[u8], encoding: Encoding, abort: &AbortSignal) -> LineEnding {
    let mut cursor = Cursor::after_bom(window, encoding.bom());

    while !abort.is_requested() {
        let Some(c) = encoding.decode_next(&mut cursor) else {
            break;
        };

        match LineEnding::from_char(c) {
            None => {}
            Some(LineEnding::Cr) => {
                return match encoding.decode_next(&mut cursor) {
                    Some(LF) => LineEnding::CrLf,
                    _ => LineEnding::Cr,
                };
            }
            Some(found) => return found,
        }
    }

    LineEnding::Unknown
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ascii(bytes: &[u8]) -> LineEnding {
        find_line_ending(bytes, Encoding::Ascii, &AbortSignal::new())
    }

    #[test]
    fn test_ascii_terminators() {
        assert_eq!(ascii(b"a\r\nb"), LineEnding::CrLf);
        assert_eq!(ascii(b"a\rb"), LineEnding::Cr);
        assert_eq!(ascii(b"a\nb"), LineEnding::Lf);
        assert_eq!(ascii(b"abc"), LineEnding::Unknown);
        assert_eq!(ascii(b""), LineEnding::Unknown);
    }

    #[test]
    fn test_first_terminator_wins() {
        assert_eq!(ascii(b"a\nb\r\nc\r\n"), LineEnding::Lf);
        assert_eq!(ascii(b"a\r\rb\n"), LineEnding::Cr);
    }

    #[test]
    fn test_cr_at_end_of_window() {
        assert_eq!(ascii(b"abc\r"), LineEnding::Cr);
    }

    #[test]
    fn test_unicode_terminators() {
        let abort = AbortSignal::new();
        let ls = "one\u{2028}two".as_bytes();
        assert_eq!(find_line_ending(ls, Encoding::Utf8, &abort), LineEnding::Ls);

        let nel = "one\u{85}two".as_bytes();
        assert_eq!(find_line_ending(nel, Encoding::Utf8, &abort), LineEnding::Nel);

        // 0x85 is NEL as a single byte too.
        assert_eq!(
            find_line_ending(b"one\x85two", Encoding::Iso8859_1, &abort),
            LineEnding::Nel
        );
    }

    #[test]
    fn test_utf16_terminators() {
        let abort = AbortSignal::new();
        let be = [0xFE, 0xFF, 0x00, b'a', 0x00, b'\r', 0x00, b'\n'];
        assert_eq!(find_line_ending(&be, Encoding::Utf16Be, &abort), LineEnding::CrLf);

        let le = [0xFF, 0xFE, b'a', 0x00, b'\n', 0x00];
        assert_eq!(find_line_ending(&le, Encoding::Utf16Le, &abort), LineEnding::Lf);

        // A byte-swapped LF is U+0A00, not a terminator.
        let swapped = [0xFE, 0xFF, b'\n', 0x00];
        assert_eq!(
            find_line_ending(&swapped, Encoding::Utf16Be, &abort),
            LineEnding::Unknown
        );
    }

    #[test]
    fn test_malformed_utf8_stops_scan() {
        let bytes = [b'a', 0xC3, b'\n'];
        assert_eq!(
            find_line_ending(&bytes, Encoding::Utf8, &AbortSignal::new()),
            LineEnding::Unknown
        );
    }

    #[test]
    fn test_unknown_encoding_finds_nothing() {
        assert_eq!(
            find_line_ending(b"a\nb", Encoding::Unknown, &AbortSignal::new()),
            LineEnding::Unknown
        );
    }

    #[test]
    fn test_abort_stops_scan() {
        let abort = AbortSignal::new();
        abort.request();
        assert_eq!(find_line_ending(b"a\nb", Encoding::Ascii, &abort), LineEnding::Unknown);
    }

    #[test]
    fn test_names() {
        let names: Vec<_> = LineEnding::ALL.iter().map(|l| l.name()).collect();
        assert_eq!(names, ["-", "LF", "CR+LF", "CR", "LS", "NEL"]);
    }
}
