use std::borrow::Cow;
use std::collections::HashSet;

use serde::{Deserialize, Serialize};
use tracing::debug;

/// How raw keyword bytes are normalized before submission
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CleaningMode {
    /// Detect the encoding, transcode to UTF-8, strip non-breaking spaces, then trim
    #[default]
    Transcode,
    /// Trim only; bytes that are not UTF-8 are replaced lossily
    TrimOnly,
}

impl std::str::FromStr for CleaningMode {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> anyhow::Result<Self> {
        match s.to_ascii_lowercase().replace('-', "_").as_str() {
            "transcode" => Ok(Self::Transcode),
            "trim_only" | "trim" => Ok(Self::TrimOnly),
            other => Err(anyhow::anyhow!("unknown cleaning mode: {other}")),
        }
    }
}

/// A caller-supplied keyword that may be missing or not yet UTF-8
pub trait RawKeyword {
    /// The keyword bytes, `None` for a null entry
    fn raw_bytes(&self) -> Option<&[u8]>;
}

impl RawKeyword for str {
    fn raw_bytes(&self) -> Option<&[u8]> {
        Some(self.as_bytes())
    }
}

impl RawKeyword for String {
    fn raw_bytes(&self) -> Option<&[u8]> {
        Some(self.as_bytes())
    }
}

impl RawKeyword for [u8] {
    fn raw_bytes(&self) -> Option<&[u8]> {
        Some(self)
    }
}

impl RawKeyword for Vec<u8> {
    fn raw_bytes(&self) -> Option<&[u8]> {
        Some(self)
    }
}

impl<T: RawKeyword + ?Sized> RawKeyword for &T {
    fn raw_bytes(&self) -> Option<&[u8]> {
        (**self).raw_bytes()
    }
}

impl<T: RawKeyword> RawKeyword for Option<T> {
    fn raw_bytes(&self) -> Option<&[u8]> {
        self.as_ref().and_then(RawKeyword::raw_bytes)
    }
}

const NO_BREAK_SPACE: char = '\u{a0}';

// Windows-1252 code points for 0x80..=0x9F; `None` marks the bytes the code
// page leaves undefined, which decode as their ISO-8859-1 control characters.
const WINDOWS_1252_HIGH: [Option<char>; 32] = [
    Some('\u{20ac}'),
    None,
    Some('\u{201a}'),
    Some('\u{0192}'),
    Some('\u{201e}'),
    Some('\u{2026}'),
    Some('\u{2020}'),
    Some('\u{2021}'),
    Some('\u{02c6}'),
    Some('\u{2030}'),
    Some('\u{0160}'),
    Some('\u{2039}'),
    Some('\u{0152}'),
    None,
    Some('\u{017d}'),
    None,
    None,
    Some('\u{2018}'),
    Some('\u{2019}'),
    Some('\u{201c}'),
    Some('\u{201d}'),
    Some('\u{2022}'),
    Some('\u{2013}'),
    Some('\u{2014}'),
    Some('\u{02dc}'),
    Some('\u{2122}'),
    Some('\u{0161}'),
    Some('\u{203a}'),
    Some('\u{0153}'),
    None,
    Some('\u{017e}'),
    Some('\u{0178}'),
];

/// Decode bytes as UTF-8 when valid (which covers ASCII), otherwise as
/// Windows-1252 with ISO-8859-1 for the undefined positions.
#[must_use]
pub fn transcode_to_utf8(bytes: &[u8]) -> Cow<'_, str> {
    if let Ok(text) = std::str::from_utf8(bytes) {
        return Cow::Borrowed(text);
    }
    Cow::Owned(bytes.iter().map(|&b| decode_windows_1252(b)).collect())
}

fn decode_windows_1252(byte: u8) -> char {
    match byte {
        0x80..=0x9f => WINDOWS_1252_HIGH[usize::from(byte - 0x80)].unwrap_or(char::from(byte)),
        _ => char::from(byte),
    }
}

// Space, tab, newline, carriage return, NUL and vertical tab; nothing outside ASCII
const fn is_trimmed_char(c: char) -> bool {
    matches!(c, ' ' | '\t' | '\n' | '\r' | '\0' | '\x0b')
}

fn trim(keyword: &str) -> &str {
    keyword.trim_matches(is_trimmed_char)
}

/// Normalizes raw keyword lists for submission to the ads platform
#[derive(Debug, Clone, Copy, Default)]
pub struct KeywordCleaner {
    mode: CleaningMode,
}

impl KeywordCleaner {
    #[must_use]
    pub const fn new(mode: CleaningMode) -> Self {
        Self { mode }
    }

    #[must_use]
    pub const fn mode(&self) -> CleaningMode {
        self.mode
    }

    /// Clean a keyword list
    ///
    /// Drops null and empty entries, normalizes each keyword according to the
    /// mode, and removes exact duplicates keeping the first occurrence.
    #[must_use]
    pub fn clean<K: RawKeyword>(&self, keywords: &[K]) -> Vec<String> {
        let mut seen = HashSet::new();
        let mut cleaned = Vec::new();

        for bytes in keywords.iter().filter_map(RawKeyword::raw_bytes) {
            if bytes.is_empty() {
                continue;
            }
            let keyword = self.normalize(bytes);
            if keyword.is_empty() || seen.contains(&keyword) {
                continue;
            }
            seen.insert(keyword.clone());
            cleaned.push(keyword);
        }

        debug!(
            mode = ?self.mode,
            submitted = keywords.len(),
            cleaned = cleaned.len(),
            "Cleaned keywords"
        );
        cleaned
    }

    fn normalize(&self, bytes: &[u8]) -> String {
        match self.mode {
            CleaningMode::Transcode => {
                let text = transcode_to_utf8(bytes);
                let text = text.replace(NO_BREAK_SPACE, "");
                trim(&text).to_string()
            }
            CleaningMode::TrimOnly => trim(&String::from_utf8_lossy(bytes)).to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_empty_and_null_inputs() {
        let cleaner = KeywordCleaner::default();
        let empty: [Option<&str>; 0] = [];
        assert!(cleaner.clean(&empty).is_empty());
        assert!(cleaner.clean(&[None::<&str>, None]).is_empty());
        assert!(cleaner.clean(&[Some(""), Some("   ")]).is_empty());
    }

    #[test]
    fn test_case_sensitive_dedup_keeps_first_occurrence() {
        let cleaner = KeywordCleaner::default();
        let cleaned = cleaner.clean(&[Some("loan"), Some("Loan "), None, Some("loan")]);
        assert_eq!(cleaned, vec!["loan".to_string(), "Loan".to_string()]);

        let cleaned = cleaner.clean(&["b", " a", "b ", "c", "a"]);
        assert_eq!(cleaned, vec!["b", "a", "c"]);
    }

    #[test]
    fn test_strips_non_breaking_spaces() {
        let cleaner = KeywordCleaner::default();
        let cleaned = cleaner.clean(&["\u{a0}cheap\u{a0}flights\u{a0}", "cheapflights"]);
        assert_eq!(cleaned, vec!["cheapflights"]);
    }

    #[test]
    fn test_transcodes_windows_1252() {
        let cleaner = KeywordCleaner::new(CleaningMode::Transcode);
        // "café" and "€" encoded as Windows-1252
        let latin: Vec<u8> = vec![b'c', b'a', b'f', 0xe9];
        let euro: Vec<u8> = vec![0x80, b' ', b'p', b'r', b'i', b'c', b'e', b' '];
        let cleaned = cleaner.clean(&[latin, euro, "café".as_bytes().to_vec()]);
        assert_eq!(cleaned, vec!["café", "€ price"]);
    }

    #[test]
    fn test_undefined_windows_1252_bytes_fall_back_to_latin1() {
        assert_eq!(transcode_to_utf8(&[b'x', 0x81]), "x\u{81}");
        assert_eq!(transcode_to_utf8(&[0x93, b'q', 0x94]), "\u{201c}q\u{201d}");
        assert!(matches!(transcode_to_utf8(b"ascii"), Cow::Borrowed("ascii")));
    }

    #[test]
    fn test_trim_only_mode() {
        let cleaner = KeywordCleaner::new(CleaningMode::TrimOnly);
        assert_eq!(cleaner.mode(), CleaningMode::TrimOnly);
        let cleaned = cleaner.clean(&[
            Some(" loan\u{a0}".as_bytes().to_vec()),
            Some(vec![b'c', b'a', b'f', 0xe9]),
            None,
            Some(b"\tloan\x0b".to_vec()),
        ]);
        // Non-breaking spaces are left alone in this mode, even at the edges
        assert_eq!(cleaned, vec!["loan\u{a0}", "caf\u{fffd}", "loan"]);
    }

    #[test]
    fn test_only_ascii_whitespace_is_trimmed() {
        let cleaner = KeywordCleaner::new(CleaningMode::Transcode);
        let cleaned = cleaner.clean(&["loan\u{2003}", "\u{3000}loan", "\r\nloan\0 "]);
        assert_eq!(cleaned, vec!["loan\u{2003}", "\u{3000}loan", "loan"]);

        // Form feed is not part of the trimmed set
        let cleaned = cleaner.clean(&["\x0cloan"]);
        assert_eq!(cleaned, vec!["\x0cloan"]);

        let cleaned = KeywordCleaner::new(CleaningMode::TrimOnly).clean(&["loan\u{a0}", "loan"]);
        assert_eq!(cleaned, vec!["loan\u{a0}", "loan"]);
    }

    #[test]
    fn test_cleaning_mode_parsing() {
        assert_eq!(
            "trim-only".parse::<CleaningMode>().unwrap(),
            CleaningMode::TrimOnly
        );
        assert_eq!(
            "Transcode".parse::<CleaningMode>().unwrap(),
            CleaningMode::Transcode
        );
        assert!("utf16".parse::<CleaningMode>().is_err());
    }
}
