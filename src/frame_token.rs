//! Frame token detection
//!
//! Finds the frame marker at the end of a file name root:
//!
//! - `shot_0011.exr` → `0011` (concrete frame)
//! - `shot_####.exr` → `####` (hash placeholder)
//! - `shot_%04d.exr` → `%04d` (printf placeholder)
//!
//! Everything here is pure string work. Enumeration of siblings lives in
//! [`crate::pattern`], which injects the listing.

use regex::Regex;
use std::sync::LazyLock;

/// Longest trailing run of digits/hashes, or a single trailing `%0Nd`.
static FRAME_PATTERN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"([0-9#]+|%0[0-9]d)$").expect("frame pattern is valid"));

/// What a frame token is made of
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TokenKind {
    /// `0011`
    Digits,
    /// `####`
    Hashes,
    /// `%04d`
    Printf,
    /// `00#1` - matches the pattern but is neither a frame nor a placeholder
    Mixed,
}

/// Frame token located at the end of a file name root
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FrameToken {
    start: usize,
    text: String,
    kind: TokenKind,
}

impl FrameToken {
    /// Byte offset of the token inside the root it was found in
    pub fn start(&self) -> usize {
        self.start
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn kind(&self) -> TokenKind {
        self.kind
    }

    /// Integer frame number, only for concrete digit tokens.
    ///
    /// Leading zeros are insignificant: `0007` → 7.
    pub fn frame(&self) -> Option<i64> {
        match self.kind {
            TokenKind::Digits => self.text.parse().ok(),
            _ => None,
        }
    }
}

/// Split a path into `(root, ext)` at the final extension separator.
///
/// The extension keeps its dot. Dots in directory names and leading dots of
/// the file name never start an extension: `dir.v2/.hidden` has none.
pub fn split_ext(path: &str) -> (&str, &str) {
    let name_start = path.rfind(is_separator).map_or(0, |i| i + 1);
    let Some(dot) = path.rfind('.') else {
        return (path, "");
    };
    if dot < name_start || path[name_start..dot].chars().all(|c| c == '.') {
        return (path, "");
    }
    path.split_at(dot)
}

fn is_separator(c: char) -> bool {
    c == '/' || c == std::path::MAIN_SEPARATOR
}

/// Find the frame token at the end of `root` (extension already stripped).
pub fn find_token(root: &str) -> Option<FrameToken> {
    let m = FRAME_PATTERN.find(root)?;
    let text = m.as_str();
    let kind = if text.starts_with('%') {
        TokenKind::Printf
    } else if text.bytes().all(|b| b.is_ascii_digit()) {
        TokenKind::Digits
    } else if text.bytes().all(|b| b == b'#') {
        TokenKind::Hashes
    } else {
        TokenKind::Mixed
    };

    Some(FrameToken {
        start: m.start(),
        text: text.to_string(),
        kind,
    })
}

/// Find the frame token of a full path (extension stripped first).
pub fn token_of(path: &str) -> Option<FrameToken> {
    find_token(split_ext(path).0)
}

/// Glob matching every sibling frame of `path`, or `None` if the file name
/// carries no frame token.
///
/// The token becomes a single `*`; text around it is escaped so it only
/// matches literally. `shot_0011.exr`, `shot_####.exr` and `shot_%04d.exr`
/// all give `shot_*.exr`.
pub fn sequence_glob(path: &str) -> Option<String> {
    let (root, ext) = split_ext(path);
    let token = find_token(root)?;
    Some(format!(
        "{}*{}",
        glob::Pattern::escape(&root[..token.start]),
        glob::Pattern::escape(ext)
    ))
}
