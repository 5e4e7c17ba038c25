//! Pattern-based range resolution
//!
//! Rough parsing for paths no template knows about. The frame number is
//! assumed to be the integer right before the extension (`file.0001.jpg`,
//! `file_001.jpg`); abstract names like `file.####.jpg` or `file.%04d.jpg`
//! are accepted too.

use log::debug;
use std::path::Path;

use crate::error::SequenceError;
use crate::frame_token::{self, FrameToken};
use crate::listing::PathLister;
use crate::range::SequenceRange;

/// Min/max frame of the sequence `path` belongs to, found by globbing.
///
/// Returns `Ok(None)` when the file name carries no frame token. If the glob
/// finds nothing at all, a concrete frame path resolves to its own frame and
/// a placeholder path to `None`.
///
/// Every glob hit must yield an integer frame. A sibling like `shot_.exr`
/// or `shot_final.exr` next to `shot_0001.exr` is reported as
/// [`SequenceError::UnparsableFrame`].
pub fn resolve_by_pattern(
    lister: &dyn PathLister,
    path: &str,
) -> Result<Option<SequenceRange>, SequenceError> {
    let Some(token) = frame_token::token_of(path) else {
        debug!("No frame token in {}", path);
        return Ok(None);
    };
    let Some(pattern) = frame_token::sequence_glob(path) else {
        return Ok(None);
    };

    let hits = lister.glob(&pattern)?;
    if hits.is_empty() {
        debug!("Nothing on disk matches {} (token {})", pattern, token.text());
        return Ok(token.frame().map(SequenceRange::single));
    }

    let frames = hits
        .iter()
        .map(|hit| frame_of(hit))
        .collect::<Result<Vec<_>, _>>()?;

    let range = SequenceRange::from_frames(frames);
    debug!("Pattern {} -> {} files, range {:?}", pattern, hits.len(), range);
    Ok(range)
}

/// Integer frame number of a concrete frame path
pub fn frame_of(path: &Path) -> Result<i64, SequenceError> {
    let text = path.to_string_lossy();
    let token = frame_token::token_of(&text);
    token
        .as_ref()
        .and_then(FrameToken::frame)
        .ok_or_else(|| SequenceError::UnparsableFrame {
            path: path.to_path_buf(),
            token: token.map(|t| t.text().to_string()),
        })
}
