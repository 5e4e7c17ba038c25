//! Glob-style enumeration of files
//!
//! Resolvers never touch the filesystem directly; they go through a
//! [`PathLister`] so the parsing logic can be exercised against an
//! in-memory listing.

use glob::{MatchOptions, Pattern};
use log::trace;
use std::path::PathBuf;

use crate::error::ListingError;

/// Enumerates paths matching a glob pattern
pub trait PathLister: Send + Sync {
    /// All paths matching `pattern`, sorted.
    fn glob(&self, pattern: &str) -> Result<Vec<PathBuf>, ListingError>;
}

/// `*` never matches a leading dot, so hidden files stay out of listings
fn match_options() -> MatchOptions {
    MatchOptions {
        require_literal_leading_dot: true,
        ..MatchOptions::new()
    }
}

/// Lists the real filesystem through the `glob` crate
#[derive(Debug, Default, Clone, Copy)]
pub struct FsLister;

impl PathLister for FsLister {
    fn glob(&self, pattern: &str) -> Result<Vec<PathBuf>, ListingError> {
        let entries = glob::glob_with(pattern, match_options()).map_err(|source| ListingError::Pattern {
            pattern: pattern.to_string(),
            source,
        })?;

        let mut paths = Vec::new();
        for entry in entries {
            match entry {
                Ok(path) => paths.push(path),
                Err(e) => {
                    let path = e.path().to_path_buf();
                    return Err(ListingError::Io {
                        path,
                        source: std::io::Error::from(e),
                    });
                }
            }
        }
        paths.sort();

        trace!("glob {} -> {} paths", pattern, paths.len());
        Ok(paths)
    }
}

/// Fixed set of paths, matched the way [`FsLister`] would match them
#[derive(Debug, Default, Clone)]
pub struct MemoryLister {
    paths: Vec<PathBuf>,
}

impl MemoryLister {
    pub fn new<I, P>(paths: I) -> Self
    where
        I: IntoIterator<Item = P>,
        P: Into<PathBuf>,
    {
        Self {
            paths: paths.into_iter().map(Into::into).collect(),
        }
    }

    pub fn insert(&mut self, path: impl Into<PathBuf>) {
        self.paths.push(path.into());
    }
}

impl PathLister for MemoryLister {
    fn glob(&self, pattern: &str) -> Result<Vec<PathBuf>, ListingError> {
        let compiled = Pattern::new(pattern).map_err(|source| ListingError::Pattern {
            pattern: pattern.to_string(),
            source,
        })?;
        // glob::glob walks one component at a time, so `*` never crosses `/`
        let options = MatchOptions {
            require_literal_separator: true,
            ..match_options()
        };

        let mut paths: Vec<PathBuf> = self
            .paths
            .iter()
            .filter(|p| compiled.matches_path_with(p, options))
            .cloned()
            .collect();
        paths.sort();
        paths.dedup();
        Ok(paths)
    }
}
