//! SEQPROBE - frame ranges of numbered file sequences
//!
//! Given one frame of a sequence (`shot_0011.exr`) or an abstract path
//! (`shot_####.exr`, `shot_%04d.exr`), finds the first and last frame on
//! disk. Path templates are consulted first; file name parsing is the
//! fallback.
//!
//! Also carries the small helpers a pipeline file browser needs around it:
//! context-token filter resolution, hook-driven publish filtering and
//! thumbnail compositing.

// Sequence ranges
pub mod error;
pub mod frame_token;
pub mod listing;
pub mod pattern;
pub mod range;
pub mod registry;
pub mod resolve;
pub mod template;

// Browser helpers
pub mod filters;
pub mod publishes;
pub mod thumbnail;

// App modules
pub mod cli;
pub mod config;
pub mod runner;

pub use error::{ListingError, SequenceError, TemplateError};
pub use listing::{FsLister, MemoryLister, PathLister};
pub use pattern::resolve_by_pattern;
pub use range::SequenceRange;
pub use registry::{TemplateConfig, TemplateRegistry};
pub use resolve::{RangeResolver, RangeStrategy, resolve_by_template};
pub use template::{FieldValue, Fields, PathTemplate, Template, TemplateService};

/// Frame range of `path` by file name parsing only
pub fn sequence_range_from_path(path: &str) -> Result<Option<SequenceRange>, SequenceError> {
    resolve_by_pattern(&FsLister, path)
}

/// Frame range of `path`, templates first, file name parsing as fallback
pub fn find_sequence_range<S: TemplateService>(
    service: &S,
    path: &str,
) -> Result<Option<SequenceRange>, SequenceError> {
    resolve_by_template(service, &FsLister, path)
}
