use clap::{Parser, Subcommand};
use std::path::PathBuf;

// Build version with target info
const VERSION_INFO: &str = const_format::concatcp!(
    env!("CARGO_PKG_VERSION"), "\n",
    "Target: ", std::env::consts::ARCH, "-", std::env::consts::OS
);

/// Sequence frame ranges, pipeline filters and browser thumbnails
#[derive(Parser, Debug)]
#[command(author, version = VERSION_INFO, about, long_about = None)]
pub struct Args {
    #[command(subcommand)]
    pub command: Command,

    /// Enable debug logging to file (default: seqprobe.log in the data dir)
    #[arg(short = 'l', long = "log", value_name = "LOG_FILE", num_args = 0..=1, require_equals = true)]
    pub log_file: Option<Option<PathBuf>>,

    /// Increase logging verbosity (default: warn, -v: info, -vv: debug, -vvv+: trace)
    #[arg(short = 'v', long = "verbose", action = clap::ArgAction::Count)]
    pub verbosity: u8,

    /// Custom configuration directory (overrides default platform paths)
    #[arg(short = 'c', long = "config-dir", value_name = "DIR")]
    pub config_dir: Option<PathBuf>,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Print the first and last frame of the sequence each file belongs to
    Range {
        /// Frame file, or abstract path like shot.####.exr / shot.%04d.exr
        #[arg(value_name = "PATH", required = true)]
        paths: Vec<PathBuf>,

        /// Template configuration (default: templates.json in the config dir, if present)
        #[arg(short = 't', long = "templates", value_name = "FILE")]
        templates: Option<PathBuf>,

        /// Ignore templates, parse file names only
        #[arg(long = "pattern-only")]
        pattern_only: bool,

        /// Print one JSON object per path
        #[arg(long = "json")]
        json: bool,
    },

    /// Replace {context.*} tokens in a JSON filter list
    Filters {
        /// JSON file with the filter list
        #[arg(value_name = "FILTERS")]
        filters: PathBuf,

        /// JSON file with the context (project, entity, step, task, user)
        #[arg(long = "context", value_name = "CONTEXT")]
        context: Option<PathBuf>,
    },

    /// Composite a file browser thumbnail into a PNG
    Thumbnail {
        #[command(subcommand)]
        kind: ThumbnailCommand,
    },
}

#[derive(Subcommand, Debug)]
pub enum ThumbnailCommand {
    /// Centered 512x400 publish card
    Publish {
        #[arg(value_name = "IMAGE")]
        image: PathBuf,
        #[arg(short = 'o', long = "output", value_name = "PNG")]
        output: PathBuf,
    },

    /// Thumbnail inlaid into a 512x400 folder graphic
    Folder {
        #[arg(value_name = "IMAGE")]
        image: PathBuf,
        /// Folder artwork
        #[arg(long = "base", value_name = "IMAGE")]
        base: PathBuf,
        #[arg(short = 'o', long = "output", value_name = "PNG")]
        output: PathBuf,
    },

    /// 75x75 publish square with an optional user avatar badge
    User {
        #[arg(value_name = "IMAGE")]
        image: PathBuf,
        #[arg(long = "user", value_name = "IMAGE")]
        user: Option<PathBuf>,
        #[arg(short = 'o', long = "output", value_name = "PNG")]
        output: PathBuf,
    },
}
