//! Command runner - executes parsed CLI commands.

use anyhow::{Context, Result};
use log::{debug, info};
use serde::Serialize;
use std::io::Write;
use std::path::Path;

use crate::cli::{Args, Command, ThumbnailCommand};
use crate::config::{self, PathConfig};
use crate::filters::{self, Context as PipelineContext, Filter};
use crate::listing::FsLister;
use crate::range::SequenceRange;
use crate::registry::TemplateRegistry;
use crate::resolve::RangeResolver;
use crate::thumbnail;

/// One line of `range --json` output
#[derive(Debug, Serialize)]
struct RangeReport<'a> {
    path: &'a str,
    min: Option<i64>,
    max: Option<i64>,
}

/// Run a parsed command, writing results to `out`.
pub fn run(args: &Args, path_config: &PathConfig, out: &mut dyn Write) -> Result<()> {
    match &args.command {
        Command::Range {
            paths,
            templates,
            pattern_only,
            json,
        } => {
            let paths: Vec<String> = paths.iter().map(|p| p.to_string_lossy().into_owned()).collect();
            run_range(&paths, templates.as_deref(), *pattern_only, *json, path_config, out)
        }
        Command::Filters { filters, context } => run_filters(filters, context.as_deref(), out),
        Command::Thumbnail { kind } => run_thumbnail(kind),
    }
}

fn run_range(
    paths: &[String],
    templates: Option<&Path>,
    pattern_only: bool,
    json: bool,
    path_config: &PathConfig,
    out: &mut dyn Write,
) -> Result<()> {
    let lister = FsLister;
    let template_file = if pattern_only {
        None
    } else {
        config::templates_path(templates, path_config)
    };

    let registry = match &template_file {
        Some(file) => {
            let cfg = config::load_templates(file)?;
            let registry = TemplateRegistry::from_config(&cfg)
                .with_context(|| format!("Invalid templates in {}", file.display()))?;
            info!("Using {} templates from {}", registry.templates().len(), file.display());
            Some(registry)
        }
        None => {
            debug!("No template configuration, parsing file names only");
            None
        }
    };

    let resolver = match &registry {
        Some(registry) => RangeResolver::with_templates(registry, &lister),
        None => RangeResolver::pattern_only(&lister),
    };

    for path in paths {
        let range = resolver
            .resolve(path)
            .with_context(|| format!("Failed to resolve frame range of {}", path))?;
        write_range(out, path, range, json)?;
    }
    Ok(())
}

fn write_range(out: &mut dyn Write, path: &str, range: Option<SequenceRange>, json: bool) -> Result<()> {
    if json {
        let report = RangeReport {
            path,
            min: range.map(|r| r.min()),
            max: range.map(|r| r.max()),
        };
        writeln!(out, "{}", serde_json::to_string(&report)?)?;
    } else {
        match range {
            Some(r) => writeln!(out, "{}\t{}", path, r)?,
            None => writeln!(out, "{}\tnone", path)?,
        }
    }
    Ok(())
}

fn run_filters(filters_file: &Path, context_file: Option<&Path>, out: &mut dyn Write) -> Result<()> {
    let filters: Vec<Filter> = read_json(filters_file)?;
    let context: PipelineContext = match context_file {
        Some(file) => read_json(file)?,
        None => PipelineContext::default(),
    };

    let resolved = filters::resolve_filters(&context, &filters);
    writeln!(out, "{}", serde_json::to_string_pretty(&resolved)?)?;
    Ok(())
}

fn run_thumbnail(kind: &ThumbnailCommand) -> Result<()> {
    let (card, output) = match kind {
        ThumbnailCommand::Publish { image, output } => {
            (thumbnail::publish_thumbnail(&load_rgba(image)?), output)
        }
        ThumbnailCommand::Folder { image, base, output } => {
            (thumbnail::folder_thumbnail(&load_rgba(base)?, &load_rgba(image)?), output)
        }
        ThumbnailCommand::User { image, user, output } => {
            let user = user.as_deref().map(load_rgba).transpose()?;
            (thumbnail::user_publish_thumbnail(&load_rgba(image)?, user.as_ref()), output)
        }
    };

    card.save(output)
        .with_context(|| format!("Failed to write thumbnail: {}", output.display()))?;
    info!("Wrote {}x{} thumbnail to {}", card.width(), card.height(), output.display());
    Ok(())
}

fn load_rgba(path: &Path) -> Result<image::RgbaImage> {
    let img = image::open(path).with_context(|| format!("Failed to load image: {}", path.display()))?;
    Ok(img.to_rgba8())
}

fn read_json<T: serde::de::DeserializeOwned>(path: &Path) -> Result<T> {
    let text = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read {}", path.display()))?;
    serde_json::from_str(&text).with_context(|| format!("Failed to parse {}", path.display()))
}
