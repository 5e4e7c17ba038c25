//! Template registry
//!
//! Config-driven [`TemplateService`]: a set of named [`PathTemplate`]s
//! sharing one key table, loaded from JSON like
//!
//! ```json
//! {
//!   "roots": { "primary": "/mnt/projects/demo" },
//!   "keys": {
//!     "Shot": { "type": "str" },
//!     "version": { "type": "int", "format_spec": "03" },
//!     "SEQ": { "type": "sequence", "format_spec": "04" },
//!     "eye": { "type": "str", "choices": ["L", "R"] }
//!   },
//!   "paths": {
//!     "shot_render": "shots/{Shot}/render/{Shot}_v{version}[_{eye}].{SEQ}.exr",
//!     "shot_scene": { "definition": "shots/{Shot}/{Shot}_v{version}.ma", "root_name": "primary" }
//!   }
//! }
//! ```
//!
//! Definitions are prefixed with their root (`root_name`, or `primary` when
//! present and none is given).

use log::{debug, trace};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};

use crate::error::TemplateError;
use crate::listing::{FsLister, PathLister};
use crate::template::{Fields, PathTemplate, Template, TemplateKey, TemplateService};

/// Root used when a path entry names none
pub const DEFAULT_ROOT: &str = "primary";

/// Serialized template configuration
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TemplateConfig {
    #[serde(default)]
    pub roots: BTreeMap<String, String>,
    #[serde(default)]
    pub keys: BTreeMap<String, TemplateKey>,
    #[serde(default)]
    pub paths: BTreeMap<String, PathEntry>,
}

/// Path template entry, short or long form
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum PathEntry {
    Definition(String),
    Detailed {
        definition: String,
        #[serde(default)]
        root_name: Option<String>,
    },
}

/// Named templates plus the lister used to enumerate their files
#[derive(Debug, Clone)]
pub struct TemplateRegistry<L = FsLister> {
    templates: Vec<PathTemplate>,
    lister: L,
}

impl TemplateRegistry<FsLister> {
    /// Registry over the real filesystem
    pub fn from_config(config: &TemplateConfig) -> Result<Self, TemplateError> {
        Self::from_config_with_lister(config, FsLister)
    }
}

impl<L: PathLister> TemplateRegistry<L> {
    pub fn new(templates: Vec<PathTemplate>, lister: L) -> Self {
        Self { templates, lister }
    }

    pub fn from_config_with_lister(config: &TemplateConfig, lister: L) -> Result<Self, TemplateError> {
        let mut templates = Vec::with_capacity(config.paths.len());

        for (name, entry) in &config.paths {
            let (definition, root_name) = match entry {
                PathEntry::Definition(d) => (d, None),
                PathEntry::Detailed {
                    definition,
                    root_name,
                } => (definition, root_name.as_deref()),
            };

            let root = match root_name {
                Some(r) => Some(config.roots.get(r).ok_or_else(|| TemplateError::Definition {
                    template: name.clone(),
                    reason: format!("unknown root '{}'", r),
                })?),
                None => config.roots.get(DEFAULT_ROOT),
            };

            let full = match root {
                Some(root) => format!(
                    "{}/{}",
                    root.replace('\\', "/").trim_end_matches('/'),
                    definition.trim_start_matches('/')
                ),
                None => definition.clone(),
            };

            trace!("Template {}: {}", name, full);
            templates.push(PathTemplate::new(name.clone(), full, &config.keys)?);
        }

        debug!("Loaded {} path templates", templates.len());
        Ok(Self { templates, lister })
    }

    pub fn get(&self, name: &str) -> Option<&PathTemplate> {
        self.templates.iter().find(|t| t.name() == name)
    }

    pub fn templates(&self) -> &[PathTemplate] {
        &self.templates
    }
}

impl<L: PathLister> TemplateService for TemplateRegistry<L> {
    type Template = PathTemplate;

    fn template_from_path(&self, path: &str) -> Result<&PathTemplate, TemplateError> {
        let matches: Vec<&PathTemplate> = self
            .templates
            .iter()
            .filter(|t| t.get_fields(path).is_ok())
            .collect();

        match matches.as_slice() {
            [] => Err(TemplateError::NoMatch(path.to_string())),
            [one] => Ok(one),
            many => Err(TemplateError::Ambiguous {
                path: path.to_string(),
                names: many.iter().map(|t| t.name().to_string()).collect(),
            }),
        }
    }

    fn paths_from_template(
        &self,
        template: &PathTemplate,
        fields: &Fields,
        skip_keys: &[&str],
    ) -> Result<Vec<String>, TemplateError> {
        let mut found = BTreeSet::new();

        for pattern in template.glob_patterns(fields, skip_keys) {
            for path in self.lister.glob(&pattern)? {
                let path = path.to_string_lossy().into_owned();
                let candidate = match template.get_fields(&path) {
                    Ok(f) => f,
                    Err(e) => {
                        trace!("Skipping {}: {}", path, e);
                        continue;
                    }
                };

                let agrees = fields
                    .iter()
                    .filter(|(k, _)| !skip_keys.contains(&k.as_str()))
                    .all(|(k, v)| candidate.get(k) == Some(v));
                if agrees {
                    found.insert(path);
                }
            }
        }

        Ok(found.into_iter().collect())
    }
}
