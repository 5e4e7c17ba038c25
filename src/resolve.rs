//! Sequence range resolution
//!
//! Strategies are tried in order until one of them answers:
//!
//! ```text
//! TemplateAttempt ──┬── Resolved(range) / Resolved(None)
//!                   └── Skip ──> PatternFallback ── Resolved(range) / Resolved(None)
//! ```
//!
//! Templates win whenever a path classifies and carries a `SEQ` field. An
//! empty template listing is a final "no range"; it never falls through to
//! globbing.

use log::debug;

use crate::error::SequenceError;
use crate::listing::PathLister;
use crate::pattern;
use crate::range::SequenceRange;
use crate::template::{EYE_KEY, FieldValue, SEQUENCE_KEY, Template, TemplateService};

/// Outcome of one strategy
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Attempt {
    /// Final answer, possibly "no range"
    Resolved(Option<SequenceRange>),
    /// Not applicable, try the next strategy
    Skip,
}

/// One way of finding a sequence range
pub trait RangeStrategy {
    fn name(&self) -> &'static str;
    fn attempt(&self, path: &str) -> Result<Attempt, SequenceError>;
}

/// Globbing on the trailing frame token
pub struct PatternStrategy<'a> {
    lister: &'a dyn PathLister,
}

impl<'a> PatternStrategy<'a> {
    pub fn new(lister: &'a dyn PathLister) -> Self {
        Self { lister }
    }
}

impl RangeStrategy for PatternStrategy<'_> {
    fn name(&self) -> &'static str {
        "pattern"
    }

    fn attempt(&self, path: &str) -> Result<Attempt, SequenceError> {
        pattern::resolve_by_pattern(self.lister, path).map(Attempt::Resolved)
    }
}

/// Sibling enumeration through a template service
pub struct TemplateStrategy<'a, S> {
    service: &'a S,
}

impl<'a, S: TemplateService> TemplateStrategy<'a, S> {
    pub fn new(service: &'a S) -> Self {
        Self { service }
    }
}

impl<S: TemplateService> RangeStrategy for TemplateStrategy<'_, S> {
    fn name(&self) -> &'static str {
        "template"
    }

    fn attempt(&self, path: &str) -> Result<Attempt, SequenceError> {
        let template = match self.service.template_from_path(path) {
            Ok(t) => t,
            Err(e) if e.is_classification_failure() => {
                debug!("{}", e);
                return Ok(Attempt::Skip);
            }
            Err(e) => return Err(e.into()),
        };

        let fields = template.get_fields(path)?;
        if !fields.contains_key(SEQUENCE_KEY) {
            // Older paths can match unrelated templates
            debug!("Template {} has no {} field for {}", template.name(), SEQUENCE_KEY, path);
            return Ok(Attempt::Skip);
        }

        let siblings = self
            .service
            .paths_from_template(template, &fields, &[SEQUENCE_KEY, EYE_KEY])?;

        let mut frames = Vec::with_capacity(siblings.len());
        for sibling in &siblings {
            let fields = template.get_fields(sibling)?;
            if let Some(frame) = fields.get(SEQUENCE_KEY).and_then(FieldValue::as_int) {
                frames.push(frame);
            }
        }

        debug!(
            "Template {} -> {} siblings for {}",
            template.name(),
            siblings.len(),
            path
        );
        Ok(Attempt::Resolved(SequenceRange::from_frames(frames)))
    }
}

/// Ordered chain of strategies, first non-skip answer wins
#[derive(Default)]
pub struct RangeResolver<'a> {
    strategies: Vec<Box<dyn RangeStrategy + 'a>>,
}

impl<'a> RangeResolver<'a> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a strategy to the end of the chain
    pub fn with_strategy(mut self, strategy: impl RangeStrategy + 'a) -> Self {
        self.strategies.push(Box::new(strategy));
        self
    }

    /// Template first, pattern as fallback
    pub fn with_templates<S: TemplateService>(service: &'a S, lister: &'a dyn PathLister) -> Self {
        Self::new()
            .with_strategy(TemplateStrategy::new(service))
            .with_strategy(PatternStrategy::new(lister))
    }

    /// Pattern parsing only
    pub fn pattern_only(lister: &'a dyn PathLister) -> Self {
        Self::new().with_strategy(PatternStrategy::new(lister))
    }

    pub fn resolve(&self, path: &str) -> Result<Option<SequenceRange>, SequenceError> {
        for strategy in &self.strategies {
            match strategy.attempt(path)? {
                Attempt::Resolved(range) => {
                    debug!("{} resolved {} -> {:?}", strategy.name(), path, range);
                    return Ok(range);
                }
                Attempt::Skip => debug!("{} skipped {}", strategy.name(), path),
            }
        }
        Ok(None)
    }
}

/// Frame range of `path`, preferring the template service and falling back
/// to pattern parsing when the path has no template or no `SEQ` field.
pub fn resolve_by_template<S: TemplateService>(
    service: &S,
    lister: &dyn PathLister,
    path: &str,
) -> Result<Option<SequenceRange>, SequenceError> {
    RangeResolver::with_templates(service, lister).resolve(path)
}
