//! Path templates
//!
//! A template is a path definition with typed keys, e.g.
//! `{Shot}/render/{Shot}_v{version}.{SEQ}[.{eye}].exr`. It can read field
//! values out of a matching path and produce a glob for every path that
//! shares a given set of field values.
//!
//! # Definition syntax
//!
//! - `{name}`: key, must be declared in the key table
//! - `[...]`: optional section, must contain at least one key, no nesting
//! - everything else is literal; `\` in paths is treated as `/`

use glob::Pattern;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

use crate::error::TemplateError;

/// Key holding the frame number in sequence templates
pub const SEQUENCE_KEY: &str = "SEQ";
/// Stereo eye key, varies freely between frames of one sequence
pub const EYE_KEY: &str = "eye";

/// Field values by key name
pub type Fields = BTreeMap<String, FieldValue>;

/// Value of one template field
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(untagged)]
pub enum FieldValue {
    Int(i64),
    Str(String),
}

impl FieldValue {
    pub fn as_int(&self) -> Option<i64> {
        match self {
            FieldValue::Int(v) => Some(*v),
            FieldValue::Str(_) => None,
        }
    }
}

impl fmt::Display for FieldValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FieldValue::Int(v) => write!(f, "{}", v),
            FieldValue::Str(s) => f.write_str(s),
        }
    }
}

impl From<i64> for FieldValue {
    fn from(v: i64) -> Self {
        FieldValue::Int(v)
    }
}

impl From<&str> for FieldValue {
    fn from(s: &str) -> Self {
        FieldValue::Str(s.to_string())
    }
}

impl From<String> for FieldValue {
    fn from(s: String) -> Self {
        FieldValue::Str(s)
    }
}

/// Naming-convention descriptor able to parse paths into fields
pub trait Template {
    fn name(&self) -> &str;

    /// Field values of a path matching this template
    fn get_fields(&self, path: &str) -> Result<Fields, TemplateError>;
}

/// Classifies paths and enumerates template siblings
pub trait TemplateService {
    type Template: Template;

    /// The single template `path` conforms to.
    ///
    /// Fails with [`TemplateError::NoMatch`] or [`TemplateError::Ambiguous`]
    /// when the path cannot be classified.
    fn template_from_path(&self, path: &str) -> Result<&Self::Template, TemplateError>;

    /// Every existing path of `template` whose fields equal `fields`,
    /// except for `skip_keys` which may take any value.
    fn paths_from_template(
        &self,
        template: &Self::Template,
        fields: &Fields,
        skip_keys: &[&str],
    ) -> Result<Vec<String>, TemplateError>;
}

/// Character class allowed in a string key
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StringFilter {
    Alphanumeric,
    Alpha,
}

/// Key type declaration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum TemplateKey {
    Str {
        #[serde(default, skip_serializing_if = "Vec::is_empty")]
        choices: Vec<String>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        filter_by: Option<StringFilter>,
    },
    Int {
        /// Zero padding, e.g. `"03"`
        #[serde(default, skip_serializing_if = "Option::is_none")]
        format_spec: Option<String>,
    },
    /// Frame number; also matches `####` and `%0Nd` in abstract paths
    Sequence {
        #[serde(default, skip_serializing_if = "Option::is_none")]
        format_spec: Option<String>,
    },
}

impl TemplateKey {
    /// Plain string key
    pub fn string() -> Self {
        TemplateKey::Str {
            choices: Vec::new(),
            filter_by: None,
        }
    }

    pub fn int(format_spec: Option<&str>) -> Self {
        TemplateKey::Int {
            format_spec: format_spec.map(str::to_string),
        }
    }

    pub fn sequence(format_spec: Option<&str>) -> Self {
        TemplateKey::Sequence {
            format_spec: format_spec.map(str::to_string),
        }
    }

    fn regex(&self) -> String {
        match self {
            TemplateKey::Str { choices, .. } if !choices.is_empty() => {
                let alternatives: Vec<String> = choices.iter().map(|c| regex::escape(c)).collect();
                alternatives.join("|")
            }
            TemplateKey::Str {
                filter_by: Some(StringFilter::Alphanumeric),
                ..
            } => "[A-Za-z0-9]+".to_string(),
            TemplateKey::Str {
                filter_by: Some(StringFilter::Alpha),
                ..
            } => "[A-Za-z]+".to_string(),
            TemplateKey::Str { .. } => "[^/]+".to_string(),
            TemplateKey::Int { .. } => "[0-9]+".to_string(),
            TemplateKey::Sequence { .. } => "[0-9]+|#+|%0[0-9]d".to_string(),
        }
    }

    fn parse(&self, raw: &str) -> Option<FieldValue> {
        match self {
            TemplateKey::Str { .. } => Some(FieldValue::Str(raw.to_string())),
            TemplateKey::Int { .. } => raw.parse().ok().map(FieldValue::Int),
            TemplateKey::Sequence { .. } if raw.bytes().all(|b| b.is_ascii_digit()) => {
                raw.parse().ok().map(FieldValue::Int)
            }
            TemplateKey::Sequence { .. } => Some(FieldValue::Str(raw.to_string())),
        }
    }

    fn render(&self, value: &FieldValue) -> String {
        let width: usize = match self {
            TemplateKey::Int { format_spec } | TemplateKey::Sequence { format_spec } => {
                format_spec.as_deref().and_then(|s| s.parse().ok()).unwrap_or(0)
            }
            TemplateKey::Str { .. } => 0,
        };
        match value {
            FieldValue::Int(v) => format!("{:0width$}", v, width = width),
            FieldValue::Str(s) => s.clone(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum Segment {
    Literal(String),
    Key(String),
    Optional(Vec<Segment>),
}

/// Template compiled from a definition string
#[derive(Debug, Clone)]
pub struct PathTemplate {
    name: String,
    definition: String,
    segments: Vec<Segment>,
    keys: BTreeMap<String, TemplateKey>,
    regex: Regex,
    /// Capture group `i + 1` holds the value of `group_keys[i]`
    group_keys: Vec<String>,
}

impl PathTemplate {
    /// Compile `definition`; every key it uses must be declared in `keys`.
    pub fn new(
        name: impl Into<String>,
        definition: impl Into<String>,
        keys: &BTreeMap<String, TemplateKey>,
    ) -> Result<Self, TemplateError> {
        let name = name.into();
        let definition = definition.into().replace('\\', "/");
        let segments = parse_definition(&name, &definition)?;

        let mut compiler = Compiler {
            template: &name,
            declared: keys,
            used: BTreeMap::new(),
            group_keys: Vec::new(),
            pattern: String::from("^"),
        };
        compiler.compile(&segments)?;
        compiler.pattern.push('$');

        let regex = Regex::new(&compiler.pattern).map_err(|e| TemplateError::Definition {
            template: name.clone(),
            reason: e.to_string(),
        })?;

        Ok(Self {
            keys: compiler.used,
            group_keys: compiler.group_keys,
            name,
            definition,
            segments,
            regex,
        })
    }

    pub fn definition(&self) -> &str {
        &self.definition
    }

    /// Names of the keys used by this template
    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.keys.keys().map(String::as_str)
    }

    pub fn has_key(&self, key: &str) -> bool {
        self.keys.contains_key(key)
    }

    /// Globs covering every path with the given field values.
    ///
    /// Skipped keys and keys missing from `fields` become `*`. Optional
    /// sections holding such a key expand into both alternatives, present
    /// and absent.
    pub fn glob_patterns(&self, fields: &Fields, skip_keys: &[&str]) -> Vec<String> {
        let mut patterns = vec![String::new()];
        self.extend_globs(&self.segments, fields, skip_keys, &mut patterns);
        patterns
    }

    fn extend_globs(
        &self,
        segments: &[Segment],
        fields: &Fields,
        skip_keys: &[&str],
        patterns: &mut Vec<String>,
    ) {
        for segment in segments {
            match segment {
                Segment::Literal(text) => {
                    let escaped = Pattern::escape(text);
                    for p in patterns.iter_mut() {
                        p.push_str(&escaped);
                    }
                }
                Segment::Key(key) => match self.rendered(key, fields, skip_keys) {
                    Some(value) => {
                        let escaped = Pattern::escape(&value);
                        for p in patterns.iter_mut() {
                            p.push_str(&escaped);
                        }
                    }
                    None => {
                        // `**` is only legal as a whole component
                        for p in patterns.iter_mut().filter(|p| !p.ends_with('*')) {
                            p.push('*');
                        }
                    }
                },
                Segment::Optional(inner) => {
                    let wildcard = inner.iter().any(|s| {
                        matches!(s, Segment::Key(k) if self.rendered(k, fields, skip_keys).is_none())
                    });
                    let mut present = patterns.clone();
                    self.extend_globs(inner, fields, skip_keys, &mut present);
                    if wildcard {
                        patterns.extend(present);
                    } else {
                        *patterns = present;
                    }
                }
            }
        }
    }

    fn rendered(&self, key: &str, fields: &Fields, skip_keys: &[&str]) -> Option<String> {
        if skip_keys.contains(&key) {
            return None;
        }
        let value = fields.get(key)?;
        Some(self.keys.get(key).map_or_else(|| value.to_string(), |k| k.render(value)))
    }
}

impl Template for PathTemplate {
    fn name(&self) -> &str {
        &self.name
    }

    fn get_fields(&self, path: &str) -> Result<Fields, TemplateError> {
        let normalized = path.replace('\\', "/");
        let caps = self
            .regex
            .captures(&normalized)
            .ok_or_else(|| TemplateError::Mismatch {
                template: self.name.clone(),
                path: path.to_string(),
            })?;

        let mut raw: BTreeMap<&str, &str> = BTreeMap::new();
        let mut fields = Fields::new();
        for (i, key_name) in self.group_keys.iter().enumerate() {
            // Unmatched optional section
            let Some(m) = caps.get(i + 1) else {
                continue;
            };
            let value = m.as_str();

            if let Some(first) = raw.get(key_name.as_str()) {
                if *first != value {
                    return Err(TemplateError::InconsistentField {
                        template: self.name.clone(),
                        key: key_name.clone(),
                        first: first.to_string(),
                        second: value.to_string(),
                    });
                }
                continue;
            }
            raw.insert(key_name.as_str(), value);

            let parsed = self
                .keys
                .get(key_name)
                .and_then(|k| k.parse(value))
                .ok_or_else(|| TemplateError::InvalidValue {
                    template: self.name.clone(),
                    key: key_name.clone(),
                    value: value.to_string(),
                })?;
            fields.insert(key_name.clone(), parsed);
        }

        Ok(fields)
    }
}

struct Compiler<'a> {
    template: &'a str,
    declared: &'a BTreeMap<String, TemplateKey>,
    used: BTreeMap<String, TemplateKey>,
    group_keys: Vec<String>,
    pattern: String,
}

impl Compiler<'_> {
    fn compile(&mut self, segments: &[Segment]) -> Result<(), TemplateError> {
        for segment in segments {
            match segment {
                Segment::Literal(text) => self.pattern.push_str(&regex::escape(text)),
                Segment::Key(name) => {
                    let declared = self.declared;
                    let key = declared.get(name).ok_or_else(|| TemplateError::UnknownKey {
                        template: self.template.to_string(),
                        key: name.clone(),
                    })?;
                    self.pattern.push('(');
                    self.pattern.push_str(&key.regex());
                    self.pattern.push(')');
                    self.used.insert(name.clone(), key.clone());
                    self.group_keys.push(name.clone());
                }
                Segment::Optional(inner) => {
                    self.pattern.push_str("(?:");
                    self.compile(inner)?;
                    self.pattern.push_str(")?");
                }
            }
        }
        Ok(())
    }
}

fn parse_definition(template: &str, definition: &str) -> Result<Vec<Segment>, TemplateError> {
    let malformed = |reason: &str| TemplateError::Definition {
        template: template.to_string(),
        reason: reason.to_string(),
    };

    let mut segments = Vec::new();
    let mut optional: Option<Vec<Segment>> = None;
    let mut literal = String::new();
    let mut chars = definition.chars();

    while let Some(c) = chars.next() {
        match c {
            '{' => {
                let mut key = String::new();
                loop {
                    match chars.next() {
                        Some('}') => break,
                        Some(k) => key.push(k),
                        None => return Err(malformed("unclosed '{'")),
                    }
                }
                if key.is_empty() || key.contains(['{', '[', ']']) {
                    return Err(malformed("bad key name"));
                }
                let target = optional.as_mut().unwrap_or(&mut segments);
                flush(&mut literal, target);
                target.push(Segment::Key(key));
            }
            '}' => return Err(malformed("unmatched '}'")),
            '[' => {
                if optional.is_some() {
                    return Err(malformed("nested optional section"));
                }
                flush(&mut literal, &mut segments);
                optional = Some(Vec::new());
            }
            ']' => {
                let mut section = optional.take().ok_or_else(|| malformed("unmatched ']'"))?;
                flush(&mut literal, &mut section);
                if !section.iter().any(|s| matches!(s, Segment::Key(_))) {
                    return Err(malformed("optional section without a key"));
                }
                segments.push(Segment::Optional(section));
            }
            _ => literal.push(c),
        }
    }

    if optional.is_some() {
        return Err(malformed("unclosed '['"));
    }
    flush(&mut literal, &mut segments);
    Ok(segments)
}

fn flush(literal: &mut String, target: &mut Vec<Segment>) {
    if !literal.is_empty() {
        target.push(Segment::Literal(std::mem::take(literal)));
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn keys() -> BTreeMap<String, TemplateKey> {
        let mut keys = BTreeMap::new();
        keys.insert("Shot".to_string(), TemplateKey::string());
        keys.insert("version".to_string(), TemplateKey::int(Some("03")));
        keys.insert("SEQ".to_string(), TemplateKey::sequence(Some("04")));
        keys.insert(
            "eye".to_string(),
            TemplateKey::Str {
                choices: vec!["L".into(), "R".into()],
                filter_by: None,
            },
        );
        keys
    }

    fn render_template() -> PathTemplate {
        PathTemplate::new(
            "shot_render",
            "/proj/{Shot}/render/{Shot}_v{version}[_{eye}].{SEQ}.exr",
            &keys(),
        )
        .unwrap()
    }

    #[test]
    fn test_get_fields() {
        let t = render_template();
        let fields = t.get_fields("/proj/sh010/render/sh010_v003.1001.exr").unwrap();
        assert_eq!(fields.get("Shot"), Some(&FieldValue::from("sh010")));
        assert_eq!(fields.get("version"), Some(&FieldValue::Int(3)));
        assert_eq!(fields.get("SEQ"), Some(&FieldValue::Int(1001)));
        assert!(!fields.contains_key("eye"));

        let fields = t.get_fields("/proj/sh010/render/sh010_v003_L.1001.exr").unwrap();
        assert_eq!(fields.get("eye"), Some(&FieldValue::from("L")));
    }

    #[test]
    fn test_abstract_sequence_values() {
        let t = render_template();
        let fields = t.get_fields("/proj/sh010/render/sh010_v003.####.exr").unwrap();
        assert_eq!(fields.get("SEQ"), Some(&FieldValue::from("####")));
        let fields = t.get_fields("/proj/sh010/render/sh010_v003.%04d.exr").unwrap();
        assert_eq!(fields.get("SEQ"), Some(&FieldValue::from("%04d")));
    }

    #[test]
    fn test_backslashes_normalized() {
        let t = render_template();
        let fields = t.get_fields(r"\proj\sh010\render\sh010_v003.0001.exr").unwrap();
        assert_eq!(fields.get("SEQ"), Some(&FieldValue::Int(1)));
    }

    #[test]
    fn test_mismatch_and_inconsistent() {
        let t = render_template();
        assert!(matches!(
            t.get_fields("/proj/sh010/comp/sh010_v003.1001.exr"),
            Err(TemplateError::Mismatch { .. })
        ));
        assert!(matches!(
            t.get_fields("/proj/sh010/render/sh020_v003.1001.exr"),
            Err(TemplateError::InconsistentField { .. })
        ));
    }

    #[test]
    fn test_invalid_int_value() {
        let t = render_template();
        let err = t
            .get_fields("/proj/sh010/render/sh010_v99999999999999999999.1001.exr")
            .unwrap_err();
        assert!(matches!(err, TemplateError::InvalidValue { ref key, .. } if key == "version"));
    }

    #[test]
    fn test_definition_errors() {
        let k = keys();
        assert!(matches!(
            PathTemplate::new("t", "{Shot}/{nope}.exr", &k),
            Err(TemplateError::UnknownKey { .. })
        ));
        for bad in ["{Shot", "Shot}", "[{Shot}", "{Shot}]", "[[{Shot}]]", "[plain]", "{}"] {
            assert!(
                matches!(PathTemplate::new("t", bad, &k), Err(TemplateError::Definition { .. })),
                "{bad} should be rejected"
            );
        }
    }

    #[test]
    fn test_keys_listed() {
        let t = render_template();
        let names: Vec<&str> = t.keys().collect();
        assert_eq!(names, vec!["SEQ", "Shot", "eye", "version"]);
        assert!(t.has_key(SEQUENCE_KEY));
        assert_eq!(t.name(), "shot_render");
    }

    #[test]
    fn test_glob_patterns_skip_keys() {
        let t = render_template();
        let fields = t.get_fields("/proj/sh[1]/render/sh[1]_v003.0011.exr").unwrap();
        let globs = t.glob_patterns(&fields, &[SEQUENCE_KEY, EYE_KEY]);
        assert_eq!(
            globs,
            vec![
                "/proj/sh[[]1[]]/render/sh[[]1[]]_v003.*.exr".to_string(),
                "/proj/sh[[]1[]]/render/sh[[]1[]]_v003_*.*.exr".to_string(),
            ]
        );
    }

    #[test]
    fn test_glob_patterns_render_padding() {
        let t = render_template();
        let mut fields = Fields::new();
        fields.insert("Shot".into(), "sh010".into());
        fields.insert("version".into(), FieldValue::Int(7));
        fields.insert("eye".into(), "R".into());
        fields.insert("SEQ".into(), FieldValue::Int(42));
        assert_eq!(
            t.glob_patterns(&fields, &[]),
            vec!["/proj/sh010/render/sh010_v007_R.0042.exr".to_string()]
        );
    }

    #[test]
    fn test_adjacent_wildcards_collapse() {
        let t = PathTemplate::new("t", "/r/{Shot}{version}.exr", &keys()).unwrap();
        assert_eq!(t.glob_patterns(&Fields::new(), &[]), vec!["/r/*.exr".to_string()]);
    }

    #[test]
    fn test_key_json() {
        let key: TemplateKey = serde_json::from_str(r#"{"type": "sequence", "format_spec": "04"}"#).unwrap();
        assert_eq!(key, TemplateKey::sequence(Some("04")));
        let key: TemplateKey = serde_json::from_str(r#"{"type": "str", "filter_by": "alphanumeric"}"#).unwrap();
        assert_eq!(
            key,
            TemplateKey::Str {
                choices: vec![],
                filter_by: Some(StringFilter::Alphanumeric)
            }
        );
    }
}
