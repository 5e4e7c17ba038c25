//! Query filter resolution
//!
//! Filters come from user or environment config and may reference the
//! current pipeline context by token:
//!
//! ```json
//! [["task_assignees", "is", "{context.user}"],
//!  ["sg_status_list", "not_in", ["fin", "omt"]],
//!  {"filter_operator": "any", "filters": [["entity", "is", "{context.entity}"]]}]
//! ```
//!
//! Tokens are replaced with the matching context value; unset members
//! resolve to `null`.

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Current pipeline context
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Context {
    #[serde(default)]
    pub project: Option<Value>,
    #[serde(default)]
    pub entity: Option<Value>,
    #[serde(default)]
    pub step: Option<Value>,
    #[serde(default)]
    pub task: Option<Value>,
    #[serde(default)]
    pub user: Option<Value>,
}

impl Context {
    /// Context value for a `{context.*}` token, `None` if `token` isn't one.
    pub fn lookup(&self, token: &str) -> Option<Value> {
        let member = match token {
            "{context.entity}" => &self.entity,
            "{context.step}" => &self.step,
            "{context.project}" => &self.project,
            "{context.task}" => &self.task,
            "{context.user}" => &self.user,
            "{context.project.id}" => {
                let id = self.project.as_ref().and_then(|p| p.get("id")).cloned();
                return Some(id.unwrap_or(Value::Null));
            }
            _ => return None,
        };
        Some(member.clone().unwrap_or(Value::Null))
    }
}

/// One filter: a condition list or a nested group
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Filter {
    /// `[field, operator, value...]`
    Condition(Vec<Value>),
    Group {
        filter_operator: String,
        filters: Vec<Filter>,
    },
}

/// Replace context tokens in `filters`, recursing into groups.
pub fn resolve_filters(context: &Context, filters: &[Filter]) -> Vec<Filter> {
    filters
        .iter()
        .map(|filter| match filter {
            Filter::Group {
                filter_operator,
                filters,
            } => Filter::Group {
                filter_operator: filter_operator.clone(),
                filters: resolve_filters(context, filters),
            },
            Filter::Condition(fields) => Filter::Condition(
                fields
                    .iter()
                    .map(|field| match field {
                        Value::String(s) => context.lookup(s).unwrap_or_else(|| field.clone()),
                        _ => field.clone(),
                    })
                    .collect(),
            ),
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn context() -> Context {
        Context {
            project: Some(json!({"type": "Project", "id": 65, "name": "demo"})),
            entity: Some(json!({"type": "Shot", "id": 1184})),
            step: None,
            task: Some(json!({"type": "Task", "id": 7})),
            user: Some(json!({"type": "HumanUser", "id": 86, "name": "Jo"})),
        }
    }

    fn parse(v: Value) -> Vec<Filter> {
        serde_json::from_value(v).unwrap()
    }

    #[test]
    fn test_resolve_tokens() {
        let filters = parse(json!([
            ["task_assignees", "is", "{context.user}"],
            ["project.Project.id", "is", "{context.project.id}"],
            ["step", "is", "{context.step}"],
            ["sg_status_list", "not_in", ["fin", "omt"]]
        ]));

        let resolved = resolve_filters(&context(), &filters);
        assert_eq!(
            serde_json::to_value(&resolved).unwrap(),
            json!([
                ["task_assignees", "is", {"type": "HumanUser", "id": 86, "name": "Jo"}],
                ["project.Project.id", "is", 65],
                ["step", "is", null],
                ["sg_status_list", "not_in", ["fin", "omt"]]
            ])
        );
    }

    #[test]
    fn test_nested_groups() {
        let filters = parse(json!([{
            "filter_operator": "any",
            "filters": [
                ["entity", "is", "{context.entity}"],
                {"filter_operator": "all", "filters": [["task", "is", "{context.task}"]]}
            ]
        }]));

        let resolved = resolve_filters(&context(), &filters);
        assert_eq!(
            serde_json::to_value(&resolved).unwrap(),
            json!([{
                "filter_operator": "any",
                "filters": [
                    ["entity", "is", {"type": "Shot", "id": 1184}],
                    {"filter_operator": "all", "filters": [["task", "is", {"type": "Task", "id": 7}]]}
                ]
            }])
        );
    }

    #[test]
    fn test_project_id_without_project() {
        let ctx = Context::default();
        assert_eq!(ctx.lookup("{context.project.id}"), Some(Value::Null));
        assert_eq!(ctx.lookup("{context.project}"), Some(Value::Null));
        assert_eq!(ctx.lookup("{context.shot}"), None);
    }

    #[test]
    fn test_tokens_only_replaced_whole() {
        let filters = parse(json!([["code", "contains", "x {context.user}"], [["{context.user}"]]]));
        let resolved = resolve_filters(&context(), &filters);
        // Partial strings and nested lists are left alone
        assert_eq!(resolved, filters);
    }
}
