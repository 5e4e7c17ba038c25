//! Publish filtering through a customizable hook
//!
//! Records are handed to the hook wrapped as `{"sg_publish": record}` so
//! the hook can attach extra data later without changing its signature.
//! Any hook failure or malformed answer yields an empty list.

use log::error;
use serde_json::{Map, Value};

/// Wrapper key around each publish record
pub const PUBLISH_KEY: &str = "sg_publish";

/// Filters wrapped publish records
pub trait PublishFilterHook {
    /// Receives `[{"sg_publish": {...}}, ...]`, must return a list of the same shape.
    fn filter_publishes(&self, publishes: Vec<Value>) -> anyhow::Result<Value>;
}

/// Hook that keeps everything
#[derive(Debug, Default, Clone, Copy)]
pub struct PassThroughHook;

impl PublishFilterHook for PassThroughHook {
    fn filter_publishes(&self, publishes: Vec<Value>) -> anyhow::Result<Value> {
        Ok(Value::Array(publishes))
    }
}

impl<F> PublishFilterHook for F
where
    F: Fn(Vec<Value>) -> anyhow::Result<Value>,
{
    fn filter_publishes(&self, publishes: Vec<Value>) -> anyhow::Result<Value> {
        self(publishes)
    }
}

/// Run `publishes` through `hook` and unwrap the surviving records.
pub fn filter_publishes(hook: &dyn PublishFilterHook, publishes: Vec<Value>) -> Vec<Value> {
    let wrapped = publishes
        .into_iter()
        .map(|record| {
            let mut item = Map::new();
            item.insert(PUBLISH_KEY.to_string(), record);
            Value::Object(item)
        })
        .collect();

    let items = match hook.filter_publishes(wrapped) {
        Ok(Value::Array(items)) => items,
        Ok(other) => {
            error!(
                "Publish filter hook returned an unexpected result type '{}' - ignoring!",
                type_name(&other)
            );
            return Vec::new();
        }
        Err(e) => {
            error!("Failed to execute publish filter hook: {:#}", e);
            return Vec::new();
        }
    };

    let mut records = Vec::with_capacity(items.len());
    for item in items {
        let mut item = match item {
            Value::Object(map) => map,
            other => {
                error!(
                    "Publish filter hook returned a '{}' item instead of an object - ignoring all results!",
                    type_name(&other)
                );
                return Vec::new();
            }
        };
        if let Some(record) = item.remove(PUBLISH_KEY).filter(is_truthy) {
            records.push(record);
        }
    }
    records
}

fn type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "bool",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

fn is_truthy(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::Bool(b) => *b,
        Value::Number(n) => n.as_f64().is_some_and(|f| f != 0.0),
        Value::String(s) => !s.is_empty(),
        Value::Array(a) => !a.is_empty(),
        Value::Object(o) => !o.is_empty(),
    }
}
