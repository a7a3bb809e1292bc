use std::collections::BTreeMap;

use log::{debug, warn};
use serde_json::Value;
use strum::IntoEnumIterator;

use crate::{category::Category, utils};

/// How the model is asked to lay out its answers.
#[derive(
    Clone, Copy, Debug, Default, PartialEq, strum::Display, strum::EnumIter, strum::EnumString,
)]
#[strum(ascii_case_insensitive, serialize_all = "lowercase")]
pub enum ResponseFormat {
    /// One `Category: value` line per category.
    #[default]
    Lines,

    /// A single JSON object keyed by category label.
    Json,
}

/// Answer text per category, absent until the model (or the user) supplies it.
#[derive(Clone, Debug, PartialEq)]
pub struct EvaluationRecord {
    values: BTreeMap<Category, Option<String>>,
}

impl Default for EvaluationRecord {
    fn default() -> Self {
        Self {
            values: Category::iter().map(|category| (category, None)).collect(),
        }
    }
}

impl EvaluationRecord {
    pub fn from_response(response: &str, format: ResponseFormat) -> Self {
        let mut record = Self::default();
        record.apply_response(response, format);
        record
    }

    pub fn get(&self, category: Category) -> Option<&str> {
        self.values.get(&category).and_then(|v| v.as_deref())
    }

    pub fn set(&mut self, category: Category, value: Option<String>) {
        self.values.insert(category, value);
    }

    pub fn iter(&self) -> impl Iterator<Item = (Category, Option<&str>)> {
        self.values.iter().map(|(k, v)| (*k, v.as_deref()))
    }

    pub fn missing(&self) -> Vec<Category> {
        self.iter()
            .filter(|(_, value)| value.is_none())
            .map(|(category, _)| category)
            .collect()
    }

    /// Fill categories found in `response`. Categories the response does not
    /// mention keep their current value.
    pub fn apply_response(&mut self, response: &str, format: ResponseFormat) {
        match format {
            ResponseFormat::Lines => self.apply_lines(response),
            ResponseFormat::Json => {
                if !self.apply_json(response) {
                    warn!("Model response is not a JSON object, falling back to line parsing");
                    self.apply_lines(response);
                }
            }
        }
    }

    /// For every label, the text after the first `"{label}:"` up to the next
    /// line break, trimmed.
    ///
    /// Multi-line answers are cut at the first line break, and a label quoted
    /// inside another category's answer wins over its own line further down.
    fn apply_lines(&mut self, response: &str) {
        for category in Category::iter() {
            let marker = format!("{}:", category.label());
            if let Some(pos) = response.find(&marker) {
                let rest = &response[pos + marker.len()..];
                let value = rest.split('\n').next().unwrap_or_default().trim();
                self.values.insert(category, Some(value.to_string()));
            }
        }
    }

    fn apply_json(&mut self, response: &str) -> bool {
        let block = utils::markdown::extract_code_block(response);
        let Ok(Value::Object(map)) = serde_json::from_str::<Value>(&block) else {
            return false;
        };

        for (key, value) in map {
            let Some(category) = Category::from_label(&key) else {
                debug!("[Record] Ignore unknown category '{key}'");
                continue;
            };

            let value = match value {
                Value::Null => None,
                Value::String(s) => Some(s.trim().to_string()),
                other => Some(other.to_string()),
            };
            self.values.insert(category, value);
        }

        true
    }
}
