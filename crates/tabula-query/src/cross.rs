//! Cross-filtering: filter widgets broadcasting their live value to the
//! widgets they target.

use serde::{Deserialize, Deserializer, Serialize};
use std::cmp::Ordering;
use std::collections::HashMap;
use tabula_core::{Dataset, Value};

/// Targeting options of a widget.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BindingConfig {
    /// Ids of the widgets this one filters
    #[serde(default)]
    pub apply_to: Vec<String>,
    /// Field the live value constrains
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub filter_field: Option<String>,
    /// Fallback field for date pickers
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub date_field: Option<String>,
}

/// A widget as seen by the cross-filter propagator.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct WidgetBinding {
    /// Widget id
    pub id: String,
    /// Widget type, e.g. `dropdownFilter` or `barChart`
    #[serde(rename = "type", default)]
    pub kind: String,
    /// Targeting options
    #[serde(default)]
    pub config: BindingConfig,
}

impl WidgetBinding {
    /// Create a filter widget targeting `apply_to` on `field`.
    #[must_use]
    pub fn filter<S: Into<String>>(
        id: impl Into<String>,
        field: impl Into<String>,
        apply_to: impl IntoIterator<Item = S>,
    ) -> Self {
        Self {
            id: id.into(),
            kind: "filter".to_string(),
            config: BindingConfig {
                apply_to: apply_to.into_iter().map(Into::into).collect(),
                filter_field: Some(field.into()),
                date_field: None,
            },
        }
    }

    /// Check if this widget emits filter values.
    #[must_use]
    pub fn is_filter(&self) -> bool {
        self.kind.to_lowercase().contains("filter")
    }

    /// Field the emitted value constrains.
    #[must_use]
    pub fn field(&self) -> Option<&str> {
        self.config
            .filter_field
            .as_deref()
            .or(self.config.date_field.as_deref())
    }

    fn targets(&self, id: &str) -> bool {
        self.config.apply_to.iter().any(|t| t == id)
    }
}

/// Inclusive bounds compared with loose ordering. Other keys are ignored.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Bounds {
    /// Lower bound
    #[serde(default)]
    pub start: Option<Value>,
    /// Upper bound
    #[serde(default)]
    pub end: Option<Value>,
}

/// Inclusive bounds compared numerically. Other keys are ignored.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct NumericBounds {
    /// Lower bound
    #[serde(default)]
    pub min: Option<Value>,
    /// Upper bound
    #[serde(default)]
    pub max: Option<Value>,
}

/// A filter widget's current value.
///
/// Deserialized by shape: an object with `start` or `end` is a [`Bounds`]
/// range, otherwise one with `min` or `max` is a [`NumericBounds`] range.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum LiveValue {
    /// Checkbox/toggle
    Toggle(bool),
    /// Single selection or free text
    Text(String),
    /// Multi-select
    List(Vec<Value>),
    /// Date or text range
    Range(Bounds),
    /// Numeric slider range
    NumericRange(NumericBounds),
    /// Any other shape; imposes no constraint
    Other(serde_json::Value),
}

impl LiveValue {
    fn from_json(raw: serde_json::Value) -> Self {
        use serde_json::Value as Json;
        let has = |key: &str| raw.get(key).is_some();
        let parsed = if has("start") || has("end") {
            serde_json::from_value(raw.clone()).map(Self::Range)
        } else if has("min") || has("max") {
            serde_json::from_value(raw.clone()).map(Self::NumericRange)
        } else {
            match raw {
                Json::Bool(on) => return Self::Toggle(on),
                Json::String(s) => return Self::Text(s),
                Json::Array(_) => serde_json::from_value(raw.clone()).map(Self::List),
                other => return Self::Other(other),
            }
        };
        parsed.unwrap_or_else(|_| Self::Other(raw))
    }
}

impl<'de> Deserialize<'de> for LiveValue {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        serde_json::Value::deserialize(deserializer).map(Self::from_json)
    }
}

fn open_bound(bound: Option<&Value>) -> Option<&Value> {
    bound.filter(|b| !b.is_blank())
}

impl LiveValue {
    /// Check if this value constrains nothing.
    #[must_use]
    pub fn is_unconstrained(&self) -> bool {
        match self {
            Self::Text(s) => s.is_empty() || s == "all",
            Self::Toggle(on) => !on,
            Self::List(items) => items.is_empty(),
            Self::Range(_) | Self::NumericRange(_) => false,
            Self::Other(_) => true,
        }
    }

    /// Test one cell.
    #[must_use]
    pub fn accepts(&self, cell: &Value) -> bool {
        match self {
            Self::Text(s) if s.is_empty() || s == "all" => true,
            Self::Text(s) => cell.to_text().to_lowercase().contains(&s.to_lowercase()),
            Self::Toggle(true) => {
                let text = cell.to_text();
                cell.is_truthy() && text != "false" && text != "0"
            }
            Self::Toggle(false) | Self::Other(_) => true,
            Self::List(items) if items.is_empty() => true,
            Self::List(items) => {
                let text = cell.to_text();
                items.iter().any(|item| item.to_text() == text)
            }
            Self::Range(Bounds { start, end }) => {
                open_bound(start.as_ref()).map_or(true, |lo| {
                    matches!(cell.loose_cmp(lo), Some(Ordering::Greater | Ordering::Equal))
                }) && open_bound(end.as_ref()).map_or(true, |hi| {
                    matches!(cell.loose_cmp(hi), Some(Ordering::Less | Ordering::Equal))
                })
            }
            Self::NumericRange(NumericBounds { min, max }) => {
                let n = cell.to_number();
                open_bound(min.as_ref()).map_or(true, |lo| n >= lo.to_number())
                    && open_bound(max.as_ref()).map_or(true, |hi| n <= hi.to_number())
            }
        }
    }
}

impl From<&str> for LiveValue {
    fn from(s: &str) -> Self {
        Self::Text(s.to_string())
    }
}

impl From<bool> for LiveValue {
    fn from(on: bool) -> Self {
        Self::Toggle(on)
    }
}

/// Apply every filter widget targeting `target_id`. Emitters AND together.
#[must_use]
pub fn apply_cross_filters(
    dataset: &Dataset,
    target_id: &str,
    widgets: &[WidgetBinding],
    live: &HashMap<String, LiveValue>,
) -> Dataset {
    let constraints: Vec<(&str, &LiveValue)> = widgets
        .iter()
        .filter(|w| w.is_filter() && w.targets(target_id))
        .filter_map(|w| {
            let value = live.get(&w.id)?;
            let field = w.field()?;
            (!value.is_unconstrained()).then_some((field, value))
        })
        .collect();

    if constraints.is_empty() {
        return dataset.clone();
    }

    tracing::debug!(widget = target_id, emitters = constraints.len(), "cross filters applied");
    dataset.filtered(|row| {
        constraints
            .iter()
            .all(|(field, value)| value.accepts(row.value(field)))
    })
}
