//! Data models for the Quote Engine.
//!
//! The `models` module defines the shapes shared by every pricing
//! path: the input-field schema a service package declares, the
//! user-entered values keyed by field, and the priced result of a
//! package (`total` plus an ordered `breakdown`).  They derive
//! `Serialize` (and `Deserialize` where values cross the boundary) so
//! the presentation and export collaborators can consume them as JSON.

use indexmap::IndexMap;
use serde::{Deserialize, Deserializer, Serialize};
use std::collections::BTreeMap;

/// Maps NaN and the infinities to zero.  Every numeric input that
/// reaches an arithmetic path goes through this first.
pub fn finite_or_zero(value: f64) -> f64 {
    if value.is_finite() {
        value
    } else {
        0.0
    }
}

/// One entry of a select field.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct SelectOption {
    pub value: &'static str,
    pub label: &'static str,
}

/// The closed set of field types a package may declare.  The default
/// lives inside the variant so it always has the variant's type.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum FieldKind {
    Number {
        min: Option<f64>,
        max: Option<f64>,
        default: f64,
    },
    Select {
        options: &'static [SelectOption],
        default: &'static str,
    },
    /// `multiplier` is applied by the package when the box is ticked:
    /// most packages add it as a flat amount, a few use it as a factor.
    Checkbox { multiplier: f64, default: bool },
}

/// Describes one configurable parameter of a service package.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct InputField {
    /// Unique within the owning service.
    pub key: &'static str,
    pub label: &'static str,
    #[serde(flatten)]
    pub kind: FieldKind,
}

impl InputField {
    pub const fn number(
        key: &'static str,
        label: &'static str,
        min: Option<f64>,
        max: Option<f64>,
        default: f64,
    ) -> Self {
        Self {
            key,
            label,
            kind: FieldKind::Number { min, max, default },
        }
    }

    pub const fn select(
        key: &'static str,
        label: &'static str,
        options: &'static [SelectOption],
        default: &'static str,
    ) -> Self {
        Self {
            key,
            label,
            kind: FieldKind::Select { options, default },
        }
    }

    pub const fn checkbox(key: &'static str, label: &'static str, multiplier: f64) -> Self {
        Self {
            key,
            label,
            kind: FieldKind::Checkbox {
                multiplier,
                default: false,
            },
        }
    }

    /// The field's default as a form value.
    pub fn default_value(&self) -> FieldValue {
        match self.kind {
            FieldKind::Number { default, .. } => FieldValue::Number(default),
            FieldKind::Select { default, .. } => FieldValue::Text(default.to_string()),
            FieldKind::Checkbox { default, .. } => FieldValue::Flag(default),
        }
    }

    /// Checks a well-typed value against the field's constraints and
    /// returns a message describing the first violation.
    pub fn violation(&self, value: &FieldValue) -> Option<String> {
        match (self.kind, value) {
            (FieldKind::Number { min, max, .. }, FieldValue::Number(n)) => {
                if !n.is_finite() {
                    return Some("valor numérico inválido".to_string());
                }
                if let Some(min) = min.filter(|min| n < min) {
                    return Some(format!("valor abaixo do mínimo ({min})"));
                }
                if let Some(max) = max.filter(|max| n > max) {
                    return Some(format!("valor acima do máximo ({max})"));
                }
                None
            }
            (FieldKind::Select { options, .. }, FieldValue::Text(choice)) => {
                if options.iter().any(|o| o.value == choice.as_str()) {
                    None
                } else {
                    Some(format!("opção desconhecida: {choice}"))
                }
            }
            (FieldKind::Checkbox { .. }, FieldValue::Flag(_)) => None,
            _ => Some("tipo de valor incompatível com o campo".to_string()),
        }
    }

    /// True when the declared default satisfies the field's own
    /// `min`/`max`/`options` constraints.
    pub fn default_is_consistent(&self) -> bool {
        if let FieldKind::Select { options, .. } = self.kind {
            if options.is_empty() {
                return false;
            }
        }
        self.violation(&self.default_value()).is_none()
    }
}

/// Multiplier declared by the checkbox `key` in `inputs`; zero when the
/// key is absent or is not a checkbox.
pub fn checkbox_multiplier(inputs: &[InputField], key: &str) -> f64 {
    inputs
        .iter()
        .find(|field| field.key == key)
        .and_then(|field| match field.kind {
            FieldKind::Checkbox { multiplier, .. } => Some(multiplier),
            _ => None,
        })
        .unwrap_or(0.0)
}

/// A single user-entered value.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum FieldValue {
    Flag(bool),
    Number(f64),
    Text(String),
    /// JSON `null`: a field the form left untouched.
    Empty,
    /// Arrays, objects and anything else no field can read.  Resolution
    /// replaces it with the field default.
    Invalid(serde_json::Value),
}

impl FieldValue {
    /// Numeric reading of the value.  Numeric strings are accepted,
    /// with a decimal comma when no dot is present ("1900,50").
    pub fn as_number(&self) -> Option<f64> {
        match self {
            FieldValue::Number(n) if n.is_finite() => Some(*n),
            FieldValue::Text(s) => {
                let s = s.trim();
                let parsed = if s.contains('.') {
                    s.parse::<f64>()
                } else {
                    s.replace(',', ".").parse::<f64>()
                };
                parsed.ok().filter(|n| n.is_finite())
            }
            _ => None,
        }
    }

    pub fn as_flag(&self) -> Option<bool> {
        match self {
            FieldValue::Flag(b) => Some(*b),
            FieldValue::Text(s) => match s.trim() {
                "true" => Some(true),
                "false" => Some(false),
                _ => None,
            },
            _ => None,
        }
    }

    pub fn as_text(&self) -> Option<&str> {
        match self {
            FieldValue::Text(s) => Some(s),
            _ => None,
        }
    }
}

/// Reads a JSON number the way form fields are read: numeric strings
/// are accepted and anything unreadable (`null`, `""`, `"abc"`, arrays)
/// becomes 0 instead of failing the whole document.
pub fn lenient_number<'de, D>(deserializer: D) -> Result<f64, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(FieldValue::deserialize(deserializer)?
        .as_number()
        .unwrap_or(0.0))
}

/// Like [`lenient_number`] for optional amounts: unreadable is `None`.
pub fn lenient_option<'de, D>(deserializer: D) -> Result<Option<f64>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(FieldValue::deserialize(deserializer)?.as_number())
}

impl From<f64> for FieldValue {
    fn from(value: f64) -> Self {
        FieldValue::Number(value)
    }
}

impl From<bool> for FieldValue {
    fn from(value: bool) -> Self {
        FieldValue::Flag(value)
    }
}

impl From<&str> for FieldValue {
    fn from(value: &str) -> Self {
        FieldValue::Text(value.to_string())
    }
}

impl From<String> for FieldValue {
    fn from(value: String) -> Self {
        FieldValue::Text(value)
    }
}

/// The values of one form session, keyed by `InputField::key`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Values(BTreeMap<String, FieldValue>);

impl Values {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder-style insert.
    pub fn with(mut self, key: &str, value: impl Into<FieldValue>) -> Self {
        self.insert(key, value);
        self
    }

    pub fn insert(&mut self, key: &str, value: impl Into<FieldValue>) {
        self.0.insert(key.to_string(), value.into());
    }

    pub fn get(&self, key: &str) -> Option<&FieldValue> {
        self.0.get(key)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&String, &FieldValue)> {
        self.0.iter()
    }

    /// Numeric value of `key`; missing or unreadable values count as 0.
    pub fn number(&self, key: &str) -> f64 {
        self.get(key).and_then(FieldValue::as_number).unwrap_or(0.0)
    }

    /// Like [`Values::number`] but negative readings also count as 0.
    pub fn quantity(&self, key: &str) -> f64 {
        self.number(key).max(0.0)
    }

    pub fn flag(&self, key: &str) -> bool {
        self.get(key).and_then(FieldValue::as_flag).unwrap_or(false)
    }

    pub fn text(&self, key: &str) -> Option<&str> {
        self.get(key).and_then(FieldValue::as_text)
    }
}

/// Ordered, named price lines of a package.  Keys are stable strings
/// reused by the percentage-of-total displays.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Breakdown(IndexMap<String, f64>);

impl Breakdown {
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends a line.  Non-finite amounts are stored as 0; a repeated
    /// key accumulates into its existing line.
    pub fn push(&mut self, key: &str, amount: f64) {
        *self.0.entry(key.to_string()).or_insert(0.0) += finite_or_zero(amount);
    }

    pub fn get(&self, key: &str) -> Option<f64> {
        self.0.get(key).copied()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&String, &f64)> {
        self.0.iter()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Sum of every line, in insertion order.
    pub fn sum(&self) -> f64 {
        self.0.values().sum()
    }
}

impl<'a> FromIterator<(&'a str, f64)> for Breakdown {
    fn from_iter<I: IntoIterator<Item = (&'a str, f64)>>(iter: I) -> Self {
        let mut breakdown = Breakdown::new();
        for (key, amount) in iter {
            breakdown.push(key, amount);
        }
        breakdown
    }
}

/// Priced result of one service package.  `total` is always the sum of
/// `breakdown`, because the only constructor derives it from there.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ServiceQuote {
    pub total: f64,
    pub breakdown: Breakdown,
}

impl ServiceQuote {
    pub fn from_breakdown(breakdown: Breakdown) -> Self {
        Self {
            total: breakdown.sum(),
            breakdown,
        }
    }

    pub fn from_lines<'a>(lines: impl IntoIterator<Item = (&'a str, f64)>) -> Self {
        Self::from_breakdown(lines.into_iter().collect())
    }

    /// Each breakdown line as a percentage of `total`; all zero when the
    /// total is zero.
    pub fn shares(&self) -> IndexMap<String, f64> {
        self.breakdown
            .iter()
            .map(|(key, amount)| {
                let share = if self.total != 0.0 {
                    amount / self.total * 100.0
                } else {
                    0.0
                };
                (key.clone(), share)
            })
            .collect()
    }
}
