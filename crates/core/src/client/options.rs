//! Typed per-tool processing options.
//!
//! Each tool has its own options struct. Known keys are coerced into typed
//! fields; anything else is kept verbatim in an `extra` bag so callers can
//! still send arbitrary form fields. Options are never validated against the
//! endpoint they end up posted to.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

use crate::transform::parse_leading_int;

/// A single option value as set by presentation code.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum OptionValue {
    Bool(bool),
    Int(i64),
    Float(f64),
    Text(String),
    Unset,
}

impl OptionValue {
    /// Unset values and empty strings are never serialized.
    pub fn is_empty(&self) -> bool {
        match self {
            Self::Unset => true,
            Self::Text(s) => s.is_empty(),
            _ => false,
        }
    }

    /// The form-field text for this value, or `None` when it is empty.
    pub fn to_form_value(&self) -> Option<String> {
        match self {
            Self::Unset => None,
            Self::Bool(b) => Some(b.to_string()),
            Self::Int(n) => Some(n.to_string()),
            Self::Float(f) => Some(f.to_string()),
            Self::Text(s) if s.is_empty() => None,
            Self::Text(s) => Some(s.clone()),
        }
    }

    /// Coerces to a positive integer. Zero, negatives and junk yield `None`.
    pub fn as_positive_int(&self) -> Option<u32> {
        let n = match self {
            Self::Int(n) => *n,
            Self::Float(f) if f.is_finite() => f.trunc() as i64,
            Self::Text(s) => parse_leading_int(s)?,
            _ => return None,
        };
        u32::try_from(n).ok().filter(|n| *n > 0)
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Self::Bool(b) => Some(*b),
            Self::Int(n) => Some(*n != 0),
            Self::Text(s) => match s.trim() {
                "true" => Some(true),
                "false" => Some(false),
                _ => None,
            },
            _ => None,
        }
    }

    pub fn as_text(&self) -> Option<String> {
        self.to_form_value()
    }
}

impl From<bool> for OptionValue {
    fn from(value: bool) -> Self {
        Self::Bool(value)
    }
}

impl From<i64> for OptionValue {
    fn from(value: i64) -> Self {
        Self::Int(value)
    }
}

impl From<i32> for OptionValue {
    fn from(value: i32) -> Self {
        Self::Int(value.into())
    }
}

impl From<u32> for OptionValue {
    fn from(value: u32) -> Self {
        Self::Int(value.into())
    }
}

impl From<f64> for OptionValue {
    fn from(value: f64) -> Self {
        Self::Float(value)
    }
}

impl From<&str> for OptionValue {
    fn from(value: &str) -> Self {
        Self::Text(value.to_string())
    }
}

impl From<String> for OptionValue {
    fn from(value: String) -> Self {
        Self::Text(value)
    }
}

impl<T: Into<OptionValue>> From<Option<T>> for OptionValue {
    fn from(value: Option<T>) -> Self {
        value.map(Into::into).unwrap_or(Self::Unset)
    }
}

/// Options for one tool.
pub trait ToolOptions: Clone + fmt::Debug + Send + Sync + 'static {
    /// Merges a single key. Empty or uncoercible values clear the field.
    fn apply(&mut self, key: &str, value: OptionValue);

    /// Reads back a single key.
    fn get(&self, key: &str) -> Option<OptionValue>;

    /// Serializes every non-empty option as a form field.
    fn form_fields(&self) -> Vec<(String, String)>;

    /// The requested output format, used for naming the processed file.
    fn format(&self) -> Option<&str>;
}

fn collect_fields(
    known: Vec<(&str, OptionValue)>,
    extra: &BTreeMap<String, OptionValue>,
) -> Vec<(String, String)> {
    known
        .into_iter()
        .map(|(k, v)| (k.to_string(), v))
        .chain(extra.iter().map(|(k, v)| (k.clone(), v.clone())))
        .filter_map(|(k, v)| v.to_form_value().map(|text| (k, text)))
        .collect()
}

fn apply_extra(extra: &mut BTreeMap<String, OptionValue>, key: &str, value: OptionValue) {
    if value.is_empty() {
        extra.remove(key);
    } else {
        extra.insert(key.to_string(), value);
    }
}

/// Options for the compress tool.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CompressOptions {
    pub quality: Option<u32>,
    pub width: Option<u32>,
    pub height: Option<u32>,
    pub format: Option<String>,
    #[serde(default, flatten)]
    pub extra: BTreeMap<String, OptionValue>,
}

impl CompressOptions {
    pub fn with_quality(mut self, quality: u32) -> Self {
        self.quality = Some(quality);
        self
    }

    pub fn with_format(mut self, format: impl Into<String>) -> Self {
        self.format = Some(format.into());
        self
    }
}

impl ToolOptions for CompressOptions {
    fn apply(&mut self, key: &str, value: OptionValue) {
        match key {
            "quality" => self.quality = value.as_positive_int(),
            "width" => self.width = value.as_positive_int(),
            "height" => self.height = value.as_positive_int(),
            "format" => self.format = value.as_text(),
            _ => apply_extra(&mut self.extra, key, value),
        }
    }

    fn get(&self, key: &str) -> Option<OptionValue> {
        match key {
            "quality" => self.quality.map(Into::into),
            "width" => self.width.map(Into::into),
            "height" => self.height.map(Into::into),
            "format" => self.format.clone().map(Into::into),
            _ => self.extra.get(key).cloned(),
        }
    }

    fn form_fields(&self) -> Vec<(String, String)> {
        collect_fields(
            vec![
                ("quality", self.quality.into()),
                ("width", self.width.into()),
                ("height", self.height.into()),
                ("format", self.format.clone().into()),
            ],
            &self.extra,
        )
    }

    fn format(&self) -> Option<&str> {
        self.format.as_deref()
    }
}

/// Options for the resize tool.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ResizeOptions {
    pub width: Option<u32>,
    pub height: Option<u32>,
    pub maintain_aspect_ratio: Option<bool>,
    pub format: Option<String>,
    pub percentage: Option<u32>,
    pub resize_method: Option<String>,
    #[serde(default, flatten)]
    pub extra: BTreeMap<String, OptionValue>,
}

impl ResizeOptions {
    pub fn with_box(mut self, width: Option<u32>, height: Option<u32>) -> Self {
        self.width = width;
        self.height = height;
        self
    }

    pub fn keep_aspect_ratio(mut self, keep: bool) -> Self {
        self.maintain_aspect_ratio = Some(keep);
        self
    }
}

impl ToolOptions for ResizeOptions {
    fn apply(&mut self, key: &str, value: OptionValue) {
        match key {
            "width" => self.width = value.as_positive_int(),
            "height" => self.height = value.as_positive_int(),
            "maintainAspectRatio" => self.maintain_aspect_ratio = value.as_bool(),
            "format" => self.format = value.as_text(),
            "percentage" => self.percentage = value.as_positive_int(),
            "resizeMethod" => self.resize_method = value.as_text(),
            _ => apply_extra(&mut self.extra, key, value),
        }
    }

    fn get(&self, key: &str) -> Option<OptionValue> {
        match key {
            "width" => self.width.map(Into::into),
            "height" => self.height.map(Into::into),
            "maintainAspectRatio" => self.maintain_aspect_ratio.map(Into::into),
            "format" => self.format.clone().map(Into::into),
            "percentage" => self.percentage.map(Into::into),
            "resizeMethod" => self.resize_method.clone().map(Into::into),
            _ => self.extra.get(key).cloned(),
        }
    }

    fn form_fields(&self) -> Vec<(String, String)> {
        collect_fields(
            vec![
                ("width", self.width.into()),
                ("height", self.height.into()),
                ("maintainAspectRatio", self.maintain_aspect_ratio.into()),
                ("format", self.format.clone().into()),
                ("percentage", self.percentage.into()),
                ("resizeMethod", self.resize_method.clone().into()),
            ],
            &self.extra,
        )
    }

    fn format(&self) -> Option<&str> {
        self.format.as_deref()
    }
}

/// Options for the convert tool.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ConvertOptions {
    pub format: Option<String>,
    pub quality: Option<u32>,
    #[serde(default, flatten)]
    pub extra: BTreeMap<String, OptionValue>,
}

impl ConvertOptions {
    pub fn targeting(format: impl Into<String>) -> Self {
        Self {
            format: Some(format.into()),
            ..Default::default()
        }
    }
}

impl ToolOptions for ConvertOptions {
    fn apply(&mut self, key: &str, value: OptionValue) {
        match key {
            "format" => self.format = value.as_text(),
            "quality" => self.quality = value.as_positive_int(),
            _ => apply_extra(&mut self.extra, key, value),
        }
    }

    fn get(&self, key: &str) -> Option<OptionValue> {
        match key {
            "format" => self.format.clone().map(Into::into),
            "quality" => self.quality.map(Into::into),
            _ => self.extra.get(key).cloned(),
        }
    }

    fn form_fields(&self) -> Vec<(String, String)> {
        collect_fields(
            vec![
                ("format", self.format.clone().into()),
                ("quality", self.quality.into()),
            ],
            &self.extra,
        )
    }

    fn format(&self) -> Option<&str> {
        self.format.as_deref()
    }
}
