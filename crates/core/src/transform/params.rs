//! Parsing of multipart text fields into typed transform parameters.

use std::collections::HashMap;

use super::error::TransformError;
use super::format::OutputFormat;

/// Largest accepted quality value.
pub const MAX_QUALITY: u8 = 100;

/// Text fields of a transform form, keyed by field name.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FormFields(HashMap<String, String>);

impl FormFields {
    pub fn new() -> Self {
        Self::default()
    }

    /// Inserts a field. A repeated field keeps its first value.
    pub fn insert(&mut self, name: impl Into<String>, value: impl Into<String>) {
        self.0.entry(name.into()).or_insert_with(|| value.into());
    }

    pub fn get(&self, name: &str) -> Option<&str> {
        self.0.get(name).map(String::as_str)
    }

    /// Non-empty text value of a field.
    pub fn text(&self, name: &str) -> Option<&str> {
        self.get(name).filter(|v| !v.is_empty())
    }

    /// Strictly positive integer value of a field.
    pub fn positive_int(&self, name: &str) -> Option<u32> {
        self.get(name)
            .and_then(parse_leading_int)
            .filter(|v| *v > 0)
            .map(|v| v.min(u32::MAX as i64) as u32)
    }

    /// Quality value, falling back to `default` when absent, zero or unparsable.
    ///
    /// Values above [`MAX_QUALITY`] are an encoder error, not a bad request.
    pub fn quality(&self, default: u8) -> Result<u8, TransformError> {
        match self.positive_int("quality") {
            Some(q) if q > MAX_QUALITY as u32 => Err(TransformError::encode(format!(
                "expected an integer between 1 and {} for quality but received {}",
                MAX_QUALITY, q
            ))),
            Some(q) => Ok(q as u8),
            None => Ok(default),
        }
    }

    pub fn flag(&self, name: &str) -> bool {
        self.get(name) == Some("true")
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for FormFields {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut fields = FormFields::new();
        for (k, v) in iter {
            fields.insert(k, v);
        }
        fields
    }
}

/// Parses leading decimal digits the way browsers' `parseInt` does:
/// leading whitespace and an optional sign are accepted, trailing garbage is
/// ignored, and a value without any digit is rejected.
pub fn parse_leading_int(raw: &str) -> Option<i64> {
    let s = raw.trim_start();
    let (negative, rest) = match s.as_bytes().first() {
        Some(b'-') => (true, &s[1..]),
        Some(b'+') => (false, &s[1..]),
        _ => (false, s),
    };

    let digits: &str = {
        let end = rest
            .char_indices()
            .find(|(_, c)| !c.is_ascii_digit())
            .map(|(i, _)| i)
            .unwrap_or(rest.len());
        &rest[..end]
    };

    if digits.is_empty() {
        return None;
    }

    let value = digits.parse::<i64>().unwrap_or(i64::MAX);
    Some(if negative { -value } else { value })
}

/// Parameters for the compress operation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CompressParams {
    pub quality: u8,
    pub width: Option<u32>,
    pub height: Option<u32>,
    pub format: OutputFormat,
}

impl CompressParams {
    pub fn from_fields(fields: &FormFields, default_quality: u8) -> Result<Self, TransformError> {
        Ok(Self {
            quality: fields.quality(default_quality)?,
            width: fields.positive_int("width"),
            height: fields.positive_int("height"),
            format: fields
                .text("format")
                .map(OutputFormat::parse)
                .unwrap_or_default(),
        })
    }
}

/// Parameters for the resize operation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResizeParams {
    pub width: Option<u32>,
    pub height: Option<u32>,
    pub maintain_aspect_ratio: bool,
    pub format: OutputFormat,
}

impl ResizeParams {
    pub fn from_fields(fields: &FormFields) -> Result<Self, TransformError> {
        let width = fields.positive_int("width");
        let height = fields.positive_int("height");
        if width.is_none() && height.is_none() {
            return Err(TransformError::MissingDimensions);
        }

        Ok(Self {
            width,
            height,
            maintain_aspect_ratio: fields.flag("maintainAspectRatio"),
            format: fields
                .text("format")
                .map(OutputFormat::parse)
                .unwrap_or_default(),
        })
    }
}

/// Parameters for the convert operation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConvertParams {
    pub format: OutputFormat,
    pub quality: u8,
}

impl ConvertParams {
    pub fn from_fields(fields: &FormFields, default_quality: u8) -> Result<Self, TransformError> {
        let format = match fields.text("format").map(|f| f.trim().to_ascii_lowercase()) {
            None => return Err(TransformError::MissingTargetFormat),
            Some(f) if f.is_empty() || f == "original" => {
                return Err(TransformError::MissingTargetFormat)
            }
            Some(f) => OutputFormat::parse(&f),
        };

        Ok(Self {
            format,
            quality: fields.quality(default_quality)?,
        })
    }
}
