// crates/lambda-stack-core/src/outputs.rs
// ============================================================================
// Module: Stack Outputs
// Description: Typed view over `terraform output -json` documents.
// Purpose: Parse declared outputs and resolve nested field paths.
// Dependencies: serde, serde_json, thiserror
// ============================================================================

//! ## Overview
//! Stack outputs are either flat scalars (a resource ARN) or nested maps (an
//! invocation result with a `statusCode` field). Numbers and booleans are
//! rendered as strings so a status code of `200` reads back as `"200"`.
//! Outputs flagged `sensitive` are masked in every rendered view.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::collections::BTreeMap;
use std::collections::BTreeSet;
use std::fmt;
use std::str::FromStr;

use serde::Deserialize;
use serde_json::Map;
use serde_json::Value;
use thiserror::Error;

// ============================================================================
// SECTION: Constants
// ============================================================================

/// Placeholder rendered in place of sensitive output values.
pub const REDACTED: &str = "<sensitive>";

/// Separator between output name and nested field segments.
const PATH_SEPARATOR: char = '.';

// ============================================================================
// SECTION: Errors
// ============================================================================

/// Errors raised when parsing or resolving stack outputs.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum OutputError {
    /// The output document is not valid JSON of the expected shape.
    #[error("invalid output json: {0}")]
    Parse(String),
    /// The output path is empty or contains an empty segment.
    #[error("invalid output path `{0}`")]
    InvalidPath(String),
    /// No output with this name was declared.
    #[error("output `{0}` not found")]
    MissingOutput(String),
    /// A nested field is absent.
    #[error("output `{path}` has no field `{field}`")]
    MissingField {
        /// Path resolved so far.
        path: String,
        /// Missing segment.
        field: String,
    },
    /// A nested segment was applied to a scalar or null value.
    #[error("output `{path}` is not a map or list")]
    NotAContainer {
        /// Path resolved so far.
        path: String,
    },
    /// A scalar was required but a composite value was found.
    #[error("output `{path}` is not a scalar")]
    NotAScalar {
        /// Path of the composite value.
        path: String,
    },
}

// ============================================================================
// SECTION: Output Values
// ============================================================================

/// A single output value.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum OutputValue {
    /// JSON null.
    Null,
    /// String, number, or boolean rendered as text.
    Scalar(String),
    /// Ordered list of values.
    List(Vec<Self>),
    /// String-keyed nested map.
    Map(BTreeMap<String, Self>),
}

impl OutputValue {
    /// Converts a JSON value, stringifying numbers and booleans.
    #[must_use]
    pub fn from_json(value: &Value) -> Self {
        match value {
            Value::Null => Self::Null,
            Value::Bool(flag) => Self::Scalar(flag.to_string()),
            Value::Number(number) => Self::Scalar(number.to_string()),
            Value::String(text) => Self::Scalar(text.clone()),
            Value::Array(items) => Self::List(items.iter().map(Self::from_json).collect()),
            Value::Object(entries) => Self::Map(
                entries.iter().map(|(key, value)| (key.clone(), Self::from_json(value))).collect(),
            ),
        }
    }

    /// Returns the scalar text, if this is a scalar.
    #[must_use]
    pub fn as_scalar(&self) -> Option<&str> {
        match self {
            Self::Scalar(text) => Some(text),
            _ => None,
        }
    }

    /// Returns the nested map, if this is a map.
    #[must_use]
    pub const fn as_map(&self) -> Option<&BTreeMap<String, Self>> {
        match self {
            Self::Map(entries) => Some(entries),
            _ => None,
        }
    }

    /// Converts back to JSON; scalars become JSON strings.
    #[must_use]
    pub fn to_json(&self) -> Value {
        match self {
            Self::Null => Value::Null,
            Self::Scalar(text) => Value::String(text.clone()),
            Self::List(items) => Value::Array(items.iter().map(Self::to_json).collect()),
            Self::Map(entries) => Value::Object(
                entries.iter().map(|(key, value)| (key.clone(), value.to_json())).collect(),
            ),
        }
    }

    /// Resolves one nested segment.
    fn child(&self, segment: &str) -> Option<&Self> {
        match self {
            Self::Map(entries) => entries.get(segment),
            Self::List(items) => segment.parse::<usize>().ok().and_then(|index| items.get(index)),
            Self::Null | Self::Scalar(_) => None,
        }
    }
}

/// Renders scalars as their text and null as the empty string; composites
/// render as JSON.
impl fmt::Display for OutputValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Null => Ok(()),
            Self::Scalar(text) => f.write_str(text),
            Self::List(_) | Self::Map(_) => write!(f, "{}", self.to_json()),
        }
    }
}

// ============================================================================
// SECTION: Output Paths
// ============================================================================

/// Address of an output, optionally descending into nested fields.
///
/// # Invariants
/// - The output name and every field segment are non-empty.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord)]
pub struct OutputPath {
    /// Declared output name.
    output: String,
    /// Nested field segments, outermost first.
    fields: Vec<String>,
}

impl OutputPath {
    /// Parses a dotted path such as `use_case_2_lambda_result.statusCode`.
    ///
    /// # Errors
    ///
    /// Returns [`OutputError::InvalidPath`] when the path or any segment is empty.
    pub fn parse(raw: &str) -> Result<Self, OutputError> {
        let mut segments = raw.split(PATH_SEPARATOR);
        let output = segments.next().unwrap_or_default();
        if output.trim().is_empty() {
            return Err(OutputError::InvalidPath(raw.to_string()));
        }
        let fields: Vec<String> = segments.map(str::to_string).collect();
        if fields.iter().any(String::is_empty) {
            return Err(OutputError::InvalidPath(raw.to_string()));
        }
        Ok(Self {
            output: output.to_string(),
            fields,
        })
    }

    /// Returns the declared output name.
    #[must_use]
    pub fn output(&self) -> &str {
        &self.output
    }

    /// Returns the nested field segments.
    #[must_use]
    pub fn fields(&self) -> &[String] {
        &self.fields
    }
}

impl FromStr for OutputPath {
    type Err = OutputError;

    fn from_str(raw: &str) -> Result<Self, Self::Err> {
        Self::parse(raw)
    }
}

impl fmt::Display for OutputPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.output)?;
        for field in &self.fields {
            write!(f, "{PATH_SEPARATOR}{field}")?;
        }
        Ok(())
    }
}

// ============================================================================
// SECTION: Output Maps
// ============================================================================

/// Raw `terraform output -json` entry.
#[derive(Debug, Deserialize)]
struct RawOutput {
    /// Whether the output was declared sensitive.
    #[serde(default)]
    sensitive: bool,
    /// Output value.
    value: Value,
}

/// Declared outputs of a provisioned stack.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct OutputMap {
    /// Output values keyed by name.
    values: BTreeMap<String, OutputValue>,
    /// Names of outputs declared sensitive.
    sensitive: BTreeSet<String>,
}

impl OutputMap {
    /// Creates an empty output map.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Parses the document printed by `terraform output -json`.
    ///
    /// # Errors
    ///
    /// Returns [`OutputError::Parse`] when the document is not an object of
    /// `{ "sensitive": bool, "value": ... }` entries.
    pub fn from_terraform_json(document: &str) -> Result<Self, OutputError> {
        let trimmed = document.trim();
        if trimmed.is_empty() {
            return Ok(Self::new());
        }
        let raw: BTreeMap<String, RawOutput> =
            serde_json::from_str(trimmed).map_err(|err| OutputError::Parse(err.to_string()))?;
        let mut outputs = Self::new();
        for (name, entry) in raw {
            if entry.sensitive {
                outputs.sensitive.insert(name.clone());
            }
            outputs.values.insert(name, OutputValue::from_json(&entry.value));
        }
        Ok(outputs)
    }

    /// Inserts or replaces an output.
    pub fn insert(&mut self, name: impl Into<String>, value: OutputValue) {
        self.values.insert(name.into(), value);
    }

    /// Marks an output as sensitive.
    pub fn mark_sensitive(&mut self, name: impl Into<String>) {
        self.sensitive.insert(name.into());
    }

    /// Returns the output with `name`, if declared.
    #[must_use]
    pub fn get(&self, name: &str) -> Option<&OutputValue> {
        self.values.get(name)
    }

    /// Returns true when the output is declared sensitive.
    #[must_use]
    pub fn is_sensitive(&self, name: &str) -> bool {
        self.sensitive.contains(name)
    }

    /// Returns the declared output names in sorted order.
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.values.keys().map(String::as_str)
    }

    /// Returns the number of declared outputs.
    #[must_use]
    pub fn len(&self) -> usize {
        self.values.len()
    }

    /// Returns true when no outputs are declared.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Resolves an output path, descending through maps and list indices.
    ///
    /// # Errors
    ///
    /// Returns [`OutputError::MissingOutput`], [`OutputError::MissingField`], or
    /// [`OutputError::NotAContainer`] when the path does not resolve.
    pub fn lookup(&self, path: &OutputPath) -> Result<&OutputValue, OutputError> {
        let mut current = self
            .values
            .get(path.output())
            .ok_or_else(|| OutputError::MissingOutput(path.output().to_string()))?;
        let mut resolved = path.output().to_string();
        for field in path.fields() {
            if matches!(current, OutputValue::Null | OutputValue::Scalar(_)) {
                return Err(OutputError::NotAContainer {
                    path: resolved,
                });
            }
            current = current.child(field).ok_or_else(|| OutputError::MissingField {
                path: resolved.clone(),
                field: field.clone(),
            })?;
            resolved.push(PATH_SEPARATOR);
            resolved.push_str(field);
        }
        Ok(current)
    }

    /// Returns a scalar output as a string.
    ///
    /// # Errors
    ///
    /// Returns [`OutputError::MissingOutput`] or [`OutputError::NotAScalar`].
    pub fn string(&self, name: &str) -> Result<String, OutputError> {
        let value =
            self.values.get(name).ok_or_else(|| OutputError::MissingOutput(name.to_string()))?;
        match value {
            OutputValue::Null | OutputValue::Scalar(_) => Ok(value.to_string()),
            OutputValue::List(_) | OutputValue::Map(_) => Err(OutputError::NotAScalar {
                path: name.to_string(),
            }),
        }
    }

    /// Returns a map output with every value rendered as a string.
    ///
    /// # Errors
    ///
    /// Returns [`OutputError::MissingOutput`] or [`OutputError::NotAContainer`]
    /// when the output is not a map.
    pub fn string_map(&self, name: &str) -> Result<BTreeMap<String, String>, OutputError> {
        let value =
            self.values.get(name).ok_or_else(|| OutputError::MissingOutput(name.to_string()))?;
        let entries = value.as_map().ok_or_else(|| OutputError::NotAContainer {
            path: name.to_string(),
        })?;
        Ok(entries.iter().map(|(key, value)| (key.clone(), value.to_string())).collect())
    }

    /// Returns a JSON object with sensitive values masked.
    #[must_use]
    pub fn redacted_json(&self) -> Value {
        let mut object = Map::new();
        for (name, value) in &self.values {
            let rendered = if self.is_sensitive(name) {
                Value::String(REDACTED.to_string())
            } else {
                value.to_json()
            };
            object.insert(name.clone(), rendered);
        }
        Value::Object(object)
    }

    /// Returns a display adapter with sensitive values masked.
    #[must_use]
    pub const fn redacted(&self) -> Redacted<'_> {
        Redacted {
            outputs: self,
        }
    }
}

/// Display adapter that masks sensitive outputs.
pub struct Redacted<'a> {
    /// Outputs being rendered.
    outputs: &'a OutputMap,
}

impl fmt::Display for Redacted<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.outputs.redacted_json())
    }
}
