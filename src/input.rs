//! Where a prediction record comes from.

use serde_json::Value;
use std::fs;
use std::io::Read;
use std::path::{Path, PathBuf};

use crate::error::InputError;
use crate::reconcile::InputRecord;

/// Source of the single input record.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InputSource {
    /// A JSON file on disk.
    Path(PathBuf),
    /// A JSON document passed inline.
    Literal(String),
    /// Read everything from standard input.
    Stdin,
}

impl InputSource {
    /// An argument naming an existing file is read as a path, anything else
    /// is parsed as JSON. No argument means stdin.
    pub fn from_arg(arg: Option<&str>) -> Self {
        match arg {
            Some(arg) if Path::new(arg).exists() => InputSource::Path(PathBuf::from(arg)),
            Some(arg) => InputSource::Literal(arg.to_string()),
            None => InputSource::Stdin,
        }
    }

    /// Read and parse the record; `stdin` is only touched for [`InputSource::Stdin`].
    pub fn read_record<R: Read>(&self, stdin: R) -> Result<InputRecord, InputError> {
        let raw = match self {
            InputSource::Path(path) => fs::read_to_string(path).map_err(|source| InputError::File {
                path: path.clone(),
                source,
            })?,
            InputSource::Literal(text) => text.clone(),
            InputSource::Stdin => {
                let mut buf = String::new();
                let mut stdin = stdin;
                stdin.read_to_string(&mut buf).map_err(InputError::Stdin)?;
                if buf.trim().is_empty() {
                    return Err(InputError::Empty);
                }
                buf
            }
        };
        parse_record(&raw)
    }
}

/// Parse a JSON document that must be an object.
pub fn parse_record(raw: &str) -> Result<InputRecord, InputError> {
    match serde_json::from_str::<Value>(raw)? {
        Value::Object(map) => Ok(map),
        other => Err(InputError::NotAnObject(json_type_name(&other))),
    }
}

fn json_type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}
