use std::collections::HashMap;
use std::fmt;

use regex::Regex;
use serde::Serialize;
use serde_json::{Map, Value};

use crate::core::context::RequestContext;
use crate::core::errors::{ErrorKind, PgpVaultError, Result};

use super::Backend;

/// Logical operation the host requests on a path.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Operation {
    Create,
    Read,
    Update,
    Delete,
    List,
}

impl fmt::Display for Operation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Create => "create",
            Self::Read => "read",
            Self::Update => "update",
            Self::Delete => "delete",
            Self::List => "list",
        };
        f.write_str(name)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldType {
    String,
    Bool,
    Int,
}

/// Declared request field: name, type and optional default.
#[derive(Debug, Clone)]
pub struct FieldSchema {
    pub name: &'static str,
    pub kind: FieldType,
    pub default: Option<Value>,
}

impl FieldSchema {
    pub fn string(name: &'static str) -> Self {
        Self {
            name,
            kind: FieldType::String,
            default: None,
        }
    }

    pub fn bool(name: &'static str) -> Self {
        Self {
            name,
            kind: FieldType::Bool,
            default: Some(Value::Bool(false)),
        }
    }

    pub fn int(name: &'static str) -> Self {
        Self {
            name,
            kind: FieldType::Int,
            default: None,
        }
    }

    pub fn with_default(mut self, value: impl Into<Value>) -> Self {
        self.default = Some(value.into());
        self
    }
}

/// Request fields after merging the body with path captures.
///
/// Lookups are typed against the path's schema: an undeclared field is
/// a programming error reported as `InvalidField`, a declared field with
/// the wrong JSON type is a client error.
pub struct FieldData<'s> {
    raw: Map<String, Value>,
    schema: &'s [FieldSchema],
}

impl<'s> FieldData<'s> {
    pub fn new(
        mut raw: Map<String, Value>,
        captures: HashMap<String, String>,
        schema: &'s [FieldSchema],
    ) -> Self {
        for (name, value) in captures {
            raw.insert(name, Value::String(value));
        }
        Self { raw, schema }
    }

    fn lookup(&self, name: &str, kind: FieldType) -> Result<Option<&Value>> {
        let field = self
            .schema
            .iter()
            .find(|f| f.name == name && f.kind == kind)
            .ok_or_else(|| PgpVaultError::InvalidField {
                field: name.to_string(),
                detail: "field is not declared on this path".into(),
            })?;

        Ok(self
            .raw
            .get(name)
            .filter(|v| !v.is_null())
            .or(field.default.as_ref()))
    }

    fn wrong_type(name: &str, expected: &str) -> PgpVaultError {
        PgpVaultError::InvalidField {
            field: name.to_string(),
            detail: format!("expected {expected}"),
        }
    }

    pub fn get_string(&self, name: &str) -> Result<Option<String>> {
        match self.lookup(name, FieldType::String)? {
            None => Ok(None),
            Some(Value::String(s)) => Ok(Some(s.clone())),
            Some(_) => Err(Self::wrong_type(name, "a string")),
        }
    }

    /// String field, treating absence as the empty string.
    pub fn string_or_empty(&self, name: &str) -> Result<String> {
        Ok(self.get_string(name)?.unwrap_or_default())
    }

    pub fn get_bool(&self, name: &str) -> Result<bool> {
        match self.lookup(name, FieldType::Bool)? {
            None => Ok(false),
            Some(Value::Bool(b)) => Ok(*b),
            Some(Value::String(s)) => s
                .parse::<bool>()
                .map_err(|_| Self::wrong_type(name, "a boolean")),
            Some(_) => Err(Self::wrong_type(name, "a boolean")),
        }
    }

    pub fn get_u32(&self, name: &str) -> Result<Option<u32>> {
        let parsed = match self.lookup(name, FieldType::Int)? {
            None => return Ok(None),
            Some(Value::Number(n)) => n.as_u64().and_then(|n| u32::try_from(n).ok()),
            Some(Value::String(s)) => s.trim().parse::<u32>().ok(),
            Some(_) => None,
        };
        parsed
            .map(Some)
            .ok_or_else(|| Self::wrong_type(name, "a non-negative integer"))
    }
}

pub type Handler = fn(&Backend, &RequestContext<'_>, &FieldData<'_>) -> Result<Map<String, Value>>;

/// One routable path: pattern, field schema and per-operation handlers.
pub struct PathDef {
    pub pattern: Regex,
    pub fields: Vec<FieldSchema>,
    pub operations: Vec<(Operation, Handler)>,
}

impl PathDef {
    /// `pattern` is anchored at both ends.
    pub fn new(pattern: &str, fields: Vec<FieldSchema>) -> Result<Self> {
        let pattern = Regex::new(&format!("^{pattern}$")).map_err(|e| PgpVaultError::InvalidConfig {
            detail: format!("bad path pattern '{pattern}': {e}"),
        })?;
        Ok(Self {
            pattern,
            fields,
            operations: Vec::new(),
        })
    }

    pub fn on(mut self, operation: Operation, handler: Handler) -> Self {
        self.operations.push((operation, handler));
        self
    }

    /// Named captures when `path` matches.
    pub fn captures(&self, path: &str) -> Option<HashMap<String, String>> {
        let caps = self.pattern.captures(path)?;
        Some(
            self.pattern
                .capture_names()
                .flatten()
                .filter_map(|name| caps.name(name).map(|m| (name.to_string(), m.as_str().to_string())))
                .collect(),
        )
    }

    pub fn handler(&self, operation: Operation) -> Option<Handler> {
        self.operations
            .iter()
            .find(|(op, _)| *op == operation)
            .map(|(_, handler)| *handler)
    }
}

/// A parsed call from the host.
#[derive(Debug, Clone)]
pub struct Request {
    pub operation: Operation,
    pub path: String,
    pub data: Map<String, Value>,
}

impl Request {
    pub fn new(operation: Operation, path: impl Into<String>) -> Self {
        Self {
            operation,
            path: path.into(),
            data: Map::new(),
        }
    }

    pub fn with(mut self, field: &str, value: impl Into<Value>) -> Self {
        self.data.insert(field.to_string(), value.into());
        self
    }
}

/// Structured result handed back to the host.
#[derive(Debug, Clone, Serialize)]
pub struct Response {
    pub status: u16,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<Map<String, Value>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl Response {
    pub fn ok(data: Map<String, Value>) -> Self {
        Self {
            status: 200,
            data: Some(data),
            error: None,
        }
    }

    /// Client errors carry their message; internal ones are masked.
    pub fn from_error(err: &PgpVaultError) -> Self {
        let kind = err.kind();
        let message = match kind {
            ErrorKind::Internal => "internal error".to_string(),
            _ => err.to_string(),
        };
        Self {
            status: kind.status(),
            data: None,
            error: Some(message),
        }
    }

    pub fn is_success(&self) -> bool {
        self.status == 200
    }

    /// String field of a successful response.
    pub fn str_field(&self, name: &str) -> Option<&str> {
        self.data.as_ref()?.get(name)?.as_str()
    }

    pub fn bool_field(&self, name: &str) -> Option<bool> {
        self.data.as_ref()?.get(name)?.as_bool()
    }
}
