//! Parameter schema derivation for host functions
//!
//! A host function is described to the model by its canonical name and a
//! positional parameter schema. Both are computed from the function's type,
//! never by calling it.

use crate::functions::HostFunction;
use schemars::schema::{InstanceType, SingleOrVec};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use std::fmt;
use thiserror::Error;

/// Primitive parameter categories understood by the model's function-calling API
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PrimitiveType {
    String,
    Integer,
    Number,
    Boolean,
    Object,
    Array,
}

impl PrimitiveType {
    pub fn as_str(self) -> &'static str {
        match self {
            PrimitiveType::String => "string",
            PrimitiveType::Integer => "integer",
            PrimitiveType::Number => "number",
            PrimitiveType::Boolean => "boolean",
            PrimitiveType::Object => "object",
            PrimitiveType::Array => "array",
        }
    }

    /// Primitive category for a Rust type, if it has exactly one.
    ///
    /// The type's JSON schema must name a single, non-null instance type.
    /// `Option<T>` (`[T, null]`), `()` (`null`) and schema-less types such as
    /// `serde_json::Value` have no category.
    pub fn of<T: JsonSchema>() -> Option<Self> {
        let root = schemars::schema_for!(T);
        match root.schema.instance_type {
            Some(SingleOrVec::Single(instance)) => Self::from_instance_type(*instance),
            _ => None,
        }
    }

    fn from_instance_type(instance: InstanceType) -> Option<Self> {
        match instance {
            InstanceType::String => Some(PrimitiveType::String),
            InstanceType::Integer => Some(PrimitiveType::Integer),
            InstanceType::Number => Some(PrimitiveType::Number),
            InstanceType::Boolean => Some(PrimitiveType::Boolean),
            InstanceType::Object => Some(PrimitiveType::Object),
            InstanceType::Array => Some(PrimitiveType::Array),
            InstanceType::Null => None,
        }
    }
}

impl fmt::Display for PrimitiveType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Static description of one host parameter, before mapping
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ParamType {
    pub type_name: &'static str,
    pub primitive: Option<PrimitiveType>,
}

impl ParamType {
    pub fn of<T: JsonSchema>() -> Self {
        Self {
            type_name: std::any::type_name::<T>(),
            primitive: PrimitiveType::of::<T>(),
        }
    }
}

/// One positional parameter in a derived schema
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ParamSchema {
    pub position: usize,
    pub primitive: PrimitiveType,
}

impl ParamSchema {
    /// Property key the model must use for this parameter
    pub fn key(&self) -> String {
        self.position.to_string()
    }
}

/// Errors raised while deriving a descriptor. Both are configuration errors.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SchemaError {
    #[error("unsupported input kind: `{type_name}` is not a named function")]
    UnsupportedInputKind { type_name: String },

    #[error("function `{function}`: parameter {position} has type `{type_name}` with no primitive mapping")]
    UnknownPrimitiveType {
        function: String,
        position: usize,
        type_name: String,
    },
}

/// Name, description and parameter schema of a registered host function
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FunctionDescriptor {
    pub name: String,
    pub description: String,
    pub parameters: Vec<ParamSchema>,
}

impl FunctionDescriptor {
    /// Derive the descriptor for `F` without invoking it.
    ///
    /// # Errors
    ///
    /// `UnsupportedInputKind` when `F` is not a named function item,
    /// `UnknownPrimitiveType` when a parameter type has no mapping.
    pub fn derive<F, Args>(description: impl Into<String>) -> Result<Self, SchemaError>
    where
        F: HostFunction<Args>,
    {
        let name = canonical_name(std::any::type_name::<F>())?;

        let parameters = F::parameter_types()
            .into_iter()
            .enumerate()
            .map(|(position, param)| match param.primitive {
                Some(primitive) => Ok(ParamSchema {
                    position,
                    primitive,
                }),
                None => Err(SchemaError::UnknownPrimitiveType {
                    function: name.clone(),
                    position,
                    type_name: param.type_name.to_string(),
                }),
            })
            .collect::<Result<Vec<_>, _>>()?;

        Ok(Self {
            name,
            description: description.into(),
            parameters,
        })
    }

    pub fn arity(&self) -> usize {
        self.parameters.len()
    }

    /// JSON schema for the `parameters` field of a function definition.
    ///
    /// Every parameter is required and keyed by its stringified position.
    pub fn parameters_schema(&self) -> Value {
        let properties: serde_json::Map<String, Value> = self
            .parameters
            .iter()
            .map(|p| {
                (
                    p.key(),
                    json!({ "type": p.primitive.as_str(), "description": "" }),
                )
            })
            .collect();
        let required: Vec<String> = self.parameters.iter().map(ParamSchema::key).collect();

        json!({
            "type": "object",
            "properties": properties,
            "required": required,
        })
    }

    pub fn to_definition(&self) -> crate::llm::FunctionDefinition {
        crate::llm::FunctionDefinition {
            name: self.name.clone(),
            description: self.description.clone(),
            parameters: self.parameters_schema(),
        }
    }
}

/// Canonical function name from a fully qualified type name.
///
/// Generic arguments and the module path are stripped:
/// `inquiry::tools::lookup_city_latitude` becomes `lookup_city_latitude`, and
/// `app::Wrapper<u8>::shout` becomes `shout`.
/// Closures (`{{closure}}`), function pointers (`fn(..) -> ..`) and anything
/// else that is not a plain path are rejected.
///
/// # Errors
///
/// `UnsupportedInputKind` when the type name does not denote a named function.
pub fn canonical_name(type_name: &str) -> Result<String, SchemaError> {
    let unsupported = || SchemaError::UnsupportedInputKind {
        type_name: type_name.to_string(),
    };

    // Drop every generic argument list, including ones on enclosing types
    // (`Wrapper<u8>::shout`), before splitting off the module path.
    let mut path = String::with_capacity(type_name.len());
    let mut depth = 0usize;
    for c in type_name.chars() {
        match c {
            '<' => depth += 1,
            '>' => depth = depth.checked_sub(1).ok_or_else(unsupported)?,
            _ if depth == 0 => path.push(c),
            _ => {}
        }
    }
    if depth != 0 || path.contains(|c: char| matches!(c, '(' | '{' | ' ' | '&' | '[' | '*')) {
        return Err(unsupported());
    }

    let name = path.rsplit("::").next().unwrap_or(path.as_str());
    let mut chars = name.chars();
    let starts_ok = chars
        .next()
        .is_some_and(|c| c.is_alphabetic() || c == '_');
    if !starts_ok || !chars.all(|c| c.is_alphanumeric() || c == '_') {
        return Err(unsupported());
    }

    Ok(name.to_string())
}
