//! Host function registry and dispatcher
//!
//! Functions are registered once at startup and then shared read-only. The
//! model refers to them by canonical name and passes positional arguments as
//! text; `invoke` coerces those into the declared parameter types.

mod coerce;
mod host_fn;

pub use coerce::coerce;
pub use host_fn::{CallError, HostFunction};

use crate::llm::FunctionDefinition;
use crate::schema::{FunctionDescriptor, PrimitiveType, SchemaError};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::HashMap;
use std::sync::Arc;
use thiserror::Error;

type ErasedCall = dyn Fn(Vec<Value>) -> Result<String, CallError> + Send + Sync;

/// Dispatch-time failures
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DispatchError {
    #[error("unknown function `{name}`")]
    UnknownFunction { name: String },

    #[error("function `{name}` takes {expected} argument(s), got {actual}")]
    ArityMismatch {
        name: String,
        expected: usize,
        actual: usize,
    },

    #[error("function `{name}`: argument {position} is not a valid {expected}: {reason}")]
    ArgumentCoercion {
        name: String,
        position: usize,
        expected: PrimitiveType,
        reason: String,
    },
}

/// Entry in the menu of functions offered to the model
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FunctionListing {
    pub name: String,
    #[serde(skip_serializing_if = "String::is_empty", default)]
    pub description: String,
}

struct RegisteredFunction {
    descriptor: FunctionDescriptor,
    handle: Arc<ErasedCall>,
}

/// Registry of host functions, keyed by canonical name
#[derive(Default)]
pub struct FunctionRegistry {
    functions: HashMap<String, RegisteredFunction>,
    listing: Vec<FunctionListing>,
}

impl FunctionRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a host function under its own name.
    ///
    /// Registering the same name again replaces the earlier entry; its slot in
    /// the listing is kept.
    ///
    /// # Errors
    ///
    /// Returns a `SchemaError` when the function cannot be described.
    pub fn register<F, Args>(
        &mut self,
        function: F,
        description: impl Into<String>,
    ) -> Result<&FunctionDescriptor, SchemaError>
    where
        F: HostFunction<Args>,
        Args: 'static,
    {
        let descriptor = FunctionDescriptor::derive::<F, Args>(description)?;
        let name = descriptor.name.clone();

        let listing = FunctionListing {
            name: name.clone(),
            description: descriptor.description.clone(),
        };
        match self.listing.iter_mut().find(|l| l.name == name) {
            Some(existing) => {
                tracing::warn!(function = %name, "Replacing previously registered function");
                *existing = listing;
            }
            None => self.listing.push(listing),
        }

        tracing::debug!(
            function = %name,
            arity = descriptor.arity(),
            "Registered host function"
        );

        let handle: Arc<ErasedCall> = Arc::new(move |args| function.call(args));
        let entry = self
            .functions
            .entry(name)
            .and_modify(|e| {
                e.descriptor = descriptor.clone();
                e.handle = Arc::clone(&handle);
            })
            .or_insert_with(|| RegisteredFunction {
                descriptor: descriptor.clone(),
                handle: Arc::clone(&handle),
            });

        Ok(&entry.descriptor)
    }

    /// Invoke a registered function with positional text arguments.
    ///
    /// # Errors
    ///
    /// `UnknownFunction`, `ArityMismatch` or `ArgumentCoercion`.
    pub fn invoke(&self, name: &str, args: &[String]) -> Result<String, DispatchError> {
        let entry = self
            .functions
            .get(name)
            .ok_or_else(|| DispatchError::UnknownFunction {
                name: name.to_string(),
            })?;

        let expected = entry.descriptor.arity();
        if args.len() != expected {
            return Err(DispatchError::ArityMismatch {
                name: name.to_string(),
                expected,
                actual: args.len(),
            });
        }

        let values = entry
            .descriptor
            .parameters
            .iter()
            .zip(args)
            .map(|(param, raw)| {
                coerce(raw, param.primitive).map_err(|reason| DispatchError::ArgumentCoercion {
                    name: name.to_string(),
                    position: param.position,
                    expected: param.primitive,
                    reason,
                })
            })
            .collect::<Result<Vec<_>, _>>()?;

        let output = (entry.handle)(values).map_err(|e| DispatchError::ArgumentCoercion {
            name: name.to_string(),
            position: e.position,
            expected: entry.descriptor.parameters[e.position].primitive,
            reason: e.reason,
        })?;

        tracing::debug!(function = %name, output_len = output.len(), "Host function returned");
        Ok(output)
    }

    /// Function definitions for the model, in registration order
    pub fn definitions(&self) -> Vec<FunctionDefinition> {
        self.listing
            .iter()
            .filter_map(|l| self.functions.get(&l.name))
            .map(|f| f.descriptor.to_definition())
            .collect()
    }

    /// Name/description menu, in registration order
    pub fn listing(&self) -> &[FunctionListing] {
        &self.listing
    }

    pub fn descriptor(&self, name: &str) -> Option<&FunctionDescriptor> {
        self.functions.get(name).map(|f| &f.descriptor)
    }

    pub fn names(&self) -> Vec<&str> {
        self.listing.iter().map(|l| l.name.as_str()).collect()
    }

    pub fn len(&self) -> usize {
        self.functions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.functions.is_empty()
    }
}

impl std::fmt::Debug for FunctionRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FunctionRegistry")
            .field("functions", &self.names())
            .finish()
    }
}
