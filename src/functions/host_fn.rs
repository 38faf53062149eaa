//! Typed host functions behind a uniform, erased call signature

use crate::schema::ParamType;
use schemars::JsonSchema;
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::Value;
use std::fmt::Display;

/// Failure to turn a coerced JSON value into the parameter's Rust type
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CallError {
    pub position: usize,
    pub reason: String,
}

/// A plain Rust function the model may call.
///
/// Implemented for every `Fn(A0, .., An) -> R` up to six parameters where each
/// parameter is `JsonSchema + DeserializeOwned + Serialize` and the result is
/// `Display`.
/// `Args` is the parameter tuple; it only disambiguates the impls.
pub trait HostFunction<Args>: Send + Sync + 'static {
    /// Static parameter types, in positional order
    fn parameter_types() -> Vec<ParamType>;

    /// Call with one coerced value per parameter, rendering the result as text.
    ///
    /// The caller guarantees `args.len()` equals the arity.
    fn call(&self, args: Vec<Value>) -> Result<String, CallError>;
}

fn decode<T: DeserializeOwned + Serialize>(position: usize, value: Value) -> Result<T, CallError> {
    let decoded: T = serde_json::from_value(value).map_err(|e| CallError {
        position,
        reason: e.to_string(),
    })?;

    // Narrowing can overflow (1e300 into an f32 is infinite); a value with no
    // JSON form never reaches the function.
    match serde_json::to_value(&decoded) {
        Ok(Value::Null) | Err(_) => Err(CallError {
            position,
            reason: "value is out of range for the parameter type".to_string(),
        }),
        Ok(_) => Ok(decoded),
    }
}

macro_rules! impl_host_function {
    ($($ty:ident => $var:ident),*) => {
        impl<F, R, $($ty,)*> HostFunction<($($ty,)*)> for F
        where
            F: Fn($($ty),*) -> R + Send + Sync + 'static,
            R: Display,
            $($ty: JsonSchema + DeserializeOwned + Serialize + 'static,)*
        {
            fn parameter_types() -> Vec<ParamType> {
                vec![$(ParamType::of::<$ty>()),*]
            }

            #[allow(unused_mut, unused_variables)]
            fn call(&self, args: Vec<Value>) -> Result<String, CallError> {
                let mut values = args.into_iter().enumerate();
                $(
                    let $var: $ty = match values.next() {
                        Some((position, value)) => decode(position, value)?,
                        None => {
                            return Err(CallError {
                                position: 0,
                                reason: "missing argument".to_string(),
                            })
                        }
                    };
                )*
                Ok((self)($($var),*).to_string())
            }
        }
    };
}

impl_host_function!();
impl_host_function!(A0 => a0);
impl_host_function!(A0 => a0, A1 => a1);
impl_host_function!(A0 => a0, A1 => a1, A2 => a2);
impl_host_function!(A0 => a0, A1 => a1, A2 => a2, A3 => a3);
impl_host_function!(A0 => a0, A1 => a1, A2 => a2, A3 => a3, A4 => a4);
impl_host_function!(A0 => a0, A1 => a1, A2 => a2, A3 => a3, A4 => a4, A5 => a5);

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::PrimitiveType;
    use serde_json::json;

    fn concat(a: String, b: String) -> String {
        format!("{a}|{b}")
    }

    fn answer() -> i32 {
        42
    }

    fn scale(x: f64, times: u8) -> f64 {
        x * f64::from(times)
    }

    fn call_it<F: HostFunction<Args>, Args>(f: &F, args: Vec<Value>) -> Result<String, CallError> {
        f.call(args)
    }

    fn types_of<F: HostFunction<Args>, Args>(_f: &F) -> Vec<ParamType> {
        F::parameter_types()
    }

    #[test]
    fn test_call_preserves_argument_order() {
        let out = call_it(&concat, vec![json!("a"), json!("b")]).unwrap();
        assert_eq!(out, "a|b");
    }

    #[test]
    fn test_zero_arity() {
        assert!(types_of(&answer).is_empty());
        assert_eq!(call_it(&answer, vec![]).unwrap(), "42");
    }

    #[test]
    fn test_parameter_types() {
        let types = types_of(&scale);
        assert_eq!(types.len(), 2);
        assert_eq!(types[0].primitive, Some(PrimitiveType::Number));
        assert_eq!(types[1].primitive, Some(PrimitiveType::Integer));
        assert_eq!(types[1].type_name, "u8");
    }

    #[test]
    fn test_out_of_range_value_reports_position() {
        let err = call_it(&scale, vec![json!(1.5), json!(300)]).unwrap_err();
        assert_eq!(err.position, 1);
    }

    fn halve(x: f32) -> f32 {
        x / 2.0
    }

    #[test]
    fn test_float_overflow_is_rejected() {
        let err = call_it(&halve, vec![json!(1e300)]).unwrap_err();
        assert_eq!(err.position, 0);
        assert!(err.reason.contains("out of range"));

        assert_eq!(call_it(&halve, vec![json!(3.0)]).unwrap(), "1.5");
    }
}
