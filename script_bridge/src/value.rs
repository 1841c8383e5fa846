//! Guest values as seen from the native side of the boundary.

use std::fmt;

/// Opaque reference to a guest callable. Only the engine that issued it can
/// resolve it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct CallableRef(pub u64);

/// Opaque reference to a guest object instance.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct InstanceRef {
    pub id: u64,
    pub type_name: String,
}

#[derive(Debug, Clone, PartialEq)]
pub enum ScriptValue {
    None,
    Bool(bool),
    Int(i64),
    Float(f64),
    Str(String),
    List(Vec<ScriptValue>),
    Tuple(Vec<ScriptValue>),
    Callable(CallableRef),
    Instance(InstanceRef),
}

impl ScriptValue {
    /// Guest-facing type name, as used in error messages.
    pub fn type_name(&self) -> &str {
        match self {
            ScriptValue::None => "NoneType",
            ScriptValue::Bool(_) => "bool",
            ScriptValue::Int(_) => "int",
            ScriptValue::Float(_) => "float",
            ScriptValue::Str(_) => "str",
            ScriptValue::List(_) => "list",
            ScriptValue::Tuple(_) => "tuple",
            ScriptValue::Callable(_) => "function",
            ScriptValue::Instance(instance) => instance.type_name.as_str(),
        }
    }

    pub fn is_none(&self) -> bool {
        matches!(self, ScriptValue::None)
    }

    pub fn as_int(&self) -> Option<i64> {
        match self {
            ScriptValue::Int(value) => Some(*value),
            _ => None,
        }
    }

    /// Integer value of an int or bool, the values integer parameters accept.
    pub fn as_integer(&self) -> Option<i64> {
        match self {
            ScriptValue::Int(value) => Some(*value),
            ScriptValue::Bool(flag) => Some(i64::from(*flag)),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            ScriptValue::Str(value) => Some(value.as_str()),
            _ => None,
        }
    }

    /// Elements of a list or tuple.
    pub fn as_sequence(&self) -> Option<&[ScriptValue]> {
        match self {
            ScriptValue::List(items) | ScriptValue::Tuple(items) => Some(items.as_slice()),
            _ => None,
        }
    }

    pub fn as_tuple(&self) -> Option<&[ScriptValue]> {
        match self {
            ScriptValue::Tuple(items) => Some(items.as_slice()),
            _ => None,
        }
    }

    /// Truthiness for scalar and container values. Callables and instances
    /// are always true.
    pub fn truthy(&self) -> bool {
        match self {
            ScriptValue::None => false,
            ScriptValue::Bool(value) => *value,
            ScriptValue::Int(value) => *value != 0,
            ScriptValue::Float(value) => *value != 0.0,
            ScriptValue::Str(value) => !value.is_empty(),
            ScriptValue::List(items) | ScriptValue::Tuple(items) => !items.is_empty(),
            ScriptValue::Callable(_) | ScriptValue::Instance(_) => true,
        }
    }
}

impl fmt::Display for ScriptValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ScriptValue::None => f.write_str("None"),
            ScriptValue::Bool(true) => f.write_str("True"),
            ScriptValue::Bool(false) => f.write_str("False"),
            ScriptValue::Int(value) => write!(f, "{value}"),
            ScriptValue::Float(value) => write!(f, "{value:?}"),
            ScriptValue::Str(value) => write!(f, "{value:?}"),
            ScriptValue::List(items) => {
                f.write_str("[")?;
                write_items(f, items)?;
                f.write_str("]")
            }
            ScriptValue::Tuple(items) => {
                f.write_str("(")?;
                write_items(f, items)?;
                if items.len() == 1 {
                    f.write_str(",")?;
                }
                f.write_str(")")
            }
            ScriptValue::Callable(callable) => write!(f, "<function #{}>", callable.0),
            ScriptValue::Instance(instance) => {
                write!(f, "<{} object #{}>", instance.type_name, instance.id)
            }
        }
    }
}

fn write_items(f: &mut fmt::Formatter<'_>, items: &[ScriptValue]) -> fmt::Result {
    for (index, item) in items.iter().enumerate() {
        if index > 0 {
            f.write_str(", ")?;
        }
        write!(f, "{item}")?;
    }
    Ok(())
}

impl From<bool> for ScriptValue {
    fn from(value: bool) -> Self {
        ScriptValue::Bool(value)
    }
}

impl From<i32> for ScriptValue {
    fn from(value: i32) -> Self {
        ScriptValue::Int(i64::from(value))
    }
}

impl From<i64> for ScriptValue {
    fn from(value: i64) -> Self {
        ScriptValue::Int(value)
    }
}

impl From<f32> for ScriptValue {
    fn from(value: f32) -> Self {
        ScriptValue::Float(f64::from(value))
    }
}

impl From<f64> for ScriptValue {
    fn from(value: f64) -> Self {
        ScriptValue::Float(value)
    }
}

impl From<&str> for ScriptValue {
    fn from(value: &str) -> Self {
        ScriptValue::Str(value.to_string())
    }
}

impl From<String> for ScriptValue {
    fn from(value: String) -> Self {
        ScriptValue::Str(value)
    }
}
