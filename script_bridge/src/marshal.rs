//! Converts guest call arguments into typed native arguments according to a
//! routine's [`NativeCallDescriptor`].

use console_api::{DefaultValue, NativeCallDescriptor, ParamKind, ParamSpec, Requirement};

use crate::engine::CallArgs;
use crate::error::BridgeError;
use crate::value::ScriptValue;

/// One typed argument slot.
#[derive(Debug, Clone, PartialEq)]
pub enum Arg {
    Int(i32),
    UInt(u32),
    Float(f32),
    Bool(bool),
    Byte(u8),
    Str(String),
    Value(ScriptValue),
    /// Presence-flagged optional: `None` when the caller omitted it.
    Presence(Option<i32>),
}

/// Arguments of one call, in descriptor order.
#[derive(Debug, Clone)]
pub struct Marshaled {
    descriptor: &'static NativeCallDescriptor,
    args: Vec<Arg>,
}

/// Binds positional and keyword arguments to the descriptor's parameters,
/// validates each against its kind and fills in defaults.
pub fn marshal(
    descriptor: &'static NativeCallDescriptor,
    call: CallArgs<'_>,
) -> Result<Marshaled, BridgeError> {
    let params = descriptor.params;
    if call.positional.len() > params.len() {
        return Err(BridgeError::Arity(too_many_arguments(
            descriptor,
            call.positional.len(),
        )));
    }

    let mut slots: Vec<Option<&ScriptValue>> = vec![None; params.len()];
    for (slot, value) in slots.iter_mut().zip(call.positional) {
        *slot = Some(value);
    }
    for (keyword, value) in call.keywords {
        let index = descriptor.param_index(keyword).ok_or_else(|| {
            BridgeError::Type(format!(
                "{}() got an unexpected keyword argument '{keyword}'",
                descriptor.name
            ))
        })?;
        if slots[index].is_some() {
            return Err(BridgeError::Type(format!(
                "{}() got multiple values for argument '{keyword}'",
                descriptor.name
            )));
        }
        slots[index] = Some(value);
    }

    let mut args = Vec::with_capacity(params.len());
    for (param, slot) in params.iter().zip(slots) {
        let arg = match (slot, param.requirement) {
            (Some(value), Requirement::Presence) => {
                Arg::Presence(Some(convert_int(descriptor, param, value)?))
            }
            (Some(value), _) => convert(descriptor, param, value)?,
            (None, Requirement::Required) => {
                return Err(BridgeError::Arity(format!(
                    "{}() missing required argument '{}'",
                    descriptor.name, param.name
                )));
            }
            (None, Requirement::Presence) => Arg::Presence(None),
            (None, Requirement::Default(default)) => default_arg(descriptor, param, default)?,
        };
        args.push(arg);
    }

    Ok(Marshaled { descriptor, args })
}

fn too_many_arguments(descriptor: &NativeCallDescriptor, given: usize) -> String {
    let max = descriptor.params.len();
    match max {
        0 => format!("{}() takes no arguments ({given} given)", descriptor.name),
        1 => format!(
            "{}() takes at most 1 argument ({given} given)",
            descriptor.name
        ),
        _ => format!(
            "{}() takes at most {max} arguments ({given} given)",
            descriptor.name
        ),
    }
}

fn type_error(descriptor: &NativeCallDescriptor, param: &ParamSpec, value: &ScriptValue) -> BridgeError {
    BridgeError::Type(format!(
        "{}() expected {} for argument '{}', not {}",
        descriptor.name,
        param.kind.expected_name(),
        param.name,
        value.type_name()
    ))
}

fn convert(
    descriptor: &NativeCallDescriptor,
    param: &ParamSpec,
    value: &ScriptValue,
) -> Result<Arg, BridgeError> {
    match param.kind {
        ParamKind::Int => convert_int(descriptor, param, value).map(Arg::Int),
        // Masks keep their low 32 bits; negative values wrap.
        ParamKind::UInt => match value {
            ScriptValue::Int(raw) => Ok(Arg::UInt(*raw as u32)),
            ScriptValue::Bool(flag) => Ok(Arg::UInt(u32::from(*flag))),
            other => Err(type_error(descriptor, param, other)),
        },
        ParamKind::Float => match value {
            ScriptValue::Float(raw) => Ok(Arg::Float(*raw as f32)),
            ScriptValue::Int(raw) => Ok(Arg::Float(*raw as f32)),
            ScriptValue::Bool(flag) => Ok(Arg::Float(if *flag { 1.0 } else { 0.0 })),
            other => Err(type_error(descriptor, param, other)),
        },
        ParamKind::Bool => Ok(Arg::Bool(value.truthy())),
        ParamKind::Byte => {
            let raw = match value {
                ScriptValue::Int(raw) => *raw,
                ScriptValue::Bool(flag) => i64::from(*flag),
                other => return Err(type_error(descriptor, param, other)),
            };
            u8::try_from(raw).map(Arg::Byte).map_err(|_| {
                BridgeError::Value(format!(
                    "{}() argument '{}' must be in range 0..=255, not {raw}",
                    descriptor.name, param.name
                ))
            })
        }
        ParamKind::Str => match value {
            ScriptValue::Str(text) => Ok(Arg::Str(text.clone())),
            other => Err(type_error(descriptor, param, other)),
        },
        ParamKind::Variant => Ok(Arg::Value(value.clone())),
    }
}

fn convert_int(
    descriptor: &NativeCallDescriptor,
    param: &ParamSpec,
    value: &ScriptValue,
) -> Result<i32, BridgeError> {
    let raw = match value {
        ScriptValue::Int(raw) => *raw,
        ScriptValue::Bool(flag) => i64::from(*flag),
        other => return Err(type_error(descriptor, param, other)),
    };
    i32::try_from(raw).map_err(|_| {
        BridgeError::Value(format!(
            "{}() argument '{}' out of range: {raw}",
            descriptor.name, param.name
        ))
    })
}

fn default_arg(
    descriptor: &NativeCallDescriptor,
    param: &ParamSpec,
    default: DefaultValue,
) -> Result<Arg, BridgeError> {
    let arg = match (param.kind, default) {
        (ParamKind::Variant, DefaultValue::None) => Arg::Value(ScriptValue::None),
        (ParamKind::Variant, DefaultValue::Int(value)) => Arg::Value(ScriptValue::from(value)),
        (ParamKind::Variant, DefaultValue::Float(value)) => Arg::Value(ScriptValue::from(value)),
        (ParamKind::Variant, DefaultValue::Bool(value)) => Arg::Value(ScriptValue::Bool(value)),
        (ParamKind::Int, DefaultValue::Int(value)) => Arg::Int(value),
        (ParamKind::UInt, DefaultValue::Int(value)) => Arg::UInt(value as u32),
        (ParamKind::Float, DefaultValue::Float(value)) => Arg::Float(value),
        (ParamKind::Float, DefaultValue::Int(value)) => Arg::Float(value as f32),
        (ParamKind::Bool, DefaultValue::Bool(value)) => Arg::Bool(value),
        (ParamKind::Bool, DefaultValue::Int(value)) => Arg::Bool(value != 0),
        (ParamKind::Byte, DefaultValue::Int(value)) => Arg::Byte(value as u8),
        _ => {
            return Err(BridgeError::Type(format!(
                "{}() has no usable default for argument '{}'",
                descriptor.name, param.name
            )));
        }
    };
    Ok(arg)
}

impl Marshaled {
    pub fn descriptor(&self) -> &'static NativeCallDescriptor {
        self.descriptor
    }

    pub fn args(&self) -> &[Arg] {
        &self.args
    }

    fn slot(&self, name: &str) -> Result<&Arg, BridgeError> {
        self.descriptor
            .param_index(name)
            .and_then(|index| self.args.get(index))
            .ok_or_else(|| {
                BridgeError::Type(format!(
                    "{}() has no argument '{name}'",
                    self.descriptor.name
                ))
            })
    }

    fn mismatch(&self, name: &str, expected: &str) -> BridgeError {
        BridgeError::Type(format!(
            "{}() argument '{name}' is not {expected}",
            self.descriptor.name
        ))
    }

    pub fn int(&self, name: &str) -> Result<i32, BridgeError> {
        match self.slot(name)? {
            Arg::Int(value) => Ok(*value),
            _ => Err(self.mismatch(name, "int")),
        }
    }

    pub fn uint(&self, name: &str) -> Result<u32, BridgeError> {
        match self.slot(name)? {
            Arg::UInt(value) => Ok(*value),
            _ => Err(self.mismatch(name, "an unsigned int")),
        }
    }

    pub fn float(&self, name: &str) -> Result<f32, BridgeError> {
        match self.slot(name)? {
            Arg::Float(value) => Ok(*value),
            _ => Err(self.mismatch(name, "float")),
        }
    }

    pub fn flag(&self, name: &str) -> Result<bool, BridgeError> {
        match self.slot(name)? {
            Arg::Bool(value) => Ok(*value),
            _ => Err(self.mismatch(name, "bool")),
        }
    }

    pub fn byte(&self, name: &str) -> Result<u8, BridgeError> {
        match self.slot(name)? {
            Arg::Byte(value) => Ok(*value),
            _ => Err(self.mismatch(name, "a byte")),
        }
    }

    pub fn text(&self, name: &str) -> Result<&str, BridgeError> {
        match self.slot(name)? {
            Arg::Str(value) => Ok(value.as_str()),
            _ => Err(self.mismatch(name, "str")),
        }
    }

    pub fn value(&self, name: &str) -> Result<&ScriptValue, BridgeError> {
        match self.slot(name)? {
            Arg::Value(value) => Ok(value),
            _ => Err(self.mismatch(name, "an object")),
        }
    }

    /// Presence flag and value of an optional-without-default parameter.
    pub fn presence(&self, name: &str) -> Result<Option<i32>, BridgeError> {
        match self.slot(name)? {
            Arg::Presence(value) => Ok(*value),
            _ => Err(self.mismatch(name, "presence-flagged")),
        }
    }
}
