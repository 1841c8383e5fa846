//! Adapters for parameters that accept "a scalar or a short sequence".

use console_api::{ColorKeySet, VolumePair, PALETTE_SIZE};

use crate::error::BridgeError;
use crate::value::ScriptValue;

/// Normalizes a color-key argument: `None` disables transparency, an int is a
/// single key, and a sequence of ints lists up to [`PALETTE_SIZE`] keys.
pub fn unpack_color_key(value: &ScriptValue) -> Result<ColorKeySet, BridgeError> {
    if let Some(color) = value.as_integer() {
        return Ok(ColorKeySet::single(color as u8));
    }
    match value {
        ScriptValue::None => Ok(ColorKeySet::empty()),
        other => {
            let items = other.as_sequence().ok_or_else(|| {
                BridgeError::Type(format!(
                    "expected int or sequence of int, not {}",
                    other.type_name()
                ))
            })?;
            let mut set = ColorKeySet::empty();
            for item in items {
                let color = item.as_integer().ok_or_else(|| {
                    BridgeError::Type(format!("expected int, not {}", item.type_name()))
                })?;
                if !set.push(color as u8) {
                    return Err(BridgeError::Value(format!(
                        "too many values to unpack; expected {PALETTE_SIZE}"
                    )));
                }
            }
            Ok(set)
        }
    }
}

/// Normalizes a volume argument: an int sets both channels, a two-element
/// sequence sets left then right. Levels are masked to four bits.
pub fn unpack_volume(value: &ScriptValue) -> Result<VolumePair, BridgeError> {
    if let Some(level) = value.as_integer() {
        return Ok(VolumePair::uniform(level));
    }
    let items = value.as_sequence().ok_or_else(|| {
        BridgeError::Type(format!(
            "expected int or sequence of int, not {}",
            value.type_name()
        ))
    })?;

    let mut levels = [0i64; 2];
    for (index, item) in items.iter().enumerate() {
        if index >= levels.len() {
            return Err(BridgeError::Value(
                "too many values to unpack; expected 2".to_string(),
            ));
        }
        levels[index] = item.as_integer().ok_or_else(|| {
            BridgeError::Type(format!("expected int, not {}", item.type_name()))
        })?;
    }
    if items.len() < levels.len() {
        return Err(BridgeError::Value(format!(
            "not enough values to unpack; expected 2, got {}",
            items.len()
        )));
    }
    Ok(VolumePair::new(levels[0], levels[1]))
}
