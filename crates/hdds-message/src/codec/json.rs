// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! JSON text codec.
//!
//! Mapping per field type:
//!
//! | Field type            | JSON                                        |
//! |-----------------------|---------------------------------------------|
//! | bool                  | `true` / `false`                            |
//! | int32, uint32         | number                                      |
//! | int64, uint64         | decimal string (numbers accepted on input)  |
//! | float, double         | number, or `"NaN"` / `"Infinity"` / `"-Infinity"` |
//! | string                | string                                      |
//! | bytes                 | base64 string (standard alphabet, padded)   |
//! | enum                  | value name when known, number otherwise     |
//! | message               | object, or `null`                           |
//! | repeated              | array                                       |

use super::{Codec, CodecError};
use crate::schema::{FieldSchema, MessageSchema};
use crate::{FieldType, Message, Value};
use base64::{engine::general_purpose::STANDARD, Engine as _};
use serde_json::{Map, Number, Value as Json};
use std::sync::Arc;

/// JSON codec over the public accessor surface.
#[derive(Debug, Clone, Copy, Default)]
pub struct JsonCodec {
    emit_defaults: bool,
}

impl JsonCodec {
    /// Codec that omits zero-valued fields.
    pub fn new() -> Self {
        Self::default()
    }

    /// Codec that writes every field, zero-valued or not.
    pub fn with_defaults() -> Self {
        Self {
            emit_defaults: true,
        }
    }

    /// Encode to a JSON string.
    pub fn encode_str(&self, message: &Message) -> Result<String, CodecError> {
        let json = self.message_to_json(message);
        Ok(serde_json::to_string(&json)?)
    }

    /// Decode from a JSON string.
    pub fn decode_str(&self, schema: &Arc<MessageSchema>, text: &str) -> Result<Message, CodecError> {
        let json: Json = serde_json::from_str(text)?;
        json_to_message(schema, &json)
    }

    fn message_to_json(&self, message: &Message) -> Json {
        let mut object = Map::new();
        for (field, value) in message.fields() {
            if !self.emit_defaults && is_default(&value) {
                continue;
            }
            object.insert(field.name().to_string(), self.value_to_json(field, &value));
        }
        Json::Object(object)
    }

    fn value_to_json(&self, field: &FieldSchema, value: &Value) -> Json {
        match value {
            Value::Bool(v) => Json::Bool(*v),
            Value::Int32(v) => Json::from(*v),
            Value::UInt32(v) => Json::from(*v),
            Value::Int64(v) => Json::String(v.to_string()),
            Value::UInt64(v) => Json::String(v.to_string()),
            Value::Float(v) => float_to_json(f64::from(*v)),
            Value::Double(v) => float_to_json(*v),
            Value::String(v) => Json::String(v.to_string()),
            Value::Bytes(v) => Json::String(STANDARD.encode(v)),
            Value::Enum(number) => field
                .enum_type()
                .and_then(|e| e.lookup_value(*number).map(|name| Json::String(name.to_string())))
                .unwrap_or_else(|| Json::from(*number)),
            Value::Message(None) => Json::Null,
            Value::Message(Some(m)) => self.message_to_json(&m.read()),
            Value::Repeated(r) => {
                let items = r.read();
                Json::Array(items.iter().map(|v| self.value_to_json(field, &v)).collect())
            }
            Value::List(items) => {
                Json::Array(items.iter().map(|v| self.value_to_json(field, v)).collect())
            }
        }
    }
}

impl Codec for JsonCodec {
    fn encode(&self, message: &Message) -> Result<Vec<u8>, CodecError> {
        let json = self.message_to_json(message);
        Ok(serde_json::to_vec(&json)?)
    }

    fn decode(&self, schema: &Arc<MessageSchema>, bytes: &[u8]) -> Result<Message, CodecError> {
        let json: Json = serde_json::from_slice(bytes)?;
        json_to_message(schema, &json)
    }
}

/// Encode `message` as compact JSON, omitting zero-valued fields.
pub fn encode_json(message: &Message) -> Result<String, CodecError> {
    JsonCodec::new().encode_str(message)
}

/// Decode a `schema` instance from JSON text.
pub fn decode_json(schema: &Arc<MessageSchema>, text: &str) -> Result<Message, CodecError> {
    JsonCodec::new().decode_str(schema, text)
}

fn is_default(value: &Value) -> bool {
    match value {
        Value::Bool(v) => !v,
        Value::Int32(v) | Value::Enum(v) => *v == 0,
        Value::Int64(v) => *v == 0,
        Value::UInt32(v) => *v == 0,
        Value::UInt64(v) => *v == 0,
        Value::Float(v) => v.to_bits() == 0,
        Value::Double(v) => v.to_bits() == 0,
        Value::String(v) => v.is_empty(),
        Value::Bytes(v) => v.is_empty(),
        Value::Message(m) => m.is_none(),
        Value::Repeated(r) => r.read().is_empty(),
        Value::List(items) => items.is_empty(),
    }
}

fn float_to_json(v: f64) -> Json {
    if v.is_nan() {
        Json::String("NaN".into())
    } else if v.is_infinite() {
        Json::String(if v > 0.0 { "Infinity" } else { "-Infinity" }.into())
    } else {
        Number::from_f64(v).map_or(Json::Null, Json::Number)
    }
}

fn json_to_message(schema: &Arc<MessageSchema>, json: &Json) -> Result<Message, CodecError> {
    let Json::Object(object) = json else {
        return Err(CodecError::InvalidData(format!(
            "expected object for {}, got {}",
            schema.name(),
            json_kind(json)
        )));
    };
    let mut message = Message::new(schema);
    for (key, item) in object {
        let field = schema.field(key).ok_or_else(|| CodecError::UnknownField {
            message: schema.name().to_string(),
            field: key.clone(),
        })?;
        if item.is_null() && field.field_type() != FieldType::Message {
            continue;
        }
        let value = if field.is_repeated() {
            let Json::Array(items) = item else {
                return Err(CodecError::InvalidData(format!(
                    "expected array for {}.{}, got {}",
                    schema.name(),
                    field.name(),
                    json_kind(item)
                )));
            };
            let values = items
                .iter()
                .map(|element| json_to_value(field, element))
                .collect::<Result<Vec<_>, _>>()?;
            Value::List(values)
        } else {
            json_to_value(field, item)?
        };
        field.set(&mut message, value)?;
    }
    Ok(message)
}

fn json_to_value(field: &FieldSchema, json: &Json) -> Result<Value, CodecError> {
    let invalid = || {
        CodecError::InvalidData(format!(
            "{} is not a valid {} for field '{}'",
            json,
            field.field_type(),
            field.name()
        ))
    };
    let value = match (field.field_type(), json) {
        (FieldType::Bool, Json::Bool(v)) => Value::Bool(*v),
        (
            FieldType::Int32 | FieldType::Int64 | FieldType::UInt32 | FieldType::UInt64,
            Json::Number(n),
        ) => number_to_value(n).ok_or_else(invalid)?,
        (
            FieldType::Int32 | FieldType::Int64 | FieldType::UInt32 | FieldType::UInt64,
            Json::String(s),
        ) => match s.parse::<i64>() {
            Ok(v) => Value::Int64(v),
            Err(_) => s.parse::<u64>().map(Value::UInt64).map_err(|_| invalid())?,
        },
        (FieldType::Float | FieldType::Double, Json::Number(n)) => {
            Value::Double(n.as_f64().ok_or_else(invalid)?)
        }
        (FieldType::Float | FieldType::Double, Json::String(s)) => match s.as_str() {
            "NaN" => Value::Double(f64::NAN),
            "Infinity" => Value::Double(f64::INFINITY),
            "-Infinity" => Value::Double(f64::NEG_INFINITY),
            other => Value::Double(other.parse().map_err(|_| invalid())?),
        },
        (FieldType::String, Json::String(s)) => Value::from(s.as_str()),
        (FieldType::Bytes, Json::String(s)) => {
            Value::from(STANDARD.decode(s).map_err(|_| invalid())?)
        }
        (FieldType::Enum, Json::String(name)) => Value::from(name.as_str()),
        (FieldType::Enum, Json::Number(n)) => {
            let number = n.as_i64().and_then(|v| i32::try_from(v).ok()).ok_or_else(invalid)?;
            Value::Enum(number)
        }
        (FieldType::Message, Json::Null) => Value::Message(None),
        (FieldType::Message, Json::Object(_)) => {
            let schema = field.message_type().ok_or_else(|| {
                CodecError::InvalidData(format!("field '{}' has no message type", field.name()))
            })?;
            Value::from(json_to_message(&schema, json)?)
        }
        _ => return Err(invalid()),
    };
    Ok(value)
}

fn number_to_value(n: &Number) -> Option<Value> {
    if let Some(v) = n.as_i64() {
        Some(Value::Int64(v))
    } else if let Some(v) = n.as_u64() {
        Some(Value::UInt64(v))
    } else {
        n.as_f64().map(Value::Double)
    }
}

fn json_kind(json: &Json) -> &'static str {
    match json {
        Json::Null => "null",
        Json::Bool(_) => "bool",
        Json::Number(_) => "number",
        Json::String(_) => "string",
        Json::Array(_) => "array",
        Json::Object(_) => "object",
    }
}
