//! Address payload decoding
//!
//! Orders store their route as a PHP `serialize()` blob: an array of points,
//! each point an array of named fields. The blob is decoded with `serde_php`
//! into a [`SerializedValue`] and then projected into [`AddressEntry`] values.
//! Anything malformed yields an empty address list; decode failures never
//! leave this module.

use serde::de::{self, DeserializeSeed, Deserializer, MapAccess, SeqAccess, Visitor};
use serde::{Deserialize, Serialize};
use std::fmt;

const MAX_DEPTH: usize = 32;
const MAX_PAYLOAD_BYTES: usize = 64 * 1024;

/// Field whose presence marks a point as a known place
const PLACE_FIELD: &str = "place_id";

/// A scalar leaf of a serialized payload
#[derive(Debug, Clone, PartialEq)]
pub enum Scalar {
    Bool(bool),
    Int(i64),
    Float(f64),
    Text(String),
}

impl Scalar {
    /// Display form; integral floats render without a fraction
    pub fn to_text(&self) -> String {
        match self {
            Scalar::Bool(b) => (if *b { "1" } else { "" }).to_string(),
            Scalar::Int(i) => i.to_string(),
            Scalar::Float(f) if f.fract() == 0.0 && f.is_finite() => format!("{:.0}", f),
            Scalar::Float(f) => f.to_string(),
            Scalar::Text(s) => s.clone(),
        }
    }
}

/// Dynamically shaped value decoded from an untrusted payload
#[derive(Debug, Clone, PartialEq)]
pub enum SerializedValue {
    Null,
    Scalar(Scalar),
    /// Array whose keys are exactly `0..n`
    List(Vec<SerializedValue>),
    /// Any other array; keys keep payload order
    Map(Vec<(String, SerializedValue)>),
}

impl SerializedValue {
    /// Parse a complete payload
    pub(crate) fn parse(input: &str) -> Result<Self, DecodeError> {
        if input.len() > MAX_PAYLOAD_BYTES {
            return Err(DecodeError::TooLarge(input.len()));
        }
        serde_php::from_bytes::<SerializedValue>(input.as_bytes())
            .map_err(|e| DecodeError::Malformed(e.to_string()))
    }

    pub fn get(&self, key: &str) -> Option<&SerializedValue> {
        match self {
            SerializedValue::Map(entries) => {
                entries.iter().find(|(k, _)| k == key).map(|(_, v)| v)
            }
            _ => None,
        }
    }

    /// Text form of a scalar; `None` for null and nested values
    pub fn as_text(&self) -> Option<String> {
        match self {
            SerializedValue::Scalar(scalar) => Some(scalar.to_text()),
            _ => None,
        }
    }

    /// Nested children of a list or map, in payload order
    pub fn children(&self) -> Vec<&SerializedValue> {
        match self {
            SerializedValue::List(items) => items.iter().collect(),
            SerializedValue::Map(entries) => entries.iter().map(|(_, v)| v).collect(),
            _ => Vec::new(),
        }
    }
}

impl<'de> Deserialize<'de> for SerializedValue {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        ValueSeed { depth: 0 }.deserialize(deserializer)
    }
}

#[derive(Debug, PartialEq, thiserror::Error)]
pub(crate) enum DecodeError {
    #[error("payload of {0} bytes exceeds the size limit")]
    TooLarge(usize),

    #[error("malformed payload: {0}")]
    Malformed(String),

    #[error("payload is not a nested structure")]
    NotNested,
}

/// Deserializes one value, refusing to nest past [`MAX_DEPTH`]
#[derive(Clone, Copy)]
struct ValueSeed {
    depth: usize,
}

impl<'de> DeserializeSeed<'de> for ValueSeed {
    type Value = SerializedValue;

    fn deserialize<D>(self, deserializer: D) -> Result<Self::Value, D::Error>
    where
        D: Deserializer<'de>,
    {
        if self.depth > MAX_DEPTH {
            return Err(de::Error::custom("payload nested too deeply"));
        }
        deserializer.deserialize_any(ValueVisitor { depth: self.depth })
    }
}

struct ValueVisitor {
    depth: usize,
}

impl ValueVisitor {
    fn child(&self) -> ValueSeed {
        ValueSeed {
            depth: self.depth + 1,
        }
    }
}

impl<'de> Visitor<'de> for ValueVisitor {
    type Value = SerializedValue;

    fn expecting(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str("a serialized scalar or array")
    }

    fn visit_unit<E: de::Error>(self) -> Result<Self::Value, E> {
        Ok(SerializedValue::Null)
    }

    fn visit_none<E: de::Error>(self) -> Result<Self::Value, E> {
        Ok(SerializedValue::Null)
    }

    fn visit_some<D>(self, deserializer: D) -> Result<Self::Value, D::Error>
    where
        D: Deserializer<'de>,
    {
        ValueSeed { depth: self.depth }.deserialize(deserializer)
    }

    fn visit_bool<E: de::Error>(self, v: bool) -> Result<Self::Value, E> {
        Ok(SerializedValue::Scalar(Scalar::Bool(v)))
    }

    fn visit_i64<E: de::Error>(self, v: i64) -> Result<Self::Value, E> {
        Ok(SerializedValue::Scalar(Scalar::Int(v)))
    }

    fn visit_u64<E: de::Error>(self, v: u64) -> Result<Self::Value, E> {
        Ok(match i64::try_from(v) {
            Ok(v) => SerializedValue::Scalar(Scalar::Int(v)),
            Err(_) => SerializedValue::Scalar(Scalar::Float(v as f64)),
        })
    }

    fn visit_f64<E: de::Error>(self, v: f64) -> Result<Self::Value, E> {
        Ok(SerializedValue::Scalar(Scalar::Float(v)))
    }

    fn visit_str<E: de::Error>(self, v: &str) -> Result<Self::Value, E> {
        Ok(SerializedValue::Scalar(Scalar::Text(v.to_string())))
    }

    fn visit_bytes<E: de::Error>(self, v: &[u8]) -> Result<Self::Value, E> {
        Ok(SerializedValue::Scalar(Scalar::Text(
            String::from_utf8_lossy(v).into_owned(),
        )))
    }

    fn visit_seq<A>(self, mut seq: A) -> Result<Self::Value, A::Error>
    where
        A: SeqAccess<'de>,
    {
        let mut items = Vec::new();
        while let Some(item) = seq.next_element_seed(self.child())? {
            items.push(item);
        }
        Ok(SerializedValue::List(items))
    }

    fn visit_map<A>(self, mut map: A) -> Result<Self::Value, A::Error>
    where
        A: MapAccess<'de>,
    {
        let mut entries = Vec::new();
        while let Some(key) = map.next_key::<ArrayKey>()? {
            let value = map.next_value_seed(self.child())?;
            entries.push((key, value));
        }
        Ok(array_value(entries))
    }
}

/// PHP array keys are either integers or strings
enum ArrayKey {
    Index(i64),
    Name(String),
}

impl<'de> Deserialize<'de> for ArrayKey {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        struct KeyVisitor;

        impl<'de> Visitor<'de> for KeyVisitor {
            type Value = ArrayKey;

            fn expecting(&self, f: &mut fmt::Formatter) -> fmt::Result {
                f.write_str("an integer or string array key")
            }

            fn visit_i64<E: de::Error>(self, v: i64) -> Result<ArrayKey, E> {
                Ok(ArrayKey::Index(v))
            }

            fn visit_u64<E: de::Error>(self, v: u64) -> Result<ArrayKey, E> {
                Ok(match i64::try_from(v) {
                    Ok(v) => ArrayKey::Index(v),
                    Err(_) => ArrayKey::Name(v.to_string()),
                })
            }

            fn visit_str<E: de::Error>(self, v: &str) -> Result<ArrayKey, E> {
                Ok(ArrayKey::Name(v.to_string()))
            }

            fn visit_bytes<E: de::Error>(self, v: &[u8]) -> Result<ArrayKey, E> {
                Ok(ArrayKey::Name(String::from_utf8_lossy(v).into_owned()))
            }
        }

        deserializer.deserialize_any(KeyVisitor)
    }
}

fn array_value(entries: Vec<(ArrayKey, SerializedValue)>) -> SerializedValue {
    let sequential = entries
        .iter()
        .enumerate()
        .all(|(i, (key, _))| matches!(key, ArrayKey::Index(k) if *k == i as i64));

    if sequential {
        SerializedValue::List(entries.into_iter().map(|(_, v)| v).collect())
    } else {
        SerializedValue::Map(
            entries
                .into_iter()
                .map(|(key, v)| {
                    let key = match key {
                        ArrayKey::Index(i) => i.to_string(),
                        ArrayKey::Name(name) => name,
                    };
                    (key, v)
                })
                .collect(),
        )
    }
}

/// Kind of route point
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AddressKind {
    Place,
    House,
}

/// One point of an order's route
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AddressEntry {
    pub city: String,
    pub street: String,
    pub label: String,
    pub house: String,
    pub apt: String,
    pub parking: String,
    #[serde(rename = "type")]
    pub kind: AddressKind,
}

impl AddressEntry {
    fn from_point(point: &SerializedValue) -> Option<Self> {
        if !matches!(point, SerializedValue::Map(_)) {
            return None;
        }
        let field = |name: &str| {
            point
                .get(name)
                .and_then(SerializedValue::as_text)
                .unwrap_or_default()
        };
        let has_place = point.get(PLACE_FIELD).is_some();

        Some(Self {
            city: field("city"),
            street: field("street"),
            label: field("label"),
            house: field("house"),
            apt: field("apt"),
            parking: field("parking"),
            kind: if has_place {
                AddressKind::Place
            } else {
                AddressKind::House
            },
        })
    }
}

fn try_decode(payload: &str) -> Result<Vec<AddressEntry>, DecodeError> {
    let value = SerializedValue::parse(payload)?;
    if !matches!(value, SerializedValue::List(_) | SerializedValue::Map(_)) {
        return Err(DecodeError::NotNested);
    }
    Ok(value
        .children()
        .into_iter()
        .filter_map(AddressEntry::from_point)
        .collect())
}

/// Route points of an order; empty on empty or malformed payloads
pub fn decode_address(payload: &str) -> Vec<AddressEntry> {
    if payload.trim().is_empty() {
        return Vec::new();
    }
    match try_decode(payload) {
        Ok(entries) => entries,
        Err(err) => {
            tracing::debug!(error = %err, "address payload not decodable");
            Vec::new()
        }
    }
}
