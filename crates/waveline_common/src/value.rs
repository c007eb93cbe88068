//! Cell values stored in a signal's sparse cycle map.

use serde::de::{self, Visitor};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;

use crate::logic::Logic;

/// The value a signal holds from one cycle onward.
///
/// Bit signals hold [`Value::Logic`]. Bus signals hold [`Value::Data`] labels
/// or the `X`/`Z` logic levels, which draw as unknown or floating bus segments.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub enum Value {
    /// A 4-state level.
    Logic(Logic),
    /// A bus label such as `"A5"` or `"IDLE"`.
    Data(String),
}

impl Value {
    /// Unknown (`X`).
    pub const X: Value = Value::Logic(Logic::X);
    /// High-impedance (`Z`).
    pub const Z: Value = Value::Logic(Logic::Z);

    /// Returns the logic level if this is a level value.
    pub fn as_logic(&self) -> Option<Logic> {
        match self {
            Value::Logic(l) => Some(*l),
            Value::Data(_) => None,
        }
    }

    /// Returns `true` for `X` and `Z`.
    pub fn is_unknown(&self) -> bool {
        matches!(self, Value::Logic(l) if l.is_unknown())
    }
}

impl From<Logic> for Value {
    fn from(l: Logic) -> Self {
        Value::Logic(l)
    }
}

impl From<&str> for Value {
    /// `"X"` and `"Z"` become logic levels; anything else is a bus label.
    fn from(s: &str) -> Self {
        match s {
            "X" | "x" => Value::X,
            "Z" | "z" => Value::Z,
            _ => Value::Data(s.to_string()),
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Logic(l) => write!(f, "{l}"),
            Value::Data(s) => f.write_str(s),
        }
    }
}

impl Serialize for Value {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            Value::Logic(l) => l.serialize(serializer),
            Value::Data(s) => serializer.serialize_str(s),
        }
    }
}

impl<'de> Deserialize<'de> for Value {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        deserializer.deserialize_any(ValueVisitor)
    }
}

struct ValueVisitor;

impl Visitor<'_> for ValueVisitor {
    type Value = Value;

    fn expecting(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str("0, 1, \"X\", \"Z\" or a bus label")
    }

    fn visit_u64<E: de::Error>(self, v: u64) -> Result<Value, E> {
        match v {
            0 => Ok(Value::Logic(Logic::Zero)),
            1 => Ok(Value::Logic(Logic::One)),
            // Numeric bus labels saved by older editors.
            _ => Ok(Value::Data(v.to_string())),
        }
    }

    fn visit_i64<E: de::Error>(self, v: i64) -> Result<Value, E> {
        match u64::try_from(v) {
            Ok(u) => self.visit_u64(u),
            Err(_) => Ok(Value::Data(v.to_string())),
        }
    }

    fn visit_str<E: de::Error>(self, v: &str) -> Result<Value, E> {
        Ok(Value::from(v))
    }

    fn visit_string<E: de::Error>(self, v: String) -> Result<Value, E> {
        match v.as_str() {
            "X" | "x" | "Z" | "z" => Ok(Value::from(v.as_str())),
            _ => Ok(Value::Data(v)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn from_str_recognizes_unknowns() {
        assert_eq!(Value::from("X"), Value::X);
        assert_eq!(Value::from("z"), Value::Z);
        assert_eq!(Value::from("A5"), Value::Data("A5".into()));
    }

    #[test]
    fn unknown_detection() {
        assert!(Value::X.is_unknown());
        assert!(!Value::Logic(Logic::One).is_unknown());
        assert!(!Value::Data("X1".into()).is_unknown());
    }

    #[test]
    fn deserialize_mixed_cells() {
        let cells: Vec<Value> = serde_json::from_str(r#"[0, 1, "X", "Z", "IDLE", 42]"#).unwrap();
        assert_eq!(
            cells,
            vec![
                Value::Logic(Logic::Zero),
                Value::Logic(Logic::One),
                Value::X,
                Value::Z,
                Value::Data("IDLE".into()),
                Value::Data("42".into()),
            ]
        );
    }

    #[test]
    fn serialize_keeps_document_form() {
        let cells = vec![Value::Logic(Logic::One), Value::Z, Value::Data("D0".into())];
        assert_eq!(serde_json::to_string(&cells).unwrap(), r#"[1,"Z","D0"]"#);
    }

    #[test]
    fn display() {
        assert_eq!(Value::Data("BEEF".into()).to_string(), "BEEF");
        assert_eq!(Value::X.to_string(), "X");
    }
}
