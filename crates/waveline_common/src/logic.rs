//! Four-state logic values drawn by bit signals.

use serde::de::{self, Visitor};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;

/// A single 4-state logic level as drawn on a bit waveform.
///
/// The four states represent:
/// - `Zero`: driven low
/// - `One`: driven high
/// - `X`: unknown, drawn as a hatched band
/// - `Z`: high-impedance, drawn at mid level
#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug, Default)]
#[repr(u8)]
pub enum Logic {
    /// Logic low (0).
    #[default]
    Zero = 0,
    /// Logic high (1).
    One = 1,
    /// Unknown.
    X = 2,
    /// High-impedance.
    Z = 3,
}

impl Logic {
    /// Converts a character to a [`Logic`] value.
    ///
    /// Accepts '0', '1', 'x'/'X', and 'z'/'Z'.
    pub fn from_char(c: char) -> Option<Self> {
        match c {
            '0' => Some(Logic::Zero),
            '1' => Some(Logic::One),
            'x' | 'X' => Some(Logic::X),
            'z' | 'Z' => Some(Logic::Z),
            _ => None,
        }
    }

    /// Parses a one-character string such as `"1"` or `"Z"`.
    pub fn from_str_exact(s: &str) -> Option<Self> {
        let mut chars = s.chars();
        match (chars.next(), chars.next()) {
            (Some(c), None) => Self::from_char(c),
            _ => None,
        }
    }

    /// Returns `true` for `X` and `Z`, the levels that never count as a
    /// transition endpoint.
    pub fn is_unknown(self) -> bool {
        matches!(self, Logic::X | Logic::Z)
    }

    /// The level produced by clicking a cell: `0` and `1` swap, an unknown
    /// or floating level becomes `1`.
    pub fn toggled(self) -> Self {
        match self {
            Logic::One => Logic::Zero,
            Logic::Zero | Logic::X | Logic::Z => Logic::One,
        }
    }
}

impl fmt::Display for Logic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Logic::Zero => write!(f, "0"),
            Logic::One => write!(f, "1"),
            Logic::X => write!(f, "X"),
            Logic::Z => write!(f, "Z"),
        }
    }
}

/// Document form: `0` and `1` are numbers, `"X"` and `"Z"` are strings.
impl Serialize for Logic {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            Logic::Zero => serializer.serialize_u8(0),
            Logic::One => serializer.serialize_u8(1),
            Logic::X => serializer.serialize_str("X"),
            Logic::Z => serializer.serialize_str("Z"),
        }
    }
}

impl<'de> Deserialize<'de> for Logic {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        deserializer.deserialize_any(LogicVisitor)
    }
}

struct LogicVisitor;

impl Visitor<'_> for LogicVisitor {
    type Value = Logic;

    fn expecting(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str("0, 1, \"X\" or \"Z\"")
    }

    fn visit_u64<E: de::Error>(self, v: u64) -> Result<Logic, E> {
        match v {
            0 => Ok(Logic::Zero),
            1 => Ok(Logic::One),
            _ => Err(E::invalid_value(de::Unexpected::Unsigned(v), &self)),
        }
    }

    fn visit_i64<E: de::Error>(self, v: i64) -> Result<Logic, E> {
        match v {
            0 => Ok(Logic::Zero),
            1 => Ok(Logic::One),
            _ => Err(E::invalid_value(de::Unexpected::Signed(v), &self)),
        }
    }

    fn visit_bool<E: de::Error>(self, v: bool) -> Result<Logic, E> {
        Ok(if v { Logic::One } else { Logic::Zero })
    }

    fn visit_str<E: de::Error>(self, v: &str) -> Result<Logic, E> {
        Logic::from_str_exact(v.trim()).ok_or_else(|| E::invalid_value(de::Unexpected::Str(v), &self))
    }
}

#[cfg(test)]
mod tests {
    use super::Logic;
    use super::Logic::*;

    #[test]
    fn toggled_values() {
        assert_eq!(Zero.toggled(), One);
        assert_eq!(One.toggled(), Zero);
        assert_eq!(X.toggled(), One);
        assert_eq!(Z.toggled(), One);
    }

    #[test]
    fn display() {
        assert_eq!(format!("{Zero}"), "0");
        assert_eq!(format!("{One}"), "1");
        assert_eq!(format!("{X}"), "X");
        assert_eq!(format!("{Z}"), "Z");
    }

    #[test]
    fn from_char_valid() {
        assert_eq!(Logic::from_char('0'), Some(Zero));
        assert_eq!(Logic::from_char('1'), Some(One));
        assert_eq!(Logic::from_char('x'), Some(X));
        assert_eq!(Logic::from_char('Z'), Some(Z));
    }

    #[test]
    fn from_char_invalid() {
        assert_eq!(Logic::from_char('a'), None);
        assert_eq!(Logic::from_char('2'), None);
    }

    #[test]
    fn from_str_exact_rejects_long_input() {
        assert_eq!(Logic::from_str_exact("1"), Some(One));
        assert_eq!(Logic::from_str_exact("10"), None);
        assert_eq!(Logic::from_str_exact(""), None);
    }

    #[test]
    fn unknown_levels() {
        assert!(X.is_unknown());
        assert!(Z.is_unknown());
        assert!(!Zero.is_unknown());
    }

    #[test]
    fn serde_document_form() {
        assert_eq!(serde_json::to_string(&Zero).unwrap(), "0");
        assert_eq!(serde_json::to_string(&X).unwrap(), "\"X\"");
        let parsed: Vec<Logic> = serde_json::from_str(r#"[0, 1, "x", "Z", "1"]"#).unwrap();
        assert_eq!(parsed, vec![Zero, One, X, Z, One]);
        assert!(serde_json::from_str::<Logic>("7").is_err());
    }
}
