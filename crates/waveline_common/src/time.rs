//! Time units and clock periods with unit parsing and display.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// A time unit used for clock periods and delay values.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TimeUnit {
    /// Femtoseconds.
    Fs,
    /// Picoseconds.
    Ps,
    /// Nanoseconds.
    #[default]
    Ns,
    /// Microseconds.
    Us,
    /// Milliseconds.
    Ms,
    /// Seconds.
    S,
}

impl TimeUnit {
    /// Number of femtoseconds in one unit.
    pub fn femtoseconds(self) -> f64 {
        match self {
            TimeUnit::Fs => 1.0,
            TimeUnit::Ps => 1e3,
            TimeUnit::Ns => 1e6,
            TimeUnit::Us => 1e9,
            TimeUnit::Ms => 1e12,
            TimeUnit::S => 1e15,
        }
    }

    /// Converts `value` expressed in `self` into `target` units.
    pub fn convert(self, value: f64, target: TimeUnit) -> f64 {
        if self == target {
            return value;
        }
        value * self.femtoseconds() / target.femtoseconds()
    }

    /// The unit suffix as written in documents (`"ns"`, `"ps"`, ...).
    pub fn suffix(self) -> &'static str {
        match self {
            TimeUnit::Fs => "fs",
            TimeUnit::Ps => "ps",
            TimeUnit::Ns => "ns",
            TimeUnit::Us => "us",
            TimeUnit::Ms => "ms",
            TimeUnit::S => "s",
        }
    }

    fn from_suffix(s: &str) -> Option<Self> {
        match s {
            "fs" => Some(TimeUnit::Fs),
            "ps" => Some(TimeUnit::Ps),
            "ns" => Some(TimeUnit::Ns),
            "us" | "µs" => Some(TimeUnit::Us),
            "ms" => Some(TimeUnit::Ms),
            "s" => Some(TimeUnit::S),
            _ => None,
        }
    }
}

impl fmt::Display for TimeUnit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.suffix())
    }
}

impl FromStr for TimeUnit {
    type Err = ParsePeriodError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        TimeUnit::from_suffix(&s.trim().to_ascii_lowercase()).ok_or_else(|| ParsePeriodError {
            input: s.to_string(),
        })
    }
}

/// A clock period: a magnitude plus the unit it was written in.
#[derive(Clone, Copy, PartialEq, Debug, Serialize, Deserialize)]
pub struct Period {
    /// Magnitude in `unit`.
    pub value: f64,
    /// Unit of `value`.
    pub unit: TimeUnit,
}

impl Period {
    /// Creates a new period.
    pub fn new(value: f64, unit: TimeUnit) -> Self {
        Self { value, unit }
    }

    /// Returns the period expressed in `unit`.
    pub fn in_unit(&self, unit: TimeUnit) -> f64 {
        self.unit.convert(self.value, unit)
    }

    /// Returns `true` when the period can be used as a divisor.
    pub fn is_positive(&self) -> bool {
        self.value.is_finite() && self.value > 0.0
    }
}

impl Default for Period {
    fn default() -> Self {
        Self::new(10.0, TimeUnit::Ns)
    }
}

impl fmt::Display for Period {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}", self.value, self.unit)
    }
}

/// Error type for parsing period and unit strings.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("invalid period: '{input}'")]
pub struct ParsePeriodError {
    /// The input string that failed to parse.
    pub input: String,
}

impl FromStr for Period {
    type Err = ParsePeriodError;

    /// Parses strings like `"10ns"`, `"2.5 us"` or a bare number (nanoseconds).
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        let err = || ParsePeriodError {
            input: s.to_string(),
        };

        let lower = s.to_ascii_lowercase();
        let split = lower
            .find(|c: char| c.is_ascii_alphabetic() || c == 'µ')
            .unwrap_or(lower.len());
        let (num, suffix) = lower.split_at(split);
        let value: f64 = num.trim().parse().map_err(|_| err())?;
        let unit = if suffix.is_empty() {
            TimeUnit::Ns
        } else {
            TimeUnit::from_suffix(suffix.trim()).ok_or_else(err)?
        };
        Ok(Period { value, unit })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_ns() {
        let p: Period = "10ns".parse().unwrap();
        assert_eq!(p, Period::new(10.0, TimeUnit::Ns));
    }

    #[test]
    fn parse_with_space_and_case() {
        let p: Period = "2.5 US".parse().unwrap();
        assert_eq!(p, Period::new(2.5, TimeUnit::Us));
    }

    #[test]
    fn parse_bare_number_is_ns() {
        let p: Period = "20".parse().unwrap();
        assert_eq!(p.unit, TimeUnit::Ns);
        assert_eq!(p.value, 20.0);
    }

    #[test]
    fn parse_invalid() {
        assert!("fast".parse::<Period>().is_err());
        assert!("10 parsecs".parse::<Period>().is_err());
    }

    #[test]
    fn convert_between_units() {
        assert_eq!(TimeUnit::Ns.convert(1.0, TimeUnit::Ps), 1000.0);
        assert_eq!(TimeUnit::Ps.convert(500.0, TimeUnit::Ns), 0.5);
        assert_eq!(Period::new(2.0, TimeUnit::Us).in_unit(TimeUnit::Ns), 2000.0);
    }

    #[test]
    fn display() {
        assert_eq!(Period::new(10.0, TimeUnit::Ns).to_string(), "10ns");
        assert_eq!(TimeUnit::Ps.to_string(), "ps");
    }

    #[test]
    fn unit_serde_lowercase() {
        assert_eq!(serde_json::to_string(&TimeUnit::Us).unwrap(), "\"us\"");
        let u: TimeUnit = serde_json::from_str("\"ps\"").unwrap();
        assert_eq!(u, TimeUnit::Ps);
    }

    #[test]
    fn positivity() {
        assert!(Period::new(1.0, TimeUnit::Ns).is_positive());
        assert!(!Period::new(0.0, TimeUnit::Ns).is_positive());
        assert!(!Period::new(-3.0, TimeUnit::Ns).is_positive());
    }
}
