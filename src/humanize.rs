//! Human-readable duration formatting and parsing utilities

use serde::{Deserialize, Serialize, Serializer};
use std::fmt;
use std::str::FromStr;
use std::time::Duration;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ParseError {
    #[error("Invalid duration format: {0}")]
    InvalidFormat(String),

    #[error("Invalid number: {0}")]
    InvalidNumber(#[from] std::num::ParseIntError),

    #[error("Invalid unit: {0}")]
    InvalidUnit(String),

    #[error("Duration out of range: {0}")]
    OutOfRange(String),
}

const UNITS: &[(&str, u64)] = &[
    ("ms", 1),
    ("s", 1_000),
    ("m", 60 * 1_000),
    ("h", 60 * 60 * 1_000),
    ("d", 24 * 60 * 60 * 1_000),
];

/// Millisecond duration with human-readable parsing ("500ms", "5s", "1h")
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct DurationSpec(pub u64);

impl DurationSpec {
    pub const fn from_millis(ms: u64) -> Self {
        Self(ms)
    }

    pub const fn from_secs(secs: u64) -> Self {
        Self(secs * 1_000)
    }

    pub fn as_millis(&self) -> u64 {
        self.0
    }

    /// Milliseconds as a signed timestamp delta, saturating at `i64::MAX`
    pub fn as_millis_i64(&self) -> i64 {
        i64::try_from(self.0).unwrap_or(i64::MAX)
    }

    pub fn as_duration(&self) -> Duration {
        Duration::from_millis(self.0)
    }

    pub fn is_zero(&self) -> bool {
        self.0 == 0
    }

    pub fn to_human_readable(&self) -> String {
        if self.0 == 0 {
            return "0ms".to_string();
        }
        UNITS
            .iter()
            .rev()
            .find(|(_, divisor)| self.0 % divisor == 0)
            .map(|(unit, divisor)| format!("{}{}", self.0 / divisor, unit))
            .unwrap_or_else(|| format!("{}ms", self.0))
    }
}

impl From<Duration> for DurationSpec {
    fn from(duration: Duration) -> Self {
        Self(u64::try_from(duration.as_millis()).unwrap_or(u64::MAX))
    }
}

impl Serialize for DurationSpec {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_str(&self.to_human_readable())
    }
}

impl<'de> Deserialize<'de> for DurationSpec {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        struct DurationVisitor;

        impl<'de> serde::de::Visitor<'de> for DurationVisitor {
            type Value = DurationSpec;

            fn expecting(&self, formatter: &mut fmt::Formatter) -> fmt::Result {
                formatter.write_str("a duration as string (e.g., \"5s\", \"1h\") or integer milliseconds")
            }

            fn visit_u64<E>(self, v: u64) -> Result<Self::Value, E>
            where
                E: serde::de::Error,
            {
                Ok(DurationSpec(v))
            }

            fn visit_i64<E>(self, v: i64) -> Result<Self::Value, E>
            where
                E: serde::de::Error,
            {
                u64::try_from(v)
                    .map(DurationSpec)
                    .map_err(|_| E::custom(format!("negative duration: {v}")))
            }

            fn visit_str<E>(self, v: &str) -> Result<Self::Value, E>
            where
                E: serde::de::Error,
            {
                v.parse::<DurationSpec>().map_err(serde::de::Error::custom)
            }
        }

        deserializer.deserialize_any(DurationVisitor)
    }
}

impl FromStr for DurationSpec {
    type Err = ParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim().to_lowercase();

        // Plain numbers are milliseconds
        if let Ok(num) = s.parse::<u64>() {
            return Ok(DurationSpec(num));
        }

        let (num_str, unit) = if let Some(pos) = s.find(|c: char| !c.is_ascii_digit()) {
            (&s[..pos], s[pos..].trim())
        } else {
            return Err(ParseError::InvalidFormat(s.to_string()));
        };
        if num_str.is_empty() {
            return Err(ParseError::InvalidFormat(s.to_string()));
        }

        let num: u64 = num_str.parse()?;

        let multiplier = match unit {
            "ms" => 1,
            "s" | "sec" | "secs" => 1_000,
            "m" | "min" | "mins" => 60 * 1_000,
            "h" | "hr" | "hrs" => 60 * 60 * 1_000,
            "d" | "day" | "days" => 24 * 60 * 60 * 1_000,
            _ => return Err(ParseError::InvalidUnit(unit.to_string())),
        };

        num.checked_mul(multiplier)
            .map(DurationSpec)
            .ok_or_else(|| ParseError::OutOfRange(s.to_string()))
    }
}

impl fmt::Display for DurationSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_human_readable())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_units() {
        assert_eq!("500ms".parse::<DurationSpec>().unwrap().as_millis(), 500);
        assert_eq!("5s".parse::<DurationSpec>().unwrap().as_millis(), 5_000);
        assert_eq!("90m".parse::<DurationSpec>().unwrap().as_millis(), 90 * 60_000);
        assert_eq!("1h".parse::<DurationSpec>().unwrap().as_millis(), 3_600_000);
        assert_eq!("2d".parse::<DurationSpec>().unwrap().as_millis(), 2 * 86_400_000);
    }

    #[test]
    fn test_plain_number_is_millis() {
        assert_eq!("1500".parse::<DurationSpec>().unwrap().as_millis(), 1_500);
    }

    #[test]
    fn test_rejects_garbage() {
        assert!(matches!(
            "5 weeks".parse::<DurationSpec>(),
            Err(ParseError::InvalidUnit(_))
        ));
        assert!(matches!(
            "s".parse::<DurationSpec>(),
            Err(ParseError::InvalidFormat(_))
        ));
    }

    #[test]
    fn test_to_human_readable() {
        assert_eq!(DurationSpec(5_000).to_human_readable(), "5s");
        assert_eq!(DurationSpec(3_600_000).to_human_readable(), "1h");
        assert_eq!(DurationSpec(1_500).to_human_readable(), "1500ms");
        assert_eq!(DurationSpec(0).to_human_readable(), "0ms");
    }

    #[test]
    fn test_deserialize_string_and_number() {
        #[derive(Deserialize)]
        struct TestStruct {
            cooldown: DurationSpec,
            timeout: DurationSpec,
        }
        let parsed: TestStruct =
            serde_json::from_str(r#"{"cooldown": "5s", "timeout": 250}"#).unwrap();
        assert_eq!(parsed.cooldown.as_millis(), 5_000);
        assert_eq!(parsed.timeout.as_duration(), Duration::from_millis(250));
    }
}
