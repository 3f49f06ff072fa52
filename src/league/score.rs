use std::{fmt, str::FromStr};

use once_cell::sync::Lazy;
use regex::Regex;
use serde::{
    Deserialize, Deserializer, Serialize, Serializer,
    de::{self, Visitor},
};

/// The result of a played match, as goals scored by each side.
///
/// Written and read as `"<home>-<away>"`, e.g. `"2-1"`.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct Score {
    pub home: u32,
    pub away: u32,
}

#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum ScoreError {
    #[error("invalid score format {0:?} (expected e.g. \"2-1\")")]
    InvalidFormat(String),
}

impl Score {
    pub fn new(home: u32, away: u32) -> Self {
        Self { home, away }
    }
}

impl FromStr for Score {
    type Err = ScoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        static RE: Lazy<Regex> = Lazy::new(|| {
            Regex::new(r"^\s*([0-9]+)\s*-\s*([0-9]+)\s*$").unwrap()
        });

        let invalid = || ScoreError::InvalidFormat(s.to_string());
        let caps = RE.captures(s).ok_or_else(invalid)?;
        // the digits always match, but may still overflow
        let home = caps[1].parse().map_err(|_| invalid())?;
        let away = caps[2].parse().map_err(|_| invalid())?;

        Ok(Score { home, away })
    }
}

impl fmt::Display for Score {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}-{}", self.home, self.away)
    }
}

impl Serialize for Score {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.collect_str(self)
    }
}

struct ScoreVisitor;

impl Visitor<'_> for ScoreVisitor {
    type Value = Score;

    fn expecting(&self, formatter: &mut fmt::Formatter) -> fmt::Result {
        formatter.write_str("a score of the form \"<home>-<away>\"")
    }

    fn visit_str<E>(self, value: &str) -> Result<Self::Value, E>
    where
        E: de::Error,
    {
        value.parse().map_err(E::custom)
    }
}

impl<'de> Deserialize<'de> for Score {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        deserializer.deserialize_str(ScoreVisitor)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_plain_and_padded_scores() {
        assert_eq!("2-1".parse::<Score>(), Ok(Score::new(2, 1)));
        assert_eq!(" 3 - 0 ".parse::<Score>(), Ok(Score::new(3, 0)));
        assert_eq!("10-10".parse::<Score>(), Ok(Score::new(10, 10)));
    }

    #[test]
    fn rejects_malformed_scores() {
        for bad in ["2:1", "a-b", "1-", "-1-2", "", "1-2-3", "1.5-2"] {
            assert_eq!(
                bad.parse::<Score>(),
                Err(ScoreError::InvalidFormat(bad.to_string())),
                "{bad:?} should not parse"
            );
        }
    }

    #[test]
    fn rejects_overflowing_goals() {
        assert!("99999999999-1".parse::<Score>().is_err());
    }

    #[test]
    fn serializes_as_string() {
        let json = serde_json::to_string(&Score::new(4, 2)).unwrap();
        assert_eq!(json, "\"4-2\"");
        let back: Score = serde_json::from_str(&json).unwrap();
        assert_eq!(back, Score::new(4, 2));
        assert!(serde_json::from_str::<Score>("\"4:2\"").is_err());
    }
}
