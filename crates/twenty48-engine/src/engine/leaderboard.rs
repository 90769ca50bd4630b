use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A finished game as submitted to the leaderboard.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LeaderboardEntry {
    pub name: String,
    pub score: u64,
    pub date: DateTime<Utc>,
}

impl LeaderboardEntry {
    /// Name recorded when the player leaves the field blank.
    pub const ANONYMOUS: &str = "Anonymous";

    /// Creates an entry, trimming `name` and substituting [`Self::ANONYMOUS`] for a blank one.
    #[must_use]
    pub fn new(name: &str, score: u64, date: DateTime<Utc>) -> Self {
        let name = match name.trim() {
            "" => Self::ANONYMOUS,
            trimmed => trimmed,
        };
        Self {
            name: name.to_owned(),
            score,
            date,
        }
    }
}

#[cfg(test)]
mod tests {
    use chrono::TimeZone as _;

    use super::*;

    fn date() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2025, 3, 14, 15, 9, 26).unwrap()
    }

    #[test]
    fn test_name_is_trimmed() {
        let entry = LeaderboardEntry::new("  Alice \n", 2048, date());
        assert_eq!(entry.name, "Alice");
        assert_eq!(entry.score, 2048);
    }

    #[test]
    fn test_blank_name_is_anonymous() {
        for name in ["", "   ", "\t"] {
            assert_eq!(LeaderboardEntry::new(name, 4, date()).name, LeaderboardEntry::ANONYMOUS);
        }
    }

    #[test]
    fn test_serialization() {
        let entry = LeaderboardEntry::new("Bob", 512, date());
        let json = serde_json::to_string(&entry).unwrap();
        assert_eq!(json, r#"{"name":"Bob","score":512,"date":"2025-03-14T15:09:26Z"}"#);
        let back: LeaderboardEntry = serde_json::from_str(&json).unwrap();
        assert_eq!(back, entry);
    }
}
