use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Reaction {
    pub id: Uuid,
    pub user_id: Uuid,
    pub announcement_id: Uuid,
    pub reaction_type: ReactionType,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum ReactionType {
    Like,
    Dislike,
}

impl ReactionType {
    pub fn as_str(&self) -> &'static str {
        match self {
            ReactionType::Like => "like",
            ReactionType::Dislike => "dislike",
        }
    }
}

impl fmt::Display for ReactionType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ReactionType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "like" => Ok(ReactionType::Like),
            "dislike" => Ok(ReactionType::Dislike),
            _ => Err(format!(
                "Invalid reaction type: {}. Must be 'like' or 'dislike'",
                s
            )),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_known_types() {
        assert_eq!("like".parse::<ReactionType>().unwrap(), ReactionType::Like);
        assert_eq!("dislike".parse::<ReactionType>().unwrap(), ReactionType::Dislike);
    }

    #[test]
    fn only_exact_lowercase_names_are_accepted() {
        for input in ["Like", "DISLIKE", " like", "dislike "] {
            assert!(input.parse::<ReactionType>().is_err(), "{input:?} was accepted");
        }
    }

    #[test]
    fn rejects_unknown_type() {
        let err = "love".parse::<ReactionType>().unwrap_err();
        assert!(err.contains("love"));
    }
}
