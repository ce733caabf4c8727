//! Shared type definitions
//!
//! Value objects used by both the HTTP and WebSocket halves of the protocol.

use serde::{Deserialize, Serialize};

/// One row of the player roster.
///
/// Rosters are ordered as the server sent them; clients never re-sort.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlayerScore {
    pub name: String,
    /// `points` in the `/submit` score table
    #[serde(alias = "points")]
    pub score: u32,
}

impl PlayerScore {
    pub fn new(name: impl Into<String>, score: u32) -> Self {
        Self {
            name: name.into(),
            score,
        }
    }
}

/// Menu selection sent to `/menu`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MenuChoice {
    /// Reset the score and start over
    New,
    /// Keep the current score
    Continue,
}

impl MenuChoice {
    pub fn as_str(self) -> &'static str {
        match self {
            MenuChoice::New => "new",
            MenuChoice::Continue => "continue",
        }
    }
}

impl std::str::FromStr for MenuChoice {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "new" => Ok(MenuChoice::New),
            "continue" => Ok(MenuChoice::Continue),
            other => Err(format!("unknown menu choice: {other}")),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn menu_choice_uses_lowercase_wire_names() {
        assert_eq!(
            serde_json::to_string(&MenuChoice::Continue).unwrap(),
            "\"continue\""
        );
        assert_eq!("NEW".parse::<MenuChoice>(), Ok(MenuChoice::New));
        assert!("restart".parse::<MenuChoice>().is_err());
    }

    #[test]
    fn score_table_rows_use_points() {
        let row: PlayerScore = serde_json::from_str(r#"{"name": "bob", "points": 2}"#).unwrap();
        assert_eq!(row, PlayerScore::new("bob", 2));
    }
}
