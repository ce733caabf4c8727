//! HTTP response bodies
//!
//! Fields the server may omit are optional. A `success: false` body is an
//! application rejection and carries its reason in `message` (some server
//! error paths call it `error`).

use serde::{Deserialize, Serialize};

use crate::types::PlayerScore;

/// Response to `POST /start`.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct StartResponse {
    #[serde(default)]
    pub success: bool,
    #[serde(default)]
    pub player_id: Option<String>,
    #[serde(default)]
    pub word: Option<String>,
    #[serde(default, alias = "error")]
    pub message: Option<String>,
}

/// Response to `POST /submit`.
///
/// Servers disagree on where the roster goes: some send it as a `player`
/// array, others send the guessing player as a `player` object and the
/// roster as `scores`. Use [`SubmitResponse::roster`] rather than either
/// field.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct SubmitResponse {
    #[serde(default)]
    pub correct: bool,
    #[serde(default)]
    pub new_word: Option<String>,
    /// Roster when sent as an array; a single-player object is dropped
    #[serde(default, deserialize_with = "roster_or_skip")]
    pub player: Option<Vec<PlayerScore>>,
    #[serde(default)]
    pub scores: Option<Vec<PlayerScore>>,
    #[serde(default)]
    pub winner: Option<String>,
    #[serde(default)]
    pub message: Option<String>,
}

impl SubmitResponse {
    /// Winner name, treating an empty string as "no winner yet".
    pub fn winner(&self) -> Option<&str> {
        self.winner.as_deref().filter(|w| !w.is_empty())
    }

    /// Full roster after this guess, if the server included one.
    pub fn roster(&self) -> Option<&[PlayerScore]> {
        self.scores.as_deref().or(self.player.as_deref())
    }
}

fn roster_or_skip<'de, D>(deserializer: D) -> Result<Option<Vec<PlayerScore>>, D::Error>
where
    D: serde::Deserializer<'de>,
{
    match serde_json::Value::deserialize(deserializer)? {
        value @ serde_json::Value::Array(_) => serde_json::from_value(value)
            .map(Some)
            .map_err(serde::de::Error::custom),
        _ => Ok(None),
    }
}

/// Response to `POST /menu`.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct MenuResponse {
    #[serde(default)]
    pub success: bool,
    #[serde(default, alias = "error")]
    pub message: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn start_rejection_accepts_error_field() {
        let response: StartResponse =
            serde_json::from_str(r#"{"success": false, "error": "Player not found"}"#).unwrap();
        assert!(!response.success);
        assert_eq!(response.message.as_deref(), Some("Player not found"));
    }

    #[test]
    fn submit_response_with_roster_and_winner() {
        let response: SubmitResponse = serde_json::from_str(
            r#"{"correct": true, "new_word": "planet",
                "player": [{"name": "alice", "score": 10}, {"name": "bob", "score": 7}],
                "winner": "alice"}"#,
        )
        .unwrap();
        assert!(response.correct);
        assert_eq!(response.new_word.as_deref(), Some("planet"));
        assert_eq!(
            response.roster(),
            Some([PlayerScore::new("alice", 10), PlayerScore::new("bob", 7)].as_slice())
        );
        assert_eq!(response.winner(), Some("alice"));
    }

    #[test]
    fn submit_response_with_player_object_and_score_table() {
        let response: SubmitResponse = serde_json::from_str(
            r#"{"message": "Correct! New word assigned.", "correct": true,
                "player": {"name": "alice", "score": 2},
                "new_word": "tecmo",
                "scores": [{"name": "alice", "points": 2}, {"name": "bob", "points": 1}]}"#,
        )
        .unwrap();
        assert!(response.correct);
        assert_eq!(response.new_word.as_deref(), Some("tecmo"));
        assert_eq!(response.player, None);
        assert_eq!(
            response.roster(),
            Some([PlayerScore::new("alice", 2), PlayerScore::new("bob", 1)].as_slice())
        );
    }

    #[test]
    fn incorrect_guess_with_empty_score_table() {
        let response: SubmitResponse = serde_json::from_str(
            r#"{"message": "Incorrect, try again!", "correct": false, "scores": []}"#,
        )
        .unwrap();
        assert!(!response.correct);
        assert_eq!(response.roster(), Some([].as_slice()));
    }

    #[test]
    fn empty_winner_means_no_winner() {
        let response: SubmitResponse =
            serde_json::from_str(r#"{"correct": false, "winner": ""}"#).unwrap();
        assert_eq!(response.winner(), None);
        assert_eq!(response.roster(), None);
    }
}
