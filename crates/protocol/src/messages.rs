//! WebSocket message types for player/server communication
//!
//! Every frame is a JSON text frame shaped `{"type": ..., "payload": {...}}`.
//! The player sends `ClientMessage` and receives `ServerMessage`.

use serde::{Deserialize, Serialize};

use crate::types::PlayerScore;

// =============================================================================
// Client Messages (Player → Server)
// =============================================================================

/// Messages from the player to the server
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", content = "payload", rename_all = "snake_case")]
pub enum ClientMessage {
    /// Announce the local username; sent after every (re)connect
    Register { username: String },
}

// =============================================================================
// Server Messages (Server → Player)
// =============================================================================

/// Messages from the server to the player
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "type", content = "payload", rename_all = "snake_case")]
pub enum ServerMessage {
    /// Full roster replacement
    PlayerList { players: Vec<PlayerScore> },
    /// The game has been won by `winner`
    GameOver { winner: String },
    /// A message kind this client does not understand.
    ///
    /// Kept for forward compatibility; callers ignore it.
    #[serde(skip_serializing)]
    Unknown { kind: String },
}

/// Generic frame shape used to route on `type` before decoding the payload.
#[derive(Debug, Deserialize)]
struct Envelope {
    #[serde(rename = "type")]
    kind: String,
    #[serde(default)]
    payload: serde_json::Value,
}

#[derive(Debug, Deserialize)]
struct PlayerListPayload {
    #[serde(default, deserialize_with = "null_as_empty")]
    players: Vec<PlayerScore>,
}

#[derive(Debug, Deserialize)]
struct GameOverPayload {
    winner: String,
}

fn null_as_empty<'de, D>(deserializer: D) -> Result<Vec<PlayerScore>, D::Error>
where
    D: serde::Deserializer<'de>,
{
    Ok(Option::<Vec<PlayerScore>>::deserialize(deserializer)?.unwrap_or_default())
}

impl ServerMessage {
    /// Parse a text frame.
    ///
    /// Fails only when the frame is not a `{type, payload}` object or when a
    /// known `type` carries a malformed payload. Unknown types decode to
    /// [`ServerMessage::Unknown`].
    pub fn parse(text: &str) -> Result<Self, serde_json::Error> {
        let envelope: Envelope = serde_json::from_str(text)?;
        match envelope.kind.as_str() {
            "player_list" => {
                let payload: PlayerListPayload = serde_json::from_value(envelope.payload)?;
                Ok(ServerMessage::PlayerList {
                    players: payload.players,
                })
            }
            "game_over" => {
                let payload: GameOverPayload = serde_json::from_value(envelope.payload)?;
                Ok(ServerMessage::GameOver {
                    winner: payload.winner,
                })
            }
            _ => Ok(ServerMessage::Unknown {
                kind: envelope.kind,
            }),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn register_uses_type_and_payload() {
        let message = ClientMessage::Register {
            username: "alice".into(),
        };
        assert_eq!(
            serde_json::to_value(&message).unwrap(),
            json!({"type": "register", "payload": {"username": "alice"}})
        );
    }

    #[test]
    fn parses_player_list() {
        let message = ServerMessage::parse(
            r#"{"type":"player_list","payload":{"players":[{"name":"alice","score":3}]}}"#,
        )
        .unwrap();
        assert_eq!(
            message,
            ServerMessage::PlayerList {
                players: vec![PlayerScore::new("alice", 3)]
            }
        );
    }

    #[test]
    fn null_player_list_is_empty_roster() {
        let message =
            ServerMessage::parse(r#"{"type":"player_list","payload":{"players":null}}"#).unwrap();
        assert_eq!(message, ServerMessage::PlayerList { players: vec![] });
    }

    #[test]
    fn parses_game_over() {
        let message =
            ServerMessage::parse(r#"{"type":"game_over","payload":{"winner":"bob"}}"#).unwrap();
        assert_eq!(
            message,
            ServerMessage::GameOver {
                winner: "bob".into()
            }
        );
    }

    #[test]
    fn unknown_type_is_not_an_error() {
        let message = ServerMessage::parse(r#"{"type":"chat","payload":{"text":"hi"}}"#).unwrap();
        assert_eq!(
            message,
            ServerMessage::Unknown {
                kind: "chat".into()
            }
        );
    }

    #[test]
    fn malformed_known_payload_is_an_error() {
        assert!(ServerMessage::parse(r#"{"type":"game_over","payload":{}}"#).is_err());
        assert!(ServerMessage::parse("not json").is_err());
    }

    #[test]
    fn server_message_serializes_to_envelope() {
        let message = ServerMessage::GameOver {
            winner: "alice".into(),
        };
        let text = serde_json::to_string(&message).unwrap();
        assert_eq!(ServerMessage::parse(&text).unwrap(), message);
    }
}
