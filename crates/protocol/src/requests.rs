//! HTTP request bodies
//!
//! Every request is a JSON `POST` sent to the same path on whichever
//! endpoint is being tried.

use serde::{Deserialize, Serialize};

use crate::types::MenuChoice;

/// Route paths served by every game server instance.
pub mod paths {
    pub const START: &str = "/start";
    pub const SUBMIT: &str = "/submit";
    pub const MENU: &str = "/menu";
    pub const WEBSOCKET: &str = "/ws";
}

/// Body of `POST /start`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StartRequest {
    pub player_id: String,
}

/// Body of `POST /submit`.
///
/// `guess` is sent exactly as typed; the server alone decides correctness.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SubmitRequest {
    pub player_id: String,
    pub guess: String,
}

/// Body of `POST /menu`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MenuRequest {
    pub player_id: String,
    #[serde(rename = "type")]
    pub choice: MenuChoice,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn menu_request_serializes_choice_as_type() {
        let request = MenuRequest {
            player_id: "p-1".into(),
            choice: MenuChoice::New,
        };
        assert_eq!(
            serde_json::to_value(&request).unwrap(),
            json!({"player_id": "p-1", "type": "new"})
        );
    }

    #[test]
    fn submit_request_keeps_guess_verbatim() {
        let request = SubmitRequest {
            player_id: "p-1".into(),
            guess: "Tac O".into(),
        };
        assert_eq!(
            serde_json::to_value(&request).unwrap(),
            json!({"player_id": "p-1", "guess": "Tac O"})
        );
    }
}
