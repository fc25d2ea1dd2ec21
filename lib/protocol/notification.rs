use super::ProtocolError;
use crate::chess::Game;
use serde::{Deserialize, Serialize};

/// A message pushed to a participant.
#[derive(Debug, Clone, Eq, PartialEq, Deserialize, Serialize)]
#[serde(tag = "type", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Notification {
    /// The full state of the game, to be rendered as is.
    LoadGame { game: Game },

    /// Something happened that participants should be told about.
    #[serde(rename = "NOTIFICATION")]
    Message { message: String },

    /// The last command of the recipient was rejected.
    Error { message: String },
}

impl Notification {
    /// A [`Notification::Message`].
    pub fn message(text: impl Into<String>) -> Self {
        Notification::Message {
            message: text.into(),
        }
    }
}

impl From<&ProtocolError> for Notification {
    fn from(e: &ProtocolError) -> Self {
        Notification::Error {
            message: e.to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn load_game_carries_the_game() {
        let n = Notification::LoadGame {
            game: Game::default(),
        };

        let value = serde_json::to_value(&n).unwrap();
        assert_eq!(value["type"], json!("LOAD_GAME"));
        assert_eq!(value["game"]["turn"], json!("WHITE"));
        assert_eq!(value["game"]["status"], json!("IN_PROGRESS"));
        assert_eq!(value.get("message"), None);
    }

    #[test]
    fn message_is_tagged_as_notification() {
        let value = serde_json::to_value(Notification::message("alice joined as white")).unwrap();
        assert_eq!(value, json!({"type": "NOTIFICATION", "message": "alice joined as white"}));
    }

    #[test]
    fn errors_carry_their_tag_in_the_message() {
        let n = Notification::from(&ProtocolError::GameFinished);
        let value = serde_json::to_value(n).unwrap();
        assert_eq!(value["type"], json!("ERROR"));
        assert!(value["message"].as_str().unwrap().starts_with("GAME_FINISHED"));
    }

    #[test]
    fn notifications_parse_back() {
        let n = Notification::message("bob resigned");
        let json = serde_json::to_string(&n).unwrap();
        assert_eq!(serde_json::from_str::<Notification>(&json).unwrap(), n);
    }
}
