use serde::{Deserialize, Serialize};

pub const STARTING_PASSES: u32 = 5;
pub const KILL_LOG_CAPACITY: usize = 20;
pub const DEFAULT_ADMIN_USERNAME: &str = "admin";
pub const DEFAULT_WORDS: [&str; 7] = [
    "apple",
    "banana",
    "cherry",
    "date",
    "elderberry",
    "fig",
    "grape",
];

pub const NO_TARGET_PLACEHOLDER: &str = "No targets available";
pub const NO_WORD_PLACEHOLDER: &str = "Waiting for other players";

/// Point-in-time copy of one player's game state as the registry sees it.
///
/// `target` and `word` are either both present or both absent.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq)]
pub struct PlayerSnapshot {
    pub username: String,
    pub target: Option<String>,
    pub word: Option<String>,
    pub score: u32,
    pub passes_left: u32,
    pub active: bool,
}

/// One claimed kill. `target` is captured before the killer is reassigned.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq)]
pub struct KillRecord {
    pub killer: String,
    pub target: String,
    pub word: String,
    pub timestamp: String,
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct LeaderboardEntry {
    pub username: String,
    pub score: u32,
    pub active: bool,
    pub passes_left: u32,
}

/// What a client is shown after login or any player action.
///
/// Absent assignments are rendered as placeholder sentences here and only
/// here; the registry never stores them.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct GameView {
    pub username: String,
    pub target: String,
    pub word: String,
    pub score: u32,
    pub passes_left: u32,
    pub is_admin: bool,
}

impl GameView {
    pub fn from_snapshot(snapshot: &PlayerSnapshot) -> Self {
        Self {
            username: snapshot.username.clone(),
            target: snapshot
                .target
                .clone()
                .unwrap_or_else(|| NO_TARGET_PLACEHOLDER.to_string()),
            word: snapshot
                .word
                .clone()
                .unwrap_or_else(|| NO_WORD_PLACEHOLDER.to_string()),
            score: snapshot.score,
            passes_left: snapshot.passes_left,
            is_admin: false,
        }
    }

    /// The admin never plays, so it has no target, score or passes.
    pub fn admin(username: &str) -> Self {
        Self {
            username: username.to_string(),
            target: NO_TARGET_PLACEHOLDER.to_string(),
            word: NO_WORD_PLACEHOLDER.to_string(),
            score: 0,
            passes_left: 0,
            is_admin: true,
        }
    }
}

#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct LoginRequest {
    #[serde(default)]
    pub username: String,
}

/// Body of the admin actions that name a single player.
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct PlayerRequest {
    #[serde(default)]
    pub username: String,
}

#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct AddScoreRequest {
    #[serde(default)]
    pub username: String,
    pub points: i64,
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq)]
pub struct SuccessResponse {
    pub success: bool,
}

impl SuccessResponse {
    pub fn ok() -> Self {
        Self { success: true }
    }
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq)]
pub struct ErrorResponse {
    pub error: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn snapshot(target: Option<&str>, word: Option<&str>) -> PlayerSnapshot {
        PlayerSnapshot {
            username: "alice".to_string(),
            target: target.map(str::to_string),
            word: word.map(str::to_string),
            score: 3,
            passes_left: 4,
            active: true,
        }
    }

    #[test]
    fn test_game_view_with_assignment() {
        let view = GameView::from_snapshot(&snapshot(Some("bob"), Some("fig")));
        assert_eq!(view.username, "alice");
        assert_eq!(view.target, "bob");
        assert_eq!(view.word, "fig");
        assert_eq!(view.score, 3);
        assert_eq!(view.passes_left, 4);
        assert!(!view.is_admin);
    }

    #[test]
    fn test_game_view_renders_placeholders() {
        let view = GameView::from_snapshot(&snapshot(None, None));
        assert_eq!(view.target, NO_TARGET_PLACEHOLDER);
        assert_eq!(view.word, NO_WORD_PLACEHOLDER);
    }

    #[test]
    fn test_admin_view() {
        let view = GameView::admin("boss");
        assert_eq!(view.username, "boss");
        assert!(view.is_admin);
        assert_eq!(view.score, 0);
        assert_eq!(view.target, NO_TARGET_PLACEHOLDER);
    }

    #[test]
    fn test_game_view_json_field_names() {
        let view = GameView::from_snapshot(&snapshot(Some("bob"), Some("fig")));
        let json = serde_json::to_value(&view).unwrap();
        assert_eq!(json["passesLeft"], 4);
        assert_eq!(json["isAdmin"], false);
        assert_eq!(json["target"], "bob");
    }

    #[test]
    fn test_leaderboard_entry_json_field_names() {
        let entry = LeaderboardEntry {
            username: "carol".to_string(),
            score: 7,
            active: false,
            passes_left: 0,
        };
        let json = serde_json::to_value(&entry).unwrap();
        assert_eq!(json["username"], "carol");
        assert_eq!(json["passesLeft"], 0);
        assert_eq!(json["active"], false);
    }

    #[test]
    fn test_login_request_missing_username_defaults_empty() {
        let request: LoginRequest = serde_json::from_str("{}").unwrap();
        assert!(request.username.is_empty());
    }

    #[test]
    fn test_add_score_request_accepts_negative_points() {
        let request: AddScoreRequest =
            serde_json::from_str(r#"{"username":"dave","points":-2}"#).unwrap();
        assert_eq!(request.username, "dave");
        assert_eq!(request.points, -2);
    }

    #[test]
    fn test_default_words_not_empty() {
        assert_eq!(DEFAULT_WORDS.len(), 7);
        assert!(DEFAULT_WORDS.iter().all(|w| !w.is_empty()));
    }
}
