//! Error types shared by the registry, the session layer and the HTTP surface.

use thiserror::Error;

/// Every way a game action can be refused.
///
/// None of these are fatal to the process. The HTTP layer turns each one
/// into a status code and a JSON `{"error": ...}` body.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum GameError {
    /// Missing or malformed input, e.g. a blank username.
    #[error("{0}")]
    Validation(String),

    /// A player action named someone who is unknown or logged out.
    #[error("invalid user: {0}")]
    InvalidPlayer(String),

    /// No session, or the session token failed verification.
    #[error("not logged in")]
    Unauthenticated,

    /// A non-admin session called an admin action.
    #[error("admin access required")]
    Unauthorized,

    /// An admin action named a player that does not exist.
    #[error("player not found: {0}")]
    NotFound(String),

    #[error("no target available")]
    NoTargetAvailable,

    #[error("no passes remaining")]
    NoPassesRemaining,

    #[error("no target to pass")]
    NoTargetToPass,
}

impl GameError {
    /// HTTP status code this error is reported with.
    pub fn status_code(&self) -> u16 {
        match self {
            GameError::Validation(_)
            | GameError::InvalidPlayer(_)
            | GameError::NoTargetAvailable
            | GameError::NoPassesRemaining
            | GameError::NoTargetToPass => 400,
            GameError::Unauthenticated => 401,
            GameError::Unauthorized => 403,
            GameError::NotFound(_) => 404,
        }
    }

    /// True for the normal game-flow blocks that a player can hit by
    /// clicking at the wrong moment.
    pub fn is_game_rejection(&self) -> bool {
        matches!(
            self,
            GameError::NoTargetAvailable | GameError::NoPassesRemaining | GameError::NoTargetToPass
        )
    }
}
