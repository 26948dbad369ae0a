//! # Kill Word Game Server Library
//!
//! This library provides the authoritative backend for a social party game.
//! Players log in, receive a randomly drawn target player and secret kill
//! word, and score by reporting a kill, after which a fresh target/word
//! pair is issued.
//!
//! ## Core Responsibilities
//!
//! ### Target Assignment
//! Every player's target and word is drawn uniformly at random from the
//! other active players and the configured word pool. Assignments are
//! written in exactly one place, so nobody ever targets themselves, the
//! admin, or a player who has logged out or been removed.
//!
//! ### Player Lifecycle
//! Handles the complete lifecycle of a player:
//! - First login creates the player, later logins reactivate them
//! - Kills and passes replace only the acting player's assignment
//! - Logout and admin removal redirect everyone who pointed at the player
//!
//! ### Bookkeeping
//! Scores, the per-player pass quota and a bounded most-recent-first kill
//! log feed the leaderboard and kill-log views.
//!
//! ## Architecture Design
//!
//! ### Single Critical Section
//! All game state lives in one [`registry::GameRegistry`] behind a single
//! mutex. A join reassigns every active player, so per-player locking would
//! need a global ordering anyway; one coarse lock is simpler and cheap
//! because every operation is short, synchronous and does no I/O.
//!
//! ### Volatile State
//! Nothing is persisted. Restarting the server starts a new game, and with
//! a random session secret it also invalidates every session.
//!
//! ## Module Organization
//!
//! ### Registry Module (`registry`)
//! Players, assignments, scores, passes and the kill log.
//!
//! ### Session Module (`session`)
//! HMAC-signed cookies binding a browser to a username and admin flag.
//!
//! ### HTTP Module (`http`)
//! The axum router mapping game and admin actions onto registry calls.
//!
//! ### Config and Error Modules (`config`, `error`)
//! Startup configuration from flags or environment, and the error taxonomy
//! with its HTTP status mapping.
//!
//! ## Usage Example
//!
//! ```rust,no_run
//! use server::http::{app, AppState};
//! use server::registry::{GameRegistry, GameSettings};
//! use server::session::SessionKeys;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let state = AppState::new(
//!         GameRegistry::new(GameSettings::default())?,
//!         SessionKeys::random(),
//!     );
//!
//!     let listener = tokio::net::TcpListener::bind("127.0.0.1:5000").await?;
//!     axum::serve(listener, app(state)).await?;
//!
//!     Ok(())
//! }
//! ```

pub mod config;
pub mod error;
pub mod http;
pub mod registry;
pub mod session;
