//! Authoritative game state: players, target assignments and the kill log
//!
//! This module owns every piece of mutable game state:
//! - Player lifecycle (join, reactivate, logout, admin removal)
//! - Target/word assignment, routed through a single mutation point
//! - Score, pass quota and the bounded most-recent-first kill log
//! - Read projections for the leaderboard and kill log
//!
//! The registry itself is synchronous. Request handlers share it as a
//! [`SharedRegistry`] and run exactly one operation per lock acquisition,
//! so the join fan-out (which touches every active player) is never
//! observed half-done.

use crate::error::GameError;
use log::{debug, info};
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::SeedableRng;
use shared::{
    KillRecord, LeaderboardEntry, PlayerSnapshot, DEFAULT_ADMIN_USERNAME, DEFAULT_WORDS,
    KILL_LOG_CAPACITY, STARTING_PASSES,
};
use std::collections::{BTreeMap, VecDeque};
use std::sync::Arc;
use time::macros::format_description;
use time::OffsetDateTime;
use tokio::sync::Mutex;

/// Registry handle shared between request handlers.
pub type SharedRegistry = Arc<Mutex<GameRegistry>>;

/// Game-wide settings fixed at startup
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GameSettings {
    /// The distinguished non-playing identity
    pub admin_username: String,
    /// Pool kill words are drawn from; never empty
    pub words: Vec<String>,
    /// Passes every new player starts with
    pub starting_passes: u32,
    /// Maximum number of kill records retained
    pub kill_log_capacity: usize,
}

impl Default for GameSettings {
    fn default() -> Self {
        Self {
            admin_username: DEFAULT_ADMIN_USERNAME.to_string(),
            words: DEFAULT_WORDS.iter().map(|w| w.to_string()).collect(),
            starting_passes: STARTING_PASSES,
            kill_log_capacity: KILL_LOG_CAPACITY,
        }
    }
}

/// A player's current target together with the word tied to it.
///
/// Keeping both in one value makes "target without word" unrepresentable.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Assignment {
    pub target: String,
    pub word: String,
}

/// A participant in the game
///
/// Players are created on first login and survive logout with
/// `active = false`, so a returning player keeps score and passes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Player {
    pub username: String,
    pub score: u32,
    /// Present in the game; false after logout
    pub active: bool,
    pub passes_left: u32,
    pub assignment: Option<Assignment>,
}

impl Player {
    /// Creates a freshly joined player with no assignment
    pub fn new(username: &str, starting_passes: u32) -> Self {
        Self {
            username: username.to_string(),
            score: 0,
            active: true,
            passes_left: starting_passes,
            assignment: None,
        }
    }

    pub fn target(&self) -> Option<&str> {
        self.assignment.as_ref().map(|a| a.target.as_str())
    }

    pub fn word(&self) -> Option<&str> {
        self.assignment.as_ref().map(|a| a.word.as_str())
    }

    pub fn snapshot(&self) -> PlayerSnapshot {
        PlayerSnapshot {
            username: self.username.clone(),
            target: self.target().map(str::to_string),
            word: self.word().map(str::to_string),
            score: self.score,
            passes_left: self.passes_left,
            active: self.active,
        }
    }
}

/// Owns all players, the word pool and the kill log
///
/// Every operation that changes who targets whom goes through
/// `assign_target`, which is the only place assignments
/// are written. After any public operation returns:
/// - no player targets themselves or the admin
/// - every assignment points at a currently active player
/// - the admin identity is not in the player map
/// - the kill log holds at most `kill_log_capacity` records
pub struct GameRegistry {
    /// Players keyed by username; ordered so seeded runs are reproducible
    players: BTreeMap<String, Player>,
    /// Most recent kill first
    kill_log: VecDeque<KillRecord>,
    settings: GameSettings,
    rng: StdRng,
}

impl GameSettings {
    /// Rejects settings under which assignments could not be drawn
    pub fn validate(&self) -> Result<(), GameError> {
        if self.admin_username.trim().is_empty() {
            return Err(GameError::Validation(
                "admin username must not be empty".to_string(),
            ));
        }
        if self.words.is_empty() || self.words.iter().any(|w| w.trim().is_empty()) {
            return Err(GameError::Validation(
                "word pool must contain at least one word and no blanks".to_string(),
            ));
        }
        if self.kill_log_capacity == 0 {
            return Err(GameError::Validation(
                "kill log capacity must be positive".to_string(),
            ));
        }
        Ok(())
    }
}

impl GameRegistry {
    /// Creates an empty registry with an entropy-seeded random source
    pub fn new(settings: GameSettings) -> Result<Self, GameError> {
        Self::with_rng(settings, StdRng::from_entropy())
    }

    /// Creates an empty registry whose draws are reproducible for a seed
    pub fn with_seed(settings: GameSettings, seed: u64) -> Result<Self, GameError> {
        Self::with_rng(settings, StdRng::seed_from_u64(seed))
    }

    fn with_rng(settings: GameSettings, rng: StdRng) -> Result<Self, GameError> {
        settings.validate()?;
        Ok(Self {
            players: BTreeMap::new(),
            kill_log: VecDeque::with_capacity(settings.kill_log_capacity),
            settings,
            rng,
        })
    }

    /// Wraps the registry for sharing between request handlers
    pub fn into_shared(self) -> SharedRegistry {
        Arc::new(Mutex::new(self))
    }

    pub fn settings(&self) -> &GameSettings {
        &self.settings
    }

    pub fn is_admin(&self, username: &str) -> bool {
        username == self.settings.admin_username
    }

    /// Logs a player in, creating them on first sight
    ///
    /// The joining player is assigned first, then every other active
    /// player is reassigned so the newcomer becomes a candidate target for
    /// everyone already in the game.
    pub fn register_or_reactivate(&mut self, username: &str) -> Result<PlayerSnapshot, GameError> {
        let username = validate_username(username)?;
        if self.is_admin(&username) {
            return Err(GameError::Validation(
                "the admin identity cannot join as a player".to_string(),
            ));
        }

        match self.players.get_mut(&username) {
            Some(player) => {
                player.active = true;
                info!("Player {} rejoined (score {})", username, player.score);
            }
            None => {
                let player = Player::new(&username, self.settings.starting_passes);
                self.players.insert(username.clone(), player);
                info!("Player {} joined", username);
            }
        }

        self.assign_target(&username);
        self.reassign_active_players(Some(&username));
        self.snapshot(&username)
    }

    /// Records a claimed kill and hands the killer a fresh assignment
    ///
    /// Only the killer is reassigned; everyone else keeps their target.
    pub fn record_kill(&mut self, username: &str) -> Result<PlayerSnapshot, GameError> {
        let assignment = match self.players.get(username) {
            Some(player) if player.active => player
                .assignment
                .clone()
                .ok_or(GameError::NoTargetAvailable)?,
            _ => return Err(GameError::NoTargetAvailable),
        };

        self.kill_log.push_front(KillRecord {
            killer: username.to_string(),
            target: assignment.target.clone(),
            word: assignment.word,
            timestamp: wall_clock_label(),
        });
        self.kill_log.truncate(self.settings.kill_log_capacity);

        if let Some(player) = self.players.get_mut(username) {
            player.score = player.score.saturating_add(1);
            info!(
                "Player {} eliminated {} (score {})",
                username, assignment.target, player.score
            );
        }

        self.assign_target(username);
        self.snapshot(username)
    }

    /// Skips the current assignment at the cost of one pass
    pub fn pass_target(&mut self, username: &str) -> Result<PlayerSnapshot, GameError> {
        let player = match self.players.get_mut(username) {
            Some(player) if player.active => player,
            _ => return Err(GameError::InvalidPlayer(username.to_string())),
        };

        if player.passes_left == 0 {
            return Err(GameError::NoPassesRemaining);
        }
        if player.assignment.is_none() {
            return Err(GameError::NoTargetToPass);
        }

        player.passes_left -= 1;
        info!(
            "Player {} passed ({} passes left)",
            username, player.passes_left
        );

        self.assign_target(username);
        self.snapshot(username)
    }

    /// Logs a player out
    ///
    /// The player keeps score and passes but loses their assignment, and
    /// everyone still active is reassigned so nobody is left pointing at
    /// them. Unknown names and the admin are ignored.
    pub fn deactivate(&mut self, username: &str) {
        let Some(player) = self.players.get_mut(username) else {
            return;
        };

        player.active = false;
        player.assignment = None;
        info!("Player {} logged out", username);

        self.reassign_active_players(None);
    }

    /// Deletes a player outright and reassigns everyone still active
    pub fn remove_player(&mut self, username: &str) -> Result<(), GameError> {
        if self.players.remove(username).is_none() {
            return Err(GameError::NotFound(username.to_string()));
        }
        info!("Player {} removed by admin", username);

        self.reassign_active_players(None);
        Ok(())
    }

    /// Adds `delta` to a player's score, clamping at zero
    ///
    /// Returns the new score. Assignments are untouched.
    pub fn adjust_score(&mut self, username: &str, delta: i64) -> Result<u32, GameError> {
        let player = self
            .players
            .get_mut(username)
            .ok_or_else(|| GameError::NotFound(username.to_string()))?;

        let adjusted = i64::from(player.score).saturating_add(delta);
        player.score = adjusted.clamp(0, i64::from(u32::MAX)) as u32;
        info!(
            "Admin adjusted score of {} by {} (now {})",
            username, delta, player.score
        );
        Ok(player.score)
    }

    /// Restores a player's pass quota
    pub fn reset_passes(&mut self, username: &str) -> Result<(), GameError> {
        let starting_passes = self.settings.starting_passes;
        let player = self
            .players
            .get_mut(username)
            .ok_or_else(|| GameError::NotFound(username.to_string()))?;

        player.passes_left = starting_passes;
        info!("Admin reset passes for {}", username);
        Ok(())
    }

    /// Wipes every player and the kill log
    pub fn reset_all(&mut self) {
        let dropped = self.players.len();
        self.players.clear();
        self.kill_log.clear();
        info!("Game reset by admin ({} players dropped)", dropped);
    }

    /// Current state of an active player
    pub fn snapshot(&self, username: &str) -> Result<PlayerSnapshot, GameError> {
        match self.players.get(username) {
            Some(player) if player.active => Ok(player.snapshot()),
            _ => Err(GameError::InvalidPlayer(username.to_string())),
        }
    }

    pub fn player(&self, username: &str) -> Option<&Player> {
        self.players.get(username)
    }

    pub fn players(&self) -> impl Iterator<Item = &Player> {
        self.players.values()
    }

    pub fn player_count(&self) -> usize {
        self.players.len()
    }

    pub fn active_players(&self) -> Vec<String> {
        self.players
            .values()
            .filter(|p| p.active)
            .map(|p| p.username.clone())
            .collect()
    }

    /// All players by score descending, ties broken by username ascending
    pub fn leaderboard(&self) -> Vec<LeaderboardEntry> {
        let mut entries: Vec<LeaderboardEntry> = self
            .players
            .values()
            .filter(|p| !self.is_admin(&p.username))
            .map(|p| LeaderboardEntry {
                username: p.username.clone(),
                score: p.score,
                active: p.active,
                passes_left: p.passes_left,
            })
            .collect();

        entries.sort_by(|a, b| b.score.cmp(&a.score).then_with(|| a.username.cmp(&b.username)));
        entries
    }

    /// Recorded kills, most recent first
    pub fn kill_log(&self) -> Vec<KillRecord> {
        self.kill_log.iter().cloned().collect()
    }

    /// Lists every broken state invariant; empty when the registry is sound
    pub fn invariant_violations(&self) -> Vec<String> {
        let mut violations = Vec::new();

        if self.players.contains_key(&self.settings.admin_username) {
            violations.push("admin identity stored as a player".to_string());
        }
        if self.kill_log.len() > self.settings.kill_log_capacity {
            violations.push(format!("kill log holds {} records", self.kill_log.len()));
        }

        for player in self.players.values() {
            if player.passes_left > self.settings.starting_passes {
                violations.push(format!("{} has {} passes", player.username, player.passes_left));
            }
            let Some(assignment) = &player.assignment else {
                continue;
            };
            if !player.active {
                violations.push(format!("inactive {} holds an assignment", player.username));
            }
            if assignment.target == player.username {
                violations.push(format!("{} targets themselves", player.username));
            }
            match self.players.get(&assignment.target) {
                Some(target) if target.active => {}
                _ => violations.push(format!(
                    "{} targets {} who is not active",
                    player.username, assignment.target
                )),
            }
            if !self.settings.words.contains(&assignment.word) {
                violations.push(format!("{} holds a word outside the pool", player.username));
            }
        }

        violations
    }

    /// Draws a fresh target and word for one player
    ///
    /// Candidates are every other active, non-admin player. With no
    /// candidates the assignment is cleared rather than left stale. Draws
    /// are uniform and independent, so repeats across calls are allowed.
    fn assign_target(&mut self, username: &str) {
        let admin = &self.settings.admin_username;
        let candidates: Vec<&String> = self
            .players
            .values()
            .filter(|p| p.active && p.username != username && &p.username != admin)
            .map(|p| &p.username)
            .collect();

        let assignment = match (
            candidates.choose(&mut self.rng),
            self.settings.words.choose(&mut self.rng),
        ) {
            (Some(target), Some(word)) => Some(Assignment {
                target: (*target).clone(),
                word: word.clone(),
            }),
            _ => None,
        };

        if let Some(player) = self.players.get_mut(username) {
            match &assignment {
                Some(a) => debug!("Assigned {} -> {}", username, a.target),
                None => debug!("No target available for {}", username),
            }
            player.assignment = assignment;
        }
    }

    /// Reassigns every active player except `skip`
    fn reassign_active_players(&mut self, skip: Option<&str>) {
        let usernames: Vec<String> = self
            .players
            .values()
            .filter(|p| p.active && Some(p.username.as_str()) != skip)
            .map(|p| p.username.clone())
            .collect();

        for username in usernames {
            self.assign_target(&username);
        }
    }
}

/// Trims a login name and rejects blanks
fn validate_username(username: &str) -> Result<String, GameError> {
    let trimmed = username.trim();
    if trimmed.is_empty() {
        return Err(GameError::Validation("Username is required".to_string()));
    }
    Ok(trimmed.to_string())
}

/// Current wall-clock time as `YYYY-MM-DD HH:MM:SS UTC`
fn wall_clock_label() -> String {
    let format = format_description!("[year]-[month]-[day] [hour]:[minute]:[second]");
    let now = OffsetDateTime::now_utc();
    match now.format(format) {
        Ok(formatted) => format!("{} UTC", formatted),
        Err(_) => format!("{} UTC", now.unix_timestamp()),
    }
}
