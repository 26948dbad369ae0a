//! Startup configuration read from command-line flags or the environment

use crate::registry::GameSettings;
use clap::Parser;
use shared::{KILL_LOG_CAPACITY, STARTING_PASSES};

/// Server configuration, read once at startup
#[derive(Parser, Debug, Clone)]
#[clap(author, version, about)]
pub struct Config {
    /// Server IP address to bind to
    #[clap(short = 'H', long, env = "KILLWORD_HOST", default_value = "127.0.0.1")]
    pub host: String,

    /// Server port to listen on
    #[clap(short, long, env = "KILLWORD_PORT", default_value = "5000")]
    pub port: u16,

    /// Username that logs in as the admin instead of a player
    #[clap(long, env = "KILLWORD_ADMIN_USERNAME", default_value = "admin")]
    pub admin_username: String,

    /// Comma-separated pool of kill words
    #[clap(
        long,
        env = "KILLWORD_WORDS",
        value_delimiter = ',',
        default_value = "apple,banana,cherry,date,elderberry,fig,grape"
    )]
    pub words: Vec<String>,

    /// Secret used to sign session cookies; random per process if unset
    #[clap(long, env = "KILLWORD_SESSION_SECRET")]
    pub session_secret: Option<String>,
}

impl Config {
    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }

    /// Validates the game-facing part of the config
    pub fn game_settings(&self) -> Result<GameSettings, String> {
        let admin_username = self.admin_username.trim();
        if admin_username.is_empty() {
            return Err("admin username must not be empty".to_string());
        }

        let words: Vec<String> = self
            .words
            .iter()
            .map(|w| w.trim())
            .filter(|w| !w.is_empty())
            .map(str::to_string)
            .collect();
        if words.is_empty() {
            return Err("word list must contain at least one word".to_string());
        }

        Ok(GameSettings {
            admin_username: admin_username.to_string(),
            words,
            starting_passes: STARTING_PASSES,
            kill_log_capacity: KILL_LOG_CAPACITY,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use shared::DEFAULT_WORDS;

    #[test]
    fn test_defaults() {
        let config = Config::try_parse_from(["server"]).unwrap();
        assert_eq!(config.bind_address(), "127.0.0.1:5000");
        assert_eq!(config.session_secret, None);

        let settings = config.game_settings().unwrap();
        assert_eq!(settings, GameSettings::default());
        assert_eq!(settings.words.len(), DEFAULT_WORDS.len());
    }

    #[test]
    fn test_custom_words_are_trimmed() {
        let config =
            Config::try_parse_from(["server", "--words", " owl, ,lynx ,", "--admin-username", "gm"])
                .unwrap();
        let settings = config.game_settings().unwrap();
        assert_eq!(settings.words, vec!["owl", "lynx"]);
        assert_eq!(settings.admin_username, "gm");
    }

    #[test]
    fn test_blank_word_list_rejected() {
        let config = Config::try_parse_from(["server", "--words", " , "]).unwrap();
        assert!(config.game_settings().is_err());
    }

    #[test]
    fn test_blank_admin_rejected() {
        let config = Config::try_parse_from(["server", "--admin-username", "  "]).unwrap();
        assert!(config.game_settings().is_err());
    }

    #[test]
    fn test_host_and_port_flags() {
        let config = Config::try_parse_from(["server", "-H", "0.0.0.0", "-p", "8080"]).unwrap();
        assert_eq!(config.bind_address(), "0.0.0.0:8080");
    }
}
