// Bot configuration, read once at startup.
//
// Values come from the environment (a `.env` file is loaded first by main).
// The static banned word list lives here as a plain value and is handed to
// the content filter, rather than being a global.

use std::fmt;
use std::path::PathBuf;
use thiserror::Error;

const TOKEN_PLACEHOLDER: &str = "bot.token.here";
const DEFAULT_DATA_DIR: &str = "data";

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("Missing {0} environment variable! Create a .env file with it.")]
    Missing(&'static str),

    #[error("{key} must be a Discord id, got {value:?}")]
    Invalid { key: &'static str, value: String },

    #[error("Invalid DISCORD_TOKEN specified!")]
    InvalidToken,
}

#[derive(Clone)]
pub struct BotConfig {
    pub token: String,
    /// Role granted to every member joining the home guild
    pub default_role: u64,
    /// Home guild
    pub guild_id: u64,
    pub welcome_channel: u64,
    /// Static banned words, lower-cased
    pub banned_words: Vec<String>,
    pub data_dir: PathBuf,
}

impl BotConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build the config from any key -> value lookup.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let token = lookup("DISCORD_TOKEN").ok_or(ConfigError::Missing("DISCORD_TOKEN"))?;
        let token = token.trim().to_string();
        if token == TOKEN_PLACEHOLDER || token.matches('.').count() != 2 {
            return Err(ConfigError::InvalidToken);
        }

        let banned_words = lookup("AUTOMOD_BANNED_WORDS")
            .map(|raw| {
                raw.split(',')
                    .map(|word| word.trim().to_lowercase())
                    .filter(|word| !word.is_empty())
                    .collect()
            })
            .unwrap_or_default();

        let data_dir = lookup("DATA_DIR")
            .filter(|dir| !dir.trim().is_empty())
            .unwrap_or_else(|| DEFAULT_DATA_DIR.to_string());

        Ok(Self {
            token,
            default_role: parse_id(&lookup, "DEFAULT_ROLE")?,
            guild_id: parse_id(&lookup, "GUILD_ID")?,
            welcome_channel: parse_id(&lookup, "WELCOME_CHANNEL")?,
            banned_words,
            data_dir: PathBuf::from(data_dir),
        })
    }

    pub fn database_path(&self) -> PathBuf {
        self.data_dir.join("eternal.db")
    }

    pub fn rsvp_store_path(&self) -> PathBuf {
        self.data_dir.join("rsvp_responses.json")
    }
}

// Keep the token out of logs.
impl fmt::Debug for BotConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("BotConfig")
            .field("token", &"<redacted>")
            .field("default_role", &self.default_role)
            .field("guild_id", &self.guild_id)
            .field("welcome_channel", &self.welcome_channel)
            .field("banned_words", &self.banned_words.len())
            .field("data_dir", &self.data_dir)
            .finish()
    }
}

fn parse_id(
    lookup: &impl Fn(&str) -> Option<String>,
    key: &'static str,
) -> Result<u64, ConfigError> {
    let value = lookup(key).ok_or(ConfigError::Missing(key))?;
    match value.trim().parse::<u64>() {
        Ok(id) if id > 0 => Ok(id),
        _ => Err(ConfigError::Invalid { key, value }),
    }
}
