//! Launch parameters resolved from configuration.

use crate::core::LayeredConfig;
use crate::error::{ConfigError, Result};
use std::path::PathBuf;

/// Configuration keys used by the launcher.
pub mod keys {
    /// Directory containing the Half-Life installation.
    pub const HALF_LIFE_DIRECTORY: &str = "HalfLifeDirectory";
    /// Directory containing the Steam executable.
    pub const STEAM_DIRECTORY: &str = "SteamDirectory";
    /// Map to start.
    pub const MAP: &str = "Map";
    /// Game (mod directory) to run.
    pub const GAME: &str = "Game";
    /// Player limit.
    pub const MAX_PLAYERS: &str = "MaxPlayers";
    /// Whether to run a LAN-only server.
    pub const LAN: &str = "Lan";
}

/// Steam app id of Half-Life.
pub const HALF_LIFE_APP_ID: u32 = 70;

const DEFAULT_MAP: &str = "dy_accident1";
const DEFAULT_GAME: &str = "decay";
const DEFAULT_MAX_PLAYERS: u32 = 3;

#[cfg(windows)]
const DEFAULT_STEAM_DIRECTORY: &str = r"C:\Program Files (x86)\Steam";
#[cfg(target_os = "macos")]
const DEFAULT_STEAM_DIRECTORY: &str = "/Applications/Steam.app/Contents/MacOS";
#[cfg(not(any(windows, target_os = "macos")))]
const DEFAULT_STEAM_DIRECTORY: &str = "/usr/bin";

#[cfg(windows)]
const STEAM_EXECUTABLE: &str = "steam.exe";
#[cfg(target_os = "macos")]
const STEAM_EXECUTABLE: &str = "steam_osx";
#[cfg(not(any(windows, target_os = "macos")))]
const STEAM_EXECUTABLE: &str = "steam";

/// Built-in defaults, the lowest configuration layer.
pub fn defaults() -> Vec<(&'static str, String)> {
    vec![
        (keys::MAP, DEFAULT_MAP.to_string()),
        (keys::GAME, DEFAULT_GAME.to_string()),
        (keys::MAX_PLAYERS, DEFAULT_MAX_PLAYERS.to_string()),
        (keys::LAN, false.to_string()),
        (keys::STEAM_DIRECTORY, DEFAULT_STEAM_DIRECTORY.to_string()),
    ]
}

/// Everything needed to start a game through Steam.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LaunchOptions {
    /// Map to start.
    pub map: String,
    /// Game (mod directory) to run.
    pub game: String,
    /// Player limit.
    pub max_players: u32,
    /// Whether to run a LAN-only server.
    pub lan: bool,
    /// Directory containing the Steam executable.
    pub steam_directory: PathBuf,
}

impl Default for LaunchOptions {
    fn default() -> Self {
        Self {
            map: DEFAULT_MAP.to_string(),
            game: DEFAULT_GAME.to_string(),
            max_players: DEFAULT_MAX_PLAYERS,
            lan: false,
            steam_directory: PathBuf::from(DEFAULT_STEAM_DIRECTORY),
        }
    }
}

impl LaunchOptions {
    /// Resolve launch options, falling back to defaults for unset keys.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::ParseError`] if `MaxPlayers` or `Lan` hold
    /// values of the wrong type.
    pub fn from_config(config: &LayeredConfig) -> Result<Self> {
        let defaults = Self::default();
        let lan = match config.get(keys::LAN) {
            Some(raw) => parse_bool(keys::LAN, &raw)?,
            None => defaults.lan,
        };

        Ok(Self {
            map: config.get(keys::MAP).unwrap_or(defaults.map),
            game: config.get(keys::GAME).unwrap_or(defaults.game),
            max_players: config
                .get_parsed(keys::MAX_PLAYERS)?
                .unwrap_or(defaults.max_players),
            lan,
            steam_directory: config
                .get(keys::STEAM_DIRECTORY)
                .map(PathBuf::from)
                .unwrap_or(defaults.steam_directory),
        })
    }

    /// The Steam executable to start.
    pub fn executable(&self) -> PathBuf {
        self.steam_directory.join(STEAM_EXECUTABLE)
    }

    /// The argument string passed to Steam.
    pub fn arguments(&self) -> String {
        format!(
            "-applaunch {} -game {} +sv_lan {} +maxplayers {} +map {}",
            HALF_LIFE_APP_ID,
            self.game,
            u8::from(self.lan),
            self.max_players,
            self.map
        )
    }
}

fn parse_bool(key: &str, raw: &str) -> Result<bool> {
    match raw.trim() {
        v if v.eq_ignore_ascii_case("true") || v == "1" => Ok(true),
        v if v.eq_ignore_ascii_case("false") || v == "0" => Ok(false),
        other => Err(ConfigError::parse(
            key,
            format!("expected true or false, got '{}'", other),
        )),
    }
}
