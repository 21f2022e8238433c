//! Command-line interface definitions for hl-launcher.
//!
//! Uses clap's derive API for type-safe argument parsing.

use crate::launcher::keys;
use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;

/// Launcher for Half-Life.
///
/// Without a subcommand, starts the configured game through Steam. Options
/// given here override the settings file for this run only; use
/// `config set` to persist them.
#[derive(Parser, Debug)]
#[command(name = "hl-launcher")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Subcommand to run (or omit to launch the game).
    #[command(subcommand)]
    pub command: Option<Commands>,

    /// Options for the launch run, also used as the command-line overlay.
    #[command(flatten)]
    pub launch: LaunchArgs,

    /// Increase log verbosity.
    ///
    /// Without it the level comes from `RUST_LOG`, or info.
    /// -v    = debug level
    /// -vv   = trace level
    #[arg(short = 'v', long = "verbose", action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,
}

/// Options for launching the game.
#[derive(Args, Debug, Default, Clone)]
pub struct LaunchArgs {
    /// The map to play (defaults to the game's start map when --game is given).
    #[arg(short = 'm', long = "map", value_name = "MAP")]
    pub map: Option<String>,

    /// The game to play.
    #[arg(short = 'g', long = "game", value_name = "GAME")]
    pub game: Option<String>,

    /// The maximum number of players.
    #[arg(long = "maxplayers", value_name = "N")]
    pub max_players: Option<u32>,

    /// Whether to play in LAN mode.
    #[arg(short = 'l', long = "lan", value_name = "BOOL", num_args = 0..=1, default_missing_value = "true")]
    pub lan: Option<bool>,

    /// Print the command instead of starting Steam.
    #[arg(long = "dry-run")]
    pub dry_run: bool,
}

impl LaunchArgs {
    /// Options the user actually passed, as configuration pairs.
    pub fn overlay(&self) -> Vec<(&'static str, String)> {
        let mut overlay = Vec::new();
        if let Some(map) = &self.map {
            overlay.push((keys::MAP, map.clone()));
        }
        if let Some(game) = &self.game {
            overlay.push((keys::GAME, game.clone()));
        }
        if let Some(max_players) = self.max_players {
            overlay.push((keys::MAX_PLAYERS, max_players.to_string()));
        }
        if let Some(lan) = self.lan {
            overlay.push((keys::LAN, lan.to_string()));
        }
        overlay
    }
}

/// Available subcommands.
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Get the IP address of this machine.
    Ipaddress {
        /// Report the local address instead of the public one.
        #[arg(long = "local")]
        local: bool,
    },

    /// Get or set the configuration.
    Config {
        /// What to do with the configuration.
        #[command(subcommand)]
        action: ConfigAction,
    },

    /// List installed games.
    Games,

    /// List the maps of a game.
    Maps {
        /// Game whose maps to list (defaults to the configured game).
        #[arg(short = 'g', long = "game", value_name = "GAME")]
        game: Option<String>,
    },
}

/// Configuration subcommands.
#[derive(Subcommand, Debug)]
pub enum ConfigAction {
    /// Print the effective configuration.
    Show,

    /// Print one effective value.
    Get {
        /// Key to read (case-insensitive).
        key: String,
    },

    /// Persist a value to the settings file.
    Set {
        /// Key to write.
        key: String,
        /// Value to store.
        value: String,
    },

    /// Persist the installation directories.
    SetDirs {
        /// The directory containing Half-Life.
        #[arg(long = "half-life-directory", value_name = "DIR")]
        half_life_directory: Option<PathBuf>,

        /// The directory containing Steam.
        #[arg(short = 's', long = "steam-directory", value_name = "DIR")]
        steam_directory: Option<PathBuf>,
    },

    /// Print the location of the settings file.
    Path,
}
