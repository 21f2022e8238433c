//! hl-launcher: launcher for Half-Life
//!
//! Resolves launch parameters from the layered configuration (defaults,
//! `appsettings.json`, the per-user settings file, `HL_*` environment
//! variables and command-line options) and starts Steam with them.

use anyhow::{Context, Result, bail};
use clap::Parser;
use halflife_launcher::{
    cli::{Cli, Commands, ConfigAction, LaunchArgs},
    codec,
    launcher::{
        self, GameDirectory, LaunchOptions, Launcher, LauncherPaths, ProcessLauncher, ip, keys,
    },
    prelude::*,
};
use tracing::{debug, info};

fn main() -> Result<()> {
    let cli = Cli::parse();

    init_tracing(cli.verbose)?;
    debug!("Parsed CLI arguments: {:?}", cli);

    let paths = resolve_paths()?;
    let mut config = launcher::build_config(&paths, cli.launch.overlay())
        .context("Failed to load configuration")?;
    debug!(sources = ?config.source_names(), "Loaded configuration");

    match cli.command {
        None => launch(&mut config, &cli.launch)?,
        Some(Commands::Ipaddress { local }) => {
            let address = ip::lookup(local).context("Failed to look up IP address")?;
            if local {
                info!("Local IP address: {}", address);
            } else {
                info!("Public IP address: {}", address);
            }
            println!("{}", address);
        }
        Some(Commands::Config { action }) => run_config(&config, &paths, action)?,
        Some(Commands::Games) => {
            for game in game_directory(&config)?.games()? {
                println!("{}", game);
            }
        }
        Some(Commands::Maps { game }) => {
            let game = game
                .or_else(|| config.get(keys::GAME))
                .context("No game configured")?;
            for map in game_directory(&config)?.maps(&game)? {
                println!("{}", map);
            }
        }
    }

    config.dispose().context("Failed to close settings file")?;
    Ok(())
}

fn launch(config: &mut LayeredConfig, args: &LaunchArgs) -> Result<()> {
    // A game picked on the command line starts on its own start map unless
    // a map was picked too.
    if let (Some(game), None) = (&args.game, &args.map) {
        if let Some(dir) = config.get(keys::HALF_LIFE_DIRECTORY) {
            if let Some(map) = GameDirectory::new(dir).start_map(game)? {
                debug!(%game, %map, "Using the game's start map");
                config.add_source(MemorySource::new("start-map").with_value(keys::MAP, map))?;
            }
        }
    }

    let options = LaunchOptions::from_config(config).context("Invalid launch options")?;
    let program = options.executable();
    let arguments = options.arguments();

    if args.dry_run {
        println!("{} {}", program.display(), arguments);
        return Ok(());
    }

    info!(program = %program.display(), %arguments, "Launching");
    ProcessLauncher.launch(&program, &arguments)?;
    Ok(())
}

fn run_config(config: &LayeredConfig, paths: &LauncherPaths, action: ConfigAction) -> Result<()> {
    match action {
        ConfigAction::Show => print!("{}", codec::serialize(&config.entries())),
        ConfigAction::Get { key } => match config.get(key.as_str()) {
            Some(value) => println!("{}", value),
            None => bail!("'{}' is not set", key),
        },
        ConfigAction::Set { key, value } => {
            config
                .set(key.as_str(), &value)
                .with_context(|| format!("Failed to save '{}'", key))?;
            info!(%key, %value, "Saved setting");
        }
        ConfigAction::SetDirs {
            half_life_directory,
            steam_directory,
        } => {
            if half_life_directory.is_none() && steam_directory.is_none() {
                bail!("Nothing to set: pass --half-life-directory and/or --steam-directory");
            }
            let dirs = [
                (keys::HALF_LIFE_DIRECTORY, half_life_directory),
                (keys::STEAM_DIRECTORY, steam_directory),
            ];
            for (key, dir) in dirs {
                if let Some(dir) = dir {
                    config
                        .set(key, dir.to_string_lossy())
                        .with_context(|| format!("Failed to save '{}'", key))?;
                    info!(%key, dir = %dir.display(), "Saved directory");
                }
            }
        }
        ConfigAction::Path => println!("{}", paths.settings_file.display()),
    }
    Ok(())
}

fn game_directory(config: &LayeredConfig) -> Result<GameDirectory> {
    let dir = config.get(keys::HALF_LIFE_DIRECTORY).with_context(|| {
        format!(
            "{} is not set; run `hl-launcher config set-dirs --half-life-directory <DIR>`",
            keys::HALF_LIFE_DIRECTORY
        )
    })?;
    Ok(GameDirectory::new(dir))
}

fn resolve_paths() -> Result<LauncherPaths> {
    let app_data = dirs::config_dir().context("Could not determine the configuration directory")?;
    let executable = std::env::current_exe().ok();
    Ok(LauncherPaths::new(&app_data, executable.as_deref()))
}

/// Initialize the tracing subscriber.
///
/// # Verbosity Levels
/// - 0 (default): `RUST_LOG`, or info
/// - 1 (-v): Debug level
/// - 2+ (-vv): Trace level
fn init_tracing(verbose: u8) -> Result<()> {
    use tracing_subscriber::{EnvFilter, fmt, prelude::*};

    let filter = match verbose {
        0 => EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        1 => EnvFilter::new("debug"),
        _ => EnvFilter::new("trace"),
    };

    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(std::io::stderr))
        .with(filter)
        .try_init()
        .context("Failed to initialize tracing subscriber")?;

    Ok(())
}
