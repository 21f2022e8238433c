//! Discovery of installed games and maps.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

/// Marker file present in every game directory.
const LIBLIST: &str = "liblist.gam";
const MAP_EXTENSION: &str = "bsp";

/// A Half-Life installation directory.
///
/// Games are subdirectories holding a `liblist.gam`; maps are the `.bsp`
/// files in a game's `maps` directory.
#[derive(Debug, Clone)]
pub struct GameDirectory {
    root: PathBuf,
}

impl GameDirectory {
    /// Wrap an installation directory.
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// The installation directory.
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Names of installed games, sorted.
    pub fn games(&self) -> io::Result<Vec<String>> {
        let mut games = Vec::new();
        for entry in fs::read_dir(&self.root)? {
            let entry = entry?;
            if entry.path().join(LIBLIST).is_file() {
                games.push(entry.file_name().to_string_lossy().into_owned());
            }
        }
        games.sort();
        Ok(games)
    }

    /// Map names of a game without the `.bsp` extension, sorted.
    ///
    /// A game without a `maps` directory has no maps.
    pub fn maps(&self, game: &str) -> io::Result<Vec<String>> {
        let dir = self.root.join(game).join("maps");
        let entries = match fs::read_dir(&dir) {
            Ok(entries) => entries,
            Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(Vec::new()),
            Err(e) => return Err(e),
        };

        let mut maps = Vec::new();
        for entry in entries {
            let path = entry?.path();
            let is_map = path
                .extension()
                .is_some_and(|ext| ext.eq_ignore_ascii_case(MAP_EXTENSION));
            if is_map {
                if let Some(stem) = path.file_stem() {
                    maps.push(stem.to_string_lossy().into_owned());
                }
            }
        }
        maps.sort();
        Ok(maps)
    }

    /// The start map named in a game's `liblist.gam`.
    ///
    /// Returns `None` when the game is not installed or names no start map.
    pub fn start_map(&self, game: &str) -> io::Result<Option<String>> {
        let bytes = match fs::read(self.root.join(game).join(LIBLIST)) {
            Ok(bytes) => bytes,
            Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(e),
        };
        Ok(parse_start_map(&String::from_utf8_lossy(&bytes)))
    }
}

fn parse_start_map(liblist: &str) -> Option<String> {
    liblist.lines().find_map(|line| {
        let line = line.trim();
        let (name, value) = line.split_once(char::is_whitespace)?;
        if !name.eq_ignore_ascii_case("startmap") {
            return None;
        }
        let value = value.trim().trim_matches('"');
        let map = value.strip_suffix(".bsp").unwrap_or(value);
        (!map.is_empty()).then(|| map.to_string())
    })
}
