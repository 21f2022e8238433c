//! Case-insensitive configuration keys.

use std::borrow::Cow;
use std::fmt;
use std::hash::{Hash, Hasher};

/// A configuration key.
///
/// Keys compare and hash case-insensitively, but keep the spelling they were
/// created with so that serialized files look the way the user wrote them.
/// `:` separates hierarchy levels (`Logging:LogLevel`); most keys in this
/// crate are flat.
///
/// # Examples
///
/// ```rust
/// use halflife_launcher::core::ConfigKey;
///
/// assert_eq!(ConfigKey::new("MaxPlayers"), ConfigKey::new("maxplayers"));
/// assert_eq!(ConfigKey::new("Logging:LogLevel").parent(), Some(ConfigKey::new("logging")));
/// ```
#[derive(Clone)]
pub struct ConfigKey {
    raw: String,
}

impl ConfigKey {
    /// Separator between hierarchy levels.
    pub const SEPARATOR: char = ':';

    /// Create a key from its textual form.
    pub fn new(raw: impl Into<String>) -> Self {
        Self { raw: raw.into() }
    }

    /// The key as originally spelled.
    pub fn as_str(&self) -> &str {
        &self.raw
    }

    /// The hierarchy levels of this key, outermost first.
    pub fn segments(&self) -> impl Iterator<Item = &str> {
        self.raw.split(Self::SEPARATOR)
    }

    /// The enclosing section, or `None` for a flat key.
    pub fn parent(&self) -> Option<ConfigKey> {
        self.raw
            .rfind(Self::SEPARATOR)
            .map(|idx| ConfigKey::new(&self.raw[..idx]))
    }

    /// A key nested one level below this one.
    pub fn child(&self, segment: &str) -> ConfigKey {
        if self.raw.is_empty() {
            return ConfigKey::new(segment);
        }
        ConfigKey::new(format!("{}{}{}", self.raw, Self::SEPARATOR, segment))
    }

    fn folded(&self) -> Cow<'_, str> {
        if self.raw.bytes().any(|b| b.is_ascii_uppercase() || !b.is_ascii()) {
            Cow::Owned(self.raw.to_lowercase())
        } else {
            Cow::Borrowed(&self.raw)
        }
    }
}

impl PartialEq for ConfigKey {
    fn eq(&self, other: &Self) -> bool {
        self.raw == other.raw || self.folded() == other.folded()
    }
}

impl Eq for ConfigKey {}

impl Hash for ConfigKey {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.folded().hash(state);
    }
}

impl fmt::Display for ConfigKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.raw)
    }
}

impl fmt::Debug for ConfigKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Debug::fmt(&self.raw, f)
    }
}

impl From<&str> for ConfigKey {
    fn from(raw: &str) -> Self {
        Self::new(raw)
    }
}

impl From<String> for ConfigKey {
    fn from(raw: String) -> Self {
        Self::new(raw)
    }
}

impl From<&String> for ConfigKey {
    fn from(raw: &String) -> Self {
        Self::new(raw.as_str())
    }
}

impl From<&ConfigKey> for ConfigKey {
    fn from(key: &ConfigKey) -> Self {
        key.clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn test_case_insensitive_equality() {
        assert_eq!(ConfigKey::new("HalfLifeDirectory"), ConfigKey::new("HALFLIFEDIRECTORY"));
        assert_ne!(ConfigKey::new("Map"), ConfigKey::new("Maps"));
    }

    #[test]
    fn test_hash_agrees_with_equality() {
        let mut set = HashSet::new();
        set.insert(ConfigKey::new("Game"));
        assert!(set.contains(&ConfigKey::new("game")));
        assert!(!set.insert(ConfigKey::new("GAME")));
    }

    #[test]
    fn test_keeps_original_spelling() {
        let key = ConfigKey::new("SteamDirectory");
        assert_eq!(key.as_str(), "SteamDirectory");
        assert_eq!(key.to_string(), "SteamDirectory");
    }

    #[test]
    fn test_hierarchy() {
        let key = ConfigKey::new("Servers:0:Address");
        assert_eq!(key.segments().collect::<Vec<_>>(), vec!["Servers", "0", "Address"]);
        assert_eq!(key.parent(), Some(ConfigKey::new("servers:0")));
        assert_eq!(ConfigKey::new("Map").parent(), None);
        assert_eq!(ConfigKey::new("Servers").child("1"), ConfigKey::new("Servers:1"));
        assert_eq!(ConfigKey::new("").child("Map"), ConfigKey::new("Map"));
    }
}
