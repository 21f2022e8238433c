//! Flat `key=value` document codec used by the settings file.
//!
//! The format has one assignment per line, no sections, no quoting and no
//! comments. Lines are split on the first `=`; anything before it is the
//! key and anything after it is the value, whitespace included. Lines
//! without `=` (blank lines among them) are skipped. A key repeated later
//! in a document overrides the earlier value.
//!
//! Values and keys cannot contain newlines, and a value cannot end in `\r`
//! (the `\r\n` it forms is read back as a line ending); such a mapping
//! does not survive a round trip.

use crate::core::Snapshot;

/// UTF-8 byte order mark, tolerated at the start of a document.
const BOM: char = '\u{feff}';

/// Parse a document into a snapshot.
///
/// # Examples
///
/// ```rust
/// use halflife_launcher::codec;
///
/// let snapshot = codec::parse("Game=decay\nnot an assignment\nGame=gearbox\n");
/// assert_eq!(snapshot.len(), 1);
/// assert_eq!(snapshot.get(&"game".into()), Some("gearbox"));
/// ```
pub fn parse(text: &str) -> Snapshot {
    let text = text.strip_prefix(BOM).unwrap_or(text);
    let mut snapshot = Snapshot::new();
    for line in text.lines() {
        if let Some((key, value)) = line.split_once('=') {
            snapshot.insert(key, value);
        }
    }
    snapshot
}

/// Format a single assignment line, newline included.
pub fn format_line(key: &str, value: &str) -> String {
    let mut line = String::with_capacity(key.len() + value.len() + 2);
    line.push_str(key);
    line.push('=');
    line.push_str(value);
    line.push('\n');
    line
}

/// Serialize a snapshot, one line per key in insertion order.
pub fn serialize(snapshot: &Snapshot) -> String {
    snapshot
        .iter()
        .map(|(key, value)| format_line(key.as_str(), value))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_parse_splits_on_first_equals() {
        let snapshot = parse("Args=+map=c1a0\n");
        assert_eq!(snapshot.get(&"Args".into()), Some("+map=c1a0"));
    }

    #[test]
    fn test_parse_preserves_whitespace() {
        let snapshot = parse(" Game = decay \n");
        assert_eq!(snapshot.get(&" Game ".into()), Some(" decay "));
        assert_eq!(snapshot.get(&"Game".into()), None);
    }

    #[test]
    fn test_parse_skips_lines_without_equals() {
        let snapshot = parse("\n[section]\n; comment\nMap=crossfire\n\n");
        assert_eq!(snapshot.len(), 1);
        assert_eq!(snapshot.get(&"Map".into()), Some("crossfire"));
    }

    #[test]
    fn test_parse_last_duplicate_wins() {
        let snapshot = parse("Map=a\nmap=b\nMAP=c\n");
        assert_eq!(snapshot.len(), 1);
        assert_eq!(snapshot.get(&"Map".into()), Some("c"));
    }

    #[test]
    fn test_parse_empty_value() {
        let snapshot = parse("Map=\n");
        assert_eq!(snapshot.get(&"Map".into()), Some(""));
    }

    #[test]
    fn test_parse_crlf_and_bom() {
        let snapshot = parse("\u{feff}Game=decay\r\nLan=true\r\n");
        assert_eq!(snapshot.get(&"Game".into()), Some("decay"));
        assert_eq!(snapshot.get(&"Lan".into()), Some("true"));
    }

    #[test]
    fn test_parse_without_trailing_newline() {
        let snapshot = parse("Game=decay");
        assert_eq!(snapshot.get(&"Game".into()), Some("decay"));
    }

    #[test]
    fn test_serialize_insertion_order() {
        let snapshot: Snapshot = [("Map", "crossfire"), ("Game", "valve"), ("Lan", "")]
            .into_iter()
            .collect();
        assert_eq!(serialize(&snapshot), "Map=crossfire\nGame=valve\nLan=\n");
    }

    #[test]
    fn test_trailing_carriage_return_is_lost() {
        let line = format_line("Map", "crossfire\r");
        assert_eq!(line, "Map=crossfire\r\n");
        assert_eq!(parse(&line).get(&"Map".into()), Some("crossfire"));
    }

    #[test]
    fn test_serialize_empty() {
        assert_eq!(serialize(&Snapshot::new()), "");
    }

    proptest! {
        #[test]
        fn prop_round_trip(entries in prop::collection::vec(("[A-Za-z0-9_:. ]{0,12}", "[^\n\r]{0,24}"), 0..16)) {
            let snapshot: Snapshot = entries.into_iter().collect();
            prop_assert_eq!(parse(&serialize(&snapshot)), snapshot);
        }
    }
}
