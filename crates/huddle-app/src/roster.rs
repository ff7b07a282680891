// League ratings sheet: a CSV of known players used to fill in attributes
// a proposal leaves out.
//
// Expected header: name,overall,age,position,dev_trait. Extra columns are
// ignored and any attribute cell may be blank.

use async_trait::async_trait;
use serde::Deserialize;
use std::collections::HashMap;
use std::io::Read;
use std::path::Path;
use tracing::{debug, info, warn};

use huddle_core::{DevTrait, PlayerAttributes, PlayerLookup, Position};

// ---------------------------------------------------------------------------
// Error type
// ---------------------------------------------------------------------------

#[derive(Debug, thiserror::Error)]
pub enum RosterError {
    #[error("failed to read file {path}: {source}")]
    Io {
        path: String,
        source: std::io::Error,
    },

    #[error("CSV error in {path}: {source}")]
    Csv { path: String, source: csv::Error },
}

// ---------------------------------------------------------------------------
// Raw CSV row
// ---------------------------------------------------------------------------

#[derive(Debug, Deserialize)]
struct RatingRow {
    name: String,
    #[serde(default)]
    overall: Option<i64>,
    #[serde(default)]
    age: Option<i64>,
    #[serde(default)]
    position: Option<String>,
    #[serde(default)]
    dev_trait: Option<String>,
}

const SOURCE: &str = "ratings sheet";
const NAME_SUFFIXES: [&str; 5] = ["jr", "sr", "ii", "iii", "iv"];

/// Lower-case, punctuation-free, suffix-free form used for matching
/// ("T.J. Watt" and "tj watt" agree, as do "Patrick Surtain II" and
/// "patrick surtain").
pub fn normalize_name(name: &str) -> String {
    let cleaned: String = name
        .chars()
        .filter_map(|c| {
            if c.is_alphanumeric() {
                Some(c.to_ascii_lowercase())
            } else if c.is_whitespace() || c == '-' {
                Some(' ')
            } else {
                None
            }
        })
        .collect();
    let mut words: Vec<&str> = cleaned.split_whitespace().collect();
    while words.len() > 1 && words.last().is_some_and(|w| NAME_SUFFIXES.contains(w)) {
        words.pop();
    }
    words.join(" ")
}

// ---------------------------------------------------------------------------
// RosterLookup
// ---------------------------------------------------------------------------

/// In-memory ratings sheet keyed by normalised name.
#[derive(Debug, Clone, Default)]
pub struct RosterLookup {
    players: HashMap<String, PlayerAttributes>,
    /// Last name -> full normalised names sharing it.
    last_names: HashMap<String, Vec<String>>,
}

impl RosterLookup {
    pub fn load(path: &Path) -> Result<Self, RosterError> {
        let file = std::fs::File::open(path).map_err(|e| RosterError::Io {
            path: path.display().to_string(),
            source: e,
        })?;
        let roster = Self::from_reader(file).map_err(|e| RosterError::Csv {
            path: path.display().to_string(),
            source: e,
        })?;
        info!(path = %path.display(), players = roster.len(), "ratings sheet loaded");
        Ok(roster)
    }

    /// Parse a ratings CSV. Malformed rows are skipped with a warning.
    pub fn from_reader<R: Read>(rdr: R) -> Result<Self, csv::Error> {
        let mut reader = csv::ReaderBuilder::new()
            .trim(csv::Trim::All)
            .flexible(true)
            .from_reader(rdr);
        let mut roster = Self::default();
        for result in reader.deserialize::<RatingRow>() {
            match result {
                Ok(row) => roster.insert(row),
                Err(e) => warn!("skipping malformed ratings row: {}", e),
            }
        }
        Ok(roster)
    }

    fn insert(&mut self, row: RatingRow) {
        let key = normalize_name(&row.name);
        if key.is_empty() {
            return;
        }
        let attrs = PlayerAttributes {
            overall: row.overall,
            age: row.age,
            dev_trait: row.dev_trait.as_deref().and_then(DevTrait::from_alias),
            position: row.position.as_deref().and_then(Position::from_alias),
            source: SOURCE.to_string(),
        };
        if attrs.is_empty() {
            warn!("skipping ratings row '{}': no attributes", row.name.trim());
            return;
        }
        if self.players.insert(key.clone(), attrs).is_some() {
            warn!("duplicate ratings row for '{}', using latest", row.name.trim());
            return;
        }
        if let Some(last) = key.rsplit(' ').next() {
            self.last_names.entry(last.to_string()).or_default().push(key.clone());
        }
    }

    pub fn len(&self) -> usize {
        self.players.len()
    }

    pub fn is_empty(&self) -> bool {
        self.players.is_empty()
    }

    /// Exact normalised-name match, else a last-name match when exactly one
    /// player on the sheet has that last name.
    pub fn find(&self, name: &str) -> Option<&PlayerAttributes> {
        let key = normalize_name(name);
        if let Some(found) = self.players.get(&key) {
            return Some(found);
        }
        let last = key.rsplit(' ').next()?;
        match self.last_names.get(last).map(Vec::as_slice) {
            Some([only]) => {
                debug!(name, matched = only.as_str(), "ratings sheet last-name match");
                self.players.get(only)
            }
            _ => None,
        }
    }
}

#[async_trait]
impl PlayerLookup for RosterLookup {
    async fn lookup_player_attributes(
        &self,
        name: &str,
    ) -> anyhow::Result<Option<PlayerAttributes>> {
        Ok(self.find(name).cloned())
    }

    fn name(&self) -> &str {
        SOURCE
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    const SHEET: &str = "\
name,overall,age,position,dev_trait,team
Patrick Mahomes,99,29,QB,x-factor,KC
T.J. Watt,97,30,ROLB,xf,PIT
Patrick Surtain II,96,24,CB,superstar,DEN
Nick Bosa,95,27,RE,ss,SF
Joey Bosa,88,29,LE,star,LAC
Rookie Guy,,,,
Bad Row,ninety,25,QB,star,XX
Justin Tucker,92,35,K,,BAL";

    fn roster() -> RosterLookup {
        RosterLookup::from_reader(SHEET.as_bytes()).unwrap()
    }

    #[test]
    fn normalize_strips_punctuation_and_suffixes() {
        assert_eq!(normalize_name("  T.J. Watt "), "tj watt");
        assert_eq!(normalize_name("Patrick Surtain II"), "patrick surtain");
        assert_eq!(normalize_name("Ja'Marr Chase"), "jamarr chase");
        assert_eq!(normalize_name("Amon-Ra St. Brown"), "amon ra st brown");
        assert_eq!(normalize_name("Jr"), "jr");
    }

    #[test]
    fn loads_rows_and_skips_bad_ones() {
        let roster = roster();
        // Empty and malformed rows are skipped.
        assert_eq!(roster.len(), 6);
        let tucker = roster.find("Justin Tucker").unwrap();
        assert_eq!(tucker.position, Some(Position::Kicker));
        assert_eq!(tucker.dev_trait, None);
    }

    #[test]
    fn exact_match_ignores_case_and_punctuation() {
        let roster = roster();
        let watt = roster.find("tj watt").unwrap();
        assert_eq!(watt.overall, Some(97));
        assert_eq!(watt.dev_trait, Some(DevTrait::XFactor));
        assert_eq!(watt.source, "ratings sheet");
        assert!(roster.find("Patrick Surtain").is_some());
    }

    #[test]
    fn unique_last_name_matches() {
        let roster = roster();
        assert_eq!(roster.find("Mahomes").and_then(|a| a.age), Some(29));
        // Two Bosas: ambiguous.
        assert!(roster.find("Bosa").is_none());
        assert!(roster.find("Nobody Here").is_none());
    }

    #[tokio::test]
    async fn lookup_trait_answers_from_sheet() {
        let roster = roster();
        let found = roster.lookup_player_attributes("Nick Bosa").await.unwrap();
        assert_eq!(found.and_then(|a| a.position), Some(Position::RightEnd));
        let missing = roster.lookup_player_attributes("Unknown").await.unwrap();
        assert!(missing.is_none());
    }

    #[test]
    fn missing_file_is_io_error() {
        let err = RosterLookup::load(Path::new("/nonexistent/ratings.csv")).unwrap_err();
        assert!(matches!(err, RosterError::Io { .. }));
    }

    #[test]
    fn shipped_sheet_loads() {
        let path = Path::new(env!("CARGO_MANIFEST_DIR")).join("data/ratings.csv");
        let roster = RosterLookup::load(&path).unwrap();
        assert!(roster.len() >= 10);
        assert!(roster.find("Sauce Gardner").is_some());
    }
}
