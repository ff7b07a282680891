// Configuration loading and parsing (league.toml, valuation.toml, credentials.toml).

use chrono::Datelike;
use serde::Deserialize;
use std::path::{Path, PathBuf};
use std::time::Duration;
use thiserror::Error;

use huddle_core::{FairnessPolicy, PlayerDefaults, Season, ValueTables};

// ---------------------------------------------------------------------------
// Error types
// ---------------------------------------------------------------------------

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("config file not found: {path}")]
    FileNotFound { path: PathBuf },

    #[error("failed to parse config file {path}: {source}")]
    ParseError {
        path: PathBuf,
        source: toml::de::Error,
    },

    #[error("validation error for field `{field}`: {message}")]
    ValidationError { field: String, message: String },

    #[error("failed to initialize config from defaults: {message}")]
    DefaultsCopyError { message: String },
}

// ---------------------------------------------------------------------------
// Top-level assembled Config
// ---------------------------------------------------------------------------

#[derive(Debug, Clone)]
pub struct Config {
    pub league: LeagueConfig,
    pub fairness: FairnessPolicy,
    pub lookup: LookupConfig,
    pub llm: LlmConfig,
    pub tables: ValueTables,
    pub player_defaults: PlayerDefaults,
    pub credentials: CredentialsConfig,
    /// Directory relative paths in the config are resolved against.
    pub base_dir: PathBuf,
}

impl Config {
    /// The draft season picks are valued against.
    pub fn season(&self) -> Season {
        Season {
            current: self.league.current_season,
            window_years: self.league.pick_window_years,
        }
    }

    /// Resolve a configured path against the config's base directory.
    pub fn resolve(&self, path: &str) -> PathBuf {
        let path = Path::new(path);
        if path.is_absolute() {
            path.to_path_buf()
        } else {
            self.base_dir.join(path)
        }
    }
}

// ---------------------------------------------------------------------------
// league.toml structs
// ---------------------------------------------------------------------------

/// Raw deserialization target for the entire league.toml file.
#[derive(Debug, Clone, Deserialize)]
struct LeagueFile {
    league: LeagueSection,
    #[serde(default)]
    fairness: FairnessPolicy,
    lookup: LookupConfig,
    llm: LlmConfig,
}

#[derive(Debug, Clone, Deserialize)]
struct LeagueSection {
    name: String,
    #[serde(default)]
    current_season: Option<i32>,
    #[serde(default = "default_window_years")]
    pick_window_years: u8,
}

fn default_window_years() -> u8 {
    Season::DEFAULT_WINDOW_YEARS
}

#[derive(Debug, Clone)]
pub struct LeagueConfig {
    pub name: String,
    pub current_season: i32,
    pub pick_window_years: u8,
}

#[derive(Debug, Clone, Deserialize)]
pub struct LookupConfig {
    pub timeout_secs: u64,
    #[serde(default)]
    pub ratings_csv: Option<String>,
    #[serde(default)]
    pub cache_path: Option<String>,
    #[serde(default = "default_cache_max_age_days")]
    pub cache_max_age_days: u32,
    #[serde(default)]
    pub use_llm: bool,
}

fn default_cache_max_age_days() -> u32 {
    30
}

impl LookupConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct LlmConfig {
    pub model: String,
    pub lookup_max_tokens: u32,
    pub parse_proposals: bool,
    pub narrate: bool,
    pub narrative_max_tokens: u32,
}

// ---------------------------------------------------------------------------
// valuation.toml structs
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
struct ValuationFile {
    model: ValueTables,
    player_defaults: PlayerDefaults,
}

// ---------------------------------------------------------------------------
// credentials.toml structs
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Deserialize, Default)]
pub struct CredentialsConfig {
    pub anthropic_api_key: Option<String>,
}

// ---------------------------------------------------------------------------
// Loading logic
// ---------------------------------------------------------------------------

/// Load and validate configuration from `config/league.toml`,
/// `config/valuation.toml`, and (optionally) `config/credentials.toml`,
/// all relative to the given `base_dir`.
///
/// This does not copy defaults; `load_config()` does.
pub fn load_config_from(base_dir: &Path) -> Result<Config, ConfigError> {
    let config_dir = base_dir.join("config");

    // --- league.toml (required) ---
    let league_path = config_dir.join("league.toml");
    let league_file: LeagueFile = parse_file(&league_path)?;

    // --- valuation.toml (required) ---
    let valuation_path = config_dir.join("valuation.toml");
    let valuation: ValuationFile = parse_file(&valuation_path)?;

    // --- credentials.toml (optional) ---
    let credentials_path = config_dir.join("credentials.toml");
    let credentials = if credentials_path.exists() {
        parse_file(&credentials_path)?
    } else {
        CredentialsConfig::default()
    };

    let league = LeagueConfig {
        name: league_file.league.name,
        current_season: league_file
            .league
            .current_season
            .unwrap_or_else(|| chrono::Utc::now().year()),
        pick_window_years: league_file.league.pick_window_years,
    };

    let config = Config {
        league,
        fairness: league_file.fairness,
        lookup: league_file.lookup,
        llm: league_file.llm,
        tables: valuation.model,
        player_defaults: valuation.player_defaults,
        credentials,
        base_dir: base_dir.to_path_buf(),
    };

    validate(&config)?;

    Ok(config)
}

/// Ensure all config files exist by copying missing ones from `defaults/`.
/// Returns the list of files that were copied. Skips `.example` files.
pub fn ensure_config_files(base_dir: &Path) -> Result<Vec<PathBuf>, ConfigError> {
    let defaults_dir = base_dir.join("defaults");
    let config_dir = base_dir.join("config");

    if !defaults_dir.exists() {
        if !config_dir.exists() {
            return Err(ConfigError::DefaultsCopyError {
                message: format!(
                    "neither defaults/ nor config/ directory found in {}; \
                     run from the project root or ensure defaults/ is present",
                    base_dir.display()
                ),
            });
        }
        return Ok(vec![]);
    }

    std::fs::create_dir_all(&config_dir).map_err(|e| ConfigError::DefaultsCopyError {
        message: format!("failed to create config directory: {e}"),
    })?;

    let mut copied = Vec::new();

    let entries = std::fs::read_dir(&defaults_dir).map_err(|e| ConfigError::DefaultsCopyError {
        message: format!("failed to read defaults directory: {e}"),
    })?;

    for entry in entries {
        let entry = entry.map_err(|e| ConfigError::DefaultsCopyError {
            message: format!("failed to read defaults entry: {e}"),
        })?;
        let path = entry.path();

        if !path.is_file() {
            continue;
        }
        let Some(file_name) = path.file_name() else {
            continue;
        };

        // Templates the user fills in by hand
        if file_name.to_str().is_some_and(|n| n.ends_with(".example")) {
            continue;
        }
        let target = config_dir.join(file_name);

        match std::fs::OpenOptions::new()
            .write(true)
            .create_new(true)
            .open(&target)
        {
            Ok(mut dest) => {
                let content = std::fs::read(&path).map_err(|e| ConfigError::DefaultsCopyError {
                    message: format!("failed to read {}: {e}", path.display()),
                })?;
                std::io::Write::write_all(&mut dest, &content).map_err(|e| {
                    ConfigError::DefaultsCopyError {
                        message: format!("failed to write {}: {e}", target.display()),
                    }
                })?;
                copied.push(target);
            }
            Err(e) if e.kind() == std::io::ErrorKind::AlreadyExists => {}
            Err(e) => {
                return Err(ConfigError::DefaultsCopyError {
                    message: format!("failed to create {}: {e}", target.display()),
                });
            }
        }
    }

    Ok(copied)
}

/// Loads config relative to `HUDDLE_HOME`, or the current working directory
/// when unset. Copies default config files first.
pub fn load_config() -> Result<Config, ConfigError> {
    let base = match std::env::var_os("HUDDLE_HOME") {
        Some(home) => PathBuf::from(home),
        None => std::env::current_dir().map_err(|_| ConfigError::FileNotFound {
            path: PathBuf::from("."),
        })?,
    };
    ensure_config_files(&base)?;
    load_config_from(&base)
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

fn read_file(path: &Path) -> Result<String, ConfigError> {
    std::fs::read_to_string(path).map_err(|_| ConfigError::FileNotFound {
        path: path.to_path_buf(),
    })
}

fn parse_file<T: serde::de::DeserializeOwned>(path: &Path) -> Result<T, ConfigError> {
    let text = read_file(path)?;
    toml::from_str(&text).map_err(|e| ConfigError::ParseError {
        path: path.to_path_buf(),
        source: e,
    })
}

fn invalid(field: &str, message: impl Into<String>) -> ConfigError {
    ConfigError::ValidationError {
        field: field.to_string(),
        message: message.into(),
    }
}

// ---------------------------------------------------------------------------
// Validation
// ---------------------------------------------------------------------------

fn validate(config: &Config) -> Result<(), ConfigError> {
    if config.league.name.trim().is_empty() {
        return Err(invalid("league.name", "must not be empty"));
    }
    if !(2000..=2100).contains(&config.league.current_season) {
        return Err(invalid(
            "league.current_season",
            format!("must be a plausible year, got {}", config.league.current_season),
        ));
    }
    if config.league.pick_window_years == 0 {
        return Err(invalid("league.pick_window_years", "must be > 0"));
    }

    let fairness = &config.fairness;
    if !(fairness.fair_max_pct >= 0.0 && fairness.fair_max_pct < fairness.unfair_min_pct) {
        return Err(invalid(
            "fairness.fair_max_pct",
            format!(
                "must be >= 0 and below unfair_min_pct ({}), got {}",
                fairness.unfair_min_pct, fairness.fair_max_pct
            ),
        ));
    }
    if fairness.unfair_min_pct > 100.0 {
        return Err(invalid(
            "fairness.unfair_min_pct",
            format!("must be <= 100, got {}", fairness.unfair_min_pct),
        ));
    }

    if config.lookup.timeout_secs == 0 {
        return Err(invalid("lookup.timeout_secs", "must be > 0"));
    }
    if config.llm.model.trim().is_empty() {
        return Err(invalid("llm.model", "must not be empty"));
    }
    if config.llm.lookup_max_tokens == 0 {
        return Err(invalid("llm.lookup_max_tokens", "must be > 0"));
    }
    if config.llm.narrative_max_tokens == 0 {
        return Err(invalid("llm.narrative_max_tokens", "must be > 0"));
    }

    let tables = &config.tables;
    if tables.pick_chart.is_empty() {
        return Err(invalid("model.pick_chart", "must have at least one entry"));
    }
    if !(tables.future_discount > 0.0 && tables.future_discount <= 1.0) {
        return Err(invalid(
            "model.future_discount",
            format!("must be in (0, 1], got {}", tables.future_discount),
        ));
    }
    if !(tables.min_discount >= 0.0 && tables.min_discount <= 1.0) {
        return Err(invalid(
            "model.min_discount",
            format!("must be in [0, 1], got {}", tables.min_discount),
        ));
    }
    if tables.player_multiplier <= 0.0 {
        return Err(invalid(
            "model.player_multiplier",
            format!("must be > 0, got {}", tables.player_multiplier),
        ));
    }
    for tier in &tables.cap_hit_tiers {
        if tier.factor <= 0.0 || tier.above < 0.0 {
            return Err(invalid(
                "model.cap_hit_tiers",
                format!("tier above {} has factor {}", tier.above, tier.factor),
            ));
        }
    }

    let defaults = &config.player_defaults;
    if !(50..=99).contains(&defaults.overall) {
        return Err(invalid(
            "player_defaults.overall",
            format!("must be in 50..=99, got {}", defaults.overall),
        ));
    }
    if !(18..=45).contains(&defaults.age) {
        return Err(invalid(
            "player_defaults.age",
            format!("must be in 18..=45, got {}", defaults.age),
        ));
    }

    Ok(())
}

// ---------------------------------------------------------------------------
// Unit tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use huddle_core::{DevTrait, Position};
    use std::fs;

    /// The huddle-app crate root, which holds `defaults/`.
    fn project_root() -> PathBuf {
        PathBuf::from(env!("CARGO_MANIFEST_DIR"))
    }

    /// A scratch directory with `config/` populated from the shipped defaults.
    fn scratch(name: &str) -> PathBuf {
        let tmp = std::env::temp_dir().join(name);
        let _ = fs::remove_dir_all(&tmp);
        let config_dir = tmp.join("config");
        fs::create_dir_all(&config_dir).unwrap();
        let root = project_root();
        for file in ["league.toml", "valuation.toml"] {
            fs::copy(root.join("defaults").join(file), config_dir.join(file)).unwrap();
        }
        tmp
    }

    fn rewrite(dir: &Path, file: &str, from: &str, to: &str) {
        let path = dir.join("config").join(file);
        let text = fs::read_to_string(&path).unwrap();
        assert!(text.contains(from), "{file} has no `{from}`");
        fs::write(&path, text.replacen(from, to, 1)).unwrap();
    }

    #[test]
    fn load_valid_config_from_defaults() {
        let tmp = scratch("huddle_config_valid");
        let config = load_config_from(&tmp).expect("should load valid config");

        assert_eq!(config.league.name, "Huddle Franchise League");
        assert_eq!(config.league.current_season, chrono::Utc::now().year());
        assert_eq!(config.league.pick_window_years, 6);
        assert_eq!(config.fairness, FairnessPolicy::default());
        assert_eq!(config.lookup.timeout(), Duration::from_secs(10));
        assert_eq!(config.lookup.ratings_csv.as_deref(), Some("data/ratings.csv"));
        assert!(config.llm.narrate);
        assert_eq!(config.llm.lookup_max_tokens, 150);
        assert_eq!(config.llm.narrative_max_tokens, 300);
        assert_eq!(config.tables, ValueTables::default());
        assert_eq!(config.player_defaults.dev_trait, DevTrait::Normal);
        assert_eq!(config.player_defaults.position, Position::Halfback);
        assert!(config.credentials.anthropic_api_key.is_none());
        assert_eq!(config.resolve("data/x.csv"), tmp.join("data/x.csv"));

        let _ = fs::remove_dir_all(&tmp);
    }

    #[test]
    fn explicit_season_overrides_calendar() {
        let tmp = scratch("huddle_config_season");
        rewrite(&tmp, "league.toml", "# current_season = 2025", "current_season = 2025");
        let config = load_config_from(&tmp).unwrap();
        assert_eq!(config.season(), Season::new(2025));
        let _ = fs::remove_dir_all(&tmp);
    }

    #[test]
    fn partial_valuation_file_keeps_defaults() {
        let tmp = scratch("huddle_config_partial_valuation");
        fs::write(
            tmp.join("config/valuation.toml"),
            "[model]\nplayer_multiplier = 1.5\n",
        )
        .unwrap();
        let config = load_config_from(&tmp).unwrap();
        assert_eq!(config.tables.player_multiplier, 1.5);
        assert_eq!(config.tables.pick_chart, ValueTables::default().pick_chart);
        assert_eq!(config.player_defaults, PlayerDefaults::default());
        let _ = fs::remove_dir_all(&tmp);
    }

    #[test]
    fn credentials_are_loaded_when_present() {
        let tmp = scratch("huddle_config_credentials");
        fs::write(
            tmp.join("config/credentials.toml"),
            "anthropic_api_key = \"sk-ant-test\"\n",
        )
        .unwrap();
        let config = load_config_from(&tmp).unwrap();
        assert_eq!(config.credentials.anthropic_api_key.as_deref(), Some("sk-ant-test"));
        let _ = fs::remove_dir_all(&tmp);
    }

    #[test]
    fn rejects_inverted_fairness_bounds() {
        let tmp = scratch("huddle_config_bad_fairness");
        rewrite(&tmp, "league.toml", "fair_max_pct = 10.0", "fair_max_pct = 40.0");
        match load_config_from(&tmp).unwrap_err() {
            ConfigError::ValidationError { field, .. } => assert_eq!(field, "fairness.fair_max_pct"),
            other => panic!("expected ValidationError, got: {other}"),
        }
        let _ = fs::remove_dir_all(&tmp);
    }

    #[test]
    fn rejects_zero_timeout() {
        let tmp = scratch("huddle_config_bad_timeout");
        rewrite(&tmp, "league.toml", "timeout_secs = 10", "timeout_secs = 0");
        match load_config_from(&tmp).unwrap_err() {
            ConfigError::ValidationError { field, .. } => assert_eq!(field, "lookup.timeout_secs"),
            other => panic!("expected ValidationError, got: {other}"),
        }
        let _ = fs::remove_dir_all(&tmp);
    }

    #[test]
    fn rejects_zero_lookup_token_limit() {
        let tmp = scratch("huddle_config_bad_lookup_tokens");
        rewrite(&tmp, "league.toml", "lookup_max_tokens = 150", "lookup_max_tokens = 0");
        match load_config_from(&tmp).unwrap_err() {
            ConfigError::ValidationError { field, .. } => {
                assert_eq!(field, "llm.lookup_max_tokens")
            }
            other => panic!("expected ValidationError, got: {other}"),
        }
        let _ = fs::remove_dir_all(&tmp);
    }

    #[test]
    fn rejects_bad_discount() {
        let tmp = scratch("huddle_config_bad_discount");
        rewrite(&tmp, "valuation.toml", "future_discount = 0.9", "future_discount = 1.5");
        match load_config_from(&tmp).unwrap_err() {
            ConfigError::ValidationError { field, .. } => assert_eq!(field, "model.future_discount"),
            other => panic!("expected ValidationError, got: {other}"),
        }
        let _ = fs::remove_dir_all(&tmp);
    }

    #[test]
    fn rejects_out_of_range_default_overall() {
        let tmp = scratch("huddle_config_bad_default");
        rewrite(&tmp, "valuation.toml", "overall = 70", "overall = 30");
        match load_config_from(&tmp).unwrap_err() {
            ConfigError::ValidationError { field, .. } => {
                assert_eq!(field, "player_defaults.overall")
            }
            other => panic!("expected ValidationError, got: {other}"),
        }
        let _ = fs::remove_dir_all(&tmp);
    }

    #[test]
    fn missing_league_file_is_not_found() {
        let tmp = scratch("huddle_config_missing_league");
        fs::remove_file(tmp.join("config/league.toml")).unwrap();
        match load_config_from(&tmp).unwrap_err() {
            ConfigError::FileNotFound { path } => assert!(path.ends_with("league.toml")),
            other => panic!("expected FileNotFound, got: {other}"),
        }
        let _ = fs::remove_dir_all(&tmp);
    }

    #[test]
    fn invalid_toml_is_a_parse_error() {
        let tmp = scratch("huddle_config_invalid_toml");
        fs::write(tmp.join("config/valuation.toml"), "[model\nbroken").unwrap();
        match load_config_from(&tmp).unwrap_err() {
            ConfigError::ParseError { path, .. } => assert!(path.ends_with("valuation.toml")),
            other => panic!("expected ParseError, got: {other}"),
        }
        let _ = fs::remove_dir_all(&tmp);
    }

    #[test]
    fn ensure_config_files_copies_missing_files() {
        let tmp = std::env::temp_dir().join("huddle_config_ensure_copies");
        let _ = fs::remove_dir_all(&tmp);

        let defaults_dir = tmp.join("defaults");
        fs::create_dir_all(&defaults_dir).unwrap();
        let root = project_root();
        for file in ["league.toml", "valuation.toml", "credentials.toml.example"] {
            fs::copy(root.join("defaults").join(file), defaults_dir.join(file)).unwrap();
        }

        assert!(!tmp.join("config").exists());
        let copied = ensure_config_files(&tmp).expect("should succeed");
        assert_eq!(copied.len(), 2);
        assert!(tmp.join("config/league.toml").exists());
        assert!(tmp.join("config/valuation.toml").exists());
        assert!(!tmp.join("config/credentials.toml.example").exists());

        // The copied files load as-is.
        load_config_from(&tmp).expect("copied defaults should load");

        let _ = fs::remove_dir_all(&tmp);
    }

    #[test]
    fn ensure_config_files_skips_existing() {
        let tmp = std::env::temp_dir().join("huddle_config_ensure_skips");
        let _ = fs::remove_dir_all(&tmp);

        let defaults_dir = tmp.join("defaults");
        let config_dir = tmp.join("config");
        fs::create_dir_all(&defaults_dir).unwrap();
        fs::create_dir_all(&config_dir).unwrap();
        let root = project_root();
        for file in ["league.toml", "valuation.toml"] {
            fs::copy(root.join("defaults").join(file), defaults_dir.join(file)).unwrap();
        }
        fs::write(config_dir.join("league.toml"), "# custom\n").unwrap();

        let copied = ensure_config_files(&tmp).expect("should succeed");
        assert_eq!(copied.len(), 1);
        assert!(copied[0].ends_with("valuation.toml"));
        let content = fs::read_to_string(config_dir.join("league.toml")).unwrap();
        assert_eq!(content, "# custom\n");

        let _ = fs::remove_dir_all(&tmp);
    }

    #[test]
    fn ensure_config_files_no_defaults_dir_is_ok() {
        let tmp = std::env::temp_dir().join("huddle_config_no_defaults");
        let _ = fs::remove_dir_all(&tmp);
        fs::create_dir_all(tmp.join("config")).unwrap();

        let copied = ensure_config_files(&tmp).expect("should succeed");
        assert!(copied.is_empty());

        let _ = fs::remove_dir_all(&tmp);
    }

    #[test]
    fn ensure_config_files_errors_when_both_dirs_missing() {
        let tmp = std::env::temp_dir().join("huddle_config_both_missing");
        let _ = fs::remove_dir_all(&tmp);
        fs::create_dir_all(&tmp).unwrap();

        match ensure_config_files(&tmp).unwrap_err() {
            ConfigError::DefaultsCopyError { message } => {
                assert!(message.contains("neither defaults/ nor config/"));
            }
            other => panic!("expected DefaultsCopyError, got: {other}"),
        }

        let _ = fs::remove_dir_all(&tmp);
    }
}
