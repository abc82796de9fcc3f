// SolSleuth - platform/config.rs
//
// Platform-specific path resolution and config.toml loading with
// startup validation.
//
// Uses the `directories` crate for XDG (Linux), AppData (Windows),
// Library (macOS) compliance. This module is the only place allowed to
// branch on `target_os`.

use crate::util::constants;
use directories::{BaseDirs, ProjectDirs};
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Resolved platform paths for SolSleuth configuration and for the
/// Flash Player save directories to be searched.
#[derive(Debug, Clone)]
pub struct PlatformPaths {
    /// Configuration directory (e.g. ~/.config/solsleuth/ or %APPDATA%\SolSleuth\)
    pub config_dir: PathBuf,

    /// Platform-convention Flash Player save directories. Every entry is
    /// a *candidate*; discovery skips the ones that do not exist.
    pub flash_dirs: Vec<PathBuf>,
}

impl PlatformPaths {
    /// Resolve platform-appropriate paths.
    ///
    /// Falls back to the current directory if platform dirs cannot be
    /// determined.
    pub fn resolve() -> Self {
        let config_dir = match ProjectDirs::from("", "", constants::APP_ID) {
            Some(proj_dirs) => proj_dirs.config_dir().to_path_buf(),
            None => {
                tracing::warn!("Could not determine platform directories, using current directory");
                PathBuf::from(".")
            }
        };

        let flash_dirs = flash_save_dirs();

        tracing::debug!(
            config = %config_dir.display(),
            flash_dirs = ?flash_dirs,
            "Platform paths resolved"
        );

        Self {
            config_dir,
            flash_dirs,
        }
    }
}

/// Flash Player local shared object directories by platform convention.
///
/// These are where the Flash plugin stored .sol files:
///   - Windows: %APPDATA%\Macromedia\Flash Player
///   - macOS:   ~/Library/Preferences/Macromedia/Flash Player
///   - Linux:   ~/.macromedia/Flash_Player
#[cfg(target_os = "windows")]
fn flash_save_dirs() -> Vec<PathBuf> {
    match BaseDirs::new() {
        // config_dir() is %APPDATA% (Roaming) on Windows.
        Some(base) => vec![base.config_dir().join("Macromedia").join("Flash Player")],
        None => Vec::new(),
    }
}

#[cfg(target_os = "macos")]
fn flash_save_dirs() -> Vec<PathBuf> {
    match BaseDirs::new() {
        Some(base) => vec![base
            .home_dir()
            .join("Library")
            .join("Preferences")
            .join("Macromedia")
            .join("Flash Player")],
        None => Vec::new(),
    }
}

#[cfg(not(any(target_os = "windows", target_os = "macos")))]
fn flash_save_dirs() -> Vec<PathBuf> {
    match BaseDirs::new() {
        Some(base) => vec![base.home_dir().join(".macromedia").join("Flash_Player")],
        None => Vec::new(),
    }
}

// =============================================================================
// config.toml loading and validation
// =============================================================================

/// Raw deserialisable shape of config.toml.
///
/// Unknown keys are silently ignored for forward compatibility -- a newer
/// config file can be used with an older binary without crashing.
#[derive(Debug, Default, serde::Deserialize)]
#[serde(default)]
pub struct RawConfig {
    /// `[discovery]` section.
    pub discovery: DiscoverySection,
    /// `[extraction]` section.
    pub extraction: ExtractionSection,
    /// `[ui]` section.
    pub ui: UiSection,
    /// `[logging]` section.
    pub logging: LoggingSection,
}

/// `[discovery]` config section.
#[derive(Debug, Default, serde::Deserialize)]
#[serde(default)]
pub struct DiscoverySection {
    /// Maximum directory recursion depth.
    pub max_depth: Option<usize>,
    /// Maximum files to discover per scan.
    pub max_files: Option<usize>,
    /// Include glob patterns.
    pub include_patterns: Option<Vec<String>>,
    /// Exclude glob patterns.
    pub exclude_patterns: Option<Vec<String>>,
    /// Case-insensitive filename substring filter.
    pub name_filter: Option<String>,
    /// Extra directories to search in addition to the platform defaults.
    pub extra_dirs: Option<Vec<String>>,
}

/// `[extraction]` config section.
#[derive(Debug, Default, serde::Deserialize)]
#[serde(default)]
pub struct ExtractionSection {
    /// Per-file extraction wall-clock budget in milliseconds.
    pub deadline_ms: Option<u64>,
    /// Per-file read cap in bytes.
    pub max_parse_bytes: Option<usize>,
}

/// `[ui]` config section.
#[derive(Debug, Default, serde::Deserialize)]
#[serde(default)]
pub struct UiSection {
    /// Theme: "dark" or "light".
    pub theme: Option<String>,
    /// Body font size in points.
    pub font_size: Option<f32>,
}

/// `[logging]` config section.
#[derive(Debug, Default, serde::Deserialize)]
#[serde(default)]
pub struct LoggingSection {
    /// Log level: "error", "warn", "info", "debug", "trace".
    pub level: Option<String>,
}

/// Validated application configuration derived from `config.toml`.
///
/// All values are validated against named constants at load time.
/// Invalid values produce actionable warnings and fall back to defaults.
#[derive(Debug, Clone)]
pub struct AppConfig {
    // -- Discovery --
    /// Maximum directory recursion depth.
    pub max_depth: usize,
    /// Maximum files to discover per scan.
    pub max_files: usize,
    /// Include glob patterns.
    pub include_patterns: Vec<String>,
    /// Exclude glob patterns.
    pub exclude_patterns: Vec<String>,
    /// Case-insensitive filename substring filter.
    pub name_filter: Option<String>,
    /// Extra directories to search in addition to the platform defaults.
    pub extra_dirs: Vec<PathBuf>,

    // -- Extraction --
    /// Per-file extraction wall-clock budget.
    pub deadline: Duration,
    /// Per-file read cap in bytes.
    pub max_parse_bytes: usize,

    // -- UI --
    /// Dark mode (true) or light mode (false).
    pub dark_mode: bool,
    /// Body font size in points.
    pub font_size: f32,

    // -- Logging --
    /// Logging level string (for init before tracing is available).
    pub log_level: Option<String>,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            max_depth: constants::DEFAULT_MAX_DEPTH,
            max_files: constants::DEFAULT_MAX_FILES,
            include_patterns: constants::DEFAULT_INCLUDE_PATTERNS
                .iter()
                .map(|s| (*s).to_string())
                .collect(),
            exclude_patterns: constants::DEFAULT_EXCLUDE_PATTERNS
                .iter()
                .map(|s| (*s).to_string())
                .collect(),
            name_filter: None,
            extra_dirs: Vec::new(),
            deadline: Duration::from_millis(constants::DEFAULT_DEADLINE_MS),
            max_parse_bytes: constants::DEFAULT_MAX_PARSE_BYTES,
            dark_mode: true,
            font_size: constants::DEFAULT_FONT_SIZE,
            log_level: None,
        }
    }
}

/// Load and validate `config.toml` from the given config directory.
///
/// Returns `AppConfig` with validated values and a list of non-fatal
/// warnings. If the file does not exist, returns defaults with no
/// warnings (first-run). If the file is unparseable, returns defaults
/// with an error warning -- the application still starts but the user is
/// informed.
pub fn load_config(config_dir: &Path) -> (AppConfig, Vec<String>) {
    let config_path = config_dir.join(constants::CONFIG_FILE_NAME);

    let mut warnings: Vec<String> = Vec::new();

    if !config_path.exists() {
        tracing::debug!(path = %config_path.display(), "No config.toml found; using defaults");
        return (AppConfig::default(), warnings);
    }

    let content = match std::fs::read_to_string(&config_path) {
        Ok(c) => c,
        Err(e) => {
            let msg = format!(
                "Could not read config file '{}': {e}. Using defaults.",
                config_path.display()
            );
            tracing::warn!("{}", msg);
            warnings.push(msg);
            return (AppConfig::default(), warnings);
        }
    };

    let raw: RawConfig = match toml::from_str(&content) {
        Ok(r) => r,
        Err(e) => {
            let msg = format!(
                "Failed to parse config file '{}': {e}. Using defaults.",
                config_path.display()
            );
            tracing::warn!("{}", msg);
            warnings.push(msg);
            return (AppConfig::default(), warnings);
        }
    };

    tracing::info!(path = %config_path.display(), "Loaded config.toml");

    // Validate each field against named constants, accumulating all errors.
    let mut config = AppConfig::default();

    // -- Discovery: max_depth --
    if let Some(depth) = raw.discovery.max_depth {
        if (1..=constants::ABSOLUTE_MAX_DEPTH).contains(&depth) {
            config.max_depth = depth;
        } else {
            warnings.push(format!(
                "[discovery] max_depth = {depth} is out of range (1-{}). Using default ({}).",
                constants::ABSOLUTE_MAX_DEPTH,
                constants::DEFAULT_MAX_DEPTH,
            ));
        }
    }

    // -- Discovery: max_files --
    if let Some(files) = raw.discovery.max_files {
        if (constants::MIN_MAX_FILES..=constants::ABSOLUTE_MAX_FILES).contains(&files) {
            config.max_files = files;
        } else {
            warnings.push(format!(
                "[discovery] max_files = {files} is out of range ({}-{}). Using default ({}).",
                constants::MIN_MAX_FILES,
                constants::ABSOLUTE_MAX_FILES,
                constants::DEFAULT_MAX_FILES,
            ));
        }
    }

    // -- Discovery: patterns --
    if let Some(patterns) = raw.discovery.include_patterns {
        config.include_patterns = patterns;
    }
    if let Some(patterns) = raw.discovery.exclude_patterns {
        config.exclude_patterns = patterns;
    }

    // -- Discovery: name_filter --
    if let Some(filter) = raw.discovery.name_filter {
        if !filter.trim().is_empty() {
            config.name_filter = Some(filter.trim().to_string());
        }
    }

    // -- Discovery: extra_dirs --
    if let Some(dirs) = raw.discovery.extra_dirs {
        config.extra_dirs = dirs
            .into_iter()
            .filter(|d| !d.trim().is_empty())
            .map(PathBuf::from)
            .collect();
    }

    // -- Extraction: deadline_ms --
    if let Some(ms) = raw.extraction.deadline_ms {
        if (constants::MIN_DEADLINE_MS..=constants::MAX_DEADLINE_MS).contains(&ms) {
            config.deadline = Duration::from_millis(ms);
        } else {
            warnings.push(format!(
                "[extraction] deadline_ms = {ms} is out of range ({}-{}). Using default ({}).",
                constants::MIN_DEADLINE_MS,
                constants::MAX_DEADLINE_MS,
                constants::DEFAULT_DEADLINE_MS,
            ));
        }
    }

    // -- Extraction: max_parse_bytes --
    if let Some(bytes) = raw.extraction.max_parse_bytes {
        if (constants::MIN_MAX_PARSE_BYTES..=constants::ABSOLUTE_MAX_PARSE_BYTES).contains(&bytes) {
            config.max_parse_bytes = bytes;
        } else {
            warnings.push(format!(
                "[extraction] max_parse_bytes = {bytes} is out of range ({}-{}). Using default ({}).",
                constants::MIN_MAX_PARSE_BYTES,
                constants::ABSOLUTE_MAX_PARSE_BYTES,
                constants::DEFAULT_MAX_PARSE_BYTES,
            ));
        }
    }

    // -- UI: theme --
    if let Some(ref theme) = raw.ui.theme {
        match theme.to_lowercase().as_str() {
            "dark" => config.dark_mode = true,
            "light" => config.dark_mode = false,
            other => {
                warnings.push(format!(
                    "[ui] theme = \"{other}\" is not recognised. Expected \"dark\" or \"light\". Using default (dark).",
                ));
            }
        }
    }

    // -- UI: font_size --
    if let Some(size) = raw.ui.font_size {
        if (constants::MIN_FONT_SIZE..=constants::MAX_FONT_SIZE).contains(&size) {
            config.font_size = size;
        } else {
            warnings.push(format!(
                "[ui] font_size = {size} is out of range ({}-{}). Using default ({}).",
                constants::MIN_FONT_SIZE,
                constants::MAX_FONT_SIZE,
                constants::DEFAULT_FONT_SIZE,
            ));
        }
    }

    // -- Logging: level --
    if let Some(ref level) = raw.logging.level {
        let valid = ["error", "warn", "info", "debug", "trace"];
        if valid.contains(&level.to_lowercase().as_str()) {
            config.log_level = Some(level.clone());
        } else {
            warnings.push(format!(
                "[logging] level = \"{level}\" is not recognised. \
                 Valid values: error, warn, info, debug, trace. Using default (info).",
            ));
        }
    }

    if !warnings.is_empty() {
        tracing::warn!(count = warnings.len(), "Config validation produced warnings");
    }

    (config, warnings)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn write_config(dir: &Path, content: &str) {
        std::fs::write(dir.join(constants::CONFIG_FILE_NAME), content).expect("write config");
    }

    #[test]
    fn test_missing_config_yields_defaults_without_warnings() {
        let dir = tempfile::tempdir().unwrap();
        let (config, warnings) = load_config(dir.path());
        assert_eq!(config.max_depth, constants::DEFAULT_MAX_DEPTH);
        assert_eq!(
            config.deadline,
            Duration::from_millis(constants::DEFAULT_DEADLINE_MS)
        );
        assert!(warnings.is_empty());
    }

    #[test]
    fn test_valid_config_applies_all_sections() {
        let dir = tempfile::tempdir().unwrap();
        write_config(
            dir.path(),
            r#"
[discovery]
max_depth = 3
max_files = 50
name_filter = "ptd"
extra_dirs = ["/mnt/saves"]

[extraction]
deadline_ms = 2000
max_parse_bytes = 65536

[ui]
theme = "light"
font_size = 16.0

[logging]
level = "debug"
"#,
        );
        let (config, warnings) = load_config(dir.path());
        assert!(warnings.is_empty(), "unexpected warnings: {warnings:?}");
        assert_eq!(config.max_depth, 3);
        assert_eq!(config.max_files, 50);
        assert_eq!(config.name_filter.as_deref(), Some("ptd"));
        assert_eq!(config.extra_dirs, vec![PathBuf::from("/mnt/saves")]);
        assert_eq!(config.deadline, Duration::from_millis(2000));
        assert_eq!(config.max_parse_bytes, 65536);
        assert!(!config.dark_mode);
        assert_eq!(config.font_size, 16.0);
        assert_eq!(config.log_level.as_deref(), Some("debug"));
    }

    #[test]
    fn test_out_of_range_values_warn_and_fall_back() {
        let dir = tempfile::tempdir().unwrap();
        write_config(
            dir.path(),
            r#"
[discovery]
max_depth = 9999

[extraction]
deadline_ms = 1

[ui]
font_size = 500.0
"#,
        );
        let (config, warnings) = load_config(dir.path());
        assert_eq!(warnings.len(), 3, "one warning per invalid field: {warnings:?}");
        assert_eq!(config.max_depth, constants::DEFAULT_MAX_DEPTH);
        assert_eq!(
            config.deadline,
            Duration::from_millis(constants::DEFAULT_DEADLINE_MS)
        );
        assert_eq!(config.font_size, constants::DEFAULT_FONT_SIZE);
    }

    #[test]
    fn test_unparseable_config_warns_and_uses_defaults() {
        let dir = tempfile::tempdir().unwrap();
        write_config(dir.path(), "this is { not toml");
        let (config, warnings) = load_config(dir.path());
        assert_eq!(warnings.len(), 1);
        assert_eq!(config.max_files, constants::DEFAULT_MAX_FILES);
    }

    #[test]
    fn test_unknown_keys_are_ignored() {
        let dir = tempfile::tempdir().unwrap();
        write_config(
            dir.path(),
            r#"
[discovery]
max_depth = 4
future_option = "whatever"

[future_section]
key = 1
"#,
        );
        let (config, warnings) = load_config(dir.path());
        assert!(warnings.is_empty());
        assert_eq!(config.max_depth, 4);
    }

    #[test]
    fn test_blank_name_filter_is_none() {
        let dir = tempfile::tempdir().unwrap();
        write_config(
            dir.path(),
            r#"
[discovery]
name_filter = "   "
"#,
        );
        let (config, _) = load_config(dir.path());
        assert!(config.name_filter.is_none());
    }
}
