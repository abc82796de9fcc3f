// SolSleuth - util/constants.rs
//
// Single source of truth for all named constants, limits, and defaults.

// =============================================================================
// Application metadata
// =============================================================================

/// Application display name.
pub const APP_NAME: &str = "SolSleuth";

/// Application identifier used for config/data directories.
pub const APP_ID: &str = "SolSleuth";

/// Current application version (updated by release script).
pub const APP_VERSION: &str = env!("CARGO_PKG_VERSION");

// =============================================================================
// Discovery limits
// =============================================================================

/// Maximum directory recursion depth during discovery.
pub const DEFAULT_MAX_DEPTH: usize = 10;

/// Minimum sensible value for the max-files limit (controls must be non-zero).
pub const MIN_MAX_FILES: usize = 1;

/// Maximum number of files to discover in a single scan.
pub const DEFAULT_MAX_FILES: usize = 500;

/// Hard upper bound on max files (prevents configuration mistakes).
pub const ABSOLUTE_MAX_FILES: usize = 10_000;

/// Hard upper bound on max depth (prevents infinite traversal).
pub const ABSOLUTE_MAX_DEPTH: usize = 50;

/// Default include glob patterns for save-file discovery.
pub const DEFAULT_INCLUDE_PATTERNS: &[&str] = &["*.sol"];

/// Default exclude glob patterns for save-file discovery.
pub const DEFAULT_EXCLUDE_PATTERNS: &[&str] = &["*.tmp", "*.bak", ".git"];

/// Name of the same-directory override file that, when present in the
/// working directory, is prepended to the candidate list.
pub const OVERRIDE_FILE_NAME: &str = "sol";

// =============================================================================
// Extraction limits
// =============================================================================

/// Maximum number of bytes read from each .sol file for extraction.
/// Credentials live near the start of the object table; reading more
/// only slows the scan down on pathological files.
pub const DEFAULT_MAX_PARSE_BYTES: usize = 100 * 1024; // 100 KiB

/// Hard upper bound on the per-file read cap.
pub const ABSOLUTE_MAX_PARSE_BYTES: usize = 16 * 1024 * 1024; // 16 MiB

/// Minimum user-configurable per-file read cap.
pub const MIN_MAX_PARSE_BYTES: usize = 1024; // 1 KiB

/// Default wall-clock budget for a single file's extraction (ms).
pub const DEFAULT_DEADLINE_MS: u64 = 5_000;

/// Minimum user-configurable extraction deadline (ms).
pub const MIN_DEADLINE_MS: u64 = 10;

/// Maximum user-configurable extraction deadline (ms).
pub const MAX_DEADLINE_MS: u64 = 60_000;

/// File size (bytes) above which reads go through memmap2 rather than a
/// heap buffer. Only the first `max_parse_bytes` of the map is scanned.
pub const LARGE_FILE_THRESHOLD: u64 = 8 * 1024 * 1024; // 8 MiB

/// How many bytes after a label token are searched for an AMF string
/// type marker before the structured read is abandoned.
pub const MARKER_LOOKAHEAD: usize = 8;

/// Upper bound on the fallback printable-run scan after a label whose
/// structured read failed.
pub const FALLBACK_VALUE_WINDOW: usize = 256;

/// Upper bound on an accepted length-prefixed value. Claimed lengths
/// beyond this are treated as corrupt and fall through to the fallback.
pub const MAX_VALUE_LEN: usize = 4 * 1024;

/// The label tokens searched for by default, in display order.
pub const DEFAULT_LABELS: &[&str] = &["Email", "Password"];

// =============================================================================
// UI defaults
// =============================================================================

/// Default UI body font size in points.
pub const DEFAULT_FONT_SIZE: f32 = 14.5;

/// Minimum user-configurable UI font size (points).
pub const MIN_FONT_SIZE: f32 = 10.0;

/// Maximum user-configurable UI font size (points).
pub const MAX_FONT_SIZE: f32 = 24.0;

/// How long the "Copied" indicator stays visible after a copy (seconds).
pub const COPIED_FEEDBACK_SECS: f64 = 1.5;

/// Maximum number of scan-progress messages processed by the UI update
/// loop per frame. Any remainder is processed on subsequent frames so a
/// burst cannot stall the render loop.
pub const MAX_SCAN_MESSAGES_PER_FRAME: usize = 500;

/// Maximum number of non-fatal warnings accumulated per scan session.
pub const MAX_WARNINGS: usize = 1_000;

// =============================================================================
// Logging
// =============================================================================

/// Default log level.
pub const DEFAULT_LOG_LEVEL: &str = "info";

// =============================================================================
// Configuration
// =============================================================================

/// Configuration file name.
pub const CONFIG_FILE_NAME: &str = "config.toml";
