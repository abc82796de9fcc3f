// SolSleuth - core/model.rs
//
// Core data model types. Pure data definitions with no I/O, no UI,
// no platform dependencies.
//
// These types are the shared vocabulary across all layers.

use chrono::{DateTime, Utc};
use std::path::PathBuf;
use std::time::Duration;

// =============================================================================
// Credential pair (output of extraction)
// =============================================================================

/// A single labelled string value recovered from a save file.
///
/// Pairs keep the byte offset of the label token so the UI (and debug
/// logging) can point back into the source file without re-scanning.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CredentialPair {
    /// The label token that was matched ("Email", "Password", ...).
    pub label: String,

    /// The decoded, sanitised value string.
    pub value: String,

    /// Byte offset of the label token in the scanned buffer.
    pub offset: usize,
}

// =============================================================================
// Extraction (per-file scan result)
// =============================================================================

/// The result of scanning one buffer. Immutable once produced; owned
/// by the caller. An empty `pairs` list is a valid, non-exceptional
/// outcome ("no credentials present").
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Extraction {
    /// Recovered pairs in the order their labels were first matched.
    /// At most one pair per label (first non-empty match wins).
    pub pairs: Vec<CredentialPair>,

    /// True when the scan stopped early because the wall-clock budget
    /// expired. The pairs collected up to that point are still valid.
    pub hit_deadline: bool,

    /// Number of input bytes covered before the scan finished or the
    /// deadline fired.
    pub bytes_scanned: usize,
}

impl Extraction {
    /// Look up the value extracted for `label`, if any.
    pub fn value_for(&self, label: &str) -> Option<&str> {
        self.pairs
            .iter()
            .find(|p| p.label == label)
            .map(|p| p.value.as_str())
    }
}

// =============================================================================
// Discovered file (output of discovery phase)
// =============================================================================

/// Metadata about a file found during directory scanning, before
/// extraction.
#[derive(Debug, Clone)]
pub struct DiscoveredFile {
    /// Full path to the file.
    pub path: PathBuf,

    /// File size in bytes.
    pub size: u64,

    /// Last modification timestamp.
    pub modified: Option<DateTime<Utc>>,
}

impl DiscoveredFile {
    /// Filename for list display; falls back to the full path for
    /// paths with no final component.
    pub fn display_name(&self) -> String {
        self.path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| self.path.display().to_string())
    }
}

// =============================================================================
// Scan summary
// =============================================================================

/// Summary statistics for a completed scan operation.
#[derive(Debug, Clone, Default)]
pub struct ScanSummary {
    /// Total files discovered.
    pub files_discovered: usize,

    /// Files that yielded at least one credential pair.
    pub files_with_credentials: usize,

    /// Files that could not be read.
    pub files_with_errors: usize,

    /// Files whose scan hit the deadline and returned partial results.
    pub files_incomplete: usize,

    /// Total credential pairs recovered across all files.
    pub total_pairs: usize,

    /// Wall-clock scan duration.
    pub duration: Duration,
}

// =============================================================================
// Scan progress (for UI updates)
// =============================================================================

/// Progress messages sent from the scan thread to the UI thread.
#[derive(Debug, Clone)]
pub enum ScanProgress {
    /// Discovery phase started.
    DiscoveryStarted,

    /// A file was discovered.
    FileDiscovered { path: PathBuf, files_found: usize },

    /// Discovery completed; the full file list follows.
    DiscoveryCompleted { files: Vec<DiscoveredFile> },

    /// Extraction phase started.
    ExtractionStarted { total_files: usize },

    /// A file has been scanned (successfully or not).
    FileExtracted {
        path: PathBuf,
        /// `Ok(extraction)` or `Err(message)` for an unreadable file.
        result: std::result::Result<Extraction, String>,
        files_completed: usize,
        total_files: usize,
    },

    /// Extraction phase completed.
    ExtractionCompleted { summary: ScanSummary },

    /// A non-fatal warning occurred during scanning.
    Warning { message: String },

    /// Scan failed with a fatal error (no search root usable).
    Failed { error: String },

    /// Scan was cancelled by the user before completion.
    Cancelled,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_value_for_finds_first_pair() {
        let ex = Extraction {
            pairs: vec![
                CredentialPair {
                    label: "Email".into(),
                    value: "a@x.com".into(),
                    offset: 10,
                },
                CredentialPair {
                    label: "Password".into(),
                    value: "secret".into(),
                    offset: 40,
                },
            ],
            hit_deadline: false,
            bytes_scanned: 64,
        };
        assert_eq!(ex.value_for("Email"), Some("a@x.com"));
        assert_eq!(ex.value_for("Password"), Some("secret"));
        assert_eq!(ex.value_for("Token"), None);
    }

    #[test]
    fn test_display_name_uses_file_name() {
        let f = DiscoveredFile {
            path: PathBuf::from("/tmp/saves/ptd_save.sol"),
            size: 0,
            modified: None,
        };
        assert_eq!(f.display_name(), "ptd_save.sol");
    }
}
