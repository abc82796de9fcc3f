// SolSleuth - app/state.rs
//
// Application state management. Holds the discovered file list, the
// per-file extraction results, selection, and scan status.
// Owned by the eframe::App implementation.

use crate::core::model::{DiscoveredFile, Extraction, ScanSummary};
use crate::util::constants;
use std::collections::HashMap;
use std::path::PathBuf;

/// Outcome of extraction for a single file, as cached by the UI.
#[derive(Debug, Clone)]
pub enum FileOutcome {
    /// Extraction finished (possibly with zero pairs, possibly partial).
    Extracted(Extraction),

    /// The file could not be read.
    Error(String),
}

/// Top-level application state.
#[derive(Debug)]
pub struct AppState {
    /// Directory the user explicitly chose (None = platform defaults only).
    pub chosen_dir: Option<PathBuf>,

    /// Whether a scan is currently in progress.
    pub scan_in_progress: bool,

    /// Running count of files seen during the discovery phase.
    pub files_found: usize,

    /// Files completed / total during the extraction phase.
    pub extraction_progress: Option<(usize, usize)>,

    /// Files discovered in the current scan, in scan order.
    pub discovered_files: Vec<DiscoveredFile>,

    /// Extraction outcome per file path.
    pub outcomes: HashMap<PathBuf, FileOutcome>,

    /// Index of the currently selected file in `discovered_files`.
    pub selected_index: Option<usize>,

    /// Scan summary from the most recent completed scan.
    pub scan_summary: Option<ScanSummary>,

    /// Status message for the status bar.
    pub status_message: String,

    /// Non-fatal warnings accumulated during the current scan.
    pub warnings: Vec<String>,

    /// Whether the warnings window is open.
    pub show_warnings: bool,

    /// Label whose value was most recently copied to the clipboard,
    /// with the `egui` time of the copy. Drives the transient "Copied"
    /// indicator next to the copy button.
    pub copied: Option<(String, f64)>,
}

impl AppState {
    pub fn new() -> Self {
        Self {
            chosen_dir: None,
            scan_in_progress: false,
            files_found: 0,
            extraction_progress: None,
            discovered_files: Vec::new(),
            outcomes: HashMap::new(),
            selected_index: None,
            scan_summary: None,
            status_message: "Ready. Scanning Flash Player save directories...".to_string(),
            warnings: Vec::new(),
            show_warnings: false,
            copied: None,
        }
    }

    /// Get the currently selected file, if any.
    pub fn selected_file(&self) -> Option<&DiscoveredFile> {
        self.selected_index
            .and_then(|idx| self.discovered_files.get(idx))
    }

    /// Get the extraction outcome for the currently selected file.
    pub fn selected_outcome(&self) -> Option<&FileOutcome> {
        self.selected_file().and_then(|f| self.outcomes.get(&f.path))
    }

    /// Record a warning, capped so a pathological scan cannot grow the
    /// list without bound.
    pub fn push_warning(&mut self, message: String) {
        if self.warnings.len() < constants::MAX_WARNINGS {
            self.warnings.push(message);
        }
    }

    /// Clear all scan results in preparation for a new scan.
    pub fn clear(&mut self) {
        self.files_found = 0;
        self.extraction_progress = None;
        self.discovered_files.clear();
        self.outcomes.clear();
        self.selected_index = None;
        self.scan_summary = None;
        self.warnings.clear();
        self.show_warnings = false;
        self.copied = None;
        self.status_message = "Scanning...".to_string();
    }

    /// Auto-select the first file that yielded credentials, if nothing
    /// is selected yet. Called when a scan completes so the user lands
    /// on a useful view.
    pub fn select_first_hit(&mut self) {
        if self.selected_index.is_some() {
            return;
        }
        self.selected_index = self
            .discovered_files
            .iter()
            .position(|f| {
                matches!(
                    self.outcomes.get(&f.path),
                    Some(FileOutcome::Extracted(ex)) if !ex.pairs.is_empty()
                )
            })
            .or(if self.discovered_files.is_empty() {
                None
            } else {
                Some(0)
            });
    }
}

impl Default for AppState {
    fn default() -> Self {
        Self::new()
    }
}
