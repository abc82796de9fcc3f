// SolSleuth - core/discovery.rs
//
// Recursive directory traversal and save-file discovery.
//
// Architecture note: this module uses `walkdir` for directory traversal
// as an OS abstraction. It reads only file *metadata* (size, mtime),
// never file *contents* -- that boundary is owned by the app layer
// (app::scan).
//
// Flash Player save directories come in several platform flavours and
// most machines have none of them, so discovery operates over a list of
// roots: optional roots that do not exist are skipped quietly, while a
// missing user-supplied root is a hard error the UI must surface.

use crate::core::model::DiscoveredFile;
use crate::util::error::DiscoveryError;
use chrono::{DateTime, Utc};
use std::path::PathBuf;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

// =============================================================================
// Configuration
// =============================================================================

/// A directory to search for save files.
#[derive(Debug, Clone)]
pub struct SearchRoot {
    /// Directory to walk.
    pub path: PathBuf,

    /// Whether the root must exist. Platform-convention Flash dirs are
    /// optional (Flash may simply not be installed); a directory the
    /// user explicitly chose is required.
    pub required: bool,
}

impl SearchRoot {
    pub fn optional(path: PathBuf) -> Self {
        Self {
            path,
            required: false,
        }
    }

    pub fn required(path: PathBuf) -> Self {
        Self {
            path,
            required: true,
        }
    }
}

/// Configuration for a discovery operation.
///
/// All limits reference named constants from `util::constants` so they
/// are auditable in a single place.
#[derive(Debug, Clone)]
pub struct DiscoveryConfig {
    /// Maximum directory recursion depth.
    pub max_depth: usize,

    /// Maximum number of matching files to return before stopping.
    pub max_files: usize,

    /// Glob patterns (filename-only) that a file MUST match to be included.
    /// An empty list means "include everything that is not excluded".
    pub include_patterns: Vec<String>,

    /// Glob patterns matched against filenames AND directory component names.
    /// Matching files are skipped; matching directories are not descended into.
    pub exclude_patterns: Vec<String>,

    /// Case-insensitive filename substring filter. When set, only files
    /// whose name contains this fragment are included (e.g. "ptd" to
    /// narrow the scan to one game's saves).
    pub name_filter: Option<String>,

    /// Optional cancel flag. When `Some`, the discovery loop checks this
    /// flag on every walker iteration and stops early with partial
    /// results if it is set.
    pub cancel_flag: Option<Arc<AtomicBool>>,
}

impl Default for DiscoveryConfig {
    fn default() -> Self {
        use crate::util::constants;
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
            cancel_flag: None,
        }
    }
}

// =============================================================================
// Discovery
// =============================================================================

/// Discover save files under the given roots, applying include/exclude
/// glob patterns and the optional name filter.
///
/// # Progress reporting
/// `on_file_found` is called once per accepted file with the file and
/// the running count. The callback should be cheap (e.g. send a channel
/// message); it is called on the caller's thread.
///
/// # Non-fatal errors
/// Files/directories that cannot be accessed are recorded as
/// human-readable strings in the returned warnings vector and do NOT
/// cause the function to return `Err`. Optional roots that do not exist
/// are skipped.
///
/// # Fatal errors
/// Returns `Err` only when a *required* root is missing, not a
/// directory, or access-denied.
pub fn discover_files<F>(
    roots: &[SearchRoot],
    config: &DiscoveryConfig,
    mut on_file_found: F,
) -> Result<(Vec<DiscoveredFile>, Vec<String>), DiscoveryError>
where
    F: FnMut(&DiscoveredFile, usize),
{
    use crate::util::constants;

    // Clamp config limits to absolute bounds.
    let max_files = config.max_files.min(constants::ABSOLUTE_MAX_FILES);
    let max_depth = config.max_depth.min(constants::ABSOLUTE_MAX_DEPTH);

    // Compile glob patterns once; log and skip any that fail compilation.
    let include_pats = compile_patterns(&config.include_patterns, "include");
    let exclude_pats = compile_patterns(&config.exclude_patterns, "exclude");
    let name_filter = config
        .name_filter
        .as_deref()
        .map(str::to_lowercase)
        .filter(|f| !f.is_empty());

    let mut files: Vec<DiscoveredFile> = Vec::new();
    let mut warnings: Vec<String> = Vec::new();

    for root in roots {
        // --- Pre-flight validation ---
        // `fs::metadata()` rather than `Path::exists()` so that
        // PermissionDenied is distinguishable from a path that genuinely
        // does not exist.
        match std::fs::metadata(&root.path) {
            Ok(meta) if meta.is_dir() => {}
            Ok(_) => {
                if root.required {
                    return Err(DiscoveryError::NotADirectory {
                        path: root.path.clone(),
                    });
                }
                tracing::debug!(root = %root.path.display(), "Optional root is not a directory, skipping");
                continue;
            }
            Err(e) if e.kind() == std::io::ErrorKind::PermissionDenied => {
                if root.required {
                    return Err(DiscoveryError::PermissionDenied {
                        path: root.path.clone(),
                        source: e,
                    });
                }
                warnings.push(format!(
                    "Cannot access '{}': permission denied",
                    root.path.display()
                ));
                continue;
            }
            Err(_) => {
                if root.required {
                    return Err(DiscoveryError::RootNotFound {
                        path: root.path.clone(),
                    });
                }
                tracing::debug!(root = %root.path.display(), "Optional root absent, skipping");
                continue;
            }
        }

        tracing::debug!(
            root = %root.path.display(),
            max_depth,
            max_files,
            include = ?config.include_patterns,
            exclude = ?config.exclude_patterns,
            "Walking root"
        );

        // `filter_entry` short-circuits directory descent for excluded
        // directory names, so excluded subtrees are never traversed.
        let walker = walkdir::WalkDir::new(&root.path)
            .max_depth(max_depth)
            .follow_links(false)
            .into_iter()
            .filter_entry(|e| {
                if e.file_type().is_dir() {
                    let name = e.file_name().to_str().unwrap_or("");
                    // Always allow the root itself.
                    if e.depth() == 0 {
                        return true;
                    }
                    return !is_excluded_component(name, &exclude_pats);
                }
                true // Visit files; they are filtered individually below.
            });

        for entry_result in walker {
            // Check cancel on every iteration so large-tree scans can be
            // interrupted promptly.
            if config
                .cancel_flag
                .as_ref()
                .is_some_and(|f| f.load(Ordering::SeqCst))
            {
                tracing::debug!("Discovery cancelled by request");
                return Ok((files, warnings));
            }

            let entry = match entry_result {
                Ok(e) => e,
                Err(e) => {
                    // Inaccessible entry: non-fatal, record warning.
                    let path_str = e
                        .path()
                        .map(|p| p.display().to_string())
                        .unwrap_or_else(|| "<unknown>".to_string());
                    let msg = format!("Cannot access '{path_str}': {e}");
                    tracing::debug!(warning = %msg, "Discovery warning");
                    warnings.push(msg);
                    continue;
                }
            };

            if entry.file_type().is_dir() {
                continue;
            }

            let path = entry.path();

            let file_name = match path.file_name().and_then(|n| n.to_str()) {
                Some(n) => n,
                None => {
                    warnings.push(format!("Skipping '{}': non-UTF-8 filename", path.display()));
                    continue;
                }
            };

            if is_excluded_filename(file_name, &exclude_pats) {
                tracing::trace!(file = file_name, "Excluded by pattern");
                continue;
            }

            if !is_included(file_name, &include_pats) {
                tracing::trace!(file = file_name, "Not matched by include patterns");
                continue;
            }

            if let Some(ref fragment) = name_filter {
                if !file_name.to_lowercase().contains(fragment) {
                    tracing::trace!(file = file_name, "Rejected by name filter");
                    continue;
                }
            }

            let metadata = match entry.metadata() {
                Ok(m) => m,
                Err(e) => {
                    let msg = format!("Cannot read metadata for '{}': {e}", path.display());
                    tracing::debug!(warning = %msg, "Discovery warning");
                    warnings.push(msg);
                    continue;
                }
            };

            let discovered = DiscoveredFile {
                path: path.to_path_buf(),
                size: metadata.len(),
                modified: metadata.modified().ok().map(DateTime::<Utc>::from),
            };

            let count = files.len() + 1;
            on_file_found(&discovered, count);
            files.push(discovered);
        }
    }

    // If more files were found than the configured limit, keep only the
    // `max_files` most recently modified ones so the user always sees
    // the freshest saves rather than an arbitrary subset.
    let total_found = files.len();
    if total_found > max_files {
        files.sort_unstable_by(|a, b| match (b.modified, a.modified) {
            (Some(bm), Some(am)) => bm.cmp(&am),
            (Some(_), None) => std::cmp::Ordering::Less,
            (None, Some(_)) => std::cmp::Ordering::Greater,
            (None, None) => std::cmp::Ordering::Equal,
        });
        files.truncate(max_files);

        warnings.push(format!(
            "{total_found} save files were found but the limit is {max_files}. \
             Only the {max_files} most recently modified files have been loaded."
        ));

        tracing::info!(
            total_found,
            limit = max_files,
            "File list truncated to most recently modified files"
        );
    }

    tracing::debug!(
        total_found,
        files_loaded = files.len(),
        warnings = warnings.len(),
        "Discovery complete"
    );

    Ok((files, warnings))
}

// =============================================================================
// Glob helpers
// =============================================================================

/// Compile a list of glob pattern strings into `glob::Pattern` objects.
/// Patterns that fail to compile are logged as warnings and skipped.
fn compile_patterns(patterns: &[String], kind: &str) -> Vec<glob::Pattern> {
    patterns
        .iter()
        .filter_map(|p| match glob::Pattern::new(p) {
            Ok(compiled) => Some(compiled),
            Err(e) => {
                tracing::warn!(pattern = p, kind, error = %e, "Invalid glob pattern, skipping");
                None
            }
        })
        .collect()
}

/// Returns true if `dir_name` matches any exclude pattern that contains
/// no wildcard characters. These are treated as directory component
/// exclusions rather than filename glob patterns.
fn is_excluded_component(dir_name: &str, exclude_pats: &[glob::Pattern]) -> bool {
    exclude_pats.iter().any(|p| {
        let s = p.as_str();
        !s.contains('*') && !s.contains('?') && !s.contains('[') && p.matches(dir_name)
    })
}

/// Returns true if `file_name` matches any exclude pattern (wildcard or literal).
fn is_excluded_filename(file_name: &str, exclude_pats: &[glob::Pattern]) -> bool {
    exclude_pats.iter().any(|p| p.matches(file_name))
}

/// Returns true if `file_name` matches at least one include pattern.
/// An empty include list means "include all" (returns true).
fn is_included(file_name: &str, include_pats: &[glob::Pattern]) -> bool {
    if include_pats.is_empty() {
        return true;
    }
    include_pats.iter().any(|p| p.matches(file_name))
}

// =============================================================================
// Tests
// =============================================================================
