// SolSleuth - app/scan.rs
//
// Scan lifecycle management. Orchestrates discovery and extraction on a
// background thread, sending progress messages to the UI thread via an
// mpsc channel.
//
// Architecture:
//   - `ScanManager` lives on the UI thread; `run_scan` runs on a background thread.
//   - An `Arc<AtomicBool>` cancel flag allows the UI to stop the scan cooperatively.
//   - All cross-thread communication is via `ScanProgress` channel messages.
//   - Per-file extraction fans out over the rayon thread pool; each file is
//     independent and results stream back as they complete.
//
// Error policy:
//   - Transient I/O errors are retried with capped backoff.
//   - All per-file errors are non-fatal; the scan continues to the next file.
//   - Cancel is checked before each file operation for prompt termination.

use crate::core::discovery::{self, DiscoveryConfig, SearchRoot};
use crate::core::model::{DiscoveredFile, Extraction, ScanProgress, ScanSummary};
use crate::core::scanner;
use crate::util::constants;
use crate::util::error::ScanError;
use rayon::prelude::*;
use std::io::{self, Read};
use std::path::Path;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{mpsc, Arc};
use std::time::{Duration, Instant};

/// Retry limits for transient I/O errors.
const MAX_RETRIES: u32 = 3;
const RETRY_DELAYS_MS: [u64; 3] = [50, 100, 200];

// =============================================================================
// Scan request
// =============================================================================

/// Everything a scan needs, assembled by the caller from config + UI state.
#[derive(Debug, Clone)]
pub struct ScanRequest {
    /// Directories to search. Platform-convention Flash dirs should be
    /// optional roots; a directory the user explicitly chose is required.
    pub roots: Vec<SearchRoot>,

    /// Discovery traversal settings.
    pub discovery: DiscoveryConfig,

    /// Label tokens to extract (e.g. "Email", "Password").
    pub labels: Vec<String>,

    /// Per-file extraction wall-clock budget.
    pub deadline: Duration,

    /// Per-file read cap in bytes.
    pub max_parse_bytes: usize,
}

// =============================================================================
// ScanManager
// =============================================================================

/// Manages a scan operation on a background thread.
pub struct ScanManager {
    /// Channel receiver for the UI to poll progress messages.
    pub progress_rx: Option<mpsc::Receiver<ScanProgress>>,

    /// Cancel flag shared with the background thread.
    cancel_flag: Option<Arc<AtomicBool>>,
}

impl ScanManager {
    pub fn new() -> Self {
        Self {
            progress_rx: None,
            cancel_flag: None,
        }
    }

    /// Start a scan. Spawns a background thread immediately; progress is
    /// sent over the channel. If a scan is already running it is
    /// cancelled first.
    pub fn start_scan(&mut self, request: ScanRequest) {
        // Cancel any existing scan.
        self.cancel_scan();

        let (tx, rx) = mpsc::channel();
        let cancel = Arc::new(AtomicBool::new(false));

        self.progress_rx = Some(rx);
        self.cancel_flag = Some(Arc::clone(&cancel));

        std::thread::spawn(move || {
            run_scan(request, tx, cancel);
        });

        tracing::info!("Scan started");
    }

    /// Request cancellation of the running scan.
    /// The background thread will send `ScanProgress::Cancelled` and exit.
    pub fn cancel_scan(&mut self) {
        if let Some(flag) = &self.cancel_flag {
            flag.store(true, Ordering::SeqCst);
        }
        self.cancel_flag = None;
    }

    /// Poll for progress messages without blocking. Returns up to `max`
    /// pending messages; any remainder is left for the next poll so a
    /// burst cannot stall the caller.
    pub fn poll_progress(&self, max: usize) -> Vec<ScanProgress> {
        let mut messages = Vec::new();
        if let Some(ref rx) = self.progress_rx {
            while messages.len() < max {
                match rx.try_recv() {
                    Ok(msg) => messages.push(msg),
                    Err(_) => break,
                }
            }
        }
        messages
    }
}

impl Default for ScanManager {
    fn default() -> Self {
        Self::new()
    }
}

// =============================================================================
// Background scan pipeline
// =============================================================================

/// Full scan pipeline: discovery → extraction → summary.
///
/// Runs on a background thread. Sends `ScanProgress` messages to `tx`.
/// Checks `cancel` before each significant operation.
fn run_scan(request: ScanRequest, tx: mpsc::Sender<ScanProgress>, cancel: Arc<AtomicBool>) {
    macro_rules! send {
        ($msg:expr) => {
            if tx.send($msg).is_err() {
                return; // Receiver dropped (UI closed); exit quietly.
            }
        };
    }

    macro_rules! check_cancel {
        () => {
            if cancel.load(Ordering::SeqCst) {
                send!(ScanProgress::Cancelled);
                return;
            }
        };
    }

    // -------------------------------------------------------------------------
    // Phase 1: Discovery
    // -------------------------------------------------------------------------
    send!(ScanProgress::DiscoveryStarted);

    let mut config = request.discovery.clone();
    config.cancel_flag = Some(Arc::clone(&cancel));

    let tx_discovery = tx.clone();
    let (discovered, warnings) =
        match discovery::discover_files(&request.roots, &config, |file, count| {
            tracing::trace!(file = %file.path.display(), count, "File discovered");
            // Non-fatal: ignore send error (UI may have closed).
            let _ = tx_discovery.send(ScanProgress::FileDiscovered {
                path: file.path.clone(),
                files_found: count,
            });
        }) {
            Ok(result) => result,
            Err(e) => {
                send!(ScanProgress::Failed {
                    error: e.to_string(),
                });
                return;
            }
        };

    // Forward discovery warnings as non-fatal scan warnings.
    for warning in warnings {
        send!(ScanProgress::Warning { message: warning });
    }

    check_cancel!();

    // A bare "sol" file in the working directory overrides the search
    // order: it is prepended so it lands first in the list.
    let files = prepend_override_file(discovered);
    let total_files = files.len();

    send!(ScanProgress::DiscoveryCompleted {
        files: files.clone(),
    });

    check_cancel!();

    // -------------------------------------------------------------------------
    // Phase 2: Extraction (parallel, streaming)
    // -------------------------------------------------------------------------
    send!(ScanProgress::ExtractionStarted { total_files });

    let scan_start = Instant::now();
    let files_completed = AtomicUsize::new(0);
    let files_with_credentials = AtomicUsize::new(0);
    let files_with_errors = AtomicUsize::new(0);
    let files_incomplete = AtomicUsize::new(0);
    let total_pairs = AtomicUsize::new(0);

    files
        .par_iter()
        .for_each_with(tx.clone(), |tx, file: &DiscoveredFile| {
            if cancel.load(Ordering::SeqCst) {
                return;
            }

            let result = match extract_file(
                &file.path,
                file.size,
                &request.labels,
                request.deadline,
                request.max_parse_bytes,
            ) {
                Ok(extraction) => {
                    if !extraction.pairs.is_empty() {
                        files_with_credentials.fetch_add(1, Ordering::Relaxed);
                        total_pairs.fetch_add(extraction.pairs.len(), Ordering::Relaxed);
                    }
                    if extraction.hit_deadline {
                        files_incomplete.fetch_add(1, Ordering::Relaxed);
                        tracing::debug!(
                            file = %file.path.display(),
                            bytes_scanned = extraction.bytes_scanned,
                            "Extraction hit deadline, partial result"
                        );
                    }
                    Ok(extraction)
                }
                Err(e) => {
                    files_with_errors.fetch_add(1, Ordering::Relaxed);
                    tracing::warn!(error = %e, "File read failed");
                    Err(e.to_string())
                }
            };

            let completed = files_completed.fetch_add(1, Ordering::SeqCst) + 1;

            // Non-fatal: ignore send error (UI may have closed).
            let _ = tx.send(ScanProgress::FileExtracted {
                path: file.path.clone(),
                result,
                files_completed: completed,
                total_files,
            });
        });

    check_cancel!();

    let summary = ScanSummary {
        files_discovered: total_files,
        files_with_credentials: files_with_credentials.into_inner(),
        files_with_errors: files_with_errors.into_inner(),
        files_incomplete: files_incomplete.into_inner(),
        total_pairs: total_pairs.into_inner(),
        duration: scan_start.elapsed(),
    };

    tracing::info!(
        files = summary.files_discovered,
        with_credentials = summary.files_with_credentials,
        pairs = summary.total_pairs,
        errors = summary.files_with_errors,
        incomplete = summary.files_incomplete,
        "Scan complete"
    );

    send!(ScanProgress::ExtractionCompleted { summary });
}

/// If a file literally named "sol" exists in the current working
/// directory, prepend it to the candidate list. Lets a user drop a file
/// next to the binary and have it examined first without configuring a
/// search root.
fn prepend_override_file(files: Vec<DiscoveredFile>) -> Vec<DiscoveredFile> {
    let override_path = Path::new(constants::OVERRIDE_FILE_NAME);
    let meta = match std::fs::metadata(override_path) {
        Ok(m) if m.is_file() => m,
        _ => return files,
    };

    // Don't duplicate if discovery already found it (cwd inside a root).
    let canonical = override_path.canonicalize().ok();
    if files
        .iter()
        .any(|f| canonical.as_deref().is_some_and(|c| f.path == c) || f.path == override_path)
    {
        return files;
    }

    tracing::info!("Override file 'sol' found in working directory, examining it first");

    let mut result = Vec::with_capacity(files.len() + 1);
    result.push(DiscoveredFile {
        path: override_path.to_path_buf(),
        size: meta.len(),
        modified: meta.modified().ok().map(chrono::DateTime::from),
    });
    result.extend(files);
    result
}

// =============================================================================
// File reading + extraction
// =============================================================================

/// Read a save file (capped at `max_parse_bytes`) and run extraction
/// over the bytes.
///
/// Files above `LARGE_FILE_THRESHOLD` are memory-mapped and only the
/// capped prefix of the map is scanned, so a huge file never costs a
/// huge allocation. Smaller files use a capped buffered read with
/// transient-error retries.
fn extract_file(
    path: &Path,
    size: u64,
    labels: &[String],
    deadline: Duration,
    max_parse_bytes: usize,
) -> Result<Extraction, ScanError> {
    let map_io = |source: io::Error| ScanError::Io {
        file: path.to_path_buf(),
        source,
    };

    if size > constants::LARGE_FILE_THRESHOLD {
        let file = std::fs::File::open(path).map_err(map_io)?;
        // SAFETY: the file is read-only and we do not mutate the map.
        // We accept the documented risk that external modification of the
        // file during the map's lifetime could produce undefined behaviour,
        // which is acceptable for a viewer reading already-written saves.
        let mmap = unsafe { memmap2::Mmap::map(&file) }.map_err(map_io)?;
        let cap = max_parse_bytes.min(mmap.len());
        Ok(scanner::extract(&mmap[..cap], labels, deadline))
    } else {
        let data = read_capped_with_retry(path, max_parse_bytes).map_err(map_io)?;
        Ok(scanner::extract(&data, labels, deadline))
    }
}

/// Read at most `cap` bytes from the start of a file, retrying
/// transient I/O errors with capped backoff. Permanent errors are
/// returned immediately.
fn read_capped_with_retry(path: &Path, cap: usize) -> io::Result<Vec<u8>> {
    let mut last_err: Option<io::Error> = None;

    for attempt in 0..MAX_RETRIES {
        match read_capped(path, cap) {
            Ok(data) => return Ok(data),
            Err(e) if is_transient_error(&e) => {
                tracing::debug!(
                    file = %path.display(),
                    attempt = attempt + 1,
                    error = %e,
                    "Transient I/O error, retrying"
                );
                std::thread::sleep(Duration::from_millis(RETRY_DELAYS_MS[attempt as usize]));
                last_err = Some(e);
            }
            Err(e) => return Err(e), // Permanent error; do not retry.
        }
    }

    Err(last_err.unwrap_or_else(|| io::Error::other("Unknown read error")))
}

fn read_capped(path: &Path, cap: usize) -> io::Result<Vec<u8>> {
    let file = std::fs::File::open(path)?;
    let mut buf = Vec::with_capacity(cap.min(file.metadata()?.len() as usize));
    file.take(cap as u64).read_to_end(&mut buf)?;
    Ok(buf)
}

/// Returns true for transient I/O errors that are worth retrying.
fn is_transient_error(e: &io::Error) -> bool {
    matches!(
        e.kind(),
        io::ErrorKind::WouldBlock | io::ErrorKind::Interrupted | io::ErrorKind::TimedOut
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_read_capped_truncates_at_cap() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("big.sol");
        std::fs::write(&path, vec![0x41u8; 1000]).unwrap();

        let data = read_capped(&path, 100).unwrap();
        assert_eq!(data.len(), 100);
    }

    #[test]
    fn test_read_capped_reads_whole_small_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("small.sol");
        std::fs::write(&path, b"abc").unwrap();

        let data = read_capped(&path, 100).unwrap();
        assert_eq!(data, b"abc");
    }

    #[test]
    fn test_extract_file_missing_is_io_error() {
        let result = extract_file(
            Path::new("/nonexistent/save.sol"),
            10,
            &["Email".to_string()],
            Duration::from_secs(1),
            1024,
        );
        assert!(result.is_err());
    }

    #[test]
    fn test_transient_error_classification() {
        assert!(is_transient_error(&io::Error::from(
            io::ErrorKind::Interrupted
        )));
        assert!(!is_transient_error(&io::Error::from(
            io::ErrorKind::NotFound
        )));
    }
}
