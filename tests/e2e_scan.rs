// SolSleuth - tests/e2e_scan.rs
//
// End-to-end tests for the discovery and extraction pipeline.
//
// These tests exercise the real filesystem, real walkdir traversal, the
// real background scan thread, and the real byte scanner over synthetic
// AMF-encoded save files -- no mocks, no stubs.

use solsleuth::app::scan::{ScanManager, ScanRequest};
use solsleuth::core::discovery::{discover_files, DiscoveryConfig, SearchRoot};
use solsleuth::core::model::ScanProgress;
use solsleuth::core::scanner;
use std::fs;
use std::path::Path;
use std::time::Duration;

// =============================================================================
// Helpers
// =============================================================================

/// Encode a label/value entry the way Flash serialises string members:
/// label bytes, then an AMF3 string (0x06 marker, U29 length with the
/// literal bit set, UTF-8 payload).
fn amf3_entry(label: &str, value: &str) -> Vec<u8> {
    assert!(value.len() < 64, "test helper only handles short values");
    let mut out = Vec::new();
    out.extend_from_slice(label.as_bytes());
    out.push(0x06);
    out.push(((value.len() as u8) << 1) | 1);
    out.extend_from_slice(value.as_bytes());
    out
}

/// Write a synthetic .sol file containing the given entries separated
/// by filler bytes.
fn write_sol(path: &Path, entries: &[Vec<u8>]) {
    let mut data: Vec<u8> = vec![0x00, 0xbf, 0x00, 0x00]; // header-ish filler
    for entry in entries {
        data.extend_from_slice(entry);
        data.extend_from_slice(&[0x00, 0x08, 0x03]);
    }
    fs::write(path, data).expect("write .sol fixture");
}

fn labels() -> Vec<String> {
    vec!["Email".to_string(), "Password".to_string()]
}

fn request_for(root: &Path) -> ScanRequest {
    ScanRequest {
        roots: vec![SearchRoot::required(root.to_path_buf())],
        discovery: DiscoveryConfig::default(),
        labels: labels(),
        deadline: Duration::from_secs(5),
        max_parse_bytes: 100 * 1024,
    }
}

/// Drive a ScanManager to completion, collecting all progress messages.
/// Panics if the scan does not finish within the timeout.
fn run_to_completion(mgr: &mut ScanManager) -> Vec<ScanProgress> {
    let rx = mgr.progress_rx.take().expect("scan not started");
    let mut messages = Vec::new();
    loop {
        match rx.recv_timeout(Duration::from_secs(10)) {
            Ok(msg) => {
                let done = matches!(
                    msg,
                    ScanProgress::ExtractionCompleted { .. }
                        | ScanProgress::Failed { .. }
                        | ScanProgress::Cancelled
                );
                messages.push(msg);
                if done {
                    return messages;
                }
            }
            Err(e) => panic!("scan did not complete: {e}"),
        }
    }
}

// =============================================================================
// Full pipeline E2E
// =============================================================================

/// A directory with a credential-bearing save file yields the pairs via
/// the background scan thread.
#[test]
fn e2e_scan_pipeline_recovers_credentials() {
    let dir = tempfile::tempdir().unwrap();
    write_sol(
        &dir.path().join("ptd_save.sol"),
        &[
            amf3_entry("Email", "trainer@example.com"),
            amf3_entry("Password", "pikachu123"),
        ],
    );
    write_sol(&dir.path().join("empty_game.sol"), &[]);

    let mut mgr = ScanManager::new();
    mgr.start_scan(request_for(dir.path()));
    let messages = run_to_completion(&mut mgr);

    // The credential-bearing file must have streamed back a full result.
    let extraction = messages
        .iter()
        .find_map(|m| match m {
            ScanProgress::FileExtracted { path, result, .. }
                if path.file_name().is_some_and(|n| n == "ptd_save.sol") =>
            {
                Some(result.clone().expect("file should be readable"))
            }
            _ => None,
        })
        .expect("no FileExtracted message for ptd_save.sol");

    assert_eq!(extraction.value_for("Email"), Some("trainer@example.com"));
    assert_eq!(extraction.value_for("Password"), Some("pikachu123"));
    assert!(!extraction.hit_deadline);

    // Summary reflects one hit out of two files.
    let summary = messages
        .iter()
        .find_map(|m| match m {
            ScanProgress::ExtractionCompleted { summary } => Some(summary.clone()),
            _ => None,
        })
        .expect("no ExtractionCompleted message");

    assert_eq!(summary.files_discovered, 2);
    assert_eq!(summary.files_with_credentials, 1);
    assert_eq!(summary.total_pairs, 2);
    assert_eq!(summary.files_with_errors, 0);
}

/// A missing required root fails the scan with a Failed message rather
/// than hanging or panicking.
#[test]
fn e2e_missing_required_root_reports_failure() {
    let mut request = request_for(Path::new("/nonexistent/solsleuth-e2e-test-path"));
    request.roots = vec![SearchRoot::required(
        Path::new("/nonexistent/solsleuth-e2e-test-path").to_path_buf(),
    )];

    let mut mgr = ScanManager::new();
    mgr.start_scan(request);
    let messages = run_to_completion(&mut mgr);

    assert!(
        messages
            .iter()
            .any(|m| matches!(m, ScanProgress::Failed { .. })),
        "expected a Failed message, got {messages:?}"
    );
}

/// The name filter narrows extraction to matching files only.
#[test]
fn e2e_name_filter_narrows_scan() {
    let dir = tempfile::tempdir().unwrap();
    write_sol(
        &dir.path().join("ptd_save.sol"),
        &[amf3_entry("Email", "a@x.com")],
    );
    write_sol(
        &dir.path().join("other_game.sol"),
        &[amf3_entry("Email", "b@y.com")],
    );

    let mut request = request_for(dir.path());
    request.discovery.name_filter = Some("ptd".to_string());

    let mut mgr = ScanManager::new();
    mgr.start_scan(request);
    let messages = run_to_completion(&mut mgr);

    let summary = messages
        .iter()
        .find_map(|m| match m {
            ScanProgress::ExtractionCompleted { summary } => Some(summary.clone()),
            _ => None,
        })
        .expect("no ExtractionCompleted message");

    assert_eq!(summary.files_discovered, 1, "filter should drop other_game");
    assert_eq!(summary.files_with_credentials, 1);
}

// =============================================================================
// Discovery + scanner E2E (without the background thread)
// =============================================================================

/// Discovery finds nested .sol files and the scanner recovers values
/// from their on-disk bytes.
#[test]
fn e2e_discover_then_extract_nested_file() {
    let dir = tempfile::tempdir().unwrap();
    let nested = dir.path().join("localhost").join("game.example.com");
    fs::create_dir_all(&nested).unwrap();
    write_sol(
        &nested.join("account.sol"),
        &[
            amf3_entry("Password", "s3cret!"),
            amf3_entry("Email", "nested@example.org"),
        ],
    );

    let roots = vec![SearchRoot::required(dir.path().to_path_buf())];
    let (files, warnings) = discover_files(&roots, &DiscoveryConfig::default(), |_, _| {}).unwrap();

    assert!(warnings.is_empty(), "unexpected warnings: {warnings:?}");
    assert_eq!(files.len(), 1);

    let data = fs::read(&files[0].path).unwrap();
    let extraction = scanner::extract(&data, &labels(), Duration::from_secs(5));

    assert_eq!(extraction.value_for("Password"), Some("s3cret!"));
    assert_eq!(extraction.value_for("Email"), Some("nested@example.org"));
}

/// A file full of junk yields an empty result, not an error.
#[test]
fn e2e_garbage_file_yields_empty_result() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("garbage.sol");
    let junk: Vec<u8> = (0..4096u32).map(|i| (i * 31 % 251) as u8).collect();
    fs::write(&path, &junk).unwrap();

    let data = fs::read(&path).unwrap();
    let extraction = scanner::extract(&data, &labels(), Duration::from_secs(5));

    assert!(extraction.pairs.is_empty());
    assert!(!extraction.hit_deadline);
    assert_eq!(extraction.bytes_scanned, data.len());
}
