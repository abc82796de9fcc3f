// SolSleuth - core/scanner.rs
//
// Tolerant, deadline-bounded extraction of labelled string values from
// SOL ("Shared Object") byte streams.
//
// Save files in the wild are frequently corrupted, truncated, or from
// SOL variants we have never seen, so this is deliberately NOT a full
// AMF deserialiser. The scan walks the raw bytes looking for the label
// tokens, attempts a structured AMF string read in the immediate
// vicinity of each hit, and degrades to a bounded printable-run scan
// when that fails. A buffer that yields nothing is a valid outcome,
// never an error.
//
// Core layer: operates on `&[u8]`, never touches the filesystem.

use crate::core::model::{CredentialPair, Extraction};
use crate::util::constants;
use aho_corasick::AhoCorasick;
use std::time::{Duration, Instant};

// =============================================================================
// Clock
// =============================================================================

/// Monotonic time source for the extraction deadline.
///
/// The deadline is threaded through the scan loop as data rather than
/// implemented as a background timer, so extraction stays a pure
/// synchronous function and tests can drive a fake clock instead of
/// waiting on the wall clock.
pub trait Clock {
    /// Time elapsed since the scan started.
    fn elapsed(&self) -> Duration;
}

/// Real monotonic clock anchored at construction.
pub struct WallClock {
    start: Instant,
}

impl WallClock {
    pub fn start() -> Self {
        Self {
            start: Instant::now(),
        }
    }
}

impl Clock for WallClock {
    fn elapsed(&self) -> Duration {
        self.start.elapsed()
    }
}

// =============================================================================
// Extraction
// =============================================================================

/// Scan `data` for the given label tokens and return the recovered
/// pairs, stopping early if `budget` wall-clock time elapses.
///
/// Properties:
/// - Pure over its input: never mutates `data`, holds no state between
///   calls, and two calls on the same buffer yield identical results
///   (modulo the clock, which only ever shrinks the result set).
/// - Never panics on malformed input; out-of-range length prefixes and
///   truncated buffers degrade to "no match" for that label.
/// - First non-empty match per label wins; later occurrences of an
///   already-filled label are ignored.
/// - The clock is checked only at label-match boundaries, not per byte.
///   On expiry the pairs collected so far are returned with
///   `hit_deadline` set: a soft timeout, not an error.
pub fn extract(data: &[u8], labels: &[String], budget: Duration) -> Extraction {
    extract_with_clock(data, labels, budget, &WallClock::start())
}

/// As [`extract`], with an injectable clock for deterministic tests.
pub fn extract_with_clock(
    data: &[u8],
    labels: &[String],
    budget: Duration,
    clock: &dyn Clock,
) -> Extraction {
    let mut result = Extraction {
        bytes_scanned: data.len(),
        ..Extraction::default()
    };

    if data.is_empty() || labels.is_empty() {
        return result;
    }

    let ac = match AhoCorasick::new(labels) {
        Ok(ac) => ac,
        Err(e) => {
            // Only reachable with pathological label sets (e.g. empty
            // patterns); treated as "nothing to search for".
            tracing::warn!(error = %e, "Label automaton build failed");
            return result;
        }
    };

    let mut filled = vec![false; labels.len()];
    // First byte not yet consumed by a previous label + value read.
    // Matches starting before this point would re-enter a consumed
    // region and are skipped.
    let mut resume_at: usize = 0;

    for m in ac.find_iter(data) {
        if clock.elapsed() >= budget {
            result.hit_deadline = true;
            result.bytes_scanned = m.start();
            tracing::debug!(
                scanned = m.start(),
                total = data.len(),
                pairs = result.pairs.len(),
                "Extraction deadline reached, returning partial result"
            );
            return result;
        }

        if m.start() < resume_at {
            continue;
        }

        let label_idx = m.pattern().as_usize();
        if filled[label_idx] {
            continue;
        }

        let label = &labels[label_idx];
        match read_value(data, m.end()) {
            Some((value, value_end)) => {
                if !value_is_plausible(label, &value) {
                    tracing::trace!(label = %label, offset = m.start(), "Implausible value rejected");
                    resume_at = m.end();
                    continue;
                }
                tracing::trace!(label = %label, offset = m.start(), "Value recovered");
                result.pairs.push(CredentialPair {
                    label: label.clone(),
                    value,
                    offset: m.start(),
                });
                filled[label_idx] = true;
                resume_at = value_end;

                if filled.iter().all(|&f| f) {
                    result.bytes_scanned = resume_at.min(data.len());
                    return result;
                }
            }
            None => {
                resume_at = m.end();
            }
        }
    }

    result
}

// =============================================================================
// Value reading
// =============================================================================

/// Attempt to read a string value starting just after a label token at
/// byte offset `after`. Returns the sanitised value and the offset of
/// the first byte past it, or `None` if nothing usable follows.
///
/// Strategy: structured AMF read first, then a bounded printable-run
/// fallback for corrupt or unknown SOL variants.
fn read_value(data: &[u8], after: usize) -> Option<(String, usize)> {
    if let Some(hit) = read_amf_string(data, after) {
        return Some(hit);
    }
    read_printable_run(data, after)
}

/// Look for an AMF string type marker within a small window after the
/// label and decode its length-prefixed payload.
///
/// Two encodings are accepted:
/// - AMF3: marker 0x06, U29 length with the low "literal" bit set
///   (`len = u29 >> 1`). Save files written by Flash Player 9+ use this.
/// - AMF0: marker 0x02, big-endian u16 length. Older SOL variants.
///
/// Length prefixes that run past the buffer or exceed MAX_VALUE_LEN are
/// treated as corrupt and rejected; the caller falls back to the
/// printable scan.
fn read_amf_string(data: &[u8], after: usize) -> Option<(String, usize)> {
    let window_end = after
        .saturating_add(constants::MARKER_LOOKAHEAD)
        .min(data.len());

    for pos in after..window_end {
        let (len, payload_start) = match data[pos] {
            0x06 => {
                let (u29, next) = read_u29(data, pos + 1)?;
                // Low bit clear means a by-reference string; the table
                // it refers to was never parsed, so only literals count.
                if u29 & 1 == 0 {
                    continue;
                }
                ((u29 >> 1) as usize, next)
            }
            0x02 => {
                let hi = *data.get(pos + 1)? as usize;
                let lo = *data.get(pos + 2)? as usize;
                ((hi << 8) | lo, pos + 3)
            }
            _ => continue,
        };

        if len == 0 || len > constants::MAX_VALUE_LEN {
            continue;
        }
        let payload_end = payload_start.checked_add(len)?;
        if payload_end > data.len() {
            continue;
        }

        let value = sanitise(&data[payload_start..payload_end]);
        if !value.is_empty() {
            return Some((value, payload_end));
        }
    }

    None
}

/// Decode an AMF3 U29 variable-length integer at `pos`: up to three
/// 7-bit continuation bytes followed by a full final byte.
fn read_u29(data: &[u8], pos: usize) -> Option<(u32, usize)> {
    let mut value: u32 = 0;
    for i in 0..4 {
        let b = *data.get(pos + i)?;
        if i == 3 {
            return Some(((value << 8) | b as u32, pos + 4));
        }
        value = (value << 7) | (b & 0x7F) as u32;
        if b & 0x80 == 0 {
            return Some((value, pos + i + 1));
        }
    }
    None
}

/// Fallback: take the first printable-ASCII run (length >= 2) within a
/// bounded window after the label. The run frequently starts at a
/// printable length byte; the sanitiser's leading-punctuation strip
/// absorbs that.
fn read_printable_run(data: &[u8], after: usize) -> Option<(String, usize)> {
    let window_end = after
        .saturating_add(constants::FALLBACK_VALUE_WINDOW)
        .min(data.len());

    let mut run_start = None;
    for pos in after..window_end {
        let printable = (0x20..=0x7E).contains(&data[pos]);
        match (run_start, printable) {
            (None, true) => run_start = Some(pos),
            (Some(start), false) => {
                if pos - start >= 2 {
                    let value = sanitise(&data[start..pos]);
                    if !value.is_empty() {
                        return Some((value, pos));
                    }
                }
                run_start = None;
            }
            _ => {}
        }
    }

    // Run extends to the window edge.
    if let Some(start) = run_start {
        if window_end - start >= 2 {
            let value = sanitise(&data[start..window_end]);
            if !value.is_empty() {
                return Some((value, window_end));
            }
        }
    }

    None
}

// =============================================================================
// Candidate sanitation
// =============================================================================

/// Decode candidate value bytes as lossy UTF-8, drop control characters
/// and replacement glyphs, trim whitespace, and strip leading
/// punctuation (stray AMF length/marker bytes that happen to be
/// printable land at the front of fallback runs).
fn sanitise(raw: &[u8]) -> String {
    let decoded = String::from_utf8_lossy(raw);
    let cleaned: String = decoded
        .chars()
        .filter(|c| !c.is_control() && *c != '\u{FFFD}')
        .collect();
    cleaned
        .trim()
        .trim_start_matches(|c: char| !(c.is_alphanumeric() || c == '_'))
        .to_string()
}

/// Label-specific plausibility check. An "Email" value must look like
/// an address; everything else passes as long as it is non-empty.
fn value_is_plausible(label: &str, value: &str) -> bool {
    if value.is_empty() {
        return false;
    }
    if label == "Email" {
        return value.contains('@') && value.contains('.');
    }
    true
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::Cell;

    fn labels() -> Vec<String> {
        vec!["Email".to_string(), "Password".to_string()]
    }

    fn budget() -> Duration {
        Duration::from_secs(5)
    }

    /// Build an AMF3 string cell: marker 0x06 + U29 length (literal bit
    /// set) + payload. Only valid for payloads under 128 bytes.
    fn amf3_string(s: &str) -> Vec<u8> {
        assert!(s.len() < 128);
        let mut out = vec![0x06, ((s.len() as u8) << 1) | 1];
        out.extend_from_slice(s.as_bytes());
        out
    }

    /// Build an AMF0 string cell: marker 0x02 + u16-BE length + payload.
    fn amf0_string(s: &str) -> Vec<u8> {
        let len = s.len() as u16;
        let mut out = vec![0x02, (len >> 8) as u8, (len & 0xFF) as u8];
        out.extend_from_slice(s.as_bytes());
        out
    }

    /// Fake clock advancing a fixed step per observation.
    struct SteppingClock {
        step_ms: u64,
        calls: Cell<u64>,
    }

    impl SteppingClock {
        fn new(step_ms: u64) -> Self {
            Self {
                step_ms,
                calls: Cell::new(0),
            }
        }
    }

    impl Clock for SteppingClock {
        fn elapsed(&self) -> Duration {
            let n = self.calls.get() + 1;
            self.calls.set(n);
            Duration::from_millis(n * self.step_ms)
        }
    }

    #[test]
    fn test_empty_buffer_yields_empty_result() {
        let ex = extract(&[], &labels(), budget());
        assert!(ex.pairs.is_empty());
        assert!(!ex.hit_deadline);
    }

    #[test]
    fn test_buffer_without_labels_yields_empty_result() {
        let data = b"\x00\x02ptd\x00\x01nothing interesting here\xff\xfe";
        let ex = extract(data, &labels(), budget());
        assert!(ex.pairs.is_empty());
        assert_eq!(ex.bytes_scanned, data.len());
    }

    #[test]
    fn test_amf3_length_prefixed_password() {
        let mut data = Vec::new();
        data.extend_from_slice(b"\x00\x08Password");
        data.extend_from_slice(&amf3_string("secret123"));
        data.push(0x00);

        let ex = extract(&data, &labels(), budget());
        assert_eq!(ex.value_for("Password"), Some("secret123"));
        assert_eq!(ex.pairs.len(), 1);
    }

    #[test]
    fn test_amf0_length_prefixed_value() {
        let mut data = Vec::new();
        data.extend_from_slice(b"junk Email");
        data.extend_from_slice(&amf0_string("user@example.com"));

        let ex = extract(&data, &labels(), budget());
        assert_eq!(ex.value_for("Email"), Some("user@example.com"));
    }

    #[test]
    fn test_both_labels_in_one_buffer() {
        let mut data = Vec::new();
        data.extend_from_slice(b"Email");
        data.extend_from_slice(&amf3_string("a@x.com"));
        data.extend_from_slice(b"\x00\x08Password");
        data.extend_from_slice(&amf3_string("hunter2!"));

        let ex = extract(&data, &labels(), budget());
        assert_eq!(ex.value_for("Email"), Some("a@x.com"));
        assert_eq!(ex.value_for("Password"), Some("hunter2!"));
        assert_eq!(ex.pairs.len(), 2);
        // Pairs are ordered by match position.
        assert_eq!(ex.pairs[0].label, "Email");
        assert!(ex.pairs[0].offset < ex.pairs[1].offset);
    }

    #[test]
    fn test_first_match_wins() {
        let mut data = Vec::new();
        data.extend_from_slice(b"Email");
        data.extend_from_slice(&amf3_string("a@x.com"));
        data.extend_from_slice(b"Email");
        data.extend_from_slice(&amf3_string("b@y.com"));

        let ex = extract(&data, &labels(), budget());
        let emails: Vec<_> = ex.pairs.iter().filter(|p| p.label == "Email").collect();
        assert_eq!(emails.len(), 1, "exactly one Email pair expected");
        assert_eq!(emails[0].value, "a@x.com");
    }

    #[test]
    fn test_truncated_after_label_yields_no_pair() {
        let data = b"save data Password".to_vec();
        let ex = extract(&data, &labels(), budget());
        assert!(ex.value_for("Password").is_none());
    }

    #[test]
    fn test_truncated_length_prefix_is_rejected() {
        // Claims 60 bytes but only a handful follow.
        let mut data = b"Password".to_vec();
        data.push(0x06);
        data.push((60 << 1) | 1);
        data.extend_from_slice(b"\x01\x02\x03");

        let ex = extract(&data, &labels(), budget());
        // Structured read fails on bounds; fallback finds no printable
        // run of length >= 2.
        assert!(ex.value_for("Password").is_none());
    }

    #[test]
    fn test_fallback_printable_run() {
        // No valid marker after the label, just raw printable text
        // behind a non-printable gap.
        let mut data = b"Password".to_vec();
        data.extend_from_slice(b"\xff\xfe");
        data.extend_from_slice(b"opensesame");
        data.push(0x00);

        let ex = extract(&data, &labels(), budget());
        assert_eq!(ex.value_for("Password"), Some("opensesame"));
    }

    #[test]
    fn test_implausible_email_skipped_for_later_match() {
        let mut data = Vec::new();
        data.extend_from_slice(b"Email");
        data.extend_from_slice(&amf3_string("notanaddress"));
        data.extend_from_slice(b"Email");
        data.extend_from_slice(&amf3_string("real@mail.net"));

        let ex = extract(&data, &labels(), budget());
        assert_eq!(ex.value_for("Email"), Some("real@mail.net"));
    }

    #[test]
    fn test_control_characters_and_leading_punctuation_stripped() {
        let mut data = b"Password".to_vec();
        data.extend_from_slice(b"\xff");
        // Leading '%' mimics a printable AMF length byte swallowed by
        // the fallback run.
        data.extend_from_slice(b"%pass\x01word");

        let ex = extract(&data, &labels(), budget());
        // The control byte terminates the first run at "pass".
        assert_eq!(ex.value_for("Password"), Some("pass"));
    }

    #[test]
    fn test_zero_deadline_returns_promptly_with_partial_result() {
        let mut data = Vec::new();
        for _ in 0..100 {
            data.extend_from_slice(b"Password");
            data.extend_from_slice(&amf3_string("secret"));
            data.extend_from_slice(&[0u8; 32]);
        }

        let ex = extract(&data, &labels(), Duration::ZERO);
        assert!(ex.hit_deadline, "zero budget must trip the deadline");
        assert!(ex.pairs.is_empty());
        assert!(ex.bytes_scanned < data.len());
    }

    #[test]
    fn test_deadline_mid_scan_keeps_collected_pairs() {
        let mut data = Vec::new();
        data.extend_from_slice(b"Email");
        data.extend_from_slice(&amf3_string("a@x.com"));
        data.extend_from_slice(&[0u8; 64]);
        data.extend_from_slice(b"Password");
        data.extend_from_slice(&amf3_string("secret"));

        // 40 ms per clock observation against a 50 ms budget: the first
        // label-match check passes, the second fires the deadline.
        let clock = SteppingClock::new(40);
        let ex = extract_with_clock(&data, &labels(), Duration::from_millis(50), &clock);
        assert!(ex.hit_deadline);
        assert_eq!(ex.value_for("Email"), Some("a@x.com"));
        assert!(ex.value_for("Password").is_none());
    }

    #[test]
    fn test_idempotence() {
        let mut data = b"garbage\x00\x01".to_vec();
        data.extend_from_slice(b"Email");
        data.extend_from_slice(&amf3_string("a@x.com"));
        data.extend_from_slice(b"more garbage\xff\xfe\xfd");

        let first = extract(&data, &labels(), budget());
        let second = extract(&data, &labels(), budget());
        assert_eq!(first, second);
    }

    #[test]
    fn test_arbitrary_bytes_never_panic() {
        // Deterministic pseudo-random garbage, including embedded label
        // fragments and bogus markers.
        let mut state: u32 = 0x1234_5678;
        let mut data = Vec::with_capacity(8192);
        for _ in 0..8192 {
            state = state.wrapping_mul(1_664_525).wrapping_add(1_013_904_223);
            data.push((state >> 24) as u8);
        }
        data.extend_from_slice(b"Password\x06");
        data.extend_from_slice(b"Email\x02\xff\xff");

        let _ = extract(&data, &labels(), budget());
    }

    #[test]
    fn test_amf3_reference_string_is_skipped() {
        // U29 with the low bit clear is a reference, not a literal.
        let mut data = b"Password".to_vec();
        data.push(0x06);
        data.push(4 << 1); // reference to table entry 4
        data.extend_from_slice(b"\x00\x00");

        let ex = extract(&data, &labels(), budget());
        assert!(ex.value_for("Password").is_none());
    }

    #[test]
    fn test_value_region_not_rescanned() {
        // The Email value itself contains the bytes "Password"; the
        // scan must not treat them as a second label inside the
        // consumed value region.
        let mut data = Vec::new();
        data.extend_from_slice(b"Email");
        data.extend_from_slice(&amf3_string("Password.holder@x.com"));
        data.extend_from_slice(&[0u8; 16]);

        let ex = extract(&data, &labels(), budget());
        assert_eq!(ex.value_for("Email"), Some("Password.holder@x.com"));
        assert!(
            ex.value_for("Password").is_none(),
            "label bytes inside a consumed value must not match"
        );
    }
}
