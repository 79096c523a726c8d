//! Capture log parsing.
//!
//! The capture module prints one record per keyboard event to the kernel
//! log:
//!
//! ```text
//! {'type': 'press', 'key-char': 'a', 'keystroke-time': 123456789}
//! {'type': 'release', 'key-char': 'a', 'keystroke-time': 123500000, 'keyhold': 43211}
//! ```
//!
//! Logs are usually harvested with dmesg, so anything before the opening
//! brace (timestamps, log-level prefixes) is ignored. Records that do not
//! parse are skipped and counted rather than aborting the replay.

use std::path::Path;
use thiserror::Error;

/// Errors that can occur while reading a capture log.
#[derive(Debug, Error)]
pub enum LogError {
    #[error("could not read {path}: {source}")]
    Read {
        path: String,
        #[source]
        source: std::io::Error,
    },
}

/// Whether a record is a key press or a key release.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RecordKind {
    Press,
    Release,
}

/// One parsed capture record.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KeystrokeRecord {
    pub kind: RecordKind,
    /// Key symbol as reported by the capture side.
    pub key: String,
    /// Capture timestamp in TSC ticks, relative to module load.
    pub time_ticks: u64,
    /// Hold duration in ticks, present on release records.
    pub hold_ticks: Option<u64>,
}

/// Result of scanning a whole log.
#[derive(Debug, Clone, Default)]
pub struct ParsedLog {
    pub records: Vec<KeystrokeRecord>,
    /// Non-empty lines that carried no usable record.
    pub skipped: usize,
}

impl ParsedLog {
    /// Number of press records, the ones a replay actually emits.
    pub fn press_count(&self) -> usize {
        self.records
            .iter()
            .filter(|r| r.kind == RecordKind::Press)
            .count()
    }
}

/// Extract the raw value of `'name': value` from a record body.
fn field<'a>(body: &'a str, name: &str) -> Option<&'a str> {
    let tag = format!("'{name}':");
    let start = body.find(&tag)? + tag.len();
    let rest = body[start..].trim_start();
    if let Some(quoted) = rest.strip_prefix('\'') {
        let end = quoted.find('\'')?;
        Some(&quoted[..end])
    } else {
        let end = rest
            .find(|c: char| c == ',' || c == '}')
            .unwrap_or(rest.len());
        Some(rest[..end].trim())
    }
}

/// Parse a single log line. Returns None if the line carries no usable
/// record.
pub fn parse_line(line: &str) -> Option<KeystrokeRecord> {
    let start = line.find('{')?;
    let end = line.rfind('}')?;
    if end <= start {
        return None;
    }
    let body = &line[start + 1..end];

    let kind = match field(body, "type")? {
        "press" => RecordKind::Press,
        "release" => RecordKind::Release,
        _ => return None,
    };
    let key = field(body, "key-char")?.to_string();
    if key.is_empty() {
        return None;
    }
    let time_ticks = field(body, "keystroke-time")?.parse().ok()?;
    let hold_ticks = field(body, "keyhold").and_then(|v| v.parse().ok());

    Some(KeystrokeRecord {
        kind,
        key,
        time_ticks,
        hold_ticks,
    })
}

/// Parse a whole capture log, counting unusable lines.
pub fn parse_log(content: &str) -> ParsedLog {
    let mut parsed = ParsedLog::default();
    for line in content.lines() {
        if line.trim().is_empty() {
            continue;
        }
        match parse_line(line) {
            Some(record) => parsed.records.push(record),
            None => parsed.skipped += 1,
        }
    }
    parsed
}

/// Read and parse a capture log file.
pub fn read_log(path: &Path) -> Result<ParsedLog, LogError> {
    let content = std::fs::read_to_string(path).map_err(|source| LogError::Read {
        path: path.display().to_string(),
        source,
    })?;
    Ok(parse_log(&content))
}
