//! Append-only launch history at `~/.kickoff/launch.log`, one session
//! block per launch, rotated to the most recent sessions on open. Logging
//! never fails the launch.

use std::fs::{self, File, OpenOptions};
use std::io::Write;
use std::path::{Path, PathBuf};
use std::time::Instant;

use chrono::Local;

use crate::store::Store;

pub const MAX_SESSIONS: usize = 10;
const SESSION_SEPARATOR: &str =
    "============================================================";

pub struct HistoryLog {
    file: Option<File>,
    start: Instant,
}

impl HistoryLog {
    /// Open the log and write the session header. `auto` marks launches
    /// triggered by the auto-start registration.
    pub fn begin(auto: bool) -> Self {
        Self::begin_at(Store::config_dir().join("launch.log"), auto)
    }

    fn begin_at(path: PathBuf, auto: bool) -> Self {
        if let Some(parent) = path.parent() {
            let _ = fs::create_dir_all(parent);
        }
        rotate(&path);

        let file = OpenOptions::new().append(true).create(true).open(&path).ok();
        let mut log = HistoryLog {
            file,
            start: Instant::now(),
        };
        let kind = if auto { "auto-startup" } else { "manual" };
        log.write_raw(&format!("\n{SESSION_SEPARATOR}\n"));
        log.write_raw(&format!(
            "[{}] === Launch Begin ({kind}) ===\n",
            timestamp()
        ));
        log
    }

    /// Timestamped entry with elapsed milliseconds since the session
    /// started.
    pub fn record(&mut self, message: &str) {
        let elapsed = self.start.elapsed().as_millis();
        self.write_raw(&format!("[{}] [+{elapsed}ms] {message}\n", timestamp()));
    }

    pub fn end(mut self) {
        let total = self.start.elapsed().as_millis();
        self.write_raw(&format!(
            "[{}] === Launch Complete: {total}ms ===\n",
            timestamp()
        ));
    }

    fn write_raw(&mut self, line: &str) {
        if let Some(file) = self.file.as_mut() {
            let _ = file.write_all(line.as_bytes());
            let _ = file.flush();
        }
    }
}

fn timestamp() -> String {
    Local::now().format("%Y-%m-%d %H:%M:%S%.3f").to_string()
}

/// Keep only the newest `MAX_SESSIONS` session blocks. Failures leave the
/// file as it was.
fn rotate(path: &Path) {
    let Ok(content) = fs::read_to_string(path) else {
        return;
    };
    if let Some(trimmed) = trim_sessions(&content) {
        let _ = fs::write(path, trimmed);
    }
}

fn trim_sessions(content: &str) -> Option<String> {
    let sessions: Vec<&str> = content
        .split(SESSION_SEPARATOR)
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .collect();
    if sessions.len() <= MAX_SESSIONS {
        return None;
    }
    let keep = &sessions[sessions.len() - MAX_SESSIONS..];
    let mut out = keep.join(&format!("\n{SESSION_SEPARATOR}\n"));
    out.push_str(&format!("\n{SESSION_SEPARATOR}\n"));
    Some(out)
}
