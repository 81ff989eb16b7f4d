//! Captured traffic log, newest entry first

use std::collections::VecDeque;

use serde::{Deserialize, Serialize};

use crate::constants::MAX_CAPTURED;
use crate::curl::ToCurl;
use crate::models::{LoggedRequest, RequestDraft};
use crate::tree::import_logged_request;

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct CaptureLog {
    pub entries: VecDeque<LoggedRequest>,
    pub recording: bool,
    #[serde(skip, default = "default_capacity")]
    capacity: usize,
}

fn default_capacity() -> usize {
    MAX_CAPTURED
}

impl CaptureLog {
    pub fn new() -> Self {
        Self::with_capacity(MAX_CAPTURED)
    }

    pub fn with_capacity(capacity: usize) -> Self {
        CaptureLog {
            entries: VecDeque::new(),
            recording: true,
            capacity: capacity.max(1),
        }
    }

    /// Add an observation. Paused logs drop it and return false.
    pub fn record(&mut self, entry: LoggedRequest) -> bool {
        if !self.recording {
            tracing::debug!(id = %entry.id, "Capture paused, entry dropped");
            return false;
        }
        while self.entries.len() >= self.capacity {
            self.entries.pop_back();
        }
        self.entries.push_front(entry);
        true
    }

    /// Flip recording on/off. Returns the new state.
    pub fn toggle_recording(&mut self) -> bool {
        self.recording = !self.recording;
        tracing::info!(recording = self.recording, "Capture recording toggled");
        self.recording
    }

    pub fn get(&self, id: &str) -> Option<&LoggedRequest> {
        self.entries.iter().find(|e| e.id == id)
    }

    pub fn delete(&mut self, id: &str) -> bool {
        match self.entries.iter().position(|e| e.id == id) {
            Some(index) => {
                self.entries.remove(index);
                true
            }
            None => false,
        }
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Entries whose url or method contains `text`, ignoring case
    pub fn filter<'a>(&'a self, text: &str) -> impl Iterator<Item = &'a LoggedRequest> + 'a {
        let needle = text.to_lowercase();
        self.entries.iter().filter(move |e| {
            needle.is_empty()
                || e.url.to_lowercase().contains(&needle)
                || e.method.to_lowercase().contains(&needle)
        })
    }

    pub fn to_curl(&self, id: &str) -> Option<String> {
        self.get(id).map(ToCurl::to_curl)
    }

    /// Draft for a saved request copied from an entry
    pub fn import(&self, id: &str) -> Option<RequestDraft> {
        self.get(id).map(import_logged_request)
    }
}

impl Default for CaptureLog {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::BTreeMap;

    fn entry(id: &str, method: &str, url: &str) -> LoggedRequest {
        LoggedRequest {
            id: id.to_string(),
            method: method.to_string(),
            url: url.to_string(),
            timestamp: 1_700_000_000_000,
            status: 200,
            request_headers: BTreeMap::new(),
            request_body: None,
        }
    }

    #[test]
    fn test_record_newest_first_and_capacity() {
        let mut log = CaptureLog::with_capacity(2);
        log.record(entry("1", "GET", "https://a.dev"));
        log.record(entry("2", "GET", "https://b.dev"));
        log.record(entry("3", "GET", "https://c.dev"));
        let ids: Vec<_> = log.entries.iter().map(|e| e.id.as_str()).collect();
        assert_eq!(ids, vec!["3", "2"]);
    }

    #[test]
    fn test_paused_log_drops_entries() {
        let mut log = CaptureLog::new();
        assert!(!log.toggle_recording());
        assert!(!log.record(entry("1", "GET", "https://a.dev")));
        assert!(log.is_empty());
        assert!(log.toggle_recording());
        assert!(log.record(entry("1", "GET", "https://a.dev")));
        assert_eq!(log.len(), 1);
    }

    #[test]
    fn test_filter_by_url_or_method() {
        let mut log = CaptureLog::new();
        log.record(entry("1", "GET", "https://api.example.com/users"));
        log.record(entry("2", "DELETE", "https://cdn.example.com/a.png"));
        log.record(entry("3", "POST", "https://api.example.com/Login"));

        let ids = |text: &str| log.filter(text).map(|e| e.id.clone()).collect::<Vec<_>>();
        assert_eq!(ids("API"), vec!["3", "1"]);
        assert_eq!(ids("delete"), vec!["2"]);
        assert_eq!(ids("login"), vec!["3"]);
        assert_eq!(ids("").len(), 3);
    }

    #[test]
    fn test_delete_clear_and_export() {
        let mut log = CaptureLog::new();
        log.record(entry("1", "GET", "https://a.dev"));
        log.record(entry("2", "PUT", "https://b.dev"));

        assert_eq!(log.to_curl("2").as_deref(), Some("curl -X PUT 'https://b.dev'"));
        assert_eq!(log.import("1").unwrap().url.as_deref(), Some("https://a.dev"));
        assert!(log.import("missing").is_none());

        assert!(log.delete("1"));
        assert!(!log.delete("1"));
        assert_eq!(log.len(), 1);
        log.clear();
        assert!(log.is_empty());
    }
}
