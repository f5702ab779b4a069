//! Record of the calls made by a client.

use std::sync::Mutex;

use vantage_core::RequestParameters;

/// Append-only log of successful calls, API key removed.
#[derive(Debug, Default)]
pub struct CallLog {
    entries: Mutex<Vec<RequestParameters>>,
}

impl CallLog {
    /// Create an empty log.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends a call.
    pub fn record(&self, params: &RequestParameters) {
        if let Ok(mut entries) = self.entries.lock() {
            entries.push(params.redacted());
        }
    }

    /// All calls, oldest first.
    #[must_use]
    pub fn history(&self) -> Vec<RequestParameters> {
        self.entries.lock().map(|e| e.clone()).unwrap_or_default()
    }

    /// The `n`-th most recent call; `last(1)` is the latest.
    ///
    /// Returns `None` for `n == 0` or when fewer than `n` calls were made.
    #[must_use]
    pub fn last(&self, n: usize) -> Option<RequestParameters> {
        let entries = self.entries.lock().ok()?;
        let idx = entries.len().checked_sub(n).filter(|_| n > 0)?;
        entries.get(idx).cloned()
    }

    /// Number of recorded calls.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.lock().map(|e| e.len()).unwrap_or_default()
    }

    /// Returns true if no call was recorded.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_call_log() {
        let log = CallLog::new();
        assert!(log.is_empty());
        assert!(log.last(1).is_none());

        log.record(&RequestParameters::new("TIME_SERIES_DAILY").with("apikey", "secret"));
        log.record(&RequestParameters::new("GLOBAL_QUOTE"));

        assert_eq!(log.len(), 2);
        assert_eq!(log.last(1).unwrap().function(), "GLOBAL_QUOTE");
        assert_eq!(log.last(2).unwrap().function(), "TIME_SERIES_DAILY");
        assert!(log.last(3).is_none());
        assert!(log.last(0).is_none());
        assert!(!log.history()[0].contains("apikey"));
    }
}
