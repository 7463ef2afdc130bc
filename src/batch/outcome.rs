use crate::error::Failure;
use crate::Result;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::time::Duration;

/// Options for [`RemoteCallClient::batch_call_with`](crate::RemoteCallClient::batch_call_with).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct BatchOptions {
    /// Maximum calls in flight. `None` means no cap.
    #[serde(default)]
    pub concurrency_limit: Option<usize>,
    /// Attempts per call; 1 disables retry.
    #[serde(default = "default_max_attempts")]
    pub max_attempts: u32,
}

fn default_max_attempts() -> u32 {
    1
}

impl Default for BatchOptions {
    fn default() -> Self {
        Self {
            concurrency_limit: None,
            max_attempts: default_max_attempts(),
        }
    }
}

impl BatchOptions {
    pub fn with_concurrency_limit(mut self, n: usize) -> Self {
        self.concurrency_limit = Some(n.max(1));
        self
    }

    pub fn with_max_attempts(mut self, n: u32) -> Self {
        self.max_attempts = n.max(1);
        self
    }
}

/// Result of one call inside a batch.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BatchEntry {
    pub action: String,
    pub succeeded: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<Failure>,
}

impl BatchEntry {
    pub fn from_result(action: impl Into<String>, result: Result<Value>) -> Self {
        let action = action.into();
        match result {
            Ok(data) => Self {
                action,
                succeeded: true,
                data: Some(data),
                error: None,
            },
            Err(e) => Self {
                action,
                succeeded: false,
                data: None,
                error: Some(Failure::from(&e)),
            },
        }
    }
}

/// Entries in request order, plus elapsed wall time for the whole batch.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BatchOutcome {
    pub entries: Vec<BatchEntry>,
    #[serde(with = "duration_ms")]
    pub execution_time: Duration,
}

impl BatchOutcome {
    pub fn new(entries: Vec<BatchEntry>, execution_time: Duration) -> Self {
        Self {
            entries,
            execution_time,
        }
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn all_succeeded(&self) -> bool {
        self.entries.iter().all(|e| e.succeeded)
    }

    pub fn success_count(&self) -> usize {
        self.entries.iter().filter(|e| e.succeeded).count()
    }

    pub fn failure_count(&self) -> usize {
        self.len() - self.success_count()
    }

    pub fn success_rate(&self) -> f64 {
        if self.is_empty() {
            0.0
        } else {
            self.success_count() as f64 / self.len() as f64
        }
    }

    pub fn iter(&self) -> std::slice::Iter<'_, BatchEntry> {
        self.entries.iter()
    }
}

impl IntoIterator for BatchOutcome {
    type Item = BatchEntry;
    type IntoIter = std::vec::IntoIter<BatchEntry>;

    fn into_iter(self) -> Self::IntoIter {
        self.entries.into_iter()
    }
}

impl<'a> IntoIterator for &'a BatchOutcome {
    type Item = &'a BatchEntry;
    type IntoIter = std::slice::Iter<'a, BatchEntry>;

    fn into_iter(self) -> Self::IntoIter {
        self.entries.iter()
    }
}

mod duration_ms {
    use serde::Serializer;
    use std::time::Duration;

    pub fn serialize<S: Serializer>(d: &Duration, s: S) -> Result<S::Ok, S::Error> {
        s.serialize_u64(d.as_millis() as u64)
    }
}
