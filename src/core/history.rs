use chrono::{DateTime, Utc};
use serde::Serialize;
use std::collections::VecDeque;

pub const DEFAULT_HISTORY_LIMIT: usize = 50;

#[derive(Debug, Clone, Serialize)]
pub struct HistoryEntry {
    pub sequence: u64,
    pub symptom: String,
    pub advice: String,
    pub recorded_at: DateTime<Utc>,
}

/// 會話內的建議紀錄，超過上限時移除最舊的一筆
#[derive(Debug, Clone)]
pub struct SessionHistory {
    entries: VecDeque<HistoryEntry>,
    limit: usize,
    next_sequence: u64,
}

impl SessionHistory {
    pub fn new(limit: usize) -> Self {
        let limit = limit.max(1);
        Self {
            entries: VecDeque::with_capacity(limit.min(DEFAULT_HISTORY_LIMIT)),
            limit,
            next_sequence: 1,
        }
    }

    pub fn record(&mut self, symptom: &str, advice: &str) -> &HistoryEntry {
        if self.entries.len() == self.limit {
            if let Some(evicted) = self.entries.pop_front() {
                tracing::debug!("History full, evicting analysis {}", evicted.sequence);
            }
        }

        self.entries.push_back(HistoryEntry {
            sequence: self.next_sequence,
            symptom: symptom.to_string(),
            advice: advice.to_string(),
            recorded_at: Utc::now(),
        });
        self.next_sequence += 1;

        &self.entries[self.entries.len() - 1]
    }

    pub fn entries(&self) -> impl Iterator<Item = &HistoryEntry> {
        self.entries.iter()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn limit(&self) -> usize {
        self.limit
    }
}

impl Default for SessionHistory {
    fn default() -> Self {
        Self::new(DEFAULT_HISTORY_LIMIT)
    }
}
