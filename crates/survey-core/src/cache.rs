//! The in-memory record list behind the details view.
//!
//! The cache is a full-refresh snapshot: it is replaced wholesale after a
//! fetch and dropped on invalidation, never patched in place.

use chrono::{DateTime, Utc};

use crate::dates::Calendar;
use crate::filter::{FilterCriteria, filter_records};
use crate::record::{SurveyRecord, sort_by_sequence_desc};

/// Why the cache was last invalidated.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Invalidation {
    /// A record was submitted successfully.
    Submitted,
    /// The details view was (re-)entered.
    DetailsEntered,
}

#[derive(Clone, Debug)]
enum CacheState {
    Stale { reason: Option<Invalidation> },
    Loaded { records: Vec<SurveyRecord>, fetched_at: DateTime<Utc> },
}

/// Explicitly owned record snapshot.
#[derive(Clone, Debug)]
pub struct RecordCache {
    state: CacheState,
}

impl Default for RecordCache {
    fn default() -> Self {
        Self::new()
    }
}

impl RecordCache {
    /// A cache that has never been loaded.
    pub const fn new() -> Self {
        Self {
            state: CacheState::Stale { reason: None },
        }
    }

    /// Replace the snapshot. Records are ordered by sequence number, highest
    /// first.
    pub fn replace(&mut self, mut records: Vec<SurveyRecord>) {
        sort_by_sequence_desc(&mut records);
        tracing::debug!(count = records.len(), "record cache replaced");
        self.state = CacheState::Loaded {
            records,
            fetched_at: Utc::now(),
        };
    }

    /// Drop the snapshot.
    pub fn invalidate(&mut self, reason: Invalidation) {
        tracing::debug!(?reason, "record cache invalidated");
        self.state = CacheState::Stale {
            reason: Some(reason),
        };
    }

    /// Whether a fetch is needed before the records can be trusted.
    pub const fn is_stale(&self) -> bool {
        matches!(self.state, CacheState::Stale { .. })
    }

    /// Reason for the last invalidation, while stale.
    pub const fn invalidation(&self) -> Option<Invalidation> {
        match self.state {
            CacheState::Stale { reason } => reason,
            CacheState::Loaded { .. } => None,
        }
    }

    /// When the snapshot was taken.
    pub fn fetched_at(&self) -> Option<DateTime<Utc>> {
        match &self.state {
            CacheState::Loaded { fetched_at, .. } => Some(*fetched_at),
            CacheState::Stale { .. } => None,
        }
    }

    /// Current records; empty while stale.
    pub fn records(&self) -> &[SurveyRecord] {
        match &self.state {
            CacheState::Loaded { records, .. } => records,
            CacheState::Stale { .. } => &[],
        }
    }

    /// Number of cached records.
    pub fn len(&self) -> usize {
        self.records().len()
    }

    /// Whether there are no cached records.
    pub fn is_empty(&self) -> bool {
        self.records().is_empty()
    }

    /// Filtered view over the current snapshot.
    pub fn filtered(&self, criteria: &FilterCriteria, calendar: &Calendar) -> Vec<&SurveyRecord> {
        filter_records(self.records(), criteria, calendar)
    }
}
