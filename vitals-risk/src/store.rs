//! Insight persistence port and an in-memory adapter.

use std::collections::{HashMap, HashSet};
use std::sync::RwLock;

use vitals_core::{Condition, RiskInsight};

/// Storage for produced insights, keyed by subject and timestamp.
///
/// Query results are ordered newest first. Display and trend analysis rely on
/// that ordering.
pub trait InsightStore: Send + Sync {
    /// Error type for storage operations.
    type Error: std::error::Error + Send + Sync + 'static;

    /// Persist one insight.
    ///
    /// # Errors
    /// Returns error if the storage operation fails.
    fn save(&self, insight: &RiskInsight) -> Result<(), Self::Error>;

    /// All insights for a subject, optionally restricted to one condition,
    /// newest first.
    ///
    /// # Errors
    /// Returns error if the storage operation fails.
    fn insights_for(
        &self,
        subject_id: &str,
        condition: Option<Condition>,
    ) -> Result<Vec<RiskInsight>, Self::Error>;

    /// Remove every insight stored for a subject.
    ///
    /// # Errors
    /// Returns error if the storage operation fails.
    fn clear_subject(&self, subject_id: &str) -> Result<(), Self::Error>;

    /// The newest insight of each condition for a subject, newest first.
    ///
    /// # Errors
    /// Returns error if the storage operation fails.
    fn latest_by_condition(&self, subject_id: &str) -> Result<Vec<RiskInsight>, Self::Error> {
        let mut seen = HashSet::new();
        Ok(self
            .insights_for(subject_id, None)?
            .into_iter()
            .filter(|insight| seen.insert(insight.condition))
            .collect())
    }
}

#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("insight store lock poisoned")]
    Poisoned,
}

/// Process-local store, suitable for demos, tests and the WASM dashboard.
#[derive(Debug, Default)]
pub struct MemoryInsightStore {
    by_subject: RwLock<HashMap<String, Vec<RiskInsight>>>,
}

impl MemoryInsightStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl InsightStore for MemoryInsightStore {
    type Error = StoreError;

    fn save(&self, insight: &RiskInsight) -> Result<(), StoreError> {
        let mut guard = self.by_subject.write().map_err(|_| StoreError::Poisoned)?;
        guard
            .entry(insight.subject_id.clone())
            .or_default()
            .push(insight.clone());
        Ok(())
    }

    fn insights_for(
        &self,
        subject_id: &str,
        condition: Option<Condition>,
    ) -> Result<Vec<RiskInsight>, StoreError> {
        let guard = self.by_subject.read().map_err(|_| StoreError::Poisoned)?;
        let Some(saved) = guard.get(subject_id) else {
            return Ok(Vec::new());
        };

        // Reverse insertion order first so equal timestamps keep the most
        // recently saved insight in front after the stable sort.
        let mut insights: Vec<RiskInsight> = saved
            .iter()
            .rev()
            .filter(|insight| condition.map_or(true, |wanted| insight.condition == wanted))
            .cloned()
            .collect();
        insights.sort_by(|a, b| b.timestamp.cmp(&a.timestamp));
        Ok(insights)
    }

    fn clear_subject(&self, subject_id: &str) -> Result<(), StoreError> {
        let mut guard = self.by_subject.write().map_err(|_| StoreError::Poisoned)?;
        guard.remove(subject_id);
        Ok(())
    }
}
