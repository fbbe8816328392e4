//! Ingestion glue: score a snapshot, persist the insights, pick out alerts.

use chrono::{DateTime, Utc};
use serde::Serialize;
use vitals_core::{EngineConfig, RiskInsight, VitalsSnapshot};

use crate::engine::{analyze_at, urgent_insights};
use crate::store::InsightStore;

/// Outcome of ingesting one snapshot.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Assessment {
    pub insights: Vec<RiskInsight>,
    /// Subset of `insights` that needs urgent attention.
    pub alerts: Vec<RiskInsight>,
}

impl Assessment {
    pub fn has_alerts(&self) -> bool {
        !self.alerts.is_empty()
    }

    /// Payloads for the alerting collaborator, one per urgent insight.
    pub fn alert_messages(&self) -> Vec<String> {
        self.alerts
            .iter()
            .map(|insight| format!("{}: {}", insight.condition, insight.recommendation))
            .collect()
    }
}

/// Score and persist a snapshot, stamping insights with the current time.
///
/// # Errors
/// Returns the store's error if persisting any insight fails. Insights saved
/// before the failure stay saved; retrying is left to the caller.
pub fn ingest<S: InsightStore>(
    snapshot: &VitalsSnapshot,
    store: &S,
    config: &EngineConfig,
) -> Result<Assessment, S::Error> {
    ingest_at(snapshot, store, config, Utc::now())
}

pub fn ingest_at<S: InsightStore>(
    snapshot: &VitalsSnapshot,
    store: &S,
    config: &EngineConfig,
    at: DateTime<Utc>,
) -> Result<Assessment, S::Error> {
    let insights = analyze_at(snapshot, config, at);

    for insight in &insights {
        if let Err(err) = store.save(insight) {
            tracing::warn!(
                subject = %insight.subject_id,
                condition = %insight.condition,
                "Failed to save insight: {err}"
            );
            return Err(err);
        }
    }

    let alerts: Vec<RiskInsight> = urgent_insights(&insights, config)
        .into_iter()
        .cloned()
        .collect();

    if !alerts.is_empty() {
        tracing::info!(
            subject = %snapshot.subject_id,
            alerts = alerts.len(),
            "Urgent health insights raised"
        );
    }

    Ok(Assessment { insights, alerts })
}
