//! Scheduled QA aggregation.
//!
//! Runs one aggregation pass over every team on a fixed interval (nightly
//! by default). Request-triggered runs share the same [`Aggregator`], whose
//! run lock keeps the two from interleaving.

use std::sync::Arc;

use qalab_pipeline::Aggregator;
use tokio::time::MissedTickBehavior;
use tokio_util::sync::CancellationToken;

use crate::config::AggregationConfig;

/// Run the aggregation loop until `cancel` is triggered.
///
/// A failed pass is logged; the next tick repairs whatever it left behind.
pub async fn run(aggregator: Arc<Aggregator>, config: AggregationConfig, cancel: CancellationToken) {
    tracing::info!(
        interval_secs = config.interval.as_secs(),
        on_startup = config.on_startup,
        "Scheduled aggregation job started"
    );

    let mut interval = tokio::time::interval(config.interval);
    interval.set_missed_tick_behavior(MissedTickBehavior::Delay);

    if !config.on_startup {
        // The first tick completes immediately.
        interval.tick().await;
    }

    loop {
        tokio::select! {
            _ = cancel.cancelled() => {
                tracing::info!("Scheduled aggregation job stopping");
                break;
            }
            _ = interval.tick() => {
                match aggregator.run().await {
                    Ok(outcome) => {
                        tracing::info!(
                            teams_processed = outcome.teams_processed,
                            teams_failed = outcome.teams_failed.len(),
                            reports_removed = outcome.reports_removed,
                            "Scheduled aggregation: pass complete"
                        );
                    }
                    Err(e) => {
                        tracing::error!(error = %e, "Scheduled aggregation: pass failed");
                    }
                }
            }
        }
    }
}
