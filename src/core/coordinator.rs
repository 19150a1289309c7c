//! Bounded worker pool that scores candidates concurrently.
//!
//! One producer feeds a bounded candidate queue, `workers` tasks share the
//! receiving end and score candidates, and a single collector task owns the
//! [`BatchReport`]. Workers never share mutable state: each one sends a typed
//! [`ScoreOutcome`] and the collector aggregates.
//!
//! Records end up in the order the collector receives them. With more than
//! one worker that order is not the candidate order.

use crate::domain::model::{BatchReport, Candidate, ScoreOutcome, ScoreRecord};
use crate::domain::ports::Scorer;
use crate::utils::error::{EtlError, Result};
use std::sync::Arc;
use tokio::sync::{mpsc, Mutex};
use tokio::task::JoinSet;
use tracing::{debug, info};

pub const DEFAULT_WORKERS: usize = 100;
pub const CANDIDATE_QUEUE_CAPACITY: usize = 100;
pub const OUTCOME_QUEUE_CAPACITY: usize = 1000;
pub const PROGRESS_INTERVAL: usize = 100;

/// Apply the score threshold to one scoring attempt.
pub fn classify(name: &str, scored: Option<ScoreRecord>, threshold: Option<f64>) -> ScoreOutcome {
    match scored {
        None => ScoreOutcome::Failed {
            name: name.to_string(),
        },
        Some(record) => match threshold {
            Some(min) if record.score < min => ScoreOutcome::Rejected {
                name: record.name,
                score: record.score,
            },
            _ => ScoreOutcome::Accepted(record),
        },
    }
}

pub struct Coordinator<S: Scorer + 'static> {
    scorer: Arc<S>,
    workers: usize,
    threshold: Option<f64>,
}

impl<S: Scorer + 'static> Coordinator<S> {
    pub fn new(scorer: Arc<S>, workers: usize) -> Self {
        Self {
            scorer,
            workers: workers.max(1),
            threshold: None,
        }
    }

    pub fn with_threshold(mut self, threshold: Option<f64>) -> Self {
        self.threshold = threshold;
        self
    }

    /// Score every candidate and return the aggregate.
    ///
    /// The first fatal scorer error stops the producer and every worker and is
    /// returned; soft failures only show up in [`BatchReport::failed`].
    pub async fn run(&self, candidates: Vec<Candidate>) -> Result<BatchReport> {
        let total = candidates.len();
        info!(
            workers = self.workers,
            threshold = ?self.threshold,
            "Scoring {} candidates",
            total
        );

        let (candidate_tx, candidate_rx) = mpsc::channel::<Candidate>(CANDIDATE_QUEUE_CAPACITY);
        let candidate_rx = Arc::new(Mutex::new(candidate_rx));
        let (outcome_tx, mut outcome_rx) = mpsc::channel::<ScoreOutcome>(OUTCOME_QUEUE_CAPACITY);

        let collector = tokio::spawn(async move {
            let mut report = BatchReport::with_total(total);
            while let Some(outcome) = outcome_rx.recv().await {
                report.absorb(outcome);
            }
            report
        });

        let mut pool = JoinSet::new();
        for worker_id in 0..self.workers {
            pool.spawn(score_worker(
                worker_id,
                Arc::clone(&candidate_rx),
                outcome_tx.clone(),
                Arc::clone(&self.scorer),
                self.threshold,
            ));
        }
        // 只留 worker 手上的副本，全部結束時通道才會關閉
        drop(outcome_tx);
        drop(candidate_rx);

        let producer = tokio::spawn(async move {
            for (index, candidate) in candidates.into_iter().enumerate() {
                if index % PROGRESS_INTERVAL == 0 {
                    info!("{}/{} candidates have been dispatched", index, total);
                }
                if candidate_tx.send(candidate).await.is_err() {
                    break;
                }
            }
        });

        while let Some(joined) = pool.join_next().await {
            let failure = match joined {
                Ok(Ok(())) => continue,
                Ok(Err(e)) => e,
                Err(e) => EtlError::TaskError(e),
            };
            pool.abort_all();
            producer.abort();
            collector.abort();
            return Err(failure);
        }

        producer.await?;
        let report = collector.await?;
        info!(
            "Scoring finished: {} accepted, {} below threshold, {} failed",
            report.records.len(),
            report.rejected,
            report.failed.len()
        );
        Ok(report)
    }
}

async fn score_worker<S: Scorer>(
    worker_id: usize,
    queue: Arc<Mutex<mpsc::Receiver<Candidate>>>,
    outcomes: mpsc::Sender<ScoreOutcome>,
    scorer: Arc<S>,
    threshold: Option<f64>,
) -> Result<()> {
    loop {
        let next = queue.lock().await.recv().await;
        let Some(candidate) = next else {
            break;
        };

        let scored = scorer.score(&candidate).await?;
        let outcome = classify(candidate.as_str(), scored, threshold);
        if outcomes.send(outcome).await.is_err() {
            break;
        }
    }

    debug!(worker_id, "Worker drained the queue");
    Ok(())
}
