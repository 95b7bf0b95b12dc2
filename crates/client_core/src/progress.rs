//! Simulated evaluation progress.
//!
//! The service reports nothing until an evaluation finishes, so the ticker
//! only produces perceived progress. It never reaches 100 on its own; the
//! workflow sets the final value once the call settles.

use std::time::Duration;

use rand::Rng;
use tokio::{
    sync::broadcast,
    task::JoinHandle,
    time::{interval_at, Instant, MissedTickBehavior},
};
use tracing::debug;

use crate::events::WorkflowEvent;

pub const COMPLETE: f64 = 100.0;

#[derive(Debug, Clone, Copy)]
pub struct ProgressConfig {
    pub interval: Duration,
    pub max_increment: f64,
    pub ceiling: f64,
}

impl Default for ProgressConfig {
    fn default() -> Self {
        Self {
            interval: Duration::from_millis(500),
            max_increment: 15.0,
            ceiling: 90.0,
        }
    }
}

pub fn advance(current: f64, increment: f64, ceiling: f64) -> f64 {
    (current + increment.max(0.0)).min(ceiling)
}

fn next_increment(max_increment: f64) -> f64 {
    if max_increment <= 0.0 {
        return 0.0;
    }
    rand::rng().random_range(0.0..=max_increment)
}

pub struct ProgressTicker {
    task: Option<JoinHandle<()>>,
}

impl ProgressTicker {
    pub fn start(config: ProgressConfig, events: broadcast::Sender<WorkflowEvent>) -> Self {
        let task = tokio::spawn(async move {
            let mut ticks = interval_at(Instant::now() + config.interval, config.interval);
            ticks.set_missed_tick_behavior(MissedTickBehavior::Delay);
            let mut progress = 0.0;
            loop {
                ticks.tick().await;
                progress = advance(progress, next_increment(config.max_increment), config.ceiling);
                let _ = events.send(WorkflowEvent::Progress(progress));
            }
        });
        Self { task: Some(task) }
    }

    /// Cancels the ticker. Once this returns no further progress is published.
    pub async fn stop(mut self) {
        if let Some(task) = self.task.take() {
            task.abort();
            let _ = task.await;
            debug!("evaluation progress ticker stopped");
        }
    }
}

impl Drop for ProgressTicker {
    fn drop(&mut self) {
        if let Some(task) = self.task.take() {
            task.abort();
        }
    }
}
