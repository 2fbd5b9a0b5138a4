use std::sync::Arc;

use image::DynamicImage;
use tokio::{sync::watch, task::JoinHandle};
use tracing::{info, warn};

use crate::{
    error::{Result, TraceError},
    pipeline::Pipeline,
    types::TraceOutcome,
};

/// Runs traces off the async executor so the caller stays responsive.
#[derive(Clone)]
pub struct TraceWorker {
    pipeline: Arc<Pipeline>,
}

/// A trace in flight. The outcome is handed back exactly once, through `join`.
pub struct TraceHandle {
    progress: watch::Receiver<f64>,
    task: JoinHandle<Result<TraceOutcome>>,
}

impl TraceWorker {
    pub fn new(pipeline: Pipeline) -> Self {
        Self {
            pipeline: Arc::new(pipeline),
        }
    }

    pub fn pipeline(&self) -> &Pipeline {
        &self.pipeline
    }

    /// Start tracing `image` on the blocking pool. Must be called from within
    /// a Tokio runtime.
    pub fn spawn(&self, image: DynamicImage) -> TraceHandle {
        let (sender, receiver) = watch::channel(0.0);
        let pipeline = Arc::clone(&self.pipeline);

        let task = tokio::task::spawn_blocking(move || {
            let outcome = pipeline.trace_with_progress(&image, |fraction| {
                sender.send_replace(fraction);
            });
            match &outcome {
                Ok(outcome) => info!(
                    polylines = outcome.polylines.len(),
                    points = outcome.point_count(),
                    "trace finished"
                ),
                Err(error) => warn!(%error, "trace failed"),
            }
            outcome
        });

        TraceHandle {
            progress: receiver,
            task,
        }
    }

    /// Trace and wait for the outcome
    pub async fn run(&self, image: DynamicImage) -> Result<TraceOutcome> {
        self.spawn(image).join().await
    }
}

impl TraceHandle {
    /// Latest reported progress, in `[0, 1]`
    pub fn progress(&self) -> f64 {
        *self.progress.borrow()
    }

    /// Receiver for observing progress updates as they happen
    pub fn subscribe(&self) -> watch::Receiver<f64> {
        self.progress.clone()
    }

    pub fn is_finished(&self) -> bool {
        self.task.is_finished()
    }

    pub async fn join(self) -> Result<TraceOutcome> {
        self.task
            .await
            .map_err(|error| TraceError::Worker(error.to_string()))?
    }
}
