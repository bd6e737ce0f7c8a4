//! Detached work that outlives the request that started it.
//!
//! Revalidation fetches run here. Their results are only observable through
//! the store; callers never wait on them except through `settle`.

use std::future::Future;

use tokio::sync::Mutex;
use tokio::task::JoinSet;

#[derive(Default)]
pub struct BackgroundTasks {
    tasks: Mutex<JoinSet<()>>,
}

impl BackgroundTasks {
    pub fn new() -> Self {
        Self::default()
    }

    /// Spawn a detached task. Finished tasks are reaped on the way in.
    pub async fn spawn<F>(&self, task: F)
    where
        F: Future<Output = ()> + Send + 'static,
    {
        let mut tasks = self.tasks.lock().await;
        while let Some(result) = tasks.try_join_next() {
            log_join_error(result);
        }
        tasks.spawn(task);
    }

    /// Number of tasks not yet reaped.
    pub async fn pending(&self) -> usize {
        self.tasks.lock().await.len()
    }

    /// Wait for every task spawned so far.
    ///
    /// Tasks spawned while settling are picked up on the next call.
    pub async fn settle(&self) {
        let mut tasks = std::mem::take(&mut *self.tasks.lock().await);
        while let Some(result) = tasks.join_next().await {
            log_join_error(result);
        }
    }
}

fn log_join_error(result: Result<(), tokio::task::JoinError>) {
    if let Err(e) = result {
        tracing::warn!("background task ended abnormally: {e}");
    }
}
