use std::sync::Arc;

use tokio::sync::{Mutex, mpsc};
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;

use super::{TaskOrchestrator, TranscriptionJob};

/// One member of the fixed-size pool draining the transcription queue. Each
/// worker owns a task from dequeue to terminal state.
pub struct TranscriptionWorker {
    id: usize,
    receiver: Arc<Mutex<mpsc::Receiver<TranscriptionJob>>>,
    orchestrator: Arc<TaskOrchestrator>,
    shutdown: CancellationToken,
}

impl TranscriptionWorker {
    pub fn new(
        id: usize,
        receiver: Arc<Mutex<mpsc::Receiver<TranscriptionJob>>>,
        orchestrator: Arc<TaskOrchestrator>,
        shutdown: CancellationToken,
    ) -> Self {
        Self {
            id,
            receiver,
            orchestrator,
            shutdown,
        }
    }

    pub async fn run(self) {
        tracing::info!(worker = self.id, "Transcription worker started");
        loop {
            let job = tokio::select! {
                biased;
                _ = self.shutdown.cancelled() => break,
                job = self.next_job() => job,
            };
            let Some(job) = job else {
                tracing::info!(worker = self.id, "Transcription worker stopped: queue closed");
                return;
            };
            self.orchestrator.execute(job).await;
        }
        tracing::info!(worker = self.id, "Transcription worker stopped: shutdown");
    }

    async fn next_job(&self) -> Option<TranscriptionJob> {
        self.receiver.lock().await.recv().await
    }
}

/// Handles of a running pool plus the queue it drains.
pub struct WorkerPool {
    handles: Vec<JoinHandle<()>>,
    receiver: Arc<Mutex<mpsc::Receiver<TranscriptionJob>>>,
    orchestrator: Arc<TaskOrchestrator>,
}

impl WorkerPool {
    pub fn size(&self) -> usize {
        self.handles.len()
    }

    /// Waits for every worker to finish its current task, then closes the
    /// queue and fails the jobs still buffered in it. Returns how many were
    /// failed that way.
    pub async fn join(self) -> usize {
        for handle in self.handles {
            if let Err(e) = handle.await {
                tracing::error!(error = %e, "Worker task panicked");
            }
        }

        let mut receiver = self.receiver.lock().await;
        receiver.close();
        let mut abandoned = 0;
        while let Ok(job) = receiver.try_recv() {
            self.orchestrator.abandon(job).await;
            abandoned += 1;
        }
        if abandoned > 0 {
            tracing::warn!(abandoned, "Queued tasks failed at shutdown");
        }
        abandoned
    }
}

pub fn spawn_worker_pool(
    count: usize,
    receiver: mpsc::Receiver<TranscriptionJob>,
    orchestrator: Arc<TaskOrchestrator>,
    shutdown: CancellationToken,
) -> WorkerPool {
    let receiver = Arc::new(Mutex::new(receiver));
    let handles = (0..count.max(1))
        .map(|id| {
            let worker = TranscriptionWorker::new(
                id,
                receiver.clone(),
                orchestrator.clone(),
                shutdown.clone(),
            );
            tokio::spawn(worker.run())
        })
        .collect();
    WorkerPool {
        handles,
        receiver,
        orchestrator,
    }
}
