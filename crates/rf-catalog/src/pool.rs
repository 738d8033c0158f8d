//! Fixed-size worker pool with a reusable drain barrier.

use std::collections::VecDeque;
use std::panic::{catch_unwind, AssertUnwindSafe};
use std::sync::Arc;
use std::thread::JoinHandle;

use parking_lot::{Condvar, Mutex};

type Job = Box<dyn FnOnce() + Send + 'static>;

#[derive(Default)]
struct Queue {
    jobs: VecDeque<Job>,
    active: usize,
    shutdown: bool,
}

#[derive(Default)]
struct Shared {
    queue: Mutex<Queue>,
    /// Signalled when a job is queued or shutdown begins.
    work: Condvar,
    /// Signalled when the pool may have become idle.
    idle: Condvar,
}

/// A pool of `N` threads pulling jobs from a shared FIFO queue.
///
/// A panicking job is caught and logged; the worker carries on with the next
/// job. Dropping the pool finishes queued jobs, then joins the threads.
pub struct WorkerPool {
    shared: Arc<Shared>,
    workers: Vec<JoinHandle<()>>,
}

impl WorkerPool {
    /// Start `size` workers. A size of zero is treated as one.
    pub fn new(size: usize) -> Self {
        let size = size.max(1);
        let shared = Arc::new(Shared::default());

        let workers = (0..size)
            .map(|i| {
                let shared = Arc::clone(&shared);
                std::thread::Builder::new()
                    .name(format!("rf-worker-{i}"))
                    .spawn(move || worker_loop(&shared))
            })
            .filter_map(|spawned| match spawned {
                Ok(handle) => Some(handle),
                Err(e) => {
                    tracing::error!("Failed to spawn worker thread: {e}");
                    None
                }
            })
            .collect::<Vec<_>>();

        tracing::debug!(workers = workers.len(), "Worker pool started");
        Self { shared, workers }
    }

    /// Number of worker threads.
    pub fn size(&self) -> usize {
        self.workers.len()
    }

    /// Queue a job and return immediately.
    ///
    /// If no worker thread could be started the job runs on the caller.
    pub fn enqueue<F>(&self, job: F)
    where
        F: FnOnce() + Send + 'static,
    {
        if self.workers.is_empty() {
            run_isolated(Box::new(job));
            return;
        }
        self.shared.queue.lock().jobs.push_back(Box::new(job));
        self.shared.work.notify_one();
    }

    /// Block until the queue is empty and no job is running.
    ///
    /// Can be called any number of times; jobs may be queued again afterwards.
    pub fn wait_all(&self) {
        let mut q = self.shared.queue.lock();
        while !q.jobs.is_empty() || q.active > 0 {
            self.shared.idle.wait(&mut q);
        }
    }
}

fn worker_loop(shared: &Shared) {
    loop {
        let job = {
            let mut q = shared.queue.lock();
            loop {
                if let Some(job) = q.jobs.pop_front() {
                    q.active += 1;
                    break job;
                }
                if q.shutdown {
                    return;
                }
                shared.work.wait(&mut q);
            }
        };

        run_isolated(job);

        let mut q = shared.queue.lock();
        q.active -= 1;
        if q.active == 0 && q.jobs.is_empty() {
            shared.idle.notify_all();
        }
    }
}

fn run_isolated(job: Job) {
    if catch_unwind(AssertUnwindSafe(job)).is_err() {
        tracing::error!("Worker job panicked; continuing with remaining jobs");
    }
}

impl Drop for WorkerPool {
    fn drop(&mut self) {
        self.shared.queue.lock().shutdown = true;
        self.shared.work.notify_all();
        for handle in self.workers.drain(..) {
            if handle.join().is_err() {
                tracing::error!("Worker thread terminated abnormally");
            }
        }
    }
}

impl std::fmt::Debug for WorkerPool {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("WorkerPool")
            .field("size", &self.workers.len())
            .finish()
    }
}
