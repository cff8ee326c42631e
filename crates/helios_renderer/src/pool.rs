//! A fixed-size worker pool over a FIFO job queue.

use std::collections::VecDeque;
use std::sync::{Arc, Condvar, Mutex};
use std::thread::{self, JoinHandle};

type Job = Box<dyn FnOnce() + Send + 'static>;

struct State {
    jobs: VecDeque<Job>,
    stop: bool,
}

struct Shared {
    state: Mutex<State>,
    available: Condvar,
}

/// A pool of worker threads consuming one unbounded FIFO job queue.
///
/// Workers sleep on a condition variable while the queue is empty. Dropping
/// the pool sets the stop flag, wakes every worker and joins them; queued
/// jobs are drained first and no job is interrupted mid-run.
pub struct WorkerPool {
    shared: Arc<Shared>,
    workers: Vec<JoinHandle<()>>,
}

impl WorkerPool {
    /// Spawn `workers` threads.
    pub fn new(workers: usize) -> Self {
        let shared = Arc::new(Shared {
            state: Mutex::new(State {
                jobs: VecDeque::new(),
                stop: false,
            }),
            available: Condvar::new(),
        });

        let workers = (0..workers)
            .map(|id| {
                let shared = Arc::clone(&shared);
                thread::Builder::new()
                    .name(format!("render-{id}"))
                    .spawn(move || worker_loop(&shared))
                    .expect("failed to spawn render worker")
            })
            .collect();

        Self { shared, workers }
    }

    /// The number of worker threads.
    pub fn workers(&self) -> usize {
        self.workers.len()
    }

    /// Push a job onto the queue and wake one worker.
    pub fn enqueue<F: FnOnce() + Send + 'static>(&self, job: F) {
        let mut state = self.shared.state.lock().expect("worker pool poisoned");
        state.jobs.push_back(Box::new(job));
        drop(state);
        self.shared.available.notify_one();
    }
}

impl Drop for WorkerPool {
    fn drop(&mut self) {
        {
            let mut state = self.shared.state.lock().expect("worker pool poisoned");
            state.stop = true;
        }
        self.shared.available.notify_all();

        for worker in self.workers.drain(..) {
            let _ = worker.join();
        }
    }
}

fn worker_loop(shared: &Shared) {
    loop {
        let job = {
            let mut state = shared.state.lock().expect("worker pool poisoned");
            loop {
                if let Some(job) = state.jobs.pop_front() {
                    break job;
                }
                if state.stop {
                    return;
                }
                state = shared
                    .available
                    .wait(state)
                    .expect("worker pool poisoned");
            }
        };

        job();
    }
}
