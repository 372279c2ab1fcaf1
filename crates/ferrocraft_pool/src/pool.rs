//! Fixed-size worker pool over a shared FIFO of boxed closures.
//!
//! One mutex guards the queue and the running flag; one condvar parks idle
//! workers. Spurious wake-ups are harmless because the loop retests the
//! queue on every iteration.

use std::sync::Arc;
use std::thread::{self, JoinHandle};

use parking_lot::{Condvar, Mutex};
use tracing::info;

use crate::ring::RingDeque;

type Job = Box<dyn FnOnce() + Send + 'static>;

struct PoolState {
    queue:   RingDeque<Job>,
    running: bool,
}

struct PoolShared {
    state:      Mutex<PoolState>,
    work_ready: Condvar,
}

/// Worker threads pull jobs in FIFO order; beyond that, execution across
/// workers is unordered. Jobs own their captures and are responsible for
/// their own failures; the pool never inspects outcomes.
pub struct TaskPool {
    shared:  Arc<PoolShared>,
    workers: Vec<JoinHandle<()>>,
}

impl TaskPool {
    /// Spawns `n_workers` worker threads; 0 means one per CPU.
    #[must_use]
    pub fn new(n_workers: usize) -> Self {
        let n_workers = if n_workers == 0 { num_cpus::get() } else { n_workers };

        let shared = Arc::new(PoolShared {
            state:      Mutex::new(PoolState {
                queue:   RingDeque::new(),
                running: true,
            }),
            work_ready: Condvar::new(),
        });

        let mut workers = Vec::with_capacity(n_workers);
        for id in 0..n_workers {
            let shared = Arc::clone(&shared);
            let handle = thread::Builder::new()
                .name(format!("pool-{id}"))
                .spawn(move || worker_loop(&shared))
                .expect("spawning pool worker failed");
            workers.push(handle);
        }

        info!("[STARTUP] Task pool created with {} workers", n_workers);
        Self { shared, workers }
    }

    #[must_use]
    pub fn worker_count(&self) -> usize {
        self.workers.len()
    }

    /// Enqueues a job and wakes one idle worker.
    pub fn execute<F>(&self, job: F)
    where
        F: FnOnce() + Send + 'static,
    {
        {
            let mut state = self.shared.state.lock();
            state.queue.push_back(Box::new(job));
        }
        self.shared.work_ready.notify_one();
    }

    /// Stops accepting the wait loop, wakes every worker and joins them.
    /// Jobs already queued are drained before the workers exit.
    pub fn shutdown(&mut self) {
        {
            let mut state = self.shared.state.lock();
            if !state.running {
                return;
            }
            state.running = false;
        }
        self.shared.work_ready.notify_all();

        for handle in self.workers.drain(..) {
            let _ = handle.join();
        }
        info!("[SHUTDOWN] Task pool workers joined");
    }
}

impl Drop for TaskPool {
    fn drop(&mut self) {
        self.shutdown();
    }
}

fn worker_loop(shared: &PoolShared) {
    let mut state = shared.state.lock();
    loop {
        if let Some(job) = state.queue.pop_front() {
            drop(state);
            job();
            state = shared.state.lock();
            continue;
        }
        if !state.running {
            break;
        }
        shared.work_ready.wait(&mut state);
    }
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicUsize, Ordering};

    use super::*;

    #[test]
    fn every_task_runs_exactly_once() {
        let mut pool = TaskPool::new(4);
        let counter = Arc::new(AtomicUsize::new(0));

        for _ in 0..100 {
            let c = Arc::clone(&counter);
            pool.execute(move || {
                c.fetch_add(1, Ordering::SeqCst);
            });
        }

        pool.shutdown();
        assert_eq!(counter.load(Ordering::SeqCst), 100);
    }

    #[test]
    fn single_worker_dequeues_fifo() {
        let mut pool = TaskPool::new(1);
        let order = Arc::new(Mutex::new(Vec::new()));

        for i in 0..32 {
            let order = Arc::clone(&order);
            pool.execute(move || {
                order.lock().push(i);
            });
        }

        pool.shutdown();
        assert_eq!(*order.lock(), (0..32).collect::<Vec<i32>>());
    }

    #[test]
    fn zero_workers_defaults_to_cpu_count() {
        let pool = TaskPool::new(0);
        assert!(pool.worker_count() >= 1);
    }

    #[test]
    fn shutdown_is_idempotent() {
        let mut pool = TaskPool::new(2);
        pool.shutdown();
        pool.shutdown();
        assert_eq!(pool.worker_count(), 0);
    }
}
