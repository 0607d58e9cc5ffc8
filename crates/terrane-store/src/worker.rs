//! Background thread for swap batches.
//!
//! The worker receives swap jobs over a crossbeam channel, runs the
//! batch, and sends the [`SwapReport`] back via a bounded(1) reply
//! channel. Names are resolved on the caller's thread, so the worker only
//! ever holds property handles, never the store itself.

use std::sync::Arc;
use std::thread::{self, JoinHandle};

use crossbeam_channel::{Receiver, Sender};
use tracing::debug;

use crate::budget::MemoryBudget;
use crate::config::SwapPolicy;
use crate::error::StoreError;
use crate::store::PropertyStore;
use crate::swap::{run_batch, SwapDirection, SwapReport, SwapTarget};

struct SwapJob {
    direction: SwapDirection,
    targets: Vec<SwapTarget>,
    policy: SwapPolicy,
    budget: Arc<MemoryBudget>,
    reply: Sender<SwapReport>,
}

/// Pending result of a submitted swap batch.
#[derive(Debug)]
pub struct SwapTicket {
    reply: Receiver<SwapReport>,
}

impl SwapTicket {
    /// Block until the batch finishes.
    pub fn wait(self) -> Result<SwapReport, StoreError> {
        self.reply.recv().map_err(|_| StoreError::WorkerUnavailable)
    }

    /// The report, if the batch has already finished.
    pub fn try_wait(&self) -> Option<SwapReport> {
        self.reply.try_recv().ok()
    }
}

/// A dedicated thread that performs swap batches off the caller's thread.
///
/// Dropping the worker closes its job channel and joins the thread after
/// queued batches finish.
#[derive(Debug)]
pub struct SwapWorker {
    jobs: Option<Sender<SwapJob>>,
    handle: Option<JoinHandle<()>>,
}

impl SwapWorker {
    /// Start the worker thread.
    pub fn spawn() -> Result<Self, StoreError> {
        let (tx, rx) = crossbeam_channel::unbounded::<SwapJob>();
        let handle = thread::Builder::new()
            .name("terrane-swap".into())
            .spawn(move || worker_loop(rx))?;
        Ok(Self {
            jobs: Some(tx),
            handle: Some(handle),
        })
    }

    /// Queue a batch moving `names` of `store` to disk.
    pub fn submit_to_disk<S: AsRef<str>>(
        &self,
        store: &PropertyStore,
        names: &[S],
    ) -> Result<SwapTicket, StoreError> {
        self.submit(SwapDirection::ToDisk, store, names)
    }

    /// Queue a batch moving `names` of `store` back into memory.
    pub fn submit_to_ram<S: AsRef<str>>(
        &self,
        store: &PropertyStore,
        names: &[S],
    ) -> Result<SwapTicket, StoreError> {
        self.submit(SwapDirection::ToRam, store, names)
    }

    fn submit<S: AsRef<str>>(
        &self,
        direction: SwapDirection,
        store: &PropertyStore,
        names: &[S],
    ) -> Result<SwapTicket, StoreError> {
        let jobs = self.jobs.as_ref().ok_or(StoreError::WorkerUnavailable)?;
        let (reply, rx) = crossbeam_channel::bounded(1);
        jobs.send(SwapJob {
            direction,
            targets: store.resolve(names),
            policy: store.config().swap_policy,
            budget: Arc::clone(store.budget()),
            reply,
        })
        .map_err(|_| StoreError::WorkerUnavailable)?;
        Ok(SwapTicket { reply: rx })
    }
}

impl Drop for SwapWorker {
    fn drop(&mut self) {
        self.jobs.take();
        if let Some(handle) = self.handle.take() {
            let _ = handle.join();
        }
    }
}

fn worker_loop(jobs: Receiver<SwapJob>) {
    while let Ok(job) = jobs.recv() {
        let report = run_batch(job.direction, job.targets, job.policy, &job.budget);
        // The caller may have dropped its ticket.
        let _ = job.reply.send(report);
    }
    debug!("swap worker exiting");
}
