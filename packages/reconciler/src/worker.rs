//! # Worker Offloader
//!
//! Runs the optimizer for large batches on a background thread.
//!
//! The worker only ever sees a JSON encoded copy of the batch and answers
//! with a JSON encoded optimized batch. It never touches the live tree, and
//! its output is identical to calling [`optimize_patches`] inline.
//!
//! Replies carry the id of the request they answer. Replies for a request
//! the renderer no longer waits on (after `clear` or `destroy`) are dropped.

use crate::errors::WorkerError;
use crate::optimizer::optimize_patches;
use crate::patch::Patch;
use std::sync::mpsc::{channel, Receiver, RecvTimeoutError, Sender, TryRecvError};
use std::thread::{self, JoinHandle};
use std::time::{Duration, Instant};
use tracing::debug;

struct WorkerRequest {
    id: u64,
    payload: Vec<u8>,
}

struct WorkerReply {
    id: u64,
    result: Result<Vec<u8>, String>,
}

pub struct OptimizeWorker {
    requests: Option<Sender<WorkerRequest>>,
    replies: Receiver<WorkerReply>,
    handle: Option<JoinHandle<()>>,
    next_id: u64,
}

impl OptimizeWorker {
    pub fn spawn() -> Result<Self, WorkerError> {
        let (request_tx, request_rx) = channel::<WorkerRequest>();
        let (reply_tx, reply_rx) = channel::<WorkerReply>();

        let handle = thread::Builder::new()
            .name("arbor-optimizer".to_string())
            .spawn(move || {
                for request in request_rx {
                    let result = optimize_serialized(&request.payload).map_err(|e| e.to_string());
                    let reply = WorkerReply {
                        id: request.id,
                        result,
                    };
                    if reply_tx.send(reply).is_err() {
                        break;
                    }
                }
            })?;

        Ok(Self {
            requests: Some(request_tx),
            replies: reply_rx,
            handle: Some(handle),
            next_id: 0,
        })
    }

    /// Hand a batch to the worker; returns the request id
    pub fn submit(&mut self, batch: &[Patch]) -> Result<u64, WorkerError> {
        let payload = serde_json::to_vec(batch)?;
        let requests = self.requests.as_ref().ok_or(WorkerError::Disconnected)?;

        self.next_id += 1;
        let id = self.next_id;
        requests
            .send(WorkerRequest { id, payload })
            .map_err(|_| WorkerError::Disconnected)?;
        Ok(id)
    }

    /// Non-blocking check for the reply to `id`
    pub fn try_result(&self, id: u64) -> Option<Result<Vec<Patch>, WorkerError>> {
        loop {
            match self.replies.try_recv() {
                Ok(reply) if reply.id == id => return Some(decode(reply)),
                Ok(reply) => {
                    debug!(request = reply.id, "Discarding stale worker result");
                }
                Err(TryRecvError::Empty) => return None,
                Err(TryRecvError::Disconnected) => return Some(Err(WorkerError::Disconnected)),
            }
        }
    }

    /// Block until the reply to `id` arrives or `timeout` passes
    pub fn wait(&self, id: u64, timeout: Duration) -> Result<Vec<Patch>, WorkerError> {
        let deadline = Instant::now() + timeout;
        loop {
            let remaining = deadline.saturating_duration_since(Instant::now());
            match self.replies.recv_timeout(remaining) {
                Ok(reply) if reply.id == id => return decode(reply),
                Ok(reply) => {
                    debug!(request = reply.id, "Discarding stale worker result");
                }
                Err(RecvTimeoutError::Timeout) => return Err(WorkerError::Timeout(timeout)),
                Err(RecvTimeoutError::Disconnected) => return Err(WorkerError::Disconnected),
            }
        }
    }

    /// Stop the thread; queued requests are abandoned
    pub fn shutdown(&mut self) {
        self.requests.take();
        if let Some(handle) = self.handle.take() {
            if handle.join().is_err() {
                debug!("Optimizer worker thread panicked");
            }
        }
    }
}

impl Drop for OptimizeWorker {
    fn drop(&mut self) {
        self.shutdown();
    }
}

/// The worker's pure function: encoded batch in, encoded optimized batch out
pub fn optimize_serialized(payload: &[u8]) -> Result<Vec<u8>, serde_json::Error> {
    let batch: Vec<Patch> = serde_json::from_slice(payload)?;
    serde_json::to_vec(&optimize_patches(batch))
}

fn decode(reply: WorkerReply) -> Result<Vec<Patch>, WorkerError> {
    let payload = reply.result.map_err(WorkerError::Remote)?;
    Ok(serde_json::from_slice(&payload)?)
}
