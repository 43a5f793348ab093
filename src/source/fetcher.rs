//! Fetch pool: a fixed set of worker threads pulling fetch jobs from a
//! crossbeam channel and publishing completions in whatever order they finish.
//!
//! Requests for a subreddit that is already in flight are coalesced.

#![allow(missing_docs)]
#![allow(clippy::cast_possible_truncation)]

use std::collections::HashSet;
use std::sync::Arc;
use std::thread::{self, JoinHandle};
use std::time::{Duration, Instant};

use crossbeam_channel::{Receiver, RecvTimeoutError, Sender, unbounded};
use parking_lot::Mutex;

use crate::core::errors::{Result, StatsError};
use crate::logger::diagnostics::{DiagnosticEvent, Diagnostics};
use crate::source::provider::{DataProvider, SubredditList, SubredditPayload};

#[derive(Debug, Clone, PartialEq, Eq)]
enum FetchJob {
    List,
    Subreddit(String),
}

/// Result of one fetch, delivered on the completion channel.
#[derive(Debug)]
pub enum FetchCompletion {
    List(Result<SubredditList>),
    Subreddit {
        name: String,
        result: Result<SubredditPayload>,
        duration_ms: u64,
    },
}

type InFlight = Arc<Mutex<HashSet<String>>>;

pub struct FetchPool {
    jobs: Option<Sender<FetchJob>>,
    completions: Receiver<FetchCompletion>,
    in_flight: InFlight,
    workers: Vec<JoinHandle<()>>,
}

impl FetchPool {
    /// Spawn `workers` threads serving requests against `provider`.
    pub fn spawn(
        provider: Arc<dyn DataProvider>,
        workers: usize,
        diagnostics: Diagnostics,
    ) -> Result<Self> {
        let (job_tx, job_rx) = unbounded::<FetchJob>();
        let (done_tx, done_rx) = unbounded::<FetchCompletion>();
        let in_flight: InFlight = Arc::new(Mutex::new(HashSet::new()));

        let mut handles = Vec::with_capacity(workers.max(1));
        for index in 0..workers.max(1) {
            let job_rx = job_rx.clone();
            let done_tx = done_tx.clone();
            let provider = Arc::clone(&provider);
            let in_flight = Arc::clone(&in_flight);
            let diagnostics = diagnostics.clone();
            let handle = thread::Builder::new()
                .name(format!("substats-fetch-{index}"))
                .spawn(move || {
                    worker_main(&job_rx, &done_tx, provider.as_ref(), &in_flight, &diagnostics);
                })
                .map_err(|e| StatsError::Runtime {
                    details: format!("failed to spawn fetch worker: {e}"),
                })?;
            handles.push(handle);
        }

        Ok(Self {
            jobs: Some(job_tx),
            completions: done_rx,
            in_flight,
            workers: handles,
        })
    }

    /// Queue a fetch of the subreddit list.
    pub fn request_list(&self) -> Result<()> {
        self.send(FetchJob::List)
    }

    /// Queue a fetch of `name`. Returns `false` when one is already in flight.
    pub fn request(&self, name: &str) -> Result<bool> {
        if !self.in_flight.lock().insert(name.to_string()) {
            return Ok(false);
        }
        if let Err(e) = self.send(FetchJob::Subreddit(name.to_string())) {
            self.in_flight.lock().remove(name);
            return Err(e);
        }
        Ok(true)
    }

    pub fn is_in_flight(&self, name: &str) -> bool {
        self.in_flight.lock().contains(name)
    }

    pub fn in_flight_count(&self) -> usize {
        self.in_flight.lock().len()
    }

    /// Next completion if one is ready.
    pub fn try_recv(&self) -> Option<FetchCompletion> {
        self.completions.try_recv().ok()
    }

    /// Wait up to `timeout` for the next completion.
    pub fn recv_timeout(&self, timeout: Duration) -> Result<Option<FetchCompletion>> {
        match self.completions.recv_timeout(timeout) {
            Ok(done) => Ok(Some(done)),
            Err(RecvTimeoutError::Timeout) => Ok(None),
            Err(RecvTimeoutError::Disconnected) => Err(StatsError::ChannelClosed {
                component: "fetch completions",
            }),
        }
    }

    /// Stop accepting jobs and wait for workers to drain.
    pub fn shutdown(mut self) {
        self.stop();
    }

    fn send(&self, job: FetchJob) -> Result<()> {
        self.jobs
            .as_ref()
            .ok_or(StatsError::ChannelClosed {
                component: "fetch jobs",
            })?
            .send(job)
            .map_err(|_| StatsError::ChannelClosed {
                component: "fetch jobs",
            })
    }

    fn stop(&mut self) {
        self.jobs = None;
        for handle in self.workers.drain(..) {
            let _ = handle.join();
        }
    }
}

impl Drop for FetchPool {
    fn drop(&mut self) {
        self.stop();
    }
}

fn worker_main(
    jobs: &Receiver<FetchJob>,
    done: &Sender<FetchCompletion>,
    provider: &dyn DataProvider,
    in_flight: &InFlight,
    diagnostics: &Diagnostics,
) {
    for job in jobs {
        let completion = match job {
            FetchJob::List => {
                let result = provider.fetch_subreddit_list();
                match &result {
                    Ok(list) => diagnostics.emit(DiagnosticEvent::SubredditListLoaded {
                        count: list.subs.len(),
                    }),
                    Err(e) => diagnostics.emit(DiagnosticEvent::fetch_failed("<list>", e)),
                }
                FetchCompletion::List(result)
            }
            FetchJob::Subreddit(name) => {
                let started = Instant::now();
                let result = provider.fetch_subreddit_data(&name);
                let duration_ms = started.elapsed().as_millis() as u64;
                match &result {
                    Ok(payload) => diagnostics.emit(DiagnosticEvent::SubredditFetched {
                        name: name.clone(),
                        users: payload.users.as_object().map_or(0, serde_json::Map::len),
                        duration_ms,
                    }),
                    Err(e) => diagnostics.emit(DiagnosticEvent::fetch_failed(name.clone(), e)),
                }
                in_flight.lock().remove(&name);
                FetchCompletion::Subreddit {
                    name,
                    result,
                    duration_ms,
                }
            }
        };
        if done.send(completion).is_err() {
            break;
        }
    }
}
