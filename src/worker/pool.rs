//! Worker pool management.

use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread::{self, JoinHandle};
use std::time::{Duration, Instant};

use crossbeam_channel::{bounded, Receiver, RecvTimeoutError, Sender};

use super::message::{SearchRequest, UnitMessage};
use super::unit::SearchUnit;

/// Capacity of the shared message channel.
const CHANNEL_CAPACITY: usize = 100;

/// Runs search units on their own threads and merges their messages.
pub struct WorkerPool {
    /// Number of units spawned
    num_units: usize,
    /// Unit thread handles (Option to allow taking during join)
    handles: Option<Vec<JoinHandle<()>>>,
    /// Channel receiver for unit messages
    message_rx: Receiver<UnitMessage>,
    /// Shared stop flag
    stop_flag: Arc<AtomicBool>,
    /// Latest attempt counter reported by each unit
    attempts: HashMap<usize, u64>,
    /// Matches received so far
    matches: u64,
    /// Set once every unit has exited and the channel is drained
    disconnected: bool,
    /// Start time
    start_time: Instant,
}

impl WorkerPool {
    /// Spawns one unit per request.
    pub fn new(requests: Vec<SearchRequest>) -> Self {
        let (message_tx, message_rx) = bounded(CHANNEL_CAPACITY);
        let stop_flag = Arc::new(AtomicBool::new(false));
        let num_units = requests.len();

        let handles = Self::spawn_units(requests, message_tx, stop_flag.clone());
        log::info!("spawned {} search unit(s)", num_units);

        Self {
            num_units,
            handles: Some(handles),
            message_rx,
            stop_flag,
            attempts: HashMap::new(),
            matches: 0,
            disconnected: false,
            start_time: Instant::now(),
        }
    }

    /// Spawns `num_units` copies of a search request with ids `0..num_units`.
    pub fn spawn_search(num_units: usize, template: &SearchRequest) -> Self {
        let requests = (0..num_units)
            .map(|id| template.clone().with_unit_id(id))
            .collect();
        Self::new(requests)
    }

    /// Splits a batch request's `count` across `num_units` units.
    pub fn spawn_batch(num_units: usize, template: &SearchRequest) -> Self {
        let num_units = num_units.max(1);
        let share = template.count / num_units;
        let extra = template.count % num_units;
        let requests = (0..num_units)
            .map(|id| {
                let mut request = template.clone().with_unit_id(id);
                request.count = share + usize::from(id < extra);
                request
            })
            .collect();
        Self::new(requests)
    }

    /// Spawns unit threads. The original sender is dropped here so the
    /// channel disconnects once every unit has finished.
    fn spawn_units(
        requests: Vec<SearchRequest>,
        message_tx: Sender<UnitMessage>,
        stop_flag: Arc<AtomicBool>,
    ) -> Vec<JoinHandle<()>> {
        requests
            .into_iter()
            .map(|request| {
                let message_tx = message_tx.clone();
                let stop_flag = stop_flag.clone();

                thread::Builder::new()
                    .name(format!("vanity-unit-{}", request.unit_id))
                    .spawn(move || {
                        SearchUnit::new(request, message_tx, stop_flag).run();
                    })
                    .expect("Failed to spawn unit thread")
            })
            .collect()
    }

    /// Waits for the next message with a timeout.
    ///
    /// Returns `None` on timeout or once all units have exited; use
    /// [`WorkerPool::finished`] to tell the two apart.
    pub fn recv_timeout(&mut self, timeout: Duration) -> Option<UnitMessage> {
        match self.message_rx.recv_timeout(timeout) {
            Ok(message) => Some(self.record(message)),
            Err(RecvTimeoutError::Timeout) => None,
            Err(RecvTimeoutError::Disconnected) => {
                self.disconnected = true;
                None
            }
        }
    }

    /// Returns an iterator over messages, blocking until all units exit.
    pub fn messages(&mut self) -> impl Iterator<Item = UnitMessage> + '_ {
        std::iter::from_fn(move || match self.message_rx.recv() {
            Ok(message) => Some(self.record(message)),
            Err(_) => {
                self.disconnected = true;
                None
            }
        })
    }

    fn record(&mut self, message: UnitMessage) -> UnitMessage {
        match &message {
            UnitMessage::Progress(progress) => {
                self.attempts.insert(progress.unit_id, progress.attempts);
            }
            UnitMessage::Match(result) => {
                self.matches += 1;
                if let (Some(unit_id), Some(attempts)) = (result.unit_id, result.attempts) {
                    self.attempts.insert(unit_id, attempts);
                }
            }
            UnitMessage::BatchResult(batch) => {
                self.attempts.insert(batch.unit_id, batch.entries.len() as u64);
            }
            UnitMessage::Error(report) => {
                log::warn!("unit {:?} reported: {}", message.unit_id(), report.message);
            }
        }
        message
    }

    /// True once every unit has exited and all messages were received.
    pub fn finished(&self) -> bool {
        self.disconnected
    }

    /// Signals all units to stop at their next yield point.
    pub fn stop(&self) {
        self.stop_flag.store(true, Ordering::Relaxed);
    }

    /// Stops and waits for all units to complete.
    pub fn join(mut self) {
        self.shutdown();
    }

    fn shutdown(&mut self) {
        self.stop();
        // Dropping the receiver unblocks units waiting on a full channel.
        drop(std::mem::replace(
            &mut self.message_rx,
            crossbeam_channel::never(),
        ));
        if let Some(handles) = self.handles.take() {
            log::info!("stopping {} search unit(s)", handles.len());
            for handle in handles {
                let _ = handle.join();
            }
        }
    }

    /// Returns the number of units.
    pub fn num_units(&self) -> usize {
        self.num_units
    }

    /// Returns the total attempts reported across all units.
    pub fn total_attempts(&self) -> u64 {
        self.attempts.values().sum()
    }

    /// Returns the total matches received.
    pub fn total_matches(&self) -> u64 {
        self.matches
    }

    /// Returns the elapsed time since the pool was created.
    pub fn elapsed(&self) -> Duration {
        self.start_time.elapsed()
    }

    /// Returns the reported search rate (attempts per second).
    pub fn attempts_per_second(&self) -> f64 {
        let elapsed = self.elapsed().as_secs_f64();
        if elapsed > 0.0 {
            self.total_attempts() as f64 / elapsed
        } else {
            0.0
        }
    }

    /// Returns a clone of the stop flag for external use (e.g., signal handlers).
    pub fn stop_flag_clone(&self) -> Arc<AtomicBool> {
        self.stop_flag.clone()
    }

    /// Returns true if the pool has been signaled to stop.
    pub fn is_stopped(&self) -> bool {
        self.stop_flag.load(Ordering::Relaxed)
    }
}

impl Drop for WorkerPool {
    fn drop(&mut self) {
        self.shutdown();
    }
}
