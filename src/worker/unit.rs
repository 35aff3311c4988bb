//! A single search unit: batch generation or pattern search on one thread.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread;
use std::time::Duration;

use crossbeam_channel::Sender;

use crate::config::PerformanceConfig;
use crate::crypto::{AddressDeriver, KeyGenerator, PrivateKey};
use crate::error::Result;
use crate::matcher::Pattern;

use super::message::{BatchResult, ErrorReport, Progress, SearchMode, SearchRequest, UnitMessage};

/// Sizes of the sub-batches a batch of `count` addresses is split into.
pub fn sub_batches(count: usize, batch_size: usize) -> impl Iterator<Item = usize> {
    let batch_size = batch_size.max(1);
    (0..count)
        .step_by(batch_size)
        .map(move |start| batch_size.min(count - start))
}

enum KeySource {
    Fixed(PrivateKey),
    Random(KeyGenerator),
}

impl KeySource {
    #[inline]
    fn next_key(&mut self) -> Result<PrivateKey> {
        match self {
            KeySource::Fixed(key) => Ok(*key),
            KeySource::Random(generator) => generator.generate(),
        }
    }
}

/// Runs one [`SearchRequest`] and reports back over a channel.
///
/// A unit owns all of its derivation state. The only thing it shares is the
/// stop flag, which it checks at each yield point.
pub struct SearchUnit {
    request: SearchRequest,
    performance: PerformanceConfig,
    message_tx: Sender<UnitMessage>,
    stop_flag: Arc<AtomicBool>,
}

impl SearchUnit {
    pub fn new(
        request: SearchRequest,
        message_tx: Sender<UnitMessage>,
        stop_flag: Arc<AtomicBool>,
    ) -> Self {
        let performance = request.performance();
        Self {
            request,
            performance,
            message_tx,
            stop_flag,
        }
    }

    pub fn id(&self) -> usize {
        self.request.unit_id
    }

    /// Runs the request to completion.
    ///
    /// Any failure ends the unit with a single error message.
    pub fn run(self) {
        log::debug!(
            "unit {} starting {:?} for {}",
            self.id(),
            self.request.mode,
            self.request.address_format
        );

        let outcome = match self.request.mode {
            SearchMode::Batch => self.run_batch(),
            SearchMode::PatternSearch => self.run_search(),
        };

        if let Err(e) = outcome {
            log::warn!("unit {} failed: {}", self.id(), e);
            self.emit(UnitMessage::Error(ErrorReport {
                message: format!("Address generation failed: {}", e),
                unit_id: Some(self.id()),
            }));
        }

        log::debug!("unit {} finished", self.id());
    }

    fn run_batch(&self) -> Result<()> {
        let count = self.request.count;
        let format = self.request.address_format;

        let mut keys = match self.request.test_private_key {
            Some(ref hex_key) => KeySource::Fixed(PrivateKey::from_hex(hex_key)?),
            None => KeySource::Random(KeyGenerator::new()?),
        };
        let mut deriver = AddressDeriver::new();
        let mut entries = Vec::with_capacity(count);

        for size in sub_batches(count, self.performance.batch_size) {
            for _ in 0..size {
                let key = keys.next_key()?;
                entries.push(deriver.generate(format, &key)?);
            }
            log::debug!("unit {} generated {}/{}", self.id(), entries.len(), count);

            if entries.len() < count && !self.yield_point() {
                log::debug!("unit {} cancelled during batch", self.id());
                return Ok(());
            }
        }

        self.emit(UnitMessage::BatchResult(BatchResult {
            entries,
            unit_id: self.id(),
        }));
        Ok(())
    }

    fn run_search(&self) -> Result<()> {
        let unit_id = self.id();
        let format = self.request.address_format;
        let pattern = Pattern::new(
            self.request.pattern.as_deref(),
            self.request.pattern_position,
        );
        let target = self.request.target();
        let max_attempts = self.performance.max_attempts;
        let interval = self.performance.progress_interval_attempts;

        let mut keys = KeyGenerator::new()?;
        let mut deriver = AddressDeriver::new();

        let mut attempts: u64 = 0;
        let mut found = 0usize;
        let mut last_report: u64 = 0;

        while attempts < max_attempts && found < target {
            attempts += 1;

            let key = keys.generate()?;
            let address = deriver.derive(format, &key)?;

            if pattern.matches(&address).is_match() {
                found += 1;
                let result = deriver
                    .complete(address.clone(), &key)
                    .with_origin(attempts, unit_id);
                if !self.emit(UnitMessage::Match(result)) {
                    return Ok(());
                }
                if found >= target {
                    break;
                }
            }

            if attempts - last_report >= interval {
                let progress = Progress {
                    attempts,
                    current_address: address,
                    unit_id,
                };
                if !self.emit(UnitMessage::Progress(progress)) {
                    return Ok(());
                }
                last_report = attempts;

                if !self.yield_point() {
                    log::debug!("unit {} cancelled after {} attempts", unit_id, attempts);
                    return Ok(());
                }
            }
        }

        if found < target {
            log::debug!("unit {} exhausted {} attempts", unit_id, attempts);
            self.emit(UnitMessage::Progress(Progress {
                attempts,
                current_address: String::new(),
                unit_id,
            }));
        }
        Ok(())
    }

    /// Suspension point. Returns `false` once the unit should stop.
    fn yield_point(&self) -> bool {
        match self.performance.yield_delay_ms {
            d if d < 0 => {}
            0 => thread::yield_now(),
            d => thread::sleep(Duration::from_millis(d as u64)),
        }
        !self.stop_flag.load(Ordering::Relaxed)
    }

    /// Sends a message. Returns `false` if the coordinator has gone away.
    fn emit(&self, message: UnitMessage) -> bool {
        self.message_tx.send(message).is_ok()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::crypto::AddressFormat;
    use crate::matcher::PatternPosition;
    use crossbeam_channel::unbounded;

    const KEY_ONE: &str = "0000000000000000000000000000000000000000000000000000000000000001";

    fn perf(batch_size: usize, interval: u64, max_attempts: u64) -> PerformanceConfig {
        PerformanceConfig {
            batch_size,
            progress_interval_attempts: interval,
            max_attempts,
            yield_delay_ms: -1,
        }
    }

    fn run_unit(request: SearchRequest, stopped: bool) -> Vec<UnitMessage> {
        let (tx, rx) = unbounded();
        let stop_flag = Arc::new(AtomicBool::new(stopped));
        SearchUnit::new(request, tx, stop_flag).run();
        rx.try_iter().collect()
    }

    #[test]
    fn test_sub_batch_sizes() {
        assert_eq!(sub_batches(250, 100).collect::<Vec<_>>(), vec![100, 100, 50]);
        assert_eq!(sub_batches(100, 100).collect::<Vec<_>>(), vec![100]);
        assert_eq!(sub_batches(3, 0).collect::<Vec<_>>(), vec![1, 1, 1]);
        assert_eq!(sub_batches(0, 10).count(), 0);
    }

    #[test]
    fn test_batch_emits_single_aggregate_result() {
        let request = SearchRequest::batch(AddressFormat::Legacy, 250)
            .with_unit_id(7)
            .with_test_private_key(KEY_ONE)
            .with_performance(perf(100, 2000, 2_000_000));

        let messages = run_unit(request, false);
        assert_eq!(messages.len(), 1);
        match &messages[0] {
            UnitMessage::BatchResult(batch) => {
                assert_eq!(batch.unit_id, 7);
                assert_eq!(batch.entries.len(), 250);
                assert!(batch
                    .entries
                    .iter()
                    .all(|e| e.address == "1BgGZ9tcN4rm9KBzDn7KprQz87SZ26SAMH"
                        && e.private_key_hex == KEY_ONE
                        && e.attempts.is_none()));
            }
            other => panic!("unexpected message: {:?}", other),
        }
    }

    #[test]
    fn test_batch_of_random_keys_are_distinct() {
        let request = SearchRequest::batch(AddressFormat::Taproot, 20)
            .with_performance(perf(8, 2000, 2_000_000));
        let messages = run_unit(request, false);
        let UnitMessage::BatchResult(batch) = &messages[0] else {
            panic!("expected batch result");
        };
        let mut keys: Vec<_> = batch.entries.iter().map(|e| &e.private_key_hex).collect();
        keys.sort();
        keys.dedup();
        assert_eq!(keys.len(), 20);
        assert!(batch.entries.iter().all(|e| e.address.starts_with("bc1p")));
    }

    #[test]
    fn test_unreachable_pattern_ends_with_empty_progress() {
        // '0' never appears in a Base58 address
        let request = SearchRequest::search(AddressFormat::Legacy, "0000000000", PatternPosition::Start)
            .with_unit_id(1)
            .with_target_count(1)
            .with_performance(perf(100, 200, 500));

        let messages = run_unit(request, false);
        assert!(!messages.iter().any(|m| matches!(m, UnitMessage::Match(_))));

        let progress: Vec<&Progress> = messages
            .iter()
            .filter_map(|m| match m {
                UnitMessage::Progress(p) => Some(p),
                _ => None,
            })
            .collect();
        assert_eq!(progress.iter().map(|p| p.attempts).collect::<Vec<_>>(), vec![200, 400, 500]);
        assert_eq!(progress.iter().filter(|p| p.is_exhausted()).count(), 1);
        assert!(progress.last().unwrap().is_exhausted());
        assert!(progress[..2].iter().all(|p| p.current_address.starts_with('1')));
    }

    #[test]
    fn test_absent_pattern_matches_every_attempt() {
        let mut request = SearchRequest::search(AddressFormat::NativeSegwit, "", PatternPosition::Anywhere)
            .with_unit_id(4)
            .with_target_count(3)
            .with_performance(perf(100, 2000, 1000));
        request.pattern = None;

        let messages = run_unit(request, false);
        let attempts: Vec<u64> = messages
            .iter()
            .map(|m| match m {
                UnitMessage::Match(r) => {
                    assert_eq!(r.unit_id, Some(4));
                    assert!(r.address.starts_with("bc1q"));
                    assert!(r.private_key_wif.starts_with('K') || r.private_key_wif.starts_with('L'));
                    r.attempts.unwrap()
                }
                other => panic!("unexpected message: {:?}", other),
            })
            .collect();
        assert_eq!(attempts, vec![1, 2, 3]);
    }

    #[test]
    fn test_zero_max_attempts_reports_exhaustion_immediately() {
        let request = SearchRequest::search(AddressFormat::Legacy, "abc", PatternPosition::End)
            .with_performance(perf(100, 10, 0));
        let messages = run_unit(request, false);
        assert_eq!(
            messages,
            vec![UnitMessage::Progress(Progress {
                attempts: 0,
                current_address: String::new(),
                unit_id: 0,
            })]
        );
    }

    #[test]
    fn test_stop_flag_checked_at_yield_point() {
        let request = SearchRequest::search(AddressFormat::Legacy, "0", PatternPosition::Anywhere)
            .with_performance(perf(100, 5, 1_000_000));
        let messages = run_unit(request, true);
        assert_eq!(messages.len(), 1);
        match &messages[0] {
            UnitMessage::Progress(p) => {
                assert_eq!(p.attempts, 5);
                assert!(!p.is_exhausted());
            }
            other => panic!("unexpected message: {:?}", other),
        }
    }

    #[test]
    fn test_invalid_test_key_reports_error() {
        let request = SearchRequest::batch(AddressFormat::Legacy, 3)
            .with_unit_id(2)
            .with_test_private_key("not a key");
        let messages = run_unit(request, false);
        assert_eq!(messages.len(), 1);
        match &messages[0] {
            UnitMessage::Error(report) => {
                assert_eq!(report.unit_id, Some(2));
                assert!(report.message.contains("invalid private key hex"));
            }
            other => panic!("unexpected message: {:?}", other),
        }
    }

    #[test]
    fn test_out_of_range_test_key_reports_error() {
        let request = SearchRequest::batch(AddressFormat::Taproot, 3)
            .with_test_private_key(&"ff".repeat(32));
        let messages = run_unit(request, false);
        assert!(matches!(messages.as_slice(), [UnitMessage::Error(_)]));
    }
}
