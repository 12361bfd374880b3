//! Background buffer production.
//!
//! A [`BufferPrefetcher`] takes ownership of a sampler, moves it onto a worker
//! thread and pushes completed buffers through a bounded channel. Buffers are
//! only sent once fully populated, and the worker keeps no reference to a
//! buffer after sending it.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{mpsc, Arc};
use std::thread;

use tracing::debug;

use crate::error::Result;
use crate::sampler::{IdSampler, SampleBuffer};

#[derive(Default)]
struct PrefetcherStats {
    queued: AtomicUsize,
    produced: AtomicUsize,
}

/// Prefetches one pass of buffers from a sampler on a background thread.
pub struct BufferPrefetcher {
    receiver: Option<mpsc::Receiver<Result<SampleBuffer>>>,
    handle: Option<thread::JoinHandle<()>>,
    stats: Arc<PrefetcherStats>,
}

impl BufferPrefetcher {
    /// Start producing from `sampler`, keeping at most `capacity` buffers queued.
    ///
    /// The sampler must already be initialized; the worker drains the current
    /// pass and stops after the final buffer or the first error.
    pub fn spawn<S>(mut sampler: S, capacity: usize) -> Self
    where
        S: IdSampler + Send + 'static,
    {
        let (sender, receiver) = mpsc::sync_channel(capacity.max(1));
        let stats = Arc::new(PrefetcherStats::default());
        let stats_thread = Arc::clone(&stats);
        let handle = thread::spawn(move || {
            let mut sent = 0usize;
            for result in sampler.buffers() {
                let stop = result.is_err();
                // Count before sending so a fast consumer never decrements first.
                stats_thread.queued.fetch_add(1, Ordering::Relaxed);
                if sender.send(result).is_err() {
                    stats_thread.queued.fetch_sub(1, Ordering::Relaxed);
                    debug!(sent, "buffer consumer hung up");
                    return;
                }
                sent += 1;
                stats_thread.produced.fetch_add(1, Ordering::Relaxed);
                if stop {
                    break;
                }
            }
            debug!(sent, "buffer producer finished");
        });

        Self {
            receiver: Some(receiver),
            handle: Some(handle),
            stats,
        }
    }

    /// Block for the next buffer. `Ok(None)` once the pass has been fully
    /// delivered.
    pub fn next(&self) -> Result<Option<SampleBuffer>> {
        let Some(receiver) = self.receiver.as_ref() else {
            return Ok(None);
        };
        match receiver.recv() {
            Ok(result) => {
                self.stats
                    .queued
                    .fetch_update(Ordering::Relaxed, Ordering::Relaxed, |value| {
                        Some(value.saturating_sub(1))
                    })
                    .ok();
                result.map(Some)
            }
            Err(_) => Ok(None),
        }
    }

    /// Buffers produced but not yet taken.
    pub fn queue_len(&self) -> usize {
        self.stats.queued.load(Ordering::Relaxed)
    }

    /// Total buffers produced by the worker.
    pub fn produced_count(&self) -> usize {
        self.stats.produced.load(Ordering::Relaxed)
    }
}

impl Drop for BufferPrefetcher {
    fn drop(&mut self) {
        self.receiver.take();
        if let Some(handle) = self.handle.take() {
            let _ = handle.join();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{BufferSize, SamplerConfig, SeedPolicy};
    use crate::sampler::WeightedRandomSampler;

    fn ready_sampler(num_samples: usize, buffer: usize) -> WeightedRandomSampler {
        let config = SamplerConfig::new(num_samples)
            .with_replacement(false)
            .with_buffer_size(BufferSize::from_len(buffer))
            .with_seed_policy(SeedPolicy::Replay(17));
        let mut s = WeightedRandomSampler::new(vec![1.0; 32], config).expect("valid");
        s.init(32).expect("init");
        s
    }

    #[test]
    fn delivers_whole_pass_then_none() {
        let prefetcher = BufferPrefetcher::spawn(ready_sampler(10, 4), 2);
        let mut lens = Vec::new();
        while let Some(buffer) = prefetcher.next().expect("no errors") {
            lens.push(buffer.len());
        }
        assert_eq!(lens, vec![4, 4, 2]);
        assert_eq!(prefetcher.produced_count(), 3);
        assert_eq!(prefetcher.queue_len(), 0);
        assert!(prefetcher.next().expect("still none").is_none());
    }

    #[test]
    fn queue_len_settles_at_zero_with_eager_consumer() {
        for _ in 0..20 {
            let prefetcher = BufferPrefetcher::spawn(ready_sampler(32, 1), 1);
            let mut taken = 0;
            while prefetcher.next().expect("no errors").is_some() {
                taken += 1;
                // One buffer in the channel plus one blocked in `send`.
                assert!(prefetcher.queue_len() <= 2);
            }
            assert_eq!(taken, 32);
            assert_eq!(prefetcher.queue_len(), 0);
        }
    }

    #[test]
    fn matches_direct_draws() {
        let mut direct = ready_sampler(20, 3);
        let expected: Vec<usize> = direct
            .buffers()
            .flat_map(|b| b.expect("buffer").ids)
            .collect();

        let prefetcher = BufferPrefetcher::spawn(ready_sampler(20, 3), 1);
        let mut got = Vec::new();
        while let Some(buffer) = prefetcher.next().expect("no errors") {
            got.extend(buffer.ids);
        }
        assert_eq!(got, expected);
    }

    #[test]
    fn uninitialized_sampler_reports_error() {
        let s = WeightedRandomSampler::with_defaults(vec![1.0, 2.0], 4).expect("valid");
        let prefetcher = BufferPrefetcher::spawn(s, 1);
        assert_eq!(
            prefetcher.next().expect_err("not initialized"),
            crate::error::SamplerError::UninitializedAccess
        );
        assert!(prefetcher.next().expect("closed").is_none());
    }

    #[test]
    fn dropping_early_stops_worker() {
        let prefetcher = BufferPrefetcher::spawn(ready_sampler(32, 1), 1);
        let first = prefetcher.next().expect("ok").expect("one buffer");
        assert_eq!(first.len(), 1);
        drop(prefetcher);
    }
}
