//! Ticker Actor: Dedicated thread for generating timing events.
//!
//! The ticker paces the engine at a fixed cadence. Ticks that the engine
//! thread has not consumed yet are dropped instead of queued, so a slow
//! consumer never sees a burst of back-to-back ticks.

use crossbeam_channel::{bounded, Receiver, Sender, TrySendError};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread::{self, JoinHandle};
use std::time::{Duration, Instant};

/// Longest single sleep, so shutdown is noticed promptly.
const MAX_SLEEP: Duration = Duration::from_millis(2);

/// A tick event sent at regular intervals.
#[derive(Debug, Clone, Copy)]
pub struct Tick {
    /// Sequence number (monotonically increasing, gaps mean dropped ticks).
    pub sequence: u64,
    /// Time elapsed since the ticker was spawned.
    pub elapsed: Duration,
}

/// Ticker actor that generates regular timing events.
pub struct TickerActor {
    /// Handle to the ticker thread.
    handle: Option<JoinHandle<()>>,
    /// Flag to signal shutdown.
    shutdown: Arc<AtomicBool>,
    /// Receiver for tick events.
    tick_rx: Receiver<Tick>,
}

impl TickerActor {
    /// Spawn a new ticker actor.
    ///
    /// # Arguments
    ///
    /// * `interval` - Time between ticks (16ms for ~60 Hz).
    ///
    /// # Panics
    ///
    /// Panics if the OS fails to spawn the ticker thread.
    pub fn spawn(interval: Duration) -> Self {
        let shutdown = Arc::new(AtomicBool::new(false));
        let shutdown_clone = shutdown.clone();

        // Room for a single pending tick; anything more is dropped
        let (tick_tx, tick_rx) = bounded(1);

        let handle = thread::Builder::new()
            .name("petwheel-ticker".to_string())
            .spawn(move || {
                Self::run_loop(&tick_tx, &shutdown_clone, interval);
            })
            .expect("Failed to spawn ticker thread");

        Self {
            handle: Some(handle),
            shutdown,
            tick_rx,
        }
    }

    /// Get a reference to the tick receiver, for use with `select!`.
    #[inline]
    pub const fn receiver(&self) -> &Receiver<Tick> {
        &self.tick_rx
    }

    /// Signal the ticker to shutdown.
    pub fn shutdown(&self) {
        self.shutdown.store(true, Ordering::Relaxed);
    }

    /// Signal shutdown and wait for the ticker thread to finish.
    pub fn join(mut self) {
        self.shutdown();
        if let Some(handle) = self.handle.take() {
            let _ = handle.join();
        }
    }

    /// Main ticker loop.
    fn run_loop(tick_tx: &Sender<Tick>, shutdown: &AtomicBool, interval: Duration) {
        let start = Instant::now();
        let mut sequence = 0u64;
        let mut next_tick = start + interval;

        while !shutdown.load(Ordering::Relaxed) {
            let now = Instant::now();
            if now < next_tick {
                thread::sleep((next_tick - now).min(MAX_SLEEP));
                continue;
            }

            let tick = Tick {
                sequence,
                elapsed: now - start,
            };
            if let Err(TrySendError::Disconnected(_)) = tick_tx.try_send(tick) {
                break;
            }

            sequence += 1;
            next_tick += interval;
            // Fell behind (e.g. the process was suspended): resume the
            // cadence from now instead of firing a burst
            if next_tick < now {
                next_tick = now + interval;
            }
        }
    }
}

impl Drop for TickerActor {
    fn drop(&mut self) {
        self.shutdown();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ticker_basic() {
        let ticker = TickerActor::spawn(Duration::from_millis(10));

        let tick = ticker.receiver().recv_timeout(Duration::from_millis(200));
        assert_eq!(tick.unwrap().sequence, 0);

        let tick2 = ticker.receiver().recv_timeout(Duration::from_millis(200));
        assert!(tick2.unwrap().sequence >= 1);

        ticker.join();
    }

    #[test]
    fn test_slow_consumer_does_not_queue() {
        let ticker = TickerActor::spawn(Duration::from_millis(20));
        thread::sleep(Duration::from_millis(150));

        // Only one tick can be pending
        assert!(ticker.receiver().try_recv().is_ok());
        assert!(ticker.receiver().try_recv().is_err());

        ticker.join();
    }

    #[test]
    fn test_ticker_shutdown() {
        let ticker = TickerActor::spawn(Duration::from_millis(5));
        let rx = ticker.receiver().clone();
        ticker.join();

        // Drain whatever was pending at shutdown, then nothing more arrives
        while rx.try_recv().is_ok() {}
        assert!(rx.recv_timeout(Duration::from_millis(30)).is_err());
    }
}
