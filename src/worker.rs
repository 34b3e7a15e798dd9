//! Background work.
//!
//! Workers must not touch elements or draw; they communicate with the UI by setting bindings.

use crossbeam::channel::{self, Sender};
use crossbeam::select;
use std::thread::{self, JoinHandle};
use std::time::Duration;
use tracing::{debug, warn};

/// Runs a closure periodically on a background thread.
pub struct Ticker {
    stop: Option<Sender<()>>,
    thread: Option<JoinHandle<()>>,
}

impl Ticker {
    /// Spawns a thread that calls `f` every `interval` until the ticker is stopped.
    pub fn spawn<F>(interval: Duration, mut f: F) -> Ticker
    where
        F: FnMut() + Send + 'static,
    {
        let (stop, stop_recv) = channel::bounded::<()>(1);
        let ticks = channel::tick(interval);

        let thread = thread::spawn(move || {
            debug!(?interval, "ticker started");
            loop {
                select! {
                    recv(stop_recv) -> _ => break,
                    recv(ticks) -> _ => f(),
                }
            }
            debug!("ticker stopped");
        });

        Ticker {
            stop: Some(stop),
            thread: Some(thread),
        }
    }

    /// Signals the thread to stop and waits for it to exit. Does nothing if already stopped.
    pub fn stop(&mut self) {
        if let Some(stop) = self.stop.take() {
            // the thread may already be gone if `f` panicked
            let _ = stop.send(());
        }
        if let Some(thread) = self.thread.take() {
            if thread.join().is_err() {
                warn!("ticker thread panicked");
            }
        }
    }

    pub fn is_running(&self) -> bool {
        self.thread.is_some()
    }
}

impl Drop for Ticker {
    fn drop(&mut self) {
        self.stop();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;

    #[test]
    fn ticks_until_stopped() {
        let count = Arc::new(AtomicUsize::new(0));
        let c = Arc::clone(&count);
        let mut ticker = Ticker::spawn(Duration::from_millis(2), move || {
            c.fetch_add(1, Ordering::SeqCst);
        });

        while count.load(Ordering::SeqCst) < 3 {
            thread::sleep(Duration::from_millis(1));
        }
        ticker.stop();
        assert!(!ticker.is_running());

        let after_stop = count.load(Ordering::SeqCst);
        thread::sleep(Duration::from_millis(10));
        assert_eq!(count.load(Ordering::SeqCst), after_stop);

        // stopping twice is fine
        ticker.stop();
    }
}
