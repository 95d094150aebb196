use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::thread;
use std::time::{Duration, Instant};

use tokio::sync::mpsc::UnboundedSender;

use crate::model::UiEvent;

/// Free-running elapsed-time ticker for the long conversion paths.
///
/// `start` records an instant and spawns a plain thread that posts an
/// `Elapsed` event once per tick while the shared running flag holds.
/// `stop` only flips the flag, so the thread may tick at most once more
/// before it exits.
pub struct Timer {
    running: Arc<AtomicBool>,
}

impl Timer {
    pub fn start(events: UnboundedSender<UiEvent>) -> Self {
        Self::with_interval(events, Duration::from_secs(1))
    }

    /// Tick interval is injectable so tests don't wait on wall-clock seconds.
    pub fn with_interval(events: UnboundedSender<UiEvent>, tick: Duration) -> Self {
        let running = Arc::new(AtomicBool::new(true));
        let flag = Arc::clone(&running);
        let started = Instant::now();
        thread::spawn(move || {
            while flag.load(Ordering::Relaxed) {
                let _ = events.send(UiEvent::Elapsed(format_elapsed(started.elapsed())));
                thread::sleep(tick);
            }
        });
        Self { running }
    }

    pub fn stop(&self) {
        self.running.store(false, Ordering::Relaxed);
    }
}

impl Drop for Timer {
    fn drop(&mut self) {
        self.stop();
    }
}

/// Formats an elapsed duration as `MM:SS`.
pub fn format_elapsed(elapsed: Duration) -> String {
    let secs = elapsed.as_secs();
    format!("{:02}:{:02}", secs / 60, secs % 60)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tokio::sync::mpsc::unbounded_channel;

    #[test]
    fn formats_minutes_and_seconds() {
        assert_eq!(format_elapsed(Duration::from_secs(0)), "00:00");
        assert_eq!(format_elapsed(Duration::from_secs(61)), "01:01");
        assert_eq!(format_elapsed(Duration::from_secs(600)), "10:00");
    }

    #[test]
    fn ticks_while_running() {
        let (tx, mut rx) = unbounded_channel();
        let timer = Timer::with_interval(tx, Duration::from_millis(10));
        thread::sleep(Duration::from_millis(50));
        timer.stop();
        let mut ticks = 0;
        while let Ok(event) = rx.try_recv() {
            assert!(matches!(event, UiEvent::Elapsed(_)));
            ticks += 1;
        }
        assert!(ticks >= 2, "expected repeated ticks, got {ticks}");
    }

    #[test]
    fn stops_within_one_interval() {
        let tick = Duration::from_millis(10);
        let (tx, mut rx) = unbounded_channel();
        let timer = Timer::with_interval(tx, tick);
        thread::sleep(Duration::from_millis(35));
        timer.stop();
        // At most one in-flight tick may still land after stop.
        thread::sleep(tick * 3);
        while rx.try_recv().is_ok() {}
        thread::sleep(tick * 3);
        assert!(rx.try_recv().is_err(), "timer kept ticking after stop");
    }
}
