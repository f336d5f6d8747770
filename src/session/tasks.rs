//! Periodic background tasks.
//!
//! Independent of the session loop, two threads tick on their own
//! periods: the idle watchdog check and the distribution display
//! refresh. Both only read shared state (tracker snapshot, idle clock)
//! and write to the display through its shared mutex; the watchdog
//! additionally counts the signals it forwards.

use crate::display::RollDisplay;
use crate::metrics::RollStats;
use crate::outcome::OutcomeTracker;
use crate::sensor::{DisplayConfig, IdleConfig};
use crate::session::{IdleClock, IdleSignal, IdleWatchdog};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{mpsc, Arc, Mutex, RwLock};
use std::thread::JoinHandle;

/// Handles for the spawned background threads.
pub struct BackgroundTasks {
    handles: Vec<JoinHandle<()>>,
}

impl BackgroundTasks {
    /// Waits for all background threads to exit.
    ///
    /// Call after clearing the running flag; each thread notices the
    /// flag within one tick of its period.
    pub fn join(self) {
        for handle in self.handles {
            if handle.join().is_err() {
                tracing::error!("Background task panicked");
            }
        }
    }
}

/// Spawns the idle-watchdog and display-refresh threads.
///
/// Low-power signals are forwarded on `idle_tx`; the consumer is
/// expected to suspend the process until an external wake condition
/// (the motion interrupt) recurs.
pub fn spawn_background_tasks(
    tracker: Arc<RwLock<OutcomeTracker>>,
    display: Arc<Mutex<dyn RollDisplay>>,
    clock: Arc<IdleClock>,
    idle: &IdleConfig,
    refresh: &DisplayConfig,
    running: Arc<AtomicBool>,
    stats: Arc<RollStats>,
    idle_tx: mpsc::Sender<IdleSignal>,
) -> BackgroundTasks {
    let mut handles = Vec::with_capacity(2);

    // Idle watchdog tick.
    {
        let display = Arc::clone(&display);
        let clock = Arc::clone(&clock);
        let running = Arc::clone(&running);
        let threshold = idle.idle_threshold();
        let interval = idle.check_interval();

        handles.push(std::thread::spawn(move || {
            let mut watchdog = IdleWatchdog::new(threshold);
            while running.load(Ordering::Relaxed) {
                std::thread::sleep(interval);

                if let Some(signal) = watchdog.check(&clock) {
                    stats.record_idle_signal();
                    // Consumer gone means shutdown is in progress.
                    if idle_tx.send(signal).is_err() {
                        break;
                    }
                }

                let mut display = display.lock().expect("display lock poisoned");
                display.show_idle_countdown(watchdog.remaining(&clock));
            }
            tracing::debug!("Idle watchdog task stopped");
        }));
    }

    // Distribution refresh tick.
    {
        let interval = refresh.refresh_interval();

        handles.push(std::thread::spawn(move || {
            while running.load(Ordering::Relaxed) {
                std::thread::sleep(interval);

                let (percentages, total) = {
                    let tracker = tracker.read().expect("tracker lock poisoned");
                    (tracker.percentages(), tracker.total())
                };

                let mut display = display.lock().expect("display lock poisoned");
                display.show_distribution(&percentages, total);
            }
            tracing::debug!("Distribution refresh task stopped");
        }));
    }

    BackgroundTasks { handles }
}
