//! Named timers on the tokio runtime.
//!
//! Every timer has a name; creating a timer under an existing name
//! replaces the old one. Firings are delivered as [`AlarmFired`] events on
//! the channel handed out by [`AlarmService::new`]. Timers are tokio
//! tasks, so the service must live on a runtime.
use std::{
    collections::HashMap,
    sync::{
        atomic::{AtomicU64, Ordering},
        Arc, Mutex, MutexGuard,
    },
    time::Duration,
};

use chrono::{DateTime, Utc};
use log::{debug, info, trace, warn};
use tokio::{
    sync::mpsc,
    task::JoinHandle,
    time::{self, Instant},
};

/// When a timer should first fire, and how often after that
#[derive(Debug, Clone, Copy)]
pub struct AlarmSchedule {
    /// First firing time
    pub when: DateTime<Utc>,
    /// Re-arm interval for periodic timers
    pub period: Option<Duration>,
}

impl AlarmSchedule {
    /// One-shot timer at the given instant
    pub fn once(when: DateTime<Utc>) -> Self {
        Self { when, period: None }
    }

    /// Periodic timer starting at the given instant
    pub fn repeating(when: DateTime<Utc>, period: Duration) -> Self {
        Self {
            when,
            period: Some(period),
        }
    }
}

/// A timer firing, tagged with the timer's name
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AlarmFired {
    pub name: String,
}

struct AlarmEntry {
    /// Distinguishes this registration from any later one under the same name
    generation: u64,
    handle: JoinHandle<()>,
}

/// Registry of named timers backed by tokio tasks
pub struct AlarmService {
    alarms: Arc<Mutex<HashMap<String, AlarmEntry>>>,
    event_tx: mpsc::UnboundedSender<AlarmFired>,
    generations: AtomicU64,
}

impl AlarmService {
    /// Creates the service and the receiving end of its event channel
    pub fn new() -> (Self, mpsc::UnboundedReceiver<AlarmFired>) {
        let (event_tx, event_rx) = mpsc::unbounded_channel();
        let service = Self {
            alarms: Arc::new(Mutex::new(HashMap::new())),
            event_tx,
            generations: AtomicU64::new(0),
        };

        (service, event_rx)
    }

    /// Registers a timer under a name, replacing any pending timer with
    /// the same name.
    pub fn create(&self, name: &str, schedule: AlarmSchedule) {
        let generation = self.generations.fetch_add(1, Ordering::Relaxed);
        debug!(
            "Creating alarm {} (generation {}) for {}",
            name, generation, schedule.when
        );

        // The registry lock is held across the spawn so the new task
        // cannot observe the registry before its own entry is in place.
        let mut alarms = lock_registry(&self.alarms);
        let handle = self.spawn_timer(name.to_string(), generation, schedule);
        if let Some(old) = alarms.insert(name.to_string(), AlarmEntry { generation, handle }) {
            trace!("Replacing pending alarm {}", name);
            old.handle.abort();
        }
    }

    /// Cancels the named timer. Returns false when nothing was pending.
    pub fn clear(&self, name: &str) -> bool {
        let mut alarms = lock_registry(&self.alarms);
        match alarms.remove(name) {
            Some(entry) => {
                entry.handle.abort();
                debug!("Cleared alarm {}", name);
                true
            }
            None => false,
        }
    }

    /// Whether a timer is currently pending under this name
    pub fn is_scheduled(&self, name: &str) -> bool {
        lock_registry(&self.alarms).contains_key(name)
    }

    /// Names of all pending timers
    pub fn scheduled_names(&self) -> Vec<String> {
        lock_registry(&self.alarms).keys().cloned().collect()
    }

    /// Cancels every pending timer
    pub fn clear_all(&self) {
        let mut alarms = lock_registry(&self.alarms);
        info!("Clearing all {} pending alarms", alarms.len());
        for (_, entry) in alarms.drain() {
            entry.handle.abort();
        }
    }

    fn spawn_timer(&self, name: String, generation: u64, schedule: AlarmSchedule) -> JoinHandle<()> {
        let alarms = Arc::clone(&self.alarms);
        let event_tx = self.event_tx.clone();

        tokio::spawn(async move {
            let mut deadline = instant_for(schedule.when);

            loop {
                time::sleep_until(deadline).await;

                // A later registration under this name supersedes us; hand
                // the entry over without firing. One-shot timers remove
                // themselves here, under the same lock as the check.
                let still_current = {
                    let mut registry = lock_registry(&alarms);
                    match registry.get(&name) {
                        Some(entry) if entry.generation == generation => {
                            if schedule.period.is_none() {
                                registry.remove(&name);
                            }
                            true
                        }
                        _ => false,
                    }
                };

                if !still_current {
                    trace!("Alarm {} superseded before firing", name);
                    return;
                }

                trace!("Alarm fired: {}", name);
                if event_tx.send(AlarmFired { name: name.clone() }).is_err() {
                    warn!("Alarm {} fired with no listener", name);
                    return;
                }

                match schedule.period {
                    Some(period) => deadline += period,
                    None => return,
                }
            }
        })
    }
}

/// Converts an absolute UTC instant into a tokio deadline. Past instants
/// collapse to "now".
fn instant_for(when: DateTime<Utc>) -> Instant {
    let delay = (when - Utc::now()).to_std().unwrap_or(Duration::ZERO);
    Instant::now() + delay
}

fn lock_registry(
    alarms: &Mutex<HashMap<String, AlarmEntry>>,
) -> MutexGuard<'_, HashMap<String, AlarmEntry>> {
    match alarms.lock() {
        Ok(guard) => guard,
        Err(poisoned) => {
            warn!("Alarm registry mutex poisoned, recovering");
            poisoned.into_inner()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn in_secs(secs: i64) -> DateTime<Utc> {
        Utc::now() + chrono::Duration::seconds(secs)
    }

    #[tokio::test(start_paused = true)]
    async fn one_shot_fires_once_and_unregisters() {
        let (service, mut events) = AlarmService::new();

        service.create("wake", AlarmSchedule::once(in_secs(30)));
        assert!(service.is_scheduled("wake"));

        let fired = events.recv().await.expect("fired");
        assert_eq!(fired.name, "wake");
        assert!(!service.is_scheduled("wake"));

        let silence = time::timeout(Duration::from_secs(600), events.recv()).await;
        assert!(silence.is_err());
    }

    #[tokio::test(start_paused = true)]
    async fn creating_under_the_same_name_replaces() {
        let (service, mut events) = AlarmService::new();

        service.create("x", AlarmSchedule::once(in_secs(5)));
        service.create("x", AlarmSchedule::once(in_secs(60)));
        assert_eq!(service.scheduled_names(), vec!["x".to_string()]);

        let fired = events.recv().await.expect("fired");
        assert_eq!(fired.name, "x");

        // The superseded timer never delivers.
        let silence = time::timeout(Duration::from_secs(600), events.recv()).await;
        assert!(silence.is_err());
    }

    #[tokio::test(start_paused = true)]
    async fn clear_prevents_firing() {
        let (service, mut events) = AlarmService::new();

        service.create("gone", AlarmSchedule::once(in_secs(5)));
        assert!(service.clear("gone"));
        assert!(!service.clear("gone"));
        assert!(!service.is_scheduled("gone"));

        let silence = time::timeout(Duration::from_secs(600), events.recv()).await;
        assert!(silence.is_err());
    }

    #[tokio::test(start_paused = true)]
    async fn periodic_timers_re_arm() {
        let (service, mut events) = AlarmService::new();

        service.create(
            "tick",
            AlarmSchedule::repeating(in_secs(10), Duration::from_secs(60)),
        );

        for _ in 0..3 {
            let fired = events.recv().await.expect("fired");
            assert_eq!(fired.name, "tick");
        }
        assert!(service.is_scheduled("tick"));

        service.clear_all();
        assert!(!service.is_scheduled("tick"));
    }
}
