//! Background assembly: schedulers, alarm routing, and the message
//! surface that keeps timers in step with note edits.
use std::sync::Arc;

use chrono::{DateTime, Utc};
use log::{debug, info, warn};
use tokio::{sync::mpsc, task::JoinHandle};

use crate::{
    AlarmFired, AlarmService, Config, NotificationDispatcher, NotificationSink, NoteStore,
    QnError, ReminderScheduler, Result, WeeklyDigestScheduler,
};

/// Requests other surfaces send to keep timers in step with note edits
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ReminderMessage {
    /// Schedule (or move) the reminder timer for a note
    Set { id: String, time: DateTime<Utc> },
    /// Drop any pending reminder timer for a note
    Remove { id: String },
}

/// The resident background subsystem.
///
/// Owns the alarm service, both schedulers and the dispatcher, and runs
/// the router task that connects timer firings to notifications. Starts
/// at most once; [`Background::stop`] is final.
pub struct Background {
    store: Arc<NoteStore>,
    alarms: Arc<AlarmService>,
    reminders: Arc<ReminderScheduler>,
    digest: WeeklyDigestScheduler,
    dispatcher: Arc<NotificationDispatcher>,
    config: Config,

    /// Receiver for timer firings; consumed when the router starts
    alarm_events: Option<mpsc::UnboundedReceiver<AlarmFired>>,
    /// Sender handed to other surfaces
    message_tx: mpsc::UnboundedSender<ReminderMessage>,
    /// Receiver side of the message surface, consumed by the router
    message_rx: Option<mpsc::UnboundedReceiver<ReminderMessage>>,
    /// The running router task
    router: Option<JoinHandle<()>>,
}

impl Background {
    /// Wires the subsystem together over the given store and sink
    pub fn new(store: Arc<NoteStore>, sink: Arc<dyn NotificationSink>, config: Config) -> Self {
        let (alarms, alarm_events) = AlarmService::new();
        let alarms = Arc::new(alarms);
        let reminders = Arc::new(ReminderScheduler::new(Arc::clone(&alarms)));
        let digest = WeeklyDigestScheduler::new(Arc::clone(&alarms));
        let dispatcher = Arc::new(NotificationDispatcher::new(Arc::clone(&store), sink));
        let (message_tx, message_rx) = mpsc::unbounded_channel();

        Self {
            store,
            alarms,
            reminders,
            digest,
            dispatcher,
            config,
            alarm_events: Some(alarm_events),
            message_tx,
            message_rx: Some(message_rx),
            router: None,
        }
    }

    /// Sender other surfaces use to request timer changes
    pub fn message_sender(&self) -> mpsc::UnboundedSender<ReminderMessage> {
        self.message_tx.clone()
    }

    /// Restores reminder timers from stored notes, starts the digest
    /// schedulers, and spawns the router task.
    pub fn start(&mut self) -> Result<()> {
        if self.router.is_some() {
            debug!("Background already running");
            return Ok(());
        }

        let (mut alarm_events, mut message_rx) =
            match (self.alarm_events.take(), self.message_rx.take()) {
                (Some(events), Some(messages)) => (events, messages),
                _ => {
                    return Err(QnError::SchedulerError {
                        message: "background routing channels already consumed".to_string(),
                    })
                }
            };

        let restored = self.reminders.restore(&self.store);
        info!("Background starting with {} restored reminders", restored);

        if self.config.digest_enabled {
            self.digest.start();
        } else {
            info!("Weekly digest disabled by configuration");
        }

        let reminders = Arc::clone(&self.reminders);
        let dispatcher = Arc::clone(&self.dispatcher);

        let task = tokio::spawn(async move {
            loop {
                tokio::select! {
                    fired = alarm_events.recv() => match fired {
                        Some(AlarmFired { name }) => route_alarm(&dispatcher, &name),
                        None => {
                            warn!("Alarm channel closed, background router exiting");
                            break;
                        }
                    },
                    message = message_rx.recv() => match message {
                        Some(ReminderMessage::Set { id, time }) => reminders.schedule(&id, time),
                        Some(ReminderMessage::Remove { id }) => {
                            reminders.cancel(&id);
                        }
                        None => {
                            debug!("Message channel closed, background router exiting");
                            break;
                        }
                    },
                }
            }
        });

        self.router = Some(task);
        Ok(())
    }

    /// Stops routing and cancels every pending timer
    pub fn stop(&mut self) {
        if let Some(task) = self.router.take() {
            task.abort();
        }
        self.digest.stop();
        self.alarms.clear_all();
        info!("Background stopped");
    }

    /// Whether the router task is alive
    pub fn is_running(&self) -> bool {
        self.router.as_ref().is_some_and(|task| !task.is_finished())
    }

    /// The dispatcher, for surfaces that render notification interactions
    pub fn dispatcher(&self) -> Arc<NotificationDispatcher> {
        Arc::clone(&self.dispatcher)
    }

    /// The reminder scheduler, mainly for inspection
    pub fn reminders(&self) -> Arc<ReminderScheduler> {
        Arc::clone(&self.reminders)
    }
}

/// Routes one timer firing to the dispatcher
fn route_alarm(dispatcher: &NotificationDispatcher, name: &str) {
    if let Some(note_id) = ReminderScheduler::note_id(name) {
        dispatcher.show_reminder(note_id);
    } else if WeeklyDigestScheduler::is_digest_alarm(name) {
        dispatcher.show_weekly_digest();
    } else {
        warn!("Alarm {} has no route", name);
    }
}
