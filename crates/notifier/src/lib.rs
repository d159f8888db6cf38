//! Delivery interfaces for user notifications and activity-log entries.
//!
//! The core library treats both as fire-and-forget side effects: it hands the event to a
//! sink and moves on. A sink must therefore never block; implementations that do real
//! work (persisting, pushing to browsers) enqueue the event and drain the queue from a
//! dedicated task. A sink refusing an event is logged by the caller and never rolls back
//! the state change that produced it.

#![warn(missing_docs)]

use std::sync::Arc;

use chrono::NaiveDateTime;
use parking_lot::Mutex;
use tokio::sync::mpsc;
use tokio_stream::wrappers::UnboundedReceiverStream;

/// A notification addressed to a user.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct Notification {
    /// The ID of the user the notification is addressed to.
    pub user_id: u32,
    /// The kind of the notification, e.g. `friend_request`.
    pub kind: String,
    /// The human-readable content.
    pub content: String,
    /// The ID of the user at the origin of the notification, if any.
    pub from_user_id: Option<u32>,
    /// When the notification was emitted.
    pub at: NaiveDateTime,
}

impl Notification {
    /// Creates a notification stamped with the current time.
    pub fn new(
        user_id: u32,
        kind: impl Into<String>,
        content: impl Into<String>,
        from_user_id: Option<u32>,
    ) -> Self {
        Self {
            user_id,
            kind: kind.into(),
            content: content.into(),
            from_user_id,
            at: chrono::Utc::now().naive_utc(),
        }
    }
}

/// An entry of the site activity log.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct ActivityEntry {
    /// The ID of the subject of the entry (a clan, a user, ...).
    pub subject_id: u32,
    /// The ID of the user who performed the action.
    pub actor_id: u32,
    /// The kind of the entry, e.g. `member_joined`.
    pub kind: String,
    /// The human-readable description.
    pub description: String,
    /// When the entry was recorded.
    pub at: NaiveDateTime,
}

impl ActivityEntry {
    /// Creates an entry stamped with the current time.
    pub fn new(
        subject_id: u32,
        actor_id: u32,
        kind: impl Into<String>,
        description: impl Into<String>,
    ) -> Self {
        Self {
            subject_id,
            actor_id,
            kind: kind.into(),
            description: description.into(),
            at: chrono::Utc::now().naive_utc(),
        }
    }
}

/// Error returned by a sink that could not take an event.
#[derive(thiserror::Error, Debug)]
#[error("sink unavailable: {0}")]
pub struct SinkError(pub String);

/// Consumer of user notifications.
pub trait NotificationSink: Send + Sync {
    /// Takes a notification for delivery.
    fn notify(&self, notification: Notification) -> Result<(), SinkError>;
}

/// Consumer of activity-log entries.
pub trait ActivityLog: Send + Sync {
    /// Takes an entry for recording.
    fn record(&self, entry: ActivityEntry) -> Result<(), SinkError>;
}

/// The pair of sinks the core library emits to.
#[derive(Clone)]
pub struct Sinks {
    /// Where user notifications go.
    pub notifications: Arc<dyn NotificationSink>,
    /// Where activity entries go.
    pub activity: Arc<dyn ActivityLog>,
}

impl Sinks {
    /// Sinks dropping every event. Useful for tools that mutate state without a
    /// delivery pipeline around.
    pub fn discard() -> Self {
        Self {
            notifications: Arc::new(Discard),
            activity: Arc::new(Discard),
        }
    }

    /// Sinks recording every event in memory, with the recorder to inspect them.
    pub fn recording() -> (Self, Arc<Memory>) {
        let memory = Memory::new();
        (
            Self {
                notifications: memory.clone(),
                activity: memory.clone(),
            },
            memory,
        )
    }
}

/// A sink that drops every event.
pub struct Discard;

impl NotificationSink for Discard {
    fn notify(&self, _: Notification) -> Result<(), SinkError> {
        Ok(())
    }
}

impl ActivityLog for Discard {
    fn record(&self, _: ActivityEntry) -> Result<(), SinkError> {
        Ok(())
    }
}

/// An event flowing out of a [`Buffer`] sink.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub enum Event {
    /// A user notification.
    Notification(Notification),
    /// An activity-log entry.
    Activity(ActivityEntry),
}

/// A sink pushing events on an unbounded channel, drained by a delivery task.
pub struct Buffer {
    tx: mpsc::UnboundedSender<Event>,
}

impl Buffer {
    /// Creates the sink along with the stream of events it will produce.
    pub fn new() -> (Arc<Self>, UnboundedReceiverStream<Event>) {
        let (tx, rx) = mpsc::unbounded_channel();
        (Arc::new(Self { tx }), UnboundedReceiverStream::new(rx))
    }

    fn push(&self, event: Event) -> Result<(), SinkError> {
        self.tx
            .send(event)
            .map_err(|e| SinkError(format!("delivery task is gone: {e}")))
    }
}

impl NotificationSink for Buffer {
    fn notify(&self, notification: Notification) -> Result<(), SinkError> {
        self.push(Event::Notification(notification))
    }
}

impl ActivityLog for Buffer {
    fn record(&self, entry: ActivityEntry) -> Result<(), SinkError> {
        self.push(Event::Activity(entry))
    }
}

/// A sink recording events in memory, in emission order. Used by tests.
#[derive(Default)]
pub struct Memory {
    events: Mutex<Vec<Event>>,
}

impl Memory {
    /// Creates an empty recorder.
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    /// Returns a copy of everything recorded so far.
    pub fn events(&self) -> Vec<Event> {
        self.events.lock().clone()
    }

    /// Returns the recorded notifications.
    pub fn notifications(&self) -> Vec<Notification> {
        self.events()
            .into_iter()
            .filter_map(|event| match event {
                Event::Notification(n) => Some(n),
                Event::Activity(_) => None,
            })
            .collect()
    }

    /// Returns the recorded activity entries.
    pub fn activity(&self) -> Vec<ActivityEntry> {
        self.events()
            .into_iter()
            .filter_map(|event| match event {
                Event::Activity(e) => Some(e),
                Event::Notification(_) => None,
            })
            .collect()
    }
}

impl NotificationSink for Memory {
    fn notify(&self, notification: Notification) -> Result<(), SinkError> {
        self.events.lock().push(Event::Notification(notification));
        Ok(())
    }
}

impl ActivityLog for Memory {
    fn record(&self, entry: ActivityEntry) -> Result<(), SinkError> {
        self.events.lock().push(Event::Activity(entry));
        Ok(())
    }
}
