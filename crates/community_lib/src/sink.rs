//! Fire-and-forget emission helpers.
//!
//! A refused event is worth a log line, never a rollback: the state change that
//! produced it has already committed.

use notifier::{ActivityEntry, Notification, Sinks};

pub(crate) fn notify(sinks: &Sinks, notification: Notification) {
    if let Err(e) = sinks.notifications.notify(notification) {
        tracing::warn!("notification dropped: {e}");
    }
}

pub(crate) fn record_activity(sinks: &Sinks, entry: ActivityEntry) {
    if let Err(e) = sinks.activity.record(entry) {
        tracing::warn!("activity entry dropped: {e}");
    }
}
