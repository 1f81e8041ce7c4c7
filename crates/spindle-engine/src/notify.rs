//! Notification sink for post-commit events.
//!
//! Delivery (WhatsApp etc.) is owned by a collaborator. The engine fires
//! after commit and never awaits delivery inside a quota transaction: a
//! failure to notify must never roll back a recorded spin, so errors are
//! swallowed and logged here.

use serde::{Deserialize, Serialize};
use spindle_types::UserId;

/// Events the engine emits.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NotifyEvent {
    PrizeWon,
    BonusGranted,
}

/// Delivery failure, opaque to the engine.
#[derive(Debug, thiserror::Error)]
#[error("notification delivery failed: {0}")]
pub struct NotifyError(pub String);

/// Outbound delivery contract.
pub trait NotificationSink: Send + Sync {
    fn notify(
        &self,
        user_id: UserId,
        event: NotifyEvent,
        payload: &serde_json::Value,
    ) -> std::result::Result<(), NotifyError>;
}

/// Sink that drops everything. For tests and headless tooling.
pub struct NoopSink;

impl NotificationSink for NoopSink {
    fn notify(
        &self,
        _user_id: UserId,
        _event: NotifyEvent,
        _payload: &serde_json::Value,
    ) -> std::result::Result<(), NotifyError> {
        Ok(())
    }
}

/// Sink that logs events via `tracing`.
pub struct LogSink;

impl NotificationSink for LogSink {
    fn notify(
        &self,
        user_id: UserId,
        event: NotifyEvent,
        payload: &serde_json::Value,
    ) -> std::result::Result<(), NotifyError> {
        tracing::info!(user_id, ?event, %payload, "notification");
        Ok(())
    }
}

/// Fire-and-forget dispatch: failures are logged, never propagated.
pub(crate) fn dispatch(
    sink: &dyn NotificationSink,
    user_id: UserId,
    event: NotifyEvent,
    payload: serde_json::Value,
) {
    if let Err(e) = sink.notify(user_id, event, &payload) {
        tracing::warn!(user_id, ?event, error = %e, "notification dropped");
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct FailingSink;

    impl NotificationSink for FailingSink {
        fn notify(
            &self,
            _user_id: UserId,
            _event: NotifyEvent,
            _payload: &serde_json::Value,
        ) -> std::result::Result<(), NotifyError> {
            Err(NotifyError("gateway down".into()))
        }
    }

    #[test]
    fn test_dispatch_swallows_failures() {
        // Must not panic or propagate.
        dispatch(&FailingSink, 1, NotifyEvent::PrizeWon, serde_json::json!({"prize": "mug"}));
        dispatch(&NoopSink, 1, NotifyEvent::BonusGranted, serde_json::json!({}));
    }
}
