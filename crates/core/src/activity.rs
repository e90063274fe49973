//! Append-only activity log.

use crate::models::ActivityEvent;

/// Ordered record of committed state changes, oldest first.
#[derive(Debug, Default, Clone)]
pub struct ActivityLog {
    events: Vec<ActivityEvent>,
}

impl ActivityLog {
    /// Create an empty log.
    pub fn new() -> Self {
        Self::default()
    }

    pub(crate) fn from_events(events: Vec<ActivityEvent>) -> Self {
        Self { events }
    }

    /// Append an event.
    pub fn record(&mut self, event: ActivityEvent) {
        self.events.push(event);
    }

    /// Every recorded event in append order.
    pub fn all(&self) -> &[ActivityEvent] {
        &self.events
    }

    /// Most recent event.
    pub fn last(&self) -> Option<&ActivityEvent> {
        self.events.last()
    }

    /// Number of recorded events.
    pub fn len(&self) -> usize {
        self.events.len()
    }

    /// Whether nothing has been recorded yet.
    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{ActivityAction, MemberId};

    #[test]
    fn events_keep_append_order() {
        let mut log = ActivityLog::new();
        assert!(log.is_empty());
        log.record(ActivityEvent::now(ActivityAction::ItemAdded, None, Some("978-1".into())));
        log.record(ActivityEvent::now(
            ActivityAction::MemberRegistered,
            Some(MemberId::from(101)),
            None,
        ));

        let actions: Vec<_> = log.all().iter().map(|event| event.action).collect();
        assert_eq!(
            actions,
            [ActivityAction::ItemAdded, ActivityAction::MemberRegistered]
        );
        assert!(log.all()[0].timestamp <= log.all()[1].timestamp);
        assert_eq!(log.last().map(|event| event.action), Some(ActivityAction::MemberRegistered));
        assert_eq!(log.len(), 2);
    }
}
