//! Event Filter: selects the audit events that fall inside the report window.

use crate::{AuditEvent, EventTime};

/// Returns the events whose timestamp is at or after `from`, in their original
/// order.
///
/// There is no upper bound: the audit log is only ever read up to "now".
pub fn filter_window<I>(events: I, from: EventTime) -> Vec<AuditEvent>
where
    I: IntoIterator<Item = AuditEvent>,
{
    events
        .into_iter()
        .filter(|event| event.timestamp >= from)
        .collect()
}
