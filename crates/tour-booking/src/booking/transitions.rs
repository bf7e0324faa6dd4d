//! Booking request state machine.
//!
//! `new` is the initial status and is assigned at creation, not reached through a
//! transition. `rejected` and `cancelled` are terminal.

use super::domain::BookingStatus::{self, *};

const TRANSITION_TABLE: [(BookingStatus, &[BookingStatus]); 7] = [
    (New, &[Inquiring, Rejected]),
    (Inquiring, &[PendingPayment, Rejected]),
    (PendingPayment, &[Paid, Cancelled]),
    (Paid, &[Confirmed, Cancelled]),
    (Confirmed, &[Cancelled]),
    (Rejected, &[]),
    (Cancelled, &[]),
];

/// Statuses reachable in one step from `from`.
pub fn allowed_targets(from: BookingStatus) -> &'static [BookingStatus] {
    TRANSITION_TABLE
        .iter()
        .find(|(status, _)| *status == from)
        .map(|(_, targets)| *targets)
        .unwrap_or(&[])
}

pub fn is_allowed(from: BookingStatus, to: BookingStatus) -> bool {
    allowed_targets(from).contains(&to)
}

pub fn is_terminal(status: BookingStatus) -> bool {
    allowed_targets(status).is_empty()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn table_covers_every_status_once() {
        let listed: HashSet<_> = TRANSITION_TABLE.iter().map(|(status, _)| *status).collect();
        assert_eq!(listed.len(), TRANSITION_TABLE.len());
        for status in BookingStatus::ordered() {
            assert!(listed.contains(&status), "{status} missing from table");
        }
    }

    #[test]
    fn only_rejected_and_cancelled_are_terminal() {
        let terminal: Vec<_> = BookingStatus::ordered()
            .into_iter()
            .filter(|status| is_terminal(*status))
            .collect();
        assert_eq!(terminal, vec![Rejected, Cancelled]);
    }

    #[test]
    fn nothing_transitions_back_to_new() {
        for status in BookingStatus::ordered() {
            assert!(!is_allowed(status, New));
        }
    }

    #[test]
    fn new_requests_cannot_be_cancelled_directly() {
        assert!(!is_allowed(New, Cancelled));
        assert!(is_allowed(PendingPayment, Cancelled));
        assert!(is_allowed(Confirmed, Cancelled));
    }

    #[test]
    fn every_status_is_reachable_from_new() {
        let mut reached = HashSet::from([New]);
        let mut frontier = vec![New];
        while let Some(status) = frontier.pop() {
            for next in allowed_targets(status) {
                if reached.insert(*next) {
                    frontier.push(*next);
                }
            }
        }
        assert_eq!(reached.len(), BookingStatus::ordered().len());
    }
}
