use crate::bookings::{ActorRole, BookingAction, BookingError, BookingStatus};

/// Service for managing booking status transitions
pub struct StatusMachine;

impl StatusMachine {
    /// Check if a status transition is valid
    ///
    /// # Valid Transitions
    /// - Pending → Confirmed (confirm), Cancelled (decline/cancel)
    /// - Confirmed → Completed (complete), Cancelled (cancel)
    /// - Completed → (terminal, no transitions)
    /// - Cancelled → (terminal, no transitions)
    ///
    /// Repeating a transition is NOT idempotent: confirming an already
    /// confirmed booking is rejected, so a duplicate submission surfaces
    /// to its sender instead of silently succeeding.
    pub fn is_valid_transition(from: BookingStatus, to: BookingStatus) -> bool {
        match (from, to) {
            (BookingStatus::Pending, BookingStatus::Confirmed) => true,
            (BookingStatus::Pending, BookingStatus::Cancelled) => true,
            (BookingStatus::Confirmed, BookingStatus::Completed) => true,
            (BookingStatus::Confirmed, BookingStatus::Cancelled) => true,
            _ => false,
        }
    }

    /// Resolve an action to its target status
    pub fn target_status(action: BookingAction) -> BookingStatus {
        match action {
            BookingAction::Confirm => BookingStatus::Confirmed,
            BookingAction::Decline => BookingStatus::Cancelled,
            BookingAction::Complete => BookingStatus::Completed,
            BookingAction::Cancel => BookingStatus::Cancelled,
        }
    }

    /// Check whether a role is allowed to request an action
    ///
    /// # Permission table
    /// - confirm / decline: the chef
    /// - complete: the chef, or the system after the event time
    /// - cancel: the client or the chef
    pub fn is_permitted(action: BookingAction, role: ActorRole) -> bool {
        match (action, role) {
            (BookingAction::Confirm, ActorRole::Chef) => true,
            (BookingAction::Decline, ActorRole::Chef) => true,
            (BookingAction::Complete, ActorRole::Chef) => true,
            (BookingAction::Complete, ActorRole::System) => true,
            (BookingAction::Cancel, ActorRole::Client) => true,
            (BookingAction::Cancel, ActorRole::Chef) => true,
            _ => false,
        }
    }

    /// True when the action returns the booking's slot capacity
    ///
    /// Decline and cancel release the reservation taken at creation;
    /// completion keeps it consumed.
    pub fn releases_slot(action: BookingAction) -> bool {
        matches!(action, BookingAction::Decline | BookingAction::Cancel)
    }

    /// Validate an action against the current status and the actor's role
    ///
    /// # Returns
    /// `Ok(target)` when the transition is allowed, `Err` with the specific
    /// rejection otherwise. Permission is checked before the status so an
    /// unauthorized actor learns nothing about the booking's state.
    pub fn apply(
        from: BookingStatus,
        action: BookingAction,
        role: ActorRole,
    ) -> Result<BookingStatus, BookingError> {
        if !Self::is_permitted(action, role) {
            return Err(BookingError::Forbidden(format!(
                "Role {} may not {} a booking",
                role, action
            )));
        }

        // Decline only applies to a booking still awaiting the chef.
        if action == BookingAction::Decline && from != BookingStatus::Pending {
            return Err(BookingError::InvalidTransition(format!(
                "Cannot decline a {} booking",
                from
            )));
        }

        let to = Self::target_status(action);
        if Self::is_valid_transition(from, to) {
            Ok(to)
        } else {
            Err(BookingError::InvalidTransition(format!(
                "Invalid status transition from {} to {}",
                from, to
            )))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_valid_transitions() {
        assert!(StatusMachine::is_valid_transition(
            BookingStatus::Pending,
            BookingStatus::Confirmed
        ));
        assert!(StatusMachine::is_valid_transition(
            BookingStatus::Pending,
            BookingStatus::Cancelled
        ));
        assert!(StatusMachine::is_valid_transition(
            BookingStatus::Confirmed,
            BookingStatus::Completed
        ));
        assert!(StatusMachine::is_valid_transition(
            BookingStatus::Confirmed,
            BookingStatus::Cancelled
        ));
    }

    #[test]
    fn test_same_status_is_not_idempotent() {
        for status in [
            BookingStatus::Pending,
            BookingStatus::Confirmed,
            BookingStatus::Completed,
            BookingStatus::Cancelled,
        ] {
            assert!(
                !StatusMachine::is_valid_transition(status, status),
                "{} -> {} should be rejected",
                status,
                status
            );
        }
    }

    #[test]
    fn test_terminal_states_admit_nothing() {
        let all = [
            BookingStatus::Pending,
            BookingStatus::Confirmed,
            BookingStatus::Completed,
            BookingStatus::Cancelled,
        ];
        for from in [BookingStatus::Completed, BookingStatus::Cancelled] {
            for to in all {
                assert!(
                    !StatusMachine::is_valid_transition(from, to),
                    "{} -> {} should be rejected",
                    from,
                    to
                );
            }
        }
    }

    #[test]
    fn test_pending_cannot_complete_directly() {
        assert!(!StatusMachine::is_valid_transition(
            BookingStatus::Pending,
            BookingStatus::Completed
        ));
    }

    #[test]
    fn test_confirm_on_confirmed_is_invalid_transition() {
        let result = StatusMachine::apply(
            BookingStatus::Confirmed,
            BookingAction::Confirm,
            ActorRole::Chef,
        );
        assert!(matches!(result, Err(BookingError::InvalidTransition(_))));
    }

    #[test]
    fn test_permission_table() {
        assert!(StatusMachine::is_permitted(BookingAction::Confirm, ActorRole::Chef));
        assert!(!StatusMachine::is_permitted(BookingAction::Confirm, ActorRole::Client));
        assert!(!StatusMachine::is_permitted(BookingAction::Confirm, ActorRole::System));

        assert!(StatusMachine::is_permitted(BookingAction::Decline, ActorRole::Chef));
        assert!(!StatusMachine::is_permitted(BookingAction::Decline, ActorRole::Client));

        assert!(StatusMachine::is_permitted(BookingAction::Complete, ActorRole::Chef));
        assert!(StatusMachine::is_permitted(BookingAction::Complete, ActorRole::System));
        assert!(!StatusMachine::is_permitted(BookingAction::Complete, ActorRole::Client));

        assert!(StatusMachine::is_permitted(BookingAction::Cancel, ActorRole::Client));
        assert!(StatusMachine::is_permitted(BookingAction::Cancel, ActorRole::Chef));
        assert!(!StatusMachine::is_permitted(BookingAction::Cancel, ActorRole::System));
    }

    #[test]
    fn test_permission_checked_before_status() {
        // A client asking to confirm a completed booking sees Forbidden, not
        // InvalidTransition, so state is not leaked to unauthorized actors.
        let result = StatusMachine::apply(
            BookingStatus::Completed,
            BookingAction::Confirm,
            ActorRole::Client,
        );
        assert!(matches!(result, Err(BookingError::Forbidden(_))));
    }

    #[test]
    fn test_decline_only_from_pending() {
        let result = StatusMachine::apply(
            BookingStatus::Confirmed,
            BookingAction::Decline,
            ActorRole::Chef,
        );
        assert!(matches!(result, Err(BookingError::InvalidTransition(_))));

        let ok = StatusMachine::apply(
            BookingStatus::Pending,
            BookingAction::Decline,
            ActorRole::Chef,
        );
        assert_eq!(ok.unwrap(), BookingStatus::Cancelled);
    }

    #[test]
    fn test_slot_release_actions() {
        assert!(StatusMachine::releases_slot(BookingAction::Decline));
        assert!(StatusMachine::releases_slot(BookingAction::Cancel));
        assert!(!StatusMachine::releases_slot(BookingAction::Confirm));
        assert!(!StatusMachine::releases_slot(BookingAction::Complete));
    }

    #[test]
    fn test_apply_happy_paths() {
        assert_eq!(
            StatusMachine::apply(BookingStatus::Pending, BookingAction::Confirm, ActorRole::Chef)
                .unwrap(),
            BookingStatus::Confirmed
        );
        assert_eq!(
            StatusMachine::apply(
                BookingStatus::Confirmed,
                BookingAction::Complete,
                ActorRole::System
            )
            .unwrap(),
            BookingStatus::Completed
        );
        assert_eq!(
            StatusMachine::apply(
                BookingStatus::Confirmed,
                BookingAction::Cancel,
                ActorRole::Client
            )
            .unwrap(),
            BookingStatus::Cancelled
        );
    }
}

#[cfg(test)]
mod property_tests {
    use super::*;
    use proptest::prelude::*;

    fn any_status() -> impl Strategy<Value = BookingStatus> {
        prop_oneof![
            Just(BookingStatus::Pending),
            Just(BookingStatus::Confirmed),
            Just(BookingStatus::Completed),
            Just(BookingStatus::Cancelled),
        ]
    }

    fn any_action() -> impl Strategy<Value = BookingAction> {
        prop_oneof![
            Just(BookingAction::Confirm),
            Just(BookingAction::Decline),
            Just(BookingAction::Complete),
            Just(BookingAction::Cancel),
        ]
    }

    fn any_role() -> impl Strategy<Value = ActorRole> {
        prop_oneof![
            Just(ActorRole::Client),
            Just(ActorRole::Chef),
            Just(ActorRole::System),
        ]
    }

    /// No action ever leaves a terminal state.
    #[test]
    fn prop_terminal_states_are_absorbing() {
        proptest!(|(action in any_action(), role in any_role())| {
            for from in [BookingStatus::Completed, BookingStatus::Cancelled] {
                prop_assert!(StatusMachine::apply(from, action, role).is_err());
            }
        });
    }

    /// Whenever apply succeeds, the result matches the transition table and
    /// is reachable in at most two hops from Pending.
    #[test]
    fn prop_apply_agrees_with_transition_table() {
        proptest!(|(from in any_status(), action in any_action(), role in any_role())| {
            if let Ok(to) = StatusMachine::apply(from, action, role) {
                prop_assert!(StatusMachine::is_valid_transition(from, to));
                prop_assert!(StatusMachine::is_permitted(action, role));
            }
        });
    }

    /// Unauthorized roles are always rejected regardless of status.
    #[test]
    fn prop_permission_is_necessary() {
        proptest!(|(from in any_status(), action in any_action(), role in any_role())| {
            if !StatusMachine::is_permitted(action, role) {
                prop_assert!(matches!(
                    StatusMachine::apply(from, action, role),
                    Err(BookingError::Forbidden(_))
                ));
            }
        });
    }
}
