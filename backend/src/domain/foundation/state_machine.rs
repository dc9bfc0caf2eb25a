//! State machine trait for status enums.

use super::ValidationError;

/// Lifecycle status with a fixed transition table.
///
/// Implementors list the outgoing edges of each state; checking and
/// performing a transition come from that table.
///
/// ```ignore
/// let next = SubscriptionStatus::Pending.transition_to(SubscriptionStatus::Active)?;
/// ```
pub trait StateMachine: Sized + Copy + PartialEq + std::fmt::Debug {
    /// States reachable in one step from `self`.
    fn valid_transitions(&self) -> Vec<Self>;

    fn can_transition_to(&self, target: &Self) -> bool {
        self.valid_transitions().contains(target)
    }

    /// Returns `target` if the edge exists, otherwise a `status` validation error.
    fn transition_to(&self, target: Self) -> Result<Self, ValidationError> {
        if !self.can_transition_to(&target) {
            return Err(ValidationError::invalid_format(
                "status",
                format!("{:?} cannot move to {:?}", self, target),
            ));
        }
        Ok(target)
    }

    /// True when no edge leaves this state.
    fn is_terminal(&self) -> bool {
        self.valid_transitions().is_empty()
    }
}
