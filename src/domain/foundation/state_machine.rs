//! State machine trait for lifecycle status enums.

use super::ValidationError;

/// Status enums with a fixed set of allowed transitions.
///
/// Implementors list the outgoing edges; validation and terminal checks
/// follow from that list.
pub trait StateMachine: Sized + Copy + PartialEq + std::fmt::Debug {
    /// All states reachable in one step from `self`.
    fn valid_transitions(&self) -> Vec<Self>;

    fn can_transition_to(&self, target: &Self) -> bool {
        self.valid_transitions().contains(target)
    }

    /// Performs the transition, failing if the edge does not exist.
    fn transition_to(&self, target: Self) -> Result<Self, ValidationError> {
        if self.can_transition_to(&target) {
            Ok(target)
        } else {
            Err(ValidationError::invalid_format(
                "state_transition",
                format!("Cannot transition from {:?} to {:?}", self, target),
            ))
        }
    }

    fn is_terminal(&self) -> bool {
        self.valid_transitions().is_empty()
    }
}
