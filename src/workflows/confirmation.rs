use crate::workflows::order_status::{next_status, OrderStatus};
use statig::prelude::*;

/// Operator interactions around a single "advance status" control.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfirmationEvent {
    /// The advance control was activated for an order in `current`.
    Request { current: OrderStatus },
    Confirm,
    Cancel,
    Completed,
    Failed,
}

/// Confirm-then-commit flow: idle -> confirming -> pending -> idle.
///
/// Activations that arrive while a request is pending are swallowed, and a
/// terminal order never leaves `idle`.
#[derive(Debug, Default)]
pub struct AdvanceConfirmation;

#[state_machine(initial = "State::idle()", state(derive(Debug, Clone, PartialEq, Eq)))]
impl AdvanceConfirmation {
    #[state]
    fn idle(event: &ConfirmationEvent) -> Outcome<State> {
        match event {
            ConfirmationEvent::Request { current } => match next_status(*current) {
                Some(target) => {
                    tracing::debug!(from = %current, to = %target, "Awaiting confirmation");
                    Transition(State::confirming(target))
                }
                None => Handled,
            },
            _ => Handled,
        }
    }

    #[state]
    fn confirming(target: &OrderStatus, event: &ConfirmationEvent) -> Outcome<State> {
        match event {
            ConfirmationEvent::Confirm => Transition(State::pending(*target)),
            ConfirmationEvent::Cancel => {
                tracing::debug!(target_status = %target, "Advance cancelled by operator");
                Transition(State::idle())
            }
            _ => Handled,
        }
    }

    #[state]
    fn pending(target: &OrderStatus, event: &ConfirmationEvent) -> Outcome<State> {
        match event {
            ConfirmationEvent::Completed | ConfirmationEvent::Failed => {
                tracing::debug!(target_status = %target, outcome = ?event, "Advance settled");
                Transition(State::idle())
            }
            _ => Handled,
        }
    }
}

/// Owned handle around the confirmation state machine.
pub struct ConfirmationFlow {
    machine: StateMachine<AdvanceConfirmation>,
}

impl Default for ConfirmationFlow {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for ConfirmationFlow {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ConfirmationFlow")
            .field("state", self.machine.state())
            .finish()
    }
}

impl ConfirmationFlow {
    pub fn new() -> Self {
        Self {
            machine: AdvanceConfirmation.state_machine(),
        }
    }

    pub fn handle(&mut self, event: ConfirmationEvent) {
        self.machine.handle(&event);
    }

    /// Status awaiting confirmation or being requested.
    pub fn target(&self) -> Option<OrderStatus> {
        match self.machine.state() {
            State::Confirming { target } | State::Pending { target } => Some(*target),
            State::Idle { .. } => None,
        }
    }

    pub fn is_confirming(&self) -> bool {
        matches!(self.machine.state(), State::Confirming { .. })
    }

    pub fn is_pending(&self) -> bool {
        matches!(self.machine.state(), State::Pending { .. })
    }

    pub fn is_idle(&self) -> bool {
        matches!(self.machine.state(), State::Idle { .. })
    }
}
