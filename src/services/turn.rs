use std::sync::{Mutex, MutexGuard};

use rust_fsm::*;

state_machine! {
    turn_flow(Idle)

    Idle(Submit) => Busy,
    Busy(Settle) => Idle
}

/// Admits one in-flight turn at a time.
pub struct TurnGate {
    machine: Mutex<turn_flow::StateMachine>,
}

/// Returns the gate to idle when dropped, whatever way the turn ended.
pub struct TurnGuard<'a> {
    gate: &'a TurnGate,
}

impl TurnGate {
    pub fn new() -> Self {
        Self {
            machine: Mutex::new(turn_flow::StateMachine::new()),
        }
    }

    fn lock(&self) -> MutexGuard<'_, turn_flow::StateMachine> {
        match self.machine.lock() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        }
    }

    pub fn is_busy(&self) -> bool {
        matches!(self.lock().state(), turn_flow::State::Busy)
    }

    pub fn try_begin(&self) -> Option<TurnGuard<'_>> {
        self.lock().consume(&turn_flow::Input::Submit).ok()?;
        Some(TurnGuard { gate: self })
    }

    fn settle(&self) {
        let _ = self.lock().consume(&turn_flow::Input::Settle);
    }
}

impl Default for TurnGate {
    fn default() -> Self {
        Self::new()
    }
}

impl Drop for TurnGuard<'_> {
    fn drop(&mut self) {
        self.gate.settle();
    }
}
