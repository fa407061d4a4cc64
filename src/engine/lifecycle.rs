//! Position state machine.
//!
//! ```text
//! Active --execute ok--> Active      (executions_remaining - 1 > 0)
//! Active --execute ok--> Exhausted   (executions_remaining - 1 == 0)
//! Active --execute failed--> Active  (nothing changes)
//! Active --cancel ok--> Cancelled
//! ```
//! Exhausted and Cancelled accept nothing. A failed check never mutates.

use crate::domain::{BlockHeight, Confirmation, Operation, Outcome, Position, PositionState};
use crate::error::DcaError;

impl Position {
    /// Checks that must pass before an execute request is built.
    pub fn ensure_executable(&self, current_height: BlockHeight) -> Result<(), DcaError> {
        self.ensure_settled_state(Operation::Execute)?;
        if self.executions_remaining == 0 {
            return Err(DcaError::InvalidState(format!(
                "position {} has no executions remaining",
                self.id
            )));
        }
        self.ensure_submittable(Operation::Execute)?;
        if current_height < self.next_execution_height {
            return Err(DcaError::NotYetDue {
                next_execution_height: self.next_execution_height,
                current_height,
            });
        }
        Ok(())
    }

    /// Checks that must pass before a cancel request is built.
    pub fn ensure_cancellable(&self) -> Result<(), DcaError> {
        self.ensure_settled_state(Operation::Cancel)?;
        self.ensure_submittable(Operation::Cancel)
    }

    /// Apply the ledger outcome of an execute.
    ///
    /// Only a confirmed execution decrements the counter and advances the
    /// schedule by exactly one interval.
    pub fn apply_execution(&mut self, outcome: &Outcome) -> Result<PositionState, DcaError> {
        self.ensure_settled_state(Operation::Execute)?;
        if self.executions_remaining == 0 {
            return Err(DcaError::InvalidState(format!(
                "position {} has no executions remaining",
                self.id
            )));
        }

        match outcome {
            Outcome::Confirmed { record } => {
                let next = self.next_execution_height.advance(self.interval).ok_or_else(|| {
                    DcaError::InvalidState(format!(
                        "position {} schedule overflows the block height",
                        self.id
                    ))
                })?;
                self.executions_remaining -= 1;
                self.next_execution_height = next;
                self.record = record.clone();
                if self.executions_remaining == 0 {
                    self.state = PositionState::Exhausted;
                }
            }
            Outcome::Failed { .. } => {}
        }
        self.in_flight = None;
        Ok(self.state)
    }

    /// Apply the ledger outcome of a cancel.
    pub fn apply_cancel(&mut self, outcome: &Outcome) -> Result<PositionState, DcaError> {
        self.ensure_settled_state(Operation::Cancel)?;

        if let Outcome::Confirmed { .. } = outcome {
            self.state = PositionState::Cancelled;
            self.record = None;
        }
        self.in_flight = None;
        Ok(self.state)
    }

    /// The ledger accepted the create transaction.
    pub fn confirm_creation(&mut self, record: Option<String>) -> Result<(), DcaError> {
        if self.confirmation != Confirmation::Pending {
            return Err(DcaError::InvalidState(format!(
                "position {} is already confirmed",
                self.id
            )));
        }
        self.confirmation = Confirmation::Confirmed;
        self.record = record;
        self.in_flight = None;
        Ok(())
    }

    fn ensure_settled_state(&self, op: Operation) -> Result<(), DcaError> {
        if self.state.is_terminal() {
            return Err(DcaError::InvalidState(format!(
                "cannot {} position {}: it is {}",
                op, self.id, self.state
            )));
        }
        if self.state == PositionState::Unknown {
            return Err(DcaError::InvalidState(format!(
                "cannot {} position {}: its record could not be classified",
                op, self.id
            )));
        }
        Ok(())
    }

    fn ensure_submittable(&self, op: Operation) -> Result<(), DcaError> {
        if self.confirmation == Confirmation::Pending {
            return Err(DcaError::InvalidState(format!(
                "cannot {} position {}: creation not yet confirmed",
                op, self.id
            )));
        }
        if let Some(in_flight) = &self.in_flight {
            return Err(DcaError::InvalidState(format!(
                "cannot {} position {}: {} already in flight",
                op, self.id, in_flight.operation
            )));
        }
        match self.record.as_deref() {
            Some(r) if !r.trim().is_empty() => Ok(()),
            _ => Err(DcaError::InvalidState(format!(
                "cannot {} position {}: no backing record, reconcile first",
                op, self.id
            ))),
        }
    }
}
