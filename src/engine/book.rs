//! In-memory position book: the working set the manager mutates under its
//! lock, with reservation of in-flight operations and reconciliation swaps.

use tracing::{debug, info};

use crate::domain::{Address, InFlight, Operation, Outcome, Position, PositionState};
use crate::error::DcaError;

/// In-memory working set of positions, in insertion order.
#[derive(Debug, Default)]
pub struct PositionBook {
    positions: Vec<Position>,
}

impl PositionBook {
    pub fn new() -> Self {
        Self {
            positions: Vec::new(),
        }
    }

    pub fn insert(&mut self, position: Position) -> Result<(), DcaError> {
        if self.get(&position.id).is_some() {
            return Err(DcaError::InvalidArgument(format!(
                "duplicate position id {}",
                position.id
            )));
        }
        debug!(id = %position.id, "tracking position");
        self.positions.push(position);
        Ok(())
    }

    pub fn get(&self, id: &str) -> Option<&Position> {
        self.positions.iter().find(|p| p.id == id)
    }

    fn get_mut(&mut self, id: &str) -> Result<&mut Position, DcaError> {
        self.positions
            .iter_mut()
            .find(|p| p.id == id)
            .ok_or_else(|| DcaError::NotFound(id.to_string()))
    }

    /// Every tracked position, terminal ones included.
    pub fn all(&self) -> &[Position] {
        &self.positions
    }

    /// The active set: positions that are neither terminal nor unclassified.
    pub fn active(&self) -> Vec<&Position> {
        self.positions.iter().filter(|p| p.is_active()).collect()
    }

    pub fn confirm_create(&mut self, id: &str, record: Option<String>) -> Result<Position, DcaError> {
        let position = self.get_mut(id)?;
        position.confirm_creation(record)?;
        info!(id, "position creation confirmed");
        Ok(position.clone())
    }

    /// Drop a local projection whose create transaction the ledger rejected.
    pub fn reject_create(&mut self, id: &str) -> Result<Position, DcaError> {
        let idx = self
            .positions
            .iter()
            .position(|p| p.id == id)
            .ok_or_else(|| DcaError::NotFound(id.to_string()))?;
        if !self.positions[idx].is_pending() {
            return Err(DcaError::InvalidState(format!(
                "position {} is already confirmed",
                id
            )));
        }
        info!(id, "position creation rejected, dropping projection");
        Ok(self.positions.remove(idx))
    }

    /// Mark an operation as in flight before it is submitted, so a second
    /// submission for the same position is refused.
    pub fn reserve(&mut self, id: &str, operation: Operation) -> Result<(), DcaError> {
        let position = self.get_mut(id)?;
        if let Some(existing) = &position.in_flight {
            return Err(DcaError::InvalidState(format!(
                "position {} already has {} in flight",
                id, existing.operation
            )));
        }
        position.in_flight = Some(InFlight {
            operation,
            tx_id: None,
        });
        Ok(())
    }

    pub fn attach_tx(&mut self, id: &str, tx_id: String) -> Result<(), DcaError> {
        let position = self.get_mut(id)?;
        match position.in_flight.as_mut() {
            Some(in_flight) => {
                in_flight.tx_id = Some(tx_id);
                Ok(())
            }
            None => Err(DcaError::InvalidState(format!(
                "position {} has nothing in flight",
                id
            ))),
        }
    }

    /// Undo a reservation whose submission never reached the ledger.
    pub fn release(&mut self, id: &str) {
        if let Ok(position) = self.get_mut(id) {
            position.in_flight = None;
        }
    }

    pub fn settle(
        &mut self,
        id: &str,
        operation: Operation,
        outcome: &Outcome,
    ) -> Result<Position, DcaError> {
        let position = self.get_mut(id)?;
        match &position.in_flight {
            Some(InFlight {
                operation: op,
                tx_id: Some(_),
            }) if *op == operation => {}
            _ => {
                return Err(DcaError::InvalidState(format!(
                    "position {} has no submitted {} to settle",
                    id, operation
                )))
            }
        }

        let state = match operation {
            Operation::Execute => position.apply_execution(outcome)?,
            Operation::Cancel => position.apply_cancel(outcome)?,
            Operation::Create => {
                return Err(DcaError::InvalidArgument(
                    "creation is settled with confirm or reject".to_string(),
                ))
            }
        };
        info!(id, %operation, %state, "position settled");
        Ok(position.clone())
    }

    /// Swap `owner`'s confirmed positions for a freshly reconciled set.
    ///
    /// Other owners' positions are untouched. Pending projections and
    /// positions with an operation in flight are kept, and a reconciled
    /// position sharing a kept id is dropped.
    pub fn replace_reconciled(&mut self, owner: &Address, reconciled: Vec<Position>) {
        self.positions
            .retain(|p| p.owner != *owner || p.is_pending() || p.in_flight.is_some());
        for position in reconciled {
            if self.get(&position.id).is_none() {
                self.positions.push(position);
            }
        }
    }

    pub fn count_by_state(&self, state: PositionState) -> usize {
        self.positions.iter().filter(|p| p.state == state).count()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{Address, BlockHeight, Confirmation, CreatePositionParams};
    use std::str::FromStr;

    fn owner() -> Address {
        Address::from_str(&format!("aleo1{}", "o".repeat(58))).unwrap()
    }

    fn params(executions_remaining: u32) -> CreatePositionParams {
        CreatePositionParams {
            input_token_id: 1,
            input_amount: 100,
            output_token_id: 2,
            interval: 10,
            executions_remaining,
            min_output_amount: 90,
        }
    }

    fn other_owner() -> Address {
        Address::from_str(&format!("aleo1{}", "p".repeat(58))).unwrap()
    }

    fn confirmed_position(id: &str, executions_remaining: u32) -> Position {
        confirmed_position_for(id, owner(), executions_remaining)
    }

    fn confirmed_position_for(id: &str, owner: Address, executions_remaining: u32) -> Position {
        let mut p = Position::new_pending(
            id.to_string(),
            owner,
            &params(executions_remaining),
            BlockHeight::new(100),
            format!("tx-{}", id),
        )
        .unwrap();
        p.confirm_creation(Some(format!("{{ {} }}", id))).unwrap();
        p
    }

    #[test]
    fn test_insert_rejects_duplicate_ids() {
        let mut book = PositionBook::new();
        book.insert(confirmed_position("a", 2)).unwrap();
        assert!(book.insert(confirmed_position("a", 2)).is_err());
    }

    #[test]
    fn test_execute_cycle_through_book() {
        let mut book = PositionBook::new();
        book.insert(confirmed_position("a", 1)).unwrap();

        book.reserve("a", Operation::Execute).unwrap();
        assert!(book.reserve("a", Operation::Cancel).is_err());
        book.attach_tx("a", "at1exec".to_string()).unwrap();

        let settled = book
            .settle("a", Operation::Execute, &Outcome::Confirmed { record: None })
            .unwrap();
        assert_eq!(settled.state, PositionState::Exhausted);
        assert!(book.active().is_empty());
        assert_eq!(book.all().len(), 1);
    }

    #[test]
    fn test_settle_requires_matching_submission() {
        let mut book = PositionBook::new();
        book.insert(confirmed_position("a", 3)).unwrap();

        let err = book
            .settle("a", Operation::Execute, &Outcome::Confirmed { record: None })
            .unwrap_err();
        assert!(matches!(err, DcaError::InvalidState(_)));

        book.reserve("a", Operation::Cancel).unwrap();
        // Reserved but never accepted by custody.
        assert!(book
            .settle("a", Operation::Cancel, &Outcome::Confirmed { record: None })
            .is_err());
        book.release("a");
        assert!(book.get("a").unwrap().in_flight.is_none());
    }

    #[test]
    fn test_cancel_removes_from_active_set() {
        let mut book = PositionBook::new();
        book.insert(confirmed_position("a", 3)).unwrap();
        book.insert(confirmed_position("b", 3)).unwrap();

        book.reserve("a", Operation::Cancel).unwrap();
        book.attach_tx("a", "at1cancel".to_string()).unwrap();
        book.settle("a", Operation::Cancel, &Outcome::Confirmed { record: None })
            .unwrap();

        let active: Vec<&str> = book.active().iter().map(|p| p.id.as_str()).collect();
        assert_eq!(active, vec!["b"]);
        assert_eq!(book.count_by_state(PositionState::Cancelled), 1);
    }

    #[test]
    fn test_reject_only_pending() {
        let mut book = PositionBook::new();
        let pending = Position::new_pending(
            "p".to_string(),
            owner(),
            &params(2),
            BlockHeight::new(1),
            "tx".to_string(),
        )
        .unwrap();
        book.insert(pending).unwrap();
        book.insert(confirmed_position("c", 2)).unwrap();

        assert!(matches!(book.reject_create("c"), Err(DcaError::InvalidState(_))));
        assert_eq!(book.reject_create("p").unwrap().id, "p");
        assert!(matches!(book.reject_create("p"), Err(DcaError::NotFound(_))));
    }

    #[test]
    fn test_replace_reconciled_keeps_pending() {
        let mut book = PositionBook::new();
        let pending = Position::new_pending(
            "pending".to_string(),
            owner(),
            &params(2),
            BlockHeight::new(1),
            "tx".to_string(),
        )
        .unwrap();
        book.insert(pending).unwrap();
        book.insert(confirmed_position("stale", 2)).unwrap();

        book.replace_reconciled(&owner(), vec![confirmed_position("fresh", 4)]);

        let ids: Vec<&str> = book.all().iter().map(|p| p.id.as_str()).collect();
        assert_eq!(ids, vec!["pending", "fresh"]);
        assert_eq!(book.get("pending").unwrap().confirmation, Confirmation::Pending);
    }

    #[test]
    fn test_replace_reconciled_leaves_other_owners_alone() {
        let mut book = PositionBook::new();
        book.insert(confirmed_position("mine", 2)).unwrap();
        book.insert(confirmed_position_for("theirs", other_owner(), 2))
            .unwrap();

        book.replace_reconciled(&owner(), vec![confirmed_position("fresh", 4)]);

        let ids: Vec<&str> = book.all().iter().map(|p| p.id.as_str()).collect();
        assert_eq!(ids, vec!["theirs", "fresh"]);
        assert_eq!(book.get("theirs").unwrap().owner, other_owner());
    }

    #[test]
    fn test_replace_reconciled_keeps_in_flight() {
        let mut book = PositionBook::new();
        book.insert(confirmed_position("busy", 3)).unwrap();
        book.insert(confirmed_position("idle", 3)).unwrap();
        book.reserve("busy", Operation::Execute).unwrap();
        book.attach_tx("busy", "at1exec".to_string()).unwrap();

        let mut rebuilt = confirmed_position("busy", 2);
        rebuilt.record = Some("{ rebuilt }".to_string());
        book.replace_reconciled(&owner(), vec![rebuilt]);

        let ids: Vec<&str> = book.all().iter().map(|p| p.id.as_str()).collect();
        assert_eq!(ids, vec!["busy"]);
        let busy = book.get("busy").unwrap();
        assert_eq!(busy.executions_remaining, 3);
        assert_eq!(busy.record.as_deref(), Some("{ busy }"));

        // The submission can still be settled after the swap.
        let settled = book
            .settle("busy", Operation::Execute, &Outcome::Confirmed { record: None })
            .unwrap();
        assert_eq!(settled.executions_remaining, 2);
    }
}
