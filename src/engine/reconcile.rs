//! Rebuild the active position set from wallet-held records.
//!
//! Records are the ledger's own encoding. Field extraction scans for
//! `name: <digits>` in the plaintext and is a stopgap until a schema-aware
//! decoder exists: anything it cannot read is reported, not trusted.

use serde::Serialize;
use sha2::{Digest, Sha256};
use std::str::FromStr;
use tracing::{debug, warn};

use crate::domain::{
    Address, BlockHeight, Confirmation, Position, PositionState, WalletRecord,
};

pub const FIELD_INPUT_TOKEN_ID: &str = "input_token_id";
pub const FIELD_INPUT_AMOUNT: &str = "input_amount";
pub const FIELD_OUTPUT_TOKEN_ID: &str = "output_token_id";
pub const FIELD_INTERVAL: &str = "interval";
pub const FIELD_EXECUTIONS_REMAINING: &str = "executions_remaining";
pub const FIELD_MIN_OUTPUT_AMOUNT: &str = "min_output_amount";
pub const FIELD_NEXT_EXECUTION_HEIGHT: &str = "next_execution_height";

/// A record whose fields could not all be read or break creation rules.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RecordIssue {
    pub record_index: usize,
    pub position_id: String,
    pub missing_fields: Vec<String>,
    /// Present but zero where a position requires a positive value.
    pub invalid_fields: Vec<String>,
}

impl RecordIssue {
    pub fn is_empty(&self) -> bool {
        self.missing_fields.is_empty() && self.invalid_fields.is_empty()
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ReconcileReport {
    pub positions: Vec<Position>,
    pub issues: Vec<RecordIssue>,
    pub skipped_spent: usize,
    pub skipped_other: usize,
}

impl ReconcileReport {
    /// Reconciled positions in the `Active` state.
    pub fn active(&self) -> impl Iterator<Item = &Position> {
        self.positions.iter().filter(|p| p.is_active())
    }
}

/// Reconstruct positions from `records` held by `owner`'s wallet.
///
/// Spent and non-position records are skipped. A record with unreadable
/// fields becomes an `Unknown` position with zeros in those fields and an
/// entry in `issues`, as does one holding a zero where creation requires a
/// positive value.
pub fn reconcile(owner: &Address, records: &[WalletRecord]) -> ReconcileReport {
    let mut report = ReconcileReport::default();

    for (index, record) in records.iter().enumerate() {
        if !record.is_position_kind() {
            report.skipped_other += 1;
            continue;
        }
        if record.spent {
            report.skipped_spent += 1;
            continue;
        }

        let (position, issue) = decode_position(owner, index, &record.plaintext);
        if !issue.is_empty() {
            warn!(
                index,
                id = %position.id,
                missing = ?issue.missing_fields,
                invalid = ?issue.invalid_fields,
                "position record has unreadable or invalid fields"
            );
            report.issues.push(issue);
        }
        report.positions.push(position);
    }

    debug!(
        positions = report.positions.len(),
        issues = report.issues.len(),
        skipped_spent = report.skipped_spent,
        "reconciliation finished"
    );
    report
}

fn decode_position(owner: &Address, index: usize, plaintext: &str) -> (Position, RecordIssue) {
    let mut missing = Vec::new();
    let mut read_u64 = |field: &str| -> u64 {
        extract_u64(plaintext, field).unwrap_or_else(|| {
            missing.push(field.to_string());
            0
        })
    };

    let input_token_id = read_u64(FIELD_INPUT_TOKEN_ID);
    let input_amount = read_u64(FIELD_INPUT_AMOUNT);
    let output_token_id = read_u64(FIELD_OUTPUT_TOKEN_ID);
    let min_output_amount = read_u64(FIELD_MIN_OUTPUT_AMOUNT);
    let interval = read_u32(plaintext, FIELD_INTERVAL, &mut missing);
    let executions_remaining = read_u32(plaintext, FIELD_EXECUTIONS_REMAINING, &mut missing);
    let next_execution_height = read_u32(plaintext, FIELD_NEXT_EXECUTION_HEIGHT, &mut missing);

    let owner = extract_owner(plaintext).unwrap_or_else(|| owner.clone());

    let invalid: Vec<String> = [
        (FIELD_INPUT_TOKEN_ID, input_token_id),
        (FIELD_INPUT_AMOUNT, input_amount),
        (FIELD_OUTPUT_TOKEN_ID, output_token_id),
        (FIELD_INTERVAL, u64::from(interval)),
        (FIELD_MIN_OUTPUT_AMOUNT, min_output_amount),
    ]
    .into_iter()
    .filter(|(field, value)| *value == 0 && !missing.iter().any(|m| m == field))
    .map(|(field, _)| field.to_string())
    .collect();

    let state = if !missing.is_empty() || !invalid.is_empty() {
        PositionState::Unknown
    } else if executions_remaining > 0 {
        PositionState::Active
    } else {
        PositionState::Exhausted
    };

    let id = local_id(index, plaintext);
    let issue = RecordIssue {
        record_index: index,
        position_id: id.clone(),
        missing_fields: missing,
        invalid_fields: invalid,
    };
    let position = Position {
        id,
        owner,
        input_token_id,
        output_token_id,
        input_amount,
        interval,
        executions_remaining,
        min_output_amount,
        next_execution_height: BlockHeight::new(next_execution_height),
        record: Some(plaintext.to_string()),
        state,
        confirmation: Confirmation::Confirmed,
        in_flight: None,
    };
    (position, issue)
}

fn read_u32(plaintext: &str, field: &str, missing: &mut Vec<String>) -> u32 {
    extract_u64(plaintext, field)
        .and_then(|v| u32::try_from(v).ok())
        .unwrap_or_else(|| {
            missing.push(field.to_string());
            0
        })
}

/// Value of the first `field: <digits>` occurrence, or `None` if the field
/// is absent, has no digits, or overflows.
pub fn extract_u64(plaintext: &str, field: &str) -> Option<u64> {
    let value = field_value(plaintext, field)?;
    let digits: String = value.chars().take_while(|c| c.is_ascii_digit()).collect();
    if digits.is_empty() {
        return None;
    }
    digits.parse().ok()
}

fn extract_owner(plaintext: &str) -> Option<Address> {
    let value = field_value(plaintext, "owner")?;
    let raw: String = value
        .chars()
        .take_while(|c| c.is_ascii_alphanumeric())
        .collect();
    Address::from_str(&raw).ok()
}

// Text following `field:` for the first whole-word match of `field`.
fn field_value<'a>(plaintext: &'a str, field: &str) -> Option<&'a str> {
    let mut from = 0;
    while let Some(offset) = plaintext[from..].find(field) {
        let start = from + offset;
        let end = start + field.len();
        from = end;

        let whole_word = plaintext[..start]
            .chars()
            .next_back()
            .map_or(true, |c| !(c.is_ascii_alphanumeric() || c == '_'));
        if !whole_word {
            continue;
        }
        if let Some(rest) = plaintext[end..].trim_start().strip_prefix(':') {
            return Some(rest.trim_start());
        }
    }
    None
}

fn local_id(index: usize, plaintext: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update((index as u64).to_le_bytes());
    hasher.update(plaintext.as_bytes());
    let hash = hasher.finalize();
    hex::encode(&hash[..8])
}
