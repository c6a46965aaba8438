//! Tamper-evident audit trail
//!
//! Every [`TransactionRecord`] stores the hash of its predecessor and its own
//! SHA-256 hash over its contents plus that predecessor hash. Altering,
//! dropping or reordering any record breaks every hash after it.

use crate::{types::TransactionRecord, AccountId, Error, Result};
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use sha2::{Digest, Sha256};
use uuid::Uuid;

/// Previous hash of the first record
pub const GENESIS_HASH: [u8; 32] = [0u8; 32];

/// Fields that go into a record hash
#[derive(Debug)]
pub(crate) struct RecordContents<'a> {
    pub sequence: u64,
    pub transaction_id: Uuid,
    pub amount: Decimal,
    pub fee: Decimal,
    pub source: &'a AccountId,
    pub destination: &'a AccountId,
    pub reason: &'a str,
    pub recorded_at: DateTime<Utc>,
}

/// Hash a record's contents chained onto `previous_hash`
pub(crate) fn hash_record(contents: &RecordContents<'_>, previous_hash: &[u8; 32]) -> [u8; 32] {
    let mut hasher = Sha256::new();
    hasher.update(previous_hash);
    hasher.update(contents.sequence.to_be_bytes());
    hasher.update(contents.transaction_id.as_bytes());
    update_str(&mut hasher, &contents.amount.normalize().to_string());
    update_str(&mut hasher, &contents.fee.normalize().to_string());
    update_str(&mut hasher, contents.source.as_str());
    update_str(&mut hasher, contents.destination.as_str());
    update_str(&mut hasher, contents.reason);
    hasher.update(
        contents
            .recorded_at
            .timestamp_nanos_opt()
            .unwrap_or(0)
            .to_be_bytes(),
    );
    hasher.finalize().into()
}

// Length prefix keeps ("ab", "c") and ("a", "bc") apart.
fn update_str(hasher: &mut Sha256, value: &str) {
    hasher.update((value.len() as u64).to_be_bytes());
    hasher.update(value.as_bytes());
}

/// Recompute a record's hash from its stored fields
pub fn recompute_hash(record: &TransactionRecord) -> [u8; 32] {
    let contents = RecordContents {
        sequence: record.sequence(),
        transaction_id: record.transaction_id(),
        amount: record.amount(),
        fee: record.fee(),
        source: record.source(),
        destination: record.destination(),
        reason: record.reason(),
        recorded_at: record.recorded_at(),
    };
    hash_record(&contents, record.previous_hash())
}

/// Verify sequence numbering and hash links of a full log
pub fn verify_chain(records: &[TransactionRecord]) -> Result<()> {
    let mut expected_previous = GENESIS_HASH;

    for (position, record) in records.iter().enumerate() {
        if record.sequence() != position as u64 {
            return Err(Error::AuditTrail(format!(
                "Record at position {} has sequence {}",
                position,
                record.sequence()
            )));
        }

        if record.previous_hash() != &expected_previous {
            return Err(Error::AuditTrail(format!(
                "Record {} does not link to its predecessor",
                record.sequence()
            )));
        }

        if &recompute_hash(record) != record.hash() {
            return Err(Error::AuditTrail(format!(
                "Record {} hash mismatch (transaction {})",
                record.sequence(),
                record.transaction_id()
            )));
        }

        expected_previous = *record.hash();
    }

    Ok(())
}

/// Lowercase hex rendering of a hash
pub fn to_hex(hash: &[u8; 32]) -> String {
    hash.iter().map(|byte| format!("{:02x}", byte)).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn build_chain(count: u64) -> Vec<TransactionRecord> {
        let source = AccountId::new("123");
        let destination = AccountId::new("456");
        let mut previous = GENESIS_HASH;
        let mut records = Vec::new();

        for sequence in 0..count {
            let contents = RecordContents {
                sequence,
                transaction_id: Uuid::now_v7(),
                amount: Decimal::from(100 + sequence),
                fee: Decimal::new(125, 1),
                source: &source,
                destination: &destination,
                reason: "rent",
                recorded_at: Utc::now(),
            };
            let hash = hash_record(&contents, &previous);
            records.push(TransactionRecord {
                sequence,
                transaction_id: contents.transaction_id,
                amount: contents.amount,
                fee: contents.fee,
                source: source.clone(),
                destination: destination.clone(),
                reason: contents.reason.to_string(),
                recorded_at: contents.recorded_at,
                previous_hash: previous,
                hash,
            });
            previous = hash;
        }

        records
    }

    #[test]
    fn test_empty_chain_verifies() {
        assert!(verify_chain(&[]).is_ok());
    }

    #[test]
    fn test_chain_verifies() {
        let records = build_chain(5);
        assert!(verify_chain(&records).is_ok());
        assert_eq!(records[0].previous_hash(), &GENESIS_HASH);
        assert_eq!(records[1].previous_hash(), records[0].hash());
    }

    #[test]
    fn test_tampered_amount_detected() {
        let mut records = build_chain(3);
        records[1].amount = Decimal::from(1);

        let err = verify_chain(&records).unwrap_err();
        assert!(matches!(err, Error::AuditTrail(_)));
        assert!(err.to_string().contains("Record 1"));
    }

    #[test]
    fn test_dropped_record_detected() {
        let mut records = build_chain(3);
        records.remove(1);
        assert!(verify_chain(&records).is_err());
    }

    #[test]
    fn test_hash_ignores_decimal_scale() {
        let records = build_chain(1);
        let mut rescaled = records[0].clone();
        rescaled.fee = Decimal::new(12500, 3);
        assert_eq!(recompute_hash(&rescaled), *records[0].hash());
    }

    #[test]
    fn test_to_hex() {
        let mut hash = [0u8; 32];
        hash[0] = 0xab;
        hash[31] = 0x01;
        let hex = to_hex(&hash);
        assert_eq!(hex.len(), 64);
        assert!(hex.starts_with("ab00"));
        assert!(hex.ends_with("01"));
    }
}
