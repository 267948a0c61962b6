//! Printable records of money movements.
//!
//! A [`Receipt`] is issued for every completed deposit or withdrawal. A
//! [`DiscrepancyReport`] is issued when a withdrawal left the ledger and
//! the cash unit disagreeing and automatic compensation gave up; it is
//! the customer's evidence for a dispute with the bank.
//!
//! Both are versioned and can be encoded as JSON or compact binary.

use crate::card::Card;
use chrono::{DateTime, Utc};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use uuid::Uuid;

/// Version identifier for the receipt format
pub const RECEIPT_VERSION: u32 = 1;

/// Errors that can occur while encoding or decoding receipts
#[derive(Debug, Error)]
pub enum ReceiptError {
    /// Serialization to JSON or binary format failed
    #[error("Serialization failed: {0}")]
    SerializationFailed(String),

    /// Deserialization from JSON or binary format failed
    #[error("Deserialization failed: {0}")]
    DeserializationFailed(String),

    /// Document version is not supported by this version
    #[error("Unsupported receipt version {found}, supported: {supported}")]
    UnsupportedVersion { found: u32, supported: u32 },
}

/// Direction of a money movement.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TransactionKind {
    Deposit,
    Withdrawal,
}

/// Record of a completed deposit or withdrawal.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Receipt {
    pub version: u32,
    pub id: Uuid,
    pub timestamp: DateTime<Utc>,
    /// Masked card number
    pub card: String,
    pub account_id: String,
    pub kind: TransactionKind,
    pub amount: u64,
}

impl Receipt {
    pub fn new(card: &Card, account_id: &str, kind: TransactionKind, amount: u64) -> Self {
        Self {
            version: RECEIPT_VERSION,
            id: Uuid::new_v4(),
            timestamp: Utc::now(),
            card: card.masked_number(),
            account_id: account_id.to_string(),
            kind,
            amount,
        }
    }

    pub fn to_json(&self) -> Result<String, ReceiptError> {
        to_json(self)
    }

    pub fn from_json(json: &str) -> Result<Self, ReceiptError> {
        let receipt: Self = from_json(json)?;
        check_version(receipt.version)?;
        Ok(receipt)
    }

    pub fn to_bytes(&self) -> Result<Vec<u8>, ReceiptError> {
        to_bytes(self)
    }

    pub fn from_bytes(bytes: &[u8]) -> Result<Self, ReceiptError> {
        let receipt: Self = from_bytes(bytes)?;
        check_version(receipt.version)?;
        Ok(receipt)
    }
}

/// Evidence that a withdrawal debited the ledger, dispensed nothing, and
/// could not be re-credited. The recorded balance is understated by
/// `amount` until the bank reconciles it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DiscrepancyReport {
    pub version: u32,
    pub id: Uuid,
    pub timestamp: DateTime<Utc>,
    /// Masked card number
    pub card: String,
    pub user_id: String,
    pub account_id: String,
    /// Bills debited but never dispensed
    pub amount: u64,
    /// Re-credit attempts made before giving up
    pub attempts: usize,
    /// Dispense fault that started the compensation
    pub dispense_error: String,
    /// Last ledger refusal seen while re-crediting
    pub last_ledger_error: Option<String>,
}

impl DiscrepancyReport {
    pub fn to_json(&self) -> Result<String, ReceiptError> {
        to_json(self)
    }

    pub fn from_json(json: &str) -> Result<Self, ReceiptError> {
        let report: Self = from_json(json)?;
        check_version(report.version)?;
        Ok(report)
    }

    pub fn to_bytes(&self) -> Result<Vec<u8>, ReceiptError> {
        to_bytes(self)
    }

    pub fn from_bytes(bytes: &[u8]) -> Result<Self, ReceiptError> {
        let report: Self = from_bytes(bytes)?;
        check_version(report.version)?;
        Ok(report)
    }
}

fn check_version(found: u32) -> Result<(), ReceiptError> {
    if found == RECEIPT_VERSION {
        Ok(())
    } else {
        Err(ReceiptError::UnsupportedVersion {
            found,
            supported: RECEIPT_VERSION,
        })
    }
}

fn to_json<T: Serialize>(value: &T) -> Result<String, ReceiptError> {
    serde_json::to_string_pretty(value).map_err(|e| ReceiptError::SerializationFailed(e.to_string()))
}

fn from_json<T: DeserializeOwned>(json: &str) -> Result<T, ReceiptError> {
    serde_json::from_str(json).map_err(|e| ReceiptError::DeserializationFailed(e.to_string()))
}

fn to_bytes<T: Serialize>(value: &T) -> Result<Vec<u8>, ReceiptError> {
    bincode::serialize(value).map_err(|e| ReceiptError::SerializationFailed(e.to_string()))
}

fn from_bytes<T: DeserializeOwned>(bytes: &[u8]) -> Result<T, ReceiptError> {
    bincode::deserialize(bytes).map_err(|e| ReceiptError::DeserializationFailed(e.to_string()))
}
