use std::fmt;

use bigdecimal::BigDecimal;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::errors::DomainError;
use super::order::{round_currency, OrderReceipt};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PaymentMethod {
    Cash,
    Card,
    Digital,
}

impl fmt::Display for PaymentMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            PaymentMethod::Cash => "cash",
            PaymentMethod::Card => "card",
            PaymentMethod::Digital => "digital",
        })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TransactionStatus {
    Pending,
    Completed,
    Refunded,
}

impl fmt::Display for TransactionStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            TransactionStatus::Pending => "pending",
            TransactionStatus::Completed => "completed",
            TransactionStatus::Refunded => "refunded",
        })
    }
}

/// A checked-out order and what happened to its payment.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Transaction {
    pub id: Uuid,
    pub receipt: OrderReceipt,
    pub payment_method: PaymentMethod,
    pub status: TransactionStatus,
    pub created_at: DateTime<Utc>,
    pub completed_at: Option<DateTime<Utc>>,
    pub refunded_at: Option<DateTime<Utc>>,
}

impl Transaction {
    pub fn pending(
        receipt: OrderReceipt,
        payment_method: PaymentMethod,
        now: DateTime<Utc>,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            receipt,
            payment_method,
            status: TransactionStatus::Pending,
            created_at: now,
            completed_at: None,
            refunded_at: None,
        }
    }

    pub fn completed(
        receipt: OrderReceipt,
        payment_method: PaymentMethod,
        now: DateTime<Utc>,
    ) -> Self {
        let mut transaction = Self::pending(receipt, payment_method, now);
        transaction.status = TransactionStatus::Completed;
        transaction.completed_at = Some(now);
        transaction
    }

    fn expect_status(&self, expected: TransactionStatus) -> Result<(), DomainError> {
        if self.status != expected {
            return Err(DomainError::IllegalPaymentTransition {
                id: self.id,
                status: self.status,
                expected,
            });
        }
        Ok(())
    }

    /// Settles a pending payment.
    pub fn complete(&mut self, now: DateTime<Utc>) -> Result<(), DomainError> {
        self.expect_status(TransactionStatus::Pending)?;
        self.status = TransactionStatus::Completed;
        self.completed_at = Some(now);
        Ok(())
    }

    /// Refunds a completed payment in full.
    pub fn refund(&mut self, now: DateTime<Utc>) -> Result<(), DomainError> {
        self.expect_status(TransactionStatus::Completed)?;
        self.status = TransactionStatus::Refunded;
        self.refunded_at = Some(now);
        Ok(())
    }

    pub fn counts_as_sale(&self) -> bool {
        self.status == TransactionStatus::Completed
    }
}

/// Sales over completed transactions. Figures are exact; call
/// [`SalesSummary::rounded`] before showing them.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SalesSummary {
    pub completed_transactions: usize,
    pub refunded_transactions: usize,
    pub total_sales: BigDecimal,
    pub average_ticket: BigDecimal,
}

impl SalesSummary {
    pub fn rounded(&self) -> SalesSummary {
        SalesSummary {
            total_sales: round_currency(&self.total_sales),
            average_ticket: round_currency(&self.average_ticket),
            ..self.clone()
        }
    }
}
