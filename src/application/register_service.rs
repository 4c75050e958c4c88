use bigdecimal::BigDecimal;
use chrono::{DateTime, Utc};
use uuid::Uuid;

use crate::domain::errors::DomainError;
use crate::domain::order::{round_currency, Order, OrderReceipt};
use crate::domain::ports::ProductCatalog;
use crate::domain::transaction::{PaymentMethod, SalesSummary, Transaction, TransactionStatus};

/// Counter register: prices orders from the catalog and keeps the day's
/// transactions.
pub struct RegisterService<C> {
    catalog: C,
    transactions: Vec<Transaction>,
}

impl<C: ProductCatalog> RegisterService<C> {
    pub fn new(catalog: C) -> Self {
        Self {
            catalog,
            transactions: Vec::new(),
        }
    }

    pub fn catalog(&self) -> &C {
        &self.catalog
    }

    /// Adds a catalog product to `order` at its current catalog price.
    pub fn add_product(
        &self,
        order: &mut Order,
        product_id: Uuid,
        quantity: i32,
    ) -> Result<(), DomainError> {
        let product = self
            .catalog
            .find(product_id)
            .ok_or(DomainError::ProductNotFound(product_id))?;
        order.add_item(product.product_id, product.unit_price, quantity)
    }

    pub fn checkout(
        &mut self,
        order: &mut Order,
        payment_method: PaymentMethod,
        now: DateTime<Utc>,
    ) -> Result<Transaction, DomainError> {
        let receipt = order.checkout()?;
        Ok(self.record_receipt(receipt, payment_method, now))
    }

    /// Records a receipt produced elsewhere, such as a table checkout.
    pub fn record_receipt(
        &mut self,
        receipt: OrderReceipt,
        payment_method: PaymentMethod,
        now: DateTime<Utc>,
    ) -> Transaction {
        let transaction = Transaction::completed(receipt, payment_method, now);
        log::info!(
            "transaction {} paid by {}: {}",
            transaction.id,
            payment_method,
            round_currency(&transaction.receipt.totals.total)
        );
        self.transactions.push(transaction.clone());
        transaction
    }

    /// Records a receipt whose payment has not cleared yet.
    pub fn hold_receipt(
        &mut self,
        receipt: OrderReceipt,
        payment_method: PaymentMethod,
        now: DateTime<Utc>,
    ) -> Transaction {
        let transaction = Transaction::pending(receipt, payment_method, now);
        log::info!(
            "transaction {} pending by {}",
            transaction.id,
            payment_method
        );
        self.transactions.push(transaction.clone());
        transaction
    }

    fn transaction_mut(&mut self, id: Uuid) -> Result<&mut Transaction, DomainError> {
        self.transactions
            .iter_mut()
            .find(|t| t.id == id)
            .ok_or(DomainError::TransactionNotFound(id))
    }

    pub fn complete(&mut self, id: Uuid, now: DateTime<Utc>) -> Result<&Transaction, DomainError> {
        let transaction = self.transaction_mut(id)?;
        transaction.complete(now)?;
        log::info!("transaction {} completed", id);
        Ok(transaction)
    }

    pub fn refund(&mut self, id: Uuid, now: DateTime<Utc>) -> Result<&Transaction, DomainError> {
        let transaction = self.transaction_mut(id)?;
        transaction.refund(now)?;
        log::info!(
            "transaction {} refunded: {}",
            id,
            round_currency(&transaction.receipt.totals.total)
        );
        Ok(transaction)
    }

    /// All transactions, newest first.
    pub fn transactions(&self) -> impl Iterator<Item = &Transaction> {
        self.transactions.iter().rev()
    }

    pub fn transactions_with_status(
        &self,
        status: TransactionStatus,
    ) -> impl Iterator<Item = &Transaction> {
        self.transactions().filter(move |t| t.status == status)
    }

    /// Exact sales over completed transactions only.
    pub fn summary(&self) -> SalesSummary {
        let completed: Vec<&Transaction> =
            self.transactions.iter().filter(|t| t.counts_as_sale()).collect();
        let total_sales = completed
            .iter()
            .fold(BigDecimal::from(0), |acc, t| acc + &t.receipt.totals.total);
        let count = completed.len();
        let average_ticket = if count == 0 {
            BigDecimal::from(0)
        } else {
            &total_sales / &BigDecimal::from(count as u64)
        };

        SalesSummary {
            completed_transactions: count,
            refunded_transactions: self
                .transactions_with_status(TransactionStatus::Refunded)
                .count(),
            total_sales,
            average_ticket,
        }
    }
}
