use bigdecimal::BigDecimal;
use thiserror::Error;
use uuid::Uuid;

use super::kitchen::ItemStatus;
use super::table::{TableStatus, Trigger};
use super::transaction::TransactionStatus;

#[derive(Debug, Clone, PartialEq, Error)]
pub enum DomainError {
    #[error("Invalid quantity {quantity} for product {product_id}")]
    InvalidQuantity { product_id: Uuid, quantity: i32 },

    #[error("Invalid unit price {0}: must not be negative")]
    InvalidPrice(BigDecimal),

    #[error("Invalid discount {0}%: must be between 0 and 100")]
    InvalidDiscount(BigDecimal),

    #[error("Item not found: {0}")]
    ItemNotFound(Uuid),

    #[error("Order has no items")]
    EmptyOrder,

    #[error("Cannot {trigger} while {status}; allowed: {}", format_triggers(.allowed))]
    IllegalTransition {
        status: TableStatus,
        trigger: Trigger,
        allowed: Vec<Trigger>,
    },

    #[error("Party of {party_size} exceeds capacity {capacity} of table {table}")]
    CapacityExceeded {
        table: u32,
        party_size: u32,
        capacity: u32,
    },

    #[error("Invalid party size: {0}")]
    InvalidPartySize(u32),

    #[error("Reservation time must be in the future")]
    ReservationNotInFuture,

    #[error("Table not found: {0}")]
    TableNotFound(u32),

    #[error("Table {0} has no open order")]
    NoOpenOrder(u32),

    #[error("Duplicate table number: {0}")]
    DuplicateTable(u32),

    #[error("Product not found: {0}")]
    ProductNotFound(Uuid),

    #[error("Kitchen item cannot move from {from} to {to}")]
    IllegalItemTransition { from: ItemStatus, to: ItemStatus },

    #[error("Missing {0}")]
    MissingCustomerDetail(&'static str),

    #[error("Kitchen ticket not found: {0}")]
    TicketNotFound(Uuid),

    #[error("Kitchen ticket {0} still has items in progress")]
    TicketNotReady(Uuid),

    #[error("Transaction not found: {0}")]
    TransactionNotFound(Uuid),

    #[error("Transaction {id} is {status}, expected {expected}")]
    IllegalPaymentTransition {
        id: Uuid,
        status: TransactionStatus,
        expected: TransactionStatus,
    },
}

fn format_triggers(triggers: &[Trigger]) -> String {
    if triggers.is_empty() {
        return "none".to_string();
    }
    triggers
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join(", ")
}
