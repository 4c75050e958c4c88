//! Order pricing and table lifecycle for a restaurant point of sale.
//!
//! [`Order`] derives a cart's totals; [`Table`] walks a seating through
//! `available → seated → ordering → eating → ready-to-pay → cleaning`.
//! [`FloorService`] and [`RegisterService`] tie them to a venue's tables and
//! product catalog; [`KitchenService`] runs the ticket queue.

pub mod application;
pub mod config;
pub mod domain;
pub mod errors;

pub use application::floor_service::{FloorService, TableCard};
pub use application::kitchen_service::{KitchenService, KitchenSummary};
pub use application::register_service::RegisterService;
pub use config::PosConfig;
pub use domain::catalog::{InMemoryCatalog, Product};
pub use domain::errors::DomainError;
pub use domain::fulfillment::{Fulfillment, OrderType};
pub use domain::kitchen::{ItemStatus, KitchenTicket, Priority, Station, TicketItem};
pub use domain::order::{LineItem, Order, OrderReceipt, Totals};
pub use domain::ports::{Clock, FixedClock, ProductCatalog, SystemClock};
pub use domain::table::{Table, TableStatus, Trigger};
pub use domain::transaction::{PaymentMethod, SalesSummary, Transaction, TransactionStatus};
pub use errors::AppError;

/// Builds the venue's floor from `(number, capacity)` pairs using the
/// configured tax rate and durations.
pub fn build_floor(
    config: &PosConfig,
    layout: &[(u32, u32)],
) -> Result<FloorService, DomainError> {
    let tables = layout
        .iter()
        .map(|&(number, capacity)| {
            Table::new(number, capacity).with_tax_rate(config.tax_rate.clone())
        })
        .collect();
    Ok(FloorService::new(tables)?
        .with_seating_duration(config.seating_duration())
        .with_kitchen_minutes(config.kitchen_minutes))
}
