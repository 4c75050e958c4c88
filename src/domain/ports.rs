use chrono::{DateTime, Utc};
use uuid::Uuid;

use super::catalog::Product;

/// Read-only source of product names, prices and stock.
pub trait ProductCatalog {
    fn find(&self, product_id: Uuid) -> Option<Product>;
    fn products(&self) -> Vec<Product>;
}

/// Source of "now". Sample it once per rendering pass so every table in the
/// pass is measured against the same instant.
pub trait Clock {
    fn now(&self) -> DateTime<Utc>;
}

#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}

#[derive(Debug, Clone, Copy)]
pub struct FixedClock(pub DateTime<Utc>);

impl Clock for FixedClock {
    fn now(&self) -> DateTime<Utc> {
        self.0
    }
}
