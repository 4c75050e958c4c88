use std::collections::{BTreeMap, HashSet};

use bigdecimal::BigDecimal;
use chrono::{DateTime, Duration, Utc};
use serde::Serialize;

use crate::domain::errors::DomainError;
use crate::domain::fulfillment::OrderType;
use crate::domain::kitchen::KitchenTicket;
use crate::domain::order::{round_currency, Order, OrderReceipt};
use crate::domain::ports::Clock;
use crate::domain::table::{format_elapsed, Table, TableStatus};

/// Seating time after which an occupied table is flagged as overdue.
pub const DEFAULT_SEATING_MINUTES: i64 = 60;

/// One table as shown on the floor board.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TableCard {
    pub number: u32,
    pub capacity: u32,
    pub status: TableStatus,
    pub customer: Option<String>,
    pub server: Option<String>,
    pub minutes_seated: Option<i64>,
    pub elapsed_label: Option<String>,
    pub overdue: bool,
    pub order_total: Option<BigDecimal>,
}

/// The venue's tables, addressed by table number.
#[derive(Debug)]
pub struct FloorService {
    tables: Vec<Table>,
    seating_duration: Duration,
    kitchen_minutes: i64,
}

impl FloorService {
    pub fn new(tables: Vec<Table>) -> Result<Self, DomainError> {
        let mut seen = HashSet::new();
        for table in &tables {
            if !seen.insert(table.number()) {
                return Err(DomainError::DuplicateTable(table.number()));
            }
        }
        Ok(Self {
            tables,
            seating_duration: Duration::minutes(DEFAULT_SEATING_MINUTES),
            kitchen_minutes: OrderType::DineIn.default_estimate_minutes(),
        })
    }

    pub fn with_seating_duration(mut self, seating_duration: Duration) -> Self {
        self.seating_duration = seating_duration;
        self
    }

    pub fn with_kitchen_minutes(mut self, kitchen_minutes: i64) -> Self {
        self.kitchen_minutes = kitchen_minutes;
        self
    }

    pub fn tables(&self) -> &[Table] {
        &self.tables
    }

    pub fn table(&self, number: u32) -> Result<&Table, DomainError> {
        self.tables
            .iter()
            .find(|t| t.number() == number)
            .ok_or(DomainError::TableNotFound(number))
    }

    pub fn table_mut(&mut self, number: u32) -> Result<&mut Table, DomainError> {
        self.tables
            .iter_mut()
            .find(|t| t.number() == number)
            .ok_or(DomainError::TableNotFound(number))
    }

    /// The order of a table whose party can still change it.
    pub fn order_mut(&mut self, number: u32) -> Result<&mut Order, DomainError> {
        self.table_mut(number)?
            .order_mut()
            .ok_or(DomainError::NoOpenOrder(number))
    }

    pub fn reserve(
        &mut self,
        number: u32,
        customer: &str,
        party_size: u32,
        time: DateTime<Utc>,
        now: DateTime<Utc>,
    ) -> Result<(), DomainError> {
        self.table_mut(number)?
            .reserve(customer, party_size, time, now)
    }

    pub fn seat(
        &mut self,
        number: u32,
        customer: &str,
        party_size: u32,
        server: Option<&str>,
        now: DateTime<Utc>,
    ) -> Result<(), DomainError> {
        self.table_mut(number)?
            .seat(customer, party_size, server.map(str::to_string), now)
    }

    pub fn begin_ordering(&mut self, number: u32) -> Result<(), DomainError> {
        self.table_mut(number)?.begin_ordering()
    }

    pub fn send_order_to_kitchen(
        &mut self,
        number: u32,
        now: DateTime<Utc>,
    ) -> Result<KitchenTicket, DomainError> {
        let minutes = self.kitchen_minutes;
        self.table_mut(number)?.send_order_to_kitchen(now, minutes)
    }

    pub fn request_bill(&mut self, number: u32) -> Result<(), DomainError> {
        self.table_mut(number)?.request_bill()
    }

    pub fn complete_checkout(&mut self, number: u32) -> Result<OrderReceipt, DomainError> {
        self.table_mut(number)?.complete_checkout()
    }

    pub fn mark_clean(&mut self, number: u32) -> Result<(), DomainError> {
        self.table_mut(number)?.mark_clean()
    }

    pub fn free(&mut self, number: u32) -> Result<Option<Order>, DomainError> {
        Ok(self.table_mut(number)?.free())
    }

    /// Available tables that can seat `party_size`, smallest first.
    pub fn available_for(&self, party_size: u32) -> Vec<&Table> {
        let mut fits: Vec<&Table> = self
            .tables
            .iter()
            .filter(|t| t.status() == TableStatus::Available && t.capacity() >= party_size)
            .collect();
        fits.sort_by_key(|t| (t.capacity(), t.number()));
        fits
    }

    /// Number of tables per status; every status is present.
    pub fn status_counts(&self) -> BTreeMap<TableStatus, usize> {
        let mut counts: BTreeMap<TableStatus, usize> =
            TableStatus::ALL.into_iter().map(|s| (s, 0)).collect();
        for table in &self.tables {
            *counts.entry(table.status()).or_default() += 1;
        }
        counts
    }

    /// Renders every table against a single reading of `clock`.
    pub fn board(&self, clock: &dyn Clock) -> Vec<TableCard> {
        self.board_at(clock.now())
    }

    pub fn board_at(&self, now: DateTime<Utc>) -> Vec<TableCard> {
        self.tables.iter().map(|t| self.card(t, now)).collect()
    }

    fn card(&self, table: &Table, now: DateTime<Utc>) -> TableCard {
        let customer = table
            .party()
            .map(|p| p.customer.clone())
            .or_else(|| table.reservation().map(|r| r.customer.clone()));
        let elapsed_label = table
            .seated_at()
            .or_else(|| table.reservation().map(|r| r.time))
            .map(|t| format_elapsed(t, now));

        TableCard {
            number: table.number(),
            capacity: table.capacity(),
            status: table.status(),
            customer,
            server: table.server().map(str::to_string),
            minutes_seated: table.minutes_since_seated(now),
            elapsed_label,
            overdue: table.is_overdue(self.seating_duration, now),
            order_total: table
                .order()
                .filter(|o| !o.is_empty())
                .map(|o| round_currency(&o.compute_totals().total)),
        }
    }
}

#[cfg(test)]
mod tests {
    use std::str::FromStr;

    use chrono::TimeZone;
    use uuid::Uuid;

    use super::*;
    use crate::domain::ports::FixedClock;

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 5, 1, 19, 0, 0).unwrap()
    }

    fn floor() -> FloorService {
        FloorService::new(vec![
            Table::new(1, 2),
            Table::new(2, 4),
            Table::new(3, 6),
            Table::new(6, 8),
        ])
        .expect("unique tables")
    }

    #[test]
    fn duplicate_numbers_are_rejected() {
        let result = FloorService::new(vec![Table::new(1, 2), Table::new(1, 4)]);
        assert!(matches!(result, Err(DomainError::DuplicateTable(1))));
    }

    #[test]
    fn unknown_table_is_reported() {
        let mut floor = floor();
        assert_eq!(floor.begin_ordering(42), Err(DomainError::TableNotFound(42)));
    }

    #[test]
    fn status_counts_cover_every_status() {
        let mut floor = floor();
        floor.seat(2, "Mike Davis", 3, Some("Bob"), now()).unwrap();
        floor
            .reserve(3, "Sarah Johnson", 4, now() + Duration::minutes(30), now())
            .unwrap();

        let counts = floor.status_counts();

        assert_eq!(counts.len(), TableStatus::ALL.len());
        assert_eq!(counts[&TableStatus::Available], 2);
        assert_eq!(counts[&TableStatus::Seated], 1);
        assert_eq!(counts[&TableStatus::Reserved], 1);
        assert_eq!(counts[&TableStatus::Cleaning], 0);
    }

    #[test]
    fn available_for_prefers_smallest_fit() {
        let mut floor = floor();
        floor.seat(2, "Mike Davis", 3, None, now()).unwrap();

        let numbers: Vec<u32> = floor.available_for(3).iter().map(|t| t.number()).collect();

        assert_eq!(numbers, vec![3, 6]);
    }

    #[test]
    fn board_uses_one_sampled_time() {
        let mut floor = floor().with_seating_duration(Duration::minutes(40));
        floor.seat(1, "John Smith", 2, Some("Alice"), now()).unwrap();
        floor
            .seat(2, "Lisa Brown", 2, None, now() + Duration::minutes(20))
            .unwrap();
        floor
            .order_mut(1)
            .unwrap()
            .add_item(Uuid::new_v4(), BigDecimal::from_str("10.00").unwrap(), 1)
            .unwrap();

        let board = floor.board(&FixedClock(now() + Duration::minutes(45)));

        assert_eq!(board[0].minutes_seated, Some(45));
        assert!(board[0].overdue);
        assert_eq!(board[0].elapsed_label.as_deref(), Some("45m ago"));
        assert_eq!(board[0].order_total, Some(BigDecimal::from_str("10.80").unwrap()));
        assert_eq!(board[1].minutes_seated, Some(25));
        assert!(!board[1].overdue);
        assert_eq!(board[1].order_total, None);
        assert_eq!(board[2].minutes_seated, None);
    }

    #[test]
    fn reserved_card_shows_upcoming_time() {
        let mut floor = floor();
        floor
            .reserve(3, "Sarah Johnson", 4, now() + Duration::minutes(30), now())
            .unwrap();

        let board = floor.board_at(now());
        let card = board.iter().find(|c| c.number == 3).unwrap();

        assert_eq!(card.customer.as_deref(), Some("Sarah Johnson"));
        assert_eq!(card.elapsed_label.as_deref(), Some("in 30m"));
        assert!(!card.overdue);
    }

    #[test]
    fn order_mut_on_free_table_is_rejected() {
        let mut floor = floor();
        assert!(matches!(floor.order_mut(1), Err(DomainError::NoOpenOrder(1))));
    }

    #[test]
    fn billed_order_cannot_be_edited_and_still_checks_out() {
        let mut floor = floor();
        let pizza = Uuid::new_v4();
        floor.seat(2, "Mike Davis", 3, None, now()).unwrap();
        floor.begin_ordering(2).unwrap();
        floor
            .order_mut(2)
            .unwrap()
            .add_item(pizza, BigDecimal::from_str("16.99").unwrap(), 1)
            .unwrap();
        let ticket = floor.send_order_to_kitchen(2, now()).unwrap();
        assert_eq!(ticket.estimated_minutes, 20);
        floor.request_bill(2).unwrap();

        assert!(matches!(floor.order_mut(2), Err(DomainError::NoOpenOrder(2))));

        let receipt = floor.complete_checkout(2).unwrap();
        assert_eq!(receipt.lines.len(), 1);
        assert_eq!(floor.table(2).unwrap().status(), TableStatus::Cleaning);
    }
}
