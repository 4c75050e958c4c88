use std::fmt;

use bigdecimal::BigDecimal;
use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};

use super::errors::DomainError;
use super::fulfillment::Fulfillment;
use super::kitchen::KitchenTicket;
use super::order::{default_tax_rate, Order, OrderReceipt};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum TableStatus {
    Available,
    Reserved,
    Seated,
    Ordering,
    Eating,
    ReadyToPay,
    Cleaning,
}

impl TableStatus {
    pub const ALL: [TableStatus; 7] = [
        TableStatus::Available,
        TableStatus::Reserved,
        TableStatus::Seated,
        TableStatus::Ordering,
        TableStatus::Eating,
        TableStatus::ReadyToPay,
        TableStatus::Cleaning,
    ];

    pub fn allowed_triggers(self) -> Vec<Trigger> {
        Trigger::ALL
            .into_iter()
            .filter(|t| next_status(self, *t).is_some())
            .collect()
    }

    /// Whether a party is at the table.
    pub fn is_occupied(self) -> bool {
        matches!(
            self,
            TableStatus::Seated
                | TableStatus::Ordering
                | TableStatus::Eating
                | TableStatus::ReadyToPay
        )
    }

    /// Whether the party's order is still open for changes. Once the bill
    /// is requested the order is frozen until checkout.
    pub fn accepts_items(self) -> bool {
        matches!(
            self,
            TableStatus::Seated | TableStatus::Ordering | TableStatus::Eating
        )
    }
}

impl fmt::Display for TableStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            TableStatus::Available => "available",
            TableStatus::Reserved => "reserved",
            TableStatus::Seated => "seated",
            TableStatus::Ordering => "ordering",
            TableStatus::Eating => "eating",
            TableStatus::ReadyToPay => "ready-to-pay",
            TableStatus::Cleaning => "cleaning",
        })
    }
}

/// Staff actions that move a table through its lifecycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Trigger {
    Reserve,
    Seat,
    BeginOrdering,
    SendOrderToKitchen,
    RequestBill,
    CompleteCheckout,
    MarkClean,
    Free,
}

impl Trigger {
    pub const ALL: [Trigger; 8] = [
        Trigger::Reserve,
        Trigger::Seat,
        Trigger::BeginOrdering,
        Trigger::SendOrderToKitchen,
        Trigger::RequestBill,
        Trigger::CompleteCheckout,
        Trigger::MarkClean,
        Trigger::Free,
    ];
}

impl fmt::Display for Trigger {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Trigger::Reserve => "reserve",
            Trigger::Seat => "seat",
            Trigger::BeginOrdering => "begin-ordering",
            Trigger::SendOrderToKitchen => "send-order-to-kitchen",
            Trigger::RequestBill => "request-bill",
            Trigger::CompleteCheckout => "complete-checkout",
            Trigger::MarkClean => "mark-clean",
            Trigger::Free => "free",
        })
    }
}

fn next_status(from: TableStatus, trigger: Trigger) -> Option<TableStatus> {
    use TableStatus::*;
    match (from, trigger) {
        (_, Trigger::Free) => Some(Available),
        (Available, Trigger::Reserve) => Some(Reserved),
        (Available | Reserved, Trigger::Seat) => Some(Seated),
        (Seated, Trigger::BeginOrdering) => Some(Ordering),
        (Ordering, Trigger::SendOrderToKitchen) => Some(Eating),
        (Eating, Trigger::RequestBill) => Some(ReadyToPay),
        (ReadyToPay, Trigger::CompleteCheckout) => Some(Cleaning),
        (Cleaning, Trigger::MarkClean) => Some(Available),
        _ => None,
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Party {
    pub customer: String,
    pub party_size: u32,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Reservation {
    pub customer: String,
    pub party_size: u32,
    pub time: DateTime<Utc>,
}

/// A physical seating unit and the order of the party sitting at it.
///
/// Status and the optional fields move together: an available table has no
/// party, order, server or seating time; an occupied one has all but the
/// server; a cleaning table has none of them.
#[derive(Debug, Clone)]
pub struct Table {
    number: u32,
    capacity: u32,
    status: TableStatus,
    assigned_order: Option<Order>,
    seated_at: Option<DateTime<Utc>>,
    server: Option<String>,
    party: Option<Party>,
    reservation: Option<Reservation>,
    tax_rate: BigDecimal,
}

impl Table {
    pub fn new(number: u32, capacity: u32) -> Self {
        Self {
            number,
            capacity,
            status: TableStatus::Available,
            assigned_order: None,
            seated_at: None,
            server: None,
            party: None,
            reservation: None,
            tax_rate: default_tax_rate(),
        }
    }

    /// Sets the tax rate used for orders opened at this table.
    pub fn with_tax_rate(mut self, tax_rate: BigDecimal) -> Self {
        self.tax_rate = tax_rate;
        self
    }

    pub fn number(&self) -> u32 {
        self.number
    }

    pub fn capacity(&self) -> u32 {
        self.capacity
    }

    pub fn status(&self) -> TableStatus {
        self.status
    }

    pub fn order(&self) -> Option<&Order> {
        self.assigned_order.as_ref()
    }

    /// The order, while the table still takes changes to it.
    pub fn order_mut(&mut self) -> Option<&mut Order> {
        if !self.status.accepts_items() {
            return None;
        }
        self.assigned_order.as_mut()
    }

    pub fn seated_at(&self) -> Option<DateTime<Utc>> {
        self.seated_at
    }

    pub fn server(&self) -> Option<&str> {
        self.server.as_deref()
    }

    pub fn party(&self) -> Option<&Party> {
        self.party.as_ref()
    }

    pub fn reservation(&self) -> Option<&Reservation> {
        self.reservation.as_ref()
    }

    pub fn allowed_triggers(&self) -> Vec<Trigger> {
        self.status.allowed_triggers()
    }

    fn ensure(&self, trigger: Trigger) -> Result<TableStatus, DomainError> {
        next_status(self.status, trigger).ok_or_else(|| {
            log::warn!(
                "table {}: rejected {} while {}",
                self.number,
                trigger,
                self.status
            );
            DomainError::IllegalTransition {
                status: self.status,
                trigger,
                allowed: self.allowed_triggers(),
            }
        })
    }

    fn check_party(&self, party_size: u32) -> Result<(), DomainError> {
        if party_size == 0 {
            return Err(DomainError::InvalidPartySize(party_size));
        }
        if party_size > self.capacity {
            return Err(DomainError::CapacityExceeded {
                table: self.number,
                party_size,
                capacity: self.capacity,
            });
        }
        Ok(())
    }

    fn move_to(&mut self, trigger: Trigger, next: TableStatus) {
        log::info!(
            "table {}: {} -> {} ({})",
            self.number,
            self.status,
            next,
            trigger
        );
        self.status = next;
    }

    pub fn reserve(
        &mut self,
        customer: impl Into<String>,
        party_size: u32,
        time: DateTime<Utc>,
        now: DateTime<Utc>,
    ) -> Result<(), DomainError> {
        let next = self.ensure(Trigger::Reserve)?;
        self.check_party(party_size)?;
        if time <= now {
            return Err(DomainError::ReservationNotInFuture);
        }

        self.reservation = Some(Reservation {
            customer: customer.into(),
            party_size,
            time,
        });
        self.move_to(Trigger::Reserve, next);
        Ok(())
    }

    /// Seats a party and opens an empty order for it.
    pub fn seat(
        &mut self,
        customer: impl Into<String>,
        party_size: u32,
        server: Option<String>,
        now: DateTime<Utc>,
    ) -> Result<(), DomainError> {
        let next = self.ensure(Trigger::Seat)?;
        self.check_party(party_size)?;

        self.reservation = None;
        self.party = Some(Party {
            customer: customer.into(),
            party_size,
        });
        self.server = server;
        self.seated_at = Some(now);
        self.assigned_order = Some(Order::new(self.tax_rate.clone()));
        self.move_to(Trigger::Seat, next);
        Ok(())
    }

    pub fn begin_ordering(&mut self) -> Result<(), DomainError> {
        let next = self.ensure(Trigger::BeginOrdering)?;
        self.move_to(Trigger::BeginOrdering, next);
        Ok(())
    }

    pub fn send_order_to_kitchen(
        &mut self,
        now: DateTime<Utc>,
        estimated_minutes: i64,
    ) -> Result<KitchenTicket, DomainError> {
        let next = self.ensure(Trigger::SendOrderToKitchen)?;
        let order = self
            .assigned_order
            .as_ref()
            .filter(|o| !o.is_empty())
            .ok_or(DomainError::EmptyOrder)?;

        let fulfillment = Fulfillment::dine_in(self.number).with_estimate(estimated_minutes);
        let ticket = KitchenTicket::from_order(order, &fulfillment, now);
        self.move_to(Trigger::SendOrderToKitchen, next);
        Ok(ticket)
    }

    pub fn request_bill(&mut self) -> Result<(), DomainError> {
        let next = self.ensure(Trigger::RequestBill)?;
        self.move_to(Trigger::RequestBill, next);
        Ok(())
    }

    /// Checks out the table's order and releases it; the party leaves and the
    /// table goes to cleaning.
    pub fn complete_checkout(&mut self) -> Result<OrderReceipt, DomainError> {
        let next = self.ensure(Trigger::CompleteCheckout)?;
        let receipt = self
            .assigned_order
            .as_mut()
            .ok_or(DomainError::EmptyOrder)?
            .checkout()?;

        self.assigned_order = None;
        self.party = None;
        self.seated_at = None;
        self.server = None;
        self.move_to(Trigger::CompleteCheckout, next);
        Ok(receipt)
    }

    pub fn mark_clean(&mut self) -> Result<(), DomainError> {
        let next = self.ensure(Trigger::MarkClean)?;
        if self.assigned_order.is_some() {
            return Err(DomainError::IllegalTransition {
                status: self.status,
                trigger: Trigger::MarkClean,
                allowed: vec![Trigger::Free],
            });
        }
        self.move_to(Trigger::MarkClean, next);
        Ok(())
    }

    /// Returns the table to `available` from any state, dropping whatever the
    /// current session held. The released order, if any, is handed back.
    pub fn free(&mut self) -> Option<Order> {
        let released = self.assigned_order.take();
        if let Some(order) = &released {
            log::warn!(
                "table {}: freed with open order {} ({} lines)",
                self.number,
                order.id(),
                order.lines().len()
            );
        }
        self.seated_at = None;
        self.server = None;
        self.party = None;
        self.reservation = None;
        self.move_to(Trigger::Free, TableStatus::Available);
        released
    }

    pub fn minutes_since_seated(&self, now: DateTime<Utc>) -> Option<i64> {
        self.seated_at.map(|t| (now - t).num_minutes())
    }

    /// True once the party has been seated longer than `estimated_duration`.
    pub fn is_overdue(&self, estimated_duration: Duration, now: DateTime<Utc>) -> bool {
        self.seated_at.is_some_and(|t| now - t > estimated_duration)
    }
}

/// Renders the distance between `time` and `now` as `"in 30m"` or `"45m ago"`.
pub fn format_elapsed(time: DateTime<Utc>, now: DateTime<Utc>) -> String {
    let minutes = (now - time).num_minutes().abs();
    if time > now {
        format!("in {}m", minutes)
    } else {
        format!("{}m ago", minutes)
    }
}

#[cfg(test)]
mod tests {
    use std::str::FromStr;

    use chrono::TimeZone;
    use uuid::Uuid;

    use super::*;

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 5, 1, 19, 0, 0).unwrap()
    }

    fn seated_table() -> Table {
        let mut table = Table::new(5, 4);
        table.seat("Mike Davis", 3, Some("Bob".into()), now()).unwrap();
        table
    }

    fn add_pizza(table: &mut Table) {
        table
            .order_mut()
            .unwrap()
            .add_item(Uuid::new_v4(), BigDecimal::from_str("16.99").unwrap(), 1)
            .unwrap();
    }

    #[test]
    fn new_table_is_available_and_empty() {
        let table = Table::new(1, 2);
        assert_eq!(table.status(), TableStatus::Available);
        assert!(table.order().is_none());
        assert!(table.seated_at().is_none());
    }

    #[test]
    fn full_service_cycle_returns_to_available() {
        let mut table = seated_table();
        assert_eq!(table.status(), TableStatus::Seated);
        assert!(table.order().is_some());

        table.begin_ordering().unwrap();
        add_pizza(&mut table);
        let ticket = table.send_order_to_kitchen(now(), 18).unwrap();
        assert_eq!(ticket.table_number, Some(5));
        assert_eq!(table.status(), TableStatus::Eating);

        table.request_bill().unwrap();
        let receipt = table.complete_checkout().unwrap();
        assert_eq!(receipt.lines.len(), 1);
        assert_eq!(table.status(), TableStatus::Cleaning);
        assert!(table.order().is_none());

        table.mark_clean().unwrap();
        assert_eq!(table.status(), TableStatus::Available);
        assert!(table.order().is_none());
        assert!(table.seated_at().is_none());
        assert!(table.server().is_none());
    }

    #[test]
    fn illegal_trigger_leaves_state_unchanged() {
        let mut table = Table::new(2, 4);

        let err = table.request_bill().unwrap_err();

        assert_eq!(
            err,
            DomainError::IllegalTransition {
                status: TableStatus::Available,
                trigger: Trigger::RequestBill,
                allowed: vec![Trigger::Reserve, Trigger::Seat, Trigger::Free],
            }
        );
        assert_eq!(table.status(), TableStatus::Available);
    }

    #[test]
    fn seating_beyond_capacity_fails() {
        let mut table = Table::new(7, 2);
        let err = table.seat("Big group", 3, None, now()).unwrap_err();
        assert!(matches!(err, DomainError::CapacityExceeded { party_size: 3, capacity: 2, .. }));
        assert_eq!(table.status(), TableStatus::Available);
        assert!(table.order().is_none());
    }

    #[test]
    fn reserving_beyond_capacity_fails() {
        let mut table = Table::new(4, 2);

        let err = table
            .reserve("Big group", 5, now() + Duration::minutes(30), now())
            .unwrap_err();

        assert_eq!(
            err,
            DomainError::CapacityExceeded {
                table: 4,
                party_size: 5,
                capacity: 2,
            }
        );
        assert_eq!(table.status(), TableStatus::Available);
        assert!(table.reservation().is_none());
    }

    #[test]
    fn empty_party_is_rejected() {
        let mut table = Table::new(4, 2);

        assert_eq!(
            table.seat("Nobody", 0, None, now()),
            Err(DomainError::InvalidPartySize(0))
        );
        assert_eq!(
            table.reserve("Nobody", 0, now() + Duration::minutes(30), now()),
            Err(DomainError::InvalidPartySize(0))
        );
        assert_eq!(table.status(), TableStatus::Available);
        assert!(table.order().is_none());
        assert!(table.party().is_none());
        assert!(table.reservation().is_none());
        assert!(table.seated_at().is_none());
    }

    #[test]
    fn checkout_before_the_bill_is_rejected() {
        let mut table = seated_table();
        table.begin_ordering().unwrap();
        add_pizza(&mut table);
        table.send_order_to_kitchen(now(), 18).unwrap();

        let err = table.complete_checkout().unwrap_err();

        assert_eq!(
            err,
            DomainError::IllegalTransition {
                status: TableStatus::Eating,
                trigger: Trigger::CompleteCheckout,
                allowed: vec![Trigger::RequestBill, Trigger::Free],
            }
        );
        assert_eq!(table.status(), TableStatus::Eating);
        assert_eq!(table.order().map(|o| o.item_count()), Some(1));
        assert!(table.party().is_some());
        assert!(table.seated_at().is_some());
        assert_eq!(
            Table::new(1, 2).complete_checkout().map(|r| r.order_id),
            Err(DomainError::IllegalTransition {
                status: TableStatus::Available,
                trigger: Trigger::CompleteCheckout,
                allowed: vec![Trigger::Reserve, Trigger::Seat, Trigger::Free],
            })
        );
    }

    #[test]
    fn order_is_frozen_once_the_bill_is_requested() {
        let mut table = seated_table();
        table.begin_ordering().unwrap();
        add_pizza(&mut table);
        table.send_order_to_kitchen(now(), 18).unwrap();
        assert!(table.order_mut().is_some());

        table.request_bill().unwrap();

        assert!(table.order_mut().is_none());
        assert_eq!(table.order().map(|o| o.item_count()), Some(1));
        let receipt = table.complete_checkout().unwrap();
        assert_eq!(receipt.lines.len(), 1);
        assert!(table.order_mut().is_none());
    }

    #[test]
    fn only_open_statuses_accept_items() {
        let open: Vec<TableStatus> = TableStatus::ALL
            .into_iter()
            .filter(|s| s.accepts_items())
            .collect();
        assert_eq!(
            open,
            vec![TableStatus::Seated, TableStatus::Ordering, TableStatus::Eating]
        );
    }

    #[test]
    fn reservation_must_be_in_the_future() {
        let mut table = Table::new(3, 6);
        assert_eq!(
            table.reserve("Sarah Johnson", 4, now(), now()),
            Err(DomainError::ReservationNotInFuture)
        );
        assert_eq!(table.status(), TableStatus::Available);

        table
            .reserve("Sarah Johnson", 4, now() + Duration::minutes(30), now())
            .unwrap();
        assert_eq!(table.status(), TableStatus::Reserved);
        assert_eq!(table.reservation().map(|r| r.party_size), Some(4));
    }

    #[test]
    fn seating_a_reservation_clears_it() {
        let mut table = Table::new(3, 6);
        table
            .reserve("Sarah Johnson", 4, now() + Duration::minutes(30), now())
            .unwrap();

        table.seat("Sarah Johnson", 4, None, now()).unwrap();

        assert!(table.reservation().is_none());
        assert_eq!(table.party().map(|p| p.customer.as_str()), Some("Sarah Johnson"));
    }

    #[test]
    fn empty_order_cannot_go_to_kitchen() {
        let mut table = seated_table();
        table.begin_ordering().unwrap();

        assert_eq!(
            table.send_order_to_kitchen(now(), 18).unwrap_err(),
            DomainError::EmptyOrder
        );
        assert_eq!(table.status(), TableStatus::Ordering);
    }

    #[test]
    fn free_releases_everything_from_any_state() {
        let mut table = seated_table();
        table.begin_ordering().unwrap();
        add_pizza(&mut table);

        let released = table.free();

        assert_eq!(released.map(|o| o.lines().len()), Some(1));
        assert_eq!(table.status(), TableStatus::Available);
        assert!(table.order().is_none());
        assert!(table.seated_at().is_none());
        assert!(table.server().is_none());
        assert!(table.party().is_none());
    }

    #[test]
    fn free_is_allowed_everywhere() {
        for status in TableStatus::ALL {
            assert!(status.allowed_triggers().contains(&Trigger::Free));
        }
    }

    #[test]
    fn elapsed_queries_use_given_now() {
        let table = seated_table();
        let later = now() + Duration::minutes(45);

        assert_eq!(table.minutes_since_seated(later), Some(45));
        assert!(table.is_overdue(Duration::minutes(30), later));
        assert!(!table.is_overdue(Duration::minutes(60), later));
        assert!(!Table::new(9, 2).is_overdue(Duration::minutes(1), later));
    }

    #[test]
    fn elapsed_label_handles_past_and_future() {
        assert_eq!(format_elapsed(now() - Duration::minutes(45), now()), "45m ago");
        assert_eq!(format_elapsed(now() + Duration::minutes(30), now()), "in 30m");
    }

    #[test]
    fn status_serializes_kebab_case() {
        assert_eq!(
            serde_json::to_string(&TableStatus::ReadyToPay).unwrap(),
            "\"ready-to-pay\""
        );
    }
}
