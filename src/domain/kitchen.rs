use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::errors::DomainError;
use super::fulfillment::{Fulfillment, OrderType};
use super::order::Order;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ItemStatus {
    Pending,
    Preparing,
    Ready,
}

impl ItemStatus {
    fn next(self) -> Option<ItemStatus> {
        match self {
            ItemStatus::Pending => Some(ItemStatus::Preparing),
            ItemStatus::Preparing => Some(ItemStatus::Ready),
            ItemStatus::Ready => None,
        }
    }
}

impl fmt::Display for ItemStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            ItemStatus::Pending => "pending",
            ItemStatus::Preparing => "preparing",
            ItemStatus::Ready => "ready",
        })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Priority {
    Low,
    Normal,
    High,
    Urgent,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Station {
    Grill,
    Salad,
    Fryer,
    Pizza,
    Dessert,
}

impl Station {
    /// Station that prepares products of a catalog category. Categories with
    /// no station (drinks, for instance) are plated at the pass.
    pub fn for_category(category: &str) -> Option<Station> {
        match category.trim().to_lowercase().as_str() {
            "mains" | "burgers" | "grill" => Some(Station::Grill),
            "salads" | "salad" => Some(Station::Salad),
            "sides" | "fryer" => Some(Station::Fryer),
            "pizza" => Some(Station::Pizza),
            "desserts" | "dessert" => Some(Station::Dessert),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TicketItem {
    pub product_id: Uuid,
    pub quantity: i32,
    pub note: Option<String>,
    pub station: Option<Station>,
    pub status: ItemStatus,
}

/// The kitchen's copy of an order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct KitchenTicket {
    pub id: Uuid,
    pub order_id: Uuid,
    pub order_type: OrderType,
    pub table_number: Option<u32>,
    pub customer_name: Option<String>,
    pub special_instructions: Option<String>,
    pub priority: Priority,
    pub items: Vec<TicketItem>,
    pub started_at: DateTime<Utc>,
    pub estimated_minutes: i64,
}

impl KitchenTicket {
    pub fn from_order(order: &Order, fulfillment: &Fulfillment, started_at: DateTime<Utc>) -> Self {
        Self {
            id: Uuid::new_v4(),
            order_id: order.id(),
            order_type: fulfillment.order_type,
            table_number: fulfillment.table_number,
            customer_name: fulfillment.customer_name.clone(),
            special_instructions: fulfillment.special_instructions.clone(),
            priority: Priority::Normal,
            items: order
                .lines()
                .iter()
                .map(|l| TicketItem {
                    product_id: l.product_id,
                    quantity: l.quantity,
                    note: l.note.clone(),
                    station: None,
                    status: ItemStatus::Pending,
                })
                .collect(),
            started_at,
            estimated_minutes: fulfillment.estimated_minutes,
        }
    }

    pub fn with_priority(mut self, priority: Priority) -> Self {
        self.priority = priority;
        self
    }

    /// Routes each item to the station `station_of` names for its product.
    pub fn assign_stations<F>(&mut self, station_of: F)
    where
        F: Fn(Uuid) -> Option<Station>,
    {
        for item in &mut self.items {
            item.station = station_of(item.product_id);
        }
    }

    /// Moves an item one step forward. Items never move backwards or skip a step.
    pub fn advance_item(
        &mut self,
        product_id: Uuid,
        to: ItemStatus,
    ) -> Result<(), DomainError> {
        let item = self
            .items
            .iter_mut()
            .find(|i| i.product_id == product_id)
            .ok_or(DomainError::ItemNotFound(product_id))?;
        if item.status.next() != Some(to) {
            return Err(DomainError::IllegalItemTransition {
                from: item.status,
                to,
            });
        }
        item.status = to;
        log::debug!("ticket {}: {} is {}", self.id, product_id, to);
        Ok(())
    }

    pub fn is_ready(&self) -> bool {
        self.items.iter().all(|i| i.status == ItemStatus::Ready)
    }

    pub fn is_high_priority(&self) -> bool {
        self.priority >= Priority::High
    }

    pub fn uses_station(&self, station: Station) -> bool {
        self.items.iter().any(|i| i.station == Some(station))
    }

    pub fn elapsed_minutes(&self, now: DateTime<Utc>) -> i64 {
        (now - self.started_at).num_minutes()
    }

    pub fn progress_percent(&self, now: DateTime<Utc>) -> u8 {
        if self.estimated_minutes <= 0 {
            return 100;
        }
        let elapsed = self.elapsed_minutes(now).max(0);
        (elapsed * 100 / self.estimated_minutes).min(100) as u8
    }

    pub fn is_overdue(&self, now: DateTime<Utc>) -> bool {
        self.elapsed_minutes(now) > self.estimated_minutes
    }
}

#[cfg(test)]
mod tests {
    use std::str::FromStr;

    use bigdecimal::BigDecimal;
    use chrono::{Duration, TimeZone};

    use super::*;

    fn start() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 5, 1, 19, 0, 0).unwrap()
    }

    fn ticket() -> (KitchenTicket, Uuid, Uuid) {
        let mut order = Order::default();
        let pizza = Uuid::new_v4();
        let salad = Uuid::new_v4();
        let price = BigDecimal::from_str("12.49").unwrap();
        order.add_item(pizza, price.clone(), 1).unwrap();
        order.add_item(salad, price, 2).unwrap();
        order.set_note(pizza, "extra cheese").unwrap();
        let fulfillment = Fulfillment::dine_in(5).with_estimate(18);
        (KitchenTicket::from_order(&order, &fulfillment, start()), pizza, salad)
    }

    #[test]
    fn items_start_pending_and_carry_notes() {
        let (ticket, pizza, _) = ticket();
        assert!(ticket.items.iter().all(|i| i.status == ItemStatus::Pending));
        let item = ticket.items.iter().find(|i| i.product_id == pizza).unwrap();
        assert_eq!(item.note.as_deref(), Some("extra cheese"));
        assert_eq!(ticket.order_type, OrderType::DineIn);
        assert_eq!(ticket.table_number, Some(5));
        assert_eq!(ticket.priority, Priority::Normal);
    }

    #[test]
    fn takeout_ticket_carries_customer_and_estimate() {
        let mut order = Order::default();
        order
            .add_item(Uuid::new_v4(), BigDecimal::from_str("5.99").unwrap(), 1)
            .unwrap();
        let fulfillment = Fulfillment::takeout("John Smith", "555-0101")
            .unwrap()
            .with_instructions("Extra napkins");

        let ticket = KitchenTicket::from_order(&order, &fulfillment, start());

        assert_eq!(ticket.order_type, OrderType::Takeout);
        assert_eq!(ticket.table_number, None);
        assert_eq!(ticket.customer_name.as_deref(), Some("John Smith"));
        assert_eq!(ticket.special_instructions.as_deref(), Some("Extra napkins"));
        assert_eq!(ticket.estimated_minutes, 15);
    }

    #[test]
    fn ticket_ready_once_every_item_is_ready() {
        let (mut ticket, pizza, salad) = ticket();
        for id in [pizza, salad] {
            ticket.advance_item(id, ItemStatus::Preparing).unwrap();
            assert!(!ticket.is_ready());
            ticket.advance_item(id, ItemStatus::Ready).unwrap();
        }
        assert!(ticket.is_ready());
    }

    #[test]
    fn skipping_a_step_is_rejected() {
        let (mut ticket, pizza, _) = ticket();
        let err = ticket.advance_item(pizza, ItemStatus::Ready).unwrap_err();
        assert_eq!(
            err,
            DomainError::IllegalItemTransition {
                from: ItemStatus::Pending,
                to: ItemStatus::Ready,
            }
        );
    }

    #[test]
    fn stations_are_assigned_per_product() {
        let (mut ticket, pizza, salad) = ticket();
        ticket.assign_stations(|id| {
            if id == pizza {
                Station::for_category("pizza")
            } else if id == salad {
                Station::for_category("Salads")
            } else {
                None
            }
        });

        assert!(ticket.uses_station(Station::Pizza));
        assert!(ticket.uses_station(Station::Salad));
        assert!(!ticket.uses_station(Station::Grill));
        assert_eq!(Station::for_category("beverages"), None);
    }

    #[test]
    fn high_and_urgent_count_as_high_priority() {
        let (ticket, _, _) = ticket();
        assert!(!ticket.clone().with_priority(Priority::Normal).is_high_priority());
        assert!(ticket.clone().with_priority(Priority::High).is_high_priority());
        assert!(ticket.with_priority(Priority::Urgent).is_high_priority());
    }

    #[test]
    fn progress_is_capped_and_overdue_flagged() {
        let (ticket, _, _) = ticket();
        assert_eq!(ticket.progress_percent(start() + Duration::minutes(9)), 50);
        assert!(!ticket.is_overdue(start() + Duration::minutes(18)));
        assert_eq!(ticket.progress_percent(start() + Duration::minutes(40)), 100);
        assert!(ticket.is_overdue(start() + Duration::minutes(19)));
    }
}
