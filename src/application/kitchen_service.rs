use chrono::{DateTime, Utc};
use serde::Serialize;
use uuid::Uuid;

use crate::domain::errors::DomainError;
use crate::domain::kitchen::{ItemStatus, KitchenTicket, Priority, Station};
use crate::domain::ports::{Clock, ProductCatalog};

/// Kitchen display counters, taken against one instant.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct KitchenSummary {
    pub active: usize,
    pub ready: usize,
    pub overdue: usize,
    pub high_priority: usize,
    pub average_progress: u8,
    pub bumped: usize,
}

/// Tickets the kitchen is working on. Items are routed to stations by their
/// product's catalog category when the ticket arrives.
pub struct KitchenService<C> {
    catalog: C,
    tickets: Vec<KitchenTicket>,
    bumped: usize,
}

impl<C: ProductCatalog> KitchenService<C> {
    pub fn new(catalog: C) -> Self {
        Self {
            catalog,
            tickets: Vec::new(),
            bumped: 0,
        }
    }

    pub fn submit(&mut self, mut ticket: KitchenTicket) -> Uuid {
        let catalog = &self.catalog;
        ticket.assign_stations(|product_id| {
            catalog
                .find(product_id)
                .and_then(|p| Station::for_category(&p.category))
        });
        log::info!(
            "ticket {} queued: {} order, {} items, {:?} priority",
            ticket.id,
            ticket.order_type,
            ticket.items.len(),
            ticket.priority
        );
        let id = ticket.id;
        self.tickets.push(ticket);
        id
    }

    pub fn ticket(&self, id: Uuid) -> Result<&KitchenTicket, DomainError> {
        self.tickets
            .iter()
            .find(|t| t.id == id)
            .ok_or(DomainError::TicketNotFound(id))
    }

    fn ticket_mut(&mut self, id: Uuid) -> Result<&mut KitchenTicket, DomainError> {
        self.tickets
            .iter_mut()
            .find(|t| t.id == id)
            .ok_or(DomainError::TicketNotFound(id))
    }

    pub fn advance_item(
        &mut self,
        ticket_id: Uuid,
        product_id: Uuid,
        to: ItemStatus,
    ) -> Result<(), DomainError> {
        self.ticket_mut(ticket_id)?.advance_item(product_id, to)
    }

    pub fn set_priority(&mut self, ticket_id: Uuid, priority: Priority) -> Result<(), DomainError> {
        self.ticket_mut(ticket_id)?.priority = priority;
        Ok(())
    }

    /// Removes a finished ticket from the queue and hands it back.
    pub fn bump(&mut self, ticket_id: Uuid) -> Result<KitchenTicket, DomainError> {
        let index = self
            .tickets
            .iter()
            .position(|t| t.id == ticket_id)
            .ok_or(DomainError::TicketNotFound(ticket_id))?;
        if !self.tickets[index].is_ready() {
            log::warn!("ticket {}: bump rejected, items still in progress", ticket_id);
            return Err(DomainError::TicketNotReady(ticket_id));
        }
        self.bumped += 1;
        log::info!("ticket {} bumped", ticket_id);
        Ok(self.tickets.remove(index))
    }

    /// Active tickets, most urgent first and oldest first within a priority.
    /// With a station, only tickets with at least one item there are listed.
    pub fn queue(&self, station: Option<Station>) -> Vec<&KitchenTicket> {
        let mut listed: Vec<&KitchenTicket> = self
            .tickets
            .iter()
            .filter(|t| station.map_or(true, |s| t.uses_station(s)))
            .collect();
        listed.sort_by(|a, b| {
            b.priority
                .cmp(&a.priority)
                .then(a.started_at.cmp(&b.started_at))
        });
        listed
    }

    pub fn summary(&self, clock: &dyn Clock) -> KitchenSummary {
        self.summary_at(clock.now())
    }

    pub fn summary_at(&self, now: DateTime<Utc>) -> KitchenSummary {
        let active = self.tickets.len();
        let average_progress = if active == 0 {
            0
        } else {
            let total: usize = self
                .tickets
                .iter()
                .map(|t| t.progress_percent(now) as usize)
                .sum();
            ((total + active / 2) / active) as u8
        };

        KitchenSummary {
            active,
            ready: self.tickets.iter().filter(|t| t.is_ready()).count(),
            overdue: self.tickets.iter().filter(|t| t.is_overdue(now)).count(),
            high_priority: self.tickets.iter().filter(|t| t.is_high_priority()).count(),
            average_progress,
            bumped: self.bumped,
        }
    }
}
