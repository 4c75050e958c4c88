use bigdecimal::{BigDecimal, RoundingMode};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::errors::DomainError;

/// Sales tax applied when no rate is configured: 8%.
pub fn default_tax_rate() -> BigDecimal {
    BigDecimal::from(8) / BigDecimal::from(100)
}

/// Rounds a monetary amount to cents, half away from zero.
pub fn round_currency(amount: &BigDecimal) -> BigDecimal {
    amount.with_scale_round(2, RoundingMode::HalfUp)
}

fn zero() -> BigDecimal {
    BigDecimal::from(0)
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LineItem {
    pub product_id: Uuid,
    /// Price captured when the product was added; later catalog changes do not apply.
    pub unit_price: BigDecimal,
    pub quantity: i32,
    pub note: Option<String>,
}

impl LineItem {
    pub fn line_total(&self) -> BigDecimal {
        &self.unit_price * &BigDecimal::from(self.quantity)
    }
}

/// Exact monetary summary of an order. Call [`Totals::rounded`] only when
/// presenting the figures.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Totals {
    pub subtotal: BigDecimal,
    pub discount_amount: BigDecimal,
    pub taxable_amount: BigDecimal,
    pub tax: BigDecimal,
    pub total: BigDecimal,
}

impl Totals {
    pub fn rounded(&self) -> Totals {
        Totals {
            subtotal: round_currency(&self.subtotal),
            discount_amount: round_currency(&self.discount_amount),
            taxable_amount: round_currency(&self.taxable_amount),
            tax: round_currency(&self.tax),
            total: round_currency(&self.total),
        }
    }
}

/// Finalized snapshot produced by [`Order::checkout`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OrderReceipt {
    pub order_id: Uuid,
    pub lines: Vec<LineItem>,
    pub discount_percent: BigDecimal,
    pub tax_rate: BigDecimal,
    pub totals: Totals,
}

/// The line items and discount of one customer transaction.
///
/// Lines are keyed by product: adding a product that is already on the order
/// bumps its quantity. A line never holds a quantity below one.
#[derive(Debug, Clone, PartialEq)]
pub struct Order {
    id: Uuid,
    lines: Vec<LineItem>,
    discount_percent: BigDecimal,
    tax_rate: BigDecimal,
}

impl Default for Order {
    fn default() -> Self {
        Self::new(default_tax_rate())
    }
}

impl Order {
    pub fn new(tax_rate: BigDecimal) -> Self {
        Self {
            id: Uuid::new_v4(),
            lines: Vec::new(),
            discount_percent: zero(),
            tax_rate,
        }
    }

    pub fn id(&self) -> Uuid {
        self.id
    }

    pub fn lines(&self) -> &[LineItem] {
        &self.lines
    }

    pub fn line(&self, product_id: Uuid) -> Option<&LineItem> {
        self.lines.iter().find(|l| l.product_id == product_id)
    }

    pub fn discount_percent(&self) -> &BigDecimal {
        &self.discount_percent
    }

    pub fn tax_rate(&self) -> &BigDecimal {
        &self.tax_rate
    }

    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }

    /// Total number of units across all lines.
    pub fn item_count(&self) -> i64 {
        self.lines.iter().map(|l| i64::from(l.quantity)).sum()
    }

    fn position(&self, product_id: Uuid) -> Option<usize> {
        self.lines.iter().position(|l| l.product_id == product_id)
    }

    /// Adds `quantity` units of a product.
    ///
    /// An existing line keeps its original unit price; if the increment takes
    /// it to zero or below the line is dropped. A new line needs a positive
    /// quantity.
    pub fn add_item(
        &mut self,
        product_id: Uuid,
        unit_price: BigDecimal,
        quantity: i32,
    ) -> Result<(), DomainError> {
        if let Some(idx) = self.position(product_id) {
            let updated = self.lines[idx].quantity.saturating_add(quantity);
            if updated <= 0 {
                self.lines.remove(idx);
                log::debug!("order {}: removed {} after decrement", self.id, product_id);
            } else {
                self.lines[idx].quantity = updated;
                log::debug!("order {}: {} now x{}", self.id, product_id, updated);
            }
            return Ok(());
        }

        if quantity <= 0 {
            return Err(DomainError::InvalidQuantity {
                product_id,
                quantity,
            });
        }
        if unit_price < zero() {
            return Err(DomainError::InvalidPrice(unit_price));
        }

        log::debug!(
            "order {}: added {} x{} at {}",
            self.id,
            product_id,
            quantity,
            unit_price
        );
        self.lines.push(LineItem {
            product_id,
            unit_price,
            quantity,
            note: None,
        });
        Ok(())
    }

    pub fn set_quantity(&mut self, product_id: Uuid, new_quantity: i32) -> Result<(), DomainError> {
        let idx = self
            .position(product_id)
            .ok_or(DomainError::ItemNotFound(product_id))?;
        if new_quantity <= 0 {
            self.lines.remove(idx);
            log::debug!("order {}: removed {}", self.id, product_id);
        } else {
            self.lines[idx].quantity = new_quantity;
            log::debug!("order {}: {} set to x{}", self.id, product_id, new_quantity);
        }
        Ok(())
    }

    /// Removes a product's line. Removing an absent product is not an error.
    pub fn remove_item(&mut self, product_id: Uuid) {
        if let Some(idx) = self.position(product_id) {
            self.lines.remove(idx);
            log::debug!("order {}: removed {}", self.id, product_id);
        }
    }

    /// Replaces the current discount. Discounts never stack.
    pub fn apply_discount(&mut self, percent: BigDecimal) -> Result<(), DomainError> {
        if percent < zero() || percent > BigDecimal::from(100) {
            return Err(DomainError::InvalidDiscount(percent));
        }
        log::debug!("order {}: discount {}%", self.id, percent);
        self.discount_percent = percent;
        Ok(())
    }

    /// Attaches a note to a line. Blank text clears it.
    pub fn set_note(&mut self, product_id: Uuid, text: &str) -> Result<(), DomainError> {
        let idx = self
            .position(product_id)
            .ok_or(DomainError::ItemNotFound(product_id))?;
        let text = text.trim();
        self.lines[idx].note = if text.is_empty() {
            None
        } else {
            Some(text.to_string())
        };
        Ok(())
    }

    pub fn compute_totals(&self) -> Totals {
        let subtotal = self
            .lines
            .iter()
            .fold(zero(), |acc, line| acc + line.line_total());
        let discount_amount = &subtotal * &self.discount_percent / BigDecimal::from(100);
        let taxable_amount = &subtotal - &discount_amount;
        let tax = &taxable_amount * &self.tax_rate;
        let total = &taxable_amount + &tax;

        Totals {
            subtotal,
            discount_amount,
            taxable_amount,
            tax,
            total,
        }
    }

    /// Finalizes the order and clears it for the next transaction.
    pub fn checkout(&mut self) -> Result<OrderReceipt, DomainError> {
        if self.lines.is_empty() {
            return Err(DomainError::EmptyOrder);
        }

        let receipt = OrderReceipt {
            order_id: self.id,
            totals: self.compute_totals(),
            lines: std::mem::take(&mut self.lines),
            discount_percent: std::mem::replace(&mut self.discount_percent, zero()),
            tax_rate: self.tax_rate.clone(),
        };
        self.id = Uuid::new_v4();

        log::info!(
            "order {} checked out: total {}",
            receipt.order_id,
            round_currency(&receipt.totals.total)
        );
        Ok(receipt)
    }

    /// Drops every line and the discount without producing a receipt.
    pub fn cancel(&mut self) {
        log::info!("order {} cancelled with {} lines", self.id, self.lines.len());
        self.lines.clear();
        self.discount_percent = zero();
        self.id = Uuid::new_v4();
    }
}
