use std::fmt;

use serde::{Deserialize, Serialize};

use super::errors::DomainError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum OrderType {
    DineIn,
    Takeout,
    Delivery,
}

impl OrderType {
    /// Kitchen estimate used when the order does not set its own.
    pub fn default_estimate_minutes(self) -> i64 {
        match self {
            OrderType::DineIn => 20,
            OrderType::Takeout => 15,
            OrderType::Delivery => 35,
        }
    }
}

impl fmt::Display for OrderType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            OrderType::DineIn => "dine-in",
            OrderType::Takeout => "takeout",
            OrderType::Delivery => "delivery",
        })
    }
}

/// How an order reaches the customer, and who to hand it to.
///
/// Dine-in orders name a table; takeout needs a name and phone number;
/// delivery also needs an address.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Fulfillment {
    pub order_type: OrderType,
    pub table_number: Option<u32>,
    pub customer_name: Option<String>,
    pub phone_number: Option<String>,
    pub delivery_address: Option<String>,
    pub special_instructions: Option<String>,
    pub estimated_minutes: i64,
}

fn required(field: &'static str, value: &str) -> Result<String, DomainError> {
    let value = value.trim();
    if value.is_empty() {
        return Err(DomainError::MissingCustomerDetail(field));
    }
    Ok(value.to_string())
}

impl Fulfillment {
    pub fn dine_in(table_number: u32) -> Self {
        Self {
            order_type: OrderType::DineIn,
            table_number: Some(table_number),
            customer_name: None,
            phone_number: None,
            delivery_address: None,
            special_instructions: None,
            estimated_minutes: OrderType::DineIn.default_estimate_minutes(),
        }
    }

    pub fn takeout(customer_name: &str, phone_number: &str) -> Result<Self, DomainError> {
        Ok(Self {
            order_type: OrderType::Takeout,
            table_number: None,
            customer_name: Some(required("customer name", customer_name)?),
            phone_number: Some(required("phone number", phone_number)?),
            delivery_address: None,
            special_instructions: None,
            estimated_minutes: OrderType::Takeout.default_estimate_minutes(),
        })
    }

    pub fn delivery(
        customer_name: &str,
        phone_number: &str,
        delivery_address: &str,
    ) -> Result<Self, DomainError> {
        Ok(Self {
            order_type: OrderType::Delivery,
            table_number: None,
            customer_name: Some(required("customer name", customer_name)?),
            phone_number: Some(required("phone number", phone_number)?),
            delivery_address: Some(required("delivery address", delivery_address)?),
            special_instructions: None,
            estimated_minutes: OrderType::Delivery.default_estimate_minutes(),
        })
    }

    pub fn with_estimate(mut self, minutes: i64) -> Self {
        self.estimated_minutes = minutes;
        self
    }

    pub fn with_instructions(mut self, text: &str) -> Self {
        let text = text.trim();
        self.special_instructions = (!text.is_empty()).then(|| text.to_string());
        self
    }
}
