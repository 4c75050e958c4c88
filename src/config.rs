use std::env;
use std::str::FromStr;

use bigdecimal::BigDecimal;
use chrono::Duration;

use crate::application::floor_service::DEFAULT_SEATING_MINUTES;
use crate::domain::fulfillment::OrderType;
use crate::domain::order::default_tax_rate;
use crate::errors::AppError;

/// Venue settings read from the environment. `kitchen_minutes` is the
/// estimate given to dine-in tickets.
#[derive(Debug, Clone, PartialEq)]
pub struct PosConfig {
    pub tax_rate: BigDecimal,
    pub seating_minutes: i64,
    pub kitchen_minutes: i64,
}

impl Default for PosConfig {
    fn default() -> Self {
        Self {
            tax_rate: default_tax_rate(),
            seating_minutes: DEFAULT_SEATING_MINUTES,
            kitchen_minutes: OrderType::DineIn.default_estimate_minutes(),
        }
    }
}

impl PosConfig {
    /// Loads `.env` if present, then reads `POS_TAX_RATE`,
    /// `POS_SEATING_MINUTES` and `POS_KITCHEN_MINUTES`.
    pub fn from_env() -> Result<Self, AppError> {
        dotenvy::dotenv().ok();
        Self::from_lookup(|key| env::var(key).ok())
    }

    pub fn from_lookup<F>(lookup: F) -> Result<Self, AppError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = Self::default();

        let tax_rate = match lookup("POS_TAX_RATE") {
            Some(raw) => {
                let rate = BigDecimal::from_str(raw.trim()).map_err(|e| {
                    AppError::Config(format!("POS_TAX_RATE '{}' is not a decimal: {}", raw, e))
                })?;
                if rate < BigDecimal::from(0) || rate > BigDecimal::from(1) {
                    return Err(AppError::Config(format!(
                        "POS_TAX_RATE must be between 0 and 1, got {}",
                        rate
                    )));
                }
                rate
            }
            None => defaults.tax_rate,
        };

        Ok(Self {
            tax_rate,
            seating_minutes: minutes(&lookup, "POS_SEATING_MINUTES", defaults.seating_minutes)?,
            kitchen_minutes: minutes(&lookup, "POS_KITCHEN_MINUTES", defaults.kitchen_minutes)?,
        })
    }

    pub fn seating_duration(&self) -> Duration {
        Duration::minutes(self.seating_minutes)
    }
}

fn minutes<F>(lookup: &F, key: &str, default: i64) -> Result<i64, AppError>
where
    F: Fn(&str) -> Option<String>,
{
    let Some(raw) = lookup(key) else {
        return Ok(default);
    };
    match raw.trim().parse::<i64>() {
        Ok(value) if value > 0 => Ok(value),
        _ => Err(AppError::Config(format!(
            "{} must be a positive number of minutes, got '{}'",
            key, raw
        ))),
    }
}
