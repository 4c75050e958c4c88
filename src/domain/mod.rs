pub mod catalog;
pub mod errors;
pub mod fulfillment;
pub mod kitchen;
pub mod order;
pub mod ports;
pub mod table;
pub mod transaction;
