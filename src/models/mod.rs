pub mod alert;
pub mod price;

pub use alert::{Direction, PriceAlert, Thresholds};
pub use price::PriceSample;
