//! File inputs and outputs: targets, stock, template library, route caches and reports.

pub mod cache;
pub mod reports;
pub mod stock;
pub mod table;
pub mod targets;
pub mod templates;

pub use cache::{load_or_compute, read_route_cache, write_route_cache};
pub use reports::{read_report, write_report};
pub use stock::Stock;
pub use table::{Table, TableError};
pub use targets::read_targets;
pub use templates::TemplateLibrary;
