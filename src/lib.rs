pub mod analysis;
pub mod cli;
pub mod commands;
pub mod config;
pub mod external;
pub mod finders;
pub mod fs;
pub mod models;
