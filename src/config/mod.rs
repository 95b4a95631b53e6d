// src/config/mod.rs
pub mod monitor;
pub mod regions;

pub use monitor::MonitorConfig;
pub use regions::{load_regions_default, load_regions_from};
