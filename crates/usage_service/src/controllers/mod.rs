pub mod stats_controller;
pub mod tracking_controller;
