//! Top-level bridge coordination.

pub mod controller;

pub use controller::BridgeController;
