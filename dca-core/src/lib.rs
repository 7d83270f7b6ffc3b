pub mod config;
pub mod provider;
pub mod service;
pub mod simulation;

pub use dca_common as common;
