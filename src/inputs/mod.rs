//! Scenario inputs and scenario file persistence

mod data;
pub mod store;

pub use data::{CapitalGainsPolicy, RateInput, ScenarioInputs};
pub use store::ScenarioStore;
