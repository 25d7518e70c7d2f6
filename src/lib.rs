//! Gas flow through flange-tapped orifice meters per AGA Report No. 3.
//!
//! [`engine::compute`] takes one [`Reading`] and a shared [`MeterConfig`]
//! and returns the actual and base volumetric flow, or marks the reading
//! uncomputable. Readings are independent; batches are a plain map.

pub mod constants;
pub mod dataset;
pub mod discharge;
pub mod engine;
pub mod error;
pub mod expansion;
pub mod flow;
pub mod geometry;
pub mod meter;
pub mod modbus;
pub mod pressure;
pub mod reading;
pub mod report;
pub mod solver;

pub use engine::{compute, compute_batch, FlowOutcome, FlowResult};
pub use error::FlowError;
pub use meter::MeterConfig;
pub use reading::Reading;
