//! Remote decision and telemetry service
//!
//! - `client` - blocking facade over an async HTTP client, plus the service traits
//! - `spaces` - Action-Space / Observation-Space configuration documents
//! - `wire` - request and response schemas

pub mod client;
pub mod spaces;
pub mod wire;

pub use client::{DecisionService, HttpService, TelemetrySink};
pub use spaces::{ActionSpaceConfig, ObservationSpaceConfig};
pub use wire::{ActionCommand, ModelSelection, PredictRequest, PredictResponse, RewardBatch};
