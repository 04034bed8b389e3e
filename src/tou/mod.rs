pub mod blocks;
pub mod client;
pub mod error;
pub mod fetch;
pub mod gate;
pub mod model;

pub use blocks::{BlockRules, DisplayBlock, RenderedSection};
pub use client::TouClient;
pub use error::TouError;
pub use fetch::PendingFetch;
pub use gate::{GateState, TouGate};
pub use model::{Section, TouDocument, TouRecord};
