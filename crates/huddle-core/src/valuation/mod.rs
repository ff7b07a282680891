// Value model: log-scale player values and chart-based draft pick values.

pub mod model;
pub mod tables;

pub use model::ValueModel;
pub use tables::{CapHitTier, DevOffsets, PositionOffsets, ValueTables};
