//! Persisted artifact formats

pub mod edge_flags;

pub use edge_flags::{EdgeFlags, EdgeFlagsError, SpeedEncoder, WayFlags};
