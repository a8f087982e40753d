pub mod formats;
pub mod priority;
pub mod profiles;
pub mod properties;
pub mod tagset;
pub mod way;

pub use priority::PriorityCode;
pub use profiles::hike::{AcceptDecision, Capability, HikeConfig, HikeProfile};
pub use properties::Properties;
pub use tagset::TagSet;
pub use way::WayTags;
