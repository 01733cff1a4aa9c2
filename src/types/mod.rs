//! Value types for accessory attributes and bulb capabilities.

mod attribute;
mod family;
mod mireds;
mod zone;

pub use attribute::{Attribute, AttributeChange, DesiredState};
pub use family::BulbFamily;
pub use mireds::MiredRange;
pub use zone::Zone;
