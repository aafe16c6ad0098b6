//! Configuration change events.

mod bus;

pub use bus::{ConfigEvent, EventBus, EventKind, SubscriptionId};
