//! SakeNote in-process event bus.
//!
//! - [`EventBus`]: publish/subscribe hub backed by `tokio::sync::broadcast`.
//! - [`DomainEvent`]: the event envelope published after every collection
//!   change, or when a new live connection needs its first snapshot.

pub mod bus;

pub use bus::{DomainEvent, EventBus, BEVERAGE_CHANGED, SNAPSHOT_REQUESTED};
