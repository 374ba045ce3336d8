//! Trigger system: "an activation happened" decoupled from "who reacts".
//!
//! - [`DelayedTrigger`] resolves named targets in the current scene and schedules
//!   their activation on a [`TimerQueue`].
//! - [`TriggerFactory`] maps trigger records to trigger variants.
//! - [`EventBus`] is the publish/subscribe primitive gameplay code posts to.

pub mod delayed;
pub mod event_bus;
pub mod scene;
pub mod timer;

pub use delayed::{DelayedTrigger, Trigger, TriggerDef, TriggerFactory};
pub use event_bus::{BusEvent, EventBus, GameEvent, Subscriber, SubscriberError};
pub use scene::{Activatable, SceneIndex, SceneObject, TriggerScene};
pub use timer::TimerQueue;
