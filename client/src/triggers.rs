//! Trigger plumbing between the collision core and the ECS.
//!
//! ```text
//! trigger pad contactStart ─▶ ContactInbox ─▶ EventBus ─▶ TriggerRequests
//!        ─▶ Trigger::activate (resolve targets) ─▶ TimerQueue ─▶ Activatable
//! ```
//!
//! Contact listeners and bus subscribers run outside of any system borrow, so they
//! only push into shared queues; the systems below drain them in order.

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use bevy::prelude::*;
use collision::{
    EventBus, GameEvent, SceneIndex, Subscriber, SubscriberError, TimerQueue, Trigger,
};

use crate::physics::PhysicsSet;

/// Events raised by contact listeners during the physics sync.
#[derive(Resource, Clone, Default)]
pub struct ContactInbox(Arc<Mutex<Vec<GameEvent>>>);

impl ContactInbox {
    pub fn push(&self, event: GameEvent) {
        match self.0.lock() {
            Ok(mut queue) => queue.push(event),
            Err(_) => error!("contact inbox poisoned, dropping '{}'", event.name),
        }
    }

    fn drain(&self) -> Vec<GameEvent> {
        self.0
            .lock()
            .map(|mut queue| std::mem::take(&mut *queue))
            .unwrap_or_default()
    }
}

/// Names of triggers bus subscribers asked to fire.
#[derive(Resource, Clone, Default)]
pub struct TriggerRequests(Arc<Mutex<Vec<String>>>);

impl TriggerRequests {
    /// A bus subscriber that requests `trigger` whenever its channel is posted.
    pub fn subscriber(&self, trigger: String) -> Subscriber<GameEvent> {
        let requests = self.0.clone();
        Arc::new(move |_event: &GameEvent| -> Result<(), SubscriberError> {
            requests
                .lock()
                .map_err(|_| "trigger request queue poisoned")?
                .push(trigger.clone());
            Ok(())
        })
    }

    fn drain(&self) -> Vec<String> {
        self.0
            .lock()
            .map(|mut queue| std::mem::take(&mut *queue))
            .unwrap_or_default()
    }
}

#[derive(Resource, Default, Debug)]
pub struct Bus(pub EventBus);

#[derive(Resource, Default, Debug)]
pub struct Scene(pub SceneIndex);

#[derive(Resource, Default, Debug)]
pub struct Timers(pub TimerQueue);

#[derive(Resource, Default, Debug)]
pub struct Triggers(pub HashMap<String, Box<dyn Trigger>>);

pub(super) fn plugin(app: &mut App) {
    app.init_resource::<ContactInbox>()
        .init_resource::<TriggerRequests>()
        .init_resource::<Bus>()
        .init_resource::<Scene>()
        .init_resource::<Timers>()
        .init_resource::<Triggers>();

    app.add_systems(
        FixedUpdate,
        (post_contacts, fire_requested_triggers, tick_timers)
            .chain()
            .after(PhysicsSet::Sync),
    );
}

fn post_contacts(inbox: Res<ContactInbox>, bus: Res<Bus>) {
    for event in inbox.drain() {
        match bus.0.post(&event) {
            Ok(delivered) => debug!(
                "posted '{}' from {:?} to {delivered} subscribers",
                event.name, event.source
            ),
            Err(err) => error!("subscriber failed on '{}': {err}", event.name),
        }
    }
}

fn fire_requested_triggers(
    requests: Res<TriggerRequests>,
    triggers: Res<Triggers>,
    mut scene: ResMut<Scene>,
    mut timers: ResMut<Timers>,
) {
    for name in requests.drain() {
        let Some(trigger) = triggers.0.get(&name) else {
            warn!("no trigger named '{name}'");
            continue;
        };
        let scheduled = trigger.activate(&mut scene.0, &mut timers.0);
        info!("trigger '{name}' scheduled {scheduled} activations");
    }
}

fn tick_timers(time: Res<Time>, mut scene: ResMut<Scene>, mut timers: ResMut<Timers>) {
    timers.0.advance(time.delta(), &mut scene.0);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn inbox_drains_in_push_order() {
        let inbox = ContactInbox::default();
        inbox.push(GameEvent::new("a"));
        inbox.push(GameEvent::new("b"));
        let names: Vec<_> = inbox.drain().into_iter().map(|e| e.name).collect();
        assert_eq!(names, vec!["a".to_string(), "b".to_string()]);
        assert!(inbox.drain().is_empty());
    }

    #[test]
    fn poisoned_inbox_drops_without_panicking() {
        let inbox = ContactInbox::default();
        let shared = inbox.clone();
        let _ = std::thread::spawn(move || {
            let _guard = shared.0.lock().unwrap();
            panic!("poison the inbox");
        })
        .join();

        inbox.push(GameEvent::new("lost"));
        assert!(inbox.drain().is_empty());
    }
}
