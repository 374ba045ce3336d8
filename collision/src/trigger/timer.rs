//! Cooperative timer queue driven by the frame loop.
//!
//! Activations are stored by target *name*. The target is looked up again when the
//! timer fires, so an object removed from the scene in the meantime is treated as
//! absent. There is no cancellation.

use std::time::Duration;

use log::warn;

use super::scene::TriggerScene;

#[derive(Debug, Clone, PartialEq, Eq)]
struct Scheduled {
    due: Duration,
    seq: u64,
    target: String,
}

#[derive(Debug, Default)]
pub struct TimerQueue {
    now: Duration,
    next_seq: u64,
    entries: Vec<Scheduled>,
}

impl TimerQueue {
    pub fn new() -> Self {
        Self::default()
    }

    /// Time elapsed since the queue was created (sum of every `advance`).
    pub fn now(&self) -> Duration {
        self.now
    }

    /// Activations not fired yet.
    pub fn pending(&self) -> usize {
        self.entries.len()
    }

    /// Queue one activation of `target` after `delay`.
    pub fn schedule(&mut self, delay: Duration, target: impl Into<String>) {
        self.entries.push(Scheduled {
            due: self.now + delay,
            seq: self.next_seq,
            target: target.into(),
        });
        self.next_seq += 1;
    }

    /// Advance the clock and fire every activation that became due.
    ///
    /// Activations fire in due-time order; equal due times keep scheduling order.
    /// Returns the number of targets actually activated.
    pub fn advance(&mut self, dt: Duration, scene: &mut dyn TriggerScene) -> usize {
        self.now += dt;
        let now = self.now;

        let (mut due, pending): (Vec<_>, Vec<_>) =
            std::mem::take(&mut self.entries).into_iter().partition(|e| e.due <= now);
        self.entries = pending;
        due.sort_by_key(|e| (e.due, e.seq));

        let mut fired = 0;
        for entry in due {
            let Some(object) = scene.find_object(&entry.target) else {
                warn!("timer target '{}' is gone, skipping", entry.target);
                continue;
            };
            let Some(activatable) = object.as_activatable() else {
                warn!("timer target '{}' is not activatable, skipping", entry.target);
                continue;
            };
            activatable.activate();
            fired += 1;
        }
        fired
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::trigger::scene::{Activatable, SceneIndex, SceneObject};
    use std::sync::{Arc, Mutex};

    struct Recorder {
        name: &'static str,
        log: Arc<Mutex<Vec<&'static str>>>,
    }

    impl Activatable for Recorder {
        fn activate(&mut self) {
            if let Ok(mut log) = self.log.lock() {
                log.push(self.name);
            }
        }
    }

    impl SceneObject for Recorder {
        fn as_activatable(&mut self) -> Option<&mut dyn Activatable> {
            Some(self)
        }
    }

    fn scene(log: &Arc<Mutex<Vec<&'static str>>>, names: &[&'static str]) -> SceneIndex {
        let mut scene = SceneIndex::new();
        for &name in names {
            scene.insert(
                name,
                Box::new(Recorder {
                    name,
                    log: log.clone(),
                }),
            );
        }
        scene
    }

    #[test]
    fn fires_in_due_order_then_scheduling_order() {
        let log = Arc::new(Mutex::new(Vec::new()));
        let mut scene = scene(&log, &["a", "b", "c"]);
        let mut timers = TimerQueue::new();

        timers.schedule(Duration::from_millis(300), "a");
        timers.schedule(Duration::from_millis(100), "b");
        timers.schedule(Duration::from_millis(100), "c");

        assert_eq!(timers.advance(Duration::from_millis(50), &mut scene), 0);
        assert_eq!(timers.advance(Duration::from_millis(500), &mut scene), 3);
        assert_eq!(*log.lock().unwrap(), vec!["b", "c", "a"]);
        assert_eq!(timers.pending(), 0);
    }

    #[test]
    fn removed_targets_are_skipped_at_fire_time() {
        let log = Arc::new(Mutex::new(Vec::new()));
        let mut scene = scene(&log, &["door"]);
        let mut timers = TimerQueue::new();

        timers.schedule(Duration::from_millis(10), "door");
        scene.remove("door");

        assert_eq!(timers.advance(Duration::from_millis(10), &mut scene), 0);
        assert!(log.lock().unwrap().is_empty());
        assert_eq!(timers.pending(), 0);
    }

    #[test]
    fn zero_delay_fires_on_next_advance() {
        let log = Arc::new(Mutex::new(Vec::new()));
        let mut scene = scene(&log, &["a"]);
        let mut timers = TimerQueue::new();

        timers.schedule(Duration::ZERO, "a");
        assert_eq!(timers.pending(), 1);
        assert_eq!(timers.advance(Duration::ZERO, &mut scene), 1);
        assert_eq!(timers.now(), Duration::ZERO);
    }
}
