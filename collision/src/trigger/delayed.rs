//! Named triggers that activate scene objects, optionally after a delay.

use std::fmt;
use std::time::Duration;

use log::{debug, warn};
use serde::{Deserialize, Serialize};

use super::scene::TriggerScene;
use super::timer::TimerQueue;
use crate::error::{CollisionError, Result};

pub const DELAYED_KIND: &str = "delayed";

fn delayed_kind() -> String {
    DELAYED_KIND.to_string()
}

/// Trigger record as authored in a map.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TriggerDef {
    pub name: String,
    #[serde(default = "delayed_kind")]
    pub kind: String,
    #[serde(default)]
    pub delay_ms: Option<u64>,
    #[serde(default)]
    pub target_names: Vec<String>,
}

impl TriggerDef {
    pub fn delayed(name: impl Into<String>, delay_ms: Option<u64>, targets: &[&str]) -> Self {
        Self {
            name: name.into(),
            kind: delayed_kind(),
            delay_ms,
            target_names: targets.iter().map(|t| t.to_string()).collect(),
        }
    }
}

pub trait Trigger: fmt::Debug + Send + Sync {
    fn name(&self) -> &str;

    /// Fire the trigger against the current scene. Returns the number of
    /// activations scheduled.
    fn activate(&self, scene: &mut dyn TriggerScene, timers: &mut TimerQueue) -> usize;
}

#[derive(Clone, Debug, PartialEq)]
pub struct DelayedTrigger {
    name: String,
    delay: Duration,
    target_names: Vec<String>,
}

impl DelayedTrigger {
    pub fn new(name: impl Into<String>, delay: Duration, target_names: Vec<String>) -> Self {
        Self {
            name: name.into(),
            delay,
            target_names,
        }
    }

    pub fn delay(&self) -> Duration {
        self.delay
    }

    pub fn target_names(&self) -> &[String] {
        &self.target_names
    }
}

impl Trigger for DelayedTrigger {
    fn name(&self) -> &str {
        &self.name
    }

    /// Targets are resolved now; every activatable one gets its own timer entry.
    /// Firing twice schedules twice.
    fn activate(&self, scene: &mut dyn TriggerScene, timers: &mut TimerQueue) -> usize {
        let mut scheduled = 0;
        for target in &self.target_names {
            let Some(object) = scene.find_object(target) else {
                warn!("trigger '{}': target '{}' not found", self.name, target);
                continue;
            };
            if object.as_activatable().is_none() {
                warn!("trigger '{}': target '{}' is not activatable", self.name, target);
                continue;
            }
            timers.schedule(self.delay, target.clone());
            scheduled += 1;
        }
        debug!(
            "trigger '{}' scheduled {scheduled} activations in {:?}",
            self.name, self.delay
        );
        scheduled
    }
}

/// Maps trigger records onto trigger variants.
#[derive(Debug, Clone, Copy, Default)]
pub struct TriggerFactory;

impl TriggerFactory {
    pub fn create_trigger(&self, def: &TriggerDef) -> Result<Box<dyn Trigger>> {
        match def.kind.as_str() {
            DELAYED_KIND => Ok(Box::new(DelayedTrigger::new(
                def.name.clone(),
                Duration::from_millis(def.delay_ms.unwrap_or(0)),
                def.target_names.clone(),
            ))),
            other => Err(CollisionError::UnsupportedTriggerKind(other.to_string())),
        }
    }
}
