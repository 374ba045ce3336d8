//! The scene as seen by triggers: named objects, some of which can be activated.

use std::collections::HashMap;

/// Zero-argument activation capability (doors, lifts, spawners...).
pub trait Activatable {
    fn activate(&mut self);
}

/// Any object a trigger may look up by name.
///
/// Activation is optional: objects that cannot be activated keep the default
/// `None` and are skipped (with a warning) by triggers that target them.
pub trait SceneObject: Send + Sync {
    fn as_activatable(&mut self) -> Option<&mut dyn Activatable> {
        None
    }
}

/// Name lookup into the *current* scene.
pub trait TriggerScene {
    fn find_object(&mut self, name: &str) -> Option<&mut dyn SceneObject>;
}

/// Plain name → object map.
#[derive(Default)]
pub struct SceneIndex {
    objects: HashMap<String, Box<dyn SceneObject>>,
}

impl SceneIndex {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register `object` under `name`, replacing (and returning) any previous one.
    pub fn insert(
        &mut self,
        name: impl Into<String>,
        object: Box<dyn SceneObject>,
    ) -> Option<Box<dyn SceneObject>> {
        self.objects.insert(name.into(), object)
    }

    pub fn remove(&mut self, name: &str) -> Option<Box<dyn SceneObject>> {
        self.objects.remove(name)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.objects.contains_key(name)
    }

    pub fn len(&self) -> usize {
        self.objects.len()
    }

    pub fn is_empty(&self) -> bool {
        self.objects.is_empty()
    }
}

impl TriggerScene for SceneIndex {
    fn find_object(&mut self, name: &str) -> Option<&mut dyn SceneObject> {
        match self.objects.get_mut(name) {
            Some(object) => Some(object.as_mut()),
            None => None,
        }
    }
}

impl std::fmt::Debug for SceneIndex {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let mut names: Vec<_> = self.objects.keys().collect();
        names.sort();
        f.debug_struct("SceneIndex").field("objects", &names).finish()
    }
}
