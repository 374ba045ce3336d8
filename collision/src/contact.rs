/*!
Trigger-body contact state machine.

A trigger body does not respond to collisions; it only reports overlap. Each step it
asks a [`ContactSource`] whether anything currently touches it and compares the
answer with the previous step:

```text
idle ──(contact seen)──▶ incontact      fires contactStart
incontact ──(no contact)──▶ idle        fires contactEnd
```

Repeated contact while already `incontact` (or no contact while `idle`) fires
nothing. Evaluation must happen once per physics step, after the step resolves
contacts and before render sync.
*/

use std::collections::HashSet;
use std::fmt;
use std::sync::Arc;

use rapier3d::prelude::RigidBodyHandle;

/// Opaque identity of a body inside its collision model (definition order).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct BodyId(pub usize);

/// Anything that can answer "is this body touching something right now?".
///
/// Implementations must not fail: an unknown or stale handle is simply "no contact".
pub trait ContactSource {
    fn in_contact(&self, body: RigidBodyHandle) -> bool;
}

/// A plain set of touching bodies, useful for feeding contacts collected elsewhere.
impl ContactSource for HashSet<RigidBodyHandle> {
    fn in_contact(&self, body: RigidBodyHandle) -> bool {
        self.contains(&body)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ContactState {
    #[default]
    Idle,
    InContact,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ContactPhase {
    Started,
    Ended,
}

/// Raised on a trigger body's state transition.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ContactEvent {
    pub phase: ContactPhase,
    pub body: BodyId,
    pub handle: RigidBodyHandle,
}

pub type ContactListener = Arc<dyn Fn(&ContactEvent) + Send + Sync>;

/// Optional contact-start / contact-end callbacks supplied by gameplay code.
#[derive(Clone, Default)]
pub struct ContactListeners {
    pub on_start: Option<ContactListener>,
    pub on_end: Option<ContactListener>,
}

impl ContactListeners {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn on_start(mut self, listener: impl Fn(&ContactEvent) + Send + Sync + 'static) -> Self {
        self.on_start = Some(Arc::new(listener));
        self
    }

    pub fn on_end(mut self, listener: impl Fn(&ContactEvent) + Send + Sync + 'static) -> Self {
        self.on_end = Some(Arc::new(listener));
        self
    }

    pub fn is_empty(&self) -> bool {
        self.on_start.is_none() && self.on_end.is_none()
    }

    fn notify(&self, event: &ContactEvent) {
        let listener = match event.phase {
            ContactPhase::Started => &self.on_start,
            ContactPhase::Ended => &self.on_end,
        };
        if let Some(listener) = listener {
            listener(event);
        }
    }
}

impl fmt::Debug for ContactListeners {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ContactListeners")
            .field("on_start", &self.on_start.is_some())
            .field("on_end", &self.on_end.is_some())
            .finish()
    }
}

/// Per-body trigger state plus the listeners it notifies.
#[derive(Debug, Default)]
pub struct TriggerBody {
    state: ContactState,
    listeners: ContactListeners,
    last_handle: Option<RigidBodyHandle>,
}

impl TriggerBody {
    pub fn new(listeners: ContactListeners) -> Self {
        Self {
            state: ContactState::Idle,
            listeners,
            last_handle: None,
        }
    }

    pub fn state(&self) -> ContactState {
        self.state
    }

    pub fn in_contact(&self) -> bool {
        self.state == ContactState::InContact
    }

    /// Feed this step's contact answer; returns the transition, if any.
    pub fn transition(&mut self, touching: bool) -> Option<ContactPhase> {
        match (self.state, touching) {
            (ContactState::Idle, true) => {
                self.state = ContactState::InContact;
                Some(ContactPhase::Started)
            }
            (ContactState::InContact, false) => {
                self.state = ContactState::Idle;
                Some(ContactPhase::Ended)
            }
            _ => None,
        }
    }

    /// Query `source` for `handle`, advance the state machine and notify listeners.
    ///
    /// A body without a handle (not inserted yet, or removed from the world) counts
    /// as not touching anything. Removal while in contact still reports `Ended`,
    /// carrying the last handle the body had.
    pub fn evaluate(
        &mut self,
        body: BodyId,
        handle: Option<RigidBodyHandle>,
        source: &impl ContactSource,
    ) -> Option<ContactEvent> {
        if handle.is_some() {
            self.last_handle = handle;
        }
        let touching = handle.is_some_and(|h| source.in_contact(h));
        let phase = self.transition(touching)?;
        // `InContact` is only entered with a handle, so one has been recorded.
        let handle = self.last_handle?;
        let event = ContactEvent {
            phase,
            body,
            handle,
        };
        self.listeners.notify(&event);
        Some(event)
    }
}
