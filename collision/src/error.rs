/*!
Errors raised while turning collision definitions into live bodies.

Every variant describes bad content (a map or entity definition that cannot be
built). They are detected at model-construction time and abort that entity's
spawn; nothing here is transient, so callers should log and skip rather than retry.
*/

/// Configuration-data errors for shapes, bodies, materials and triggers.
#[derive(thiserror::Error, Debug, Clone, PartialEq)]
pub enum CollisionError {
    /// The shape `kind` string is not one the builder (or debug mesher) understands.
    #[error("unsupported shape kind: {0}")]
    UnsupportedShapeKind(String),

    /// The trigger `kind` string has no registered trigger variant.
    #[error("unsupported trigger kind: {0}")]
    UnsupportedTriggerKind(String),

    /// Neither the requested material nor the `"default"` fallback exists.
    #[error("material not found: {0}")]
    MaterialNotFound(String),

    /// The shape kind is known but its data cannot form a primitive
    /// (missing dimension, ragged heightfield, bad trimesh index, degenerate hull).
    #[error("malformed {kind} shape: {reason}")]
    MalformedShape { kind: String, reason: String },
}

impl CollisionError {
    pub(crate) fn malformed(kind: &str, reason: impl Into<String>) -> Self {
        Self::MalformedShape {
            kind: kind.to_string(),
            reason: reason.into(),
        }
    }
}

pub type Result<T> = std::result::Result<T, CollisionError>;
