use chrono::{DateTime, Utc};
use uuid::Uuid;

/// Transport-agnostic change notification for a student collection.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StudentDomainEvent {
    Created {
        owner: Uuid,
        id: Uuid,
        at: DateTime<Utc>,
    },
    Deleted {
        owner: Uuid,
        id: Uuid,
        at: DateTime<Utc>,
    },
}

impl StudentDomainEvent {
    pub fn owner(&self) -> Uuid {
        match self {
            Self::Created { owner, .. } | Self::Deleted { owner, .. } => *owner,
        }
    }
}
