use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::lifecycle::{Occurrence, OccurrenceStatus, Profile};

/// Payload handed to the notifier after a committed lifecycle write.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum NotificationEvent {
    OccurrenceCreated {
        occurrence_id: Uuid,
        student_id: Uuid,
        author_id: Uuid,
        tutor_id: Option<Uuid>,
        status: OccurrenceStatus,
    },
    StatusChanged {
        occurrence_id: Uuid,
        student_id: Uuid,
        author_id: Uuid,
        tutor_id: Option<Uuid>,
        old_status: OccurrenceStatus,
        new_status: OccurrenceStatus,
        resolution_text: Option<String>,
    },
}

impl NotificationEvent {
    pub fn created(occurrence: &Occurrence) -> Self {
        NotificationEvent::OccurrenceCreated {
            occurrence_id: occurrence.id,
            student_id: occurrence.student_id,
            author_id: occurrence.author_id,
            tutor_id: occurrence.tutor_id,
            status: occurrence.status,
        }
    }

    pub fn status_changed(
        occurrence: &Occurrence,
        old_status: OccurrenceStatus,
        resolution_text: &str,
    ) -> Self {
        NotificationEvent::StatusChanged {
            occurrence_id: occurrence.id,
            student_id: occurrence.student_id,
            author_id: occurrence.author_id,
            tutor_id: occurrence.tutor_id,
            old_status,
            new_status: occurrence.status,
            resolution_text: Some(resolution_text.to_string()),
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            NotificationEvent::OccurrenceCreated { .. } => "occurrence_created",
            NotificationEvent::StatusChanged { .. } => "status_changed",
        }
    }

    pub fn occurrence_id(&self) -> Uuid {
        match self {
            NotificationEvent::OccurrenceCreated { occurrence_id, .. }
            | NotificationEvent::StatusChanged { occurrence_id, .. } => *occurrence_id,
        }
    }

    pub fn student_id(&self) -> Uuid {
        match self {
            NotificationEvent::OccurrenceCreated { student_id, .. }
            | NotificationEvent::StatusChanged { student_id, .. } => *student_id,
        }
    }

    pub fn author_id(&self) -> Uuid {
        match self {
            NotificationEvent::OccurrenceCreated { author_id, .. }
            | NotificationEvent::StatusChanged { author_id, .. } => *author_id,
        }
    }

    pub fn tutor_id(&self) -> Option<Uuid> {
        match self {
            NotificationEvent::OccurrenceCreated { tutor_id, .. }
            | NotificationEvent::StatusChanged { tutor_id, .. } => *tutor_id,
        }
    }

    /// Whether composing messages for this event needs the vice-director list.
    pub fn targets_vice_direction(&self) -> bool {
        matches!(
            self,
            NotificationEvent::StatusChanged {
                new_status: OccurrenceStatus::EscalatedVp,
                ..
            }
        )
    }
}

/// Someone reachable over WhatsApp.
#[derive(Debug, Clone, PartialEq)]
pub struct Contact {
    pub profile_id: Uuid,
    pub full_name: String,
    pub whatsapp_number: String,
}

impl Contact {
    /// `None` when the profile has no WhatsApp number.
    pub fn from_profile(profile: &Profile) -> Option<Self> {
        let number = profile.whatsapp_number.as_deref()?.trim();
        if number.is_empty() {
            return None;
        }
        Some(Self {
            profile_id: profile.id,
            full_name: profile.full_name.clone(),
            whatsapp_number: number.to_string(),
        })
    }
}

/// People who may be told about an event, as resolved from the directory.
#[derive(Debug, Clone, Default)]
pub struct Recipients {
    pub student_name: String,
    /// Display name of the author even when they have no WhatsApp number.
    pub author_name: Option<String>,
    pub author: Option<Contact>,
    pub tutor: Option<Contact>,
    pub vice_directors: Vec<Contact>,
    pub guardian_phone: Option<String>,
}
