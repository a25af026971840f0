use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::status::{ActionType, OccurrenceStatus, Role};

/// A recorded school incident tied to a student.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Occurrence {
    pub id: Uuid,
    pub student_id: Uuid,
    pub author_id: Uuid,
    pub tutor_id: Option<Uuid>,
    pub description_original: String,
    pub description_formal: String,
    pub status: OccurrenceStatus,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Occurrence {
    /// Builds a fresh occurrence in the initial `PENDING_TUTOR` state.
    pub fn new(author_id: Uuid, input: NewOccurrence) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4(),
            student_id: input.student_id,
            author_id,
            tutor_id: input.tutor_id,
            description_original: input.description_original,
            description_formal: input.description_formal,
            status: OccurrenceStatus::PendingTutor,
            created_at: now,
            updated_at: now,
        }
    }

    pub fn is_assigned_tutor(&self, profile_id: Uuid) -> bool {
        self.tutor_id == Some(profile_id)
    }
}

/// Fields supplied by the professor filing an occurrence.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewOccurrence {
    pub student_id: Uuid,
    /// Falls back to the student's tutor when absent.
    pub tutor_id: Option<Uuid>,
    pub description_original: String,
    pub description_formal: String,
}

/// One entry of the append-only treatment log.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Action {
    pub id: Uuid,
    pub occurrence_id: Uuid,
    pub author_id: Uuid,
    pub action_type: ActionType,
    pub description: String,
    pub created_at: DateTime<Utc>,
}

impl Action {
    pub fn new(
        occurrence_id: Uuid,
        author_id: Uuid,
        action_type: ActionType,
        description: String,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            occurrence_id,
            author_id,
            action_type,
            description,
            created_at: Utc::now(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Profile {
    pub id: Uuid,
    pub full_name: String,
    pub role: Role,
    pub whatsapp_number: Option<String>,
    pub email: Option<String>,
    pub active: bool,
    pub created_at: DateTime<Utc>,
}

impl Profile {
    pub fn new(full_name: impl Into<String>, role: Role) -> Self {
        Self {
            id: Uuid::new_v4(),
            full_name: full_name.into(),
            role,
            whatsapp_number: None,
            email: None,
            active: true,
            created_at: Utc::now(),
        }
    }

    pub fn with_whatsapp(mut self, number: impl Into<String>) -> Self {
        self.whatsapp_number = Some(number.into());
        self
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SchoolClass {
    pub id: Uuid,
    pub name: String,
    pub year: i32,
    pub active: bool,
}

impl SchoolClass {
    pub fn new(name: impl Into<String>, year: i32) -> Self {
        Self {
            id: Uuid::new_v4(),
            name: name.into(),
            year,
            active: true,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Student {
    pub id: Uuid,
    pub name: String,
    /// Número de matrícula.
    pub registration: Option<String>,
    pub class_id: Uuid,
    pub tutor_id: Option<Uuid>,
    pub guardian_phone: Option<String>,
    pub active: bool,
}

impl Student {
    pub fn new(name: impl Into<String>, class_id: Uuid, tutor_id: Option<Uuid>) -> Self {
        Self {
            id: Uuid::new_v4(),
            name: name.into(),
            registration: None,
            class_id,
            tutor_id,
            guardian_phone: None,
            active: true,
        }
    }
}

/// Cadastros que o administrador desativa em vez de excluir.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RosterEntity {
    Profile,
    Class,
    Student,
}

impl RosterEntity {
    pub fn as_str(&self) -> &'static str {
        match self {
            RosterEntity::Profile => "profile",
            RosterEntity::Class => "class",
            RosterEntity::Student => "student",
        }
    }
}

/// Caller identity for a single request, resolved once from the profile directory.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Actor {
    pub profile_id: Uuid,
    pub role: Role,
}

impl From<&Profile> for Actor {
    fn from(profile: &Profile) -> Self {
        Self {
            profile_id: profile.id,
            role: profile.role,
        }
    }
}

/// Everything the storage layer needs to apply one transition atomically.
#[derive(Debug, Clone)]
pub struct StatusChange {
    pub occurrence_id: Uuid,
    /// Status the decision was made against; the write is refused if it changed.
    pub from: OccurrenceStatus,
    pub to: OccurrenceStatus,
    pub action: Action,
}

#[derive(Debug, Clone, Serialize)]
pub struct OccurrenceDetail {
    pub occurrence: Occurrence,
    pub actions: Vec<Action>,
}

#[derive(Debug, Clone, Default)]
pub struct OccurrenceFilter {
    pub status: Option<OccurrenceStatus>,
    pub student_id: Option<Uuid>,
}

impl OccurrenceFilter {
    #[cfg(test)]
    pub fn matches(&self, occurrence: &Occurrence) -> bool {
        self.status.is_none_or(|s| s == occurrence.status)
            && self.student_id.is_none_or(|id| id == occurrence.student_id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn new_input(student_id: Uuid, tutor_id: Option<Uuid>) -> NewOccurrence {
        NewOccurrence {
            student_id,
            tutor_id,
            description_original: "o aluno brigou no recreio".into(),
            description_formal: "O aluno envolveu-se em briga durante o recreio.".into(),
        }
    }

    #[test]
    fn new_occurrence_starts_pending() {
        let author = Uuid::new_v4();
        let occ = Occurrence::new(author, new_input(Uuid::new_v4(), None));
        assert_eq!(occ.status, OccurrenceStatus::PendingTutor);
        assert_eq!(occ.author_id, author);
        assert_eq!(occ.created_at, occ.updated_at);
        assert!(occ.tutor_id.is_none());
    }

    #[test]
    fn assigned_tutor_check() {
        let tutor = Uuid::new_v4();
        let occ = Occurrence::new(Uuid::new_v4(), new_input(Uuid::new_v4(), Some(tutor)));
        assert!(occ.is_assigned_tutor(tutor));
        assert!(!occ.is_assigned_tutor(Uuid::new_v4()));
    }

    #[test]
    fn filter_matches_status_and_student() {
        let student = Uuid::new_v4();
        let occ = Occurrence::new(Uuid::new_v4(), new_input(student, None));

        assert!(OccurrenceFilter::default().matches(&occ));
        assert!(
            OccurrenceFilter {
                status: Some(OccurrenceStatus::PendingTutor),
                student_id: Some(student),
            }
            .matches(&occ)
        );
        assert!(
            !OccurrenceFilter {
                status: Some(OccurrenceStatus::Concluded),
                student_id: None,
            }
            .matches(&occ)
        );
        assert!(
            !OccurrenceFilter {
                status: None,
                student_id: Some(Uuid::new_v4()),
            }
            .matches(&occ)
        );
    }

    #[test]
    fn actor_from_profile() {
        let profile = Profile::new("Ana Souza", Role::ViceDirector);
        let actor = Actor::from(&profile);
        assert_eq!(actor.profile_id, profile.id);
        assert_eq!(actor.role, Role::ViceDirector);
    }
}
