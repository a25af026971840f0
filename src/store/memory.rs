use std::collections::HashMap;

use chrono::Utc;
use tokio::sync::Mutex;
use uuid::Uuid;

use super::{OccurrenceStore, ProfileDirectory};
use crate::error::{EscolaFlowError, Result};
use crate::lifecycle::{
    policy, Action, Occurrence, OccurrenceFilter, Profile, Role, RosterEntity, SchoolClass,
    StatusChange, Student,
};

#[derive(Default)]
struct Tables {
    profiles: HashMap<Uuid, Profile>,
    classes: HashMap<Uuid, SchoolClass>,
    students: HashMap<Uuid, Student>,
    occurrences: HashMap<Uuid, Occurrence>,
    actions: Vec<Action>,
}

/// In-process store. Every operation holds one lock, so a transition's check
/// and both writes happen without interleaving.
#[derive(Default)]
pub struct MemoryStore {
    tables: Mutex<Tables>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn insert_profile(&self, profile: Profile) {
        self.tables.lock().await.profiles.insert(profile.id, profile);
    }

    pub async fn insert_class(&self, class: SchoolClass) {
        self.tables.lock().await.classes.insert(class.id, class);
    }

    pub async fn insert_student(&self, student: Student) {
        self.tables.lock().await.students.insert(student.id, student);
    }

    pub async fn action_count(&self) -> usize {
        self.tables.lock().await.actions.len()
    }
}

impl ProfileDirectory for MemoryStore {
    async fn get_profile(&self, id: Uuid) -> Result<Option<Profile>> {
        Ok(self.tables.lock().await.profiles.get(&id).cloned())
    }

    async fn list_vice_directors(&self) -> Result<Vec<Profile>> {
        let tables = self.tables.lock().await;
        let mut vps: Vec<Profile> = tables
            .profiles
            .values()
            .filter(|p| p.role == Role::ViceDirector && p.active)
            .cloned()
            .collect();
        vps.sort_by(|a, b| a.full_name.cmp(&b.full_name));
        Ok(vps)
    }
}

impl OccurrenceStore for MemoryStore {
    async fn get_student(&self, id: Uuid) -> Result<Option<Student>> {
        Ok(self.tables.lock().await.students.get(&id).cloned())
    }

    async fn get_occurrence(&self, id: Uuid) -> Result<Option<Occurrence>> {
        Ok(self.tables.lock().await.occurrences.get(&id).cloned())
    }

    async fn insert_occurrence(&self, occurrence: &Occurrence) -> Result<()> {
        self.tables
            .lock()
            .await
            .occurrences
            .insert(occurrence.id, occurrence.clone());
        Ok(())
    }

    async fn apply_transition(&self, change: &StatusChange) -> Result<Occurrence> {
        let action_type = change.action.action_type;
        if policy::edge(change.from, action_type) != Some(change.to) {
            return Err(EscolaFlowError::InvalidTransition {
                from: change.from,
                action: action_type,
            });
        }

        let mut tables = self.tables.lock().await;
        let occurrence = tables
            .occurrences
            .get_mut(&change.occurrence_id)
            .ok_or_else(|| EscolaFlowError::not_found("occurrence", change.occurrence_id))?;

        if occurrence.status != change.from {
            return Err(EscolaFlowError::InvalidTransition {
                from: occurrence.status,
                action: action_type,
            });
        }

        occurrence.status = change.to;
        occurrence.updated_at = Utc::now();
        let updated = occurrence.clone();
        tables.actions.push(change.action.clone());
        Ok(updated)
    }

    async fn list_actions(&self, occurrence_id: Uuid) -> Result<Vec<Action>> {
        let tables = self.tables.lock().await;
        Ok(tables
            .actions
            .iter()
            .filter(|a| a.occurrence_id == occurrence_id)
            .cloned()
            .collect())
    }

    async fn list_occurrences(&self, filter: &OccurrenceFilter) -> Result<Vec<Occurrence>> {
        let tables = self.tables.lock().await;
        let mut occurrences: Vec<Occurrence> = tables
            .occurrences
            .values()
            .filter(|o| filter.matches(o))
            .cloned()
            .collect();
        occurrences.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(occurrences)
    }

    async fn delete_occurrence(&self, id: Uuid) -> Result<bool> {
        let mut tables = self.tables.lock().await;
        if tables.occurrences.remove(&id).is_none() {
            return Ok(false);
        }
        tables.actions.retain(|a| a.occurrence_id != id);
        Ok(true)
    }

    async fn set_student_tutor(&self, student_id: Uuid, tutor_id: Option<Uuid>) -> Result<bool> {
        let mut tables = self.tables.lock().await;
        let Some(student) = tables.students.get_mut(&student_id) else {
            return Ok(false);
        };
        student.tutor_id = tutor_id;
        Ok(true)
    }

    async fn set_active(&self, entity: RosterEntity, id: Uuid, active: bool) -> Result<bool> {
        let mut tables = self.tables.lock().await;
        let flag = match entity {
            RosterEntity::Profile => tables.profiles.get_mut(&id).map(|p| &mut p.active),
            RosterEntity::Class => tables.classes.get_mut(&id).map(|c| &mut c.active),
            RosterEntity::Student => tables.students.get_mut(&id).map(|s| &mut s.active),
        };
        match flag {
            Some(flag) => {
                *flag = active;
                Ok(true)
            }
            None => Ok(false),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::lifecycle::{ActionType, NewOccurrence, OccurrenceStatus};

    async fn store_with_occurrence() -> (MemoryStore, Occurrence) {
        let store = MemoryStore::new();
        let occ = Occurrence::new(
            Uuid::new_v4(),
            NewOccurrence {
                student_id: Uuid::new_v4(),
                tutor_id: None,
                description_original: "bagunça".into(),
                description_formal: "Comportamento inadequado em sala.".into(),
            },
        );
        store.insert_occurrence(&occ).await.unwrap();
        (store, occ)
    }

    fn change(occ: &Occurrence, from: OccurrenceStatus, action_type: ActionType) -> StatusChange {
        StatusChange {
            occurrence_id: occ.id,
            from,
            to: OccurrenceStatus::Concluded,
            action: Action::new(occ.id, Uuid::new_v4(), action_type, "Resolvido".into()),
        }
    }

    #[tokio::test]
    async fn apply_transition_writes_status_and_action() {
        let (store, occ) = store_with_occurrence().await;
        let updated = store
            .apply_transition(&change(&occ, OccurrenceStatus::PendingTutor, ActionType::Resolution))
            .await
            .unwrap();

        assert_eq!(updated.status, OccurrenceStatus::Concluded);
        assert!(updated.updated_at >= occ.updated_at);
        assert_eq!(store.list_actions(occ.id).await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn stale_status_writes_nothing() {
        let (store, occ) = store_with_occurrence().await;
        let first = change(&occ, OccurrenceStatus::PendingTutor, ActionType::Resolution);
        let second = change(&occ, OccurrenceStatus::PendingTutor, ActionType::Resolution);

        store.apply_transition(&first).await.unwrap();
        let err = store.apply_transition(&second).await.unwrap_err();

        assert!(matches!(
            err,
            EscolaFlowError::InvalidTransition {
                from: OccurrenceStatus::Concluded,
                ..
            }
        ));
        assert_eq!(store.action_count().await, 1);
    }

    #[tokio::test]
    async fn apply_transition_on_missing_occurrence() {
        let store = MemoryStore::new();
        let ghost = StatusChange {
            occurrence_id: Uuid::new_v4(),
            from: OccurrenceStatus::PendingTutor,
            to: OccurrenceStatus::Concluded,
            action: Action::new(Uuid::new_v4(), Uuid::new_v4(), ActionType::Resolution, "x".into()),
        };
        let err = store.apply_transition(&ghost).await.unwrap_err();
        assert!(matches!(err, EscolaFlowError::NotFound { .. }));
        assert_eq!(store.action_count().await, 0);
    }

    #[tokio::test]
    async fn delete_removes_actions_too() {
        let (store, occ) = store_with_occurrence().await;
        store
            .apply_transition(&change(&occ, OccurrenceStatus::PendingTutor, ActionType::Resolution))
            .await
            .unwrap();

        assert!(store.delete_occurrence(occ.id).await.unwrap());
        assert!(store.get_occurrence(occ.id).await.unwrap().is_none());
        assert_eq!(store.action_count().await, 0);
        assert!(!store.delete_occurrence(occ.id).await.unwrap());
    }

    #[tokio::test]
    async fn transition_off_the_graph_writes_nothing() {
        let (store, occ) = store_with_occurrence().await;
        // Escalation leads to ESCALATED_VP, not CONCLUDED.
        let bogus = change(&occ, OccurrenceStatus::PendingTutor, ActionType::Escalation);

        let err = store.apply_transition(&bogus).await.unwrap_err();
        assert!(matches!(
            err,
            EscolaFlowError::InvalidTransition {
                from: OccurrenceStatus::PendingTutor,
                action: ActionType::Escalation,
            }
        ));
        let stored = store.get_occurrence(occ.id).await.unwrap().unwrap();
        assert_eq!(stored.status, OccurrenceStatus::PendingTutor);
        assert_eq!(store.action_count().await, 0);
    }

    #[tokio::test]
    async fn student_tutor_can_be_set_and_cleared() {
        let store = MemoryStore::new();
        let class = SchoolClass::new("6º C", 2026);
        let student = Student::new("Lia", class.id, None);
        let student_id = student.id;
        store.insert_student(student).await;
        let tutor = Uuid::new_v4();

        assert!(store.set_student_tutor(student_id, Some(tutor)).await.unwrap());
        assert_eq!(store.get_student(student_id).await.unwrap().unwrap().tutor_id, Some(tutor));

        assert!(store.set_student_tutor(student_id, None).await.unwrap());
        assert!(store.get_student(student_id).await.unwrap().unwrap().tutor_id.is_none());

        assert!(!store.set_student_tutor(Uuid::new_v4(), Some(tutor)).await.unwrap());
    }

    #[tokio::test]
    async fn set_active_flips_each_roster_table() {
        let store = MemoryStore::new();
        let vp = Profile::new("Vera", Role::ViceDirector);
        let vp_id = vp.id;
        let class = SchoolClass::new("6º C", 2026);
        let class_id = class.id;
        let student = Student::new("Lia", class_id, None);
        let student_id = student.id;
        store.insert_profile(vp).await;
        store.insert_class(class).await;
        store.insert_student(student).await;

        assert!(store.set_active(RosterEntity::Profile, vp_id, false).await.unwrap());
        assert!(store.list_vice_directors().await.unwrap().is_empty());
        assert!(store.set_active(RosterEntity::Class, class_id, false).await.unwrap());
        assert!(store.set_active(RosterEntity::Student, student_id, false).await.unwrap());
        assert!(!store.get_student(student_id).await.unwrap().unwrap().active);

        assert!(store.set_active(RosterEntity::Student, student_id, true).await.unwrap());
        assert!(store.get_student(student_id).await.unwrap().unwrap().active);
        // Ids are per table.
        assert!(!store.set_active(RosterEntity::Class, student_id, false).await.unwrap());
    }

    #[tokio::test]
    async fn vice_directors_are_active_and_sorted() {
        let store = MemoryStore::new();
        store.insert_profile(Profile::new("Carla", Role::ViceDirector)).await;
        store.insert_profile(Profile::new("Bia", Role::ViceDirector)).await;
        store.insert_profile(Profile::new("Davi", Role::Professor)).await;
        let mut inactive = Profile::new("Ana", Role::ViceDirector);
        inactive.active = false;
        store.insert_profile(inactive).await;

        let names: Vec<String> = store
            .list_vice_directors()
            .await
            .unwrap()
            .into_iter()
            .map(|p| p.full_name)
            .collect();
        assert_eq!(names, vec!["Bia", "Carla"]);
    }
}
