//! Motor do ciclo de vida das ocorrências.
//!
//! O [`LifecycleEngine`] valida cada pedido contra o grafo de status e a
//! política de papéis ([`policy`](super::policy)), grava status e tratativa como
//! uma unidade através do [`OccurrenceStore`] e só então avisa o notificador.
//! Falhas do notificador são registradas em log e nunca desfazem a transição.

use std::collections::HashMap;

use serde::Serialize;
use tracing::{debug, info, warn};
use uuid::Uuid;

use super::policy;
use super::record::{
    Action, Actor, NewOccurrence, Occurrence, OccurrenceDetail, OccurrenceFilter, RosterEntity,
    StatusChange, Student,
};
use super::stats::{summarize_by_author, AuthorStats};
use super::status::{ActionType, Role};
use crate::error::{EscolaFlowError, Result};
use crate::notify::{Contact, NotificationEvent, Notifier, Recipients};
use crate::store::OccurrenceStore;

/// What a successful `submit_action` produced.
#[derive(Debug, Clone, Serialize)]
pub struct TransitionOutcome {
    pub occurrence: Occurrence,
    pub action: Action,
    /// Payload for the notifier; available even when no notifier is configured.
    pub event: NotificationEvent,
}

pub struct LifecycleEngine<S, N> {
    store: S,
    notifier: Option<N>,
}

impl<S: OccurrenceStore, N: Notifier> LifecycleEngine<S, N> {
    pub fn new(store: S, notifier: Option<N>) -> Self {
        Self { store, notifier }
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    /// Looks the caller up once per request. Inactive profiles cannot act.
    pub async fn resolve_actor(&self, profile_id: Uuid) -> Result<Actor> {
        let profile = self
            .store
            .get_profile(profile_id)
            .await?
            .ok_or_else(|| EscolaFlowError::not_found("profile", profile_id))?;
        if !profile.active {
            return Err(EscolaFlowError::Unauthorized(format!(
                "profile {profile_id} is inactive"
            )));
        }
        Ok(Actor::from(&profile))
    }

    /// Files a new occurrence in `PENDING_TUTOR` with the actor as author.
    pub async fn create_occurrence(
        &self,
        actor: &Actor,
        mut input: NewOccurrence,
    ) -> Result<Occurrence> {
        if input.description_formal.trim().is_empty() {
            return Err(EscolaFlowError::Validation(
                "formal description must not be empty".into(),
            ));
        }

        let student = self
            .store
            .get_student(input.student_id)
            .await?
            .ok_or_else(|| EscolaFlowError::not_found("student", input.student_id))?;
        if !student.active {
            return Err(EscolaFlowError::Validation(format!(
                "student {} is inactive",
                student.id
            )));
        }
        if input.tutor_id.is_none() {
            input.tutor_id = student.tutor_id;
        }

        let occurrence = Occurrence::new(actor.profile_id, input);
        self.store.insert_occurrence(&occurrence).await?;
        info!(
            occurrence_id = %occurrence.id,
            student_id = %occurrence.student_id,
            author_id = %actor.profile_id,
            "occurrence created"
        );

        self.dispatch(&NotificationEvent::created(&occurrence)).await;
        Ok(occurrence)
    }

    /// Records a treatment and moves the occurrence along the state graph.
    ///
    /// Checks run in this order: empty description (`Validation`), unknown
    /// occurrence (`NotFound`), no edge from the current status
    /// (`InvalidTransition`), actor not eligible for the edge (`Unauthorized`).
    pub async fn submit_action(
        &self,
        actor: &Actor,
        occurrence_id: Uuid,
        action_type: ActionType,
        description: &str,
    ) -> Result<TransitionOutcome> {
        let description = description.trim();
        if description.is_empty() {
            return Err(EscolaFlowError::Validation(
                "action description must not be empty".into(),
            ));
        }

        let occurrence = self
            .store
            .get_occurrence(occurrence_id)
            .await?
            .ok_or_else(|| EscolaFlowError::not_found("occurrence", occurrence_id))?;
        let from = occurrence.status;
        let to = policy::edge(from, action_type).ok_or(EscolaFlowError::InvalidTransition {
            from,
            action: action_type,
        })?;

        let is_tutor = occurrence.is_assigned_tutor(actor.profile_id);
        if !policy::can_transition(actor.role, is_tutor, from, action_type) {
            return Err(EscolaFlowError::Unauthorized(format!(
                "{} {} may not record {action_type} on occurrence {occurrence_id}",
                actor.role, actor.profile_id
            )));
        }

        let action = Action::new(
            occurrence_id,
            actor.profile_id,
            action_type,
            description.to_string(),
        );
        let change = StatusChange {
            occurrence_id,
            from,
            to,
            action: action.clone(),
        };
        let updated = self.store.apply_transition(&change).await?;
        info!(
            %occurrence_id,
            actor = %actor.profile_id,
            %action_type,
            %from,
            %to,
            "occurrence transitioned"
        );

        let event = NotificationEvent::status_changed(&updated, from, description);
        self.dispatch(&event).await;

        Ok(TransitionOutcome {
            occurrence: updated,
            action,
            event,
        })
    }

    /// Administrative removal. Not part of the state graph, so any status goes.
    pub async fn delete_occurrence(&self, actor: &Actor, occurrence_id: Uuid) -> Result<()> {
        require_admin(actor, "delete occurrences")?;
        if !self.store.delete_occurrence(occurrence_id).await? {
            return Err(EscolaFlowError::not_found("occurrence", occurrence_id));
        }
        info!(%occurrence_id, actor = %actor.profile_id, "occurrence deleted");
        Ok(())
    }

    /// Sets or clears a student's tutor (admin only). Only active professors
    /// and vice-directors can tutor. Occurrences already filed are untouched.
    pub async fn assign_tutor(
        &self,
        actor: &Actor,
        student_id: Uuid,
        tutor_id: Option<Uuid>,
    ) -> Result<Student> {
        require_admin(actor, "assign tutors")?;

        if let Some(tutor_id) = tutor_id {
            let tutor = self
                .store
                .get_profile(tutor_id)
                .await?
                .ok_or_else(|| EscolaFlowError::not_found("profile", tutor_id))?;
            if !tutor.active || tutor.role == Role::Admin {
                return Err(EscolaFlowError::Validation(format!(
                    "{} cannot be assigned as tutor",
                    tutor.full_name
                )));
            }
        }

        if !self.store.set_student_tutor(student_id, tutor_id).await? {
            return Err(EscolaFlowError::not_found("student", student_id));
        }
        info!(%student_id, tutor_id = ?tutor_id, actor = %actor.profile_id, "tutor assignment changed");

        self.store
            .get_student(student_id)
            .await?
            .ok_or_else(|| EscolaFlowError::not_found("student", student_id))
    }

    /// Soft (de)activation of a profile, class or student (admin only).
    pub async fn set_active(
        &self,
        actor: &Actor,
        entity: RosterEntity,
        id: Uuid,
        active: bool,
    ) -> Result<()> {
        require_admin(actor, "change roster status")?;
        if !active && entity == RosterEntity::Profile && id == actor.profile_id {
            return Err(EscolaFlowError::Validation(
                "administrators cannot deactivate their own profile".into(),
            ));
        }
        if !self.store.set_active(entity, id, active).await? {
            return Err(EscolaFlowError::not_found(entity.as_str(), id));
        }
        info!(entity = entity.as_str(), %id, active, actor = %actor.profile_id, "roster status changed");
        Ok(())
    }

    pub async fn occurrence_detail(&self, occurrence_id: Uuid) -> Result<OccurrenceDetail> {
        let occurrence = self
            .store
            .get_occurrence(occurrence_id)
            .await?
            .ok_or_else(|| EscolaFlowError::not_found("occurrence", occurrence_id))?;
        let actions = self.store.list_actions(occurrence_id).await?;
        Ok(OccurrenceDetail {
            occurrence,
            actions,
        })
    }

    pub async fn list_occurrences(&self, filter: &OccurrenceFilter) -> Result<Vec<Occurrence>> {
        self.store.list_occurrences(filter).await
    }

    /// What `actor` could do to the occurrence right now.
    pub fn available_actions(&self, actor: &Actor, occurrence: &Occurrence) -> Vec<ActionType> {
        policy::available_actions(
            actor.role,
            occurrence.is_assigned_tutor(actor.profile_id),
            occurrence.status,
        )
    }

    pub async fn author_stats(&self) -> Result<Vec<AuthorStats>> {
        let occurrences = self
            .store
            .list_occurrences(&OccurrenceFilter::default())
            .await?;

        let mut names = HashMap::new();
        for occurrence in &occurrences {
            if names.contains_key(&occurrence.author_id) {
                continue;
            }
            if let Some(profile) = self.store.get_profile(occurrence.author_id).await? {
                names.insert(occurrence.author_id, profile.full_name);
            }
        }

        Ok(summarize_by_author(&occurrences, &names))
    }

    async fn dispatch(&self, event: &NotificationEvent) {
        let Some(notifier) = &self.notifier else {
            return;
        };

        let recipients = match self.recipients_for(event).await {
            Ok(recipients) => recipients,
            Err(e) => {
                warn!(kind = event.name(), error = %e, "could not resolve notification recipients");
                return;
            }
        };

        match notifier.notify(event, &recipients).await {
            Ok(report) => {
                for failed in report.failures() {
                    warn!(
                        kind = event.name(),
                        recipient = %failed.recipient,
                        error = failed.error.as_deref().unwrap_or("unknown"),
                        "notification not delivered"
                    );
                }
                debug!(
                    kind = event.name(),
                    attempted = report.deliveries.len(),
                    "notification dispatched"
                );
            }
            Err(e) => {
                warn!(kind = event.name(), occurrence_id = %event.occurrence_id(), error = %e, "notifier failed");
            }
        }
    }

    async fn recipients_for(&self, event: &NotificationEvent) -> Result<Recipients> {
        let author = self.store.get_profile(event.author_id()).await?;
        let tutor = match event.tutor_id() {
            Some(id) => self.store.get_profile(id).await?,
            None => None,
        };
        let vice_directors = if event.targets_vice_direction() {
            self.store
                .list_vice_directors()
                .await?
                .iter()
                .filter_map(Contact::from_profile)
                .collect()
        } else {
            Vec::new()
        };
        let student = self.store.get_student(event.student_id()).await?;

        Ok(Recipients {
            student_name: student.as_ref().map(|s| s.name.clone()).unwrap_or_default(),
            author_name: author.as_ref().map(|a| a.full_name.clone()),
            author: author.as_ref().and_then(Contact::from_profile),
            tutor: tutor.as_ref().and_then(Contact::from_profile),
            vice_directors,
            guardian_phone: student.and_then(|s| s.guardian_phone),
        })
    }
}

fn require_admin(actor: &Actor, what: &str) -> Result<()> {
    if actor.role != Role::Admin {
        return Err(EscolaFlowError::Unauthorized(format!(
            "only administrators may {what}"
        )));
    }
    Ok(())
}
