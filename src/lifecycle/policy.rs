use super::status::{ActionType, OccurrenceStatus, Role};

/// Every edge of the occurrence state graph: (from, action, to).
pub const TRANSITIONS: [(OccurrenceStatus, ActionType, OccurrenceStatus); 4] = [
    (
        OccurrenceStatus::PendingTutor,
        ActionType::Resolution,
        OccurrenceStatus::Concluded,
    ),
    (
        OccurrenceStatus::PendingTutor,
        ActionType::Escalation,
        OccurrenceStatus::EscalatedVp,
    ),
    (
        OccurrenceStatus::PendingTutor,
        ActionType::VpResolution,
        OccurrenceStatus::Concluded,
    ),
    (
        OccurrenceStatus::EscalatedVp,
        ActionType::VpResolution,
        OccurrenceStatus::Concluded,
    ),
];

/// Target status for `action` taken while the occurrence is `from`, or `None`
/// when the graph has no such edge. Concluded occurrences have no edges.
pub fn edge(from: OccurrenceStatus, action: ActionType) -> Option<OccurrenceStatus> {
    TRANSITIONS
        .iter()
        .find(|(f, a, _)| *f == from && *a == action)
        .map(|(_, _, to)| *to)
}

/// Whether an actor may take `action` on an occurrence currently in `current`.
///
/// - Resolution: the assigned tutor, or an admin.
/// - Escalation: the assigned tutor only, and never a vice-director or admin
///   (they would be escalating to themselves).
/// - VP resolution: vice-directors and admins, from either open state.
///
/// Admins skip the assignment check but never the state graph.
pub fn can_transition(
    role: Role,
    is_assigned_tutor: bool,
    current: OccurrenceStatus,
    action: ActionType,
) -> bool {
    if edge(current, action).is_none() {
        return false;
    }
    match action {
        ActionType::Resolution => is_assigned_tutor || role == Role::Admin,
        ActionType::Escalation => is_assigned_tutor && role == Role::Professor,
        ActionType::VpResolution => matches!(role, Role::ViceDirector | Role::Admin),
    }
}

/// Actions an actor could take right now, in table order.
pub fn available_actions(
    role: Role,
    is_assigned_tutor: bool,
    current: OccurrenceStatus,
) -> Vec<ActionType> {
    TRANSITIONS
        .iter()
        .filter(|(from, action, _)| {
            *from == current && can_transition(role, is_assigned_tutor, current, *action)
        })
        .map(|(_, action, _)| *action)
        .collect()
}

/// System text used when an occurrence is concluded without a written treatment.
pub fn direct_conclusion_text(role: Role) -> String {
    let who = match role {
        Role::ViceDirector => "Vice-Diretor(a)",
        Role::Admin => "Administrador(a)",
        Role::Professor => "Tutor(a)",
    };
    format!("Ocorrência averiguada e concluída diretamente por {who}.")
}
