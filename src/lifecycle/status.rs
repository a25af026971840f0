//! Tipos fechados para status de ocorrência, tipo de tratativa e papel de usuário.
//!
//! Os valores textuais gravados no banco são exatamente os de [`fmt::Display`];
//! [`FromStr`] é o único caminho de volta, então uma string desconhecida vinda
//! do armazenamento vira erro em vez de um status inventado.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// The three states an occurrence can be in.
///
/// Flow: PENDING_TUTOR → (ESCALATED_VP →) CONCLUDED
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum OccurrenceStatus {
    PendingTutor,
    EscalatedVp,
    Concluded,
}

impl OccurrenceStatus {
    pub const ALL: [OccurrenceStatus; 3] = [
        OccurrenceStatus::PendingTutor,
        OccurrenceStatus::EscalatedVp,
        OccurrenceStatus::Concluded,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            OccurrenceStatus::PendingTutor => "PENDING_TUTOR",
            OccurrenceStatus::EscalatedVp => "ESCALATED_VP",
            OccurrenceStatus::Concluded => "CONCLUDED",
        }
    }

    /// Rótulo exibido ao usuário.
    pub fn label(&self) -> &'static str {
        match self {
            OccurrenceStatus::PendingTutor => "Aguardando Tratativa",
            OccurrenceStatus::EscalatedVp => "Encaminhado à Vice-Direção",
            OccurrenceStatus::Concluded => "Concluída",
        }
    }

    pub fn is_terminal(&self) -> bool {
        matches!(self, OccurrenceStatus::Concluded)
    }
}

impl fmt::Display for OccurrenceStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for OccurrenceStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "PENDING_TUTOR" => Ok(OccurrenceStatus::PendingTutor),
            "ESCALATED_VP" => Ok(OccurrenceStatus::EscalatedVp),
            "CONCLUDED" => Ok(OccurrenceStatus::Concluded),
            other => Err(format!("unknown occurrence status '{other}'")),
        }
    }
}

/// Kind of treatment recorded in the action log.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ActionType {
    Resolution,
    Escalation,
    VpResolution,
}

impl ActionType {
    pub fn as_str(&self) -> &'static str {
        match self {
            ActionType::Resolution => "resolution",
            ActionType::Escalation => "escalation",
            ActionType::VpResolution => "vp_resolution",
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            ActionType::Resolution => "Resolução",
            ActionType::Escalation => "Escalonamento",
            ActionType::VpResolution => "Resolução Vice-Direção",
        }
    }
}

impl fmt::Display for ActionType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ActionType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "resolution" => Ok(ActionType::Resolution),
            "escalation" => Ok(ActionType::Escalation),
            "vp_resolution" => Ok(ActionType::VpResolution),
            other => Err(format!("unknown action type '{other}'")),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Role {
    Professor,
    ViceDirector,
    Admin,
}

impl Role {
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::Professor => "professor",
            Role::ViceDirector => "vice_director",
            Role::Admin => "admin",
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Role::Professor => "Professor(a)",
            Role::ViceDirector => "Vice-Diretor(a)",
            Role::Admin => "Administrador(a)",
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Role {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "professor" => Ok(Role::Professor),
            "vice_director" => Ok(Role::ViceDirector),
            "admin" => Ok(Role::Admin),
            other => Err(format!("unknown role '{other}'")),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn status_display_matches_stored_text() {
        assert_eq!(OccurrenceStatus::PendingTutor.to_string(), "PENDING_TUTOR");
        assert_eq!(OccurrenceStatus::EscalatedVp.to_string(), "ESCALATED_VP");
        assert_eq!(OccurrenceStatus::Concluded.to_string(), "CONCLUDED");
    }

    #[test]
    fn status_parse_rejects_unknown_text() {
        assert_eq!(
            "ESCALATED_VP".parse::<OccurrenceStatus>(),
            Ok(OccurrenceStatus::EscalatedVp)
        );
        assert!("pending_tutor".parse::<OccurrenceStatus>().is_err());
        assert!("ARCHIVED".parse::<OccurrenceStatus>().is_err());
    }

    #[test]
    fn only_concluded_is_terminal() {
        let terminal: Vec<_> = OccurrenceStatus::ALL
            .iter()
            .filter(|s| s.is_terminal())
            .collect();
        assert_eq!(terminal, vec![&OccurrenceStatus::Concluded]);
    }

    #[test]
    fn serde_uses_database_spelling() {
        assert_eq!(
            serde_json::to_string(&OccurrenceStatus::EscalatedVp).unwrap(),
            r#""ESCALATED_VP""#
        );
        assert_eq!(
            serde_json::to_string(&ActionType::VpResolution).unwrap(),
            r#""vp_resolution""#
        );
        assert_eq!(
            serde_json::to_string(&Role::ViceDirector).unwrap(),
            r#""vice_director""#
        );
    }

    #[test]
    fn action_type_and_role_parse() {
        assert_eq!("escalation".parse::<ActionType>(), Ok(ActionType::Escalation));
        assert!("ESCALATION".parse::<ActionType>().is_err());
        assert_eq!("admin".parse::<Role>(), Ok(Role::Admin));
        assert!("tutor".parse::<Role>().is_err());
    }

    #[test]
    fn labels_are_portuguese() {
        assert_eq!(OccurrenceStatus::PendingTutor.label(), "Aguardando Tratativa");
        assert_eq!(ActionType::Escalation.label(), "Escalonamento");
        assert_eq!(Role::ViceDirector.label(), "Vice-Diretor(a)");
    }
}
