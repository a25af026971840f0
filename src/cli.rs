//! Interface de linha de comando do EscolaFlow baseada em clap.
//!
//! Define a struct [`Cli`] com subcomandos [`Command`] para administrar o
//! cadastro, registrar ocorrências e conduzir tratativas, e flags globais
//! (--config, --verbose).

use std::path::PathBuf;

use clap::{Parser, Subcommand, ValueEnum};
use uuid::Uuid;

use crate::lifecycle::{ActionType, OccurrenceStatus, Role, RosterEntity};

/// EscolaFlow — registro e tratativa de ocorrências escolares.
#[derive(Debug, Parser)]
#[command(name = "escolaflow", version, about)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,

    /// Caminho do arquivo de configuração (padrão: ./escolaflow.toml).
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    /// Habilita saída detalhada (verbose).
    #[arg(long, short, global = true, default_value_t = false)]
    pub verbose: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum RoleArg {
    Professor,
    ViceDirector,
    Admin,
}

impl From<RoleArg> for Role {
    fn from(arg: RoleArg) -> Self {
        match arg {
            RoleArg::Professor => Role::Professor,
            RoleArg::ViceDirector => Role::ViceDirector,
            RoleArg::Admin => Role::Admin,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum StatusArg {
    PendingTutor,
    EscalatedVp,
    Concluded,
}

impl From<StatusArg> for OccurrenceStatus {
    fn from(arg: StatusArg) -> Self {
        match arg {
            StatusArg::PendingTutor => OccurrenceStatus::PendingTutor,
            StatusArg::EscalatedVp => OccurrenceStatus::EscalatedVp,
            StatusArg::Concluded => OccurrenceStatus::Concluded,
        }
    }
}

/// Cadastro alvo de `activate`/`deactivate`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum RosterArg {
    Profile,
    Class,
    Student,
}

impl From<RosterArg> for RosterEntity {
    fn from(arg: RosterArg) -> Self {
        match arg {
            RosterArg::Profile => RosterEntity::Profile,
            RosterArg::Class => RosterEntity::Class,
            RosterArg::Student => RosterEntity::Student,
        }
    }
}

/// Tratativa pedida na linha de comando.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum ActionArg {
    /// Conclui como tutor (ou administrador).
    Resolve,
    /// Encaminha à Vice-Direção.
    Escalate,
    /// Conclui como Vice-Direção.
    VpResolve,
}

impl From<ActionArg> for ActionType {
    fn from(arg: ActionArg) -> Self {
        match arg {
            ActionArg::Resolve => ActionType::Resolution,
            ActionArg::Escalate => ActionType::Escalation,
            ActionArg::VpResolve => ActionType::VpResolution,
        }
    }
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Cria ou atualiza o esquema do banco.
    InitDb,

    /// Carrega um cadastro de demonstração.
    Seed,

    /// Cadastra um perfil de usuário.
    AddProfile {
        #[arg(long)]
        name: String,
        #[arg(long, value_enum)]
        role: RoleArg,
        #[arg(long)]
        whatsapp: Option<String>,
        #[arg(long)]
        email: Option<String>,
    },

    /// Cadastra uma turma.
    AddClass {
        #[arg(long)]
        name: String,
        #[arg(long)]
        year: i32,
    },

    /// Cadastra um aluno.
    AddStudent {
        #[arg(long)]
        name: String,
        #[arg(long)]
        class_id: Uuid,
        #[arg(long)]
        tutor_id: Option<Uuid>,
        /// Número de matrícula.
        #[arg(long)]
        registration: Option<String>,
        #[arg(long)]
        guardian_phone: Option<String>,
    },

    /// Atribui ou remove o tutor de um aluno (apenas administradores).
    AssignTutor {
        #[arg(long = "as")]
        actor: Uuid,
        #[arg(long)]
        student: Uuid,
        #[arg(long, required_unless_present = "clear")]
        tutor: Option<Uuid>,
        /// Remove o tutor atual.
        #[arg(long, default_value_t = false, conflicts_with = "tutor")]
        clear: bool,
    },

    /// Desativa um perfil, turma ou aluno sem apagar o histórico.
    Deactivate {
        #[arg(long = "as")]
        actor: Uuid,
        #[arg(value_enum)]
        entity: RosterArg,
        id: Uuid,
    },

    /// Reativa um perfil, turma ou aluno.
    Activate {
        #[arg(long = "as")]
        actor: Uuid,
        #[arg(value_enum)]
        entity: RosterArg,
        id: Uuid,
    },

    /// Registra uma nova ocorrência.
    Create {
        /// Perfil de quem registra.
        #[arg(long = "as")]
        actor: Uuid,
        #[arg(long)]
        student: Uuid,
        /// Relato livre do ocorrido.
        #[arg(long)]
        text: String,
        /// Não reescreve o relato; usa o texto original como versão formal.
        #[arg(long, default_value_t = false)]
        no_rewrite: bool,
    },

    /// Registra uma tratativa e avança o status da ocorrência.
    Act {
        #[arg(long = "as")]
        actor: Uuid,
        #[arg(long)]
        occurrence: Uuid,
        #[arg(long, value_enum)]
        action: ActionArg,
        /// Texto da tratativa. Obrigatório, exceto com --direct.
        #[arg(long, required_unless_present = "direct")]
        description: Option<String>,
        /// Conclui diretamente com o texto padrão do sistema.
        #[arg(long, default_value_t = false, conflicts_with = "description")]
        direct: bool,
        /// Reescreve a descrição em registro formal antes de gravar.
        #[arg(long, default_value_t = false)]
        rewrite: bool,
    },

    /// Exclui uma ocorrência (apenas administradores).
    Delete {
        #[arg(long = "as")]
        actor: Uuid,
        #[arg(long)]
        occurrence: Uuid,
    },

    /// Mostra uma ocorrência com o histórico de tratativas.
    Show {
        occurrence: Uuid,
        /// Lista também as tratativas disponíveis para este perfil.
        #[arg(long = "as")]
        actor: Option<Uuid>,
    },

    /// Lista ocorrências, mais recentes primeiro.
    List {
        #[arg(long, value_enum)]
        status: Option<StatusArg>,
        #[arg(long)]
        student: Option<Uuid>,
    },

    /// Mostra contagens por autor.
    Stats,

    /// Reescreve um texto em registro formal, sem gravar nada.
    Rewrite {
        text: String,
    },
}
