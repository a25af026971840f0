mod cli;
mod config;
mod error;
mod gemini;
mod lifecycle;
mod notify;
mod store;
mod ui;

use anyhow::Context;
use chrono::Datelike;
use clap::Parser;
use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use cli::{Cli, Command};
use config::{EscolaFlowConfig, EvolutionConfig, GeminiConfig};
use error::EscolaFlowError;
use gemini::{GeminiClient, Rewrite, TextRewriter};
use lifecycle::{
    LifecycleEngine, NewOccurrence, OccurrenceFilter, Profile, Role, SchoolClass, Student,
    direct_conclusion_text,
};
use notify::EvolutionClient;
use store::SqliteStore;

type Engine = LifecycleEngine<SqliteStore, EvolutionClient>;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let default_filter = if cli.verbose {
        "escolaflow=debug"
    } else {
        "escolaflow=info"
    };
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| default_filter.into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let config = EscolaFlowConfig::load(cli.config.as_deref()).context("loading configuration")?;

    let store = SqliteStore::connect(&config.database_url)
        .await
        .with_context(|| format!("opening database {}", config.database_url))?;
    store.migrate().await.context("applying migrations")?;

    let engine = LifecycleEngine::new(store, build_notifier(&config.evolution));
    let rewriter = build_rewriter(&config.gemini);

    match run(cli.command, &engine, rewriter.as_ref(), &config).await {
        Ok(()) => Ok(()),
        Err(e) => match e.downcast_ref::<EscolaFlowError>() {
            Some(domain) if domain.is_terminal() => {
                eprintln!(
                    "{} {domain}",
                    console::Style::new().red().bold().apply_to("erro:")
                );
                std::process::exit(2);
            }
            _ => Err(e),
        },
    }
}

fn build_notifier(config: &EvolutionConfig) -> Option<EvolutionClient> {
    if !config.is_configured() {
        warn!("Evolution API not configured, WhatsApp notifications disabled");
        return None;
    }
    match EvolutionClient::new(
        config.api_url.clone(),
        config.api_key.clone(),
        config.instance_name.clone(),
        config.school_name.clone(),
    ) {
        Ok(client) => Some(client),
        Err(e) => {
            warn!(error = %e, "could not build WhatsApp client, notifications disabled");
            None
        }
    }
}

fn build_rewriter(config: &GeminiConfig) -> Option<GeminiClient> {
    if !config.is_configured() {
        return None;
    }
    match GeminiClient::new(config.api_key.clone(), config.model.clone()) {
        Ok(client) => Some(client.with_generation(config.temperature, config.max_output_tokens)),
        Err(e) => {
            warn!(error = %e, "could not build rewrite client, using original text");
            None
        }
    }
}

/// Reescreve `text` quando há colaborador configurado. Qualquer falha devolve
/// o texto original como versão formal.
async fn formalize<R: TextRewriter>(rewriter: Option<&R>, text: &str) -> Rewrite {
    let original = text.trim();
    let Some(rewriter) = rewriter.filter(|_| !original.is_empty()) else {
        return Rewrite {
            original: original.to_string(),
            formal: original.to_string(),
            rewrite_error: None,
        };
    };

    let progress = ui::RewriteProgress::start();
    let rewrite = match rewriter.rewrite(original).await {
        Ok(rewrite) => rewrite,
        Err(e) => {
            warn!(error = %e, "formal rewrite unavailable, keeping original text");
            Rewrite::degraded(original, e.to_string())
        }
    };
    progress.finish(rewrite.is_degraded());
    rewrite
}

async fn run(
    command: Command,
    engine: &Engine,
    rewriter: Option<&GeminiClient>,
    config: &EscolaFlowConfig,
) -> anyhow::Result<()> {
    match command {
        Command::InitDb => {
            println!("Banco pronto em {}", config.database_url);
        }
        Command::Seed => seed(engine).await?,
        Command::AddProfile {
            name,
            role,
            whatsapp,
            email,
        } => {
            let mut profile = Profile::new(name, Role::from(role));
            if let Some(number) = whatsapp {
                profile = profile.with_whatsapp(number);
            }
            profile.email = email;
            engine.store().insert_profile(&profile).await?;
            info!(profile_id = %profile.id, role = %profile.role, "profile added");
            println!("{}", profile.id);
        }
        Command::AddClass { name, year } => {
            let class = SchoolClass::new(name, year);
            engine.store().insert_class(&class).await?;
            println!("{}", class.id);
        }
        Command::AddStudent {
            name,
            class_id,
            tutor_id,
            registration,
            guardian_phone,
        } => {
            let mut student = Student::new(name, class_id, tutor_id);
            student.registration = registration;
            student.guardian_phone = guardian_phone;
            engine.store().insert_student(&student).await?;
            println!("{}", student.id);
        }
        Command::AssignTutor {
            actor,
            student,
            tutor,
            clear,
        } => {
            let actor = engine.resolve_actor(actor).await?;
            let tutor = tutor.filter(|_| !clear);
            let student = engine.assign_tutor(&actor, student, tutor).await?;
            match student.tutor_id {
                Some(tutor) => println!("Tutor {tutor} atribuído a {}", student.name),
                None => println!("{} está sem tutor", student.name),
            }
        }
        Command::Deactivate { actor, entity, id } => {
            let actor = engine.resolve_actor(actor).await?;
            engine.set_active(&actor, entity.into(), id, false).await?;
            println!("{id} desativado");
        }
        Command::Activate { actor, entity, id } => {
            let actor = engine.resolve_actor(actor).await?;
            engine.set_active(&actor, entity.into(), id, true).await?;
            println!("{id} reativado");
        }
        Command::Create {
            actor,
            student,
            text,
            no_rewrite,
        } => {
            let actor = engine.resolve_actor(actor).await?;
            let rewrite = formalize(rewriter.filter(|_| !no_rewrite), &text).await;
            let occurrence = engine
                .create_occurrence(
                    &actor,
                    NewOccurrence {
                        student_id: student,
                        tutor_id: None,
                        description_original: rewrite.original,
                        description_formal: rewrite.formal,
                    },
                )
                .await?;
            ui::print_created(&occurrence);
        }
        Command::Act {
            actor,
            occurrence,
            action,
            description,
            direct,
            rewrite,
        } => {
            let actor = engine.resolve_actor(actor).await?;
            let description = if direct {
                direct_conclusion_text(actor.role)
            } else {
                let text = description.unwrap_or_default();
                if rewrite {
                    formalize(rewriter, &text).await.formal
                } else {
                    text
                }
            };
            let outcome = engine
                .submit_action(&actor, occurrence, action.into(), &description)
                .await?;
            ui::print_transition(&outcome);
        }
        Command::Delete { actor, occurrence } => {
            let actor = engine.resolve_actor(actor).await?;
            engine.delete_occurrence(&actor, occurrence).await?;
            println!("Ocorrência {occurrence} excluída");
        }
        Command::Show { occurrence, actor } => {
            let detail = engine.occurrence_detail(occurrence).await?;
            let available = match actor {
                Some(id) => {
                    let actor = engine.resolve_actor(id).await?;
                    Some((actor.role, engine.available_actions(&actor, &detail.occurrence)))
                }
                None => None,
            };
            ui::print_detail(
                &detail,
                available.as_ref().map(|(role, actions)| (*role, actions.as_slice())),
            );
        }
        Command::List { status, student } => {
            let filter = OccurrenceFilter {
                status: status.map(Into::into),
                student_id: student,
            };
            ui::print_list(&engine.list_occurrences(&filter).await?);
        }
        Command::Stats => {
            ui::print_stats(&engine.author_stats().await?);
        }
        Command::Rewrite { text } => {
            if rewriter.is_none() {
                return Err(EscolaFlowError::CollaboratorUnavailable(
                    "GEMINI_API_KEY is not configured".into(),
                )
                .into());
            }
            let rewrite = formalize(rewriter, &text).await;
            println!("{}", rewrite.formal);
        }
    }
    Ok(())
}

/// Cadastro mínimo para experimentar o fluxo completo.
async fn seed(engine: &Engine) -> anyhow::Result<()> {
    let store = engine.store();

    let admin = Profile::new("Administração", Role::Admin);
    let vice_director = Profile::new("Vice-Direção", Role::ViceDirector);
    let professor = Profile::new("Professor(a) Regente", Role::Professor);
    let tutor = Profile::new("Tutor(a) da Turma", Role::Professor);
    for profile in [&admin, &vice_director, &professor, &tutor] {
        store.insert_profile(profile).await?;
    }

    let class = SchoolClass::new("9º A", chrono::Utc::now().year());
    store.insert_class(&class).await?;
    let student = Student::new("Aluno de Demonstração", class.id, Some(tutor.id));
    store.insert_student(&student).await?;

    info!(class_id = %class.id, student_id = %student.id, "demo data seeded");
    for (label, id) in [
        ("admin", admin.id),
        ("vice_director", vice_director.id),
        ("professor", professor.id),
        ("tutor", tutor.id),
        ("class", class.id),
        ("student", student.id),
    ] {
        println!("{label:<14} {id}");
    }
    Ok(())
}
