//! Saída de terminal do EscolaFlow — spinner e texto colorido.
//!
//! Usa `indicatif` para o spinner enquanto a reescrita formal roda e `console`
//! para colorir status conforme a etapa da ocorrência.

use console::Style;
use indicatif::{ProgressBar, ProgressStyle};

use crate::lifecycle::{
    ActionType, AuthorStats, Occurrence, OccurrenceDetail, OccurrenceStatus, Role,
    TransitionOutcome,
};

/// Estilo associado a cada status: amarelo aguardando, vermelho encaminhado, verde concluído.
pub fn status_style(status: OccurrenceStatus) -> Style {
    match status {
        OccurrenceStatus::PendingTutor => Style::new().yellow(),
        OccurrenceStatus::EscalatedVp => Style::new().red().bold(),
        OccurrenceStatus::Concluded => Style::new().green(),
    }
}

pub fn status_badge(status: OccurrenceStatus) -> String {
    status_style(status).apply_to(status.label()).to_string()
}

/// Spinner exibido enquanto o colaborador de reescrita trabalha.
pub struct RewriteProgress {
    pb: ProgressBar,
}

impl RewriteProgress {
    pub fn start() -> Self {
        let pb = ProgressBar::new_spinner();
        // The template is a literal; a parse failure would leave the default style.
        if let Ok(style) = ProgressStyle::default_spinner().template("{spinner:.cyan} {msg}") {
            pb.set_style(style);
        }
        pb.set_message("Reescrevendo relato em registro formal...");
        pb.enable_steady_tick(std::time::Duration::from_millis(100));
        Self { pb }
    }

    pub fn finish(self, degraded: bool) {
        self.pb.finish_and_clear();
        if degraded {
            println!(
                "  {} Reescrita indisponível; usando o texto original",
                Style::new().yellow().apply_to("!")
            );
        }
    }
}

pub fn print_created(occurrence: &Occurrence) {
    println!(
        "  {} Ocorrência {} registrada ({})",
        Style::new().green().bold().apply_to("✓"),
        occurrence.id,
        status_badge(occurrence.status)
    );
}

pub fn print_transition(outcome: &TransitionOutcome) {
    println!(
        "  {} {} registrada: {}",
        Style::new().green().bold().apply_to("✓"),
        outcome.action.action_type.label(),
        status_badge(outcome.occurrence.status)
    );
}

/// `available` carries the viewer's role and what that viewer could do now.
pub fn print_detail(detail: &OccurrenceDetail, available: Option<(Role, &[ActionType])>) {
    let occ = &detail.occurrence;
    let dim = Style::new().dim();

    println!("{} {}", Style::new().bold().apply_to("Ocorrência"), occ.id);
    println!("  Status:    {}", status_badge(occ.status));
    println!("  Aluno:     {}", occ.student_id);
    println!("  Autor:     {}", occ.author_id);
    println!(
        "  Tutor:     {}",
        occ.tutor_id.map(|t| t.to_string()).unwrap_or_else(|| "-".into())
    );
    println!("  Registro:  {}", occ.created_at.format("%d/%m/%Y %H:%M"));
    println!();
    println!("{}", occ.description_formal);
    if occ.description_original != occ.description_formal {
        println!("{}", dim.apply_to(format!("Relato original: {}", occ.description_original)));
    }

    if !detail.actions.is_empty() {
        println!();
        println!("{}", Style::new().bold().apply_to("Tratativas"));
        for action in &detail.actions {
            println!(
                "  {} {} por {}",
                dim.apply_to(action.created_at.format("%d/%m/%Y %H:%M")),
                action.action_type.label(),
                action.author_id
            );
            println!("    {}", action.description);
        }
    }

    if let Some((role, actions)) = available {
        println!();
        if actions.is_empty() {
            println!(
                "{}",
                dim.apply_to(format!("Nenhuma tratativa disponível para {}.", role.label()))
            );
        } else {
            let names: Vec<&str> = actions.iter().map(|a| a.label()).collect();
            println!("Tratativas disponíveis para {}: {}", role.label(), names.join(", "));
        }
    }
}

pub fn print_list(occurrences: &[Occurrence]) {
    if occurrences.is_empty() {
        println!("Nenhuma ocorrência encontrada.");
        return;
    }
    let dim = Style::new().dim();
    for occ in occurrences {
        let line = format!("{}  {}", occ.id, occ.created_at.format("%d/%m/%Y"));
        // Concluded rows are dimmed.
        let line = if occ.status.is_terminal() {
            dim.apply_to(line).to_string()
        } else {
            line
        };
        println!("{line}  {}", status_badge(occ.status));
    }

    let totals: Vec<String> = OccurrenceStatus::ALL
        .iter()
        .map(|status| {
            let count = occurrences.iter().filter(|o| o.status == *status).count();
            format!("{}: {count}", status.label())
        })
        .collect();
    println!();
    println!("{}", dim.apply_to(totals.join(" | ")));
}

pub fn print_stats(stats: &[AuthorStats]) {
    if stats.is_empty() {
        println!("Nenhuma ocorrência registrada.");
        return;
    }
    for row in stats {
        println!(
            "- {}: {} ocorrências ({} aguardando, {} encaminhadas, {} concluídas)",
            row.author_name, row.total, row.pending, row.escalated, row.concluded
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn badge_contains_label() {
        console::set_colors_enabled(false);
        assert_eq!(status_badge(OccurrenceStatus::Concluded), "Concluída");
        assert_eq!(
            status_badge(OccurrenceStatus::EscalatedVp),
            "Encaminhado à Vice-Direção"
        );
    }
}
