//! Composição das mensagens de WhatsApp para cada evento do ciclo de vida.
//!
//! Tudo aqui é puro: dado o evento e os destinatários já resolvidos, decide
//! quem recebe o quê. O envio fica em [`EvolutionClient`](super::EvolutionClient).

use crate::lifecycle::OccurrenceStatus;

use super::event::{NotificationEvent, Recipients};

const MISSING_RESOLUTION: &str = "Resolução não fornecida.";

/// One message ready to send.
#[derive(Debug, Clone, PartialEq)]
pub struct OutgoingMessage {
    /// Who this is for, e.g. `tutor` or `vp_<id>`. Used in delivery reports.
    pub recipient: String,
    pub phone: String,
    pub text: String,
}

/// Normaliza um número para o formato da Evolution API: apenas dígitos,
/// com o código do país 55 na frente.
pub fn format_phone(phone: &str) -> String {
    let digits: String = phone.chars().filter(|c| c.is_ascii_digit()).collect();
    if digits.starts_with("55") {
        digits
    } else {
        format!("55{digits}")
    }
}

pub fn compose(
    event: &NotificationEvent,
    recipients: &Recipients,
    school_name: &str,
) -> Vec<OutgoingMessage> {
    let student = if recipients.student_name.is_empty() {
        "Aluno"
    } else {
        recipients.student_name.as_str()
    };
    let author_name = recipients
        .author_name
        .as_deref()
        .or(recipients.author.as_ref().map(|a| a.full_name.as_str()))
        .unwrap_or("Professor");
    let mut out = Vec::new();

    match event {
        NotificationEvent::OccurrenceCreated { .. } => {
            if let Some(tutor) = &recipients.tutor {
                out.push(OutgoingMessage {
                    recipient: "tutor".into(),
                    phone: tutor.whatsapp_number.clone(),
                    text: format!(
                        "🔔 *Nova Ocorrência Escolar*\n\n\
                         Olá, {}!\n\n\
                         O(a) Prof(a). {author_name} registrou uma nova ocorrência para o seu \
                         aluno tutorado *{student}*.\n\n\
                         Acesse o EscolaFlow para ver os detalhes e tomar as providências necessárias.",
                        tutor.full_name
                    ),
                });
            }
        }
        NotificationEvent::StatusChanged {
            old_status,
            new_status,
            resolution_text,
            ..
        } => {
            let resolution = resolution_text
                .as_deref()
                .map(str::trim)
                .filter(|t| !t.is_empty())
                .unwrap_or(MISSING_RESOLUTION);

            match new_status {
                OccurrenceStatus::EscalatedVp => {
                    if let Some(author) = &recipients.author {
                        out.push(OutgoingMessage {
                            recipient: "author_escalated".into(),
                            phone: author.whatsapp_number.clone(),
                            text: format!(
                                "🔄 *Ocorrência Escalonada*\n\n\
                                 Sua ocorrência referente ao aluno *{student}* foi escalonada \
                                 para a Vice-Direção.\n\n\
                                 Você será notificado assim que houver uma resolução."
                            ),
                        });
                    }
                    for vp in &recipients.vice_directors {
                        out.push(OutgoingMessage {
                            recipient: format!("vp_{}", vp.profile_id),
                            phone: vp.whatsapp_number.clone(),
                            text: format!(
                                "🏢 *Ocorrência Encaminhada*\n\n\
                                 Olá, {}!\n\n\
                                 Uma ocorrência do(a) aluno(a) *{student}* (registrada por \
                                 {author_name}) foi encaminhada para sua análise.\n\
                                 Acesse o EscolaFlow.",
                                vp.full_name
                            ),
                        });
                    }
                }
                OccurrenceStatus::Concluded => {
                    if *old_status == OccurrenceStatus::EscalatedVp {
                        let text = format!(
                            "✅ *Ocorrência Concluída (Vice-Direção)*\n\n\
                             A ocorrência do aluno *{student}* foi resolvida pela Vice-Direção.\n\n\
                             *Resumo da Resolução:*\n{resolution}"
                        );
                        if let Some(author) = &recipients.author {
                            out.push(OutgoingMessage {
                                recipient: "author_concluded_vp".into(),
                                phone: author.whatsapp_number.clone(),
                                text: text.clone(),
                            });
                        }
                        if let Some(tutor) = &recipients.tutor {
                            out.push(OutgoingMessage {
                                recipient: "tutor_concluded_vp".into(),
                                phone: tutor.whatsapp_number.clone(),
                                text,
                            });
                        }
                    } else if let Some(author) = &recipients.author {
                        out.push(OutgoingMessage {
                            recipient: "author_concluded_tutor".into(),
                            phone: author.whatsapp_number.clone(),
                            text: format!(
                                "✅ *Ocorrência Concluída (Tutor)*\n\n\
                                 A ocorrência do aluno *{student}* que você registrou foi \
                                 resolvida pelo tutor responsável.\n\n\
                                 *Resumo da Resolução:*\n{resolution}"
                            ),
                        });
                    }

                    if let Some(guardian) = recipients
                        .guardian_phone
                        .as_deref()
                        .filter(|p| !p.trim().is_empty())
                    {
                        out.push(OutgoingMessage {
                            recipient: "guardian_concluded".into(),
                            phone: guardian.to_string(),
                            text: format!(
                                "🏫 *{school_name}*\n\n\
                                 Prezado(a) responsável,\n\
                                 Informamos que uma ocorrência escolar envolvendo o aluno \
                                 *{student}* foi acompanhada e concluída.\n\n\
                                 Para mais esclarecimentos, entre em contato com a equipe \
                                 pedagógica.\nObrigado pela parceria."
                            ),
                        });
                    }
                }
                OccurrenceStatus::PendingTutor => {}
            }
        }
    }

    out
}
