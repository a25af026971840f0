use std::collections::HashMap;

use serde::Serialize;
use uuid::Uuid;

use super::record::Occurrence;
use super::status::OccurrenceStatus;

/// Per-author occurrence counts, broken down by status.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AuthorStats {
    pub author_id: Uuid,
    pub author_name: String,
    pub total: usize,
    pub pending: usize,
    pub escalated: usize,
    pub concluded: usize,
}

/// Groups occurrences by author, busiest authors first. Ties break on name.
pub fn summarize_by_author(
    occurrences: &[Occurrence],
    names: &HashMap<Uuid, String>,
) -> Vec<AuthorStats> {
    let mut map: HashMap<Uuid, AuthorStats> = HashMap::new();

    for occurrence in occurrences {
        let entry = map
            .entry(occurrence.author_id)
            .or_insert_with(|| AuthorStats {
                author_id: occurrence.author_id,
                author_name: names
                    .get(&occurrence.author_id)
                    .cloned()
                    .unwrap_or_else(|| occurrence.author_id.to_string()),
                total: 0,
                pending: 0,
                escalated: 0,
                concluded: 0,
            });

        entry.total += 1;
        match occurrence.status {
            OccurrenceStatus::PendingTutor => entry.pending += 1,
            OccurrenceStatus::EscalatedVp => entry.escalated += 1,
            OccurrenceStatus::Concluded => entry.concluded += 1,
        }
    }

    let mut stats: Vec<AuthorStats> = map.into_values().collect();
    stats.sort_by(|a, b| {
        b.total
            .cmp(&a.total)
            .then_with(|| a.author_name.cmp(&b.author_name))
    });
    stats
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::lifecycle::record::NewOccurrence;

    fn occurrence(author_id: Uuid, status: OccurrenceStatus) -> Occurrence {
        let mut occ = Occurrence::new(
            author_id,
            NewOccurrence {
                student_id: Uuid::new_v4(),
                tutor_id: None,
                description_original: "texto".into(),
                description_formal: "Texto.".into(),
            },
        );
        occ.status = status;
        occ
    }

    #[test]
    fn counts_by_status_per_author() {
        let ana = Uuid::new_v4();
        let bruno = Uuid::new_v4();
        let names = HashMap::from([(ana, "Ana".to_string()), (bruno, "Bruno".to_string())]);
        let occurrences = vec![
            occurrence(ana, OccurrenceStatus::PendingTutor),
            occurrence(ana, OccurrenceStatus::EscalatedVp),
            occurrence(ana, OccurrenceStatus::Concluded),
            occurrence(bruno, OccurrenceStatus::Concluded),
        ];

        let stats = summarize_by_author(&occurrences, &names);
        assert_eq!(stats.len(), 2);
        assert_eq!(stats[0].author_name, "Ana");
        assert_eq!(
            (stats[0].total, stats[0].pending, stats[0].escalated, stats[0].concluded),
            (3, 1, 1, 1)
        );
        assert_eq!(stats[1].author_name, "Bruno");
        assert_eq!(stats[1].concluded, 1);
    }

    #[test]
    fn unknown_author_falls_back_to_id() {
        let author = Uuid::new_v4();
        let stats = summarize_by_author(
            &[occurrence(author, OccurrenceStatus::PendingTutor)],
            &HashMap::new(),
        );
        assert_eq!(stats[0].author_name, author.to_string());
    }

    #[test]
    fn empty_input_gives_no_rows() {
        assert!(summarize_by_author(&[], &HashMap::new()).is_empty());
    }
}
