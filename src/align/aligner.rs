use serde::Serialize;

use super::similarity::{normalize_text, sequence_ratio};
use crate::book::ParagraphRecord;
use crate::config::AlignmentPolicy;

/// Outcome for one corrupted paragraph
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AlignmentResult {
    pub page_number: u32,
    pub order: u32,
    pub content: String,
    pub similarity: f64,
}

/// Reportable signal raised while aligning; neither variant is an error
#[derive(Debug, Clone, PartialEq)]
pub enum AlignmentEvent {
    /// Accepted below the exact threshold: the reference text replaced a damaged paragraph
    Fixed { order: u32, page_number: u32, score: f64 },
    /// Nothing scored high enough; the original text was kept
    Unmatched { order: u32, page_number: u32, best_score: f64 },
}

#[derive(Debug, Clone, Default)]
pub struct AlignmentReport {
    pub results: Vec<AlignmentResult>,
    pub events: Vec<AlignmentEvent>,
}

impl AlignmentReport {
    pub fn processed(&self) -> usize {
        self.results.len()
    }

    pub fn fixed_count(&self) -> usize {
        self.events
            .iter()
            .filter(|e| matches!(e, AlignmentEvent::Fixed { .. }))
            .count()
    }

    pub fn unmatched_count(&self) -> usize {
        self.events
            .iter()
            .filter(|e| matches!(e, AlignmentEvent::Unmatched { .. }))
            .count()
    }

    /// Results accepted at or above the exact threshold
    pub fn exact_count(&self) -> usize {
        self.processed() - self.fixed_count() - self.unmatched_count()
    }

    /// Turn the results back into paragraph records of `chapter_id`
    pub fn into_paragraphs(self, chapter_id: &str) -> Vec<ParagraphRecord> {
        self.results
            .into_iter()
            .map(|r| ParagraphRecord::new(chapter_id, r.page_number, r.order, r.content))
            .collect()
    }
}

/// Greedy best-first aligner of corrupted paragraphs onto clean reference text.
///
/// Each corrupted paragraph, in input order, takes the most similar reference
/// paragraph not already used. Ties resolve to the lowest reference index.
#[derive(Debug, Clone, Default)]
pub struct ParagraphAligner {
    policy: AlignmentPolicy,
}

impl ParagraphAligner {
    pub fn new(policy: AlignmentPolicy) -> Self {
        Self { policy }
    }

    pub fn policy(&self) -> &AlignmentPolicy {
        &self.policy
    }

    pub fn align<S: AsRef<str>>(&self, corrupted: &[ParagraphRecord], reference: &[S]) -> AlignmentReport {
        let normalized_refs: Vec<String> = reference
            .iter()
            .map(|r| normalize_text(r.as_ref()))
            .collect();
        let mut used = vec![false; reference.len()];
        let mut report = AlignmentReport {
            results: Vec::with_capacity(corrupted.len()),
            events: Vec::new(),
        };

        for paragraph in corrupted {
            let normalized = normalize_text(&paragraph.content);
            let mut best: Option<(usize, f64)> = None;

            for (idx, candidate) in normalized_refs.iter().enumerate() {
                if used[idx] {
                    continue;
                }
                let score = sequence_ratio(normalized.as_bytes(), candidate.as_bytes());
                if score > best.map_or(0.0, |(_, s)| s) {
                    best = Some((idx, score));
                }
            }

            match best {
                Some((idx, score)) if score >= self.policy.accept_threshold => {
                    used[idx] = true;
                    if score < self.policy.exact_threshold {
                        report.events.push(AlignmentEvent::Fixed {
                            order: paragraph.order,
                            page_number: paragraph.page_number,
                            score,
                        });
                    }
                    report.results.push(AlignmentResult {
                        page_number: paragraph.page_number,
                        order: paragraph.order,
                        content: reference[idx].as_ref().to_string(),
                        similarity: score,
                    });
                }
                _ => {
                    report.events.push(AlignmentEvent::Unmatched {
                        order: paragraph.order,
                        page_number: paragraph.page_number,
                        best_score: best.map_or(0.0, |(_, s)| s),
                    });
                    report.results.push(AlignmentResult {
                        page_number: paragraph.page_number,
                        order: paragraph.order,
                        content: paragraph.content.clone(),
                        similarity: 0.0,
                    });
                }
            }
        }

        report
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn para(page: u32, order: u32, content: &str) -> ParagraphRecord {
        ParagraphRecord::new("chapter-1", page, order, content)
    }

    fn aligner() -> ParagraphAligner {
        ParagraphAligner::default()
    }

    #[test]
    fn test_prefix_paragraph_takes_reference_text() {
        let corrupted = vec![para(5, 2, "WAR FEVER ran high")];
        let reference = ["unrelated text", "WAR FEVER ran high in the little town"];

        let report = aligner().align(&corrupted, &reference);

        assert_eq!(report.results.len(), 1);
        let result = &report.results[0];
        assert_eq!(result.page_number, 5);
        assert_eq!(result.order, 2);
        assert_eq!(result.content, "WAR FEVER ran high in the little town");
        assert!(result.similarity >= aligner().policy().accept_threshold);
        assert_eq!(report.fixed_count(), 1);
    }

    #[test]
    fn test_gibberish_is_unmatched() {
        let corrupted = vec![para(3, 1, "xyz123 unmatched gibberish")];
        let reference = ["WAR FEVER ran high in the little town", "unrelated text"];

        let report = aligner().align(&corrupted, &reference);

        assert_eq!(report.results[0].content, "xyz123 unmatched gibberish");
        assert_eq!(report.results[0].similarity, 0.0);
        assert_eq!(report.unmatched_count(), 1);
    }

    #[test]
    fn test_one_result_per_input_in_order() {
        let corrupted = vec![
            para(1, 1, "We were having trouble with personal relationships"),
            para(1, 2, "completely unrelated words here"),
            para(2, 3, "Our liquor was but a symptom"),
        ];
        let reference = [
            "Our liquor was but a symptom.",
            "We were having trouble with personal relationships.",
        ];

        let report = aligner().align(&corrupted, &reference);

        let orders: Vec<u32> = report.results.iter().map(|r| r.order).collect();
        let pages: Vec<u32> = report.results.iter().map(|r| r.page_number).collect();
        assert_eq!(orders, vec![1, 2, 3]);
        assert_eq!(pages, vec![1, 1, 2]);
        assert_eq!(report.results[0].content, reference[1]);
        assert_eq!(report.results[2].content, reference[0]);
    }

    #[test]
    fn test_reference_used_at_most_once() {
        let corrupted = vec![
            para(1, 1, "the same sentence appears twice"),
            para(1, 2, "the same sentence appears twice"),
        ];
        let reference = ["The same sentence appears twice."];

        let report = aligner().align(&corrupted, &reference);

        let substituted = report
            .results
            .iter()
            .filter(|r| r.similarity > 0.0)
            .count();
        assert_eq!(substituted, 1);
        assert_eq!(report.unmatched_count(), 1);
        assert_eq!(report.results[1].similarity, 0.0);
    }

    #[test]
    fn test_identical_reference_wins_over_near_match() {
        let corrupted = vec![para(7, 4, "Rarely have we seen a person fail")];
        let reference = [
            "Rarely have we seen a person fall",
            "Rarely, have we seen a person fail!",
        ];

        let report = aligner().align(&corrupted, &reference);

        assert_eq!(report.results[0].content, reference[1]);
        assert_eq!(report.results[0].similarity, 1.0);
        assert!(report.events.is_empty());
    }

    #[test]
    fn test_ties_resolve_to_lowest_index() {
        let corrupted = vec![para(1, 1, "alpha beta gamma")];
        let reference = ["Alpha beta gamma.", "alpha, beta, gamma"];

        let report = aligner().align(&corrupted, &reference);

        assert_eq!(report.results[0].content, "Alpha beta gamma.");
    }

    #[test]
    fn test_empty_reference_keeps_everything() {
        let corrupted = vec![para(1, 1, "first"), para(2, 2, "second")];
        let reference: [&str; 0] = [];

        let report = aligner().align(&corrupted, &reference);

        assert_eq!(report.processed(), 2);
        for (result, original) in report.results.iter().zip(&corrupted) {
            assert_eq!(result.similarity, 0.0);
            assert_eq!(result.content, original.content);
        }
        assert_eq!(report.unmatched_count(), 2);
    }

    #[test]
    fn test_empty_corrupted_yields_empty_report() {
        let report = aligner().align(&[], &["something"]);
        assert!(report.results.is_empty());
        assert!(report.events.is_empty());
    }

    #[test]
    fn test_thresholds_come_from_policy() {
        let strict = ParagraphAligner::new(AlignmentPolicy {
            accept_threshold: 0.99,
            exact_threshold: 1.0,
        });
        let corrupted = vec![para(5, 2, "WAR FEVER ran high")];
        let report = strict.align(&corrupted, &["WAR FEVER ran high in the little town"]);
        assert_eq!(report.unmatched_count(), 1);
        match &report.events[0] {
            AlignmentEvent::Unmatched { best_score, .. } => assert!(*best_score > 0.6),
            other => panic!("unexpected event {:?}", other),
        }
    }

    #[test]
    fn test_configured_threshold_of_seventy_percent() {
        let policy: AlignmentPolicy = serde_json::from_str(r#"{ "accept_threshold": 0.7 }"#).unwrap();
        assert_eq!(policy.exact_threshold, 0.95);
        let aligner = ParagraphAligner::new(policy);

        let corrupted = vec![
            para(5, 1, "WAR FEVER ran high"),
            para(5, 2, "WAR FEVER ran high in the"),
        ];
        let report = aligner.align(&corrupted, &["WAR FEVER ran high in the little town"]);

        // 36/55 falls short of 0.70, 50/62 clears it
        assert_eq!(report.results[0].content, "WAR FEVER ran high");
        assert_eq!(report.results[0].similarity, 0.0);
        assert_eq!(report.results[1].content, "WAR FEVER ran high in the little town");
        assert!((report.results[1].similarity - 50.0 / 62.0).abs() < 1e-9);
        assert_eq!(report.unmatched_count(), 1);
        assert_eq!(report.fixed_count(), 1);
    }

    #[test]
    fn test_into_paragraphs_preserves_metadata() {
        let corrupted = vec![para(9, 3, "keep me")];
        let report = aligner().align(&corrupted, &["keep me"]);
        let records = report.into_paragraphs("chapter-2");
        assert_eq!(records[0].id, "chapter-2-p3");
        assert_eq!(records[0].page_number, 9);
    }
}
