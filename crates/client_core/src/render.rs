//! Plain-text rendering of results, uploaded CVs and job history.

use std::cmp::Ordering;

use shared::domain::{CvDescriptor, EvaluationResult, JobHistoryEntry, JobId};

pub const NO_RESULTS: &str = "No results found.";
pub const NO_JOBS: &str = "No previous jobs";
pub const EVALUATION_ERROR_TITLE: &str = "⚠️ Evaluation Error";
pub const EVALUATION_ERROR_BODY: &str =
    "There was an error evaluating this candidate. Please try again.";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScoreBand {
    High,
    Medium,
    Low,
}

impl ScoreBand {
    pub fn for_score(score: Option<f64>) -> Self {
        match score {
            Some(value) if value >= 7.0 => Self::High,
            Some(value) if value >= 5.0 => Self::Medium,
            _ => Self::Low,
        }
    }

    fn marker(self) -> &'static str {
        match self {
            Self::High => "+",
            Self::Medium => "~",
            Self::Low => "-",
        }
    }
}

pub fn score_label(score: Option<f64>) -> String {
    match score {
        Some(value) => value.to_string(),
        None => "N/A".to_string(),
    }
}

/// Highest overall score first. Results without a score rank as 0; ties keep
/// server order.
pub fn sort_results(results: &mut [EvaluationResult]) {
    results.sort_by(|a, b| {
        let a = a.overall_score.unwrap_or(0.0);
        let b = b.overall_score.unwrap_or(0.0);
        b.partial_cmp(&a).unwrap_or(Ordering::Equal)
    });
}

pub fn display_name(filename: &str) -> String {
    filename.replacen(".pdf", "", 1)
}

fn badge(label: &str, score: Option<f64>) -> String {
    format!(
        "[{} {label}: {}]",
        ScoreBand::for_score(score).marker(),
        score_label(score)
    )
}

fn section(out: &mut String, title: &str, body: Option<&str>, fallback: &str) {
    out.push_str("    ");
    out.push_str(title);
    out.push('\n');
    out.push_str("      ");
    out.push_str(body.filter(|text| !text.is_empty()).unwrap_or(fallback));
    out.push('\n');
}

pub fn render_result_card(rank: usize, result: &EvaluationResult) -> String {
    let mut out = format!("{rank}. {}", display_name(&result.filename));
    if result.has_error {
        out.push_str(" ⚠️");
    }
    out.push('\n');
    out.push_str(&format!(
        "    {} {} {}\n",
        badge("Overall", result.overall_score),
        badge("Skills", result.skill_score),
        badge("Culture", result.cultural_score),
    ));

    if result.has_error {
        section(&mut out, EVALUATION_ERROR_TITLE, Some(EVALUATION_ERROR_BODY), "");
        return out;
    }

    section(
        &mut out,
        "💼 Skills Assessment",
        result.skill_assessment.as_deref(),
        "No assessment available",
    );
    section(
        &mut out,
        "🤝 Cultural Fit Assessment",
        result.cultural_assessment.as_deref(),
        "No assessment available",
    );
    section(
        &mut out,
        "📋 Summary",
        result.summary.as_deref(),
        "No summary available",
    );
    section(
        &mut out,
        "💡 Recommendation",
        result.recommendation.as_deref(),
        "No recommendation available",
    );
    out
}

/// Renders results in the order given; callers sort with [`sort_results`].
pub fn render_results(results: &[EvaluationResult]) -> String {
    if results.is_empty() {
        return format!("{NO_RESULTS}\n");
    }
    results
        .iter()
        .enumerate()
        .map(|(index, result)| render_result_card(index + 1, result))
        .collect::<Vec<_>>()
        .join("\n")
}

pub fn render_cv_list(cvs: &[CvDescriptor]) -> String {
    cvs.iter()
        .map(|cv| format!("  - {}\n", cv.filename))
        .collect()
}

pub fn render_job_history(jobs: &[JobHistoryEntry], active_job: Option<&JobId>) -> String {
    if jobs.is_empty() {
        return format!("{NO_JOBS}\n");
    }
    jobs.iter()
        .map(|job| {
            let marker = if active_job == Some(&job.id) { '*' } else { ' ' };
            format!(
                "{marker} {} ({})\n    {} CVs • {} evaluated\n",
                display_name(&job.filename),
                job.id,
                job.cv_count,
                job.evaluated_count
            )
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn result(filename: &str, overall_score: Option<f64>) -> EvaluationResult {
        EvaluationResult {
            cv_id: None,
            filename: filename.to_string(),
            overall_score,
            skill_score: None,
            cultural_score: None,
            skill_assessment: None,
            cultural_assessment: None,
            summary: None,
            recommendation: None,
            has_error: false,
            evaluated_at: None,
        }
    }

    #[test]
    fn missing_overall_score_sorts_last_but_displays_na() {
        let mut results = vec![result("b.pdf", None), result("a.pdf", Some(8.0))];
        sort_results(&mut results);

        let order: Vec<_> = results.iter().map(|r| r.filename.as_str()).collect();
        assert_eq!(order, ["a.pdf", "b.pdf"]);

        let rendered = render_results(&results);
        let b_card = rendered.split("2. b").nth(1).expect("b card");
        assert!(b_card.contains("Overall: N/A"), "{rendered}");
        assert!(rendered.contains("Overall: 8]"), "{rendered}");
    }

    #[test]
    fn sort_is_descending_and_stable_for_ties() {
        let mut results = vec![
            result("low.pdf", Some(3.5)),
            result("tie-first.pdf", Some(7.0)),
            result("top.pdf", Some(9.2)),
            result("tie-second.pdf", Some(7.0)),
            result("zero.pdf", Some(0.0)),
            result("missing.pdf", None),
        ];
        sort_results(&mut results);

        let order: Vec<_> = results.iter().map(|r| r.filename.as_str()).collect();
        assert_eq!(
            order,
            [
                "top.pdf",
                "tie-first.pdf",
                "tie-second.pdf",
                "low.pdf",
                "zero.pdf",
                "missing.pdf"
            ]
        );
    }

    #[test]
    fn flagged_result_never_renders_assessment_text() {
        let mut flagged = result("c.pdf", Some(6.0));
        flagged.has_error = true;
        flagged.skill_assessment = Some("strong rust background".into());
        flagged.cultural_assessment = Some("collaborative".into());
        flagged.summary = Some("solid".into());

        let card = render_result_card(1, &flagged);
        assert!(card.starts_with("1. c ⚠️"));
        assert!(card.contains(EVALUATION_ERROR_TITLE));
        assert!(card.contains(EVALUATION_ERROR_BODY));
        assert!(!card.contains("strong rust background"));
        assert!(!card.contains("collaborative"));
        assert!(!card.contains("Skills Assessment"));
    }

    #[test]
    fn unflagged_result_uses_fallback_texts() {
        let mut plain = result("d.pdf", Some(5.5));
        plain.skill_assessment = Some("knows tokio".into());

        let card = render_result_card(1, &plain);
        assert!(card.contains("knows tokio"));
        assert!(card.contains("No assessment available"));
        assert!(card.contains("No summary available"));
        assert!(card.contains("No recommendation available"));
        assert!(!card.contains(EVALUATION_ERROR_TITLE));
    }

    #[test]
    fn score_labels_and_bands() {
        assert_eq!(score_label(None), "N/A");
        assert_eq!(score_label(Some(8.0)), "8");
        assert_eq!(score_label(Some(7.5)), "7.5");
        assert_eq!(score_label(Some(0.0)), "0");

        assert_eq!(ScoreBand::for_score(None), ScoreBand::Low);
        assert_eq!(ScoreBand::for_score(Some(7.0)), ScoreBand::High);
        assert_eq!(ScoreBand::for_score(Some(5.0)), ScoreBand::Medium);
        assert_eq!(ScoreBand::for_score(Some(4.9)), ScoreBand::Low);
    }

    #[test]
    fn empty_lists_render_placeholders() {
        assert_eq!(render_results(&[]), "No results found.\n");
        assert_eq!(render_job_history(&[], None), "No previous jobs\n");
    }

    #[test]
    fn job_history_marks_active_job() {
        let jobs = vec![
            JobHistoryEntry {
                id: JobId::from("J2"),
                filename: "backend.pdf".into(),
                created_at: None,
                cv_count: 3,
                evaluated_count: 1,
            },
            JobHistoryEntry {
                id: JobId::from("J1"),
                filename: "frontend.pdf".into(),
                created_at: None,
                cv_count: 0,
                evaluated_count: 0,
            },
        ];

        let rendered = render_job_history(&jobs, Some(&JobId::from("J1")));
        assert!(rendered.contains("  backend (J2)\n    3 CVs • 1 evaluated"));
        assert!(rendered.contains("* frontend (J1)\n    0 CVs • 0 evaluated"));
    }

    #[test]
    fn display_name_strips_first_pdf_suffix_only() {
        assert_eq!(display_name("jane.pdf"), "jane");
        assert_eq!(display_name("a.pdf.pdf"), "a.pdf");
        assert_eq!(display_name("notes.txt"), "notes.txt");
    }
}
