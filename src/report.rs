use crate::model::{Plan, Provenance};
use crate::timetable::TimetableStore;
use std::fmt::Write;

const NOT_STATED: &str = "not stated";
const FOOTER: &str = "Generated by ganti, substitute teacher planner";

/// Permet de customiser le rendu du plan (texte, message, etc.).
pub trait ReportRenderer {
    fn render(&self, plan: &Plan, store: &TimetableStore) -> String;
}

/// Rendu texte simple, une ligne par période à couvrir.
#[derive(Debug, Default, Clone, Copy)]
pub struct TextReport;

impl ReportRenderer for TextReport {
    fn render(&self, plan: &Plan, store: &TimetableStore) -> String {
        let mut out = String::new();
        let _ = writeln!(out, "Substitution plan for {}", plan.day);
        match plan.date {
            Some(date) => {
                let _ = writeln!(out, "Date: {} ({})", date.format("%-d %B %Y"), plan.day);
            }
            None => {
                let _ = writeln!(out, "Date: {NOT_STATED}");
            }
        }
        let _ = writeln!(
            out,
            "Prepared by: {}",
            plan.prepared_by.as_deref().unwrap_or(NOT_STATED)
        );
        let _ = writeln!(out, "Absent:");
        for a in &plan.absent {
            let name = store
                .find_teacher(&a.teacher_id)
                .map(|t| t.name.as_str())
                .unwrap_or(a.teacher_id.as_str());
            let reason = if a.reason.trim().is_empty() {
                NOT_STATED
            } else {
                a.reason.trim()
            };
            let _ = writeln!(out, "  - {name} ({}): {reason}", a.teacher_id);
        }
        let _ = writeln!(out);

        for (idx, a) in plan.assignments.iter().enumerate() {
            let substitute = match a.substitute.teacher_id() {
                Some(id) => format!("{} ({id})", a.substitute.name()),
                None if a.substitute.name().is_empty() => "[to be filled in]".to_string(),
                None => format!("{} [manual]", a.substitute.name()),
            };
            let _ = writeln!(
                out,
                "{:>2}. {} {} {}: {} -> {}",
                idx + 1,
                a.time_slot,
                a.class_name,
                a.subject,
                a.absent_teacher_name,
                substitute
            );
            let _ = writeln!(out, "    {} ({})", a.justification, provenance_label(a.provenance));
        }

        let _ = writeln!(out);
        let _ = writeln!(
            out,
            "{} period(s), {} unresolved",
            plan.assignments.len(),
            plan.unresolved_count()
        );
        let _ = write!(out, "{FOOTER}");
        out
    }
}

fn provenance_label(p: Provenance) -> &'static str {
    match p {
        Provenance::Proposed => "as proposed",
        Provenance::Repaired => "repaired",
        Provenance::Unresolved => "unresolved",
        Provenance::Manual => "edited",
    }
}
