use super::{availability, types, Scheduler, Selection};
use crate::model::{Plan, Provenance, Substitute};
use tracing::debug;

/// Change le remplaçant d'une ligne. Un id hors roster, ou hors candidats
/// quand `edits_from_candidates_only` est actif, laisse le plan inchangé.
pub(super) fn set_substitute(
    scheduler: &Scheduler<'_>,
    plan: &Plan,
    index: usize,
    selection: &Selection,
) -> Plan {
    if index >= plan.assignments.len() {
        debug!(index, "ignoring edit on a row that does not exist");
        return plan.clone();
    }

    let substitute = match selection {
        Selection::Other => Substitute::unresolved(""),
        Selection::Teacher(id) => {
            let Some(teacher) = scheduler.store.find_teacher(id) else {
                debug!(index, teacher = %id, "ignoring edit: teacher not in roster");
                return plan.clone();
            };
            if scheduler.opts.edits_from_candidates_only {
                let offered = availability::candidates(scheduler.store, plan, index)
                    .map(|c| c.iter().any(|t| t.id == teacher.id))
                    .unwrap_or(false);
                if !offered {
                    debug!(index, teacher = %id, "ignoring edit: teacher not among candidates");
                    return plan.clone();
                }
            }
            Substitute::assigned(teacher)
        }
    };

    let mut next = plan.clone();
    let row = &mut next.assignments[index];
    row.justification = match substitute {
        Substitute::Unresolved { .. } => types::MANUAL_SENTINEL_NOTE,
        Substitute::Assigned { .. } => types::MANUAL_CHANGE_NOTE,
    }
    .to_string();
    row.substitute = substitute;
    row.provenance = Provenance::Manual;
    next.revision += 1;
    next
}

/// Nom libre d'une ligne sans remplaçant ; sans effet sur les autres lignes.
pub(super) fn set_custom_name(plan: &Plan, index: usize, name: &str) -> Plan {
    let unresolved = plan
        .assignments
        .get(index)
        .is_some_and(|row| row.substitute.is_unresolved());
    if !unresolved {
        debug!(index, "ignoring custom name: row has an assigned teacher");
        return plan.clone();
    }

    let mut next = plan.clone();
    next.assignments[index].substitute = Substitute::unresolved(name);
    next.revision += 1;
    next
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{
        AbsentTeacher, Day, FinalAssignment, Teacher, TeacherId, TimeSlot, TimetableEntry,
    };
    use crate::scheduler::ResolveOptions;
    use crate::timetable::TimetableStore;

    fn slot(raw: &str) -> TimeSlot {
        raw.parse().unwrap()
    }

    fn store() -> TimetableStore {
        TimetableStore::new(
            vec![
                Teacher::new("SD", "Surayadi binti Drahman"),
                Teacher::new("KV", "Kenny Voo Kai Lin"),
                Teacher::new("JL", "Jessy Lessy"),
                Teacher::new("MN", "Muhd Nazmi bin Rosli"),
                Teacher::new("NS", "Nur Syafiqah binti Roslan"),
            ],
            vec![
                TimetableEntry {
                    day: Day::Rabu,
                    time_slot: slot("0920-0950"),
                    class_name: "TAHUN 4".into(),
                    subject: "PM".into(),
                    teacher_id: TeacherId::new("SD"),
                },
                TimetableEntry {
                    day: Day::Rabu,
                    time_slot: slot("0920-0950"),
                    class_name: "TAHUN 2".into(),
                    subject: "BM".into(),
                    teacher_id: TeacherId::new("JL"),
                },
            ],
        )
        .unwrap()
    }

    fn plan() -> Plan {
        let row = |class: &str, id: &str, name: &str| FinalAssignment {
            day: Day::Rabu,
            time_slot: slot("0920-0950"),
            class_name: class.into(),
            subject: "PM".into(),
            absent_teacher_name: "Surayadi binti Drahman".into(),
            substitute: Substitute::Assigned {
                id: TeacherId::new(id),
                name: name.into(),
            },
            justification: "free".into(),
            provenance: Provenance::Proposed,
        };
        Plan::new(
            Day::Rabu,
            vec![AbsentTeacher::new("SD", "Cuti sakit")],
            vec![
                row("TAHUN 4", "KV", "Kenny Voo Kai Lin"),
                row("TAHUN 6", "MN", "Muhd Nazmi bin Rosli"),
            ],
        )
    }

    #[test]
    fn sentinel_then_custom_name_survives_other_edits() {
        let store = store();
        let s = Scheduler::new(&store);
        let original = plan();

        let p1 = s.set_substitute(&original, 0, &Selection::Other);
        assert_eq!(p1.assignments[0].substitute, Substitute::unresolved(""));
        assert_eq!(p1.assignments[0].justification, types::MANUAL_SENTINEL_NOTE);

        let p2 = s.set_custom_name(&p1, 0, "Relief Teacher X");
        let p3 = s.set_substitute(&p2, 1, &Selection::Teacher(TeacherId::new("NS")));

        let row = &p3.assignments[0];
        assert_eq!(row.substitute.wire_id(), "OTHER");
        assert_eq!(row.substitute.name(), "Relief Teacher X");
        assert_eq!(row.justification, types::MANUAL_SENTINEL_NOTE);
        assert_eq!(p3.revision, 3);

        // l'ancien plan n'est pas touché
        assert_eq!(original.assignments[0].substitute.wire_id(), "KV");
        assert_eq!(original.revision, 0);
    }

    #[test]
    fn manual_change_overwrites_id_name_and_justification() {
        let store = store();
        let s = Scheduler::new(&store);
        let next = s.set_substitute(&plan(), 1, &Selection::parse("NS"));
        let row = &next.assignments[1];
        assert_eq!(row.substitute.teacher_id(), Some(&TeacherId::new("NS")));
        assert_eq!(row.substitute.name(), "Nur Syafiqah binti Roslan");
        assert_eq!(row.justification, types::MANUAL_CHANGE_NOTE);
        assert_eq!(row.provenance, Provenance::Manual);
        assert_eq!(row.class_name, "TAHUN 6");
    }

    #[test]
    fn unknown_teacher_or_row_is_a_no_op() {
        let store = store();
        let s = Scheduler::new(&store);
        let original = plan();
        assert_eq!(s.set_substitute(&original, 0, &Selection::parse("ZZ")), original);
        assert_eq!(s.set_substitute(&original, 9, &Selection::Other), original);
    }

    #[test]
    fn custom_name_requires_unresolved_row() {
        let store = store();
        let s = Scheduler::new(&store);
        let original = plan();
        assert_eq!(s.set_custom_name(&original, 0, "Someone"), original);
    }

    #[test]
    fn busy_absent_or_committed_teacher_is_refused() {
        let store = store();
        let s = Scheduler::new(&store);
        let original = plan();
        // JL enseigne en TAHUN 2 à ce créneau
        assert_eq!(s.set_substitute(&original, 0, &Selection::parse("JL")), original);
        // SD est absent
        assert_eq!(s.set_substitute(&original, 0, &Selection::parse("SD")), original);
        // MN couvre déjà TAHUN 6
        assert_eq!(s.set_substitute(&original, 0, &Selection::parse("MN")), original);
        // le remplaçant actuel reste un candidat de sa propre ligne
        let same = s.set_substitute(&original, 0, &Selection::parse("KV"));
        assert_eq!(same.assignments[0].justification, types::MANUAL_CHANGE_NOTE);
    }

    #[test]
    fn forced_edit_may_knowingly_double_book() {
        let store = store();
        let opts = ResolveOptions {
            edits_from_candidates_only: false,
            ..ResolveOptions::default()
        };
        let s = Scheduler::with_options(&store, opts);
        let next = s.set_substitute(&plan(), 1, &Selection::parse("KV"));
        assert_eq!(next.revision, 1);
        let kinds: Vec<_> = s.detect_conflicts(&next).into_iter().map(|c| c.kind).collect();
        assert!(kinds.contains(&crate::scheduler::ConflictKind::DoubleBooking));
    }
}
