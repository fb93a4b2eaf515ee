use super::{Conflict, ConflictKind, Scheduler};
use crate::model::{Plan, TeacherId, TimeSlot};
use std::collections::HashMap;

/// Relit un plan contre les contraintes dures. Les lignes sans remplaçant
/// ne sont jamais en conflit.
pub(super) fn detect_conflicts(scheduler: &Scheduler<'_>, plan: &Plan) -> Vec<Conflict> {
    let store = scheduler.store;
    let absent = plan.absent_ids();
    let vacated = store.vacated(plan.day, &absent);
    let mut out = Vec::new();

    let mut first_by_teacher: HashMap<(TimeSlot, &TeacherId), usize> = HashMap::new();
    let mut first_by_period: HashMap<(TimeSlot, &str), usize> = HashMap::new();

    for (row, a) in plan.assignments.iter().enumerate() {
        let is_vacated = a.day == plan.day
            && vacated
                .iter()
                .any(|e| e.time_slot == a.time_slot && e.class_name == a.class_name);
        if !is_vacated {
            out.push(Conflict {
                row,
                other_row: None,
                teacher: None,
                kind: ConflictKind::OrphanRow,
            });
        }
        if let Some(&first) = first_by_period.get(&(a.time_slot, a.class_name.as_str())) {
            out.push(Conflict {
                row,
                other_row: Some(first),
                teacher: None,
                kind: ConflictKind::DuplicateRow,
            });
        } else {
            first_by_period.insert((a.time_slot, a.class_name.as_str()), row);
        }

        let Some(id) = a.substitute.teacher_id() else {
            continue;
        };

        let mut flag = |kind: ConflictKind, other_row: Option<usize>| {
            out.push(Conflict {
                row,
                other_row,
                teacher: Some(id.clone()),
                kind,
            });
        };

        if store.find_teacher(id).is_none() {
            flag(ConflictKind::UnknownSubstitute, None);
        }
        if absent.contains(id) {
            flag(ConflictKind::AbsentSubstitute, None);
        }
        if store.is_scheduled(id, a.day, a.time_slot) {
            flag(ConflictKind::BusySubstitute, None);
        }
        match first_by_teacher.get(&(a.time_slot, id)) {
            Some(&first) => flag(ConflictKind::DoubleBooking, Some(first)),
            None => {
                first_by_teacher.insert((a.time_slot, id), row);
            }
        }
    }

    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{
        AbsentTeacher, Day, FinalAssignment, Provenance, Substitute, Teacher, TimetableEntry,
    };
    use crate::timetable::TimetableStore;

    fn slot(raw: &str) -> TimeSlot {
        raw.parse().unwrap()
    }

    fn entry(class: &str, teacher: &str) -> TimetableEntry {
        TimetableEntry {
            day: Day::Khamis,
            time_slot: slot("1040-1110"),
            class_name: class.into(),
            subject: "SN".into(),
            teacher_id: TeacherId::new(teacher),
        }
    }

    fn row(class: &str, substitute: Substitute) -> FinalAssignment {
        FinalAssignment {
            day: Day::Khamis,
            time_slot: slot("1040-1110"),
            class_name: class.into(),
            subject: "SN".into(),
            absent_teacher_name: "x".into(),
            substitute,
            justification: String::new(),
            provenance: Provenance::Manual,
        }
    }

    fn assigned(id: &str) -> Substitute {
        Substitute::Assigned {
            id: TeacherId::new(id),
            name: id.into(),
        }
    }

    #[test]
    fn reports_each_kind_of_violation() {
        let store = TimetableStore::new(
            vec![
                Teacher::new("AY", "Amy"),
                Teacher::new("KV", "Kenny"),
                Teacher::new("FS", "Florida"),
                Teacher::new("MA", "Mohamad"),
            ],
            vec![
                entry("TAHUN 1", "AY"),
                entry("TAHUN 2", "FS"),
                entry("TAHUN 3", "KV"),
                entry("TAHUN 4", "MA"),
            ],
        )
        .unwrap();
        let s = Scheduler::new(&store);
        let plan = Plan::new(
            Day::Khamis,
            vec![AbsentTeacher::new("AY", ""), AbsentTeacher::new("FS", "")],
            vec![
                row("TAHUN 1", assigned("FS")),
                row("TAHUN 2", assigned("KV")),
                row("TAHUN 2", Substitute::unresolved("")),
                row("TAHUN 4", assigned("ZZ")),
            ],
        );

        let kinds: Vec<(usize, ConflictKind)> = s
            .detect_conflicts(&plan)
            .into_iter()
            .map(|c| (c.row, c.kind))
            .collect();
        assert_eq!(
            kinds,
            [
                (0, ConflictKind::AbsentSubstitute),
                (0, ConflictKind::BusySubstitute),
                (1, ConflictKind::BusySubstitute),
                (2, ConflictKind::DuplicateRow),
                (3, ConflictKind::OrphanRow),
                (3, ConflictKind::UnknownSubstitute),
            ]
        );
    }

    #[test]
    fn clean_plan_has_no_conflicts() {
        let store = TimetableStore::new(
            vec![Teacher::new("AY", "Amy"), Teacher::new("KV", "Kenny")],
            vec![entry("TAHUN 1", "AY")],
        )
        .unwrap();
        let s = Scheduler::new(&store);
        let plan = Plan::new(
            Day::Khamis,
            vec![AbsentTeacher::new("AY", "")],
            vec![row("TAHUN 1", assigned("KV"))],
        );
        assert!(s.detect_conflicts(&plan).is_empty());
    }
}
