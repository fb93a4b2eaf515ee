#![forbid(unsafe_code)]
use ganti::{
    load_store_from_grid, AbsentTeacher, Day, OracleError, OracleRequest, Provenance,
    ProposedAssignment, Scheduler, Selection, Session, Substitute, TeacherId, TimeSlot,
    TimetableStore,
};
use ganti::scheduler::{DOUBLE_BOOKING_NOTE, NO_CANDIDATE_NOTE};
use std::collections::HashSet;

const GRID: &str = concat!(env!("CARGO_MANIFEST_DIR"), "/data/timetable-grid.json");

fn store() -> TimetableStore {
    load_store_from_grid(GRID).unwrap()
}

fn slot(raw: &str) -> TimeSlot {
    raw.parse().unwrap()
}

fn ids(list: &[&str]) -> HashSet<TeacherId> {
    list.iter().map(TeacherId::new).collect()
}

fn proposal(day: Day, time: &str, class: &str, subject: &str, absent: &str, sub: &str) -> ProposedAssignment {
    ProposedAssignment {
        day,
        time_slot: slot(time),
        class_name: class.into(),
        subject: subject.into(),
        absent_teacher_name: absent.into(),
        substitute: Substitute::Assigned {
            id: TeacherId::new(sub),
            name: sub.into(),
        },
        justification: "Free period".into(),
    }
}

/// Oracle naïf : le même remplaçant pour toutes les périodes libérées.
fn same_teacher_everywhere(
    sub: &'static str,
) -> impl Fn(&OracleRequest) -> Result<Vec<ProposedAssignment>, OracleError> {
    move |req: &OracleRequest| {
        let out = req
            .timetable_for_day
            .iter()
            .filter_map(|e| {
                let absent = req.absent_teachers.iter().find(|a| a.teacher_id == e.teacher_id)?;
                Some(ProposedAssignment {
                    day: e.day,
                    time_slot: e.time_slot,
                    class_name: e.class_name.clone(),
                    subject: e.subject.clone(),
                    absent_teacher_name: absent.teacher_name.clone(),
                    substitute: Substitute::Assigned {
                        id: TeacherId::new(sub),
                        name: sub.to_string(),
                    },
                    justification: "Always available".into(),
                })
            })
            .collect();
        Ok(out)
    }
}

#[test]
fn free_teachers_on_wednesday_second_recess_slot() {
    let store = store();
    let s = Scheduler::new(&store);
    let free = s
        .available(Day::Rabu, slot("0920-0950"), &ids(&["SD"]), &HashSet::new())
        .unwrap();
    let free: Vec<&str> = free.iter().map(|t| t.id.as_str()).collect();
    assert_eq!(free, ["MJ", "KV", "MN", "MA", "NZ"]);

    let free = s
        .available(Day::Rabu, slot("0920-0950"), &ids(&["SD"]), &ids(&["MJ", "MN"]))
        .unwrap();
    let free: Vec<&str> = free.iter().map(|t| t.id.as_str()).collect();
    assert_eq!(free, ["KV", "MA", "NZ"]);
}

#[test]
fn same_substitute_twice_in_one_slot_is_repaired() {
    let store = store();
    let s = Scheduler::new(&store);
    let plan = s.resolve(
        Day::Isnin,
        &[AbsentTeacher::new("NZ", "MC"), AbsentTeacher::new("BB", "Kursus")],
        vec![
            proposal(Day::Isnin, "0820-0850", "TAHUN 1", "PK", "Mohd Nazrin bin Ibrahim", "KV"),
            proposal(Day::Isnin, "0820-0850", "TAHUN 3", "BI", "Baby Trucy Sedrek", "KV"),
        ],
    );

    assert_eq!(plan.len(), 2);
    assert_eq!(plan[0].substitute.teacher_id(), Some(&TeacherId::new("KV")));
    assert_eq!(plan[0].provenance, Provenance::Proposed);
    assert_eq!(plan[1].substitute.teacher_id(), Some(&TeacherId::new("MJ")));
    assert_eq!(plan[1].substitute.name(), "Moktar bin Jaman");
    assert_eq!(plan[1].justification, DOUBLE_BOOKING_NOTE);
    assert_eq!(plan[1].provenance, Provenance::Repaired);
}

#[test]
fn nobody_free_falls_back_to_other() {
    let store = store();
    let s = Scheduler::new(&store);
    // à 0820 le lundi, tous les enseignants libres sont absents
    let absent: Vec<AbsentTeacher> = ["NZ", "MJ", "KV", "MN", "MA", "FS", "NS"]
        .iter()
        .map(|id| AbsentTeacher::new(id, ""))
        .collect();
    let plan = s.resolve(
        Day::Isnin,
        &absent,
        vec![proposal(Day::Isnin, "0820-0850", "TAHUN 1", "PK", "Mohd Nazrin bin Ibrahim", "KV")],
    );
    assert_eq!(plan.len(), 1);
    assert!(plan[0].substitute.is_unresolved());
    assert_eq!(plan[0].justification, NO_CANDIDATE_NOTE);
    assert_eq!(plan[0].provenance, Provenance::Unresolved);
}

#[test]
fn resolved_plans_never_break_invariants() {
    let store = store();
    let teachers: Vec<TeacherId> = store.teachers().iter().map(|t| t.id.clone()).collect();
    let scheduler = Scheduler::new(&store);

    for day in Day::ALL {
        for (i, first) in teachers.iter().enumerate() {
            for second in [None, teachers.get(i + 1)] {
                let mut absent = vec![AbsentTeacher::new(first.as_str(), "")];
                if let Some(id) = second {
                    absent.push(AbsentTeacher::new(id.as_str(), ""));
                }
                let absent_ids: HashSet<TeacherId> =
                    absent.iter().map(|a| a.teacher_id.clone()).collect();
                let vacated = store.vacated(day, &absent_ids).len();

                for sub in ["MJ", "NZ"] {
                    let mut session = Session::new(scheduler);
                    let oracle = same_teacher_everywhere(sub);
                    let plan = session.request_plan(&oracle, day, absent.clone()).unwrap();

                    assert_eq!(plan.assignments.len(), vacated, "{day} {absent_ids:?}");
                    assert!(
                        scheduler.detect_conflicts(plan).is_empty(),
                        "{day} {absent_ids:?}: {:?}",
                        scheduler.detect_conflicts(plan)
                    );
                    for a in &plan.assignments {
                        if let Some(id) = a.substitute.teacher_id() {
                            assert!(!absent_ids.contains(id));
                            assert!(!store.is_scheduled(id, day, a.time_slot));
                        }
                    }
                    let mut seen = HashSet::new();
                    for a in plan.assignments.iter().filter(|a| !a.substitute.is_unresolved()) {
                        assert!(seen.insert((a.time_slot, a.substitute.wire_id().to_string())));
                    }
                    for pair in plan.assignments.windows(2) {
                        assert!(pair[0].time_slot <= pair[1].time_slot);
                    }
                }
            }
        }
    }
}

#[test]
fn resolution_is_deterministic() {
    let store = store();
    let scheduler = Scheduler::new(&store);
    let absent = vec![AbsentTeacher::new("SD", ""), AbsentTeacher::new("NZ", "")];
    let oracle = same_teacher_everywhere("KV");
    let request = OracleRequest::build(&store, Day::Rabu, &absent);
    let proposals = oracle(&request).unwrap();

    let a = scheduler.resolve(Day::Rabu, &absent, proposals.clone());
    let b = scheduler.resolve(Day::Rabu, &absent, proposals);
    assert_eq!(a, b);
}

#[test]
fn operator_names_an_outside_substitute() {
    let store = store();
    let mut session = Session::new(Scheduler::new(&store));
    let oracle = same_teacher_everywhere("KV");
    session
        .request_plan(&oracle, Day::Rabu, vec![AbsentTeacher::new("SD", "Cuti sakit")])
        .unwrap();

    let row = session
        .plan()
        .unwrap()
        .assignments
        .iter()
        .position(|a| a.time_slot == slot("1010-1040"))
        .unwrap();
    assert!(session.set_substitute(row, &Selection::Other).unwrap());
    assert!(session.set_custom_name(row, "Relief Teacher X").unwrap());

    let plan = session.plan().unwrap();
    let edited = &plan.assignments[row];
    assert_eq!(edited.substitute.wire_id(), "OTHER");
    assert_eq!(edited.substitute.name(), "Relief Teacher X");
    assert_eq!(edited.provenance, Provenance::Manual);
    assert_eq!(plan.revision, 2);
    assert_eq!(plan.unresolved_count(), 1);
}

#[test]
fn manual_edit_cannot_bring_back_an_absent_or_busy_teacher() {
    let store = store();
    let scheduler = Scheduler::new(&store);
    let mut session = Session::new(scheduler);
    let oracle = same_teacher_everywhere("MJ");
    session
        .request_plan(&oracle, Day::Rabu, vec![AbsentTeacher::new("SD", "Cuti sakit")])
        .unwrap();
    let row = session
        .plan()
        .unwrap()
        .assignments
        .iter()
        .position(|a| a.time_slot == slot("0820-0850"))
        .unwrap();

    // SD est absent, BB enseigne en TAHUN 5 à cette heure
    assert!(!session.set_substitute(row, &Selection::Teacher(TeacherId::new("SD"))).unwrap());
    assert!(!session.set_substitute(row, &Selection::Teacher(TeacherId::new("BB"))).unwrap());
    let plan = session.plan().unwrap();
    assert_eq!(plan.revision, 0);
    assert!(scheduler.detect_conflicts(plan).is_empty());

    assert!(session.set_substitute(row, &Selection::Teacher(TeacherId::new("KV"))).unwrap());
    assert_eq!(session.plan().unwrap().revision, 1);
}
