use super::{types, util, Scheduler};
use crate::model::{
    AbsentTeacher, Day, FinalAssignment, ProposedAssignment, Provenance, Substitute, TeacherId,
    TimeSlot, TimetableEntry,
};
use std::collections::{HashMap, HashSet};
use tracing::{debug, info, warn};

pub(super) fn resolve(
    scheduler: &Scheduler<'_>,
    day: Day,
    absent: &[AbsentTeacher],
    mut proposals: Vec<ProposedAssignment>,
) -> Vec<FinalAssignment> {
    let store = scheduler.store;
    let opts = scheduler.opts;
    let absent_ids: HashSet<TeacherId> = absent.iter().map(|a| a.teacher_id.clone()).collect();
    let vacated = store.vacated(day, &absent_ids);

    // tri stable : à créneau égal, l'ordre de l'oracle départage
    proposals.sort_by_key(|p| p.time_slot);

    let mut assigned_by_time: HashMap<TimeSlot, HashSet<TeacherId>> = HashMap::new();
    let mut covered: HashSet<(TimeSlot, String)> = HashSet::new();
    let mut out = Vec::with_capacity(proposals.len());

    for proposal in proposals {
        let key = (proposal.time_slot, proposal.class_name.clone());
        if opts.drop_orphans {
            let is_vacated = proposal.day == day
                && vacated
                    .iter()
                    .any(|e| e.time_slot == proposal.time_slot && e.class_name == proposal.class_name);
            if !is_vacated {
                warn!(slot = %proposal.time_slot, class = %proposal.class_name, "dropping proposal for a period that was not vacated");
                continue;
            }
            if covered.contains(&key) {
                warn!(slot = %proposal.time_slot, class = %proposal.class_name, "dropping duplicate proposal");
                continue;
            }
        }
        covered.insert(key);

        let slot = proposal.time_slot;
        let committed = assigned_by_time.entry(slot).or_default();

        let repair_note = match proposal.substitute.teacher_id() {
            None if opts.revalidate_proposals => Some(types::OMITTED_NOTE),
            None => None,
            Some(id) if committed.contains(id) => Some(types::DOUBLE_BOOKING_NOTE),
            Some(id)
                if opts.revalidate_proposals
                    && !util::can_cover(store, id, proposal.day, slot, &absent_ids) =>
            {
                Some(types::UNAVAILABLE_NOTE)
            }
            Some(_) => None,
        };

        let Some(note) = repair_note else {
            debug!(slot = %slot, class = %proposal.class_name, substitute = proposal.substitute.wire_id(), "keeping proposal");
            if let Some(id) = proposal.substitute.teacher_id() {
                committed.insert(id.clone());
            }
            out.push(FinalAssignment::kept(proposal));
            continue;
        };

        match util::first_free(store, proposal.day, slot, &absent_ids, committed) {
            Some(teacher) => {
                warn!(
                    slot = %slot,
                    class = %proposal.class_name,
                    proposed = proposal.substitute.wire_id(),
                    replacement = %teacher.id,
                    "{note}"
                );
                committed.insert(teacher.id.clone());
                out.push(FinalAssignment::replaced(
                    proposal,
                    Substitute::assigned(teacher),
                    note,
                    Provenance::Repaired,
                ));
            }
            None => {
                warn!(slot = %slot, class = %proposal.class_name, "{}", types::NO_CANDIDATE_NOTE);
                out.push(unresolved(proposal));
            }
        }
    }

    if opts.fill_omitted {
        let omitted: Vec<&TimetableEntry> = vacated
            .into_iter()
            .filter(|e| !covered.contains(&(e.time_slot, e.class_name.clone())))
            .collect();
        for entry in omitted {
            let committed = assigned_by_time.entry(entry.time_slot).or_default();
            let proposal = ProposedAssignment {
                day: entry.day,
                time_slot: entry.time_slot,
                class_name: entry.class_name.clone(),
                subject: entry.subject.clone(),
                absent_teacher_name: store
                    .find_teacher(&entry.teacher_id)
                    .map(|t| t.name.clone())
                    .unwrap_or_else(|| entry.teacher_id.to_string()),
                substitute: Substitute::unresolved(""),
                justification: String::new(),
            };
            match util::first_free(store, entry.day, entry.time_slot, &absent_ids, committed) {
                Some(teacher) => {
                    warn!(slot = %entry.time_slot, class = %entry.class_name, replacement = %teacher.id, "{}", types::OMITTED_NOTE);
                    committed.insert(teacher.id.clone());
                    out.push(FinalAssignment::replaced(
                        proposal,
                        Substitute::assigned(teacher),
                        types::OMITTED_NOTE,
                        Provenance::Repaired,
                    ));
                }
                None => out.push(unresolved(proposal)),
            }
        }
        out.sort_by_key(|a| a.time_slot);
    }

    info!(
        day = %day,
        rows = out.len(),
        repaired = out.iter().filter(|a| a.provenance == Provenance::Repaired).count(),
        unresolved = out.iter().filter(|a| a.provenance == Provenance::Unresolved).count(),
        "substitution plan resolved"
    );
    out
}

fn unresolved(proposal: ProposedAssignment) -> FinalAssignment {
    FinalAssignment::replaced(
        proposal,
        Substitute::unresolved(types::UNRESOLVED_LABEL),
        types::NO_CANDIDATE_NOTE,
        Provenance::Unresolved,
    )
}
