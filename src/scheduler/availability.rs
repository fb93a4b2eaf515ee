use super::{util, SchedError};
use crate::model::{Day, Plan, Teacher, TeacherId, TimeSlot};
use crate::timetable::TimetableStore;
use std::collections::HashSet;

pub(super) fn available<'s>(
    store: &'s TimetableStore,
    day: Day,
    slot: TimeSlot,
    absent: &HashSet<TeacherId>,
    committed: &HashSet<TeacherId>,
) -> Result<Vec<&'s Teacher>, SchedError> {
    if !store.has_slot(&slot) {
        return Err(SchedError::UnknownSlot { day, slot });
    }
    Ok(util::free_teachers(store, day, slot, absent, committed))
}

/// Le remplaçant actuel de la ligne ne compte pas contre lui-même.
pub(super) fn candidates<'s>(
    store: &'s TimetableStore,
    plan: &Plan,
    index: usize,
) -> Result<Vec<&'s Teacher>, SchedError> {
    let row = plan
        .assignments
        .get(index)
        .ok_or(SchedError::UnknownRow(index))?;
    let committed = plan.committed_at(row.time_slot, Some(index));
    available(store, row.day, row.time_slot, &plan.absent_ids(), &committed)
}
