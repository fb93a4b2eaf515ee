use crate::model::{Day, Teacher, TeacherId, TimeSlot};
use crate::timetable::TimetableStore;
use std::collections::HashSet;

/// Enseignants libres à `(day, slot)`, dans l'ordre du roster.
pub(super) fn free_teachers<'s>(
    store: &'s TimetableStore,
    day: Day,
    slot: TimeSlot,
    absent: &HashSet<TeacherId>,
    committed: &HashSet<TeacherId>,
) -> Vec<&'s Teacher> {
    let scheduled: HashSet<&TeacherId> = store
        .entries_at(day, slot)
        .map(|e| &e.teacher_id)
        .collect();
    store
        .teachers()
        .iter()
        .filter(|t| {
            !scheduled.contains(&t.id) && !absent.contains(&t.id) && !committed.contains(&t.id)
        })
        .collect()
}

pub(super) fn first_free<'s>(
    store: &'s TimetableStore,
    day: Day,
    slot: TimeSlot,
    absent: &HashSet<TeacherId>,
    committed: &HashSet<TeacherId>,
) -> Option<&'s Teacher> {
    free_teachers(store, day, slot, absent, committed)
        .into_iter()
        .next()
}

/// Vrai si `id` est du roster, présent et sans cours à `(day, slot)`.
pub(super) fn can_cover(
    store: &TimetableStore,
    id: &TeacherId,
    day: Day,
    slot: TimeSlot,
    absent: &HashSet<TeacherId>,
) -> bool {
    store.find_teacher(id).is_some() && !absent.contains(id) && !store.is_scheduled(id, day, slot)
}
