use crate::model::{Day, Teacher, TeacherId, TimeSlot, TimetableEntry};
use crate::scheduler::SchedError;
use std::collections::HashSet;

/// Données de référence : roster, emploi du temps hebdomadaire et catalogue
/// des créneaux. Construit une fois, jamais modifié ensuite.
#[derive(Debug, Clone, Default)]
pub struct TimetableStore {
    teachers: Vec<Teacher>,
    entries: Vec<TimetableEntry>,
    slots: Vec<TimeSlot>,
}

impl TimetableStore {
    /// Catalogue des créneaux déduit des entrées.
    pub fn new(teachers: Vec<Teacher>, entries: Vec<TimetableEntry>) -> Result<Self, SchedError> {
        let slots = entries.iter().map(|e| e.time_slot).collect();
        Self::with_slots(teachers, entries, slots)
    }

    /// Catalogue explicite : permet des créneaux libres pour tout le monde.
    pub fn with_slots(
        teachers: Vec<Teacher>,
        entries: Vec<TimetableEntry>,
        mut slots: Vec<TimeSlot>,
    ) -> Result<Self, SchedError> {
        let mut seen = HashSet::new();
        for t in &teachers {
            if t.id.is_reserved() {
                return Err(SchedError::ReservedTeacherId(t.id.to_string()));
            }
            if !seen.insert(&t.id) {
                return Err(SchedError::DuplicateTeacher(t.id.to_string()));
            }
        }

        slots.sort();
        slots.dedup();

        for e in &entries {
            if !seen.contains(&e.teacher_id) {
                return Err(SchedError::UnknownTeacher(e.teacher_id.to_string()));
            }
            if slots.binary_search(&e.time_slot).is_err() {
                return Err(SchedError::UnknownSlot {
                    day: e.day,
                    slot: e.time_slot,
                });
            }
        }

        Ok(Self {
            teachers,
            entries,
            slots,
        })
    }

    /// Roster dans son ordre de chargement.
    pub fn teachers(&self) -> &[Teacher] {
        &self.teachers
    }
    pub fn entries(&self) -> &[TimetableEntry] {
        &self.entries
    }
    /// Créneaux triés chronologiquement.
    pub fn slots(&self) -> &[TimeSlot] {
        &self.slots
    }

    pub fn has_slot(&self, slot: &TimeSlot) -> bool {
        self.slots.binary_search(slot).is_ok()
    }

    pub fn find_teacher(&self, id: &TeacherId) -> Option<&Teacher> {
        self.teachers.iter().find(|t| &t.id == id)
    }

    pub fn entries_for_day(&self, day: Day) -> impl Iterator<Item = &TimetableEntry> + '_ {
        self.entries.iter().filter(move |e| e.day == day)
    }

    pub fn entries_at(&self, day: Day, slot: TimeSlot) -> impl Iterator<Item = &TimetableEntry> + '_ {
        self.entries
            .iter()
            .filter(move |e| e.day == day && e.time_slot == slot)
    }

    /// Vrai si `id` enseigne déjà à `(day, slot)`.
    pub fn is_scheduled(&self, id: &TeacherId, day: Day, slot: TimeSlot) -> bool {
        self.entries_at(day, slot).any(|e| &e.teacher_id == id)
    }

    /// Périodes libérées par les absents, triées par créneau.
    pub fn vacated(&self, day: Day, absent: &HashSet<TeacherId>) -> Vec<&TimetableEntry> {
        let mut out: Vec<&TimetableEntry> = self
            .entries_for_day(day)
            .filter(|e| absent.contains(&e.teacher_id))
            .collect();
        out.sort_by_key(|e| e.time_slot);
        out
    }

    /// Nombre de périodes d'un enseignant sur la journée.
    pub fn periods_on(&self, id: &TeacherId, day: Day) -> usize {
        self.entries_for_day(day)
            .filter(|e| &e.teacher_id == id)
            .count()
    }
}
