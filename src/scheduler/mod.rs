mod availability;
mod conflicts;
mod mutate;
mod resolve;
mod types;
mod util;

pub use types::{
    Conflict, ConflictKind, ResolveOptions, SchedError, Selection, DOUBLE_BOOKING_NOTE,
    MANUAL_CHANGE_NOTE, MANUAL_SENTINEL_NOTE, NO_CANDIDATE_NOTE, OMITTED_NOTE, UNAVAILABLE_NOTE,
    UNRESOLVED_LABEL,
};

use crate::model::{AbsentTeacher, Day, FinalAssignment, Plan, ProposedAssignment, Teacher, TeacherId, TimeSlot};
use crate::timetable::TimetableStore;
use std::collections::HashSet;

/// Scheduler : moteur de résolution adossé à des données de référence immuables
#[derive(Debug, Clone, Copy)]
pub struct Scheduler<'a> {
    store: &'a TimetableStore,
    opts: ResolveOptions,
}

impl<'a> Scheduler<'a> {
    pub fn new(store: &'a TimetableStore) -> Self {
        Self::with_options(store, ResolveOptions::default())
    }

    pub fn with_options(store: &'a TimetableStore, opts: ResolveOptions) -> Self {
        Self { store, opts }
    }

    pub fn store(&self) -> &'a TimetableStore {
        self.store
    }
    pub fn options(&self) -> ResolveOptions {
        self.opts
    }

    /// Enseignants libres pour `(day, slot)`, dans l'ordre du roster.
    pub fn available(
        &self,
        day: Day,
        slot: TimeSlot,
        absent: &HashSet<TeacherId>,
        committed: &HashSet<TeacherId>,
    ) -> Result<Vec<&'a Teacher>, SchedError> {
        availability::available(self.store, day, slot, absent, committed)
    }

    /// Candidats pour éditer la ligne `index` d'un plan.
    pub fn candidates(&self, plan: &Plan, index: usize) -> Result<Vec<&'a Teacher>, SchedError> {
        availability::candidates(self.store, plan, index)
    }

    /// Transforme les propositions de l'oracle en plan cohérent. N'échoue jamais.
    pub fn resolve(
        &self,
        day: Day,
        absent: &[AbsentTeacher],
        proposals: Vec<ProposedAssignment>,
    ) -> Vec<FinalAssignment> {
        resolve::resolve(self, day, absent, proposals)
    }

    pub fn set_substitute(&self, plan: &Plan, index: usize, selection: &Selection) -> Plan {
        mutate::set_substitute(self, plan, index, selection)
    }

    pub fn set_custom_name(&self, plan: &Plan, index: usize, name: &str) -> Plan {
        mutate::set_custom_name(plan, index, name)
    }

    pub fn detect_conflicts(&self, plan: &Plan) -> Vec<Conflict> {
        conflicts::detect_conflicts(self, plan)
    }
}
