use crate::model::{is_sentinel_id, Day, TeacherId, TimeSlot};
use crate::oracle::OracleError;
use chrono::NaiveDate;
use thiserror::Error;

/// Justification d'une ligne réparée pour éviter une double affectation.
pub const DOUBLE_BOOKING_NOTE: &str = "resolved by system to avoid double-booking";
/// Justification d'une ligne réparée dont le remplaçant proposé n'était pas libre.
pub const UNAVAILABLE_NOTE: &str = "resolved by system: proposed teacher is not available";
/// Justification d'une période oubliée par l'oracle et couverte par le système.
pub const OMITTED_NOTE: &str = "assigned by system: no proposal received";
/// Justification d'une ligne sans aucun candidat.
pub const NO_CANDIDATE_NOTE: &str = "no available teacher found";
/// Libellé par défaut d'une ligne sans candidat.
pub const UNRESOLVED_LABEL: &str = "Other";
pub const MANUAL_SENTINEL_NOTE: &str = "set manually";
pub const MANUAL_CHANGE_NOTE: &str = "changed manually by operator";

/// Options de résolution
#[derive(Debug, Clone, Copy)]
pub struct ResolveOptions {
    /// Répare aussi une proposition sans collision dont le remplaçant est
    /// absent, occupé ou hors roster.
    pub revalidate_proposals: bool,
    /// Écarte les propositions qui ne couvrent aucune période libérée, et les doublons.
    pub drop_orphans: bool,
    /// Ajoute les périodes libérées que l'oracle n'a pas couvertes.
    pub fill_omitted: bool,
    /// N'accepte une édition manuelle que depuis la liste des candidats.
    /// Désactivé, un id du roster suffit (l'opérateur force son choix).
    pub edits_from_candidates_only: bool,
}

impl Default for ResolveOptions {
    fn default() -> Self {
        Self {
            revalidate_proposals: true,
            drop_orphans: true,
            fill_omitted: false,
            edits_from_candidates_only: true,
        }
    }
}

impl ResolveOptions {
    /// Seules les collisions entre propositions sont réparées.
    pub fn collisions_only() -> Self {
        Self {
            revalidate_proposals: false,
            drop_orphans: false,
            fill_omitted: false,
            edits_from_candidates_only: false,
        }
    }
}

/// Choix de l'opérateur pour une ligne.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Selection {
    Teacher(TeacherId),
    Other,
}

impl Selection {
    pub fn parse(raw: &str) -> Self {
        if is_sentinel_id(raw.trim()) {
            Selection::Other
        } else {
            Selection::Teacher(TeacherId::new(raw))
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConflictKind {
    DoubleBooking,    // même remplaçant sur deux classes au même créneau
    AbsentSubstitute, // remplaçant lui-même absent
    BusySubstitute,   // remplaçant qui enseigne déjà à ce créneau
    UnknownSubstitute,
    OrphanRow,     // ligne sans période libérée correspondante
    DuplicateRow,  // deux lignes pour la même période
}

impl ConflictKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            ConflictKind::DoubleBooking => "double",
            ConflictKind::AbsentSubstitute => "absent",
            ConflictKind::BusySubstitute => "busy",
            ConflictKind::UnknownSubstitute => "unknown",
            ConflictKind::OrphanRow => "orphan",
            ConflictKind::DuplicateRow => "duplicate",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Conflict {
    pub row: usize,
    pub other_row: Option<usize>,
    pub teacher: Option<TeacherId>,
    pub kind: ConflictKind,
}

#[derive(Error, Debug)]
pub enum SchedError {
    #[error("unknown time slot {slot} on {day}")]
    UnknownSlot { day: Day, slot: TimeSlot },
    #[error("invalid time slot: {0}")]
    InvalidTimeSlot(String),
    #[error("unknown teacher id: {0}")]
    UnknownTeacher(String),
    #[error("duplicate teacher id: {0}")]
    DuplicateTeacher(String),
    #[error("teacher id {0} is reserved for unresolved rows")]
    ReservedTeacherId(String),
    #[error("teacher {0} listed as absent more than once")]
    DuplicateAbsence(String),
    #[error("no absent teacher given")]
    NoAbsentTeachers,
    #[error("{0} is not a school day")]
    NotASchoolDay(NaiveDate),
    #[error("row {0} does not exist in the plan")]
    UnknownRow(usize),
    #[error("no plan in session")]
    NoPlan,
    #[error(transparent)]
    Oracle(#[from] OracleError),
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}
