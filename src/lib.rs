#![forbid(unsafe_code)]
//! Ganti — moteur d'affectation d'enseignants remplaçants (local, sans BD).
//!
//! - Données de référence immuables : roster, emploi du temps, catalogue de créneaux.
//! - Propositions d'un oracle externe non fiable, réparées de façon déterministe.
//! - Édition manuelle copy-on-write du plan ; export JSON/CSV et rapport texte.

pub mod grid;
pub mod io;
pub mod model;
pub mod oracle;
pub mod report;
pub mod scheduler;
pub mod session;
pub mod storage;
pub mod timetable;

pub use grid::{load_grid_from_file, load_store_from_grid, TimetableGrid};
pub use model::{
    AbsentTeacher, Day, FinalAssignment, Plan, PlanId, ProposedAssignment, Provenance, Substitute,
    Teacher, TeacherId, TimeSlot, TimetableEntry, SENTINEL_ID,
};
pub use oracle::{CommandOracle, FileOracle, Oracle, OracleError, OracleRequest};
pub use report::{ReportRenderer, TextReport};
pub use scheduler::{Conflict, ConflictKind, ResolveOptions, SchedError, Scheduler, Selection};
pub use session::Session;
pub use storage::{JsonStorage, Storage};
pub use timetable::TimetableStore;
