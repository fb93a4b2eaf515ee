//! Frontière avec l'oracle de recommandation (non fiable).
//!
//! - Construction de la requête (jour, absents, roster, emploi du temps du jour).
//! - Parsing strict de la réponse : tout ou rien, jamais de plan partiel.
//! - Deux transports synchrones : fichier de réponse, commande externe (JSON stdin/stdout).

use crate::model::{AbsentTeacher, AssignmentRecord, Day, ProposedAssignment, Teacher, TeacherId, TimetableEntry};
use crate::timetable::TimetableStore;
use serde::Serialize;
use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::process::{Command, Stdio};
use thiserror::Error;
use tracing::debug;

const UNSTATED_REASON: &str = "Not stated";

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum OracleError {
    #[error("recommendation oracle unavailable: {0}")]
    Unavailable(String),
    #[error("malformed oracle response: {0}")]
    Malformed(String),
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AbsentTeacherInfo {
    pub teacher_id: TeacherId,
    pub teacher_name: String,
    pub reason: String,
}

/// Requête envoyée à l'oracle
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct OracleRequest {
    pub absence_day: Day,
    pub absent_teachers: Vec<AbsentTeacherInfo>,
    pub all_teachers: Vec<Teacher>,
    pub timetable_for_day: Vec<TimetableEntry>,
}

impl OracleRequest {
    /// Les absents hors roster sont ignorés (la session les rejette en amont).
    pub fn build(store: &TimetableStore, day: Day, absent: &[AbsentTeacher]) -> Self {
        let absent_teachers = absent
            .iter()
            .filter_map(|a| {
                let teacher = store.find_teacher(&a.teacher_id)?;
                let reason = a.reason.trim();
                Some(AbsentTeacherInfo {
                    teacher_id: teacher.id.clone(),
                    teacher_name: teacher.name.clone(),
                    reason: if reason.is_empty() {
                        UNSTATED_REASON.to_string()
                    } else {
                        reason.to_string()
                    },
                })
            })
            .collect();
        Self {
            absence_day: day,
            absent_teachers,
            all_teachers: store.teachers().to_vec(),
            timetable_for_day: store.entries_for_day(day).cloned().collect(),
        }
    }
}

/// Source de propositions. Un seul aller-retour par demande de plan.
pub trait Oracle {
    fn propose(&self, request: &OracleRequest) -> Result<Vec<ProposedAssignment>, OracleError>;
}

impl<F> Oracle for F
where
    F: Fn(&OracleRequest) -> Result<Vec<ProposedAssignment>, OracleError>,
{
    fn propose(&self, request: &OracleRequest) -> Result<Vec<ProposedAssignment>, OracleError> {
        self(request)
    }
}

/// Parse la réponse brute ; un seul enregistrement invalide rejette le tout.
pub fn parse_proposals(raw: &str) -> Result<Vec<ProposedAssignment>, OracleError> {
    let records: Vec<AssignmentRecord> = serde_json::from_str(raw.trim())
        .map_err(|e| OracleError::Malformed(e.to_string()))?;
    records
        .into_iter()
        .enumerate()
        .map(|(i, rec)| {
            ProposedAssignment::try_from(rec)
                .map_err(|e| OracleError::Malformed(format!("record {i}: {e}")))
        })
        .collect()
}

/// Réponse pré-enregistrée sur disque.
#[derive(Debug, Clone)]
pub struct FileOracle {
    path: PathBuf,
}

impl FileOracle {
    pub fn new<P: AsRef<Path>>(path: P) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
        }
    }
}

impl Oracle for FileOracle {
    fn propose(&self, _request: &OracleRequest) -> Result<Vec<ProposedAssignment>, OracleError> {
        let raw = fs::read_to_string(&self.path).map_err(|e| {
            OracleError::Unavailable(format!("reading {}: {e}", self.path.display()))
        })?;
        parse_proposals(&raw)
    }
}

/// Programme externe : requête JSON sur stdin, réponse JSON sur stdout.
#[derive(Debug, Clone)]
pub struct CommandOracle {
    program: String,
    args: Vec<String>,
}

impl CommandOracle {
    pub fn new<P: Into<String>>(program: P, args: Vec<String>) -> Self {
        Self {
            program: program.into(),
            args,
        }
    }
}

impl Oracle for CommandOracle {
    fn propose(&self, request: &OracleRequest) -> Result<Vec<ProposedAssignment>, OracleError> {
        let body = serde_json::to_vec(request)
            .map_err(|e| OracleError::Unavailable(format!("encoding request: {e}")))?;

        let mut child = Command::new(&self.program)
            .args(&self.args)
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .spawn()
            .map_err(|e| OracleError::Unavailable(format!("spawning {}: {e}", self.program)))?;

        if let Some(mut stdin) = child.stdin.take() {
            if let Err(e) = stdin.write_all(&body) {
                // le processus n'a pas lu la requête : on ne le laisse pas orphelin
                let _ = child.kill();
                let _ = child.wait();
                return Err(OracleError::Unavailable(format!("writing request: {e}")));
            }
        }

        let output = child
            .wait_with_output()
            .map_err(|e| OracleError::Unavailable(format!("waiting for {}: {e}", self.program)))?;
        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(OracleError::Unavailable(format!(
                "{} exited with {}: {}",
                self.program,
                output.status,
                stderr.trim()
            )));
        }
        debug!(program = %self.program, bytes = output.stdout.len(), "oracle responded");

        let raw = String::from_utf8(output.stdout)
            .map_err(|e| OracleError::Malformed(format!("response is not UTF-8: {e}")))?;
        parse_proposals(&raw)
    }
}
