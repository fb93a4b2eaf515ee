use chrono::{Datelike, NaiveDate, NaiveTime, Weekday};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::fmt;
use std::str::FromStr;
use uuid::Uuid;

/// Identifiant réservé des lignes sans remplaçant (saisie libre).
pub const SENTINEL_ID: &str = "OTHER";
/// Ancien encodage du même marqueur, accepté en lecture.
pub const LEGACY_SENTINEL_ID: &str = "LAIN_LAIN";

pub(crate) fn is_sentinel_id(raw: &str) -> bool {
    raw == SENTINEL_ID || raw == LEGACY_SENTINEL_ID
}

/// Identifiant fort pour Teacher
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TeacherId(String);

impl TeacherId {
    pub fn new<S: AsRef<str>>(s: S) -> Self {
        Self(s.as_ref().trim().to_owned())
    }
    pub fn as_str(&self) -> &str {
        &self.0
    }
    /// Vrai si l'id entre en collision avec le marqueur "sans remplaçant".
    pub fn is_reserved(&self) -> bool {
        is_sentinel_id(&self.0)
    }
}

impl fmt::Display for TeacherId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Enseignant du roster (immuable pendant une session)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Teacher {
    pub id: TeacherId,
    pub name: String,
}

impl Teacher {
    pub fn new<I: AsRef<str>, N: Into<String>>(id: I, name: N) -> Self {
        Self {
            id: TeacherId::new(id),
            name: name.into(),
        }
    }
}

/// Jour d'école. Sérialisé avec le nom en majuscules utilisé par l'emploi du temps.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum Day {
    Isnin,
    Selasa,
    Rabu,
    Khamis,
    Jumaat,
}

impl Day {
    pub const ALL: [Day; 5] = [Day::Isnin, Day::Selasa, Day::Rabu, Day::Khamis, Day::Jumaat];

    pub fn as_str(&self) -> &'static str {
        match self {
            Day::Isnin => "ISNIN",
            Day::Selasa => "SELASA",
            Day::Rabu => "RABU",
            Day::Khamis => "KHAMIS",
            Day::Jumaat => "JUMAAT",
        }
    }

    /// Jour d'école d'une date calendaire ; `None` le week-end.
    pub fn from_date(date: NaiveDate) -> Option<Self> {
        match date.weekday() {
            Weekday::Mon => Some(Day::Isnin),
            Weekday::Tue => Some(Day::Selasa),
            Weekday::Wed => Some(Day::Rabu),
            Weekday::Thu => Some(Day::Khamis),
            Weekday::Fri => Some(Day::Jumaat),
            Weekday::Sat | Weekday::Sun => None,
        }
    }
}

impl fmt::Display for Day {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Day {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim();
        Day::ALL
            .into_iter()
            .find(|d| d.as_str().eq_ignore_ascii_case(wanted))
            .ok_or_else(|| format!("unknown school day: {wanted}"))
    }
}

impl TryFrom<String> for Day {
    type Error = String;
    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<Day> for String {
    fn from(day: Day) -> Self {
        day.as_str().to_string()
    }
}

/// Créneau horaire `HHMM-HHMM`. L'ordre est celui des heures de début,
/// jamais l'ordre lexical de la chaîne.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct TimeSlot {
    start: NaiveTime,
    end: NaiveTime,
}

impl TimeSlot {
    /// Crée un créneau en validant que `end > start`.
    pub fn new(start: NaiveTime, end: NaiveTime) -> Result<Self, String> {
        if end <= start {
            return Err("time slot end must be after start".to_string());
        }
        Ok(Self { start, end })
    }

    pub fn start(&self) -> NaiveTime {
        self.start
    }
    pub fn end(&self) -> NaiveTime {
        self.end
    }

    /// Durée en minutes.
    pub fn duration_minutes(&self) -> i64 {
        (self.end - self.start).num_minutes()
    }
}

impl fmt::Display for TimeSlot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}-{}", self.start.format("%H%M"), self.end.format("%H%M"))
    }
}

impl FromStr for TimeSlot {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let raw = s.trim();
        let (start, end) = raw
            .split_once('-')
            .ok_or_else(|| format!("time slot must look like HHMM-HHMM: {raw}"))?;
        let start = parse_hhmm(start).ok_or_else(|| format!("invalid slot start: {raw}"))?;
        let end = parse_hhmm(end).ok_or_else(|| format!("invalid slot end: {raw}"))?;
        TimeSlot::new(start, end)
    }
}

fn parse_hhmm(raw: &str) -> Option<NaiveTime> {
    let raw = raw.trim();
    if raw.len() != 4 || !raw.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    NaiveTime::parse_from_str(raw, "%H%M").ok()
}

impl TryFrom<String> for TimeSlot {
    type Error = String;
    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<TimeSlot> for String {
    fn from(slot: TimeSlot) -> Self {
        slot.to_string()
    }
}

/// Période régulière de l'emploi du temps hebdomadaire
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TimetableEntry {
    pub day: Day,
    #[serde(rename = "time")]
    pub time_slot: TimeSlot,
    #[serde(rename = "class")]
    pub class_name: String,
    pub subject: String,
    pub teacher_id: TeacherId,
}

/// Enseignant absent pour la journée traitée
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AbsentTeacher {
    pub teacher_id: TeacherId,
    #[serde(default)]
    pub reason: String,
}

impl AbsentTeacher {
    pub fn new<I: AsRef<str>, R: Into<String>>(teacher_id: I, reason: R) -> Self {
        Self {
            teacher_id: TeacherId::new(teacher_id),
            reason: reason.into(),
        }
    }
}

/// Remplaçant d'une ligne : un enseignant du roster, ou une saisie libre.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Substitute {
    Assigned { id: TeacherId, name: String },
    Unresolved { name: String },
}

impl Substitute {
    pub fn assigned(teacher: &Teacher) -> Self {
        Substitute::Assigned {
            id: teacher.id.clone(),
            name: teacher.name.clone(),
        }
    }

    pub fn unresolved<N: Into<String>>(name: N) -> Self {
        Substitute::Unresolved { name: name.into() }
    }

    pub fn teacher_id(&self) -> Option<&TeacherId> {
        match self {
            Substitute::Assigned { id, .. } => Some(id),
            Substitute::Unresolved { .. } => None,
        }
    }

    pub fn name(&self) -> &str {
        match self {
            Substitute::Assigned { name, .. } | Substitute::Unresolved { name } => name,
        }
    }

    pub fn is_unresolved(&self) -> bool {
        matches!(self, Substitute::Unresolved { .. })
    }

    /// Id tel qu'il circule en JSON/CSV.
    pub fn wire_id(&self) -> &str {
        match self {
            Substitute::Assigned { id, .. } => id.as_str(),
            Substitute::Unresolved { .. } => SENTINEL_ID,
        }
    }

    fn from_wire(id: &str, name: String) -> Result<Self, String> {
        let id = id.trim();
        if id.is_empty() {
            return Err("empty substituteTeacherId".to_string());
        }
        if is_sentinel_id(id) {
            return Ok(Substitute::Unresolved { name });
        }
        Ok(Substitute::Assigned {
            id: TeacherId::new(id),
            name,
        })
    }
}

/// Origine d'une ligne du plan final (sert au choix de la justification).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum Provenance {
    #[default]
    Proposed,
    Repaired,
    Unresolved,
    Manual,
}

/// Enregistrement plat, format d'échange avec l'oracle et d'export du plan.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AssignmentRecord {
    pub day: String,
    pub time: String,
    pub class: String,
    pub subject: String,
    pub absent_teacher_name: String,
    pub substitute_teacher_id: String,
    pub substitute_teacher_name: String,
    pub justification: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub provenance: Option<Provenance>,
}

/// Proposition (non fiable) de l'oracle pour une période libérée
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "AssignmentRecord", into = "AssignmentRecord")]
pub struct ProposedAssignment {
    pub day: Day,
    pub time_slot: TimeSlot,
    pub class_name: String,
    pub subject: String,
    pub absent_teacher_name: String,
    pub substitute: Substitute,
    pub justification: String,
}

impl TryFrom<AssignmentRecord> for ProposedAssignment {
    type Error = String;

    fn try_from(rec: AssignmentRecord) -> Result<Self, Self::Error> {
        let class_name = rec.class.trim().to_string();
        if class_name.is_empty() {
            return Err("empty class".to_string());
        }
        Ok(Self {
            day: rec.day.parse()?,
            time_slot: rec.time.parse()?,
            class_name,
            subject: rec.subject.trim().to_string(),
            absent_teacher_name: rec.absent_teacher_name,
            substitute: Substitute::from_wire(&rec.substitute_teacher_id, rec.substitute_teacher_name)?,
            justification: rec.justification,
        })
    }
}

impl From<ProposedAssignment> for AssignmentRecord {
    fn from(p: ProposedAssignment) -> Self {
        AssignmentRecord {
            day: p.day.to_string(),
            time: p.time_slot.to_string(),
            class: p.class_name,
            subject: p.subject,
            absent_teacher_name: p.absent_teacher_name,
            substitute_teacher_id: p.substitute.wire_id().to_string(),
            substitute_teacher_name: p.substitute.name().to_string(),
            justification: p.justification,
            provenance: None,
        }
    }
}

/// Ligne du plan final, cohérente avec les contraintes
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "AssignmentRecord", into = "AssignmentRecord")]
pub struct FinalAssignment {
    pub day: Day,
    pub time_slot: TimeSlot,
    pub class_name: String,
    pub subject: String,
    pub absent_teacher_name: String,
    pub substitute: Substitute,
    pub justification: String,
    pub provenance: Provenance,
}

impl FinalAssignment {
    /// Proposition gardée telle quelle.
    pub fn kept(p: ProposedAssignment) -> Self {
        Self {
            day: p.day,
            time_slot: p.time_slot,
            class_name: p.class_name,
            subject: p.subject,
            absent_teacher_name: p.absent_teacher_name,
            substitute: p.substitute,
            justification: p.justification,
            provenance: Provenance::Proposed,
        }
    }

    /// Proposition dont seuls le remplaçant et la justification changent.
    pub fn replaced<J: Into<String>>(
        p: ProposedAssignment,
        substitute: Substitute,
        justification: J,
        provenance: Provenance,
    ) -> Self {
        Self {
            substitute,
            justification: justification.into(),
            provenance,
            ..Self::kept(p)
        }
    }
}

impl TryFrom<AssignmentRecord> for FinalAssignment {
    type Error = String;

    fn try_from(mut rec: AssignmentRecord) -> Result<Self, Self::Error> {
        let provenance = rec.provenance.take().unwrap_or_default();
        let proposal = ProposedAssignment::try_from(rec)?;
        Ok(Self {
            provenance,
            ..Self::kept(proposal)
        })
    }
}

impl From<FinalAssignment> for AssignmentRecord {
    fn from(a: FinalAssignment) -> Self {
        AssignmentRecord {
            day: a.day.to_string(),
            time: a.time_slot.to_string(),
            class: a.class_name,
            subject: a.subject,
            absent_teacher_name: a.absent_teacher_name,
            substitute_teacher_id: a.substitute.wire_id().to_string(),
            substitute_teacher_name: a.substitute.name().to_string(),
            justification: a.justification,
            provenance: Some(a.provenance),
        }
    }
}

/// Identifiant fort pour Plan
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PlanId(Uuid);

impl PlanId {
    pub fn new(id: Uuid) -> Self {
        Self(id)
    }
    pub fn random() -> Self {
        Self(Uuid::new_v4())
    }
    pub fn as_uuid(&self) -> &Uuid {
        &self.0
    }
}

impl fmt::Display for PlanId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(&self.0, f)
    }
}

/// Plan de remplacement d'une journée. Les éditions produisent un nouveau plan.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Plan {
    pub id: PlanId,
    pub day: Day,
    pub absent: Vec<AbsentTeacher>,
    pub assignments: Vec<FinalAssignment>,
    #[serde(default)]
    pub revision: u32,
    /// Date calendaire couverte, quand le plan a été demandé pour une date.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub date: Option<NaiveDate>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub prepared_by: Option<String>,
}

impl Plan {
    pub fn new(day: Day, absent: Vec<AbsentTeacher>, assignments: Vec<FinalAssignment>) -> Self {
        Self {
            id: PlanId::random(),
            day,
            absent,
            assignments,
            revision: 0,
            date: None,
            prepared_by: None,
        }
    }

    pub fn absent_ids(&self) -> HashSet<TeacherId> {
        self.absent.iter().map(|a| a.teacher_id.clone()).collect()
    }

    /// Remplaçants déjà engagés sur `slot`, hors ligne `except` et hors saisies libres.
    pub fn committed_at(&self, slot: TimeSlot, except: Option<usize>) -> HashSet<TeacherId> {
        self.assignments
            .iter()
            .enumerate()
            .filter(|(idx, a)| a.time_slot == slot && Some(*idx) != except)
            .filter_map(|(_, a)| a.substitute.teacher_id().cloned())
            .collect()
    }

    pub fn unresolved_count(&self) -> usize {
        self.assignments
            .iter()
            .filter(|a| a.substitute.is_unresolved())
            .count()
    }
}
