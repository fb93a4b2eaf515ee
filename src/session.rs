use crate::model::{AbsentTeacher, Day, Plan, Teacher};
use chrono::NaiveDate;
use crate::oracle::{Oracle, OracleError, OracleRequest};
use crate::scheduler::{SchedError, Scheduler, Selection};
use std::collections::HashSet;
use tracing::{info, warn};

/// Session de résolution : un plan courant, remplacé en bloc ou édité ligne par ligne.
#[derive(Debug)]
pub struct Session<'a> {
    scheduler: Scheduler<'a>,
    plan: Option<Plan>,
    prepared_by: Option<String>,
}

impl<'a> Session<'a> {
    pub fn new(scheduler: Scheduler<'a>) -> Self {
        Self {
            scheduler,
            plan: None,
            prepared_by: None,
        }
    }

    /// Nom de la personne qui prépare les plans de cette session.
    pub fn prepared_by<S: AsRef<str>>(mut self, name: S) -> Self {
        let name = name.as_ref().trim();
        self.prepared_by = (!name.is_empty()).then(|| name.to_string());
        self
    }

    /// Reprend un plan existant (ex. relu depuis un fichier).
    pub fn with_plan(scheduler: Scheduler<'a>, plan: Plan) -> Self {
        Self {
            scheduler,
            plan: Some(plan),
            prepared_by: None,
        }
    }

    pub fn scheduler(&self) -> &Scheduler<'a> {
        &self.scheduler
    }

    pub fn plan(&self) -> Option<&Plan> {
        self.plan.as_ref()
    }

    pub fn into_plan(self) -> Option<Plan> {
        self.plan
    }

    /// Demande un plan à l'oracle puis le résout. En cas d'échec, le plan
    /// précédent reste en place.
    pub fn request_plan(
        &mut self,
        oracle: &dyn Oracle,
        day: Day,
        absent: Vec<AbsentTeacher>,
    ) -> Result<&Plan, SchedError> {
        self.build_plan(oracle, day, None, absent)
    }

    /// Comme `request_plan`, pour une date calendaire (refusée le week-end).
    pub fn request_plan_on(
        &mut self,
        oracle: &dyn Oracle,
        date: NaiveDate,
        absent: Vec<AbsentTeacher>,
    ) -> Result<&Plan, SchedError> {
        let day = Day::from_date(date).ok_or(SchedError::NotASchoolDay(date))?;
        self.build_plan(oracle, day, Some(date), absent)
    }

    fn build_plan(
        &mut self,
        oracle: &dyn Oracle,
        day: Day,
        date: Option<NaiveDate>,
        absent: Vec<AbsentTeacher>,
    ) -> Result<&Plan, SchedError> {
        validate_absences(self.scheduler.store().teachers(), &absent)?;

        let store = self.scheduler.store();
        let absent_ids: HashSet<_> = absent.iter().map(|a| a.teacher_id.clone()).collect();
        let vacated = store.vacated(day, &absent_ids).len();

        let request = OracleRequest::build(store, day, &absent);
        let proposals = oracle.propose(&request).map_err(|e| {
            warn!(day = %day, error = %e, "oracle request failed, keeping previous plan");
            e
        })?;
        if proposals.is_empty() && vacated > 0 {
            warn!(day = %day, vacated, "oracle returned no proposal");
            return Err(OracleError::Malformed("empty response".to_string()).into());
        }

        let assignments = self.scheduler.resolve(day, &absent, proposals);
        let mut plan = Plan::new(day, absent, assignments);
        plan.date = date;
        plan.prepared_by = self.prepared_by.clone();
        info!(plan = %plan.id, day = %day, vacated, rows = plan.assignments.len(), "new plan");
        Ok(&*self.plan.insert(plan))
    }

    pub fn candidates(&self, index: usize) -> Result<Vec<&'a Teacher>, SchedError> {
        let plan = self.plan.as_ref().ok_or(SchedError::NoPlan)?;
        self.scheduler.candidates(plan, index)
    }

    /// Renvoie `true` si le plan a changé.
    pub fn set_substitute(&mut self, index: usize, selection: &Selection) -> Result<bool, SchedError> {
        let plan = self.plan.as_ref().ok_or(SchedError::NoPlan)?;
        let next = self.scheduler.set_substitute(plan, index, selection);
        Ok(self.commit(next))
    }

    pub fn set_custom_name(&mut self, index: usize, name: &str) -> Result<bool, SchedError> {
        let plan = self.plan.as_ref().ok_or(SchedError::NoPlan)?;
        let next = self.scheduler.set_custom_name(plan, index, name);
        Ok(self.commit(next))
    }

    fn commit(&mut self, next: Plan) -> bool {
        let changed = self.plan.as_ref().map(|p| p.revision) != Some(next.revision);
        if changed {
            self.plan = Some(next);
        }
        changed
    }
}

/// Refuse une liste d'absents vide, en double ou hors roster.
pub fn validate_absences(roster: &[Teacher], absent: &[AbsentTeacher]) -> Result<(), SchedError> {
    if absent.is_empty() {
        return Err(SchedError::NoAbsentTeachers);
    }
    let mut seen = HashSet::new();
    for a in absent {
        if !roster.iter().any(|t| t.id == a.teacher_id) {
            return Err(SchedError::UnknownTeacher(a.teacher_id.to_string()));
        }
        if !seen.insert(&a.teacher_id) {
            return Err(SchedError::DuplicateAbsence(a.teacher_id.to_string()));
        }
    }
    Ok(())
}
