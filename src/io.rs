use crate::model::{AbsentTeacher, Day, Plan, Provenance, Teacher, TeacherId, TimeSlot, TimetableEntry};
use anyhow::{bail, Context};
use csv::{ReaderBuilder, WriterBuilder};
use std::fs;
use std::path::Path;

/// Import du roster depuis CSV: header `id,name`
pub fn import_teachers_csv<P: AsRef<Path>>(path: P) -> anyhow::Result<Vec<Teacher>> {
    let mut rdr = ReaderBuilder::new().has_headers(true).from_path(path)?;
    let mut out = Vec::new();
    for rec in rdr.records() {
        let rec = rec?;
        let id = rec.get(0).context("missing id")?.trim();
        let name = rec.get(1).context("missing name")?.trim();
        if id.is_empty() || name.is_empty() {
            bail!("invalid teacher row (empty)");
        }
        out.push(Teacher::new(id, name));
    }
    Ok(out)
}

/// Import de l'emploi du temps: header `day,time,class,subject,teacher_id`
pub fn import_timetable_csv<P: AsRef<Path>>(path: P) -> anyhow::Result<Vec<TimetableEntry>> {
    let mut rdr = ReaderBuilder::new().has_headers(true).from_path(path)?;
    let mut out = Vec::new();
    for (line, rec) in rdr.records().enumerate() {
        let rec = rec?;
        let row = line + 2;
        let day = rec.get(0).context("missing day")?;
        let time = rec.get(1).context("missing time")?;
        let class_name = rec.get(2).context("missing class")?.trim().to_string();
        let subject = rec.get(3).context("missing subject")?.trim().to_string();
        let teacher = rec.get(4).context("missing teacher_id")?.trim();
        if class_name.is_empty() || teacher.is_empty() {
            bail!("invalid timetable row {row} (empty class or teacher)");
        }
        out.push(TimetableEntry {
            day: day
                .parse::<Day>()
                .map_err(anyhow::Error::msg)
                .with_context(|| format!("timetable row {row}"))?,
            time_slot: time
                .parse::<TimeSlot>()
                .map_err(anyhow::Error::msg)
                .with_context(|| format!("timetable row {row}"))?,
            class_name,
            subject,
            teacher_id: TeacherId::new(teacher),
        });
    }
    Ok(out)
}

/// Import des absents: header `teacher_id[,reason]`
pub fn import_absences_csv<P: AsRef<Path>>(path: P) -> anyhow::Result<Vec<AbsentTeacher>> {
    let mut rdr = ReaderBuilder::new()
        .has_headers(true)
        .flexible(true)
        .from_path(path)?;
    let mut out = Vec::new();
    for rec in rdr.records() {
        let rec = rec?;
        let id = rec.get(0).context("missing teacher_id")?.trim();
        if id.is_empty() {
            bail!("invalid absence row (empty teacher_id)");
        }
        let reason = rec.get(1).unwrap_or("").trim();
        out.push(AbsentTeacher::new(id, reason));
    }
    Ok(out)
}

/// Export JSON du plan (jolie mise en forme)
pub fn export_plan_json<P: AsRef<Path>>(path: P, plan: &Plan) -> anyhow::Result<()> {
    let s = serde_json::to_string_pretty(plan)?;
    fs::write(path, s)?;
    Ok(())
}

/// Export CSV du plan: header
/// `no,day,time,class,subject,absent_teacher,substitute_id,substitute_name,justification,provenance`
pub fn export_plan_csv<P: AsRef<Path>>(path: P, plan: &Plan) -> anyhow::Result<()> {
    let mut w = WriterBuilder::new().has_headers(true).from_path(path)?;
    w.write_record([
        "no",
        "day",
        "time",
        "class",
        "subject",
        "absent_teacher",
        "substitute_id",
        "substitute_name",
        "justification",
        "provenance",
    ])?;
    let mut num = itoa::Buffer::new();
    for (idx, a) in plan.assignments.iter().enumerate() {
        let time = a.time_slot.to_string();
        let provenance = match a.provenance {
            Provenance::Proposed => "proposed",
            Provenance::Repaired => "repaired",
            Provenance::Unresolved => "unresolved",
            Provenance::Manual => "manual",
        };
        w.write_record([
            num.format(idx + 1),
            a.day.as_str(),
            time.as_str(),
            a.class_name.as_str(),
            a.subject.as_str(),
            a.absent_teacher_name.as_str(),
            a.substitute.wire_id(),
            a.substitute.name(),
            a.justification.as_str(),
            provenance,
        ])?;
    }
    w.flush()?;
    Ok(())
}
