use crate::model::{Day, Teacher, TeacherId, TimeSlot, TimetableEntry};
use crate::timetable::TimetableStore;
use anyhow::{bail, Context, Result};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fs;
use std::path::Path;
use tracing::debug;

/// Emploi du temps hebdomadaire au format grille : pour chaque jour et chaque
/// classe, une cellule `MATIÈRE/ID` par créneau du catalogue.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TimetableGrid {
    pub slots: Vec<TimeSlot>,
    pub teachers: Vec<Teacher>,
    #[serde(default)]
    pub days: BTreeMap<Day, BTreeMap<String, Vec<String>>>,
}

impl TimetableGrid {
    pub fn validate(&self) -> Result<()> {
        if self.slots.is_empty() {
            bail!("grid must define at least one time slot");
        }
        if self.teachers.is_empty() {
            bail!("grid must define at least one teacher");
        }
        for pair in self.slots.windows(2) {
            if pair[1] <= pair[0] {
                bail!("grid slots must be listed in time order ({} then {})", pair[0], pair[1]);
            }
        }
        for (day, classes) in &self.days {
            for (class, cells) in classes {
                if cells.len() > self.slots.len() {
                    bail!(
                        "{day} {class}: {} cells for {} slots",
                        cells.len(),
                        self.slots.len()
                    );
                }
            }
        }
        Ok(())
    }

    /// Aplatit la grille en entrées d'emploi du temps.
    pub fn entries(&self) -> Result<Vec<TimetableEntry>> {
        self.validate()?;
        let mut out = Vec::new();
        for (day, classes) in &self.days {
            for (class, cells) in classes {
                for (slot, cell) in self.slots.iter().zip(cells) {
                    let Some((subject, teacher)) = split_cell(cell) else {
                        if !cell.trim().is_empty() {
                            debug!(day = %day, class = %class, slot = %slot, cell = %cell, "skipping non-teaching cell");
                        }
                        continue;
                    };
                    out.push(TimetableEntry {
                        day: *day,
                        time_slot: *slot,
                        class_name: class.clone(),
                        subject: subject.to_string(),
                        teacher_id: TeacherId::new(teacher),
                    });
                }
            }
        }
        Ok(out)
    }

    pub fn into_store(self) -> Result<TimetableStore> {
        let entries = self.entries()?;
        TimetableStore::with_slots(self.teachers, entries, self.slots)
            .context("building timetable from grid")
    }
}

/// `BM/NS` -> (`BM`, `NS`). Le point est toléré comme séparateur (`PM.SD`).
/// Les cellules vides ou sans enseignant (`PH`) ne produisent rien.
fn split_cell(cell: &str) -> Option<(&str, &str)> {
    let cell = cell.trim();
    let (subject, teacher) = cell.split_once('/').or_else(|| cell.split_once('.'))?;
    let (subject, teacher) = (subject.trim(), teacher.trim());
    if subject.is_empty() || teacher.is_empty() {
        return None;
    }
    Some((subject, teacher))
}

pub fn load_grid_from_file<P: AsRef<Path>>(path: P) -> Result<TimetableGrid> {
    let path = path.as_ref();
    let data = fs::read(path).with_context(|| format!("reading grid {}", path.display()))?;
    let grid: TimetableGrid = serde_json::from_slice(&data)
        .with_context(|| format!("parsing grid {}", path.display()))?;
    grid.validate()?;
    Ok(grid)
}

pub fn load_store_from_grid<P: AsRef<Path>>(path: P) -> Result<TimetableStore> {
    load_grid_from_file(path)?.into_store()
}
