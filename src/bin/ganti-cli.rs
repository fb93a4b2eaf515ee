#![forbid(unsafe_code)]
use anyhow::{bail, Context, Result};
use chrono::NaiveDate;
use clap::{Parser, Subcommand};
use ganti::{
    grid, io,
    model::{AbsentTeacher, Day, Plan, TeacherId, TimeSlot},
    oracle::{CommandOracle, FileOracle, Oracle},
    report::{ReportRenderer, TextReport},
    scheduler::{ResolveOptions, SchedError, Scheduler, Selection},
    session::Session,
    storage::{JsonStorage, Storage},
    timetable::TimetableStore,
};
use std::collections::HashSet;
#[cfg(feature = "logging")]
use tracing_subscriber::{fmt::Subscriber, EnvFilter};

/// CLI d'affectation des remplaçants (sans base de données)
#[derive(Parser, Debug)]
#[command(author, version, about)]
struct Cli {
    /// Active les logs (feature `logging`)
    #[arg(long, global = true)]
    log: bool,

    /// Roster CSV `id,name` (avec --timetable)
    #[arg(long, global = true)]
    teachers: Option<String>,

    /// Emploi du temps CSV `day,time,class,subject,teacher_id`
    #[arg(long, global = true)]
    timetable: Option<String>,

    /// Emploi du temps au format grille JSON
    #[arg(long, global = true, default_value = "data/timetable-grid.json")]
    grid: String,

    #[command(subcommand)]
    cmd: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Lister le catalogue de créneaux
    Slots,

    /// Enseignants libres pour un créneau
    Available {
        #[arg(long)]
        day: String,
        /// HHMM-HHMM
        #[arg(long)]
        time: String,
        /// liste "ID1,ID2,..."
        #[arg(long)]
        absent: Option<String>,
        /// liste "ID1,ID2,..." déjà engagés sur ce créneau
        #[arg(long)]
        committed: Option<String>,
    },

    /// Demander un plan à l'oracle et le résoudre
    Resolve {
        #[arg(long, conflicts_with = "date")]
        day: Option<String>,
        /// YYYY-MM-DD, converti en jour d'école
        #[arg(long)]
        date: Option<String>,
        /// ID[:raison], répétable
        #[arg(long)]
        absent: Vec<String>,
        /// CSV `teacher_id[,reason]`
        #[arg(long)]
        absent_csv: Option<String>,
        /// Réponse de l'oracle pré-enregistrée (JSON)
        #[arg(long, conflicts_with = "oracle_cmd")]
        proposals: Option<String>,
        /// Programme oracle : requête sur stdin, réponse sur stdout
        #[arg(long)]
        oracle_cmd: Option<String>,
        #[arg(long)]
        oracle_arg: Vec<String>,
        /// Ne répare que les collisions entre propositions
        #[arg(long)]
        strict_legacy: bool,
        /// Couvre aussi les périodes oubliées par l'oracle
        #[arg(long)]
        fill_omitted: bool,
        /// Nom affiché sous "Prepared by" dans le rapport
        #[arg(long)]
        prepared_by: Option<String>,
        #[arg(long)]
        out: String,
        #[arg(long)]
        csv: Option<String>,
    },

    /// Changer le remplaçant d'une ligne (ID ou OTHER)
    Set {
        #[arg(long)]
        plan: String,
        /// Numéro de ligne affiché par `report` (à partir de 1)
        #[arg(long)]
        index: usize,
        #[arg(long)]
        teacher: String,
        /// Accepte un enseignant hors candidats (absent ou occupé)
        #[arg(long)]
        force: bool,
    },

    /// Nommer un remplaçant hors roster sur une ligne OTHER
    Name {
        #[arg(long)]
        plan: String,
        #[arg(long)]
        index: usize,
        #[arg(long)]
        name: String,
    },

    /// Candidats pour une ligne
    Candidates {
        #[arg(long)]
        plan: String,
        #[arg(long)]
        index: usize,
    },

    /// Vérifier les violations d'un plan
    Check {
        #[arg(long)]
        plan: String,
        /// Export CSV des violations (optionnel)
        #[arg(long)]
        report: Option<String>,
    },

    /// Rapport texte du plan
    Report {
        #[arg(long)]
        plan: String,
        /// Fichier de sortie (texte brut)
        #[arg(long)]
        out: Option<String>,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    #[cfg(feature = "logging")]
    if cli.log {
        let _ = Subscriber::builder()
            .with_env_filter(EnvFilter::from_default_env())
            .try_init();
    }

    let store = load_store(&cli)?;

    let code = match cli.cmd {
        Commands::Slots => {
            for slot in store.slots() {
                println!("{slot}");
            }
            0
        }
        Commands::Available {
            day,
            time,
            absent,
            committed,
        } => {
            let day = parse_day(&day)?;
            let slot = parse_slot(&time)?;
            let absent = id_set(absent.as_deref());
            let committed = id_set(committed.as_deref());
            let scheduler = Scheduler::new(&store);
            for t in scheduler.available(day, slot, &absent, &committed)? {
                println!("{} | {}", t.id, t.name);
            }
            0
        }
        Commands::Resolve {
            day,
            date,
            absent,
            absent_csv,
            proposals,
            oracle_cmd,
            oracle_arg,
            strict_legacy,
            fill_omitted,
            prepared_by,
            out,
            csv,
        } => {
            let day = day.as_deref().map(parse_day).transpose()?;
            let date = date
                .map(|d| {
                    NaiveDate::parse_from_str(&d, "%Y-%m-%d")
                        .with_context(|| format!("invalid date: {d}"))
                })
                .transpose()?;

            let mut absences: Vec<AbsentTeacher> = absent
                .iter()
                .map(|raw| match raw.split_once(':') {
                    Some((id, reason)) => AbsentTeacher::new(id, reason.trim()),
                    None => AbsentTeacher::new(raw, ""),
                })
                .collect();
            if let Some(path) = absent_csv {
                absences.extend(io::import_absences_csv(path)?);
            }

            let oracle: Box<dyn Oracle> = match (proposals, oracle_cmd) {
                (Some(path), _) => Box::new(FileOracle::new(path)),
                (None, Some(cmd)) => Box::new(CommandOracle::new(cmd, oracle_arg)),
                (None, None) => bail!("--proposals or --oracle-cmd is required"),
            };

            let mut opts = if strict_legacy {
                ResolveOptions::collisions_only()
            } else {
                ResolveOptions::default()
            };
            opts.fill_omitted = fill_omitted;

            let mut session = Session::new(Scheduler::with_options(&store, opts));
            if let Some(name) = prepared_by {
                session = session.prepared_by(name);
            }
            let plan = match (day, date) {
                (Some(day), _) => session.request_plan(oracle.as_ref(), day, absences)?,
                (None, Some(date)) => session.request_plan_on(oracle.as_ref(), date, absences)?,
                (None, None) => bail!("--day or --date is required"),
            };
            JsonStorage::open(&out).save(plan)?;
            if let Some(path) = csv {
                io::export_plan_csv(path, plan)?;
            }
            print_plan(plan);

            let unresolved = plan.unresolved_count();
            if unresolved > 0 {
                eprintln!("{unresolved} period(s) without substitute");
                // Code 2 = WARNING/INCOMPLETE
                2
            } else {
                0
            }
        }
        Commands::Set {
            plan,
            index,
            teacher,
            force,
        } => {
            let opts = ResolveOptions {
                edits_from_candidates_only: !force,
                ..ResolveOptions::default()
            };
            let storage = JsonStorage::open(&plan);
            let mut session =
                Session::with_plan(Scheduler::with_options(&store, opts), storage.load()?);
            let changed = session.set_substitute(row_index(index)?, &Selection::parse(&teacher))?;
            save_if_changed(&storage, &session, changed)?;
            0
        }
        Commands::Name { plan, index, name } => {
            let storage = JsonStorage::open(&plan);
            let mut session = Session::with_plan(Scheduler::new(&store), storage.load()?);
            let changed = session.set_custom_name(row_index(index)?, &name)?;
            save_if_changed(&storage, &session, changed)?;
            0
        }
        Commands::Candidates { plan, index } => {
            let plan = JsonStorage::open(&plan).load()?;
            let scheduler = Scheduler::new(&store);
            for t in scheduler.candidates(&plan, row_index(index)?)? {
                println!("{} | {}", t.id, t.name);
            }
            0
        }
        Commands::Check { plan, report } => {
            let plan = JsonStorage::open(&plan).load()?;
            let conflicts = Scheduler::new(&store).detect_conflicts(&plan);
            if conflicts.is_empty() {
                println!("OK: no conflicts");
                0
            } else {
                eprintln!("Found {} conflict(s)", conflicts.len());
                for c in &conflicts {
                    eprintln!(
                        "row {} | {} | {}",
                        c.row + 1,
                        c.kind.as_str(),
                        c.teacher.as_ref().map(TeacherId::as_str).unwrap_or("-")
                    );
                }
                if let Some(path) = report {
                    let mut num = itoa::Buffer::new();
                    let mut other = itoa::Buffer::new();
                    let mut w = csv::Writer::from_path(path)?;
                    w.write_record(["row", "other_row", "teacher_id", "kind"])?;
                    for c in &conflicts {
                        let other_row = match c.other_row {
                            Some(r) => other.format(r + 1),
                            None => "",
                        };
                        w.write_record([
                            num.format(c.row + 1),
                            other_row,
                            c.teacher.as_ref().map(TeacherId::as_str).unwrap_or(""),
                            c.kind.as_str(),
                        ])?;
                    }
                    w.flush()?;
                }
                // Code 2 = WARNING/INCOMPLETE
                2
            }
        }
        Commands::Report { plan, out } => {
            let plan = JsonStorage::open(&plan).load()?;
            let text = TextReport.render(&plan, &store);
            match out {
                Some(path) => {
                    std::fs::write(&path, text)?;
                    println!("Report written to {path}");
                }
                None => println!("{text}"),
            }
            0
        }
    };

    std::process::exit(code);
}

fn load_store(cli: &Cli) -> Result<TimetableStore> {
    match (&cli.teachers, &cli.timetable) {
        (Some(teachers), Some(timetable)) => {
            let teachers = io::import_teachers_csv(teachers)?;
            let entries = io::import_timetable_csv(timetable)?;
            Ok(TimetableStore::new(teachers, entries)?)
        }
        (None, Some(_)) => bail!("--timetable requires --teachers"),
        (Some(_), None) => bail!("--teachers requires --timetable"),
        (None, None) => grid::load_store_from_grid(&cli.grid),
    }
}

fn parse_day(raw: &str) -> Result<Day> {
    raw.parse::<Day>().map_err(anyhow::Error::msg)
}

fn parse_slot(raw: &str) -> Result<TimeSlot> {
    Ok(raw.parse::<TimeSlot>().map_err(SchedError::InvalidTimeSlot)?)
}

fn id_set(list: Option<&str>) -> HashSet<TeacherId> {
    list.unwrap_or("")
        .split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(TeacherId::new)
        .collect()
}

fn row_index(index: usize) -> Result<usize> {
    match index.checked_sub(1) {
        Some(i) => Ok(i),
        None => bail!("rows are numbered from 1"),
    }
}

fn save_if_changed(storage: &JsonStorage, session: &Session<'_>, changed: bool) -> Result<()> {
    let Some(plan) = session.plan() else {
        bail!("no plan loaded");
    };
    if changed {
        storage.save(plan)?;
        println!(
            "{} saved (revision {})",
            storage.path().display(),
            plan.revision
        );
    } else {
        println!("plan unchanged");
    }
    Ok(())
}

fn print_plan(plan: &Plan) {
    for (idx, a) in plan.assignments.iter().enumerate() {
        println!(
            "{:>2} | {} | {} | {} | {} → {}",
            idx + 1,
            a.time_slot,
            a.class_name,
            a.subject,
            a.absent_teacher_name,
            a.substitute.name()
        );
    }
}
