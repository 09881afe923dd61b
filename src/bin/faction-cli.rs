#![forbid(unsafe_code)]
use anyhow::Result;
use chrono::Local;
use clap::{Parser, Subcommand};
use faction::{
    io,
    model::{parse_datetime, GuardId, Schedule},
    report::{self, TextNotice},
    scheduler::{Planner, SchedError},
    storage::{JsonStorage, SnapshotStore},
    timegrid,
};
use std::collections::HashMap;
#[cfg(feature = "logging")]
use tracing_subscriber::{fmt::Subscriber, EnvFilter};

/// CLI minimaliste de planification de gardes (sans base de données)
#[derive(Parser, Debug)]
#[command(author, version, about)]
struct Cli {
    /// Active les logs (feature `logging`)
    #[arg(long, global = true)]
    log: bool,

    #[command(subcommand)]
    cmd: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Planifier à partir d'une requête JSON
    Plan {
        /// Fichier de requête (JSON)
        #[arg(long)]
        request: String,
        /// Export de la réponse (JSON)
        #[arg(long)]
        out_json: Option<String>,
        /// Export des relèves (CSV)
        #[arg(long)]
        out_csv: Option<String>,
        /// Sauvegarde de l'instantané du planner (JSON)
        #[arg(long)]
        state_out: Option<String>,
    },

    /// Prolonger un planning depuis un instantané sauvegardé
    Resume {
        /// Instantané du planner (JSON)
        #[arg(long)]
        state: String,
        /// Nouvelle fin d'horizon (ISO 8601 naïf)
        #[arg(long)]
        until: String,
        /// Indisponibilités supplémentaires (CSV `guard,unavailability`)
        #[arg(long)]
        unavailability_csv: Option<String>,
        /// Ramener les files à l'ordre d'entrée d'origine
        #[arg(long)]
        reset_queues: bool,
        #[arg(long)]
        out_json: Option<String>,
        #[arg(long)]
        out_csv: Option<String>,
        #[arg(long)]
        state_out: Option<String>,
    },

    /// Bilan de répartition du travail d'un planning
    Balance {
        /// Planning ou réponse (JSON)
        #[arg(long)]
        schedule: String,
        /// Requête d'origine, pour inclure les gardes jamais assignés
        #[arg(long)]
        request: Option<String>,
        /// Export du bilan (CSV)
        #[arg(long)]
        out_csv: Option<String>,
    },

    /// Générer l'avis de prochaine faction d'un garde
    Notify {
        #[arg(long)]
        schedule: String,
        #[arg(long)]
        guard: String,
        #[arg(long, default_value_t = 12)]
        hours_before: i64,
        /// Fichier de sortie (texte brut)
        #[arg(long)]
        out: String,
    },

    /// Vérifier qu'une heure HH:MM tombe sur la grille des demi-heures
    CheckTime { time: String },

    /// Décrire l'algorithme de planification
    Info,
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    #[cfg(feature = "logging")]
    if cli.log {
        let _ = Subscriber::builder()
            .with_env_filter(EnvFilter::from_default_env())
            .try_init();
    }

    let code = match cli.cmd {
        Commands::Plan {
            request,
            out_json,
            out_csv,
            state_out,
        } => {
            let req = io::load_request_json(&request)?;
            let planner = Planner::new(req)?;
            run_planner(&planner, out_json, out_csv, state_out)?
        }
        Commands::Resume {
            state,
            until,
            unavailability_csv,
            reset_queues,
            out_json,
            out_csv,
            state_out,
        } => {
            let saved = JsonStorage::open(&state)?.load()?;
            let until = parse_datetime(&until)?;
            let extra = match unavailability_csv {
                Some(path) => io::import_guards_csv(path)?.1,
                None => HashMap::new(),
            };
            let planner = Planner::resume(&saved, until, extra, reset_queues)?;
            run_planner(&planner, out_json, out_csv, state_out)?
        }
        Commands::Balance {
            schedule,
            request,
            out_csv,
        } => {
            let schedule = io::load_schedule_json(&schedule)?;
            let guards = match request {
                Some(path) => io::load_request_json(&path)?.guards,
                None => distinct_guards(&schedule),
            };
            let balance = report::work_balance(&schedule, &guards);
            print!("{}", report::render_balance(&balance));
            if let Some(path) = out_csv {
                io::export_balance_csv(path, &balance)?;
            }
            0
        }
        Commands::Notify {
            schedule,
            guard,
            hours_before,
            out,
        } => {
            let schedule = io::load_schedule_json(&schedule)?;
            let renderer = TextNotice;
            let notice = report::prepare_notice(
                &schedule,
                &GuardId::new(&guard),
                hours_before,
                Local::now().naive_local(),
                &renderer,
            )?;
            std::fs::write(&out, &notice.content)?;
            println!(
                "Avis généré pour {} (poste {}) à prévoir le {}",
                notice.guard,
                notice.post,
                notice.notice_at.format("%Y-%m-%d %H:%M")
            );
            0
        }
        Commands::CheckTime { time } => {
            let check = timegrid::check_half_hour(&time);
            if check.valid {
                println!("OK: {time}");
                0
            } else {
                if let Some(message) = &check.message {
                    eprintln!("{message}");
                }
                if let Some(closest) = &check.closest {
                    eprintln!("Heure valide la plus proche : {closest}");
                }
                2
            }
        }
        Commands::Info => {
            println!("{}", report::algorithm_summary());
            0
        }
    };

    std::process::exit(code);
}

fn run_planner(
    planner: &Planner,
    out_json: Option<String>,
    out_csv: Option<String>,
    state_out: Option<String>,
) -> Result<i32> {
    let now = Local::now().naive_local();
    let solved = if state_out.is_some() {
        planner
            .solve_with_state(now)
            .map(|(schedule, state)| (schedule, Some(state)))
    } else {
        planner.solve().map(|schedule| (schedule, None))
    };

    match solved {
        Ok((schedule, snapshot)) => {
            // impression compacte
            for a in &schedule.assignments {
                println!("{} | {} → {} | {}", a.post, a.start, a.end, a.guard);
            }
            println!(
                "{} relèves | {} gardes | {} postes | {:.1} h",
                schedule.metadata.total_assignments,
                schedule.metadata.unique_guards,
                schedule.metadata.unique_posts,
                schedule.metadata.schedule_duration_hours
            );
            if let Some(path) = out_csv {
                io::export_assignments_csv(path, &schedule)?;
            }
            if let Some(path) = out_json {
                io::export_response_json(path, &io::ScheduleResponse::from_result(Ok(schedule)))?;
            }
            if let (Some(path), Some(state)) = (state_out, snapshot) {
                JsonStorage::open(path)?.save(&state)?;
            }
            Ok(0)
        }
        Err(err @ SchedError::UnfillableSlot { .. }) => {
            eprintln!("échec de planification : {err}");
            if let Some(path) = out_json {
                io::export_response_json(path, &io::ScheduleResponse::from_result(Err(err)))?;
            }
            // Code 2 = contrainte insatisfiable, pas une erreur d'E/S
            Ok(2)
        }
        Err(err) => Err(err.into()),
    }
}

fn distinct_guards(schedule: &Schedule) -> Vec<GuardId> {
    let mut guards: Vec<GuardId> = Vec::new();
    for a in &schedule.assignments {
        if !guards.contains(&a.guard) {
            guards.push(a.guard.clone());
        }
    }
    guards
}
