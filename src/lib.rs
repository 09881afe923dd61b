#![forbid(unsafe_code)]
//! Faction — moteur de planification de tours de garde (sans BD).
//!
//! - Files de rotation FIFO par poste, équité round-robin.
//! - Contraintes : indisponibilités, plafond de nuits consécutives.
//! - Échec net et diagnostiqué, jamais de planning partiel.
//! - Instants naïfs fournis par l'appelant ; E/S fichiers (JSON/CSV).

pub mod io;
pub mod model;
pub mod report;
pub mod scheduler;
pub mod state;
pub mod storage;
pub mod timegrid;

pub use io::ScheduleResponse;
pub use model::{
    parse_datetime, Assignment, GuardId, NightWindow, PostId, Schedule, ScheduleMetadata,
    ScheduleRequest, ShiftLengths, UnavailabilityWindow,
};
pub use report::{
    algorithm_summary, prepare_notice, work_balance, DutyNotice, GuardLoad, NoticeRenderer,
    TextNotice, WorkBalance,
};
pub use scheduler::{plan, GuardState, Planner, RotationQueue, SchedError, ShiftSlot};
pub use state::{PlannerState, StateMetadata};
pub use storage::{JsonStorage, SnapshotStore};
pub use timegrid::{check_half_hour, TimeCheck};
