use crate::model::{GuardId, PostId};
use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use thiserror::Error;

/// Compteurs glissants d'un garde, remis à neuf à chaque requête
/// (sauf reprise explicite depuis un instantané).
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct GuardState {
    /// Nuits consécutives déjà attribuées, remis à zéro par une relève de jour.
    pub consecutive_nights: u32,
    pub total_shifts: u32,
    pub total_hours: f64,
    #[serde(default)]
    pub last_shift_end: Option<NaiveDateTime>,
}

/// État initial injecté dans l'assembleur lors d'une reprise.
#[derive(Debug, Clone, Default)]
pub(crate) struct Seed {
    pub queues: BTreeMap<PostId, Vec<GuardId>>,
    pub states: BTreeMap<GuardId, GuardState>,
}

#[derive(Error, Debug)]
pub enum SchedError {
    #[error("invalid horizon: end must be after start")]
    InvalidHorizon,
    #[error("empty roster: at least one guard and one post are required")]
    EmptyRoster,
    #[error("duplicate guard: {0}")]
    DuplicateGuard(String),
    #[error("duplicate post: {0}")]
    DuplicatePost(String),
    #[error("invalid shift length: {0}")]
    InvalidShiftLength(&'static str),
    #[error("max_consecutive_nights must be at least 1")]
    InvalidNightCap,
    #[error("unavailability references unknown guard: {0}")]
    UnknownGuard(String),
    #[error("invalid unavailability window for guard {guard}: end must be after start")]
    InvalidWindow { guard: String },
    #[error("unfillable slot at post {post} ({start} -> {end}): every guard was rejected")]
    UnfillableSlot {
        post: PostId,
        start: NaiveDateTime,
        end: NaiveDateTime,
    },
    #[error("invalid queue order for post {post}: {detail}")]
    InvalidQueueOrder { post: String, detail: String },
    #[error("incompatible saved state: {0}")]
    IncompatibleState(String),
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}
