use crate::model::{GuardId, NightWindow, PostId, ScheduleRequest, ShiftLengths};
use crate::scheduler::GuardState;
use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashSet};
use uuid::Uuid;

/// Instantané complet d'un planner après résolution : ordre courant des
/// files par poste, compteurs par garde, et la configuration qui les a
/// produits. C'est une valeur sérialisable que l'appelant conserve où il
/// veut ; le moteur lui-même ne stocke rien.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlannerState {
    pub guard_queues: BTreeMap<PostId, Vec<GuardId>>,
    pub guard_states: BTreeMap<GuardId, GuardState>,
    pub metadata: StateMetadata,
}

/// Configuration et repères d'un instantané, nécessaires à sa reprise.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StateMetadata {
    pub snapshot_id: String,
    #[serde(with = "crate::model::isodt")]
    pub saved_at: NaiveDateTime,
    /// Fin du dernier horizon planifié ; la reprise repart de là.
    #[serde(with = "crate::model::isodt")]
    pub last_scheduled_end: NaiveDateTime,
    /// Effectif dans l'ordre d'entrée d'origine (l'ordre d'équité initial).
    pub guards: Vec<GuardId>,
    pub posts: Vec<PostId>,
    pub shift_lengths: ShiftLengths,
    pub night_time_range: NightWindow,
    pub max_consecutive_nights: u32,
}

impl PlannerState {
    pub(crate) fn capture(
        request: &ScheduleRequest,
        guard_queues: BTreeMap<PostId, Vec<GuardId>>,
        guard_states: BTreeMap<GuardId, GuardState>,
        now: NaiveDateTime,
    ) -> Self {
        Self {
            guard_queues,
            guard_states,
            metadata: StateMetadata {
                snapshot_id: Uuid::new_v4().to_string(),
                saved_at: now,
                last_scheduled_end: request.schedule_end,
                guards: request.guards.clone(),
                posts: request.posts.clone(),
                shift_lengths: request.shift_lengths,
                night_time_range: request.night_time_range,
                max_consecutive_nights: request.max_consecutive_nights,
            },
        }
    }

    /// Un instantané n'est repris que sur un effectif et des postes
    /// identiques (l'ordre est indifférent pour la comparaison).
    pub fn compatible_with(&self, guards: &[GuardId], posts: &[PostId]) -> bool {
        let saved_guards: HashSet<&GuardId> = self.metadata.guards.iter().collect();
        let saved_posts: HashSet<&PostId> = self.metadata.posts.iter().collect();
        let wanted_guards: HashSet<&GuardId> = guards.iter().collect();
        let wanted_posts: HashSet<&PostId> = posts.iter().collect();
        saved_guards == wanted_guards && saved_posts == wanted_posts
    }
}
