mod assemble;
mod eligibility;
mod queue;
mod slots;
mod types;

pub use queue::RotationQueue;
pub use slots::{slots_for_post, ShiftSlot, SlotIter};
pub use types::{GuardState, SchedError};

pub(crate) use types::Seed;

use crate::model::{GuardId, PostId, Schedule, ScheduleRequest, UnavailabilityWindow};
use crate::state::PlannerState;
use chrono::NaiveDateTime;
use std::collections::{BTreeMap, HashMap};

/// Planner : encapsule une requête validée et l'état initial des files.
///
/// Chaque appel à `solve` alloue ses propres files et compteurs ; rien ne
/// survit d'une invocation à l'autre, sauf reprise explicite via `resume`.
#[derive(Debug)]
pub struct Planner {
    request: ScheduleRequest,
    seed: Option<Seed>,
}

impl Planner {
    /// Valide la requête et prépare un planner aux files en ordre d'entrée.
    pub fn new(request: ScheduleRequest) -> Result<Self, SchedError> {
        request.validate()?;
        Ok(Self {
            request,
            seed: None,
        })
    }

    /// Comme `new`, mais avec un ordre de file personnalisé pour certains
    /// postes. Les postes absents de `orders` gardent l'ordre d'entrée ;
    /// un ordre incomplet ou un poste inconnu est rejeté.
    pub fn with_queue_orders(
        request: ScheduleRequest,
        orders: BTreeMap<PostId, Vec<GuardId>>,
    ) -> Result<Self, SchedError> {
        request.validate()?;
        for (post, order) in &orders {
            if !request.posts.contains(post) {
                return Err(SchedError::InvalidQueueOrder {
                    post: post.as_str().to_string(),
                    detail: "unknown post".to_string(),
                });
            }
            queue::check_order(post, order, &request.guards)?;
        }
        let mut queues = BTreeMap::new();
        for post in &request.posts {
            let order = orders
                .get(post)
                .cloned()
                .unwrap_or_else(|| request.guards.clone());
            queues.insert(post.clone(), order);
        }
        Ok(Self {
            request,
            seed: Some(Seed {
                queues,
                states: BTreeMap::new(),
            }),
        })
    }

    /// Reprend la planification là où un instantané s'est arrêté : l'horizon
    /// court de `last_scheduled_end` à `until`, les files et compteurs
    /// repartent de l'état sauvegardé. `reset_queues` ramène les files à
    /// l'ordre d'entrée d'origine sans toucher aux compteurs.
    pub fn resume(
        state: &PlannerState,
        until: NaiveDateTime,
        extra_unavailability: HashMap<GuardId, Vec<UnavailabilityWindow>>,
        reset_queues: bool,
    ) -> Result<Self, SchedError> {
        let meta = &state.metadata;
        let request = ScheduleRequest {
            schedule_start: meta.last_scheduled_end,
            schedule_end: until,
            guards: meta.guards.clone(),
            posts: meta.posts.clone(),
            unavailability: extra_unavailability,
            shift_lengths: meta.shift_lengths,
            night_time_range: meta.night_time_range,
            max_consecutive_nights: meta.max_consecutive_nights,
        };
        request.validate()?;

        let queues = if reset_queues {
            request
                .posts
                .iter()
                .map(|p| (p.clone(), meta.guards.clone()))
                .collect()
        } else {
            state.guard_queues.clone()
        };
        for post in &request.posts {
            let order = queues.get(post).ok_or_else(|| {
                SchedError::IncompatibleState(format!("no saved queue for post {post}"))
            })?;
            queue::check_order(post, order, &request.guards)?;
        }

        let mut states = state.guard_states.clone();
        for guard in &request.guards {
            states.entry(guard.clone()).or_default();
        }

        Ok(Self {
            request,
            seed: Some(Seed { queues, states }),
        })
    }

    pub fn request(&self) -> &ScheduleRequest {
        &self.request
    }

    /// Produit le planning complet, ou la première raison d'échec.
    pub fn solve(&self) -> Result<Schedule, SchedError> {
        assemble::assemble(&self.request, self.seed.as_ref()).map(|outcome| outcome.schedule)
    }

    /// Comme `solve`, en capturant aussi l'état final (files, compteurs)
    /// dans un instantané daté de `now`, prêt à être repris plus tard.
    pub fn solve_with_state(
        &self,
        now: NaiveDateTime,
    ) -> Result<(Schedule, PlannerState), SchedError> {
        let outcome = assemble::assemble(&self.request, self.seed.as_ref())?;
        let state = PlannerState::capture(&self.request, outcome.queues, outcome.states, now);
        Ok((outcome.schedule, state))
    }
}

/// Raccourci : valide puis résout en une passe.
pub fn plan(request: ScheduleRequest) -> Result<Schedule, SchedError> {
    Planner::new(request)?.solve()
}
