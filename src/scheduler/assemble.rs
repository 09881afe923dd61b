use super::eligibility::is_eligible;
use super::queue::{check_order, RotationQueue};
use super::slots::slots_for_post;
use super::types::{GuardState, SchedError, Seed};
use crate::model::{
    Assignment, GuardId, PostId, Schedule, ScheduleMetadata, ScheduleRequest,
};
use std::collections::{BTreeMap, HashSet};

/// Résultat complet d'un assemblage : le planning, plus l'état final des
/// files et des compteurs (pour un éventuel instantané).
pub(super) struct Outcome {
    pub schedule: Schedule,
    pub queues: BTreeMap<PostId, Vec<GuardId>>,
    pub states: BTreeMap<GuardId, GuardState>,
}

/// Déroule l'assemblage : pour chaque poste (dans l'ordre fourni), pour
/// chaque créneau (chronologique), le premier garde éligible de la rotation
/// est retenu et renvoyé en queue de file. Un créneau sans garde éligible
/// fait échouer toute la requête, sans planning partiel.
pub(super) fn assemble(
    request: &ScheduleRequest,
    seed: Option<&Seed>,
) -> Result<Outcome, SchedError> {
    let mut states: BTreeMap<GuardId, GuardState> = match seed {
        Some(seed) => seed.states.clone(),
        None => BTreeMap::new(),
    };
    for guard in &request.guards {
        states.entry(guard.clone()).or_default();
    }

    let mut assignments = Vec::new();
    let mut queues = BTreeMap::new();

    for post in &request.posts {
        let mut queue = initial_queue(request, post, seed)?;

        for slot in slots_for_post(request, post) {
            let mut chosen = None;
            for offset in 0..queue.len() {
                let Some(guard) = queue.peek(offset) else {
                    break;
                };
                let eligible = states.get(guard).map_or(false, |state| {
                    is_eligible(
                        request.unavailability.get(guard).map(Vec::as_slice),
                        &slot,
                        state,
                        request.max_consecutive_nights,
                    )
                });
                if eligible {
                    chosen = Some(guard.clone());
                    break;
                }
            }

            let Some(guard) = chosen else {
                return Err(SchedError::UnfillableSlot {
                    post: post.clone(),
                    start: slot.start,
                    end: slot.end,
                });
            };

            queue.commit(&guard);
            let state = states.entry(guard.clone()).or_default();
            if slot.is_night {
                state.consecutive_nights += 1;
            } else {
                state.consecutive_nights = 0;
            }
            state.total_shifts += 1;
            state.total_hours += slot.duration_hours();
            state.last_shift_end = Some(slot.end);

            assignments.push(Assignment {
                guard,
                post: post.clone(),
                start: slot.start,
                end: slot.end,
            });
        }

        queues.insert(post.clone(), queue.order());
    }

    let metadata = metadata_for(request, &assignments);
    Ok(Outcome {
        schedule: Schedule {
            assignments,
            metadata,
        },
        queues,
        states,
    })
}

fn initial_queue(
    request: &ScheduleRequest,
    post: &PostId,
    seed: Option<&Seed>,
) -> Result<RotationQueue, SchedError> {
    match seed {
        Some(seed) => {
            let order = seed.queues.get(post).ok_or_else(|| {
                SchedError::IncompatibleState(format!("no saved queue for post {post}"))
            })?;
            check_order(post, order, &request.guards)?;
            Ok(RotationQueue::new(order.iter().cloned()))
        }
        None => Ok(RotationQueue::new(request.guards.iter().cloned())),
    }
}

fn metadata_for(request: &ScheduleRequest, assignments: &[Assignment]) -> ScheduleMetadata {
    let unique_guards: HashSet<&GuardId> = assignments.iter().map(|a| &a.guard).collect();
    let unique_posts: HashSet<&PostId> = assignments.iter().map(|a| &a.post).collect();
    ScheduleMetadata {
        total_assignments: assignments.len(),
        unique_guards: unique_guards.len(),
        unique_posts: unique_posts.len(),
        schedule_duration_hours: request.horizon_hours(),
    }
}
