use crate::model::{NightWindow, PostId, ScheduleRequest};
use chrono::{Duration, NaiveDateTime};

/// Un créneau à pourvoir : un poste, un intervalle, jour ou nuit.
/// Généré une fois par requête, consommé dans l'ordre, jamais modifié.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ShiftSlot {
    pub post: PostId,
    pub start: NaiveDateTime,
    pub end: NaiveDateTime,
    pub is_night: bool,
}

impl ShiftSlot {
    pub fn duration_hours(&self) -> f64 {
        (self.end - self.start).num_seconds() as f64 / 3600.0
    }
}

/// Séquence paresseuse et finie des créneaux d'un poste sur l'horizon.
///
/// Les créneaux pavent [start, end) sans trou ni recouvrement : chaque
/// créneau démarre où le précédent finit, le dernier est tronqué à la
/// borne de l'horizon s'il la dépasserait.
#[derive(Debug, Clone)]
pub struct SlotIter {
    post: PostId,
    cursor: NaiveDateTime,
    horizon_end: NaiveDateTime,
    day: Duration,
    night: Duration,
    window: NightWindow,
}

/// Itérateur des créneaux d'un poste. Reconstruire l'itérateur sur la même
/// requête redonne exactement la même séquence.
pub fn slots_for_post(request: &ScheduleRequest, post: &PostId) -> SlotIter {
    SlotIter {
        post: post.clone(),
        cursor: request.schedule_start,
        horizon_end: request.schedule_end,
        day: request.shift_lengths.day_duration(),
        night: request.shift_lengths.night_duration(),
        window: request.night_time_range,
    }
}

impl Iterator for SlotIter {
    type Item = ShiftSlot;

    fn next(&mut self) -> Option<ShiftSlot> {
        if self.cursor >= self.horizon_end {
            return None;
        }
        let is_night = self.window.contains(self.cursor.time());
        let duration = if is_night { self.night } else { self.day };
        let raw_end = self.cursor + duration;
        let slot = ShiftSlot {
            post: self.post.clone(),
            start: self.cursor,
            end: raw_end.min(self.horizon_end),
            is_night,
        };
        self.cursor = raw_end;
        Some(slot)
    }
}
