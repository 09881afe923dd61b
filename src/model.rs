use chrono::{Duration, NaiveDateTime, NaiveTime, Timelike};
use serde::{Deserialize, Serialize};
use std::collections::{HashMap, HashSet};
use std::fmt;

use crate::scheduler::SchedError;

/// Identifiant fort pour un garde
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct GuardId(String);

impl GuardId {
    pub fn new<S: AsRef<str>>(s: S) -> Self {
        Self(s.as_ref().to_owned())
    }
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for GuardId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Identifiant fort pour un poste
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct PostId(String);

impl PostId {
    pub fn new<S: AsRef<str>>(s: S) -> Self {
        Self(s.as_ref().to_owned())
    }
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for PostId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Fenêtre d'indisponibilité d'un garde (intervalle naïf [start, end)).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct UnavailabilityWindow {
    #[serde(with = "isodt")]
    pub start: NaiveDateTime,
    #[serde(with = "isodt")]
    pub end: NaiveDateTime,
}

impl UnavailabilityWindow {
    pub fn new(start: NaiveDateTime, end: NaiveDateTime) -> Result<Self, String> {
        if end <= start {
            return Err("unavailability end must be after start".to_string());
        }
        Ok(Self { start, end })
    }

    /// Chevauchement avec un intervalle [start, end).
    pub fn overlaps(&self, start: NaiveDateTime, end: NaiveDateTime) -> bool {
        self.start < end && self.end > start
    }
}

/// Plage horaire de nuit, circulaire si `start > end` (ex. 22:00–06:00).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct NightWindow {
    #[serde(with = "hm_time")]
    pub start: NaiveTime,
    #[serde(with = "hm_time")]
    pub end: NaiveTime,
}

impl NightWindow {
    pub fn new(start: NaiveTime, end: NaiveTime) -> Self {
        Self { start, end }
    }

    /// Appartenance d'une heure à la plage, à la minute près.
    /// Une plage dégénérée (`start == end`) est vide.
    pub fn contains(&self, t: NaiveTime) -> bool {
        let t = minutes_from_midnight(t);
        let s = minutes_from_midnight(self.start);
        let e = minutes_from_midnight(self.end);
        if s == e {
            false
        } else if s > e {
            // passe minuit
            t >= s || t < e
        } else {
            s <= t && t < e
        }
    }
}

fn minutes_from_midnight(t: NaiveTime) -> u32 {
    t.hour() * 60 + t.minute()
}

/// Durées des relèves de jour et de nuit, en heures.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ShiftLengths {
    pub day_shift_hours: f64,
    pub night_shift_hours: f64,
}

impl ShiftLengths {
    pub fn day_duration(&self) -> Duration {
        hours_to_duration(self.day_shift_hours)
    }
    pub fn night_duration(&self) -> Duration {
        hours_to_duration(self.night_shift_hours)
    }
}

fn hours_to_duration(hours: f64) -> Duration {
    Duration::seconds((hours * 3600.0).round() as i64)
}

/// Requête de planification, immuable une fois validée.
///
/// L'ordre de `guards` est l'ordre initial d'équité des files ; l'ordre de
/// `posts` est l'ordre déterministe de traitement.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ScheduleRequest {
    #[serde(rename = "schedule_start_datetime", with = "isodt")]
    pub schedule_start: NaiveDateTime,
    #[serde(rename = "schedule_end_datetime", with = "isodt")]
    pub schedule_end: NaiveDateTime,
    pub guards: Vec<GuardId>,
    pub posts: Vec<PostId>,
    #[serde(default)]
    pub unavailability: HashMap<GuardId, Vec<UnavailabilityWindow>>,
    pub shift_lengths: ShiftLengths,
    pub night_time_range: NightWindow,
    #[serde(default = "default_night_cap")]
    pub max_consecutive_nights: u32,
}

fn default_night_cap() -> u32 {
    1
}

impl ScheduleRequest {
    /// Valide l'ensemble de la configuration avant toute planification.
    /// Toute incohérence est rejetée ici, jamais corrigée en silence.
    pub fn validate(&self) -> Result<(), SchedError> {
        if self.schedule_end <= self.schedule_start {
            return Err(SchedError::InvalidHorizon);
        }
        if self.guards.is_empty() || self.posts.is_empty() {
            return Err(SchedError::EmptyRoster);
        }
        let mut seen = HashSet::new();
        for g in &self.guards {
            if !seen.insert(g.as_str()) {
                return Err(SchedError::DuplicateGuard(g.as_str().to_string()));
            }
        }
        let mut seen = HashSet::new();
        for p in &self.posts {
            if !seen.insert(p.as_str()) {
                return Err(SchedError::DuplicatePost(p.as_str().to_string()));
            }
        }
        check_shift_length(
            self.shift_lengths.day_shift_hours,
            "day_shift_hours must be in (0, 24] and last at least one second",
        )?;
        check_shift_length(
            self.shift_lengths.night_shift_hours,
            "night_shift_hours must be in (0, 24] and last at least one second",
        )?;
        if self.max_consecutive_nights == 0 {
            return Err(SchedError::InvalidNightCap);
        }
        for (guard, windows) in &self.unavailability {
            if !self.guards.contains(guard) {
                return Err(SchedError::UnknownGuard(guard.as_str().to_string()));
            }
            for w in windows {
                if w.end <= w.start {
                    return Err(SchedError::InvalidWindow {
                        guard: guard.as_str().to_string(),
                    });
                }
            }
        }
        Ok(())
    }

    /// Durée totale de l'horizon, en heures.
    pub fn horizon_hours(&self) -> f64 {
        (self.schedule_end - self.schedule_start).num_seconds() as f64 / 3600.0
    }
}

fn check_shift_length(hours: f64, message: &'static str) -> Result<(), SchedError> {
    // une durée arrondie à zéro empêcherait le curseur de créneaux d'avancer
    if !hours.is_finite() || hours <= 0.0 || hours > 24.0 || hours_to_duration(hours).is_zero() {
        return Err(SchedError::InvalidShiftLength(message));
    }
    Ok(())
}

/// Une relève attribuée : un garde, un poste, un intervalle.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Assignment {
    #[serde(rename = "guard_id")]
    pub guard: GuardId,
    #[serde(rename = "post_id")]
    pub post: PostId,
    #[serde(rename = "shift_start_time", with = "isodt")]
    pub start: NaiveDateTime,
    #[serde(rename = "shift_end_time", with = "isodt")]
    pub end: NaiveDateTime,
}

impl Assignment {
    pub fn duration_hours(&self) -> f64 {
        (self.end - self.start).num_seconds() as f64 / 3600.0
    }
}

/// Statistiques agrégées d'un planning réussi.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScheduleMetadata {
    pub total_assignments: usize,
    pub unique_guards: usize,
    pub unique_posts: usize,
    pub schedule_duration_hours: f64,
}

/// Planning complet : toutes les relèves de tous les postes, dans l'ordre
/// de traitement (poste par poste, chronologique).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Schedule {
    pub assignments: Vec<Assignment>,
    pub metadata: ScheduleMetadata,
}

/// Analyse un instant naïf ISO 8601, avec ou sans secondes.
pub fn parse_datetime(raw: &str) -> Result<NaiveDateTime, chrono::ParseError> {
    isodt::parse(raw)
}

/// (Dé)sérialisation d'instants naïfs `YYYY-MM-DDTHH:MM[:SS]`.
pub(crate) mod isodt {
    use chrono::NaiveDateTime;
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn parse(raw: &str) -> Result<NaiveDateTime, chrono::ParseError> {
        let raw = raw.strip_suffix('Z').unwrap_or(raw);
        NaiveDateTime::parse_from_str(raw, "%Y-%m-%dT%H:%M:%S%.f")
            .or_else(|_| NaiveDateTime::parse_from_str(raw, "%Y-%m-%dT%H:%M"))
    }

    pub fn serialize<S: Serializer>(dt: &NaiveDateTime, s: S) -> Result<S::Ok, S::Error> {
        s.serialize_str(&dt.format("%Y-%m-%dT%H:%M:%S").to_string())
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(d: D) -> Result<NaiveDateTime, D::Error> {
        let raw = String::deserialize(d)?;
        parse(&raw).map_err(serde::de::Error::custom)
    }
}

/// (Dé)sérialisation d'heures de la journée `HH:MM`.
pub(crate) mod hm_time {
    use chrono::NaiveTime;
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(t: &NaiveTime, s: S) -> Result<S::Ok, S::Error> {
        s.serialize_str(&t.format("%H:%M").to_string())
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(d: D) -> Result<NaiveTime, D::Error> {
        let raw = String::deserialize(d)?;
        NaiveTime::parse_from_str(&raw, "%H:%M")
            .or_else(|_| NaiveTime::parse_from_str(&raw, "%H:%M:%S"))
            .map_err(serde::de::Error::custom)
    }
}
