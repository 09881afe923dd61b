use crate::model::{
    Assignment, GuardId, Schedule, ScheduleMetadata, ScheduleRequest, UnavailabilityWindow,
};
use crate::report::WorkBalance;
use crate::scheduler::SchedError;
use anyhow::{bail, Context};
use chrono::{Duration, NaiveDate, NaiveDateTime};
use csv::{ReaderBuilder, WriterBuilder};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fs;
use std::path::Path;

/// Enveloppe JSON de réponse : soit un planning et ses statistiques,
/// soit `success: false` et la raison.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScheduleResponse {
    pub success: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub assignments: Option<Vec<Assignment>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub metadata: Option<ScheduleMetadata>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl ScheduleResponse {
    /// Reconstruit le planning porté par une enveloppe de succès.
    pub fn into_schedule(self) -> Option<Schedule> {
        match (self.success, self.assignments, self.metadata) {
            (true, Some(assignments), Some(metadata)) => Some(Schedule {
                assignments,
                metadata,
            }),
            _ => None,
        }
    }

    pub fn from_result(result: Result<Schedule, SchedError>) -> Self {
        match result {
            Ok(schedule) => Self {
                success: true,
                assignments: Some(schedule.assignments),
                metadata: Some(schedule.metadata),
                error: None,
            },
            Err(err) => Self {
                success: false,
                assignments: None,
                metadata: None,
                error: Some(err.to_string()),
            },
        }
    }
}

/// Charge et valide une requête depuis un fichier JSON.
pub fn load_request_json<P: AsRef<Path>>(path: P) -> anyhow::Result<ScheduleRequest> {
    let path = path.as_ref();
    let data = fs::read(path).with_context(|| format!("reading {}", path.display()))?;
    let request: ScheduleRequest = serde_json::from_slice(&data)
        .with_context(|| format!("parsing request {}", path.display()))?;
    request
        .validate()
        .with_context(|| format!("validating request {}", path.display()))?;
    Ok(request)
}

/// Charge un planning depuis un fichier JSON : accepte un `Schedule` nu
/// ou une enveloppe `ScheduleResponse` de succès.
pub fn load_schedule_json<P: AsRef<Path>>(path: P) -> anyhow::Result<Schedule> {
    let path = path.as_ref();
    let data = fs::read(path).with_context(|| format!("reading {}", path.display()))?;
    if let Ok(schedule) = serde_json::from_slice::<Schedule>(&data) {
        return Ok(schedule);
    }
    let response: ScheduleResponse = serde_json::from_slice(&data)
        .with_context(|| format!("parsing schedule {}", path.display()))?;
    match response.into_schedule() {
        Some(schedule) => Ok(schedule),
        None => bail!("schedule file {} carries a failed response", path.display()),
    }
}

/// Export JSON du planning (jolie mise en forme)
pub fn export_schedule_json<P: AsRef<Path>>(path: P, schedule: &Schedule) -> anyhow::Result<()> {
    let s = serde_json::to_string_pretty(schedule)?;
    fs::write(path, s)?;
    Ok(())
}

pub fn export_response_json<P: AsRef<Path>>(
    path: P,
    response: &ScheduleResponse,
) -> anyhow::Result<()> {
    let s = serde_json::to_string_pretty(response)?;
    fs::write(path, s)?;
    Ok(())
}

/// Export CSV des relèves : header `guard_id,post_id,shift_start_time,shift_end_time`
pub fn export_assignments_csv<P: AsRef<Path>>(path: P, schedule: &Schedule) -> anyhow::Result<()> {
    let mut w = WriterBuilder::new().has_headers(true).from_path(path)?;
    w.write_record(["guard_id", "post_id", "shift_start_time", "shift_end_time"])?;
    for a in &schedule.assignments {
        let start = a.start.format("%Y-%m-%dT%H:%M:%S").to_string();
        let end = a.end.format("%Y-%m-%dT%H:%M:%S").to_string();
        w.write_record([a.guard.as_str(), a.post.as_str(), start.as_str(), end.as_str()])?;
    }
    w.flush()?;
    Ok(())
}

/// Export CSV du bilan de charge : header `guard,total_shifts,total_hours`
pub fn export_balance_csv<P: AsRef<Path>>(path: P, balance: &WorkBalance) -> anyhow::Result<()> {
    let mut w = WriterBuilder::new().has_headers(true).from_path(path)?;
    w.write_record(["guard", "total_shifts", "total_hours"])?;
    let mut shifts_buf = itoa::Buffer::new();
    for (guard, load) in &balance.per_guard {
        let hours = format!("{:.1}", load.hours);
        w.write_record([guard.as_str(), shifts_buf.format(load.shifts), hours.as_str()])?;
    }
    w.flush()?;
    Ok(())
}

/// Import de gardes depuis CSV : header `guard[,unavailability]`.
///
/// Les indisponibilités sont des intervalles `start/end` séparés par `;` ;
/// un point sans heure (`YYYY-MM-DD`) vaut pour la journée entière.
pub fn import_guards_csv<P: AsRef<Path>>(
    path: P,
) -> anyhow::Result<(Vec<GuardId>, HashMap<GuardId, Vec<UnavailabilityWindow>>)> {
    let mut rdr = ReaderBuilder::new().has_headers(true).from_path(path)?;
    let mut guards = Vec::new();
    let mut unavailability = HashMap::new();
    for rec in rdr.records() {
        let rec = rec?;
        let name = rec.get(0).context("missing guard column")?.trim();
        if name.is_empty() {
            bail!("invalid guard row (empty)");
        }
        let guard = GuardId::new(name);
        if let Some(ranges) = rec.get(1) {
            let ranges = ranges.trim();
            if !ranges.is_empty() {
                let windows = parse_windows(ranges)
                    .with_context(|| format!("invalid unavailability for guard {name}"))?;
                unavailability.insert(guard.clone(), windows);
            }
        }
        guards.push(guard);
    }
    Ok((guards, unavailability))
}

fn parse_windows(raw: &str) -> anyhow::Result<Vec<UnavailabilityWindow>> {
    raw.split(';')
        .filter(|chunk| !chunk.trim().is_empty())
        .map(|chunk| parse_window_chunk(chunk.trim()))
        .collect()
}

fn parse_window_chunk(chunk: &str) -> anyhow::Result<UnavailabilityWindow> {
    if let Some((start_raw, end_raw)) = chunk.split_once('/').or_else(|| chunk.split_once("..")) {
        let (start, _) = parse_point(start_raw.trim())?;
        let (mut end, end_was_date) = parse_point(end_raw.trim())?;
        if end_was_date {
            end += Duration::days(1);
        }
        UnavailabilityWindow::new(start, end).map_err(anyhow::Error::msg)
    } else {
        let (start, _) = parse_point(chunk)?;
        let end = start + Duration::days(1);
        UnavailabilityWindow::new(start, end).map_err(anyhow::Error::msg)
    }
}

fn parse_point(raw: &str) -> anyhow::Result<(NaiveDateTime, bool)> {
    if let Ok(dt) = crate::model::parse_datetime(raw) {
        return Ok((dt, false));
    }
    let date = NaiveDate::parse_from_str(raw, "%Y-%m-%d")
        .with_context(|| format!("invalid date/datetime: {raw}"))?;
    let datetime = date
        .and_hms_opt(0, 0, 0)
        .context("invalid midnight conversion")?;
    Ok((datetime, true))
}
