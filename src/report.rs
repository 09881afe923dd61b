use crate::model::{Assignment, GuardId, Schedule};
use anyhow::{bail, Result};
use chrono::{Duration, NaiveDateTime};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Charge cumulée d'un garde sur un planning.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct GuardLoad {
    pub shifts: u32,
    pub hours: f64,
}

/// Bilan de répartition du travail : charges individuelles et moyennes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WorkBalance {
    pub per_guard: BTreeMap<GuardId, GuardLoad>,
    pub total_shifts: usize,
    pub total_hours: f64,
    pub avg_shifts_per_guard: f64,
    pub avg_hours_per_guard: f64,
}

/// Calcule le bilan de charge d'un planning sur l'effectif donné ; les
/// gardes jamais assignés figurent avec une charge nulle.
pub fn work_balance(schedule: &Schedule, guards: &[GuardId]) -> WorkBalance {
    let mut per_guard: BTreeMap<GuardId, GuardLoad> = guards
        .iter()
        .map(|g| (g.clone(), GuardLoad::default()))
        .collect();
    for a in &schedule.assignments {
        let load = per_guard.entry(a.guard.clone()).or_default();
        load.shifts += 1;
        load.hours += a.duration_hours();
    }
    let total_shifts = schedule.assignments.len();
    let total_hours: f64 = per_guard.values().map(|l| l.hours).sum();
    let count = per_guard.len().max(1) as f64;
    WorkBalance {
        per_guard,
        total_shifts,
        total_hours,
        avg_shifts_per_guard: total_shifts as f64 / count,
        avg_hours_per_guard: total_hours / count,
    }
}

/// Rendu texte du bilan, une ligne par garde.
pub fn render_balance(balance: &WorkBalance) -> String {
    let mut out = format!(
        "Relèves : {} | Heures : {:.1} | Moyenne : {:.1} relèves, {:.1} h par garde\n",
        balance.total_shifts,
        balance.total_hours,
        balance.avg_shifts_per_guard,
        balance.avg_hours_per_guard
    );
    for (guard, load) in &balance.per_guard {
        out.push_str(&format!(
            "{} : {} relèves, {:.1} h\n",
            guard, load.shifts, load.hours
        ));
    }
    out
}

/// Représente un avis de prise de faction généré pour un garde.
#[derive(Debug, Clone)]
pub struct DutyNotice {
    pub guard: GuardId,
    pub post: String,
    pub notice_at: NaiveDateTime,
    pub content: String,
}

/// Permet de customiser le rendu du message (texte, SMS, etc.).
pub trait NoticeRenderer {
    fn render(&self, guard: &GuardId, assignment: &Assignment, notice_at: NaiveDateTime) -> String;
}

/// Gabarit texte simple destiné à un futur mail/SMS.
#[derive(Debug, Default, Clone, Copy)]
pub struct TextNotice;

impl NoticeRenderer for TextNotice {
    fn render(&self, guard: &GuardId, assignment: &Assignment, notice_at: NaiveDateTime) -> String {
        format!(
            "Bonjour {name},\n\nTu prends la faction au poste \"{post}\" du {start} au {end}.\nCe rappel est prévu pour le {notice}.\n\nMerci de prévoir la relève.\n",
            name = guard,
            post = assignment.post,
            start = assignment.start.format("%Y-%m-%d %H:%M"),
            end = assignment.end.format("%Y-%m-%d %H:%M"),
            notice = notice_at.format("%Y-%m-%d %H:%M")
        )
    }
}

/// Prépare l'avis de la prochaine faction d'un garde.
pub fn prepare_notice(
    schedule: &Schedule,
    guard: &GuardId,
    hours_before: i64,
    now: NaiveDateTime,
    renderer: &dyn NoticeRenderer,
) -> Result<DutyNotice> {
    if hours_before < 0 {
        bail!("hours_before must be positive");
    }

    let mut upcoming: Vec<&Assignment> = schedule
        .assignments
        .iter()
        .filter(|a| &a.guard == guard && a.start >= now)
        .collect();

    if upcoming.is_empty() {
        bail!("no upcoming shift found for guard {guard}");
    }

    upcoming.sort_by_key(|a| a.start);
    let assignment = upcoming[0];

    let notice_at = assignment.start - Duration::hours(hours_before);

    let content = renderer.render(guard, assignment, notice_at);
    Ok(DutyNotice {
        guard: guard.clone(),
        post: assignment.post.as_str().to_string(),
        notice_at,
        content,
    })
}

/// Description statique de l'algorithme, pour affichage.
pub fn algorithm_summary() -> &'static str {
    "Planification équitable par files de rotation : une file FIFO par poste, \
     le premier garde éligible prend le créneau puis repart en queue. \
     Contraintes vérifiées : fenêtres d'indisponibilité et plafond de nuits \
     consécutives. Déterministe, sans solveur global."
}
