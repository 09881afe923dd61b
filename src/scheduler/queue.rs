use super::types::SchedError;
use crate::model::{GuardId, PostId};
use std::collections::{HashSet, VecDeque};

/// File de rotation d'un poste : chaque garde y figure exactement une fois,
/// en permanence. L'attribution déplace le garde en queue, jamais ne le retire.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RotationQueue {
    guards: VecDeque<GuardId>,
}

impl RotationQueue {
    /// File initialisée dans l'ordre fourni (l'ordre d'équité de départ).
    pub fn new<I: IntoIterator<Item = GuardId>>(guards: I) -> Self {
        Self {
            guards: guards.into_iter().collect(),
        }
    }

    pub fn len(&self) -> usize {
        self.guards.len()
    }

    pub fn is_empty(&self) -> bool {
        self.guards.is_empty()
    }

    /// Candidat à un décalage donné depuis la tête, sans mutation.
    pub fn peek(&self, offset: usize) -> Option<&GuardId> {
        self.guards.get(offset)
    }

    /// Déplace `guard` de sa position courante vers la queue.
    /// Seule opération mutante ; sans effet si le garde est absent.
    pub fn commit(&mut self, guard: &GuardId) {
        if let Some(idx) = self.guards.iter().position(|g| g == guard) {
            if let Some(g) = self.guards.remove(idx) {
                self.guards.push_back(g);
            }
        }
    }

    /// Ordre courant, de la tête vers la queue.
    pub fn order(&self) -> Vec<GuardId> {
        self.guards.iter().cloned().collect()
    }

    pub fn iter(&self) -> impl Iterator<Item = &GuardId> {
        self.guards.iter()
    }
}

/// Vérifie qu'un ordre personnalisé couvre exactement l'effectif, ni plus
/// ni moins, avant d'en faire l'ordre initial d'une file.
pub(crate) fn check_order(
    post: &PostId,
    order: &[GuardId],
    roster: &[GuardId],
) -> Result<(), SchedError> {
    let wanted: HashSet<&GuardId> = roster.iter().collect();
    let given: HashSet<&GuardId> = order.iter().collect();
    if given.len() != order.len() {
        return Err(SchedError::InvalidQueueOrder {
            post: post.as_str().to_string(),
            detail: "order contains duplicates".to_string(),
        });
    }
    let missing: Vec<&str> = wanted.difference(&given).map(|g| g.as_str()).collect();
    let extra: Vec<&str> = given.difference(&wanted).map(|g| g.as_str()).collect();
    if !missing.is_empty() || !extra.is_empty() {
        let mut detail = String::new();
        if !missing.is_empty() {
            let mut missing = missing;
            missing.sort_unstable();
            detail.push_str(&format!("missing guards: {}", missing.join(", ")));
        }
        if !extra.is_empty() {
            let mut extra = extra;
            extra.sort_unstable();
            if !detail.is_empty() {
                detail.push_str("; ");
            }
            detail.push_str(&format!("unknown guards: {}", extra.join(", ")));
        }
        return Err(SchedError::InvalidQueueOrder {
            post: post.as_str().to_string(),
            detail,
        });
    }
    Ok(())
}
