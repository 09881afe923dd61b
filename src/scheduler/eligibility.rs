use super::slots::ShiftSlot;
use super::types::GuardState;
use crate::model::UnavailabilityWindow;

/// Un garde est éligible pour un créneau si aucune fenêtre d'indisponibilité
/// ne le chevauche et si, pour un créneau de nuit, son compteur de nuits
/// consécutives reste sous le plafond. Les créneaux de jour passent toujours
/// le second critère. Aucun autre contrôle : le non-cumul inter-postes n'est
/// pas vérifié ici.
pub(super) fn is_eligible(
    windows: Option<&[UnavailabilityWindow]>,
    slot: &ShiftSlot,
    state: &GuardState,
    max_consecutive_nights: u32,
) -> bool {
    if let Some(windows) = windows {
        if windows.iter().any(|w| w.overlaps(slot.start, slot.end)) {
            return false;
        }
    }
    if slot.is_night && state.consecutive_nights >= max_consecutive_nights {
        return false;
    }
    true
}
