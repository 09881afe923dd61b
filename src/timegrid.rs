use serde::{Deserialize, Serialize};

/// Verdict d'une validation d'heure sur la grille de 30 minutes.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TimeCheck {
    pub valid: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub closest: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

impl TimeCheck {
    fn ok() -> Self {
        Self {
            valid: true,
            closest: None,
            message: None,
        }
    }

    fn invalid(message: &str) -> Self {
        Self {
            valid: false,
            closest: None,
            message: Some(message.to_string()),
        }
    }
}

/// Vérifie qu'une heure `HH:MM` tombe sur la grille des demi-heures
/// (minutes 00 ou 30) et propose sinon l'heure valide la plus proche.
pub fn check_half_hour(raw: &str) -> TimeCheck {
    let Some((hour_raw, minute_raw)) = raw.split_once(':') else {
        return TimeCheck::invalid("Invalid time format. Use HH:MM format");
    };

    let (Ok(hour), Ok(minute)) = (hour_raw.parse::<u32>(), minute_raw.parse::<u32>()) else {
        return TimeCheck::invalid("Invalid time format. Use HH:MM format with numbers");
    };

    if hour > 23 {
        return TimeCheck::invalid("Hour must be between 00 and 23");
    }
    if minute > 59 {
        return TimeCheck::invalid("Minute must be between 00 and 59");
    }

    if minute != 0 && minute != 30 {
        let (closest_hour, closest_minute) = if minute < 15 {
            (hour, 0)
        } else if minute < 45 {
            (hour, 30)
        } else {
            ((hour + 1) % 24, 0)
        };
        return TimeCheck {
            valid: false,
            closest: Some(format!("{closest_hour:02}:{closest_minute:02}")),
            message: Some("Minutes must be 00 or 30".to_string()),
        };
    }

    TimeCheck::ok()
}
