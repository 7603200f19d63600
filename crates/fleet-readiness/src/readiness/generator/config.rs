use crate::config::ConfigError;
use serde::{Deserialize, Serialize};

/// Mean and standard deviation of a Gaussian draw.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct NormalParams {
    pub mean: f64,
    pub std_dev: f64,
}

/// Distribution constants feeding the nightly signal generator.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SignalDistributions {
    pub odometer_total_km: NormalParams,
    pub km_last_30d: NormalParams,
    pub km_last_7d: NormalParams,
    pub certificate_offset_min_days: i64,
    pub certificate_offset_max_days: i64,
    pub open_job_cards_mean: f64,
    /// Critical jobs only appear once the backlog exceeds this many cards.
    pub critical_job_backlog_threshold: u32,
    pub critical_job_probability: f64,
    pub job_card_update_max_age_hours: i64,
    pub branding_probability: f64,
    pub branding_min_hours_choices: Vec<u32>,
    pub branding_max_current_hours: f64,
    pub branding_penalty_min: f64,
    pub branding_penalty_max: f64,
    pub cleaning_required_probability: f64,
    pub cleaning_booked_probability: f64,
    pub max_shunting_moves: u32,
    pub home_bay_count: u8,
    pub crew_available_probability: f64,
    pub manual_override_probability: f64,
    pub hvac_temp_min_c: f64,
    pub hvac_temp_max_c: f64,
    pub telemetry_max_age_hours: i64,
    pub message_updates_mean: f64,
}

impl Default for SignalDistributions {
    fn default() -> Self {
        Self {
            odometer_total_km: NormalParams {
                mean: 400_000.0,
                std_dev: 20_000.0,
            },
            km_last_30d: NormalParams {
                mean: 1000.0,
                std_dev: 300.0,
            },
            km_last_7d: NormalParams {
                mean: 250.0,
                std_dev: 60.0,
            },
            certificate_offset_min_days: -2,
            certificate_offset_max_days: 30,
            open_job_cards_mean: 0.4,
            critical_job_backlog_threshold: 2,
            critical_job_probability: 0.4,
            job_card_update_max_age_hours: 48,
            branding_probability: 0.5,
            branding_min_hours_choices: vec![0, 5, 8, 10],
            branding_max_current_hours: 12.0,
            branding_penalty_min: 1000.0,
            branding_penalty_max: 5000.0,
            cleaning_required_probability: 0.15,
            cleaning_booked_probability: 0.75,
            max_shunting_moves: 5,
            home_bay_count: 10,
            crew_available_probability: 0.95,
            manual_override_probability: 0.05,
            hvac_temp_min_c: 20.0,
            hvac_temp_max_c: 30.0,
            telemetry_max_age_hours: 12,
            message_updates_mean: 0.3,
        }
    }
}

impl SignalDistributions {
    pub fn validate(&self) -> Result<(), ConfigError> {
        for (name, params) in [
            ("odometer_total_km", self.odometer_total_km),
            ("km_last_30d", self.km_last_30d),
            ("km_last_7d", self.km_last_7d),
        ] {
            if !params.mean.is_finite() || !params.std_dev.is_finite() || params.std_dev < 0.0 {
                return Err(ConfigError::InvalidDistribution {
                    name,
                    reason: "normal parameters must be finite with a non-negative std dev",
                });
            }
        }

        for (name, value) in [
            ("critical_job_probability", self.critical_job_probability),
            ("branding_probability", self.branding_probability),
            (
                "cleaning_required_probability",
                self.cleaning_required_probability,
            ),
            ("cleaning_booked_probability", self.cleaning_booked_probability),
            ("crew_available_probability", self.crew_available_probability),
            ("manual_override_probability", self.manual_override_probability),
        ] {
            if !(0.0..=1.0).contains(&value) {
                return Err(ConfigError::InvalidProbability { name, value });
            }
        }

        for (name, mean) in [
            ("open_job_cards_mean", self.open_job_cards_mean),
            ("message_updates_mean", self.message_updates_mean),
        ] {
            if !mean.is_finite() || mean <= 0.0 {
                return Err(ConfigError::InvalidDistribution {
                    name,
                    reason: "poisson mean must be positive",
                });
            }
        }

        if self.certificate_offset_min_days > self.certificate_offset_max_days {
            return Err(ConfigError::InvalidRange {
                name: "certificate_offset_days",
            });
        }
        if !(self.branding_penalty_min >= 0.0
            && self.branding_penalty_min <= self.branding_penalty_max)
        {
            return Err(ConfigError::InvalidRange {
                name: "branding_penalty",
            });
        }
        if !(self.branding_max_current_hours >= 0.0) {
            return Err(ConfigError::InvalidRange {
                name: "branding_max_current_hours",
            });
        }
        if !(self.hvac_temp_min_c <= self.hvac_temp_max_c) {
            return Err(ConfigError::InvalidRange {
                name: "hvac_temp_c",
            });
        }
        if self.job_card_update_max_age_hours < 0 || self.telemetry_max_age_hours < 0 {
            return Err(ConfigError::InvalidRange {
                name: "signal_age_hours",
            });
        }
        if self.branding_min_hours_choices.is_empty() {
            return Err(ConfigError::InvalidDistribution {
                name: "branding_min_hours_choices",
                reason: "at least one choice is required",
            });
        }
        if self.home_bay_count == 0 {
            return Err(ConfigError::InvalidRange {
                name: "home_bay_count",
            });
        }

        Ok(())
    }
}
