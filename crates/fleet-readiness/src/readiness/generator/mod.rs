mod config;

pub use config::{NormalParams, SignalDistributions};

use super::domain::{
    BrandingContract, CleaningState, FitnessCertificates, JobCardBacklog, OperationalSignals,
    RakeStatus, SignalBundle, StablingGeometry, VehicleId, WearProxy,
};
use crate::config::ConfigError;
use chrono::{Duration, NaiveDate, NaiveDateTime, NaiveTime};
use rand::seq::SliceRandom;
use rand::Rng;
use rand_distr::{Distribution, Normal, Poisson};

/// Draws raw nightly signal bundles from the configured distributions.
///
/// The generator holds no mutable state; all entropy comes from the caller's
/// RNG so seeded runs are reproducible.
#[derive(Debug, Clone)]
pub struct SignalGenerator {
    distributions: SignalDistributions,
    odometer: Normal<f64>,
    km_last_30d: Normal<f64>,
    km_last_7d: Normal<f64>,
    open_job_cards: Poisson<f64>,
    message_updates: Poisson<f64>,
}

impl SignalGenerator {
    pub fn new(distributions: SignalDistributions) -> Result<Self, ConfigError> {
        distributions.validate()?;

        let odometer = normal("odometer_total_km", distributions.odometer_total_km)?;
        let km_last_30d = normal("km_last_30d", distributions.km_last_30d)?;
        let km_last_7d = normal("km_last_7d", distributions.km_last_7d)?;
        let open_job_cards = poisson("open_job_cards_mean", distributions.open_job_cards_mean)?;
        let message_updates =
            poisson("message_updates_mean", distributions.message_updates_mean)?;

        Ok(Self {
            distributions,
            odometer,
            km_last_30d,
            km_last_7d,
            open_job_cards,
            message_updates,
        })
    }

    pub fn generate<R: Rng + ?Sized>(
        &self,
        rng: &mut R,
        date: NaiveDate,
        vehicle_id: VehicleId,
        depot: &str,
    ) -> SignalBundle {
        let d = &self.distributions;
        let midnight = NaiveDateTime::new(date, NaiveTime::MIN);

        let wear = WearProxy {
            odometer_total_km: self.odometer.sample(rng),
            km_last_30d: self.km_last_30d.sample(rng).max(0.0),
            km_last_7d: self.km_last_7d.sample(rng).max(0.0),
        };

        let mut certificate_expiry = || {
            date + Duration::days(
                rng.gen_range(d.certificate_offset_min_days..=d.certificate_offset_max_days),
            )
        };
        let certificates = FitnessCertificates {
            rolling_stock_expiry: certificate_expiry(),
            signalling_expiry: certificate_expiry(),
            telecom_expiry: certificate_expiry(),
        };

        let open_count = self.open_job_cards.sample(rng) as u32;
        let critical = open_count > d.critical_job_backlog_threshold
            && rng.gen_bool(d.critical_job_probability);
        let job_cards = JobCardBacklog {
            open_count,
            critical,
            last_update: midnight
                - Duration::hours(rng.gen_range(0..=d.job_card_update_max_age_hours)),
        };

        let branding = if rng.gen_bool(d.branding_probability) {
            Some(BrandingContract {
                contract_id: format!("BR-{:03}", rng.gen_range(1..=99)),
                min_exposure_hours: d
                    .branding_min_hours_choices
                    .choose(rng)
                    .copied()
                    .unwrap_or_default(),
                current_exposure_hours: rng.gen_range(0.0..=d.branding_max_current_hours),
                penalty_if_missed: rng.gen_range(d.branding_penalty_min..=d.branding_penalty_max),
            })
        } else {
            None
        };

        let required = rng.gen_bool(d.cleaning_required_probability);
        let slot_booked = required && rng.gen_bool(d.cleaning_booked_probability);
        let slot_time = slot_booked.then(|| {
            format!(
                "{}:00-{:02}:00",
                rng.gen_range(21..=23),
                rng.gen_range(0..=3)
            )
        });
        let cleaning = CleaningState {
            required,
            slot_booked,
            slot_time,
        };

        let stabling = StablingGeometry {
            home_bay: rng.gen_range(1..=d.home_bay_count),
            bay_proximity_score: round_to(rng.gen_range(0.0..=1.0), 2),
            shunting_moves_needed: rng.gen_range(0..=d.max_shunting_moves),
        };

        let ops = OperationalSignals {
            crew_available: rng.gen_bool(d.crew_available_probability),
            hvac_temp_c: round_to(rng.gen_range(d.hvac_temp_min_c..=d.hvac_temp_max_c), 1),
            telemetry_last_seen: midnight
                - Duration::hours(rng.gen_range(0..=d.telemetry_max_age_hours)),
            manual_override: rng.gen_bool(d.manual_override_probability),
            message_update_count: self.message_updates.sample(rng) as u32,
        };

        let statuses = RakeStatus::ordered();
        let rake_status = statuses[rng.gen_range(0..statuses.len())];

        SignalBundle {
            date,
            vehicle_id,
            depot: depot.to_string(),
            rake_status,
            certificates,
            job_cards,
            branding,
            cleaning,
            wear,
            stabling,
            ops,
        }
    }
}

fn normal(name: &'static str, params: NormalParams) -> Result<Normal<f64>, ConfigError> {
    Normal::new(params.mean, params.std_dev).map_err(|_| ConfigError::InvalidDistribution {
        name,
        reason: "normal parameters rejected",
    })
}

fn poisson(name: &'static str, mean: f64) -> Result<Poisson<f64>, ConfigError> {
    Poisson::new(mean).map_err(|_| ConfigError::InvalidDistribution {
        name,
        reason: "poisson mean rejected",
    })
}

pub(crate) fn round_to(value: f64, decimals: i32) -> f64 {
    let factor = 10f64.powi(decimals);
    (value * factor).round() / factor
}
