use chrono::{NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Fleet-wide vehicle identifier such as `TS007`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct VehicleId(pub String);

impl VehicleId {
    pub fn numbered(prefix: &str, number: usize) -> Self {
        Self(format!("{prefix}{number:03}"))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for VehicleId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Subsystems that each carry an independent fitness certificate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FitnessSubsystem {
    RollingStock,
    Signalling,
    Telecom,
}

impl FitnessSubsystem {
    pub const fn ordered() -> [Self; 3] {
        [Self::RollingStock, Self::Signalling, Self::Telecom]
    }
}

/// Where the rake was when the nightly snapshot was taken.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RakeStatus {
    InService,
    Stabled,
    InIbl,
}

impl RakeStatus {
    pub const fn ordered() -> [Self; 3] {
        [Self::InService, Self::Stabled, Self::InIbl]
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct FitnessCertificates {
    pub rolling_stock_expiry: NaiveDate,
    pub signalling_expiry: NaiveDate,
    pub telecom_expiry: NaiveDate,
}

impl FitnessCertificates {
    pub fn expiry(&self, subsystem: FitnessSubsystem) -> NaiveDate {
        match subsystem {
            FitnessSubsystem::RollingStock => self.rolling_stock_expiry,
            FitnessSubsystem::Signalling => self.signalling_expiry,
            FitnessSubsystem::Telecom => self.telecom_expiry,
        }
    }

    /// A certificate expiring on `on` is already invalid for that night.
    pub fn is_valid(&self, subsystem: FitnessSubsystem, on: NaiveDate) -> bool {
        self.expiry(subsystem) > on
    }

    pub fn all_valid(&self, on: NaiveDate) -> bool {
        FitnessSubsystem::ordered()
            .into_iter()
            .all(|subsystem| self.is_valid(subsystem, on))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct JobCardBacklog {
    pub open_count: u32,
    pub critical: bool,
    pub last_update: NaiveDateTime,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BrandingContract {
    pub contract_id: String,
    pub min_exposure_hours: u32,
    pub current_exposure_hours: f64,
    pub penalty_if_missed: f64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CleaningState {
    pub required: bool,
    pub slot_booked: bool,
    pub slot_time: Option<String>,
}

impl CleaningState {
    /// Cleaning is due but no depot slot has been secured.
    pub fn unbooked(&self) -> bool {
        self.required && !self.slot_booked
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct WearProxy {
    pub odometer_total_km: f64,
    pub km_last_7d: f64,
    pub km_last_30d: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct StablingGeometry {
    pub home_bay: u8,
    pub bay_proximity_score: f64,
    pub shunting_moves_needed: u32,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct OperationalSignals {
    pub crew_available: bool,
    pub manual_override: bool,
    pub hvac_temp_c: f64,
    pub telemetry_last_seen: NaiveDateTime,
    pub message_update_count: u32,
}

/// Raw nightly signals for one vehicle on one date.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SignalBundle {
    pub date: NaiveDate,
    pub vehicle_id: VehicleId,
    pub depot: String,
    pub rake_status: RakeStatus,
    pub certificates: FitnessCertificates,
    pub job_cards: JobCardBacklog,
    pub branding: Option<BrandingContract>,
    pub cleaning: CleaningState,
    pub wear: WearProxy,
    pub stabling: StablingGeometry,
    pub ops: OperationalSignals,
}

impl SignalBundle {
    pub fn fitness_valid(&self, subsystem: FitnessSubsystem) -> bool {
        self.certificates.is_valid(subsystem, self.date)
    }

    pub fn fitness_all_valid(&self) -> bool {
        self.certificates.all_valid(self.date)
    }

    /// Boundary check for bundles that did not come from the generator.
    pub fn validate(&self) -> Result<(), SignalError> {
        if self.vehicle_id.0.trim().is_empty() {
            return Err(SignalError::MissingVehicleId);
        }

        non_negative("odometer_total_km", self.wear.odometer_total_km)?;
        non_negative("km_last_7d", self.wear.km_last_7d)?;
        non_negative("km_last_30d", self.wear.km_last_30d)?;
        finite("iot_temp_hvac_status", self.ops.hvac_temp_c)?;

        let proximity = self.stabling.bay_proximity_score;
        finite("bay_proximity_score", proximity)?;
        if !(0.0..=1.0).contains(&proximity) {
            return Err(SignalError::OutOfRange {
                field: "bay_proximity_score",
                value: proximity,
                min: 0.0,
                max: 1.0,
            });
        }

        if let Some(branding) = &self.branding {
            non_negative(
                "branding_current_exposure_hours_last_7d",
                branding.current_exposure_hours,
            )?;
            non_negative("branding_penalty_if_missed", branding.penalty_if_missed)?;
        }

        if self.cleaning.slot_booked && !self.cleaning.required {
            return Err(SignalError::CleaningBookedWithoutRequirement);
        }

        Ok(())
    }
}

fn finite(field: &'static str, value: f64) -> Result<(), SignalError> {
    if value.is_finite() {
        Ok(())
    } else {
        Err(SignalError::NonFinite { field })
    }
}

fn non_negative(field: &'static str, value: f64) -> Result<(), SignalError> {
    finite(field, value)?;
    if value < 0.0 {
        return Err(SignalError::Negative { field, value });
    }
    Ok(())
}

/// Rejection reasons for externally supplied signal bundles.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum SignalError {
    #[error("vehicle id must not be empty")]
    MissingVehicleId,
    #[error("{field} must be a finite number")]
    NonFinite { field: &'static str },
    #[error("{field} must not be negative (got {value})")]
    Negative { field: &'static str, value: f64 },
    #[error("{field} must be within [{min}, {max}] (got {value})")]
    OutOfRange {
        field: &'static str,
        value: f64,
        min: f64,
        max: f64,
    },
    #[error("cleaning slot booked although no cleaning is required")]
    CleaningBookedWithoutRequirement,
}
