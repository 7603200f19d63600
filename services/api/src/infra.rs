use chrono::{Days, Local, NaiveDate};
use fleet_readiness::config::{ConfigError, SimulationConfig};
use fleet_readiness::error::AppError;
use fleet_readiness::readiness::{
    FleetSimulator, InMemoryRecordStore, RankedRecord, RecordStore, SimulationSummary,
};
use metrics_exporter_prometheus::PrometheusHandle;
use serde::Deserialize;
use std::sync::atomic::AtomicBool;
use std::sync::Arc;

#[derive(Clone)]
pub(crate) struct AppState {
    pub(crate) readiness: Arc<AtomicBool>,
    pub(crate) metrics: Arc<PrometheusHandle>,
    pub(crate) simulation: Arc<SimulationConfig>,
}

/// Per-run adjustments on top of the configured simulation.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub(crate) struct SimulationOverrides {
    pub(crate) nights: Option<u32>,
    pub(crate) fleet_size: Option<usize>,
    pub(crate) seed: Option<u64>,
}

impl SimulationOverrides {
    pub(crate) fn apply(self, base: &SimulationConfig) -> SimulationConfig {
        let mut config = base.clone();
        if let Some(nights) = self.nights {
            config.nights = nights;
        }
        if let Some(fleet_size) = self.fleet_size {
            config.fleet_size = fleet_size;
        }
        if let Some(seed) = self.seed {
            config.seed = Some(seed);
        }
        config
    }
}

/// Run a full simulation into a fresh store and return its ranked records.
pub(crate) fn simulate(
    config: SimulationConfig,
    start_date: NaiveDate,
    parallel: bool,
) -> Result<(SimulationSummary, Vec<RankedRecord>), AppError> {
    let simulator = FleetSimulator::new(config)?;
    let store = InMemoryRecordStore::default();
    let summary = if parallel {
        simulator.run_parallel(start_date, &store)?
    } else {
        simulator.run(start_date, &store)?
    };
    Ok((summary, store.records()?))
}

/// Start far enough back that the last simulated night is yesterday.
pub(crate) fn default_start_date(nights: u32) -> Result<NaiveDate, ConfigError> {
    Local::now()
        .date_naive()
        .checked_sub_days(Days::new(u64::from(nights)))
        .ok_or(ConfigError::NightWindowOutOfRange { nights })
}

pub(crate) fn parse_date(raw: &str) -> Result<NaiveDate, String> {
    NaiveDate::parse_from_str(raw.trim(), "%Y-%m-%d")
        .map_err(|err| format!("failed to parse '{raw}' as YYYY-MM-DD ({err})"))
}

pub(crate) fn deserialize_optional_date<'de, D>(
    deserializer: D,
) -> Result<Option<NaiveDate>, D::Error>
where
    D: serde::Deserializer<'de>,
{
    let opt = Option::<String>::deserialize(deserializer)?;
    opt.map(|value| parse_date(&value).map_err(serde::de::Error::custom))
        .transpose()
}
