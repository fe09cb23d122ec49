//! Engine configuration.
//!
//! Typically loaded from a JSON file by the application (enable the `serde`
//! feature) and handed to `SchemeBuilder`.

use std::collections::BTreeMap;

use crate::{ConfigError, ConfigResult, SimClock, TICKS_PER_SEC};

/// Step sizes and named scalar parameters for one scheme.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct EngineConfig {
    /// Integration step in seconds.  Default: 0.1.
    pub dt_sec: f64,

    /// External clock step used by `compute_sync`, in seconds.  Default: 1.0.
    pub sync_step_sec: f64,

    /// Named scalars readable by blocks and hosts through `parameter(name)`.
    pub parameters: BTreeMap<String, f64>,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            dt_sec: 0.1,
            sync_step_sec: 1.0,
            parameters: BTreeMap::new(),
        }
    }
}

impl EngineConfig {
    /// Config with the given step and default everything else.
    pub fn with_step(dt_sec: f64) -> Self {
        Self { dt_sec, ..Self::default() }
    }

    /// Validate both step lengths and construct a clock at time zero.
    pub fn make_clock(&self) -> ConfigResult<SimClock> {
        let dt = step_ticks("dt", self.dt_sec)?;
        let sync = step_ticks("sync step", self.sync_step_sec)?;
        Ok(SimClock::new(dt, sync))
    }
}

fn step_ticks(what: &'static str, secs: f64) -> ConfigResult<u64> {
    if !secs.is_finite() || secs <= 0.0 {
        return Err(ConfigError::InvalidStep { what, secs });
    }
    let ticks = (secs * TICKS_PER_SEC as f64).round();
    if ticks < 1.0 || ticks > u64::MAX as f64 {
        return Err(ConfigError::InvalidStep { what, secs });
    }
    Ok(ticks as u64)
}
