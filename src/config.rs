//! Run configuration: staffing rules plus the optional service settings.
//!
//! Everything has a default, so an empty TOML file (or no file at all) gives
//! the standard week: 7 days, 3 shifts, cap of 5 days, soft cap of 3 per
//! shift during the preference pass and a staffing target of 2.

use std::collections::HashSet;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;
use crate::schedule::{Day, ShiftType};

pub const DEFAULT_WEEKLY_DAY_CAP: usize = 5;
pub const DEFAULT_SOFT_SHIFT_CAP: usize = 3;
pub const DEFAULT_MIN_STAFF_PER_SHIFT: usize = 2;

/// Environment variable that overrides `server.admin_password`.
pub const ADMIN_PASSWORD_ENV: &str = "ROSTER_ADMIN_PASSWORD";

/// Constraints the assignment engine enforces.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ScheduleRules {
    /// Most days any employee may work in the week.
    pub weekly_day_cap: usize,
    /// Per-cell limit during the preference pass only.
    pub soft_shift_cap: usize,
    /// Staffing target the repair pass tries to reach.
    pub min_staff_per_shift: usize,
    /// Days processed, in order.
    pub days: Vec<Day>,
    /// Shifts ranked and repaired, in order.
    pub shifts: Vec<ShiftType>,
}

impl Default for ScheduleRules {
    fn default() -> Self {
        Self {
            weekly_day_cap: DEFAULT_WEEKLY_DAY_CAP,
            soft_shift_cap: DEFAULT_SOFT_SHIFT_CAP,
            min_staff_per_shift: DEFAULT_MIN_STAFF_PER_SHIFT,
            days: Day::ALL.to_vec(),
            shifts: ShiftType::ALL.to_vec(),
        }
    }
}

impl ScheduleRules {
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.days.is_empty() {
            return Err(ConfigError::invalid("days", "at least one day is required"));
        }
        if let Some(day) = first_duplicate(&self.days) {
            return Err(ConfigError::invalid("days", format!("{} is listed twice", day)));
        }
        if self.shifts.is_empty() {
            return Err(ConfigError::invalid("shifts", "at least one shift is required"));
        }
        if let Some(shift) = first_duplicate(&self.shifts) {
            return Err(ConfigError::invalid("shifts", format!("{} is listed twice", shift)));
        }
        if self.weekly_day_cap == 0 || self.weekly_day_cap > self.days.len() {
            return Err(ConfigError::invalid(
                "weekly_day_cap",
                format!("must be between 1 and {}", self.days.len()),
            ));
        }
        if self.soft_shift_cap == 0 {
            return Err(ConfigError::invalid("soft_shift_cap", "must be at least 1"));
        }
        Ok(())
    }
}

fn first_duplicate<T: Copy + Eq + std::hash::Hash>(items: &[T]) -> Option<T> {
    let mut seen = HashSet::new();
    items.iter().copied().find(|item| !seen.insert(*item))
}

/// Settings for `web` mode.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    pub bind: String,
    pub port: u16,
    /// Required in `X-Admin-Password` when submitting a roster, if set.
    pub admin_password: Option<String>,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind: "0.0.0.0".to_string(),
            port: 8080,
            admin_password: None,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub rules: ScheduleRules,
    /// Seed for preference generation; entropy when absent.
    pub seed: Option<u64>,
    pub server: ServerConfig,
}

impl AppConfig {
    /// Loads and validates a TOML config file.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let text = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_toml(&text)
    }

    pub fn from_toml(text: &str) -> Result<Self, ConfigError> {
        let config: AppConfig = toml::from_str(text)?;
        config.rules.validate()?;
        Ok(config)
    }

    /// Loads `path` if given, defaults otherwise, then applies environment
    /// overrides.
    pub fn load_or_default(path: Option<&Path>) -> Result<Self, ConfigError> {
        let mut config = match path {
            Some(path) => Self::load(path)?,
            None => Self::default(),
        };
        if let Ok(password) = std::env::var(ADMIN_PASSWORD_ENV) {
            if !password.is_empty() {
                config.server.admin_password = Some(password);
            }
        }
        Ok(config)
    }
}
