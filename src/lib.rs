//! Weekly shift roster builder.
//!
//! A roster of employees, each with a per-day ranking of shifts, is assigned
//! to a Monday..Sunday grid of Morning/Afternoon/Evening slots:
//!
//! - [`schedule::preferences`] generates the rankings (seeded or explicit)
//! - [`schedule::roster`] holds employees and their running assignment state
//! - [`schedule::engine`] runs the preference pass and the staffing repair pass
//! - [`display`] and [`export`] render the finished grid
//! - [`web`] serves the same three steps (submit, assign, fetch) over HTTP

pub mod config;
pub mod display;
pub mod error;
pub mod export;
pub mod parser;
pub mod schedule;
pub mod web;

pub use config::{AppConfig, ScheduleRules};
pub use error::{ConfigError, Error, LoadError, Result, RosterError};
pub use schedule::{AssignmentEngine, Day, Roster, ScheduleGrid, ShiftType, Shortfall};
