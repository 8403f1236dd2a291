pub mod types;
pub mod preferences;
pub mod roster;
pub mod engine;

pub use types::{Day, ScheduleGrid, ShiftType, Shortfall};
pub use preferences::{FixedPreferences, PreferenceSource, RandomPreferences, TaxonomyOrder};
pub use roster::{Employee, Roster};
pub use engine::{assign_week, AssignmentEngine};
