mod level_data;
mod location_names;
mod mechanics;
mod types;

pub use level_data::{load_level_data, Level, LevelData, Location, Region, Room};
pub use location_names::{load_location_names, CanonicalLocationNames};
pub use mechanics::{load_mechanic_table, normalize_label, MechanicTable};
pub use types::{AuditInputError, InputErrorCode, SourceLocation};
