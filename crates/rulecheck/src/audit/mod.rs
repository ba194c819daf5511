mod report;
mod resolver;
mod rule_map;

pub use report::{inheritable_side_rules, summarize, unmapped_locations, write_report, AuditSummary};
pub use resolver::{resolve_mechanic, MechanicResolution};
pub use rule_map::{build_rule_map, AuditOutcome, DerivedRuleMap, UnmappedMechanic};
