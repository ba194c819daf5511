use std::path::Path;

use serde::Deserialize;
use tracing::info;

use super::types::{parse_json_document, read_input, AuditInputError};

const STRAWBERRY_TYPE: &str = "strawberry";

#[derive(Debug, Clone, Deserialize)]
pub struct LevelData {
    pub levels: Vec<Level>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Level {
    pub display_name: String,
    pub rooms: Vec<Room>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Room {
    pub name: String,
    pub regions: Vec<Region>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct Region {
    #[serde(default)]
    pub locations: Vec<Location>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Location {
    #[serde(rename = "type")]
    pub kind: String,
    pub display_name: String,
    /// Alternatives of mechanic conjunctions. Only the first clause is read.
    #[serde(default)]
    pub rule: Option<Vec<Vec<String>>>,
}

impl Location {
    pub fn is_strawberry(&self) -> bool {
        self.kind == STRAWBERRY_TYPE
    }

    /// Mechanics of the first clause, or nothing when the rule is absent or empty.
    pub fn required_mechanics(&self) -> &[String] {
        self.rule
            .as_deref()
            .and_then(<[Vec<String>]>::first)
            .map(Vec::as_slice)
            .unwrap_or_default()
    }

    /// Name under which the external system knows this location.
    pub fn external_name(&self, level: &Level, room: &Room) -> String {
        if self.is_strawberry() {
            format!(
                "{} - Room {} {}",
                level.display_name, room.name, self.display_name
            )
        } else {
            format!("{} - {}", level.display_name, self.display_name)
        }
    }
}

impl LevelData {
    pub fn parse(file_path: &Path, raw: &str) -> Result<Self, AuditInputError> {
        parse_json_document(file_path, raw)
    }

    /// Every location paired with its composed external name, in document order.
    pub fn named_locations(&self) -> impl Iterator<Item = (String, &Location)> + '_ {
        self.levels.iter().flat_map(|level| {
            level.rooms.iter().flat_map(move |room| {
                room.regions.iter().flat_map(move |region| {
                    region
                        .locations
                        .iter()
                        .map(move |location| (location.external_name(level, room), location))
                })
            })
        })
    }

    pub fn location_count(&self) -> usize {
        self.levels
            .iter()
            .flat_map(|level| &level.rooms)
            .flat_map(|room| &room.regions)
            .map(|region| region.locations.len())
            .sum()
    }
}

pub fn load_level_data(path: &Path) -> Result<LevelData, AuditInputError> {
    let raw = read_input(path)?;
    let data = LevelData::parse(path, &raw)?;
    info!(
        path = %path.display(),
        level_count = data.levels.len(),
        location_count = data.location_count(),
        "level_data_loaded"
    );
    Ok(data)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::content::InputErrorCode;

    fn parse(raw: &str) -> LevelData {
        LevelData::parse(Path::new("levels.json"), raw).expect("parse")
    }

    #[test]
    fn strawberry_names_include_room() {
        let data = parse(
            r#"{"levels":[{"name":"1a","display_name":"Forsaken City A","rooms":[
                {"name":"2","regions":[{"name":"main","locations":[
                    {"name":"s","display_name":"Strawberry 1","type":"strawberry","rule":[[]]},
                    {"name":"c","display_name":"Crystal Heart","type":"crystal_heart"}
                ]}]}
            ]}]}"#,
        );
        let names = data
            .named_locations()
            .map(|(name, _)| name)
            .collect::<Vec<_>>();
        assert_eq!(
            names,
            vec![
                "Forsaken City A - Room 2 Strawberry 1".to_string(),
                "Forsaken City A - Crystal Heart".to_string(),
            ]
        );
    }

    #[test]
    fn region_without_locations_is_empty() {
        let data = parse(
            r#"{"levels":[{"display_name":"Prologue","rooms":[{"name":"0","regions":[{"name":"r"}]}]}]}"#,
        );
        assert_eq!(data.location_count(), 0);
        assert_eq!(data.named_locations().count(), 0);
    }

    #[test]
    fn absent_null_and_empty_rules_require_nothing() {
        let data = parse(
            r#"{"levels":[{"display_name":"L","rooms":[{"name":"0","regions":[{"locations":[
                {"display_name":"a","type":"key"},
                {"display_name":"b","type":"key","rule":null},
                {"display_name":"c","type":"key","rule":[]},
                {"display_name":"d","type":"key","rule":[[],["springs"]]}
            ]}]}]}]}"#,
        );
        for (_, location) in data.named_locations() {
            assert!(location.required_mechanics().is_empty());
        }
    }

    #[test]
    fn only_first_clause_is_read() {
        let data = parse(
            r#"{"levels":[{"display_name":"L","rooms":[{"name":"0","regions":[{"locations":[
                {"display_name":"a","type":"key","rule":[["springs","dash refills"],["feathers"]]}
            ]}]}]}]}"#,
        );
        let (_, location) = data.named_locations().next().expect("location");
        assert_eq!(location.required_mechanics(), ["springs", "dash refills"]);
    }

    #[test]
    fn missing_display_name_is_shape_error() {
        let err = LevelData::parse(
            Path::new("levels.json"),
            r#"{"levels":[{"rooms":[]}]}"#,
        )
        .expect_err("shape");
        assert_eq!(err.code, InputErrorCode::UnexpectedShape);
        assert!(err.message.contains("levels[0]"));
    }
}
