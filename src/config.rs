//! Static world configuration
//!
//! Monolith definitions and placement lists are loaded once at boot from
//! JSON shipped alongside the page. Loading is best-effort: malformed data
//! falls back to the built-in defaults without surfacing an error.

use glam::Vec3;
use serde::{Deserialize, Serialize};

use crate::gate::GateRule;
use crate::progress::CharacterId;

/// Optional project metadata shown after a monolith is unlocked
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ProjectInfo {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub summary: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
}

/// One monolith definition (config keys are camelCase in the shipped JSON)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MonolithConfig {
    pub id: String,
    pub title: String,
    pub category: CharacterId,
    /// World position [x, y, z]
    pub position: [f32; 3],
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub gate: Option<GateRule>,
    /// Id of the battle pattern guarding this monolith, if any
    #[serde(default, rename = "battlePatternId", skip_serializing_if = "Option::is_none")]
    pub battle_pattern: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub project: Option<ProjectInfo>,
}

impl MonolithConfig {
    pub fn position(&self) -> Vec3 {
        Vec3::from_array(self.position)
    }
}

/// A decorative or interactive object placement (id + position only; meshes
/// belong to the render collaborator)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Placement {
    pub id: String,
    pub position: [f32; 3],
}

impl Placement {
    pub fn position(&self) -> Vec3 {
        Vec3::from_array(self.position)
    }
}

/// Built-in monolith set used when no config is shipped or parsing fails
const DEFAULT_MONOLITHS_JSON: &str = r#"[
  {
    "id": "brand-atlas",
    "title": "Brand Atlas",
    "category": "design",
    "position": [8.0, 0.0, -4.0],
    "project": { "summary": "Identity system for the island's wayfinding.", "url": "https://example.com/brand-atlas" }
  },
  {
    "id": "tide-gallery",
    "title": "Tide Gallery",
    "category": "art",
    "position": [-10.0, 0.0, 6.0],
    "gate": { "all": ["art"] },
    "project": { "summary": "Projection mural cycling with the waterline." }
  },
  {
    "id": "signal-board",
    "title": "Signal Board",
    "category": "collab",
    "position": [3.0, 0.0, 12.0],
    "gate": { "any": ["collab", "design"] }
  },
  {
    "id": "archive-spire",
    "title": "Archive Spire",
    "category": "art",
    "position": [-5.0, 0.0, -12.0],
    "battlePatternId": "light-triangle",
    "project": { "summary": "Light-triangle installation guarding the archive." }
  }
]"#;

/// Parse the monolith config, falling back to the defaults on any error.
pub fn load_monolith_configs(json: &str) -> Vec<MonolithConfig> {
    match serde_json::from_str(json) {
        Ok(configs) => configs,
        Err(err) => {
            log::warn!("Malformed monolith config ({err}), using defaults");
            default_monoliths()
        }
    }
}

/// The built-in monolith set
pub fn default_monoliths() -> Vec<MonolithConfig> {
    serde_json::from_str(DEFAULT_MONOLITHS_JSON).expect("built-in monolith config is valid")
}

/// Parse a placement list, empty on error (decoration is optional).
pub fn load_placements(json: &str) -> Vec<Placement> {
    match serde_json::from_str(json) {
        Ok(placements) => placements,
        Err(err) => {
            log::warn!("Malformed placement list ({err}), skipping");
            Vec::new()
        }
    }
}
