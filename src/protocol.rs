use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
pub struct ErrorBody {
    pub error: String,
}

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
pub struct Overview {
    pub name: String,
    pub summary: String,
}

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
pub struct ImageEntry {
    pub url: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
}

/// A number when the upstream knows it, a placeholder string otherwise.
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
#[serde(untagged)]
pub enum NumberOr {
    Number(f64),
    Text(String),
}

impl NumberOr {
    pub fn or_na(value: Option<f64>) -> Self {
        match value {
            Some(number) => NumberOr::Number(number),
            None => NumberOr::Text("N/A".to_string()),
        }
    }
}

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
pub struct PlanetRecord {
    pub name: String,
    #[serde(default)]
    pub temperature: Option<f64>,
    pub discovery_year: String,
    pub discovered_by: String,
    pub gravity: f64,
    pub axis_tilt: NumberOr,
    pub sun_orbit_speed: NumberOr,
    pub self_orbit_speed: NumberOr,
    pub num_moons: usize,
    pub moons: Vec<String>,
    #[serde(default)]
    pub perihelion: Option<f64>,
    #[serde(default)]
    pub aphelion: Option<f64>,
}

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Default)]
#[serde(rename_all = "camelCase")]
pub struct PlanetConfig {
    #[serde(default)]
    pub id: u32,
    pub name: String,
    #[serde(default)]
    pub radius: f64,
    #[serde(default)]
    pub mass: f64,
    #[serde(default)]
    pub tilt: f64,
    #[serde(default)]
    pub rotation_speed: f64,
    #[serde(default)]
    pub ring: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub inner_radius: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub outer_radius: Option<f64>,
    #[serde(default)]
    pub texture: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ring_texture: Option<String>,
}

pub type PlanetConfigs = BTreeMap<String, PlanetConfig>;

/// Shapes of the third-party responses, reduced to the consumed fields.
pub mod upstream {
    use serde::Deserialize;

    #[derive(Deserialize, Clone, Debug, Default)]
    pub struct WikipediaSummary {
        #[serde(default)]
        pub extract: Option<String>,
    }

    #[derive(Deserialize, Clone, Debug, Default)]
    pub struct NasaSearch {
        #[serde(default)]
        pub collection: Option<NasaCollection>,
    }

    #[derive(Deserialize, Clone, Debug, Default)]
    pub struct NasaCollection {
        #[serde(default)]
        pub items: Option<Vec<NasaItem>>,
    }

    #[derive(Deserialize, Clone, Debug, Default)]
    pub struct NasaItem {
        #[serde(default)]
        pub links: Option<Vec<NasaLink>>,
        #[serde(default)]
        pub data: Option<Vec<NasaItemData>>,
    }

    #[derive(Deserialize, Clone, Debug, Default)]
    pub struct NasaLink {
        #[serde(default)]
        pub href: Option<String>,
    }

    #[derive(Deserialize, Clone, Debug, Default)]
    pub struct NasaItemData {
        #[serde(default)]
        pub description: Option<String>,
        #[serde(default)]
        pub title: Option<String>,
    }

    #[derive(Deserialize, Clone, Debug, Default)]
    pub struct SolarBodies {
        #[serde(default)]
        pub bodies: Vec<SolarBody>,
    }

    #[derive(Deserialize, Clone, Debug, Default)]
    #[serde(rename_all = "camelCase")]
    pub struct SolarBody {
        #[serde(default)]
        pub english_name: String,
        #[serde(default)]
        pub avg_temp: Option<f64>,
        #[serde(default)]
        pub discovery_date: Option<String>,
        #[serde(default)]
        pub discovered_by: Option<String>,
        #[serde(default)]
        pub gravity: f64,
        #[serde(default)]
        pub axial_tilt: Option<f64>,
        #[serde(default)]
        pub sideral_orbit: Option<f64>,
        #[serde(default)]
        pub sideral_rotation: Option<f64>,
        #[serde(default)]
        pub moons: Option<Vec<SolarMoon>>,
        #[serde(default)]
        pub perihelion: Option<f64>,
        #[serde(default)]
        pub aphelion: Option<f64>,
    }

    #[derive(Deserialize, Clone, Debug, Default)]
    pub struct SolarMoon {
        #[serde(default)]
        pub moon: String,
    }
}
