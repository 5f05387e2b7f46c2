use crate::protocol::upstream::{SolarBodies, SolarBody};
use crate::protocol::{NumberOr, PlanetRecord};
use crate::upstream::Upstream;
use crate::Result;

pub const PLANETS: [&str; 9] = [
    "Mercury", "Venus", "Earth", "Mars", "Jupiter", "Saturn", "Uranus", "Neptune", "Pluto",
];

pub fn bodies_url(base: &str) -> String {
    format!("{}/bodies/", base.trim_end_matches('/'))
}

fn non_empty_or(value: Option<String>, placeholder: &str) -> String {
    match value {
        Some(value) if !value.is_empty() => value,
        _ => placeholder.to_string(),
    }
}

impl From<SolarBody> for PlanetRecord {
    fn from(body: SolarBody) -> Self {
        let moons: Vec<String> = body
            .moons
            .unwrap_or_default()
            .into_iter()
            .map(|moon| moon.moon)
            .collect();
        Self {
            name: body.english_name,
            temperature: body.avg_temp,
            discovery_year: non_empty_or(body.discovery_date, "N/A"),
            discovered_by: non_empty_or(body.discovered_by, "Unknown"),
            gravity: body.gravity,
            axis_tilt: NumberOr::or_na(body.axial_tilt),
            sun_orbit_speed: NumberOr::or_na(body.sideral_orbit),
            self_orbit_speed: NumberOr::or_na(body.sideral_rotation),
            num_moons: moons.len(),
            moons,
            perihelion: body.perihelion,
            aphelion: body.aphelion,
        }
    }
}

/// Keeps the nine planets, in upstream order.
pub fn planet_records(bodies: SolarBodies) -> Vec<PlanetRecord> {
    bodies
        .bodies
        .into_iter()
        .filter(|body| PLANETS.contains(&body.english_name.as_str()))
        .map(PlanetRecord::from)
        .collect()
}

pub async fn fetch(upstream: &Upstream, base: &str) -> Result<Vec<PlanetRecord>> {
    let bodies: SolarBodies = upstream.get_json(&bodies_url(base)).await?;
    Ok(planet_records(bodies))
}
