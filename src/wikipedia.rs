use crate::error::Error;
use crate::protocol::upstream::WikipediaSummary;
use crate::protocol::Overview;
use crate::solarviz_log;
use crate::upstream::{encode_component, Upstream};
use crate::Result;
use futures::future::join_all;

pub const NO_SUMMARY: &str = "No summary available.";

pub const OVERVIEW_BODIES: [&str; 10] = [
    "Sun", "Mercury", "Venus", "Earth", "Mars", "Jupiter", "Saturn", "Uranus", "Neptune", "Pluto",
];

/// Upper-cases the first character and leaves the rest alone.
pub fn capitalize(name: &str) -> String {
    let mut chars = name.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

pub fn summary_url(base: &str, planet: &str) -> String {
    // "Mercury" alone is the element.
    let page = if planet == "Mercury" {
        "Mercury_(planet)".to_string()
    } else {
        encode_component(planet)
    };
    format!("{}/page/summary/{}", base.trim_end_matches('/'), page)
}

/// The page extract, or the placeholder on any upstream failure.
pub async fn fetch_summary(upstream: &Upstream, base: &str, planet: &str) -> String {
    let url = summary_url(base, planet);
    match upstream.get_json::<WikipediaSummary>(&url).await {
        Ok(WikipediaSummary { extract: Some(extract) }) => extract,
        Ok(_) => NO_SUMMARY.to_string(),
        Err(err) => {
            solarviz_log!(warn, "wikipedia", "Error fetching summary for {}: {}", planet, err);
            NO_SUMMARY.to_string()
        }
    }
}

pub async fn overview(upstream: &Upstream, base: &str, planet: &str) -> Result<Overview> {
    let name = capitalize(planet);
    if !OVERVIEW_BODIES.contains(&name.as_str()) {
        return Err(Error::InvalidPlanetName(planet.to_string()));
    }
    let summary = fetch_summary(upstream, base, &name).await;
    Ok(Overview { name, summary })
}

/// Every body's summary, fetched concurrently, in display order.
pub async fn overviews(upstream: &Upstream, base: &str) -> Vec<Overview> {
    join_all(OVERVIEW_BODIES.iter().map(|name| async move {
        Overview {
            name: name.to_string(),
            summary: fetch_summary(upstream, base, name).await,
        }
    }))
    .await
}
