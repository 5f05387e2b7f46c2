use crate::error::Error;
use crate::protocol::upstream::{NasaItem, NasaSearch};
use crate::protocol::ImageEntry;
use crate::upstream::{encode_component, Upstream};
use crate::{solarviz_log, Result, BODIES};

const IMAGE_EXTENSIONS: [&str; 3] = [".jpg", ".jpeg", ".png"];

/// The search query used for a body's gallery.
pub fn planet_query(planet: &str) -> Result<String> {
    if !BODIES.contains(&planet.to_lowercase().as_str()) {
        return Err(Error::InvalidPlanetName(planet.to_string()));
    }
    if planet == "earth" {
        Ok("Apollo earth".to_string())
    } else {
        Ok(format!("Hubble {}", planet))
    }
}

pub fn search_url(base: &str, query: &str) -> String {
    format!("{}/search?q={}", base.trim_end_matches('/'), encode_component(query))
}

pub fn apod_url(base: &str, api_key: &str) -> String {
    format!(
        "{}/planetary/apod?api_key={}",
        base.trim_end_matches('/'),
        encode_component(api_key)
    )
}

fn is_image_link(link: &str) -> bool {
    IMAGE_EXTENSIONS.iter().any(|extension| link.ends_with(extension))
}

/// Keeps the items whose first link is a still image.
pub fn reshape(items: Vec<NasaItem>) -> Vec<ImageEntry> {
    items
        .into_iter()
        .filter_map(|item| {
            let url = item.links?.into_iter().next()?.href?;
            if !is_image_link(&url) {
                return None;
            }
            let data = item.data.and_then(|data| data.into_iter().next());
            let (description, title) = match data {
                Some(data) => (data.description, data.title),
                None => (None, None),
            };
            Some(ImageEntry { url, description, title })
        })
        .collect()
}

/// Searches the image library. Upstream failures are logged and yield no images.
pub async fn search(upstream: &Upstream, base: &str, query: &str) -> Vec<ImageEntry> {
    let url = search_url(base, query);
    match upstream.get_json::<NasaSearch>(&url).await {
        Ok(NasaSearch {
            collection: Some(collection),
        }) => match collection.items {
            Some(items) => reshape(items),
            None => {
                solarviz_log!(warn, "images", "No items found in the response to {}", query);
                vec![]
            }
        },
        Ok(_) => {
            solarviz_log!(warn, "images", "No items found in the response to {}", query);
            vec![]
        }
        Err(err) => {
            solarviz_log!(warn, "images", "Error fetching images for {}: {}", query, err);
            vec![]
        }
    }
}

pub async fn planet_images(upstream: &Upstream, base: &str, planet: &str) -> Result<Vec<ImageEntry>> {
    let query = planet_query(planet)?;
    Ok(search(upstream, base, &query).await)
}

/// Astronomy picture of the day, passed through untouched.
pub async fn apod(upstream: &Upstream, base: &str, api_key: &str) -> Result<serde_json::Value> {
    upstream.get_json(&apod_url(base, api_key)).await
}
