//! Client side of the backend API: the data-fetch collaborator of a scene.

use crate::error::Error;
use crate::positions::PositionTable;
use crate::protocol::{ImageEntry, Overview, PlanetConfigs};
use crate::upstream::{encode_component, Upstream};
use crate::{solarviz_log, Result, BODIES};
use serde::de::DeserializeOwned;
use tokio::sync::OnceCell;

pub struct ApiClient {
    base: String,
    http: Upstream,
    configs: OnceCell<PlanetConfigs>,
    positions: OnceCell<PositionTable>,
    positions_daily: OnceCell<PositionTable>,
}

fn backend_error(err: Error) -> Error {
    match err {
        Error::UpstreamStatus(url, status) => Error::BackendStatus(url, status),
        Error::UpstreamRequest(url, reason) => Error::BackendRequest(url, reason),
        other => other,
    }
}

impl ApiClient {
    pub fn new(base: &str) -> Result<Self> {
        Ok(Self {
            base: base.trim_end_matches('/').to_string(),
            http: Upstream::new()?,
            configs: OnceCell::new(),
            positions: OnceCell::new(),
            positions_daily: OnceCell::new(),
        })
    }

    pub fn base(&self) -> &str {
        &self.base
    }

    pub fn url(&self, path: &str) -> String {
        format!("{}/api/{}", self.base, path.trim_start_matches('/'))
    }

    pub async fn get_json<T: DeserializeOwned>(&self, path: &str) -> Result<T> {
        self.http.get_json(&self.url(path)).await.map_err(backend_error)
    }

    /// Fetched once, then served from memory.
    pub async fn planet_configs(&self) -> Result<&PlanetConfigs> {
        self.configs
            .get_or_try_init(|| self.get_json("solarsystem/planetconfigs"))
            .await
    }

    /// Config keys, known bodies first in display order.
    pub async fn body_names(&self) -> Result<Vec<String>> {
        let configs = self.planet_configs().await?;
        let mut names: Vec<String> = configs.keys().cloned().collect();
        names.sort_by_key(|name| BODIES.iter().position(|body| *body == name.as_str()).unwrap_or(BODIES.len()));
        Ok(names)
    }

    /// The sparse table used for orbit paths.
    pub async fn positions(&self) -> Result<&PositionTable> {
        self.positions
            .get_or_try_init(|| self.get_json("solarsystem/planetpositions"))
            .await
    }

    pub async fn positions_daily(&self) -> Result<&PositionTable> {
        self.positions_daily
            .get_or_try_init(|| async {
                let table: PositionTable = self.get_json("solarsystem/planetpositions_daily").await?;
                solarviz_log!(info, "client", "Daily positions: {} days", table.len());
                Ok(table)
            })
            .await
    }

    pub async fn overview(&self, planet: &str) -> Result<Overview> {
        self.get_json(&format!("planets/overviewdata/{}", encode_component(planet))).await
    }

    pub async fn overviews(&self) -> Result<Vec<Overview>> {
        self.get_json("planets/overviewdata").await
    }

    pub async fn planet_images(&self, planet: &str) -> Result<Vec<ImageEntry>> {
        self.get_json(&format!("images/planets/{}", encode_component(planet))).await
    }
}
