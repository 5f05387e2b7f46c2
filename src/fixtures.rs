use crate::error::Error;
use crate::Result;
use hyper::body::Bytes;
use std::path::Path;

/// Static JSON documents served as-is from the fixture root.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Fixture {
    PlanetConfigs,
    PlanetPositions,
    PlanetPositionsDaily,
    PlanetBasic,
    PlanetCores,
    PlanetAtmospheres,
}

impl Fixture {
    pub fn relative_path(&self) -> &'static str {
        match self {
            Fixture::PlanetConfigs => "data/planet_configs.json",
            Fixture::PlanetPositions => "data/planet_positions_assembled.json",
            Fixture::PlanetPositionsDaily => "data/planet_positions_assembled_2000-01-01_2099-12-31.json",
            Fixture::PlanetBasic => "data_graphs/planetBasicData.json",
            Fixture::PlanetCores => "data_graphs/planetCores.json",
            Fixture::PlanetAtmospheres => "data_graphs/planetAtmospheres.json",
        }
    }
}

pub async fn read(root: &Path, fixture: Fixture) -> Result<Bytes> {
    let path = root.join(fixture.relative_path());
    let data = tokio::fs::read(&path)
        .await
        .map_err(|err| Error::FixtureRead(path.display().to_string(), err))?;
    Ok(Bytes::from(data))
}

/// The configuration entry of a single body.
pub async fn planet_config(root: &Path, planet: &str) -> Result<serde_json::Value> {
    let data = read(root, Fixture::PlanetConfigs).await?;
    let mut configs: serde_json::Map<String, serde_json::Value> = serde_json::from_slice(&data)
        .map_err(|err| Error::DeserializeError(Fixture::PlanetConfigs.relative_path().to_string(), err))?;
    configs.remove(planet).ok_or(Error::PlanetNotFound)
}
