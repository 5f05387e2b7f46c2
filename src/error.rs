use tokio::io;

#[derive(thiserror::Error, Debug)]
pub enum Error {
    #[error("Could not bind TCP listener: {0}")]
    TcpCouldNotBind(io::Error),
    #[error("Could not read local address: {0}")]
    TcpLocalAddr(io::Error),
    #[error("Can't build HTTP response: {0}")]
    ResponseBuild(hyper::http::Error),
    #[error("Can't load native TLS roots: {0}")]
    UpstreamTlsRoots(io::Error),
    #[error("Invalid upstream URI \"{0}\"")]
    InvalidUri(String),
    #[error("Upstream request to {0} failed: {1}")]
    UpstreamRequest(String, String),
    #[error("Upstream {0} answered with status {1}")]
    UpstreamStatus(String, u16),
    #[error("Can't read upstream body from {0}: {1}")]
    UpstreamBody(String, hyper::Error),
    #[error("JSON: can't deserialize {0}: {1}")]
    DeserializeError(String, serde_json::Error),
    #[error("JSON: can't serialize {0}: {1}")]
    SerializeError(String, serde_json::Error),
    #[error("Can't read fixture {0}: {1}")]
    FixtureRead(String, io::Error),
    #[error("Invalid planet name {0}")]
    InvalidPlanetName(String),
    #[error("Planet not found")]
    PlanetNotFound,
    #[error("Can't load env file {0}: {1}")]
    EnvFile(String, dotenvy::Error),
    #[error("Invalid value for {0}: \"{1}\"")]
    InvalidConfigValue(String, String),
    #[error("Backend answered {0} with status {1}")]
    BackendStatus(String, u16),
    #[error("Backend request to {0} failed: {1}")]
    BackendRequest(String, String),
    #[error("Position table is not loaded")]
    PositionTableNotLoaded,
    #[error("Terminal error: {0}")]
    Terminal(io::Error),
}
