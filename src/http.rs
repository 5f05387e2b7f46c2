use crate::config::BackendConfig;
use crate::error::Error;
use crate::fixtures::{self, Fixture};
use crate::protocol::ErrorBody;
use crate::upstream::Upstream;
use crate::{images, solarviz_log, systeme_solaire, wikipedia};
use http_body_util::Full;
use hyper::body::{Body, Bytes};
use hyper::header::{HeaderValue, ACCESS_CONTROL_ALLOW_METHODS, ACCESS_CONTROL_ALLOW_ORIGIN, CONTENT_LENGTH, CONTENT_TYPE, ORIGIN, VARY};
use hyper::server::conn::http1;
use hyper::service::service_fn;
use hyper::{Method, Request, Response, StatusCode};
use hyper_util::rt::TokioIo;
use percent_encoding::percent_decode_str;
use serde::Serialize;
use std::net::SocketAddr;
use std::sync::Arc;

/// Everything a request handler may read. Immutable for the server's lifetime.
pub struct AppState {
    pub config: BackendConfig,
    pub upstream: Upstream,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Route {
    Root,
    Fixture(Fixture),
    PlanetConfig(String),
    Overviews,
    Overview(String),
    SystemeSolaire,
    PlanetImages(String),
    Apod,
    ImageQuery(String),
    Preflight,
    NotFound,
}

impl Route {
    pub fn parse(method: &Method, path: &str) -> Route {
        if method == Method::OPTIONS {
            return Route::Preflight;
        }
        if method != Method::GET && method != Method::HEAD {
            return Route::NotFound;
        }
        let segments: Vec<String> = path
            .split('/')
            .filter(|segment| !segment.is_empty())
            .map(|segment| percent_decode_str(segment).decode_utf8_lossy().into_owned())
            .collect();
        let segments: Vec<&str> = segments.iter().map(|segment| segment.as_str()).collect();

        match segments.as_slice() {
            [] => Route::Root,
            ["api", "solarsystem", "planetconfigs"] => Route::Fixture(Fixture::PlanetConfigs),
            ["api", "solarsystem", "planetconfigs", planet] => Route::PlanetConfig(planet.to_string()),
            ["api", "solarsystem", "planetpositions"] => Route::Fixture(Fixture::PlanetPositions),
            ["api", "solarsystem", "planetpositions_daily"] => Route::Fixture(Fixture::PlanetPositionsDaily),
            ["api", "planets", "basic"] => Route::Fixture(Fixture::PlanetBasic),
            ["api", "planets", "coredata"] => Route::Fixture(Fixture::PlanetCores),
            ["api", "planets", "atmospheredata"] => Route::Fixture(Fixture::PlanetAtmospheres),
            ["api", "planets", "overviewdata"] => Route::Overviews,
            ["api", "planets", "overviewdata", planet] => Route::Overview(planet.to_string()),
            ["api", "syssolaire"] => Route::SystemeSolaire,
            ["api", "images", "planets", planet] => Route::PlanetImages(planet.to_string()),
            ["api", "images", "apod"] => Route::Apod,
            ["api", "images", "query", query] => Route::ImageQuery(query.to_string()),
            _ => Route::NotFound,
        }
    }
}

pub fn run<T>(stream: T, state: Arc<AppState>, address: SocketAddr)
where
    T: tokio::io::AsyncRead + tokio::io::AsyncWrite + std::marker::Unpin + std::marker::Send + 'static,
{
    let io = TokioIo::new(stream);
    tokio::task::spawn(async move {
        let result = http1::Builder::new()
            .serve_connection(
                io,
                service_fn(move |req: Request<hyper::body::Incoming>| {
                    let state = Arc::clone(&state);
                    serve(req, state, address)
                }),
            )
            .await;
        match result {
            Err(err) => solarviz_log!(warn, address, "Serve http connection error: {}", err),
            Ok(()) => solarviz_log!(debug, address, "Served http connection"),
        }
    });
}

pub async fn serve<B>(
    request: Request<B>,
    state: Arc<AppState>,
    address: SocketAddr,
) -> hyper::Result<Response<Full<Bytes>>> {
    let path = request.uri().path().to_string();
    let route = Route::parse(request.method(), &path);

    let mut response = match route {
        Route::Preflight => preflight(),
        Route::NotFound => text(
            StatusCode::NOT_FOUND,
            format!("Not found - Cannot {} {}", request.method(), path),
        ),
        route => handle(route, &state).await,
    };

    if let Some(origin) = request.headers().get(ORIGIN) {
        allow_origin(&mut response, origin, &state.config.allowed_origins);
    }

    if request.method() == Method::HEAD {
        strip_body(&mut response);
    }

    solarviz_log!(info, address, "{} {} -> {}", request.method(), path, response.status().as_u16());
    Ok(response)
}

async fn handle(route: Route, state: &AppState) -> Response<Full<Bytes>> {
    let data_dir = state.config.data_dir.as_path();
    let upstream = &state.upstream;
    let urls = &state.config.upstream;

    match route {
        Route::Root => text(StatusCode::OK, "Hello, world!".to_string()),
        Route::Fixture(fixture) => match fixtures::read(data_dir, fixture).await {
            Ok(data) => raw_json(data),
            Err(err) => read_error(err),
        },
        Route::PlanetConfig(planet) => match fixtures::planet_config(data_dir, &planet).await {
            Ok(config) => json(StatusCode::OK, &config),
            Err(Error::PlanetNotFound) => text(StatusCode::NOT_FOUND, "Planet not found".to_string()),
            Err(err) => read_error(err),
        },
        Route::Overviews => json(StatusCode::OK, &wikipedia::overviews(upstream, &urls.wikipedia).await),
        Route::Overview(planet) => match wikipedia::overview(upstream, &urls.wikipedia, &planet).await {
            Ok(overview) => json(StatusCode::OK, &overview),
            Err(err) => error_json(StatusCode::BAD_REQUEST, err.to_string()),
        },
        Route::SystemeSolaire => match systeme_solaire::fetch(upstream, &urls.systeme_solaire).await {
            Ok(records) => json(StatusCode::OK, &records),
            Err(err) => {
                solarviz_log!(warn, "http", "Error fetching temperature data: {}", err);
                text(
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "Failed to fetch temperature data.".to_string(),
                )
            }
        },
        Route::PlanetImages(planet) => match images::planet_images(upstream, &urls.nasa_images, &planet).await {
            Ok(images) => json(StatusCode::OK, &images),
            Err(err) => error_json(StatusCode::BAD_REQUEST, err.to_string()),
        },
        Route::Apod => match images::apod(upstream, &urls.nasa, &urls.nasa_api_key).await {
            Ok(apod) => json(StatusCode::OK, &apod),
            Err(err) => {
                solarviz_log!(warn, "http", "Error fetching image of the day: {}", err);
                error_json(
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "Error fetching image of the day".to_string(),
                )
            }
        },
        Route::ImageQuery(query) => json(StatusCode::OK, &images::search(upstream, &urls.nasa_images, &query).await),
        Route::Preflight => preflight(),
        Route::NotFound => text(StatusCode::NOT_FOUND, "Not found".to_string()),
    }
}

fn read_error(err: Error) -> Response<Full<Bytes>> {
    solarviz_log!(error, "http", "Error reading file: {}", err);
    text(StatusCode::INTERNAL_SERVER_ERROR, "Error reading file".to_string())
}

fn response(status: StatusCode, content_type: &'static str, body: Bytes) -> Response<Full<Bytes>> {
    let mut response = Response::new(Full::new(body));
    *response.status_mut() = status;
    response
        .headers_mut()
        .insert(CONTENT_TYPE, HeaderValue::from_static(content_type));
    response
}

pub fn text(status: StatusCode, body: String) -> Response<Full<Bytes>> {
    response(status, "text/plain; charset=utf-8", Bytes::from(body))
}

pub fn raw_json(body: Bytes) -> Response<Full<Bytes>> {
    response(StatusCode::OK, "application/json", body)
}

pub fn json<T: Serialize>(status: StatusCode, value: &T) -> Response<Full<Bytes>> {
    match serde_json::to_vec(value) {
        Ok(body) => response(status, "application/json", Bytes::from(body)),
        Err(err) => {
            solarviz_log!(error, "http", "{}", Error::SerializeError("response".to_string(), err));
            text(StatusCode::INTERNAL_SERVER_ERROR, "Internal error".to_string())
        }
    }
}

pub fn error_json(status: StatusCode, error: String) -> Response<Full<Bytes>> {
    json(status, &ErrorBody { error })
}

fn preflight() -> Response<Full<Bytes>> {
    let mut response = Response::new(Full::new(Bytes::new()));
    *response.status_mut() = StatusCode::NO_CONTENT;
    response.headers_mut().insert(
        ACCESS_CONTROL_ALLOW_METHODS,
        HeaderValue::from_static("GET,HEAD,PUT,PATCH,POST,DELETE"),
    );
    response
}

/// Headers only, with the length the GET body would have had.
fn strip_body(response: &mut Response<Full<Bytes>>) {
    let length = response.body().size_hint().exact().unwrap_or(0);
    response.headers_mut().insert(CONTENT_LENGTH, HeaderValue::from(length));
    *response.body_mut() = Full::new(Bytes::new());
}

fn allow_origin(response: &mut Response<Full<Bytes>>, origin: &HeaderValue, allowed: &[String]) {
    let allowed = origin
        .to_str()
        .map(|origin| allowed.iter().any(|candidate| candidate == origin))
        .unwrap_or(false);
    if allowed {
        response.headers_mut().insert(ACCESS_CONTROL_ALLOW_ORIGIN, origin.clone());
        response.headers_mut().insert(VARY, HeaderValue::from_static("Origin"));
    }
}
