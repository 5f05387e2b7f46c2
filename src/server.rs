use crate::config::BackendConfig;
use crate::error::Error;
use crate::http::{self, AppState};
use crate::solarviz_log;
use crate::upstream::Upstream;
use crate::Result;
use std::sync::Arc;
use tokio::net::TcpListener;

pub enum TcpConfig {
    Port(u16),
    TcpListener(TcpListener),
}

pub struct ServerConfig {
    pub tcp: TcpConfig,
    pub backend: BackendConfig,
}

/// Accepts connections until something arrives on `stop`.
pub async fn run(server_config: ServerConfig, stop: crossbeam::channel::Receiver<()>) -> Result<()> {
    let listener = match server_config.tcp {
        TcpConfig::Port(port) => TcpListener::bind(format!("localhost:{}", port))
            .await
            .map_err(Error::TcpCouldNotBind)?,
        TcpConfig::TcpListener(listener) => listener,
    };

    let state = Arc::new(AppState {
        config: server_config.backend,
        upstream: Upstream::new()?,
    });

    let mut stop_tick_delay = tokio::time::interval(std::time::Duration::from_millis(100));

    solarviz_log!(
        info,
        "server",
        "Server is listening on http://localhost:{}",
        listener.local_addr().map_err(Error::TcpLocalAddr)?.port()
    );
    solarviz_log!(info, "server", "Serving fixtures from {}", state.config.data_dir.display());

    loop {
        tokio::select! {
            // ----------------------------------------------------
            // ON STOP TICK DELAY----------------------------------
            _ = stop_tick_delay.tick() => {
                if stop.try_recv().is_ok() {
                    solarviz_log!(info, "server", "Server loop stops now (on stop channel)!");
                    return Ok(())
                }
            },
            // ----------------------------------------------------
            // ON TCP ACCEPT---------------------------------------
            accepted = listener.accept() => {
                match accepted {
                    Ok((stream, addr)) => {
                        solarviz_log!(debug, "server", "TCP accept from: {}", addr);
                        http::run(stream, Arc::clone(&state), addr);
                    }
                    Err(err) => solarviz_log!(warn, "server", "TCP accept error: {}", err),
                }
            },
        }
    }
}
