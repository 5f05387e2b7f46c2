use std::path::PathBuf;
use std::{env, io};

use clap::Parser;

use solarviz::config::{self, BackendConfig};
use solarviz::server::{self, ServerConfig, TcpConfig};
use tokio::task::JoinHandle;

use anyhow::{bail, Result};

#[derive(Parser, Debug)]
#[command(version, long_about = None)]
struct Args {
    /// Overrides BACKEND_PORT.
    #[arg(value_name = "PORT")]
    port: Option<u16>,

    /// Dotenv file to load instead of .env.<NODE_ENV>.
    #[arg(short, long, value_name = "PATH")]
    env_file: Option<PathBuf>,

    /// Overrides SOLARVIZ_DATA_DIR.
    #[arg(short, long, value_name = "DIR")]
    data_dir: Option<PathBuf>,

    #[arg(long, env = "SOLARVIZ_TRACE_FILTER", default_value = "solarviz::(.*)", value_name = "REGEX")]
    trace_filter: String,

    #[arg(
        long,
        env = "RUST_LOG",
        default_value = "INFO",
        value_name = "TRACE|DEBUG|INFO|WARN|ERROR"
    )]
    trace_level: String,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    env::set_var("RUST_LOG", &args.trace_level);
    solarviz::tracing::init(Some(args.trace_filter));

    config::load_env_file(&env::current_dir()?, args.env_file.as_deref())?;
    let mut backend = BackendConfig::from_env()?;
    if let Some(port) = args.port {
        backend.port = port;
    }
    if let Some(dir) = args.data_dir {
        backend.data_dir = dir;
    }

    let (stop_on_input_send, stop_on_input_recv) = crossbeam::channel::bounded(1);
    std::thread::spawn(move || {
        for line in io::stdin().lines().map_while(std::result::Result::ok) {
            if line.trim() == "stop" {
                let _ = stop_on_input_send.send(());
                return;
            }
        }
    });

    let server_hdl: JoinHandle<Result<()>> = tokio::spawn(async move {
        if let solarviz::Result::Err(err) = server::run(
            ServerConfig {
                tcp: TcpConfig::Port(backend.port),
                backend,
            },
            stop_on_input_recv,
        )
        .await
        {
            bail!(format!("Server error: {}", err))
        } else {
            Ok(())
        }
    });

    server_hdl.await??;

    Ok(())
}
