use std::env;
use std::path::{Path, PathBuf};

use anyhow::Result;
use clap::Parser;
use solarviz::calendar::{self, ValidDates};
use solarviz::ephemeris;
use solarviz::fixtures::Fixture;
use solarviz::positions::PositionTable;
use solarviz::solarviz_log;

/// Regenerates the position fixtures served by the backend.
#[derive(Parser, Debug)]
#[command(version, long_about = None)]
struct Args {
    /// Fixture root holding data/.
    #[arg(short, long, default_value = "assets", value_name = "DIR")]
    data_dir: PathBuf,

    /// Spacing of the sparse table used for orbit paths.
    #[arg(long, default_value_t = solarviz::orbits::SPARSE_STEP_DAYS, value_name = "DAYS")]
    sparse_step: u32,

    /// Last day of the sparse table.
    #[arg(long, default_value = "2099-12-31", value_name = "YYYY-MM-DD")]
    sparse_until: String,

    #[arg(
        long,
        env = "RUST_LOG",
        default_value = "INFO",
        value_name = "TRACE|DEBUG|INFO|WARN|ERROR"
    )]
    trace_level: String,
}

async fn write(data_dir: &Path, fixture: Fixture, table: &PositionTable) -> Result<()> {
    let path = data_dir.join(fixture.relative_path());
    if let Some(parent) = path.parent() {
        tokio::fs::create_dir_all(parent).await?;
    }
    tokio::fs::write(&path, serde_json::to_vec(table)?).await?;
    solarviz_log!(info, "ephemeris", "Wrote {} days to {}", table.len(), path.display());
    Ok(())
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    env::set_var("RUST_LOG", &args.trace_level);
    solarviz::tracing::init(None);

    let dates = ValidDates::default();
    let Some(sparse_until) = calendar::parse_date(&args.sparse_until) else {
        anyhow::bail!("Invalid date {}", args.sparse_until);
    };

    let sparse = ephemeris::table(dates.first(), sparse_until, args.sparse_step);
    write(&args.data_dir, Fixture::PlanetPositions, &sparse).await?;

    let daily = ephemeris::table(dates.first(), dates.last(), 1);
    write(&args.data_dir, Fixture::PlanetPositionsDaily, &daily).await?;

    Ok(())
}
