use anyhow::Result;
use clap::Parser;
use comparison_table::{config::ServerArgs, logging, source};
use tracing::info;

#[tokio::main]
async fn main() -> Result<()> {
    logging::init("info");
    let args = ServerArgs::parse();

    info!(csv = %args.csv.display(), "Starting comparison data service");
    info!("Health check: http://localhost:{}/health", args.port);
    info!("Comparison data: http://localhost:{}/get_comparison_data", args.port);
    info!("Species facts: http://localhost:{}/get_species_facts?taxon=...", args.port);

    warp::serve(source::routes(args.csv)).run(([0, 0, 0, 0], args.port)).await;

    Ok(())
}
