// src/config.rs

use clap::Parser;
use std::path::PathBuf;
use url::Url;

use crate::fetch::DEFAULT_ENDPOINT;
use crate::render::{BODY_ID, HEADER_ID};

/// Fetch the comparison data once and render it as an HTML table.
#[derive(Parser, Debug, Clone)]
#[command(name = "comparison-table")]
pub struct RenderArgs {
    /// Endpoint serving the JSON array of records
    #[arg(long, env = "COMPARISON_ENDPOINT", default_value = DEFAULT_ENDPOINT)]
    pub endpoint: Url,

    /// Page template holding the header-row and body containers.
    /// Without one a standalone <table> is written.
    #[arg(long, env = "COMPARISON_TEMPLATE")]
    pub template: Option<PathBuf>,

    /// Id of the header-row container
    #[arg(long, env = "COMPARISON_HEADER_ID", default_value = HEADER_ID)]
    pub header_id: String,

    /// Id of the table-body container
    #[arg(long, env = "COMPARISON_BODY_ID", default_value = BODY_ID)]
    pub body_id: String,

    /// Where to write the HTML (stdout if omitted)
    #[arg(long, env = "COMPARISON_OUTPUT")]
    pub output: Option<PathBuf>,
}

/// Serve a comparison CSV as JSON on `/get_comparison_data`.
#[derive(Parser, Debug, Clone)]
#[command(name = "comparison_server")]
pub struct ServerArgs {
    /// CSV file with one header row and one record per line
    #[arg(long, env = "COMPARISON_CSV", default_value = "5_Species_Summary.csv")]
    pub csv: PathBuf,

    /// Port to listen on (all interfaces)
    #[arg(long, env = "PORT", default_value_t = 5000)]
    pub port: u16,
}
