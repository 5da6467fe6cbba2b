use anyhow::{Context, Result};
use clap::Parser;
use comparison_table::{config::RenderArgs, logging, HtmlTable, Page, TableRenderer};
use std::{fs, io::Write};
use tracing::info;

#[tokio::main]
async fn main() -> Result<()> {
    // ─── 1) init logging ─────────────────────────────────────────────
    logging::init("info");
    let args = RenderArgs::parse();
    info!(template = ?args.template, output = ?args.output, "startup");

    // ─── 2) load the containers before touching the network ──────────
    let page = match &args.template {
        Some(path) => Some(Page::load(path, &args.header_id, &args.body_id)?),
        None => None,
    };

    // ─── 3) fetch & render once ──────────────────────────────────────
    let renderer = TableRenderer::from_config(&args);
    info!(endpoint = %renderer.endpoint(), "fetching comparison data");
    let html = match page {
        Some(mut page) => {
            renderer.render_into(&mut page).await;
            page.to_html()
        }
        None => {
            let mut table = HtmlTable::new(&args.header_id, &args.body_id);
            renderer.render_into(&mut table).await;
            table.to_html()
        }
    };

    // ─── 4) emit ─────────────────────────────────────────────────────
    match &args.output {
        Some(path) => {
            fs::write(path, &html).with_context(|| format!("writing {}", path.display()))?;
            info!(path = %path.display(), bytes = html.len(), "wrote html");
        }
        None => {
            let mut stdout = std::io::stdout().lock();
            stdout
                .write_all(html.as_bytes())
                .and_then(|_| stdout.flush())
                .context("writing html to stdout")?;
        }
    }

    Ok(())
}
