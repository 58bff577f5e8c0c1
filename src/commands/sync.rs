use anyhow::Result;
use assignsync_core::{SyncConfig, SyncOptions, pipeline};

use crate::render::Render;
use crate::utils::tui;

pub async fn run(config: &SyncConfig, options: SyncOptions) -> Result<()> {
    let spinner = tui::create_spinner("Syncing assignments".to_string());
    let result = pipeline::run(config, &options).await;
    spinner.finish_and_clear();

    // Per-event errors live in the summary; only fatal errors end up here
    let summary = result?;
    println!("{}", summary.render());

    Ok(())
}
