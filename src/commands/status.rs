use anyhow::Result;
use assignsync_core::{SyncConfig, SyncOptions, pipeline};
use owo_colors::OwoColorize;

use crate::render::Render;
use crate::utils::tui;

pub async fn run(config: &SyncConfig) -> Result<()> {
    let options = SyncOptions {
        dry_run: true,
        ..SyncOptions::default()
    };

    let spinner = tui::create_spinner("Checking feed".to_string());
    let result = pipeline::run(config, &options).await;
    spinner.finish_and_clear();

    let summary = result?;
    println!("{}", "Dry run, nothing was written".dimmed());
    println!("{}", summary.render());

    Ok(())
}
