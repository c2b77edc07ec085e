use anyhow::{Context, Result};

use crate::app::App;
use crate::render::terminal;
use crate::OutputFormat;

pub fn run_show(app: &App, name: &str, format: &OutputFormat) -> Result<()> {
    let source = app.find_source(name)?;
    let mut session = app.session();
    session.select_source(&source.name).context("Failed to load source")?;
    let stats = session.stats()?;

    match format {
        OutputFormat::Json => {
            let output = serde_json::json!({
                "source": source.name,
                "stats": stats,
                "policy": session.policy().to_string(),
            });
            println!("{}", serde_json::to_string_pretty(&output)?);
        }
        OutputFormat::Plain => {
            println!("{}", source.name);
            println!("  {}", terminal::render_stats(&stats, false));
            if stats.remaining == 0 && stats.total > 0 {
                println!("  Completed. Run `vocab-swipe reset \"{}\"` to start over.", source.name);
            }
        }
    }
    Ok(())
}

pub fn run_reset(app: &App, name: &str, format: &OutputFormat) -> Result<()> {
    let source = app.find_source(name)?;
    let mut session = app.session();
    session.select_source(&source.name).context("Failed to load source")?;
    session.reset()?;

    if !session.tracker().is_durable() {
        eprintln!("warning: progress could not be saved");
    }

    match format {
        OutputFormat::Json => {
            println!("{}", serde_json::json!({ "success": true, "reset": source.name }));
        }
        OutputFormat::Plain => {
            println!("Progress for \"{}\" reset", source.name);
        }
    }
    Ok(())
}
