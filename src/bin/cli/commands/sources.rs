use std::fs;
use std::io::Read;
use std::path::Path;

use anyhow::{Context, Result};

use vocab_swipe_lib::words::data_file;
use vocab_swipe_lib::{Source, WordEntry};

use crate::app::App;
use crate::render::terminal;
use crate::OutputFormat;

fn print_source_summary(source: &Source, format: &OutputFormat, verb: &str) -> Result<()> {
    match format {
        OutputFormat::Json => {
            println!("{}", serde_json::to_string_pretty(source)?);
        }
        OutputFormat::Plain => {
            println!("{} \"{}\" ({} words)", verb, source.name, source.words.len());
        }
    }
    Ok(())
}

pub fn run_list(app: &App, format: &OutputFormat) -> Result<()> {
    let sources = app.store.list_sources().context("Failed to list sources")?;
    let tracker = app.tracker();

    match format {
        OutputFormat::Json => {
            let output: Vec<serde_json::Value> = sources.iter().map(|s| {
                serde_json::json!({
                    "name": s.name,
                    "wordCount": s.words.len(),
                    "learned": tracker.record(&s.name).map_or(0, |r| r.learned_in(s)),
                    "originLink": s.origin_link,
                })
            }).collect();
            println!("{}", serde_json::to_string_pretty(&output)?);
        }
        OutputFormat::Plain => {
            if sources.is_empty() {
                println!("No sources. Import one with `vocab-swipe import <name> <file>`.");
                return Ok(());
            }

            let name_width = sources.iter().map(|s| s.name.len()).max().unwrap_or(4).min(40).max(4);

            println!("{:<nw$} {:>7} {:>8}", "Name", "Words", "Learned", nw = name_width);
            println!("{} {} {}",
                "\u{2500}".repeat(name_width),
                "\u{2500}".repeat(7),
                "\u{2500}".repeat(8));

            for source in &sources {
                let learned = tracker.record(&source.name).map_or(0, |r| r.learned_in(source));
                println!("{:<nw$} {:>7} {:>8}",
                    source.name, source.words.len(), learned, nw = name_width);
            }

            println!("\n{} sources total", sources.len());
        }
    }

    Ok(())
}

pub fn run_show(app: &App, name: &str, format: &OutputFormat, use_color: bool) -> Result<()> {
    let source = app.find_source(name)?;

    match format {
        OutputFormat::Json => {
            println!("{}", serde_json::to_string_pretty(&source)?);
        }
        OutputFormat::Plain => {
            if use_color {
                println!("{}{}{}", terminal::Color::BOLD, source.name, terminal::Color::RESET);
            } else {
                println!("{}", source.name);
            }
            if let Some(link) = &source.origin_link {
                println!("{}", link);
            }
            for word in &source.words {
                println!();
                println!("{}", terminal::render_word(word, use_color));
            }
        }
    }

    Ok(())
}

/// Words from a `.data` file, a bare JSON array, or stdin ("-")
fn read_word_file(file: &Path) -> Result<(Vec<WordEntry>, Option<String>)> {
    let content = if file == Path::new("-") {
        let mut buf = String::new();
        std::io::stdin().read_to_string(&mut buf).context("Failed to read stdin")?;
        buf
    } else {
        fs::read_to_string(file)
            .with_context(|| format!("Failed to read {}", file.display()))?
    };

    let parsed = data_file::parse(&content)
        .with_context(|| format!("{} is not a JSON array of words", file.display()))?;
    Ok((parsed.words, parsed.origin_link))
}

pub fn run_import(
    app: &App,
    name: &str,
    file: &Path,
    link: Option<String>,
    format: &OutputFormat,
) -> Result<()> {
    let (words, file_link) = read_word_file(file)?;
    let mut session = app.session();
    let source = session
        .import_source(name, words, link.or(file_link))
        .context("Failed to save source")?;
    print_source_summary(&source, format, "Imported")
}

pub fn run_add_word(app: &App, name: &str, entry: WordEntry, format: &OutputFormat) -> Result<()> {
    let source = app.find_source(name)?;
    let term = entry.term.clone();
    let mut session = app.session();
    let source = session
        .add_word(&source.name, entry)
        .with_context(|| format!("Failed to add '{}'", term))?;
    print_source_summary(&source, format, &format!("Added \"{}\" to", term))
}

pub fn run_remove_word(app: &App, name: &str, term: &str, format: &OutputFormat) -> Result<()> {
    let source = app.find_source(name)?;
    let mut session = app.session();
    let source = session
        .remove_word(&source.name, term)
        .with_context(|| format!("Failed to remove '{}'", term))?;
    print_source_summary(&source, format, &format!("Removed \"{}\" from", term))
}

pub fn run_delete(app: &App, name: &str, format: &OutputFormat) -> Result<()> {
    let mut session = app.session();
    session
        .delete_source(name)
        .with_context(|| format!("Failed to delete '{}'", name))?;

    match format {
        OutputFormat::Json => {
            println!("{}", serde_json::json!({ "success": true, "deleted": name }));
        }
        OutputFormat::Plain => {
            println!("Deleted \"{}\" and its progress", name);
        }
    }
    Ok(())
}
