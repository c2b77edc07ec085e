use std::io::{self, BufRead, Write};

use anyhow::{Context, Result};

use vocab_swipe_lib::SessionEvent;

use crate::app::App;
use crate::render::terminal;

const HELP: &str = "[l] learned  [s] skip  [u] undo last learned  [r] reset  [p] progress  [q] quit";

pub fn run(app: &App, name: &str, use_color: bool) -> Result<()> {
    let source = app.find_source(name)?;
    let mut session = app.session();

    session.subscribe(move |event| match event {
        SessionEvent::SourceChanged { name } => {
            println!("Studying \"{}\"", name);
            println!("{}", HELP);
        }
        SessionEvent::WordChanged(word) => {
            println!();
            println!("{}", terminal::render_word(word, use_color));
        }
        SessionEvent::Completed { source, stats } => {
            println!();
            if stats.total == 0 {
                println!("\"{}\" has no words.", source);
            } else {
                println!("All {} words in \"{}\" learned! Press r to start over.", stats.total, source);
            }
        }
        SessionEvent::Error(message) => {
            eprintln!("error: {}", message);
        }
    });

    session.select_source(&source.name).context("Failed to load source")?;
    session.select_next()?;

    let mut last_learned: Vec<String> = Vec::new();
    let stdin = io::stdin();
    let mut lines = stdin.lock().lines();

    loop {
        print!("> ");
        io::stdout().flush()?;

        let Some(line) = lines.next() else {
            break;
        };
        let line = line?;

        match line.trim() {
            "l" => {
                if let Some(word) = session.current_word() {
                    last_learned.push(word.term.clone());
                }
                session.learn_current()?;
            }
            "s" => {
                session.skip_current()?;
            }
            "u" => match last_learned.pop() {
                Some(term) => {
                    session.unmark_learned(&term)?;
                    println!("\"{}\" is back in rotation", term);
                    if session.current_word().is_none() {
                        session.select_next()?;
                    }
                }
                None => println!("Nothing to undo"),
            },
            "r" => {
                last_learned.clear();
                session.reset()?;
            }
            "p" => {
                println!("{}", terminal::render_stats(&session.stats()?, use_color));
            }
            "q" => break,
            "" => {}
            _ => println!("{}", HELP),
        }
    }

    if !session.tracker().is_durable() {
        eprintln!("warning: progress could not be saved and will be lost");
    }
    println!("{}", terminal::render_stats(&session.stats()?, use_color));
    Ok(())
}
