use vocab_swipe_lib::{SessionStats, WordEntry};

/// ANSI color codes
pub struct Color;

impl Color {
    pub const RESET: &str = "\x1b[0m";
    pub const BOLD: &str = "\x1b[1m";
    pub const DIM: &str = "\x1b[2m";
    pub const ITALIC: &str = "\x1b[3m";
    pub const RED: &str = "\x1b[31m";
    pub const GREEN: &str = "\x1b[32m";
    pub const YELLOW: &str = "\x1b[33m";
    pub const CYAN: &str = "\x1b[36m";
    pub const GRAY: &str = "\x1b[90m";
}

fn paint(text: &str, code: &str, use_color: bool) -> String {
    if use_color {
        format!("{}{}{}", code, text, Color::RESET)
    } else {
        text.to_string()
    }
}

/// Render a word card: term line, then whichever fields are present
pub fn render_word(word: &WordEntry, use_color: bool) -> String {
    let mut lines = Vec::new();

    let mut heading = paint(&word.term, Color::BOLD, use_color);
    if let Some(pronunciation) = &word.pronunciation {
        heading.push_str(&format!("  {}", paint(pronunciation, Color::GRAY, use_color)));
    }
    if let Some(pos) = &word.part_of_speech {
        heading.push_str(&format!("  {}", paint(pos, Color::ITALIC, use_color)));
    }
    lines.push(heading);

    if let Some(meaning) = &word.meaning {
        lines.push(format!("  {}", meaning));
    }
    if let Some(translation) = &word.translation {
        lines.push(format!("  {} {}", paint("\u{2192}", Color::CYAN, use_color), translation));
    }

    for (label, items, code) in [
        ("synonyms", &word.synonyms, Color::GREEN),
        ("antonyms", &word.antonyms, Color::RED),
        ("forms", &word.forms, Color::YELLOW),
    ] {
        if !items.is_empty() {
            let chips = items
                .iter()
                .map(|s| paint(&format!("[{}]", s), code, use_color))
                .collect::<Vec<_>>()
                .join(" ");
            lines.push(format!("  {} {}", paint(label, Color::DIM, use_color), chips));
        }
    }

    if let Some(notes) = &word.notes {
        lines.push(format!("  {}", paint(notes, Color::DIM, use_color)));
    }

    lines.join("\n")
}

/// `[#####.....] 5/10 learned, 2 skipped`
pub fn render_stats(stats: &SessionStats, use_color: bool) -> String {
    const WIDTH: usize = 20;
    let filled = if stats.total == 0 {
        WIDTH
    } else {
        stats.learned * WIDTH / stats.total
    };
    let bar = format!(
        "[{}{}]",
        paint(&"#".repeat(filled), Color::GREEN, use_color),
        ".".repeat(WIDTH - filled)
    );
    format!(
        "{} {}/{} learned, {} skipped",
        bar, stats.learned, stats.total, stats.skipped
    )
}
