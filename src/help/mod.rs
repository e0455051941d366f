//! `minion help`: an overview of every topic, or one topic in full.

use crate::formatting::{FormatContext, terminal_columns};
use crate::shared::table::{display_len, pad_field};
use std::error::Error;

mod content;

use content::{FOOTER, Kind, TITLE, TOPICS, Topic, USAGE};

const INDENT: &str = "  ";
const GAP: &str = "  ";

pub(crate) fn run(args: Vec<String>) -> Result<(), Box<dyn Error>> {
    let ctx = FormatContext::from_env();
    let width = terminal_columns().unwrap_or(80).clamp(64, 100);
    let lines = match args.first() {
        None => overview(&ctx, width),
        Some(name) => match lookup(name) {
            Some(topic) => page(&ctx, topic, width),
            None => {
                eprintln!("Unknown help topic: {name}");
                overview(&ctx, width)
            }
        },
    };
    println!("{}", lines.join("\n"));
    Ok(())
}

/// Topic by name or alias, ignoring case.
fn lookup(name: &str) -> Option<&'static Topic> {
    TOPICS.iter().find(|topic| {
        topic.name.eq_ignore_ascii_case(name)
            || topic.aliases.iter().any(|alias| alias.eq_ignore_ascii_case(name))
    })
}

fn overview(ctx: &FormatContext, width: usize) -> Vec<String> {
    let mut lines = vec![ctx.format_header(TITLE), format!("usage: {USAGE}")];
    for kind in Kind::ALL {
        let rows: Vec<(String, &str)> = TOPICS
            .iter()
            .filter(|topic| topic.kind == kind)
            .map(|topic| (entry_label(topic), topic.summary))
            .collect();
        if rows.is_empty() {
            continue;
        }
        lines.push(String::new());
        lines.push(ctx.format_header(&format!("{}:", kind.heading())));
        lines.extend(columns(&rows, width));
    }
    lines.push(String::new());
    lines.extend(wrap(FOOTER, width));
    lines
}

/// Commands list their aliases next to the name.
fn entry_label(topic: &Topic) -> String {
    if topic.kind == Kind::Command && !topic.aliases.is_empty() {
        format!("{} ({})", topic.name, topic.aliases.join(", "))
    } else {
        topic.name.to_string()
    }
}

fn page(ctx: &FormatContext, topic: &Topic, width: usize) -> Vec<String> {
    let mut lines = vec![
        format!("{} - {}", ctx.format_header(topic.name), topic.summary),
        format!("usage: {}", topic.usage),
    ];
    if !topic.aliases.is_empty() {
        lines.push(format!("also: {}", topic.aliases.join(", ")));
    }
    for note in topic.notes {
        lines.push(String::new());
        lines.extend(wrap(note, width));
    }
    if !topic.flags.is_empty() {
        lines.push(String::new());
        lines.push(ctx.format_header("Options:"));
        let rows: Vec<(String, &str)> =
            topic.flags.iter().map(|(flag, desc)| (flag.to_string(), *desc)).collect();
        lines.extend(columns(&rows, width));
    }
    if !topic.examples.is_empty() {
        lines.push(String::new());
        lines.push(ctx.format_header("Examples:"));
        lines.extend(topic.examples.iter().map(|ex| format!("{INDENT}$ {ex}")));
    }
    lines
}

/// Label and description side by side. Labels wider than a third of the
/// line get the description on the following lines instead.
fn columns(rows: &[(String, &str)], width: usize) -> Vec<String> {
    let cap = width / 3;
    let label_width = rows
        .iter()
        .map(|(label, _)| display_len(label))
        .filter(|len| *len <= cap)
        .max()
        .unwrap_or(0);
    let desc_col = INDENT.len() + label_width + GAP.len();
    let blank = " ".repeat(desc_col);
    let mut lines = Vec::new();
    for (label, desc) in rows {
        let desc_lines = wrap(desc, width.saturating_sub(desc_col).max(20));
        let len = display_len(label);
        let mut rest = desc_lines.iter();
        if len <= label_width {
            let first = rest.next().map(String::as_str).unwrap_or("");
            lines.push(format!("{INDENT}{}{GAP}{first}", pad_field(label, label_width, len)));
        } else {
            lines.push(format!("{INDENT}{label}"));
        }
        lines.extend(rest.map(|line| format!("{blank}{line}")));
    }
    lines
}

/// Greedy word wrap; a word longer than `width` gets a line of its own.
fn wrap(text: &str, width: usize) -> Vec<String> {
    let mut lines: Vec<String> = Vec::new();
    for word in text.split_whitespace() {
        match lines.last_mut() {
            Some(line) if line.len() + 1 + word.len() <= width => {
                line.push(' ');
                line.push_str(word);
            }
            _ => lines.push(word.to_string()),
        }
    }
    lines
}

#[cfg(test)]
mod tests {
    use super::*;

    fn plain() -> FormatContext {
        FormatContext::new(false)
    }

    #[test]
    fn test_lookup_by_name_and_alias() {
        assert_eq!(lookup("SORT").map(|t| t.name), Some("sort"));
        assert_eq!(lookup("ls").map(|t| t.name), Some("find"));
        assert_eq!(lookup("grammar").map(|t| t.name), Some("commands"));
        assert!(lookup("nope").is_none());
    }

    #[test]
    fn test_overview_groups_topics() {
        let text = overview(&plain(), 80).join("\n");
        assert!(text.starts_with("minion: file and find plain-text notes\nusage: "));
        let commands = text.find("Commands:").unwrap();
        let env = text.find("Environment:").unwrap();
        let guides = text.find("Guides:").unwrap();
        assert!(commands < env && env < guides);
        assert!(text.contains("  find (ls)"));
        assert!(text.contains("MINION_LOG"));
    }

    #[test]
    fn test_page_shows_flags_and_examples() {
        let find = lookup("find").unwrap();
        let lines = page(&plain(), find, 80);
        assert_eq!(lines[0], "find - List notes whose path or tags match every term.");
        assert!(lines.contains(&"also: ls".to_string()));
        assert!(lines.iter().any(|l| l.starts_with("  -a, --all") && l.ends_with("Include archive folders.")));
        assert!(lines.contains(&"  $ minion find inbox call".to_string()));
    }

    #[test]
    fn test_columns_moves_long_labels_aside() {
        let rows = vec![("short".to_string(), "fits"), ("x".repeat(40), "below")];
        let lines = columns(&rows, 64);
        assert_eq!(
            lines,
            vec![
                "  short  fits".to_string(),
                format!("  {}", "x".repeat(40)),
                "         below".to_string(),
            ]
        );
    }

    #[test]
    fn test_wrap_respects_width() {
        assert_eq!(wrap("one two three four", 9), vec!["one two", "three", "four"]);
        assert!(wrap("   ", 9).is_empty());
    }
}
