pub mod args;
pub mod command;
pub mod config;
pub mod dates;
pub mod error;
pub mod filing;
pub mod formatting;
mod help;
pub mod launcher;
pub mod matcher;
pub mod note;
pub mod render;
pub mod shared;
pub mod tags;
pub mod triage;

pub use error::{Error, Result};

use crate::args::{ArgParser, SearchFlags};
use crate::config::Settings;
use crate::filing::FilingEngine;
use crate::formatting::{FormatContext, Listing, display_output};
use crate::launcher::ProcessLauncher;
use crate::matcher::{Matcher, NoteText};
use crate::note::Note;
use crate::shared::table::format_2_cols;
use crate::triage::{LineConsole, Session};
use std::collections::BTreeMap;
use std::env;
use std::error::Error as StdError;
use std::io;
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

/// Outcome of a CLI command; usage problems are plain strings.
pub type CliResult = std::result::Result<(), Box<dyn StdError>>;

pub const LOG_ENV: &str = "MINION_LOG";
const DEFAULT_STRAY_MAX: usize = 2;

pub fn entry() -> CliResult {
    init_tracing();
    let mut args: Vec<String> = env::args().skip(1).collect();
    if args.is_empty() {
        return help::run(Vec::new());
    }

    let cmd = args.remove(0);
    if matches!(cmd.as_str(), "help" | "-h" | "--help") {
        return help::run(args);
    }
    let settings = Settings::load()?;
    tracing::debug!(root = %settings.notes_home().display(), command = %cmd, "starting");

    match cmd.as_str() {
        "find" | "ls" => find_notes(args, &settings)?,
        "count" => count_notes(args, &settings)?,
        "pick" => pick_note(args, &settings)?,
        "sort" | "triage" => sort_notes(args, &settings)?,
        "inbox" => list_inbox(args, &settings)?,
        "apply" => apply_to_note(args, &settings)?,
        "archive" => archive_notes(args, &settings)?,
        "tags" => show_tags(args, &settings)?,
        "dates" => show_dates(args, &settings)?,
        "year" => notes_in_year(args, &settings)?,
        "remind" => add_reminder(args, &settings)?,
        "folders" => show_folders(&settings, None),
        "favorites" => show_folders(&settings, Some(settings.notes.favorites.as_slice())),
        "stray" => list_stray(args, &settings)?,
        "config" => show_config(args, &settings)?,
        "path" => println!("{}", settings.notes_home().display()),
        other => {
            help::run(Vec::new())?;
            return Err(format!("Unknown command: {other}").into());
        }
    }

    Ok(())
}

fn init_tracing() {
    let filter = EnvFilter::try_from_env(LOG_ENV)
        .unwrap_or_else(|_| EnvFilter::new("warn"));
    // a subscriber may already be installed when embedded
    let _ = tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(filter)
        .with_target(false)
        .try_init();
}

/// A note given on the command line: a path, a path under the notes root,
/// or a file name found anywhere below it.
fn resolve_note(
    arg: &str,
    matcher: &Matcher,
) -> std::result::Result<PathBuf, Box<dyn StdError>> {
    let direct = PathBuf::from(arg);
    if direct.is_file() {
        return Ok(direct);
    }
    let under_root = matcher.root().join(arg);
    if under_root.is_file() {
        return Ok(under_root);
    }
    Ok(matcher.find_file_named(arg)?)
}

fn search(flags: &SearchFlags, matcher: &Matcher) -> Vec<PathBuf> {
    matcher.find_files(&flags.terms, flags.options())
}

fn find_notes(args: Vec<String>, settings: &Settings) -> CliResult {
    let flags = SearchFlags::parse(args, "find")?;
    let matcher = Matcher::new(settings);
    let files = search(&flags, &matcher);
    let ctx = FormatContext::from_env();
    println!("{}", display_output(&ctx, "Notes", &files, settings, flags.listing()));
    Ok(())
}

fn count_notes(args: Vec<String>, settings: &Settings) -> CliResult {
    let flags = SearchFlags::parse(args, "count")?;
    let matcher = Matcher::new(settings);
    let count = if flags.terms.is_empty() {
        matcher.count_all(flags.include_archives)
    } else {
        search(&flags, &matcher).len()
    };
    println!("{count}");
    Ok(())
}

fn pick_note(mut args: Vec<String>, settings: &Settings) -> CliResult {
    let file_it = args.iter().any(|a| a == "--file");
    args.retain(|a| a != "--file");
    let flags = SearchFlags::parse(args, "pick")?;
    let matcher = Matcher::new(settings);
    let engine = FilingEngine::new(settings);
    let candidates = search(&flags, &matcher);

    let stdin = io::stdin();
    let console = LineConsole::new(stdin.lock(), io::stderr());
    let launcher = ProcessLauncher::new(settings, false);
    let mut session = Session::new(&engine, &matcher, console, launcher);
    let picked = if file_it {
        session.pick_and_file(candidates)?
    } else {
        let (choice_path, picked) = session.select_file(candidates)?;
        tracing::debug!(choice_path = %choice_path, "selection finished");
        picked
    };
    match picked {
        Some(path) => {
            println!("{}", path.display());
            Ok(())
        }
        None => Err("No matching notes".into()),
    }
}

fn sort_notes(args: Vec<String>, settings: &Settings) -> CliResult {
    let flags = SearchFlags::parse(args, "sort")?;
    let matcher = Matcher::new(settings);
    let engine = FilingEngine::new(settings);
    let files = if flags.terms.is_empty() {
        matcher.inbox_files()
    } else {
        search(&flags, &matcher)
    };
    if files.is_empty() {
        println!("Nothing to sort.");
        return Ok(());
    }

    let ctx = FormatContext::from_env();
    let launcher = ProcessLauncher::new(settings, ctx.use_color);
    let stdin = io::stdin();
    let console = LineConsole::new(stdin.lock(), io::stdout());
    let mut session =
        Session::new(&engine, &matcher, console, launcher).with_format(ctx);
    session.sort_files(&files)?;
    Ok(())
}

fn list_inbox(args: Vec<String>, settings: &Settings) -> CliResult {
    let flags = SearchFlags::parse(args, "inbox")?;
    let matcher = Matcher::new(settings);
    let files = matcher.inbox_files();
    let ctx = FormatContext::from_env();
    println!("{}", display_output(&ctx, "Inbox", &files, settings, flags.listing()));
    Ok(())
}

fn apply_to_note(args: Vec<String>, settings: &Settings) -> CliResult {
    let mut parser = ArgParser::new(args, "apply");
    let target = parser
        .next()
        .ok_or("Usage: minion apply <note> <command...>")?;
    let command = parser.collect_remaining().join(" ");
    if command.trim().is_empty() {
        return Err("Provide a filing command, e.g. `minion apply note.txt @todo >work`".into());
    }

    let matcher = Matcher::new(settings);
    let engine = FilingEngine::new(settings);
    let path = resolve_note(&target, &matcher)?;

    let ctx = FormatContext::from_env();
    let launcher = ProcessLauncher::new(settings, ctx.use_color);
    let stdin = io::stdin();
    let console = LineConsole::new(stdin.lock(), io::stdout());
    let mut session =
        Session::new(&engine, &matcher, console, launcher).with_format(ctx);
    let filed = engine.apply_command(&path, &command, &mut session)?;
    println!("{}", filed.display());
    Ok(())
}

fn archive_notes(args: Vec<String>, settings: &Settings) -> CliResult {
    if args.is_empty() {
        return Err("Usage: minion archive <note...>".into());
    }
    let matcher = Matcher::new(settings);
    let engine = FilingEngine::new(settings);
    for target in args {
        let path = resolve_note(&target, &matcher)?;
        let archived = engine.archive(&path)?;
        println!("Archived {}", archived.display());
    }
    Ok(())
}

fn show_tags(args: Vec<String>, settings: &Settings) -> CliResult {
    let mut include_archives = false;
    let mut target: Option<String> = None;
    for arg in args {
        match arg.as_str() {
            "-a" | "--all" => include_archives = true,
            other if other.starts_with('-') => {
                return Err(format!("Unknown flag for tags: {other}").into());
            }
            other => target = Some(other.to_string()),
        }
    }

    let matcher = Matcher::new(settings);
    let ctx = FormatContext::from_env();
    let indicator = settings.tag_indicator();
    if let Some(target) = target {
        let note = Note::load(&resolve_note(&target, &matcher)?)?;
        let tags: Vec<String> =
            note.tags(indicator).iter().map(|t| ctx.format_tag(t)).collect();
        println!("{}", tags.join(" "));
        return Ok(());
    }

    let mut counts: BTreeMap<String, usize> = BTreeMap::new();
    for path in matcher.list_files(include_archives) {
        for tag in NoteText::read(&path).tags(indicator) {
            *counts.entry(tag).or_default() += 1;
        }
    }
    if counts.is_empty() {
        println!("No tags yet.");
        return Ok(());
    }
    let mut rows: Vec<(usize, String)> =
        counts.into_iter().map(|(tag, n)| (n, tag)).collect();
    rows.sort_by(|a, b| b.0.cmp(&a.0).then_with(|| a.1.cmp(&b.1)));
    let rows: Vec<(String, String)> = rows
        .into_iter()
        .map(|(n, tag)| (ctx.format_count(n), ctx.format_tag(&tag)))
        .collect();
    println!("{}", format_2_cols(&rows));
    Ok(())
}

fn show_dates(args: Vec<String>, settings: &Settings) -> CliResult {
    let target = args.first().ok_or("Usage: minion dates <note>")?;
    let matcher = Matcher::new(settings);
    let note = Note::load(&resolve_note(target, &matcher)?)?;
    let dates = note.dates();
    if dates.is_empty() {
        println!("No dates in {}.", note.path.display());
    }
    for date in dates {
        println!("{}", dates::format_date(date, &settings.date.format));
    }
    Ok(())
}

fn notes_in_year(args: Vec<String>, settings: &Settings) -> CliResult {
    let mut parser = ArgParser::new(args, "year");
    let year: i32 = parser
        .next()
        .ok_or("Usage: minion year <YYYY> [terms...]")?
        .parse()
        .map_err(|_| "Year must be a number, e.g. 2024")?;
    let flags = SearchFlags::parse(parser.collect_remaining(), "year")?;
    let matcher = Matcher::new(settings);
    let files = dates::limit_to_year(year, &search(&flags, &matcher));
    let ctx = FormatContext::from_env();
    let title = year.to_string();
    println!("{}", display_output(&ctx, &title, &files, settings, flags.listing()));
    Ok(())
}

fn add_reminder(args: Vec<String>, settings: &Settings) -> CliResult {
    let text = args.join(" ");
    if text.trim().is_empty() {
        return Err("Provide the reminder text, e.g. `minion remind call bob`".into());
    }
    let path = note::remind(text.trim(), settings)?;
    println!("Reminder added to {}", path.display());
    Ok(())
}

fn show_folders(settings: &Settings, favorites: Option<&[String]>) {
    let matcher = Matcher::new(settings);
    let summary = match favorites {
        Some(favorites) => matcher.favorites_summary(favorites),
        None => matcher.folder_summary(),
    };
    if summary.is_empty() {
        println!("No folders yet.");
        return;
    }
    let ctx = FormatContext::from_env();
    let rows: Vec<(String, String)> = summary
        .into_iter()
        .map(|(count, name)| (ctx.format_count(count), name))
        .collect();
    println!("{}", format_2_cols(&rows));
}

fn list_stray(args: Vec<String>, settings: &Settings) -> CliResult {
    let max = match args.first() {
        Some(value) => value
            .parse()
            .map_err(|_| format!("stray expects a number, got {value}"))?,
        None => DEFAULT_STRAY_MAX,
    };
    let matcher = Matcher::new(settings);
    let files = matcher.stray_files(max);
    let ctx = FormatContext::from_env();
    println!("{}", display_output(&ctx, "Stray", &files, settings, Listing::default()));
    Ok(())
}

fn show_config(args: Vec<String>, settings: &Settings) -> CliResult {
    match args.as_slice() {
        [] => print!("{}", settings.to_toml()?),
        [section, key] => {
            let value = settings
                .lookup(section, key)
                .ok_or_else(|| format!("No setting {section}.{key}"))?;
            println!("{value}");
        }
        _ => return Err("Usage: minion config [section key]".into()),
    }
    Ok(())
}
