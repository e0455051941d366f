//! Line-driven triage: pick a note by narrowing, then file it with a command.

use crate::error::Result;
use crate::filing::{FilingEngine, Interact};
use crate::formatting::{FormatContext, Listing, display_output, progress_bar};
use crate::launcher::Launcher;
use crate::matcher::Matcher;
use std::io::{BufRead, Write};
use std::path::{Path, PathBuf};

pub const SORT_MENU: &str = "Actions:\nr=rename #=review v=view tag a=archive d=done";
/// Action that marks the item for opening once the batch is done.
pub const OPEN: &str = "o";
const STOP_NARROWING: char = '!';

/// Where prompts are shown and answers read from.
pub trait Console {
    /// Show `label` and read one line; `None` at end of input.
    fn prompt(&mut self, label: &str) -> Result<Option<String>>;

    fn show(&mut self, text: &str) -> Result<()>;
}

/// Console over any line reader and writer (stdin/stdout in the CLI).
pub struct LineConsole<R, W> {
    input: R,
    output: W,
}

impl<R: BufRead, W: Write> LineConsole<R, W> {
    pub fn new(input: R, output: W) -> Self {
        Self { input, output }
    }

    pub fn output(&self) -> &W {
        &self.output
    }
}

impl<R: BufRead, W: Write> Console for LineConsole<R, W> {
    fn prompt(&mut self, label: &str) -> Result<Option<String>> {
        write!(self.output, "{label}")?;
        self.output.flush()?;
        let mut line = String::new();
        if self.input.read_line(&mut line)? == 0 {
            return Ok(None);
        }
        Ok(Some(line.trim_end_matches(['\n', '\r']).to_string()))
    }

    fn show(&mut self, text: &str) -> Result<()> {
        writeln!(self.output, "{text}")?;
        Ok(())
    }
}

pub struct Session<'a, C, L> {
    engine: &'a FilingEngine,
    matcher: &'a Matcher,
    console: C,
    launcher: L,
    ctx: FormatContext,
    max_files: usize,
    to_open: Vec<PathBuf>,
    exhausted: bool,
    /// Choice path shown at the action prompt after narrowing.
    hint: Option<String>,
}

impl<'a, C: Console, L: Launcher> Session<'a, C, L> {
    pub fn new(
        engine: &'a FilingEngine,
        matcher: &'a Matcher,
        console: C,
        launcher: L,
    ) -> Self {
        Self {
            engine,
            matcher,
            console,
            launcher,
            ctx: FormatContext::new(false),
            max_files: 10,
            to_open: Vec::new(),
            exhausted: false,
            hint: None,
        }
    }

    /// Candidate sets larger than this are shown as a count.
    pub fn with_max_files(mut self, max_files: usize) -> Self {
        self.max_files = max_files;
        self
    }

    pub fn with_format(mut self, ctx: FormatContext) -> Self {
        self.ctx = ctx;
        self
    }

    pub fn console(&self) -> &C {
        &self.console
    }

    pub fn launcher(&self) -> &L {
        &self.launcher
    }

    fn listing(&self, title: &str, files: &[PathBuf], listing: Listing) -> String {
        display_output(&self.ctx, title, files, self.engine.settings(), listing)
    }

    /// Narrow `candidates` with typed terms until one is left or the user
    /// stops. Returns the accumulated choice path (`-term-term`) and the
    /// first remaining candidate.
    pub fn select_file(
        &mut self,
        candidates: Vec<PathBuf>,
    ) -> Result<(String, Option<PathBuf>)> {
        let mut files = candidates;
        let mut choice_path = String::new();
        while files.len() > 1 {
            self.console.show("Notes:\n")?;
            if files.len() > self.max_files {
                self.console.show(&format!("{} matches.", files.len()))?;
            } else {
                let raw = Listing { raw: true, ..Default::default() };
                let listing = self.listing("", &files, raw);
                self.console.show(&listing)?;
            }
            let Some(choice) = self.console.prompt("Selection? ")? else {
                break;
            };
            if choice.contains(STOP_NARROWING) {
                break;
            }
            if choice.trim().is_empty() {
                continue;
            }
            let narrowed = self.matcher.narrow(&files, &choice, true);
            if narrowed.is_empty() {
                self.console
                    .show(&format!("No {choice_path} {choice} matches."))?;
            } else {
                choice_path.push('-');
                choice_path.push_str(&choice);
                files = narrowed;
            }
        }
        Ok((choice_path, files.into_iter().next()))
    }

    /// Narrow `candidates` to one note, then triage it with the choice path
    /// as the prompt hint. Notes marked with `o` are opened right away.
    /// Returns where the note ended up.
    pub fn pick_and_file(&mut self, candidates: Vec<PathBuf>) -> Result<Option<PathBuf>> {
        let (choice_path, picked) = self.select_file(candidates)?;
        let Some(path) = picked else {
            return Ok(None);
        };
        self.hint = (!choice_path.is_empty()).then_some(choice_path);
        let filed = self.triage(&path);
        self.hint = None;
        let filed = filed?;
        for item in std::mem::take(&mut self.to_open) {
            self.launcher.open(&item, 0)?;
        }
        Ok(Some(filed))
    }

    /// Show one note and apply the action typed for it. Returns the notes
    /// marked for opening, including any from nested reviews.
    pub fn triage_item(&mut self, path: &Path) -> Result<Vec<PathBuf>> {
        self.triage(path)?;
        Ok(std::mem::take(&mut self.to_open))
    }

    fn triage(&mut self, path: &Path) -> Result<PathBuf> {
        let selected = self.listing("Selected", &[path.to_path_buf()], Listing::default());
        self.console.show(&selected)?;
        let label = match &self.hint {
            Some(hint) => format!("Action ({hint})? "),
            None => "Action? ".to_string(),
        };
        let Some(choice) = self.console.prompt(&label)? else {
            self.exhausted = true;
            return Ok(path.to_path_buf());
        };
        if choice.trim().is_empty() {
            return Ok(path.to_path_buf());
        }
        if choice.trim() == OPEN {
            self.to_open.push(path.to_path_buf());
            return Ok(path.to_path_buf());
        }
        let engine = self.engine;
        match engine.apply_command(path, &choice, self) {
            Ok(filed) => Ok(filed),
            Err(err) => {
                tracing::warn!(path = %path.display(), error = %err, "filing command failed");
                self.console.show(&format!("Could not apply {choice:?}: {err}"))?;
                Ok(path.to_path_buf())
            }
        }
    }

    /// Triage every file in turn, then open whatever was marked with `o`.
    /// Returns the files that were opened.
    pub fn sort_files(&mut self, files: &[PathBuf]) -> Result<Vec<PathBuf>> {
        self.console.show(SORT_MENU)?;
        let total = files.len();
        let mut to_open = Vec::new();
        for (idx, item) in files.iter().enumerate() {
            if self.exhausted {
                break;
            }
            self.console.show(&progress_bar(idx + 1, total))?;
            to_open.extend(self.triage_item(item)?);
        }

        if !to_open.is_empty() {
            let names: Vec<String> =
                to_open.iter().map(|p| p.display().to_string()).collect();
            self.console.show(&format!("Files to open: {}", names.join("\n")))?;
            for item in &to_open {
                if let Err(err) = self.launcher.open(item, 0) {
                    self.console.show(&format!("Could not open {}: {err}", item.display()))?;
                }
            }
        }
        Ok(to_open)
    }
}

impl<C: Console, L: Launcher> Interact for Session<'_, C, L> {
    fn ask_name(&mut self, _path: &Path) -> Result<Option<String>> {
        self.console.prompt("New name? ")
    }

    fn review(&mut self, _engine: &FilingEngine, path: &Path) -> Result<PathBuf> {
        self.triage(path)
    }

    fn preview(&mut self, path: &Path) -> Result<()> {
        self.launcher.preview(path)
    }

    fn notify(&mut self, message: &str) {
        if let Err(err) = self.console.show(message) {
            tracing::debug!(error = %err, "could not show message");
        }
    }
}
