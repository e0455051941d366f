//! Filing actions against the notes tree.
//!
//! Every relocation goes through `unique_name` first, so an existing file is
//! never overwritten. A note is moved or renamed, never copied or deleted.

use crate::command::{Directive, FilingCommand};
use crate::config::{Settings, expand_home};
use crate::error::{Error, Result};
use crate::note::{Note, ensure_dir, string_to_file_name};
use chrono::{Datelike, Local, NaiveDate};
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use uuid::Uuid;

pub const ARCHIVE_FOLDER: &str = "archive";
pub const CALENDAR_FOLDER: &str = "calendar";

/// What the engine needs from whoever drives it interactively.
pub trait Interact {
    /// Ask for a new name for `path`; `None` cancels the rename.
    fn ask_name(&mut self, path: &Path) -> Result<Option<String>>;

    /// Triage `path` again and return where it ended up.
    fn review(&mut self, engine: &FilingEngine, path: &Path) -> Result<PathBuf>;

    fn preview(&mut self, path: &Path) -> Result<()>;

    fn notify(&mut self, _message: &str) {}
}

/// Non-interactive driver: no renames without a name, no re-triage.
#[derive(Debug, Default)]
pub struct NoInteraction;

impl Interact for NoInteraction {
    fn ask_name(&mut self, _path: &Path) -> Result<Option<String>> {
        Ok(None)
    }

    fn review(&mut self, _engine: &FilingEngine, path: &Path) -> Result<PathBuf> {
        Ok(path.to_path_buf())
    }

    fn preview(&mut self, _path: &Path) -> Result<()> {
        Ok(())
    }
}

pub struct FilingEngine {
    settings: Settings,
    root: PathBuf,
    today: NaiveDate,
}

impl FilingEngine {
    pub fn new(settings: &Settings) -> Self {
        Self {
            settings: settings.clone(),
            root: settings.notes_home(),
            today: Local::now().date_naive(),
        }
    }

    /// Pin the date used for archive folder names.
    pub fn with_today(mut self, today: NaiveDate) -> Self {
        self.today = today;
        self
    }

    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    /// Full path of a folder under the notes root, created if missing.
    /// `archive` maps to `archive.<YY>.<MM>`.
    pub fn resolve_folder(&self, name: &str) -> Result<PathBuf> {
        let name = if name == ARCHIVE_FOLDER {
            format!(
                "{ARCHIVE_FOLDER}.{:02}.{:02}",
                self.today.year() % 100,
                self.today.month()
            )
        } else {
            name.to_string()
        };
        let expanded = expand_home(&name);
        let dir = if expanded.is_absolute() {
            expanded
        } else {
            self.root.join(expanded)
        };
        ensure_dir(&dir)?;
        Ok(dir)
    }

    pub fn archive(&self, path: &Path) -> Result<PathBuf> {
        self.move_to_folder(path, ARCHIVE_FOLDER)
    }

    /// Move a note into `folder`, then drop its old folder if now empty.
    pub fn move_to_folder(&self, path: &Path, folder: &str) -> Result<PathBuf> {
        let destination = self.resolve_folder(folder)?;
        let origin = path.parent().map(Path::to_path_buf).unwrap_or_default();
        if origin == destination {
            return Ok(path.to_path_buf());
        }
        let name = path.file_name().ok_or_else(|| {
            Error::InvalidInput(format!("{} is not a file", path.display()))
        })?;
        let target = unique_name(&destination.join(name));
        relocate(path, &target)?;
        tracing::info!(from = %path.display(), to = %target.display(), "moved note");
        if let Err(err) = self.remove_empty_folder(&origin) {
            tracing::warn!(folder = %origin.display(), error = %err, "could not remove empty folder");
        }
        Ok(target)
    }

    /// Rename within the same folder; no-op when the name is unchanged.
    pub fn rename_file(&self, path: &Path, new_base: &str) -> Result<PathBuf> {
        let folder = path.parent().unwrap_or_else(|| Path::new(""));
        let wanted = folder.join(new_base);
        if wanted == path {
            return Ok(wanted);
        }
        let target = unique_name(&wanted);
        relocate(path, &target)?;
        tracing::info!(from = %path.display(), to = %target.display(), "renamed note");
        Ok(target)
    }

    /// Returns whether the folder was removed. The notes root is kept.
    fn remove_empty_folder(&self, folder: &Path) -> io::Result<bool> {
        if folder.as_os_str().is_empty() || self.root.starts_with(folder) {
            return Ok(false);
        }
        if fs::read_dir(folder)?.next().is_some() {
            return Ok(false);
        }
        fs::remove_dir(folder)?;
        tracing::info!(folder = %folder.display(), "removed empty folder");
        Ok(true)
    }

    fn retag(&self, path: &Path, add: &[String], remove: &[String]) -> Result<()> {
        if add.is_empty() && remove.is_empty() {
            return Ok(());
        }
        let mut note = Note::load(path)?;
        if note.update_tags(add, remove, self.settings.tag_indicator()) {
            note.save()?;
            tracing::info!(path = %path.display(), ?add, ?remove, "updated tags");
        }
        Ok(())
    }

    /// Parse `text` as a filing command and apply it to `path`.
    pub fn apply_command(
        &self,
        path: &Path,
        text: &str,
        interact: &mut dyn Interact,
    ) -> Result<PathBuf> {
        self.apply(path, &FilingCommand::parse(text), interact)
    }

    /// Apply a parsed command, returning the note's final path.
    /// `!rename` renames within the note's current folder; it does not move
    /// the note to the inbox.
    pub fn apply(
        &self,
        path: &Path,
        command: &FilingCommand,
        interact: &mut dyn Interact,
    ) -> Result<PathBuf> {
        let plan = command.plan();
        match plan.first() {
            Some(Directive::Rename(name)) => {
                let name = match name {
                    Some(name) => name.clone(),
                    None => match interact.ask_name(path)? {
                        Some(name) if !name.trim().is_empty() => name,
                        _ => return Ok(path.to_path_buf()),
                    },
                };
                let new_base = string_to_file_name(&name, &self.settings);
                let renamed = self.rename_file(path, &new_base)?;
                interact.notify(&format!(
                    "Renamed {} to {}",
                    path.display(),
                    renamed.display()
                ));
                return interact.review(self, &renamed);
            }
            Some(Directive::Review) => return interact.review(self, path),
            _ => {}
        }

        self.retag(path, &command.tags_to_add(), &command.tags_to_remove())?;

        let mut current = path.to_path_buf();
        for directive in plan {
            match directive {
                Directive::Calendar(_) => {
                    current = self.move_to_folder(&current, CALENDAR_FOLDER)?;
                    interact.notify(&format!("Moved to {CALENDAR_FOLDER}"));
                }
                Directive::FolderRoute(folder) => {
                    current = self.move_to_folder(&current, folder)?;
                    interact.notify(&format!("Moved to {folder}"));
                }
                Directive::View => {
                    interact.preview(&current)?;
                    current = interact.review(self, &current)?;
                }
                _ => {}
            }
        }
        Ok(current)
    }
}

/// `target` if free, otherwise `target` with a fresh token before the
/// extension (`a.txt` becomes `a.1b2c3d4e.txt`).
pub fn unique_name(target: &Path) -> PathBuf {
    let mut candidate = target.to_path_buf();
    while candidate.exists() {
        let token = Uuid::new_v4().simple().to_string();
        let token = &token[..8];
        let name = match (target.file_stem(), target.extension()) {
            (Some(stem), Some(ext)) => format!(
                "{}.{token}.{}",
                stem.to_string_lossy(),
                ext.to_string_lossy()
            ),
            _ => format!(
                "{}.{token}",
                target.file_name().unwrap_or_default().to_string_lossy()
            ),
        };
        tracing::debug!(taken = %candidate.display(), "name conflict");
        candidate = target.with_file_name(name);
    }
    candidate
}

/// Move a file so it ends up at exactly one of `from` or `to`.
fn relocate(from: &Path, to: &Path) -> Result<()> {
    let failed = |source: io::Error| Error::Move {
        from: from.to_path_buf(),
        to: to.to_path_buf(),
        source,
    };
    let rename_err = match fs::rename(from, to) {
        Ok(()) => return Ok(()),
        Err(err) => err,
    };
    if !from.is_file() {
        return Err(failed(rename_err));
    }
    // rename cannot cross filesystems
    if let Err(err) = fs::copy(from, to) {
        let _ = fs::remove_file(to);
        return Err(failed(err));
    }
    if let Err(err) = fs::remove_file(from) {
        let _ = fs::remove_file(to);
        return Err(failed(err));
    }
    Ok(())
}
