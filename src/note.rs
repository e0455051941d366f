use crate::config::Settings;
use crate::dates;
use crate::error::Result;
use crate::tags;
use chrono::NaiveDate;
use std::fs::{self, OpenOptions};
use std::io::{self, Write};
use std::path::{Path, PathBuf};

/// A note file and a transient copy of its text.
#[derive(Debug, Clone)]
pub struct Note {
    pub path: PathBuf,
    pub text: String,
}

impl Note {
    pub fn load(path: &Path) -> Result<Self> {
        let text = fs::read_to_string(path)?;
        Ok(Self { path: path.to_path_buf(), text })
    }

    pub fn tags(&self, indicator: &str) -> Vec<String> {
        tags::extract_tags(&self.text, indicator)
    }

    pub fn dates(&self) -> Vec<NaiveDate> {
        dates::find_dates(&self.text)
    }

    pub fn first_date(&self) -> Result<NaiveDate> {
        dates::first_date(&self.text)
    }

    /// Add then remove tags on the tag line. Returns whether the text changed.
    pub fn update_tags(
        &mut self,
        add: &[String],
        remove: &[String],
        indicator: &str,
    ) -> bool {
        let before = self.text.clone();
        if !add.is_empty() {
            self.text = tags::add_tags(&self.text, add, indicator);
        }
        if !remove.is_empty() {
            self.text = tags::remove_tags(&self.text, remove, indicator);
        }
        self.text != before
    }

    pub fn save(&self) -> Result<()> {
        fs::write(&self.path, &self.text)?;
        Ok(())
    }
}

pub fn ensure_dir(path: &Path) -> io::Result<()> {
    if !path.exists() {
        fs::create_dir_all(path)?;
    }
    Ok(())
}

/// File name for a topic: spaces and slashes become the separator and the
/// configured extension is appended when missing.
pub fn string_to_file_name(topic: &str, settings: &Settings) -> String {
    let sep = settings.filename_separator();
    let name = topic.trim().replace([' ', '/'], &sep);
    let ext = settings.compose.extension.trim_start_matches('.');
    if ext.is_empty() || name.ends_with(&format!(".{ext}")) {
        name
    } else {
        format!("{}.{ext}", name.trim_end_matches('.'))
    }
}

/// Append `text` to an inbox note named after it.
pub fn remind(text: &str, settings: &Settings) -> Result<PathBuf> {
    let inbox = settings.inbox();
    ensure_dir(&inbox)?;
    let path = inbox.join(string_to_file_name(text, settings));
    let mut file = OpenOptions::new().create(true).append(true).open(&path)?;
    writeln!(file, "{text}")?;
    tracing::info!(path = %path.display(), "reminder written");
    Ok(path)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    fn settings_at(root: &Path) -> Settings {
        let mut s = Settings::default();
        s.notes.home = root.to_string_lossy().to_string();
        s
    }

    #[test]
    fn test_string_to_file_name() {
        let mut s = Settings::default();
        assert_eq!(string_to_file_name("weekly sync", &s), "weekly-sync.txt");
        assert_eq!(string_to_file_name("a/b ", &s), "a-b.txt");
        assert_eq!(string_to_file_name("done.txt", &s), "done.txt");
        assert_eq!(string_to_file_name("ends.", &s), "ends.txt");
        s.compose.filename_sep = "'_'".into();
        s.compose.extension = "md".into();
        assert_eq!(string_to_file_name("x y", &s), "x_y.md");
    }

    #[test]
    fn test_update_tags() {
        let tmp = tempdir().unwrap();
        let path = tmp.path().join("n.txt");
        fs::write(&path, "body\n:tags: alpha beta\n").unwrap();
        let mut note = Note::load(&path).unwrap();
        assert!(note.update_tags(&["gamma".into()], &["alpha".into()], ":tags:"));
        assert!(!note.update_tags(&[], &[], ":tags:"));
        note.save().unwrap();
        assert_eq!(fs::read_to_string(&path).unwrap(), "body\n:tags: beta gamma\n");
        assert_eq!(Note::load(&path).unwrap().tags(":tags:"), vec!["beta", "gamma"]);
    }

    #[test]
    fn test_note_dates() {
        let note = Note { path: PathBuf::from("x"), text: "on 2023-04-01 \n".into() };
        assert_eq!(note.dates().len(), 1);
        assert!(note.first_date().is_ok());
    }

    #[test]
    fn test_remind_appends() {
        let tmp = tempdir().unwrap();
        let s = settings_at(tmp.path());
        let first = remind("call bob", &s).unwrap();
        let second = remind("call bob", &s).unwrap();
        assert_eq!(first, second);
        assert_eq!(first, tmp.path().join("inbox/call-bob.txt"));
        assert_eq!(fs::read_to_string(first).unwrap(), "call bob\ncall bob\n");
    }
}
