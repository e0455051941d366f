use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

pub const CONFIG_ENV: &str = "MINION_CONFIG";
pub const NOTES_DIR_ENV: &str = "MINION_NOTES_DIR";
const CONFIG_FILE: &str = ".minion.toml";

/// Settings read once at startup and handed to the matcher, the filing engine
/// and the triage session.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    pub notes: NotesSettings,
    pub compose: ComposeSettings,
    pub date: DateSettings,
    /// Extension (".pdf") to viewer program.
    pub viewers: BTreeMap<String, String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct NotesSettings {
    pub home: String,
    pub favorites: Vec<String>,
    pub included_extensions: Vec<String>,
    pub excluded_extensions: Vec<String>,
}

impl Default for NotesSettings {
    fn default() -> Self {
        Self {
            home: "~/minion/notes".into(),
            favorites: ["inbox", "today", "next", "soon", "someday"]
                .iter()
                .map(|s| s.to_string())
                .collect(),
            included_extensions: vec!["*".into()],
            excluded_extensions: vec!["~".into()],
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ComposeSettings {
    pub extension: String,
    /// May be quoted (`"' '"`) so a space can be used.
    pub filename_sep: String,
    pub editor: String,
    /// Program used by `!view`; `builtin` renders in the terminal.
    pub viewer: String,
    pub tagline: String,
}

impl Default for ComposeSettings {
    fn default() -> Self {
        Self {
            extension: ".txt".into(),
            filename_sep: "-".into(),
            editor: "vim".into(),
            viewer: "builtin".into(),
            tagline: ":tags:".into(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct DateSettings {
    pub format: String,
}

impl Default for DateSettings {
    fn default() -> Self {
        Self { format: "%Y-%m-%d".into() }
    }
}

impl Settings {
    /// Load from `$MINION_CONFIG` (or `~/.minion.toml`), then apply
    /// `$MINION_NOTES_DIR`.
    pub fn load() -> Result<Self> {
        let path = std::env::var(CONFIG_ENV)
            .map(PathBuf::from)
            .unwrap_or_else(|_| expand_home(&format!("~/{CONFIG_FILE}")));
        let mut settings = Self::load_from(&path)?;
        if let Ok(dir) = std::env::var(NOTES_DIR_ENV) {
            settings.notes.home = dir;
        }
        Ok(settings)
    }

    /// A missing file yields the defaults.
    pub fn load_from(path: &Path) -> Result<Self> {
        if !path.exists() {
            tracing::debug!(path = %path.display(), "no settings file, using defaults");
            return Ok(Self::default());
        }
        let content = fs::read_to_string(path)?;
        let settings: Settings = toml::from_str(&content)?;
        settings.validate()?;
        Ok(settings)
    }

    fn validate(&self) -> Result<()> {
        let tagline = self.compose.tagline.trim();
        if tagline.is_empty() {
            return Err(Error::Config("compose.tagline must not be empty".into()));
        }
        if tagline.contains(' ') {
            tracing::warn!(
                tagline = %self.compose.tagline,
                "spaces in compose.tagline may cause tag duplication"
            );
        }
        if self.filename_separator().is_empty() {
            return Err(Error::Config(
                "compose.filename_sep must not be empty".into(),
            ));
        }
        Ok(())
    }

    pub fn notes_home(&self) -> PathBuf {
        expand_home(&self.notes.home)
    }

    pub fn inbox(&self) -> PathBuf {
        self.notes_home().join("inbox")
    }

    pub fn tag_indicator(&self) -> &str {
        self.compose.tagline.trim()
    }

    /// The separator with surrounding quotes removed: `' '` becomes a space.
    pub fn filename_separator(&self) -> String {
        let raw = &self.compose.filename_sep;
        if raw.chars().count() > 1 {
            raw.chars().nth(1).map(String::from).unwrap_or_default()
        } else {
            raw.clone()
        }
    }

    /// Look up a single value by section and key, rendered as text.
    pub fn lookup(&self, section: &str, key: &str) -> Option<String> {
        let value = match (section, key) {
            ("notes", "home") => self.notes.home.clone(),
            ("notes", "favorites") => self.notes.favorites.join(", "),
            ("notes", "included_extensions") => {
                self.notes.included_extensions.join(", ")
            }
            ("notes", "excluded_extensions") => {
                self.notes.excluded_extensions.join(", ")
            }
            ("compose", "extension") => self.compose.extension.clone(),
            ("compose", "filename_sep") => self.filename_separator(),
            ("compose", "editor") => self.compose.editor.clone(),
            ("compose", "viewer") => self.compose.viewer.clone(),
            ("compose", "tagline") => self.tag_indicator().to_string(),
            ("date", "format") => self.date.format.clone(),
            ("viewers", ext) => self.viewers.get(ext)?.clone(),
            _ => return None,
        };
        Some(value)
    }

    pub fn to_toml(&self) -> Result<String> {
        toml::to_string_pretty(self).map_err(|e| Error::Config(e.to_string()))
    }
}

/// Expand a leading `~` using `$HOME`; other paths are returned as given.
pub fn expand_home(path: &str) -> PathBuf {
    let rest = if path == "~" {
        Some("")
    } else {
        path.strip_prefix("~/")
    };
    match (rest, std::env::var("HOME")) {
        (Some(rest), Ok(home)) => PathBuf::from(home).join(rest),
        _ => PathBuf::from(path),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_defaults() {
        let s = Settings::default();
        assert_eq!(s.tag_indicator(), ":tags:");
        assert_eq!(s.filename_separator(), "-");
        assert_eq!(s.compose.extension, ".txt");
        assert_eq!(s.notes.included_extensions, vec!["*"]);
        assert_eq!(s.notes.excluded_extensions, vec!["~"]);
    }

    #[test]
    fn test_missing_file_uses_defaults() {
        let tmp = tempdir().unwrap();
        let s = Settings::load_from(&tmp.path().join("nope.toml")).unwrap();
        assert_eq!(s.date.format, "%Y-%m-%d");
    }

    #[test]
    fn test_partial_file_keeps_other_defaults() {
        let tmp = tempdir().unwrap();
        let path = tmp.path().join("minion.toml");
        fs::write(
            &path,
            "[notes]\nhome = \"/tmp/n\"\n\n[compose]\ntagline = \"#tags\"\n\n[viewers]\n\".pdf\" = \"evince\"\n",
        )
        .unwrap();
        let s = Settings::load_from(&path).unwrap();
        assert_eq!(s.notes_home(), PathBuf::from("/tmp/n"));
        assert_eq!(s.tag_indicator(), "#tags");
        assert_eq!(s.compose.extension, ".txt");
        assert_eq!(s.lookup("viewers", ".pdf").as_deref(), Some("evince"));
    }

    #[test]
    fn test_empty_tagline_rejected() {
        let tmp = tempdir().unwrap();
        let path = tmp.path().join("minion.toml");
        fs::write(&path, "[compose]\ntagline = \"  \"\n").unwrap();
        assert!(matches!(Settings::load_from(&path), Err(Error::Config(_))));
    }

    #[test]
    fn test_quoted_separator() {
        let mut s = Settings::default();
        s.compose.filename_sep = "' '".into();
        assert_eq!(s.filename_separator(), " ");
        assert_eq!(s.lookup("compose", "filename_sep").as_deref(), Some(" "));
    }

    #[test]
    fn test_lookup_unknown_key() {
        let s = Settings::default();
        assert_eq!(s.lookup("notes", "colour"), None);
        assert_eq!(
            s.lookup("notes", "favorites").as_deref(),
            Some("inbox, today, next, soon, someday")
        );
    }

    #[test]
    fn test_to_toml_round_trips() {
        let s = Settings::default();
        let text = s.to_toml().unwrap();
        let back: Settings = toml::from_str(&text).unwrap();
        assert_eq!(back.compose.tagline, s.compose.tagline);
    }

    #[test]
    fn test_expand_home_leaves_plain_paths() {
        assert_eq!(expand_home("/abs/path"), PathBuf::from("/abs/path"));
        assert_eq!(expand_home("rel"), PathBuf::from("rel"));
    }
}
