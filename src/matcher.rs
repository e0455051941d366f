use crate::config::Settings;
use crate::error::{Error, Result};
use crate::tags::extract_tags;
use std::fs;
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

const ARCHIVE_MARK: &str = "archive";
const SWAP_MARK: &str = "swp";

/// Outcome of a best-effort read of a note's text.
#[derive(Debug)]
pub enum NoteText {
    Readable(String),
    Unreadable,
}

impl NoteText {
    pub fn read(path: &Path) -> Self {
        match fs::read_to_string(path) {
            Ok(text) => NoteText::Readable(text),
            Err(err) => {
                tracing::debug!(path = %path.display(), error = %err, "note not readable");
                NoteText::Unreadable
            }
        }
    }

    /// Lowercased tags from the tag line.
    pub fn tags(&self, indicator: &str) -> Vec<String> {
        match self {
            NoteText::Readable(text) => extract_tags(text, indicator)
                .into_iter()
                .map(|t| t.to_lowercase())
                .collect(),
            NoteText::Unreadable => Vec::new(),
        }
    }

    /// Case-insensitive search; `term` must already be lowercase.
    pub fn contains(&self, term: &str) -> bool {
        match self {
            NoteText::Readable(text) => text.to_lowercase().contains(term),
            NoteText::Unreadable => false,
        }
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct SearchOptions {
    pub include_archives: bool,
    /// Fall back to the note text when name and tags miss.
    pub full_text: bool,
    /// Keep files matching any term instead of all of them.
    pub match_any: bool,
}

/// Finds and filters notes under the notes root.
#[derive(Debug, Clone)]
pub struct Matcher {
    root: PathBuf,
    included: Vec<String>,
    excluded: Vec<String>,
    indicator: String,
}

fn clean_list(items: &[String]) -> Vec<String> {
    items
        .iter()
        .map(|s| s.replace(' ', ""))
        .filter(|s| !s.is_empty())
        .collect()
}

impl Matcher {
    pub fn new(settings: &Settings) -> Self {
        Self {
            root: settings.notes_home(),
            included: clean_list(&settings.notes.included_extensions),
            excluded: clean_list(&settings.notes.excluded_extensions),
            indicator: settings.tag_indicator().to_string(),
        }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Lazily walk every note under the root. Call again to restart.
    pub fn list_files(&self, include_archives: bool) -> NoteWalk<'_> {
        NoteWalk {
            matcher: self,
            include_archives,
            inner: WalkDir::new(&self.root).sort_by_file_name().into_iter(),
        }
    }

    pub fn count_all(&self, include_archives: bool) -> usize {
        self.list_files(include_archives).count()
    }

    fn accepts(&self, path: &Path, include_archives: bool) -> bool {
        let name = path
            .file_name()
            .map(|n| n.to_string_lossy().to_string())
            .unwrap_or_default();
        if self.excluded.iter().any(|ext| name.ends_with(ext.as_str())) {
            return false;
        }
        let included = self
            .included
            .iter()
            .any(|ext| ext.contains('*') || name.ends_with(ext.as_str()));
        included && (include_archives || !self.is_archived(path))
    }

    fn is_archived(&self, path: &Path) -> bool {
        path.to_string_lossy().to_lowercase().contains(ARCHIVE_MARK)
    }

    /// Keep candidates whose path or tags mention `term`, or, with
    /// `full_text`, whose text does.
    pub fn narrow(
        &self,
        candidates: &[PathBuf],
        term: &str,
        full_text: bool,
    ) -> Vec<PathBuf> {
        let term = term.to_lowercase();
        candidates
            .iter()
            .filter(|path| self.keeps(path, &term, full_text))
            .cloned()
            .collect()
    }

    fn keeps(&self, path: &Path, term: &str, full_text: bool) -> bool {
        let shown = path.to_string_lossy().to_lowercase();
        let text = NoteText::read(path);
        let named = shown.contains(term)
            || text.tags(&self.indicator).iter().any(|t| t == term);
        if named {
            return !shown.contains(SWAP_MARK);
        }
        full_text && text.contains(term)
    }

    fn matches_any<S: AsRef<str>>(&self, path: &Path, terms: &[S]) -> bool {
        let shown = path.to_string_lossy().to_lowercase();
        let tags = NoteText::read(path).tags(&self.indicator);
        terms.iter().any(|term| {
            let term = term.as_ref().to_lowercase();
            shown.contains(&term) || tags.contains(&term)
        })
    }

    /// Chain `narrow` once per filter, or keep files matching any filter.
    pub fn find_files<S: AsRef<str>>(
        &self,
        filters: &[S],
        opts: SearchOptions,
    ) -> Vec<PathBuf> {
        let files: Vec<PathBuf> = self.list_files(opts.include_archives).collect();
        if opts.match_any {
            return files
                .into_iter()
                .filter(|path| self.matches_any(path, filters))
                .collect();
        }
        filters.iter().fold(files, |acc, term| {
            self.narrow(&acc, term.as_ref(), opts.full_text)
        })
    }

    /// Space-separated keywords, all of which must match.
    pub fn keyword_files(&self, keywords: &str, opts: SearchOptions) -> Vec<PathBuf> {
        let terms: Vec<&str> =
            keywords.split(' ').filter(|k| !k.is_empty()).collect();
        self.find_files(&terms, opts)
    }

    pub fn inbox_files(&self) -> Vec<PathBuf> {
        self.find_files(&["inbox"], SearchOptions::default())
    }

    fn top_level_folders(&self) -> Vec<(String, PathBuf)> {
        let Ok(entries) = fs::read_dir(&self.root) else {
            return Vec::new();
        };
        let mut folders: Vec<(String, PathBuf)> = entries
            .flatten()
            .filter(|e| e.file_type().map(|ft| ft.is_dir()).unwrap_or(false))
            .map(|e| (e.file_name().to_string_lossy().to_string(), e.path()))
            .filter(|(name, _)| !name.contains(ARCHIVE_MARK))
            .collect();
        folders.sort();
        folders
    }

    /// Files sitting in non-archive folders that hold at most `max` entries.
    pub fn stray_files(&self, max: usize) -> Vec<PathBuf> {
        let mut strays = Vec::new();
        for (_, dir) in self.top_level_folders() {
            let Ok(entries) = fs::read_dir(&dir) else { continue };
            let mut paths: Vec<PathBuf> =
                entries.flatten().map(|e| e.path()).collect();
            if paths.len() <= max {
                paths.sort();
                strays.extend(paths.into_iter().filter(|p| p.is_file()));
            }
        }
        strays
    }

    /// `(entry count, folder)` for each non-archive folder, largest first.
    pub fn folder_summary(&self) -> Vec<(usize, String)> {
        let mut summary: Vec<(usize, String)> = self
            .top_level_folders()
            .into_iter()
            .map(|(name, dir)| {
                let count = fs::read_dir(dir).map(|e| e.count()).unwrap_or(0);
                (count, name)
            })
            .collect();
        summary.sort_by(|a, b| b.cmp(a));
        summary
    }

    /// The summary restricted to the given favorite folder names.
    pub fn favorites_summary(&self, favorites: &[String]) -> Vec<(usize, String)> {
        let favorites: Vec<&str> = favorites.iter().map(|f| f.trim()).collect();
        self.folder_summary()
            .into_iter()
            .filter(|(_, name)| favorites.contains(&name.as_str()))
            .collect()
    }

    /// First file named exactly `name` anywhere under the root.
    pub fn find_file_named(&self, name: &str) -> Result<PathBuf> {
        WalkDir::new(&self.root)
            .sort_by_file_name()
            .into_iter()
            .filter_map(|e| e.ok())
            .find(|e| e.file_type().is_file() && e.file_name() == name)
            .map(|e| e.into_path())
            .ok_or_else(|| Error::NotFound(format!("no note named {name}")))
    }
}

/// Drop paths mentioning any of `terms` (case-insensitive).
pub fn remove_matching<S: AsRef<str>>(files: Vec<PathBuf>, terms: &[S]) -> Vec<PathBuf> {
    files
        .into_iter()
        .filter(|path| {
            let shown = path.to_string_lossy().to_lowercase();
            !terms
                .iter()
                .any(|t| shown.contains(&t.as_ref().to_lowercase()))
        })
        .collect()
}

/// Iterator over the notes under a root, in directory traversal order.
pub struct NoteWalk<'a> {
    matcher: &'a Matcher,
    include_archives: bool,
    inner: walkdir::IntoIter,
}

impl Iterator for NoteWalk<'_> {
    type Item = PathBuf;

    fn next(&mut self) -> Option<PathBuf> {
        loop {
            let entry = match self.inner.next()? {
                Ok(entry) => entry,
                Err(err) => {
                    tracing::debug!(error = %err, "skipping unreadable entry");
                    continue;
                }
            };
            if !entry.file_type().is_file() {
                continue;
            }
            let path = entry.into_path();
            if self.matcher.accepts(&path, self.include_archives) {
                return Some(path);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::{TempDir, tempdir};

    fn fixture() -> (TempDir, Matcher) {
        let tmp = tempdir().unwrap();
        let root = tmp.path();
        for dir in ["inbox", "wiki/cites", "archive.24.01", "work"] {
            fs::create_dir_all(root.join(dir)).unwrap();
        }
        let files = [
            ("inbox/foo.txt", "first note\n:tags: alpha\n"),
            ("inbox/bar.txt", "mentions Foo in text\n"),
            ("inbox/bar.txt~", "backup\n"),
            ("inbox/.foo.txt.swp", "swap\n"),
            ("wiki/cites/paper.txt", ":tags: reading beta\n"),
            ("archive.24.01/old.txt", "old foo\n"),
            ("work/plan.md", "plan\n:tags: beta\n"),
        ];
        for (name, body) in files {
            fs::write(root.join(name), body).unwrap();
        }
        let mut settings = Settings::default();
        settings.notes.home = root.to_string_lossy().to_string();
        let matcher = Matcher::new(&settings);
        (tmp, matcher)
    }

    fn names(paths: &[PathBuf], root: &Path) -> Vec<String> {
        paths
            .iter()
            .map(|p| p.strip_prefix(root).unwrap().to_string_lossy().to_string())
            .collect()
    }

    #[test]
    fn test_list_files_excludes_archives_and_backups() {
        let (tmp, m) = fixture();
        let files: Vec<PathBuf> = m.list_files(false).collect();
        assert_eq!(
            names(&files, tmp.path()),
            vec![
                "inbox/.foo.txt.swp",
                "inbox/bar.txt",
                "inbox/foo.txt",
                "wiki/cites/paper.txt",
                "work/plan.md",
            ]
        );
        assert!(files.iter().all(|p| !p.to_string_lossy().contains("archive")));
    }

    #[test]
    fn test_list_files_with_archives() {
        let (tmp, m) = fixture();
        let files: Vec<PathBuf> = m.list_files(true).collect();
        assert!(names(&files, tmp.path()).contains(&"archive.24.01/old.txt".to_string()));
        assert_eq!(m.count_all(true), m.count_all(false) + 1);
    }

    #[test]
    fn test_list_files_restartable() {
        let (_tmp, m) = fixture();
        let walk = m.list_files(false);
        let first: Vec<PathBuf> = walk.collect();
        let second: Vec<PathBuf> = m.list_files(false).collect();
        assert_eq!(first, second);
    }

    #[test]
    fn test_include_allowlist() {
        let (tmp, _) = fixture();
        let mut settings = Settings::default();
        settings.notes.home = tmp.path().to_string_lossy().to_string();
        settings.notes.included_extensions = vec![".md".into(), " ".into()];
        let m = Matcher::new(&settings);
        let files: Vec<PathBuf> = m.list_files(false).collect();
        assert_eq!(names(&files, tmp.path()), vec!["work/plan.md"]);
    }

    #[test]
    fn test_narrow_by_name() {
        let (tmp, m) = fixture();
        let candidates =
            vec![tmp.path().join("inbox/foo.txt"), tmp.path().join("inbox/bar.txt")];
        assert_eq!(m.narrow(&candidates, "foo", false), vec![tmp.path().join("inbox/foo.txt")]);
        assert_eq!(m.narrow(&candidates, "FOO", false).len(), 1);
    }

    #[test]
    fn test_narrow_full_text_and_tags() {
        let (tmp, m) = fixture();
        let all: Vec<PathBuf> = m.list_files(false).collect();
        let by_tag = m.narrow(&all, "beta", false);
        assert_eq!(names(&by_tag, tmp.path()), vec!["wiki/cites/paper.txt", "work/plan.md"]);
        // tag membership is whole-tag only
        assert!(m.narrow(&all, "bet", false).is_empty());

        let full = m.narrow(&all, "foo", true);
        assert_eq!(names(&full, tmp.path()), vec!["inbox/bar.txt", "inbox/foo.txt"]);
    }

    #[test]
    fn test_narrow_drops_swap_files() {
        let (tmp, m) = fixture();
        let swap = vec![tmp.path().join("inbox/.foo.txt.swp")];
        assert!(m.narrow(&swap, "foo", false).is_empty());
        assert!(m.narrow(&swap, "foo", true).is_empty());
    }

    #[test]
    fn test_narrow_drops_swap_folders() {
        let (tmp, m) = fixture();
        let dir = tmp.path().join("swpnotes");
        fs::create_dir_all(&dir).unwrap();
        fs::write(dir.join("foo.txt"), "foo\n").unwrap();
        let candidates = vec![dir.join("foo.txt"), tmp.path().join("inbox/foo.txt")];
        assert_eq!(m.narrow(&candidates, "foo", false), vec![tmp.path().join("inbox/foo.txt")]);
    }

    #[test]
    fn test_archive_anywhere_in_path_is_excluded() {
        let tmp = tempdir().unwrap();
        let root = tmp.path().join("archive-backup/notes");
        fs::create_dir_all(root.join("inbox")).unwrap();
        fs::write(root.join("inbox/a.txt"), "a\n").unwrap();
        let mut settings = Settings::default();
        settings.notes.home = root.to_string_lossy().to_string();
        let m = Matcher::new(&settings);
        assert_eq!(m.list_files(false).count(), 0);
        assert_eq!(m.list_files(true).collect::<Vec<_>>(), vec![root.join("inbox/a.txt")]);
    }

    #[test]
    fn test_narrow_unreadable_is_no_match() {
        let (tmp, m) = fixture();
        let missing = vec![tmp.path().join("inbox/gone.txt")];
        assert!(m.narrow(&missing, "text", true).is_empty());
        assert_eq!(m.narrow(&missing, "gone", true), missing);
    }

    #[test]
    fn test_find_files_and_vs_any() {
        let (tmp, m) = fixture();
        let and = m.find_files(&["inbox", "foo"], SearchOptions::default());
        assert_eq!(names(&and, tmp.path()), vec!["inbox/foo.txt"]);

        let any = m.find_files(
            &["alpha", "plan"],
            SearchOptions { match_any: true, ..Default::default() },
        );
        assert_eq!(names(&any, tmp.path()), vec!["inbox/foo.txt", "work/plan.md"]);

        let none: [&str; 0] = [];
        assert_eq!(m.find_files(&none, SearchOptions::default()).len(), 5);
    }

    #[test]
    fn test_keyword_and_inbox_files() {
        let (tmp, m) = fixture();
        let hits = m.keyword_files("wiki  reading", SearchOptions::default());
        assert_eq!(names(&hits, tmp.path()), vec!["wiki/cites/paper.txt"]);
        // the swap file names inbox too but is dropped
        assert_eq!(m.inbox_files().len(), 2);
    }

    #[test]
    fn test_summaries() {
        let (tmp, m) = fixture();
        assert_eq!(
            m.folder_summary(),
            vec![(4, "inbox".to_string()), (1, "work".to_string()), (1, "wiki".to_string())]
        );
        assert_eq!(
            m.favorites_summary(&["inbox".into(), " someday".into()]),
            vec![(4, "inbox".to_string())]
        );
        let strays = m.stray_files(1);
        assert_eq!(names(&strays, tmp.path()), vec!["work/plan.md"]);
    }

    #[test]
    fn test_find_file_named() {
        let (tmp, m) = fixture();
        assert_eq!(m.find_file_named("old.txt").unwrap(), tmp.path().join("archive.24.01/old.txt"));
        assert!(matches!(m.find_file_named("nope.txt"), Err(Error::NotFound(_))));
    }

    #[test]
    fn test_remove_matching() {
        let files = vec![PathBuf::from("a/Archive/x"), PathBuf::from("a/b")];
        assert_eq!(remove_matching(files, &["archive"]), vec![PathBuf::from("a/b")]);
    }
}
