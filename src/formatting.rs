use crate::config::Settings;
use crate::matcher::NoteText;
use crate::shared::table::truncate_with_ellipsis;
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use terminal_size::{Width, terminal_size};
use yansi::Paint;

const NO_TAGS: &str = "no tags";
const BAR_SLOTS: usize = 9;

/// Color palette for consistent theming
pub struct ColorPalette {
    pub primary: (u8, u8, u8),   // counts, muted text
    pub secondary: (u8, u8, u8), // headers, emphasis
}

impl ColorPalette {
    pub const CATPPUCCIN: Self = Self {
        primary: (108, 112, 134),   // Gray
        secondary: (148, 226, 213), // Teal
    };
}

/// Formatting context passed through rendering pipeline
pub struct FormatContext {
    pub use_color: bool,
    pub palette: ColorPalette,
    /// Lines longer than this are cut with an ellipsis.
    pub width: Option<usize>,
}

impl FormatContext {
    pub fn new(use_color: bool) -> Self {
        Self { use_color, palette: ColorPalette::CATPPUCCIN, width: None }
    }

    pub fn from_env() -> Self {
        let use_color = std::env::var("NO_COLOR").is_err();
        Self { width: terminal_columns(), ..Self::new(use_color) }
    }

    pub fn format_header(&self, text: &str) -> String {
        if self.use_color {
            let (r, g, b) = self.palette.secondary;
            Paint::rgb(text, r, g, b).bold().to_string()
        } else {
            text.to_string()
        }
    }

    pub fn format_count(&self, count: usize) -> String {
        if self.use_color {
            let (r, g, b) = self.palette.primary;
            Paint::rgb(&count.to_string(), r, g, b).to_string()
        } else {
            count.to_string()
        }
    }

    pub fn format_tag(&self, tag: &str) -> String {
        if self.use_color {
            let (r, g, b) = crate::tags::color_for_tag(tag);
            Paint::rgb(tag, r, g, b).bold().to_string()
        } else {
            tag.to_string()
        }
    }

    fn fit(&self, line: &str) -> String {
        match self.width {
            Some(width) => truncate_with_ellipsis(line, width),
            None => line.to_string(),
        }
    }
}

/// Width of the terminal on stdout, if there is one.
pub fn terminal_columns() -> Option<usize> {
    terminal_size().map(|(Width(w), _)| usize::from(w))
}

/// Human form of a note path: root and extension dropped, separators
/// become spaces and folders are joined with ` : `.
pub fn clean_path(path: &Path, settings: &Settings) -> String {
    let relative = path.strip_prefix(settings.notes_home()).unwrap_or(path);
    let mut text = relative.to_string_lossy().to_string();
    let ext = &settings.compose.extension;
    if !ext.is_empty() {
        if let Some(stripped) = text.strip_suffix(ext.as_str()) {
            text = stripped.to_string();
        }
    }
    let sep = settings.filename_separator();
    if !sep.is_empty() {
        text = text.replace(&sep, " ");
    }
    text.replace('/', " : ")
}

/// ASCII progress, e.g. `3/10 [###      ]`.
pub fn progress_bar(number: usize, total: usize) -> String {
    let denominator = total.max(1);
    let mut bar = format!("{number}/{total} [");
    for slot in 1..=BAR_SLOTS {
        bar.push(if slot * denominator <= number * 10 { '#' } else { ' ' });
    }
    bar.push(']');
    bar
}

#[derive(Debug, Clone, Copy, Default)]
pub struct Listing {
    /// Group under each file's first tag.
    pub by_tag: bool,
    /// Show full paths instead of cleaned names.
    pub raw: bool,
    pub max_display: Option<usize>,
}

/// Render a titled file listing.
pub fn display_output(
    ctx: &FormatContext,
    title: &str,
    files: &[PathBuf],
    settings: &Settings,
    listing: Listing,
) -> String {
    if files.is_empty() {
        return format!("\nNo {title} items.\n");
    }
    let shown = match listing.max_display {
        Some(max) if files.len() > max => &files[..max],
        _ => files,
    };
    let remaining = files.len() - shown.len();
    let label = |path: &Path| {
        if listing.raw {
            path.display().to_string()
        } else {
            clean_path(path, settings)
        }
    };

    let mut lines: Vec<String> = Vec::new();
    if listing.by_tag {
        let indicator = settings.tag_indicator();
        let mut groups: BTreeMap<String, Vec<String>> = BTreeMap::new();
        for path in shown {
            let tag = NoteText::read(path)
                .tags(indicator)
                .into_iter()
                .next()
                .unwrap_or_else(|| NO_TAGS.to_string());
            groups.entry(tag).or_default().push(label(path));
        }
        for (tag, items) in groups {
            lines.push(String::new());
            lines.push(format!("\t{}", ctx.format_tag(&tag)));
            lines.push("-------------------".to_string());
            lines.extend(items.iter().map(|item| ctx.fit(item)));
        }
    } else {
        lines.extend(shown.iter().map(|path| ctx.fit(&label(path))));
    }
    if remaining > 0 {
        lines.push(format!("{remaining} more results..."));
    }

    let mut out = String::new();
    if !title.is_empty() {
        out.push_str(&format!(
            "\n---- {}:\n-------------------------\n",
            ctx.format_header(title)
        ));
    }
    out.push_str(&lines.join("\n"));
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::tempdir;

    fn settings_at(root: &Path) -> Settings {
        let mut s = Settings::default();
        s.notes.home = root.to_string_lossy().to_string();
        s
    }

    #[test]
    fn test_format_context_no_color() {
        let ctx = FormatContext::new(false);
        assert_eq!(ctx.format_header("Header"), "Header");
        assert_eq!(ctx.format_tag("todo"), "todo");
        assert_eq!(ctx.format_count(7), "7");
    }

    #[test]
    fn test_format_context_with_color() {
        let ctx = FormatContext::new(true);
        let tag = ctx.format_tag("todo");
        assert!(tag.contains("todo"));
        assert!(tag.len() > "todo".len());
    }

    #[test]
    fn test_clean_path() {
        let s = settings_at(Path::new("/notes"));
        assert_eq!(
            clean_path(Path::new("/notes/inbox/weekly-sync.txt"), &s),
            "inbox : weekly sync"
        );
        assert_eq!(clean_path(Path::new("/other/a.md"), &s), " : other : a.md");
    }

    #[test]
    fn test_progress_bar() {
        assert_eq!(progress_bar(3, 10), "3/10 [###      ]");
        assert_eq!(progress_bar(10, 10), "10/10 [#########]");
        assert_eq!(progress_bar(1, 3), "1/3 [###      ]");
        assert_eq!(progress_bar(0, 0), "0/0 [         ]");
    }

    #[test]
    fn test_display_output_flat_and_truncated() {
        let s = settings_at(Path::new("/notes"));
        let ctx = FormatContext::new(false);
        let files: Vec<PathBuf> = ["a", "b", "c"]
            .iter()
            .map(|n| PathBuf::from(format!("/notes/inbox/{n}.txt")))
            .collect();
        let listing = Listing { max_display: Some(2), ..Default::default() };
        let out = display_output(&ctx, "Inbox", &files, &s, listing);
        assert!(out.starts_with("\n---- Inbox:\n"));
        assert!(out.ends_with("inbox : a\ninbox : b\n1 more results..."));

        let raw = Listing { raw: true, ..Default::default() };
        let out = display_output(&ctx, "", &files, &s, raw);
        assert_eq!(out, "/notes/inbox/a.txt\n/notes/inbox/b.txt\n/notes/inbox/c.txt");
    }

    #[test]
    fn test_display_output_empty() {
        let s = Settings::default();
        let out = display_output(&FormatContext::new(false), "Stray", &[], &s, Listing::default());
        assert_eq!(out, "\nNo Stray items.\n");
    }

    #[test]
    fn test_display_output_by_tag() {
        let tmp = tempdir().unwrap();
        let s = settings_at(tmp.path());
        let a = tmp.path().join("a.txt");
        let b = tmp.path().join("b.txt");
        fs::write(&a, ":tags: work todo\n").unwrap();
        fs::write(&b, "untagged\n").unwrap();
        let listing = Listing { by_tag: true, ..Default::default() };
        let out = display_output(&FormatContext::new(false), "", &[a, b], &s, listing);
        assert_eq!(
            out,
            "\n\tno tags\n-------------------\nb\n\n\twork\n-------------------\na"
        );
    }
}
