use crate::config::Settings;
use crate::error::{Error, Result};
use crate::render::render_markdown;
use std::collections::BTreeMap;
use std::fs;
use std::path::Path;
use std::process::{Command, Stdio};

/// Viewer name that renders the note in the terminal instead of spawning.
pub const BUILTIN_VIEWER: &str = "builtin";

/// Shows or edits notes outside the triage loop.
pub trait Launcher {
    fn preview(&mut self, path: &Path) -> Result<()>;

    /// Open for editing, positioned at `line` when the editor supports it.
    fn open(&mut self, path: &Path, line: usize) -> Result<()>;
}

/// Spawns the configured viewer or editor as a child process.
pub struct ProcessLauncher {
    programs: BTreeMap<String, String>,
    viewer: String,
    editor: String,
    use_color: bool,
}

impl ProcessLauncher {
    pub fn new(settings: &Settings, use_color: bool) -> Self {
        let programs = settings
            .viewers
            .iter()
            .map(|(ext, program)| (normalize_ext(ext), program.clone()))
            .collect();
        Self {
            programs,
            viewer: settings.compose.viewer.clone(),
            editor: settings.compose.editor.clone(),
            use_color,
        }
    }

    fn program_for_ext(&self, path: &Path) -> Option<&String> {
        let ext = path.extension()?.to_string_lossy();
        self.programs.get(&normalize_ext(&ext))
    }

    /// Per-extension program, then `$EDITOR`, then the configured editor.
    pub fn editor_for(&self, path: &Path) -> String {
        if let Some(program) = self.program_for_ext(path) {
            return program.clone();
        }
        std::env::var("EDITOR")
            .ok()
            .filter(|e| !e.trim().is_empty())
            .unwrap_or_else(|| self.editor.clone())
    }

    pub fn viewer_for(&self, path: &Path) -> String {
        self.program_for_ext(path)
            .cloned()
            .unwrap_or_else(|| self.viewer.clone())
    }

    fn print_builtin(&self, path: &Path) -> Result<()> {
        let text = fs::read_to_string(path)?;
        println!("{}\n", render_markdown(&text, self.use_color));
        Ok(())
    }
}

impl Launcher for ProcessLauncher {
    fn preview(&mut self, path: &Path) -> Result<()> {
        let viewer = self.viewer_for(path);
        tracing::info!(path = %path.display(), viewer = %viewer, "viewing note");
        if viewer == BUILTIN_VIEWER {
            return self.print_builtin(path);
        }
        run(&viewer, path, None)
    }

    fn open(&mut self, path: &Path, line: usize) -> Result<()> {
        println!("Opening {}", path.display());
        let editor = self.editor_for(path);
        let jump = supports_line_jump(&editor).then_some(line);
        run(&editor, path, jump)
    }
}

fn normalize_ext(ext: &str) -> String {
    format!(".{}", ext.trim().trim_start_matches('.').to_lowercase())
}

fn supports_line_jump(program: &str) -> bool {
    let name = program.split_whitespace().next().unwrap_or_default();
    let base = Path::new(name)
        .file_name()
        .map(|n| n.to_string_lossy().to_string())
        .unwrap_or_default();
    matches!(base.as_str(), "vim" | "nvim" | "vi" | "gvim")
}

/// `program` may carry its own arguments (`less -R`).
fn run(program: &str, path: &Path, line: Option<usize>) -> Result<()> {
    let mut parts = program.split_whitespace();
    let name = parts
        .next()
        .ok_or_else(|| Error::Config("empty viewer or editor".into()))?;
    let mut cmd = Command::new(name);
    cmd.args(parts).arg(path);
    if let Some(line) = line {
        cmd.arg(format!("+{line}"));
    }
    let status = cmd
        .stdin(Stdio::inherit())
        .stdout(Stdio::inherit())
        .stderr(Stdio::inherit())
        .status()?;
    if !status.success() {
        return Err(Error::Launch { program: name.to_string(), status });
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn launcher() -> ProcessLauncher {
        let mut settings = Settings::default();
        settings.viewers.insert("PDF".into(), "evince".into());
        settings.viewers.insert(".md".into(), "glow -p".into());
        ProcessLauncher::new(&settings, false)
    }

    #[test]
    fn test_viewer_by_extension() {
        let l = launcher();
        assert_eq!(l.viewer_for(Path::new("a/paper.pdf")), "evince");
        assert_eq!(l.viewer_for(Path::new("a/plan.MD")), "glow -p");
        assert_eq!(l.viewer_for(Path::new("a/note.txt")), BUILTIN_VIEWER);
        assert_eq!(l.editor_for(Path::new("x.pdf")), "evince");
    }

    #[test]
    fn test_line_jump_only_for_vi_family() {
        assert!(supports_line_jump("vim"));
        assert!(supports_line_jump("/usr/bin/nvim -u NONE"));
        assert!(!supports_line_jump("code --wait"));
    }

    #[test]
    fn test_run_reports_failure() {
        let err = run("false", Path::new("x"), None).unwrap_err();
        assert!(matches!(err, Error::Launch { .. }));
        assert!(run("true", Path::new("x"), Some(3)).is_ok());
    }
}
