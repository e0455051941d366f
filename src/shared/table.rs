//! Column layout helpers used by the CLI.
//! Widths ignore ANSI color codes so colored cells still line up.

const COLUMN_SEPARATOR: &str = " - ";

/// Two aligned columns joined by ` - `, one row per line. The left column
/// is padded to its widest cell.
pub fn format_2_cols(rows: &[(String, String)]) -> String {
    let width = rows.iter().map(|(left, _)| display_len(left)).max().unwrap_or(0);
    rows.iter()
        .map(|(left, right)| {
            let padded = pad_field(left, width, display_len(left));
            format!("{padded}{COLUMN_SEPARATOR}{right}")
        })
        .collect::<Vec<_>>()
        .join("\n")
}

/// Right-pad a field based on visible length (ignoring ANSI codes).
pub fn pad_field(display: &str, target: usize, plain_len: usize) -> String {
    let mut out = display.to_string();
    let padding = target.saturating_sub(plain_len);
    out.push_str(&" ".repeat(padding));
    out
}

/// Truncate text to a width, appending an ellipsis when needed.
pub fn truncate_with_ellipsis(text: &str, max_width: usize) -> String {
    if max_width == 0 {
        return String::new();
    }
    let len = text.chars().count();
    if len <= max_width {
        return text.to_string();
    }
    if max_width == 1 {
        return "…".to_string();
    }
    let mut out =
        text.chars().take(max_width.saturating_sub(1)).collect::<String>();
    out.push('…');
    out
}

/// Compute visible length of a string, ignoring ANSI escape sequences.
pub fn display_len(s: &str) -> usize {
    let mut len = 0;
    let mut chars = s.chars();
    while let Some(ch) = chars.next() {
        if ch == '\x1b' {
            for next in chars.by_ref() {
                if next == 'm' {
                    break;
                }
            }
            continue;
        }
        len += 1;
    }
    len
}
