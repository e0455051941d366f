use std::collections::BTreeSet;

/// Tags on a line holding `indicator` as a whole token, indicator removed.
pub fn parse_tag_line(line: &str, indicator: &str) -> Vec<String> {
    let tokens: Vec<&str> = line
        .trim_end_matches('\r')
        .split(' ')
        .filter(|t| !t.is_empty())
        .collect();
    if !tokens.contains(&indicator) {
        return Vec::new();
    }
    tokens
        .into_iter()
        .filter(|t| *t != indicator)
        .map(str::to_string)
        .collect()
}

/// Tags of the first line that carries any.
pub fn extract_tags(text: &str, indicator: &str) -> Vec<String> {
    text.split('\n')
        .map(|line| parse_tag_line(line, indicator))
        .find(|tags| !tags.is_empty())
        .unwrap_or_default()
}

/// Normalize a tag: lowercase, no line breaks, no surrounding whitespace.
pub fn normalize_tag(t: &str) -> String {
    t.replace(['\r', '\n'], "").trim().to_lowercase()
}

/// Serialize tags as `<indicator> a b c`, deduplicated and sorted.
pub fn build_tag_line<S: AsRef<str>>(tags: &[S], indicator: &str) -> String {
    let unique: BTreeSet<String> = tags
        .iter()
        .map(|t| normalize_tag(t.as_ref()))
        .filter(|t| !t.is_empty() && t != &indicator.to_lowercase())
        .collect();
    let mut line = indicator.to_string();
    for tag in unique {
        line.push(' ');
        line.push_str(&tag);
    }
    line
}

fn is_tag_line(line: &str, indicator: &str) -> bool {
    line.trim_end_matches('\r').split(' ').any(|t| t == indicator)
}

/// Split text into lines without the trailing newline, remembering whether
/// there was one.
fn split_lines(text: &str) -> (Vec<String>, bool) {
    if text.is_empty() {
        return (Vec::new(), false);
    }
    let (body, trailing) = match text.strip_suffix('\n') {
        Some(body) => (body, true),
        None => (text, false),
    };
    let lines = body
        .split('\n')
        .map(|l| l.trim_end_matches('\r').to_string())
        .collect();
    (lines, trailing)
}

fn join_lines(lines: Vec<String>, trailing: bool) -> String {
    let mut out = lines.join("\n");
    if trailing {
        out.push('\n');
    }
    out
}

/// Union `new_tags` into the first tag line, or append a tag line.
pub fn add_tags<S: AsRef<str>>(
    text: &str,
    new_tags: &[S],
    indicator: &str,
) -> String {
    let (mut lines, trailing) = split_lines(text);
    let new_tags = new_tags.iter().map(|t| t.as_ref().to_string());
    match lines.iter().position(|l| is_tag_line(l, indicator)) {
        Some(idx) => {
            let mut all = parse_tag_line(&lines[idx], indicator);
            all.extend(new_tags);
            lines[idx] = build_tag_line(&all, indicator);
        }
        None => {
            let all: Vec<String> = new_tags.collect();
            lines.push(build_tag_line(&all, indicator));
        }
    }
    join_lines(lines, trailing)
}

/// Drop `remove` (case-insensitive) from the first tag line.
pub fn remove_tags<S: AsRef<str>>(
    text: &str,
    remove: &[S],
    indicator: &str,
) -> String {
    let (mut lines, trailing) = split_lines(text);
    let Some(idx) = lines.iter().position(|l| is_tag_line(l, indicator)) else {
        return text.to_string();
    };
    let remove: Vec<String> =
        remove.iter().map(|t| normalize_tag(t.as_ref())).collect();
    let kept: Vec<String> = parse_tag_line(&lines[idx], indicator)
        .into_iter()
        .filter(|t| !remove.contains(&normalize_tag(t)))
        .collect();
    lines[idx] = build_tag_line(&kept, indicator);
    join_lines(lines, trailing)
}

/// Hash a tag for deterministic color selection
pub fn hash_tag(tag: &str) -> u64 {
    let mut h: u64 = 5381;
    for b in tag.bytes() {
        h = (h.wrapping_shl(5)).wrapping_add(h) ^ u64::from(b);
    }
    h
}

/// Get color for a tag based on hash
pub fn color_for_tag(tag: &str) -> (u8, u8, u8) {
    const PALETTE: &[(u8, u8, u8)] = &[
        (137, 180, 250),
        (166, 227, 161),
        (249, 226, 175),
        (245, 194, 231),
        (255, 169, 167),
        (148, 226, 213),
        (198, 160, 246),
        (240, 198, 198),
        (181, 232, 224),
        (183, 189, 248),
        (255, 214, 165),
        (196, 222, 255),
    ];
    let h = hash_tag(tag);
    PALETTE[(h as usize) % PALETTE.len()]
}
