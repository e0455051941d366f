//! Filing command grammar.
//!
//! A command is free text typed at the triage prompt. Directives are found
//! anywhere in it; anything else is ignored. `FilingCommand::plan` fixes the
//! order in which the filing engine applies them.

use regex::Regex;
use std::sync::OnceLock;

pub const CALENDAR_TOKENS: [&str; 24] = [
    "@Jan", "@Feb", "@Mar", "@Apr", "@May", "@Jun", "@Jul", "@Aug", "@Sep",
    "@Oct", "@Nov", "@Dec", ":Jan", ":Feb", ":Mar", ":Apr", ":May", ":Jun",
    ":Jul", ":Aug", ":Sep", ":Oct", ":Nov", ":Dec",
];

const RENAME: &str = "!rename";
const REVIEW: &str = "!review";
const VIEW: &str = "!view";

/// Whole-command shorthands.
const ALIASES: &[(&str, &str)] = &[
    ("a", ">wiki/archive"),
    ("w", ">wiki"),
    ("wc", ">wiki/cites"),
    ("wp", ">wiki/personal"),
    ("d", ">archive"),
    ("r", RENAME),
    ("#", REVIEW),
    ("v", VIEW),
];

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Directive {
    /// New base name, or `None` to ask for one.
    Rename(Option<String>),
    Review,
    TagAdd(String),
    TagRemove(String),
    /// A month token; the note goes to the `calendar` folder.
    Calendar(String),
    FolderRoute(String),
    View,
}

impl Directive {
    fn rank(&self) -> u8 {
        match self {
            Directive::Rename(_) => 0,
            Directive::Review => 1,
            Directive::TagAdd(_) => 2,
            Directive::TagRemove(_) => 3,
            Directive::Calendar(_) => 4,
            Directive::FolderRoute(_) => 5,
            Directive::View => 6,
        }
    }

    fn short_circuits(&self) -> bool {
        matches!(self, Directive::Rename(_) | Directive::Review)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FilingCommand {
    directives: Vec<Directive>,
}

fn tag_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"(-?)@(\w+)").expect("valid tag pattern"))
}

fn folder_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r">(\S+)").expect("valid folder pattern"))
}

/// Replace a shorthand command with its full form.
pub fn expand_short_command(command: &str) -> &str {
    ALIASES
        .iter()
        .find(|(short, _)| *short == command)
        .map(|(_, full)| *full)
        .unwrap_or(command)
}

impl FilingCommand {
    pub fn parse(text: &str) -> Self {
        let text = expand_short_command(text.trim());
        let mut directives = Vec::new();

        if text.contains(RENAME) {
            let name = text.replace(RENAME, "").trim().to_string();
            directives.push(Directive::Rename((!name.is_empty()).then_some(name)));
        }
        if text.contains(REVIEW) {
            directives.push(Directive::Review);
        }
        for caps in tag_re().captures_iter(text) {
            let tag = caps[2].to_string();
            if caps[1].is_empty() {
                directives.push(Directive::TagAdd(tag));
            } else {
                directives.push(Directive::TagRemove(tag));
            }
        }
        if let Some(token) = CALENDAR_TOKENS.iter().find(|t| text.contains(*t)) {
            directives.push(Directive::Calendar(token.to_string()));
        }
        if let Some(caps) = folder_re().captures(text) {
            directives.push(Directive::FolderRoute(caps[1].to_string()));
        }
        if text.contains(VIEW) {
            directives.push(Directive::View);
        }
        Self { directives }
    }

    pub fn is_empty(&self) -> bool {
        self.directives.is_empty()
    }

    pub fn directives(&self) -> &[Directive] {
        &self.directives
    }

    /// Directives in application order. A rename or review stands alone; a
    /// calendar token replaces any folder route.
    pub fn plan(&self) -> Vec<&Directive> {
        let mut ordered: Vec<&Directive> = self.directives.iter().collect();
        ordered.sort_by_key(|d| d.rank());
        if let Some(first) = ordered.first().copied() {
            if first.short_circuits() {
                return vec![first];
            }
        }
        let calendar = ordered.iter().any(|d| matches!(d, Directive::Calendar(_)));
        ordered.retain(|d| !(calendar && matches!(d, Directive::FolderRoute(_))));
        ordered
    }

    pub fn tags_to_add(&self) -> Vec<String> {
        self.plan()
            .into_iter()
            .filter_map(|d| match d {
                Directive::TagAdd(t) => Some(t.clone()),
                _ => None,
            })
            .collect()
    }

    pub fn tags_to_remove(&self) -> Vec<String> {
        self.plan()
            .into_iter()
            .filter_map(|d| match d {
                Directive::TagRemove(t) => Some(t.clone()),
                _ => None,
            })
            .collect()
    }
}
