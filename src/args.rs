use crate::formatting::Listing;
use crate::matcher::SearchOptions;
use std::error::Error;

pub struct ArgParser {
    iter: std::vec::IntoIter<String>,
    command_name: String,
}

impl ArgParser {
    pub fn new(args: Vec<String>, command_name: &str) -> Self {
        Self { iter: args.into_iter(), command_name: command_name.to_string() }
    }

    /// Extract a string value for a flag
    pub fn extract_value(
        &mut self,
        flag: &str,
    ) -> Result<String, Box<dyn Error>> {
        self.iter.next().ok_or_else(|| {
            format!("Provide a value after {} for {}", flag, self.command_name)
                .into()
        })
    }

    /// Extract a non-negative number for a flag
    pub fn extract_number(
        &mut self,
        flag: &str,
    ) -> Result<usize, Box<dyn Error>> {
        let value = self.extract_value(flag)?;
        value.parse().map_err(|_| {
            format!("{} for {} must be a number", flag, self.command_name)
                .into()
        })
    }

    /// Get next positional argument
    #[allow(clippy::should_implement_trait)]
    pub fn next(&mut self) -> Option<String> {
        self.iter.next()
    }

    /// Collect remaining args
    pub fn collect_remaining(self) -> Vec<String> {
        self.iter.collect()
    }
}

/// Flags shared by the commands that search the notes tree.
#[derive(Default, Debug)]
pub struct SearchFlags {
    pub include_archives: bool,
    pub full_text: bool,
    pub match_any: bool,
    pub by_tag: bool,
    pub raw: bool,
    pub limit: Option<usize>,
    pub terms: Vec<String>,
}

impl SearchFlags {
    pub fn parse(
        args: Vec<String>,
        command_name: &str,
    ) -> Result<Self, Box<dyn Error>> {
        let mut parser = ArgParser::new(args, command_name);
        let mut flags = Self::default();
        while let Some(arg) = parser.next() {
            match arg.as_str() {
                "-a" | "--all" => flags.include_archives = true,
                "-f" | "--full" => flags.full_text = true,
                "--any" => flags.match_any = true,
                "-t" | "--by-tag" => flags.by_tag = true,
                "--raw" => flags.raw = true,
                "-n" | "--limit" => flags.limit = Some(parser.extract_number(&arg)?),
                other if other.starts_with('-') && other.len() > 1 => {
                    return Err(format!(
                        "Unknown flag for {command_name}: {other}"
                    )
                    .into());
                }
                other => flags.terms.push(other.to_string()),
            }
        }
        Ok(flags)
    }

    pub fn options(&self) -> SearchOptions {
        SearchOptions {
            include_archives: self.include_archives,
            full_text: self.full_text,
            match_any: self.match_any,
        }
    }

    pub fn listing(&self) -> Listing {
        Listing { by_tag: self.by_tag, raw: self.raw, max_display: self.limit }
    }
}
