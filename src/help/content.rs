//! Help topics for every command, environment variable and guide.

pub(super) const TITLE: &str = "minion: file and find plain-text notes";
pub(super) const USAGE: &str = "minion <command> [options]";
pub(super) const FOOTER: &str =
    "Use `minion help <topic>` for focused docs, e.g. `minion help sort` or `minion help commands`.";

#[derive(Clone, Copy, PartialEq, Eq)]
pub(super) enum Kind {
    Command,
    Environment,
    Guide,
}

impl Kind {
    pub(super) const ALL: [Kind; 3] = [Kind::Command, Kind::Environment, Kind::Guide];

    pub(super) fn heading(self) -> &'static str {
        match self {
            Kind::Command => "Commands",
            Kind::Environment => "Environment",
            Kind::Guide => "Guides",
        }
    }
}

/// Flag name and what it does.
pub(super) type Flag = (&'static str, &'static str);

pub(super) struct Topic {
    pub name: &'static str,
    pub aliases: &'static [&'static str],
    pub kind: Kind,
    pub usage: &'static str,
    pub summary: &'static str,
    pub notes: &'static [&'static str],
    pub flags: &'static [Flag],
    pub examples: &'static [&'static str],
}

const SEARCH_FLAGS: &[Flag] = &[
    ("-a, --all", "Include archive folders."),
    ("-f, --full", "Fall back to the note text when name and tags miss."),
    ("--any", "Keep notes matching any term instead of all."),
    ("-t, --by-tag", "Group the listing by first tag."),
    ("--raw", "Print full paths."),
    ("-n, --limit <N>", "Show at most N results."),
];

pub(super) const TOPICS: &[Topic] = &[
    Topic {
        name: "find",
        summary: "List notes whose path or tags match every term.",
        usage: "minion find [terms...] [flags]",
        notes: &[
            "Terms are case-insensitive. A path matches by substring, a tag must match whole.",
            "Archive folders and files with excluded extensions are skipped unless --all is given.",
        ],
        flags: SEARCH_FLAGS,
        aliases: &["ls"],
        kind: Kind::Command,
        examples: &["minion find inbox call", "minion find -f budget --by-tag"],
    },
    Topic {
        name: "count",
        summary: "Count matching notes (all notes without terms).",
        usage: "minion count [terms...] [flags]",
        notes: &[],
        flags: SEARCH_FLAGS,
        aliases: &[],
        kind: Kind::Command,
        examples: &["minion count", "minion count --all archive"],
    },
    Topic {
        name: "pick",
        summary: "Narrow matches interactively and print the chosen path.",
        usage: "minion pick [terms...] [--file] [flags]",
        notes: &[
            "Each answer to `Selection?` narrows the set, searching note text too. A `!` stops early.",
            "Prompts go to stderr so the path on stdout can be captured.",
            "With --file the chosen note goes straight to the `Action?` prompt, which shows the terms typed so far.",
        ],
        flags: SEARCH_FLAGS,
        aliases: &[],
        kind: Kind::Command,
        examples: &["vim \"$(minion pick wiki)\"", "minion pick --file inbox"],
    },
    Topic {
        name: "sort",
        summary: "Triage matching notes one by one (the inbox by default).",
        usage: "minion sort [terms...] [flags]",
        notes: &[
            "Each note is shown with a progress bar and an `Action?` prompt taking a filing command.",
            "Answer `o` to open the note in your editor once the batch is done; an empty answer skips it.",
        ],
        flags: SEARCH_FLAGS,
        aliases: &["triage"],
        kind: Kind::Command,
        examples: &["minion sort", "minion sort work"],
    },
    Topic {
        name: "inbox",
        summary: "List the notes waiting in the inbox.",
        usage: "minion inbox [-n N] [--raw]",
        notes: &[],
        flags: &[],
        aliases: &[],
        kind: Kind::Command,
        examples: &["minion inbox -n 5"],
    },
    Topic {
        name: "apply",
        summary: "Apply a filing command to one note.",
        usage: "minion apply <note> <command...>",
        notes: &[
            "<note> is a path or a file name found anywhere under the notes root.",
            "Prints the note's final path. See `minion help commands` for the grammar.",
        ],
        flags: &[],
        aliases: &[],
        kind: Kind::Command,
        examples: &["minion apply call-bob.txt @phone >work", "minion apply plan.md d"],
    },
    Topic {
        name: "archive",
        summary: "Move notes to this month's archive folder.",
        usage: "minion archive <note...>",
        notes: &["The folder is named archive.YY.MM and created on demand."],
        flags: &[],
        aliases: &[],
        kind: Kind::Command,
        examples: &["minion archive inbox/old-idea.txt"],
    },
    Topic {
        name: "tags",
        summary: "Show a note's tags, or tag counts across all notes.",
        usage: "minion tags [note] [-a]",
        notes: &["Tags come from the first line holding the tag indicator."],
        flags: &[("-a, --all", "Count tags in archives too.")],
        aliases: &[],
        kind: Kind::Command,
        examples: &["minion tags", "minion tags plan.md"],
    },
    Topic {
        name: "dates",
        summary: "List the dates mentioned in a note.",
        usage: "minion dates <note>",
        notes: &[
            "Recognizes MM.DD.YYYY, MM/DD/YY and YYYY-MM-DD style dates between 2010 and 2049.",
        ],
        flags: &[],
        aliases: &[],
        kind: Kind::Command,
        examples: &["minion dates meeting.txt"],
    },
    Topic {
        name: "year",
        summary: "Notes whose first date falls in a year, oldest first.",
        usage: "minion year <YYYY> [terms...] [flags]",
        notes: &["The file name is searched before the note text."],
        flags: SEARCH_FLAGS,
        aliases: &[],
        kind: Kind::Command,
        examples: &["minion year 2023 --all"],
    },
    Topic {
        name: "remind",
        summary: "Append a line to an inbox note named after it.",
        usage: "minion remind <text...>",
        notes: &[],
        flags: &[],
        aliases: &[],
        kind: Kind::Command,
        examples: &["minion remind call bob"],
    },
    Topic {
        name: "folders",
        summary: "Entry counts per top-level folder, largest first.",
        usage: "minion folders",
        notes: &[],
        flags: &[],
        aliases: &[],
        kind: Kind::Command,
        examples: &[],
    },
    Topic {
        name: "favorites",
        summary: "Entry counts for the folders listed in notes.favorites.",
        usage: "minion favorites",
        notes: &[],
        flags: &[],
        aliases: &[],
        kind: Kind::Command,
        examples: &[],
    },
    Topic {
        name: "stray",
        summary: "Files sitting alone in nearly empty folders.",
        usage: "minion stray [max]",
        notes: &["Lists files in non-archive folders holding at most max entries (default 2)."],
        flags: &[],
        aliases: &[],
        kind: Kind::Command,
        examples: &["minion stray 1"],
    },
    Topic {
        name: "config",
        summary: "Print the effective settings, or one value.",
        usage: "minion config [section key]",
        notes: &[
            "Settings are read from $MINION_CONFIG or ~/.minion.toml; a missing file means defaults.",
        ],
        flags: &[],
        aliases: &[],
        kind: Kind::Command,
        examples: &["minion config", "minion config compose tagline"],
    },
    Topic {
        name: "path",
        summary: "Show the notes root.",
        usage: "minion path",
        notes: &[],
        flags: &[],
        aliases: &[],
        kind: Kind::Command,
        examples: &[],
    },
    Topic {
        name: "help",
        summary: "Show this overview or help for one topic.",
        usage: "minion help [topic]",
        notes: &[],
        flags: &[],
        aliases: &[],
        kind: Kind::Command,
        examples: &[],
    },
    Topic {
        name: "MINION_NOTES_DIR",
        summary: "Override the notes root from the settings file.",
        usage: "MINION_NOTES_DIR=/path minion ...",
        notes: &[],
        flags: &[],
        aliases: &[],
        kind: Kind::Environment,
        examples: &[],
    },
    Topic {
        name: "MINION_CONFIG",
        summary: "Settings file to read instead of ~/.minion.toml.",
        usage: "MINION_CONFIG=/path/minion.toml minion ...",
        notes: &[],
        flags: &[],
        aliases: &[],
        kind: Kind::Environment,
        examples: &[],
    },
    Topic {
        name: "MINION_LOG",
        summary: "Log filter for stderr diagnostics (default warn).",
        usage: "MINION_LOG=info minion sort",
        notes: &["Accepts tracing filter directives such as `debug` or `minion=info`."],
        flags: &[],
        aliases: &[],
        kind: Kind::Environment,
        examples: &[],
    },
    Topic {
        name: "NO_COLOR",
        summary: "Disable colored output.",
        usage: "NO_COLOR=1 minion find",
        notes: &[],
        flags: &[],
        aliases: &[],
        kind: Kind::Environment,
        examples: &[],
    },
    Topic {
        name: "EDITOR",
        summary: "Editor used to open notes when no per-extension viewer is set.",
        usage: "EDITOR=nvim minion sort",
        notes: &[],
        flags: &[],
        aliases: &[],
        kind: Kind::Environment,
        examples: &[],
    },
    Topic {
        name: "commands",
        summary: "Filing command grammar used at the Action? prompt.",
        usage: "minion help commands",
        notes: &[
            "@word adds a tag, -@word removes one. Tags land on the first line holding the tag indicator, or a new last line.",
            ">folder moves the note under the notes root (~ and absolute paths work too). `>archive` means archive.YY.MM.",
            "@Jan..@Dec or :Jan..:Dec sends the note to `calendar` instead of any >folder.",
            "!rename [name] renames in place and asks for a name when none is given; !review shows the note again; !view previews it first.",
            "Shorthands: a=>wiki/archive w=>wiki wc=>wiki/cites wp=>wiki/personal d=>archive r=!rename #=!review v=!view.",
            "Tags are applied before moves. Anything else in the command is ignored.",
        ],
        flags: &[],
        aliases: &["grammar", "actions"],
        kind: Kind::Guide,
        examples: &["@todo -@someday >work", "!rename weekly sync", ":Mar"],
    },
    Topic {
        name: "settings",
        summary: "What the TOML settings file can hold.",
        usage: "minion help settings",
        notes: &[
            "[notes] home, favorites, included_extensions, excluded_extensions.",
            "[compose] extension, filename_sep (quote it, e.g. \"' '\", to use a space), editor, viewer, tagline.",
            "[date] format (strftime) used by `minion dates`.",
            "[viewers] maps an extension such as \".pdf\" to a program; `builtin` renders in the terminal.",
        ],
        flags: &[],
        aliases: &["config-file"],
        kind: Kind::Guide,
        examples: &[],
    },
];
