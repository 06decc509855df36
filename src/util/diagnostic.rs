//! User-facing diagnostics.
//!
//! Every problem reported to the user names the offending value and the
//! manifest it came from and, where possible, how to fix it:
//!
//! ```text
//! error: unrecognized dependency type `bogus` for `Foo`
//!   --> /src/app/project.json
//!    = note: while reading `dependencies`
//!    = help: Use one of: default, build, preprocess, private, dev
//! ```

use std::fmt;
use std::path::PathBuf;

/// Help lines shared between commands.
pub mod suggestions {
    pub const NO_MANIFEST: &str =
        "Create a project.json in the project directory or pass --manifest-path";

    pub const FRAMEWORK_NOT_FOUND: &str =
        "Run `quay frameworks` to see the declared target frameworks";

    pub const CONFIGURATION_NOT_FOUND: &str =
        "Run `quay inspect` to see the available configurations";
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Level {
    Error,
    Warning,
}

impl Level {
    fn label(self) -> &'static str {
        match self {
            Level::Error => "error",
            Level::Warning => "warning",
        }
    }

    /// ANSI style for the label.
    fn style(self) -> &'static str {
        match self {
            Level::Error => "1;31",
            Level::Warning => "1;33",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Annotation {
    Note,
    Help,
}

/// A problem report: a headline, the manifest it concerns, and annotations.
#[derive(Debug, Clone)]
pub struct Diagnostic {
    level: Level,
    message: String,
    location: Option<PathBuf>,
    annotations: Vec<(Annotation, String)>,
}

impl Diagnostic {
    pub fn error(message: impl Into<String>) -> Self {
        Diagnostic {
            level: Level::Error,
            message: message.into(),
            location: None,
            annotations: Vec::new(),
        }
    }

    pub fn warning(message: impl Into<String>) -> Self {
        Diagnostic {
            level: Level::Warning,
            ..Diagnostic::error(message)
        }
    }

    /// Add a `note:` line.
    pub fn with_context(mut self, note: impl Into<String>) -> Self {
        self.annotations.push((Annotation::Note, note.into()));
        self
    }

    /// Add a `help:` line.
    pub fn with_suggestion(mut self, help: impl Into<String>) -> Self {
        self.annotations.push((Annotation::Help, help.into()));
        self
    }

    /// The manifest the diagnostic refers to.
    pub fn with_location(mut self, path: impl Into<PathBuf>) -> Self {
        self.location = Some(path.into());
        self
    }

    pub fn level(&self) -> Level {
        self.level
    }

    pub fn message(&self) -> &str {
        &self.message
    }

    /// Render for a terminal, with ANSI colors when `color` is set.
    pub fn format(&self, color: bool) -> String {
        let mut out = String::new();
        // Writing into a String cannot fail
        let _ = self.render(&mut out, color);
        out
    }

    fn render(&self, out: &mut impl fmt::Write, color: bool) -> fmt::Result {
        let paint = |style: &str, text: &str| {
            if color {
                format!("\x1b[{}m{}\x1b[0m", style, text)
            } else {
                text.to_string()
            }
        };

        writeln!(
            out,
            "{}: {}",
            paint(self.level.style(), self.level.label()),
            self.message
        )?;

        if let Some(path) = &self.location {
            writeln!(out, "  {} {}", paint("1;34", "-->"), path.display())?;
        }

        for (kind, text) in &self.annotations {
            let label = match kind {
                Annotation::Note => paint("1", "note"),
                Annotation::Help => paint("1;32", "help"),
            };
            writeln!(out, "   = {}: {}", label, text)?;
        }

        Ok(())
    }
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.render(f, false)
    }
}

impl std::error::Error for Diagnostic {}

/// Print to stderr.
pub fn emit(diagnostic: &Diagnostic, color: bool) {
    eprint!("{}", diagnostic.format(color));
}
