//! Line grammar for env files.
//!
//! An env file is a sequence of lines, each of which is exactly one of:
//!
//! ```text
//! line    := blank | comment | entry | other
//! blank   := WS*
//! comment := WS* "#" ANY*
//! entry   := WS* ("export" WS+)? key WS* "=" value
//! key     := (ANY - "=")+        ; trimmed, non-empty
//! value   := ANY*                ; kept verbatim, no unquoting
//! other   := anything else
//! ```
//!
//! Keys are compared literally. There is no pattern matching involved, so a
//! key containing `.` or `+` only ever matches itself.

/// Line separator used when writing a document back to disk.
#[cfg(windows)]
pub const LINE_SEPARATOR: &str = "\r\n";

/// Line separator used when writing a document back to disk.
#[cfg(not(windows))]
pub const LINE_SEPARATOR: &str = "\n";

/// A single classified line of an env file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EnvLine<'a> {
    /// Empty or whitespace-only line.
    Blank,
    /// Line whose first non-whitespace character is `#`.
    Comment(&'a str),
    /// `KEY=VALUE` assignment.
    Entry { key: &'a str, value: &'a str },
    /// Anything that is not one of the above, kept verbatim.
    Other(&'a str),
}

impl<'a> EnvLine<'a> {
    /// Classify one line. The line must not contain the line terminator.
    pub fn parse(line: &'a str) -> Self {
        let trimmed = line.trim_start();

        if trimmed.is_empty() {
            return EnvLine::Blank;
        }
        if trimmed.starts_with('#') {
            return EnvLine::Comment(line);
        }

        let (_, body) = split_prefix(line);

        match body.split_once('=') {
            Some((key, value)) if !key.trim().is_empty() => EnvLine::Entry {
                key: key.trim(),
                value,
            },
            _ => EnvLine::Other(line),
        }
    }

    /// Key of this line, if it is an entry.
    pub fn key(&self) -> Option<&'a str> {
        match self {
            EnvLine::Entry { key, .. } => Some(*key),
            _ => None,
        }
    }
}

/// Split a line into its leading whitespace plus optional `export ` keyword,
/// and the `KEY=VALUE` body after it.
fn split_prefix(line: &str) -> (&str, &str) {
    let trimmed = line.trim_start();
    let body = trimmed
        .strip_prefix("export")
        .filter(|rest| rest.starts_with(char::is_whitespace))
        .map(str::trim_start)
        .unwrap_or(trimmed);
    line.split_at(line.len() - body.len())
}

/// An env file split into lines, remembering whether it ended with a newline.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EnvDocument {
    lines: Vec<String>,
    trailing_newline: bool,
}

impl EnvDocument {
    /// Split raw file content into lines.
    ///
    /// Lines are split on `\n` and a trailing `\r` is dropped, so files
    /// written on either platform parse the same way.
    pub fn parse(content: &str) -> Self {
        if content.is_empty() {
            return Self::default();
        }

        let trailing_newline = content.ends_with('\n');
        let body = content.strip_suffix('\n').unwrap_or(content);
        let lines = body
            .split('\n')
            .map(|line| line.strip_suffix('\r').unwrap_or(line).to_string())
            .collect();

        Self {
            lines,
            trailing_newline,
        }
    }

    /// All lines in file order.
    pub fn lines(&self) -> &[String] {
        &self.lines
    }

    /// Index of the first entry whose key equals `key`.
    pub fn position(&self, key: &str) -> Option<usize> {
        self.lines
            .iter()
            .position(|line| EnvLine::parse(line).key() == Some(key))
    }

    /// Value of the first entry whose key equals `key`.
    pub fn get(&self, key: &str) -> Option<&str> {
        self.lines.iter().find_map(|line| match EnvLine::parse(line) {
            EnvLine::Entry { key: k, value } if k == key => Some(value),
            _ => None,
        })
    }

    /// Replace the first entry for `key` in place, or append a new one.
    ///
    /// Later entries for the same key are removed, so the document holds
    /// exactly one entry for `key` afterwards. The replaced line keeps its
    /// indentation and `export` keyword. Returns `true` when an existing
    /// line was replaced.
    pub fn upsert(&mut self, key: &str, value: &str) -> bool {
        let Some(index) = self.position(key) else {
            self.lines.push(format!("{key}={value}"));
            return false;
        };

        let (prefix, _) = split_prefix(&self.lines[index]);
        let line = format!("{prefix}{key}={value}");
        self.lines[index] = line;

        let mut current = 0;
        self.lines.retain(|line| {
            let keep = current <= index || EnvLine::parse(line).key() != Some(key);
            current += 1;
            keep
        });
        true
    }

    /// Render the document with the given line separator.
    pub fn render_with(&self, separator: &str) -> String {
        let mut out = self.lines.join(separator);
        if self.trailing_newline && !self.lines.is_empty() {
            out.push_str(separator);
        }
        out
    }

    /// Render the document with the host line separator.
    pub fn render(&self) -> String {
        self.render_with(LINE_SEPARATOR)
    }
}
