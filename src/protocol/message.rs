use std::fmt::Display;

/// Marks a kind the receiver may ignore when it does not know it.
pub const OPTIONAL: char = '?';
pub const SEPARATOR: char = ':';

/// One protocol line: `kind` or `kind:contents`, with `?kind` for optional kinds.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Message {
    pub kind: String,
    pub contents: Option<String>,
    pub optional: bool,
}

impl Message {
    pub fn new(kind: &str, contents: Option<&str>) -> Message {
        let (kind, optional) = match kind.strip_prefix(OPTIONAL) {
            Some(rest) => (rest, true),
            None => (kind, false),
        };
        Message {
            kind: kind.to_string(),
            contents: contents.filter(|c| !c.is_empty()).map(str::to_string),
            optional,
        }
    }

    pub fn parse(line: &str) -> Message {
        let line = line.trim_end_matches(&['\r', '\n'][..]);
        match line.split_once(SEPARATOR) {
            Some((kind, contents)) => Message::new(kind, Some(contents)),
            None => Message::new(line, None),
        }
    }

    pub fn contents(&self) -> &str {
        self.contents.as_deref().unwrap_or("")
    }
}

impl Display for Message {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        if self.optional {
            write!(f, "{}", OPTIONAL)?;
        }
        write!(f, "{}", self.kind)?;
        if let Some(contents) = &self.contents {
            write!(f, "{}{}", SEPARATOR, contents)?;
        }
        Ok(())
    }
}

/// Formats a line the way the peer expects it; empty contents are dropped.
pub fn format_line(kind: &str, contents: &str) -> String {
    if contents.is_empty() {
        kind.to_string()
    } else {
        format!("{}{}{}", kind, SEPARATOR, contents)
    }
}
