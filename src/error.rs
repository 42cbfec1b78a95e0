use ariadne::{Color, Config, Fmt, Label, Report, ReportKind, Source};
use std::io::{self, Write};
use std::ops::Range;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Span {
    pub start: usize,
    pub end: usize,
}

impl Span {
    pub fn new(start: usize, end: usize) -> Self {
        Self { start, end }
    }

    /// Smallest span covering both `self` and `other`.
    pub fn to(&self, other: &Span) -> Self {
        Self {
            start: self.start.min(other.start),
            end: self.end.max(other.end),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// Malformed characters, literals, comments.
    Lexical,
    /// A statement whose shape matches no known form.
    Structural,
    /// Undeclared names, type mismatches, bad arithmetic.
    Semantic,
    /// Console or log failures.
    Io,
}

/// A fatal interpreter error. Displays as `ERR! Line <n>: <message>`.
#[derive(Debug, Clone, thiserror::Error)]
#[error("ERR! Line {line}: {message}")]
pub struct StarError {
    pub kind: ErrorKind,
    pub span: Span,
    pub line: usize,
    pub message: String,
    pub help: Option<String>,
}

impl StarError {
    pub fn new(kind: ErrorKind, span: Span, line: usize, message: String) -> Self {
        Self {
            kind,
            span,
            line,
            message,
            help: None,
        }
    }

    pub fn with_help(mut self, help: impl Into<String>) -> Self {
        self.help = Some(help.into());
        self
    }

    pub fn lexical(span: Span, line: usize, message: String) -> Self {
        Self::new(ErrorKind::Lexical, span, line, message)
    }

    pub fn structural(span: Span, line: usize, message: String) -> Self {
        Self::new(ErrorKind::Structural, span, line, message)
    }

    pub fn semantic(span: Span, line: usize, message: String) -> Self {
        Self::new(ErrorKind::Semantic, span, line, message)
    }

    pub fn io(span: Span, line: usize, error: &std::io::Error) -> Self {
        Self::new(ErrorKind::Io, span, line, format!("I/O failure: {}", error))
    }

    pub fn report(&self, source: &str, filename: Option<&str>) {
        if self
            .write_report(source, filename, io::stderr(), true)
            .is_err()
        {
            // ariadne could not render; fall back to the plain diagnostic.
            eprintln!("{}", self);
        }
    }

    /// Render the ariadne report into `out`.
    pub fn write_report<W: Write>(
        &self,
        source: &str,
        filename: Option<&str>,
        out: W,
        colored: bool,
    ) -> io::Result<()> {
        let filename = filename.unwrap_or("<repl>");

        let color = match self.kind {
            ErrorKind::Lexical => Color::Red,
            ErrorKind::Structural => Color::Yellow,
            ErrorKind::Semantic => Color::Magenta,
            ErrorKind::Io => Color::Blue,
        };

        let kind_str = match self.kind {
            ErrorKind::Lexical => "Lexical Error",
            ErrorKind::Structural => "Parse Error",
            ErrorKind::Semantic => "Runtime Error",
            ErrorKind::Io => "I/O Error",
        };
        let (kind_str, help_str) = if colored {
            (kind_str.fg(color).to_string(), "help".fg(Color::Cyan).to_string())
        } else {
            (kind_str.to_string(), "help".to_string())
        };

        let range = self.char_range(source);
        let mut report_builder = Report::build(ReportKind::Error, filename, range.start)
            .with_config(Config::default().with_color(colored))
            .with_message(format!("{} ({})", self, kind_str))
            .with_label(
                Label::new((filename, range))
                    .with_message(&self.message)
                    .with_color(color),
            );

        if let Some(ref help_text) = self.help {
            report_builder = report_builder.with_note(format!("{}: {}", help_str, help_text));
        }

        report_builder
            .finish()
            .write((filename, Source::from(source)), out)
    }

    /// The span as character offsets, which is how ariadne indexes its
    /// sources. Offsets past the end are clamped to the source.
    pub fn char_range(&self, source: &str) -> Range<usize> {
        let to_chars = |byte: usize| {
            let mut byte = byte.min(source.len());
            while !source.is_char_boundary(byte) {
                byte -= 1;
            }
            source[..byte].chars().count()
        };
        let start = to_chars(self.span.start);
        let end = to_chars(self.span.end).max(start);
        start..end
    }
}
