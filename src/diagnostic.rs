use owo_colors::OwoColorize;
use std::fmt;

/// Byte range into the source text.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Span {
    pub start: usize,
    pub end: usize,
}

impl Span {
    pub fn new(start: usize, end: usize) -> Self {
        Self { start, end }
    }

    pub fn dummy() -> Self {
        Self::default()
    }

    pub fn merge(self, other: Span) -> Span {
        Span {
            start: self.start.min(other.start),
            end: self.end.max(other.end),
        }
    }

    pub fn is_dummy(&self) -> bool {
        self.start == 0 && self.end == 0
    }
}

/// One-based line and column of a point in the source.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Position {
    pub line: usize,
    pub column: usize,
}

impl Position {
    pub fn new(line: usize, column: usize) -> Self {
        Self { line, column }
    }
}

impl fmt::Display for Position {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "line {}, column {}", self.line, self.column)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Severity {
    Error,
    Warning,
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Severity::Error => write!(f, "error"),
            Severity::Warning => write!(f, "warning"),
        }
    }
}

/// A message attached to a span of the source.
#[derive(Debug, Clone)]
pub struct Label {
    pub span: Span,
    pub message: String,
}

impl Label {
    pub fn primary(span: Span, message: impl Into<String>) -> Self {
        Self {
            span,
            message: message.into(),
        }
    }
}

#[derive(Debug, Clone)]
pub struct Diagnostic {
    pub severity: Severity,
    pub code: Option<String>,
    pub message: String,
    pub labels: Vec<Label>,
    pub notes: Vec<String>,
}

impl Diagnostic {
    pub fn error(message: impl Into<String>) -> Self {
        Self {
            severity: Severity::Error,
            code: None,
            message: message.into(),
            labels: Vec::new(),
            notes: Vec::new(),
        }
    }

    pub fn with_code(mut self, code: impl Into<String>) -> Self {
        self.code = Some(code.into());
        self
    }

    pub fn with_label(mut self, label: Label) -> Self {
        self.labels.push(label);
        self
    }

    pub fn with_note(mut self, note: impl Into<String>) -> Self {
        self.notes.push(note.into());
        self
    }

    pub fn with_help(mut self, help: impl Into<String>) -> Self {
        self.notes.push(format!("help: {}", help.into()));
        self
    }
}

/// Computes the one-based line and column of a byte offset.
pub fn line_col(source: &str, offset: usize) -> (usize, usize) {
    let mut line = 1;
    let mut col = 1;
    for (i, ch) in source.char_indices() {
        if i >= offset {
            break;
        }
        if ch == '\n' {
            line += 1;
            col = 1;
        } else {
            col += 1;
        }
    }
    (line, col)
}

fn source_line(source: &str, line_num: usize) -> Option<&str> {
    source.split('\n').nth(line_num - 1)
}

/// Renders diagnostics in the familiar `error[CODE]: message --> file:line:col` layout.
pub struct DiagnosticRenderer<'a> {
    source: &'a str,
    file_name: &'a str,
    use_color: bool,
}

impl<'a> DiagnosticRenderer<'a> {
    pub fn new(source: &'a str, file_name: &'a str, use_color: bool) -> Self {
        Self {
            source,
            file_name,
            use_color,
        }
    }

    pub fn render(&self, diagnostic: &Diagnostic) -> String {
        let mut output = String::new();
        self.render_header(&mut output, diagnostic);

        if let Some(label) = diagnostic.labels.first() {
            let (line, col) = line_col(self.source, label.span.start);
            let width = line.to_string().len();
            let gutter = self.blue("|");

            output.push_str(&format!(
                "{}{} {}:{}:{}\n",
                " ".repeat(width),
                self.blue("-->"),
                self.file_name,
                line,
                col
            ));
            output.push_str(&format!("{} {}\n", " ".repeat(width), gutter));

            if let Some(content) = source_line(self.source, line) {
                output.push_str(&format!(
                    "{} {} {}\n",
                    self.blue(&line.to_string()),
                    gutter,
                    content
                ));

                let (end_line, end_col) =
                    line_col(self.source, label.span.end.max(label.span.start + 1));
                let caret_end = if end_line == line {
                    end_col.max(col + 1)
                } else {
                    content.chars().count() + 1
                };
                let carets = "^".repeat(caret_end - col);
                let mut marker = format!("{}{}", " ".repeat(col - 1), self.red(&carets));
                if !label.message.is_empty() {
                    marker.push(' ');
                    marker.push_str(&self.red(&label.message));
                }
                output.push_str(&format!("{} {} {}\n", " ".repeat(width), gutter, marker));
            }
        }

        for note in &diagnostic.notes {
            output.push_str(&format!("  {} {}\n", self.blue("="), note));
        }

        output
    }

    fn render_header(&self, output: &mut String, diagnostic: &Diagnostic) {
        let severity = match diagnostic.severity {
            Severity::Error => self.red_bold("error"),
            Severity::Warning => self.yellow_bold("warning"),
        };
        let message = self.bold(&diagnostic.message);
        match &diagnostic.code {
            Some(code) => output.push_str(&format!("{}[{}]: {}\n", severity, code, message)),
            None => output.push_str(&format!("{}: {}\n", severity, message)),
        }
    }

    fn red(&self, s: &str) -> String {
        if self.use_color {
            s.red().to_string()
        } else {
            s.to_string()
        }
    }

    fn red_bold(&self, s: &str) -> String {
        if self.use_color {
            s.red().bold().to_string()
        } else {
            s.to_string()
        }
    }

    fn yellow_bold(&self, s: &str) -> String {
        if self.use_color {
            s.yellow().bold().to_string()
        } else {
            s.to_string()
        }
    }

    fn blue(&self, s: &str) -> String {
        if self.use_color {
            s.blue().to_string()
        } else {
            s.to_string()
        }
    }

    fn bold(&self, s: &str) -> String {
        if self.use_color {
            s.bold().to_string()
        } else {
            s.to_string()
        }
    }
}

/// Render several diagnostics followed by an abort summary.
pub fn render_diagnostics(
    source: &str,
    file_name: &str,
    diagnostics: &[Diagnostic],
    use_color: bool,
) -> String {
    let renderer = DiagnosticRenderer::new(source, file_name, use_color);
    let mut output = String::new();
    for diagnostic in diagnostics {
        output.push_str(&renderer.render(diagnostic));
        output.push('\n');
    }

    let errors = diagnostics
        .iter()
        .filter(|d| d.severity == Severity::Error)
        .count();
    if errors > 0 {
        let plural = if errors == 1 { "" } else { "s" };
        output.push_str(&format!("error: aborting due to {} error{}\n", errors, plural));
    }
    output
}
