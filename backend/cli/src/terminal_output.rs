//! Terminal output: status notes and plain tables for list commands.

const RESET: &str = "\x1b[0m";
const BOLD: &str = "\x1b[1m";
const RED: &str = "\x1b[31m";
const GREEN: &str = "\x1b[32m";
const YELLOW: &str = "\x1b[33m";
const CYAN: &str = "\x1b[36m";

/// Honours `NO_COLOR`; otherwise needs a colour-capable `TERM`.
pub fn supports_color() -> bool {
    std::env::var_os("NO_COLOR").is_none()
        && (std::env::var_os("COLORTERM").is_some()
            || std::env::var("TERM").is_ok_and(|t| t != "dumb"))
}

#[derive(Debug, Clone, Copy)]
enum Tone {
    Info,
    Warn,
    Error,
    Success,
}

impl Tone {
    fn glyph(self) -> (&'static str, &'static str, &'static str) {
        match self {
            Tone::Info => (CYAN, "ℹ", "INFO"),
            Tone::Warn => (YELLOW, "⚠", "WARN"),
            Tone::Error => (RED, "✗", "ERROR"),
            Tone::Success => (GREEN, "✓", "OK"),
        }
    }
}

fn note(tone: Tone, msg: &str) -> String {
    let (color, glyph, label) = tone.glyph();
    if supports_color() {
        format!("{color}{BOLD}{glyph}{RESET} {msg}")
    } else {
        format!("{label}: {msg}")
    }
}

pub fn note_info(msg: &str) {
    println!("{}", note(Tone::Info, msg));
}

pub fn note_warn(msg: &str) {
    eprintln!("{}", note(Tone::Warn, msg));
}

pub fn note_error(msg: &str) {
    eprintln!("{}", note(Tone::Error, msg));
}

pub fn note_success(msg: &str) {
    println!("{}", note(Tone::Success, msg));
}

/// Pretty JSON on stdout, for commands whose result has no fixed shape.
pub fn print_json(value: &serde_json::Value) {
    match serde_json::to_string_pretty(value) {
        Ok(text) => println!("{text}"),
        Err(_) => println!("{value}"),
    }
}

pub struct Column {
    header: &'static str,
    max_width: Option<usize>,
}

impl Column {
    pub fn new(header: &'static str) -> Self {
        Self { header, max_width: None }
    }

    /// Cells longer than `width` characters are cut and end in `…`.
    pub fn truncated(header: &'static str, width: usize) -> Self {
        Self { header, max_width: Some(width.max(1)) }
    }
}

/// Left-aligned table; widths are counted in characters.
pub fn render_table(columns: &[Column], rows: &[Vec<String>]) -> String {
    let cell = |row: &[String], i: usize| -> String {
        let text = row.get(i).map(String::as_str).unwrap_or("");
        match columns[i].max_width {
            Some(max) if text.chars().count() > max => {
                let mut cut: String = text.chars().take(max - 1).collect();
                cut.push('…');
                cut
            }
            _ => text.to_string(),
        }
    };

    let mut widths: Vec<usize> = columns.iter().map(|c| c.header.chars().count()).collect();
    let cells: Vec<Vec<String>> = rows
        .iter()
        .map(|row| (0..columns.len()).map(|i| cell(row, i)).collect())
        .collect();
    for row in &cells {
        for (i, text) in row.iter().enumerate() {
            widths[i] = widths[i].max(text.chars().count());
        }
    }

    let line = |texts: Vec<&str>| -> String {
        let padded: Vec<String> = texts
            .iter()
            .zip(&widths)
            .map(|(text, width)| format!("{text}{}", " ".repeat(width - text.chars().count())))
            .collect();
        padded.join("  ").trim_end().to_string()
    };

    let mut out = String::new();
    out.push_str(&line(columns.iter().map(|c| c.header).collect()));
    out.push('\n');
    out.push_str(&widths.iter().map(|w| "-".repeat(*w)).collect::<Vec<_>>().join("  "));
    out.push('\n');
    for row in &cells {
        out.push_str(&line(row.iter().map(String::as_str).collect()));
        out.push('\n');
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn renders_aligned_table() {
        let columns = [Column::new("ID"), Column::new("TITLE")];
        let rows = vec![
            vec!["t-1".to_string(), "Quarterly report".to_string()],
            vec!["t-22".to_string(), "Fix".to_string()],
        ];
        assert_eq!(
            render_table(&columns, &rows),
            "ID    TITLE\n----  ----------------\nt-1   Quarterly report\nt-22  Fix\n"
        );
    }

    #[test]
    fn truncates_long_cells() {
        let columns = [Column::truncated("MESSAGE", 6)];
        let rows = vec![vec!["Task is due tomorrow".to_string()]];
        let table = render_table(&columns, &rows);
        assert!(table.ends_with("Task …\n"));
    }

    #[test]
    fn missing_cells_render_empty() {
        let columns = [Column::new("A"), Column::new("B")];
        let table = render_table(&columns, &[vec!["x".to_string()]]);
        assert_eq!(table.lines().last(), Some("x"));
    }
}
