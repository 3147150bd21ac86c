//! Terminal output utilities: table rendering and ANSI-formatted notes.

use docket_core::{ResultRow, JUDGEMENT, NON_JUDGEMENT, UNCLASSIFIED};

pub const RESET: &str = "\x1b[0m";
pub const BOLD: &str = "\x1b[1m";
pub const DIM: &str = "\x1b[2m";

pub const RED: &str = "\x1b[31m";
pub const GREEN: &str = "\x1b[32m";
pub const YELLOW: &str = "\x1b[33m";
pub const CYAN: &str = "\x1b[36m";

/// Check if the terminal supports color output.
pub fn supports_color() -> bool {
    std::env::var("NO_COLOR").is_err()
        && (std::env::var("COLORTERM").is_ok()
            || std::env::var("TERM")
                .map(|t| t != "dumb")
                .unwrap_or(false))
}

/// Strip ANSI escape codes from a string.
pub fn strip_ansi(s: &str) -> String {
    let mut result = String::with_capacity(s.len());
    let mut chars = s.chars();
    while let Some(c) = chars.next() {
        if c == '\x1b' {
            for next in chars.by_ref() {
                if next == 'm' {
                    break;
                }
            }
        } else {
            result.push(c);
        }
    }
    result
}

fn paint(color: &str, s: &str) -> String {
    if supports_color() {
        format!("{color}{s}{RESET}")
    } else {
        s.to_string()
    }
}

// ---------------------------------------------------------------------------
// Formatted notes (stderr, so stdout stays machine-readable)
// ---------------------------------------------------------------------------

pub fn note_info(msg: &str) {
    if supports_color() {
        eprintln!("{CYAN}{BOLD}ℹ{RESET} {msg}");
    } else {
        eprintln!("INFO: {msg}");
    }
}

pub fn note_warn(msg: &str) {
    if supports_color() {
        eprintln!("{YELLOW}{BOLD}⚠{RESET} {msg}");
    } else {
        eprintln!("WARN: {msg}");
    }
}

pub fn note_error(msg: &str) {
    if supports_color() {
        eprintln!("{RED}{BOLD}✗{RESET} {msg}");
    } else {
        eprintln!("ERROR: {msg}");
    }
}

pub fn note_success(msg: &str) {
    if supports_color() {
        eprintln!("{GREEN}{BOLD}✓{RESET} {msg}");
    } else {
        eprintln!("OK: {msg}");
    }
}

// ---------------------------------------------------------------------------
// Table rendering
// ---------------------------------------------------------------------------

pub enum Align {
    Left,
    Right,
}

pub struct Column {
    pub header: String,
    pub align: Align,
    pub max_width: Option<usize>,
}

impl Column {
    pub fn left(header: impl Into<String>) -> Self {
        Self { header: header.into(), align: Align::Left, max_width: None }
    }

    pub fn right(header: impl Into<String>) -> Self {
        Self { header: header.into(), align: Align::Right, max_width: None }
    }

    pub fn max_width(mut self, width: usize) -> Self {
        self.max_width = Some(width);
        self
    }
}

/// Render a table with given columns and rows. Cells wider than a column's
/// `max_width` are truncated with an ellipsis.
pub fn render_table(columns: &[Column], rows: &[Vec<String>]) -> String {
    let num_cols = columns.len();
    let mut widths: Vec<usize> = columns.iter().map(|c| visible_len(&c.header)).collect();
    for row in rows {
        for (i, cell) in row.iter().enumerate().take(num_cols) {
            let w = visible_len(cell);
            let w = columns[i].max_width.map_or(w, |max| w.min(max));
            widths[i] = widths[i].max(w);
        }
    }

    let bold = if supports_color() { BOLD } else { "" };
    let reset = if supports_color() { RESET } else { "" };
    let mut out = String::new();

    let header_cells: Vec<String> = columns
        .iter()
        .enumerate()
        .map(|(i, col)| pad_cell(&col.header, widths[i], &col.align))
        .collect();
    out.push_str(&format!("{bold}  {}  {reset}\n", header_cells.join("  ")));

    let sep: Vec<String> = widths.iter().map(|w| "-".repeat(*w)).collect();
    out.push_str(&format!("  {}  \n", sep.join("  ")));

    for row in rows {
        let cells: Vec<String> = (0..num_cols)
            .map(|i| {
                let cell = row.get(i).map(String::as_str).unwrap_or("");
                let cell = truncate(cell, widths[i]);
                pad_cell(&cell, widths[i], &columns[i].align)
            })
            .collect();
        out.push_str(&format!("  {}  \n", cells.join("  ")));
    }

    out
}

fn visible_len(s: &str) -> usize {
    strip_ansi(s).chars().count()
}

fn truncate(s: &str, width: usize) -> String {
    if visible_len(s) <= width {
        return s.to_string();
    }
    let plain = strip_ansi(s);
    let kept: String = plain.chars().take(width.saturating_sub(1)).collect();
    format!("{kept}…")
}

fn pad_cell(s: &str, width: usize, align: &Align) -> String {
    let pad = width.saturating_sub(visible_len(s));
    match align {
        Align::Left => format!("{s}{}", " ".repeat(pad)),
        Align::Right => format!("{}{s}", " ".repeat(pad)),
    }
}

// ---------------------------------------------------------------------------
// Result rows
// ---------------------------------------------------------------------------

fn color_category(row: &ResultRow) -> String {
    match row.category.as_str() {
        _ if row.is_error() => paint(RED, &row.category),
        JUDGEMENT => paint(GREEN, &row.category),
        NON_JUDGEMENT => paint(CYAN, &row.category),
        UNCLASSIFIED => paint(DIM, &row.category),
        _ => paint(YELLOW, &row.category),
    }
}

/// Render classification rows as `File | Category | Confidence`.
pub fn render_results(rows: &[ResultRow]) -> String {
    let columns = [
        Column::left("File").max_width(48),
        Column::left("Category"),
        Column::right("Confidence").max_width(72),
    ];
    let cells: Vec<Vec<String>> = rows
        .iter()
        .map(|row| {
            vec![
                row.file_name.clone(),
                color_category(row),
                row.confidence.to_string(),
            ]
        })
        .collect();
    render_table(&columns, &cells)
}

#[cfg(test)]
mod tests {
    use super::*;
    use docket_core::{ClassificationResult, Confidence, ErrorKind};

    #[test]
    fn strips_ansi() {
        let colored = format!("{GREEN}hello{RESET}");
        assert_eq!(strip_ansi(&colored), "hello");
    }

    #[test]
    fn renders_table() {
        let cols = vec![Column::left("Name"), Column::right("Count")];
        let rows = vec![
            vec!["Alice".to_string(), "42".to_string()],
            vec!["Bob".to_string(), "7".to_string()],
        ];
        let table = render_table(&cols, &rows);
        assert!(table.contains("Alice"));
        assert!(table.contains(" 7"));
    }

    #[test]
    fn long_cells_are_truncated() {
        let cols = vec![Column::left("Error").max_width(10)];
        let rows = vec![vec!["a very long diagnostic message".to_string()]];
        let table = strip_ansi(&render_table(&cols, &rows));
        assert!(table.contains("a very lo…"));
        assert!(!table.contains("diagnostic"));
    }

    #[test]
    fn renders_result_rows() {
        let rows = vec![
            ResultRow::classified(
                "order.pdf",
                ClassificationResult::new(JUDGEMENT, Confidence::Score(0.873)),
            ),
            ResultRow::failed("scan.png", ErrorKind::Extraction, "timed out"),
        ];
        let table = strip_ansi(&render_results(&rows));
        assert!(table.contains("order.pdf"));
        assert!(table.contains("87.30%"));
        assert!(table.contains("Error"));
        assert!(table.contains("timed out"));
    }
}
