//! Terminal output helpers: status notes and plain tables.

pub const RESET: &str = "\x1b[0m";
pub const BOLD: &str = "\x1b[1m";
pub const RED: &str = "\x1b[31m";
pub const GREEN: &str = "\x1b[32m";
pub const YELLOW: &str = "\x1b[33m";
pub const CYAN: &str = "\x1b[36m";

/// Honors `NO_COLOR` and dumb terminals.
pub fn supports_color() -> bool {
    std::env::var("NO_COLOR").is_err()
        && (std::env::var("COLORTERM").is_ok()
            || std::env::var("TERM").map(|t| t != "dumb").unwrap_or(false))
}

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

fn note(color: &str, symbol: &str, plain: &str, msg: &str) -> String {
    if supports_color() {
        format!("{color}{BOLD}{symbol}{RESET} {msg}")
    } else {
        format!("{plain}: {msg}")
    }
}

pub fn note_info(msg: &str) {
    println!("{}", note(CYAN, "ℹ", "INFO", msg));
}

pub fn note_warn(msg: &str) {
    println!("{}", note(YELLOW, "⚠", "WARN", msg));
}

pub fn note_error(msg: &str) {
    eprintln!("{}", note(RED, "✗", "ERROR", msg));
}

pub fn note_success(msg: &str) {
    println!("{}", note(GREEN, "✓", "OK", msg));
}

// ---------------------------------------------------------------------------
// Tables
// ---------------------------------------------------------------------------

pub enum Align {
    Left,
    Right,
}

pub struct Column {
    pub header: String,
    pub align: Align,
}

impl Column {
    pub fn left(header: impl Into<String>) -> Self {
        Self { header: header.into(), align: Align::Left }
    }
    pub fn right(header: impl Into<String>) -> Self {
        Self { header: header.into(), align: Align::Right }
    }
}

/// Render rows under a header and a dashed separator. Widths ignore ANSI codes.
pub fn render_table(columns: &[Column], rows: &[Vec<String>]) -> String {
    let visible = |s: &str| strip_ansi(s).chars().count();
    let widths: Vec<usize> = columns
        .iter()
        .enumerate()
        .map(|(i, col)| {
            rows.iter()
                .filter_map(|row| row.get(i))
                .map(|cell| visible(cell.as_str()))
                .fold(visible(col.header.as_str()), usize::max)
        })
        .collect();

    let line = |cells: Vec<String>| format!("  {}\n", cells.join("  ").trim_end());
    let pad = |s: &str, i: usize| {
        let fill = " ".repeat(widths[i].saturating_sub(visible(s)));
        match columns[i].align {
            Align::Left => format!("{s}{fill}"),
            Align::Right => format!("{fill}{s}"),
        }
    };

    let mut out = line(columns.iter().enumerate().map(|(i, c)| pad(c.header.as_str(), i)).collect());
    out.push_str(&line(widths.iter().map(|w| "-".repeat(*w)).collect()));
    for row in rows {
        let cells: Vec<String> = (0..columns.len())
            .map(|i| pad(row.get(i).map(String::as_str).unwrap_or(""), i))
            .collect();
        out.push_str(&line(cells));
    }
    out
}
