//! Plain-text rendering of month and week views

use super::{CalendarGrid, DayBuckets, GridCell, WeekCursor};
use chrono::NaiveDate;
use std::fmt::Write;

const CELL_WIDTH: usize = 13;
const WEEKDAYS: [&str; 7] = ["Sun", "Mon", "Tue", "Wed", "Thu", "Fri", "Sat"];

/// Render a month grid with up to `preview_limit` entries per cell
///
/// Days outside the displayed month are shown in parentheses, today is
/// marked with `*`, and hidden entries are summarized as `+N`.
pub fn render_month(grid: &CalendarGrid, buckets: &DayBuckets, preview_limit: usize) -> String {
    let mut out = String::new();
    let total_width = (CELL_WIDTH + 1) * 7 + 1;

    let _ = writeln!(out, "{:^width$}", grid.month.title(), width = total_width);

    let separator = format!("+{}", format!("{}+", "-".repeat(CELL_WIDTH)).repeat(7));
    out.push_str(&separator);
    out.push('\n');

    out.push('|');
    for name in WEEKDAYS {
        let _ = write!(out, "{}|", fit(name, CELL_WIDTH));
    }
    out.push('\n');
    out.push_str(&separator);
    out.push('\n');

    for week in &grid.weeks {
        // Day number row, then preview rows, then the overflow row
        let previews: Vec<_> = week
            .cells
            .iter()
            .map(|cell| buckets.preview(cell.date, preview_limit))
            .collect();

        out.push('|');
        for cell in &week.cells {
            let _ = write!(out, "{}|", fit(&day_label(cell), CELL_WIDTH));
        }
        out.push('\n');

        for row in 0..preview_limit {
            out.push('|');
            for preview in &previews {
                let text = preview
                    .entries
                    .get(row)
                    .map(|entry| entry.label())
                    .unwrap_or_default();
                let _ = write!(out, "{}|", fit(&text, CELL_WIDTH));
            }
            out.push('\n');
        }

        if previews.iter().any(|p| p.overflow > 0) {
            out.push('|');
            for preview in &previews {
                let text = preview.overflow_label().unwrap_or_default();
                let _ = write!(out, "{}|", fit(&text, CELL_WIDTH));
            }
            out.push('\n');
        }

        out.push_str(&separator);
        out.push('\n');
    }

    out
}

/// Render one week as a day-by-day agenda
pub fn render_week(cursor: &WeekCursor, buckets: &DayBuckets, today: NaiveDate) -> String {
    let mut out = String::new();
    let _ = writeln!(
        out,
        "Week of {} - {}",
        cursor.start().format("%Y-%m-%d"),
        cursor.end().format("%Y-%m-%d")
    );

    for (name, date) in WEEKDAYS.iter().zip(cursor.days()) {
        let marker = if date == today { " *" } else { "" };
        let _ = writeln!(out, "\n{} {}{}", name, date.format("%m-%d"), marker);

        let preview = buckets.preview(date, usize::MAX);
        if preview.entries.is_empty() {
            out.push_str("  -\n");
            continue;
        }
        for entry in &preview.entries {
            let _ = writeln!(out, "  {}", entry.label());
        }
    }

    out
}

fn day_label(cell: &GridCell) -> String {
    let mut label = if cell.in_month {
        format!("{:>2}", cell.day())
    } else {
        format!("({})", cell.day())
    };
    if cell.is_today {
        label.push('*');
    }
    label
}

/// Truncate or pad to exactly `width` characters
fn fit(text: &str, width: usize) -> String {
    let count = text.chars().count();
    if count > width {
        let mut cut: String = text.chars().take(width.saturating_sub(1)).collect();
        cut.push('~');
        cut
    } else {
        format!("{}{}", text, " ".repeat(width - count))
    }
}
