//! Table rendering for CLI output using comfy-table.
//!
//! ## Tables Overview
//!
//! | Command | Table Function |
//! |---------|----------------|
//! | `tagforge tags` | `render_tags_table()` |
//! | `tagforge list` | `render_records_table()` |
//! | `tagforge insert/delete/replace` | `render_changes_table()` |

use comfy_table::presets::NOTHING;
use comfy_table::{Cell, CellAlignment, ColumnConstraint, Table, Width};

use super::format::truncate_str;

/// One row of the tag table.
#[derive(Debug, Clone)]
pub struct TagRow {
    /// Tag name
    pub tag: String,
    /// Number of records carrying the tag
    pub records: usize,
    /// Palette colour name, if configured
    pub color: Option<String>,
}

/// One row of the record table.
#[derive(Debug, Clone)]
pub struct RecordRow {
    pub key: u64,
    pub name: String,
    pub tags: Vec<String>,
}

/// One planned or applied change.
#[derive(Debug, Clone)]
pub struct ChangeRow {
    pub key: u64,
    pub name: String,
    pub before: Vec<String>,
    pub after: Vec<String>,
}

/// Width left for the widest column once the fixed ones are laid out.
fn remaining_width(total: usize, fixed: usize) -> usize {
    total.saturating_sub(fixed).max(20)
}

/// Render the tag table for `tagforge tags`.
///
/// # Example Output
///
/// ```text
/// #    TAG        RECORDS   COLOR
/// 1    cat              2   red
/// 2    outdoor          2   -
/// ```
pub fn render_tags_table(rows: &[TagRow]) -> String {
    if rows.is_empty() {
        return String::new();
    }

    let mut table = Table::new();
    table.load_preset(NOTHING);

    table.set_header(vec![
        Cell::new("#").set_alignment(CellAlignment::Right),
        Cell::new("TAG"),
        Cell::new("RECORDS").set_alignment(CellAlignment::Right),
        Cell::new("COLOR"),
    ]);

    table.set_constraints(vec![
        ColumnConstraint::LowerBoundary(Width::Fixed(3)),  // #
        ColumnConstraint::LowerBoundary(Width::Fixed(10)), // TAG
        ColumnConstraint::LowerBoundary(Width::Fixed(8)),  // RECORDS
        ColumnConstraint::LowerBoundary(Width::Fixed(6)),  // COLOR
    ]);

    for (position, row) in rows.iter().enumerate() {
        table.add_row(vec![
            Cell::new(position + 1).set_alignment(CellAlignment::Right),
            Cell::new(truncate_str(&row.tag, 40)),
            Cell::new(row.records).set_alignment(CellAlignment::Right),
            Cell::new(row.color.as_deref().unwrap_or("-")),
        ]);
    }

    table.trim_fmt().to_string()
}

/// Render the record table for `tagforge list`.
///
/// Tag lists are truncated to fit `width` columns.
///
/// # Example Output
///
/// ```text
/// KEY   NAME       TAGS
///   0   a.png      cat, outdoor
///   1   b.png      dog
/// ```
pub fn render_records_table(rows: &[RecordRow], width: usize) -> String {
    if rows.is_empty() {
        return String::new();
    }

    let mut table = Table::new();
    table.load_preset(NOTHING);

    table.set_header(vec![
        Cell::new("KEY").set_alignment(CellAlignment::Right),
        Cell::new("NAME"),
        Cell::new("TAGS"),
    ]);

    table.set_constraints(vec![
        ColumnConstraint::LowerBoundary(Width::Fixed(4)),  // KEY
        ColumnConstraint::LowerBoundary(Width::Fixed(10)), // NAME
        ColumnConstraint::LowerBoundary(Width::Fixed(10)), // TAGS
    ]);

    let tags_width = remaining_width(width, 4 + 24 + 4);
    for row in rows {
        let tags = if row.tags.is_empty() {
            "-".to_string()
        } else {
            truncate_str(&row.tags.join(", "), tags_width)
        };
        table.add_row(vec![
            Cell::new(row.key).set_alignment(CellAlignment::Right),
            Cell::new(truncate_str(&row.name, 24)),
            Cell::new(tags),
        ]);
    }

    table.trim_fmt().to_string()
}

/// Render before/after tag lists for an edit.
///
/// # Example Output
///
/// ```text
/// KEY   NAME    BEFORE          AFTER
///   0   a.png   cat, outdoor    feline, outdoor
/// ```
pub fn render_changes_table(rows: &[ChangeRow], width: usize) -> String {
    if rows.is_empty() {
        return String::new();
    }

    let mut table = Table::new();
    table.load_preset(NOTHING);

    table.set_header(vec![
        Cell::new("KEY").set_alignment(CellAlignment::Right),
        Cell::new("NAME"),
        Cell::new("BEFORE"),
        Cell::new("AFTER"),
    ]);

    let column = remaining_width(width, 4 + 24 + 6) / 2;
    let render = |tags: &[String]| {
        if tags.is_empty() {
            "-".to_string()
        } else {
            truncate_str(&tags.join(", "), column)
        }
    };
    for row in rows {
        table.add_row(vec![
            Cell::new(row.key).set_alignment(CellAlignment::Right),
            Cell::new(truncate_str(&row.name, 24)),
            Cell::new(render(&row.before)),
            Cell::new(render(&row.after)),
        ]);
    }

    table.trim_fmt().to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tags(values: &[&str]) -> Vec<String> {
        values.iter().map(|t| t.to_string()).collect()
    }

    #[test]
    fn test_tags_table_structure() {
        let output = render_tags_table(&[
            TagRow {
                tag: "cat".to_string(),
                records: 2,
                color: Some("red".to_string()),
            },
            TagRow {
                tag: "outdoor".to_string(),
                records: 1,
                color: None,
            },
        ]);

        assert!(output.contains("TAG"));
        assert!(output.contains("RECORDS"));
        assert!(output.contains("COLOR"));
        assert!(output.contains("cat"));
        assert!(output.contains("red"));
        assert!(output.contains("outdoor"));
    }

    #[test]
    fn test_records_table_truncates_tags() {
        let long: Vec<String> = (0..50).map(|i| format!("tag{i}")).collect();
        let output = render_records_table(
            &[
                RecordRow {
                    key: 0,
                    name: "a.png".to_string(),
                    tags: long,
                },
                RecordRow {
                    key: 1,
                    name: "b.png".to_string(),
                    tags: vec![],
                },
            ],
            80,
        );

        assert!(output.contains("a.png"));
        assert!(output.contains("..."));
        assert!(!output.contains("tag49"));
    }

    #[test]
    fn test_changes_table() {
        let output = render_changes_table(
            &[ChangeRow {
                key: 3,
                name: "c.png".to_string(),
                before: tags(&["cat"]),
                after: tags(&["feline"]),
            }],
            120,
        );

        assert!(output.contains("BEFORE"));
        assert!(output.contains("AFTER"));
        assert!(output.contains("cat"));
        assert!(output.contains("feline"));
    }

    #[test]
    fn test_empty_tables() {
        assert_eq!(render_tags_table(&[]), "");
        assert_eq!(render_records_table(&[], 80), "");
        assert_eq!(render_changes_table(&[], 80), "");
    }
}
