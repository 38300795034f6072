//! Semicolon-delimited game tables

use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};

/// Field separator used by every game table
pub const DELIMITER: &str = ";";

/// A named table: one header line followed by data rows
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Table {
    /// Table name as known to the host (e.g. "gml_GlobalScript_table_weapons")
    pub name: String,
    /// Column names, in order
    pub header: Vec<String>,
    /// Data rows, in order
    pub rows: Vec<Row>,
    /// Line ending and final newline of the source text
    #[serde(skip)]
    pub layout: TextLayout,
}

/// How a table's text was laid out on disk
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TextLayout {
    /// Lines end in `\r\n` instead of `\n`
    pub crlf: bool,
    /// The last line is terminated
    pub trailing_newline: bool,
}

impl Default for TextLayout {
    fn default() -> Self {
        Self {
            crlf: false,
            trailing_newline: true,
        }
    }
}

impl TextLayout {
    /// Detect the layout of `text`
    pub fn of(text: &str) -> Self {
        Self {
            crlf: text.contains("\r\n"),
            trailing_newline: text.ends_with('\n'),
        }
    }

    fn line_ending(self) -> &'static str {
        if self.crlf {
            "\r\n"
        } else {
            "\n"
        }
    }
}

impl Table {
    /// Create a table with a header and no rows
    pub fn new(name: impl Into<String>, header: Vec<String>) -> Self {
        Self {
            name: name.into(),
            header,
            rows: Vec::new(),
            layout: TextLayout::default(),
        }
    }

    /// Parse table text, one record per line
    ///
    /// LF and CRLF line endings are both accepted. A single trailing newline
    /// does not produce an extra row. The layout is kept for `to_text`.
    pub fn parse(name: impl Into<String>, text: &str) -> Result<Self> {
        let mut table = Self::from_lines(name, text.lines())?;
        table.layout = TextLayout::of(text);
        Ok(table)
    }

    /// Build a table from already split lines
    pub fn from_lines<I, S>(name: impl Into<String>, lines: I) -> Result<Self>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let name = name.into();
        let mut lines = lines.into_iter();

        let header = match lines.next() {
            Some(line) => split_line(line.as_ref()),
            None => return Err(Error::EmptyTable(name)),
        };

        let rows = lines.map(|line| Row::new(split_line(line.as_ref()))).collect();

        Ok(Self {
            name,
            header,
            rows,
            layout: TextLayout::default(),
        })
    }

    /// Serialize back to lines, header first
    pub fn to_lines(&self) -> Vec<String> {
        std::iter::once(self.header.join(DELIMITER))
            .chain(self.rows.iter().map(Row::line))
            .collect()
    }

    /// Serialize back to text using the layout it was parsed with
    pub fn to_text(&self) -> String {
        let eol = self.layout.line_ending();
        let mut text = self.to_lines().join(eol);
        if self.layout.trailing_newline {
            text.push_str(eol);
        }
        text
    }

    /// Get the number of columns
    pub fn column_count(&self) -> usize {
        self.header.len()
    }

    /// Get the number of data rows
    pub fn row_count(&self) -> usize {
        self.rows.len()
    }

    /// Find a column index by exact name
    pub fn column_index(&self, name: &str) -> Option<usize> {
        self.header.iter().position(|h| h == name)
    }

    /// Find the first row with this identifier
    pub fn find_row(&self, id: &str) -> Option<&Row> {
        self.rows.iter().find(|r| r.id() == id)
    }

    /// Index of the first data row whose line text contains `marker`
    pub fn find_marker(&self, marker: &str) -> Option<usize> {
        self.rows.iter().position(|r| r.line().contains(marker))
    }
}

/// A data row; the first field is its identifier
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Row {
    pub fields: Vec<String>,
}

impl Row {
    /// Create a new row
    pub fn new(fields: Vec<String>) -> Self {
        Self { fields }
    }

    /// Parse a single delimited line
    pub fn parse(line: &str) -> Self {
        Self::new(split_line(line))
    }

    /// Row identifier, empty for a blank row
    pub fn id(&self) -> &str {
        self.get(0).unwrap_or("")
    }

    /// Get a field by column index
    pub fn get(&self, index: usize) -> Option<&str> {
        self.fields.get(index).map(String::as_str)
    }

    /// Set a field, padding with empty fields if the row is too short
    pub fn set(&mut self, index: usize, value: impl Into<String>) {
        if self.fields.len() <= index {
            self.fields.resize(index + 1, String::new());
        }
        self.fields[index] = value.into();
    }

    /// The row as a delimited line
    pub fn line(&self) -> String {
        self.fields.join(DELIMITER)
    }
}

fn split_line(line: &str) -> Vec<String> {
    line.split(DELIMITER).map(str::to_string).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_simple_table() {
        let table = Table::parse("t", "id;hp;tag\nsword;10;foo\naxe;12;bar\n").unwrap();

        assert_eq!(table.header, vec!["id", "hp", "tag"]);
        assert_eq!(table.row_count(), 2);
        assert_eq!(table.rows[0].id(), "sword");
        assert_eq!(table.rows[1].get(2), Some("bar"));
    }

    #[test]
    fn test_parse_crlf() {
        let table = Table::parse("t", "id;hp\r\nsword;10\r\n").unwrap();

        assert_eq!(table.header, vec!["id", "hp"]);
        assert_eq!(table.rows[0].fields, vec!["sword", "10"]);
    }

    #[test]
    fn test_crlf_text_written_back_unchanged() {
        let text = "name;x\r\nsword;1\r\n";
        let table = Table::parse("t", text).unwrap();

        assert!(table.layout.crlf);
        assert_eq!(table.to_text(), text);
    }

    #[test]
    fn test_missing_final_newline_is_kept() {
        let text = "name;x\nsword;1";
        let table = Table::parse("t", text).unwrap();

        assert!(!table.layout.trailing_newline);
        assert_eq!(table.to_text(), text);

        let mut edited = table.clone();
        edited.rows.push(Row::parse("axe;2"));
        assert_eq!(edited.to_text(), "name;x\nsword;1\naxe;2");
    }

    #[test]
    fn test_parse_empty_is_error() {
        assert!(matches!(Table::parse("t", ""), Err(Error::EmptyTable(_))));
    }

    #[test]
    fn test_rows_keep_their_width() {
        let text = "id;a;b;c\nweapon_name;weapon_name;\nsword;1;2;3\n";
        let table = Table::parse("t", text).unwrap();

        assert_eq!(table.rows[0].fields.len(), 3);
        assert_eq!(table.to_text(), text);
    }

    #[test]
    fn test_row_set_pads() {
        let mut row = Row::parse("sword");
        row.set(3, "x");
        assert_eq!(row.line(), "sword;;;x");
    }

    #[test]
    fn test_find_marker_and_row() {
        let table = Table::parse("t", "id;x\nstart;start;\nsword;1\nend;end;\n").unwrap();

        assert_eq!(table.find_marker("start;start;"), Some(0));
        assert_eq!(table.find_marker("end;end;"), Some(2));
        assert_eq!(table.find_marker("missing"), None);
        assert_eq!(table.find_row("sword").unwrap().get(1), Some("1"));
        assert_eq!(table.column_index("x"), Some(1));
    }
}
