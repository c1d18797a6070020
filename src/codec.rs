// 📄 CSV Codec - Lenient read, quote-safe write
//
// Two halves with deliberately asymmetric contracts:
// - parse(): splits on newlines and commas, trims cells, and silently drops
//   rows whose field count doesn't match the header. It does NOT understand
//   quoted fields — a field written as "a, b" comes back as two cells. This
//   is a documented limitation of the input format, not a bug to fix here.
// - serialize(): standard CSV quoting (fields containing a comma, quote, or
//   newline get wrapped in double quotes, internal quotes doubled).
//
// Round-trip only holds for fields free of comma/quote/newline.

use anyhow::{Context, Result};
use std::collections::HashMap;

/// One parsed data row: column name → trimmed cell value.
pub type Row = HashMap<String, String>;

// ============================================================================
// PARSE (lenient)
// ============================================================================

/// Parse flat CSV text into row mappings.
///
/// The first non-empty line is the header row. Every later non-empty line is
/// split on commas and trimmed; a row is kept only if its field count equals
/// the header's field count. Mismatched rows are dropped without an error.
pub fn parse(text: &str) -> Vec<Row> {
    let mut lines = text.split('\n').map(str::trim).filter(|l| !l.is_empty());

    let headers: Vec<String> = match lines.next() {
        Some(header_line) => header_line.split(',').map(|c| c.trim().to_string()).collect(),
        None => return Vec::new(),
    };

    let mut rows = Vec::new();
    for line in lines {
        let cells: Vec<&str> = line.split(',').map(str::trim).collect();

        // Field-count mismatch: silent drop.
        if cells.len() != headers.len() {
            continue;
        }

        let row: Row = headers
            .iter()
            .cloned()
            .zip(cells.iter().map(|c| c.to_string()))
            .collect();
        rows.push(row);
    }

    rows
}

// ============================================================================
// SERIALIZE (quote-safe)
// ============================================================================

/// Serialize row mappings into CSV text, columns in `headers` order.
///
/// A key missing from a row becomes an empty cell, which is how the quote
/// export writes its sparse total row. Quoting is handled by `csv::Writer`
/// with its default "quote only when necessary" style.
pub fn serialize(rows: &[Row], headers: &[&str]) -> Result<String> {
    let mut buf = Vec::new();
    {
        let mut wtr = csv::Writer::from_writer(&mut buf);

        wtr.write_record(headers)
            .context("Failed to write CSV header row")?;

        for row in rows {
            let record: Vec<&str> = headers
                .iter()
                .map(|h| row.get(*h).map(String::as_str).unwrap_or(""))
                .collect();
            wtr.write_record(&record)
                .context("Failed to write CSV data row")?;
        }

        wtr.flush().context("Failed to flush CSV writer")?;
    }

    String::from_utf8(buf).context("CSV writer produced invalid UTF-8")
}

// ============================================================================
// TESTS
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    fn row(pairs: &[(&str, &str)]) -> Row {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    #[test]
    fn test_parse_basic() {
        let text = "a,b,c\n1, 2 ,3\n4,5,6\n";
        let rows = parse(text);

        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0]["a"], "1");
        assert_eq!(rows[0]["b"], "2"); // cells are trimmed
        assert_eq!(rows[1]["c"], "6");
    }

    #[test]
    fn test_parse_drops_mismatched_rows() {
        let text = "a,b,c\n1,2,3\nonly,two\n7,8,9,10\n4,5,6";
        let rows = parse(text);

        // Short and long rows are dropped silently.
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0]["a"], "1");
        assert_eq!(rows[1]["a"], "4");
    }

    #[test]
    fn test_parse_skips_empty_lines() {
        let text = "\n\na,b\n\n1,2\n\n";
        let rows = parse(text);

        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0]["b"], "2");
    }

    #[test]
    fn test_parse_empty_input() {
        assert!(parse("").is_empty());
        assert!(parse("\n\n").is_empty());
    }

    #[test]
    fn test_parse_does_not_unquote() {
        // Quotes are cell content on the read side, and a quoted comma
        // changes the field count, so the row is dropped.
        let text = "a,b\n\"x, y\",z\n\"plain\",q";
        let rows = parse(text);

        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0]["a"], "\"plain\"");
    }

    #[test]
    fn test_serialize_quotes_special_fields() {
        let rows = vec![row(&[("name", "Acme, Inc."), ("note", "say \"hi\"")])];
        let text = serialize(&rows, &["name", "note"]).unwrap();

        assert!(text.contains("\"Acme, Inc.\""));
        assert!(text.contains("\"say \"\"hi\"\"\""));
    }

    #[test]
    fn test_serialize_missing_key_is_empty_cell() {
        let rows = vec![row(&[("a", "1")])];
        let text = serialize(&rows, &["a", "b", "c"]).unwrap();

        assert_eq!(text, "a,b,c\n1,,\n");
    }

    #[test]
    fn test_weak_round_trip() {
        let headers = ["service", "rate"];
        let original = vec![
            row(&[("service", "S1"), ("rate", "10.5")]),
            row(&[("service", "S2"), ("rate", "0")]),
        ];

        let text = serialize(&original, &headers).unwrap();
        let reparsed = parse(&text);

        assert_eq!(reparsed, original);
    }
}
