// src/utils/csv.rs - minimal RFC 4180 reading and writing helpers

/// Parses CSV text into rows of fields. Quoted fields may contain commas,
/// newlines, and doubled quotes; CRLF line endings are accepted.
pub fn parse(text: &str) -> Vec<Vec<String>> {
    let mut rows: Vec<Vec<String>> = Vec::new();
    let mut row: Vec<String> = Vec::new();
    let mut field = String::new();
    let mut in_quotes = false;

    let mut chars = text.chars().peekable();
    while let Some(c) = chars.next() {
        if in_quotes {
            match c {
                '"' => {
                    if chars.peek() == Some(&'"') {
                        chars.next();
                        field.push('"');
                    } else {
                        in_quotes = false;
                    }
                }
                _ => field.push(c),
            }
        } else {
            match c {
                '"' => in_quotes = true,
                ',' => row.push(std::mem::take(&mut field)),
                '\r' => {}
                '\n' => {
                    row.push(std::mem::take(&mut field));
                    rows.push(std::mem::take(&mut row));
                }
                _ => field.push(c),
            }
        }
    }
    if !field.is_empty() || !row.is_empty() {
        row.push(field);
        rows.push(row);
    }
    rows
}

/// Quotes a value when it contains a delimiter, quote, or newline.
pub fn escape(value: &str) -> String {
    if value.contains(',') || value.contains('"') || value.contains('\n') {
        format!("\"{}\"", value.replace('"', "\"\""))
    } else {
        value.to_string()
    }
}

/// Renders one CSV row with a trailing newline.
pub fn format_row(fields: &[String]) -> String {
    let escaped: Vec<String> = fields.iter().map(|f| escape(f)).collect();
    format!("{}\n", escaped.join(","))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_plain_rows() {
        let rows = parse("a,b,c\n1,2,3\n");
        assert_eq!(rows, vec![vec!["a", "b", "c"], vec!["1", "2", "3"]]);
    }

    #[test]
    fn test_parse_quoted_fields() {
        let rows = parse("name,notes\n\"Lee, Ann\",\"said \"\"hi\"\"\"\n");
        assert_eq!(rows[1], vec!["Lee, Ann", "said \"hi\""]);
    }

    #[test]
    fn test_parse_embedded_newline() {
        let rows = parse("a,b\n\"line1\nline2\",x\n");
        assert_eq!(rows[1], vec!["line1\nline2", "x"]);
    }

    #[test]
    fn test_parse_trailing_empty_field() {
        let rows = parse("a,b,\n");
        assert_eq!(rows, vec![vec!["a", "b", ""]]);
    }

    #[test]
    fn test_parse_without_final_newline() {
        let rows = parse("a,b\n1,2");
        assert_eq!(rows[1], vec!["1", "2"]);
    }

    #[test]
    fn test_parse_empty_input() {
        assert!(parse("").is_empty());
    }

    #[test]
    fn test_escape_round_trip() {
        let fields = vec![
            "plain".to_string(),
            "with, comma".to_string(),
            "with \"quote\"".to_string(),
        ];
        let line = format_row(&fields);
        let parsed = parse(&line);
        assert_eq!(parsed[0], fields);
    }
}
