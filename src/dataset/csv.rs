//! Minimal CSV reader for reference data and uploads
//!
//! Comma separated, `"`-quoted fields with `""` escapes, LF or CRLF line
//! endings. A UTF-8 BOM is stripped and blank lines are skipped. The first
//! record is the header.

use super::DatasetError;

#[derive(Debug, Clone)]
pub struct CsvTable {
    headers: Vec<String>,
    rows: Vec<(usize, Vec<String>)>,
}

/// One data row addressed by header name
#[derive(Debug, Clone, Copy)]
pub struct Record<'a> {
    headers: &'a [String],
    fields: &'a [String],
    line: usize,
}

impl<'a> Record<'a> {
    /// Trimmed field value; empty cells read as `None`
    pub fn get(&self, column: &str) -> Option<&'a str> {
        let index = self.headers.iter().position(|h| h == column)?;
        let value = self.fields.get(index)?.trim();
        (!value.is_empty()).then_some(value)
    }

    /// 1-based line where the record starts
    pub fn line(&self) -> usize {
        self.line
    }
}

impl CsvTable {
    pub fn from_bytes(bytes: &[u8]) -> Result<Self, DatasetError> {
        let text = std::str::from_utf8(bytes).map_err(|_| DatasetError::Encoding)?;
        Self::parse(text)
    }

    pub fn parse(text: &str) -> Result<Self, DatasetError> {
        let text = text.strip_prefix('\u{feff}').unwrap_or(text);

        let mut records = Vec::new();
        let mut record: Vec<String> = Vec::new();
        let mut field = String::new();
        let mut in_quotes = false;
        let mut line = 1usize;
        let mut record_line = 1usize;

        let mut chars = text.chars().peekable();
        while let Some(c) = chars.next() {
            if in_quotes {
                match c {
                    '"' if chars.peek() == Some(&'"') => {
                        chars.next();
                        field.push('"');
                    }
                    '"' => in_quotes = false,
                    '\n' => {
                        line += 1;
                        field.push(c);
                    }
                    _ => field.push(c),
                }
                continue;
            }

            match c {
                '"' if field.is_empty() => in_quotes = true,
                ',' => record.push(std::mem::take(&mut field)),
                '\r' if chars.peek() == Some(&'\n') => {}
                '\n' => {
                    record.push(std::mem::take(&mut field));
                    push_record(&mut records, std::mem::take(&mut record), record_line);
                    line += 1;
                    record_line = line;
                }
                _ => field.push(c),
            }
        }

        if in_quotes {
            return Err(DatasetError::UnterminatedQuote { line: record_line });
        }
        if !field.is_empty() || !record.is_empty() {
            record.push(field);
            push_record(&mut records, record, record_line);
        }

        let mut records = records.into_iter();
        let (_, headers) = records.next().ok_or(DatasetError::MissingHeader)?;
        let headers = headers.into_iter().map(|h| h.trim().to_string()).collect();

        Ok(Self {
            headers,
            rows: records.collect(),
        })
    }

    pub fn headers(&self) -> &[String] {
        &self.headers
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Fail on the first column in `columns` that the header lacks
    pub fn require_columns(&self, columns: &[&str]) -> Result<(), DatasetError> {
        match columns.iter().find(|c| !self.headers.iter().any(|h| h == *c)) {
            Some(missing) => Err(DatasetError::MissingColumn(missing.to_string())),
            None => Ok(()),
        }
    }

    pub fn records(&self) -> impl Iterator<Item = Record<'_>> {
        self.rows.iter().map(move |(line, fields)| Record {
            headers: &self.headers,
            fields,
            line: *line,
        })
    }
}

fn push_record(records: &mut Vec<(usize, Vec<String>)>, record: Vec<String>, line: usize) {
    let blank = record.iter().all(|f| f.trim().is_empty());
    if !blank {
        records.push((line, record));
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_quoted_fields() {
        let table = CsvTable::parse("\u{feff}이름,메모\r\n\"김, 하늘\",\"말하길 \"\"안녕\"\"\"\r\n\r\n박서준,\n").unwrap();

        assert_eq!(table.headers(), &["이름".to_string(), "메모".to_string()]);
        assert_eq!(table.len(), 2);

        let rows: Vec<_> = table.records().collect();
        assert_eq!(rows[0].get("이름"), Some("김, 하늘"));
        assert_eq!(rows[0].get("메모"), Some("말하길 \"안녕\""));
        assert_eq!(rows[1].get("메모"), None);
        assert_eq!(rows[1].line(), 4);
        assert_eq!(rows[1].get("없는열"), None);
    }

    #[test]
    fn test_multiline_field_keeps_line_numbers() {
        let table = CsvTable::parse("a,b\n\"x\ny\",1\nz,2").unwrap();
        let rows: Vec<_> = table.records().collect();
        assert_eq!(rows[0].get("a"), Some("x\ny"));
        assert_eq!(rows[1].line(), 4);
        assert_eq!(rows[1].get("b"), Some("2"));
    }

    #[test]
    fn test_errors() {
        assert!(matches!(CsvTable::parse(""), Err(DatasetError::MissingHeader)));
        assert!(matches!(
            CsvTable::parse("a\n\"open"),
            Err(DatasetError::UnterminatedQuote { line: 2 })
        ));
        assert!(matches!(CsvTable::from_bytes(&[0xff, 0xfe]), Err(DatasetError::Encoding)));

        let table = CsvTable::parse("a,b\n1,2").unwrap();
        assert!(table.require_columns(&["a", "b"]).is_ok());
        assert!(matches!(
            table.require_columns(&["a", "c"]),
            Err(DatasetError::MissingColumn(c)) if c == "c"
        ));
    }
}
