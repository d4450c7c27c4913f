//! CSV tables: raw posts in, tokenized posts and frequency rows out.
//!
//! Every file written here starts with a UTF-8 byte-order mark so spreadsheet
//! tools pick the right encoding; a leading mark on input is ignored. Parent
//! directories of output files are created as needed.

use std::fs::File;
use std::io::{BufWriter, Read, Write};
use std::path::Path;

use dupe_types::{FrequencyRow, PipelineError, Record, Token};

const UTF8_BOM: &[u8] = b"\xEF\xBB\xBF";

/// Name of the column added by [`PostTable::write_with_tokens`].
pub const TOKENS_COLUMN: &str = "tokens";

/// A CSV table held in memory. Short rows are allowed; missing trailing
/// cells read as empty.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PostTable {
    headers: Vec<String>,
    rows: Vec<Vec<String>>,
}

impl PostTable {
    /// Builds a table from a header and rows.
    pub fn new(headers: Vec<String>, rows: Vec<Vec<String>>) -> Self {
        Self { headers, rows }
    }

    /// Reads a CSV file with a header row.
    ///
    /// # Errors
    ///
    /// Returns `PipelineError::Io` naming the path if the file cannot be
    /// opened and `PipelineError::Csv` if it is not valid CSV.
    pub fn read_csv(path: &Path) -> Result<Self, PipelineError> {
        let file = File::open(path).map_err(|e| PipelineError::io("open table", path, e))?;
        let table = Self::from_reader(file)?;
        tracing::info!(
            path = %path.display(),
            rows = table.len(),
            columns = table.headers.len(),
            "loaded table"
        );
        Ok(table)
    }

    /// Reads CSV data with a header row from any reader.
    ///
    /// # Errors
    ///
    /// Returns `PipelineError::Csv` if the data is not valid CSV.
    pub fn from_reader<R: Read>(reader: R) -> Result<Self, PipelineError> {
        let mut rdr = csv::ReaderBuilder::new().flexible(true).from_reader(reader);

        let headers = rdr
            .headers()
            .map_err(|e| PipelineError::csv("read header", e))?
            .iter()
            .enumerate()
            .map(|(i, h)| {
                let h = if i == 0 { h.trim_start_matches('\u{feff}') } else { h };
                h.trim().to_string()
            })
            .collect();

        let mut rows = Vec::new();
        for record in rdr.records() {
            let record = record.map_err(|e| PipelineError::csv("read row", e))?;
            rows.push(record.iter().map(str::to_string).collect());
        }

        Ok(Self { headers, rows })
    }

    /// Column names.
    #[inline]
    pub fn headers(&self) -> &[String] {
        &self.headers
    }

    /// Number of data rows.
    #[inline]
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    /// Returns `true` if the table has no data rows.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Position of a column.
    ///
    /// # Errors
    ///
    /// Returns `PipelineError::MissingColumn` listing the available columns.
    pub fn column_index(&self, name: &str) -> Result<usize, PipelineError> {
        self.headers
            .iter()
            .position(|h| h == name)
            .ok_or_else(|| {
                PipelineError::missing_column(name, self.headers.iter().map(String::as_str))
            })
    }

    /// A cell, `None` when empty or beyond a short row.
    #[inline]
    pub fn cell(&self, row: usize, col: usize) -> Option<&str> {
        self.rows
            .get(row)
            .and_then(|r| r.get(col))
            .map(String::as_str)
            .filter(|c| !c.is_empty())
    }

    fn column_values(&self, col: usize) -> impl Iterator<Item = Option<String>> + '_ {
        (0..self.rows.len()).map(move |row| self.cell(row, col).map(str::to_string))
    }

    /// Records carrying only the text column.
    ///
    /// # Errors
    ///
    /// Returns `PipelineError::MissingColumn` if `text_column` is absent.
    pub fn text_records(&self, text_column: &str) -> Result<Vec<Record>, PipelineError> {
        let col = self.column_index(text_column)?;
        Ok(self
            .column_values(col)
            .map(|text| Record {
                text,
                ..Record::default()
            })
            .collect())
    }

    /// Records carrying group and outcome labels, plus text if `text_column`
    /// is present in the header.
    ///
    /// # Errors
    ///
    /// Returns `PipelineError::MissingColumn` if a label column is absent.
    pub fn labeled_records(
        &self,
        group_column: &str,
        outcome_column: &str,
        text_column: &str,
    ) -> Result<Vec<Record>, PipelineError> {
        let group_col = self.column_index(group_column)?;
        let outcome_col = self.column_index(outcome_column)?;
        let text_col = self.column_index(text_column).ok();

        Ok((0..self.rows.len())
            .map(|row| Record {
                text: text_col.and_then(|c| self.cell(row, c)).map(str::to_string),
                group: self.cell(row, group_col).map(str::to_string),
                outcome: self.cell(row, outcome_col).map(str::to_string),
            })
            .collect())
    }

    /// Writes the table with an extra `tokens` column holding a JSON array
    /// per row. Rows without a token list get `[]`.
    ///
    /// # Errors
    ///
    /// Returns `PipelineError::Io` or `PipelineError::Csv` on write failure.
    pub fn write_with_tokens(
        &self,
        path: &Path,
        tokens: &[Vec<Token>],
    ) -> Result<(), PipelineError> {
        let file = create_output(path)?;
        self.write_with_tokens_to(file, tokens)?;
        tracing::info!(path = %path.display(), rows = self.len(), "saved tokenized table");
        Ok(())
    }

    /// Writer-generic form of [`write_with_tokens`](Self::write_with_tokens).
    /// No byte-order mark is added.
    ///
    /// # Errors
    ///
    /// Returns `PipelineError::Csv` or `PipelineError::Json` on failure.
    pub fn write_with_tokens_to<W: Write>(
        &self,
        writer: W,
        tokens: &[Vec<Token>],
    ) -> Result<(), PipelineError> {
        debug_assert!(tokens.len() <= self.rows.len(), "more token lists than rows");

        let mut wtr = csv::WriterBuilder::new().flexible(true).from_writer(writer);
        let width = self.headers.len();

        let mut header = self.headers.clone();
        header.push(TOKENS_COLUMN.to_string());
        wtr.write_record(&header)
            .map_err(|e| PipelineError::csv("write header", e))?;

        let mut out = Vec::with_capacity(width + 1);
        for (i, row) in self.rows.iter().enumerate() {
            out.clear();
            out.extend(row.iter().cloned());
            out.resize(width.max(row.len()), String::new());

            let list = tokens.get(i).map(Vec::as_slice).unwrap_or(&[]);
            out.push(
                serde_json::to_string(list).map_err(|e| PipelineError::json("encode tokens", e))?,
            );
            wtr.write_record(&out)
                .map_err(|e| PipelineError::csv("write row", e))?;
        }

        wtr.flush()
            .map_err(|e| PipelineError::csv("flush", csv::Error::from(e)))?;
        Ok(())
    }
}

/// Creates `path` and its parent directories and writes the byte-order mark.
fn create_output(path: &Path) -> Result<BufWriter<File>, PipelineError> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)
            .map_err(|e| PipelineError::io("create directory", parent, e))?;
    }
    let mut file =
        BufWriter::new(File::create(path).map_err(|e| PipelineError::io("create file", path, e))?);
    file.write_all(UTF8_BOM)
        .map_err(|e| PipelineError::io("write file", path, e))?;
    Ok(file)
}

/// Writes `token,count` rows to a CSV file.
///
/// # Errors
///
/// Returns `PipelineError::Io` or `PipelineError::Csv` on write failure.
pub fn write_frequency_table(path: &Path, rows: &[FrequencyRow]) -> Result<(), PipelineError> {
    let file = create_output(path)?;
    write_frequency_csv(file, rows)?;
    tracing::info!(path = %path.display(), rows = rows.len(), "exported frequency table");
    Ok(())
}

/// Writes `token,count` rows to any writer.
///
/// # Errors
///
/// Returns `PipelineError::Csv` on failure.
pub fn write_frequency_csv<W: Write>(
    writer: W,
    rows: &[FrequencyRow],
) -> Result<(), PipelineError> {
    let mut wtr = csv::Writer::from_writer(writer);
    if rows.is_empty() {
        wtr.write_record(["token", "count"])
            .map_err(|e| PipelineError::csv("write header", e))?;
    }
    for row in rows {
        wtr.serialize(row)
            .map_err(|e| PipelineError::csv("write frequency row", e))?;
    }
    wtr.flush()
        .map_err(|e| PipelineError::csv("flush", csv::Error::from(e)))?;
    Ok(())
}

/// Reads a `token,count` CSV file back.
///
/// # Errors
///
/// Returns `PipelineError::Io` if the file cannot be opened and
/// `PipelineError::Csv` for malformed rows.
pub fn read_frequency_table(path: &Path) -> Result<Vec<FrequencyRow>, PipelineError> {
    let mut data = Vec::new();
    File::open(path)
        .and_then(|mut f| f.read_to_end(&mut data))
        .map_err(|e| PipelineError::io("read frequency table", path, e))?;
    let body = data.strip_prefix(UTF8_BOM).unwrap_or(&data[..]);

    csv::Reader::from_reader(body)
        .deserialize::<FrequencyRow>()
        .map(|row| row.map_err(|e| PipelineError::csv("read frequency row", e)))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE: &str = "id,text,motivation_type,purchase_intent\n\
                          1,這個CP值超高！http://x.com,hedonic,strong\n\
                          2,,utilitarian,none\n\
                          3,\"好用, 便宜\",both\n";

    fn sample() -> PostTable {
        PostTable::from_reader(SAMPLE.as_bytes()).unwrap()
    }

    #[test]
    fn reads_headers_and_rows() {
        let table = sample();
        assert_eq!(table.headers(), ["id", "text", "motivation_type", "purchase_intent"]);
        assert_eq!(table.len(), 3);
        assert_eq!(table.cell(2, 1), Some("好用, 便宜"));
    }

    #[test]
    fn empty_and_missing_cells_are_none() {
        let table = sample();
        assert_eq!(table.cell(1, 1), None);
        assert_eq!(table.cell(2, 3), None);
        assert_eq!(table.cell(9, 0), None);
    }

    #[test]
    fn missing_column_names_it() {
        let err = sample().column_index("content").unwrap_err();
        match err {
            PipelineError::MissingColumn { column, available } => {
                assert_eq!(column, "content");
                assert_eq!(available.len(), 4);
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn text_records() {
        let records = sample().text_records("text").unwrap();
        assert_eq!(records.len(), 3);
        assert_eq!(records[0].text.as_deref(), Some("這個CP值超高！http://x.com"));
        assert_eq!(records[1].text, None);
        assert!(records[0].group.is_none());
    }

    #[test]
    fn labeled_records() {
        let records = sample()
            .labeled_records("motivation_type", "purchase_intent", "text")
            .unwrap();
        assert_eq!(
            records[0],
            Record::new("這個CP值超高！http://x.com").with_labels("hedonic", "strong")
        );
        assert_eq!(records[2].group.as_deref(), Some("both"));
        assert_eq!(records[2].outcome, None);
    }

    #[test]
    fn labeled_records_without_text_column() {
        let csv = "motivation_type,purchase_intent\nhedonic,weak\n";
        let table = PostTable::from_reader(csv.as_bytes()).unwrap();
        let records = table
            .labeled_records("motivation_type", "purchase_intent", "text")
            .unwrap();
        assert_eq!(records, [Record::labeled("hedonic", "weak")]);
    }

    #[test]
    fn bom_in_header_is_ignored() {
        let table = PostTable::from_reader("\u{feff}text\n好用\n".as_bytes()).unwrap();
        assert!(table.column_index("text").is_ok());
    }

    #[test]
    fn missing_file_names_path() {
        let err = PostTable::read_csv(Path::new("/no/such/posts.csv")).unwrap_err();
        assert!(matches!(err, PipelineError::Io { .. }));
        assert!(err.to_string().contains("/no/such/posts.csv"));
    }

    #[test]
    fn tokens_column_is_json() {
        let table = sample();
        let tokens = vec![
            vec!["這個".to_string(), "cp值".to_string()],
            vec![],
            vec!["好用".to_string()],
        ];
        let mut buf = Vec::new();
        table.write_with_tokens_to(&mut buf, &tokens).unwrap();

        let back = PostTable::from_reader(buf.as_slice()).unwrap();
        let col = back.column_index(TOKENS_COLUMN).unwrap();
        assert_eq!(col, 4);
        assert_eq!(back.cell(0, col), Some(r#"["這個","cp值"]"#));
        assert_eq!(back.cell(1, col), Some("[]"));
        assert_eq!(back.cell(2, 3), None);
        assert_eq!(back.cell(2, col), Some(r#"["好用"]"#));
    }

    #[test]
    fn output_files_have_bom_and_parents() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("data/processed/out.csv");

        sample()
            .write_with_tokens(&path, &[vec!["a".to_string()]])
            .unwrap();

        let bytes = std::fs::read(&path).unwrap();
        assert!(bytes.starts_with(UTF8_BOM));
        let back = PostTable::read_csv(&path).unwrap();
        assert_eq!(back.headers()[0], "id");
        assert_eq!(back.len(), 3);
    }

    #[test]
    fn frequency_table_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("reports/freq.csv");
        let rows = vec![FrequencyRow::new("平替", 9), FrequencyRow::new("好用", 4)];

        write_frequency_table(&path, &rows).unwrap();
        let text = std::fs::read_to_string(&path).unwrap();
        assert!(text.starts_with("\u{feff}token,count\n"));
        assert_eq!(read_frequency_table(&path).unwrap(), rows);
    }

    #[test]
    fn empty_frequency_table_keeps_header() {
        let mut buf = Vec::new();
        write_frequency_csv(&mut buf, &[]).unwrap();
        assert_eq!(String::from_utf8(buf).unwrap(), "token,count\n");
    }
}
