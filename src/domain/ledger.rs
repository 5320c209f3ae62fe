//! Append-only prediction history for one session.

use std::fmt::Write as _;
use std::path::Path;

use super::record::{PredictionRecord, RECORD_HEADERS};

/// Error type for history export.
#[derive(Debug, thiserror::Error)]
pub enum LedgerError {
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("Export is not valid UTF-8: {0}")]
    Encoding(#[from] std::string::FromUtf8Error),

    #[error("Failed to write export: {0}")]
    Io(#[from] std::io::Error),
}

/// Ordered list of predictions made during a session.
///
/// Records are only ever appended; there is no update or removal.
#[derive(Debug, Clone, Default)]
pub struct HistoryLedger {
    records: Vec<PredictionRecord>,
}

impl HistoryLedger {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a record at the end.
    pub fn append(&mut self, record: PredictionRecord) {
        self.records.push(record);
    }

    /// True until the first append. Export controls are hidden while empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.records.len()
    }

    #[must_use]
    pub fn records(&self) -> &[PredictionRecord] {
        &self.records
    }

    #[must_use]
    pub fn last(&self) -> Option<&PredictionRecord> {
        self.records.last()
    }

    /// Serialize all records as UTF-8 CSV with a header row.
    ///
    /// # Errors
    /// Returns error if serialization fails.
    pub fn export_csv(&self) -> Result<String, LedgerError> {
        let mut writer = csv::WriterBuilder::new()
            .has_headers(false)
            .from_writer(Vec::new());

        // Written explicitly so an empty ledger still yields a header.
        writer.write_record(RECORD_HEADERS)?;
        for record in &self.records {
            writer.serialize(record)?;
        }

        let bytes = writer
            .into_inner()
            .map_err(|e| LedgerError::Io(e.into_error()))?;
        Ok(String::from_utf8(bytes)?)
    }

    /// Parse a CSV produced by [`Self::export_csv`].
    ///
    /// # Errors
    /// Returns error if the input is not a valid history export.
    pub fn from_csv(data: &[u8]) -> Result<Self, LedgerError> {
        let mut reader = csv::Reader::from_reader(data);
        let records = reader
            .deserialize::<PredictionRecord>()
            .collect::<Result<Vec<_>, _>>()?;
        Ok(Self { records })
    }

    /// Render the history as an HTML table fragment for preview.
    #[must_use]
    pub fn export_html(&self) -> String {
        let mut out = String::new();
        out.push_str("<div style='overflow-x:auto;'>\n");
        out.push_str("<table border=\"1\" class=\"history\">\n  <thead>\n    <tr>");
        for header in RECORD_HEADERS {
            let _ = write!(out, "<th>{}</th>", escape_html(header));
        }
        out.push_str("</tr>\n  </thead>\n  <tbody>\n");
        for record in &self.records {
            out.push_str("    <tr>");
            for cell in record.display_cells() {
                let _ = write!(out, "<td>{}</td>", escape_html(&cell));
            }
            out.push_str("</tr>\n");
        }
        out.push_str("  </tbody>\n</table>\n</div>\n");
        out
    }

    /// Write the CSV export to `path`.
    ///
    /// # Errors
    /// Returns error if serialization or the write fails.
    pub fn write_csv(&self, path: &Path) -> Result<(), LedgerError> {
        std::fs::write(path, self.export_csv()?)?;
        tracing::info!("Wrote {} history rows to {:?}", self.len(), path);
        Ok(())
    }

    /// Write a standalone HTML report to `path`.
    ///
    /// # Errors
    /// Returns error if the write fails.
    pub fn write_html(&self, path: &Path, title: &str) -> Result<(), LedgerError> {
        let doc = format!(
            "<!DOCTYPE html>\n<html>\n<head><meta charset=\"utf-8\"><title>{t}</title></head>\n<body>\n<h3>{t}</h3>\n{}</body>\n</html>\n",
            self.export_html(),
            t = escape_html(title),
        );
        std::fs::write(path, doc)?;
        tracing::info!("Wrote HTML report ({} rows) to {:?}", self.len(), path);
        Ok(())
    }
}

fn escape_html(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    for ch in s.chars() {
        match ch {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(ch),
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::applicant::Region;
    use crate::domain::record::ModelVariant;
    use tempfile::tempdir;

    fn record(age: u8, cost: f64) -> PredictionRecord {
        PredictionRecord {
            age,
            sex: "male".into(),
            bmi: 70.0 / (1.7 * 1.7),
            children: 1,
            smoker: "no".into(),
            region: Region::Northwest,
            model: ModelVariant::RandomForest,
            predicted_cost: cost,
        }
    }

    #[test]
    fn test_is_empty() {
        let mut ledger = HistoryLedger::new();
        assert!(ledger.is_empty());
        ledger.append(record(30, 100.0));
        assert!(!ledger.is_empty());
        assert_eq!(ledger.len(), 1);
    }

    #[test]
    fn test_csv_preserves_insertion_order() {
        let mut ledger = HistoryLedger::new();
        ledger.append(record(21, 1.0));
        ledger.append(record(42, 2.0));
        ledger.append(record(63, 3.0));

        let csv = ledger.export_csv().expect("export");
        let lines: Vec<&str> = csv.lines().collect();
        assert_eq!(lines.len(), 4);
        assert_eq!(
            lines[0],
            "Age,Sex,BMI,Children,Smoker,Region,Model,Predicted Cost (€)"
        );
        assert!(lines[1].starts_with("21,"));
        assert!(lines[2].starts_with("42,"));
        assert!(lines[3].starts_with("63,"));
        assert!(lines[1].contains(",northwest,Random Forest,"));
    }

    #[test]
    fn test_csv_round_trip() {
        let mut ledger = HistoryLedger::new();
        ledger.append(record(30, 4248.5));
        ledger.append(PredictionRecord {
            sex: "weiblich".into(),
            smoker: "ja".into(),
            region: Region::Southeast,
            model: ModelVariant::LinearRegression,
            ..record(55, 31234.57)
        });

        let csv = ledger.export_csv().expect("export");
        let parsed = HistoryLedger::from_csv(csv.as_bytes()).expect("parse");
        assert_eq!(parsed.records(), ledger.records());
    }

    #[test]
    fn test_empty_export_has_header_only() {
        let csv = HistoryLedger::new().export_csv().expect("export");
        assert_eq!(csv.lines().count(), 1);
        assert!(HistoryLedger::from_csv(csv.as_bytes()).expect("parse").is_empty());
    }

    #[test]
    fn test_from_csv_rejects_unknown_region() {
        let data = "Age,Sex,BMI,Children,Smoker,Region,Model,Predicted Cost (€)\n\
                    30,male,25,0,no,midwest,Random Forest,100.0\n";
        assert!(HistoryLedger::from_csv(data.as_bytes()).is_err());
    }

    #[test]
    fn test_html_escapes_values() {
        let mut ledger = HistoryLedger::new();
        ledger.append(PredictionRecord {
            sex: "<script>".into(),
            ..record(30, 12.5)
        });

        let html = ledger.export_html();
        assert!(html.contains("<th>Predicted Cost (€)</th>"));
        assert!(html.contains("<td>&lt;script&gt;</td>"));
        assert!(html.contains("<td>12.50</td>"));
        assert!(!html.contains("<script>"));
    }

    #[test]
    fn test_write_files() {
        let dir = tempdir().expect("tempdir");
        let mut ledger = HistoryLedger::new();
        ledger.append(record(30, 99.99));

        let csv_path = dir.path().join("prediction_history.csv");
        let html_path = dir.path().join("prediction_history.html");
        ledger.write_csv(&csv_path).expect("write csv");
        ledger.write_html(&html_path, "History").expect("write html");

        let csv = std::fs::read(&csv_path).expect("read csv");
        assert_eq!(HistoryLedger::from_csv(&csv).expect("parse").len(), 1);
        let html = std::fs::read_to_string(&html_path).expect("read html");
        assert!(html.contains("<title>History</title>"));
    }
}
