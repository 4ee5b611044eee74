//! Inspection history records.
//!
//! One row per completed lot, semicolon-delimited, with a header row written
//! when the history file is created. Raw measurements are kept in two
//! pipe-joined columns, one per round.

use std::fs::OpenOptions;
use std::io::Write;
use std::path::Path;

use chrono::NaiveDateTime;
use serde::Serialize;
use tracing::{debug, info};

use crate::error::{FieldIssue, FieldIssues, InspectionError, Result};
use crate::inspection::FinalReport;

/// Column titles, in row order.
pub const HEADER: [&str; 20] = [
    "Record date",
    "Record time",
    "Operator",
    "Line",
    "Product",
    "Lot",
    "E (day)",
    "Manufacture date",
    "Packaging date",
    "Product weight (g)",
    "Actual produced quantity (units)",
    "Minimum tolerated weight (g)",
    "Measurements per round",
    "First round mean (g)",
    "First round NC",
    "Overall mean (first + second) (g)",
    "Total NC (first + second)",
    "First round measurements",
    "Second round measurements",
    "Final verdict",
];

const DELIMITER: u8 = b';';
const UTF8_BOM: &[u8] = b"\xEF\xBB\xBF";

/// One archived inspection.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ArchiveRecord {
    /// When the record was written.
    pub recorded_at: NaiveDateTime,
    /// Operator name.
    pub operator: String,
    /// Production line.
    pub line: String,
    /// Product designation.
    pub product: String,
    /// Lot number.
    pub lot: String,
    /// Embossing day.
    pub embossing_day: Option<u8>,
    /// Manufacture date, `YYYY-MM-DD`.
    pub manufacture_date: String,
    /// Packaging date, `YYYY-MM-DD`.
    pub packaging_date: String,
    /// Nominal product weight.
    pub product_weight: f64,
    /// Quantity actually produced after sorting out non-conforming units.
    pub actual_quantity: u64,
    /// Minimum tolerated weight.
    pub minimum: f64,
    /// Measurements per round.
    pub sample_size: usize,
    /// First-round mean.
    pub first_mean: f64,
    /// First-round non-conforming count.
    pub first_non_conforming: usize,
    /// Pooled mean, or the first-round mean without a second round.
    pub overall_mean: f64,
    /// Total non-conforming count, or the first-round count.
    pub total_non_conforming: usize,
    /// First-round measurements.
    pub first_measurements: Vec<f64>,
    /// Second-round measurements, empty without a second round.
    pub second_measurements: Vec<f64>,
    /// Verdict text.
    pub verdict: String,
}

impl ArchiveRecord {
    /// Builds the record of a finished inspection.
    ///
    /// # Errors
    ///
    /// [`InspectionError::InvalidFields`] if `actual_quantity` is 0.
    pub fn new(
        report: &FinalReport,
        actual_quantity: u64,
        recorded_at: NaiveDateTime,
    ) -> Result<Self> {
        if actual_quantity == 0 {
            return Err(InspectionError::InvalidFields(FieldIssues(vec![
                FieldIssue::NonPositiveActualQuantity,
            ])));
        }
        let info = &report.info;
        let date = |d: Option<chrono::NaiveDate>| {
            d.map(|d| d.format("%Y-%m-%d").to_string())
                .unwrap_or_default()
        };
        Ok(Self {
            recorded_at,
            operator: info.operator.clone(),
            line: report.line.clone(),
            product: info.product.clone(),
            lot: info.lot(),
            embossing_day: info.embossing_day,
            manufacture_date: date(info.manufacture_date),
            packaging_date: date(info.packaging_date),
            product_weight: info.product_weight,
            actual_quantity,
            minimum: report.minimum,
            sample_size: report.sample_size,
            first_mean: report.first.summary.mean,
            first_non_conforming: report.first.non_conforming,
            overall_mean: report.overall_mean(),
            total_non_conforming: report.total_non_conforming(),
            first_measurements: report.first.measurements.clone(),
            second_measurements: report
                .second
                .as_ref()
                .map(|s| s.measurements.clone())
                .unwrap_or_default(),
            verdict: report.to_string(),
        })
    }

    /// Row cells in [`HEADER`] order.
    ///
    /// Weights read from the form keep a decimal point (`100.0`), computed
    /// means are fixed to two decimals.
    pub fn fields(&self) -> Vec<String> {
        vec![
            self.recorded_at.format("%Y-%m-%d").to_string(),
            self.recorded_at.format("%H:%M:%S").to_string(),
            self.operator.clone(),
            self.line.clone(),
            self.product.clone(),
            self.lot.clone(),
            self.embossing_day.map(|d| d.to_string()).unwrap_or_default(),
            self.manufacture_date.clone(),
            self.packaging_date.clone(),
            format!("{:?}", self.product_weight),
            self.actual_quantity.to_string(),
            format!("{:?}", self.minimum),
            self.sample_size.to_string(),
            format!("{:.2}", self.first_mean),
            self.first_non_conforming.to_string(),
            format!("{:.2}", self.overall_mean),
            self.total_non_conforming.to_string(),
            join_measurements(&self.first_measurements),
            join_measurements(&self.second_measurements),
            self.verdict.clone(),
        ]
    }
}

/// `96.00|95.40|...`, empty for no measurements.
fn join_measurements(values: &[f64]) -> String {
    values
        .iter()
        .map(|v| format!("{v:.2}"))
        .collect::<Vec<_>>()
        .join("|")
}

/// Writes records as delimited rows, optionally preceded by the header.
pub fn write_records<W: Write>(
    writer: W,
    records: &[ArchiveRecord],
    with_header: bool,
) -> Result<()> {
    let mut csv = csv::WriterBuilder::new()
        .delimiter(DELIMITER)
        .from_writer(writer);
    if with_header {
        csv.write_record(HEADER)?;
    }
    for record in records {
        csv.write_record(record.fields())?;
    }
    csv.flush()?;
    Ok(())
}

/// Appends a record to the history file, creating it with a BOM and a
/// header row when missing or empty.
pub fn append_record(path: impl AsRef<Path>, record: &ArchiveRecord) -> Result<()> {
    let path = path.as_ref();
    let mut file = OpenOptions::new().create(true).append(true).open(path)?;
    let is_new = file.metadata()?.len() == 0;
    if is_new {
        debug!(path = %path.display(), "creating inspection history");
        file.write_all(UTF8_BOM)?;
    }
    write_records(&mut file, std::slice::from_ref(record), is_new)?;
    info!(path = %path.display(), lot = %record.lot, "inspection archived");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::InspectionPlan;
    use crate::inspection::{ControlSession, FirstRound, GeneralInfo};
    use chrono::NaiveDate;

    fn info() -> GeneralInfo {
        GeneralInfo {
            operator: "Operator".into(),
            product: "Olives".into(),
            manufacture_date: NaiveDate::from_ymd_opt(2025, 11, 20),
            packaging_date: NaiveDate::from_ymd_opt(2025, 11, 25),
            embossing_day: Some(24),
            product_weight: 100.0,
            theoretical_quantity: 400,
            lot_override: None,
        }
    }

    fn at() -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2025, 11, 25)
            .and_then(|d| d.and_hms_opt(14, 5, 9))
            .expect("valid timestamp")
    }

    #[test]
    fn test_record_first_round_only() {
        let plan = InspectionPlan::default();
        let session = ControlSession::new(&plan, info()).expect("session");
        let report = session
            .first_round(&[96.0; 30])
            .expect("valid")
            .into_final()
            .expect("decisive");
        let record = ArchiveRecord::new(&report, 395, at()).expect("record");
        let fields = record.fields();
        assert_eq!(fields.len(), HEADER.len());
        assert_eq!(fields[0], "2025-11-25");
        assert_eq!(fields[1], "14:05:09");
        assert_eq!(fields[3], "OMORI 2");
        assert_eq!(fields[5], "025329E24");
        assert_eq!(fields[9], "100.0");
        assert_eq!(fields[11], "95.5");
        assert_eq!(fields[13], "96.00");
        assert_eq!(fields[15], "96.00");
        assert_eq!(fields[16], "0");
        assert!(fields[17].starts_with("96.00|96.00|"));
        assert_eq!(fields[18], "");
        assert_eq!(fields[19], "Lot accepted at first round");
    }

    #[test]
    fn test_record_after_second_round() {
        let plan = InspectionPlan::default();
        let session = ControlSession::new(&plan, info()).expect("session");
        let mut first = vec![97.0; 30];
        first[0] = 95.0;
        let FirstRound::Inconclusive(pending) = session.first_round(&first).expect("valid") else {
            panic!("expected second round");
        };
        let report = pending.evaluate(&[97.0; 30]).expect("valid");
        let record = ArchiveRecord::new(&report, 380, at()).expect("record");
        assert_eq!(record.first_non_conforming, 1);
        assert_eq!(record.total_non_conforming, 1);
        assert_eq!(record.second_measurements.len(), 30);
        assert!((record.overall_mean - 96.966_666).abs() < 1e-4);
    }

    #[test]
    fn test_whole_weights_keep_decimal_point() {
        let plan = InspectionPlan::default();
        let general = GeneralInfo {
            product_weight: 1000.0,
            ..info()
        };
        let report = ControlSession::new(&plan, general)
            .expect("session")
            .first_round(&[990.0; 30])
            .expect("valid")
            .into_final()
            .expect("decisive");
        let fields = ArchiveRecord::new(&report, 400, at()).expect("record").fields();
        assert_eq!(fields[9], "1000.0");
        assert_eq!(fields[11], "985.0");
    }

    #[test]
    fn test_zero_actual_quantity_rejected() {
        let plan = InspectionPlan::default();
        let session = ControlSession::new(&plan, info()).expect("session");
        let report = session
            .first_round(&[96.0; 30])
            .expect("valid")
            .into_final()
            .expect("decisive");
        let err = ArchiveRecord::new(&report, 0, at()).unwrap_err();
        assert!(matches!(err, InspectionError::InvalidFields(_)));
    }

    #[test]
    fn test_append_writes_header_once() {
        let plan = InspectionPlan::default();
        let session = ControlSession::new(&plan, info()).expect("session");
        let report = session
            .first_round(&[96.0; 30])
            .expect("valid")
            .into_final()
            .expect("decisive");
        let record = ArchiveRecord::new(&report, 395, at()).expect("record");

        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("history.csv");
        append_record(&path, &record).expect("first append");
        append_record(&path, &record).expect("second append");

        let bytes = std::fs::read(&path).expect("read back");
        assert!(bytes.starts_with(UTF8_BOM));
        let text = String::from_utf8(bytes[UTF8_BOM.len()..].to_vec()).expect("utf-8");
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines.len(), 3);
        assert!(lines[0].starts_with("Record date;Record time;Operator"));
        assert!(lines[1].contains(";025329E24;"));
        assert_eq!(lines[1], lines[2]);
    }
}
