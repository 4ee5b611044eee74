//! General information of a lot.
//!
//! The engine never interprets these fields beyond checking that they are
//! present; they gate the first-round evaluation and end up in the archive.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use super::lot::{lot_number, year_code};
use crate::error::{FieldIssue, FieldIssues, InspectionError, Result};

/// Lot metadata entered before weighing.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct GeneralInfo {
    /// Operator name.
    pub operator: String,
    /// Product designation.
    pub product: String,
    /// Manufacture date.
    pub manufacture_date: Option<NaiveDate>,
    /// Packaging date, also the base of the lot number.
    pub packaging_date: Option<NaiveDate>,
    /// Embossing day of month (1..=31).
    pub embossing_day: Option<u8>,
    /// Nominal product weight in grams.
    pub product_weight: f64,
    /// Theoretical produced quantity in units.
    pub theoretical_quantity: u64,
    /// Lot number entered by hand, replacing the computed one.
    pub lot_override: Option<String>,
}

impl GeneralInfo {
    /// Collects every missing or invalid field.
    pub fn issues(&self) -> FieldIssues {
        let mut issues = Vec::new();
        if self.operator.trim().is_empty() {
            issues.push(FieldIssue::MissingOperator);
        }
        if self.product.trim().is_empty() {
            issues.push(FieldIssue::MissingProduct);
        }
        if self.manufacture_date.is_none() {
            issues.push(FieldIssue::MissingManufactureDate);
        }
        match self.packaging_date {
            None => issues.push(FieldIssue::MissingPackagingDate),
            Some(date) if year_code(date).is_none() => {
                issues.push(FieldIssue::PackagingDateOutOfRange(date));
            }
            Some(_) => {}
        }
        if !matches!(self.embossing_day, Some(1..=31)) {
            issues.push(FieldIssue::InvalidEmbossingDay(self.embossing_day));
        }
        if !(self.product_weight.is_finite() && self.product_weight > 0.0) {
            issues.push(FieldIssue::NonPositiveWeight(self.product_weight));
        }
        if self.theoretical_quantity == 0 {
            issues.push(FieldIssue::NonPositiveQuantity);
        }
        FieldIssues(issues)
    }

    /// Fails with every issue at once if any field is missing or invalid.
    pub fn validate(&self) -> Result<()> {
        let issues = self.issues();
        if issues.is_empty() {
            Ok(())
        } else {
            Err(InspectionError::InvalidFields(issues))
        }
    }

    /// Lot number: the manual override when set, otherwise derived from the
    /// packaging date and embossing day. Empty without a usable packaging
    /// date.
    pub fn lot(&self) -> String {
        match self.lot_override.as_deref().map(str::trim) {
            Some(manual) if !manual.is_empty() => manual.to_string(),
            _ => self
                .packaging_date
                .and_then(|date| lot_number(date, self.embossing_day))
                .unwrap_or_default(),
        }
    }
}
