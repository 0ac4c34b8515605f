use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use sha1::{Digest, Sha1};

use crate::constants::RECORD_ID_MODULUS;

/// One melted row as it sits in the spill file: identity values, the period
/// header it came from and the raw cell.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LongRow {
    #[serde(rename = "Account Name")]
    pub account_name: String,
    #[serde(rename = "Account Code")]
    pub account_code: String,
    #[serde(rename = "Level Name")]
    pub level_name: String,
    #[serde(rename = "GL Account Name")]
    pub gl_account: String,
    #[serde(rename = "Location Name")]
    pub location: String,
    #[serde(rename = "Contract Name")]
    pub contract: String,
    #[serde(rename = "Assignment Name")]
    pub assignment: String,
    #[serde(rename = "Date")]
    pub date: String,
    #[serde(rename = "Amount")]
    pub amount: String,
}

/// A numeric cell, or the untouched cell text when it does not parse.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Amount {
    Number(f64),
    Raw(String),
}

impl Amount {
    pub fn parse(cell: &str) -> Self {
        match cell.trim().parse::<f64>() {
            Ok(value) if value.is_finite() => Amount::Number(value),
            _ => Amount::Raw(cell.to_string()),
        }
    }

    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Amount::Number(v) => Some(*v),
            Amount::Raw(_) => None,
        }
    }
}

/// The normalized output unit of the wide-to-long export.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LongRecord {
    pub id: u64,
    pub account_name: String,
    pub account_code: String,
    pub level_name: String,
    pub gl_account: String,
    pub location: String,
    pub contract: String,
    pub assignment: String,
    pub date: String,
    pub amount: Amount,
}

impl From<LongRow> for LongRecord {
    fn from(row: LongRow) -> Self {
        // The id is keyed on the raw period header, before normalization
        let id = record_id(&[
            &row.account_code,
            &row.level_name,
            &row.date,
            &row.gl_account,
            &row.location,
            &row.contract,
            &row.assignment,
        ]);
        Self {
            id,
            date: normalize_date(&row.date),
            amount: Amount::parse(&row.amount),
            account_name: row.account_name,
            account_code: row.account_code,
            level_name: row.level_name,
            gl_account: row.gl_account,
            location: row.location,
            contract: row.contract,
            assignment: row.assignment,
        }
    }
}

/// SHA-1 over the concatenated key parts, read as a big-endian integer and
/// reduced to its last twelve decimal digits. Equal keys always give equal ids.
pub fn record_id(parts: &[&str]) -> u64 {
    let mut hasher = Sha1::new();
    for part in parts {
        hasher.update(part.as_bytes());
    }
    let digest = hasher.finalize();
    let id = digest
        .iter()
        .fold(0u128, |acc, byte| (acc * 256 + u128::from(*byte)) % RECORD_ID_MODULUS);
    id as u64
}

/// `MM/YYYY` becomes `YYYY-MM-01`; anything else is returned unchanged.
pub fn normalize_date(date: &str) -> String {
    if !is_month_year(date) {
        return date.to_string();
    }
    NaiveDate::parse_from_str(&format!("01/{date}"), "%d/%m/%Y")
        .map(|d| d.format("%Y-%m-%d").to_string())
        .unwrap_or_else(|_| date.to_string())
}

// One or two month digits, a slash, exactly four year digits
fn is_month_year(date: &str) -> bool {
    let all_digits = |s: &str| s.bytes().all(|b| b.is_ascii_digit());
    match date.split_once('/') {
        Some((month, year)) => {
            (1..=2).contains(&month.len())
                && all_digits(month)
                && year.len() == 4
                && all_digits(year)
        }
        None => false,
    }
}
