//! # Bank Transfer Details
//!
//! Destination account shown on the bank-transfer step, and IBAN checks
//! for the optional sender account.

use crate::error::{PaymentError, PaymentResult};
use serde::{Deserialize, Serialize};

/// Account the customer transfers money to
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BankDetails {
    pub iban: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub bic: Option<String>,
    pub account_holder: String,
}

impl BankDetails {
    pub fn new(iban: impl Into<String>, account_holder: impl Into<String>) -> Self {
        Self {
            iban: normalize_iban(&iban.into()),
            bic: None,
            account_holder: account_holder.into(),
        }
    }

    pub fn with_bic(mut self, bic: impl Into<String>) -> Self {
        self.bic = Some(bic.into());
        self
    }

    /// IBAN grouped by four characters for display
    pub fn formatted_iban(&self) -> String {
        format_iban(&self.iban)
    }
}

/// Strip whitespace and upper-case an IBAN
pub fn normalize_iban(raw: &str) -> String {
    raw.chars()
        .filter(|c| !c.is_whitespace())
        .map(|c| c.to_ascii_uppercase())
        .collect()
}

/// Group an IBAN in blocks of four
pub fn format_iban(iban: &str) -> String {
    normalize_iban(iban)
        .as_bytes()
        .chunks(4)
        .map(|chunk| String::from_utf8_lossy(chunk).into_owned())
        .collect::<Vec<_>>()
        .join(" ")
}

/// Validate an IBAN with the ISO 13616 mod-97 check.
///
/// Returns the normalized IBAN on success.
pub fn validate_iban(raw: &str) -> PaymentResult<String> {
    let iban = normalize_iban(raw);

    if !(15..=34).contains(&iban.len()) {
        return Err(PaymentError::Validation(format!(
            "IBAN must be between 15 and 34 characters, got {}",
            iban.len()
        )));
    }

    let bytes = iban.as_bytes();
    let shape_ok = bytes[..2].iter().all(u8::is_ascii_uppercase)
        && bytes[2..4].iter().all(u8::is_ascii_digit)
        && bytes.iter().all(u8::is_ascii_alphanumeric);
    if !shape_ok {
        return Err(PaymentError::Validation(
            "IBAN must start with a country code and check digits".to_string(),
        ));
    }

    // Rotate the country code and check digits to the end, letters become 10..35
    let remainder = bytes[4..]
        .iter()
        .chain(&bytes[..4])
        .fold(0u32, |acc, &b| {
            if b.is_ascii_digit() {
                (acc * 10 + (b - b'0') as u32) % 97
            } else {
                (acc * 100 + (b - b'A' + 10) as u32) % 97
            }
        });

    if remainder != 1 {
        return Err(PaymentError::Validation("IBAN checksum is invalid".to_string()));
    }

    Ok(iban)
}
