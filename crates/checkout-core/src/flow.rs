//! # Selection Flow
//!
//! The checkout modal's state machine.
//!
//! ```text
//!            select(wallet | redirect | bank transfer)
//!   ┌────────┐ ─────────────────────────────────────▶ ┌─────────┐
//!   │ Select │                                         │ Details │
//!   └────────┘ ◀───────────────── back ─────────────── └─────────┘
//!       │  ▲                                               │ proceed_to_upload
//!       │  │                                               ▼ (bank transfer)
//!       │  └──────────────────── back ──────────────── ┌────────┐
//!       └─── select(mobile money) ───────────────────▶ │ Upload │
//!                                                      └────────┘
//! ```
//!
//! `back` always clears the receipt and IBAN. The modal's submit control is
//! only enabled when the selected method's precondition holds; wallet
//! methods hand submission to the wallet button.

use crate::bank::validate_iban;
use crate::error::{PaymentError, PaymentResult};
use crate::method::{CompletionKind, PaymentMethodId, PaymentMethodInfo};
use serde::{Deserialize, Serialize};
use tracing::debug;

/// Largest receipt accepted for upload
pub const MAX_RECEIPT_BYTES: usize = 10 * 1024 * 1024;

const ACCEPTED_RECEIPT_TYPES: &[&str] = &[
    "image/png",
    "image/jpeg",
    "image/webp",
    "image/heic",
    "application/pdf",
];

/// Proof-of-payment file picked by the user. Held in memory only.
#[derive(Clone, PartialEq, Eq)]
pub struct ReceiptFile {
    pub file_name: String,
    pub content_type: String,
    pub bytes: Vec<u8>,
}

impl ReceiptFile {
    /// Create a receipt, rejecting empty, oversized or unsupported files
    pub fn new(
        file_name: impl Into<String>,
        content_type: impl Into<String>,
        bytes: Vec<u8>,
    ) -> PaymentResult<Self> {
        let file_name = file_name.into();
        let content_type = content_type.into().to_ascii_lowercase();

        if bytes.is_empty() {
            return Err(PaymentError::Validation(format!(
                "Receipt {} is empty",
                file_name
            )));
        }
        if bytes.len() > MAX_RECEIPT_BYTES {
            return Err(PaymentError::Validation(format!(
                "Receipt is larger than {} MB",
                MAX_RECEIPT_BYTES / (1024 * 1024)
            )));
        }
        if !ACCEPTED_RECEIPT_TYPES.contains(&content_type.as_str()) {
            return Err(PaymentError::Validation(format!(
                "Unsupported receipt type: {}",
                content_type
            )));
        }

        Ok(Self {
            file_name,
            content_type,
            bytes,
        })
    }

    pub fn len(&self) -> usize {
        self.bytes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }
}

impl std::fmt::Debug for ReceiptFile {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ReceiptFile")
            .field("file_name", &self.file_name)
            .field("content_type", &self.content_type)
            .field("len", &self.bytes.len())
            .finish()
    }
}

/// Step of the checkout modal
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CheckoutStep {
    #[default]
    Select,
    Details,
    Upload,
}

/// What the modal's submit control should look like
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SubmitControl {
    /// Nothing to submit yet (selection or bank details step)
    Hidden,
    Disabled,
    Enabled,
    /// The wallet button is the terminal action
    WalletButton,
}

/// State of one checkout modal
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CheckoutState {
    selected_method: Option<PaymentMethodId>,
    step: CheckoutStep,
    receipt: Option<ReceiptFile>,
    iban_number: Option<String>,
}

impl CheckoutState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn selected_method(&self) -> Option<PaymentMethodId> {
        self.selected_method
    }

    pub fn step(&self) -> CheckoutStep {
        self.step
    }

    pub fn receipt(&self) -> Option<&ReceiptFile> {
        self.receipt.as_ref()
    }

    pub fn iban_number(&self) -> Option<&str> {
        self.iban_number.as_deref()
    }

    /// Pick a method from the catalog.
    ///
    /// Unavailable methods are rejected and leave the state untouched.
    pub fn select(&mut self, method: &PaymentMethodInfo) -> PaymentResult<CheckoutStep> {
        if !method.is_selectable() {
            return Err(PaymentError::MethodUnavailable { method: method.id });
        }
        if self.step != CheckoutStep::Select {
            return Err(PaymentError::InvalidTransition(format!(
                "cannot select a method from the {:?} step",
                self.step
            )));
        }

        let next = match method.completion() {
            CompletionKind::Receipt {
                collects_iban: false,
            } => CheckoutStep::Upload,
            CompletionKind::Redirect
            | CompletionKind::Wallet
            | CompletionKind::Receipt {
                collects_iban: true,
            } => CheckoutStep::Details,
        };

        debug!("Selected payment method {} -> {:?}", method.id, next);
        self.selected_method = Some(method.id);
        self.step = next;
        Ok(next)
    }

    /// Record the sender's IBAN on the bank-transfer details step.
    ///
    /// Blank input clears it; the field is optional.
    pub fn set_iban(&mut self, raw: &str) -> PaymentResult<()> {
        self.require_bank_details_step("enter an IBAN")?;

        if raw.trim().is_empty() {
            self.iban_number = None;
            return Ok(());
        }
        self.iban_number = Some(validate_iban(raw)?);
        Ok(())
    }

    /// Move from the bank-transfer details step to the upload step
    pub fn proceed_to_upload(&mut self) -> PaymentResult<CheckoutStep> {
        self.require_bank_details_step("continue to upload")?;
        self.step = CheckoutStep::Upload;
        Ok(self.step)
    }

    /// Attach the proof-of-payment file
    pub fn attach_receipt(&mut self, receipt: ReceiptFile) -> PaymentResult<()> {
        if self.step != CheckoutStep::Upload {
            return Err(PaymentError::InvalidTransition(format!(
                "cannot attach a receipt on the {:?} step",
                self.step
            )));
        }
        debug!(
            "Attached receipt {} ({} bytes)",
            receipt.file_name,
            receipt.len()
        );
        self.receipt = Some(receipt);
        Ok(())
    }

    pub fn clear_receipt(&mut self) {
        self.receipt = None;
    }

    /// Return to method selection, dropping any receipt and IBAN
    pub fn back(&mut self) -> CheckoutStep {
        self.selected_method = None;
        self.receipt = None;
        self.iban_number = None;
        self.step = CheckoutStep::Select;
        self.step
    }

    /// Forget everything (modal closed)
    pub fn reset(&mut self) {
        *self = Self::default();
    }

    pub fn submit_control(&self) -> SubmitControl {
        let Some(method) = self.selected_method else {
            return SubmitControl::Hidden;
        };

        match (method.completion(), self.step) {
            (CompletionKind::Wallet, _) => SubmitControl::WalletButton,
            (CompletionKind::Redirect, CheckoutStep::Details) => SubmitControl::Enabled,
            (CompletionKind::Receipt { .. }, CheckoutStep::Upload) => {
                if self.receipt.as_ref().is_some_and(|r| !r.is_empty()) {
                    SubmitControl::Enabled
                } else {
                    SubmitControl::Disabled
                }
            }
            _ => SubmitControl::Hidden,
        }
    }

    /// The modal's own submit control may be pressed
    pub fn can_submit(&self) -> bool {
        self.submit_control() == SubmitControl::Enabled
    }

    fn require_bank_details_step(&self, action: &str) -> PaymentResult<()> {
        let on_bank_details = self.step == CheckoutStep::Details
            && self
                .selected_method
                .is_some_and(|m| m.completion() == CompletionKind::Receipt { collects_iban: true });
        if on_bank_details {
            Ok(())
        } else {
            Err(PaymentError::InvalidTransition(format!(
                "cannot {} outside the bank transfer details step",
                action
            )))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::{build_methods, CatalogConfig};
    use crate::BankDetails;

    fn method(id: PaymentMethodId) -> PaymentMethodInfo {
        let config = CatalogConfig::all_providers()
            .with_bank(BankDetails::new("GB82WEST12345698765432", "Acme Ltd"));
        build_methods(&config, Some("SN"))
            .into_iter()
            .find(|m| m.id == id)
            .unwrap()
    }

    fn receipt() -> ReceiptFile {
        ReceiptFile::new("receipt.pdf", "application/pdf", vec![1, 2, 3]).unwrap()
    }

    #[test]
    fn test_unavailable_method_is_noop() {
        let mut state = CheckoutState::new();
        let mut card = method(PaymentMethodId::Card);
        card.available = false;

        let err = state.select(&card).unwrap_err();
        assert!(matches!(err, PaymentError::MethodUnavailable { .. }));
        assert_eq!(state, CheckoutState::new());
    }

    #[test]
    fn test_needs_configuration_is_noop() {
        let mut state = CheckoutState::new();
        let mut paypal = method(PaymentMethodId::Paypal);
        paypal.needs_configuration = true;

        assert!(state.select(&paypal).is_err());
        assert_eq!(state.step(), CheckoutStep::Select);
        assert_eq!(state.selected_method(), None);
    }

    #[test]
    fn test_transition_targets() {
        let cases = [
            (PaymentMethodId::Card, CheckoutStep::Details),
            (PaymentMethodId::Paypal, CheckoutStep::Details),
            (PaymentMethodId::ApplePay, CheckoutStep::Details),
            (PaymentMethodId::BankTransfer, CheckoutStep::Details),
            (PaymentMethodId::Wave, CheckoutStep::Upload),
        ];
        for (id, expected) in cases {
            let mut state = CheckoutState::new();
            assert_eq!(state.select(&method(id)).unwrap(), expected, "{}", id);
        }
    }

    #[test]
    fn test_cannot_select_twice() {
        let mut state = CheckoutState::new();
        state.select(&method(PaymentMethodId::Card)).unwrap();
        assert!(state.select(&method(PaymentMethodId::Paypal)).is_err());
        assert_eq!(state.selected_method(), Some(PaymentMethodId::Card));
    }

    #[test]
    fn test_submit_control_per_method() {
        let mut state = CheckoutState::new();
        assert_eq!(state.submit_control(), SubmitControl::Hidden);

        state.select(&method(PaymentMethodId::Card)).unwrap();
        assert!(state.can_submit());

        state.back();
        state.select(&method(PaymentMethodId::GooglePay)).unwrap();
        assert_eq!(state.submit_control(), SubmitControl::WalletButton);
        assert!(!state.can_submit());

        state.back();
        state.select(&method(PaymentMethodId::OrangeMoney)).unwrap();
        assert_eq!(state.submit_control(), SubmitControl::Disabled);
        state.attach_receipt(receipt()).unwrap();
        assert!(state.can_submit());
        state.clear_receipt();
        assert!(!state.can_submit());
    }

    #[test]
    fn test_bank_transfer_flow() {
        let mut state = CheckoutState::new();
        state.select(&method(PaymentMethodId::BankTransfer)).unwrap();
        assert_eq!(state.submit_control(), SubmitControl::Hidden);

        assert!(state.attach_receipt(receipt()).is_err());
        state.set_iban("de89 3704 0044 0532 0130 00").unwrap();
        assert_eq!(state.iban_number(), Some("DE89370400440532013000"));

        assert!(state.set_iban("DE00 0000").is_err());
        assert_eq!(state.iban_number(), Some("DE89370400440532013000"));

        state.proceed_to_upload().unwrap();
        assert_eq!(state.step(), CheckoutStep::Upload);
        assert!(!state.can_submit());

        state.attach_receipt(receipt()).unwrap();
        assert!(state.can_submit());
    }

    #[test]
    fn test_iban_only_on_bank_details() {
        let mut state = CheckoutState::new();
        assert!(state.set_iban("GB82WEST12345698765432").is_err());

        state.select(&method(PaymentMethodId::Card)).unwrap();
        assert!(state.set_iban("GB82WEST12345698765432").is_err());
        assert!(state.proceed_to_upload().is_err());
    }

    #[test]
    fn test_back_clears_receipt_and_iban() {
        let mut state = CheckoutState::new();
        state.select(&method(PaymentMethodId::BankTransfer)).unwrap();
        state.set_iban("GB82WEST12345698765432").unwrap();
        state.proceed_to_upload().unwrap();
        state.attach_receipt(receipt()).unwrap();

        assert_eq!(state.back(), CheckoutStep::Select);
        assert!(state.receipt().is_none());
        assert!(state.iban_number().is_none());
        assert!(state.selected_method().is_none());

        state.select(&method(PaymentMethodId::Card)).unwrap();
        state.back();
        assert_eq!(state, CheckoutState::new());
    }

    #[test]
    fn test_receipt_validation() {
        assert!(ReceiptFile::new("a.png", "image/png", vec![]).is_err());
        assert!(ReceiptFile::new("a.exe", "application/x-msdownload", vec![1]).is_err());
        assert!(ReceiptFile::new("a.png", "image/png", vec![0; MAX_RECEIPT_BYTES + 1]).is_err());
        assert!(ReceiptFile::new("a.JPG", "IMAGE/JPEG", vec![1]).is_ok());
    }
}
