//! # Payment Methods
//!
//! Identifiers and descriptors for the payment methods shown at checkout.

use serde::{Deserialize, Serialize};

/// Every payment method the checkout knows about
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PaymentMethodId {
    Card,
    Paypal,
    ApplePay,
    GooglePay,
    SamsungPay,
    BankTransfer,
    OrangeMoney,
    MtnMomo,
    Wave,
    MoovMoney,
}

/// How a method reaches a confirmed payment
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case", tag = "kind")]
pub enum CompletionKind {
    /// Full-page redirect to a provider-hosted page
    Redirect,
    /// Device payment sheet driven by the wallet button
    Wallet,
    /// Offline payment proven by an uploaded receipt
    Receipt { collects_iban: bool },
}

impl PaymentMethodId {
    pub const ALL: [PaymentMethodId; 10] = [
        PaymentMethodId::Card,
        PaymentMethodId::Paypal,
        PaymentMethodId::ApplePay,
        PaymentMethodId::GooglePay,
        PaymentMethodId::SamsungPay,
        PaymentMethodId::BankTransfer,
        PaymentMethodId::OrangeMoney,
        PaymentMethodId::MtnMomo,
        PaymentMethodId::Wave,
        PaymentMethodId::MoovMoney,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            PaymentMethodId::Card => "card",
            PaymentMethodId::Paypal => "paypal",
            PaymentMethodId::ApplePay => "apple_pay",
            PaymentMethodId::GooglePay => "google_pay",
            PaymentMethodId::SamsungPay => "samsung_pay",
            PaymentMethodId::BankTransfer => "bank_transfer",
            PaymentMethodId::OrangeMoney => "orange_money",
            PaymentMethodId::MtnMomo => "mtn_momo",
            PaymentMethodId::Wave => "wave",
            PaymentMethodId::MoovMoney => "moov_money",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|m| m.as_str() == value)
    }

    pub fn completion(&self) -> CompletionKind {
        match self {
            PaymentMethodId::Card | PaymentMethodId::Paypal => CompletionKind::Redirect,
            PaymentMethodId::ApplePay | PaymentMethodId::GooglePay | PaymentMethodId::SamsungPay => {
                CompletionKind::Wallet
            }
            PaymentMethodId::BankTransfer => CompletionKind::Receipt {
                collects_iban: true,
            },
            PaymentMethodId::OrangeMoney
            | PaymentMethodId::MtnMomo
            | PaymentMethodId::Wave
            | PaymentMethodId::MoovMoney => CompletionKind::Receipt {
                collects_iban: false,
            },
        }
    }

    pub fn requires_receipt(&self) -> bool {
        matches!(self.completion(), CompletionKind::Receipt { .. })
    }

    pub fn is_wallet(&self) -> bool {
        matches!(self.completion(), CompletionKind::Wallet)
    }

    /// Name of the backend integration this method goes through
    pub fn provider(&self) -> &'static str {
        match self.completion() {
            CompletionKind::Redirect if *self == PaymentMethodId::Paypal => "paypal",
            CompletionKind::Redirect | CompletionKind::Wallet => "stripe",
            CompletionKind::Receipt { .. } => "manual",
        }
    }
}

impl std::fmt::Display for PaymentMethodId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A payment method as presented to one user
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PaymentMethodInfo {
    pub id: PaymentMethodId,
    pub name: String,
    pub description: String,
    /// Icon asset name for the UI
    pub icon: String,
    /// Can be selected right now
    pub available: bool,
    /// Provider integration lacks credentials
    pub needs_configuration: bool,
    pub requires_receipt: bool,
    /// Countries the method is limited to; empty means global
    #[serde(default)]
    pub country_specific: Vec<String>,
}

impl PaymentMethodInfo {
    /// A method that can be picked in the selector
    pub fn is_selectable(&self) -> bool {
        self.available && !self.needs_configuration
    }

    pub fn completion(&self) -> CompletionKind {
        self.id.completion()
    }
}
