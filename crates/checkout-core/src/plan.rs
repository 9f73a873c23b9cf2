//! # Plans and Prices
//!
//! Subscription plans offered at checkout.
//! Plans are loaded from `config/plans.toml`.

use serde::{Deserialize, Serialize};

/// Supported currencies (ISO 4217)
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Currency {
    #[default]
    USD,
    EUR,
    GBP,
    CAD,
    CHF,
    /// West African CFA franc
    XOF,
    /// Central African CFA franc
    XAF,
    NGN,
    GHS,
    KES,
}

impl Currency {
    /// Returns the ISO 4217 currency code
    pub fn as_str(&self) -> &'static str {
        match self {
            Currency::USD => "usd",
            Currency::EUR => "eur",
            Currency::GBP => "gbp",
            Currency::CAD => "cad",
            Currency::CHF => "chf",
            Currency::XOF => "xof",
            Currency::XAF => "xaf",
            Currency::NGN => "ngn",
            Currency::GHS => "ghs",
            Currency::KES => "kes",
        }
    }

    /// Parse a currency code, case-insensitive
    pub fn parse(code: &str) -> Option<Self> {
        let currency = match code.trim().to_ascii_lowercase().as_str() {
            "usd" => Currency::USD,
            "eur" => Currency::EUR,
            "gbp" => Currency::GBP,
            "cad" => Currency::CAD,
            "chf" => Currency::CHF,
            "xof" => Currency::XOF,
            "xaf" => Currency::XAF,
            "ngn" => Currency::NGN,
            "ghs" => Currency::GHS,
            "kes" => Currency::KES,
            _ => return None,
        };
        Some(currency)
    }

    /// Returns the number of decimal places for this currency
    /// (the CFA francs have none)
    pub fn decimal_places(&self) -> u8 {
        match self {
            Currency::XOF | Currency::XAF => 0,
            _ => 2,
        }
    }

    /// Convert a decimal amount to the smallest currency unit
    pub fn to_smallest_unit(&self, amount: f64) -> i64 {
        let multiplier = 10_f64.powi(self.decimal_places() as i32);
        (amount * multiplier).round() as i64
    }

    /// Convert from smallest unit back to decimal
    pub fn from_smallest_unit(&self, amount: i64) -> f64 {
        let divisor = 10_f64.powi(self.decimal_places() as i32);
        amount as f64 / divisor
    }
}

impl std::fmt::Display for Currency {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str().to_uppercase())
    }
}

/// Price with amount in smallest currency unit
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Price {
    /// Amount in smallest currency unit (cents for USD)
    pub amount: i64,
    pub currency: Currency,
}

impl Price {
    /// Create a new price from decimal amount
    pub fn new(amount: f64, currency: Currency) -> Self {
        Self {
            amount: currency.to_smallest_unit(amount),
            currency,
        }
    }

    /// Create a price from smallest unit
    pub fn from_minor(amount: i64, currency: Currency) -> Self {
        Self { amount, currency }
    }

    /// Get the decimal amount
    pub fn as_decimal(&self) -> f64 {
        self.currency.from_smallest_unit(self.amount)
    }

    /// Format for display (e.g., "$10.00", "5000 XOF")
    pub fn display(&self) -> String {
        let symbol = match self.currency {
            Currency::USD => "$",
            Currency::EUR => "€",
            Currency::GBP => "£",
            Currency::CAD => "C$",
            Currency::CHF => "CHF ",
            _ => "",
        };
        match (symbol, self.currency.decimal_places()) {
            ("", 0) => format!("{} {}", self.amount, self.currency),
            ("", _) => format!("{:.2} {}", self.as_decimal(), self.currency),
            (s, 0) => format!("{}{}", s, self.amount),
            (s, _) => format!("{}{:.2}", s, self.as_decimal()),
        }
    }
}

/// Billing interval for a plan
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BillingInterval {
    #[default]
    Monthly,
    Quarterly,
    Yearly,
}

/// A subscription plan a user can buy
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Plan {
    /// Unique plan identifier (e.g., "pro-monthly")
    pub id: String,

    /// Display name, also used as the payment sheet label
    pub name: String,

    #[serde(default)]
    pub description: String,

    pub price: Price,

    #[serde(default)]
    pub billing_interval: BillingInterval,

    /// Whether this plan can be purchased
    #[serde(default = "default_true")]
    pub active: bool,
}

fn default_true() -> bool {
    true
}

impl Plan {
    /// Create a new plan
    pub fn new(
        id: impl Into<String>,
        name: impl Into<String>,
        price: Price,
        interval: BillingInterval,
    ) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            description: String::new(),
            price,
            billing_interval: interval,
            active: true,
        }
    }

    /// Builder: set description
    pub fn with_description(mut self, desc: impl Into<String>) -> Self {
        self.description = desc.into();
        self
    }
}

/// Plan catalog (loaded from config)
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PlanCatalog {
    #[serde(default)]
    pub plans: Vec<Plan>,
}

impl PlanCatalog {
    pub fn new() -> Self {
        Self { plans: Vec::new() }
    }

    pub fn add(&mut self, plan: Plan) {
        self.plans.push(plan);
    }

    /// Find an active plan by ID
    pub fn get(&self, id: &str) -> Option<&Plan> {
        self.plans.iter().find(|p| p.id == id && p.active)
    }

    pub fn active_plans(&self) -> impl Iterator<Item = &Plan> {
        self.plans.iter().filter(|p| p.active)
    }

    /// Load catalog from TOML string
    pub fn from_toml(toml_str: &str) -> Result<Self, toml::de::Error> {
        toml::from_str(toml_str)
    }
}
