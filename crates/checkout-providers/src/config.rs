//! # Provider Configuration
//!
//! Configuration for the payment backend and the provider integrations.
//! Values come from environment variables (a `.env` file is honored).

use checkout_core::{validate_iban, BankDetails, CatalogConfig, PaymentError, PaymentMethodId};
use std::collections::BTreeSet;
use std::time::Duration;

const DEFAULT_API_BASE_URL: &str = "http://localhost:3000/api";
const DEFAULT_APP_BASE_URL: &str = "http://localhost:3000";
const DEFAULT_TIMEOUT_SECS: u64 = 30;

/// URLs providers send the customer back to
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReturnUrls {
    /// Base URL of the web app (e.g., "https://app.example.com")
    pub base_url: String,
    pub success_path: String,
    pub cancel_path: String,
}

impl ReturnUrls {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into().trim_end_matches('/').to_string(),
            success_path: "/dashboard?payment=success".to_string(),
            cancel_path: "/dashboard?payment=cancelled".to_string(),
        }
    }

    pub fn success_url(&self) -> String {
        format!("{}{}", self.base_url, self.success_path)
    }

    pub fn cancel_url(&self) -> String {
        format!("{}{}", self.base_url, self.cancel_path)
    }
}

impl Default for ReturnUrls {
    fn default() -> Self {
        Self::new(DEFAULT_APP_BASE_URL)
    }
}

/// Backend and provider configuration
#[derive(Debug, Clone)]
pub struct ProviderConfig {
    /// Base URL of the JSON payment endpoints
    pub api_base_url: String,

    /// Where customers land after redirect-based payments
    pub return_urls: ReturnUrls,

    /// Publishable key (pk_test_... or pk_live_...), enables card and wallets
    pub stripe_publishable_key: Option<String>,

    /// Enables PayPal
    pub paypal_client_id: Option<String>,

    /// Destination account for bank transfers
    pub bank: Option<BankDetails>,

    /// Methods switched off by operators
    pub disabled_methods: BTreeSet<PaymentMethodId>,

    pub request_timeout: Duration,
}

impl ProviderConfig {
    /// Load configuration from environment variables.
    ///
    /// Recognized env vars:
    /// - `CHECKOUT_API_BASE_URL`, `APP_BASE_URL`
    /// - `STRIPE_PUBLISHABLE_KEY`
    /// - `PAYPAL_CLIENT_ID`
    /// - `BANK_IBAN`, `BANK_ACCOUNT_HOLDER`, `BANK_BIC`
    /// - `DISABLED_PAYMENT_METHODS` (comma separated method ids)
    /// - `CHECKOUT_TIMEOUT_SECS`
    pub fn from_env() -> Result<Self, PaymentError> {
        dotenvy::dotenv().ok(); // Load .env file if present
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build from any key lookup (used by `from_env` and tests)
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, PaymentError> {
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        let stripe_publishable_key = get("STRIPE_PUBLISHABLE_KEY");
        if let Some(ref key) = stripe_publishable_key {
            if !key.starts_with("pk_test_") && !key.starts_with("pk_live_") {
                return Err(PaymentError::Configuration(
                    "STRIPE_PUBLISHABLE_KEY must start with pk_test_ or pk_live_".to_string(),
                ));
            }
        }

        let bank = match (get("BANK_IBAN"), get("BANK_ACCOUNT_HOLDER")) {
            (Some(iban), Some(holder)) => {
                let iban = validate_iban(&iban).map_err(|e| {
                    PaymentError::Configuration(format!("BANK_IBAN is invalid: {}", e))
                })?;
                let details = BankDetails::new(iban, holder);
                Some(match get("BANK_BIC") {
                    Some(bic) => details.with_bic(bic),
                    None => details,
                })
            }
            (None, None) => None,
            _ => {
                return Err(PaymentError::Configuration(
                    "BANK_IBAN and BANK_ACCOUNT_HOLDER must be set together".to_string(),
                ))
            }
        };

        let disabled_methods = match get("DISABLED_PAYMENT_METHODS") {
            Some(list) => parse_method_list(&list)?,
            None => BTreeSet::new(),
        };

        let request_timeout = match get("CHECKOUT_TIMEOUT_SECS") {
            Some(secs) => match secs.trim().parse::<u64>() {
                Ok(0) => {
                    return Err(PaymentError::Configuration(
                        "CHECKOUT_TIMEOUT_SECS must be at least 1".to_string(),
                    ))
                }
                Ok(n) => Duration::from_secs(n),
                Err(_) => {
                    return Err(PaymentError::Configuration(format!(
                        "CHECKOUT_TIMEOUT_SECS is not a number: {}",
                        secs
                    )))
                }
            },
            None => Duration::from_secs(DEFAULT_TIMEOUT_SECS),
        };

        Ok(Self {
            api_base_url: get("CHECKOUT_API_BASE_URL")
                .unwrap_or_else(|| DEFAULT_API_BASE_URL.to_string()),
            return_urls: ReturnUrls::new(
                get("APP_BASE_URL").unwrap_or_else(|| DEFAULT_APP_BASE_URL.to_string()),
            ),
            stripe_publishable_key,
            paypal_client_id: get("PAYPAL_CLIENT_ID"),
            bank,
            disabled_methods,
            request_timeout,
        })
    }

    /// Config pointing at `api_base_url` with no provider credentials
    pub fn new(api_base_url: impl Into<String>) -> Self {
        Self {
            api_base_url: api_base_url.into(),
            return_urls: ReturnUrls::default(),
            stripe_publishable_key: None,
            paypal_client_id: None,
            bank: None,
            disabled_methods: BTreeSet::new(),
            request_timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
        }
    }

    /// Builder: set the publishable key
    pub fn with_stripe_key(mut self, key: impl Into<String>) -> Self {
        self.stripe_publishable_key = Some(key.into());
        self
    }

    pub fn with_paypal_client_id(mut self, client_id: impl Into<String>) -> Self {
        self.paypal_client_id = Some(client_id.into());
        self
    }

    pub fn with_bank(mut self, bank: BankDetails) -> Self {
        self.bank = Some(bank);
        self
    }

    pub fn with_return_urls(mut self, urls: ReturnUrls) -> Self {
        self.return_urls = urls;
        self
    }

    /// Check if using a test publishable key
    pub fn is_test_mode(&self) -> bool {
        self.stripe_publishable_key
            .as_deref()
            .is_some_and(|k| k.starts_with("pk_test_"))
    }

    /// Catalog flags derived from which providers have credentials
    pub fn catalog_config(&self) -> CatalogConfig {
        CatalogConfig {
            stripe_configured: self.stripe_publishable_key.is_some(),
            paypal_configured: self.paypal_client_id.is_some(),
            bank: self.bank.clone(),
            disabled: self.disabled_methods.clone(),
        }
    }
}

fn parse_method_list(list: &str) -> Result<BTreeSet<PaymentMethodId>, PaymentError> {
    list.split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(|s| {
            PaymentMethodId::parse(s).ok_or_else(|| {
                PaymentError::Configuration(format!("Unknown payment method in DISABLED_PAYMENT_METHODS: {}", s))
            })
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup(vars: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key: &str| map.get(key).cloned()
    }

    #[test]
    fn test_defaults() {
        let config = ProviderConfig::from_lookup(lookup(&[])).unwrap();
        assert_eq!(config.api_base_url, DEFAULT_API_BASE_URL);
        assert!(config.stripe_publishable_key.is_none());

        let catalog = config.catalog_config();
        assert!(!catalog.stripe_configured);
        assert!(!catalog.paypal_configured);
        assert!(catalog.bank.is_none());
    }

    #[test]
    fn test_full_config() {
        let config = ProviderConfig::from_lookup(lookup(&[
            ("CHECKOUT_API_BASE_URL", "https://app.example.com/api"),
            ("STRIPE_PUBLISHABLE_KEY", "pk_test_abc"),
            ("PAYPAL_CLIENT_ID", "AcmeClient"),
            ("BANK_IBAN", "gb82 west 1234 5698 7654 32"),
            ("BANK_ACCOUNT_HOLDER", "Acme Ltd"),
            ("BANK_BIC", "WESTGB2L"),
            ("DISABLED_PAYMENT_METHODS", "samsung_pay, wave"),
        ]))
        .unwrap();

        assert!(config.is_test_mode());
        let catalog = config.catalog_config();
        assert!(catalog.stripe_configured);
        assert!(catalog.paypal_configured);
        assert_eq!(catalog.bank.unwrap().iban, "GB82WEST12345698765432");
        assert!(catalog.disabled.contains(&PaymentMethodId::SamsungPay));
        assert!(catalog.disabled.contains(&PaymentMethodId::Wave));
    }

    #[test]
    fn test_invalid_values() {
        assert!(ProviderConfig::from_lookup(lookup(&[("STRIPE_PUBLISHABLE_KEY", "sk_live_oops")])).is_err());
        assert!(ProviderConfig::from_lookup(lookup(&[("BANK_IBAN", "GB82WEST12345698765432")])).is_err());
        assert!(ProviderConfig::from_lookup(lookup(&[("DISABLED_PAYMENT_METHODS", "bitcoin")])).is_err());
        assert!(ProviderConfig::from_lookup(lookup(&[("CHECKOUT_TIMEOUT_SECS", "soon")])).is_err());
        assert!(matches!(
            ProviderConfig::from_lookup(lookup(&[("CHECKOUT_TIMEOUT_SECS", "0")])),
            Err(PaymentError::Configuration(_))
        ));
        let config = ProviderConfig::from_lookup(lookup(&[("CHECKOUT_TIMEOUT_SECS", "5")])).unwrap();
        assert_eq!(config.request_timeout, Duration::from_secs(5));
    }

    #[test]
    fn test_return_urls() {
        let urls = ReturnUrls::new("https://app.example.com/");
        assert_eq!(urls.success_url(), "https://app.example.com/dashboard?payment=success");
        assert_eq!(urls.cancel_url(), "https://app.example.com/dashboard?payment=cancelled");
    }
}
