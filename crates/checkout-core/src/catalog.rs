//! # Method Catalog
//!
//! Builds the list of payment methods offered to a user from static
//! definitions, provider configuration and the user's country.
//!
//! - Global methods (card, PayPal, wallets, bank transfer) are always listed.
//!   If their provider has no credentials they are listed with
//!   `needs_configuration = true` and `available = false`.
//! - Country-specific methods (mobile money) are listed only when the
//!   user's country is one of theirs.
//! - Methods switched off by operators are listed with `available = false`.
//!
//! Results are cached per normalized country so repeated renders get the
//! same list in the same order.

use crate::bank::BankDetails;
use crate::method::{PaymentMethodId, PaymentMethodInfo};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeSet, HashMap};
use std::sync::{Arc, RwLock};
use tracing::debug;

/// Static description of one method
struct MethodDefinition {
    id: PaymentMethodId,
    name: &'static str,
    description: &'static str,
    icon: &'static str,
    /// Empty slice means the method is global
    countries: &'static [&'static str],
}

const DEFINITIONS: &[MethodDefinition] = &[
    MethodDefinition {
        id: PaymentMethodId::Card,
        name: "Credit or debit card",
        description: "Visa, Mastercard and American Express via secure checkout",
        icon: "credit-card",
        countries: &[],
    },
    MethodDefinition {
        id: PaymentMethodId::Paypal,
        name: "PayPal",
        description: "Pay with your PayPal account",
        icon: "paypal",
        countries: &[],
    },
    MethodDefinition {
        id: PaymentMethodId::ApplePay,
        name: "Apple Pay",
        description: "Pay with Touch ID or Face ID",
        icon: "apple-pay",
        countries: &[],
    },
    MethodDefinition {
        id: PaymentMethodId::GooglePay,
        name: "Google Pay",
        description: "Pay with your Google account",
        icon: "google-pay",
        countries: &[],
    },
    MethodDefinition {
        id: PaymentMethodId::SamsungPay,
        name: "Samsung Pay",
        description: "Pay with your Samsung device",
        icon: "samsung-pay",
        countries: &[],
    },
    MethodDefinition {
        id: PaymentMethodId::BankTransfer,
        name: "Bank transfer",
        description: "Transfer to our IBAN and upload the receipt",
        icon: "bank",
        countries: &[],
    },
    MethodDefinition {
        id: PaymentMethodId::OrangeMoney,
        name: "Orange Money",
        description: "Send with Orange Money and upload the confirmation",
        icon: "orange-money",
        countries: &["CI", "SN", "ML", "BF", "CM", "GN", "NE", "MG", "CD"],
    },
    MethodDefinition {
        id: PaymentMethodId::MtnMomo,
        name: "MTN Mobile Money",
        description: "Send with MTN MoMo and upload the confirmation",
        icon: "mtn-momo",
        countries: &["CI", "CM", "GH", "UG", "RW", "BJ", "CG", "ZM"],
    },
    MethodDefinition {
        id: PaymentMethodId::Wave,
        name: "Wave",
        description: "Send with Wave and upload the confirmation",
        icon: "wave",
        countries: &["SN", "CI", "ML", "BF", "UG", "GM"],
    },
    MethodDefinition {
        id: PaymentMethodId::MoovMoney,
        name: "Moov Money",
        description: "Send with Moov Money and upload the confirmation",
        icon: "moov-money",
        countries: &["CI", "BJ", "TG", "BF", "NE", "ML"],
    },
];

/// Provider configuration the catalog depends on
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CatalogConfig {
    /// Card checkout and wallets have a publishable key
    #[serde(default)]
    pub stripe_configured: bool,
    #[serde(default)]
    pub paypal_configured: bool,
    /// Destination account for bank transfers
    #[serde(default)]
    pub bank: Option<BankDetails>,
    /// Methods temporarily switched off
    #[serde(default)]
    pub disabled: BTreeSet<PaymentMethodId>,
}

impl CatalogConfig {
    /// Config with every provider configured and no bank account
    pub fn all_providers() -> Self {
        Self {
            stripe_configured: true,
            paypal_configured: true,
            bank: None,
            disabled: BTreeSet::new(),
        }
    }

    pub fn with_bank(mut self, bank: BankDetails) -> Self {
        self.bank = Some(bank);
        self
    }

    pub fn with_disabled(mut self, method: PaymentMethodId) -> Self {
        self.disabled.insert(method);
        self
    }

    fn needs_configuration(&self, id: PaymentMethodId) -> bool {
        match id {
            PaymentMethodId::Card
            | PaymentMethodId::ApplePay
            | PaymentMethodId::GooglePay
            | PaymentMethodId::SamsungPay => !self.stripe_configured,
            PaymentMethodId::Paypal => !self.paypal_configured,
            PaymentMethodId::BankTransfer => self.bank.is_none(),
            PaymentMethodId::OrangeMoney
            | PaymentMethodId::MtnMomo
            | PaymentMethodId::Wave
            | PaymentMethodId::MoovMoney => false,
        }
    }
}

/// Normalize a country code to upper-case ISO 3166 alpha-2.
///
/// Anything that is not two ASCII letters counts as no country.
pub fn normalize_country(code: Option<&str>) -> Option<String> {
    let code = code?.trim();
    if code.len() == 2 && code.bytes().all(|b| b.is_ascii_alphabetic()) {
        Some(code.to_ascii_uppercase())
    } else {
        None
    }
}

/// Payment method catalog with a per-country cache
#[derive(Debug)]
pub struct MethodCatalog {
    config: CatalogConfig,
    cache: RwLock<HashMap<Option<String>, Arc<[PaymentMethodInfo]>>>,
}

impl MethodCatalog {
    pub fn new(config: CatalogConfig) -> Self {
        Self {
            config,
            cache: RwLock::new(HashMap::new()),
        }
    }

    pub fn config(&self) -> &CatalogConfig {
        &self.config
    }

    /// Methods offered to a user from `country`.
    pub fn available_methods(&self, country: Option<&str>) -> Arc<[PaymentMethodInfo]> {
        let country = normalize_country(country);

        if let Ok(cache) = self.cache.read() {
            if let Some(methods) = cache.get(&country) {
                return Arc::clone(methods);
            }
        }

        let methods: Arc<[PaymentMethodInfo]> =
            build_methods(&self.config, country.as_deref()).into();
        debug!(
            "Built payment method catalog: country={:?}, methods={}",
            country,
            methods.len()
        );

        if let Ok(mut cache) = self.cache.write() {
            // Another caller may have filled the slot first; keep theirs
            return Arc::clone(cache.entry(country).or_insert(methods));
        }
        methods
    }

    /// Look up one method for a user
    pub fn find(&self, country: Option<&str>, id: PaymentMethodId) -> Option<PaymentMethodInfo> {
        self.available_methods(country)
            .iter()
            .find(|m| m.id == id)
            .cloned()
    }
}

/// Uncached catalog computation
pub fn build_methods(config: &CatalogConfig, country: Option<&str>) -> Vec<PaymentMethodInfo> {
    DEFINITIONS
        .iter()
        .filter(|def| {
            def.countries.is_empty()
                || country.is_some_and(|c| def.countries.iter().any(|dc| *dc == c))
        })
        .map(|def| {
            let needs_configuration = config.needs_configuration(def.id);
            PaymentMethodInfo {
                id: def.id,
                name: def.name.to_string(),
                description: def.description.to_string(),
                icon: def.icon.to_string(),
                available: !needs_configuration && !config.disabled.contains(&def.id),
                needs_configuration,
                requires_receipt: def.id.requires_receipt(),
                country_specific: def.countries.iter().map(|c| c.to_string()).collect(),
            }
        })
        .collect()
}

/// Free-function form of [`MethodCatalog::available_methods`] without caching
pub fn get_available_payment_methods(
    config: &CatalogConfig,
    country: Option<&str>,
) -> Vec<PaymentMethodInfo> {
    build_methods(config, normalize_country(country).as_deref())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn full_config() -> CatalogConfig {
        CatalogConfig::all_providers()
            .with_bank(BankDetails::new("GB82WEST12345698765432", "Acme Ltd"))
    }

    fn ids(methods: &[PaymentMethodInfo]) -> Vec<PaymentMethodId> {
        methods.iter().map(|m| m.id).collect()
    }

    #[test]
    fn test_global_methods_without_country() {
        let methods = get_available_payment_methods(&full_config(), None);
        assert_eq!(
            ids(&methods),
            vec![
                PaymentMethodId::Card,
                PaymentMethodId::Paypal,
                PaymentMethodId::ApplePay,
                PaymentMethodId::GooglePay,
                PaymentMethodId::SamsungPay,
                PaymentMethodId::BankTransfer,
            ]
        );
        assert!(methods.iter().all(|m| m.available));
    }

    #[test]
    fn test_country_specific_methods() {
        let senegal = get_available_payment_methods(&full_config(), Some("sn"));
        let senegal_ids = ids(&senegal);
        assert!(senegal_ids.contains(&PaymentMethodId::OrangeMoney));
        assert!(senegal_ids.contains(&PaymentMethodId::Wave));
        assert!(!senegal_ids.contains(&PaymentMethodId::MtnMomo));

        let france = get_available_payment_methods(&full_config(), Some("FR"));
        assert!(france.iter().all(|m| m.country_specific.is_empty()));
    }

    #[test]
    fn test_unconfigured_providers_need_configuration() {
        let methods = get_available_payment_methods(&CatalogConfig::default(), Some("CI"));

        let card = methods.iter().find(|m| m.id == PaymentMethodId::Card).unwrap();
        assert!(card.needs_configuration);
        assert!(!card.available);

        let bank = methods
            .iter()
            .find(|m| m.id == PaymentMethodId::BankTransfer)
            .unwrap();
        assert!(bank.needs_configuration);

        let orange = methods
            .iter()
            .find(|m| m.id == PaymentMethodId::OrangeMoney)
            .unwrap();
        assert!(orange.available);
        assert!(orange.requires_receipt);
    }

    #[test]
    fn test_never_available_and_needs_configuration() {
        let configs = [
            CatalogConfig::default(),
            full_config(),
            CatalogConfig::all_providers().with_disabled(PaymentMethodId::Card),
        ];
        for config in &configs {
            for country in [None, Some("CI"), Some("SN"), Some("GH"), Some("xx"), Some("bad")] {
                for method in get_available_payment_methods(config, country) {
                    assert!(!(method.available && method.needs_configuration));
                }
            }
        }
    }

    #[test]
    fn test_disabled_method_is_listed_unavailable() {
        let config = full_config().with_disabled(PaymentMethodId::Paypal);
        let paypal = get_available_payment_methods(&config, None)
            .into_iter()
            .find(|m| m.id == PaymentMethodId::Paypal)
            .unwrap();
        assert!(!paypal.available);
        assert!(!paypal.needs_configuration);
    }

    #[test]
    fn test_catalog_is_memoized() {
        let catalog = MethodCatalog::new(full_config());
        let first = catalog.available_methods(Some("ci"));
        let second = catalog.available_methods(Some(" CI "));
        assert!(Arc::ptr_eq(&first, &second));
        assert_eq!(&*first, &*catalog.available_methods(Some("CI")));
    }

    #[test]
    fn test_normalize_country() {
        assert_eq!(normalize_country(Some(" sn ")), Some("SN".to_string()));
        assert_eq!(normalize_country(Some("SEN")), None);
        assert_eq!(normalize_country(Some("1A")), None);
        assert_eq!(normalize_country(None), None);
    }
}
