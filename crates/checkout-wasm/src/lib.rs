//! # checkout-wasm
//!
//! WebAssembly bindings for checkout-rs.
//!
//! The browser drives the same catalog and state machine as the server:
//! - `available_payment_methods` filters the method catalog for a country
//! - `WasmCheckoutFlow` runs the `select → details → upload` flow
//! - `WasmSettings` holds language and remember-me preferences
//!
//! ## Usage (JavaScript)
//!
//! ```javascript
//! import init, { available_payment_methods, WasmCheckoutFlow } from 'checkout-wasm';
//!
//! await init();
//!
//! const methods = available_payment_methods('SN', { stripeConfigured: true });
//! const flow = new WasmCheckoutFlow(methods);
//!
//! flow.select('bank_transfer');      // "details"
//! flow.set_iban('FR14 2004 1010 0505 0001 3M02 606');
//! flow.proceed_to_upload();          // "upload"
//! flow.attach_receipt(file.name, file.type, new Uint8Array(await file.arrayBuffer()));
//! flow.submit_control();             // "enabled"
//! ```
//!
//! ## Building
//!
//! ```bash
//! wasm-pack build --target web
//! ```

use checkout_core::settings::{decode_preferences, encode_preferences};
use checkout_core::{
    get_available_payment_methods, validate_iban, CatalogConfig, CheckoutState, CheckoutStep,
    Language, MemorySettingsStore, PaymentError, PaymentMethodId, PaymentMethodInfo,
    PaymentResult, Preferences, ReceiptFile, SettingsStore, SubmitControl,
};
use serde::Serialize;
use wasm_bindgen::prelude::*;

fn to_js_error(err: PaymentError) -> JsValue {
    js_sys::Error::new(&err.user_message()).into()
}

fn to_js<T: Serialize>(value: &T) -> Result<JsValue, JsValue> {
    serde_wasm_bindgen::to_value(value)
        .map_err(|e| to_js_error(PaymentError::Serialization(e.to_string())))
}

fn step_name(step: CheckoutStep) -> &'static str {
    match step {
        CheckoutStep::Select => "select",
        CheckoutStep::Details => "details",
        CheckoutStep::Upload => "upload",
    }
}

fn control_name(control: SubmitControl) -> &'static str {
    match control {
        SubmitControl::Hidden => "hidden",
        SubmitControl::Disabled => "disabled",
        SubmitControl::Enabled => "enabled",
        SubmitControl::WalletButton => "wallet_button",
    }
}

// =============================================================================
// Method Catalog
// =============================================================================

/// Payment methods for `country`.
///
/// `config` is a `CatalogConfig` object (`stripeConfigured`,
/// `paypalConfigured`, `bank`, `disabled`); `undefined` means nothing is
/// configured.
#[wasm_bindgen]
pub fn available_payment_methods(country: Option<String>, config: JsValue) -> Result<JsValue, JsValue> {
    let config: CatalogConfig = if config.is_undefined() || config.is_null() {
        CatalogConfig::default()
    } else {
        serde_wasm_bindgen::from_value(config)
            .map_err(|e| to_js_error(PaymentError::Configuration(format!("Invalid catalog config: {}", e))))?
    };

    to_js(&get_available_payment_methods(&config, country.as_deref()))
}

/// Normalize and check an IBAN, returning the compact form
#[wasm_bindgen]
pub fn check_iban(raw: &str) -> Result<String, JsValue> {
    validate_iban(raw).map_err(to_js_error)
}

// =============================================================================
// Checkout Flow
// =============================================================================

/// Snapshot of the flow handed to the UI
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FlowSnapshot {
    pub step: CheckoutStep,
    pub selected_method: Option<PaymentMethodId>,
    pub iban: Option<String>,
    pub receipt_name: Option<String>,
    pub submit_control: SubmitControl,
}

/// Checkout modal state machine for the browser
#[wasm_bindgen]
pub struct WasmCheckoutFlow {
    methods: Vec<PaymentMethodInfo>,
    state: CheckoutState,
}

impl WasmCheckoutFlow {
    /// Flow over an already-deserialized catalog
    pub fn with_methods(methods: Vec<PaymentMethodInfo>) -> Self {
        Self {
            methods,
            state: CheckoutState::new(),
        }
    }

    fn select_id(&mut self, id: &str) -> PaymentResult<CheckoutStep> {
        let method = PaymentMethodId::parse(id)
            .and_then(|id| self.methods.iter().find(|m| m.id == id))
            .ok_or_else(|| PaymentError::Validation(format!("Unknown payment method: {}", id)))?;
        self.state.select(method)
    }

    fn attach(&mut self, file_name: &str, content_type: &str, bytes: Vec<u8>) -> PaymentResult<()> {
        self.state
            .attach_receipt(ReceiptFile::new(file_name, content_type, bytes)?)
    }

    pub fn snapshot(&self) -> FlowSnapshot {
        FlowSnapshot {
            step: self.state.step(),
            selected_method: self.state.selected_method(),
            iban: self.state.iban_number().map(str::to_string),
            receipt_name: self.state.receipt().map(|r| r.file_name.clone()),
            submit_control: self.state.submit_control(),
        }
    }
}

#[wasm_bindgen]
impl WasmCheckoutFlow {
    /// Create a flow from the catalog returned by `available_payment_methods`
    #[wasm_bindgen(constructor)]
    pub fn new(methods: JsValue) -> Result<WasmCheckoutFlow, JsValue> {
        let methods: Vec<PaymentMethodInfo> = serde_wasm_bindgen::from_value(methods)
            .map_err(|e| to_js_error(PaymentError::Validation(format!("Invalid payment methods: {}", e))))?;
        Ok(Self::with_methods(methods))
    }

    /// Select a method by id; returns the next step
    pub fn select(&mut self, id: &str) -> Result<String, JsValue> {
        self.select_id(id)
            .map(|step| step_name(step).to_string())
            .map_err(to_js_error)
    }

    /// Back to method selection; clears receipt and IBAN
    pub fn back(&mut self) -> String {
        step_name(self.state.back()).to_string()
    }

    pub fn set_iban(&mut self, raw: &str) -> Result<(), JsValue> {
        self.state.set_iban(raw).map_err(to_js_error)
    }

    pub fn proceed_to_upload(&mut self) -> Result<String, JsValue> {
        self.state
            .proceed_to_upload()
            .map(|step| step_name(step).to_string())
            .map_err(to_js_error)
    }

    pub fn attach_receipt(
        &mut self,
        file_name: &str,
        content_type: &str,
        bytes: Vec<u8>,
    ) -> Result<(), JsValue> {
        self.attach(file_name, content_type, bytes).map_err(to_js_error)
    }

    pub fn clear_receipt(&mut self) {
        self.state.clear_receipt();
    }

    pub fn submit_control(&self) -> String {
        control_name(self.state.submit_control()).to_string()
    }

    pub fn can_submit(&self) -> bool {
        self.state.can_submit()
    }

    /// Modal closed
    pub fn reset(&mut self) {
        self.state.reset();
    }

    /// Current state as a plain object
    pub fn state(&self) -> Result<JsValue, JsValue> {
        to_js(&self.snapshot())
    }
}

// =============================================================================
// Preferences
// =============================================================================

/// Language and remember-me preferences for the session
#[wasm_bindgen]
pub struct WasmSettings {
    store: MemorySettingsStore,
}

impl WasmSettings {
    fn update(&self, change: impl FnOnce(&mut Preferences)) -> PaymentResult<()> {
        let mut preferences = self.store.load()?;
        change(&mut preferences);
        self.store.save(&preferences)
    }
}

#[wasm_bindgen]
impl WasmSettings {
    /// Restore from a string previously produced by `to_storage`
    #[wasm_bindgen(constructor)]
    pub fn new(stored: Option<String>) -> Result<WasmSettings, JsValue> {
        let store = MemorySettingsStore::new();
        store
            .save(&decode_preferences(stored.as_deref()))
            .map_err(to_js_error)?;
        Ok(Self { store })
    }

    pub fn language(&self) -> Result<String, JsValue> {
        self.store
            .load()
            .map(|p| p.language.code().to_string())
            .map_err(to_js_error)
    }

    /// Set the language from a BCP 47 tag (`fr-FR` → `fr`)
    pub fn set_language(&self, tag: &str) -> Result<(), JsValue> {
        let language = Language::from_tag(tag).ok_or_else(|| {
            to_js_error(PaymentError::Validation(format!("Unsupported language: {}", tag)))
        })?;
        self.update(|p| p.language = language).map_err(to_js_error)
    }

    pub fn is_rtl(&self) -> Result<bool, JsValue> {
        self.store
            .load()
            .map(|p| p.language.is_rtl())
            .map_err(to_js_error)
    }

    pub fn remember_me(&self) -> Result<bool, JsValue> {
        self.store.load().map(|p| p.remember_me).map_err(to_js_error)
    }

    pub fn set_remember_me(&self, remember: bool) -> Result<(), JsValue> {
        self.update(|p| p.remember_me = remember).map_err(to_js_error)
    }

    /// Serialized preferences for web storage
    pub fn to_storage(&self) -> Result<String, JsValue> {
        self.store
            .load()
            .and_then(|p| encode_preferences(&p))
            .map_err(to_js_error)
    }
}

/// Log to browser console
#[wasm_bindgen]
pub fn log(message: &str) {
    web_sys::console::log_1(&JsValue::from_str(message));
}

/// Get library version
#[wasm_bindgen]
pub fn version() -> String {
    env!("CARGO_PKG_VERSION").to_string()
}


#[cfg(all(test, target_arch = "wasm32"))]
mod wasm_tests {
    use super::*;
    use wasm_bindgen_test::*;

    #[wasm_bindgen_test]
    fn test_catalog_from_js_config() {
        let config = js_sys::JSON::parse(r#"{"stripeConfigured":true}"#).unwrap();
        let methods = available_payment_methods(Some("SN".to_string()), config).unwrap();
        let mut flow = WasmCheckoutFlow::new(methods).unwrap();

        assert_eq!(flow.select("card").unwrap(), "details");
        assert!(flow.select("paypal").is_err());
    }

    #[wasm_bindgen_test]
    fn test_settings() {
        let settings = WasmSettings::new(None).unwrap();
        assert_eq!(settings.language().unwrap(), "en");
        settings.set_language("ar-EG").unwrap();
        assert!(settings.is_rtl().unwrap());
        assert!(settings.set_language("xx").is_err());
    }
}
