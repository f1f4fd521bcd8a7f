//! # Config Commands
//!
//! Read-only view of the terminal settings for the host UI.

use caja_core::Money;
use serde::Serialize;
use tracing::debug;

use crate::state::TerminalConfig;

/// Settings the UI needs. The database path stays internal.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ConfigResponse {
    pub store_name: String,
    pub currency_symbol: String,
    pub backend_url: String,
    pub catalog_limit: usize,
    pub report_limit: usize,
}

/// Gets the current terminal configuration.
///
/// ## When Used
/// - Startup (header, currency formatting)
/// - Reports (store name)
pub fn get_config(config: &TerminalConfig) -> ConfigResponse {
    debug!("get_config command");

    ConfigResponse {
        store_name: config.store_name.clone(),
        currency_symbol: config.currency_symbol.clone(),
        backend_url: config.backend_url.clone(),
        catalog_limit: config.catalog_limit,
        report_limit: config.report_limit,
    }
}

/// Formats an amount for display with the configured symbol.
pub fn format_amount(config: &TerminalConfig, amount: Money) -> String {
    config.format_money(amount)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_get_config_is_camel_case() {
        let json = serde_json::to_value(get_config(&TerminalConfig::default())).unwrap();
        assert_eq!(json["storeName"], "Botillería");
        assert_eq!(json["currencySymbol"], "$");
        assert_eq!(json["catalogLimit"], 500);
        assert!(json.get("dbPath").is_none());
    }

    #[test]
    fn test_format_amount() {
        let config = TerminalConfig::default();
        assert_eq!(format_amount(&config, Money::from_units(15000)), "$15.000");
        assert_eq!(format_amount(&config, Money::from_units(-500)), "-$500");
    }
}
