//! Business settings singleton

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "UPPERCASE")]
pub enum Currency {
    #[default]
    Eur,
    Usd,
    Gbp,
}

impl Currency {
    pub fn code(&self) -> &'static str {
        match self {
            Currency::Eur => "EUR",
            Currency::Usd => "USD",
            Currency::Gbp => "GBP",
        }
    }

    pub fn symbol(&self) -> &'static str {
        match self {
            Currency::Eur => "€",
            Currency::Usd => "$",
            Currency::Gbp => "£",
        }
    }

    /// Unknown codes fall back to the default currency
    pub fn from_code(code: &str) -> Self {
        match code {
            "USD" => Currency::Usd,
            "GBP" => Currency::Gbp,
            _ => Currency::Eur,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Settings {
    pub business_name: String,
    pub currency: Currency,
    pub default_margin: Decimal,
    pub low_stock_alert: bool,
    pub out_of_stock_alert: bool,
    pub email_daily_report: bool,
    pub updated_at: Option<DateTime<Utc>>,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            business_name: "OpenStock Inc.".to_string(),
            currency: Currency::Eur,
            default_margin: Decimal::from(30),
            low_stock_alert: true,
            out_of_stock_alert: true,
            email_daily_report: false,
            updated_at: None,
        }
    }
}

/// Partial settings update; absent fields keep their current value
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct UpdateSettingsInput {
    pub business_name: Option<String>,
    pub currency: Option<Currency>,
    pub default_margin: Option<Decimal>,
    pub low_stock_alert: Option<bool>,
    pub out_of_stock_alert: Option<bool>,
    pub email_daily_report: Option<bool>,
}

impl Settings {
    pub fn apply(mut self, input: UpdateSettingsInput) -> Self {
        if let Some(name) = input.business_name {
            self.business_name = name;
        }
        if let Some(currency) = input.currency {
            self.currency = currency;
        }
        if let Some(margin) = input.default_margin {
            self.default_margin = margin;
        }
        if let Some(v) = input.low_stock_alert {
            self.low_stock_alert = v;
        }
        if let Some(v) = input.out_of_stock_alert {
            self.out_of_stock_alert = v;
        }
        if let Some(v) = input.email_daily_report {
            self.email_daily_report = v;
        }
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_currency_codes() {
        assert_eq!(Currency::from_code("GBP"), Currency::Gbp);
        assert_eq!(Currency::from_code("JPY"), Currency::Eur);
        assert_eq!(Currency::Usd.symbol(), "$");
        assert_eq!(serde_json::to_string(&Currency::Eur).unwrap(), "\"EUR\"");
    }

    #[test]
    fn test_apply_partial_update() {
        let updated = Settings::default().apply(UpdateSettingsInput {
            low_stock_alert: Some(false),
            currency: Some(Currency::Usd),
            ..Default::default()
        });
        assert!(!updated.low_stock_alert);
        assert!(updated.out_of_stock_alert);
        assert_eq!(updated.currency, Currency::Usd);
        assert_eq!(updated.business_name, "OpenStock Inc.");
    }
}
