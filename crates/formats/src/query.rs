//! Search form parameters as stored in history and sent to the model.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum CabinClass {
    #[default]
    Economy,
    #[serde(rename = "Premium Economy")]
    PremiumEconomy,
    Business,
    First,
}

impl CabinClass {
    pub const ALL: [CabinClass; 4] = [
        CabinClass::Economy,
        CabinClass::PremiumEconomy,
        CabinClass::Business,
        CabinClass::First,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            CabinClass::Economy => "Economy",
            CabinClass::PremiumEconomy => "Premium Economy",
            CabinClass::Business => "Business",
            CabinClass::First => "First",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|c| c.as_str() == s)
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Currency {
    #[default]
    Usd,
    Eur,
}

impl Currency {
    pub fn as_str(self) -> &'static str {
        match self {
            Currency::Usd => "USD",
            Currency::Eur => "EUR",
        }
    }

    pub fn toggle(self) -> Self {
        match self {
            Currency::Usd => Currency::Eur,
            Currency::Eur => Currency::Usd,
        }
    }
}

fn default_passengers() -> u32 {
    1
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SearchParams {
    #[serde(default)]
    pub origin: String,
    #[serde(default)]
    pub destination: String,
    /// Free-form date text; empty means the model picks a default.
    #[serde(default)]
    pub depart_date: String,
    #[serde(default)]
    pub return_date: String,
    #[serde(default = "default_passengers")]
    pub passengers: u32,
    #[serde(default)]
    pub cabin_class: CabinClass,
    #[serde(default)]
    pub currency: Currency,
}

impl Default for SearchParams {
    fn default() -> Self {
        Self {
            origin: String::new(),
            destination: String::new(),
            depart_date: String::new(),
            return_date: String::new(),
            passengers: default_passengers(),
            cabin_class: CabinClass::default(),
            currency: Currency::default(),
        }
    }
}

impl SearchParams {
    /// Both endpoints are filled in (after trimming).
    pub fn is_searchable(&self) -> bool {
        !self.origin.trim().is_empty() && !self.destination.trim().is_empty()
    }

    /// History identity: same origin and destination.
    pub fn same_route(&self, other: &SearchParams) -> bool {
        self.origin == other.origin && self.destination == other.destination
    }
}
