use serde::Deserialize;

pub const DEFAULT_WORLD_URL: &str = "https://cdn.jsdelivr.net/npm/world-atlas@2/countries-110m.json";
pub const DEFAULT_API_BASE: &str = "https://generativelanguage.googleapis.com/v1beta";
pub const DEFAULT_MODEL: &str = "gemini-3-flash-preview";

/// Host-supplied settings, parsed from the JSON handed to `start`.
/// Every field is optional in the input.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct AppConfig {
    /// World boundaries (TopoJSON or GeoJSON).
    pub world_url: String,
    /// Empty disables searching; every query then fails with the generic
    /// user-facing message.
    pub api_key: String,
    pub api_base: String,
    pub model: String,
    /// `localStorage` key for recent searches.
    pub history_key: String,
    /// `tracing` filter directive, e.g. `"info"` or `"scene=debug,info"`.
    pub log_level: String,
    /// Id of the element the globe SVG is mounted into.
    pub globe_container: String,
    /// Id given to the city radar element inside the result card.
    pub radar_container: String,
    /// Id of the element the result card (or error) is rendered into.
    pub ticket_container: String,
    pub tooltip_container: String,
    /// Spin the globe while idle, not only while a query is loading.
    pub idle_auto_rotate: bool,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            world_url: DEFAULT_WORLD_URL.to_string(),
            api_key: String::new(),
            api_base: DEFAULT_API_BASE.to_string(),
            model: DEFAULT_MODEL.to_string(),
            history_key: catalog::HISTORY_KEY.to_string(),
            log_level: "info".to_string(),
            globe_container: "globe".to_string(),
            radar_container: "city-radar".to_string(),
            ticket_container: "ticket".to_string(),
            tooltip_container: "globe-tooltip".to_string(),
            idle_auto_rotate: false,
        }
    }
}

impl AppConfig {
    /// Empty or whitespace input yields the defaults.
    pub fn from_json(raw: &str) -> Result<Self, serde_json::Error> {
        if raw.trim().is_empty() {
            return Ok(Self::default());
        }
        serde_json::from_str(raw)
    }

    /// `POST` target for a generate-content call.
    pub fn generate_url(&self) -> String {
        format!(
            "{}/models/{}:generateContent",
            self.api_base.trim_end_matches('/'),
            self.model
        )
    }
}
