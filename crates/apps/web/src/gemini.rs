//! Flight lookups through the Gemini `generateContent` REST call with Google
//! Search grounding.

use formats::{FlightRecord, GroundingSource, ParseFlightError, SearchParams};
use serde::Deserialize;
use serde_json::{Value, json};

/// The only failure text users see, whatever went wrong.
pub const USER_ERROR_MESSAGE: &str =
    "Could not retrieve flight data. Please try again or check your connection.";

const DEFAULT_DEPARTURE: &str = "Next month";
const DEFAULT_RETURN: &str = "One week later";

#[derive(Debug, Clone, PartialEq)]
pub enum SearchError {
    MissingApiKey,
    Http { status: u16, body: String },
    Transport(String),
    /// The model answered without any text.
    EmptyResponse,
    Decode(String),
    Parse(ParseFlightError),
}

impl std::fmt::Display for SearchError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SearchError::MissingApiKey => write!(f, "API key not configured"),
            SearchError::Http { status, body } if body.is_empty() => write!(f, "HTTP {status}"),
            SearchError::Http { status, body } => write!(f, "HTTP {status}: {body}"),
            SearchError::Transport(e) => write!(f, "request failed: {e}"),
            SearchError::EmptyResponse => write!(f, "empty response from model"),
            SearchError::Decode(e) => write!(f, "unreadable model response: {e}"),
            SearchError::Parse(e) => write!(f, "{e}"),
        }
    }
}

impl std::error::Error for SearchError {}

impl SearchError {
    pub fn user_message(&self) -> &'static str {
        USER_ERROR_MESSAGE
    }
}

/// A validated answer and the pages it was grounded on.
#[derive(Debug, Clone, PartialEq)]
pub struct SearchOutcome {
    pub record: FlightRecord,
    pub sources: Vec<GroundingSource>,
}

fn or_default<'a>(value: &'a str, fallback: &'a str) -> &'a str {
    if value.trim().is_empty() { fallback } else { value }
}

pub fn build_prompt(params: &SearchParams) -> String {
    let passengers = params.passengers;
    let currency = params.currency.as_str();
    format!(
        "Find flight prices from {origin} to {destination}.

Search Parameters:
- Departure: {depart}
- Return: {ret}
- Passengers: {passengers}
- Class: {class}
- Currency: {currency} (Provide ALL prices in this currency)

Required Information (JSON Response):
1. Origin/Destination IATA Codes & Coordinates.
2. Total Estimated Price Range for {passengers} passenger(s).
3. Stops & Hubs (if any).
4. Smart Layover: Worth exiting the airport?
5. Cost of Living (Burger Index) in {currency}.
6. Vibe Spots: 3 specific spots in the destination city with their approximate COORDINATES (lat, lng) so I can plot them on a map.

IMPORTANT: You must return a valid JSON object.",
        origin = params.origin,
        destination = params.destination,
        depart = or_default(&params.depart_date, DEFAULT_DEPARTURE),
        ret = or_default(&params.return_date, DEFAULT_RETURN),
        class = params.cabin_class.as_str(),
    )
}

fn coords_schema() -> Value {
    json!({
        "type": "OBJECT",
        "properties": { "lat": { "type": "NUMBER" }, "lng": { "type": "NUMBER" } }
    })
}

fn strings(names: &[&str]) -> serde_json::Map<String, Value> {
    names
        .iter()
        .map(|n| (n.to_string(), json!({ "type": "STRING" })))
        .collect()
}

/// The structured-output schema the model is asked to follow.
pub fn response_schema() -> Value {
    let mut properties = strings(&[
        "origin",
        "destination",
        "originCode",
        "destinationCode",
        "currency",
        "duration",
        "distance",
        "layover",
        "summary",
    ]);
    properties.insert("originCoords".into(), coords_schema());
    properties.insert("destinationCoords".into(), coords_schema());
    properties.insert(
        "averagePrice".into(),
        json!({ "type": "STRING", "description": "Total price range with currency symbol" }),
    );
    properties.insert("airlines".into(), json!({ "type": "ARRAY", "items": { "type": "STRING" } }));
    properties.insert("stops".into(), json!({ "type": "NUMBER" }));
    properties.insert(
        "optimizations".into(),
        json!({
            "type": "ARRAY",
            "items": {
                "type": "OBJECT",
                "properties": {
                    "type": { "type": "STRING", "enum": ["cheaper", "faster", "alternative"] },
                    "title": { "type": "STRING" },
                    "description": { "type": "STRING" }
                }
            }
        }),
    );
    properties.insert(
        "destinationInsights".into(),
        json!({
            "type": "OBJECT",
            "properties": strings(&["currency", "language", "plugType", "timezone", "bestSeason"])
        }),
    );
    properties.insert(
        "costOfLiving".into(),
        json!({
            "type": "OBJECT",
            "properties": strings(&["mealPrice", "hostelPrice", "beerPrice"])
        }),
    );
    properties.insert(
        "layoverGuide".into(),
        json!({
            "type": "OBJECT",
            "properties": {
                "hasLayover": { "type": "BOOLEAN" },
                "airport": { "type": "STRING" },
                "isWorthExiting": { "type": "BOOLEAN" },
                "suggestion": { "type": "STRING" }
            }
        }),
    );
    properties.insert(
        "vibeSpots".into(),
        json!({
            "type": "ARRAY",
            "items": {
                "type": "OBJECT",
                "properties": {
                    "name": { "type": "STRING" },
                    "description": { "type": "STRING" },
                    "type": { "type": "STRING", "enum": ["nature", "urban", "food"] },
                    "coordinates": coords_schema()
                }
            }
        }),
    );
    json!({ "type": "OBJECT", "properties": properties })
}

pub fn request_body(params: &SearchParams) -> Value {
    json!({
        "contents": [{ "parts": [{ "text": build_prompt(params) }] }],
        "tools": [{ "google_search": {} }],
        "generationConfig": {
            "responseMimeType": "application/json",
            "responseSchema": response_schema()
        }
    })
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct GenerateResponse {
    candidates: Vec<Candidate>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
struct Candidate {
    content: Option<Content>,
    grounding_metadata: Option<GroundingMetadata>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct Content {
    parts: Vec<Part>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct Part {
    text: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
struct GroundingMetadata {
    grounding_chunks: Vec<GroundingChunk>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct GroundingChunk {
    web: Option<WebChunk>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct WebChunk {
    uri: Option<String>,
    title: Option<String>,
}

/// Turns a `generateContent` response body into a validated outcome.
pub fn parse_response(body: &str) -> Result<SearchOutcome, SearchError> {
    let response: GenerateResponse =
        serde_json::from_str(body).map_err(|e| SearchError::Decode(e.to_string()))?;
    let Some(candidate) = response.candidates.into_iter().next() else {
        return Err(SearchError::EmptyResponse);
    };

    let sources: Vec<GroundingSource> = candidate
        .grounding_metadata
        .map(|m| m.grounding_chunks)
        .unwrap_or_default()
        .into_iter()
        .filter_map(|chunk| {
            let web = chunk.web?;
            match (web.uri, web.title) {
                (Some(uri), Some(title)) if !uri.is_empty() && !title.is_empty() => {
                    Some(GroundingSource { title, uri })
                }
                _ => None,
            }
        })
        .collect();

    let text: String = candidate
        .content
        .map(|c| c.parts)
        .unwrap_or_default()
        .into_iter()
        .filter_map(|p| p.text)
        .collect();
    if text.trim().is_empty() {
        return Err(SearchError::EmptyResponse);
    }
    tracing::debug!(chars = text.len(), sources = sources.len(), "model response received");

    let record = FlightRecord::from_model_text(&text).map_err(SearchError::Parse)?;
    Ok(SearchOutcome { record, sources })
}

#[cfg(target_arch = "wasm32")]
pub async fn fetch_flight(
    config: &crate::config::AppConfig,
    params: &SearchParams,
) -> Result<SearchOutcome, SearchError> {
    use gloo_net::http::Request;

    if config.api_key.trim().is_empty() {
        return Err(SearchError::MissingApiKey);
    }
    let resp = Request::post(&config.generate_url())
        .header("x-goog-api-key", &config.api_key)
        .json(&request_body(params))
        .map_err(|e| SearchError::Transport(e.to_string()))?
        .send()
        .await
        .map_err(|e| SearchError::Transport(e.to_string()))?;

    if !resp.ok() {
        let status = resp.status();
        let body = resp.text().await.unwrap_or_default();
        return Err(SearchError::Http {
            status,
            body: body.trim().to_string(),
        });
    }

    let body = resp
        .text()
        .await
        .map_err(|e| SearchError::Transport(e.to_string()))?;
    parse_response(&body)
}

#[cfg(test)]
mod tests {
    use super::*;
    use formats::{CabinClass, Currency, ExtractError};
    use pretty_assertions::assert_eq;

    fn params() -> SearchParams {
        SearchParams {
            origin: "Berlin".into(),
            destination: "Seoul".into(),
            passengers: 2,
            cabin_class: CabinClass::Business,
            currency: Currency::Eur,
            ..SearchParams::default()
        }
    }

    const RECORD: &str = r#"{"origin":"Berlin","destination":"Seoul","originCoords":{"lat":52.36,"lng":13.5},"destinationCoords":{"lat":37.46,"lng":126.44},"stops":1,"layover":"Frankfurt"}"#;

    fn response(parts: &[&str], chunks: Value) -> String {
        let parts: Vec<Value> = parts.iter().map(|t| json!({ "text": t })).collect();
        json!({
            "candidates": [{
                "content": { "parts": parts },
                "groundingMetadata": { "groundingChunks": chunks }
            }]
        })
        .to_string()
    }

    #[test]
    fn prompt_fills_defaults_and_params() {
        let prompt = build_prompt(&params());
        assert!(prompt.starts_with("Find flight prices from Berlin to Seoul."));
        assert!(prompt.contains("- Departure: Next month"));
        assert!(prompt.contains("- Return: One week later"));
        assert!(prompt.contains("- Class: Business"));
        assert!(prompt.contains("Total Estimated Price Range for 2 passenger(s)."));
        assert!(prompt.contains("Cost of Living (Burger Index) in EUR."));

        let mut p = params();
        p.depart_date = "2026-11-02".into();
        assert!(build_prompt(&p).contains("- Departure: 2026-11-02"));
    }

    #[test]
    fn body_requests_grounded_json() {
        let body = request_body(&params());
        assert_eq!(body["tools"], json!([{ "google_search": {} }]));
        let config = &body["generationConfig"];
        assert_eq!(config["responseMimeType"], "application/json");
        let props = &config["responseSchema"]["properties"];
        assert_eq!(props["stops"]["type"], "NUMBER");
        assert_eq!(
            props["vibeSpots"]["items"]["properties"]["type"]["enum"],
            json!(["nature", "urban", "food"])
        );
        assert_eq!(props["costOfLiving"]["properties"]["beerPrice"]["type"], "STRING");
    }

    #[test]
    fn parses_split_text_and_grounding() {
        let (head, tail) = RECORD.split_at(40);
        let body = response(
            &[head, tail],
            json!([
                { "web": { "uri": "https://www.kayak.com/x", "title": "Kayak" } },
                { "web": { "uri": "https://example.com" } },
                { "retrievedContext": {} }
            ]),
        );
        let outcome = parse_response(&body).unwrap();
        assert_eq!(outcome.record.layover.as_deref(), Some("Frankfurt"));
        assert_eq!(
            outcome.sources,
            vec![GroundingSource {
                title: "Kayak".into(),
                uri: "https://www.kayak.com/x".into()
            }]
        );
    }

    #[test]
    fn failures_map_to_errors() {
        assert_eq!(parse_response(r#"{"candidates":[]}"#), Err(SearchError::EmptyResponse));
        assert_eq!(
            parse_response(&response(&["  "], json!([]))),
            Err(SearchError::EmptyResponse)
        );
        assert!(matches!(parse_response("<html>"), Err(SearchError::Decode(_))));
        assert_eq!(
            parse_response(&response(&["sorry, no flights"], json!([]))),
            Err(SearchError::Parse(ParseFlightError::Extract(ExtractError::NoJsonObject)))
        );
    }

    #[test]
    fn every_error_shows_the_same_message() {
        for e in [
            SearchError::MissingApiKey,
            SearchError::Http {
                status: 503,
                body: String::new(),
            },
            SearchError::EmptyResponse,
        ] {
            assert_eq!(e.user_message(), USER_ERROR_MESSAGE);
        }
        assert_eq!(
            SearchError::Http {
                status: 429,
                body: "quota".into()
            }
            .to_string(),
            "HTTP 429: quota"
        );
    }
}
