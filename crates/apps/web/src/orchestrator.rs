//! Search form, query lifecycle and history: the application state the page
//! is rendered from.

use catalog::SearchHistory;
use formats::{CabinClass, SearchParams};
use foundation::math::GeoCoord;

use crate::gemini::{SearchError, SearchOutcome};
use crate::ticket::TicketView;

/// Suggestions offered for the origin and destination inputs.
pub const SAMPLE_CITIES: [&str; 20] = [
    "New York (JFK), USA",
    "London (LHR), UK",
    "Tokyo (HND), Japan",
    "Paris (CDG), France",
    "Sydney (SYD), Australia",
    "Dubai (DXB), UAE",
    "Singapore (SIN)",
    "Rome (FCO), Italy",
    "Barcelona (BCN), Spain",
    "Cancun (CUN), Mexico",
    "Madrid (MAD), Spain",
    "Amsterdam (AMS), Netherlands",
    "Frankfurt (FRA), Germany",
    "Bangkok (BKK), Thailand",
    "Istanbul (IST), Turkey",
    "Seoul (ICN), South Korea",
    "Los Angeles (LAX), USA",
    "San Francisco (SFO), USA",
    "Miami (MIA), USA",
    "Toronto (YYZ), Canada",
];

/// Issued by [`Orchestrator::begin_search`]; hand it back with the result.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SearchTicket {
    seq: u64,
    pub params: SearchParams,
}

impl SearchTicket {
    pub fn seq(&self) -> u64 {
        self.seq
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum Outcome {
    Found(SearchOutcome),
    /// User-facing message.
    Failed(&'static str),
}

/// What the globe should show for the current state.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RouteView {
    pub origin: Option<GeoCoord>,
    pub destination: Option<GeoCoord>,
    pub origin_label: Option<String>,
    pub destination_label: Option<String>,
}

#[derive(Debug, Default)]
pub struct Orchestrator {
    params: SearchParams,
    loading: bool,
    /// Sequence number of the most recent search.
    latest: u64,
    outcome: Option<Outcome>,
    history: SearchHistory,
}

fn non_empty(s: &str) -> Option<String> {
    if s.is_empty() { None } else { Some(s.to_string()) }
}

impl Orchestrator {
    pub fn new(history: SearchHistory) -> Self {
        Self {
            history,
            ..Self::default()
        }
    }

    pub fn params(&self) -> &SearchParams {
        &self.params
    }

    pub fn is_loading(&self) -> bool {
        self.loading
    }

    pub fn outcome(&self) -> Option<&Outcome> {
        self.outcome.as_ref()
    }

    pub fn history(&self) -> &SearchHistory {
        &self.history
    }

    pub fn set_origin(&mut self, origin: impl Into<String>) {
        self.params.origin = origin.into();
    }

    pub fn set_destination(&mut self, destination: impl Into<String>) {
        self.params.destination = destination.into();
    }

    pub fn set_depart_date(&mut self, date: impl Into<String>) {
        self.params.depart_date = date.into();
    }

    pub fn set_return_date(&mut self, date: impl Into<String>) {
        self.params.return_date = date.into();
    }

    /// At least one passenger.
    pub fn set_passengers(&mut self, passengers: u32) {
        self.params.passengers = passengers.max(1);
    }

    pub fn set_cabin_class(&mut self, cabin_class: CabinClass) {
        self.params.cabin_class = cabin_class;
    }

    pub fn toggle_currency(&mut self) {
        self.params.currency = self.params.currency.toggle();
    }

    /// Starts a query for the current form. Returns `None` without touching
    /// any state when origin or destination is empty.
    pub fn begin_search(&mut self, now_ms: u64) -> Option<SearchTicket> {
        if !self.params.is_searchable() {
            return None;
        }
        self.latest += 1;
        self.loading = true;
        self.outcome = None;
        self.history.record(self.params.clone(), now_ms);
        tracing::info!(
            seq = self.latest,
            origin = %self.params.origin,
            destination = %self.params.destination,
            "search started"
        );
        Some(SearchTicket {
            seq: self.latest,
            params: self.params.clone(),
        })
    }

    /// Applies a finished query. Results of superseded searches are dropped;
    /// returns whether this one was applied.
    pub fn finish_search(
        &mut self,
        ticket: SearchTicket,
        result: Result<SearchOutcome, SearchError>,
    ) -> bool {
        if ticket.seq != self.latest {
            tracing::debug!(seq = ticket.seq, latest = self.latest, "dropping stale search result");
            return false;
        }
        self.loading = false;
        self.outcome = Some(match result {
            Ok(found) => {
                tracing::info!(seq = ticket.seq, sources = found.sources.len(), "search finished");
                Outcome::Found(found)
            }
            Err(e) => {
                tracing::warn!(seq = ticket.seq, error = %e, "search failed");
                Outcome::Failed(e.user_message())
            }
        });
        true
    }

    /// A country picked on the globe fills the origin, then the destination;
    /// a third pick starts over with a new origin.
    pub fn select_region(&mut self, name: &str) {
        if self.params.origin.is_empty() {
            self.params.origin = name.to_string();
        } else if self.params.destination.is_empty() {
            self.params.destination = name.to_string();
        } else {
            self.params.origin = name.to_string();
            self.params.destination.clear();
            self.outcome = None;
        }
    }

    /// Copies a stored search back into the form.
    pub fn select_history(&mut self, index: usize) -> bool {
        match self.history.get(index) {
            Some(entry) => {
                self.params = entry.params.clone();
                true
            }
            None => false,
        }
    }

    pub fn found(&self) -> Option<&SearchOutcome> {
        match &self.outcome {
            Some(Outcome::Found(found)) => Some(found),
            _ => None,
        }
    }

    pub fn error_message(&self) -> Option<&'static str> {
        match self.outcome {
            Some(Outcome::Failed(msg)) => Some(msg),
            _ => None,
        }
    }

    pub fn route(&self) -> RouteView {
        match self.found() {
            Some(found) => {
                let r = &found.record;
                RouteView {
                    origin: Some(r.origin_coords),
                    destination: Some(r.destination_coords),
                    origin_label: Some(format!("{} - {}", r.origin_code, r.origin)),
                    destination_label: Some(format!("{} - {}", r.destination_code, r.destination)),
                }
            }
            None => RouteView {
                origin: None,
                destination: None,
                origin_label: non_empty(&self.params.origin),
                destination_label: non_empty(&self.params.destination),
            },
        }
    }

    /// The result card, hidden while a query is in flight.
    pub fn ticket(&self) -> Option<TicketView> {
        if self.loading {
            return None;
        }
        self.found().map(|f| TicketView::new(&f.record, &f.sources))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::gemini::USER_ERROR_MESSAGE;
    use formats::{Currency, FlightRecord};
    use pretty_assertions::assert_eq;
    use serde_json::json;

    fn outcome(code: &str, name: &str) -> SearchOutcome {
        let record = FlightRecord::from_value(json!({
            "origin": "Paris",
            "destination": name,
            "originCode": "CDG",
            "destinationCode": code,
            "originCoords": { "lat": 49.0, "lng": 2.55 },
            "destinationCoords": { "lat": 35.55, "lng": 139.78 },
            "stops": 0
        }))
        .unwrap();
        SearchOutcome {
            record,
            sources: Vec::new(),
        }
    }

    fn ready() -> Orchestrator {
        let mut o = Orchestrator::default();
        o.set_origin("Paris");
        o.set_destination("Tokyo");
        o
    }

    #[test]
    fn empty_endpoints_do_not_search() {
        let mut o = Orchestrator::default();
        o.set_origin("Paris");
        assert_eq!(o.begin_search(1), None);
        assert!(!o.is_loading());
        assert!(o.history().is_empty());
    }

    #[test]
    fn search_records_history_and_clears_result() {
        let mut o = ready();
        let t = o.begin_search(100).unwrap();
        assert!(o.finish_search(t, Ok(outcome("HND", "Tokyo"))));
        assert!(o.found().is_some());

        let t = o.begin_search(200).unwrap();
        assert!(o.is_loading());
        assert!(o.outcome().is_none());
        assert_eq!(o.history().len(), 1);
        assert_eq!(o.history().get(0).unwrap().timestamp, 200);
        assert_eq!(t.params.destination, "Tokyo");
    }

    #[test]
    fn latest_request_wins() {
        let mut o = ready();
        let first = o.begin_search(1).unwrap();
        o.set_destination("Osaka");
        let second = o.begin_search(2).unwrap();

        assert!(!o.finish_search(first, Ok(outcome("HND", "Tokyo"))));
        assert!(o.is_loading());
        assert!(o.outcome().is_none());

        assert!(o.finish_search(second, Ok(outcome("KIX", "Osaka"))));
        assert!(!o.is_loading());
        assert_eq!(o.found().unwrap().record.destination_code, "KIX");
    }

    #[test]
    fn failures_surface_one_message() {
        let mut o = ready();
        let t = o.begin_search(1).unwrap();
        o.finish_search(t, Err(SearchError::EmptyResponse));
        assert_eq!(o.error_message(), Some(USER_ERROR_MESSAGE));
        assert!(o.ticket().is_none());
    }

    #[test]
    fn region_selection_cycles() {
        let mut o = Orchestrator::default();
        o.select_region("France");
        o.select_region("Japan");
        assert_eq!((o.params().origin.as_str(), o.params().destination.as_str()), ("France", "Japan"));

        let t = o.begin_search(1).unwrap();
        o.finish_search(t, Ok(outcome("HND", "Tokyo")));
        o.select_region("Peru");
        assert_eq!(o.params().origin, "Peru");
        assert_eq!(o.params().destination, "");
        assert!(o.outcome().is_none());
    }

    #[test]
    fn route_labels_follow_result() {
        let mut o = ready();
        assert_eq!(
            o.route(),
            RouteView {
                origin: None,
                destination: None,
                origin_label: Some("Paris".into()),
                destination_label: Some("Tokyo".into()),
            }
        );
        let t = o.begin_search(1).unwrap();
        o.finish_search(t, Ok(outcome("HND", "Tokyo")));
        let route = o.route();
        assert_eq!(route.origin_label.as_deref(), Some("CDG - Paris"));
        assert_eq!(route.destination_label.as_deref(), Some("HND - Tokyo"));
        assert_eq!(route.destination, Some(GeoCoord::new(35.55, 139.78)));
        assert!(o.ticket().is_some());
    }

    #[test]
    fn history_selection_and_form_setters() {
        let mut o = ready();
        o.set_passengers(0);
        assert_eq!(o.params().passengers, 1);
        o.begin_search(1);
        o.set_origin("Lima");
        o.toggle_currency();
        assert_eq!(o.params().currency, Currency::Eur);

        assert!(o.select_history(0));
        assert_eq!(o.params().origin, "Paris");
        assert_eq!(o.params().currency, Currency::Usd);
        assert!(!o.select_history(3));
    }
}
