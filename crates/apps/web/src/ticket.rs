//! The result card: a pure view model derived from a flight record, plus its
//! HTML rendering.

use formats::{CostOfLiving, FlightRecord, GroundingSource, Optimization, OptimizationKind, VibeSpot};
use scene::push_escaped;

/// Tips shown on the card.
pub const MAX_TIPS: usize = 2;
/// Source links shown under the booking button.
pub const MAX_SOURCES: usize = 2;
/// Flights longer than this many hours list a meal.
pub const MEAL_THRESHOLD_HOURS: u32 = 4;
/// Assumed when the duration has no leading hour count.
const FALLBACK_HOURS: u32 = 2;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Amenity {
    Wifi,
    Meal,
    Power,
    Bag,
}

impl Amenity {
    pub fn label(self) -> &'static str {
        match self {
            Amenity::Wifi => "Wi-Fi",
            Amenity::Meal => "Meal",
            Amenity::Power => "Power",
            Amenity::Bag => "Cabin bag",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LayoverTip {
    pub airport: String,
    pub suggestion: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceLink {
    /// Hostname without a leading `www.`.
    pub label: String,
    pub uri: String,
}

#[derive(Debug, Clone, PartialEq)]
pub struct TicketView {
    pub carrier: String,
    pub currency: String,
    pub origin_code: String,
    pub destination_code: String,
    pub origin_city: String,
    pub destination_city: String,
    pub duration: String,
    pub is_direct: bool,
    pub route_label: String,
    /// Marker on the route line of connecting flights.
    pub layover_badge: Option<String>,
    pub price: String,
    pub amenities: Vec<Amenity>,
    pub cost_of_living: Option<CostOfLiving>,
    pub tips: Vec<Optimization>,
    pub layover_tip: Option<LayoverTip>,
    pub vibe_spots: Vec<VibeSpot>,
    pub plug_type: Option<String>,
    pub best_season: Option<String>,
    pub booking_url: String,
    pub sources: Vec<SourceLink>,
}

/// Text before the first comma: "Paris (CDG), France" gives "Paris (CDG)".
pub fn short_city(name: &str) -> &str {
    name.split(',').next().unwrap_or(name)
}

/// Leading whole hours of a duration such as "7h 10m". Missing or zero
/// counts fall back to two hours.
pub fn duration_hours(duration: &str) -> u32 {
    let digits: String = duration
        .trim_start()
        .chars()
        .take_while(|c| c.is_ascii_digit())
        .collect();
    match digits.parse::<u32>() {
        Ok(h) if h > 0 => h,
        _ => FALLBACK_HOURS,
    }
}

pub fn route_label(stops: u32, layover: Option<&str>) -> String {
    if stops == 0 {
        return "Direct Flight".to_string();
    }
    let plural = if stops > 1 { "s" } else { "" };
    format!("{stops} Stop{plural} via {}", layover.unwrap_or("Hub"))
}

pub fn booking_url(origin_code: &str, destination_code: &str) -> String {
    format!("https://www.google.com/travel/flights?q=Flights+from+{origin_code}+to+{destination_code}")
}

/// `None` for URIs that do not parse or have no host.
pub fn source_link(source: &GroundingSource) -> Option<SourceLink> {
    let url = url::Url::parse(&source.uri).ok()?;
    let host = url.host_str()?;
    Some(SourceLink {
        label: host.strip_prefix("www.").unwrap_or(host).to_string(),
        uri: source.uri.clone(),
    })
}

fn or_fallback(value: &str, fallback: &str) -> String {
    if value.is_empty() {
        fallback.to_string()
    } else {
        value.to_string()
    }
}

impl TicketView {
    pub fn new(record: &FlightRecord, sources: &[GroundingSource]) -> Self {
        let is_direct = record.stops == 0;
        let layover = record.layover.as_deref();

        let mut amenities = vec![Amenity::Wifi];
        if duration_hours(&record.duration) > MEAL_THRESHOLD_HOURS {
            amenities.push(Amenity::Meal);
        }
        amenities.extend([Amenity::Power, Amenity::Bag]);

        let layover_tip = record
            .layover_guide
            .as_ref()
            .filter(|g| g.has_layover)
            .map(|g| LayoverTip {
                airport: g.airport.clone(),
                suggestion: g.suggestion.clone(),
            });

        Self {
            carrier: record
                .airlines
                .first()
                .filter(|a| !a.is_empty())
                .cloned()
                .unwrap_or_else(|| "Multiple Airlines".to_string()),
            currency: record.currency.clone(),
            origin_code: or_fallback(&record.origin_code, "ORG"),
            destination_code: or_fallback(&record.destination_code, "DST"),
            origin_city: short_city(&record.origin).to_string(),
            destination_city: short_city(&record.destination).to_string(),
            duration: record.duration.clone(),
            is_direct,
            route_label: route_label(record.stops, layover),
            layover_badge: (!is_direct).then(|| layover.unwrap_or("1 STOP").to_string()),
            price: record.average_price.clone(),
            amenities,
            cost_of_living: record.cost_of_living.clone(),
            tips: record.optimizations.iter().take(MAX_TIPS).cloned().collect(),
            layover_tip,
            vibe_spots: record.vibe_spots.clone(),
            plug_type: record.destination_insights.as_ref().map(|i| i.plug_type.clone()),
            best_season: record.destination_insights.as_ref().map(|i| i.best_season.clone()),
            booking_url: booking_url(&record.origin_code, &record.destination_code),
            sources: sources.iter().filter_map(source_link).take(MAX_SOURCES).collect(),
        }
    }

    pub fn vibe_heading(&self) -> String {
        format!("Vibe Check: {}", self.destination_city)
    }

    /// The radar is only shown when there is something to plot.
    pub fn shows_radar(&self) -> bool {
        !self.vibe_spots.is_empty()
    }

    pub fn to_html(&self, radar_container: &str) -> String {
        let mut h = Html::default();
        h.open("article", "ticket");

        h.open("header", "carrier");
        h.text_el("span", "carrier-name", &self.carrier);
        h.text_el("span", "currency", &self.currency);
        h.close("header");

        h.open("section", "route");
        h.text_el("span", "origin-code", &self.origin_code);
        h.text_el("span", "origin-city", &self.origin_city);
        h.text_el("span", "duration", &self.duration);
        if let Some(badge) = &self.layover_badge {
            h.text_el("span", "layover-badge", badge);
        }
        h.text_el("span", "route-label", &self.route_label);
        h.text_el("span", "destination-code", &self.destination_code);
        h.text_el("span", "destination-city", &self.destination_city);
        h.close("section");

        if let Some(col) = &self.cost_of_living {
            h.open("section", "cost-of-living");
            h.text_el("h4", "heading", &format!("Cost of Living Index ({})", self.currency));
            h.text_el("span", "meal", &col.meal_price);
            h.text_el("span", "hostel", &col.hostel_price);
            h.text_el("span", "beer", &col.beer_price);
            h.close("section");
        }

        h.open("section", "price");
        h.text_el("span", "total", &self.price);
        for amenity in &self.amenities {
            h.text_el("span", "amenity", amenity.label());
        }
        h.close("section");

        h.open("section", "tips");
        for tip in &self.tips {
            let class = match tip.kind {
                OptimizationKind::Cheaper => "tip cheaper",
                OptimizationKind::Faster => "tip faster",
                OptimizationKind::Alternative => "tip alternative",
            };
            h.open("div", class);
            h.text_el("p", "title", &tip.title);
            h.text_el("p", "description", &tip.description);
            h.close("div");
        }
        h.close("section");

        if let Some(tip) = &self.layover_tip {
            h.open("section", "layover-guide");
            h.text_el("span", "airport", &format!("Smart Layover: {}", tip.airport));
            h.text_el("p", "suggestion", &tip.suggestion);
            h.close("section");
        }

        h.open("section", "vibe");
        h.text_el("h3", "heading", &self.vibe_heading());
        if self.shows_radar() {
            h.out.push_str("<div id=\"");
            push_escaped(&mut h.out, radar_container);
            h.out.push_str("\"></div>");
        }
        for spot in &self.vibe_spots {
            h.open("div", spot.category.as_str());
            h.text_el("span", "name", &spot.name);
            h.text_el("p", "description", &spot.description);
            h.close("div");
        }
        h.close("section");

        if self.plug_type.is_some() || self.best_season.is_some() {
            h.open("section", "insights");
            h.text_el("span", "plugs", self.plug_type.as_deref().unwrap_or_default());
            h.text_el("span", "best-season", self.best_season.as_deref().unwrap_or_default());
            h.close("section");
        }

        h.link("book", &self.booking_url, "Check Real Prices");
        for source in &self.sources {
            h.link("source", &source.uri, &source.label);
        }

        h.close("article");
        h.out
    }
}

#[derive(Default)]
struct Html {
    out: String,
}

impl Html {
    fn open(&mut self, tag: &str, class: &str) {
        self.out.push('<');
        self.out.push_str(tag);
        self.out.push_str(" class=\"");
        push_escaped(&mut self.out, class);
        self.out.push_str("\">");
    }

    fn close(&mut self, tag: &str) {
        self.out.push_str("</");
        self.out.push_str(tag);
        self.out.push('>');
    }

    fn text_el(&mut self, tag: &str, class: &str, text: &str) {
        self.open(tag, class);
        push_escaped(&mut self.out, text);
        self.close(tag);
    }

    fn link(&mut self, class: &str, href: &str, text: &str) {
        self.out.push_str("<a class=\"");
        push_escaped(&mut self.out, class);
        self.out.push_str("\" target=\"_blank\" rel=\"noopener noreferrer\" href=\"");
        push_escaped(&mut self.out, href);
        self.out.push_str("\">");
        push_escaped(&mut self.out, text);
        self.out.push_str("</a>");
    }
}
