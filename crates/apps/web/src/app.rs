//! Browser entry points. Everything here runs on the single wasm thread.

use std::cell::RefCell;
use std::sync::OnceLock;

use catalog::{HistoryError, HistoryStore, InMemoryHistoryStore, LocalStorageHistoryStore, load_history};
use formats::CabinClass;
use foundation::time::Time;
use gloo_net::http::Request;
use scene::components::RegionSet;
use scene::globe::{Globe, GlobeConfig, GlobeEvent};
use scene::radar::{CityRadar, RadarConfig, RadarSpot};
use scene::view_state::ViewConfig;
use wasm_bindgen::prelude::*;
use wasm_bindgen_futures::spawn_local;
use web_sys::PointerEvent;

use crate::config::AppConfig;
use crate::orchestrator::{Orchestrator, SAMPLE_CITIES};
use crate::pointer::{DragTracker, hover_target};
use crate::state_cell::StateCell;
use crate::{dom, gemini, logging, ticket};

static PANIC_HOOK_SET: OnceLock<()> = OnceLock::new();

#[derive(Debug)]
enum AppHistoryStore {
    Local(LocalStorageHistoryStore),
    Memory(InMemoryHistoryStore),
}

impl AppHistoryStore {
    fn new(key: &str) -> Self {
        match LocalStorageHistoryStore::new(key) {
            Ok(s) => AppHistoryStore::Local(s),
            Err(e) => {
                tracing::warn!(error = %e, "history will not persist");
                AppHistoryStore::Memory(InMemoryHistoryStore::new())
            }
        }
    }

    fn store(&self) -> &dyn HistoryStore {
        match self {
            AppHistoryStore::Local(s) => s,
            AppHistoryStore::Memory(s) => s,
        }
    }

    fn store_mut(&mut self) -> &mut dyn HistoryStore {
        match self {
            AppHistoryStore::Local(s) => s,
            AppHistoryStore::Memory(s) => s,
        }
    }
}

struct AppState {
    config: AppConfig,
    orchestrator: Orchestrator,
    globe: Globe,
    radar: CityRadar,
    history: AppHistoryStore,
    drag: DragTracker,
    /// Timestamp of the latest animation frame.
    now: Time,
    shown_tooltip: Option<String>,
    on_change: Option<js_sys::Function>,
    /// Detached when the state is dropped on unmount.
    _listeners: Vec<dom::Listener>,
}

thread_local! {
    static STATE: StateCell<AppState> = const { StateCell::new() };
    /// Boundaries survive unmounting; they are fetched once per page.
    static WORLD: RefCell<WorldStatus> = const { RefCell::new(WorldStatus::NotRequested) };
}

enum WorldStatus {
    NotRequested,
    Loading,
    Loaded(RegionSet),
    Failed,
}

/// Runs `f` on the mounted app. Returns the default when nothing is mounted
/// or during thread teardown.
fn with_state<F, R>(f: F) -> R
where
    F: FnOnce(&mut AppState) -> R,
    R: Default,
{
    STATE.try_with(|cell| cell.with(f)).unwrap_or_default()
}

/// Like [`with_state`]; when `f` reports a change, the JS state callback
/// runs after the state has been released so it may call back in.
fn change_state<F>(f: F) -> bool
where
    F: FnOnce(&mut AppState) -> bool,
{
    STATE
        .try_with(|cell| {
            cell.with_then(
                f,
                |s, changed| if *changed { pending_notice(s) } else { None },
                deliver_notice,
            )
        })
        .unwrap_or_default()
}

fn init_panic_hook() {
    PANIC_HOOK_SET.get_or_init(console_error_panic_hook::set_once);
}

#[wasm_bindgen(start)]
pub fn start() {
    init_panic_hook();
}

/// Mounts the app using a JSON [`AppConfig`] (every field optional).
#[wasm_bindgen]
pub fn mount(config_json: &str) -> Result<(), JsValue> {
    let config = AppConfig::from_json(config_json).map_err(|e| JsValue::from_str(&e.to_string()))?;
    logging::init(&config.log_level);

    if STATE.with(StateCell::is_mounted) {
        tracing::debug!("already mounted");
        return Ok(());
    }

    let history = AppHistoryStore::new(&config.history_key);
    let orchestrator = Orchestrator::new(load_history(history.store()));
    let globe_config = GlobeConfig {
        view: ViewConfig {
            idle_auto_rotate: config.idle_auto_rotate,
            ..ViewConfig::default()
        },
    };
    let globe = Globe::new(globe_config, dom::container_width(&config.globe_container));

    let globe_el = dom::element(&config.globe_container)
        .ok_or_else(|| JsValue::from_str(&format!("missing #{}", config.globe_container)))?;
    let world_url = config.world_url.clone();

    let mut listeners = install_globe_listeners(&globe_el)?;
    listeners.push(dom::listen_window("resize", || {
        with_state(|s| {
            let width = dom::container_width(&s.config.globe_container);
            s.globe.resize(width);
        })
    })?);

    let generation = STATE.with(|cell| {
        cell.put(AppState {
            config,
            orchestrator,
            globe,
            radar: CityRadar::new(RadarConfig::default()),
            history,
            drag: DragTracker::default(),
            now: Time::default(),
            shown_tooltip: None,
            on_change: None,
            _listeners: listeners,
        })
    });

    load_world(world_url);
    change_state(|s| {
        sync_page(s);
        true
    });
    dom::animation_loop(move |ts| on_frame(generation, ts))?;
    tracing::info!("skypath mounted");
    Ok(())
}

/// Stops every animation and releases the app state.
#[wasm_bindgen]
pub fn unmount() {
    let state = STATE.try_with(StateCell::take).ok().flatten();
    if let Some(mut s) = state {
        s.globe.unmount();
        s.radar.unmount();
        dom::set_html(&s.config.globe_container, "");
        dom::set_html(&s.config.ticket_container, "");
        tracing::info!("skypath unmounted");
    }
}

/// Called with the JSON state snapshot after every form or result change.
#[wasm_bindgen]
pub fn on_state_change(callback: js_sys::Function) {
    change_state(|s| {
        s.on_change = Some(callback);
        true
    });
}

#[wasm_bindgen]
pub fn get_state() -> String {
    with_state(|s| snapshot(s).to_string())
}

#[wasm_bindgen]
pub fn sample_cities() -> String {
    serde_json::to_string(&SAMPLE_CITIES).unwrap_or_default()
}

#[wasm_bindgen]
pub fn set_origin(value: &str) {
    update(|o| o.set_origin(value));
}

#[wasm_bindgen]
pub fn set_destination(value: &str) {
    update(|o| o.set_destination(value));
}

#[wasm_bindgen]
pub fn set_depart_date(value: &str) {
    update(|o| o.set_depart_date(value));
}

#[wasm_bindgen]
pub fn set_return_date(value: &str) {
    update(|o| o.set_return_date(value));
}

#[wasm_bindgen]
pub fn set_passengers(count: u32) {
    update(|o| o.set_passengers(count));
}

#[wasm_bindgen]
pub fn set_cabin_class(value: &str) -> Result<(), JsValue> {
    let class = CabinClass::parse(value)
        .ok_or_else(|| JsValue::from_str(&format!("unknown cabin class '{value}'")))?;
    update(|o| o.set_cabin_class(class));
    Ok(())
}

#[wasm_bindgen]
pub fn toggle_currency() {
    update(|o| o.toggle_currency());
}

#[wasm_bindgen]
pub fn select_history(index: usize) -> bool {
    change_state(|s| {
        let selected = s.orchestrator.select_history(index);
        if selected {
            sync_page(s);
        }
        selected
    })
}

/// Starts a query for the current form. Returns `false` when origin or
/// destination is missing.
#[wasm_bindgen]
pub fn search() -> bool {
    let mut started = None;
    change_state(|s| {
        let Some(ticket) = s.orchestrator.begin_search(js_sys::Date::now() as u64) else {
            return false;
        };
        save_history(s);
        sync_page(s);
        started = Some((ticket, s.config.clone()));
        true
    });
    let Some((ticket, config)) = started else {
        return false;
    };
    spawn_local(async move {
        let result = gemini::fetch_flight(&config, &ticket.params).await;
        change_state(|s| {
            let current = s.orchestrator.finish_search(ticket, result);
            if current {
                sync_page(s);
            }
            current
        });
    });
    true
}

fn update(f: impl FnOnce(&mut Orchestrator)) {
    change_state(|s| {
        f(&mut s.orchestrator);
        sync_page(s);
        true
    });
}

fn save_history(s: &mut AppState) {
    let entries = s.orchestrator.history().entries().to_vec();
    if let Err(e) = s.history.store_mut().save(&entries) {
        log_history_error(&e);
    }
}

fn log_history_error(e: &HistoryError) {
    tracing::warn!(error = %e, "could not save search history");
}

/// Pushes orchestrator state into the globe, result card and radar.
fn sync_page(s: &mut AppState) {
    let route = s.orchestrator.route();
    s.globe
        .set_route(route.origin, route.destination, route.origin_label, route.destination_label);
    s.globe.set_loading(s.orchestrator.is_loading());

    let html = match (s.orchestrator.ticket(), s.orchestrator.error_message()) {
        (Some(ticket), _) => ticket.to_html(&s.config.radar_container),
        (None, Some(message)) => {
            let mut out = String::from("<div class=\"error\">");
            scene::push_escaped(&mut out, message);
            out.push_str("</div>");
            out
        }
        (None, None) => String::new(),
    };
    dom::set_html(&s.config.ticket_container, &html);

    match s.orchestrator.found().filter(|_| !s.orchestrator.is_loading()) {
        Some(found) if !found.record.vibe_spots.is_empty() => {
            let spots = found.record.vibe_spots.iter().map(|spot| RadarSpot {
                name: spot.name.clone(),
                coordinates: spot.coordinates,
            });
            let city = ticket::short_city(&found.record.destination);
            s.radar.set_data(found.record.destination_coords, city, spots, s.now);
        }
        _ => s.radar.clear(),
    }
}

fn snapshot(s: &AppState) -> serde_json::Value {
    serde_json::json!({
        "params": s.orchestrator.params(),
        "loading": s.orchestrator.is_loading(),
        "error": s.orchestrator.error_message(),
        "history": s.orchestrator.history().entries(),
    })
}

fn pending_notice(s: &AppState) -> Option<(js_sys::Function, String)> {
    let callback = s.on_change.clone()?;
    Some((callback, snapshot(s).to_string()))
}

fn deliver_notice((callback, payload): (js_sys::Function, String)) {
    if let Err(e) = callback.call1(&JsValue::NULL, &JsValue::from_str(&payload)) {
        tracing::warn!(error = ?e, "state callback failed");
    }
}

/// One animation step. Loops left over from an earlier mount stop here.
fn on_frame(generation: u64, ts: f64) -> bool {
    if STATE.try_with(StateCell::generation).ok() != Some(generation) {
        return false;
    }
    with_state(|s| {
        s.now = Time::from_millis(ts);
        if s.globe.frame(s.now) {
            let svg = s.globe.render().to_svg();
            dom::set_html(&s.config.globe_container, &svg);
        }
        let tooltip = s.globe.tooltip().map(str::to_string);
        if tooltip != s.shown_tooltip {
            dom::set_tooltip(&s.config.tooltip_container, tooltip.as_deref());
            s.shown_tooltip = tooltip;
        }
        if s.radar.spot_count() > 0 {
            let svg = s.radar.render(s.now).to_svg();
            dom::set_html(&s.config.radar_container, &svg);
        }
        true
    })
}

fn install_globe_listeners(el: &web_sys::Element) -> Result<Vec<dom::Listener>, JsValue> {
    let mut listeners = Vec::with_capacity(6);
    listeners.push(dom::listen_pointer(el, "pointerdown", |e: PointerEvent| {
        with_state(|s| {
            s.drag.press(f64::from(e.client_x()), f64::from(e.client_y()));
            s.globe.pointer_down();
        })
    })?);
    listeners.push(dom::listen_pointer(el, "pointermove", |e: PointerEvent| {
        with_state(|s| {
            if let Some((dx, dy)) = s.drag.move_to(f64::from(e.client_x()), f64::from(e.client_y())) {
                s.globe.pointer_move(dx, dy);
            }
        })
    })?);
    listeners.push(dom::listen_pointer(el, "pointerup", |e: PointerEvent| {
        let (role, index) = dom::target_attrs(&e);
        change_state(|s| {
            s.globe.pointer_up();
            if !s.drag.release() {
                return false;
            }
            let Some(scene::globe::HoverTarget::Region(i)) = hover_target(role.as_deref(), index.as_deref())
            else {
                return false;
            };
            s.globe.click_region(i);
            for event in s.globe.drain_events() {
                let GlobeEvent::RegionSelected(name) = event.payload;
                s.orchestrator.select_region(&name);
            }
            sync_page(s);
            true
        });
    })?);
    listeners.push(dom::listen_pointer(el, "pointerleave", |_e: PointerEvent| {
        with_state(|s| {
            s.drag.release();
            s.globe.pointer_up();
        })
    })?);
    listeners.push(dom::listen_pointer(el, "pointerover", |e: PointerEvent| {
        let (role, index) = dom::target_attrs(&e);
        if let Some(target) = hover_target(role.as_deref(), index.as_deref()) {
            with_state(|s| s.globe.hover(target));
        }
    })?);
    listeners.push(dom::listen_pointer(el, "pointerout", |e: PointerEvent| {
        let (role, index) = dom::target_attrs(&e);
        if let Some(target) = hover_target(role.as_deref(), index.as_deref()) {
            with_state(|s| s.globe.leave(target));
        }
    })?);
    Ok(listeners)
}

fn load_world(url: String) {
    let cached = WORLD.with(|w| {
        let mut w = w.borrow_mut();
        match &*w {
            WorldStatus::NotRequested => {
                *w = WorldStatus::Loading;
                None
            }
            WorldStatus::Loaded(regions) => Some(Some(regions.clone())),
            WorldStatus::Loading | WorldStatus::Failed => Some(None),
        }
    });
    match cached {
        Some(Some(regions)) => with_state(|s| s.globe.set_regions(regions)),
        Some(None) => {}
        None => spawn_local(async move {
            match fetch_regions(&url).await {
                Ok(regions) => {
                    WORLD.with(|w| *w.borrow_mut() = WorldStatus::Loaded(regions.clone()));
                    with_state(|s| s.globe.set_regions(regions));
                }
                Err(e) => {
                    tracing::warn!(error = %e, url = %url, "world boundaries unavailable; drawing sphere only");
                    WORLD.with(|w| *w.borrow_mut() = WorldStatus::Failed);
                }
            }
        }),
    }
}

async fn fetch_regions(url: &str) -> Result<RegionSet, String> {
    let resp = Request::get(url).send().await.map_err(|e| e.to_string())?;
    if !resp.ok() {
        return Err(format!("HTTP {}", resp.status()));
    }
    let text = resp.text().await.map_err(|e| e.to_string())?;
    formats::decode_regions(&text).map_err(|e| e.to_string())
}
