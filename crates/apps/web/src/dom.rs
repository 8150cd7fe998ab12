//! Thin wrappers over the browser APIs the app touches.

use std::cell::RefCell;
use std::rc::Rc;

use wasm_bindgen::JsCast;
use wasm_bindgen::prelude::*;
use web_sys::{Element, Event, EventTarget, PointerEvent, Window};

/// Used before layout when a container reports no width.
const FALLBACK_WIDTH_PX: f64 = 800.0;

pub fn window() -> Result<Window, JsValue> {
    web_sys::window().ok_or_else(|| JsValue::from_str("no window"))
}

pub fn element(id: &str) -> Option<Element> {
    web_sys::window()?.document()?.get_element_by_id(id)
}

/// Replaces the content of `id`. Missing elements are skipped.
pub fn set_html(id: &str, html: &str) {
    match element(id) {
        Some(el) => el.set_inner_html(html),
        None => tracing::trace!(id, "element not found"),
    }
}

/// Shows `text` in `id`, or hides the element for `None`.
pub fn set_tooltip(id: &str, text: Option<&str>) {
    let Some(el) = element(id) else {
        return;
    };
    el.set_text_content(text);
    let display = if text.is_some() { "block" } else { "none" };
    let _ = el.set_attribute("style", &format!("display:{display}"));
}

pub fn container_width(id: &str) -> f64 {
    element(id)
        .map(|el| f64::from(el.client_width()))
        .filter(|w| *w > 0.0)
        .unwrap_or(FALLBACK_WIDTH_PX)
}

/// `data-role` and `data-index` of the nearest tagged ancestor of the event
/// target.
pub fn target_attrs(event: &web_sys::Event) -> (Option<String>, Option<String>) {
    let tagged = event
        .target()
        .and_then(|t| t.dyn_into::<Element>().ok())
        .and_then(|el| el.closest("[data-role]").ok().flatten());
    match tagged {
        Some(el) => (el.get_attribute("data-role"), el.get_attribute("data-index")),
        None => (None, None),
    }
}

/// An event listener that is detached when dropped.
pub struct Listener {
    target: EventTarget,
    name: &'static str,
    closure: Closure<dyn FnMut(Event)>,
}

impl Listener {
    fn attach(target: EventTarget, name: &'static str, closure: Closure<dyn FnMut(Event)>) -> Result<Self, JsValue> {
        target.add_event_listener_with_callback(name, closure.as_ref().unchecked_ref())?;
        Ok(Self { target, name, closure })
    }
}

impl Drop for Listener {
    fn drop(&mut self) {
        if let Err(e) = self
            .target
            .remove_event_listener_with_callback(self.name, self.closure.as_ref().unchecked_ref())
        {
            tracing::debug!(error = ?e, name = self.name, "could not detach listener");
        }
    }
}

pub fn listen_pointer(
    target: &Element,
    name: &'static str,
    mut handler: impl FnMut(PointerEvent) + 'static,
) -> Result<Listener, JsValue> {
    let closure = Closure::<dyn FnMut(Event)>::new(move |e: Event| {
        if let Ok(e) = e.dyn_into::<PointerEvent>() {
            handler(e);
        }
    });
    Listener::attach(target.clone().into(), name, closure)
}

pub fn listen_window(name: &'static str, mut handler: impl FnMut() + 'static) -> Result<Listener, JsValue> {
    let closure = Closure::<dyn FnMut(Event)>::new(move |_e: Event| handler());
    Listener::attach(window()?.into(), name, closure)
}

/// Calls `tick` with the frame timestamp (ms) on every animation frame until
/// it returns `false`.
pub fn animation_loop(mut tick: impl FnMut(f64) -> bool + 'static) -> Result<(), JsValue> {
    let slot: Rc<RefCell<Option<Closure<dyn FnMut(f64)>>>> = Rc::new(RefCell::new(None));
    let inner = slot.clone();
    *slot.borrow_mut() = Some(Closure::new(move |ts: f64| {
        if !tick(ts) {
            tracing::debug!("animation loop stopped");
            return;
        }
        if let Some(cb) = inner.borrow().as_ref() {
            if let Err(e) = request_frame(cb) {
                tracing::error!(error = ?e, "requestAnimationFrame failed");
            }
        }
    }));
    let first = slot.borrow();
    match first.as_ref() {
        Some(cb) => request_frame(cb).map(|_| ()),
        None => Ok(()),
    }
}

fn request_frame(cb: &Closure<dyn FnMut(f64)>) -> Result<i32, JsValue> {
    window()?.request_animation_frame(cb.as_ref().unchecked_ref())
}
