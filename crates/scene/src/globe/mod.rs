//! Interactive orthographic globe.
//!
//! [`Globe`] owns the region set, the view-state controller, the renderer and
//! the hover state. The host feeds it pointer input and animation frames and
//! reads back a [`SceneGraph`] plus [`GlobeEvent`]s.

mod interaction;
mod renderer;

pub use interaction::*;
pub use renderer::*;

use foundation::math::{GeoCoord, Viewport};
use foundation::time::Time;
use runtime::{Event, EventBus, Frame};

use crate::components::RegionSet;
use crate::graph::SceneGraph;
use crate::view_state::{ViewConfig, ViewMode, ViewStateController};

#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct GlobeConfig {
    pub view: ViewConfig,
}

#[derive(Debug, Clone, Default, PartialEq)]
struct Endpoint {
    coord: Option<GeoCoord>,
    label: Option<String>,
}

#[derive(Debug)]
pub struct Globe {
    viewport: Viewport,
    regions: RegionSet,
    view: ViewStateController,
    renderer: GlobeRenderer,
    origin: Endpoint,
    destination: Endpoint,
    tooltip: Tooltip,
    events: EventBus<GlobeEvent>,
    frame: Option<Frame>,
    graph: SceneGraph,
    /// Set when something other than the rotation changed since the last render.
    dirty: bool,
}

impl Globe {
    pub fn new(config: GlobeConfig, container_width: f64) -> Self {
        let viewport = Viewport::for_container(container_width);
        Self {
            view: ViewStateController::new(config.view, viewport.globe_scale()),
            graph: SceneGraph::new(viewport.width, viewport.height),
            viewport,
            regions: RegionSet::default(),
            renderer: GlobeRenderer::new(),
            origin: Endpoint::default(),
            destination: Endpoint::default(),
            tooltip: Tooltip::default(),
            events: EventBus::new(),
            frame: None,
            dirty: true,
        }
    }

    pub fn viewport(&self) -> Viewport {
        self.viewport
    }

    pub fn view(&self) -> &ViewStateController {
        &self.view
    }

    pub fn regions(&self) -> &RegionSet {
        &self.regions
    }

    pub fn mode(&self) -> ViewMode {
        self.view.mode()
    }

    fn now(&self) -> Time {
        self.frame.map(|f| f.time).unwrap_or_default()
    }

    pub fn resize(&mut self, container_width: f64) {
        self.viewport = Viewport::for_container(container_width);
        self.view.set_scale(self.viewport.globe_scale());
        self.graph.resize(self.viewport.width, self.viewport.height);
        self.dirty = true;
    }

    /// Installs the world boundaries. Called once when they finish loading.
    pub fn set_regions(&mut self, regions: RegionSet) {
        tracing::info!(count = regions.len(), "globe regions loaded");
        self.regions = regions;
        self.tooltip.clear();
        self.dirty = true;
    }

    /// Updates the route endpoints and their tooltip labels.
    ///
    /// Changing a coordinate restarts the marker animations and, unless a
    /// query is loading, eases the view toward the route.
    pub fn set_route(
        &mut self,
        origin: Option<GeoCoord>,
        destination: Option<GeoCoord>,
        origin_label: Option<String>,
        destination_label: Option<String>,
    ) {
        let coords_changed = self.origin.coord != origin || self.destination.coord != destination;
        self.origin = Endpoint {
            coord: origin,
            label: origin_label,
        };
        self.destination = Endpoint {
            coord: destination,
            label: destination_label,
        };
        if coords_changed {
            self.renderer.reset_markers(origin, destination, self.now());
            self.view.focus_route(origin, destination);
            if matches!(self.tooltip.target(), Some(HoverTarget::Origin | HoverTarget::Destination)) {
                self.tooltip.clear();
            }
        }
        self.dirty = true;
    }

    /// Loading spins the globe; finishing eases to the current route.
    pub fn set_loading(&mut self, loading: bool) {
        if self.view.is_loading() == loading {
            return;
        }
        self.view.set_loading(loading);
        if !loading {
            self.view.focus_route(self.origin.coord, self.destination.coord);
        }
        self.dirty = true;
    }

    pub fn hover(&mut self, target: HoverTarget) {
        let text = match target {
            HoverTarget::Region(index) => match self.regions.get(index) {
                Some(region) => region.name.clone(),
                None => return,
            },
            HoverTarget::Origin => self.origin.label.clone().unwrap_or_else(|| "Origin".into()),
            HoverTarget::Destination => self
                .destination
                .label
                .clone()
                .unwrap_or_else(|| "Destination".into()),
        };
        self.tooltip.show(target, text);
        self.dirty = true;
    }

    pub fn leave(&mut self, target: HoverTarget) {
        self.tooltip.leave(target);
        self.dirty = true;
    }

    pub fn tooltip(&self) -> Option<&str> {
        self.tooltip.text()
    }

    /// Reports the region and starts centering on it.
    pub fn click_region(&mut self, index: usize) -> Option<&str> {
        let region = self.regions.get(index)?;
        let frame = self.frame.unwrap_or_else(|| Frame::first(Time::default()));
        self.events
            .emit(frame, GlobeEvent::RegionSelected(region.name.clone()));
        match region.geometry.centroid() {
            Some(c) => self.view.focus_point(c),
            None => tracing::warn!(region = %region.name, "region has no centroid"),
        }
        Some(region.name.as_str())
    }

    pub fn drain_events(&mut self) -> Vec<Event<GlobeEvent>> {
        self.events.drain()
    }

    pub fn pointer_down(&mut self) {
        self.view.begin_drag();
    }

    pub fn pointer_move(&mut self, dx: f64, dy: f64) {
        if self.view.drag(dx, dy) {
            self.dirty = true;
        }
    }

    pub fn pointer_up(&mut self) {
        self.view.end_drag();
    }

    /// Advances to the animation frame at `now`. Returns `true` when the
    /// globe should be re-rendered.
    pub fn frame(&mut self, now: Time) -> bool {
        let frame = match self.frame {
            Some(f) => f.advance_to(now),
            None => Frame::first(now),
        };
        self.frame = Some(frame);
        let rotated = self.view.tick(frame);
        let animated = self.renderer.active_tasks() > 0;
        rotated || animated || std::mem::take(&mut self.dirty)
    }

    pub fn render(&mut self) -> &SceneGraph {
        let projection = self.viewport.orthographic(self.view.rotation());
        let hovered_region = match self.tooltip.target() {
            Some(HoverTarget::Region(i)) => Some(i),
            _ => None,
        };
        let frame = GlobeFrame {
            projection: &projection,
            regions: &self.regions,
            origin: self.origin.coord,
            destination: self.destination.coord,
            origin_label: self.origin.label.as_deref(),
            destination_label: self.destination.label.as_deref(),
            hovered_region,
            now: self.now(),
        };
        self.renderer.render(&mut self.graph, &frame);
        self.dirty = false;
        &self.graph
    }

    /// Stops every animation. The globe draws nothing moving afterwards.
    pub fn unmount(&mut self) {
        self.view.teardown();
        self.renderer.teardown();
        self.tooltip.clear();
        self.events.drain();
        tracing::debug!("globe unmounted");
    }
}
