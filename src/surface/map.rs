//! The map component: owns a surface, composes layers, routes events.
//!
//! Mounting acquires the surface and registers the click, hover and resize
//! handlers. Dropping the map removes every handler and disposes the surface
//! exactly once. Every state change recomposes the full layer array and
//! pushes it with `replace = true`.

use std::cell::{Ref, RefCell};
use std::fmt;
use std::rc::Rc;

use tracing::{debug, info};

use crate::config::Config;
use crate::models::{Composition, RiskLayer, RiskPoint, ScreenPoint};
use crate::services::compositor::compose_with;
use crate::services::interaction::{InteractionController, PointCallbacks, Tooltip};
use crate::services::panel::{panel_rows, LayerPanel, PanelCallbacks, PanelChange, PanelRow};
use crate::services::symbology::Symbology;
use crate::services::viewport::{GeoExtent, Viewport};

use super::{EventKind, HandlerId, RenderSurface, SurfaceEvent, SurfaceInput};

/// Optional host callbacks.
#[derive(Default)]
pub struct MapCallbacks {
    /// Panel visibility toggle: `(layer_id, visible)`
    pub on_layer_visibility_change: Option<Box<dyn FnMut(&str, bool)>>,
    /// Panel opacity edit: `(layer_id, opacity)`
    pub on_layer_opacity_change: Option<Box<dyn FnMut(&str, f64)>>,
    /// Point marker clicked
    pub on_point_click: Option<Box<dyn FnMut(&RiskPoint, &RiskLayer)>>,
    /// Point marker hovered
    pub on_point_hover: Option<Box<dyn FnMut(&Tooltip)>>,
}

impl fmt::Debug for MapCallbacks {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MapCallbacks")
            .field("on_layer_visibility_change", &self.on_layer_visibility_change.is_some())
            .field("on_layer_opacity_change", &self.on_layer_opacity_change.is_some())
            .field("on_point_click", &self.on_point_click.is_some())
            .field("on_point_hover", &self.on_point_hover.is_some())
            .finish()
    }
}

impl MapCallbacks {
    fn split(self) -> (PanelCallbacks, PointCallbacks) {
        (
            PanelCallbacks {
                on_layer_visibility_change: self.on_layer_visibility_change,
                on_layer_opacity_change: self.on_layer_opacity_change,
            },
            PointCallbacks {
                on_point_click: self.on_point_click,
                on_point_hover: self.on_point_hover,
            },
        )
    }
}

/// State shared between the map and its surface handlers.
#[derive(Debug)]
struct Scene {
    layers: Vec<RiskLayer>,
    viewport: Viewport,
    composition: Composition,
    interaction: InteractionController,
    dirty: bool,
}

/// Risk map bound to a rendering surface.
pub struct RiskMap<S: RenderSurface> {
    surface: S,
    scene: Rc<RefCell<Scene>>,
    panel: LayerPanel,
    symbology: Symbology,
    fit_extent: bool,
    padding_ratio: f64,
    pan_step: f64,
    handlers: Vec<(EventKind, HandlerId)>,
}

impl<S: RenderSurface> fmt::Debug for RiskMap<S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RiskMap")
            .field("scene", &self.scene)
            .field("panel", &self.panel)
            .field("handlers", &self.handlers.len())
            .finish_non_exhaustive()
    }
}

impl<S: RenderSurface> RiskMap<S> {
    /// Acquires a surface for `container`, registers handlers and renders
    /// the first frame.
    pub fn mount(
        container: S::Container,
        layers: Vec<RiskLayer>,
        callbacks: MapCallbacks,
        config: &Config,
    ) -> anyhow::Result<Self> {
        let mut surface = S::init(container)?;
        let screen = surface.resize().unwrap_or_default();
        let viewport = Viewport::for_layers(&layers, screen, &config.map);
        let (panel_callbacks, point_callbacks) = callbacks.split();

        let scene = Rc::new(RefCell::new(Scene {
            layers,
            viewport,
            composition: Composition::default(),
            interaction: InteractionController::new(
                point_callbacks,
                config.tooltip.coordinate_precision,
            ),
            dirty: true,
        }));

        let mut handlers = Vec::with_capacity(3);
        for kind in [EventKind::Click, EventKind::Hover] {
            let scene = Rc::clone(&scene);
            let id = surface.on(
                kind,
                Box::new(move |event| {
                    if let SurfaceEvent::Pointer {
                        kind, primitive, ..
                    } = event
                    {
                        let mut scene = scene.borrow_mut();
                        let Scene {
                            layers,
                            composition,
                            interaction,
                            ..
                        } = &mut *scene;
                        interaction.handle(*kind, *primitive, composition, layers);
                    }
                }),
            );
            handlers.push((kind, id));
        }

        let resize_scene = Rc::clone(&scene);
        let id = surface.on(
            EventKind::Resize,
            Box::new(move |event| {
                if let SurfaceEvent::Resized(screen) = event {
                    let mut scene = resize_scene.borrow_mut();
                    if scene.viewport.resize(*screen) {
                        scene.dirty = true;
                    }
                }
            }),
        );
        handlers.push((EventKind::Resize, id));

        let mut map = Self {
            surface,
            scene,
            panel: LayerPanel::new(panel_callbacks),
            symbology: Symbology::from(&config.symbology),
            fit_extent: config.map.extent.is_none(),
            padding_ratio: config.map.padding_ratio,
            pan_step: config.map.pan_step,
            handlers,
        };
        map.flush();
        info!(
            layers = map.scene.borrow().layers.len(),
            width = screen.width,
            height = screen.height,
            "map mounted"
        );
        Ok(map)
    }

    /// The underlying surface.
    pub const fn surface(&self) -> &S {
        &self.surface
    }

    /// Layers of the current pass.
    pub fn layers(&self) -> Ref<'_, [RiskLayer]> {
        Ref::map(self.scene.borrow(), |scene| scene.layers.as_slice())
    }

    /// Last pushed render description.
    pub fn composition(&self) -> Ref<'_, Composition> {
        Ref::map(self.scene.borrow(), |scene| &scene.composition)
    }

    /// Current view.
    pub fn viewport(&self) -> Viewport {
        self.scene.borrow().viewport.clone()
    }

    /// Tooltip of the hovered point, if any.
    pub fn tooltip(&self) -> Option<Tooltip> {
        self.scene.borrow().interaction.tooltip().cloned()
    }

    /// Replaces the layer array (the host's next pass) and recomposes.
    ///
    /// Unless an extent is configured, the extent is refitted to the new
    /// layers; zoom and pan are kept.
    pub fn set_layers(&mut self, layers: Vec<RiskLayer>) {
        {
            let mut scene = self.scene.borrow_mut();
            if self.fit_extent {
                if let Some(extent) = GeoExtent::from_layers(&layers, self.padding_ratio) {
                    scene.viewport.set_extent(extent);
                }
            }
            scene.layers = layers;
            scene.interaction.clear_tooltip();
            scene.dirty = true;
        }
        self.flush();
    }

    /// Replaces every host callback.
    pub fn set_callbacks(&mut self, callbacks: MapCallbacks) {
        let (panel_callbacks, point_callbacks) = callbacks.split();
        self.panel.set_callbacks(panel_callbacks);
        self.scene.borrow_mut().interaction.set_callbacks(point_callbacks);
    }

    /// Feeds raw input to the surface and re-renders if it changed the view.
    pub fn dispatch(&mut self, input: SurfaceInput) {
        self.surface.emit(input);
        self.flush();
    }

    /// Re-measures the container and re-renders at the new size.
    pub fn resize(&mut self) {
        if let Some(screen) = self.surface.resize() {
            let applied = self.scene.borrow_mut().viewport.resize(screen);
            if applied {
                self.scene.borrow_mut().dirty = true;
                self.flush();
            }
        }
    }

    /// Zooms one step in around the screen centre.
    pub fn zoom_in(&mut self) {
        self.update_view(Viewport::zoom_in);
    }

    /// Zooms one step out around the screen centre.
    pub fn zoom_out(&mut self) {
        self.update_view(Viewport::zoom_out);
    }

    /// Zooms by `factor` keeping `anchor` fixed.
    pub fn zoom_at(&mut self, factor: f64, anchor: ScreenPoint) {
        self.update_view(|viewport| viewport.zoom_at(factor, anchor));
    }

    /// Pans by a screen offset.
    pub fn pan_by(&mut self, dx: f64, dy: f64) {
        self.update_view(|viewport| viewport.pan_by(dx, dy));
    }

    /// Pans by whole keyboard steps (`-1`, `0` or `1` per axis).
    pub fn pan_steps(&mut self, x_steps: i8, y_steps: i8) {
        let step = self.pan_step;
        self.pan_by(f64::from(x_steps) * step, f64::from(y_steps) * step);
    }

    /// Restores the unzoomed, unpanned view.
    pub fn reset_view(&mut self) {
        self.update_view(Viewport::reset);
    }

    /// Requests the inverse visibility of a layer from the host.
    pub fn toggle_layer(&mut self, layer_id: &str) -> Option<PanelChange> {
        let scene = self.scene.borrow();
        self.panel.toggle_layer(&scene.layers, layer_id)
    }

    /// Requests a new layer opacity from the host.
    pub fn set_layer_opacity(&mut self, layer_id: &str, opacity: f64) -> Option<PanelChange> {
        let scene = self.scene.borrow();
        self.panel.set_layer_opacity(&scene.layers, layer_id, opacity)
    }

    /// Expands or collapses the layer panel. Returns the new state.
    pub fn toggle_panel(&mut self) -> bool {
        self.panel.toggle()
    }

    /// Whether the layer panel is expanded.
    pub const fn panel_open(&self) -> bool {
        self.panel.is_open()
    }

    /// Rows for the layer panel.
    pub fn panel_rows(&self) -> Vec<PanelRow> {
        panel_rows(&self.scene.borrow().layers)
    }

    /// Asks the surface for fullscreen display; a no-op when unsupported.
    pub fn request_fullscreen(&mut self) -> bool {
        let granted = self.surface.request_fullscreen();
        if !granted {
            debug!("fullscreen not supported by surface");
        }
        granted
    }

    fn update_view(&mut self, change: impl FnOnce(&mut Viewport)) {
        {
            let mut scene = self.scene.borrow_mut();
            change(&mut scene.viewport);
            scene.dirty = true;
        }
        self.flush();
    }

    /// Recomposes and pushes if anything changed since the last push.
    fn flush(&mut self) {
        let mut scene = self.scene.borrow_mut();
        if !scene.dirty {
            return;
        }
        let composition = compose_with(&scene.layers, &scene.viewport, &self.symbology);
        scene.composition = composition;
        scene.dirty = false;
        self.surface.set_option(&scene.composition, true);
    }
}

impl<S: RenderSurface> Drop for RiskMap<S> {
    fn drop(&mut self) {
        for (kind, id) in self.handlers.drain(..) {
            self.surface.off(kind, id);
        }
        self.surface.dispose();
        info!("map unmounted");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{LayerType, ScreenRect};
    use crate::services::interaction::PointerKind;
    use crate::surface::{RecordingContainer, RecordingSurface};

    fn layers() -> Vec<RiskLayer> {
        vec![RiskLayer::new("DEF-001", "Deformation-1", LayerType::Deformation, 1)
            .unwrap()
            .with_boundary("POLYGON ((87.6 43.7, 87.7 43.7, 87.7 43.8, 87.6 43.8))")
            .with_point(RiskPoint::new(87.65, 43.75, 12.0))]
    }

    fn container() -> RecordingContainer {
        RecordingContainer::new(ScreenRect::new(0.0, 0.0, 200.0, 200.0))
    }

    #[test]
    fn test_mount_pushes_first_frame() {
        let container = container();
        let log = Rc::clone(&container.log);
        let map: RiskMap<RecordingSurface> =
            RiskMap::mount(container, layers(), MapCallbacks::default(), &Config::default())
                .unwrap();

        assert_eq!(log.borrow().set_option_calls, vec![true]);
        assert_eq!(log.borrow().handlers_registered, 3);
        assert_eq!(map.composition().len(), 3);
        assert_eq!(map.surface().description(), &*map.composition());
    }

    #[test]
    fn test_drop_releases_once() {
        let container = container();
        let log = Rc::clone(&container.log);
        {
            let _map: RiskMap<RecordingSurface> =
                RiskMap::mount(container, layers(), MapCallbacks::default(), &Config::default())
                    .unwrap();
        }
        let log = log.borrow();
        assert_eq!(log.dispose_calls, 1);
        assert_eq!(log.handlers_removed, 3);
    }

    #[test]
    fn test_view_changes_recompose() {
        let container = container();
        let log = Rc::clone(&container.log);
        let mut map: RiskMap<RecordingSurface> =
            RiskMap::mount(container, layers(), MapCallbacks::default(), &Config::default())
                .unwrap();

        let before = map.composition().clone();
        map.zoom_in();
        assert_ne!(*map.composition(), before);
        map.reset_view();
        assert_eq!(*map.composition(), before);
        map.pan_steps(1, 0);
        assert_eq!(log.borrow().set_option_calls, vec![true; 4]);
    }

    #[test]
    fn test_resize_event_updates_viewport() {
        let mut map: RiskMap<RecordingSurface> =
            RiskMap::mount(container(), layers(), MapCallbacks::default(), &Config::default())
                .unwrap();

        let screen = ScreenRect::new(0.0, 0.0, 400.0, 100.0);
        map.dispatch(SurfaceInput::Resize(screen));
        assert_eq!(map.viewport().screen(), screen);
    }

    #[test]
    fn test_click_reaches_host() {
        let clicked = Rc::new(RefCell::new(None));
        let sink = Rc::clone(&clicked);
        let callbacks = MapCallbacks {
            on_point_click: Some(Box::new(move |point, layer| {
                *sink.borrow_mut() = Some((layer.id.clone(), point.value));
            })),
            ..MapCallbacks::default()
        };
        let mut map: RiskMap<RecordingSurface> =
            RiskMap::mount(container(), layers(), callbacks, &Config::default()).unwrap();

        let position = map.viewport().project([87.65, 43.75]);
        map.dispatch(SurfaceInput::Pointer {
            kind: PointerKind::Click,
            position,
        });
        assert_eq!(*clicked.borrow(), Some(("DEF-001".to_string(), 12.0)));
    }

    #[test]
    fn test_fullscreen_unsupported_is_noop() {
        let mut map: RiskMap<RecordingSurface> =
            RiskMap::mount(container(), layers(), MapCallbacks::default(), &Config::default())
                .unwrap();
        let before = map.composition().clone();
        assert!(!map.request_fullscreen());
        assert_eq!(*map.composition(), before);
    }
}
