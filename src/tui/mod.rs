//! Terminal map viewer.
//!
//! Hosts a [`RiskMap`] on a [`CanvasSurface`]. The viewer plays the role of
//! the host application: it owns the [`LayerStore`], receives panel
//! notifications through the map callbacks, applies them, and passes the
//! updated layer array back to the map.

pub mod component;
pub mod layer_panel;
pub mod map_canvas;
pub mod theme;

use std::cell::RefCell;
use std::io;
use std::rc::Rc;
use std::time::Duration;

use anyhow::{Context, Result};
use crossterm::{
    event::{
        self, DisableMouseCapture, EnableMouseCapture, Event, KeyCode, KeyEvent, KeyEventKind,
        MouseButton, MouseEvent, MouseEventKind,
    },
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::{
    backend::CrosstermBackend,
    layout::{Constraint, Layout, Rect},
    style::Style,
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph},
    Frame, Terminal,
};
use tracing::debug;

use crate::config::Config;
use crate::models::{RiskLayer, ScreenPoint};
use crate::services::interaction::PointerKind;
use crate::services::panel::{LayerStore, PanelChange};
use crate::surface::{MapCallbacks, RiskMap, SurfaceInput};

pub use component::Component;
pub use layer_panel::{LayerPanelView, PanelEvent};
pub use map_canvas::{CanvasContainer, CanvasSurface};
pub use theme::Theme;

/// Width of the layer panel in columns.
const PANEL_WIDTH: u16 = 38;
/// Height of the status area in rows.
const STATUS_HEIGHT: u16 = 9;
/// Zoom factor per mouse wheel notch.
const WHEEL_ZOOM: f64 = 1.25;

const HELP: &str =
    "Tab select  Space toggle  +/- opacity  arrows pan  z/x zoom  r reset  l panel  f fullscreen  q quit";

/// Screen areas of one frame.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct FrameAreas {
    map: Rect,
    map_inner: Rect,
    panel: Option<Rect>,
    status: Rect,
}

fn split_frame(area: Rect, panel_open: bool) -> FrameAreas {
    let [main, status] =
        Layout::vertical([Constraint::Min(3), Constraint::Length(STATUS_HEIGHT)]).areas(area);
    let (map, panel) = if panel_open {
        let [map, panel] =
            Layout::horizontal([Constraint::Min(10), Constraint::Length(PANEL_WIDTH)]).areas(main);
        (map, Some(panel))
    } else {
        (main, None)
    };
    FrameAreas {
        map,
        map_inner: map_block().inner(map),
        panel,
        status,
    }
}

fn map_block() -> Block<'static> {
    Block::default().borders(Borders::ALL).title(" Risk map ")
}

/// Viewer state: the mounted map plus the host-side layer store.
pub struct ViewApp {
    map: RiskMap<CanvasSurface>,
    store: LayerStore,
    changes: Rc<RefCell<Vec<PanelChange>>>,
    last_click: Rc<RefCell<Option<String>>>,
    panel_view: LayerPanelView,
    areas: FrameAreas,
    theme: Theme,
    status: Option<String>,
    should_quit: bool,
}

impl ViewApp {
    /// Mounts the map into the terminal area `area`.
    pub fn new(layers: Vec<RiskLayer>, config: &Config, area: Rect) -> Result<Self> {
        let changes: Rc<RefCell<Vec<PanelChange>>> = Rc::default();
        let last_click: Rc<RefCell<Option<String>>> = Rc::default();
        let areas = split_frame(area, true);

        let visibility_sink = Rc::clone(&changes);
        let opacity_sink = Rc::clone(&changes);
        let click_sink = Rc::clone(&last_click);
        let callbacks = MapCallbacks {
            on_layer_visibility_change: Some(Box::new(move |layer_id, visible| {
                visibility_sink.borrow_mut().push(PanelChange::Visibility {
                    layer_id: layer_id.to_string(),
                    visible,
                });
            })),
            on_layer_opacity_change: Some(Box::new(move |layer_id, opacity| {
                opacity_sink.borrow_mut().push(PanelChange::Opacity {
                    layer_id: layer_id.to_string(),
                    opacity,
                });
            })),
            on_point_click: Some(Box::new(move |point, layer| {
                *click_sink.borrow_mut() = Some(format!(
                    "Selected {} point at {:.6}, {:.6} (value {})",
                    layer.name,
                    point.lon(),
                    point.lat(),
                    point.value
                ));
            })),
            on_point_hover: None,
        };

        let store: LayerStore = layers.into_iter().collect();
        let container = CanvasContainer {
            area: areas.map_inner,
            hit_tolerance: config.interaction.hit_tolerance,
        };
        let map = RiskMap::mount(container, store.layers(), callbacks, config)
            .context("Failed to mount map")?;

        let mut panel_view = LayerPanelView::default();
        panel_view.set_rows(map.panel_rows());

        Ok(Self {
            map,
            store,
            changes,
            last_click,
            panel_view,
            areas,
            theme: Theme::default(),
            status: None,
            should_quit: false,
        })
    }

    /// Whether the user asked to quit.
    #[must_use]
    pub const fn should_quit(&self) -> bool {
        self.should_quit
    }

    /// Recomputes the layout for a terminal area and resizes the map.
    pub fn layout(&mut self, area: Rect) {
        let areas = split_frame(area, self.map.panel_open());
        if areas.map_inner != self.areas.map_inner && !areas.map_inner.is_empty() {
            self.map
                .dispatch(SurfaceInput::Resize(map_canvas::screen_rect_for(areas.map_inner)));
        }
        self.areas = areas;
    }

    /// Applies queued panel notifications and hands the layers back.
    fn apply_changes(&mut self) {
        let changes: Vec<PanelChange> = self.changes.borrow_mut().drain(..).collect();
        if changes.is_empty() {
            return;
        }
        for change in &changes {
            self.store.apply(change);
        }
        debug!(count = changes.len(), "panel changes applied");
        self.map.set_layers(self.store.layers());
        self.panel_view.set_rows(self.map.panel_rows());
    }

    /// Handles a key press.
    pub fn handle_key(&mut self, key: KeyEvent) {
        if key.kind != KeyEventKind::Press {
            return;
        }
        let pan = match key.code {
            KeyCode::Char('q') | KeyCode::Esc => {
                self.should_quit = true;
                return;
            }
            KeyCode::Left => Some((1, 0)),
            KeyCode::Right => Some((-1, 0)),
            KeyCode::Up => Some((0, 1)),
            KeyCode::Down => Some((0, -1)),
            KeyCode::Char('z') => {
                self.map.zoom_in();
                None
            }
            KeyCode::Char('x') => {
                self.map.zoom_out();
                None
            }
            KeyCode::Char('r') => {
                self.map.reset_view();
                None
            }
            KeyCode::Char('l') => {
                self.map.toggle_panel();
                None
            }
            KeyCode::Char('f') => {
                if !self.map.request_fullscreen() {
                    self.status = Some("Fullscreen is not available in the terminal".to_string());
                }
                None
            }
            _ => {
                match self.panel_view.handle_input(key) {
                    Some(PanelEvent::ToggleVisibility(id)) => {
                        self.map.toggle_layer(&id);
                    }
                    Some(PanelEvent::SetOpacity(id, opacity)) => {
                        self.map.set_layer_opacity(&id, opacity);
                    }
                    None => {}
                }
                None
            }
        };
        if let Some((x, y)) = pan {
            self.map.pan_steps(x, y);
        }
        self.apply_changes();
    }

    /// Handles a mouse event over the map.
    pub fn handle_mouse(&mut self, mouse: MouseEvent) {
        let Some(position) =
            map_canvas::cell_to_screen(self.areas.map_inner, mouse.column, mouse.row)
        else {
            return;
        };
        match mouse.kind {
            MouseEventKind::Down(MouseButton::Left) => self.pointer(PointerKind::Click, position),
            MouseEventKind::Moved => self.pointer(PointerKind::Hover, position),
            MouseEventKind::ScrollUp => self.map.zoom_at(WHEEL_ZOOM, position),
            MouseEventKind::ScrollDown => self.map.zoom_at(1.0 / WHEEL_ZOOM, position),
            _ => {}
        }
    }

    fn pointer(&mut self, kind: PointerKind, position: ScreenPoint) {
        self.map.dispatch(SurfaceInput::Pointer { kind, position });
        if let Some(message) = self.last_click.borrow_mut().take() {
            self.status = Some(message);
        }
    }

    /// Draws one frame.
    pub fn render(&self, f: &mut Frame) {
        let areas = self.areas;
        let zoom = self.map.viewport().zoom();
        f.render_widget(
            map_block()
                .title_bottom(format!(" zoom {zoom:.2}x "))
                .border_style(Style::default().fg(self.theme.primary)),
            areas.map,
        );
        f.render_widget(self.map.surface(), areas.map_inner);

        if let Some(panel) = areas.panel {
            self.panel_view.render(f, panel, &self.theme);
        }
        self.render_status(f, areas.status);
    }

    fn render_status(&self, f: &mut Frame, area: Rect) {
        let mut lines: Vec<Line> = match self.map.tooltip() {
            Some(tooltip) => tooltip
                .lines()
                .into_iter()
                .map(|l| Line::from(Span::styled(l, Style::default().fg(self.theme.text))))
                .collect(),
            None => vec![Line::from(Span::styled(
                "Hover a monitoring point for details",
                Style::default().fg(self.theme.text_muted),
            ))],
        };
        if let Some(status) = &self.status {
            lines.push(Line::from(Span::styled(
                status.clone(),
                Style::default().fg(self.theme.accent),
            )));
        }

        f.render_widget(
            Paragraph::new(lines).block(
                Block::default()
                    .borders(Borders::ALL)
                    .title(" Point ")
                    .title_bottom(Line::from(HELP).style(Style::default().fg(self.theme.text_muted)))
                    .border_style(Style::default().fg(self.theme.primary)),
            ),
            area,
        );
    }
}

/// Setup terminal for TUI
pub fn setup_terminal() -> Result<Terminal<CrosstermBackend<io::Stdout>>> {
    enable_raw_mode().context("Failed to enable raw mode")?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen, EnableMouseCapture)
        .context("Failed to enter alternate screen")?;
    let backend = CrosstermBackend::new(stdout);
    let terminal = Terminal::new(backend).context("Failed to create terminal")?;
    Ok(terminal)
}

/// Restore terminal to normal state
pub fn restore_terminal(mut terminal: Terminal<CrosstermBackend<io::Stdout>>) -> Result<()> {
    disable_raw_mode().context("Failed to disable raw mode")?;
    execute!(
        terminal.backend_mut(),
        LeaveAlternateScreen,
        DisableMouseCapture
    )
    .context("Failed to leave alternate screen")?;
    terminal.show_cursor().context("Failed to show cursor")?;
    Ok(())
}

/// Main event loop
pub fn run_view(
    layers: Vec<RiskLayer>,
    config: &Config,
    terminal: &mut Terminal<CrosstermBackend<io::Stdout>>,
) -> Result<()> {
    let size = terminal.size().context("Failed to read terminal size")?;
    let mut app = ViewApp::new(layers, config, Rect::new(0, 0, size.width, size.height))?;

    loop {
        let size = terminal.size().context("Failed to read terminal size")?;
        app.layout(Rect::new(0, 0, size.width, size.height));

        terminal.draw(|f| app.render(f))?;

        // Poll for events with 100ms timeout
        if event::poll(Duration::from_millis(100))? {
            match event::read()? {
                Event::Key(key) => app.handle_key(key),
                Event::Mouse(mouse) => app.handle_mouse(mouse),
                // Terminal resized, layout is recomputed on the next loop
                _ => {}
            }
        }

        if app.should_quit() {
            break;
        }
    }

    Ok(())
}
