//! Layer control panel: visibility, opacity and risk legend.

use crossterm::event::{KeyCode, KeyEvent};
use ratatui::{
    layout::{Constraint, Layout, Rect},
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, List, ListItem, ListState, Paragraph},
    Frame,
};

use crate::services::panel::PanelRow;
use crate::services::symbology::legend;

use super::component::Component;
use super::Theme;

/// Opacity change per key press.
pub const OPACITY_STEP: f64 = 0.1;

/// Events emitted by the layer panel.
#[derive(Debug, Clone, PartialEq)]
pub enum PanelEvent {
    /// Toggle visibility of the layer
    ToggleVisibility(String),
    /// Set the layer opacity
    SetOpacity(String, f64),
}

/// Layer panel view state.
#[derive(Debug, Clone, Default)]
pub struct LayerPanelView {
    rows: Vec<PanelRow>,
    selected: usize,
}

impl LayerPanelView {
    /// Replaces the rows, keeping the selection in range.
    pub fn set_rows(&mut self, rows: Vec<PanelRow>) {
        self.rows = rows;
        self.selected = self.selected.min(self.rows.len().saturating_sub(1));
    }

    /// Index of the selected row.
    #[must_use]
    pub const fn selected(&self) -> usize {
        self.selected
    }

    /// The selected row, if any.
    #[must_use]
    pub fn selected_row(&self) -> Option<&PanelRow> {
        self.rows.get(self.selected)
    }

    fn select_next(&mut self) {
        if !self.rows.is_empty() {
            self.selected = (self.selected + 1) % self.rows.len();
        }
    }

    fn select_previous(&mut self) {
        if !self.rows.is_empty() {
            self.selected = self
                .selected
                .checked_sub(1)
                .unwrap_or(self.rows.len() - 1);
        }
    }

    fn row_item(row: &PanelRow, theme: &Theme) -> ListItem<'static> {
        let checkbox = if row.visible { "[x]" } else { "[ ]" };
        let name_style = if row.visible {
            Style::default().fg(theme.text)
        } else {
            Style::default().fg(theme.text_muted)
        };

        let mut spans = vec![
            Span::styled(format!("{checkbox} "), name_style),
            Span::styled("■ ", Style::default().fg(row.color.to_ratatui_color())),
            Span::styled(row.name.clone(), name_style),
            Span::styled(
                format!(" {:>3.0}%", row.opacity * 100.0),
                Style::default().fg(theme.text_muted),
            ),
        ];
        if row.exceeding_count > 0 {
            spans.push(Span::styled(
                format!(" !{}", row.exceeding_count),
                Style::default().fg(theme.warning),
            ));
        }
        ListItem::new(Line::from(spans))
    }
}

impl Component for LayerPanelView {
    type Event = PanelEvent;

    fn handle_input(&mut self, key: KeyEvent) -> Option<Self::Event> {
        match key.code {
            KeyCode::Tab => {
                self.select_next();
                None
            }
            KeyCode::BackTab => {
                self.select_previous();
                None
            }
            KeyCode::Char(' ') => self
                .selected_row()
                .map(|row| PanelEvent::ToggleVisibility(row.id.clone())),
            KeyCode::Char('+' | '=') => self
                .selected_row()
                .map(|row| PanelEvent::SetOpacity(row.id.clone(), row.opacity + OPACITY_STEP)),
            KeyCode::Char('-') => self
                .selected_row()
                .map(|row| PanelEvent::SetOpacity(row.id.clone(), row.opacity - OPACITY_STEP)),
            _ => None,
        }
    }

    fn render(&self, f: &mut Frame, area: Rect, theme: &Theme) {
        let legend_entries = legend();
        let legend_height = u16::try_from(legend_entries.len()).unwrap_or(u16::MAX) + 2;
        let [layers_area, legend_area] =
            Layout::vertical([Constraint::Min(3), Constraint::Length(legend_height)]).areas(area);

        let items: Vec<ListItem> = self.rows.iter().map(|row| Self::row_item(row, theme)).collect();
        let list = List::new(items)
            .block(
                Block::default()
                    .borders(Borders::ALL)
                    .title(" Layers ")
                    .border_style(Style::default().fg(theme.primary)),
            )
            .highlight_style(
                Style::default()
                    .bg(theme.highlight_bg)
                    .fg(theme.accent)
                    .add_modifier(Modifier::BOLD),
            );
        let mut state = ListState::default();
        if !self.rows.is_empty() {
            state.select(Some(self.selected));
        }
        f.render_stateful_widget(list, layers_area, &mut state);

        let legend_lines: Vec<Line> = legend_entries
            .iter()
            .map(|entry| {
                Line::from(vec![
                    Span::styled("■ ", Style::default().fg(entry.color.to_ratatui_color())),
                    Span::styled(entry.label, Style::default().fg(theme.text)),
                ])
            })
            .collect();
        f.render_widget(
            Paragraph::new(legend_lines).block(
                Block::default()
                    .borders(Borders::ALL)
                    .title(" Risk ")
                    .border_style(Style::default().fg(theme.primary)),
            ),
            legend_area,
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{LayerType, RiskLayer};
    use crate::services::panel::panel_rows;
    use crossterm::event::KeyModifiers;

    fn key(code: KeyCode) -> KeyEvent {
        KeyEvent::new(code, KeyModifiers::NONE)
    }

    fn view() -> LayerPanelView {
        let layers = vec![
            RiskLayer::new("A", "Alpha", LayerType::Deformation, 1).unwrap(),
            RiskLayer::new("B", "Beta", LayerType::Overstep, 3)
                .unwrap()
                .with_opacity(0.5),
        ];
        let mut view = LayerPanelView::default();
        view.set_rows(panel_rows(&layers));
        view
    }

    #[test]
    fn test_selection_wraps() {
        let mut view = view();
        assert_eq!(view.handle_input(key(KeyCode::Tab)), None);
        assert_eq!(view.selected(), 1);
        view.handle_input(key(KeyCode::Tab));
        assert_eq!(view.selected(), 0);
        view.handle_input(key(KeyCode::BackTab));
        assert_eq!(view.selected(), 1);
    }

    #[test]
    fn test_toggle_and_opacity_events() {
        let mut view = view();
        assert_eq!(
            view.handle_input(key(KeyCode::Char(' '))),
            Some(PanelEvent::ToggleVisibility("A".to_string()))
        );

        view.handle_input(key(KeyCode::Tab));
        match view.handle_input(key(KeyCode::Char('-'))) {
            Some(PanelEvent::SetOpacity(id, opacity)) => {
                assert_eq!(id, "B");
                assert!((opacity - 0.4).abs() < 1e-12);
            }
            other => panic!("unexpected event: {other:?}"),
        }
    }

    #[test]
    fn test_rows_shrinking_keeps_selection_valid() {
        let mut view = view();
        view.handle_input(key(KeyCode::Tab));
        view.set_rows(Vec::new());
        assert_eq!(view.selected(), 0);
        assert!(view.handle_input(key(KeyCode::Char(' '))).is_none());
    }
}
