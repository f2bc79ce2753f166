//! UI module for rendering the TUI

mod field_renderer;
mod form_view;
mod layout;

use crate::app::App;
use ratatui::Frame;

/// Main draw function
pub fn draw(frame: &mut Frame, app: &App) {
    let (sidebar_area, main_area) = layout::create_layout(frame.area());

    layout::draw_sidebar(frame, sidebar_area, app);
    form_view::draw(frame, main_area, app);
    layout::draw_status_bar(frame, app);
}
