use crate::tui::component::Component;
use crate::tui::components::{INPUT_HEIGHT, TitleBar};
use crate::tui::controller::Controller;

use ratatui::Frame;
use ratatui::layout::{Constraint, Layout, Rect};

/// Split the screen into title bar, conversation viewport and input box.
pub fn layout(area: Rect) -> [Rect; 3] {
    use Constraint::{Length, Min};
    Layout::vertical([Length(1), Min(0), Length(INPUT_HEIGHT)]).areas(area)
}

pub fn draw_ui(frame: &mut Frame, controller: &mut Controller) {
    let [title_area, main_area, input_area] = layout(frame.area());

    let has_unseen_content = !controller.viewport.is_at_bottom();
    TitleBar::new(
        controller.model_name(),
        controller.status_message(),
        has_unseen_content,
    )
    .render(frame, title_area);

    controller.viewport.render(frame, main_area);
    controller.input_box.render(frame, input_area);
}
