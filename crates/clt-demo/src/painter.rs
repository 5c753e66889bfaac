use crate::settings::Margins;
use dice::canvas::Shape;
use dice::{Anchor, Area, Paint, Point, Scene};
use eframe::egui;

// ------------------------------------------------------------------
// Colors
// ------------------------------------------------------------------

const BAR_COLOR: egui::Color32 = egui::Color32::from_rgb(39, 64, 139);
const SELECTED_COLOR: egui::Color32 = egui::Color32::from_rgb(255, 0, 255);
const CURRENT_COLOR: egui::Color32 = egui::Color32::from_rgb(0, 200, 0);
const SETTLED_COLOR: egui::Color32 = egui::Color32::from_rgb(0, 255, 255);
const GRID_COLOR: egui::Color32 = egui::Color32::from_rgb(220, 220, 220);
const INK_COLOR: egui::Color32 = egui::Color32::from_gray(40);
const LABEL_FONT_SIZE: f32 = 11.0;

/// Fill and outline a paint is rendered with.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Style {
    pub fill: Option<egui::Color32>,
    pub stroke: egui::Stroke,
}

pub fn style(paint: Paint) -> Style {
    let outline = egui::Stroke::new(0.5, INK_COLOR);
    match paint {
        Paint::Frame | Paint::Tick | Paint::Label => Style {
            fill: None,
            stroke: egui::Stroke::new(1.0, INK_COLOR),
        },
        Paint::GridLine => Style {
            fill: None,
            stroke: egui::Stroke::new(1.0, GRID_COLOR),
        },
        Paint::Bar => Style {
            fill: Some(BAR_COLOR),
            stroke: outline,
        },
        Paint::SelectedBar | Paint::HighlightedRoll => Style {
            fill: Some(SELECTED_COLOR),
            stroke: outline,
        },
        Paint::CurrentRoll => Style {
            fill: Some(CURRENT_COLOR),
            stroke: outline,
        },
        Paint::SettledRoll => Style {
            fill: Some(SETTLED_COLOR),
            stroke: outline,
        },
        Paint::Boundary => Style {
            fill: None,
            stroke: egui::Stroke::new(2.0, SELECTED_COLOR),
        },
    }
}

// ------------------------------------------------------------------
// Coordinates
// ------------------------------------------------------------------

/// Maps chart coordinates (origin bottom-left, `y` up) onto the screen
/// rectangle a chart was given.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ChartFrame {
    origin: egui::Pos2,
}

impl ChartFrame {
    pub fn new(rect: egui::Rect, margins: Margins) -> Self {
        Self {
            origin: egui::pos2(
                rect.left() + margins.left,
                rect.bottom() - margins.bottom,
            ),
        }
    }

    pub fn to_screen(&self, p: Point) -> egui::Pos2 {
        egui::pos2(
            self.origin.x + p.x as f32,
            self.origin.y - p.y as f32,
        )
    }

    pub fn to_chart(&self, pos: egui::Pos2) -> Point {
        Point::new(
            f64::from(pos.x - self.origin.x),
            f64::from(self.origin.y - pos.y),
        )
    }
}

// ------------------------------------------------------------------
// Painting
// ------------------------------------------------------------------

pub fn paint_scene(painter: &egui::Painter, frame: &ChartFrame, scene: &Scene) {
    for (_, figure) in scene.figures() {
        let style = style(figure.paint);
        match &figure.shape {
            Shape::Rect(r) => {
                let rect = egui::Rect::from_two_pos(
                    frame.to_screen(r.top_left()),
                    frame.to_screen(r.bottom_right()),
                );
                if let Some(fill) = style.fill {
                    painter.rect_filled(rect, 0.0, fill);
                }
                painter.rect_stroke(
                    rect,
                    0.0,
                    style.stroke,
                    egui::StrokeKind::Inside,
                );
            }
            Shape::Line { from, to } => {
                painter.line_segment(
                    [frame.to_screen(*from), frame.to_screen(*to)],
                    style.stroke,
                );
            }
            Shape::Text { text, at, anchor } => {
                let align = match anchor {
                    Anchor::Center => egui::Align2::CENTER_CENTER,
                    Anchor::Right => egui::Align2::RIGHT_CENTER,
                };
                painter.text(
                    frame.to_screen(*at),
                    align,
                    text,
                    egui::FontId::proportional(LABEL_FONT_SIZE),
                    style.stroke.color,
                );
            }
        }
    }
}

/// Allocate room for a chart, paint `scene` into it and return where a
/// click landed, in chart coordinates. The plot grows to fit figures
/// drawn above `plot.height`.
pub fn show_chart(
    ui: &mut egui::Ui,
    scene: &Scene,
    plot: Area,
    margins: Margins,
) -> Option<Point> {
    let plot_height = scene
        .bounds()
        .map_or(plot.height, |b| b.top.max(plot.height));
    let size = egui::vec2(
        margins.left + plot.width as f32 + margins.right,
        margins.top + plot_height as f32 + margins.bottom,
    );
    let (response, painter) = ui.allocate_painter(size, egui::Sense::click());
    let frame = ChartFrame::new(response.rect, margins);
    paint_scene(&painter, &frame, scene);

    if response.clicked() {
        response.interact_pointer_pos().map(|pos| frame.to_chart(pos))
    } else {
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_frame_flips_y() {
        let rect = egui::Rect::from_min_size(
            egui::pos2(10.0, 20.0),
            egui::vec2(450.0, 325.0),
        );
        let frame = ChartFrame::new(rect, Margins::new(25.0, 25.0, 10.0, 25.0));

        assert_eq!(frame.to_screen(Point::new(0.0, 0.0)), egui::pos2(35.0, 320.0));
        assert_eq!(
            frame.to_screen(Point::new(400.0, 290.0)),
            egui::pos2(435.0, 30.0)
        );
        assert_eq!(
            frame.to_chart(egui::pos2(135.0, 220.0)),
            Point::new(100.0, 100.0)
        );
    }

    #[test]
    fn test_roll_paints_are_told_apart() {
        let current = style(Paint::CurrentRoll).fill;
        let settled = style(Paint::SettledRoll).fill;
        let highlighted = style(Paint::HighlightedRoll).fill;
        assert_ne!(current, settled);
        assert_ne!(settled, highlighted);
        assert_eq!(highlighted, style(Paint::SelectedBar).fill);
        assert_eq!(style(Paint::Boundary).fill, None);
    }
}
