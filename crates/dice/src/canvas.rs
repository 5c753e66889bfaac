//! Drawing surface the charts talk to.
//!
//! Coordinates are chart coordinates: the origin is the bottom-left
//! corner of the plot area and `y` grows upward. Whatever actually puts
//! pixels on screen is responsible for flipping and offsetting.

use std::collections::BTreeMap;

#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

impl Point {
    pub const fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }
}

/// Axis-aligned rectangle, `bottom <= top`, `left <= right`.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Rect {
    pub left: f64,
    pub bottom: f64,
    pub right: f64,
    pub top: f64,
}

impl Rect {
    pub fn from_corners(a: Point, b: Point) -> Self {
        Self {
            left: a.x.min(b.x),
            right: a.x.max(b.x),
            bottom: a.y.min(b.y),
            top: a.y.max(b.y),
        }
    }

    pub fn top_left(&self) -> Point {
        Point::new(self.left, self.top)
    }

    pub fn bottom_right(&self) -> Point {
        Point::new(self.right, self.bottom)
    }

    pub fn width(&self) -> f64 {
        self.right - self.left
    }

    pub fn height(&self) -> f64 {
        self.top - self.bottom
    }

    pub fn center(&self) -> Point {
        Point::new(
            self.left + self.width() / 2.0,
            self.bottom + self.height() / 2.0,
        )
    }

    /// Hit test with `slack` extra units tolerated on every side.
    pub fn contains(&self, p: Point, slack: f64) -> bool {
        let center = self.center();
        let dx = (p.x - center.x).abs() - self.width() / 2.0;
        let dy = (p.y - center.y).abs() - self.height() / 2.0;
        dx <= slack && dy <= slack
    }

    pub fn union(&self, other: &Rect) -> Rect {
        Rect {
            left: self.left.min(other.left),
            bottom: self.bottom.min(other.bottom),
            right: self.right.max(other.right),
            top: self.top.max(other.top),
        }
    }
}

/// Size of a plot area in chart units.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Area {
    pub width: f64,
    pub height: f64,
}

impl Area {
    pub const fn new(width: f64, height: f64) -> Self {
        Self { width, height }
    }
}

/// Semantic styles; the renderer picks the actual colors.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Paint {
    Frame,
    GridLine,
    Tick,
    Label,
    Bar,
    SelectedBar,
    CurrentRoll,
    SettledRoll,
    HighlightedRoll,
    Boundary,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Anchor {
    Center,
    Right,
}

/// Stable handle of a drawn figure, valid until deleted or erased.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct FigureId(u64);

#[derive(Debug, Clone, PartialEq)]
pub enum Shape {
    Rect(Rect),
    Line { from: Point, to: Point },
    Text { text: String, at: Point, anchor: Anchor },
}

#[derive(Debug, Clone, PartialEq)]
pub struct Figure {
    pub shape: Shape,
    pub paint: Paint,
}

pub trait Canvas {
    fn draw_rect(
        &mut self,
        top_left: Point,
        bottom_right: Point,
        paint: Paint,
    ) -> FigureId;
    fn draw_line(&mut self, from: Point, to: Point, paint: Paint) -> FigureId;
    fn draw_text(&mut self, text: &str, at: Point, anchor: Anchor) -> FigureId;
    /// Change the paint of an existing figure; unknown ids are ignored.
    fn restyle(&mut self, id: FigureId, paint: Paint);
    fn delete(&mut self, id: FigureId);
    fn erase(&mut self);
}

// ------------------------------------------------------------------
// Scene
// ------------------------------------------------------------------

/// Retained canvas: keeps every figure until deleted. Figures are
/// painted in id order, so later figures sit on top.
#[derive(Debug, Clone, Default)]
pub struct Scene {
    figures: BTreeMap<FigureId, Figure>,
    next_id: u64,
}

impl Scene {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn figures(&self) -> impl Iterator<Item = (FigureId, &Figure)> + '_ {
        self.figures.iter().map(|(id, f)| (*id, f))
    }

    pub fn get(&self, id: FigureId) -> Option<&Figure> {
        self.figures.get(&id)
    }

    pub fn len(&self) -> usize {
        self.figures.len()
    }

    pub fn is_empty(&self) -> bool {
        self.figures.is_empty()
    }

    /// Number of figures drawn with `paint`.
    pub fn count(&self, paint: Paint) -> usize {
        self.figures.values().filter(|f| f.paint == paint).count()
    }

    /// Bounding box of all rectangles and lines.
    pub fn bounds(&self) -> Option<Rect> {
        self.figures
            .values()
            .filter_map(|f| match &f.shape {
                Shape::Rect(r) => Some(*r),
                Shape::Line { from, to } => Some(Rect::from_corners(*from, *to)),
                Shape::Text { .. } => None,
            })
            .reduce(|a, b| a.union(&b))
    }

    fn push(&mut self, shape: Shape, paint: Paint) -> FigureId {
        let id = FigureId(self.next_id);
        self.next_id += 1;
        self.figures.insert(id, Figure { shape, paint });
        id
    }
}

impl Canvas for Scene {
    fn draw_rect(
        &mut self,
        top_left: Point,
        bottom_right: Point,
        paint: Paint,
    ) -> FigureId {
        self.push(Shape::Rect(Rect::from_corners(top_left, bottom_right)), paint)
    }

    fn draw_line(&mut self, from: Point, to: Point, paint: Paint) -> FigureId {
        self.push(Shape::Line { from, to }, paint)
    }

    fn draw_text(&mut self, text: &str, at: Point, anchor: Anchor) -> FigureId {
        self.push(
            Shape::Text {
                text: text.to_string(),
                at,
                anchor,
            },
            Paint::Label,
        )
    }

    fn restyle(&mut self, id: FigureId, paint: Paint) {
        if let Some(figure) = self.figures.get_mut(&id) {
            figure.paint = paint;
        }
    }

    fn delete(&mut self, id: FigureId) {
        self.figures.remove(&id);
    }

    fn erase(&mut self) {
        self.figures.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rect_hit_test() {
        let r = Rect::from_corners(Point::new(0.0, 10.0), Point::new(4.0, 0.0));
        assert!(r.contains(Point::new(2.0, 5.0), 0.0));
        assert!(r.contains(Point::new(4.0, 10.0), 0.0));
        assert!(!r.contains(Point::new(4.5, 5.0), 0.0));
        assert!(r.contains(Point::new(4.5, 5.0), 1.0));
    }

    #[test]
    fn test_scene_handles_stay_valid() {
        let mut scene = Scene::new();
        let a = scene.draw_rect(Point::new(0.0, 1.0), Point::new(1.0, 0.0), Paint::Bar);
        let b = scene.draw_line(Point::new(0.0, 0.0), Point::new(5.0, 0.0), Paint::Tick);
        scene.delete(a);
        scene.restyle(b, Paint::GridLine);
        scene.restyle(a, Paint::SelectedBar);

        assert_eq!(scene.len(), 1);
        assert_eq!(scene.count(Paint::GridLine), 1);
        assert!(scene.get(a).is_none());

        let c = scene.draw_text("7", Point::new(0.0, 0.0), Anchor::Center);
        assert_ne!(b, c);
        scene.erase();
        assert!(scene.is_empty());
    }
}
