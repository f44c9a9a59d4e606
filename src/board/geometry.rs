//! Screen geometry shared by the renderer and the drag controller.
//!
//! Coordinates are terminal cells. The renderer records where each column
//! and card was drawn in a `DropLayout`; the drag controller reads it back to
//! find drop targets.

/// A point on screen.
///
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct Point {
    pub x: i32,
    pub y: i32,
}

impl Point {
    pub fn new(x: i32, y: i32) -> Point {
        Point { x, y }
    }

    pub fn distance(&self, other: &Point) -> f64 {
        let dx = (self.x - other.x) as f64;
        let dy = (self.y - other.y) as f64;
        (dx * dx + dy * dy).sqrt()
    }
}

/// An axis-aligned rectangle.
///
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct Bounds {
    pub x: i32,
    pub y: i32,
    pub width: i32,
    pub height: i32,
}

impl Bounds {
    pub fn new(x: i32, y: i32, width: i32, height: i32) -> Bounds {
        Bounds {
            x,
            y,
            width,
            height,
        }
    }

    pub fn contains(&self, point: Point) -> bool {
        point.x >= self.x
            && point.x < self.x + self.width
            && point.y >= self.y
            && point.y < self.y + self.height
    }

    pub fn corners(&self) -> [Point; 4] {
        [
            Point::new(self.x, self.y),
            Point::new(self.x + self.width, self.y),
            Point::new(self.x, self.y + self.height),
            Point::new(self.x + self.width, self.y + self.height),
        ]
    }

    /// Same rectangle shifted by the given offset.
    ///
    pub fn translate(&self, dx: i32, dy: i32) -> Bounds {
        Bounds::new(self.x + dx, self.y + dy, self.width, self.height)
    }

    /// Sum of the distances between matching corners of both rectangles.
    ///
    pub fn corner_distance(&self, other: &Bounds) -> f64 {
        self.corners()
            .iter()
            .zip(other.corners().iter())
            .map(|(a, b)| a.distance(b))
            .sum()
    }
}

impl From<ratatui::layout::Rect> for Bounds {
    fn from(rect: ratatui::layout::Rect) -> Bounds {
        Bounds::new(
            rect.x as i32,
            rect.y as i32,
            rect.width as i32,
            rect.height as i32,
        )
    }
}

/// Where a card was drawn.
///
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TaskZone {
    pub task_id: String,
    pub bounds: Bounds,
}

/// Where a column was drawn: its whole area, its header (the column drag
/// handle) and its visible cards in order.
///
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ColumnZone {
    pub column_id: String,
    pub bounds: Bounds,
    pub header: Bounds,
    pub tasks: Vec<TaskZone>,
}

/// Every drop zone of the last rendered board frame, in layout order.
///
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct DropLayout {
    pub columns: Vec<ColumnZone>,
}

impl DropLayout {
    pub fn clear(&mut self) {
        self.columns.clear();
    }

    pub fn column_at(&self, point: Point) -> Option<&ColumnZone> {
        self.columns.iter().find(|zone| zone.bounds.contains(point))
    }

    pub fn column(&self, column_id: &str) -> Option<&ColumnZone> {
        self.columns.iter().find(|zone| zone.column_id == column_id)
    }

    pub fn task(&self, task_id: &str) -> Option<&TaskZone> {
        self.columns
            .iter()
            .flat_map(|zone| zone.tasks.iter())
            .find(|zone| zone.task_id == task_id)
    }

    /// Return the drag handle under the point: a card, else a column header.
    ///
    pub fn handle_at(&self, point: Point) -> Option<(super::DragItem, Bounds)> {
        for zone in &self.columns {
            if let Some(task) = zone.tasks.iter().find(|t| t.bounds.contains(point)) {
                return Some((super::DragItem::Task(task.task_id.clone()), task.bounds));
            }
            if zone.header.contains(point) {
                return Some((super::DragItem::Column(zone.column_id.clone()), zone.bounds));
            }
        }
        None
    }
}
