use egui::{Color32, Pos2};
use std::sync::Arc;

/// A finished stroke. Immutable once the drag that produced it has ended.
#[derive(Clone, Debug, PartialEq)]
pub struct Stroke {
    points: Vec<Pos2>,
    color: Color32,
    thickness: f32,
}

/// A stroke still being drawn. Color and thickness are fixed at creation.
#[derive(Clone, Debug)]
pub struct MutableStroke {
    points: Vec<Pos2>,
    color: Color32,
    thickness: f32,
}

// Define a reference-counted type alias for Stroke
pub type StrokeRef = Arc<Stroke>;

impl Stroke {
    pub fn new(color: Color32, thickness: f32, points: Vec<Pos2>) -> Self {
        Self {
            points,
            color,
            thickness,
        }
    }

    pub fn new_ref(color: Color32, thickness: f32, points: Vec<Pos2>) -> StrokeRef {
        Arc::new(Self::new(color, thickness, points))
    }

    pub fn points(&self) -> &[Pos2] {
        &self.points
    }

    pub fn color(&self) -> Color32 {
        self.color
    }

    pub fn thickness(&self) -> f32 {
        self.thickness
    }
}

impl MutableStroke {
    /// Start a stroke at `origin` with the brush settings current at that moment
    pub fn begin(color: Color32, thickness: f32, origin: Pos2) -> Self {
        Self {
            points: vec![origin],
            color,
            thickness,
        }
    }

    pub fn add_point(&mut self, point: Pos2) {
        // Pointer events often repeat the last position; skip duplicates
        if self.points.last() != Some(&point) {
            self.points.push(point);
        }
    }

    /// Freeze the stroke
    pub fn finish(self) -> StrokeRef {
        Stroke::new_ref(self.color, self.thickness, self.points)
    }

    // Snapshot for preview rendering while the drag is still going
    pub fn to_stroke(&self) -> Stroke {
        Stroke::new(self.color, self.thickness, self.points.clone())
    }

    pub fn points(&self) -> &[Pos2] {
        &self.points
    }

    pub fn color(&self) -> Color32 {
        self.color
    }

    pub fn thickness(&self) -> f32 {
        self.thickness
    }
}
