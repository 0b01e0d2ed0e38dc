//! Element model — the drawable geometry held by a whiteboard.
//!
//! DESIGN
//! ======
//! An `Element` carries the fields every drawable shares (id, label, color,
//! visibility flags) plus a `Shape`: a closed sum type tagged on the wire by
//! `type`. The shape fields are flattened so the JSON record stays flat, the
//! way clients submit and render it.
//!
//! Elements reference each other by integer id (a segment names two point
//! elements) but never own one another. A referenced element may be deleted
//! on its own; nothing here dereferences those ids.

use serde::{Deserialize, Serialize};

/// Client-assigned element identity, unique within one whiteboard.
pub type ElementId = i64;

// =============================================================================
// ELEMENT
// =============================================================================

/// One drawable record. Compared by field equality.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Element {
    pub id: ElementId,
    #[serde(default)]
    pub label: String,
    #[serde(default)]
    pub color: String,
    #[serde(default)]
    pub hidden: bool,
    #[serde(default)]
    pub trace: bool,
    #[serde(flatten)]
    pub shape: Shape,
}

impl Element {
    /// Wire name of this element's `type`.
    #[must_use]
    pub fn kind(&self) -> &'static str {
        self.shape.kind()
    }
}

// =============================================================================
// SHAPE
// =============================================================================

/// Type-specific geometry. Point fields (`p1`, `obj1`, ...) are element ids.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum Shape {
    CircleGeneral {
        x: f64,
        y: f64,
        r: f64,
    },
    #[serde(rename = "Circle_3p")]
    Circle3p {
        p1: ElementId,
        p2: ElementId,
        p3: ElementId,
    },
    LineGeneral {
        a: f64,
        b: f64,
        c: f64,
    },
    #[serde(rename = "Line_2p")]
    Line2p {
        p1: ElementId,
        p2: ElementId,
    },
    PencilArrow {
        p1: ElementId,
        p2: ElementId,
        thick: f64,
    },
    PencilCircle {
        p1: ElementId,
        p2: ElementId,
        thick: f64,
    },
    /// Freehand stroke; resubmitted under the same id as the gesture grows.
    PencilCurve {
        p0: ElementId,
        values: Vec<[f64; 2]>,
        thick: f64,
    },
    PencilFreeLine {
        p0: ElementId,
        values: Vec<[f64; 2]>,
        thick: f64,
    },
    PencilPointAtRect {
        p1: ElementId,
        p2: ElementId,
        thick: f64,
    },
    PencilPointer {
        p1: ElementId,
        thick: f64,
    },
    PencilRect {
        p1: ElementId,
        p2: ElementId,
        thick: f64,
    },
    PencilUnderline {
        p1: ElementId,
        p2: ElementId,
        thick: f64,
    },
    PointAtCircle {
        obj: ElementId,
        t: f64,
    },
    PointAtLine {
        obj: ElementId,
        t: f64,
    },
    /// Free-floating pointer position. Presence data, never undoable.
    PointFree {
        x: f64,
        y: f64,
    },
    #[serde(rename = "Point_2c")]
    Point2c {
        obj1: ElementId,
        obj2: ElementId,
        index: i32,
    },
    #[serde(rename = "Point_2l")]
    Point2l {
        obj1: ElementId,
        obj2: ElementId,
    },
    #[serde(rename = "Point_lc")]
    PointLc {
        obj1: ElementId,
        obj2: ElementId,
        index: i32,
    },
    Segment {
        p1: ElementId,
        p2: ElementId,
    },
    Text {
        p1: ElementId,
        text: String,
        #[serde(default)]
        font: String,
    },
    /// Placed image. Clients create a label element alongside it.
    ClipArt {
        p1: ElementId,
        p2: ElementId,
        url: String,
    },
}

impl Shape {
    /// Wire name, identical to the serialized `type` tag.
    #[must_use]
    pub fn kind(&self) -> &'static str {
        match self {
            Self::CircleGeneral { .. } => "CircleGeneral",
            Self::Circle3p { .. } => "Circle_3p",
            Self::LineGeneral { .. } => "LineGeneral",
            Self::Line2p { .. } => "Line_2p",
            Self::PencilArrow { .. } => "PencilArrow",
            Self::PencilCircle { .. } => "PencilCircle",
            Self::PencilCurve { .. } => "PencilCurve",
            Self::PencilFreeLine { .. } => "PencilFreeLine",
            Self::PencilPointAtRect { .. } => "PencilPointAtRect",
            Self::PencilPointer { .. } => "PencilPointer",
            Self::PencilRect { .. } => "PencilRect",
            Self::PencilUnderline { .. } => "PencilUnderline",
            Self::PointAtCircle { .. } => "PointAtCircle",
            Self::PointAtLine { .. } => "PointAtLine",
            Self::PointFree { .. } => "PointFree",
            Self::Point2c { .. } => "Point_2c",
            Self::Point2l { .. } => "Point_2l",
            Self::PointLc { .. } => "Point_lc",
            Self::Segment { .. } => "Segment",
            Self::Text { .. } => "Text",
            Self::ClipArt { .. } => "ClipArt",
        }
    }

    #[must_use]
    pub fn is_stroke(&self) -> bool {
        matches!(self, Self::PencilCurve { .. })
    }

    #[must_use]
    pub fn is_clip_art(&self) -> bool {
        matches!(self, Self::ClipArt { .. })
    }

    #[must_use]
    pub fn is_presence_marker(&self) -> bool {
        matches!(self, Self::PointFree { .. })
    }
}

#[cfg(test)]
#[path = "element_test.rs"]
mod tests;
