use na::Vector3;
use serde::{Deserialize, Serialize};

/// One of the six faces of the axis-aligned simulation domain.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Face {
    XLow,
    XHigh,
    YLow,
    YHigh,
    ZLow,
    ZHigh,
}

impl Face {
    pub const ALL: [Face; 6] = [
        Face::XLow,
        Face::XHigh,
        Face::YLow,
        Face::YHigh,
        Face::ZLow,
        Face::ZHigh,
    ];

    /// Axis this face is orthogonal to (0 = x, 1 = y, 2 = z).
    pub fn axis(self) -> usize {
        match self {
            Face::XLow | Face::XHigh => 0,
            Face::YLow | Face::YHigh => 1,
            Face::ZLow | Face::ZHigh => 2,
        }
    }

    /// Whether this is the face at the lower domain coordinate.
    pub fn is_low(self) -> bool {
        matches!(self, Face::XLow | Face::YLow | Face::ZLow)
    }

    pub fn opposite(self) -> Face {
        match self {
            Face::XLow => Face::XHigh,
            Face::XHigh => Face::XLow,
            Face::YLow => Face::YHigh,
            Face::YHigh => Face::YLow,
            Face::ZLow => Face::ZHigh,
            Face::ZHigh => Face::ZLow,
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            Face::XLow => "x_low",
            Face::XHigh => "x_high",
            Face::YLow => "y_low",
            Face::YHigh => "y_high",
            Face::ZLow => "z_low",
            Face::ZHigh => "z_high",
        }
    }

    /// Coordinate of the wall plane along this face's axis.
    pub fn plane(self, origin: &Vector3<f64>, size: &Vector3<f64>) -> f64 {
        let axis = self.axis();
        if self.is_low() {
            origin[axis]
        } else {
            origin[axis] + size[axis]
        }
    }

    /// Distance from the wall measured into the domain. Negative for
    /// positions beyond the face.
    pub fn inward_distance(self, position: &Vector3<f64>, plane: f64) -> f64 {
        let coordinate = position[self.axis()];
        if self.is_low() {
            coordinate - plane
        } else {
            plane - coordinate
        }
    }
}
