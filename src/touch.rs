use crate::geometry::Vec3;
use serde::{Deserialize, Serialize};
use strum_macros::{Display, EnumIter, EnumString};

#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Display, EnumString, EnumIter,
)]
#[strum(serialize_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum Finger {
    Left,
    Right,
}

impl Finger {
    #[inline(always)]
    pub fn index(self) -> usize {
        match self {
            Finger::Left => 0,
            Finger::Right => 1,
        }
    }
}

/// One fingertip reading for one tick. The zone flags come from the host's
/// collision system; `depth` is the signed distance to the keyboard plane.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TouchSample {
    pub position: Vec3,
    pub depth: f32,
    pub in_type_zone: bool,
    pub touching_plane: bool,
}

impl TouchSample {
    /// A finger resting far from the keyboard.
    pub fn idle() -> Self {
        Self {
            position: Vec3::new(0.0, 0.0, -1.0),
            depth: 1.0,
            in_type_zone: false,
            touching_plane: false,
        }
    }
}
