use crate::error::{TfResult, TypeForgeError};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fs;
use std::ops::{Add, Mul, Sub};
use std::path::Path;
use strum_macros::{Display, EnumIter, EnumString};

/// A point on the keyboard plane, in plane units (metres unless the layout says otherwise).
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Point2 {
    pub x: f32,
    pub y: f32,
}

impl Point2 {
    pub const fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }

    #[inline(always)]
    pub fn length(self) -> f32 {
        (self.x * self.x + self.y * self.y).sqrt()
    }

    #[inline(always)]
    pub fn dist(self, other: Point2) -> f32 {
        (self - other).length()
    }

    #[inline(always)]
    pub fn dist_sq(self, other: Point2) -> f32 {
        let d = self - other;
        d.x * d.x + d.y * d.y
    }

    pub fn lerp(self, other: Point2, t: f32) -> Point2 {
        self + (other - self) * t
    }
}

impl Add for Point2 {
    type Output = Point2;
    fn add(self, rhs: Point2) -> Point2 {
        Point2::new(self.x + rhs.x, self.y + rhs.y)
    }
}

impl Sub for Point2 {
    type Output = Point2;
    fn sub(self, rhs: Point2) -> Point2 {
        Point2::new(self.x - rhs.x, self.y - rhs.y)
    }
}

impl Mul<f32> for Point2 {
    type Output = Point2;
    fn mul(self, rhs: f32) -> Point2 {
        Point2::new(self.x * rhs, self.y * rhs)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Vec3 {
    pub x: f32,
    pub y: f32,
    pub z: f32,
}

impl Vec3 {
    pub const fn new(x: f32, y: f32, z: f32) -> Self {
        Self { x, y, z }
    }

    #[inline(always)]
    pub fn dot(self, other: Vec3) -> f32 {
        self.x * other.x + self.y * other.y + self.z * other.z
    }

    pub fn length(self) -> f32 {
        self.dot(self).sqrt()
    }

    pub fn normalized(self) -> Vec3 {
        let len = self.length();
        if len > f32::EPSILON {
            self * (1.0 / len)
        } else {
            self
        }
    }
}

impl Add for Vec3 {
    type Output = Vec3;
    fn add(self, rhs: Vec3) -> Vec3 {
        Vec3::new(self.x + rhs.x, self.y + rhs.y, self.z + rhs.z)
    }
}

impl Sub for Vec3 {
    type Output = Vec3;
    fn sub(self, rhs: Vec3) -> Vec3 {
        Vec3::new(self.x - rhs.x, self.y - rhs.y, self.z - rhs.z)
    }
}

impl Mul<f32> for Vec3 {
    type Output = Vec3;
    fn mul(self, rhs: f32) -> Vec3 {
        Vec3::new(self.x * rhs, self.y * rhs, self.z * rhs)
    }
}

/// How a 3D fingertip is mapped onto the keyboard plane.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum Projection {
    /// Drop the fingertip straight along the plane normal.
    Orthogonal,
    /// Cast a ray from the eye through the fingertip (what the user sees under the finger).
    SeeThrough { eye: Vec3 },
}

/// The keyboard surface in world space. `forward` points into the keyboard,
/// so positive depth means the finger hovers above it.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct KeyboardPlane {
    pub origin: Vec3,
    pub right: Vec3,
    pub up: Vec3,
    pub forward: Vec3,
    pub projection: Projection,
}

impl Default for KeyboardPlane {
    fn default() -> Self {
        Self {
            origin: Vec3::new(0.0, 0.0, 0.0),
            right: Vec3::new(1.0, 0.0, 0.0),
            up: Vec3::new(0.0, 1.0, 0.0),
            forward: Vec3::new(0.0, 0.0, 1.0),
            projection: Projection::Orthogonal,
        }
    }
}

impl KeyboardPlane {
    /// Signed distance from the plane, positive on the user's side.
    pub fn depth_of(&self, p: Vec3) -> f32 {
        (p - self.origin).dot(self.forward.normalized() * -1.0)
    }

    pub fn project_orthogonal(&self, p: Vec3) -> Vec3 {
        // (p + n*t - k) ⊥ n
        let n = self.forward;
        let a = (p - self.origin).dot(n);
        let b = n.dot(n);
        p + n * (-a / b)
    }

    pub fn project_see_through(&self, p: Vec3, eye: Vec3) -> Vec3 {
        // (p + (p - e)*t - k) ⊥ n
        let n = self.forward;
        let a = (p - self.origin).dot(n);
        let b = (p - eye).dot(n);
        if b.abs() <= f32::EPSILON {
            // Eye ray parallel to the plane
            return self.project_orthogonal(p);
        }
        p + (p - eye) * (-a / b)
    }

    pub fn to_plane_2d(&self, p: Vec3) -> Point2 {
        let q = p - self.origin;
        Point2::new(q.dot(self.right.normalized()), q.dot(self.up.normalized()))
    }

    pub fn to_world(&self, p: Point2) -> Vec3 {
        self.origin + self.right.normalized() * p.x + self.up.normalized() * p.y
    }

    /// World point `depth` above the plane at `p`.
    pub fn lift(&self, p: Point2, depth: f32) -> Vec3 {
        self.to_world(p) + self.forward.normalized() * -depth
    }

    pub fn touch_point(&self, p: Vec3) -> Point2 {
        let on_plane = match self.projection {
            Projection::Orthogonal => self.project_orthogonal(p),
            Projection::SeeThrough { eye } => self.project_see_through(p, eye),
        };
        self.to_plane_2d(on_plane)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, EnumIter, EnumString, Display)]
#[strum(serialize_all = "snake_case")]
pub enum StandardLayout {
    Qwerty,
    Qwertz,
    Azerty,
    Dvorak,
    Colemak,
}

impl StandardLayout {
    /// Letter rows, top to bottom.
    pub fn rows(&self) -> [&'static str; 3] {
        match self {
            Self::Qwerty => ["qwertyuiop", "asdfghjkl", "zxcvbnm"],
            Self::Qwertz => ["qwertzuiop", "asdfghjkl", "yxcvbnm"],
            Self::Azerty => ["azertyuiop", "qsdfghjklm", "wxcvbn"],
            Self::Dvorak => ["',.pyfgcrl", "aoeuidhtns", ";qjkxbmwvz"],
            Self::Colemak => ["qwfpgjluy;", "arstdhneio", "zxcvbkm"],
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct KeyAnchor {
    pub ch: char,
    pub x: f32,
    pub y: f32,
}

impl KeyAnchor {
    pub fn point(&self) -> Point2 {
        Point2::new(self.x, self.y)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
struct LayoutFile {
    key_width: f32,
    #[serde(default)]
    key_height: Option<f32>,
    keys: Vec<KeyAnchor>,
}

/// Immutable character → key centre mapping on the keyboard plane.
#[derive(Debug, Clone)]
pub struct KeyLayout {
    keys: Vec<KeyAnchor>,
    index: HashMap<char, usize>,
    key_width: f32,
    key_height: f32,
}

impl KeyLayout {
    pub fn new(keys: Vec<KeyAnchor>, key_width: f32, key_height: f32) -> TfResult<Self> {
        if !(key_width > 0.0 && key_height > 0.0) {
            return Err(TypeForgeError::Validation(format!(
                "key size must be positive, got {}x{}",
                key_width, key_height
            )));
        }
        let mut index = HashMap::with_capacity(keys.len());
        for (i, k) in keys.iter().enumerate() {
            if index.insert(k.ch, i).is_some() {
                return Err(TypeForgeError::Validation(format!(
                    "key '{}' is defined twice",
                    k.ch
                )));
            }
        }
        Ok(Self {
            keys,
            index,
            key_width,
            key_height,
        })
    }

    /// Row-staggered QWERTY letters with square keys of side `pitch`.
    pub fn qwerty(pitch: f32) -> Self {
        Self::standard(StandardLayout::Qwerty, pitch)
    }

    /// Three staggered letter rows with square keys of side `pitch`.
    /// Row 0 sits at y = 0; lower rows go towards negative y.
    pub fn standard(kind: StandardLayout, pitch: f32) -> Self {
        const STAGGER: [f32; 3] = [0.0, 0.25, 0.75];

        let mut keys = Vec::with_capacity(30);
        for (row, chars) in kind.rows().iter().enumerate() {
            for (col, ch) in chars.chars().enumerate() {
                keys.push(KeyAnchor {
                    ch,
                    x: (col as f32 + STAGGER[row] + 0.5) * pitch,
                    y: -(row as f32 + 0.5) * pitch,
                });
            }
        }
        let index = keys.iter().enumerate().map(|(i, k)| (k.ch, i)).collect();
        Self {
            keys,
            index,
            key_width: pitch,
            key_height: pitch,
        }
    }

    pub fn from_json(content: &str) -> TfResult<Self> {
        let file: LayoutFile = serde_json::from_str(content)?;
        let key_height = file.key_height.unwrap_or(file.key_width);
        Self::new(file.keys, file.key_width, key_height)
    }

    pub fn load_from_file<P: AsRef<Path>>(path: P) -> TfResult<Self> {
        let content = fs::read_to_string(path)?;
        Self::from_json(&content)
    }

    pub fn to_json(&self) -> TfResult<String> {
        let file = LayoutFile {
            key_width: self.key_width,
            key_height: Some(self.key_height),
            keys: self.keys.clone(),
        };
        Ok(serde_json::to_string_pretty(&file)?)
    }

    pub fn len(&self) -> usize {
        self.keys.len()
    }

    pub fn is_empty(&self) -> bool {
        self.keys.is_empty()
    }

    pub fn keys(&self) -> &[KeyAnchor] {
        &self.keys
    }

    pub fn key_width(&self) -> f32 {
        self.key_width
    }

    pub fn key_height(&self) -> f32 {
        self.key_height
    }

    pub fn key_index(&self, ch: char) -> Option<usize> {
        self.index.get(&ch).copied()
    }

    pub fn anchor(&self, ch: char) -> Option<Point2> {
        self.key_index(ch).map(|i| self.keys[i].point())
    }

    pub fn nearest_key(&self, p: Point2) -> Option<char> {
        self.keys
            .iter()
            .map(|k| (k.ch, k.point().dist_sq(p)))
            .min_by(|a, b| a.1.total_cmp(&b.1))
            .map(|(ch, _)| ch)
    }

    /// Key centres visited by `word`, or the first character without a key.
    pub fn key_path(&self, word: &str) -> Result<Vec<Point2>, char> {
        word.chars()
            .map(|ch| self.anchor(ch).ok_or(ch))
            .collect()
    }
}
