//! Landmark region index.
//!
//! One canonical table mapping anatomical region names to ordered landmark
//! indices of the 468-point face mesh topology. A definition whose first and
//! last index coincide is a closed outline; anything else is an open polyline.

use crate::types::{LandmarkSet, Point};

/// Landmark count of the face mesh topology the table is written against.
pub const FACE_MESH_LANDMARKS: usize = 468;

/// Landmark used as the face's horizontal center reference.
pub const NOSE_TIP: usize = 1;

pub const UPPER_LIP: &str = "upper_lip";
pub const LOWER_LIP: &str = "lower_lip";
pub const MOUTH: &str = "mouth";
pub const RIGHT_EYE: &str = "right_eye";
pub const LEFT_EYE: &str = "left_eye";
pub const RIGHT_EYE_UPPER_LID: &str = "right_eye_upper_lid";
pub const LEFT_EYE_UPPER_LID: &str = "left_eye_upper_lid";
pub const RIGHT_EYEBROW: &str = "right_eyebrow";
pub const LEFT_EYEBROW: &str = "left_eyebrow";
pub const RIGHT_CHEEK: &str = "right_cheek";
pub const LEFT_CHEEK: &str = "left_cheek";
pub const RIGHT_CHEEKBONE: &str = "right_cheekbone";
pub const LEFT_CHEEKBONE: &str = "left_cheekbone";
pub const RIGHT_CHEEK_HOLLOW: &str = "right_cheek_hollow";
pub const LEFT_CHEEK_HOLLOW: &str = "left_cheek_hollow";
pub const RIGHT_TEMPLE: &str = "right_temple";
pub const LEFT_TEMPLE: &str = "left_temple";
pub const FOREHEAD: &str = "forehead";
pub const NOSE: &str = "nose";
pub const NOSE_BRIDGE: &str = "nose_bridge";
pub const RIGHT_NOSE_SIDE: &str = "right_nose_side";
pub const LEFT_NOSE_SIDE: &str = "left_nose_side";
pub const FACE_OVAL: &str = "face_oval";

/// A named, ordered list of landmark indices.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RegionDefinition {
    pub name: &'static str,
    pub indices: &'static [usize],
}

impl RegionDefinition {
    /// Closed outlines repeat their first index at the end.
    pub fn is_closed(&self) -> bool {
        self.indices.len() > 2 && self.indices.first() == self.indices.last()
    }

    /// Highest landmark index the region refers to.
    pub fn max_index(&self) -> usize {
        self.indices.iter().copied().max().unwrap_or(0)
    }

    /// Indices without the closing duplicate.
    pub fn outline(&self) -> &'static [usize] {
        if self.is_closed() {
            &self.indices[..self.indices.len() - 1]
        } else {
            self.indices
        }
    }
}

static REGIONS: &[RegionDefinition] = &[
    RegionDefinition {
        name: UPPER_LIP,
        indices: &[
            61, 185, 40, 39, 37, 0, 267, 269, 270, 409, 291, 308, 415, 310, 311, 312, 13, 82, 81,
            80, 191, 78, 61,
        ],
    },
    RegionDefinition {
        name: LOWER_LIP,
        indices: &[
            61, 146, 91, 181, 84, 17, 314, 405, 321, 375, 291, 308, 324, 318, 402, 317, 14, 87,
            178, 88, 95, 78, 61,
        ],
    },
    RegionDefinition {
        name: MOUTH,
        indices: &[
            61, 185, 40, 39, 37, 0, 267, 269, 270, 409, 291, 375, 321, 405, 314, 17, 84, 181, 91,
            146, 61,
        ],
    },
    RegionDefinition {
        name: RIGHT_EYE,
        indices: &[
            33, 246, 161, 160, 159, 158, 157, 173, 133, 155, 154, 153, 145, 144, 163, 7, 33,
        ],
    },
    RegionDefinition {
        name: LEFT_EYE,
        indices: &[
            263, 466, 388, 387, 386, 385, 384, 398, 362, 382, 381, 380, 374, 373, 390, 249, 263,
        ],
    },
    RegionDefinition {
        name: RIGHT_EYE_UPPER_LID,
        indices: &[33, 246, 161, 160, 159, 158, 157, 173, 133],
    },
    RegionDefinition {
        name: LEFT_EYE_UPPER_LID,
        indices: &[263, 466, 388, 387, 386, 385, 384, 398, 362],
    },
    RegionDefinition {
        name: RIGHT_EYEBROW,
        indices: &[46, 53, 52, 65, 55, 107, 66, 105, 63, 70, 46],
    },
    RegionDefinition {
        name: LEFT_EYEBROW,
        indices: &[276, 283, 282, 295, 285, 336, 296, 334, 293, 300, 276],
    },
    RegionDefinition {
        name: RIGHT_CHEEK,
        indices: &[50, 101, 118, 117, 116, 123, 147, 187, 205, 50],
    },
    RegionDefinition {
        name: LEFT_CHEEK,
        indices: &[280, 330, 347, 346, 345, 352, 376, 411, 425, 280],
    },
    RegionDefinition {
        name: RIGHT_CHEEKBONE,
        indices: &[143, 35, 31, 228, 229, 230, 231, 120, 119, 143],
    },
    RegionDefinition {
        name: LEFT_CHEEKBONE,
        indices: &[372, 265, 261, 448, 449, 450, 451, 349, 348, 372],
    },
    RegionDefinition {
        name: RIGHT_CHEEK_HOLLOW,
        indices: &[132, 177, 215, 138, 135, 214, 192, 213, 132],
    },
    RegionDefinition {
        name: LEFT_CHEEK_HOLLOW,
        indices: &[361, 401, 435, 367, 364, 434, 416, 433, 361],
    },
    RegionDefinition {
        name: RIGHT_TEMPLE,
        indices: &[54, 68, 71, 139, 34, 127, 162, 21, 54],
    },
    RegionDefinition {
        name: LEFT_TEMPLE,
        indices: &[284, 298, 301, 368, 264, 356, 389, 251, 284],
    },
    RegionDefinition {
        name: FOREHEAD,
        indices: &[109, 10, 338, 297, 332, 333, 299, 337, 151, 108, 69, 104, 103, 67, 109],
    },
    RegionDefinition {
        name: NOSE,
        indices: &[
            168, 417, 465, 357, 277, 355, 429, 279, 358, 327, 326, 2, 97, 98, 129, 49, 209, 126,
            47, 128, 245, 193, 168,
        ],
    },
    RegionDefinition {
        name: NOSE_BRIDGE,
        indices: &[6, 197, 195, 5, 4],
    },
    RegionDefinition {
        name: RIGHT_NOSE_SIDE,
        indices: &[122, 196, 3, 51, 45],
    },
    RegionDefinition {
        name: LEFT_NOSE_SIDE,
        indices: &[351, 419, 248, 281, 275],
    },
    RegionDefinition {
        name: FACE_OVAL,
        indices: &[
            10, 338, 297, 332, 284, 251, 389, 356, 454, 323, 361, 288, 397, 365, 379, 378, 400,
            377, 152, 148, 176, 149, 150, 136, 172, 58, 132, 93, 234, 127, 162, 21, 54, 103, 67,
            109, 10,
        ],
    },
];

/// All compiled-in region definitions.
pub fn regions() -> &'static [RegionDefinition] {
    REGIONS
}

/// Look up a region definition by name.
pub fn lookup(name: &str) -> Option<&'static RegionDefinition> {
    REGIONS.iter().find(|r| r.name == name)
}

/// A region resolved against one landmark snapshot, in destination pixels.
#[derive(Debug, Clone, PartialEq)]
pub struct ScaledRegionPath {
    pub name: String,
    pub points: Vec<Point>,
    pub closed: bool,
    /// Landmark-to-destination factor the points were resolved with.
    pub scale: f32,
}

impl Default for ScaledRegionPath {
    fn default() -> Self {
        Self {
            name: String::new(),
            points: Vec::new(),
            closed: false,
            scale: 1.0,
        }
    }
}

impl ScaledRegionPath {
    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    /// At least three points: enough to form a fillable area.
    pub fn is_drawable(&self) -> bool {
        self.points.len() >= 3
    }
}

/// Resolve `name` against `landmarks`, scaling every point by `scale`.
///
/// Unknown names yield an empty path, and so does a set too short to hold
/// the region's highest index. Indices absent from a long enough set are
/// dropped, so the path may be shorter than its definition.
pub fn region_path(landmarks: &LandmarkSet, name: &str, scale: f32) -> ScaledRegionPath {
    let empty = || ScaledRegionPath {
        name: name.to_string(),
        scale,
        ..Default::default()
    };
    let Some(def) = lookup(name) else {
        tracing::warn!(region = name, "unknown region, nothing to draw");
        return empty();
    };
    if landmarks.len() <= def.max_index() {
        tracing::debug!(
            region = name,
            landmarks = landmarks.len(),
            needs = def.max_index() + 1,
            "landmark set too short for region"
        );
        return empty();
    }

    let points: Vec<Point> = def
        .outline()
        .iter()
        .filter_map(|&i| landmarks.scaled(i, scale))
        .collect();

    if points.len() < def.outline().len() {
        tracing::trace!(
            region = name,
            resolved = points.len(),
            defined = def.outline().len(),
            "region path lost points"
        );
    }

    ScaledRegionPath {
        name: name.to_string(),
        points,
        closed: def.is_closed(),
        scale,
    }
}

/// Resolve several regions at once.
pub fn region_paths(landmarks: &LandmarkSet, names: &[&str], scale: f32) -> Vec<ScaledRegionPath> {
    names
        .iter()
        .map(|name| region_path(landmarks, name, scale))
        .collect()
}
