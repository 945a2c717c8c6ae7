//! Face value detection
//!
//! Each die carries labeled marker points, one per face. The face whose marker
//! points most directly along world up is the rolled value.

use glam::{Quat, Vec3};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Why a face could not be read
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FaceError {
    #[error("die has no face markers attached")]
    MissingMarkers,
    #[error("face marker set is empty")]
    NoMarkers,
    #[error("face label {0:?} is not a number")]
    BadLabel(String),
}

/// A labeled reference point in the die's local frame
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FaceMarker {
    pub label: String,
    pub offset: Vec3,
}

impl FaceMarker {
    pub fn new(label: impl Into<String>, offset: Vec3) -> Self {
        Self {
            label: label.into(),
            offset,
        }
    }
}

/// Ordered set of face markers (order breaks ties)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FaceMarkers {
    pub markers: Vec<FaceMarker>,
}

impl FaceMarkers {
    pub fn new(markers: impl IntoIterator<Item = FaceMarker>) -> Self {
        Self {
            markers: markers.into_iter().collect(),
        }
    }

    /// Standard six-sided die: opposite faces sum to 7
    pub fn d6(half_extent: f32) -> Self {
        let h = half_extent;
        Self::new([
            FaceMarker::new("1", Vec3::Y * h),
            FaceMarker::new("2", Vec3::X * h),
            FaceMarker::new("3", Vec3::Z * h),
            FaceMarker::new("4", Vec3::NEG_Z * h),
            FaceMarker::new("5", Vec3::NEG_X * h),
            FaceMarker::new("6", Vec3::NEG_Y * h),
        ])
    }

    /// Label values in marker order (unparseable labels skipped)
    pub fn values(&self) -> Vec<u8> {
        self.markers
            .iter()
            .filter_map(|m| m.label.trim().parse().ok())
            .collect()
    }

    /// Marker pointing most directly along `up` for a die at `center` with `rotation`
    pub fn upward_marker(&self, center: Vec3, rotation: Quat, up: Vec3) -> Option<&FaceMarker> {
        let mut best: Option<(&FaceMarker, f32)> = None;
        for marker in &self.markers {
            let world = center + rotation * marker.offset;
            let dot = (world - center).normalize_or_zero().dot(up);
            // Strict comparison keeps the first marker on ties
            if best.is_none_or(|(_, best_dot)| dot > best_dot) {
                best = Some((marker, dot));
            }
        }
        best.map(|(marker, _)| marker)
    }

    /// Read the upward face value
    pub fn read(&self, center: Vec3, rotation: Quat, up: Vec3) -> Result<u8, FaceError> {
        let marker = self
            .upward_marker(center, rotation, up)
            .ok_or(FaceError::NoMarkers)?;
        marker
            .label
            .trim()
            .parse()
            .map_err(|_| FaceError::BadLabel(marker.label.clone()))
    }
}

/// Resolve a face, treating a missing marker set as a configuration error
pub fn resolve_face(
    markers: Option<&FaceMarkers>,
    center: Vec3,
    rotation: Quat,
    up: Vec3,
) -> Result<u8, FaceError> {
    markers.ok_or(FaceError::MissingMarkers)?.read(center, rotation, up)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::consts::WORLD_UP;
    use std::f32::consts::{FRAC_PI_2, PI};

    fn d6() -> FaceMarkers {
        FaceMarkers::d6(0.25)
    }

    #[test]
    fn test_identity_reads_top_face() {
        assert_eq!(d6().read(Vec3::ZERO, Quat::IDENTITY, WORLD_UP), Ok(1));
    }

    #[test]
    fn test_rotations_read_each_face() {
        let center = Vec3::new(3.0, 0.25, -1.0);
        let cases = [
            (Quat::IDENTITY, 1),
            // +X marker rotated up
            (Quat::from_rotation_z(FRAC_PI_2), 2),
            // +Z marker rotated up
            (Quat::from_rotation_x(-FRAC_PI_2), 3),
            (Quat::from_rotation_x(FRAC_PI_2), 4),
            (Quat::from_rotation_z(-FRAC_PI_2), 5),
            (Quat::from_rotation_x(PI), 6),
        ];
        for (rotation, expected) in cases {
            assert_eq!(d6().read(center, rotation, WORLD_UP), Ok(expected), "{rotation:?}");
        }
    }

    #[test]
    fn test_tilted_die_picks_most_upward() {
        // 30° tilt about Z keeps face 1 on top
        let rotation = Quat::from_rotation_z(30f32.to_radians());
        assert_eq!(d6().read(Vec3::ZERO, rotation, WORLD_UP), Ok(1));
        // 60° tilt brings face 2 closer to up
        let rotation = Quat::from_rotation_z(60f32.to_radians());
        assert_eq!(d6().read(Vec3::ZERO, rotation, WORLD_UP), Ok(2));
    }

    #[test]
    fn test_tie_keeps_first_marker() {
        let markers = FaceMarkers::new([
            FaceMarker::new("4", Vec3::new(1.0, 1.0, 0.0)),
            FaceMarker::new("9", Vec3::new(-1.0, 1.0, 0.0)),
        ]);
        assert_eq!(markers.read(Vec3::ZERO, Quat::IDENTITY, WORLD_UP), Ok(4));
    }

    #[test]
    fn test_missing_and_empty_markers() {
        assert_eq!(
            resolve_face(None, Vec3::ZERO, Quat::IDENTITY, WORLD_UP),
            Err(FaceError::MissingMarkers)
        );
        let empty = FaceMarkers::new([]);
        assert_eq!(
            resolve_face(Some(&empty), Vec3::ZERO, Quat::IDENTITY, WORLD_UP),
            Err(FaceError::NoMarkers)
        );
    }

    #[test]
    fn test_bad_label_is_error() {
        let markers = FaceMarkers::new([FaceMarker::new("top", Vec3::Y)]);
        assert_eq!(
            markers.read(Vec3::ZERO, Quat::IDENTITY, WORLD_UP),
            Err(FaceError::BadLabel("top".to_string()))
        );
    }

    #[test]
    fn test_d6_values() {
        assert_eq!(d6().values(), vec![1, 2, 3, 4, 5, 6]);
    }
}
