//! Target zone sampling
//!
//! A flat rectangle the dice are thrown toward. Points are drawn uniformly in
//! the zone's local XY plane and mapped into world space.

use glam::{Quat, Vec3};
use rand::Rng;

use crate::tuning::ZoneTuning;

/// Rectangular aim region
#[derive(Debug, Clone, PartialEq)]
pub struct TargetZone {
    pub origin: Vec3,
    pub rotation: Quat,
    pub width: f32,
    pub height: f32,
    /// Most recent sample (diagnostics only)
    last_sampled: Option<Vec3>,
}

impl TargetZone {
    pub fn new(origin: Vec3, rotation: Quat, width: f32, height: f32) -> Self {
        Self {
            origin,
            rotation: rotation.normalize(),
            width: width.abs(),
            height: height.abs(),
            last_sampled: None,
        }
    }

    pub fn from_tuning(tuning: &ZoneTuning) -> Self {
        Self::new(tuning.origin, tuning.rotation, tuning.width, tuning.height)
    }

    /// Map a point from the zone's local frame into world space
    #[inline]
    pub fn to_world(&self, local: Vec3) -> Vec3 {
        self.origin + self.rotation * local
    }

    /// Uniformly distributed point over the rectangle, in world space
    pub fn sample_point<R: Rng + ?Sized>(&mut self, rng: &mut R) -> Vec3 {
        let half_w = self.width * 0.5;
        let half_h = self.height * 0.5;
        let local = Vec3::new(
            rng.random_range(-half_w..=half_w),
            rng.random_range(-half_h..=half_h),
            0.0,
        );
        let point = self.to_world(local);
        self.last_sampled = Some(point);
        point
    }

    /// Zone origin in world space
    pub fn center_point(&self) -> Vec3 {
        self.origin
    }

    pub fn last_sampled(&self) -> Option<Vec3> {
        self.last_sampled
    }

    /// Check whether a world point lies on the zone rectangle (within `tolerance` off-plane)
    pub fn contains(&self, point: Vec3, tolerance: f32) -> bool {
        let local = self.rotation.inverse() * (point - self.origin);
        local.x.abs() <= self.width * 0.5 + tolerance
            && local.y.abs() <= self.height * 0.5 + tolerance
            && local.z.abs() <= tolerance
    }
}

impl Default for TargetZone {
    fn default() -> Self {
        Self::from_tuning(&ZoneTuning::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand_pcg::Pcg32;

    #[test]
    fn test_samples_stay_inside_zone() {
        let mut zone = TargetZone::default();
        let mut rng = Pcg32::seed_from_u64(7);
        for _ in 0..500 {
            let p = zone.sample_point(&mut rng);
            assert!(zone.contains(p, 1e-4), "sample {p:?} left the zone");
        }
    }

    #[test]
    fn test_flat_zone_samples_on_table_plane() {
        let mut zone = TargetZone::default();
        let mut rng = Pcg32::seed_from_u64(11);
        for _ in 0..100 {
            let p = zone.sample_point(&mut rng);
            assert!(p.y.abs() < 1e-5);
            assert!(p.x.abs() <= 1.0 + 1e-5 && p.z.abs() <= 1.0 + 1e-5);
        }
    }

    #[test]
    fn test_last_sampled_tracks_latest_point() {
        let mut zone = TargetZone::new(Vec3::new(1.0, 2.0, 3.0), Quat::IDENTITY, 4.0, 1.0);
        assert_eq!(zone.last_sampled(), None);
        let mut rng = Pcg32::seed_from_u64(3);
        let p = zone.sample_point(&mut rng);
        assert_eq!(zone.last_sampled(), Some(p));
        assert_eq!(zone.center_point(), Vec3::new(1.0, 2.0, 3.0));
        // Identity rotation keeps samples in the XY plane at the origin's z
        assert!((p.z - 3.0).abs() < 1e-6);
    }

    #[test]
    fn test_degenerate_zone_returns_center() {
        let mut zone = TargetZone::new(Vec3::new(0.5, 0.0, -0.5), Quat::IDENTITY, 0.0, 0.0);
        let mut rng = Pcg32::seed_from_u64(1);
        assert_eq!(zone.sample_point(&mut rng), zone.center_point());
    }
}
