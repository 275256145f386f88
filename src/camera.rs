//! Listener camera inputs supplied by the host.

use crate::math::{Rotator, Vec3};

/// Live camera transform in game space.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CameraPose {
    pub position: Vec3,
    pub rotation: Rotator,
}

impl CameraPose {
    pub fn new(position: Vec3, rotation: Rotator) -> Self {
        Self { position, rotation }
    }
}

/// Last observed camera settings, used for the stationary listener.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CameraProfile {
    /// Camera height above the ground in game units.
    pub height: f32,
    /// Camera pitch setting.
    pub pitch: f32,
}

impl Default for CameraProfile {
    fn default() -> Self {
        Self {
            height: 100.0,
            pitch: -3.0,
        }
    }
}

/// Source of listener geometry.
///
/// The host implements this to expose its camera. [`live_pose`] returns
/// `None` whenever no camera exists (menus, loading screens), which makes the
/// engine fall back to a stationary listener built from [`profile`].
///
/// [`live_pose`]: CameraFeed::live_pose
/// [`profile`]: CameraFeed::profile
pub trait CameraFeed: Send + Sync {
    /// Current camera transform, or `None` when no camera is available.
    fn live_pose(&self) -> Option<CameraPose>;

    /// Last observed camera settings.
    fn profile(&self) -> CameraProfile;
}

/// Camera feed with no live camera and a fixed profile.
///
/// Useful for hosts without a camera and as the menu/preview fallback.
#[derive(Debug, Clone, Copy, Default)]
pub struct FixedCameraFeed {
    profile: CameraProfile,
}

impl FixedCameraFeed {
    pub fn new(profile: CameraProfile) -> Self {
        Self { profile }
    }
}

impl CameraFeed for FixedCameraFeed {
    fn live_pose(&self) -> Option<CameraPose> {
        None
    }

    fn profile(&self) -> CameraProfile {
        self.profile
    }
}
