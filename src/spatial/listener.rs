use crate::camera::CameraFeed;
use crate::math::{QUARTER_TURN, Rotator, Vec3};
use crate::spatial::coords::{to_engine_direction, to_engine_space};

/// Listener position and orientation in engine space.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ListenerPose {
    pub position: Vec3,
    pub forward: Vec3,
    pub up: Vec3,
}

impl ListenerPose {
    /// Right-hand direction completing the orientation basis.
    pub fn right(&self) -> Vec3 {
        self.up.cross(self.forward)
    }
}

/// Builds the listener pose from the camera feed.
///
/// With `stationary` set, or when no live pose is available, the listener sits
/// at the origin at the camera profile's height, facing along game +Y.
pub fn listener_pose(camera: &dyn CameraFeed, stationary: bool) -> ListenerPose {
    let live = if stationary { None } else { camera.live_pose() };

    let (position, rotation) = match live {
        Some(pose) => (pose.position, pose.rotation),
        None => {
            let profile = camera.profile();
            let position = Vec3::new(0.0, 0.0, profile.height);
            let rotation = Rotator::new((profile.pitch + 0.5) as i32, QUARTER_TURN, 0);
            (position, rotation)
        }
    };

    ListenerPose {
        position: to_engine_space(position),
        forward: to_engine_direction(rotation.forward()),
        up: to_engine_direction(rotation.up()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::camera::{CameraPose, CameraProfile, FixedCameraFeed};

    struct StubFeed {
        pose: Option<CameraPose>,
    }

    impl CameraFeed for StubFeed {
        fn live_pose(&self) -> Option<CameraPose> {
            self.pose
        }

        fn profile(&self) -> CameraProfile {
            CameraProfile::default()
        }
    }

    fn assert_close(actual: Vec3, expected: Vec3) {
        assert!(
            (actual - expected).length() < 1e-3,
            "expected {expected:?}, got {actual:?}"
        );
    }

    #[test]
    fn stationary_pose_uses_the_profile() {
        let feed = FixedCameraFeed::new(CameraProfile::default());
        let pose = listener_pose(&feed, true);

        // 100 game units of height is one engine meter of +Y.
        assert_close(pose.position, Vec3::new(0.0, 1.0, 0.0));
        // Facing game +Y maps onto engine -X.
        assert_close(pose.forward, Vec3::new(-1.0, 0.0, 0.0));
        assert_close(pose.up, Vec3::new(0.0, 1.0, 0.0));
    }

    #[test]
    fn missing_live_pose_falls_back_to_the_profile() {
        let feed = StubFeed { pose: None };
        let fallback = listener_pose(&FixedCameraFeed::default(), true);
        assert_eq!(listener_pose(&feed, false), fallback);
    }

    #[test]
    fn live_pose_wins_when_tracking() {
        let feed = StubFeed {
            pose: Some(CameraPose::new(
                Vec3::new(500.0, 0.0, 0.0),
                Rotator::new(0, 0, 0),
            )),
        };
        let pose = listener_pose(&feed, false);

        assert_close(pose.position, Vec3::new(0.0, 0.0, 5.0));
        // Facing game +X maps onto engine +Z.
        assert_close(pose.forward, Vec3::new(0.0, 0.0, 1.0));
    }

    #[test]
    fn live_pose_is_ignored_when_stationary() {
        let feed = StubFeed {
            pose: Some(CameraPose::new(
                Vec3::new(500.0, 0.0, 0.0),
                Rotator::new(0, 0, 0),
            )),
        };
        let stationary = listener_pose(&feed, true);
        let fallback = listener_pose(&FixedCameraFeed::default(), true);
        assert_eq!(stationary, fallback);
    }

    #[test]
    fn right_completes_the_basis() {
        let pose = listener_pose(&FixedCameraFeed::default(), true);
        // Facing engine -X with +Y up puts the right hand on +Z.
        assert_close(pose.right(), Vec3::new(0.0, 0.0, 1.0));
    }
}
