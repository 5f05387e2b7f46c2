use crate::body::Body;
use crate::{distance, SCALING_FACTOR};
use scilib::coordinate::cartesian::Cartesian;

/// Camera distance below which a body is drawn as a solid mesh.
pub const VISIBILITY_DISTANCE: f64 = 5e9 / SCALING_FACTOR;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Representation {
    Near,
    Far,
}

pub fn representation(camera: &Cartesian, body: &Cartesian, threshold: f64) -> Representation {
    if distance(camera, body) < threshold {
        Representation::Near
    } else {
        Representation::Far
    }
}

/// Re-evaluated every frame from scratch. Never touches the outline.
pub fn apply(body: &mut Body, camera: &Cartesian, threshold: f64) {
    let near = representation(camera, &body.coords, threshold) == Representation::Near;
    body.near_visible = near;
    body.far_visible = !near;
}
