use crate::{REFERENCE_BODY, SCALING_FACTOR};
use scilib::coordinate::cartesian::Cartesian;

pub const SUN_RADIUS: f64 = 1.5e7 / SCALING_FACTOR;
pub const PLANET_RADIUS: f64 = 1e7 / SCALING_FACTOR;
pub const OUTLINE_RATIO: f64 = 1.1;

/// Spin per rendered frame, in radians.
pub fn rotating_speed(name: &str) -> f64 {
    match name {
        "mercury" => 0.004,
        "venus" => -0.015,
        "earth" => 0.01,
        "mars" => 0.008,
        "jupiter" => 0.002,
        "saturn" => 0.009,
        "uranus" => 0.01,
        "neptune" => 0.004,
        "pluto" => 0.01,
        _ => 0.,
    }
}

/// One solar-system member in the scene.
///
/// `visible` hides the whole body (no position for the displayed day).
/// Exactly one of `near_visible` / `far_visible` is set at a time; the outline
/// is independent and only follows the measurement selection.
#[derive(Clone, Debug)]
pub struct Body {
    pub(crate) name: String,
    pub(crate) coords: Cartesian,
    pub(crate) rotation: f64,
    pub(crate) rotating_speed: f64,
    pub(crate) radius: f64,
    pub(crate) visible: bool,
    pub(crate) near_visible: bool,
    pub(crate) far_visible: bool,
    pub(crate) outline_visible: bool,
}

impl PartialEq for Body {
    fn eq(&self, other: &Self) -> bool {
        self.name == other.name
    }
}

impl Body {
    pub fn new(name: &str) -> Self {
        let radius = if name == REFERENCE_BODY {
            SUN_RADIUS
        } else {
            PLANET_RADIUS
        };
        Self {
            name: name.to_string(),
            coords: Cartesian::default(),
            rotation: 0.,
            rotating_speed: rotating_speed(name),
            radius,
            visible: true,
            near_visible: true,
            far_visible: false,
            outline_visible: false,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn coords(&self) -> &Cartesian {
        &self.coords
    }

    pub fn rotation(&self) -> f64 {
        self.rotation
    }

    pub fn radius(&self) -> f64 {
        self.radius
    }

    pub fn outline_radius(&self) -> f64 {
        self.radius * OUTLINE_RATIO
    }

    pub fn is_visible(&self) -> bool {
        self.visible
    }

    pub fn is_near_visible(&self) -> bool {
        self.near_visible
    }

    pub fn is_far_visible(&self) -> bool {
        self.far_visible
    }

    pub fn is_outline_visible(&self) -> bool {
        self.outline_visible
    }

    pub fn is_reference(&self) -> bool {
        self.name == REFERENCE_BODY
    }

    pub(crate) fn spin(&mut self) {
        self.rotation = (self.rotation + self.rotating_speed).rem_euclid(std::f64::consts::TAU);
    }
}
