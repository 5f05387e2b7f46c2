//! Body picking and the two-body distance measurement.

use crate::body::Body;
use crate::{distance, solarviz_log};
use scilib::coordinate::cartesian::Cartesian;

/// Upward offset of the distance label above the line's midpoint.
pub const LABEL_OFFSET: f64 = 5.;
pub const MIN_LABEL_SCALE: f64 = 4.;

/// Pointer ray in scene units. The direction does not need to be normalised.
#[derive(Clone, Debug, PartialEq)]
pub struct Ray {
    pub origin: Cartesian,
    pub direction: Cartesian,
}

impl Ray {
    pub fn new(origin: Cartesian, direction: Cartesian) -> Self {
        Self { origin, direction }
    }

    /// Ray parameter of the first intersection with a sphere, if in front of the origin.
    pub fn sphere_hit(&self, center: &Cartesian, radius: f64) -> Option<f64> {
        let d = &self.direction;
        let (ox, oy, oz) = (self.origin.x - center.x, self.origin.y - center.y, self.origin.z - center.z);
        let a = d.x * d.x + d.y * d.y + d.z * d.z;
        if a == 0. {
            return None;
        }
        let b = 2. * (ox * d.x + oy * d.y + oz * d.z);
        let c = ox * ox + oy * oy + oz * oz - radius * radius;
        let discriminant = b * b - 4. * a * c;
        if discriminant < 0. {
            return None;
        }
        let root = discriminant.sqrt();
        let near = (-b - root) / (2. * a);
        let far = (-b + root) / (2. * a);
        if near >= 0. {
            Some(near)
        } else if far >= 0. {
            Some(far)
        } else {
            None
        }
    }
}

/// Nearest body whose solid sphere the ray crosses. Hidden bodies are skipped.
pub fn hit_test<'a, I>(ray: &Ray, bodies: I) -> Option<&'a str>
where
    I: IntoIterator<Item = &'a Body>,
{
    bodies
        .into_iter()
        .filter(|body| body.is_visible())
        .filter_map(|body| ray.sphere_hit(body.coords(), body.radius()).map(|t| (t, body.name())))
        .min_by(|(a, _), (b, _)| a.total_cmp(b))
        .map(|(_, name)| name)
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
pub enum Mode {
    #[default]
    Navigation,
    Measurement,
}

/// What a successful hit did.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ClickOutcome {
    /// Navigation mode: hand the body to the page router.
    Navigate(String),
    /// The body was already selected, everything was deselected.
    Cleared,
    /// Two were selected, the new body starts a fresh selection.
    Restarted,
    Selected,
    /// The second body was selected and the overlay computed.
    Measured,
}

/// Line between two selected bodies with its label.
#[derive(Clone, Debug, PartialEq)]
pub struct DistanceOverlay {
    pub from: String,
    pub to: String,
    pub start: Cartesian,
    pub end: Cartesian,
    /// Scene units, i.e. millions of km.
    pub distance: f64,
    pub label_position: Cartesian,
    pub label_scale: f64,
    pub label: String,
}

impl DistanceOverlay {
    pub fn between(a: &Body, b: &Body) -> Self {
        let start = a.coords().clone();
        let end = b.coords().clone();
        let distance = distance(&start, &end);
        let label_position = Cartesian {
            x: (start.x + end.x) / 2.,
            y: (start.y + end.y) / 2. + LABEL_OFFSET,
            z: (start.z + end.z) / 2.,
        };
        Self {
            from: a.name().to_string(),
            to: b.name().to_string(),
            start,
            end,
            distance,
            label_position,
            label_scale: label_scale(distance),
            label: format!("{:.2} Million km", distance),
        }
    }
}

pub fn label_scale(distance: f64) -> f64 {
    (distance * distance / 100.).max(MIN_LABEL_SCALE)
}

/// Interaction mode, the (at most two) selected bodies and their overlay.
#[derive(Clone, Debug, Default)]
pub struct Selection {
    mode: Mode,
    selected: Vec<String>,
    overlay: Option<DistanceOverlay>,
}

impl Selection {
    pub fn mode(&self) -> Mode {
        self.mode
    }

    pub fn is_measuring(&self) -> bool {
        self.mode == Mode::Measurement
    }

    pub fn selected(&self) -> &[String] {
        &self.selected
    }

    pub fn is_selected(&self, name: &str) -> bool {
        self.selected.iter().any(|selected| selected == name)
    }

    pub fn overlay(&self) -> Option<&DistanceOverlay> {
        self.overlay.as_ref()
    }

    pub fn clear(&mut self) {
        self.selected.clear();
        self.overlay = None;
    }

    /// Entering or leaving measurement always starts from an empty selection.
    pub fn set_mode(&mut self, mode: Mode) {
        solarviz_log!(debug, "selection", "Mode {:?}", mode);
        self.mode = mode;
        self.clear();
    }

    pub fn toggle_mode(&mut self) {
        let mode = match self.mode {
            Mode::Navigation => Mode::Measurement,
            Mode::Measurement => Mode::Navigation,
        };
        self.set_mode(mode);
    }

    /// Applies a hit on `name`. `bodies` supplies the current positions.
    pub fn click(&mut self, name: &str, bodies: &[Body]) -> ClickOutcome {
        if self.mode == Mode::Navigation {
            return ClickOutcome::Navigate(name.to_string());
        }
        if self.is_selected(name) {
            self.clear();
            return ClickOutcome::Cleared;
        }
        if self.selected.len() == 2 {
            self.clear();
            self.selected.push(name.to_string());
            return ClickOutcome::Restarted;
        }
        self.selected.push(name.to_string());
        if self.selected.len() == 2 {
            self.refresh(bodies);
            return ClickOutcome::Measured;
        }
        ClickOutcome::Selected
    }

    /// Recomputes the overlay from the bodies' current positions.
    pub fn refresh(&mut self, bodies: &[Body]) {
        self.overlay = match self.selected.as_slice() {
            [a, b] => {
                let a = bodies.iter().find(|body| body.name() == a);
                let b = bodies.iter().find(|body| body.name() == b);
                match (a, b) {
                    (Some(a), Some(b)) => Some(DistanceOverlay::between(a, b)),
                    _ => None,
                }
            }
            _ => None,
        };
    }
}
