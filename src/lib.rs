#![forbid(unsafe_code)]

pub mod body;
pub mod calendar;
pub mod client;
pub mod config;
pub mod driver;
pub mod ephemeris;
pub mod error;
pub mod fixtures;
pub mod http;
pub mod images;
pub mod orbits;
pub mod playback;
pub mod positions;
pub mod protocol;
pub mod selection;
pub mod server;
pub mod session;
pub mod stepper;
pub mod systeme_solaire;
pub mod upstream;
pub mod visibility;
pub mod wikipedia;

#[cfg(feature = "tracing")]
pub mod tracing;

pub type Result<T> = std::result::Result<T, crate::error::Error>;

/// Kilometres per scene unit, shared by everything that places or sizes an object.
pub const SCALING_FACTOR: f64 = 1e6;

/// Every solar-system member known to the backend, in display order.
pub const BODIES: [&str; 10] = [
    "sun", "mercury", "venus", "earth", "mars", "jupiter", "saturn", "uranus", "neptune", "pluto",
];

/// The reference body: fixed at the origin, absent from the position table.
pub const REFERENCE_BODY: &str = "sun";

#[macro_export]
macro_rules! solarviz_log {
    ( $level:ident, $section:expr, $fmt:expr $(, $arg:expr)*) => {
        {
            use colored::Colorize;
            use std::hash::{DefaultHasher, Hash, Hasher};
            let level_str = stringify!($level);
            let color_level = match level_str {
                "trace" => (140, 140, 140),
                "debug" => (150, 172, 100),
                "info" => (240, 240, 240),
                "warn" => (237, 99, 0),
                "error" => (219, 9, 23),
                _ => (20, 20, 20)
            };
            let mut s = DefaultHasher::new();
            $section.to_string().hash(&mut s);
            let hash = s.finish();
            let r = (hash & 0xFF) as u8;
            let g = ((hash & 0xFF00) >> 8) as u8;
            let b = ((hash & 0xFF0000) >> 16) as u8;

            log::$level!("{:>15}|{}", $section.to_string().truecolor(r, g, b),
                format!($fmt, $(
                    $arg,
                )*).truecolor(color_level.0, color_level.1, color_level.2)
            )
        }
    }
}

/// Straight-line distance between two scene points.
pub fn distance(a: &scilib::coordinate::cartesian::Cartesian, b: &scilib::coordinate::cartesian::Cartesian) -> f64 {
    let (dx, dy, dz) = (a.x - b.x, a.y - b.y, a.z - b.z);
    (dx * dx + dy * dy + dz * dz).sqrt()
}
