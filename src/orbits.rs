use crate::positions::{scale, PositionTable};
use crate::solarviz_log;
use scilib::coordinate::cartesian::Cartesian;

/// Spacing of the day keys in the sparse position table.
pub const SPARSE_STEP_DAYS: u32 = 5;

/// Days per revolution around the sun.
pub fn orbital_period(body: &str) -> Option<f64> {
    match body {
        "mercury" => Some(88.),
        "venus" => Some(225.),
        "earth" => Some(365.25),
        "mars" => Some(687.),
        "jupiter" => Some(4333.),
        "saturn" => Some(10759.),
        "uranus" => Some(30687.),
        "neptune" => Some(60190.),
        "pluto" => Some(90560.),
        _ => None,
    }
}

/// Scene positions of `body` over its first revolution.
///
/// `step_days` is the spacing of the table's day keys: the sparse table is
/// sampled every few days, so one revolution covers `period / step_days`
/// consecutive keys. Keys without the body are skipped, and sampling stops
/// early when the table runs out.
pub fn sample_orbit(table: &PositionTable, body: &str, step_days: u32) -> Vec<Cartesian> {
    let Some(period) = orbital_period(body) else {
        return Vec::new();
    };
    let samples = (period / f64::from(step_days.max(1))).floor() as usize;
    if samples > table.len() {
        solarviz_log!(
            debug,
            "orbits",
            "Only {} of {} samples available for {}",
            table.len(),
            samples,
            body
        );
    }

    table
        .days()
        .take(samples)
        .filter_map(|(day, bodies)| match bodies.get(body) {
            Some(position) => Some(scale(*position)),
            None => {
                solarviz_log!(trace, "orbits", "No position for {} on {}", body, day);
                None
            }
        })
        .collect()
}

/// One revolution per named body, sampled from the sparse table.
pub fn orbit_paths<'a, I>(sparse: &PositionTable, bodies: I) -> Vec<(String, Vec<Cartesian>)>
where
    I: IntoIterator<Item = &'a str>,
{
    bodies
        .into_iter()
        .filter(|body| orbital_period(body).is_some())
        .map(|body| (body.to_string(), sample_orbit(sparse, body, SPARSE_STEP_DAYS)))
        .collect()
}
