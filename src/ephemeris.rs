//! Heliocentric planet positions from mean Keplerian elements.
//!
//! Elements are the J2000 ecliptic mean elements with linear rates per Julian
//! century. Accurate to a fraction of a degree over 1800-2050, drifting
//! slowly outside it.

use crate::calendar::day_key;
use crate::positions::PositionTable;
use crate::solarviz_log;
use chrono::{Datelike, Days, NaiveDate};
use scilib::coordinate::cartesian::Cartesian;
use std::f64::consts::{PI, TAU};

pub const AU_KM: f64 = 149_597_870.7;

/// Julian date at 00:00 UTC of day zero of the common era count.
const JD_CE_OFFSET: f64 = 1_721_424.5;
const JD_J2000: f64 = 2_451_545.0;
const DAYS_PER_CENTURY: f64 = 36_525.;

const KEPLER_TOLERANCE: f64 = 1e-12;
const KEPLER_MAX_ITERATIONS: usize = 32;

/// Semi-major axis (au), eccentricity, then inclination, mean longitude,
/// longitude of perihelion and longitude of the ascending node (degrees).
#[derive(Clone, Copy, Debug)]
struct Elements {
    a: f64,
    e: f64,
    i: f64,
    l: f64,
    peri: f64,
    node: f64,
}

impl Elements {
    fn at(&self, rate: &Elements, centuries: f64) -> Elements {
        Elements {
            a: self.a + rate.a * centuries,
            e: self.e + rate.e * centuries,
            i: self.i + rate.i * centuries,
            l: self.l + rate.l * centuries,
            peri: self.peri + rate.peri * centuries,
            node: self.node + rate.node * centuries,
        }
    }
}

const fn el(a: f64, e: f64, i: f64, l: f64, peri: f64, node: f64) -> Elements {
    Elements { a, e, i, l, peri, node }
}

/// Elements at J2000 and their rates per century. Earth is the Earth-Moon barycenter.
const PLANETS: [(&str, Elements, Elements); 9] = [
    (
        "mercury",
        el(0.38709927, 0.20563593, 7.00497902, 252.25032350, 77.45779628, 48.33076593),
        el(0.00000037, 0.00001906, -0.00594749, 149472.67411175, 0.16047689, -0.12534081),
    ),
    (
        "venus",
        el(0.72333566, 0.00677672, 3.39467605, 181.97909950, 131.60246718, 76.67984255),
        el(0.00000390, -0.00004107, -0.00078890, 58517.81538729, 0.00268329, -0.27769418),
    ),
    (
        "earth",
        el(1.00000261, 0.01671123, -0.00001531, 100.46457166, 102.93768193, 0.0),
        el(0.00000562, -0.00004392, -0.01294668, 35999.37244981, 0.32327364, 0.0),
    ),
    (
        "mars",
        el(1.52371034, 0.09339410, 1.84969142, -4.55343205, -23.94362959, 49.55953891),
        el(0.00001847, 0.00007882, -0.00813131, 19140.30268499, 0.44441088, -0.29257343),
    ),
    (
        "jupiter",
        el(5.20288700, 0.04838624, 1.30439695, 34.39644051, 14.72847983, 100.47390909),
        el(-0.00011607, -0.00013253, -0.00183714, 3034.74612775, 0.21252668, 0.20469106),
    ),
    (
        "saturn",
        el(9.53667594, 0.05386179, 2.48599187, 49.95424423, 92.59887831, 113.66242448),
        el(-0.00125060, -0.00050991, 0.00193609, 1222.49362201, -0.41897216, -0.28867794),
    ),
    (
        "uranus",
        el(19.18916464, 0.04725744, 0.77263783, 313.23810451, 170.95427630, 74.01692503),
        el(-0.00196176, -0.00004397, -0.00242939, 428.48202785, 0.40805281, 0.04240589),
    ),
    (
        "neptune",
        el(30.06992276, 0.00859048, 1.77004347, -55.12002969, 44.96476227, 131.78422574),
        el(0.00026291, 0.00005105, 0.00035372, 218.45945325, -0.32241464, -0.00508664),
    ),
    (
        "pluto",
        el(39.48211675, 0.24882730, 17.14001206, 238.92903833, 224.06891629, 110.30393684),
        el(-0.00031596, 0.00005170, 0.00004818, 145.20780515, -0.04062942, -0.01183482),
    ),
];

/// Names of every body with elements, in display order.
pub fn planets() -> impl Iterator<Item = &'static str> {
    PLANETS.iter().map(|(name, _, _)| *name)
}

/// Julian centuries from J2000 to 00:00 UTC on `date`.
fn centuries(date: NaiveDate) -> f64 {
    let julian_date = f64::from(date.num_days_from_ce()) + JD_CE_OFFSET;
    (julian_date - JD_J2000) / DAYS_PER_CENTURY
}

/// Eccentric anomaly for mean anomaly `m` (radians), by Newton's method.
fn eccentric_anomaly(m: f64, e: f64) -> f64 {
    let mut big_e = m + e * m.sin();
    for _ in 0..KEPLER_MAX_ITERATIONS {
        let delta = (big_e - e * big_e.sin() - m) / (1. - e * big_e.cos());
        big_e -= delta;
        if delta.abs() < KEPLER_TOLERANCE {
            break;
        }
    }
    big_e
}

/// Wraps an angle into [-π, π).
fn wrap(angle: f64) -> f64 {
    (angle + PI).rem_euclid(TAU) - PI
}

/// Heliocentric ecliptic position of `body` in kilometres, `None` for bodies without elements.
pub fn position(body: &str, date: NaiveDate) -> Option<Cartesian> {
    let (_, base, rate) = PLANETS.iter().find(|(name, _, _)| *name == body)?;
    let elements = base.at(rate, centuries(date));

    let (i, node) = (elements.i.to_radians(), elements.node.to_radians());
    let omega = (elements.peri - elements.node).to_radians();
    let m = wrap((elements.l - elements.peri).to_radians());
    let big_e = eccentric_anomaly(m, elements.e);

    let xp = elements.a * (big_e.cos() - elements.e);
    let yp = elements.a * (1. - elements.e * elements.e).sqrt() * big_e.sin();

    let (cw, sw) = (omega.cos(), omega.sin());
    let (cn, sn) = (node.cos(), node.sin());
    let (ci, si) = (i.cos(), i.sin());

    Some(Cartesian {
        x: ((cw * cn - sw * sn * ci) * xp + (-sw * cn - cw * sn * ci) * yp) * AU_KM,
        y: ((cw * sn + sw * cn * ci) * xp + (-sw * sn + cw * cn * ci) * yp) * AU_KM,
        z: ((sw * si) * xp + (cw * si) * yp) * AU_KM,
    })
}

/// A position table from `first` to `last` inclusive, one key every `step_days`.
///
/// Positions are rounded to the kilometre.
pub fn table(first: NaiveDate, last: NaiveDate, step_days: u32) -> PositionTable {
    let step = Days::new(u64::from(step_days.max(1)));
    let mut table = PositionTable::default();
    let mut date = first;
    while date <= last {
        for body in planets() {
            if let Some(p) = position(body, date) {
                table.insert(date, body, [p.x.round(), p.y.round(), p.z.round()]);
            }
        }
        match date.checked_add_days(step) {
            Some(next) => date = next,
            None => break,
        }
    }
    solarviz_log!(
        debug,
        "ephemeris",
        "Generated {} days from {} to {}",
        table.len(),
        day_key(first),
        day_key(last)
    );
    table
}
