use crate::calendar::day_key;
use crate::error::Error;
use crate::{solarviz_log, Result, REFERENCE_BODY, SCALING_FACTOR};
use chrono::NaiveDate;
use scilib::coordinate::cartesian::Cartesian;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap};

/// Precomputed positions in kilometres, keyed by `YYYY-MM-DD` then body name.
///
/// Built once (loaded or generated), then only read.
#[derive(Deserialize, Serialize, Clone, Debug, Default)]
#[serde(transparent)]
pub struct PositionTable {
    days: BTreeMap<String, HashMap<String, [f64; 3]>>,
}

/// Outcome of a lookup for one body on one day.
#[derive(Clone, Debug, PartialEq)]
pub enum Resolved {
    Visible(Cartesian),
    Missing,
}

pub fn scale([x, y, z]: [f64; 3]) -> Cartesian {
    Cartesian {
        x: x / SCALING_FACTOR,
        y: y / SCALING_FACTOR,
        z: z / SCALING_FACTOR,
    }
}

impl PositionTable {
    pub fn from_slice(data: &[u8]) -> Result<Self> {
        serde_json::from_slice(data).map_err(|err| Error::DeserializeError("position table".to_string(), err))
    }

    /// Records the kilometre triple of `body` on `date`.
    pub fn insert(&mut self, date: NaiveDate, body: &str, position: [f64; 3]) {
        self.days
            .entry(day_key(date))
            .or_default()
            .insert(body.to_string(), position);
    }

    pub fn len(&self) -> usize {
        self.days.len()
    }

    pub fn is_empty(&self) -> bool {
        self.days.is_empty()
    }

    /// The stored kilometre triple, unscaled.
    pub fn raw(&self, date: NaiveDate, body: &str) -> Option<[f64; 3]> {
        self.days.get(&day_key(date)).and_then(|bodies| bodies.get(body)).copied()
    }

    /// Scene position of `body` on `date`.
    pub fn resolve_body(&self, date: NaiveDate, body: &str) -> Resolved {
        match self.raw(date, body) {
            Some(position) => Resolved::Visible(scale(position)),
            None => {
                solarviz_log!(trace, "positions", "No position for {} on {}", body, day_key(date));
                Resolved::Missing
            }
        }
    }

    /// Scene positions on `date` of every named body except the reference body.
    pub fn resolve<'a, I>(&self, date: NaiveDate, bodies: I) -> Vec<(&'a str, Resolved)>
    where
        I: IntoIterator<Item = &'a str>,
    {
        bodies
            .into_iter()
            .filter(|body| *body != REFERENCE_BODY)
            .map(|body| (body, self.resolve_body(date, body)))
            .collect()
    }

    /// Day keys in calendar order, with their body maps.
    pub fn days(&self) -> impl Iterator<Item = (&str, &HashMap<String, [f64; 3]>)> {
        self.days.iter().map(|(day, bodies)| (day.as_str(), bodies))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn table() -> PositionTable {
        PositionTable::from_slice(
            br#"{
                "2000-01-01": {"earth": [-26500000.0, 144600000.0, -3000.0], "mars": [206000000.0, 1000000.0, -5000000.0]},
                "2000-01-02": {"earth": [-29000000.0, 144100000.0, -2900.0]}
            }"#,
        )
        .unwrap()
    }

    fn day(d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2000, 1, d).unwrap()
    }

    #[test]
    fn case_01_scaled_lookup() {
        let table = table();
        assert_eq!(2, table.len());
        assert_eq!(
            Resolved::Visible(Cartesian {
                x: -26.5,
                y: 144.6,
                z: -0.003
            }),
            table.resolve_body(day(1), "earth")
        );
        assert_eq!(Some([-29000000.0, 144100000.0, -2900.0]), table.raw(day(2), "earth"));
    }

    #[test]
    fn case_02_missing_body_or_day() {
        let table = table();
        assert_eq!(Resolved::Missing, table.resolve_body(day(2), "mars"));
        assert_eq!(Resolved::Missing, table.resolve_body(day(3), "earth"));
    }

    #[test]
    fn case_03_reference_body_is_skipped() {
        let table = table();
        let resolved = table.resolve(day(1), ["sun", "earth", "mars", "pluto"]);
        let names: Vec<&str> = resolved.iter().map(|(name, _)| *name).collect();
        assert_eq!(vec!["earth", "mars", "pluto"], names);
        assert_eq!(Resolved::Missing, resolved[2].1);
    }

    #[test]
    fn case_04_bad_json() {
        assert!(PositionTable::from_slice(b"[1, 2, 3]").is_err());
    }
}
