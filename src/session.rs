//! The scene session: every piece of mutable scene state behind one owner.
//!
//! All mutation goes through [`Session::handle`] (input events) and
//! [`Session::tick`] (one rendered frame). Both are called from the same task,
//! see [`crate::driver`].

use crate::body::Body;
use crate::calendar::{DateCursor, ValidDates};
use crate::error::Error;
use crate::playback::{Playback, MAX_SPEED, MIN_SPEED};
use crate::positions::{PositionTable, Resolved};
use crate::selection::{hit_test, ClickOutcome, Ray, Selection};
use crate::stepper::{StepOp, Stepper};
use crate::visibility::{self, VISIBILITY_DISTANCE};
use crate::{solarviz_log, Result, SCALING_FACTOR};
use chrono::NaiveDate;
use scilib::coordinate::cartesian::Cartesian;
use tokio::time::Instant;

/// Where the camera starts: behind and above the sun.
pub fn initial_camera() -> Cartesian {
    Cartesian {
        x: 0.,
        y: -5e9 / SCALING_FACTOR,
        z: 5e9 / SCALING_FACTOR,
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum StepTarget {
    Date,
    Speed,
}

#[derive(Clone, Debug)]
pub enum Input {
    Click(Ray),
    TogglePlay,
    SetSpeed(u8),
    StepPress(StepTarget, StepOp),
    StepRelease,
    /// Free text from the date field. Unparsable or out-of-range text is ignored.
    DateText(String),
    SetCursor(usize),
    ToggleMeasurement,
    MoveCamera(Cartesian),
    /// The position table arrived from the data-fetch collaborator.
    PositionsLoaded(PositionTable),
}

/// A body clicked in navigation mode, for the page router.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Navigation(pub String);

#[derive(Debug)]
pub struct Session {
    bodies: Vec<Body>,
    camera: Cartesian,
    threshold: f64,
    dates: ValidDates,
    cursor: DateCursor,
    playback: Playback,
    selection: Selection,
    date_stepper: Stepper,
    speed_stepper: Stepper,
    table: Option<PositionTable>,
    resolved: Option<usize>,
}

impl Session {
    /// One body per name, in order. The cursor starts on today when in range.
    pub fn new<I, S>(names: I, dates: ValidDates) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let bodies: Vec<Body> = names.into_iter().map(|name| Body::new(name.as_ref())).collect();
        let cursor = DateCursor::starting_today(&dates);
        let playback = Playback::default();
        solarviz_log!(
            info,
            "session",
            "New session with {} bodies, {} days",
            bodies.len(),
            dates.len()
        );
        Self {
            bodies,
            camera: initial_camera(),
            threshold: VISIBILITY_DISTANCE,
            dates,
            date_stepper: Stepper::new(cursor.index() as i64, 0, cursor.last_index() as i64, 1),
            speed_stepper: Stepper::new(
                i64::from(playback.speed()),
                i64::from(MIN_SPEED),
                i64::from(MAX_SPEED),
                1,
            ),
            cursor,
            playback,
            selection: Selection::default(),
            table: None,
            resolved: None,
        }
    }

    pub fn bodies(&self) -> &[Body] {
        &self.bodies
    }

    pub fn body(&self, name: &str) -> Option<&Body> {
        self.bodies.iter().find(|body| body.name() == name)
    }

    pub fn camera(&self) -> &Cartesian {
        &self.camera
    }

    pub fn dates(&self) -> &ValidDates {
        &self.dates
    }

    pub fn cursor(&self) -> &DateCursor {
        &self.cursor
    }

    pub fn date(&self) -> NaiveDate {
        self.dates.date_from_cursor(self.cursor.index())
    }

    pub fn date_label(&self) -> String {
        self.dates.format_cursor(self.cursor.index())
    }

    pub fn playback(&self) -> &Playback {
        &self.playback
    }

    pub fn selection(&self) -> &Selection {
        &self.selection
    }

    pub fn is_loaded(&self) -> bool {
        self.table.is_some()
    }

    pub fn table(&self) -> Result<&PositionTable> {
        self.table.as_ref().ok_or(Error::PositionTableNotLoaded)
    }

    /// Keeps the first table only. Returns whether this one was taken.
    pub fn load(&mut self, table: PositionTable) -> bool {
        if self.table.is_some() {
            solarviz_log!(warn, "session", "Position table already loaded, ignoring");
            return false;
        }
        solarviz_log!(info, "session", "Position table loaded ({} days)", table.len());
        self.table = Some(table);
        self.resolved = None;
        true
    }

    pub fn handle(&mut self, input: Input, now: Instant) -> Option<Navigation> {
        match input {
            Input::Click(ray) => {
                let name = hit_test(&ray, &self.bodies)?.to_string();
                let outcome = self.selection.click(&name, &self.bodies);
                solarviz_log!(debug, "session", "Hit {}: {:?}", name, outcome);
                self.sync_outlines();
                if let ClickOutcome::Navigate(name) = outcome {
                    return Some(Navigation(name));
                }
            }
            Input::TogglePlay => self.playback.toggle(now),
            Input::SetSpeed(speed) => {
                self.playback.set_speed(speed, now);
                self.speed_stepper.set(i64::from(self.playback.speed()));
            }
            Input::StepPress(target, op) => {
                self.stepper(target).press(op, now);
                self.apply_stepper(target, now);
            }
            Input::StepRelease => {
                self.date_stepper.release();
                self.speed_stepper.release();
            }
            Input::DateText(text) => match self.dates.parse_cursor(&text) {
                Some(index) => self.set_cursor(index),
                None => solarviz_log!(debug, "session", "Ignoring date {:?}", text),
            },
            Input::SetCursor(index) => self.set_cursor(index),
            Input::ToggleMeasurement => {
                self.selection.toggle_mode();
                self.sync_outlines();
            }
            Input::MoveCamera(camera) => self.camera = camera,
            Input::PositionsLoaded(table) => {
                self.load(table);
            }
        }
        None
    }

    /// One frame.
    pub fn tick(&mut self, now: Instant) {
        if self.date_stepper.tick(now) {
            self.apply_stepper(StepTarget::Date, now);
        }
        if self.speed_stepper.tick(now) {
            self.apply_stepper(StepTarget::Speed, now);
        }

        if self.table.is_some() && self.playback.tick(now, &mut self.cursor) {
            self.date_stepper.set(self.cursor.index() as i64);
        }

        if self.resolved != Some(self.cursor.index()) {
            self.resolve();
        }

        for body in self.bodies.iter_mut() {
            body.spin();
        }

        if !self.selection.is_measuring() && self.selection.overlay().is_some() {
            self.selection.clear();
        }
        self.sync_outlines();

        for body in self.bodies.iter_mut() {
            visibility::apply(body, &self.camera, self.threshold);
        }

        self.selection.refresh(&self.bodies);
    }

    fn stepper(&mut self, target: StepTarget) -> &mut Stepper {
        match target {
            StepTarget::Date => &mut self.date_stepper,
            StepTarget::Speed => &mut self.speed_stepper,
        }
    }

    fn apply_stepper(&mut self, target: StepTarget, now: Instant) {
        match target {
            StepTarget::Date => {
                self.cursor.set(self.date_stepper.value() as usize);
            }
            StepTarget::Speed => {
                let speed = u8::try_from(self.speed_stepper.value()).unwrap_or(MAX_SPEED);
                self.playback.set_speed(speed, now);
            }
        }
    }

    fn set_cursor(&mut self, index: usize) {
        self.cursor.set(index);
        self.date_stepper.set(self.cursor.index() as i64);
    }

    /// Places every body for the displayed day. Without a table this is a no-op.
    fn resolve(&mut self) {
        let Some(table) = &self.table else {
            return;
        };
        let date = self.date();
        let names: Vec<String> = self.bodies.iter().map(|body| body.name().to_string()).collect();
        for (name, resolved) in table.resolve(date, names.iter().map(String::as_str)) {
            let Some(body) = self.bodies.iter_mut().find(|body| body.name() == name) else {
                continue;
            };
            match resolved {
                Resolved::Visible(coords) => {
                    body.coords = coords;
                    body.visible = true;
                }
                Resolved::Missing => body.visible = false,
            }
        }
        self.resolved = Some(self.cursor.index());
    }

    /// Outlines follow the selection, and only in measurement mode.
    fn sync_outlines(&mut self) {
        let measuring = self.selection.is_measuring();
        for body in self.bodies.iter_mut() {
            body.outline_visible = measuring && self.selection.is_selected(body.name());
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::BODIES;
    use std::time::Duration;

    fn day(d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2000, 1, d).unwrap()
    }

    fn session() -> Session {
        Session::new(BODIES, ValidDates::new(day(1), day(3)))
    }

    fn table() -> PositionTable {
        PositionTable::from_slice(
            br#"{
                "2000-01-01": {"earth": [1000000000.0, 0.0, 0.0], "mars": [2000000000.0, 0.0, 0.0]},
                "2000-01-02": {"earth": [1100000000.0, 0.0, 0.0]},
                "2000-01-03": {"earth": [1200000000.0, 0.0, 0.0], "mars": [2200000000.0, 0.0, 0.0]}
            }"#,
        )
        .unwrap()
    }

    #[test]
    fn case_01_no_table_is_no_op() {
        let mut session = session();
        let now = Instant::now();
        session.handle(Input::SetCursor(0), now);
        session.handle(Input::TogglePlay, now);
        session.tick(now + Duration::from_secs(1));
        assert_eq!(0, session.cursor().index());
        assert!(session.bodies().iter().all(Body::is_visible));
        assert_eq!(Cartesian::default(), *session.body("earth").unwrap().coords());
        assert!(matches!(session.table(), Err(Error::PositionTableNotLoaded)));
    }

    #[test]
    fn case_02_resolve_on_load() {
        let mut session = session();
        let now = Instant::now();
        session.handle(Input::SetCursor(1), now);
        session.handle(Input::PositionsLoaded(table()), now);
        assert!(!session.load(table()));
        session.tick(now);
        assert_eq!(Cartesian::from(1100., 0., 0.), *session.body("earth").unwrap().coords());
        assert!(!session.body("mars").unwrap().is_visible());
        assert!(session.body("sun").unwrap().is_visible());

        session.handle(Input::DateText("2000-01-03".to_string()), now);
        session.tick(now);
        assert!(session.body("mars").unwrap().is_visible());
        assert_eq!(Cartesian::from(2200., 0., 0.), *session.body("mars").unwrap().coords());
    }

    #[test]
    fn case_03_bad_date_text_keeps_cursor() {
        let mut session = session();
        let now = Instant::now();
        session.handle(Input::SetCursor(1), now);
        session.handle(Input::DateText("2000-01-09".to_string()), now);
        session.handle(Input::DateText("soon".to_string()), now);
        assert_eq!("2000-01-02", session.date_label());
    }

    #[test]
    fn case_04_navigation_click() {
        let mut session = session();
        let now = Instant::now();
        session.handle(Input::PositionsLoaded(table()), now);
        session.handle(Input::SetCursor(0), now);
        session.tick(now);
        let ray = Ray::new(Cartesian::from(1000., -100., 0.), Cartesian::from(0., 1., 0.));
        assert_eq!(
            Some(Navigation("earth".to_string())),
            session.handle(Input::Click(ray.clone()), now)
        );
        let miss = Ray::new(Cartesian::from(1500., -100., 0.), Cartesian::from(0., 1., 0.));
        assert_eq!(None, session.handle(Input::Click(miss), now));
    }

    #[test]
    fn case_05_date_stepper_hold() {
        let mut session = Session::new(BODIES, ValidDates::default());
        let now = Instant::now();
        session.handle(Input::SetCursor(0), now);
        session.handle(Input::StepPress(StepTarget::Date, StepOp::Increment), now);
        assert_eq!(1, session.cursor().index());
        session.tick(now + Duration::from_millis(600));
        assert_eq!(4, session.cursor().index());
        session.handle(Input::StepRelease, now + Duration::from_millis(600));
        session.tick(now + Duration::from_secs(2));
        assert_eq!(4, session.cursor().index());
    }

    #[test]
    fn case_06_speed_input_and_stepper() {
        let mut session = session();
        let now = Instant::now();
        session.handle(Input::SetSpeed(42), now);
        assert_eq!(MAX_SPEED, session.playback().speed());
        session.handle(Input::StepPress(StepTarget::Speed, StepOp::Decrement), now);
        session.handle(Input::StepRelease, now);
        assert_eq!(9, session.playback().speed());
    }
}
