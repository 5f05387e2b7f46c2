#[cfg(test)]
use test_helpers_async::*;

#[before_all]
#[cfg(test)]
mod solarviz_tests_scene {
    use std::path::PathBuf;

    use chrono::NaiveDate;
    use futures_time::{future::FutureExt, time::Duration};
    use scilib::coordinate::cartesian::Cartesian;
    use solarviz::{
        calendar::ValidDates,
        driver::{self, Exit},
        fixtures::{self, Fixture},
        orbits::{self, SPARSE_STEP_DAYS},
        positions::PositionTable,
        selection::{Mode, Ray},
        session::{Input, Navigation, Session},
        solarviz_log, tracing,
        visibility::VISIBILITY_DISTANCE,
        BODIES,
    };
    use tokio::sync::OnceCell;
    use tokio::time::Instant;

    #[macro_export]
    macro_rules! test {
        ( $x:expr ) => {{
            $x.timeout(Duration::from_secs(TIMEOUT_DURATION)).await?
        }};
    }

    pub fn before_all() {
        tracing::init(Some("(solarviz.*)".to_string()));
        solarviz_log!(info, "tests", "Timeout is {}s", TIMEOUT_DURATION);
    }

    const TIMEOUT_DURATION: u64 = 20;

    fn day(month: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2000, month, d).unwrap()
    }

    static DAILY: OnceCell<PositionTable> = OnceCell::const_new();

    fn assets() -> PathBuf {
        PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("assets")
    }

    async fn fixture_table(fixture: Fixture) -> anyhow::Result<PositionTable> {
        let data = test!(fixtures::read(&assets(), fixture))?;
        Ok(PositionTable::from_slice(&data)?)
    }

    /// The full daily table, parsed once for the whole file.
    async fn daily_table() -> anyhow::Result<PositionTable> {
        let table = DAILY
            .get_or_try_init(|| fixture_table(Fixture::PlanetPositionsDaily))
            .await?;
        Ok(table.clone())
    }

    /// A session over the first month, loaded and resolved on its first day.
    async fn january() -> anyhow::Result<(Session, Instant)> {
        let mut session = Session::new(BODIES, ValidDates::new(day(1, 1), day(1, 31)));
        let now = Instant::now();
        session.handle(Input::PositionsLoaded(daily_table().await?), now);
        session.handle(Input::SetCursor(0), now);
        session.tick(now);
        Ok((session, now))
    }

    fn ray_to(session: &Session, name: &str) -> Ray {
        let camera = session.camera().clone();
        let target = session.body(name).unwrap().coords().clone();
        Ray::new(
            camera.clone(),
            Cartesian {
                x: target.x - camera.x,
                y: target.y - camera.y,
                z: target.z - camera.z,
            },
        )
    }

    #[tokio::test]
    async fn case_01_playback_runs_to_the_end() -> anyhow::Result<()> {
        let (mut session, mut now) = january().await?;
        session.handle(Input::SetSpeed(10), now);
        session.handle(Input::TogglePlay, now);
        for _ in 0..100 {
            now += std::time::Duration::from_millis(16);
            session.tick(now);
        }
        assert_eq!(session.cursor().last_index(), session.cursor().index());
        assert_eq!("2000-01-31", session.date_label());
        assert!(!session.playback().is_playing());
        Ok(())
    }

    #[tokio::test]
    async fn case_02_positions_follow_the_cursor() -> anyhow::Result<()> {
        let (mut session, now) = january().await?;
        let table = daily_table().await?;
        let [x, y, z] = table.raw(day(1, 1), "earth").unwrap();
        assert_eq!(
            Cartesian {
                x: x / 1e6,
                y: y / 1e6,
                z: z / 1e6
            },
            *session.body("earth").unwrap().coords()
        );

        session.handle(Input::DateText("2000-01-15".to_string()), now);
        session.tick(now);
        let [x, _, _] = table.raw(day(1, 15), "earth").unwrap();
        assert_eq!(x / 1e6, session.body("earth").unwrap().coords().x);
        assert_eq!(Cartesian::default(), *session.body("sun").unwrap().coords());
        Ok(())
    }

    #[tokio::test]
    async fn case_03_missing_day_hides_bodies() -> anyhow::Result<()> {
        let first = NaiveDate::from_ymd_opt(2099, 12, 1).unwrap();
        let last = NaiveDate::from_ymd_opt(2100, 1, 31).unwrap();
        let mut session = Session::new(BODIES, ValidDates::new(first, last));
        let now = Instant::now();
        session.handle(Input::PositionsLoaded(daily_table().await?), now);
        session.handle(Input::SetCursor(45), now);
        session.tick(now);
        assert!(session.bodies().iter().filter(|body| !body.is_reference()).all(|body| !body.is_visible()));
        assert!(session.body("sun").unwrap().is_visible());

        session.handle(Input::SetCursor(0), now);
        session.tick(now);
        assert!(session.bodies().iter().all(|body| body.is_visible()));
        Ok(())
    }

    #[tokio::test]
    async fn case_04_measurement() -> anyhow::Result<()> {
        let (mut session, now) = january().await?;
        session.handle(Input::ToggleMeasurement, now);
        assert_eq!(Mode::Measurement, session.selection().mode());

        assert_eq!(None, session.handle(Input::Click(ray_to(&session, "earth")), now));
        assert_eq!(None, session.handle(Input::Click(ray_to(&session, "mars")), now));
        let overlay = session.selection().overlay().unwrap().clone();
        let expected = solarviz::distance(
            session.body("earth").unwrap().coords(),
            session.body("mars").unwrap().coords(),
        );
        assert_eq!(expected, overlay.distance);
        assert_eq!(format!("{:.2} Million km", expected), overlay.label);
        assert!(session.body("earth").unwrap().is_outline_visible());
        assert!(session.body("mars").unwrap().is_outline_visible());

        session.handle(Input::Click(ray_to(&session, "jupiter")), now);
        assert_eq!(&["jupiter".to_string()], session.selection().selected());
        assert!(!session.body("earth").unwrap().is_outline_visible());
        assert!(session.selection().overlay().is_none());

        session.handle(Input::Click(ray_to(&session, "jupiter")), now);
        assert!(session.selection().selected().is_empty());

        session.handle(Input::Click(ray_to(&session, "venus")), now);
        session.handle(Input::ToggleMeasurement, now);
        session.tick(now);
        assert!(session.selection().selected().is_empty());
        assert!(session.bodies().iter().all(|body| !body.is_outline_visible()));
        Ok(())
    }

    #[tokio::test]
    async fn case_05_overlay_follows_playback() -> anyhow::Result<()> {
        let (mut session, mut now) = january().await?;
        session.handle(Input::ToggleMeasurement, now);
        session.handle(Input::Click(ray_to(&session, "earth")), now);
        session.handle(Input::Click(ray_to(&session, "mars")), now);
        let before = session.selection().overlay().unwrap().distance;

        session.handle(Input::SetSpeed(1), now);
        session.handle(Input::TogglePlay, now);
        for _ in 0..20 {
            now += std::time::Duration::from_millis(512);
            session.tick(now);
        }
        assert_eq!(20, session.cursor().index());
        let overlay = session.selection().overlay().unwrap();
        assert_ne!(before, overlay.distance);
        assert_eq!(
            solarviz::distance(
                session.body("earth").unwrap().coords(),
                session.body("mars").unwrap().coords()
            ),
            overlay.distance
        );
        Ok(())
    }

    /// Every visible body shows exactly the representation its camera distance calls for.
    fn assert_representations(session: &Session) {
        for body in session.bodies() {
            let near = solarviz::distance(session.camera(), body.coords()) < VISIBILITY_DISTANCE;
            assert_eq!(near, body.is_near_visible(), "{} near", body.name());
            assert_eq!(!near, body.is_far_visible(), "{} far", body.name());
        }
    }

    #[tokio::test]
    async fn case_06_visibility_switch() -> anyhow::Result<()> {
        let (mut session, now) = january().await?;
        assert_representations(&session);
        assert!(session.body("sun").unwrap().is_far_visible());

        session.handle(Input::MoveCamera(Cartesian::from(0., 0., 20000.)), now);
        session.tick(now);
        assert_representations(&session);
        assert!(session.bodies().iter().all(|body| body.is_far_visible()));

        session.handle(Input::MoveCamera(Cartesian::from(0., -300., 300.)), now);
        session.tick(now);
        assert_representations(&session);
        assert!(session.body("sun").unwrap().is_near_visible());

        let pluto = session.body("pluto").unwrap().coords().clone();
        session.handle(
            Input::MoveCamera(Cartesian {
                x: pluto.x,
                y: pluto.y,
                z: pluto.z + 100.,
            }),
            now,
        );
        session.tick(now);
        assert_representations(&session);
        assert!(session.body("pluto").unwrap().is_near_visible());
        assert!(session.body("saturn").unwrap().is_far_visible());
        Ok(())
    }

    #[tokio::test(flavor = "multi_thread")]
    async fn case_07_driver_navigation() -> anyhow::Result<()> {
        let (session, _) = january().await?;
        let ray = ray_to(&session, "saturn");
        let (input_send, input_recv) = tokio::sync::mpsc::channel(8);
        let (navigation_send, mut navigation_recv) = tokio::sync::mpsc::channel(8);
        let (stop_send, stop_recv) = crossbeam::channel::bounded(1);

        let driver_thread = tokio::spawn(async move {
            let mut session = session;
            driver::run(
                &mut session,
                std::time::Duration::from_millis(10),
                input_recv,
                navigation_send,
                stop_recv,
                |_| Ok(()),
            )
            .await
        });

        input_send.send(Input::Click(ray)).await?;
        assert_eq!(Some(Navigation("saturn".to_string())), test!(navigation_recv.recv()));

        stop_send.send(())?;
        assert_eq!(Exit::Stopped, test!(driver_thread)??);
        Ok(())
    }

    #[tokio::test]
    async fn case_08_whole_range_resolves_every_body() -> anyhow::Result<()> {
        let mut session = Session::new(BODIES, ValidDates::default());
        let now = Instant::now();
        session.handle(Input::PositionsLoaded(daily_table().await?), now);
        assert_eq!(session.dates().len(), session.table()?.len());

        for text in ["2000-01-01", "2026-10-19", "2099-12-31"] {
            session.handle(Input::DateText(text.to_string()), now);
            session.tick(now);
            assert_eq!(text, session.date_label());
            assert!(session.bodies().iter().all(|body| body.is_visible()), "hidden body on {}", text);
            assert_ne!(Cartesian::default(), *session.body("neptune").unwrap().coords());
        }

        session.handle(Input::SetCursor(session.cursor().last_index()), now);
        session.tick(now);
        assert!(session.bodies().iter().all(|body| body.is_visible()));
        Ok(())
    }

    #[tokio::test]
    async fn case_09_orbit_paths_from_sparse_table() -> anyhow::Result<()> {
        let sparse = fixture_table(Fixture::PlanetPositions).await?;
        let paths = orbits::orbit_paths(&sparse, BODIES);
        assert_eq!(9, paths.len());

        let (_, earth) = paths.iter().find(|(name, _)| name == "earth").unwrap();
        assert_eq!(73, earth.len());
        assert_eq!(73, orbits::sample_orbit(&sparse, "earth", SPARSE_STEP_DAYS).len());
        let [x, y, z] = sparse.raw(day(1, 1), "earth").unwrap();
        assert_eq!(Cartesian { x: x / 1e6, y: y / 1e6, z: z / 1e6 }, earth[0]);

        let (_, mercury) = paths.iter().find(|(name, _)| name == "mercury").unwrap();
        assert_eq!(17, mercury.len());
        Ok(())
    }
}
