use crate::session::{Input, Navigation, Session};
use crate::{solarviz_log, Result};
use std::time::Duration;
use tokio::sync::mpsc::error::TrySendError;
use tokio::sync::mpsc::{Receiver, Sender};

/// Why the frame loop returned.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Exit {
    Stopped,
    InputsClosed,
}

/// The render loop.
///
/// Frames and input events are handled on this one task, so the session is
/// never touched concurrently. `on_frame` is called after every tick with the
/// updated session. Returning drops the frame interval and the input
/// receiver: nothing fires against the session afterwards.
pub async fn run<F>(
    session: &mut Session,
    frame: Duration,
    mut inputs: Receiver<Input>,
    navigation: Sender<Navigation>,
    stop: crossbeam::channel::Receiver<()>,
    mut on_frame: F,
) -> Result<Exit>
where
    F: FnMut(&Session) -> Result<()>,
{
    let mut frame_delay = tokio::time::interval(frame);
    frame_delay.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Skip);
    let mut ref_instant = tokio::time::Instant::now();

    solarviz_log!(info, "driver", "Frame loop starts, {}ms per frame", frame.as_millis());

    loop {
        tokio::select! {
            // ----------------------------------------------------
            // ON FRAME--------------------------------------------
            now = frame_delay.tick() => {
                if stop.try_recv().is_ok() {
                    solarviz_log!(info, "driver", "Frame loop stops now (on stop channel)!");
                    return Ok(Exit::Stopped);
                }

                let delta = now - ref_instant;
                if delta > frame * 2 {
                    solarviz_log!(warn, "driver", "Frame loop is too slow: {}s", delta.as_secs_f64());
                }
                ref_instant = now;

                session.tick(now);
                on_frame(session)?;
            },
            // ----------------------------------------------------
            // ON INPUT--------------------------------------------
            input = inputs.recv() => {
                let Some(input) = input else {
                    solarviz_log!(info, "driver", "Frame loop stops now (inputs closed)!");
                    return Ok(Exit::InputsClosed);
                };
                if let Some(target) = session.handle(input, tokio::time::Instant::now()) {
                    solarviz_log!(debug, "driver", "Navigate to {}", target.0);
                    match navigation.try_send(target) {
                        Ok(()) => (),
                        Err(TrySendError::Full(Navigation(name))) => {
                            solarviz_log!(warn, "driver", "Navigation queue is full, dropping {}", name);
                        }
                        Err(TrySendError::Closed(_)) => {
                            solarviz_log!(warn, "driver", "Navigation receiver is gone");
                        }
                    }
                }
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::calendar::ValidDates;
    use crate::positions::PositionTable;
    use crate::selection::Ray;
    use chrono::NaiveDate;
    use scilib::coordinate::cartesian::Cartesian;

    fn session() -> Session {
        let first = NaiveDate::from_ymd_opt(2000, 1, 1).unwrap();
        let last = NaiveDate::from_ymd_opt(2000, 1, 5).unwrap();
        Session::new(["sun", "earth"], ValidDates::new(first, last))
    }

    #[tokio::test]
    async fn case_01_stops_on_stop_channel() -> anyhow::Result<()> {
        let mut session = session();
        let (_input_tx, input_rx) = tokio::sync::mpsc::channel(8);
        let (nav_tx, _nav_rx) = tokio::sync::mpsc::channel(8);
        let (stop_tx, stop_rx) = crossbeam::channel::bounded(1);
        stop_tx.send(())?;

        let mut frames = 0;
        let exit = run(&mut session, Duration::from_millis(1), input_rx, nav_tx, stop_rx, |_| {
            frames += 1;
            Ok(())
        })
        .await?;

        assert_eq!(Exit::Stopped, exit);
        assert_eq!(0, frames);
        Ok(())
    }

    #[tokio::test]
    async fn case_02_inputs_then_close() -> anyhow::Result<()> {
        let session = session();
        let (input_tx, input_rx) = tokio::sync::mpsc::channel(8);
        let (nav_tx, mut nav_rx) = tokio::sync::mpsc::channel(8);
        let (_stop_tx, stop_rx) = crossbeam::channel::bounded(1);

        let table = PositionTable::from_slice(br#"{"2000-01-01": {"earth": [100000000.0, 0.0, 0.0]}}"#)?;
        input_tx.send(Input::PositionsLoaded(table)).await?;
        input_tx.send(Input::SetCursor(0)).await?;
        let ray = Ray::new(Cartesian::from(100., -50., 0.), Cartesian::from(0., 1., 0.));

        let driver = tokio::spawn(async move {
            let mut session = session;
            let exit = run(&mut session, Duration::from_millis(5), input_rx, nav_tx, stop_rx, |_| Ok(())).await;
            (session, exit)
        });

        tokio::time::sleep(Duration::from_millis(50)).await;
        input_tx.send(Input::Click(ray)).await?;
        assert_eq!(Some(Navigation("earth".to_string())), nav_rx.recv().await);
        drop(input_tx);

        let (session, exit) = driver.await?;
        assert_eq!(Exit::InputsClosed, exit?);
        assert!(session.is_loaded());
        Ok(())
    }

    #[tokio::test]
    async fn case_03_full_navigation_queue_does_not_stall_frames() -> anyhow::Result<()> {
        let session = session();
        let (input_tx, input_rx) = tokio::sync::mpsc::channel(8);
        let (nav_tx, mut nav_rx) = tokio::sync::mpsc::channel(1);
        let (stop_tx, stop_rx) = crossbeam::channel::bounded(1);

        let table = PositionTable::from_slice(br#"{"2000-01-01": {"earth": [100000000.0, 0.0, 0.0]}}"#)?;
        input_tx.send(Input::PositionsLoaded(table)).await?;
        input_tx.send(Input::SetCursor(0)).await?;
        let ray = Ray::new(Cartesian::from(100., -50., 0.), Cartesian::from(0., 1., 0.));

        let driver = tokio::spawn(async move {
            let mut session = session;
            let mut frames = 0;
            let exit = run(&mut session, Duration::from_millis(5), input_rx, nav_tx, stop_rx, |_| {
                frames += 1;
                Ok(())
            })
            .await;
            (frames, exit)
        });

        tokio::time::sleep(Duration::from_millis(30)).await;
        for _ in 0..3 {
            input_tx.send(Input::Click(ray.clone())).await?;
        }
        tokio::time::sleep(Duration::from_millis(50)).await;
        stop_tx.send(())?;

        let (frames, exit) = tokio::time::timeout(Duration::from_secs(5), driver).await??;
        assert_eq!(Exit::Stopped, exit?);
        assert!(frames > 0);
        assert_eq!(Some(Navigation("earth".to_string())), nav_rx.recv().await);
        assert!(nav_rx.try_recv().is_err());
        Ok(())
    }
}
