use std::path::PathBuf;
use std::sync::{Arc, Mutex};
use std::time::Duration;
use std::{env, io};

use clap::Parser;
use crossterm::event::{
    DisableMouseCapture, EnableMouseCapture, Event, EventStream, KeyCode, KeyEvent, KeyEventKind,
    KeyboardEnhancementFlags, MouseButton, MouseEventKind, PopKeyboardEnhancementFlags,
    PushKeyboardEnhancementFlags,
};
use crossterm::execute;
use futures::StreamExt;
use ratatui::layout::{Constraint, Layout, Rect};
use ratatui::style::{Color, Stylize};
use ratatui::symbols::Marker;
use ratatui::text::Line;
use ratatui::widgets::canvas::{Canvas, Circle, Line as Segment, Points};
use ratatui::widgets::{Block, Paragraph, Wrap};
use ratatui::Frame;
use scilib::coordinate::cartesian::Cartesian;

use solarviz::calendar::ValidDates;
use solarviz::client::ApiClient;
use solarviz::config::{self, DEFAULT_API_URL};
use solarviz::driver;
use solarviz::error::Error;
use solarviz::orbits;
use solarviz::selection::Ray;
use solarviz::session::{Input, Navigation, Session, StepTarget};
use solarviz::stepper::StepOp;
use tokio::sync::mpsc;

const INITIAL_EXTENT: f64 = 2000.;
/// Camera height and pull-back per unit of half-width, so the initial view
/// puts the camera where the scene starts it.
const CAMERA_RATIO: f64 = 2.5;
const PAN_RATIO: f64 = 0.1;
const ZOOM_RATIO: f64 = 1.25;
const HELP: &str = "space play/pause  +/- speed  ←/→ date  g goto  m measure  0-9 pick  wasd pan  z/x zoom  q quit";

#[derive(Parser, Debug)]
#[command(version, long_about = None)]
struct Args {
    /// Backend base URL, VITE_API_URL otherwise.
    #[arg(long, value_name = "URL")]
    api_url: Option<String>,

    #[arg(short, long, value_name = "PATH")]
    env_file: Option<PathBuf>,

    #[arg(long, default_value_t = 16, value_name = "MS")]
    frame_ms: u64,
}

/// What the input task and the renderer share: the top-down viewport.
struct View {
    center: (f64, f64),
    extent: f64,
    area: Rect,
    bodies: Vec<Cartesian>,
    orbits: Vec<Vec<(f64, f64)>>,
    prompt: Option<String>,
    status: String,
}

impl View {
    fn camera(&self) -> Cartesian {
        Cartesian {
            x: self.center.0,
            y: self.center.1 - CAMERA_RATIO * self.extent,
            z: CAMERA_RATIO * self.extent,
        }
    }

    fn to_world(&self, column: u16, row: u16) -> Option<(f64, f64)> {
        let area = self.area;
        if area.width == 0 || area.height == 0 || !area.contains((column, row).into()) {
            return None;
        }
        let fx = (f64::from(column - area.x) + 0.5) / f64::from(area.width);
        let fy = (f64::from(row - area.y) + 0.5) / f64::from(area.height);
        Some((
            self.center.0 - self.extent + fx * 2. * self.extent,
            self.center.1 + self.extent - fy * 2. * self.extent,
        ))
    }
}

type SharedView = Arc<Mutex<View>>;

fn with_view<T>(view: &SharedView, f: impl FnOnce(&mut View) -> T) -> T {
    let mut guard = view.lock().unwrap_or_else(|poisoned| poisoned.into_inner());
    f(&mut guard)
}

enum Action {
    Inputs(Vec<Input>),
    Quit,
}

fn translate(event: Event, view: &SharedView, releases: bool) -> Action {
    match event {
        Event::Key(key) => on_key(key, view, releases),
        Event::Mouse(mouse) if mouse.kind == MouseEventKind::Down(MouseButton::Left) => {
            match with_view(view, |view| view.to_world(mouse.column, mouse.row)) {
                Some((x, y)) => Action::Inputs(vec![Input::Click(Ray::new(
                    Cartesian { x, y, z: 1e6 },
                    Cartesian { x: 0., y: 0., z: -1. },
                ))]),
                None => Action::Inputs(vec![]),
            }
        }
        _ => Action::Inputs(vec![]),
    }
}

fn on_key(key: KeyEvent, view: &SharedView, releases: bool) -> Action {
    if key.kind == KeyEventKind::Release {
        return match key.code {
            KeyCode::Left | KeyCode::Right => Action::Inputs(vec![Input::StepRelease]),
            _ => Action::Inputs(vec![]),
        };
    }
    if key.kind == KeyEventKind::Repeat {
        return Action::Inputs(vec![]);
    }

    if let Some(action) = with_view(view, |view| on_prompt_key(key, view)) {
        return action;
    }

    let inputs = match key.code {
        KeyCode::Char('q') | KeyCode::Esc => return Action::Quit,
        KeyCode::Char(' ') => vec![Input::TogglePlay],
        KeyCode::Char('+') | KeyCode::Char('=') => {
            vec![Input::StepPress(StepTarget::Speed, StepOp::Increment), Input::StepRelease]
        }
        KeyCode::Char('-') => vec![Input::StepPress(StepTarget::Speed, StepOp::Decrement), Input::StepRelease],
        KeyCode::Left | KeyCode::Right => {
            let op = if key.code == KeyCode::Left {
                StepOp::Decrement
            } else {
                StepOp::Increment
            };
            let mut inputs = vec![Input::StepPress(StepTarget::Date, op)];
            if !releases {
                inputs.push(Input::StepRelease);
            }
            inputs
        }
        KeyCode::Char('m') => vec![Input::ToggleMeasurement],
        KeyCode::Char('g') => {
            with_view(view, |view| view.prompt = Some(String::new()));
            vec![]
        }
        KeyCode::Char(c @ ('w' | 'a' | 's' | 'd' | 'z' | 'x')) => with_view(view, |view| {
            let step = view.extent * PAN_RATIO;
            match c {
                'w' => view.center.1 += step,
                's' => view.center.1 -= step,
                'a' => view.center.0 -= step,
                'd' => view.center.0 += step,
                'z' => view.extent /= ZOOM_RATIO,
                _ => view.extent *= ZOOM_RATIO,
            }
            vec![Input::MoveCamera(view.camera())]
        }),
        KeyCode::Char(digit @ '0'..='9') => with_view(view, |view| {
            let index = digit as usize - '0' as usize;
            let camera = view.camera();
            match view.bodies.get(index) {
                Some(target) => vec![Input::Click(Ray::new(
                    camera.clone(),
                    Cartesian {
                        x: target.x - camera.x,
                        y: target.y - camera.y,
                        z: target.z - camera.z,
                    },
                ))],
                None => vec![],
            }
        }),
        _ => vec![],
    };
    Action::Inputs(inputs)
}

/// Keys typed while the date prompt is open. `None` when no prompt is open.
fn on_prompt_key(key: KeyEvent, view: &mut View) -> Option<Action> {
    let prompt = view.prompt.as_mut()?;
    let inputs = match key.code {
        KeyCode::Enter => {
            let text = std::mem::take(prompt);
            view.prompt = None;
            vec![Input::DateText(text)]
        }
        KeyCode::Esc => {
            view.prompt = None;
            vec![]
        }
        KeyCode::Backspace => {
            prompt.pop();
            vec![]
        }
        KeyCode::Char(c) => {
            prompt.push(c);
            vec![]
        }
        _ => vec![],
    };
    Some(Action::Inputs(inputs))
}

fn body_color(name: &str) -> Color {
    match name {
        "sun" => Color::Yellow,
        "mercury" => Color::Gray,
        "venus" => Color::LightYellow,
        "earth" => Color::Blue,
        "mars" => Color::Red,
        "jupiter" => Color::LightRed,
        "saturn" => Color::Rgb(210, 180, 120),
        "uranus" => Color::Cyan,
        "neptune" => Color::LightBlue,
        _ => Color::White,
    }
}

fn render(frame: &mut Frame, session: &Session, view: &mut View) {
    let [header, scene, footer] =
        Layout::vertical([Constraint::Length(3), Constraint::Min(0), Constraint::Length(4)]).areas(frame.area());

    let playback = session.playback();
    let mut status = vec![
        session.date_label().bold(),
        format!(
            "  {}  speed {}  ",
            if playback.is_playing() { "playing" } else { "paused" },
            playback.speed()
        )
        .into(),
        format!("{:?}", session.selection().mode()).italic(),
    ];
    if !session.is_loaded() {
        status.push("  loading positions...".dim());
    }
    if let Some(overlay) = session.selection().overlay() {
        status.push(format!("  {} ↔ {}: {}", overlay.from, overlay.to, overlay.label).yellow());
    }
    frame.render_widget(
        Paragraph::new(Line::from(status)).block(Block::bordered().title(" solarviz ")),
        header,
    );

    view.area = Block::bordered().inner(scene);
    let (cx, cy, extent) = (view.center.0, view.center.1, view.extent);
    let orbits = &view.orbits;
    let canvas = Canvas::default()
        .block(Block::bordered())
        .marker(Marker::Braille)
        .x_bounds([cx - extent, cx + extent])
        .y_bounds([cy - extent, cy + extent])
        .paint(|ctx| {
            for orbit in orbits {
                ctx.draw(&Points {
                    coords: orbit,
                    color: Color::DarkGray,
                });
            }
            ctx.layer();
            for body in session.bodies().iter().filter(|body| body.is_visible()) {
                let (x, y) = (body.coords().x, body.coords().y);
                let color = body_color(body.name());
                if body.is_near_visible() {
                    ctx.draw(&Circle {
                        x,
                        y,
                        radius: body.radius(),
                        color,
                    });
                } else {
                    ctx.draw(&Points {
                        coords: &[(x, y)],
                        color,
                    });
                }
                if body.is_outline_visible() {
                    ctx.draw(&Circle {
                        x,
                        y,
                        radius: body.outline_radius(),
                        color: Color::LightGreen,
                    });
                }
                ctx.print(x, y, body.name().to_string().fg(color));
            }
            if let Some(overlay) = session.selection().overlay() {
                ctx.draw(&Segment::new(
                    overlay.start.x,
                    overlay.start.y,
                    overlay.end.x,
                    overlay.end.y,
                    Color::White,
                ));
                ctx.print(
                    overlay.label_position.x,
                    overlay.label_position.y,
                    overlay.label.clone().white(),
                );
            }
        });
    frame.render_widget(canvas, scene);

    let first = match &view.prompt {
        Some(prompt) => Line::from(vec!["goto (YYYY-MM-DD): ".bold(), prompt.clone().into()]),
        None => Line::from(view.status.clone()),
    };
    frame.render_widget(
        Paragraph::new(vec![first, Line::from(HELP).dim()])
            .wrap(Wrap { trim: true })
            .block(Block::bordered()),
        footer,
    );
}

fn project(orbit: &[Cartesian]) -> Vec<(f64, f64)> {
    orbit.iter().map(|point| (point.x, point.y)).collect()
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    config::load_env_file(&env::current_dir()?, args.env_file.as_deref())?;
    let api_url = args
        .api_url
        .or_else(|| env::var("VITE_API_URL").ok())
        .unwrap_or_else(|| DEFAULT_API_URL.to_string());

    let client = Arc::new(ApiClient::new(&api_url)?);
    let names = client.body_names().await?;
    let mut session = Session::new(&names, ValidDates::default());

    let view = Arc::new(Mutex::new(View {
        center: (0., 0.),
        extent: INITIAL_EXTENT,
        area: Rect::default(),
        bodies: vec![],
        orbits: vec![],
        prompt: None,
        status: format!("Backend {}", client.base()),
    }));

    let (input_send, input_recv) = mpsc::channel(64);
    let (navigation_send, mut navigation_recv) = mpsc::channel::<Navigation>(8);
    let (stop_send, stop_recv) = crossbeam::channel::bounded(1);

    let loader_client = Arc::clone(&client);
    let loader_send = input_send.clone();
    let loader_view = Arc::clone(&view);
    tokio::spawn(async move {
        match loader_client.positions_daily().await {
            Ok(table) => {
                let _ = loader_send.send(Input::PositionsLoaded(table.clone())).await;
            }
            Err(err) => with_view(&loader_view, |view| view.status = format!("No positions: {}", err)),
        }
    });

    let orbits_client = Arc::clone(&client);
    let orbits_view = Arc::clone(&view);
    let orbit_bodies = names.clone();
    tokio::spawn(async move {
        match orbits_client.positions().await {
            Ok(sparse) => {
                let paths = orbits::orbit_paths(sparse, orbit_bodies.iter().map(String::as_str));
                let projected: Vec<_> = paths.iter().map(|(_, path)| project(path)).collect();
                with_view(&orbits_view, |view| view.orbits = projected);
            }
            Err(err) => with_view(&orbits_view, |view| view.status = format!("No orbits: {}", err)),
        }
    });

    let navigation_view = Arc::clone(&view);
    tokio::spawn(async move {
        while let Some(Navigation(name)) = navigation_recv.recv().await {
            let status = match client.overview(&name).await {
                Ok(overview) => format!("{}: {}", overview.name, overview.summary),
                Err(err) => format!("{}: {}", name, err),
            };
            with_view(&navigation_view, |view| view.status = status);
        }
    });

    let releases = crossterm::terminal::supports_keyboard_enhancement().unwrap_or(false);
    let mut terminal = ratatui::init();
    execute!(io::stdout(), EnableMouseCapture)?;
    if releases {
        execute!(
            io::stdout(),
            PushKeyboardEnhancementFlags(KeyboardEnhancementFlags::REPORT_EVENT_TYPES)
        )?;
    }

    let events_view = Arc::clone(&view);
    tokio::spawn(async move {
        let mut events = EventStream::new();
        while let Some(Ok(event)) = events.next().await {
            match translate(event, &events_view, releases) {
                Action::Quit => {
                    let _ = stop_send.send(());
                    return;
                }
                Action::Inputs(inputs) => {
                    for input in inputs {
                        if input_send.send(input).await.is_err() {
                            return;
                        }
                    }
                }
            }
        }
    });

    let exit = driver::run(
        &mut session,
        Duration::from_millis(args.frame_ms.max(1)),
        input_recv,
        navigation_send,
        stop_recv,
        |session| {
            with_view(&view, |view| {
                view.bodies = session.bodies().iter().map(|body| body.coords().clone()).collect();
                terminal
                    .draw(|frame| render(frame, session, view))
                    .map(|_| ())
                    .map_err(Error::Terminal)
            })
        },
    )
    .await;

    if releases {
        execute!(io::stdout(), PopKeyboardEnhancementFlags)?;
    }
    execute!(io::stdout(), DisableMouseCapture)?;
    ratatui::restore();

    exit?;
    Ok(())
}
