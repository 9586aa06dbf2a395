use crate::config::AppConfig;
use anyhow::{Context, Result};
use glam::Vec2;
use pixels::{Pixels, SurfaceTexture};
use roomex_core::{ReproductionResponse, RoomConfig, TrialState};
use roomex_experiment::{
    FetchScope, FetchTicket, HttpTrialSource, SequencerError, TrialBatch, TrialFetcher, TrialFlow,
    TrialSequencer,
};
use roomex_render::{load_font, FrameStats, Screen, SoftwareRenderer, ROOM_HELPER};
use roomex_scene::{AssetCatalog, KeyInput, KeyboardHub, RoomBuilder, RoomScene, SceneError};
use roomex_timing::{FrameClock, HighPrecisionTimer};
use std::sync::Arc;
use tokio::runtime::Runtime;
use winit::{
    application::ApplicationHandler,
    dpi::{LogicalSize, PhysicalPosition, PhysicalSize},
    event::{ElementState, KeyEvent, MouseButton, MouseScrollDelta, WindowEvent},
    event_loop::{ActiveEventLoop, EventLoop, EventLoopProxy},
    keyboard::{Key, NamedKey},
    window::{Fullscreen, Window, WindowId},
};

/// Cursor travel, in pixels, below which a press-release is a click.
const CLICK_SLOP: f64 = 4.0;
/// Pixels of trackpad scroll per wheel notch.
const PIXELS_PER_NOTCH: f64 = 40.0;

/// Results coming back to the UI thread from the fetch runtime.
#[derive(Debug)]
pub enum AppEvent {
    TrialsFetched {
        ticket: FetchTicket,
        result: Result<TrialBatch, SequencerError>,
    },
}

/// The trial on screen: its room while exposing, then the probe.
struct ActiveTrial {
    index: usize,
    flow: TrialFlow<HighPrecisionTimer>,
    scene: Option<RoomScene>,
}

struct Drag {
    last: PhysicalPosition<f64>,
    travelled: f64,
}

pub struct App {
    config: AppConfig,
    window: Option<Arc<Window>>,
    pixels: Option<Pixels<'static>>,
    renderer: Option<SoftwareRenderer>,
    current_size: Option<PhysicalSize<u32>>,
    scale_factor: f64,
    refresh_rate: Option<f64>,

    proxy: EventLoopProxy<AppEvent>,
    runtime: Runtime,
    fetcher: TrialFetcher,
    fetch_scope: Option<FetchScope>,
    sequencer: TrialSequencer,

    builder: RoomBuilder,
    keyboard: KeyboardHub,
    clock: FrameClock<HighPrecisionTimer>,
    trial: Option<ActiveTrial>,
    dev_scene: Option<RoomScene>,
    responses: Vec<ReproductionResponse>,

    cursor: PhysicalPosition<f64>,
    drag: Option<Drag>,
    frames: u64,
    should_exit: bool,
}

impl App {
    pub fn new(config: AppConfig, proxy: EventLoopProxy<AppEvent>) -> Result<Self> {
        let runtime = tokio::runtime::Builder::new_multi_thread()
            .worker_threads(1)
            .thread_name("roomex-fetch")
            .enable_all()
            .build()
            .context("failed to start the fetch runtime")?;

        let source = Arc::new(HttpTrialSource::new(&config.api_base_url, &config.trial_path));
        tracing::info!(endpoint = %source.endpoint(), "trial source configured");
        let (fetcher, fetch_scope) = TrialFetcher::scoped(source, config.sequencer());
        let sequencer = TrialSequencer::new(fetcher.config());
        let builder = RoomBuilder::new(AssetCatalog::new(&config.asset_base_url));

        Ok(Self {
            config,
            window: None,
            pixels: None,
            renderer: None,
            current_size: None,
            scale_factor: 1.0,
            refresh_rate: None,
            proxy,
            runtime,
            fetcher,
            fetch_scope: Some(fetch_scope),
            sequencer,
            builder,
            keyboard: KeyboardHub::new(),
            clock: FrameClock::new(HighPrecisionTimer::new()),
            trial: None,
            dev_scene: None,
            responses: Vec::new(),
            cursor: PhysicalPosition::new(0.0, 0.0),
            drag: None,
            frames: 0,
            should_exit: false,
        })
    }

    pub fn run(config: AppConfig) -> Result<()> {
        let event_loop = EventLoop::<AppEvent>::with_user_event().build()?;
        let mut app = App::new(config, event_loop.create_proxy())?;

        tracing::info!(
            os = std::env::consts::OS,
            arch = std::env::consts::ARCH,
            "press SPACE to start practice or ESC to exit"
        );
        event_loop.run_app(&mut app)?;
        Ok(())
    }

    fn create_window_and_surface(&mut self, event_loop: &ActiveEventLoop) -> Result<()> {
        let primary_monitor = event_loop
            .primary_monitor()
            .or_else(|| event_loop.available_monitors().next())
            .context("no monitor available")?;

        self.refresh_rate = primary_monitor
            .refresh_rate_millihertz()
            .map(|rate| rate as f64 / 1000.0);

        let mut window_attributes = Window::default_attributes().with_title("Room perception");
        window_attributes = if self.config.windowed {
            window_attributes.with_inner_size(LogicalSize::new(1280.0, 720.0))
        } else {
            window_attributes
                .with_fullscreen(Some(Fullscreen::Borderless(Some(primary_monitor))))
                .with_resizable(false)
        };

        let window = Arc::new(event_loop.create_window(window_attributes)?);
        let physical_size = window.inner_size();
        self.current_size = Some(physical_size);
        self.scale_factor = window.scale_factor();

        tracing::info!(
            width = physical_size.width,
            height = physical_size.height,
            scale_factor = self.scale_factor,
            refresh_hz = ?self.refresh_rate,
            "display configured"
        );

        let surface_texture =
            SurfaceTexture::new(physical_size.width, physical_size.height, window.clone());
        self.pixels = Some(Pixels::new(
            physical_size.width,
            physical_size.height,
            surface_texture,
        )?);

        let mut renderer = SoftwareRenderer::new(physical_size.width, physical_size.height)?;
        if let Some(path) = &self.config.font_path {
            match load_font(path) {
                Ok(font) => renderer = renderer.with_font(font),
                Err(e) => tracing::warn!(error = %e, "text disabled"),
            }
        }
        self.renderer = Some(renderer);

        window.request_redraw();
        self.window = Some(window);

        if let Some(room) = self.config.dev_room {
            self.mount_dev_room(room)?;
        }
        Ok(())
    }

    fn mount_dev_room(&mut self, room: RoomConfig) -> Result<()> {
        let mut scene = RoomScene::mount(&self.builder, room, &self.keyboard, self.config.movement)?;
        scene.set_aspect(self.aspect());
        tracing::info!("development room shown, trial server not contacted");
        self.dev_scene = Some(scene);
        self.clock.reset();
        Ok(())
    }

    fn aspect(&self) -> f32 {
        match self.current_size {
            Some(s) if s.height > 0 => s.width as f32 / s.height as f32,
            _ => 16.0 / 9.0,
        }
    }

    fn start_fetch(&mut self) {
        let ticket = self.sequencer.begin_fetch();
        let fetcher = self.fetcher.clone();
        let proxy = self.proxy.clone();
        let trial_type = self.config.trial_type.clone();
        self.runtime.spawn(async move {
            let result = fetcher.fetch(&trial_type).await;
            if proxy
                .send_event(AppEvent::TrialsFetched { ticket, result })
                .is_err()
            {
                tracing::debug!("event loop closed before the trial batch arrived");
            }
        });
    }

    /// Mounts the sequencer's current trial, replacing whatever was showing.
    /// Trials whose room cannot be built are skipped.
    fn present_current(&mut self) {
        self.trial = None;
        while let Some(trial) = self.sequencer.current_trial() {
            let index = self.sequencer.current_index();
            let mounted = RoomConfig::from_trial(trial)
                .map_err(SceneError::from)
                .and_then(|room| {
                    RoomScene::mount(&self.builder, room, &self.keyboard, self.config.movement)
                });
            match mounted {
                Ok(mut scene) => {
                    scene.set_aspect(self.aspect());
                    let flow =
                        TrialFlow::start(trial, self.fetcher.config(), self.clock.timer().clone());
                    self.trial = Some(ActiveTrial {
                        index,
                        flow,
                        scene: Some(scene),
                    });
                    self.clock.reset();
                    return;
                }
                Err(error) => {
                    tracing::error!(index, id = %trial.id, %error, "trial cannot be shown, skipping");
                    self.sequencer.skip();
                }
            }
        }
    }

    fn active_scene_mut(&mut self) -> Option<&mut RoomScene> {
        match (&mut self.dev_scene, &mut self.trial) {
            (Some(scene), _) => Some(scene),
            (None, Some(active)) => active.scene.as_mut(),
            (None, None) => None,
        }
    }

    fn render(&mut self) -> Result<()> {
        let (Some(pixels), Some(renderer)) = (self.pixels.as_mut(), self.renderer.as_mut()) else {
            return Ok(());
        };
        let frame = pixels.frame_mut();

        let stats: FrameStats = if let Some(scene) = &self.dev_scene {
            renderer.render_room(scene, None, frame)?
        } else if let Some(active) = &self.trial {
            let helper = self.sequencer.shows_helper();
            match &active.scene {
                Some(scene) => renderer.render_room(scene, helper.then_some(ROOM_HELPER), frame)?,
                None => renderer.render_screen(
                    &Screen::Reproduction {
                        scale: active.flow.probe_scale(),
                        helper,
                    },
                    frame,
                )?,
            }
        } else if self.sequencer.phase().is_fetching() {
            renderer.render_screen(&Screen::Fetching, frame)?
        } else if self.sequencer.all_done() {
            renderer.render_screen(&Screen::Done, frame)?
        } else if let Some(error) = self.sequencer.last_error() {
            let message = error.to_string();
            renderer.render_screen(&Screen::FetchFailed { message: &message }, frame)?
        } else {
            renderer.render_screen(
                &Screen::Menu {
                    label: self.sequencer.menu_label(),
                    can_skip: self.sequencer.can_skip_practice(),
                },
                frame,
            )?
        };
        pixels.render()?;

        self.frames += 1;
        tracing::trace!(
            raster_ms = stats.raster.as_secs_f64() * 1e3,
            copy_ms = stats.copy.as_secs_f64() * 1e3,
            total_ms = stats.total.as_secs_f64() * 1e3,
            faces = stats.faces,
            "frame"
        );
        if self.frames % 600 == 0 {
            let timing = renderer.frame_stats();
            tracing::debug!(
                avg_ms = timing.average_frame_time_ns / 1e6,
                jitter_ms = timing.jitter_ns / 1e6,
                "render timing"
            );
        }
        Ok(())
    }

    fn update(&mut self) {
        let dt = self.clock.tick();
        if let Some(scene) = self.dev_scene.as_mut() {
            scene.update(dt);
        }
        if let Some(active) = self.trial.as_mut() {
            if let Some(scene) = active.scene.as_mut() {
                scene.update(dt);
            }
            if active.flow.update() == Some(TrialState::Reproduction) {
                // unmounting also releases the keyboard
                active.scene = None;
            }
        }
    }

    fn handle_key(&mut self, event: KeyEvent, event_loop: &ActiveEventLoop) {
        if event.state == ElementState::Released {
            self.keyboard.dispatch(KeyInput::Released);
            return;
        }
        match &event.logical_key {
            Key::Named(NamedKey::Escape) => {
                self.cleanup_and_exit(event_loop);
                return;
            }
            Key::Named(NamedKey::Space) if !event.repeat => self.on_space(),
            Key::Named(NamedKey::Enter) if !event.repeat => self.on_enter(event_loop),
            _ => {}
        }
        let text = match &event.logical_key {
            Key::Character(s) => s.as_str(),
            _ => "",
        };
        self.keyboard.dispatch(KeyInput::Pressed(text));
    }

    /// Start, restart or retry practice from the menu; leave the all-done
    /// screen.
    fn on_space(&mut self) {
        if self.dev_scene.is_some() || self.trial.is_some() {
            return;
        }
        if self.sequencer.all_done() {
            self.sequencer.dismiss();
        } else if !self.sequencer.phase().is_fetching() {
            self.start_fetch();
        }
    }

    fn on_enter(&mut self, event_loop: &ActiveEventLoop) {
        if let Some(active) = self.trial.as_mut() {
            if let Some(response) = active.flow.confirm() {
                tracing::info!(index = active.index, ?response, "trial complete");
                self.responses.push(response);
                self.sequencer.advance();
                self.present_current();
            }
            return;
        }
        if self.dev_scene.is_none()
            && !self.sequencer.phase().is_fetching()
            && self.sequencer.can_skip_practice()
        {
            tracing::info!(
                attempts = self.sequencer.attempt_count(),
                "practice skipped, handing over to the main experiment"
            );
            self.cleanup_and_exit(event_loop);
        }
    }

    fn handle_mouse_button(&mut self, button: MouseButton, state: ElementState) {
        if button != MouseButton::Left {
            return;
        }
        match state {
            ElementState::Pressed => {
                self.drag = Some(Drag {
                    last: self.cursor,
                    travelled: 0.0,
                });
            }
            ElementState::Released => {
                let Some(drag) = self.drag.take() else {
                    return;
                };
                if drag.travelled < CLICK_SLOP {
                    self.click(self.cursor);
                }
            }
        }
    }

    fn handle_cursor(&mut self, position: PhysicalPosition<f64>) {
        self.cursor = position;
        let height = self.current_size.map_or(0.0, |s| s.height as f32);
        let Some(drag) = self.drag.as_mut() else {
            return;
        };
        let (dx, dy) = (position.x - drag.last.x, position.y - drag.last.y);
        drag.last = position;
        drag.travelled += dx.hypot(dy);
        if let Some(scene) = self.active_scene_mut() {
            scene.drag(dx as f32, dy as f32, height);
        }
    }

    fn click(&mut self, at: PhysicalPosition<f64>) {
        let Some(size) = self.current_size else {
            return;
        };
        if size.width == 0 || size.height == 0 {
            return;
        }
        let ndc = Vec2::new(
            (2.0 * at.x / size.width as f64 - 1.0) as f32,
            (1.0 - 2.0 * at.y / size.height as f64) as f32,
        );
        if let Some(scene) = self.active_scene_mut() {
            if scene.click(ndc) {
                tracing::debug!(open = scene.door().is_open(), "door toggled");
            }
        }
    }

    fn handle_wheel(&mut self, delta: MouseScrollDelta) {
        let notches = match delta {
            MouseScrollDelta::LineDelta(_, y) => y,
            MouseScrollDelta::PixelDelta(p) => (p.y / PIXELS_PER_NOTCH) as f32,
        };
        if let Some(active) = self.trial.as_mut() {
            active.flow.adjust_probe(notches);
        }
    }

    fn handle_resize(&mut self, new_size: PhysicalSize<u32>) {
        if new_size.width == 0 || new_size.height == 0 {
            return;
        }
        self.current_size = Some(new_size);
        if let Some(pixels) = &mut self.pixels {
            if let Err(e) = pixels.resize_surface(new_size.width, new_size.height) {
                tracing::error!(error = %e, "failed to resize surface");
            }
            if let Err(e) = pixels.resize_buffer(new_size.width, new_size.height) {
                tracing::error!(error = %e, "failed to resize buffer");
            }
        }
        if let Some(renderer) = &mut self.renderer {
            if let Err(e) = renderer.resize(new_size.width, new_size.height) {
                tracing::error!(error = %e, "failed to resize renderer");
            }
        }
        let aspect = self.aspect();
        if let Some(scene) = self.active_scene_mut() {
            scene.set_aspect(aspect);
        }
        tracing::info!(width = new_size.width, height = new_size.height, "display resized");
    }

    fn cleanup_and_exit(&mut self, event_loop: &ActiveEventLoop) {
        // cancels fetches still in flight
        self.fetch_scope.take();
        self.trial = None;
        self.dev_scene = None;

        tracing::info!(
            completed = self.sequencer.attempt_count(),
            responses = self.responses.len(),
            "session finished"
        );
        self.should_exit = true;
        event_loop.exit();
    }
}

impl ApplicationHandler<AppEvent> for App {
    fn resumed(&mut self, event_loop: &ActiveEventLoop) {
        if self.window.is_none() {
            if let Err(e) = self.create_window_and_surface(event_loop) {
                tracing::error!(error = %e, "failed to create window and surface");
                event_loop.exit();
            }
        }
    }

    fn user_event(&mut self, _event_loop: &ActiveEventLoop, event: AppEvent) {
        match event {
            AppEvent::TrialsFetched { ticket, result } => {
                if matches!(result, Err(SequencerError::Cancelled)) {
                    return;
                }
                if self.sequencer.complete_fetch(ticket, result) {
                    self.present_current();
                }
            }
        }
    }

    fn window_event(&mut self, event_loop: &ActiveEventLoop, _id: WindowId, event: WindowEvent) {
        match event {
            WindowEvent::CloseRequested => self.cleanup_and_exit(event_loop),
            WindowEvent::RedrawRequested => {
                self.update();
                if let Err(e) = self.render() {
                    tracing::error!(error = %e, "render failed");
                }
                if let Some(win) = &self.window {
                    win.request_redraw();
                }
            }
            WindowEvent::KeyboardInput { event, .. } => self.handle_key(event, event_loop),
            WindowEvent::CursorMoved { position, .. } => self.handle_cursor(position),
            WindowEvent::MouseInput { state, button, .. } => self.handle_mouse_button(button, state),
            WindowEvent::MouseWheel { delta, .. } => self.handle_wheel(delta),
            WindowEvent::Resized(sz) => self.handle_resize(sz),
            WindowEvent::ScaleFactorChanged { scale_factor, .. } => {
                self.scale_factor = scale_factor;
                if let Some(window) = &self.window {
                    self.handle_resize(window.inner_size());
                }
            }
            _ => {}
        }
    }

    fn about_to_wait(&mut self, event_loop: &ActiveEventLoop) {
        if self.should_exit {
            event_loop.exit();
        }
    }
}

impl Drop for App {
    fn drop(&mut self) {
        tracing::debug!(frames = self.frames, "application resources cleaned up");
    }
}
