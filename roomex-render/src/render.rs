use crate::raster::{project_scene, Face};
use crate::screen::Screen;
use crate::text::TextCache;
use ab_glyph::FontVec;
use anyhow::{bail, Context, Result};
use glam::Vec2;
use roomex_scene::RoomScene;
use roomex_timing::{CalibrationStats, HighPrecisionTimer, Timer};
use std::time::Duration;
use tiny_skia::{Color, FillRule, Paint, PathBuilder, Pixmap, PixmapPaint, Rect, Transform};

const BACKGROUND: [u8; 4] = [24, 24, 28, 255];
const BUTTON: [u8; 4] = [58, 110, 190, 255];
const SECONDARY: [u8; 4] = [48, 52, 62, 255];
const ERROR: [u8; 4] = [190, 60, 60, 255];
const SUCCESS: [u8; 4] = [70, 160, 90, 255];
const PROBE: [u8; 4] = [205, 170, 110, 255];
const TEXT_SIZE: f32 = 28.0;
const LINE_HEIGHT: f32 = 44.0;

#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct FrameStats {
    pub raster: Duration,
    pub copy: Duration,
    pub total: Duration,
    pub faces: usize,
}

/// Draws rooms and screens on the CPU into an RGBA8 frame buffer.
pub struct SoftwareRenderer {
    width: u32,
    height: u32,
    center: (f32, f32),
    canvas: Pixmap,
    text: Option<TextCache>,
    timer: HighPrecisionTimer,
}

impl SoftwareRenderer {
    pub fn new(width: u32, height: u32) -> Result<Self> {
        let canvas = Pixmap::new(width, height)
            .with_context(|| format!("cannot create a {width}x{height} canvas"))?;
        Ok(Self {
            width,
            height,
            center: (width as f32 / 2.0, height as f32 / 2.0),
            canvas,
            text: None,
            timer: HighPrecisionTimer::new(),
        })
    }

    /// Enables text; without a font, screens are drawn with shapes only.
    pub fn with_font(mut self, font: FontVec) -> Self {
        self.text = Some(TextCache::new(font, TEXT_SIZE, Color::WHITE));
        tracing::debug!(size_px = TEXT_SIZE, "text rendering enabled");
        self
    }

    pub fn has_font(&self) -> bool {
        self.text.is_some()
    }

    pub fn size(&self) -> (u32, u32) {
        (self.width, self.height)
    }

    pub fn resize(&mut self, new_width: u32, new_height: u32) -> Result<()> {
        self.canvas = Pixmap::new(new_width, new_height)
            .with_context(|| format!("cannot resize canvas to {new_width}x{new_height}"))?;
        self.width = new_width;
        self.height = new_height;
        self.center = (new_width as f32 / 2.0, new_height as f32 / 2.0);
        tracing::debug!(width = new_width, height = new_height, "canvas resized");
        Ok(())
    }

    /// Frame-time statistics over the recent frames
    pub fn frame_stats(&self) -> CalibrationStats {
        self.timer.calibration_stats()
    }

    pub fn render_room(
        &mut self,
        scene: &RoomScene,
        hint: Option<&str>,
        frame: &mut [u8],
    ) -> Result<FrameStats> {
        self.check_frame(frame)?;
        let start = self.timer.now();

        let graph = scene.graph();
        fill_canvas(&mut self.canvas, graph.sky_color);
        let faces = project_scene(
            graph,
            scene.camera_position(),
            scene.camera().view_projection(),
            self.width,
            self.height,
        );
        for face in &faces {
            self.fill_face(face);
        }
        if let Some(hint) = hint {
            self.draw_line(hint, (self.center.0, LINE_HEIGHT));
        }
        let raster = self.timer.elapsed(start);

        self.finish(frame, start, raster, faces.len())
    }

    pub fn render_screen(&mut self, screen: &Screen<'_>, frame: &mut [u8]) -> Result<FrameStats> {
        self.check_frame(frame)?;
        let start = self.timer.now();

        fill_canvas(&mut self.canvas, BACKGROUND);
        let (cx, cy) = self.center;
        let lines = screen.lines();
        let mut shapes = 0;
        match *screen {
            Screen::Menu { can_skip, .. } => {
                shapes += self.fill_rect(cx - 200.0, cy - 28.0, 400.0, 56.0, BUTTON);
                if can_skip {
                    shapes += self.fill_rect(cx - 200.0, cy + LINE_HEIGHT - 22.0, 400.0, 44.0, SECONDARY);
                }
                self.draw_lines(&lines, cy);
            }
            Screen::Fetching => {
                for i in 0..3 {
                    let x = cx - 40.0 + 40.0 * i as f32;
                    shapes += self.fill_rect(x - 8.0, cy + 40.0, 16.0, 16.0, BUTTON);
                }
                self.draw_lines(&lines, cy);
            }
            Screen::FetchFailed { .. } => {
                shapes += self.fill_rect(cx - 220.0, cy - 110.0, 440.0, 12.0, ERROR);
                self.draw_lines(&lines, cy);
            }
            Screen::Done => {
                shapes += self.fill_polygon(
                    &[
                        Vec2::new(cx - 40.0, cy - 120.0),
                        Vec2::new(cx - 10.0, cy - 90.0),
                        Vec2::new(cx + 45.0, cy - 150.0),
                        Vec2::new(cx + 55.0, cy - 140.0),
                        Vec2::new(cx - 10.0, cy - 70.0),
                        Vec2::new(cx - 50.0, cy - 110.0),
                    ],
                    SUCCESS,
                );
                self.draw_lines(&lines, cy);
            }
            Screen::Reproduction { scale, .. } => {
                shapes += self.draw_probe(scale);
                let bottom = self.height as f32 - LINE_HEIGHT;
                self.draw_lines(&lines, bottom);
            }
        }
        let raster = self.timer.elapsed(start);

        self.finish(frame, start, raster, shapes)
    }

    fn check_frame(&self, frame: &[u8]) -> Result<()> {
        let expected = self.width as usize * self.height as usize * 4;
        if frame.len() != expected {
            bail!(
                "frame is {} bytes, expected {} for {}x{}",
                frame.len(),
                expected,
                self.width,
                self.height
            );
        }
        Ok(())
    }

    fn finish(&mut self, frame: &mut [u8], start: u64, raster: Duration, faces: usize) -> Result<FrameStats> {
        let t = self.timer.now();
        frame.copy_from_slice(self.canvas.data());
        let copy = self.timer.elapsed(t);

        let total = self.timer.elapsed(start);
        self.timer.record_frame(total);
        Ok(FrameStats {
            raster,
            copy,
            total,
            faces,
        })
    }

    fn fill_face(&mut self, face: &Face) -> usize {
        self.fill_polygon(&face.points, face.color)
    }

    fn fill_polygon(&mut self, points: &[Vec2], color: [u8; 4]) -> usize {
        let Some((first, rest)) = points.split_first() else {
            return 0;
        };
        let mut pb = PathBuilder::new();
        pb.move_to(first.x, first.y);
        for p in rest {
            pb.line_to(p.x, p.y);
        }
        pb.close();
        let Some(path) = pb.finish() else {
            return 0;
        };
        self.canvas
            .fill_path(&path, &paint(color), FillRule::Winding, Transform::identity(), None);
        1
    }

    fn fill_rect(&mut self, x: f32, y: f32, w: f32, h: f32, color: [u8; 4]) -> usize {
        match Rect::from_xywh(x, y, w, h) {
            Some(rect) => {
                self.canvas
                    .fill_rect(rect, &paint(color), Transform::identity(), None);
                1
            }
            None => 0,
        }
    }

    /// Isometric cube; `scale` is a relative volume, so the edge grows with
    /// its cube root.
    fn draw_probe(&mut self, scale: f32) -> usize {
        let (cx, cy) = self.center;
        let edge = self.width.min(self.height) as f32 * 0.2 * scale.max(0.0).cbrt();
        let a = edge * 0.866;
        let b = edge * 0.5;
        let c = Vec2::new(cx, cy);
        let top = [
            c + Vec2::new(0.0, -edge),
            c + Vec2::new(a, -b),
            c,
            c + Vec2::new(-a, -b),
        ];
        let left = [c + Vec2::new(-a, -b), c, c + Vec2::new(0.0, edge), c + Vec2::new(-a, b)];
        let right = [c, c + Vec2::new(a, -b), c + Vec2::new(a, b), c + Vec2::new(0.0, edge)];
        let dim = |k: f32| {
            let s = |v: u8| (v as f32 * k) as u8;
            [s(PROBE[0]), s(PROBE[1]), s(PROBE[2]), PROBE[3]]
        };
        self.fill_polygon(&top, PROBE) + self.fill_polygon(&left, dim(0.7)) + self.fill_polygon(&right, dim(0.5))
    }

    /// Centres `lines` vertically around `y`.
    fn draw_lines(&mut self, lines: &[String], y: f32) {
        let first = y - (lines.len().saturating_sub(1)) as f32 * LINE_HEIGHT * 0.5;
        for (i, line) in lines.iter().enumerate() {
            self.draw_line(line, (self.center.0, first + i as f32 * LINE_HEIGHT));
        }
    }

    fn draw_line(&mut self, text: &str, pos: (f32, f32)) {
        let Some(cache) = self.text.as_mut() else {
            return;
        };
        let Some(pm) = cache.get_or_render(text) else {
            return;
        };
        let x = (pos.0 - pm.width() as f32 * 0.5) as i32;
        let y = (pos.1 - pm.height() as f32 * 0.5) as i32;
        self.canvas.draw_pixmap(
            x,
            y,
            Pixmap::as_ref(&pm),
            &PixmapPaint::default(),
            Transform::identity(),
            None,
        );
    }

    #[cfg(test)]
    fn pixel(&self, x: u32, y: u32) -> [u8; 4] {
        let i = (y * self.width + x) as usize * 4;
        let d = self.canvas.data();
        [d[i], d[i + 1], d[i + 2], d[i + 3]]
    }
}

fn paint(color: [u8; 4]) -> Paint<'static> {
    let mut p = Paint::default();
    p.set_color_rgba8(color[0], color[1], color[2], color[3]);
    p.anti_alias = true;
    p
}

fn fill_canvas(canvas: &mut Pixmap, color: [u8; 4]) {
    canvas.fill(Color::from_rgba8(color[0], color[1], color[2], color[3]));
}

#[cfg(test)]
mod tests {
    use super::*;
    use glam::Vec2 as V2;
    use roomex_core::RoomConfig;
    use roomex_scene::{AssetCatalog, KeyboardHub, MovementStep, RoomBuilder};

    const W: u32 = 320;
    const H: u32 = 180;

    fn scene(hub: &KeyboardHub) -> RoomScene {
        let config = RoomConfig {
            width: 8.0,
            height: 3.0,
            depth: 5.0,
            wall: 0,
            ground: 0,
            duration: 10_000,
        };
        let builder = RoomBuilder::new(AssetCatalog::new("http://127.0.0.1:9000"));
        RoomScene::mount(&builder, config, hub, MovementStep::default()).unwrap()
    }

    fn frame() -> Vec<u8> {
        vec![0u8; (W * H * 4) as usize]
    }

    #[test]
    fn wrong_frame_size_is_rejected() {
        let hub = KeyboardHub::new();
        let mut r = SoftwareRenderer::new(W, H).unwrap();
        let mut small = vec![0u8; 16];
        assert!(r.render_room(&scene(&hub), None, &mut small).is_err());
        assert!(r.render_screen(&Screen::Done, &mut small).is_err());
    }

    #[test]
    fn zero_sized_canvas_is_an_error() {
        assert!(SoftwareRenderer::new(0, 10).is_err());
        let mut r = SoftwareRenderer::new(4, 4).unwrap();
        assert!(r.resize(0, 0).is_err());
        assert_eq!(r.size(), (4, 4));
    }

    #[test]
    fn room_frame_shows_sky_ground_and_door() {
        let hub = KeyboardHub::new();
        let scene = scene(&hub);
        let mut r = SoftwareRenderer::new(W, H).unwrap();
        let mut fb = frame();
        let stats = r.render_room(&scene, None, &mut fb).unwrap();
        assert!(stats.faces > 0);
        assert_eq!(&fb[..], r.canvas.data());

        let sky = scene.graph().sky_color;
        assert_eq!(r.pixel(0, 0), sky);

        let ground = r.pixel(W / 2, H - 1);
        assert!(ground[1] > ground[0] && ground[1] > ground[2]);

        let door = r.pixel(W / 2, H / 2);
        assert!(door[0] > door[1] && door[1] > door[2]);
    }

    #[test]
    fn open_door_reveals_the_room() {
        let hub = KeyboardHub::new();
        let mut scene = scene(&hub);
        let mut r = SoftwareRenderer::new(W, H).unwrap();
        let mut fb = frame();

        r.render_room(&scene, None, &mut fb).unwrap();
        let closed = r.pixel(W / 2, H / 2);

        assert!(scene.click(V2::ZERO));
        for _ in 0..120 {
            scene.update(Duration::from_millis(16));
        }
        r.render_room(&scene, None, &mut fb).unwrap();
        let open = r.pixel(W / 2, H / 2);
        assert_ne!(open, closed);
        assert!(open[2] > closed[2]);
    }

    #[test]
    fn screens_render_without_a_font() {
        let mut r = SoftwareRenderer::new(W, H).unwrap();
        assert!(!r.has_font());
        let mut fb = frame();
        let screens = [
            Screen::Menu {
                label: "Start practice",
                can_skip: false,
            },
            Screen::Fetching,
            Screen::FetchFailed { message: "503" },
            Screen::Done,
            Screen::Reproduction {
                scale: 1.0,
                helper: true,
            },
        ];
        for screen in &screens {
            let stats = r.render_screen(screen, &mut fb).unwrap();
            assert!(stats.faces > 0, "{screen:?} drew nothing");
        }
        assert_eq!(r.timer.frame_times.len(), screens.len());
        assert!(r.frame_stats().average_frame_time_ns > 0.0);
    }

    #[test]
    fn probe_grows_with_scale() {
        let mut r = SoftwareRenderer::new(W, H).unwrap();
        let mut fb = frame();
        let probe_pixels = |r: &SoftwareRenderer| {
            r.canvas
                .data()
                .chunks_exact(4)
                .filter(|px| px[..3] != BACKGROUND[..3])
                .count()
        };

        r.render_screen(&Screen::Reproduction { scale: 0.5, helper: false }, &mut fb)
            .unwrap();
        let small = probe_pixels(&r);
        r.render_screen(&Screen::Reproduction { scale: 2.0, helper: false }, &mut fb)
            .unwrap();
        let large = probe_pixels(&r);
        assert!(large > small);
    }
}
