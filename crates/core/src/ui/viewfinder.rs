//! Main viewfinder application.
//!
//! This module contains the `Viewfinder` struct which implements the
//! `eframe::App` trait: it shows the camera frame, hosts a
//! [`DetectorView`] on top of it and wires egui's layout, input and repaint
//! scheduling to the overlay.

use super::input::PointerTracker;
use super::rendering::EguiCanvas;
use super::settings::Settings;
use super::state::{DetectionEvent, SessionResult, ViewfinderEvent};
use crate::config::Config;
use crate::error::{AppError, Result};
use crate::geometry::RoiRect;
use crate::gesture::PointerPhase;
use crate::image_processing::ImageProcessor;
use crate::render::MarkStyle;
use crate::view::{DetectorView, HandleVisibility, ViewOptions};
use eframe::egui;
use image::DynamicImage;
use std::cell::RefCell;
use std::rc::Rc;
use std::sync::mpsc::Receiver;
use std::sync::{Arc, Mutex};
use std::time::{Duration, Instant};
use tracing::{debug, warn};

type EventSink = Rc<RefCell<dyn FnMut(ViewfinderEvent)>>;

/// Repaint cadence of the live preview.
const FRAME_INTERVAL: Duration = Duration::from_millis(33);

/// The viewfinder window.
pub struct Viewfinder {
    // Frame state
    frame_texture: Option<egui::TextureHandle>,
    /// Pre-converted frame data for fast texture upload
    frame_image: Option<egui::ColorImage>,
    handle_texture: Option<egui::TextureHandle>,

    // Overlay state
    view: DetectorView,
    mark_style: MarkStyle,
    pointer: PointerTracker,
    bounds: Option<egui::Rect>,
    panel_rect: Option<egui::Rect>,

    // Pipeline state
    detections: Receiver<DetectionEvent>,
    pipeline_error: Option<String>,
    result: Arc<Mutex<SessionResult>>,
    events: EventSink,

    // Settings
    settings: Settings,
    visibility: HandleVisibility,
}

impl Viewfinder {
    /// Creates a new viewfinder.
    ///
    /// # Arguments
    /// * `config` - Application configuration
    /// * `frame` - Still frame shown behind the overlay, if any
    /// * `detections` - Events from the detection pipeline
    /// * `result` - Shared container the last applied ROI is written to
    /// * `on_event` - Host notifications: bounds changes and the scan window
    ///   applied by each finished gesture
    ///
    /// # Errors
    /// Returns an error if the configured handle glyph cannot be loaded.
    pub fn new(
        config: &Config,
        frame: Option<DynamicImage>,
        detections: Receiver<DetectionEvent>,
        result: Arc<Mutex<SessionResult>>,
        on_event: impl FnMut(ViewfinderEvent) + 'static,
    ) -> Result<Self> {
        let settings = Settings::load();
        let visibility = HandleVisibility::new(settings.show_crop_handle);
        let options = ViewOptions::from_config(config)?;
        let mut view = DetectorView::new(options, visibility.clone());

        let events: EventSink = Rc::new(RefCell::new(on_event));
        let listener_events = Rc::clone(&events);
        let listener_result = result.clone();
        view.set_roi_listener(move |rect| {
            if let Ok(mut lock) = listener_result.lock() {
                lock.roi = Some(rect);
            }
            (&mut *listener_events.borrow_mut())(ViewfinderEvent::RoiApplied(rect));
        });

        // Pre-convert the frame so the first paint only uploads
        let frame_image = frame.map(|f| ImageProcessor::to_color_image(&f.to_rgba8()));

        Ok(Self {
            frame_texture: None,
            frame_image,
            handle_texture: None,
            view,
            mark_style: MarkStyle::for_density(config.density),
            pointer: PointerTracker::new(),
            bounds: None,
            panel_rect: None,
            detections,
            pipeline_error: None,
            result,
            events,
            settings,
            visibility,
        })
    }

    /// Moves pending detections into the overlay.
    fn process_detection_events(&mut self, now: Instant) {
        while let Ok(event) = self.detections.try_recv() {
            match event {
                DetectionEvent::Marks(points) => self.view.show_marks(points, now),
                DetectionEvent::Error(err) => {
                    warn!(error = %err, "detection pipeline stopped");
                    self.pipeline_error = Some(err);
                }
            }
        }
    }

    /// Uploads textures on the first frame.
    fn ensure_textures(&mut self, ctx: &egui::Context) {
        if self.frame_texture.is_none() {
            if let Some(color_image) = self.frame_image.take() {
                self.frame_texture =
                    Some(ctx.load_texture("frame", color_image, egui::TextureOptions::LINEAR));
            }
        }
        if self.handle_texture.is_none() {
            let glyph = ImageProcessor::to_color_image(self.view.glyph().image());
            self.handle_texture =
                Some(ctx.load_texture("crop-handle", glyph, egui::TextureOptions::LINEAR));
        }
    }

    /// Re-lays out the overlay whenever the viewfinder bounds change.
    fn layout(&mut self, rect: egui::Rect) {
        if self.bounds == Some(rect) {
            return;
        }
        self.bounds = Some(rect);
        if let Ok(mut lock) = self.result.lock() {
            lock.screen_size = Some(rect.size());
        }
        let bounds = RoiRect::new(
            rect.min.x.round() as i32,
            rect.min.y.round() as i32,
            rect.max.x.round() as i32,
            rect.max.y.round() as i32,
        );
        self.view
            .on_layout(bounds.left, bounds.top, bounds.right, bounds.bottom);
        (&mut *self.events.borrow_mut())(ViewfinderEvent::Resized(bounds));
    }

    fn handle_pointer(&mut self, ctx: &egui::Context) {
        let events = ctx.input(|i| i.events.clone());
        for input in self.pointer.translate(&events) {
            let over_panel = self.panel_rect.is_some_and(|r| r.contains(input.pos));
            if over_panel && input.phase == PointerPhase::Down {
                continue;
            }
            let consumed = self
                .view
                .on_pointer_event(input.phase, input.pos.x, input.pos.y);
            if consumed {
                debug!(phase = ?input.phase, "pointer consumed by crop handle");
            }
        }
    }

    /// Renders the settings panel.
    fn render_settings_ui(&mut self, ctx: &egui::Context) {
        let response = egui::Area::new(egui::Id::new("settings_area"))
            .fixed_pos(egui::pos2(12.0, 12.0))
            .show(ctx, |ui| {
                egui::Frame::popup(ui.style())
                    .fill(egui::Color32::from_rgba_unmultiplied(30, 30, 30, 220))
                    .inner_margin(8.0)
                    .show(ui, |ui| {
                        if ui
                            .checkbox(&mut self.settings.show_crop_handle, "Show crop handle")
                            .changed()
                        {
                            self.visibility.set(self.settings.show_crop_handle);
                            if let Err(e) = self.settings.save() {
                                warn!(error = %e, "failed to save settings");
                            }
                        }
                        let roi = self.view.roi();
                        if roi.is_empty() {
                            ui.label("Scan window: full frame");
                        } else {
                            ui.label(format!("Scan window: {}×{}", roi.width(), roi.height()));
                        }
                        if let Some(err) = &self.pipeline_error {
                            ui.label(
                                egui::RichText::new(format!("Detector: {}", err))
                                    .color(egui::Color32::RED),
                            );
                        }
                    });
            });
        self.panel_rect = Some(response.response.rect);
    }
}

impl eframe::App for Viewfinder {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        // Enforce dark mode
        ctx.set_visuals(egui::Visuals::dark());

        let now = Instant::now();
        self.process_detection_events(now);
        self.view.poll_timers(now);
        self.ensure_textures(ctx);

        // Fullscreen panel with no margins
        let panel_frame = egui::Frame::default()
            .fill(egui::Color32::from_gray(40))
            .inner_margin(egui::Margin::same(0))
            .outer_margin(egui::Margin::same(0));

        egui::CentralPanel::default()
            .frame(panel_frame)
            .show(ctx, |ui| {
                let rect = ui.max_rect();
                self.layout(rect);

                // Draw the camera frame as background
                if let Some(texture) = &self.frame_texture {
                    ui.painter().image(
                        texture.id(),
                        rect,
                        egui::Rect::from_min_max(egui::pos2(0.0, 0.0), egui::pos2(1.0, 1.0)),
                        egui::Color32::WHITE,
                    );
                }

                self.handle_pointer(ctx);

                let mut canvas = EguiCanvas::new(
                    ui.painter(),
                    rect,
                    self.handle_texture.as_ref(),
                    self.mark_style,
                );
                self.view.draw(&mut canvas);
            });

        self.render_settings_ui(ctx);

        // Handle escape to close
        if ctx.input(|i| i.key_pressed(egui::Key::Escape)) {
            ctx.send_viewport_cmd(egui::ViewportCommand::Close);
        }

        if self.view.take_redraw_request() {
            ctx.request_repaint();
        }
        let next = self
            .view
            .next_wakeup()
            .map(|deadline| deadline.saturating_duration_since(now))
            .map_or(FRAME_INTERVAL, |d| d.min(FRAME_INTERVAL));
        ctx.request_repaint_after(next);
    }
}

/// Launches the viewfinder and returns when the user closes the window.
///
/// # Returns
/// The last scan window applied with the crop handle, or `None` if the
/// handle was never used.
pub fn run(
    config: Config,
    frame: Option<DynamicImage>,
    detections: Receiver<DetectionEvent>,
    on_event: impl FnMut(ViewfinderEvent) + 'static,
) -> Result<Option<SessionResult>> {
    let options = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default()
            .with_inner_size([960.0, 540.0])
            .with_title("scanview"),
        ..Default::default()
    };

    let result = Arc::new(Mutex::new(SessionResult::default()));
    let app_result = result.clone();

    eframe::run_native(
        "scanview",
        options,
        Box::new(move |cc| {
            let app = Viewfinder::new(&config, frame, detections, app_result, on_event)
                .map_err(|e| Box::new(e) as Box<dyn std::error::Error + Send + Sync>)?;
            cc.egui_ctx.request_repaint();
            debug!("viewfinder created");
            Ok(Box::new(app) as Box<dyn eframe::App>)
        }),
    )
    .map_err(|e| AppError::ui(format!("Failed to run UI: {}", e)))?;

    // Extract result from shared state
    let lock = result
        .lock()
        .map_err(|_| AppError::ui("Failed to acquire result lock"))?;

    match lock.roi {
        Some(_) => Ok(Some(lock.clone())),
        None => Ok(None),
    }
}
