//! Desktop front end: capture canvas, submission controls, classification
//! panel, and the sample inspector.
//!
//! All shared state lives on the UI thread. The only work pushed off-thread
//! is HTTP: requests run on spawned workers and report back over a channel.
//! In-flight requests are never cancelled; when two race, the later response
//! simply overwrites the displayed result (last-write-wins).

use eframe::egui;
use std::path::PathBuf;
use std::sync::mpsc::{self, Receiver, Sender};
use std::sync::Arc;
use std::thread;
use std::time::Instant;

use tracing::{info, warn};

use crate::capture::CaptureSession;
use crate::classify::{
    self, Classification, ClassifyClient, ClassifyError, ServicesAndMappings, StrokePreprocessing,
    SymbolEntry,
};
use crate::dataset;
use crate::geometry;
use crate::inspector::{InspectorContext, InspectorState};
use crate::sample::Sample;
use crate::stroke::{Point, Stroke};
use crate::typeset::{self, TextTypesetter};

pub const DEFAULT_FRAME_WIDTH: u32 = 300;
pub const DEFAULT_FRAME_HEIGHT: u32 = 300;
pub const DEFAULT_FRAME_MARGIN: f64 = 0.1;
const INSPECTOR_PAGE_SIZE: usize = 12;

const DRAWING_COLOR: egui::Color32 = egui::Color32::from_rgb(255, 165, 0);
const SAMPLES_COLOR: egui::Color32 = egui::Color32::from_rgb(0, 160, 0);
const RESCALED_COLOR: egui::Color32 = egui::Color32::from_rgb(200, 0, 0);
const LINE_THICKNESS: f32 = 6.0;
const SAMPLE_DOT_SIZE: f32 = 3.0;

/// Messages sent back from HTTP worker threads.
enum WorkerMsg {
    Services(Result<ServicesAndMappings, ClassifyError>),
    Symbols(Result<Vec<SymbolEntry>, ClassifyError>),
    Classified {
        service: String,
        result: Result<Vec<Classification>, ClassifyError>,
    },
}

/// Typeset slot for the i-th prediction row.
fn result_selector(index: usize) -> String {
    format!("#result-{index}")
}

/// Typeset slot for an inspector cell, keyed by sample id.
fn sample_selector(id: u64) -> String {
    format!("#cell-{id}")
}

pub struct GlyphPadApp {
    // Capture state
    session: CaptureSession,
    frame_width: u32,
    frame_height: u32,
    frame_margin: f64,
    started: Instant,
    show_sample_dots: bool,

    // Submitted and loaded samples
    samples: Vec<Sample>,
    loaded: Vec<Sample>,
    next_sample_id: u64,
    dirty: bool,
    inspector: InspectorState,
    label_input: String,
    unicode_input: String,
    load_path: String,
    export_dir: PathBuf,

    // Classification
    client: Arc<ClassifyClient>,
    services: Vec<String>,
    mappings: Vec<String>,
    selected_service: usize,
    selected_mapping: usize,
    send_normalized: bool,
    classifications: Option<(String, Vec<Classification>)>,
    symbols: Vec<SymbolEntry>,
    typesetter: TextTypesetter,
    worker_tx: Sender<WorkerMsg>,
    worker_rx: Receiver<WorkerMsg>,

    // Alerts and shutdown
    alert: Option<String>,
    confirm_close: bool,
    close_allowed: bool,
}

impl GlyphPadApp {
    pub fn new(
        client: ClassifyClient,
        frame_width: u32,
        frame_height: u32,
        frame_margin: f64,
    ) -> Self {
        let (worker_tx, worker_rx) = mpsc::channel();
        let app = Self {
            session: CaptureSession::new(),
            frame_width,
            frame_height,
            frame_margin,
            started: Instant::now(),
            show_sample_dots: false,
            samples: Vec::new(),
            loaded: Vec::new(),
            next_sample_id: 0,
            dirty: false,
            inspector: InspectorState::new(INSPECTOR_PAGE_SIZE),
            label_input: String::new(),
            unicode_input: String::new(),
            load_path: String::new(),
            export_dir: PathBuf::from("."),
            client: Arc::new(client),
            // Known services until the backend answers the listing call.
            services: vec!["hwrt".to_string(), "detexify".to_string()],
            mappings: vec!["none".to_string()],
            selected_service: 0,
            selected_mapping: 0,
            send_normalized: false,
            classifications: None,
            symbols: Vec::new(),
            typesetter: TextTypesetter::new(),
            worker_tx,
            worker_rx,
            alert: None,
            confirm_close: false,
            close_allowed: false,
        };
        app.refresh_services();
        app
    }

    pub fn with_defaults(client: ClassifyClient) -> Self {
        Self::new(
            client,
            DEFAULT_FRAME_WIDTH,
            DEFAULT_FRAME_HEIGHT,
            DEFAULT_FRAME_MARGIN,
        )
    }

    fn now_ms(&self) -> u64 {
        self.started.elapsed().as_millis() as u64
    }

    /// Asks the backend which services and mappings it fronts, off-thread.
    fn refresh_services(&self) {
        let client = Arc::clone(&self.client);
        let tx = self.worker_tx.clone();
        thread::spawn(move || {
            let result = client.services_and_mappings();
            let _ = tx.send(WorkerMsg::Services(result));
        });
    }

    /// Fetches the symbol list for the selected service, off-thread. The
    /// entries feed the symbol picker next to the label inputs.
    fn fetch_symbols(&self) {
        let client = Arc::clone(&self.client);
        let service = self.services[self.selected_service].clone();
        let mapping = self.mappings[self.selected_mapping].clone();
        let tx = self.worker_tx.clone();
        thread::spawn(move || {
            let mapping = (mapping != "none").then_some(mapping.as_str());
            let result = client.symbols(&service, mapping);
            let _ = tx.send(WorkerMsg::Symbols(result));
        });
    }

    /// Copies a picked symbol entry into the label and unicode inputs.
    fn apply_symbol_choice(&mut self, index: usize) {
        if let Some(entry) = self.symbols.get(index) {
            self.label_input = entry.symbol_class.clone();
            self.unicode_input = entry.unicode.clone();
        }
    }

    /// The list the inspector is currently showing.
    fn inspected_samples(&self) -> &[Sample] {
        match self.inspector.context() {
            InspectorContext::Session => &self.samples,
            InspectorContext::Loaded(_) => &self.loaded,
        }
    }

    fn submit(&mut self) {
        if self.session.strokes().is_empty() {
            self.alert = Some("Nothing to submit.".to_string());
            return;
        }
        if self.label_input.trim().is_empty() {
            self.alert = Some("Missing symbol label.".to_string());
            return;
        }
        let normalized = geometry::normalize(
            self.frame_width,
            self.frame_height,
            self.frame_margin,
            self.session.strokes(),
        );
        let sample = Sample::build(
            self.next_sample_id,
            self.label_input.trim(),
            self.unicode_input.trim(),
            self.frame_width,
            self.frame_height,
            normalized,
        );
        info!(
            id = sample.id,
            label = %sample.symbol_label,
            points = sample.total_point_count,
            "sample submitted"
        );
        self.next_sample_id += 1;
        self.dirty = true;
        self.samples.push(sample);
        self.session.clear();
    }

    fn classify(&mut self) {
        // Rejected here, synchronously: an empty gesture never reaches the
        // network.
        if self.session.strokes().is_empty() {
            self.alert = Some("Cannot send a request without any strokes.".to_string());
            return;
        }
        let service = self.services[self.selected_service].clone();
        let mapping = self.mappings[self.selected_mapping].clone();
        let strokes = self.session.strokes().clone();
        let preprocessing = if self.send_normalized {
            StrokePreprocessing::Normalized
        } else {
            StrokePreprocessing::Raw
        };
        let (frame_width, frame_height, frame_margin) =
            (self.frame_width, self.frame_height, self.frame_margin);
        let client = Arc::clone(&self.client);
        let tx = self.worker_tx.clone();
        thread::spawn(move || {
            let result = client.classify(
                &service,
                &mapping,
                frame_width,
                frame_height,
                frame_margin,
                &strokes,
                preprocessing,
            );
            let _ = tx.send(WorkerMsg::Classified { service, result });
        });
    }

    fn export(&mut self) {
        let retained: Vec<Sample> = self
            .inspector
            .retained(self.inspected_samples())
            .into_iter()
            .cloned()
            .collect();
        if retained.is_empty() {
            self.alert = Some("Nothing to export.".to_string());
            return;
        }
        let dataset = dataset::serialize(&retained, self.frame_margin);
        let path = self.export_dir.join(dataset::export_filename(chrono::Local::now()));
        let shown = path.display().to_string();
        let written = dataset::to_json(&dataset)
            .map_err(|e| e.to_string())
            .and_then(|json| std::fs::write(&path, json).map_err(|e| e.to_string()));
        match written {
            Ok(()) => {
                info!(path = %shown, count = retained.len(), "dataset exported");
                self.alert = Some(format!("Exported {} samples to {shown}.", retained.len()));
                // The sample list stays inspectable after export; only the
                // canvas resets. Ids keep counting from where they were.
                self.session.clear();
                if matches!(self.inspector.context(), InspectorContext::Session) {
                    self.dirty = false;
                }
            }
            Err(message) => self.alert = Some(format!("Export failed: {message}")),
        }
    }

    /// Loads a dataset file. A file failing validation changes nothing.
    fn load(&mut self) {
        let path = self.load_path.trim().to_string();
        if path.is_empty() {
            self.alert = Some("Please enter a dataset path before loading.".to_string());
            return;
        }
        let parsed = std::fs::read_to_string(&path)
            .map_err(|e| format!("File loading failed: {e}"))
            .and_then(|raw| dataset::deserialize(&raw).map_err(|e| e.to_string()));
        match parsed {
            Ok(dataset) => {
                info!(%path, count = dataset.samples.len(), "dataset loaded");
                self.loaded = dataset.samples;
                self.inspector.set_context(InspectorContext::Loaded(path));
            }
            Err(message) => self.alert = Some(message),
        }
    }

    fn drain_worker_messages(&mut self) {
        while let Ok(msg) = self.worker_rx.try_recv() {
            match msg {
                WorkerMsg::Services(Ok(listing)) => {
                    if !listing.services.is_empty() {
                        self.services = listing.services;
                        self.selected_service = 0;
                    }
                    if !listing.mappings.is_empty() {
                        self.mappings = listing.mappings;
                        self.selected_mapping = 0;
                    }
                }
                WorkerMsg::Services(Err(err)) => {
                    // Keep the built-in lists; the user can retry.
                    warn!("service listing failed: {err}");
                }
                WorkerMsg::Symbols(Ok(entries)) => self.symbols = entries,
                WorkerMsg::Symbols(Err(err)) => self.alert = Some(err.to_string()),
                WorkerMsg::Classified { service, result } => match result {
                    Ok(results) => {
                        for (i, c) in results.iter().enumerate() {
                            typeset::render_symbol(
                                &mut self.typesetter,
                                &result_selector(i),
                                &c.symbol_label,
                                &c.unicode,
                            );
                        }
                        self.classifications = Some((service, results));
                    }
                    Err(err) => self.alert = Some(err.to_string()),
                },
            }
        }
    }

    fn handle_close_request(&mut self, ctx: &egui::Context) {
        if ctx.input(|i| i.viewport().close_requested()) && !self.close_allowed && self.dirty {
            // Unsaved samples: hold the window open until the user decides.
            ctx.send_viewport_cmd(egui::ViewportCommand::CancelClose);
            self.confirm_close = true;
        }
    }

    fn draw_canvas(&mut self, ui: &mut egui::Ui) {
        let size = egui::Vec2::new(self.frame_width as f32, self.frame_height as f32);
        let (response, painter) = ui.allocate_painter(size, egui::Sense::drag());
        let origin = response.rect.min;
        painter.rect_filled(response.rect, 2.0, egui::Color32::WHITE);
        painter.rect_stroke(
            response.rect,
            2.0,
            egui::Stroke::new(1.0, egui::Color32::GRAY),
        );

        if let Some(pos) = response.interact_pointer_pos() {
            let x = (pos.x - origin.x).round() as i32;
            let y = (pos.y - origin.y).round() as i32;
            let now = self.now_ms();
            if response.drag_started() {
                self.session.pointer_down(x, y, now);
            } else if response.dragged() {
                self.session.pointer_move(x, y, now);
            }
        }
        if response.drag_stopped() {
            self.session.pointer_up();
        }

        let to_screen = |p: &Point| origin + egui::Vec2::new(p.x as f32, p.y as f32);
        let draw_stroke = |stroke: &Stroke| {
            if stroke.len() == 1 {
                painter.circle_filled(to_screen(&stroke[0]), LINE_THICKNESS / 2.0, DRAWING_COLOR);
                return;
            }
            for pair in stroke.windows(2) {
                painter.line_segment(
                    [to_screen(&pair[0]), to_screen(&pair[1])],
                    egui::Stroke::new(LINE_THICKNESS, DRAWING_COLOR),
                );
            }
        };
        for stroke in self.session.strokes() {
            draw_stroke(stroke);
        }
        if let Some(pending) = self.session.pending() {
            draw_stroke(pending);
        }

        if self.show_sample_dots {
            for p in self.session.strokes().iter().flatten() {
                painter.circle_filled(to_screen(p), SAMPLE_DOT_SIZE, SAMPLES_COLOR);
            }
            let rescaled = geometry::normalize(
                self.frame_width,
                self.frame_height,
                self.frame_margin,
                self.session.strokes(),
            );
            for p in rescaled.iter().flatten() {
                painter.circle_filled(to_screen(p), SAMPLE_DOT_SIZE, RESCALED_COLOR);
            }
        }
    }

    fn draw_results(&self, ui: &mut egui::Ui) {
        let Some((service, results)) = &self.classifications else {
            return;
        };
        ui.group(|ui| {
            ui.heading(format!("Predictions ({service})"));
            ui.separator();
            egui::Grid::new("results_grid")
                .num_columns(3)
                .striped(true)
                .show(ui, |ui| {
                    ui.label("Symbol");
                    ui.label("Unicode");
                    ui.label("Score");
                    ui.end_row();
                    for row in results_rows(service, results, &self.typesetter) {
                        for cell in row {
                            ui.label(cell);
                        }
                        ui.end_row();
                    }
                });
        });
    }

    fn draw_inspector(&mut self, ui: &mut egui::Ui) {
        let total = self.inspected_samples().len();
        let context_label = match self.inspector.context() {
            InspectorContext::Session => "session".to_string(),
            InspectorContext::Loaded(path) => format!("loaded: {path}"),
        };
        ui.group(|ui| {
            ui.heading("Inspector");
            ui.label(format!("{total} samples ({context_label})"));
            ui.separator();

            let range = self.inspector.visible_range(total);
            let visible: Vec<(u64, String, String)> = self.inspected_samples()[range]
                .iter()
                .map(|s| (s.id, s.symbol_label.clone(), s.unicode.clone()))
                .collect();
            // Typeset every visible cell; already-rendered slots are cheap
            // re-inserts.
            for (id, label, unicode) in &visible {
                typeset::render_symbol(
                    &mut self.typesetter,
                    &sample_selector(*id),
                    label,
                    unicode,
                );
            }

            let mut toggled = None;
            egui::Grid::new("inspector_grid")
                .num_columns(4)
                .striped(true)
                .show(ui, |ui| {
                    ui.label("id");
                    ui.label("symbol");
                    ui.label("unicode");
                    ui.label("delete");
                    ui.end_row();
                    for (id, label, unicode) in &visible {
                        ui.label(format!("{id}"));
                        let shown = self
                            .typesetter
                            .text(&sample_selector(*id))
                            .unwrap_or(label.as_str());
                        ui.label(shown);
                        ui.label(unicode);
                        let mut marked = self.inspector.is_selected(*id);
                        if ui.checkbox(&mut marked, "").changed() {
                            toggled = Some(*id);
                        }
                        ui.end_row();
                    }
                });
            if let Some(id) = toggled {
                self.inspector.toggle(id);
            }

            ui.horizontal(|ui| {
                if ui.button("< Prev").clicked() {
                    self.inspector.prev_page();
                }
                if ui.button("Next >").clicked() {
                    self.inspector.next_page(total);
                }
                if self.inspector.selected_count() > 0 {
                    ui.label(format!(
                        "{} marked for deletion",
                        self.inspector.selected_count()
                    ));
                }
                if ui.button("Back to session").clicked() {
                    self.inspector.set_context(InspectorContext::Session);
                }
            });
        });
    }

    fn draw_alert(&mut self, ctx: &egui::Context) {
        let mut dismissed = false;
        if let Some(message) = &self.alert {
            egui::Window::new("Notice")
                .collapsible(false)
                .resizable(false)
                .anchor(egui::Align2::CENTER_CENTER, egui::Vec2::ZERO)
                .show(ctx, |ui| {
                    ui.label(message);
                    if ui.button("OK").clicked() {
                        dismissed = true;
                    }
                });
        }
        if dismissed {
            self.alert = None;
        }
    }

    fn draw_close_confirmation(&mut self, ctx: &egui::Context) {
        if !self.confirm_close {
            return;
        }
        egui::Window::new("Unsaved samples")
            .collapsible(false)
            .resizable(false)
            .anchor(egui::Align2::CENTER_CENTER, egui::Vec2::ZERO)
            .show(ctx, |ui| {
                ui.label(format!(
                    "{} samples have not been exported. Quit anyway?",
                    self.samples.len()
                ));
                ui.horizontal(|ui| {
                    if ui.button("Quit").clicked() {
                        self.close_allowed = true;
                        ctx.send_viewport_cmd(egui::ViewportCommand::Close);
                    }
                    if ui.button("Keep editing").clicked() {
                        self.confirm_close = false;
                    }
                });
            });
    }
}

/// Rows of the prediction table: the typeset rendering of each symbol (with
/// its unicode fallback already applied) and the score formatted per service.
fn results_rows(
    service: &str,
    results: &[Classification],
    typesetter: &TextTypesetter,
) -> Vec<[String; 3]> {
    results
        .iter()
        .enumerate()
        .map(|(i, c)| {
            let shown = typesetter
                .text(&result_selector(i))
                .unwrap_or(c.symbol_label.as_str());
            [
                shown.to_string(),
                c.unicode.clone(),
                classify::format_score(service, c.score),
            ]
        })
        .collect()
}

impl eframe::App for GlyphPadApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        self.drain_worker_messages();
        self.handle_close_request(ctx);

        // Keep repainting while a gesture is live so the line tracks the
        // pointer.
        if self.session.is_capturing() {
            ctx.request_repaint_after(std::time::Duration::from_millis(16));
        }

        egui::TopBottomPanel::top("top_panel").show(ctx, |ui| {
            ui.horizontal(|ui| {
                ui.heading("GlyphPad");
                ui.separator();
                ui.label(format!("Saved samples count: {}", self.samples.len()));
            });
        });

        let mut do_submit = false;
        let mut do_classify = false;
        let mut do_export = false;
        let mut do_load = false;
        let mut do_refresh = false;
        let mut do_fetch_symbols = false;
        let mut picked_symbol = None;

        egui::SidePanel::left("side_panel")
            .min_width(220.0)
            .show(ctx, |ui| {
                ui.heading("Symbol");
                ui.horizontal(|ui| {
                    ui.label("label:");
                    ui.text_edit_singleline(&mut self.label_input);
                });
                ui.horizontal(|ui| {
                    ui.label("unicode:");
                    ui.text_edit_singleline(&mut self.unicode_input);
                });
                ui.horizontal(|ui| {
                    if ui.button("Fetch symbols").clicked() {
                        do_fetch_symbols = true;
                    }
                    if !self.symbols.is_empty() {
                        egui::ComboBox::from_id_source("symbol_picker")
                            .selected_text("pick a symbol")
                            .show_ui(ui, |ui| {
                                for (i, entry) in self.symbols.iter().enumerate() {
                                    let current = self.label_input == entry.symbol_class;
                                    if ui.selectable_label(current, &entry.symbol_class).clicked()
                                    {
                                        picked_symbol = Some(i);
                                    }
                                }
                            });
                    }
                });
                ui.separator();

                if ui.button("Submit").clicked() {
                    do_submit = true;
                }
                if ui.button("Retry").clicked() {
                    self.session.clear();
                    self.classifications = None;
                }
                ui.checkbox(&mut self.show_sample_dots, "Show sample dots");
                ui.separator();

                ui.heading("Classification");
                egui::ComboBox::from_label("service")
                    .selected_text(self.services[self.selected_service].clone())
                    .show_ui(ui, |ui| {
                        for (i, name) in self.services.iter().enumerate() {
                            ui.selectable_value(&mut self.selected_service, i, name);
                        }
                    });
                egui::ComboBox::from_label("mapping")
                    .selected_text(self.mappings[self.selected_mapping].clone())
                    .show_ui(ui, |ui| {
                        for (i, name) in self.mappings.iter().enumerate() {
                            ui.selectable_value(&mut self.selected_mapping, i, name);
                        }
                    });
                ui.checkbox(&mut self.send_normalized, "Send normalized strokes");
                ui.horizontal(|ui| {
                    if ui.button("Classify").clicked() {
                        do_classify = true;
                    }
                    if ui.button("Refresh services").clicked() {
                        do_refresh = true;
                    }
                });
                ui.separator();

                ui.heading("Dataset");
                if ui.button("Export").clicked() {
                    do_export = true;
                }
                ui.horizontal(|ui| {
                    ui.label("file:");
                    ui.text_edit_singleline(&mut self.load_path);
                });
                if ui.button("Load").clicked() {
                    do_load = true;
                }
            });

        egui::CentralPanel::default().show(ctx, |ui| {
            egui::ScrollArea::vertical().show(ui, |ui| {
                self.draw_canvas(ui);
                ui.add_space(10.0);
                self.draw_results(ui);
                ui.add_space(10.0);
                self.draw_inspector(ui);
            });
        });

        if do_submit {
            self.submit();
        }
        if do_classify {
            self.classify();
        }
        if do_export {
            self.export();
        }
        if do_load {
            self.load();
        }
        if do_refresh {
            self.refresh_services();
        }
        if do_fetch_symbols {
            self.fetch_symbols();
        }
        if let Some(index) = picked_symbol {
            self.apply_symbol_choice(index);
        }

        self.draw_alert(ctx);
        self.draw_close_confirmation(ctx);
    }
}

pub fn run_gui(app: GlyphPadApp) -> Result<(), eframe::Error> {
    let options = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default()
            .with_inner_size([900.0, 640.0])
            .with_title("GlyphPad"),
        ..Default::default()
    };
    eframe::run_native("GlyphPad", options, Box::new(move |_cc| Box::new(app)))
}
