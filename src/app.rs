use crate::{
    clipboard::SystemClipboard,
    config::AppConfig,
    coordinator::{Coordinator, Status},
};
use eframe::egui;
use std::{
    env,
    path::PathBuf,
    time::{Duration, Instant},
};

const NOTIFICATION_DURATION: f32 = 3.0;

pub struct CopyChatApp {
    pub config: AppConfig,
    pub target_input: String,
    pub format_as_markdown: bool,
    pub coordinator: Coordinator<SystemClipboard>,
    pub notification: Option<(String, Instant)>,
}

impl CopyChatApp {
    pub fn new(config: AppConfig) -> Self {
        Self {
            format_as_markdown: config.format_as_markdown,
            config,
            target_input: String::new(),
            coordinator: Coordinator::new(SystemClipboard::default()),
            notification: None,
        }
    }

    fn copy_chat(&mut self) {
        self.notification = None;
        self.coordinator
            .trigger(&self.target_input, self.format_as_markdown, &self.config);
    }

    fn target_row(&mut self, ui: &mut egui::Ui) {
        ui.horizontal(|ui| {
            ui.label("Page:");
            if ui.button("Browse…").clicked() {
                if let Some(file) = rfd::FileDialog::new()
                    .add_filter("HTML", &["html", "htm"])
                    .pick_file()
                {
                    self.target_input = file.display().to_string();
                }
            }
            ui.add(
                egui::TextEdit::singleline(&mut self.target_input)
                    .hint_text("https://www.perplexity.ai/search/… or saved .html")
                    .desired_width(f32::INFINITY),
            );
        });
    }

    fn status_row(&mut self, ui: &mut egui::Ui, ctx: &egui::Context) {
        ui.horizontal(|ui| {
            ui.set_height(24.0);
            if self.coordinator.is_pending() {
                ui.spinner();
            }
            let status = self.coordinator.status();
            let color = match status {
                Status::Copied => egui::Color32::LIGHT_GREEN,
                Status::Idle | Status::NoContent => ui.visuals().text_color(),
                _ => egui::Color32::LIGHT_RED,
            };
            ui.label(egui::RichText::new(status.text()).color(color));

            if let Some((message, start)) = &self.notification {
                let elapsed = start.elapsed().as_secs_f32();
                if elapsed < NOTIFICATION_DURATION {
                    let alpha = 1.0 - (elapsed / NOTIFICATION_DURATION);
                    ui.separator();
                    ui.label(egui::RichText::new(message).color(
                        egui::Color32::from_rgba_unmultiplied(255, 255, 255, (alpha * 255.0) as u8),
                    ));
                    ctx.request_repaint();
                } else {
                    self.notification = None;
                }
            }
        });
    }
}

impl eframe::App for CopyChatApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        if let Some(copied) = self.coordinator.poll() {
            self.notification = Some((copied.describe(), Instant::now()));
        }

        egui::CentralPanel::default().show(ctx, |ui| {
            ui.heading("Copy Chat");
            ui.separator();
            self.target_row(ui);
            ui.checkbox(&mut self.format_as_markdown, "Format as Markdown");
            if ui.button("Copy Chat").clicked() {
                self.copy_chat();
            }
            ui.separator();
            self.status_row(ui, ctx);
        });

        if self.coordinator.is_pending() {
            ctx.request_repaint_after(Duration::from_millis(50));
        }
    }
}

pub fn run() -> anyhow::Result<()> {
    let cwd = env::current_dir().unwrap_or_else(|_| PathBuf::from("."));
    let mut app = CopyChatApp::new(AppConfig::load_from(&cwd));
    if let Some(arg) = env::args().nth(1) {
        app.target_input = arg;
    }
    let options = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default().with_inner_size([520.0, 200.0]),
        ..Default::default()
    };
    eframe::run_native("Copy Chat", options, Box::new(|_cc| Ok(Box::new(app))))
        .map_err(|err| anyhow::anyhow!("failed to open window: {err}"))
}
