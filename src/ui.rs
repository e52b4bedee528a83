use std::sync::Arc;
use std::time::{Duration, Instant};

use eframe::egui;
use egui_phosphor::regular as icon;
use once_cell::sync::OnceCell;

use crate::controller::{ActionKind, Controller, Job};
use crate::fragment;
use crate::google::Backend;
use crate::store::FormField;
use crate::worker::{Wake, Worker};

const TITLE: &str = "PT → EN Copy Editor";

struct FormApp {
    controller: Controller,
    worker: Worker,
    fonts_set: bool,
}

fn install_fonts(ctx: &egui::Context) {
    let mut fonts = egui::FontDefinitions::default();
    egui_phosphor::add_to_fonts(&mut fonts, egui_phosphor::Variant::Regular);
    ctx.set_fonts(fonts);
    tracing::debug!("icon font installed");
}

impl FormApp {
    fn dispatch(&mut self, job: Option<Job>) {
        let Some(job) = job else { return };
        let kind = job.kind();
        tracing::info!(?kind, "submitting job");
        if let Err(e) = self.worker.submit(job) {
            self.controller.abandon(kind, e);
        }
    }

    fn action_button(&mut self, ui: &mut egui::Ui, kind: ActionKind, label: &str) -> bool {
        let busy = self.controller.is_busy(kind);
        let clicked = ui.add_enabled(!busy, egui::Button::new(label)).clicked();
        if busy {
            ui.add(egui::Spinner::new());
        }
        clicked
    }

    fn flash_banner(&mut self, ctx: &egui::Context) {
        let now = Instant::now();
        let Some(message) = self.controller.flash.current(now).map(str::to_owned) else {
            return;
        };
        if let Some(left) = self.controller.flash.remaining(now) {
            ctx.request_repaint_after(left);
        }
        egui::TopBottomPanel::top("flash").show(ctx, |ui| {
            ui.horizontal(|ui| {
                ui.colored_label(
                    egui::Color32::from_rgb(0xD9, 0x48, 0x3B),
                    format!("{} {}", icon::WARNING, message),
                );
                ui.with_layout(egui::Layout::right_to_left(egui::Align::Center), |ui| {
                    if ui.small_button(icon::X).clicked() {
                        self.controller.flash.dismiss();
                    }
                });
            });
        });
    }

    fn credentials(&mut self, ui: &mut egui::Ui) {
        ui.horizontal(|ui| {
            ui.label("Project id");
            let form = &mut self.controller.form;
            if ui.text_edit_singleline(&mut form.project_id).changed() {
                self.controller.field_edited(FormField::ProjectId);
            }
            ui.label("API key");
            let edit = egui::TextEdit::singleline(&mut self.controller.form.api_key)
                .password(true)
                .hint_text("gcloud auth print-access-token");
            if ui.add(edit).changed() {
                self.controller.field_edited(FormField::ApiKey);
            }
            if ui
                .button(format!("{} Clear token", icon::X))
                .on_hover_text("Forget the API key")
                .clicked()
            {
                self.controller.clear_api_key();
            }
        });
    }

    fn text_area(&mut self, ui: &mut egui::Ui, field: FormField, rows: usize) {
        let text = match field {
            FormField::SourceText => &mut self.controller.form.source_text,
            FormField::TranslatedText => &mut self.controller.form.translated_text,
            FormField::ApiKey | FormField::ProjectId => return,
        };
        let edit = egui::TextEdit::multiline(text)
            .desired_rows(rows)
            .desired_width(f32::INFINITY);
        if ui.add(edit).changed() {
            self.controller.field_edited(field);
        }
    }

    fn cleaned_output(&mut self, ui: &mut egui::Ui) {
        let html = self.controller.form.cleaned_html.clone();
        let plain = fragment::html_to_plain(&html);
        ui.add(
            egui::TextEdit::multiline(&mut plain.as_str())
                .desired_rows(10)
                .desired_width(f32::INFINITY),
        );
        ui.horizontal(|ui| {
            let has_output = !html.is_empty();
            if ui
                .add_enabled(has_output, egui::Button::new(format!("{} Copy HTML", icon::COPY)))
                .clicked()
            {
                ui.ctx().output_mut(|o| o.copied_text = html.clone());
            }
            if ui
                .add_enabled(has_output, egui::Button::new(format!("{} Copy text", icon::COPY)))
                .clicked()
            {
                ui.ctx().output_mut(|o| o.copied_text = plain.clone());
            }
        });
    }
}

impl eframe::App for FormApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        if !self.fonts_set {
            self.fonts_set = true;
            install_fonts(ctx);
        }
        for outcome in self.worker.drain() {
            self.controller.complete(outcome);
        }
        if self.controller.is_busy(ActionKind::Translate) || self.controller.is_busy(ActionKind::Cleanup) {
            ctx.request_repaint_after(Duration::from_millis(120));
        }

        self.flash_banner(ctx);

        egui::CentralPanel::default().show(ctx, |ui| {
            egui::ScrollArea::vertical()
                .auto_shrink([false, false])
                .show(ui, |ui| {
                    self.credentials(ui);
                    ui.separator();

                    ui.heading("Portuguese");
                    self.text_area(ui, FormField::SourceText, 8);
                    let mut job = None;
                    ui.horizontal(|ui| {
                        let label = format!("{} Translate", icon::TRANSLATE);
                        if self.action_button(ui, ActionKind::Translate, &label) {
                            job = self.controller.translate_clicked();
                        }
                    });
                    self.dispatch(job);

                    ui.heading("English (HTML)");
                    self.text_area(ui, FormField::TranslatedText, 8);
                    let mut job = None;
                    ui.horizontal(|ui| {
                        let label = format!("{} Copy edit", icon::MAGIC_WAND);
                        if self.action_button(ui, ActionKind::Cleanup, &label) {
                            job = self.controller.cleanup_clicked();
                        }
                    });
                    self.dispatch(job);

                    ui.heading("Copy edited");
                    self.cleaned_output(ui);
                    ui.separator();
                    if ui.button(format!("{} Clear all", icon::TRASH)).clicked() {
                        self.controller.clear_all();
                    }
                });
        });
    }
}

/// Run the form on the main thread (blocking).
pub fn run(controller: Controller, backend: Arc<dyn Backend>, delay: Duration) -> anyhow::Result<()> {
    let ctx_slot: Arc<OnceCell<egui::Context>> = Arc::new(OnceCell::new());
    let wake: Wake = {
        let slot = Arc::clone(&ctx_slot);
        Arc::new(move || {
            if let Some(ctx) = slot.get() {
                ctx.request_repaint();
            }
        })
    };
    let worker = Worker::spawn(backend, delay, Some(wake))?;

    tracing::info!("Main UI: starting event loop");
    let native_options = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default()
            .with_title(TITLE)
            .with_inner_size([900.0, 760.0]),
        ..Default::default()
    };
    let app = FormApp { controller, worker, fonts_set: false };
    eframe::run_native(
        TITLE,
        native_options,
        Box::new(move |cc| {
            let _ = ctx_slot.set(cc.egui_ctx.clone());
            Box::new(app)
        }),
    )
    .map_err(|e| anyhow::anyhow!("UI error: {e}"))?;
    tracing::info!("Main UI: event loop exited");
    Ok(())
}
