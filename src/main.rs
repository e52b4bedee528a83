#![cfg_attr(target_os = "windows", windows_subsystem = "windows")]

use std::sync::Arc;

use ptcopyedit::config::Config;
use ptcopyedit::controller::Controller;
use ptcopyedit::google::GoogleClient;
use ptcopyedit::logger;
use ptcopyedit::store::{FormField, JsonFileStore};
use ptcopyedit::ui;

fn main() -> anyhow::Result<()> {
    // Init logger first
    logger::init();
    tracing::info!("App starting");

    // Config: load from config.json (next to exe). Env vars still override if present.
    let mut cfg = Config::load();
    if !Config::path().exists() {
        if let Err(e) = cfg.save() {
            tracing::warn!(error = %e, "could not write default config.json");
        }
    }
    cfg.apply_env();
    tracing::info!(
        model = %cfg.vertex_model,
        location = %cfg.vertex_location,
        delay_ms = cfg.request_delay_ms,
        "Config loaded"
    );

    let store = JsonFileStore::open(cfg.form_path());
    tracing::info!(path = %store.path().display(), "Form store opened");
    let mut controller = Controller::new(Box::new(store), cfg.flash_duration());
    if controller.form.project_id.trim().is_empty() && !cfg.default_project_id.is_empty() {
        controller.set_field(FormField::ProjectId, cfg.default_project_id.clone());
    }

    let backend = Arc::new(GoogleClient::new(cfg.clone())?);

    // Run UI on main thread (blocks)
    ui::run(controller, backend, cfg.request_delay())
}
