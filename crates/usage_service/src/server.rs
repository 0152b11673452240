use std::path::PathBuf;

use actix_cors::Cors;
use actix_web::{web, App, HttpServer};
use log::{error, info};

use crate::controllers::{stats_controller, tracking_controller};
use crate::store::UsageStore;

const DEFAULT_WORKER_COUNT: usize = 4;

pub fn app_config(cfg: &mut web::ServiceConfig) {
    cfg.configure(tracking_controller::config)
        .configure(stats_controller::config);
}

pub async fn run(data_dir: PathBuf, port: u16) -> Result<(), String> {
    info!("Starting usage service...");

    let db_path = data_dir.join("usage.db");
    let store = UsageStore::open(&db_path)
        .map_err(|e| format!("Failed to open usage store at {}: {e}", db_path.display()))?;
    let store = web::Data::new(store);

    let server = HttpServer::new(move || {
        App::new()
            .app_data(store.clone())
            .wrap(Cors::permissive())
            .configure(app_config)
    })
    .workers(DEFAULT_WORKER_COUNT)
    .bind(format!("127.0.0.1:{port}"))
    .map_err(|e| format!("Failed to bind server: {e}"))?
    .run();

    info!("Usage service listening on http://127.0.0.1:{port}");

    if let Err(e) = server.await {
        error!("Usage service error: {}", e);
        return Err(format!("Usage service error: {e}"));
    }

    Ok(())
}
