//! Tracking endpoints: one POST per completed (or failed) job.

use actix_web::{web, HttpResponse};
use log::info;
use serde::{Deserialize, Serialize};

use crate::error::Result;
use crate::store::{EnhancementEvent, UsageStore, WatermarkEvent};

fn default_true() -> bool {
    true
}

fn default_photo_count() -> u32 {
    1
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TrackEnhancementRequest {
    pub user_id: String,
    #[serde(default)]
    pub filename: Option<String>,
    #[serde(default)]
    pub file_size: Option<u64>,
    #[serde(default)]
    pub processing_time: f64,
    pub enhancement_type: String,
    #[serde(default = "default_true")]
    pub success: bool,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TrackWatermarkRequest {
    pub user_id: String,
    #[serde(default)]
    pub filename: Option<String>,
    #[serde(default)]
    pub file_size: Option<u64>,
    #[serde(default)]
    pub processing_time: f64,
    #[serde(default)]
    pub watermark_text: Option<String>,
    #[serde(default)]
    pub watermark_style: Option<String>,
    #[serde(default)]
    pub watermark_position: Option<String>,
    #[serde(default = "default_photo_count")]
    pub photo_count: u32,
    #[serde(default = "default_true")]
    pub success: bool,
}

#[derive(Serialize)]
struct TrackResponse {
    success: bool,
    id: i64,
}

async fn track_enhancement(
    store: web::Data<UsageStore>,
    req: web::Json<TrackEnhancementRequest>,
) -> Result<HttpResponse> {
    let req = req.into_inner();
    let id = store.record_enhancement(&EnhancementEvent {
        user_id: req.user_id,
        filename: req.filename,
        file_size: req.file_size,
        processing_time: req.processing_time,
        enhancement_type: req.enhancement_type,
        success: req.success,
    })?;
    info!("tracked enhancement #{id}");
    Ok(HttpResponse::Ok().json(TrackResponse { success: true, id }))
}

async fn track_watermark(
    store: web::Data<UsageStore>,
    req: web::Json<TrackWatermarkRequest>,
) -> Result<HttpResponse> {
    let req = req.into_inner();
    let id = store.record_watermark(&WatermarkEvent {
        user_id: req.user_id,
        filename: req.filename,
        file_size: req.file_size,
        processing_time: req.processing_time,
        watermark_text: req.watermark_text,
        watermark_style: req.watermark_style,
        watermark_position: req.watermark_position,
        photo_count: req.photo_count,
        success: req.success,
    })?;
    info!("tracked watermark #{id}");
    Ok(HttpResponse::Ok().json(TrackResponse { success: true, id }))
}

pub fn config(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::resource("/api/track/enhancement").route(web::post().to(track_enhancement)),
    )
    .service(web::resource("/api/track/watermark").route(web::post().to(track_watermark)));
}
