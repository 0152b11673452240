//! Aggregate statistics endpoint.
//!
//! Stats never error: on any store failure the response is all zeros with
//! 200, so the consuming page always renders. Responses are uncacheable;
//! the numbers move with every tracked job.

use actix_web::http::header::CacheControl;
use actix_web::http::header::CacheDirective;
use actix_web::{web, HttpResponse, Responder};

use crate::store::UsageStore;

async fn get_stats(store: web::Data<UsageStore>) -> impl Responder {
    HttpResponse::Ok()
        .insert_header(CacheControl(vec![CacheDirective::NoStore]))
        .json(store.stats())
}

async fn health_check() -> impl Responder {
    HttpResponse::Ok().body("OK")
}

pub fn config(cfg: &mut web::ServiceConfig) {
    cfg.service(web::resource("/api/stats").route(web::get().to(get_stats)))
        .service(web::resource("/health").route(web::get().to(health_check)));
}
