pub mod configurations;
pub mod prototype;
pub mod spa;

use actix_web::{web, HttpResponse};
use serde_json::json;

pub fn create_routes(cfg: &mut web::ServiceConfig) {
    cfg.route("", web::get().to(home))
        .service(web::scope("/configurations").configure(configurations::create_routes))
        .configure(prototype::create_routes);
}

// GET /api
async fn home() -> HttpResponse {
    HttpResponse::Ok().json(json!({
        "message": "Welcome to OS Maker API",
        "endpoints": {
            "configurations": "/api/configurations/submit",
            "recent_configurations": "/api/configurations/recent",
            "download_iso": "/api/configurations/{id}/download-iso",
            "os_options": "/api/os-options",
            "submit_os": "/api/submit-os",
            "submissions": "/api/get-submissions",
        }
    }))
}
