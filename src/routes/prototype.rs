use actix_web::{web, HttpResponse};
use validator::Validate;

use crate::error::{AppError, AppResult};
use crate::models::prototype::{SubmitOsForm, SubmitOsResponse};
use crate::services::prototype::PrototypeService;
use crate::AppState;

pub fn create_routes(cfg: &mut web::ServiceConfig) {
    cfg.app_data(web::JsonConfig::default().error_handler(|err, _req| {
        AppError::BadRequest(format!("Invalid request body: {}", err)).into()
    }))
    .route("/os-options", web::get().to(get_os_options))
    .route("/submit-os", web::post().to(submit_os))
    .route("/get-submissions", web::get().to(get_submissions));
}

async fn get_os_options(state: web::Data<AppState>) -> AppResult<HttpResponse> {
    let options = PrototypeService::new(&state.db).get_os_options().await?;
    Ok(HttpResponse::Ok().json(options))
}

async fn submit_os(
    state: web::Data<AppState>,
    form: web::Json<SubmitOsForm>,
) -> AppResult<HttpResponse> {
    form.validate()
        .map_err(|e| AppError::Validation(e.to_string()))?;

    let id = PrototypeService::new(&state.db)
        .insert_submission(&form)
        .await?;
    tracing::info!("Stored prototype submission {} for {}", id, form.selected_os);

    Ok(HttpResponse::Created().json(SubmitOsResponse {
        message: "OS configuration submitted successfully".to_string(),
        id,
    }))
}

async fn get_submissions(state: web::Data<AppState>) -> AppResult<HttpResponse> {
    let submissions = PrototypeService::new(&state.db)
        .get_recent_submissions()
        .await?;
    Ok(HttpResponse::Ok().json(submissions))
}
