use actix_files::{Files, NamedFile};
use actix_web::dev::{fn_service, ServiceRequest, ServiceResponse};
use actix_web::ResponseError;
use std::path::Path;

use crate::error::AppError;

/// Serves the front-end build. Unknown paths get `index.html` so client-side routing works.
/// Register last: it matches every path.
pub fn service(static_dir: &Path) -> Files {
    let index = static_dir.join("index.html");

    Files::new("/", static_dir)
        .index_file("index.html")
        .default_handler(fn_service(move |req: ServiceRequest| {
            let index = index.clone();
            async move {
                let (req, _) = req.into_parts();
                let res = match NamedFile::open_async(&index).await {
                    Ok(file) => file.into_response(&req),
                    Err(_) => AppError::NotFound("Front-end build not found".to_string())
                        .error_response(),
                };
                Ok::<_, actix_web::Error>(ServiceResponse::new(req, res))
            }
        }))
}
