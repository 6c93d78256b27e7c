use crate::routes::{assessment, health};
use utoipa::OpenApi;

#[derive(OpenApi)]
#[openapi(info(
    title = "bookserver",
    description = "Assessment results API for interactive textbooks",
    version = "0.1.0",
))]
pub struct ApiDoc;

pub fn get_docs() -> utoipa::openapi::OpenApi {
    let mut root = ApiDoc::openapi();
    root.merge(health::HealthApi::openapi());
    root.merge(assessment::AssessmentApi::openapi());
    root
}
