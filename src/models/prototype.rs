use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use validator::Validate;

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct OsOption {
    pub id: i64,
    pub name: Option<String>,
    pub description: Option<String>,
    pub image: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Submission {
    pub id: i64,
    pub selected_os: Option<String>,
    pub option: Option<String>,
    pub customization_details: Option<String>,
}

#[derive(Debug, Deserialize, Validate)]
pub struct SubmitOsForm {
    #[serde(rename = "selectedOS")]
    #[validate(length(min = 1, max = 100))]
    pub selected_os: String,

    #[validate(length(min = 1, max = 100))]
    pub option: String,

    #[serde(rename = "customizationDetails", default)]
    #[validate(length(max = 10000))]
    pub customization_details: String,
}

#[derive(Debug, Serialize)]
pub struct SubmitOsResponse {
    pub message: String,
    pub id: i64,
}
