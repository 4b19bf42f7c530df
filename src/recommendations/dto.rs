use serde::{Deserialize, Serialize};

use crate::restaurants::repo_types::Restaurant;

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RecommendationQuery {
    pub user_id: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct RecommendationResponse {
    pub user: String, // email
    pub recommendations: Vec<Restaurant>,
}
