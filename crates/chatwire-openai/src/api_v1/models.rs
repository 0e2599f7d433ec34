use serde::Deserialize;

/// Body of `GET /models`.
#[derive(Debug, Deserialize)]
pub struct ModelList {
    pub data: Vec<ModelObject>,
}

#[allow(dead_code)]
#[derive(Debug, Deserialize)]
pub struct ModelObject {
    pub id: String,
    #[serde(default)]
    pub owned_by: Option<String>,
}

impl ModelList {
    pub fn into_ids(self) -> Vec<String> {
        self.data.into_iter().map(|model| model.id).collect()
    }
}
