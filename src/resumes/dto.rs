use serde::Deserialize;

use crate::resumes::repo::ResumeStatus;

#[derive(Debug, Deserialize)]
pub struct CreateResumeRequest {
    pub title: String,
    pub content: String,
}

/// Absent fields keep their current value.
#[derive(Debug, Deserialize)]
pub struct UpdateResumeRequest {
    pub title: Option<String>,
    pub content: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct UpdateStatusRequest {
    pub status: ResumeStatus,
    pub reason: String,
}

#[derive(Debug, Clone, Copy, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SortOrder {
    Asc,
    Desc,
}

#[derive(Debug, Deserialize)]
pub struct ListQuery {
    #[serde(default = "default_sort")]
    pub sort: SortOrder,
}

fn default_sort() -> SortOrder {
    SortOrder::Desc
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sort_order_parses_lowercase() {
        assert!(matches!(
            serde_json::from_str::<SortOrder>("\"asc\"").unwrap(),
            SortOrder::Asc
        ));
        assert!(matches!(
            serde_json::from_str::<SortOrder>("\"desc\"").unwrap(),
            SortOrder::Desc
        ));
    }

    #[test]
    fn list_query_defaults_to_desc() {
        let q: ListQuery = serde_json::from_str("{}").unwrap();
        assert!(matches!(q.sort, SortOrder::Desc));
    }
}
