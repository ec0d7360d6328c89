use axum::{
    async_trait,
    extract::{FromRequestParts, Query},
    http::{request::Parts, StatusCode},
    response::{IntoResponse, Response},
    Json, RequestPartsExt,
};
use serde::{Deserialize, Serialize};
use serde_json::json;

#[derive(Serialize)]
pub struct Paginated<T> {
    pub items: Vec<T>,
    pub meta: PaginatedMeta,
}

#[derive(Serialize, Clone)]
pub struct PaginatedMeta {
    pub total: u32,
    pub page: u32,
    pub per_page: u32,
    pub total_pages: u32,
}

impl<T> Paginated<T> {
    pub fn new(items: Vec<T>, total: u32, page: u32, per_page: u32) -> Paginated<T> {
        Self {
            items,
            meta: PaginatedMeta {
                total,
                page,
                per_page,
                total_pages: total_pages(total, per_page),
            },
        }
    }
}

fn total_pages(total: u32, per_page: u32) -> u32 {
    if per_page == 0 {
        return 0;
    }
    (total + per_page - 1) / per_page
}

#[derive(Deserialize, Clone)]
pub struct Pagination {
    #[serde(default = "default_page")]
    pub page: u32,
    #[serde(default = "default_per_page")]
    pub per_page: u32,
}

impl Pagination {
    pub fn limit(&self) -> i64 {
        self.per_page as i64
    }

    pub fn offset(&self) -> i64 {
        (self.page.max(1) as i64 - 1) * self.per_page as i64
    }
}

fn default_page() -> u32 {
    1
}

fn default_per_page() -> u32 {
    10
}

#[async_trait]
impl<S: Send + Sync> FromRequestParts<S> for Pagination {
    type Rejection = Response;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        match parts.extract::<Query<Pagination>>().await {
            Ok(Query(pagination)) => Ok(pagination),
            _ => Err((
                StatusCode::BAD_REQUEST,
                Json(json!({ "error": "Invalid pagination options"})),
            )
                .into_response()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn meta_reports_ceiling_of_total_over_per_page() {
        let paginated = Paginated::new(vec![(); 10], 25, 1, 10);
        assert_eq!(paginated.meta.total_pages, 3);

        let paginated = Paginated::new(vec![(); 10], 30, 2, 10);
        assert_eq!(paginated.meta.total_pages, 3);

        let paginated = Paginated::<()>::new(vec![], 0, 1, 10);
        assert_eq!(paginated.meta.total_pages, 0);
    }

    #[test]
    fn offset_is_zero_based_from_page_one() {
        let pagination = Pagination {
            page: 1,
            per_page: 10,
        };
        assert_eq!(pagination.offset(), 0);

        let pagination = Pagination {
            page: 3,
            per_page: 25,
        };
        assert_eq!(pagination.offset(), 50);
    }

    #[test]
    fn offset_handles_out_of_range_query_values() {
        let pagination = Pagination {
            page: u32::MAX,
            per_page: 1000,
        };
        assert_eq!(
            pagination.offset(),
            (u32::MAX as i64 - 1) * 1000
        );
    }
}
