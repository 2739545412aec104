//! Data handler: renders the first stored user record

use hyper::{Method, Response, StatusCode};

use super::RequestContext;
use crate::http::{build_405_response, build_500_response, build_html_response, ResponseBody};
use crate::logger;
use crate::store::{RecordStore, UserRecord};

const ALLOWED_METHODS: &str = "GET, HEAD";

pub fn render_record(record: &UserRecord) -> String {
    format!(
        "<h3 align=\"center\">{}, {}, {}</h3>\n",
        record.id, record.first_name, record.last_name
    )
}

/// 200 with the record, 200 with an empty body when the table is empty,
/// 500 when the store cannot be read
pub async fn serve(ctx: &RequestContext<'_>, store: &dyn RecordStore) -> Response<ResponseBody> {
    if !matches!(*ctx.method, Method::GET | Method::HEAD) {
        logger::log_warning(&format!("Method not allowed on {}: {}", ctx.path, ctx.method));
        return build_405_response(ALLOWED_METHODS);
    }

    match store.first().await {
        Ok(Some(record)) => build_html_response(StatusCode::OK, render_record(&record), ctx.is_head),
        Ok(None) => build_html_response(StatusCode::OK, String::new(), ctx.is_head),
        Err(e) => {
            logger::log_store_error("first", &e);
            build_500_response()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::handler::test_support::{body_string, UnreachableStore};
    use crate::store::{MemoryStore, SqliteStore};

    #[tokio::test]
    async fn test_single_record() {
        let dir = tempfile::tempdir().unwrap();
        let store = SqliteStore::new(dir.path().join("users.db"));
        store.create_schema().await.unwrap();
        store.insert("John", "Doe").await.unwrap();

        let resp = serve(&RequestContext::new(&Method::GET, "/getdata"), &store).await;
        assert_eq!(resp.status(), StatusCode::OK);
        assert_eq!(
            body_string(resp).await,
            "<h3 align=\"center\">1, John, Doe</h3>\n"
        );
        store.drop_schema().await.unwrap();
    }

    #[tokio::test]
    async fn test_first_of_many() {
        let store = MemoryStore::new();
        store.create_schema().await.unwrap();
        store.insert("John", "Doe").await.unwrap();
        store.insert("Mihalis", "Tsoukalos").await.unwrap();

        let resp = serve(&RequestContext::new(&Method::GET, "/getdata"), &store).await;
        assert_eq!(
            body_string(resp).await,
            "<h3 align=\"center\">1, John, Doe</h3>\n"
        );
    }

    #[tokio::test]
    async fn test_empty_table_is_empty_ok() {
        let store = MemoryStore::new();
        store.create_schema().await.unwrap();

        let resp = serve(&RequestContext::new(&Method::GET, "/getdata"), &store).await;
        assert_eq!(resp.status(), StatusCode::OK);
        assert_eq!(body_string(resp).await, "");
    }

    #[tokio::test]
    async fn test_unavailable_store_is_500() {
        let resp = serve(&RequestContext::new(&Method::GET, "/getdata"), &UnreachableStore).await;
        assert_eq!(resp.status(), StatusCode::INTERNAL_SERVER_ERROR);
    }

    #[tokio::test]
    async fn test_missing_table_is_500() {
        let resp = serve(&RequestContext::new(&Method::GET, "/getdata"), &MemoryStore::new()).await;
        assert_eq!(resp.status(), StatusCode::INTERNAL_SERVER_ERROR);
    }

    #[tokio::test]
    async fn test_post_is_rejected() {
        let store = MemoryStore::new();
        let resp = serve(&RequestContext::new(&Method::POST, "/getdata"), &store).await;
        assert_eq!(resp.status(), StatusCode::METHOD_NOT_ALLOWED);
        assert_eq!(resp.headers()["allow"], ALLOWED_METHODS);
    }

    #[test]
    fn test_render_record() {
        let record = UserRecord {
            id: 42,
            first_name: "Random Text".to_string(),
            last_name: "123456".to_string(),
        };
        assert_eq!(
            render_record(&record),
            "<h3 align=\"center\">42, Random Text, 123456</h3>\n"
        );
    }
}
