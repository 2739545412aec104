//! Request handler module
//!
//! Responsible for request routing dispatch and the three route handlers.
//! Handlers keep no state of their own; the data handler reads through the
//! injected record store on every request.

pub mod data;
pub mod echo;
pub mod router;
pub mod time;

// Re-export main entry point
pub use router::{handle_request, RequestContext};

#[cfg(test)]
pub(crate) mod test_support {
    use crate::config::{AppState, Config};
    use crate::http::ResponseBody;
    use crate::store::{RecordStore, StoreError, UserRecord};
    use async_trait::async_trait;
    use http_body_util::BodyExt;
    use hyper::Response;
    use std::sync::Arc;

    pub fn state_with(store: Arc<dyn RecordStore>) -> Arc<AppState> {
        let mut config = Config::from_defaults().unwrap();
        config.logging.access_log = false;
        Arc::new(AppState::new(&config, store))
    }

    pub async fn body_string(resp: Response<ResponseBody>) -> String {
        let bytes = resp.into_body().collect().await.unwrap().to_bytes();
        String::from_utf8(bytes.to_vec()).unwrap()
    }

    /// Store whose backing engine is never reachable
    pub struct UnreachableStore;

    fn refused() -> StoreError {
        StoreError::Unavailable("connection refused".to_string())
    }

    #[async_trait]
    impl RecordStore for UnreachableStore {
        async fn create_schema(&self) -> Result<(), StoreError> {
            Err(refused())
        }

        async fn drop_schema(&self) -> Result<(), StoreError> {
            Err(refused())
        }

        async fn insert(&self, _first_name: &str, _last_name: &str) -> Result<i64, StoreError> {
            Err(refused())
        }

        async fn count(&self) -> Result<u64, StoreError> {
            Err(refused())
        }

        async fn find_by_last_name(&self, _last_name: &str) -> Result<Vec<UserRecord>, StoreError> {
            Err(refused())
        }

        async fn first(&self) -> Result<Option<UserRecord>, StoreError> {
            Err(refused())
        }
    }
}
