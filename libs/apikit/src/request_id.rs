//! Request id visible to code running inside a request's future.

use std::future::Future;

tokio::task_local! {
    static REQUEST_ID: String;
}

/// Run `fut` with `id` as the current request id.
pub async fn scope<F: Future>(id: String, fut: F) -> F::Output {
    REQUEST_ID.scope(id, fut).await
}

pub fn current() -> Option<String> {
    REQUEST_ID.try_with(Clone::clone).ok()
}
