use salvo::{Router, handler};

#[handler]
async fn hello() -> &'static str {
    "OK"
}

#[must_use]
pub fn routes() -> Router {
    Router::with_path("healthcheck").get(hello)
}

#[cfg(test)]
mod tests {
    use salvo::http::StatusCode;
    use salvo::test::{ResponseExt, TestClient};

    use super::routes;

    #[tokio::test]
    async fn healthcheck_answers_ok() {
        let service = salvo::Router::new().push(routes());

        let mut response = TestClient::get("http://127.0.0.1:5800/healthcheck")
            .send(service)
            .await;

        assert_eq!(response.status_code, Some(StatusCode::OK));
        assert_eq!(response.take_string().await.unwrap(), "OK");
    }
}
