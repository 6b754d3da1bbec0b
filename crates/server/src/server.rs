use axum::{
    Router,
    extract::{Request, State},
    http::StatusCode,
    middleware::{self, Next},
    response::Response,
    routing::{get, post},
};
use axum_extra::{
    TypedHeader,
    headers::{Authorization, authorization::Basic},
};
use sea_orm::{ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter};

use std::sync::Arc;

use crate::{dashboard, transactions, user, wallet};
use engine::Engine;

#[derive(Clone)]
pub struct ServerState {
    pub engine: Arc<Engine>,
    pub db: DatabaseConnection,
}

/// Resolves the caller from Basic credentials (email + password) and
/// attaches the matching user row to the request.
async fn auth(
    auth_header: TypedHeader<Authorization<Basic>>,
    State(state): State<ServerState>,
    mut request: Request,
    next: Next,
) -> Result<Response, StatusCode> {
    if auth_header.username().is_empty() || auth_header.password().is_empty() {
        return Err(StatusCode::UNAUTHORIZED);
    }

    let user: Option<user::Model> = user::Entity::find()
        .filter(user::Column::Email.eq(auth_header.username()))
        .filter(user::Column::Password.eq(auth_header.password()))
        .one(&state.db)
        .await
        .map_err(|_| StatusCode::UNAUTHORIZED)?;

    let Some(user) = user else {
        return Err(StatusCode::UNAUTHORIZED);
    };

    request.extensions_mut().insert(user);
    Ok(next.run(request).await)
}

fn router(state: ServerState) -> Router {
    Router::new()
        .route("/transactions", get(transactions::list))
        .route("/transactions/upload", post(transactions::upload))
        .route("/dashboard/summary", get(dashboard::summary))
        .route("/dashboard/series", get(dashboard::series))
        .route("/wallet/{user_id}/balance", get(wallet::balance))
        .route("/wallet/{user_id}/history", get(wallet::history))
        .route("/wallet/{user_id}/add", post(wallet::add))
        .route("/wallet/{user_id}/withdraw", post(wallet::withdraw))
        .route_layer(middleware::from_fn_with_state(state.clone(), auth))
        .with_state(state)
}

pub async fn run(engine: Engine, db: DatabaseConnection) {
    let listener = match tokio::net::TcpListener::bind("127.0.0.1:3000").await {
        Ok(listener) => listener,
        Err(err) => {
            tracing::error!("failed to bind server listener: {err}");
            return;
        }
    };
    if let Err(err) = run_with_listener(engine, db, listener).await {
        tracing::error!("server failed: {err}");
    }
}

pub async fn run_with_listener(
    engine: Engine,
    db: DatabaseConnection,
    listener: tokio::net::TcpListener,
) -> Result<(), std::io::Error> {
    let addr = listener.local_addr()?;
    tracing::info!("Server listening on {}", addr);

    let state = ServerState {
        engine: Arc::new(engine),
        db,
    };

    axum::serve(listener, router(state)).await
}

pub fn spawn_with_listener(
    engine: Engine,
    db: DatabaseConnection,
    listener: tokio::net::TcpListener,
) -> Result<std::net::SocketAddr, std::io::Error> {
    let addr = listener.local_addr()?;

    tokio::spawn(async move {
        if let Err(err) = run_with_listener(engine, db, listener).await {
            tracing::error!("server failed: {err}");
        }
    });

    Ok(addr)
}

#[cfg(test)]
mod tests {
    use axum::body::Body;
    use axum::http::{Request, StatusCode, header};
    use base64::Engine as _;
    use http_body_util::BodyExt;
    use migration::MigratorTrait;
    use sea_orm::Database;
    use tower::ServiceExt;

    use super::*;

    const EMAIL: &str = "alice@example.com";
    const PASSWORD: &str = "password";

    async fn state_with_user() -> (ServerState, String) {
        let db = Database::connect("sqlite::memory:").await.unwrap();
        migration::Migrator::up(&db, None).await.unwrap();
        let engine = Engine::builder()
            .database(db.clone())
            .build()
            .await
            .unwrap();
        let user = engine.create_user("Alice", EMAIL, PASSWORD).await.unwrap();
        (
            ServerState {
                engine: Arc::new(engine),
                db,
            },
            user.id,
        )
    }

    fn basic_auth() -> String {
        let encoded =
            base64::engine::general_purpose::STANDARD.encode(format!("{EMAIL}:{PASSWORD}"));
        format!("Basic {encoded}")
    }

    fn get(uri: &str) -> Request<Body> {
        Request::builder()
            .uri(uri)
            .header(header::AUTHORIZATION, basic_auth())
            .body(Body::empty())
            .unwrap()
    }

    fn post_json(uri: &str, body: &serde_json::Value) -> Request<Body> {
        Request::builder()
            .method("POST")
            .uri(uri)
            .header(header::AUTHORIZATION, basic_auth())
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(body.to_string()))
            .unwrap()
    }

    async fn json_body(response: axum::response::Response) -> serde_json::Value {
        let bytes = response.into_body().collect().await.unwrap().to_bytes();
        serde_json::from_slice(&bytes).unwrap()
    }

    #[tokio::test]
    async fn requests_without_credentials_are_rejected() {
        let (state, _) = state_with_user().await;
        let response = router(state)
            .oneshot(
                Request::builder()
                    .uri("/transactions")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        assert!(response.status().is_client_error());
    }

    #[tokio::test]
    async fn wrong_password_is_unauthorized() {
        let (state, _) = state_with_user().await;
        let encoded =
            base64::engine::general_purpose::STANDARD.encode(format!("{EMAIL}:wrong"));
        let response = router(state)
            .oneshot(
                Request::builder()
                    .uri("/transactions")
                    .header(header::AUTHORIZATION, format!("Basic {encoded}"))
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    }

    #[tokio::test]
    async fn upload_then_list_round_trips() {
        let (state, _) = state_with_user().await;
        let app = router(state);

        let payload = serde_json::json!([
            {"amount": 100.0, "category": "salary", "date": "2024-03-01T00:00:00Z"},
            {"amount": 40.0, "category": "rent", "date": "2024-03-02"},
            {"amount": 15.0, "category": "food", "date": "bogus"},
        ]);
        let response = app
            .clone()
            .oneshot(post_json("/transactions/upload", &payload))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::CREATED);
        let body = json_body(response).await;
        assert_eq!(body["inserted"], 2);
        assert_eq!(body["skipped"], serde_json::json!([2]));

        let response = app
            .oneshot(get("/transactions?sortBy=amount&sortDir=desc"))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        let body = json_body(response).await;
        assert_eq!(body["total"], 2);
        assert_eq!(body["page"], 1);
        assert_eq!(body["pageSize"], 10);
        assert_eq!(body["transactions"][0]["amount"], 100.0);
        assert_eq!(body["transactions"][1]["type"], serde_json::Value::Null);
    }

    #[tokio::test]
    async fn malformed_date_bound_is_a_precise_400() {
        let (state, _) = state_with_user().await;
        let response = router(state)
            .oneshot(get("/transactions?dateFrom=yesterday"))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        let body = json_body(response).await;
        assert!(body["error"].as_str().unwrap().contains("dateFrom"));
    }

    #[tokio::test]
    async fn summary_reports_the_classified_totals() {
        let (state, _) = state_with_user().await;
        let app = router(state);

        let payload = serde_json::json!([
            {"amount": 100.0, "category": "salary", "date": "2024-03-01"},
            {"amount": 40.0, "category": "rent", "date": "2024-03-02"},
            {"amount": 15.0, "category": "food", "date": "2024-03-03"},
        ]);
        app.clone()
            .oneshot(post_json("/transactions/upload", &payload))
            .await
            .unwrap();

        let response = app.oneshot(get("/dashboard/summary")).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        let body = json_body(response).await;
        assert_eq!(body["revenue"], 100.0);
        assert_eq!(body["expenses"], 55.0);
        assert_eq!(body["savings"], 45.0);
        assert_eq!(body["balance"], 45.0);
        assert_eq!(body["transactionCount"], 3);
    }

    #[tokio::test]
    async fn series_is_labeled_and_ascending() {
        let (state, _) = state_with_user().await;
        let app = router(state);

        let payload = serde_json::json!([
            {"amount": 30.0, "category": "salary", "date": "2024-03-05"},
            {"amount": 50.0, "category": "salary", "date": "2023-12-01"},
            {"amount": 5.0, "category": "rent", "date": "2024-03-07"},
        ]);
        app.clone()
            .oneshot(post_json("/transactions/upload", &payload))
            .await
            .unwrap();

        let response = app.oneshot(get("/dashboard/series")).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        let body = json_body(response).await;
        assert_eq!(body[0]["month"], "Dec 2023");
        assert_eq!(body[1]["month"], "Mar 2024");
        assert_eq!(body[1]["revenue"], 30.0);
        assert_eq!(body[1]["expenses"], 5.0);
    }

    #[tokio::test]
    async fn wallet_flow_credits_debits_and_rejects_overdraft() {
        let (state, user_id) = state_with_user().await;
        let app = router(state);

        let response = app
            .clone()
            .oneshot(post_json(
                &format!("/wallet/{user_id}/add"),
                &serde_json::json!({"amount": 50.0}),
            ))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        let body = json_body(response).await;
        assert_eq!(body["walletBalance"], 50.0);

        let response = app
            .clone()
            .oneshot(post_json(
                &format!("/wallet/{user_id}/withdraw"),
                &serde_json::json!({"amount": 70.0}),
            ))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);

        let response = app
            .clone()
            .oneshot(get(&format!("/wallet/{user_id}/balance")))
            .await
            .unwrap();
        let body = json_body(response).await;
        assert_eq!(body["walletBalance"], 50.0);

        let response = app
            .oneshot(get(&format!("/wallet/{user_id}/history")))
            .await
            .unwrap();
        let body = json_body(response).await;
        assert_eq!(body["transactions"].as_array().unwrap().len(), 1);
        assert_eq!(body["transactions"][0]["category"], "wallet_add");
    }

    #[tokio::test]
    async fn wallet_routes_reject_foreign_wallets() {
        let (state, _) = state_with_user().await;
        let other = state
            .engine
            .create_user("Bob", "bob@example.com", "password")
            .await
            .unwrap();

        let response = router(state)
            .oneshot(get(&format!("/wallet/{}/balance", other.id)))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::FORBIDDEN);
    }
}
