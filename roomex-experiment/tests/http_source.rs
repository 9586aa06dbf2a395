use axum::extract::Query;
use axum::http::StatusCode;
use axum::routing::get;
use axum::{Json, Router};
use roomex_core::TrialId;
use roomex_experiment::{HttpTrialSource, SequencerError, TrialSource};
use serde_json::{Value, json};
use std::collections::HashMap;

async fn serve(app: Router) -> String {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });
    format!("http://{addr}")
}

async fn trials(Query(params): Query<HashMap<String, String>>) -> Json<Value> {
    let trial_type = params.get("trial_type").cloned().unwrap_or_default();
    Json(json!({
        "trials": [
            { "id": 11, "done": true, "duration": 4000, "width": 8, "height": 3, "depth": 5, "tag": trial_type },
            { "id": 12, "done": false, "duration": 4000, "width": 6, "height": 3, "depth": 4 }
        ],
        "last_trial_index": 1
    }))
}

#[tokio::test]
async fn fetches_and_decodes_a_session() {
    let base = serve(Router::new().route("/api/make_or_get_trial", get(trials))).await;
    let source = HttpTrialSource::new(&base, "/api/make_or_get_trial");

    let session = source.fetch_session("T").await.unwrap();
    assert_eq!(session.trials.len(), 2);
    assert_eq!(session.last_trial_index, 1);
    assert_eq!(session.trials[0].id, TrialId::Number(11));
    assert_eq!(session.trials[0].params["tag"], json!("T"));
    assert_eq!(session.trials[1].params["width"], json!(6));
}

#[tokio::test]
async fn non_success_status_is_fetch_failed() {
    let app = Router::new().route(
        "/api/make_or_get_trial",
        get(|| async { (StatusCode::SERVICE_UNAVAILABLE, "busy") }),
    );
    let base = serve(app).await;
    let source = HttpTrialSource::new(&base, "/api/make_or_get_trial");

    let err = source.fetch_session("T").await.unwrap_err();
    assert!(matches!(err, SequencerError::FetchFailed(msg) if msg.contains("503")));
}

#[tokio::test]
async fn missing_trials_field_is_malformed() {
    let app = Router::new().route(
        "/api/make_or_get_trial",
        get(|| async { Json(json!({ "last_trial_index": 0 })) }),
    );
    let base = serve(app).await;
    let source = HttpTrialSource::new(&base, "/api/make_or_get_trial");

    let err = source.fetch_session("T").await.unwrap_err();
    assert!(matches!(err, SequencerError::MalformedPayload(_)));
}

#[tokio::test]
async fn unreachable_server_is_fetch_failed() {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);

    let source = HttpTrialSource::new(&format!("http://{addr}"), "/api/make_or_get_trial");
    let err = source.fetch_session("T").await.unwrap_err();
    assert!(matches!(err, SequencerError::FetchFailed(_)));
}
