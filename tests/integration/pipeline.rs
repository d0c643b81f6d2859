//! Pipeline runs against a stub case server and local fixtures.

use axum::extract::Query;
use axum::http::StatusCode;
use axum::response::{Html, IntoResponse, Response};
use axum::routing::get;
use axum::Router;
use std::collections::HashMap;

use negtreat::engine::Pipeline;
use negtreat::sources::fixture::FixtureSource;
use negtreat::sources::http::HttpSource;
use negtreat::storage::EmptyPolicy;
use negtreat::types::{ExtractError, Identifier, Outcome};

use crate::stubs::{spawn_server, temp_path, StubModel, OPINION_HTML, ROE};

/// Case 1 exists, case 2 errors, anything else is missing.
async fn scholar_case(Query(q): Query<HashMap<String, String>>) -> Response {
    match q.get("case").map(String::as_str) {
        Some("1") => Html(OPINION_HTML).into_response(),
        Some("2") => (StatusCode::INTERNAL_SERVER_ERROR, "boom").into_response(),
        _ => StatusCode::NOT_FOUND.into_response(),
    }
}

async fn scholar_source() -> HttpSource {
    let base = spawn_server(Router::new().route("/scholar_case", get(scholar_case))).await;
    HttpSource::by_id(format!("{base}/scholar_case?case={{id}}"), Some(10)).unwrap()
}

#[tokio::test]
async fn test_remote_found_writes_exact_response() {
    let model = StubModel::new(&[ROE]);
    let path = temp_path("negtreat_it_results", ".json");
    let pipeline = Pipeline::new(scholar_source().await, model.clone(), &path);

    let outcome = pipeline.run(&Identifier::Id(1)).await.unwrap();

    assert!(matches!(outcome, Outcome::Found { ref records, .. } if records.len() == 1));
    assert_eq!(std::fs::read(&path).unwrap(), ROE.as_bytes());

    let prompts = model.prompts();
    assert_eq!(prompts.len(), 1);
    assert!(prompts[0].contains("Dobbs v. Jackson Women's Health Organization"));
    assert!(prompts[0].contains("We hold that\nRoe\nand\nCasey\nmust be overruled."));
    assert!(!prompts[0].contains("trackPageView"));

    std::fs::remove_file(&path).unwrap();
}

#[tokio::test]
async fn test_non_2xx_never_reaches_model() {
    let model = StubModel::new(&[ROE]);
    let path = temp_path("negtreat_it_results", ".json");
    let pipeline = Pipeline::new(scholar_source().await, model.clone(), &path);

    for (id, expected) in [(2, 500), (404, 404)] {
        let err = pipeline.run(&Identifier::Id(id)).await.unwrap_err();
        match err.downcast_ref::<ExtractError>() {
            Some(ExtractError::Fetch { status, .. }) => assert_eq!(*status, Some(expected)),
            other => panic!("expected Fetch error, got {other:?}"),
        }
    }

    assert_eq!(model.calls(), 0);
    assert!(!path.exists());
}

#[tokio::test]
async fn test_sentinel_leaves_no_file() {
    let model = StubModel::new(&["[]"]);
    let path = temp_path("negtreat_it_results", ".json");
    let pipeline = Pipeline::new(scholar_source().await, model.clone(), &path);

    let outcome = pipeline.run(&Identifier::Id(1)).await.unwrap();

    assert_eq!(outcome, Outcome::Empty);
    assert_eq!(model.calls(), 1);
    assert!(!path.exists());
}

#[tokio::test]
async fn test_second_found_run_overwrites() {
    let second = r#"[{"caseName":"Planned Parenthood v. Casey","jurisdiction":"US","citation":"505 U.S. 833","nature":"overruled","quotedText":"q","explanation":"e"}]"#;
    let model = StubModel::new(&[ROE, second]);
    let path = temp_path("negtreat_it_results", ".json");
    let pipeline = Pipeline::new(scholar_source().await, model, &path);

    pipeline.run(&Identifier::Id(1)).await.unwrap();
    assert_eq!(std::fs::read_to_string(&path).unwrap(), ROE);

    pipeline.run(&Identifier::Id(1)).await.unwrap();
    assert_eq!(std::fs::read_to_string(&path).unwrap(), second);

    std::fs::remove_file(&path).unwrap();
}

#[tokio::test]
async fn test_empty_after_found_with_truncate_policy() {
    let model = StubModel::new(&[ROE, "[]"]);
    let path = temp_path("negtreat_it_results", ".json");
    let pipeline = Pipeline::new(scholar_source().await, model, &path)
        .with_empty_policy(EmptyPolicy::Truncate);

    pipeline.run(&Identifier::Id(1)).await.unwrap();
    assert!(pipeline.run(&Identifier::Id(1)).await.unwrap().is_empty());
    assert_eq!(std::fs::read_to_string(&path).unwrap(), "");

    std::fs::remove_file(&path).unwrap();
}

// ---------------------------------------------------------------------------
// Fixture source
// ---------------------------------------------------------------------------

fn fixture_dir() -> std::path::PathBuf {
    let dir = temp_path("negtreat_it_fixtures", "");
    std::fs::create_dir_all(&dir).unwrap();
    std::fs::write(dir.join("foo.html"), OPINION_HTML).unwrap();
    dir
}

#[tokio::test]
async fn test_fixture_found() {
    let dir = fixture_dir();
    let model = StubModel::new(&[ROE]);
    let path = dir.join("results.json");
    let pipeline = Pipeline::new(FixtureSource::new(&dir, "html"), model.clone(), &path);

    let outcome = pipeline.run(&Identifier::Slug("foo".into())).await.unwrap();

    assert!(!outcome.is_empty());
    assert_eq!(std::fs::read_to_string(&path).unwrap(), ROE);
    assert_eq!(model.calls(), 1);

    std::fs::remove_dir_all(&dir).unwrap();
}

#[tokio::test]
async fn test_fixture_missing_slug_never_reaches_model() {
    let dir = fixture_dir();
    let model = StubModel::new(&[ROE]);
    let path = dir.join("results.json");
    let pipeline = Pipeline::new(FixtureSource::new(&dir, "html"), model.clone(), &path);

    let err = pipeline.run(&Identifier::Slug("bar".into())).await.unwrap_err();

    assert!(matches!(
        err.downcast_ref::<ExtractError>(),
        Some(ExtractError::NotFound { .. })
    ));
    assert_eq!(model.calls(), 0);
    assert!(!path.exists());

    std::fs::remove_dir_all(&dir).unwrap();
}

#[tokio::test]
async fn test_invalid_model_output_is_not_persisted() {
    let dir = fixture_dir();
    let model = StubModel::new(&["```json\n[]\n```"]);
    let path = dir.join("results.json");
    let pipeline = Pipeline::new(FixtureSource::new(&dir, "html"), model, &path);

    let err = pipeline.run(&Identifier::Slug("foo".into())).await.unwrap_err();

    assert!(matches!(
        err.downcast_ref::<ExtractError>(),
        Some(ExtractError::InvalidResponse(_))
    ));
    assert!(!path.exists());

    std::fs::remove_dir_all(&dir).unwrap();
}

#[tokio::test]
async fn test_bundled_sample_fixture() {
    let dir = std::path::Path::new(env!("CARGO_MANIFEST_DIR")).join("test_data");
    let model = StubModel::new(&["[]"]);
    let path = temp_path("negtreat_it_results", ".json");
    let pipeline = Pipeline::new(FixtureSource::new(dir, "html"), model.clone(), &path);

    let outcome = pipeline
        .run(&Identifier::Slug("sample-opinion".into()))
        .await
        .unwrap();

    assert!(outcome.is_empty());
    let prompts = model.prompts();
    let prompt = &prompts[0];
    assert!(prompt.contains("State v. Example, 123 X.3d 456"));
    assert!(prompt.contains("We decline to follow\nSmith\n."));
    assert!(!prompt.contains("font-family"));
}
