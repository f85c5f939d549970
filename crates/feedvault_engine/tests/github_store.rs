use base64::{engine::general_purpose::STANDARD as BASE64, Engine as _};
use pretty_assertions::assert_eq;
use serde_json::json;
use wiremock::matchers::{body_partial_json, header, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

use feedvault_engine::{FileStore, FileStoreError, GithubFileStore, Revision, StoreConfig};

fn config() -> StoreConfig {
    StoreConfig {
        token: "test-token".into(),
        owner: "someone".into(),
        repo: "feeds".into(),
        file_path: "feed.json".into(),
        branch: "main".into(),
    }
}

fn store_for(server: &MockServer) -> GithubFileStore {
    GithubFileStore::with_api_base(config(), server.uri()).unwrap()
}

#[tokio::test]
async fn fetch_decodes_content_and_returns_revision() {
    let server = MockServer::start().await;
    let text = r#"{"UC_x5XG1OV2P6uZZ5FSM9Ttw":{"name":"x","discordChannel":"0"}}"#;
    // The API wraps base64 payloads in newlines; make sure those survive.
    let mut encoded = BASE64.encode(text);
    encoded.insert(10, '\n');

    Mock::given(method("GET"))
        .and(path("/repos/someone/feeds/contents/feed.json"))
        .and(query_param("ref", "main"))
        .and(header("Authorization", "token test-token"))
        .and(header("Accept", "application/vnd.github.v3+json"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "content": encoded,
            "sha": "abc123",
        })))
        .mount(&server)
        .await;

    let file = store_for(&server).fetch().await.unwrap();
    assert_eq!(file.content, text);
    assert_eq!(file.revision, Some(Revision::new("abc123")));
}

#[tokio::test]
async fn fetch_treats_missing_file_as_empty_initial_state() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/repos/someone/feeds/contents/feed.json"))
        .respond_with(ResponseTemplate::new(404).set_body_json(json!({"message": "Not Found"})))
        .mount(&server)
        .await;

    let file = store_for(&server).fetch().await.unwrap();
    assert_eq!(file.content, "{}");
    assert_eq!(file.revision, None);
}

#[tokio::test]
async fn fetch_propagates_server_errors_instead_of_faking_emptiness() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/repos/someone/feeds/contents/feed.json"))
        .respond_with(ResponseTemplate::new(500).set_body_json(json!({"message": "boom"})))
        .mount(&server)
        .await;

    let err = store_for(&server).fetch().await.unwrap_err();
    assert_eq!(
        err,
        FileStoreError::Api {
            status: 500,
            message: "boom".into()
        }
    );
}

#[tokio::test]
async fn put_sends_expected_revision_and_returns_the_new_one() {
    let server = MockServer::start().await;
    Mock::given(method("PUT"))
        .and(path("/repos/someone/feeds/contents/feed.json"))
        .and(body_partial_json(json!({
            "message": "Add feed for channel UC_x5XG1OV2P6uZZ5FSM9Ttw",
            "branch": "main",
            "sha": "oldsha",
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "content": {"sha": "newsha"},
            "commit": {"sha": "commitsha"},
        })))
        .mount(&server)
        .await;

    let revision = store_for(&server)
        .put(
            "{}",
            "Add feed for channel UC_x5XG1OV2P6uZZ5FSM9Ttw",
            Some(&Revision::new("oldsha")),
        )
        .await
        .unwrap();
    assert_eq!(revision, Revision::new("newsha"));
}

#[tokio::test]
async fn put_omits_sha_when_creating_the_file() {
    let server = MockServer::start().await;
    Mock::given(method("PUT"))
        .and(path("/repos/someone/feeds/contents/feed.json"))
        .respond_with(ResponseTemplate::new(201).set_body_json(json!({
            "content": {"sha": "first"},
        })))
        .mount(&server)
        .await;

    let store = store_for(&server);
    store.put("{}", "Create feed store", None).await.unwrap();

    let requests = server.received_requests().await.unwrap();
    let body: serde_json::Value = serde_json::from_slice(&requests[0].body).unwrap();
    assert!(body.get("sha").is_none(), "create must not send a sha");
    assert_eq!(body["content"], json!(BASE64.encode("{}")));
}

#[tokio::test]
async fn put_with_stale_revision_is_a_conflict() {
    let server = MockServer::start().await;
    Mock::given(method("PUT"))
        .and(path("/repos/someone/feeds/contents/feed.json"))
        .respond_with(ResponseTemplate::new(409).set_body_json(json!({
            "message": "feed.json does not match oldsha",
        })))
        .mount(&server)
        .await;

    let err = store_for(&server)
        .put("{}", "Update", Some(&Revision::new("oldsha")))
        .await
        .unwrap_err();
    assert_eq!(
        err,
        FileStoreError::Conflict("feed.json does not match oldsha".into())
    );
}

#[tokio::test]
async fn put_with_sha_mismatch_422_is_a_conflict() {
    let server = MockServer::start().await;
    Mock::given(method("PUT"))
        .and(path("/repos/someone/feeds/contents/feed.json"))
        .respond_with(ResponseTemplate::new(422).set_body_json(json!({
            "message": "feed.json does not match oldsha",
        })))
        .mount(&server)
        .await;

    let err = store_for(&server)
        .put("{}", "Update", Some(&Revision::new("oldsha")))
        .await
        .unwrap_err();
    assert!(matches!(err, FileStoreError::Conflict(_)), "got {err:?}");
}

#[tokio::test]
async fn put_with_a_validation_422_is_not_a_conflict() {
    let server = MockServer::start().await;
    Mock::given(method("PUT"))
        .and(path("/repos/someone/feeds/contents/feed.json"))
        .respond_with(ResponseTemplate::new(422).set_body_json(json!({
            "message": "Branch nope not found",
        })))
        .mount(&server)
        .await;

    let err = store_for(&server)
        .put("{}", "Update", Some(&Revision::new("oldsha")))
        .await
        .unwrap_err();
    assert_eq!(
        err,
        FileStoreError::Api {
            status: 422,
            message: "Branch nope not found".into()
        }
    );
}

#[tokio::test]
async fn network_failure_is_reported_as_such() {
    // Point at a server that is no longer listening. A dropped `MockServer`
    // goes back into wiremock's pool and keeps listening, so grab a free
    // port from the OS and release it instead.
    let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
    let uri = format!("http://{}", listener.local_addr().unwrap());
    drop(listener);

    let store = GithubFileStore::with_api_base(config(), uri).unwrap();
    let err = store.fetch().await.unwrap_err();
    assert!(matches!(err, FileStoreError::Network(_)), "got {err:?}");
}
