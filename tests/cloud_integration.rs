use crate::test_utils::shared::{
    setup_client, setup_master_client, H_MASTER_KEY, H_SESSION, MASTER_KEY,
};
use httpmock::prelude::*;
use parse_rest::{ErrorCode, ParseError};
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};


#[derive(Serialize)]
struct AverageParams<'a> {
    movie: &'a str,
}

#[derive(Deserialize, Debug, PartialEq)]
struct Average {
    stars: f64,
    reviews: u32,
}

#[tokio::test]
async fn test_run_unwraps_result() {
    let server = MockServer::start_async().await;
    let client = setup_client(&server);

    let mock = server
        .mock_async(|when, then| {
            when.method(POST)
                .path("/parse/functions/averageStars")
                .json_body(json!({"movie": "The Matrix"}));
            then.status(200)
                .json_body(json!({"result": {"stars": 4.5, "reviews": 12}}));
        })
        .await;

    let average: Average = client
        .cloud()
        .run("averageStars", &AverageParams { movie: "The Matrix" })
        .await
        .unwrap();
    mock.assert_async().await;
    assert_eq!(average, Average { stars: 4.5, reviews: 12 });
}

#[tokio::test]
async fn test_run_sends_session_of_logged_in_user() {
    let server = MockServer::start_async().await;
    let mut client = setup_client(&server);
    client.set_session_token(Some("r:abc".to_string()));

    let mock = server
        .mock_async(|when, then| {
            when.method(POST)
                .path("/parse/functions/hello")
                .header(H_SESSION, "r:abc");
            then.status(200).json_body(json!({"result": "Hello world!"}));
        })
        .await;

    let greeting: String = client.cloud().run("hello", &json!({})).await.unwrap();
    mock.assert_async().await;
    assert_eq!(greeting, "Hello world!");
}

#[tokio::test]
async fn test_cloud_code_failure() {
    let server = MockServer::start_async().await;
    let client = setup_client(&server);

    server
        .mock_async(|when, then| {
            when.method(POST).path("/parse/functions/explode");
            then.status(400)
                .json_body(json!({"code": 141, "error": "movie lookup failed"}));
        })
        .await;

    let err = client
        .cloud()
        .run::<_, Value>("explode", &json!({}))
        .await
        .unwrap_err();
    assert_eq!(err.code(), Some(ErrorCode::ScriptFailed));
    assert!(err.to_string().contains("movie lookup failed"));

    assert!(matches!(
        client.cloud().run::<_, Value>(" ", &json!({})).await,
        Err(ParseError::InvalidInput(_))
    ));
}

#[tokio::test]
async fn test_trigger_job_requires_master_key() {
    let server = MockServer::start_async().await;

    let mock = server
        .mock_async(|when, then| {
            when.method(POST)
                .path("/parse/jobs/cleanup")
                .header(H_MASTER_KEY, MASTER_KEY)
                .json_body(json!({"olderThanDays": 30}));
            then.status(200).json_body(json!({}));
        })
        .await;

    let client = setup_client(&server);
    assert!(matches!(
        client
            .cloud()
            .trigger_job("cleanup", &json!({"olderThanDays": 30}))
            .await,
        Err(ParseError::MasterKeyRequired(_))
    ));

    let client = setup_master_client(&server);
    client
        .cloud()
        .trigger_job("cleanup", &json!({"olderThanDays": 30}))
        .await
        .unwrap();
    mock.assert_async().await;
}
