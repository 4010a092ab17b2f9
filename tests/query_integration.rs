use crate::test_utils::shared::{
    setup_client, setup_master_client, CREATED_AT, H_MASTER_KEY, H_REST_KEY, MASTER_KEY,
};
use httpmock::prelude::*;
use parse_rest::{
    ParseClass, ParseError, ParseGeoPoint, ParseQuery, ParseRecord, Pointer, RetrievedParseObject,
};
use serde::{Deserialize, Serialize};
use serde_json::json;
use std::collections::HashMap;


#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
struct GameScore {
    score: i64,
    #[serde(rename = "playerName")]
    player_name: String,
}

impl ParseClass for GameScore {
    const CLASS_NAME: &'static str = "GameScore";
}

fn score_json(id: &str, score: i64, player: &str) -> serde_json::Value {
    json!({"objectId": id, "createdAt": CREATED_AT, "score": score, "playerName": player})
}

#[tokio::test]
async fn test_find_sends_where_and_paging() {
    let server = MockServer::start_async().await;
    let client = setup_client(&server);

    let mock = server
        .mock_async(|when, then| {
            when.method(GET)
                .path("/parse/classes/GameScore")
                .query_param("where", r#"{"score":{"$gte":1000,"$lte":3000}}"#)
                .query_param("limit", "2")
                .query_param("skip", "4")
                .query_param("order", "-score,playerName")
                .header(H_REST_KEY, "test-rest-key");
            then.status(200).json_body(json!({"results": [
                score_json("a", 2000, "Alice"),
                score_json("b", 1500, "Bob")
            ]}));
        })
        .await;

    let mut query = ParseQuery::for_class::<GameScore>();
    query
        .greater_than_or_equal_to("score", 1000)
        .less_than_or_equal_to("score", 3000)
        .limit(2)
        .skip(4)
        .order_by_descending("score")
        .add_ascending_order("playerName");
    let results: Vec<ParseRecord<GameScore>> = query.find(&client).await.unwrap();

    mock.assert_async().await;
    assert_eq!(results.len(), 2);
    assert_eq!(results[0].object_id, "a");
    assert_eq!(results[1].player_name, "Bob");
}

#[tokio::test]
async fn test_first_limits_to_one_result() {
    let server = MockServer::start_async().await;
    let client = setup_client(&server);

    let mock = server
        .mock_async(|when, then| {
            when.method(GET)
                .path("/parse/classes/GameScore")
                .query_param("where", r#"{"playerName":"Sean Plott"}"#)
                .query_param("limit", "1");
            then.status(200)
                .json_body(json!({"results": [score_json("a", 1337, "Sean Plott")]}));
        })
        .await;
    let empty_mock = server
        .mock_async(|when, then| {
            when.method(GET)
                .path("/parse/classes/GameScore")
                .query_param("where", r#"{"playerName":"Nobody"}"#);
            then.status(200).json_body(json!({"results": []}));
        })
        .await;

    let mut query = ParseQuery::new("GameScore");
    query.equal_to("playerName", "Sean Plott").limit(50);
    let first: Option<ParseRecord<GameScore>> = query.first(&client).await.unwrap();
    assert_eq!(first.unwrap().score, 1337);

    let mut query = ParseQuery::new("GameScore");
    query.equal_to("playerName", "Nobody");
    let none: Option<RetrievedParseObject> = query.first(&client).await.unwrap();
    assert!(none.is_none());

    mock.assert_async().await;
    empty_mock.assert_async().await;
}

#[tokio::test]
async fn test_count_uses_limit_zero() {
    let server = MockServer::start_async().await;
    let client = setup_client(&server);

    let mock = server
        .mock_async(|when, then| {
            when.method(GET)
                .path("/parse/classes/GameScore")
                .query_param("where", r#"{"wins":{"$gt":150}}"#)
                .query_param("limit", "0")
                .query_param("count", "1");
            then.status(200).json_body(json!({"results": [], "count": 42}));
        })
        .await;

    let mut query = ParseQuery::new("GameScore");
    query.greater_than("wins", 150).skip(10);
    assert_eq!(query.count(&client).await.unwrap(), 42);
    mock.assert_async().await;
}

#[tokio::test]
async fn test_get_fetches_by_id_with_include() {
    let server = MockServer::start_async().await;
    let client = setup_client(&server);

    let mock = server
        .mock_async(|when, then| {
            when.method(GET)
                .path("/parse/classes/Comment/c1")
                .query_param("include", "post");
            then.status(200).json_body(json!({
                "objectId": "c1",
                "createdAt": CREATED_AT,
                "post": {"__type": "Object", "className": "Post", "objectId": "p1", "title": "Hi"}
            }));
        })
        .await;

    let mut query = ParseQuery::new("Comment");
    query.equal_to("ignored", true).include(&["post"]);
    let comment: RetrievedParseObject = query.get("c1", &client).await.unwrap();
    mock.assert_async().await;
    assert_eq!(comment.data["post"]["title"], "Hi");
}

#[tokio::test]
async fn test_relational_and_geo_constraints_on_the_wire() {
    let server = MockServer::start_async().await;
    let client = setup_client(&server);

    let expected_where = json!({
        "$relatedTo": {
            "object": {"__type": "Pointer", "className": "Post", "objectId": "p1"},
            "key": "likes"
        },
        "location": {"$within": {"$box": [
            {"__type": "GeoPoint", "latitude": 37.71, "longitude": -122.53},
            {"__type": "GeoPoint", "latitude": 37.82, "longitude": -122.37}
        ]}}
    });
    let mock = server
        .mock_async(|when, then| {
            when.method(GET)
                .path("/parse/users")
                .query_param("where", expected_where.to_string());
            then.status(200).json_body(json!({"results": []}));
        })
        .await;

    let mut query = ParseQuery::new("_User");
    query.related_to(&Pointer::new("Post", "p1"), "likes").within_geo_box(
        "location",
        ParseGeoPoint::new(37.71, -122.53).unwrap(),
        ParseGeoPoint::new(37.82, -122.37).unwrap(),
    );
    let users: Vec<RetrievedParseObject> = query.find(&client).await.unwrap();
    assert!(users.is_empty());
    mock.assert_async().await;
}

#[tokio::test]
async fn test_or_query() {
    let server = MockServer::start_async().await;
    let client = setup_client(&server);

    let mock = server
        .mock_async(|when, then| {
            when.method(GET)
                .path("/parse/classes/Player")
                .query_param("where", r#"{"$or":[{"wins":{"$lt":5}},{"wins":{"$gt":150}}]}"#);
            then.status(200).json_body(json!({"results": []}));
        })
        .await;

    let mut low = ParseQuery::new("Player");
    low.less_than("wins", 5);
    let mut high = ParseQuery::new("Player");
    high.greater_than("wins", 150);
    let combined = ParseQuery::or(&[low, high]).unwrap();
    let players: Vec<RetrievedParseObject> = combined.find(&client).await.unwrap();
    assert!(players.is_empty());
    mock.assert_async().await;
}

#[tokio::test]
async fn test_master_key_query() {
    let server = MockServer::start_async().await;

    let mock = server
        .mock_async(|when, then| {
            when.method(GET)
                .path("/parse/classes/Secret")
                .header(H_MASTER_KEY, MASTER_KEY);
            then.status(200).json_body(json!({"results": []}));
        })
        .await;

    let mut query = ParseQuery::new("Secret");
    query.set_master_key(true);

    let without_master = setup_client(&server);
    assert!(matches!(
        query.find::<RetrievedParseObject>(&without_master).await,
        Err(ParseError::MasterKeyRequired(_))
    ));

    let client = setup_master_client(&server);
    let results: Vec<RetrievedParseObject> = query.find(&client).await.unwrap();
    assert!(results.is_empty());
    mock.assert_async().await;
}

#[tokio::test]
async fn test_invalid_query_is_reported_before_sending() {
    let server = MockServer::start_async().await;
    let client = setup_client(&server);

    let catch_all = server
        .mock_async(|when, then| {
            when.path_contains("/parse/");
            then.status(200).json_body(json!({"results": []}));
        })
        .await;

    let mut unserializable = HashMap::new();
    unserializable.insert((1, 2), "pair keys are not JSON object keys");
    let mut query = ParseQuery::new("GameScore");
    query.equal_to("tuple", unserializable);
    assert!(matches!(
        query.find::<RetrievedParseObject>(&client).await,
        Err(ParseError::InvalidQuery(_))
    ));

    let bad_class = ParseQuery::new("not a class");
    assert!(matches!(
        bad_class.count(&client).await,
        Err(ParseError::InvalidInput(_))
    ));

    catch_all.assert_hits_async(0).await;
}

#[tokio::test]
async fn test_server_rejection_of_query() {
    let server = MockServer::start_async().await;
    let client = setup_client(&server);

    server
        .mock_async(|when, then| {
            when.method(GET).path("/parse/classes/GameScore");
            then.status(400)
                .json_body(json!({"code": 102, "error": "Invalid regular expression"}));
        })
        .await;

    let mut query = ParseQuery::new("GameScore");
    query.matches_regex("playerName", "([", None);
    let err = query
        .find::<RetrievedParseObject>(&client)
        .await
        .unwrap_err();
    assert_eq!(err.code(), Some(parse_rest::ErrorCode::InvalidQuery));
    assert_eq!(err.status(), Some(400));
}
