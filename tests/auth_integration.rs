use crate::test_utils::shared::{setup_client, CREATED_AT, H_SESSION, UPDATED_AT};
use httpmock::prelude::*;
use parse_rest::ParseError;
use serde_json::json;


const TOKEN: &str = "r:pnktnjyb996sj4p156gjtp4im";

fn me_body() -> serde_json::Value {
    json!({
        "objectId": "g7y9tkhB7O",
        "username": "cooldude6",
        "email": "cool@example.com",
        "phone": "415-392-0202",
        "createdAt": CREATED_AT,
        "updatedAt": CREATED_AT
    })
}

#[tokio::test]
async fn test_signup_stores_session_token() {
    let server = MockServer::start_async().await;
    let mut client = setup_client(&server);

    let mock = server
        .mock_async(|when, then| {
            when.method(POST).path("/parse/users").json_body(json!({
                "username": "cooldude6",
                "password": "p_n7!-e8",
                "email": "cool@example.com",
                "phone": "415-392-0202"
            }));
            then.status(201).json_body(json!({
                "objectId": "g7y9tkhB7O",
                "createdAt": CREATED_AT,
                "sessionToken": TOKEN
            }));
        })
        .await;

    let user = client
        .user()
        .signup_with_fields(
            "cooldude6",
            "p_n7!-e8",
            Some("cool@example.com"),
            &json!({"phone": "415-392-0202"}),
        )
        .await
        .unwrap();
    mock.assert_async().await;

    assert_eq!(user.object_id.as_deref(), Some("g7y9tkhB7O"));
    assert_eq!(user.username, "cooldude6");
    assert_eq!(user.other_fields.get("phone"), Some(&json!("415-392-0202")));
    assert!(!user.other_fields.contains_key("password"));
    assert_eq!(client.session_token(), Some(TOKEN));
    assert!(client.is_authenticated());
}

#[tokio::test]
async fn test_signup_rejects_empty_credentials() {
    let server = MockServer::start_async().await;
    let mut client = setup_client(&server);

    assert!(matches!(
        client.user().signup("", "secret", None).await,
        Err(ParseError::InvalidInput(_))
    ));
    assert!(matches!(
        client.user().signup("someone", " ", None).await,
        Err(ParseError::InvalidInput(_))
    ));
    assert!(matches!(
        client
            .user()
            .signup_with_fields("someone", "secret", None, &json!(["not", "an", "object"]))
            .await,
        Err(ParseError::InvalidInput(_))
    ));
}

#[tokio::test]
async fn test_login_uses_query_params() {
    let server = MockServer::start_async().await;
    let mut client = setup_client(&server);

    let mock = server
        .mock_async(|when, then| {
            when.method(GET)
                .path("/parse/login")
                .query_param("username", "cooldude6")
                .query_param("password", "p_n7!-e8");
            let mut body = me_body();
            body["sessionToken"] = json!(TOKEN);
            then.status(200).json_body(body);
        })
        .await;

    let user = client.user().login("cooldude6", "p_n7!-e8").await.unwrap();
    mock.assert_async().await;
    assert_eq!(user.email.as_deref(), Some("cool@example.com"));
    assert_eq!(client.session_token(), Some(TOKEN));
}

#[tokio::test]
async fn test_failed_login_keeps_client_anonymous() {
    let server = MockServer::start_async().await;
    let mut client = setup_client(&server);

    server
        .mock_async(|when, then| {
            when.method(GET).path("/parse/login");
            then.status(404)
                .json_body(json!({"code": 101, "error": "Invalid username/password."}));
        })
        .await;

    let err = client.user().login("cooldude6", "wrong").await.unwrap_err();
    assert!(err.is_not_found());
    assert!(!client.is_authenticated());
}

#[tokio::test]
async fn test_current_requires_session() {
    let server = MockServer::start_async().await;
    let mut client = setup_client(&server);

    assert!(matches!(
        client.user().current().await,
        Err(ParseError::SessionTokenMissing)
    ));

    let mock = server
        .mock_async(|when, then| {
            when.method(GET)
                .path("/parse/users/me")
                .header(H_SESSION, TOKEN);
            then.status(200).json_body(me_body());
        })
        .await;

    client.set_session_token(Some(TOKEN.to_string()));
    let me = client.user().current().await.unwrap();
    mock.assert_async().await;
    assert_eq!(me.username, "cooldude6");
}

#[tokio::test]
async fn test_become_user_validates_token() {
    let server = MockServer::start_async().await;
    let mut client = setup_client(&server);

    let good = server
        .mock_async(|when, then| {
            when.method(GET)
                .path("/parse/users/me")
                .header(H_SESSION, TOKEN);
            then.status(200).json_body(me_body());
        })
        .await;
    server
        .mock_async(|when, then| {
            when.method(GET)
                .path("/parse/users/me")
                .header(H_SESSION, "r:stale");
            then.status(400)
                .json_body(json!({"code": 209, "error": "Invalid session token"}));
        })
        .await;

    let err = client.user().become_user("r:stale").await.unwrap_err();
    assert!(err.is_invalid_session());
    assert!(!client.is_authenticated());

    let user = client.user().become_user(TOKEN).await.unwrap();
    good.assert_async().await;
    assert_eq!(user.session_token.as_deref(), Some(TOKEN));
    assert_eq!(client.session_token(), Some(TOKEN));
}

#[tokio::test]
async fn test_logout_clears_session() {
    let server = MockServer::start_async().await;
    let mut client = setup_client(&server);

    let mock = server
        .mock_async(|when, then| {
            when.method(POST)
                .path("/parse/logout")
                .header(H_SESSION, TOKEN);
            then.status(200).json_body(json!({}));
        })
        .await;

    client.set_session_token(Some(TOKEN.to_string()));
    client.user().logout().await.unwrap();
    mock.assert_async().await;
    assert!(client.session_token().is_none());

    // Nothing to end; no request is sent.
    client.user().logout().await.unwrap();
    mock.assert_hits_async(1).await;
}

#[tokio::test]
async fn test_logout_with_invalid_session_still_clears_token() {
    let server = MockServer::start_async().await;
    let mut client = setup_client(&server);

    server
        .mock_async(|when, then| {
            when.method(POST).path("/parse/logout");
            then.status(400)
                .json_body(json!({"code": 209, "error": "Invalid session token"}));
        })
        .await;

    client.set_session_token(Some("r:expired".to_string()));
    client.user().logout().await.unwrap();
    assert!(!client.is_authenticated());
}

#[tokio::test]
async fn test_logout_keeps_session_on_other_errors() {
    let server = MockServer::start_async().await;
    let mut client = setup_client(&server);

    server
        .mock_async(|when, then| {
            when.method(POST).path("/parse/logout");
            then.status(500).body("upstream exploded");
        })
        .await;

    client.set_session_token(Some(TOKEN.to_string()));
    let err = client.user().logout().await.unwrap_err();
    assert_eq!(err.status(), Some(500));
    assert_eq!(client.session_token(), Some(TOKEN));
}

#[tokio::test]
async fn test_request_password_reset() {
    let server = MockServer::start_async().await;
    let mut client = setup_client(&server);

    let mock = server
        .mock_async(|when, then| {
            when.method(POST)
                .path("/parse/requestPasswordReset")
                .json_body(json!({"email": "cool@example.com"}));
            then.status(200).json_body(json!({}));
        })
        .await;

    client
        .user()
        .request_password_reset("cool@example.com")
        .await
        .unwrap();
    mock.assert_async().await;
    assert!(client.user().request_password_reset("").await.is_err());
}

#[tokio::test]
async fn test_update_and_delete_current_user() {
    let server = MockServer::start_async().await;
    let mut client = setup_client(&server);

    let me_mock = server
        .mock_async(|when, then| {
            when.method(GET).path("/parse/users/me");
            then.status(200).json_body(me_body());
        })
        .await;
    let update_mock = server
        .mock_async(|when, then| {
            when.method(PUT)
                .path("/parse/users/g7y9tkhB7O")
                .header(H_SESSION, TOKEN)
                .json_body(json!({"phone": "415-369-6201"}));
            then.status(200).json_body(json!({"updatedAt": UPDATED_AT}));
        })
        .await;
    let delete_mock = server
        .mock_async(|when, then| {
            when.method(DELETE)
                .path("/parse/users/g7y9tkhB7O")
                .header(H_SESSION, TOKEN);
            then.status(200).json_body(json!({}));
        })
        .await;

    assert!(matches!(
        client.user().update_current(&json!({"phone": "x"})).await,
        Err(ParseError::SessionTokenMissing)
    ));

    // The id is unknown after setting a raw token, so it is looked up once.
    client.set_session_token(Some(TOKEN.to_string()));
    let updated = client
        .user()
        .update_current(&json!({"phone": "415-369-6201"}))
        .await
        .unwrap();
    assert_eq!(updated.updated_at.iso(), UPDATED_AT);

    client.user().delete_current().await.unwrap();
    assert!(!client.is_authenticated());

    me_mock.assert_hits_async(1).await;
    update_mock.assert_async().await;
    delete_mock.assert_async().await;
}
