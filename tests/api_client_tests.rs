// API client tests against a local mock server

use mockito::Matcher;
use pet_match::models::Pet;
use pet_match::services::{ApiClient, ApiError, DefaultHeaders};
use pet_match::store::{MemoryStorage, Mutation, SessionStore};
use std::time::Duration;

fn create_client(base_url: String, headers: DefaultHeaders) -> ApiClient {
    ApiClient::new(base_url, Duration::from_secs(5), headers).unwrap()
}

#[tokio::test]
async fn test_login_adds_bearer_to_requests() {
    let mut server = mockito::Server::new_async().await;
    let mock = server
        .mock("GET", "/pets/1")
        .match_header("authorization", "Bearer abc")
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(r#"{"petId": 1, "name": "Rex", "breed": "Beagle"}"#)
        .create_async()
        .await;

    let headers = DefaultHeaders::new();
    let client = create_client(server.url(), headers.clone());
    let mut store = SessionStore::restore(MemoryStorage::new(), headers);
    store.commit(Mutation::SetAuthToken("abc".to_string()));

    let pet: Pet = client.get_json("/pets/1").await.unwrap();

    assert_eq!(pet.pet_id, 1);
    assert_eq!(pet.name, "Rex");
    mock.assert_async().await;
}

#[tokio::test]
async fn test_logout_drops_authorization() {
    let mut server = mockito::Server::new_async().await;
    let mock = server
        .mock("DELETE", "/pets/2")
        .match_header("authorization", Matcher::Missing)
        .with_status(204)
        .create_async()
        .await;

    let headers = DefaultHeaders::new();
    let client = create_client(server.url(), headers.clone());
    let mut store = SessionStore::restore(MemoryStorage::new(), headers);
    store.commit(Mutation::SetAuthToken("abc".to_string()));
    store.commit(Mutation::Logout);

    client.delete("/pets/2").await.unwrap();

    mock.assert_async().await;
}

#[tokio::test]
async fn test_status_errors_are_mapped() {
    let mut server = mockito::Server::new_async().await;
    server
        .mock("GET", "/pets")
        .with_status(401)
        .create_async()
        .await;
    server
        .mock("GET", "/pets/9")
        .with_status(404)
        .create_async()
        .await;
    server
        .mock("POST", "/pets")
        .with_status(500)
        .create_async()
        .await;

    let client = create_client(server.url(), DefaultHeaders::new());

    let unauthorized = client.get_json::<Vec<Pet>>("/pets").await;
    assert!(matches!(unauthorized, Err(ApiError::Unauthorized)));

    let missing = client.get_json::<Pet>("/pets/9").await;
    assert!(matches!(missing, Err(ApiError::NotFound(_))));

    let failed = client.post_json::<Pet, bool>("/pets", &Pet::default()).await;
    assert!(matches!(failed, Err(ApiError::ApiError(_))));
}

#[tokio::test]
async fn test_post_sends_json_body() {
    let mut server = mockito::Server::new_async().await;
    let mock = server
        .mock("POST", "/pets")
        .match_body(Matcher::PartialJsonString(r#"{"name": "Kit", "agencyId": 3}"#.to_string()))
        .with_status(201)
        .with_header("content-type", "application/json")
        .with_body("true")
        .create_async()
        .await;

    let client = create_client(server.url(), DefaultHeaders::new());
    let pet = Pet {
        name: "Kit".to_string(),
        agency_id: 3,
        ..Pet::default()
    };

    let created: bool = client.post_json("/pets", &pet).await.unwrap();

    assert!(created);
    mock.assert_async().await;
}

#[tokio::test]
async fn test_garbage_body_is_invalid_response() {
    let mut server = mockito::Server::new_async().await;
    server
        .mock("GET", "/pets/1")
        .with_status(200)
        .with_body("<html>")
        .create_async()
        .await;

    let client = create_client(server.url(), DefaultHeaders::new());

    let result = client.get_json::<Pet>("/pets/1").await;
    assert!(matches!(result, Err(ApiError::InvalidResponse(_))));
}
