//! API integration tests
//!
//! These run against a live server started with
//! `LIBRARY_AUTH__BOOTSTRAP_ADMIN_PASSWORD=admin` on an empty database.

use chrono::{Duration, Utc};
use reqwest::{Client, StatusCode};
use serde_json::{json, Value};

const BASE_URL: &str = "http://localhost:8080/api/v1";

/// Helper to get an authenticated client
async fn get_auth_token(client: &Client) -> String {
    let response = client
        .post(format!("{}/auth/login", BASE_URL))
        .json(&json!({
            "username": "admin",
            "password": "admin"
        }))
        .send()
        .await
        .expect("Failed to send login request");

    let body: Value = response.json().await.expect("Failed to parse login response");
    body["token"].as_str().expect("No token in response").to_string()
}

async fn current_user_id(client: &Client, token: &str) -> i64 {
    let response = client
        .get(format!("{}/auth/me", BASE_URL))
        .bearer_auth(token)
        .send()
        .await
        .expect("Failed to get current user");
    let body: Value = response.json().await.expect("Failed to parse user");
    body["id"].as_i64().expect("No user id")
}

async fn set_status(client: &Client, token: &str, id: &str, status: &str) {
    let response = client
        .put(format!("{}/instances/{}", BASE_URL, id))
        .bearer_auth(token)
        .json(&json!({ "status": status }))
        .send()
        .await
        .expect("Failed to update instance");
    assert_eq!(response.status(), StatusCode::OK);
}

async fn borrow_status(client: &Client, token: &str, id: &str) -> StatusCode {
    client
        .post(format!("{}/instances/{}/borrow", BASE_URL, id))
        .bearer_auth(token)
        .send()
        .await
        .expect("Failed to borrow")
        .status()
}

/// Creates a book with one available copy and returns the copy's id
async fn create_available_copy(client: &Client, token: &str) -> String {
    let response = client
        .post(format!("{}/books", BASE_URL))
        .bearer_auth(token)
        .json(&json!({
            "title": format!("Integration {}", Utc::now().timestamp_nanos_opt().unwrap_or_default()),
            "summary": "A book created by the integration tests",
            "isbn": "9780000000000"
        }))
        .send()
        .await
        .expect("Failed to create book");
    assert_eq!(response.status(), StatusCode::CREATED);
    let book: Value = response.json().await.expect("Failed to parse book");

    let response = client
        .post(format!("{}/instances", BASE_URL))
        .bearer_auth(token)
        .json(&json!({
            "book_id": book["id"],
            "imprint": "Test Press, 2024",
            "status": "available"
        }))
        .send()
        .await
        .expect("Failed to create instance");
    assert_eq!(response.status(), StatusCode::CREATED);
    let instance: Value = response.json().await.expect("Failed to parse instance");

    instance["id"].as_str().expect("No instance id").to_string()
}

#[tokio::test]
#[ignore] // Run with: cargo test -- --ignored
async fn test_health_check() {
    let client = Client::new();

    let response = client
        .get(format!("{}/health", BASE_URL))
        .send()
        .await
        .expect("Failed to send request");

    assert!(response.status().is_success());

    let body: Value = response.json().await.expect("Failed to parse response");
    assert_eq!(body["status"], "healthy");
}

#[tokio::test]
#[ignore]
async fn test_login() {
    let client = Client::new();

    let response = client
        .post(format!("{}/auth/login", BASE_URL))
        .json(&json!({
            "username": "admin",
            "password": "admin"
        }))
        .send()
        .await
        .expect("Failed to send request");

    assert!(response.status().is_success());

    let body: Value = response.json().await.expect("Failed to parse response");
    assert!(body["token"].is_string());
    assert_eq!(body["token_type"], "Bearer");
    assert_eq!(body["user"]["username"], "admin");
}

#[tokio::test]
#[ignore]
async fn test_login_invalid_credentials() {
    let client = Client::new();

    let response = client
        .post(format!("{}/auth/login", BASE_URL))
        .json(&json!({
            "username": "admin",
            "password": "wrong"
        }))
        .send()
        .await
        .expect("Failed to send request");

    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
#[ignore]
async fn test_borrow_renew_return_cycle() {
    let client = Client::new();
    let token = get_auth_token(&client).await;
    let id = create_available_copy(&client, &token).await;
    let today = Utc::now().date_naive();

    // Borrow
    let response = client
        .post(format!("{}/instances/{}/borrow", BASE_URL, id))
        .bearer_auth(&token)
        .send()
        .await
        .expect("Failed to borrow");
    assert_eq!(response.status(), StatusCode::OK);
    let body: Value = response.json().await.expect("Failed to parse response");
    assert_eq!(body["status"], "on_loan");
    assert_eq!(body["due_back"], (today + Duration::weeks(4)).to_string());

    // A copy on loan cannot be borrowed again
    let response = client
        .post(format!("{}/instances/{}/borrow", BASE_URL, id))
        .bearer_auth(&token)
        .send()
        .await
        .expect("Failed to borrow");
    assert_eq!(response.status(), StatusCode::NOT_FOUND);

    // It shows up in the caller's loans
    let response = client
        .get(format!("{}/loans/mine?per_page=100", BASE_URL))
        .bearer_auth(&token)
        .send()
        .await
        .expect("Failed to list loans");
    let body: Value = response.json().await.expect("Failed to parse response");
    let items = body["items"].as_array().expect("No items");
    assert!(items.iter().any(|i| i["id"] == id.as_str()));
    let me = current_user_id(&client, &token).await;
    for item in items {
        assert_eq!(item["borrower_id"], me);
        assert_eq!(item["status"], "on_loan");
    }

    // Renewal proposal
    let response = client
        .get(format!("{}/instances/{}/renew", BASE_URL, id))
        .bearer_auth(&token)
        .send()
        .await
        .expect("Failed to get proposal");
    assert_eq!(response.status(), StatusCode::OK);
    let body: Value = response.json().await.expect("Failed to parse response");
    assert_eq!(body["proposed_renewal_date"], (today + Duration::weeks(3)).to_string());

    // Renewal in the past is rejected
    let response = client
        .post(format!("{}/instances/{}/renew", BASE_URL, id))
        .bearer_auth(&token)
        .json(&json!({ "renewal_date": (today - Duration::days(1)).to_string() }))
        .send()
        .await
        .expect("Failed to renew");
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let body: Value = response.json().await.expect("Failed to parse response");
    assert_eq!(body["message"], "Invalid date - renewal in past");

    // Valid renewal
    let new_due = today + Duration::weeks(2);
    let response = client
        .post(format!("{}/instances/{}/renew", BASE_URL, id))
        .bearer_auth(&token)
        .json(&json!({ "renewal_date": new_due.to_string() }))
        .send()
        .await
        .expect("Failed to renew");
    assert_eq!(response.status(), StatusCode::OK);
    let body: Value = response.json().await.expect("Failed to parse response");
    assert_eq!(body["due_back"], new_due.to_string());

    // Return
    let response = client
        .post(format!("{}/instances/{}/return", BASE_URL, id))
        .bearer_auth(&token)
        .send()
        .await
        .expect("Failed to return");
    assert_eq!(response.status(), StatusCode::OK);
    let body: Value = response.json().await.expect("Failed to parse response");
    assert_eq!(body["status"], "available");
    assert!(body["due_back"].is_null());
    assert!(body["borrower_id"].is_null());

    // Returning twice fails
    let response = client
        .post(format!("{}/instances/{}/return", BASE_URL, id))
        .bearer_auth(&token)
        .send()
        .await
        .expect("Failed to return");
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
#[ignore]
async fn test_direct_edit_cannot_put_copy_on_loan() {
    let client = Client::new();
    let token = get_auth_token(&client).await;
    let id = create_available_copy(&client, &token).await;

    let response = client
        .put(format!("{}/instances/{}", BASE_URL, id))
        .bearer_auth(&token)
        .json(&json!({ "status": "on_loan" }))
        .send()
        .await
        .expect("Failed to update instance");
    assert_eq!(response.status(), StatusCode::CONFLICT);

    // Only available copies can be borrowed
    set_status(&client, &token, &id, "reserved").await;
    assert_eq!(borrow_status(&client, &token, &id).await, StatusCode::NOT_FOUND);

    set_status(&client, &token, &id, "maintenance").await;
    assert_eq!(borrow_status(&client, &token, &id).await, StatusCode::NOT_FOUND);

    set_status(&client, &token, &id, "available").await;
    assert_eq!(borrow_status(&client, &token, &id).await, StatusCode::OK);
}

#[tokio::test]
#[ignore]
async fn test_author_lifecycle() {
    let client = Client::new();
    let token = get_auth_token(&client).await;

    let response = client
        .post(format!("{}/authors", BASE_URL))
        .bearer_auth(&token)
        .json(&json!({
            "first_name": "Jorge Luis",
            "last_name": "Borges",
            "date_of_birth": "1899-08-24",
            "date_of_death": "1986-06-14"
        }))
        .send()
        .await
        .expect("Failed to create author");
    assert_eq!(response.status(), StatusCode::CREATED);
    let author: Value = response.json().await.expect("Failed to parse response");

    let response = client
        .get(format!("{}/authors/{}", BASE_URL, author["id"]))
        .send()
        .await
        .expect("Failed to get author");
    let body: Value = response.json().await.expect("Failed to parse response");
    assert_eq!(body["full_name"], "Jorge Luis Borges");

    let response = client
        .post(format!("{}/books", BASE_URL))
        .bearer_auth(&token)
        .json(&json!({
            "title": "Ficciones",
            "author_id": author["id"],
            "isbn": "9780802130303"
        }))
        .send()
        .await
        .expect("Failed to create book");
    assert_eq!(response.status(), StatusCode::CREATED);
    let book: Value = response.json().await.expect("Failed to parse book");
    assert_eq!(book["author_id"], author["id"]);

    let response = client
        .delete(format!("{}/authors/{}", BASE_URL, author["id"]))
        .bearer_auth(&token)
        .send()
        .await
        .expect("Failed to delete author");
    assert_eq!(response.status(), StatusCode::NO_CONTENT);

    // The book survives without an author
    let response = client
        .get(format!("{}/books/{}", BASE_URL, book["id"]))
        .send()
        .await
        .expect("Failed to get book");
    assert_eq!(response.status(), StatusCode::OK);
    let body: Value = response.json().await.expect("Failed to parse response");
    assert!(body["author_id"].is_null());
    assert!(body["author"].is_null());
}

#[tokio::test]
#[ignore]
async fn test_list_books() {
    let client = Client::new();

    let response = client
        .get(format!("{}/books", BASE_URL))
        .send()
        .await
        .expect("Failed to send request");

    assert!(response.status().is_success());

    let body: Value = response.json().await.expect("Failed to parse response");
    assert!(body["items"].is_array());
    assert_eq!(body["per_page"], 10);
}

#[tokio::test]
#[ignore]
async fn test_huge_page_returns_empty_list() {
    let client = Client::new();
    let token = get_auth_token(&client).await;

    let response = client
        .get(format!("{}/loans/mine?page=9223372036854775807&per_page=100", BASE_URL))
        .bearer_auth(&token)
        .send()
        .await
        .expect("Failed to list loans");

    assert_eq!(response.status(), StatusCode::OK);
    let body: Value = response.json().await.expect("Failed to parse response");
    assert_eq!(body["items"].as_array().map(Vec::len), Some(0));
}

#[tokio::test]
#[ignore]
async fn test_title_filter_treats_wildcards_literally() {
    let client = Client::new();
    let token = get_auth_token(&client).await;
    create_available_copy(&client, &token).await;

    let response = client
        .get(format!("{}/books?title=%25", BASE_URL))
        .send()
        .await
        .expect("Failed to list books");

    assert_eq!(response.status(), StatusCode::OK);
    let body: Value = response.json().await.expect("Failed to parse response");
    for item in body["items"].as_array().expect("No items") {
        assert!(item["title"].as_str().unwrap_or_default().contains('%'));
    }
}
