//! Admin area: access control, reservation management, calendar feed and
//! user management.

mod common;

use assert_matches::assert_matches;
use axum::http::StatusCode;
use bookings_core::dates::StayDates;
use bookings_core::forms::GuestDetails;
use bookings_core::types::DbId;
use bookings_db::models::reservation::NewReservation;
use bookings_db::{BookingRepository, RepoError};
use chrono::NaiveDate;

use common::{assert_redirect, body_json, build_test_app, page_data, TestApp};

async fn seed_reservation(app: &TestApp, room_id: DbId, start: u32, end: u32) -> DbId {
    let guest = GuestDetails {
        first_name: "Jane".into(),
        last_name: "Booker".into(),
        email: "jane@example.com".into(),
        phone: "555-0100".into(),
    };
    let stay = StayDates::new(
        NaiveDate::from_ymd_opt(2050, 12, start).unwrap(),
        NaiveDate::from_ymd_opt(2050, 12, end).unwrap(),
    )
    .unwrap();
    app.repo
        .commit_booking(&NewReservation::new(&guest, stay, room_id))
        .await
        .unwrap()
}

// ---------------------------------------------------------------------------
// Access control
// ---------------------------------------------------------------------------

#[tokio::test]
async fn anonymous_visitor_is_sent_to_login() {
    let app = build_test_app();
    let mut client = app.client();

    assert_redirect(&client.get("/admin/dashboard").await, "/user/login");
    let data = page_data(client.get("/user/login").await).await;
    assert_eq!(data["error"], "Log in first!");
}

#[tokio::test]
async fn staff_user_is_refused() {
    let app = build_test_app();
    app.create_user("staff@example.com", "password123", 1).await;
    let mut client = app.client();
    let response = client
        .post_form("/user/login", "email=staff@example.com&password=password123")
        .await;
    assert_redirect(&response, "/");

    assert_redirect(&client.get("/admin/reservations/all").await, "/user/login");
    let data = page_data(client.get("/user/login").await).await;
    assert_eq!(data["error"], "Access denied");
}

#[tokio::test]
async fn wrong_password_is_rejected() {
    let app = build_test_app();
    app.create_user(common::ADMIN_EMAIL, common::ADMIN_PASSWORD, 3).await;
    let mut client = app.client();

    let response = client
        .post_form("/user/login", "email=admin@example.com&password=nope-nope")
        .await;
    assert_redirect(&response, "/user/login");
    let data = page_data(client.get("/user/login").await).await;
    assert_eq!(data["error"], "Invalid login credentials");
    assert_redirect(&client.get("/admin/dashboard").await, "/user/login");
}

#[tokio::test]
async fn blank_login_form_is_redisplayed() {
    let app = build_test_app();
    let mut client = app.client();

    let response = client.post_form("/user/login", "email=&password=").await;
    assert_eq!(response.status(), StatusCode::OK);
    let data = page_data(response).await;
    assert!(data["form"]["errors"]["email"].is_array());
    assert!(data["form"]["errors"]["password"].is_array());
    assert!(data["form"]["values"].get("password").is_none());
}

#[tokio::test]
async fn login_then_logout_ends_admin_access() {
    let app = build_test_app();
    let (mut client, _) = app.admin_client().await;

    let data = page_data(client.get("/").await).await;
    assert_eq!(data["flash"], "Logged in successfully");
    assert_eq!(data["is_authenticated"], true);

    assert_redirect(&client.get("/admin").await, "/admin/dashboard");
    assert_eq!(client.get("/admin/dashboard").await.status(), StatusCode::OK);

    assert_redirect(&client.get("/user/logout").await, "/user/login");
    assert_redirect(&client.get("/admin/dashboard").await, "/user/login");
}

#[tokio::test]
async fn deleted_admin_loses_access_immediately() {
    let app = build_test_app();
    let (mut remover, _) = app.admin_client().await;
    let (mut removed, removed_id) = app
        .signed_in_client("second@example.com", "password123", 3)
        .await;
    assert_eq!(removed.get("/admin/dashboard").await.status(), StatusCode::OK);

    let response = remover
        .post_form(&format!("/admin/users/{removed_id}/delete"), "")
        .await;
    assert_redirect(&response, "/admin/users");

    assert_redirect(&removed.get("/admin/dashboard").await, "/user/login");
    let data = page_data(removed.get("/user/login").await).await;
    assert_eq!(data["error"], "Log in first!");
    assert_eq!(data["is_authenticated"], false);
}

// ---------------------------------------------------------------------------
// Reservations
// ---------------------------------------------------------------------------

#[tokio::test]
async fn dashboard_counts_reservations() {
    let app = build_test_app();
    seed_reservation(&app, 1, 1, 3).await;
    let processed = seed_reservation(&app, 2, 1, 3).await;
    app.repo.update_processed(processed, true).await.unwrap();
    let (mut client, _) = app.admin_client().await;

    let data = page_data(client.get("/admin/dashboard").await).await;
    assert_eq!(data["data"]["stats"]["new_reservations"], 1);
    assert_eq!(data["data"]["stats"]["all_reservations"], 2);
    assert_eq!(data["data"]["stats"]["rooms"], 2);
}

#[tokio::test]
async fn new_listing_excludes_processed_reservations() {
    let app = build_test_app();
    let id = seed_reservation(&app, 1, 5, 7).await;
    let (mut client, _) = app.admin_client().await;

    let data = page_data(client.get("/admin/reservations/new").await).await;
    assert_eq!(data["data"]["reservations"][0]["id"], id);

    let response = client
        .post_form(&format!("/admin/reservations/new/{id}/processed"), "")
        .await;
    assert_redirect(&response, "/admin/reservations/new");

    let data = page_data(client.get("/admin/reservations/new").await).await;
    assert_eq!(data["flash"], "Reservation marked as processed");
    assert!(data["data"]["reservations"].as_array().unwrap().is_empty());

    let data = page_data(client.get("/admin/reservations/all").await).await;
    assert_eq!(data["data"]["reservations"][0]["processed"], true);
}

#[tokio::test]
async fn show_and_update_reservation() {
    let app = build_test_app();
    let id = seed_reservation(&app, 1, 5, 7).await;
    let (mut client, _) = app.admin_client().await;

    let data = page_data(client.get(&format!("/admin/reservations/all/{id}")).await).await;
    assert_eq!(data["string_map"]["src"], "all");
    assert_eq!(data["string_map"]["start_date"], "12-05-2050");
    assert_eq!(data["form"]["values"]["first_name"], "Jane");
    assert_eq!(data["data"]["reservation"]["room_name"], "General's Quarters");

    let response = client
        .post_form(
            &format!("/admin/reservations/cal/{id}"),
            "first_name=Janet&last_name=Booker&email=janet%40example.com&phone=555-0101",
        )
        .await;
    assert_redirect(&response, "/admin/reservations/calendar");

    let updated = app.repo.get_reservation_by_id(id).await.unwrap();
    assert_eq!(updated.first_name, "Janet");
    assert_eq!(updated.email, "janet@example.com");
}

#[tokio::test]
async fn invalid_update_is_redisplayed_and_not_saved() {
    let app = build_test_app();
    let id = seed_reservation(&app, 1, 5, 7).await;
    let (mut client, _) = app.admin_client().await;

    let response = client
        .post_form(
            &format!("/admin/reservations/all/{id}"),
            "first_name=Janet&last_name=Booker&email=broken&phone=555",
        )
        .await;
    assert_eq!(response.status(), StatusCode::OK);
    let data = page_data(response).await;
    assert_eq!(data["form"]["errors"]["email"][0], "Invalid email address");

    let unchanged = app.repo.get_reservation_by_id(id).await.unwrap();
    assert_eq!(unchanged.first_name, "Jane");
}

#[tokio::test]
async fn delete_reservation_frees_the_room() {
    let app = build_test_app();
    let id = seed_reservation(&app, 1, 5, 7).await;
    let (mut client, _) = app.admin_client().await;

    let response = client
        .post_form(&format!("/admin/reservations/all/{id}/delete"), "")
        .await;
    assert_redirect(&response, "/admin/reservations/all");

    assert_eq!(app.repo.reservation_count(), 0);
    assert!(app.repo.restrictions().is_empty());
}

#[tokio::test]
async fn missing_reservation_is_404_and_malformed_id_is_400() {
    let app = build_test_app();
    let (mut client, _) = app.admin_client().await;

    let response = client.get("/admin/reservations/all/9999").await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
    assert_eq!(body_json(response).await["code"], "NOT_FOUND");

    let response = client
        .post_form("/admin/reservations/all/9999/processed", "")
        .await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);

    let response = client.get("/admin/reservations/all/abc").await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    let response = client.get("/admin/reservations/elsewhere/1").await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

// ---------------------------------------------------------------------------
// Calendar feed
// ---------------------------------------------------------------------------

#[tokio::test]
async fn calendar_feed_returns_overlapping_reservations() {
    let app = build_test_app();
    let inside = seed_reservation(&app, 1, 10, 12).await;
    seed_reservation(&app, 2, 20, 25).await;
    let (mut client, _) = app.admin_client().await;

    let response = client
        .get("/admin/reservations/calendar/json?start=2050-12-09T00:00:00Z&end=2050-12-15T00:00:00Z")
        .await;
    assert_eq!(response.status(), StatusCode::OK);
    let events = body_json(response).await;
    let events = events.as_array().unwrap();
    assert_eq!(events.len(), 1);
    assert_eq!(events[0]["id"], inside);
    assert_eq!(events[0]["title"], "General's Quarters: Jane Booker");
    assert_eq!(events[0]["start"], "2050-12-10");
    assert_eq!(events[0]["allDay"], true);
    assert_eq!(events[0]["url"], format!("/admin/reservations/cal/{inside}"));
    assert_eq!(events[0]["extendedProps"]["room"], "General's Quarters");
}

#[tokio::test]
async fn calendar_feed_rejects_non_rfc3339_dates() {
    let app = build_test_app();
    let (mut client, _) = app.admin_client().await;

    let response = client
        .get("/admin/reservations/calendar/json?start=12-09-2050&end=2050-12-15T00:00:00Z")
        .await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert_eq!(
        body_json(response).await["error"],
        "Invalid start date format. Use RFC3339 format."
    );

    let response = client
        .get("/admin/reservations/calendar/json?start=2050-12-09T00:00:00Z&end=soon")
        .await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert_eq!(
        body_json(response).await["error"],
        "Invalid end date format. Use RFC3339 format."
    );
}

// ---------------------------------------------------------------------------
// Users
// ---------------------------------------------------------------------------

#[tokio::test]
async fn create_user_then_reject_duplicate_email() {
    let app = build_test_app();
    let (mut client, _) = app.admin_client().await;
    let form = "first_name=Sam&last_name=Staff&email=sam%40example.com&password=longpassword&access_level=1";

    let response = client.post_form("/admin/users/new", form).await;
    assert_redirect(&response, "/admin/users");
    let data = page_data(client.get("/admin/users").await).await;
    assert_eq!(data["flash"], "User created");
    let users = data["data"]["users"].as_array().unwrap();
    assert_eq!(users.len(), 2);
    assert!(users.iter().all(|u| u.get("password_hash").is_none()));

    let response = client.post_form("/admin/users/new", form).await;
    assert_eq!(response.status(), StatusCode::OK);
    let data = page_data(response).await;
    assert_eq!(
        data["form"]["errors"]["email"][0],
        "A user with this email already exists"
    );
    assert!(data["form"]["values"].get("password").is_none());
}

#[tokio::test]
async fn invalid_new_user_is_redisplayed() {
    let app = build_test_app();
    let (mut client, _) = app.admin_client().await;

    let response = client
        .post_form(
            "/admin/users/new",
            "first_name=Sam&last_name=Staff&email=sam%40example.com&password=short",
        )
        .await;
    assert_eq!(response.status(), StatusCode::OK);
    let data = page_data(response).await;
    assert_eq!(
        data["form"]["errors"]["password"][0],
        "Password must be at least 8 characters long"
    );
    assert_eq!(app.repo.list_users().await.unwrap().len(), 1);
}

#[tokio::test]
async fn admin_cannot_delete_own_account() {
    let app = build_test_app();
    let (mut client, admin_id) = app.admin_client().await;
    let other = app.create_user("other@example.com", "password123", 1).await;

    let response = client
        .post_form(&format!("/admin/users/{admin_id}/delete"), "")
        .await;
    assert_redirect(&response, "/admin/users");
    let data = page_data(client.get("/admin/users").await).await;
    assert_eq!(data["warning"], "You cannot delete your own account");
    assert!(app.repo.get_user_by_id(admin_id).await.is_ok());

    let response = client
        .post_form(&format!("/admin/users/{other}/delete"), "")
        .await;
    assert_redirect(&response, "/admin/users");
    assert_matches!(
        app.repo.get_user_by_id(other).await,
        Err(RepoError::NotFound { .. })
    );
}
