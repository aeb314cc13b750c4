/// Integration tests for the FieldDesk API
///
/// These tests verify the full system works end-to-end:
/// - Login, logout and session expiry
/// - Role gating, including the restricted open-tickets account
/// - Ticket listing filters, search and pagination clamping
/// - Ticket lifecycle (create → comment → status → assign)
/// - CSV export
/// - Access request intake and notification delivery
/// - Error body shape for validation and conflict failures

mod common;

use axum::http::{header, StatusCode};
use common::{bare_request, body_json, body_text, json_request, seed_ticket, TestContext};
use fielddesk_shared::models::ticket::TicketStatus;
use serde_json::json;

/// Test that a seeded account can log in and read itself back
#[tokio::test]
async fn test_login_and_me() {
    let mut ctx = TestContext::new().await.unwrap();
    let cookie = ctx.login("admin").await;

    assert!(cookie.starts_with("fielddesk_session="));

    let response = ctx.send(bare_request("GET", "/v1/auth/me", Some(&cookie))).await;
    assert_eq!(response.status(), StatusCode::OK);

    let body = body_json(response).await;
    assert_eq!(body["username"], "admin");
    assert_eq!(body["role"], "admin");
    // The response type must not leak the stored hash
    assert!(body.get("password_hash").is_none());
}

/// Test that a wrong password is rejected without hinting which half failed
#[tokio::test]
async fn test_login_rejects_wrong_password() {
    let mut ctx = TestContext::new().await.unwrap();

    let request = json_request(
        "POST",
        "/v1/auth/login",
        None,
        json!({ "username": "admin", "password": "not-the-password" }),
    );
    let response = ctx.send(request).await;
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);

    let body = body_json(response).await;
    assert_eq!(body["error"], "unauthorized");
    assert_eq!(body["message"], "Invalid username or password");
    assert_eq!(body["redirect"], "/login");
}

/// Test that protected routes redirect anonymous callers to the login page
#[tokio::test]
async fn test_missing_session_redirects_to_login() {
    let mut ctx = TestContext::new().await.unwrap();

    let response = ctx.send(bare_request("GET", "/v1/tickets", None)).await;
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);

    let body = body_json(response).await;
    assert_eq!(body["redirect"], "/login");

    // A cookie with a forged signature counts as no session at all
    let forged = "fielddesk_session=sometoken.0000000000000000000000000000000000000000000000000000000000000000";
    let response = ctx.send(bare_request("GET", "/v1/tickets", Some(forged))).await;
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

/// Test that logout deletes the server-side session
#[tokio::test]
async fn test_logout_invalidates_session() {
    let mut ctx = TestContext::new().await.unwrap();
    let cookie = ctx.login("tech").await;

    let response = ctx
        .send(bare_request("POST", "/v1/auth/logout", Some(&cookie)))
        .await;
    assert_eq!(response.status(), StatusCode::OK);

    // The cookie still looks valid to the browser, but the session row
    // is gone and the request must be treated as anonymous
    let response = ctx.send(bare_request("GET", "/v1/auth/me", Some(&cookie))).await;
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

/// Test that a session idles out after the configured window
#[tokio::test]
async fn test_idle_session_expires() {
    let mut ctx = TestContext::new().await.unwrap();
    let cookie = ctx.login("tech").await;

    // Backdate the session to twice the configured idle window
    let idle = ctx.config.session.idle_seconds;
    let stale = chrono::Utc::now() - chrono::Duration::seconds(idle * 2);
    sqlx::query("UPDATE sessions SET last_seen_at = ?")
        .bind(stale)
        .execute(&ctx.db)
        .await
        .unwrap();

    let response = ctx.send(bare_request("GET", "/v1/auth/me", Some(&cookie))).await;
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);

    let body = body_json(response).await;
    assert_eq!(body["redirect"], "/login");
}

/// Test that the restricted account cannot write, with the exact flash message
#[tokio::test]
async fn test_restricted_account_cannot_create_tickets() {
    let mut ctx = TestContext::new().await.unwrap();
    let cookie = ctx.login("frontdesk").await;

    let request = json_request(
        "POST",
        "/v1/tickets",
        Some(&cookie),
        json!({ "title": "Projector bulb out", "description": "Room 2 projector" }),
    );
    let response = ctx.send(request).await;
    assert_eq!(response.status(), StatusCode::FORBIDDEN);

    let body = body_json(response).await;
    assert_eq!(body["error"], "forbidden");
    assert_eq!(
        body["message"],
        "You only have permission to view open tickets."
    );
    assert_eq!(body["redirect"], "/tickets");
}

/// Test that non-admin accounts are turned away from admin surfaces
#[tokio::test]
async fn test_non_admin_cannot_manage_users() {
    let mut ctx = TestContext::new().await.unwrap();
    let own_id = ctx.regular.id;
    let cookie = ctx.login("casey").await;

    let response = ctx.send(bare_request("GET", "/v1/users", Some(&cookie))).await;
    assert_eq!(response.status(), StatusCode::FORBIDDEN);

    let body = body_json(response).await;
    assert_eq!(body["redirect"], "/dashboard");

    // Even the caller's own row is off limits outside the profile routes
    let response = ctx
        .send(bare_request("GET", &format!("/v1/users/{own_id}"), Some(&cookie)))
        .await;
    assert_eq!(response.status(), StatusCode::FORBIDDEN);

    // Deleting a ticket is likewise admin-only
    let response = ctx
        .send(bare_request("DELETE", "/v1/tickets/1", Some(&cookie)))
        .await;
    assert_eq!(response.status(), StatusCode::FORBIDDEN);
}

/// Test that the restricted account sees only open tickets, whatever it asks for
#[tokio::test]
async fn test_restricted_listing_pinned_to_open() {
    let mut ctx = TestContext::new().await.unwrap();
    let admin_id = ctx.admin.id;

    seed_ticket(&ctx.db, admin_id, "Printer jammed", TicketStatus::Open)
        .await
        .unwrap();
    seed_ticket(&ctx.db, admin_id, "Router flapping", TicketStatus::Open)
        .await
        .unwrap();
    seed_ticket(&ctx.db, admin_id, "Monitor flicker", TicketStatus::InProgress)
        .await
        .unwrap();
    seed_ticket(&ctx.db, admin_id, "Old UPS replaced", TicketStatus::Closed)
        .await
        .unwrap();

    let cookie = ctx.login("frontdesk").await;

    let response = ctx.send(bare_request("GET", "/v1/auth/me", Some(&cookie))).await;
    let body = body_json(response).await;
    assert_eq!(body["id"], ctx.kiosk.id);
    assert_eq!(body["role"], "opentickets");

    let response = ctx.send(bare_request("GET", "/v1/tickets", Some(&cookie))).await;
    assert_eq!(response.status(), StatusCode::OK);
    let body = body_json(response).await;
    assert_eq!(body["total"], 2);
    for ticket in body["tickets"].as_array().unwrap() {
        assert_eq!(ticket["status"], "Open");
    }

    // An explicit conflicting status filter is ANDed with the pin and
    // simply matches nothing
    let response = ctx
        .send(bare_request("GET", "/v1/tickets?status=Closed", Some(&cookie)))
        .await;
    let body = body_json(response).await;
    assert_eq!(body["total"], 0);
    assert_eq!(body["tickets"].as_array().unwrap().len(), 0);
    assert_eq!(body["total_pages"], 1);

    // A full-access account sees everything
    let admin_cookie = ctx.login("admin").await;
    let response = ctx
        .send(bare_request("GET", "/v1/tickets", Some(&admin_cookie)))
        .await;
    let body = body_json(response).await;
    assert_eq!(body["total"], 4);
}

/// Test pagination math and out-of-range clamping on the ticket listing
#[tokio::test]
async fn test_listing_pagination_clamps() {
    let mut ctx = TestContext::new().await.unwrap();
    let admin_id = ctx.admin.id;

    for n in 1..=23 {
        seed_ticket(&ctx.db, admin_id, &format!("Ticket {n:02}"), TicketStatus::Open)
            .await
            .unwrap();
    }

    let cookie = ctx.login("tech").await;

    let response = ctx
        .send(bare_request("GET", "/v1/tickets?page=3", Some(&cookie)))
        .await;
    let body = body_json(response).await;
    assert_eq!(body["total"], 23);
    assert_eq!(body["page"], 3);
    assert_eq!(body["total_pages"], 3);
    assert_eq!(body["tickets"].as_array().unwrap().len(), 3);

    // Past-the-end requests land on the last page instead of erroring
    let response = ctx
        .send(bare_request("GET", "/v1/tickets?page=99", Some(&cookie)))
        .await;
    let body = body_json(response).await;
    assert_eq!(body["page"], 3);
    assert_eq!(body["tickets"].as_array().unwrap().len(), 3);

    // Newest first on the first page
    let response = ctx.send(bare_request("GET", "/v1/tickets", Some(&cookie))).await;
    let body = body_json(response).await;
    let ids: Vec<i64> = body["tickets"]
        .as_array()
        .unwrap()
        .iter()
        .map(|t| t["id"].as_i64().unwrap())
        .collect();
    assert_eq!(ids.len(), 10);
    assert!(ids.windows(2).all(|w| w[0] > w[1]));
}

/// Test that search matches title and description case-insensitively
#[tokio::test]
async fn test_search_is_case_insensitive() {
    let mut ctx = TestContext::new().await.unwrap();
    let admin_id = ctx.admin.id;

    seed_ticket(&ctx.db, admin_id, "Printer jammed in lobby", TicketStatus::Open)
        .await
        .unwrap();
    seed_ticket(&ctx.db, admin_id, "VPN flaky at north site", TicketStatus::Open)
        .await
        .unwrap();
    // Matches in the description, not the title
    sqlx::query("UPDATE tickets SET description = 'The PRINTER needs toner' WHERE title = ?")
        .bind("VPN flaky at north site")
        .execute(&ctx.db)
        .await
        .unwrap();
    seed_ticket(&ctx.db, admin_id, "Badge reader dead", TicketStatus::Open)
        .await
        .unwrap();

    let cookie = ctx.login("casey").await;
    let response = ctx
        .send(bare_request("GET", "/v1/tickets?search=printer", Some(&cookie)))
        .await;
    let body = body_json(response).await;
    assert_eq!(body["total"], 2);

    let response = ctx
        .send(bare_request("GET", "/v1/tickets?search=plotter", Some(&cookie)))
        .await;
    let body = body_json(response).await;
    assert_eq!(body["total"], 0);
    assert!(body["tickets"].as_array().unwrap().is_empty());
}

/// Test that a minimal create request gets the documented defaults
#[tokio::test]
async fn test_create_ticket_defaults() {
    let mut ctx = TestContext::new().await.unwrap();
    let admin_id = ctx.admin.id;
    let cookie = ctx.login("admin").await;

    let request = json_request(
        "POST",
        "/v1/tickets",
        Some(&cookie),
        json!({ "title": "Scanner offline", "description": "Feeds but does not scan" }),
    );
    let response = ctx.send(request).await;
    assert_eq!(response.status(), StatusCode::OK);

    let body = body_json(response).await;
    assert_eq!(body["status"], "Open");
    assert_eq!(body["priority"], "Medium");
    assert_eq!(body["created_by"], admin_id);
    assert!(body["assigned_to"].is_null());
}

/// Test that ticket creation is reserved for administrators
#[tokio::test]
async fn test_only_admins_create_tickets() {
    let mut ctx = TestContext::new().await.unwrap();
    let cookie = ctx.login("tech").await;

    let request = json_request(
        "POST",
        "/v1/tickets",
        Some(&cookie),
        json!({ "title": "Scanner offline", "description": "Feeds but does not scan" }),
    );
    let response = ctx.send(request).await;
    assert_eq!(response.status(), StatusCode::FORBIDDEN);

    let body = body_json(response).await;
    assert_eq!(body["redirect"], "/dashboard");
}

/// Test ticket lifecycle: create, comment, status change, assignment, detail
#[tokio::test]
async fn test_ticket_lifecycle() {
    let mut ctx = TestContext::new().await.unwrap();
    let tech_id = ctx.technician.id;
    let admin_cookie = ctx.login("admin").await;
    let tech_cookie = ctx.login("tech").await;

    let response = ctx
        .send(json_request(
            "POST",
            "/v1/tickets",
            Some(&admin_cookie),
            json!({ "title": "AP rebooting hourly", "description": "Ceiling AP, east wing" }),
        ))
        .await;
    assert_eq!(response.status(), StatusCode::OK);
    let ticket = body_json(response).await;
    let id = ticket["id"].as_i64().unwrap();

    // Technicians work the ticket: comment, status, assignment
    let response = ctx
        .send(json_request(
            "POST",
            &format!("/v1/tickets/{id}/comments"),
            Some(&tech_cookie),
            json!({ "content": "Swapped the PoE injector, watching it." }),
        ))
        .await;
    assert_eq!(response.status(), StatusCode::OK);

    let response = ctx
        .send(json_request(
            "PUT",
            &format!("/v1/tickets/{id}/status"),
            Some(&tech_cookie),
            json!({ "status": "In Progress" }),
        ))
        .await;
    assert_eq!(response.status(), StatusCode::OK);

    let response = ctx
        .send(json_request(
            "PUT",
            &format!("/v1/tickets/{id}/assign"),
            Some(&tech_cookie),
            json!({ "assigned_to": tech_id }),
        ))
        .await;
    assert_eq!(response.status(), StatusCode::OK);

    let response = ctx
        .send(bare_request("GET", &format!("/v1/tickets/{id}"), Some(&tech_cookie)))
        .await;
    let body = body_json(response).await;
    assert_eq!(body["ticket"]["status"], "In Progress");
    assert_eq!(body["ticket"]["assigned_to"], tech_id);
    assert_eq!(body["ticket"]["assigned_to_username"], "tech");
    assert_eq!(body["ticket"]["created_by_username"], "admin");

    let comments = body["comments"].as_array().unwrap();
    assert_eq!(comments.len(), 1);
    assert_eq!(comments[0]["content"], "Swapped the PoE injector, watching it.");
    assert_eq!(comments[0]["author_username"], "tech");
}

/// Test that deleting a ticket twice reports the second call as a no-op
#[tokio::test]
async fn test_delete_ticket_is_idempotent() {
    let mut ctx = TestContext::new().await.unwrap();
    let admin_id = ctx.admin.id;
    let ticket = seed_ticket(&ctx.db, admin_id, "Retired workstation", TicketStatus::Closed)
        .await
        .unwrap();

    let cookie = ctx.login("admin").await;
    let uri = format!("/v1/tickets/{}", ticket.id);

    let response = ctx.send(bare_request("DELETE", &uri, Some(&cookie))).await;
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(body_json(response).await["deleted"], true);

    let response = ctx.send(bare_request("DELETE", &uri, Some(&cookie))).await;
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(body_json(response).await["deleted"], false);
}

/// Test the CSV export: headers, content type and download disposition
#[tokio::test]
async fn test_export_returns_csv() {
    let mut ctx = TestContext::new().await.unwrap();
    let admin_id = ctx.admin.id;
    seed_ticket(&ctx.db, admin_id, "Label printer offline", TicketStatus::Open)
        .await
        .unwrap();
    seed_ticket(&ctx.db, admin_id, "Door sensor stuck", TicketStatus::Resolved)
        .await
        .unwrap();

    let cookie = ctx.login("admin").await;
    let response = ctx
        .send(bare_request("GET", "/v1/tickets/export", Some(&cookie)))
        .await;
    assert_eq!(response.status(), StatusCode::OK);

    let content_type = response
        .headers()
        .get(header::CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .unwrap_or_default()
        .to_string();
    assert_eq!(content_type, "text/csv");

    let disposition = response
        .headers()
        .get(header::CONTENT_DISPOSITION)
        .and_then(|v| v.to_str().ok())
        .unwrap_or_default()
        .to_string();
    assert!(disposition.starts_with("attachment; filename=\"tickets_export_"));
    assert!(disposition.ends_with(".csv\""));

    let body = body_text(response).await;
    let mut lines = body.lines();
    assert_eq!(
        lines.next(),
        Some("ID,Title,Description,Status,Priority,Created At,Updated At,Due Date,Created By,Assigned To")
    );
    assert_eq!(lines.count(), 2);
    assert!(body.contains("Label printer offline"));
    assert!(body.contains("admin"));
}

/// Test that the export honors the listing filters
#[tokio::test]
async fn test_export_applies_filters() {
    let mut ctx = TestContext::new().await.unwrap();
    let admin_id = ctx.admin.id;
    seed_ticket(&ctx.db, admin_id, "Open issue", TicketStatus::Open)
        .await
        .unwrap();
    seed_ticket(&ctx.db, admin_id, "Closed issue", TicketStatus::Closed)
        .await
        .unwrap();

    let cookie = ctx.login("tech").await;
    let response = ctx
        .send(bare_request(
            "GET",
            "/v1/tickets/export?status=Closed",
            Some(&cookie),
        ))
        .await;
    assert_eq!(response.status(), StatusCode::OK);

    let body = body_text(response).await;
    assert!(body.contains("Closed issue"));
    assert!(!body.contains("Open issue"));

    // The restricted account has no export at all
    let kiosk_cookie = ctx.login("frontdesk").await;
    let response = ctx
        .send(bare_request("GET", "/v1/tickets/export", Some(&kiosk_cookie)))
        .await;
    assert_eq!(response.status(), StatusCode::FORBIDDEN);
    let body = body_json(response).await;
    assert_eq!(body["redirect"], "/tickets");
}

/// Test that duplicate usernames surface as a conflict, not a 500
#[tokio::test]
async fn test_duplicate_username_conflicts() {
    let mut ctx = TestContext::new().await.unwrap();
    let cookie = ctx.login("admin").await;

    let request = json_request(
        "POST",
        "/v1/users",
        Some(&cookie),
        json!({
            "username": "tech",
            "password": "another-password-1",
            "full_name": "Second Tech",
            "email": "tech2@example.com",
            "role": "technician"
        }),
    );
    let response = ctx.send(request).await;
    assert_eq!(response.status(), StatusCode::CONFLICT);

    let body = body_json(response).await;
    assert_eq!(body["error"], "conflict");
    assert_eq!(body["message"], "Username already exists");
}

/// Test public access request intake and best-effort notification
#[tokio::test]
async fn test_access_request_notifies_admins() {
    let mut ctx = TestContext::new().await.unwrap();

    // No session cookie: submission must still be accepted
    let request = json_request(
        "POST",
        "/v1/access-requests",
        None,
        json!({
            "full_name": "Dana Voss",
            "email": "dana@example.com",
            "location": "North Branch",
            "message": "New site coordinator"
        }),
    );
    let response = ctx.send(request).await;
    assert_eq!(response.status(), StatusCode::OK);

    let body = body_json(response).await;
    assert_eq!(body["status"], "pending");

    let received = ctx.notifier.received();
    assert_eq!(received.len(), 1);
    assert_eq!(received[0].email, "dana@example.com");

    // A broken notifier must not reject the submission
    ctx.notifier.fail_with("smtp unreachable");
    let request = json_request(
        "POST",
        "/v1/access-requests",
        None,
        json!({
            "full_name": "Riley Chen",
            "email": "riley@example.com",
            "location": "South Depot"
        }),
    );
    let response = ctx.send(request).await;
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(ctx.notifier.received().len(), 1);

    // Reviewing requires an admin session
    let cookie = ctx.login("admin").await;
    let response = ctx
        .send(bare_request("GET", "/v1/access-requests", Some(&cookie)))
        .await;
    assert_eq!(response.status(), StatusCode::OK);
    let body = body_json(response).await;
    assert_eq!(body.as_array().unwrap().len(), 2);

    let id = body[0]["id"].as_i64().unwrap();
    let response = ctx
        .send(json_request(
            "POST",
            &format!("/v1/access-requests/{id}/process"),
            Some(&cookie),
            json!({ "status": "approved", "notes": "Account created" }),
        ))
        .await;
    assert_eq!(response.status(), StatusCode::OK);
    let body = body_json(response).await;
    assert_eq!(body["status"], "approved");
    assert_eq!(body["processed_by"], ctx.admin.id);
    assert!(!body["processed_at"].is_null());
}

/// Test the validation error body: field-level details under a 400
#[tokio::test]
async fn test_validation_errors_return_details() {
    let mut ctx = TestContext::new().await.unwrap();
    let cookie = ctx.login("admin").await;

    let request = json_request(
        "POST",
        "/v1/tickets",
        Some(&cookie),
        json!({ "title": "", "description": "" }),
    );
    let response = ctx.send(request).await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    let body = body_json(response).await;
    assert_eq!(body["error"], "validation_error");
    assert_eq!(body["message"], "Request validation failed");

    let details = body["details"].as_array().unwrap();
    assert!(details.len() >= 2);
    assert!(details.iter().any(|d| d["field"] == "title"));
    assert!(details.iter().any(|d| d["field"] == "description"));
}
