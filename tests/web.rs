//! End-to-end tests against a running certdesk server.
//!
//! Each test starts its own server on an isolated temp data directory,
//! signs in through the real login form, and drives the HTML routes with
//! a cookie-enabled HTTP client.

mod common;

use chrono::Days;
use common::{ADMIN_PASSWORD, ADMIN_USERNAME, TestServer};
use reqwest::StatusCode;
use reqwest::redirect::Policy;

fn bare_client() -> reqwest::Client {
    reqwest::Client::builder()
        .redirect(Policy::none())
        .build()
        .expect("build client")
}

fn session_client() -> reqwest::Client {
    reqwest::Client::builder()
        .cookie_store(true)
        .build()
        .expect("build client")
}

async fn sign_in(server: &TestServer) -> reqwest::Client {
    let client = session_client();
    let resp = client
        .post(format!("{}/login", server.base_url))
        .form(&[("username", ADMIN_USERNAME), ("password", ADMIN_PASSWORD)])
        .send()
        .await
        .expect("post login");

    assert!(resp.status().is_success());
    assert!(resp.url().path().ends_with("/dashboard"));
    client
}

async fn create_client_record(
    client: &reqwest::Client,
    server: &TestServer,
    company: &str,
    email: &str,
    spec_id: &str,
    grant_date: &str,
) -> String {
    let resp = client
        .post(format!("{}/client_form", server.base_url))
        .form(&[
            ("company_name", company),
            ("email", email),
            ("specification_id", spec_id),
            ("grant_date", grant_date),
        ])
        .send()
        .await
        .expect("post client form");

    assert!(resp.status().is_success());
    assert!(resp.url().path().ends_with("/clients"));
    resp.text().await.expect("read clients page")
}

#[tokio::test]
async fn protected_routes_redirect_to_login() {
    let server = TestServer::start().await;
    let client = bare_client();

    for path in [
        "/",
        "/dashboard",
        "/users",
        "/clients",
        "/client_form",
        "/change_password",
        "/export_clients",
        "/logout",
    ] {
        let resp = client
            .get(format!("{}{}", server.base_url, path))
            .send()
            .await
            .expect("request");

        assert_eq!(resp.status(), StatusCode::SEE_OTHER, "path: {path}");
        assert_eq!(
            resp.headers()["location"].to_str().unwrap(),
            "/login",
            "path: {path}"
        );
    }
}

#[tokio::test]
async fn login_rejects_bad_credentials() {
    let server = TestServer::start().await;
    let client = bare_client();

    for (username, password) in [
        (ADMIN_USERNAME, "wrong-password"),
        ("nosuchuser", ADMIN_PASSWORD),
        ("", ""),
    ] {
        let resp = client
            .post(format!("{}/login", server.base_url))
            .form(&[("username", username), ("password", password)])
            .send()
            .await
            .expect("post login");

        // The form is redisplayed with an error rather than redirecting
        assert!(resp.status().is_success());
        let body = resp.text().await.expect("read body");
        assert!(body.contains("Invalid username or password"));
    }
}

#[tokio::test]
async fn login_and_logout_round_trip() {
    let server = TestServer::start().await;
    let client = sign_in(&server).await;

    // Index now routes to the dashboard
    let resp = client
        .get(format!("{}/", server.base_url))
        .send()
        .await
        .expect("get index");
    assert!(resp.url().path().ends_with("/dashboard"));
    let body = resp.text().await.expect("read body");
    assert!(body.contains(ADMIN_USERNAME));

    // Log out, then the session cookie must no longer authenticate
    let resp = client
        .get(format!("{}/logout", server.base_url))
        .send()
        .await
        .expect("get logout");
    assert!(resp.url().path().ends_with("/login"));

    let resp = client
        .get(format!("{}/dashboard", server.base_url))
        .send()
        .await
        .expect("get dashboard");
    assert!(resp.url().path().ends_with("/login"));
}

#[tokio::test]
async fn clients_get_sequential_certificate_numbers() {
    let server = TestServer::start().await;
    let spec_id = server.add_spec("ISO 9001", 100);
    let client = sign_in(&server).await;

    let body = create_client_record(
        &client,
        &server,
        "Acme",
        "ops@acme.example",
        &spec_id,
        "",
    )
    .await;
    assert!(body.contains("certificate number 101 issued"));

    let body = create_client_record(
        &client,
        &server,
        "Globex",
        "admin@globex.example",
        &spec_id,
        "",
    )
    .await;
    assert!(body.contains("certificate number 102 issued"));

    // Both rows appear on the clients page with their numbers
    assert!(body.contains("Acme"));
    assert!(body.contains("101"));
    assert!(body.contains("Globex"));
    assert!(body.contains("102"));

    // And the counter was persisted onto the specification
    let info = server.info_json();
    let spec = &info["specifications"][0];
    assert_eq!(spec["last_certificate_number"], 102);
}

#[tokio::test]
async fn unknown_specification_is_rejected() {
    let server = TestServer::start().await;
    server.add_spec("ISO 9001", 0);
    let client = sign_in(&server).await;

    let resp = client
        .post(format!("{}/client_form", server.base_url))
        .form(&[
            ("company_name", "Acme"),
            ("email", "ops@acme.example"),
            ("specification_id", "not-a-real-id"),
            ("grant_date", ""),
        ])
        .send()
        .await
        .expect("post client form");

    assert!(resp.status().is_success());
    let body = resp.text().await.expect("read body");
    assert!(body.contains("Selected specification does not exist"));

    // Nothing was saved
    let info = server.info_json();
    assert_eq!(info["clients"].as_array().unwrap().len(), 0);
}

#[tokio::test]
async fn invalid_form_fields_redisplay_with_error() {
    let server = TestServer::start().await;
    let spec_id = server.add_spec("ISO 9001", 0);
    let client = sign_in(&server).await;

    // Bad email
    let resp = client
        .post(format!("{}/client_form", server.base_url))
        .form(&[
            ("company_name", "Acme"),
            ("email", "not-an-email"),
            ("specification_id", spec_id.as_str()),
            ("grant_date", ""),
        ])
        .send()
        .await
        .expect("post client form");
    let body = resp.text().await.expect("read body");
    assert!(body.contains("Email must contain"));

    // Bad grant date
    let resp = client
        .post(format!("{}/client_form", server.base_url))
        .form(&[
            ("company_name", "Acme"),
            ("email", "ops@acme.example"),
            ("specification_id", spec_id.as_str()),
            ("grant_date", "14-03-2025"),
        ])
        .send()
        .await
        .expect("post client form");
    let body = resp.text().await.expect("read body");
    assert!(body.contains("YYYY-MM-DD"));
}

#[tokio::test]
async fn dashboard_flags_near_expiry_clients() {
    let server = TestServer::start().await;
    let spec_id = server.add_spec("ISO 9001", 0);
    let client = sign_in(&server).await;

    let today = chrono::Utc::now().date_naive();
    let old = today.checked_sub_days(Days::new(301)).unwrap();
    let boundary = today.checked_sub_days(Days::new(300)).unwrap();
    let recent = today.checked_sub_days(Days::new(30)).unwrap();

    create_client_record(
        &client,
        &server,
        "Oldco",
        "ops@oldco.example",
        &spec_id,
        &old.format("%Y-%m-%d").to_string(),
    )
    .await;
    create_client_record(
        &client,
        &server,
        "Edgeco",
        "ops@edgeco.example",
        &spec_id,
        &boundary.format("%Y-%m-%d").to_string(),
    )
    .await;
    create_client_record(
        &client,
        &server,
        "Newco",
        "ops@newco.example",
        &spec_id,
        &recent.format("%Y-%m-%d").to_string(),
    )
    .await;

    let resp = client
        .get(format!("{}/dashboard", server.base_url))
        .send()
        .await
        .expect("get dashboard");
    let body = resp.text().await.expect("read body");

    // 301 days and exactly 300 days are flagged; 30 days is not
    assert!(body.contains("Oldco"));
    assert!(body.contains("Edgeco"));
    assert!(!body.contains("Newco"));
}

#[tokio::test]
async fn change_password_invalidates_old_credentials() {
    let server = TestServer::start().await;
    let client = sign_in(&server).await;

    let new_password = "purple-monkey-dishwasher";
    let resp = client
        .post(format!("{}/change_password", server.base_url))
        .form(&[("new_password", new_password)])
        .send()
        .await
        .expect("post change password");
    assert!(resp.url().path().ends_with("/dashboard"));
    let body = resp.text().await.expect("read body");
    assert!(body.contains("Password updated"));

    // Old password no longer authenticates
    let probe = bare_client();
    let resp = probe
        .post(format!("{}/login", server.base_url))
        .form(&[("username", ADMIN_USERNAME), ("password", ADMIN_PASSWORD)])
        .send()
        .await
        .expect("post login");
    let body = resp.text().await.expect("read body");
    assert!(body.contains("Invalid username or password"));

    // New password does
    let resp = probe
        .post(format!("{}/login", server.base_url))
        .form(&[("username", ADMIN_USERNAME), ("password", new_password)])
        .send()
        .await
        .expect("post login");
    assert_eq!(resp.status(), StatusCode::SEE_OTHER);
    assert_eq!(resp.headers()["location"].to_str().unwrap(), "/dashboard");
}

#[tokio::test]
async fn short_new_password_is_rejected() {
    let server = TestServer::start().await;
    let client = sign_in(&server).await;

    let resp = client
        .post(format!("{}/change_password", server.base_url))
        .form(&[("new_password", "short")])
        .send()
        .await
        .expect("post change password");

    assert!(resp.status().is_success());
    let body = resp.text().await.expect("read body");
    assert!(body.contains("at least 8 characters"));

    // The old password still works
    let probe = bare_client();
    let resp = probe
        .post(format!("{}/login", server.base_url))
        .form(&[("username", ADMIN_USERNAME), ("password", ADMIN_PASSWORD)])
        .send()
        .await
        .expect("post login");
    assert_eq!(resp.status(), StatusCode::SEE_OTHER);
}

#[tokio::test]
async fn export_writes_one_row_per_client() {
    let server = TestServer::start().await;
    let spec_id = server.add_spec("ISO 9001", 0);
    let client = sign_in(&server).await;

    create_client_record(&client, &server, "Acme", "a@acme.example", &spec_id, "").await;
    create_client_record(&client, &server, "Globex", "g@globex.example", &spec_id, "").await;

    let resp = client
        .get(format!("{}/export_clients", server.base_url))
        .send()
        .await
        .expect("get export");
    assert!(resp.status().is_success());
    let body = resp.text().await.expect("read body");
    assert!(body.contains("Wrote 2 client record(s)"));

    let export_dir = server.data_dir().join("exports");
    let entries: Vec<_> = std::fs::read_dir(&export_dir)
        .expect("read export dir")
        .collect::<Result<_, _>>()
        .expect("read entries");
    assert_eq!(entries.len(), 1);

    let contents = std::fs::read_to_string(entries[0].path()).expect("read csv");
    let lines: Vec<&str> = contents.lines().collect();
    assert_eq!(lines.len(), 3); // header + 2 clients
    assert!(lines.iter().any(|l| l.contains("Acme")));
    assert!(lines.iter().any(|l| l.contains("Globex")));
}

#[tokio::test]
async fn users_page_lists_staff() {
    let server = TestServer::start().await;
    let client = sign_in(&server).await;

    let resp = client
        .get(format!("{}/users", server.base_url))
        .send()
        .await
        .expect("get users");
    let body = resp.text().await.expect("read body");
    assert!(body.contains(ADMIN_USERNAME));
}
