//! End-to-end dispatch tests over real sockets.

use std::fmt::Write;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use axum::http::StatusCode;
use gee::config::GeeConfig;
use gee::Engine;

mod common;

#[tokio::test]
async fn registered_get_route_is_served() {
    let engine = Engine::new();
    engine.get("/hello", |w, _| w.write_text("hello"));
    let server = common::start(engine).await;

    let res = common::client().get(server.url("/hello")).send().await.unwrap();
    assert_eq!(res.status(), 200);
    assert_eq!(res.text().await.unwrap(), "hello");

    server.stop().await;
}

#[tokio::test]
async fn wrong_method_gets_fallback() {
    let engine = Engine::new();
    engine.post("/login", |w, _| w.write_text("logged in"));
    let server = common::start(engine).await;
    let client = common::client();

    let res = client.get(server.url("/login")).send().await.unwrap();
    assert_eq!(res.status(), 200);
    assert_eq!(
        res.headers()["content-type"],
        "text/plain; charset=utf-8"
    );
    assert_eq!(res.text().await.unwrap(), "404 NOT FOUND: /login\n");

    let res = client.post(server.url("/login")).send().await.unwrap();
    assert_eq!(res.text().await.unwrap(), "logged in");

    server.stop().await;
}

#[tokio::test]
async fn empty_router_reports_url_with_query() {
    let server = common::start(Engine::new()).await;
    let client = common::client();

    let res = client.get(server.url("/anything")).send().await.unwrap();
    assert_eq!(res.text().await.unwrap(), "404 NOT FOUND: /anything\n");

    let res = client.get(server.url("/anything?x=1")).send().await.unwrap();
    assert_eq!(res.text().await.unwrap(), "404 NOT FOUND: /anything?x=1\n");

    server.stop().await;
}

#[tokio::test]
async fn second_registration_replaces_first() {
    let engine = Engine::new();
    let first_calls = Arc::new(AtomicUsize::new(0));
    let counter = Arc::clone(&first_calls);
    engine.get("/x", move |w, _| {
        counter.fetch_add(1, Ordering::SeqCst);
        w.write_text("A");
    });
    engine.get("/x", |w, _| w.write_text("B"));
    let server = common::start(engine).await;

    let res = common::client().get(server.url("/x")).send().await.unwrap();
    assert_eq!(res.text().await.unwrap(), "B");
    assert_eq!(first_calls.load(Ordering::SeqCst), 0);

    server.stop().await;
}

#[tokio::test]
async fn path_matching_is_case_sensitive() {
    let engine = Engine::new();
    engine.get("/hello", |w, _| w.write_text("hello"));
    let server = common::start(engine).await;

    let res = common::client().get(server.url("/Hello")).send().await.unwrap();
    assert_eq!(res.text().await.unwrap(), "404 NOT FOUND: /Hello\n");

    server.stop().await;
}

#[tokio::test]
async fn handler_controls_status_and_headers() {
    let engine = Engine::new();
    engine.post("/items", |w, ctx| {
        w.header_mut()
            .insert("location", "/items/1".parse().unwrap());
        w.write_header(StatusCode::CREATED);
        let _ = write!(w, "created {} bytes", ctx.body().len());
    });
    let server = common::start(engine).await;

    let res = common::client()
        .post(server.url("/items"))
        .body("abcd")
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), 201);
    assert_eq!(res.headers()["location"], "/items/1");
    assert_eq!(res.text().await.unwrap(), "created 4 bytes");

    server.stop().await;
}

#[tokio::test]
async fn form_values_reach_handler() {
    let engine = Engine::new();
    engine.post("/login", |w, ctx| {
        let user = ctx.form_value("username").unwrap_or_default();
        let _ = write!(w, "welcome {user}");
    });
    let server = common::start(engine).await;

    let res = common::client()
        .post(server.url("/login"))
        .header("content-type", "application/x-www-form-urlencoded")
        .body("username=geektutu&password=1234")
        .send()
        .await
        .unwrap();
    assert_eq!(res.text().await.unwrap(), "welcome geektutu");

    server.stop().await;
}

#[tokio::test]
async fn handler_sees_peer_address() {
    let engine = Engine::new();
    engine.get("/peer", |w, ctx| {
        let ip = ctx.remote_addr().map(|a| a.ip().to_string()).unwrap_or_default();
        w.write_text(&ip);
    });
    let server = common::start(engine).await;

    let res = common::client().get(server.url("/peer")).send().await.unwrap();
    assert_eq!(res.text().await.unwrap(), "127.0.0.1");

    server.stop().await;
}

#[tokio::test]
async fn not_found_status_is_configurable() {
    let mut config = GeeConfig::default();
    config.routing.not_found_status = 404;
    let engine = Engine::from_config(&config);
    let server = common::start_with_config(engine, config).await;

    let res = common::client().get(server.url("/missing")).send().await.unwrap();
    assert_eq!(res.status(), 404);
    assert_eq!(res.text().await.unwrap(), "404 NOT FOUND: /missing\n");

    server.stop().await;
}

#[tokio::test]
async fn routes_added_while_serving_become_visible() {
    let engine = Engine::new();
    let server = common::start(engine.clone()).await;
    let client = common::client();

    let res = client.get(server.url("/late")).send().await.unwrap();
    assert_eq!(res.text().await.unwrap(), "404 NOT FOUND: /late\n");

    engine.get("/late", |w, _| w.write_text("registered"));

    let res = client.get(server.url("/late")).send().await.unwrap();
    assert_eq!(res.text().await.unwrap(), "registered");

    server.stop().await;
}

#[tokio::test]
async fn responses_carry_request_id() {
    let engine = Engine::new();
    engine.get("/id", |w, ctx| w.write_text(ctx.request_id().unwrap_or("")));
    let server = common::start(engine).await;

    let res = common::client().get(server.url("/id")).send().await.unwrap();
    let header = res.headers()["x-request-id"].to_str().unwrap().to_string();
    let body = res.text().await.unwrap();
    assert!(!header.is_empty());
    assert_eq!(header, body);

    server.stop().await;
}

#[tokio::test]
async fn percent_encoded_paths_reach_their_routes() {
    let engine = Engine::new();
    engine.get("/hello world", |w, _| w.write_text("A"));
    engine.get("/hello", |w, _| w.write_text("B"));
    let server = common::start(engine).await;
    let client = common::client();

    let res = client.get(server.url("/hello%20world")).send().await.unwrap();
    assert_eq!(res.text().await.unwrap(), "A");

    let res = client.get(server.url("/%68ello")).send().await.unwrap();
    assert_eq!(res.text().await.unwrap(), "B");

    let res = client.get(server.url("/no%20such")).send().await.unwrap();
    assert_eq!(res.text().await.unwrap(), "404 NOT FOUND: /no%20such\n");

    server.stop().await;
}
