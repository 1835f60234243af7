//! End-to-end tests of the proxy pipeline against mock upstreams.

mod common;

use std::net::SocketAddr;

use tokio::net::TcpListener;

use mirrorgate::config::ProxyConfig;
use mirrorgate::http::HttpServer;

use common::{http_response, start_mock_upstream, start_path_aware_upstream};

/// Spawn the proxy on an ephemeral port and return its address.
async fn spawn_proxy() -> SocketAddr {
    let mut config = ProxyConfig::default();
    config.observability.metrics_enabled = false;

    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    let router = HttpServer::new(config).unwrap().router();
    tokio::spawn(async move {
        axum::serve(listener, router).await.unwrap();
    });
    addr
}

/// Test client that never follows redirects; redirect handling is exactly
/// what is under test.
fn client() -> reqwest::Client {
    reqwest::Client::builder()
        .redirect(reqwest::redirect::Policy::none())
        .build()
        .unwrap()
}

#[tokio::test]
async fn home_page_served_at_root() {
    let proxy = spawn_proxy().await;
    let res = client()
        .get(format!("http://{proxy}/"))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), 200);
    let body = res.text().await.unwrap();
    assert!(body.contains("Enter a URL"));
}

#[tokio::test]
async fn shortcut_redirects_into_path_encoding_scheme() {
    let proxy = spawn_proxy().await;
    let res = client()
        .get(format!("http://{proxy}/gh"))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), 302);
    assert_eq!(
        res.headers()["location"],
        format!("http://{proxy}/https://github.com").as_str(),
    );
}

#[tokio::test]
async fn html_links_rewritten_across_all_three_shapes() {
    let html = r#"<a href="https://a.b/c?d=1">x</a><img src="/i.png"><script src="//cdn.b/c.js"></script>"#;
    let response: &'static str = Box::leak(
        http_response("200 OK", "Content-Type: text/html; charset=utf-8\r\n", html).into_boxed_str(),
    );
    let upstream = start_mock_upstream(response).await;
    let proxy = spawn_proxy().await;

    let res = client()
        .get(format!("http://{proxy}/http://{upstream}/page"))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), 200);
    assert_eq!(res.headers()["access-control-allow-origin"], "*");

    let body = res.text().await.unwrap();
    assert!(body.contains(&format!(r#"href="http://{proxy}/https://a.b/c?d=1""#)));
    assert!(body.contains(&format!(r#"src="http://{proxy}/http://{upstream}/i.png""#)));
    assert!(body.contains(&format!(r#"src="http://{proxy}/https://cdn.b/c.js""#)));
}

#[tokio::test]
async fn non_html_body_passes_through_byte_identical() {
    let payload = r#"binary-ish payload with href="/x" inside"#;
    let response: &'static str = Box::leak(
        http_response("200 OK", "Content-Type: image/png\r\n", payload).into_boxed_str(),
    );
    let upstream = start_mock_upstream(response).await;
    let proxy = spawn_proxy().await;

    let res = client()
        .get(format!("http://{proxy}/http://{upstream}/pic.png"))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), 200);
    assert_eq!(res.text().await.unwrap(), payload);
}

#[tokio::test]
async fn redirect_location_rewritten_not_followed() {
    let response: &'static str = Box::leak(
        http_response("302 Found", "Location: /login\r\n", "").into_boxed_str(),
    );
    let upstream = start_mock_upstream(response).await;
    let proxy = spawn_proxy().await;

    let res = client()
        .get(format!("http://{proxy}/http://{upstream}/account"))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), 302);
    assert_eq!(
        res.headers()["location"],
        format!("http://{proxy}/http://{upstream}/login").as_str(),
    );
}

#[tokio::test]
async fn set_cookie_domain_scoped_to_proxy() {
    let response: &'static str = Box::leak(
        http_response("200 OK", "Set-Cookie: id=1; Domain=a.b; Path=/\r\n", "ok").into_boxed_str(),
    );
    let upstream = start_mock_upstream(response).await;
    let proxy = spawn_proxy().await;

    let res = client()
        .get(format!("http://{proxy}/http://{upstream}/"))
        .send()
        .await
        .unwrap();
    assert_eq!(res.headers()["set-cookie"], "id=1; Path=/");
}

#[tokio::test]
async fn referer_repair_recovers_asset_target() {
    let upstream = start_path_aware_upstream(|path| {
        http_response(
            "200 OK",
            "Content-Type: text/css\r\n",
            &format!("path={path}"),
        )
    })
    .await;
    let proxy = spawn_proxy().await;

    let res = client()
        .get(format!("http://{proxy}/styles.css"))
        .header("referer", format!("http://{proxy}/http://{upstream}/page"))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), 200);
    assert_eq!(res.text().await.unwrap(), "path=/styles.css");
}

#[tokio::test]
async fn invalid_target_yields_400() {
    let proxy = spawn_proxy().await;
    let res = client()
        .get(format!("http://{proxy}/http://bad%20url"))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), 400);
    assert!(res.text().await.unwrap().contains("invalid target"));
}

#[tokio::test]
async fn unresolvable_path_falls_back_to_home() {
    let proxy = spawn_proxy().await;
    let res = client()
        .get(format!("http://{proxy}/not-a-url"))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), 200);
    assert!(res.text().await.unwrap().contains("Enter a URL"));
}

#[tokio::test]
async fn upstream_failure_yields_500() {
    let proxy = spawn_proxy().await;
    // Port 9 (discard) is near-certain to refuse the connection.
    let res = client()
        .get(format!("http://{proxy}/http://127.0.0.1:9/"))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), 500);
    assert!(res.text().await.unwrap().contains("upstream request failed"));
}

#[tokio::test]
async fn truncated_html_body_yields_500() {
    // Upstream promises more bytes than it sends, then closes; the buffered
    // HTML read fails after the headers already arrived.
    let response: &'static str = "HTTP/1.1 200 OK\r\nContent-Length: 4096\r\n\
         Content-Type: text/html\r\nConnection: close\r\n\r\n<html>partial";
    let upstream = start_mock_upstream(response).await;
    let proxy = spawn_proxy().await;

    let res = client()
        .get(format!("http://{proxy}/http://{upstream}/page"))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), 500);
    assert!(res.text().await.unwrap().contains("upstream request failed"));
}

#[tokio::test]
async fn upstream_status_passes_through() {
    let response: &'static str = Box::leak(
        http_response("404 Not Found", "Content-Type: text/plain\r\n", "nope").into_boxed_str(),
    );
    let upstream = start_mock_upstream(response).await;
    let proxy = spawn_proxy().await;

    let res = client()
        .get(format!("http://{proxy}/http://{upstream}/missing"))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), 404);
    assert_eq!(res.text().await.unwrap(), "nope");
}
