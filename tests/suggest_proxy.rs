//! End-to-end tests for the suggestion proxy.

use std::time::Duration;

use axum::http::StatusCode;

mod common;

#[tokio::test]
async fn test_bang_json_single_chunk() {
    let (upstream, mut requests) = common::start_mock_upstream(
        "200 OK",
        "text/javascript; charset=UTF-8",
        br#"["!piz",["pizza","pizza hut"]]"#,
    )
    .await;
    let (proxy, shutdown) = common::start_proxy(common::proxy_config(upstream)).await;

    let res = common::client()
        .get(format!("http://{}/complete/search?q=!piz&client=firefox", proxy))
        .send()
        .await
        .expect("Proxy unreachable");

    assert_eq!(res.status(), StatusCode::OK);
    assert_eq!(res.headers()["content-type"], "text/javascript; charset=UTF-8");
    assert_eq!(res.headers()["x-upstream"], "mock");
    assert!(res.headers().contains_key("x-request-id"));
    assert_eq!(res.text().await.unwrap(), r#"["!piz",["!pizza","!pizza hut"]]"#);

    let request_line = requests.recv().await.unwrap();
    assert_eq!(
        request_line,
        "GET /complete/search?q=%21piz&client=firefox HTTP/1.1"
    );

    shutdown.trigger();
}

#[tokio::test]
async fn test_no_bang_is_byte_identical() {
    let body: &'static [u8] = b"[\"piz\",[\"pizza\",\"\\\"quoted\\\"\"]]";
    let (upstream, _requests) =
        common::start_mock_upstream("200 OK", "text/javascript", body).await;
    let (proxy, shutdown) = common::start_proxy(common::proxy_config(upstream)).await;

    let res = common::client()
        .get(format!("http://{}/complete/search?q=piz&client=firefox", proxy))
        .send()
        .await
        .unwrap();

    assert_eq!(res.status(), StatusCode::OK);
    assert_eq!(
        res.headers()["content-length"].to_str().unwrap(),
        body.len().to_string()
    );
    assert_eq!(&res.bytes().await.unwrap()[..], body);

    shutdown.trigger();
}

#[tokio::test]
async fn test_no_bang_xml_is_byte_identical() {
    let body: &'static [u8] = b"<toplevel><CompleteSuggestion><Text>pizza</Text></CompleteSuggestion></toplevel>";
    let (upstream, _requests) = common::start_mock_upstream("200 OK", "text/xml", body).await;
    let (proxy, shutdown) = common::start_proxy(common::proxy_config(upstream)).await;

    let res = common::client()
        .get(format!("http://{}/complete/search?q=piz&client=ie8", proxy))
        .send()
        .await
        .unwrap();

    assert_eq!(&res.bytes().await.unwrap()[..], body);

    shutdown.trigger();
}

#[tokio::test]
async fn test_bang_xml() {
    let (upstream, _requests) = common::start_mock_upstream(
        "200 OK",
        "text/xml; charset=UTF-8",
        b"<Text>pizza</Text><Text>pizza hut</Text>",
    )
    .await;
    let (proxy, shutdown) = common::start_proxy(common::proxy_config(upstream)).await;

    let res = common::client()
        .get(format!("http://{}/complete/search?q=!piz&client=ie8", proxy))
        .send()
        .await
        .unwrap();

    assert_eq!(res.status(), StatusCode::OK);
    assert!(res.headers().get("content-length").is_none());
    assert_eq!(
        res.text().await.unwrap(),
        "<Text>!pizza</Text><Text>!pizza hut</Text>"
    );

    shutdown.trigger();
}

#[tokio::test]
async fn test_bang_json_split_across_chunks() {
    let upstream = common::start_chunked_upstream(vec![
        r#"["!a",["apple","am"#,
        r#"azon","ask"],[],{"google:suggesttype":["QUERY","QUERY","QUERY"]}]"#,
    ])
    .await;
    let (proxy, shutdown) = common::start_proxy(common::proxy_config(upstream)).await;

    let res = common::client()
        .get(format!("http://{}/complete/search?q=!a&client=firefox", proxy))
        .send()
        .await
        .unwrap();

    assert_eq!(res.status(), StatusCode::OK);
    let body = res.text().await.unwrap();

    // Real suggestions are marked; extra markers elsewhere are tolerated.
    assert!(body.starts_with(r#"["!a",["!apple","!am"#), "body: {body}");
    assert!(body.contains(r#""!ask""#), "body: {body}");
    assert!(body.contains("azon"), "body: {body}");
    assert!(!body.contains("!!"), "body: {body}");

    shutdown.trigger();
}

#[tokio::test]
async fn test_upstream_connection_refused() {
    let (proxy, shutdown) = common::start_proxy(common::proxy_config(common::unused_addr())).await;

    let res = common::client()
        .get(format!("http://{}/complete/search?q=!a", proxy))
        .send()
        .await
        .unwrap();

    assert_eq!(res.status(), StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(res.headers()["content-type"], "text/plain");
    let body = res.text().await.unwrap();
    assert!(body.starts_with("Error 500: "), "body: {body}");
    assert!(body.ends_with('\n'));
    assert!(body.len() > "Error 500: \n".len());

    shutdown.trigger();
}

#[tokio::test]
async fn test_upstream_error_status_is_forwarded_and_rewritten() {
    let (upstream, _requests) = common::start_mock_upstream(
        "503 Service Unavailable",
        "text/javascript",
        br#"["!a",["again"]]"#,
    )
    .await;
    let (proxy, shutdown) = common::start_proxy(common::proxy_config(upstream)).await;

    let res = common::client()
        .get(format!("http://{}/complete/search?q=!a", proxy))
        .send()
        .await
        .unwrap();

    assert_eq!(res.status(), StatusCode::SERVICE_UNAVAILABLE);
    assert_eq!(res.text().await.unwrap(), r#"["!a",["!again"]]"#);

    shutdown.trigger();
}

#[tokio::test]
async fn test_missing_query_forwards_empty_q() {
    let (upstream, mut requests) =
        common::start_mock_upstream("200 OK", "text/javascript", br#"["",[]]"#).await;
    let (proxy, shutdown) = common::start_proxy(common::proxy_config(upstream)).await;

    let res = common::client()
        .get(format!("http://{}/complete/search", proxy))
        .send()
        .await
        .unwrap();

    assert_eq!(res.text().await.unwrap(), r#"["",[]]"#);
    assert_eq!(
        requests.recv().await.unwrap(),
        "GET /complete/search?q= HTTP/1.1"
    );

    shutdown.trigger();
}

#[tokio::test]
async fn test_connection_slot_released_after_stream() {
    let (upstream, _requests) =
        common::start_mock_upstream("200 OK", "text/javascript", br#"["!a",["a"]]"#).await;
    let mut config = common::proxy_config(upstream);
    config.upstream.max_connections = 1;
    let (proxy, shutdown) = common::start_proxy(config).await;

    let client = common::client();
    for _ in 0..3 {
        let fetch = async {
            client
                .get(format!("http://{}/complete/search?q=!a", proxy))
                .send()
                .await
                .unwrap()
                .text()
                .await
                .unwrap()
        };
        let body = tokio::time::timeout(Duration::from_secs(5), fetch)
            .await
            .expect("connection slot was not released");
        assert_eq!(body, r#"["!a",["!a"]]"#);
    }

    shutdown.trigger();
}

#[tokio::test]
async fn test_stalled_upstream_times_out_with_error_body() {
    let upstream = common::start_stalled_upstream().await;
    let mut config = common::proxy_config(upstream);
    config.upstream.response_timeout_secs = 1;
    config.timeouts.request_secs = 5;
    let (proxy, shutdown) = common::start_proxy(config).await;

    let res = common::client()
        .get(format!("http://{}/complete/search?q=!a", proxy))
        .send()
        .await
        .unwrap();

    assert_eq!(res.status(), StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(res.headers()["content-type"], "text/plain");
    assert_eq!(
        res.text().await.unwrap(),
        "Error 500: upstream did not respond within 1s\n"
    );

    shutdown.trigger();
}

#[tokio::test]
async fn test_truncated_upstream_body_aborts_client_response() {
    let upstream = common::start_truncated_upstream(r#"["!a",["apple""#).await;
    let (proxy, shutdown) = common::start_proxy(common::proxy_config(upstream)).await;

    let res = common::client()
        .get(format!("http://{}/complete/search?q=!a", proxy))
        .send()
        .await
        .unwrap();

    // Headers were already sent, so the failure surfaces as a broken body.
    assert_eq!(res.status(), StatusCode::OK);
    assert!(res.text().await.is_err());

    shutdown.trigger();
}
