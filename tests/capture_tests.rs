//! Integration tests for the capture job

use std::sync::Once;
use std::time::Duration;

use pageshot::{CaptureConfig, Error, Viewport};
use tiny_http::{Response, Server};

static INIT: Once = Once::new();

/// Start a simple test HTTP server
fn start_test_server() -> String {
    INIT.call_once(|| {
        std::thread::spawn(|| {
            let server = Server::http("127.0.0.1:18090").unwrap();
            for request in server.incoming_requests() {
                let path = request.url().to_string();
                let response = match path.as_str() {
                    "/" => Response::from_string(
                        r#"<!DOCTYPE html>
<html>
<head><title>Capture Target</title></head>
<body>
<h1>Hello from the test server</h1>
<p>A small static page with no subresources.</p>
</body>
</html>"#,
                    )
                    .with_header(
                        "Content-Type: text/html; charset=utf-8"
                            .parse::<tiny_http::Header>()
                            .unwrap(),
                    ),
                    "/tall" => Response::from_string(
                        r#"<!DOCTYPE html>
<html>
<head><title>Tall Page</title></head>
<body style="margin:0">
<div style="width:100%;height:2600px;background:linear-gradient(#fff,#000)"></div>
</body>
</html>"#,
                    )
                    .with_header(
                        "Content-Type: text/html; charset=utf-8"
                            .parse::<tiny_http::Header>()
                            .unwrap(),
                    ),
                    _ => Response::from_string("Not Found").with_status_code(404),
                };
                let _ = request.respond(response);
            }
        });
        // Give the server time to start
        std::thread::sleep(Duration::from_millis(100));
    });

    "http://127.0.0.1:18090".to_string()
}

/// Read the pixel dimensions out of a PNG's IHDR chunk
fn png_dimensions(data: &[u8]) -> (u32, u32) {
    assert!(data.len() > 24, "PNG data seems too small");
    // PNG files start with these magic bytes
    assert_eq!(&data[0..8], b"\x89PNG\r\n\x1a\n");
    let width = u32::from_be_bytes([data[16], data[17], data[18], data[19]]);
    let height = u32::from_be_bytes([data[20], data[21], data[22], data[23]]);
    (width, height)
}

#[test]
fn test_invalid_url_fails_fast_without_output() {
    let dir = tempfile::tempdir().unwrap();
    let output = dir.path().join("never.png");

    let config = CaptureConfig {
        target_url: "not a url".to_string(),
        output_path: output.clone(),
        ..Default::default()
    };

    let err = pageshot::capture(&config).unwrap_err();
    assert!(matches!(err, Error::Config(_)), "got: {:?}", err);
    assert!(!output.exists(), "no file may be written for an invalid config");
}

#[test]
fn test_zero_viewport_fails_fast() {
    let config = CaptureConfig {
        target_url: "https://example.com".to_string(),
        viewport: Viewport { width: 1280, height: 0 },
        ..Default::default()
    };
    assert!(matches!(pageshot::capture(&config), Err(Error::Config(_))));
}

#[test]
#[ignore] // Requires Chrome to be installed
fn test_capture_writes_valid_png() {
    let base_url = start_test_server();
    let dir = tempfile::tempdir().unwrap();
    let output = dir.path().join("shot.png");

    let config = CaptureConfig {
        target_url: base_url,
        output_path: output.clone(),
        viewport: Viewport { width: 1280, height: 720 },
        timeout_ms: 30_000,
        ..Default::default()
    };

    let shot = pageshot::capture(&config).expect("capture should succeed");

    assert_eq!(shot.path, output);
    assert!(output.exists());
    let data = std::fs::read(&output).unwrap();
    assert!(!data.is_empty());
    assert_eq!(shot.size_bytes, data.len() as u64);

    let (width, height) = png_dimensions(&data);
    assert_eq!(width, 1280, "capture width must equal the viewport width");
    assert!(height >= 720, "full-page capture never shrinks below the viewport");
}

#[test]
#[ignore] // Requires Chrome to be installed
fn test_full_page_capture_grows_height() {
    let base_url = start_test_server();
    let dir = tempfile::tempdir().unwrap();
    let output = dir.path().join("tall.png");

    let config = CaptureConfig {
        target_url: format!("{}/tall", base_url),
        output_path: output.clone(),
        viewport: Viewport { width: 1280, height: 720 },
        timeout_ms: 30_000,
        ..Default::default()
    };

    pageshot::capture(&config).expect("capture should succeed");

    let data = std::fs::read(&output).unwrap();
    let (width, height) = png_dimensions(&data);
    assert_eq!(width, 1280);
    assert!(
        height >= 2000,
        "expected the full 2600px document, got {}px",
        height
    );
}

#[test]
#[ignore] // Requires Chrome to be installed
fn test_output_directory_is_created_and_overwritten() {
    let base_url = start_test_server();
    let dir = tempfile::tempdir().unwrap();
    // Parent directories do not exist yet
    let output = dir.path().join("a").join("b").join("shot.png");

    let config = CaptureConfig {
        target_url: base_url,
        output_path: output.clone(),
        viewport: Viewport { width: 800, height: 600 },
        timeout_ms: 30_000,
        ..Default::default()
    };

    let first = pageshot::capture(&config).expect("first capture should succeed");
    assert!(output.exists());
    let first_mtime = std::fs::metadata(&output).unwrap().modified().unwrap();

    std::thread::sleep(Duration::from_millis(50));

    // Second run is idempotent on the directory and overwrites the file
    let second = pageshot::capture(&config).expect("second capture should succeed");
    let second_mtime = std::fs::metadata(&output).unwrap().modified().unwrap();

    assert!(second_mtime >= first_mtime);
    assert!(first.size_bytes > 0 && second.size_bytes > 0);
}

#[test]
#[ignore] // Requires Chrome to be installed
fn test_stalled_navigation_times_out() {
    // Dedicated server whose only route never answers within the budget
    std::thread::spawn(|| {
        let server = Server::http("127.0.0.1:18091").unwrap();
        for request in server.incoming_requests() {
            std::thread::sleep(Duration::from_secs(20));
            let _ = request.respond(Response::from_string("too late"));
        }
    });
    std::thread::sleep(Duration::from_millis(100));

    let dir = tempfile::tempdir().unwrap();
    let config = CaptureConfig {
        target_url: "http://127.0.0.1:18091/".to_string(),
        output_path: dir.path().join("late.png"),
        viewport: Viewport { width: 800, height: 600 },
        timeout_ms: 2_000,
        ..Default::default()
    };

    let err = pageshot::capture(&config).unwrap_err();
    assert!(err.is_timeout(), "got: {:?}", err);
    match err {
        Error::NavigationTimeout { url, elapsed_ms, timeout_ms } => {
            assert!(url.contains("127.0.0.1:18091"));
            assert!(elapsed_ms >= 1_500, "elapsed was {}ms", elapsed_ms);
            assert_eq!(timeout_ms, 2_000);
        }
        other => panic!("expected NavigationTimeout, got {:?}", other),
    }
    assert!(!dir.path().join("late.png").exists());
}

#[tokio::test]
#[ignore] // Requires Chrome to be installed
async fn test_async_facade_capture() {
    let base_url = start_test_server();
    let dir = tempfile::tempdir().unwrap();
    let output = dir.path().join("async.png");

    let config = CaptureConfig {
        target_url: base_url,
        output_path: output.clone(),
        viewport: Viewport { width: 1024, height: 768 },
        timeout_ms: 30_000,
        ..Default::default()
    };

    let shot = pageshot::async_api::capture(config)
        .await
        .expect("async capture should succeed");

    assert!(output.exists());
    assert!(shot.size_bytes > 0);
}

#[tokio::test]
async fn test_async_facade_propagates_config_error() {
    let config = CaptureConfig {
        target_url: "definitely not a url".to_string(),
        ..Default::default()
    };
    let err = pageshot::async_api::capture(config).await.unwrap_err();
    assert!(matches!(err, Error::Config(_)));
}
