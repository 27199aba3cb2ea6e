use super::helpers::{analyzer_for, make_png_bytes, mount_completion, write_frames};
use crate::analyzer::client::{Message, MessageContent};

// ── Multimodal Payload Structure ────────────────────────────

#[test]
fn test_multimodal_payload_structure() {
    let content = MessageContent::with_images(
        "Is this person vibing?".to_string(),
        vec!["data:image/jpeg;base64,AAAA".to_string()],
    );

    let msg = Message::user(content);

    let json = serde_json::to_value(&msg).unwrap();
    let content_arr = json["content"].as_array().unwrap();

    assert_eq!(content_arr.len(), 2, "should have text + 1 image part");
    assert_eq!(content_arr[0]["type"], "text");
    assert_eq!(content_arr[0]["text"], "Is this person vibing?");
    assert_eq!(content_arr[1]["type"], "image_url");
    assert!(content_arr[1]["image_url"]["url"]
        .as_str()
        .unwrap()
        .starts_with("data:image/jpeg;base64,"));
}

#[test]
fn test_multimodal_with_multiple_images() {
    let content = MessageContent::with_images(
        "Compare these frames".to_string(),
        vec![
            "data:image/jpeg;base64,AAAA".to_string(),
            "data:image/jpeg;base64,BBBB".to_string(),
            "data:image/jpeg;base64,CCCC".to_string(),
        ],
    );

    let json = serde_json::to_value(&content).unwrap();
    let parts = json.as_array().unwrap();
    assert_eq!(parts.len(), 4, "text + 3 images");

    for part in &parts[1..] {
        assert_eq!(part["type"], "image_url");
        assert!(part["image_url"]["url"].is_string());
    }
}

// ── Wire-level request shape ────────────────────────────────

#[tokio::test]
async fn test_temporal_request_carries_data_urls() {
    let mock = wiremock::MockServer::start().await;
    mount_completion(&mock, "VIBING: NO\nCONFIDENCE: 10").await;
    let (_tmp, paths) = write_frames(2);
    let analyzer = analyzer_for(&mock);

    analyzer.analyze_temporal(&paths).await.unwrap();

    let requests = mock.received_requests().await.unwrap();
    assert_eq!(requests.len(), 1);

    let body: serde_json::Value = serde_json::from_slice(&requests[0].body).unwrap();
    assert_eq!(body["model"], "gpt-4o");
    assert_eq!(body["max_tokens"], 2048);
    assert_eq!(body["messages"][0]["role"], "user");

    let parts = body["messages"][0]["content"].as_array().unwrap();
    assert_eq!(parts.len(), 3, "text + 2 frames");
    assert_eq!(parts[0]["type"], "text");
    assert!(parts[0]["text"]
        .as_str()
        .unwrap()
        .contains("sequence of 2 images"));
    for part in &parts[1..] {
        assert!(part["image_url"]["url"]
            .as_str()
            .unwrap()
            .starts_with("data:image/jpeg;base64,"));
    }
}

#[tokio::test]
async fn test_png_frames_get_png_media_type() {
    let mock = wiremock::MockServer::start().await;
    mount_completion(&mock, "VIBING: NO\nCONFIDENCE: 10").await;
    let tmp = tempfile::tempdir().unwrap();
    let path = tmp.path().join("screenshot_001_20260822_120000.png");
    std::fs::write(&path, make_png_bytes(64)).unwrap();
    let analyzer = analyzer_for(&mock);

    analyzer.analyze_image(&path).await.unwrap();

    let requests = mock.received_requests().await.unwrap();
    let body: serde_json::Value = serde_json::from_slice(&requests[0].body).unwrap();
    assert_eq!(body["max_tokens"], 1024);

    let parts = body["messages"][0]["content"].as_array().unwrap();
    assert!(parts[1]["image_url"]["url"]
        .as_str()
        .unwrap()
        .starts_with("data:image/png;base64,"));
}
