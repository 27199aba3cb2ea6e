use crate::analyzer::VibeAnalyzer;
use std::path::PathBuf;
use tempfile::TempDir;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

// ── Image byte generators ────────────────────────────────────

/// Valid-enough PNG bytes: 8-byte magic header + padding to `size`.
pub fn make_png_bytes(size: usize) -> Vec<u8> {
    let header: Vec<u8> = vec![0x89, 0x50, 0x4E, 0x47, 0x0D, 0x0A, 0x1A, 0x0A];
    let mut bytes = header;
    bytes.resize(size.max(8), 0xAA);
    bytes
}

/// Valid-enough JPEG bytes: magic header + padding to `size`.
pub fn make_jpeg_bytes(size: usize) -> Vec<u8> {
    let header: Vec<u8> = vec![0xFF, 0xD8, 0xFF, 0xE0];
    let mut bytes = header;
    bytes.resize(size.max(4), 0xBB);
    bytes
}

// ── Frame fixtures ──────────────────────────────────────────

/// Write `count` JPEG frames into a temp dir, returning their paths in order.
pub fn write_frames(count: usize) -> (TempDir, Vec<PathBuf>) {
    let tmp = TempDir::new().expect("failed to create temp dir");
    let mut paths = Vec::with_capacity(count);
    for i in 0..count {
        let path = tmp
            .path()
            .join(format!("camera_{:03}_20260822_120000.jpg", i + 1));
        std::fs::write(&path, make_jpeg_bytes(64)).expect("failed to write frame");
        paths.push(path);
    }
    (tmp, paths)
}

// ── Mock vision API ─────────────────────────────────────────

/// Analyzer pointed at a mock server.
pub fn analyzer_for(mock: &MockServer) -> VibeAnalyzer {
    VibeAnalyzer::new(
        Some("test-key".to_string()),
        Some(format!("{}/v1", mock.uri())),
        Some("gpt-4o".to_string()),
    )
    .expect("analyzer should build when a key is present")
}

/// Completion body in the OpenAI chat shape with the given content.
pub fn completion_body(content: &str) -> serde_json::Value {
    serde_json::json!({
        "choices": [{
            "message": { "role": "assistant", "content": content },
            "finish_reason": "stop"
        }]
    })
}

/// Mount a 200 completion answering every request with `content`.
pub async fn mount_completion(mock: &MockServer, content: &str) {
    Mock::given(method("POST"))
        .and(path("/v1/chat/completions"))
        .respond_with(ResponseTemplate::new(200).set_body_json(completion_body(content)))
        .mount(mock)
        .await;
}
