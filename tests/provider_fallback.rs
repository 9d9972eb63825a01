//! Adapters against a local HTTP server that answers with empty completions.

use pdfchat_lib::ai_providers::{AIProvider, ProviderFactory, FALLBACK_RESPONSE};
use pdfchat_lib::config::ProviderSettings;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::{TcpListener, TcpStream};

/// Serve `body` as a 200 JSON response to every request. Returns the base URL.
async fn serve_json(body: &'static str) -> String {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();

    tokio::spawn(async move {
        while let Ok((stream, _)) = listener.accept().await {
            tokio::spawn(respond(stream, body));
        }
    });

    format!("http://{}", addr)
}

async fn respond(mut stream: TcpStream, body: &str) {
    // Drain the request before answering so the client sees a clean close
    let mut request = Vec::new();
    let mut buf = [0u8; 4096];
    loop {
        let n = match stream.read(&mut buf).await {
            Ok(0) | Err(_) => return,
            Ok(n) => n,
        };
        request.extend_from_slice(&buf[..n]);

        if let Some(end) = find_header_end(&request) {
            let headers = String::from_utf8_lossy(&request[..end]).to_lowercase();
            let length = headers
                .lines()
                .find_map(|line| line.strip_prefix("content-length:"))
                .and_then(|v| v.trim().parse::<usize>().ok())
                .unwrap_or(0);
            if request.len() >= end + 4 + length {
                break;
            }
        }
    }

    let response = format!(
        "HTTP/1.1 200 OK\r\ncontent-type: application/json\r\ncontent-length: {}\r\n\
         connection: close\r\n\r\n{}",
        body.len(),
        body
    );
    let _ = stream.write_all(response.as_bytes()).await;
    let _ = stream.shutdown().await;
}

fn find_header_end(request: &[u8]) -> Option<usize> {
    request.windows(4).position(|w| w == b"\r\n\r\n")
}

fn settings_for(provider: AIProvider, base_url: String) -> ProviderSettings {
    let mut settings = ProviderSettings::default();
    match provider {
        AIProvider::OpenAI => settings.openai.api_base_url = Some(base_url),
        AIProvider::Anthropic => settings.anthropic.api_base_url = Some(base_url),
        AIProvider::Google => {}
    }
    settings
}

async fn ask(provider: AIProvider, api_key: &str, body: &'static str) -> String {
    let base_url = serve_json(body).await;
    let client = ProviderFactory::new(settings_for(provider, base_url))
        .create_client(provider, api_key)
        .unwrap();

    client.process_message("hi", None).await.unwrap()
}

#[tokio::test]
async fn test_openai_no_choices_returns_fallback() {
    let body = r#"{"id":"chatcmpl-1","object":"chat.completion","created":0,"model":"gpt-test",
        "choices":[]}"#;

    assert_eq!(ask(AIProvider::OpenAI, "sk-test", body).await, FALLBACK_RESPONSE);
}

#[tokio::test]
async fn test_openai_null_content_returns_fallback() {
    let body = r#"{"id":"chatcmpl-2","object":"chat.completion","created":0,"model":"gpt-test",
        "choices":[{"index":0,"message":{"role":"assistant","content":null},
        "logprobs":null,"finish_reason":"stop"}]}"#;

    assert_eq!(ask(AIProvider::OpenAI, "sk-test", body).await, FALLBACK_RESPONSE);
}

#[tokio::test]
async fn test_openai_text_is_returned() {
    let body = r#"{"id":"chatcmpl-3","object":"chat.completion","created":0,"model":"gpt-test",
        "choices":[{"index":0,"message":{"role":"assistant","content":"Hello there"},
        "logprobs":null,"finish_reason":"stop"}]}"#;

    assert_eq!(ask(AIProvider::OpenAI, "sk-test", body).await, "Hello there");
}

#[tokio::test]
async fn test_anthropic_empty_content_returns_fallback() {
    let body = r#"{"type":"message","id":"msg_1","model":"claude-test","role":"assistant",
        "content":[],"stop_reason":"end_turn","stop_sequence":null,
        "usage":{"input_tokens":3,"output_tokens":0}}"#;

    assert_eq!(ask(AIProvider::Anthropic, "sk-ant-test", body).await, FALLBACK_RESPONSE);
}
