use shared_finance_tracker::*;
use std::sync::{Arc, Mutex};
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::TcpListener;

struct Request {
    method: String,
    path: String,
    body: String,
}

/// Minimal one-request-per-connection HTTP server for exercising the real
/// reqwest code paths. Returns the base URL.
async fn spawn_server<F>(handler: F) -> String
where
    F: Fn(&Request) -> (u16, String) + Send + Sync + 'static,
{
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    let handler = Arc::new(handler);

    tokio::spawn(async move {
        while let Ok((mut socket, _)) = listener.accept().await {
            let handler = handler.clone();
            tokio::spawn(async move {
                let mut buf = Vec::new();
                let mut chunk = [0u8; 4096];

                let header_end = loop {
                    let n = socket.read(&mut chunk).await.unwrap_or(0);
                    if n == 0 {
                        return;
                    }
                    buf.extend_from_slice(&chunk[..n]);
                    if let Some(pos) = buf.windows(4).position(|w| w == b"\r\n\r\n") {
                        break pos + 4;
                    }
                };

                let head = String::from_utf8_lossy(&buf[..header_end]).to_string();
                let content_length = head
                    .lines()
                    .filter_map(|line| line.split_once(':'))
                    .find(|(name, _)| name.eq_ignore_ascii_case("content-length"))
                    .and_then(|(_, value)| value.trim().parse::<usize>().ok())
                    .unwrap_or(0);

                while buf.len() < header_end + content_length {
                    let n = socket.read(&mut chunk).await.unwrap_or(0);
                    if n == 0 {
                        break;
                    }
                    buf.extend_from_slice(&chunk[..n]);
                }

                let mut request_line = head.split_whitespace();
                let request = Request {
                    method: request_line.next().unwrap_or_default().to_string(),
                    path: request_line.next().unwrap_or_default().to_string(),
                    body: String::from_utf8_lossy(&buf[header_end..]).to_string(),
                };

                let (status, reply) = (*handler)(&request);
                let reason = match status {
                    200 => "OK",
                    404 => "Not Found",
                    _ => "Internal Server Error",
                };
                let response = format!(
                    "HTTP/1.1 {} {}\r\nContent-Type: application/json\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{}",
                    status,
                    reason,
                    reply.len(),
                    reply
                );
                let _ = socket.write_all(response.as_bytes()).await;
                let _ = socket.shutdown().await;
            });
        }
    });

    format!("http://{}", addr)
}

fn local_client() -> reqwest::Client {
    reqwest::Client::builder().no_proxy().build().unwrap()
}

/// A fake jsonblob endpoint holding one document.
async fn spawn_blob(initial: &str) -> (String, Arc<Mutex<String>>, Arc<Mutex<bool>>) {
    let document = Arc::new(Mutex::new(initial.to_string()));
    let reject_writes = Arc::new(Mutex::new(false));

    let doc = document.clone();
    let reject = reject_writes.clone();
    let base = spawn_server(move |req| match req.method.as_str() {
        "GET" => (200, doc.lock().unwrap().clone()),
        "PUT" if *reject.lock().unwrap() => (500, r#"{"error":"unavailable"}"#.to_string()),
        "PUT" => {
            *doc.lock().unwrap() = req.body.clone();
            (200, req.body.clone())
        }
        _ => (404, String::new()),
    })
    .await;

    (format!("{}/api/jsonBlob/1", base), document, reject_writes)
}

#[tokio::test]
async fn test_blob_store_round_trip_over_http() {
    let (url, document, _) = spawn_blob(r#"{"transactions":[],"budgets":{}}"#).await;
    let store = JsonBlobStore::with_client(local_client(), url.clone());

    let mut session = Session::connect(store).await.unwrap();
    assert_eq!(session.budgets(), &BudgetTable::seeded());

    let outcome = session
        .add_transaction(NewTransaction::new(
            "Dinner",
            45.50,
            Category::DiningOut,
            Payer::Husband,
        ))
        .await
        .unwrap();
    assert!(outcome.is_committed());

    let stored: serde_json::Value = serde_json::from_str(&document.lock().unwrap()).unwrap();
    assert_eq!(stored["transactions"][0]["description"], "Dinner");
    assert_eq!(stored["budgets"]["Dining Out"], 200.0);

    let reloaded = Session::connect(JsonBlobStore::with_client(local_client(), url))
        .await
        .unwrap();
    assert_eq!(reloaded.snapshot(), session.snapshot());
}

#[tokio::test]
async fn test_blob_store_rejected_write_rolls_back() {
    let (url, document, reject_writes) = spawn_blob(r#"{"transactions":[],"budgets":{}}"#).await;
    let mut session = Session::connect(JsonBlobStore::with_client(local_client(), url))
        .await
        .unwrap();

    *reject_writes.lock().unwrap() = true;
    let outcome = session
        .add_transaction(NewTransaction::new("Taxi", 18.0, Category::Transport, Payer::Wife))
        .await
        .unwrap();

    match outcome {
        MutationOutcome::RolledBack { error, .. } => {
            assert!(matches!(error, TrackerError::SaveFailed(_)));
            assert!(error.to_string().contains("500"));
        }
        MutationOutcome::Committed(_) => panic!("write should have been rejected"),
    }
    assert!(session.transactions().is_empty());
    assert_eq!(
        document.lock().unwrap().as_str(),
        r#"{"transactions":[],"budgets":{}}"#
    );
}

#[tokio::test]
async fn test_blob_store_non_success_on_load() {
    let base = spawn_server(|_| (404, r#"{"message":"Blob not found"}"#.to_string())).await;
    let store =
        JsonBlobStore::with_client(local_client(), format!("{}/api/jsonBlob/missing", base));

    let err = store.fetch().await.unwrap_err();
    assert!(matches!(err, TrackerError::LoadFailed(_)));
    assert!(err.to_string().contains("404"));
}

#[tokio::test]
async fn test_blob_store_unreachable() {
    let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);

    let store = JsonBlobStore::with_client(local_client(), format!("http://{}/doc", addr));
    let result = Session::connect(store).await;
    assert!(matches!(result, Err(TrackerError::LoadFailed(_))));
}

#[cfg(feature = "gemini")]
mod gemini {
    use super::*;

    fn candidate(text: &str) -> String {
        serde_json::json!({
            "candidates": [{ "content": { "role": "model", "parts": [{ "text": text }] } }]
        })
        .to_string()
    }

    async fn advisor_for(
        reply: (u16, String),
        seen: Arc<Mutex<Vec<String>>>,
    ) -> CategoryAdvisor<GeminiClassifier> {
        let base = spawn_server(move |req| {
            seen.lock()
                .unwrap()
                .push(format!("{} {}\n{}", req.method, req.path, req.body));
            reply.clone()
        })
        .await;
        let client = GeminiClient::with_client(local_client(), "test-key".to_string())
            .with_base_url(base);
        CategoryAdvisor::new(GeminiClassifier::new(client, "gemini-2.5-flash"))
    }

    #[tokio::test]
    async fn test_gemini_suggestion() {
        let seen = Arc::new(Mutex::new(Vec::new()));
        let advisor = advisor_for((200, candidate(r#"{"category":"Travel"}"#)), seen.clone()).await;

        assert_eq!(advisor.suggest("Flights to Lisbon").await, Category::Travel);

        let requests = seen.lock().unwrap();
        assert_eq!(requests.len(), 1);
        let request = &requests[0];
        assert!(request.starts_with("POST /models/gemini-2.5-flash:generateContent?key=test-key"));
        assert!(request.contains("Flights to Lisbon"));
        assert!(request.contains("\"responseMimeType\":\"application/json\""));
        assert!(request.contains("Dining Out"));
    }

    #[tokio::test]
    async fn test_gemini_unknown_category() {
        let seen = Arc::new(Mutex::new(Vec::new()));
        let advisor = advisor_for((200, candidate(r#"{"category":"Bogus"}"#)), seen).await;
        assert_eq!(advisor.suggest("Mystery box").await, Category::Other);
    }

    #[tokio::test]
    async fn test_gemini_malformed_reply() {
        let seen = Arc::new(Mutex::new(Vec::new()));
        let advisor = advisor_for((200, candidate("not json at all")), seen).await;
        assert_eq!(advisor.suggest("Mystery box").await, Category::Other);
    }

    #[tokio::test]
    async fn test_gemini_api_error() {
        let seen = Arc::new(Mutex::new(Vec::new()));
        let advisor = advisor_for(
            (500, r#"{"error":{"message":"quota"}}"#.to_string()),
            seen.clone(),
        )
        .await;
        assert_eq!(advisor.suggest("Weekly groceries").await, Category::Other);
        assert_eq!(seen.lock().unwrap().len(), 1);
    }
}
