// Drives HttpQuestionSource against a one-shot HTTP responder on localhost.

use std::io::{BufRead, BufReader, Write};
use std::net::TcpListener;
use std::thread;
use std::time::Duration;

use assert_matches::assert_matches;
use gomi_quiz::source::{HttpQuestionSource, QuestionSource};
use gomi_quiz::FetchError;

/// Serve a single response and hand back the request line that was received.
fn serve_once(status: &str, body: &str) -> (String, thread::JoinHandle<String>) {
    let listener = TcpListener::bind("127.0.0.1:0").unwrap();
    let base = format!("http://{}", listener.local_addr().unwrap());
    let response = format!(
        "HTTP/1.1 {}\r\nContent-Type: application/json\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{}",
        status,
        body.len(),
        body
    );

    let handle = thread::spawn(move || {
        let (stream, _) = listener.accept().unwrap();
        let mut reader = BufReader::new(stream);
        let mut request_line = String::new();
        reader.read_line(&mut request_line).unwrap();
        loop {
            let mut line = String::new();
            reader.read_line(&mut line).unwrap();
            if line == "\r\n" || line.is_empty() {
                break;
            }
        }
        let mut stream = reader.into_inner();
        stream.write_all(response.as_bytes()).unwrap();
        stream.flush().unwrap();
        request_line
    });

    (base, handle)
}

fn source(base: &str) -> HttpQuestionSource {
    HttpQuestionSource::new(base, Duration::from_secs(5)).unwrap()
}

#[test]
fn fetches_items_with_limit_query() {
    let body = r#"{"count":2,"items":[
        {"item":"ペットボトル","category":"資源ごみ","fullCategory":"資源ごみ(ペットボトル)","note":"キャップを外す"},
        {"item":"茶殻","category":"燃やすごみ"}
    ]}"#;
    let (base, server) = serve_once("200 OK", body);

    let items = source(&base).fetch(100).unwrap();
    let request_line = server.join().unwrap();

    assert!(request_line.starts_with("GET /api/quiz?limit=100 "));
    assert_eq!(items.len(), 2);
    assert_eq!(items[0].full(), "資源ごみ(ペットボトル)");
    assert_eq!(items[0].note.as_deref(), Some("キャップを外す"));
    assert_eq!(items[1].full(), "燃やすごみ");
}

#[test]
fn missing_items_is_empty_list() {
    let (base, server) = serve_once("200 OK", r#"{"count":0}"#);
    let items = source(&base).fetch(10).unwrap();
    server.join().unwrap();
    assert!(items.is_empty());
}

#[test]
fn non_success_status_is_error() {
    let (base, server) = serve_once("500 Internal Server Error", r#"{"error":"x"}"#);
    let err = source(&base).fetch(10).unwrap_err();
    server.join().unwrap();
    assert_matches!(err, FetchError::Status(status) if status.as_u16() == 500);
}

#[test]
fn malformed_body_is_decode_error() {
    let (base, server) = serve_once("200 OK", "not json");
    let err = source(&base).fetch(10).unwrap_err();
    server.join().unwrap();
    assert_matches!(err, FetchError::Decode(_));
}

#[test]
fn unreachable_server_is_transport_error() {
    // grab a free port, then close it again
    let port = TcpListener::bind("127.0.0.1:0")
        .unwrap()
        .local_addr()
        .unwrap()
        .port();
    let err = source(&format!("http://127.0.0.1:{port}"))
        .fetch(10)
        .unwrap_err();
    assert_matches!(err, FetchError::Transport(_));
}
