use research_mate::http::HttpTransport;
use research_mate_core::models::SearchResult;
use research_mate_core::transport::{
    exchange, MutationReply, Request, SessionSnapshot, Transport, TransportError, UploadFile,
};
use serde_json::json;
use wiremock::matchers::{body_json, body_string_contains, header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

async fn transport(server: &MockServer) -> HttpTransport {
    HttpTransport::new(&server.uri(), None).unwrap()
}

// ─── Encoding ───

#[tokio::test]
async fn test_session_data_is_a_get() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/session_data"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "uploaded_files": [{"filename": "a.pdf", "source": "upload", "vector_folder": "a"}]
        })))
        .expect(1)
        .mount(&server)
        .await;

    let t = transport(&server).await;
    let snapshot: SessionSnapshot = exchange(&t, Request::SessionData).await.unwrap();
    let files = snapshot.uploaded_files.unwrap();
    assert_eq!(files[0].filename.as_deref(), Some("a.pdf"));
}

#[tokio::test]
async fn test_ask_posts_json_question() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/ask"))
        .and(body_json(json!({"question": "What is X?"})))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"answer": "X is Y."})))
        .expect(1)
        .mount(&server)
        .await;

    let reply = transport(&server)
        .await
        .call(Request::Ask {
            question: "What is X?".to_string(),
        })
        .await
        .unwrap();
    assert_eq!(reply["answer"], "X is Y.");
}

#[tokio::test]
async fn test_delete_posts_form_field() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/delete_pdf"))
        .and(header("content-type", "application/x-www-form-urlencoded"))
        .and(body_string_contains("filepath=scholar_0a1b2c3d.pdf"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"success": true})))
        .expect(1)
        .mount(&server)
        .await;

    let t = transport(&server).await;
    let reply: MutationReply = exchange(
        &t,
        Request::DeleteDocument {
            filename: "scholar_0a1b2c3d.pdf".to_string(),
        },
    )
    .await
    .unwrap();
    assert!(reply.success);
}

#[tokio::test]
async fn test_upload_sends_files_field() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/upload"))
        .and(body_string_contains("name=\"files[]\""))
        .and(body_string_contains("filename=\"paper.pdf\""))
        .and(body_string_contains("%PDF-1.4"))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(json!({"filenames": ["uploads/paper.pdf"]})),
        )
        .expect(1)
        .mount(&server)
        .await;

    let reply = transport(&server)
        .await
        .call(Request::Upload {
            files: vec![UploadFile::pdf("paper.pdf", b"%PDF-1.4 body".to_vec())],
        })
        .await
        .unwrap();
    assert_eq!(reply, json!({"filenames": ["uploads/paper.pdf"]}));
}

#[tokio::test]
async fn test_add_paper_sends_full_result() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/add_scholar_paper"))
        .and(body_json(json!({
            "title": "Attention Is All You Need",
            "link": "https://arxiv.org/pdf/1706.03762.pdf",
            "publication_info": "NeurIPS 2017",
            "snippet": null
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"success": true})))
        .expect(1)
        .mount(&server)
        .await;

    transport(&server)
        .await
        .call(Request::AddPaper {
            paper: SearchResult {
                title: "Attention Is All You Need".to_string(),
                link: "https://arxiv.org/pdf/1706.03762.pdf".to_string(),
                publication_info: Some("NeurIPS 2017".to_string()),
                snippet: None,
            },
        })
        .await
        .unwrap();
}

#[tokio::test]
async fn test_base_path_is_preserved() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/mate/search_scholar"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"papers": []})))
        .expect(1)
        .mount(&server)
        .await;

    let t = HttpTransport::new(&format!("{}/mate", server.uri()), None).unwrap();
    t.call(Request::SearchPapers {
        query: "q".to_string(),
    })
    .await
    .unwrap();
}

// ─── Replies ───

#[tokio::test]
async fn test_error_status_body_is_still_parsed() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/delete_pdf"))
        .respond_with(ResponseTemplate::new(404).set_body_json(json!({
            "success": false,
            "error": "File not found in session"
        })))
        .mount(&server)
        .await;

    let t = transport(&server).await;
    let reply: MutationReply = exchange(
        &t,
        Request::DeleteDocument {
            filename: "gone.pdf".to_string(),
        },
    )
    .await
    .unwrap();
    assert!(!reply.success);
    assert_eq!(reply.error.as_deref(), Some("File not found in session"));
}

#[tokio::test]
async fn test_non_json_body_is_decode_error() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/ask"))
        .respond_with(ResponseTemplate::new(500).set_body_string("<html>Internal Server Error</html>"))
        .mount(&server)
        .await;

    let err = transport(&server)
        .await
        .call(Request::Ask {
            question: "q".to_string(),
        })
        .await
        .unwrap_err();
    assert!(matches!(err, TransportError::Decode(_)));
    assert!(err.message().contains("/ask"));
}

#[tokio::test]
async fn test_unreachable_backend_is_network_error() {
    // Grab a free port, then release it so nothing is listening there.
    let port = std::net::TcpListener::bind("127.0.0.1:0")
        .unwrap()
        .local_addr()
        .unwrap()
        .port();

    let t = HttpTransport::new(&format!("http://127.0.0.1:{}", port), None).unwrap();
    let err = t.call(Request::SessionData).await.unwrap_err();
    assert!(matches!(err, TransportError::Network(_)));
}

#[tokio::test]
async fn test_session_cookie_is_kept() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/session_data"))
        .and(header("cookie", "session=abc123"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"uploaded_files": []})))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/upload"))
        .respond_with(
            ResponseTemplate::new(200)
                .insert_header("set-cookie", "session=abc123; Path=/")
                .set_body_json(json!({"filenames": []})),
        )
        .mount(&server)
        .await;

    let t = transport(&server).await;
    t.call(Request::Upload {
        files: vec![UploadFile::pdf("a.pdf", Vec::new())],
    })
    .await
    .unwrap();
    let reply = t.call(Request::SessionData).await.unwrap();
    assert_eq!(reply, json!({"uploaded_files": []}));
}
