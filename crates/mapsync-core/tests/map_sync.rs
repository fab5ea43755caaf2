//! End-to-end tests against a local fixture map served by axum.

use std::collections::HashMap;
use std::net::SocketAddr;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use axum::extract::Query;
use axum::http::StatusCode;
use axum::routing::get;
use axum::Router;
use chrono::{DateTime, Utc};
use mapsync_core::db::{Database, MarkerStore, SqliteMarkerStore};
use mapsync_core::{sync_markers, ErrorKind, MapClient, Marker, MarkerId, MarkerResponse};
use pretty_assertions::assert_eq;
use tokio::net::TcpListener;
use tokio_util::sync::CancellationToken;

type Hits = Arc<Mutex<Vec<String>>>;

const FILE_ANSWER: &str = r#"{"url":"http://test.local/file.jpg","filename":"IMG_1337.JPG"}"#;

fn markers_body(addr: SocketAddr) -> String {
    format!(
        r#"{{
  "markers": [
    {{
      "address": "1234 S Hi Ln, Halifax, NS, B3K 1N2, Canada",
      "category": {{"name": "Better Cycling"}},
      "created_at": "2020-05-28T15:22:40-03:00",
      "edit_link": "",
      "editable": true,
      "id": 5,
      "lat": "44.6501359",
      "lng": "-63.5900193",
      "response_url": "/responses/5.json",
      "user": {{"login": "userx"}}
    }},
    {{
      "address": "5432 South Park St, Halifax, NS, B3K 1N2, Canada",
      "category": {{"name": "Space to Move"}},
      "created_at": "2020-05-28T15:22:40-03:00",
      "editable": false,
      "id": 10,
      "lat": "44.642074",
      "lng": "-63.5801552",
      "response_url": "http://{addr}/responses/ten.json",
      "user": {{"login": "usery"}}
    }}
  ]
}}"#
    )
}

fn responses_body() -> String {
    format!(
        r#"{{
  "marker_response": [
    {{
      "answer": "  more bikes  ",
      "mode": "comment_mode",
      "question": "What change would you like to see on the street? ",
      "question_type": "EssayQuestion"
    }},
    {{
      "answer": null,
      "mode": "comment_mode",
      "question": "Anything else?",
      "question_type": "EssayQuestion"
    }},
    {{
      "answer": "   ",
      "mode": "comment_mode",
      "question": "Your email",
      "question_type": "TextQuestion"
    }},
    {{
      "answer": {FILE_ANSWER},
      "mode": "comment_mode",
      "question": "How would you like the street to look?",
      "question_type": "FileQuestion"
    }}
  ]
}}"#
    )
}

/// Serve the fixture map, recording every request path
async fn spawn_map(responses: &'static str) -> (SocketAddr, Hits) {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    let hits: Hits = Arc::default();

    let listing = markers_body(addr);
    let body = match responses {
        "fixture" => responses_body(),
        other => other.to_string(),
    };

    let router = Router::new()
        .route(
            "/the-map/markers",
            get({
                let hits = hits.clone();
                move |Query(query): Query<HashMap<String, String>>| async move {
                    hits.lock().unwrap().push("/the-map/markers".to_string());
                    if query.get("filter").map(String::as_str) == Some("other_users") {
                        (StatusCode::OK, listing)
                    } else {
                        (StatusCode::NOT_FOUND, String::new())
                    }
                }
            }),
        )
        .route(
            "/responses/5.json",
            get({
                let hits = hits.clone();
                move || async move {
                    hits.lock().unwrap().push("/responses/5.json".to_string());
                    body
                }
            }),
        )
        .route(
            "/responses/ten.json",
            get({
                let hits = hits.clone();
                move || async move {
                    hits.lock().unwrap().push("/responses/ten.json".to_string());
                    r#"{"marker_response": []}"#
                }
            }),
        );

    tokio::spawn(async move {
        axum::serve(listener, router).await.unwrap();
    });

    (addr, hits)
}

fn hits_for(hits: &Hits, path: &str) -> usize {
    hits.lock().unwrap().iter().filter(|hit| *hit == path).count()
}

#[tokio::test]
async fn lists_markers_with_resolved_urls() {
    let (addr, _hits) = spawn_map("fixture").await;
    let client = MapClient::new(&format!("http://{addr}/the-map")).unwrap();

    let markers = client
        .list_markers(&CancellationToken::new())
        .await
        .unwrap();

    let created_at = "2020-05-28T18:22:40Z".parse::<DateTime<Utc>>().unwrap();
    let want = vec![
        Marker {
            id: MarkerId(5),
            user: "userx".to_string(),
            created_at,
            address: "1234 S Hi Ln, Halifax, NS, B3K 1N2, Canada".to_string(),
            category: "Better Cycling".to_string(),
            latitude: "44.6501359".to_string(),
            longitude: "-63.5900193".to_string(),
            url: format!("http://{addr}/the-map/#marker-5"),
            response_url: format!("http://{addr}/responses/5.json"),
            editable: true,
            responses: Vec::new(),
        },
        Marker {
            id: MarkerId(10),
            user: "usery".to_string(),
            created_at,
            address: "5432 South Park St, Halifax, NS, B3K 1N2, Canada".to_string(),
            category: "Space to Move".to_string(),
            latitude: "44.642074".to_string(),
            longitude: "-63.5801552".to_string(),
            url: format!("http://{addr}/the-map/#marker-10"),
            response_url: format!("http://{addr}/responses/ten.json"),
            editable: false,
            responses: Vec::new(),
        },
    ];
    assert_eq!(markers, want);

    for marker in &markers {
        assert_eq!(
            marker.url,
            format!("{}#marker-{}", client.base_url(), marker.id)
        );
    }
}

#[tokio::test]
async fn fills_normalized_responses() {
    let (addr, _hits) = spawn_map("fixture").await;
    let client = MapClient::new(&format!("http://{addr}/the-map")).unwrap();
    let mut marker = client
        .list_markers(&CancellationToken::new())
        .await
        .unwrap()
        .remove(0);

    client
        .fill_responses(&mut marker, &CancellationToken::new())
        .await
        .unwrap();

    assert_eq!(
        marker.responses,
        vec![
            MarkerResponse {
                mode: "comment_mode".to_string(),
                question_type: "EssayQuestion".to_string(),
                question: "What change would you like to see on the street?".to_string(),
                answer: b"more bikes".to_vec(),
            },
            MarkerResponse {
                mode: "comment_mode".to_string(),
                question_type: "FileQuestion".to_string(),
                question: "How would you like the street to look?".to_string(),
                answer: FILE_ANSWER.as_bytes().to_vec(),
            },
        ]
    );
}

#[tokio::test]
async fn sync_skips_finalized_markers_without_fetching() {
    let (addr, hits) = spawn_map("fixture").await;
    let client = MapClient::new(&format!("http://{addr}/the-map")).unwrap();
    let db = Database::open_in_memory().unwrap();
    let store = SqliteMarkerStore::new(db.connection());

    // Marker 10 is already stored as finalized
    let mut finalized = client
        .list_markers(&CancellationToken::new())
        .await
        .unwrap()
        .remove(1);
    finalized.address = "Stored before this run".to_string();
    store.sync_marker(&finalized).unwrap();

    let report = sync_markers(&store, &client, &CancellationToken::new())
        .await
        .unwrap();

    assert_eq!(report.synced, vec![MarkerId(5)]);
    assert_eq!(report.skipped, vec![MarkerId(10)]);
    assert_eq!(hits_for(&hits, "/responses/ten.json"), 0);
    assert_eq!(hits_for(&hits, "/responses/5.json"), 1);

    let stored = store.list_markers().unwrap();
    assert_eq!(stored.len(), 2);
    assert_eq!(stored[0].responses[0].answer, b"more bikes".to_vec());
    assert_eq!(stored[0].responses.len(), 2);
    assert_eq!(stored[1].address, "Stored before this run");
}

#[tokio::test]
async fn sync_refetches_editable_markers_every_run() {
    let (addr, hits) = spawn_map("fixture").await;
    let client = MapClient::new(&format!("http://{addr}/the-map")).unwrap();
    let tmp = tempfile::tempdir().unwrap();
    let db = Database::open(tmp.path().join("data.db")).unwrap();
    let store = SqliteMarkerStore::new(db.connection());

    sync_markers(&store, &client, &CancellationToken::new())
        .await
        .unwrap();
    let first = store.list_markers().unwrap();
    sync_markers(&store, &client, &CancellationToken::new())
        .await
        .unwrap();

    // 5 stays editable and is fetched twice; 10 was stored finalized on the first run
    assert_eq!(hits_for(&hits, "/responses/5.json"), 2);
    assert_eq!(hits_for(&hits, "/responses/ten.json"), 1);
    assert_eq!(store.list_markers().unwrap(), first);
}

#[tokio::test]
async fn malformed_responses_abort_with_decode_error() {
    let (addr, _hits) = spawn_map(r#"{"marker_response": [{"answer": 42, "question_type": "EssayQuestion"}]}"#).await;
    let client = MapClient::new(&format!("http://{addr}/the-map")).unwrap();
    let db = Database::open_in_memory().unwrap();
    let store = SqliteMarkerStore::new(db.connection());

    let err = sync_markers(&store, &client, &CancellationToken::new())
        .await
        .unwrap_err();

    assert_eq!(err.kind(), ErrorKind::Decode);
    assert_eq!(err.marker_id(), Some(MarkerId(5)));
    assert!(store.list_markers().unwrap().is_empty());
}

#[tokio::test]
async fn bad_status_is_a_transport_error() {
    let (addr, _hits) = spawn_map("fixture").await;
    let client = MapClient::new(&format!("http://{addr}/another-map")).unwrap();

    let err = client
        .list_markers(&CancellationToken::new())
        .await
        .unwrap_err();

    assert_eq!(err.kind(), ErrorKind::Transport);
    assert!(err.to_string().contains("404"), "{err}");
}

#[tokio::test]
async fn cancellation_aborts_in_flight_request() {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    let router = Router::new().route(
        "/slow-map/markers",
        get(|| async {
            tokio::time::sleep(Duration::from_secs(30)).await;
            r#"{"markers": []}"#
        }),
    );
    tokio::spawn(async move {
        axum::serve(listener, router).await.unwrap();
    });

    let client = MapClient::new(&format!("http://{addr}/slow-map")).unwrap();
    let cancel = CancellationToken::new();
    let trigger = cancel.clone();
    tokio::spawn(async move {
        tokio::time::sleep(Duration::from_millis(50)).await;
        trigger.cancel();
    });

    let err = client.list_markers(&cancel).await.unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Cancelled);
}
