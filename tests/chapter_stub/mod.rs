use std::collections::HashMap;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::mpsc;
use std::thread;
use std::time::Duration;

/// Serves `GET /videos?part=chapters&id=<id>` the way the chapter metadata
/// service does, from a fixed table of chapter titles.
pub struct ChapterStub {
    pub base_url: String,
    requests: Arc<AtomicUsize>,
    shutdown_tx: Option<mpsc::Sender<()>>,
    handle: Option<thread::JoinHandle<()>>,
}

impl ChapterStub {
    pub fn spawn(videos: &[(&str, &[&str])]) -> Self {
        let videos: HashMap<String, Vec<String>> = videos
            .iter()
            .map(|(id, titles)| {
                (
                    (*id).to_owned(),
                    titles.iter().map(|t| (*t).to_owned()).collect(),
                )
            })
            .collect();

        let server = tiny_http::Server::http("127.0.0.1:0").expect("start chapter stub server");
        let addr = server.server_addr();
        let base_url = format!("http://{addr}");

        let requests = Arc::new(AtomicUsize::new(0));
        let counter = Arc::clone(&requests);
        let (shutdown_tx, shutdown_rx) = mpsc::channel::<()>();

        let handle = thread::spawn(move || {
            loop {
                if shutdown_rx.try_recv().is_ok() {
                    break;
                }

                let request = match server.recv_timeout(Duration::from_millis(50)) {
                    Ok(Some(req)) => req,
                    Ok(None) => continue,
                    Err(_) => break,
                };
                counter.fetch_add(1, Ordering::SeqCst);

                let url = url::Url::parse(&format!("http://stub{}", request.url()))
                    .expect("parse request url");
                let part = query_value(&url, "part");
                let id = query_value(&url, "id");

                if url.path() != "/videos" || part.as_deref() != Some("chapters") {
                    let _ = request.respond(
                        tiny_http::Response::from_string("not found").with_status_code(404),
                    );
                    continue;
                }

                let Some(titles) = id.as_ref().and_then(|id| videos.get(id)) else {
                    let body = serde_json::json!({ "kind": "youtube#videoListResponse", "items": [] });
                    let _ = request.respond(json_response(body));
                    continue;
                };

                let chapters = titles
                    .iter()
                    .enumerate()
                    .map(|(idx, title)| {
                        serde_json::json!({
                            "title": title,
                            "time": idx * 60,
                            "thumbnails": [],
                        })
                    })
                    .collect::<Vec<_>>();
                let body = serde_json::json!({
                    "kind": "youtube#videoListResponse",
                    "items": [{
                        "kind": "youtube#video",
                        "id": id,
                        "chapters": {
                            "areAutoGenerated": false,
                            "chapters": chapters,
                        },
                    }],
                });
                let _ = request.respond(json_response(body));
            }
        });

        Self {
            base_url,
            requests,
            shutdown_tx: Some(shutdown_tx),
            handle: Some(handle),
        }
    }

    #[allow(dead_code)]
    pub fn request_count(&self) -> usize {
        self.requests.load(Ordering::SeqCst)
    }
}

impl Drop for ChapterStub {
    fn drop(&mut self) {
        if let Some(tx) = self.shutdown_tx.take() {
            let _ = tx.send(());
        }
        if let Some(handle) = self.handle.take() {
            let _ = handle.join();
        }
    }
}

fn query_value(url: &url::Url, key: &str) -> Option<String> {
    url.query_pairs()
        .find(|(k, _)| k == key)
        .map(|(_, v)| v.into_owned())
}

fn json_response(body: serde_json::Value) -> tiny_http::Response<std::io::Cursor<Vec<u8>>> {
    let header = tiny_http::Header::from_bytes(&b"Content-Type"[..], &b"application/json"[..])
        .expect("build header");
    tiny_http::Response::from_string(body.to_string())
        .with_status_code(200)
        .with_header(header)
}
