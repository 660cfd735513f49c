//! A scripted stand-in for the judge's HTTP API.

use hyper::{
    service::{make_service_fn, service_fn},
    Body, Request, Response, Server,
};
use std::{
    collections::{HashMap, VecDeque},
    convert::Infallible,
    net::TcpListener,
    sync::{Arc, Mutex},
};
use tokio::sync::oneshot;

#[derive(Debug, Clone)]
pub struct RecordedRequest {
    pub method: String,
    pub path: String,
    /// Header names are lower-cased.
    pub headers: HashMap<String, String>,
    pub body: String,
}

impl RecordedRequest {
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .get(&name.to_ascii_lowercase())
            .map(|s| s.as_str())
    }

    pub fn json(&self) -> serde_json::Value {
        serde_json::from_str(&self.body).expect("Request body is not JSON")
    }
}

#[derive(Debug)]
struct Route {
    path: String,
    body_contains: Option<String>,
    /// The last response is repeated once the others are used up.
    responses: VecDeque<(u16, String)>,
}

impl Route {
    fn matches(&self, path: &str, body: &str) -> bool {
        path.contains(&self.path)
            && self
                .body_contains
                .as_deref()
                .map_or(true, |needle| body.contains(needle))
    }

    fn next_response(&mut self) -> (u16, String) {
        if self.responses.len() > 1 {
            self.responses.pop_front().unwrap()
        } else {
            self.responses.back().cloned().unwrap_or((200, "{}".into()))
        }
    }
}

#[derive(Default)]
struct State {
    routes: Vec<Route>,
    requests: Vec<RecordedRequest>,
}

/// Judge server answering from a script. Routes are matched by path
/// substring, in the order they were added.
#[derive(Default)]
pub struct MockJudge {
    routes: Vec<Route>,
}

pub struct MockRouteBuilder<'a> {
    judge: &'a mut MockJudge,
    route: Route,
    status: u16,
}

impl<'a> MockRouteBuilder<'a> {
    /// Only match requests whose body contains `needle`.
    pub fn containing(mut self, needle: &str) -> Self {
        self.route.body_contains = Some(needle.into());
        self
    }

    /// Status code of the following responses. Defaults to 200.
    pub fn returns(mut self, status: u16) -> Self {
        self.status = status;
        self
    }

    /// Queue a response body.
    pub fn body(mut self, body: impl Into<String>) -> Self {
        self.route.responses.push_back((self.status, body.into()));
        self
    }

    pub fn finish(self) {
        self.judge.routes.push(self.route);
    }
}

impl MockJudge {
    pub fn new() -> MockJudge {
        MockJudge::default()
    }

    pub fn when(&mut self, path: &str) -> MockRouteBuilder {
        MockRouteBuilder {
            judge: self,
            route: Route {
                path: path.into(),
                body_contains: None,
                responses: VecDeque::new(),
            },
            status: 200,
        }
    }

    /// Serve on a random local port until the returned handle is dropped.
    pub fn start(self) -> RunningJudge {
        let listener = TcpListener::bind("127.0.0.1:0").expect("Failed to bind");
        let addr = listener.local_addr().expect("No local address");
        let state = Arc::new(Mutex::new(State {
            routes: self.routes,
            requests: vec![],
        }));

        let svc_state = state.clone();
        let make_svc = make_service_fn(move |_conn| {
            let state = svc_state.clone();
            async move {
                Ok::<_, Infallible>(service_fn(move |req| handle(state.clone(), req)))
            }
        });

        let (tx, rx) = oneshot::channel::<()>();
        let server = Server::from_tcp(listener)
            .expect("Failed to start mock judge")
            .serve(make_svc)
            .with_graceful_shutdown(async move {
                let _ = rx.await;
            });
        tokio::spawn(async move {
            if let Err(e) = server.await {
                tracing::error!("Mock judge failed: {}", e);
            }
        });

        RunningJudge {
            base_url: format!("http://{}", addr),
            state,
            shutdown: Some(tx),
        }
    }
}

async fn handle(
    state: Arc<Mutex<State>>,
    req: Request<Body>,
) -> Result<Response<Body>, Infallible> {
    let (parts, body) = req.into_parts();
    let body = hyper::body::to_bytes(body)
        .await
        .map(|b| String::from_utf8_lossy(&b).into_owned())
        .unwrap_or_default();
    let path = parts.uri.path().to_owned();
    let headers = parts
        .headers
        .iter()
        .map(|(k, v)| {
            (
                k.as_str().to_owned(),
                v.to_str().unwrap_or_default().to_owned(),
            )
        })
        .collect();

    let mut state = state.lock().unwrap();
    let response = state
        .routes
        .iter_mut()
        .find(|r| r.matches(&path, &body))
        .map(|r| r.next_response());
    tracing::debug!("{} {} -> {:?}", parts.method, path, response.as_ref().map(|r| r.0));
    state.requests.push(RecordedRequest {
        method: parts.method.to_string(),
        path,
        headers,
        body,
    });

    let (status, body) = response.unwrap_or((404, "not found".into()));
    Ok(Response::builder()
        .status(status)
        .header("Content-Type", "application/json")
        .body(Body::from(body))
        .unwrap())
}

pub struct RunningJudge {
    base_url: String,
    state: Arc<Mutex<State>>,
    shutdown: Option<oneshot::Sender<()>>,
}

impl RunningJudge {
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub fn requests(&self) -> Vec<RecordedRequest> {
        self.state.lock().unwrap().requests.clone()
    }

    /// Requests whose path contains `path`.
    pub fn requests_to(&self, path: &str) -> Vec<RecordedRequest> {
        self.requests()
            .into_iter()
            .filter(|r| r.path.contains(path))
            .collect()
    }
}

impl Drop for RunningJudge {
    fn drop(&mut self) {
        if let Some(tx) = self.shutdown.take() {
            let _ = tx.send(());
        }
    }
}

pub const QUESTION_ID_BODY: &str = r#"{"data":{"question":{"questionId":"1"}}}"#;
pub const PENDING_BODY: &str = r#"{"state":"PENDING"}"#;
pub const STARTED_BODY: &str = r#"{"state":"STARTED"}"#;
