//! Scripted in-memory gateway for tests.
//!
//! Routes match on method plus a URL fragment. Each route holds a queue of
//! replies; the last reply repeats once the queue is drained. Unmatched
//! requests get a 404.

use async_trait::async_trait;
use std::collections::VecDeque;
use std::sync::Mutex;
use std::time::Duration;

use crate::error::GatewayError;
use crate::host::http::{GatewayRequest, GatewayResponse, HttpGateway, Method};

/// Canned outcome for a request.
#[derive(Debug, Clone)]
pub enum Reply {
    /// Respond with a status and body.
    Status(u16, String),
    /// Fail with a timeout.
    Timeout,
    /// Fail with a transport error.
    Transport(String),
}

impl Reply {
    /// 200 with the given body.
    pub fn ok(body: impl Into<String>) -> Self {
        Self::Status(200, body.into())
    }

    /// Given status with an empty body.
    pub fn status(status: u16) -> Self {
        Self::Status(status, String::new())
    }

    fn resolve(&self, timeout: Duration) -> Result<GatewayResponse, GatewayError> {
        match self {
            Self::Status(status, body) => Ok(GatewayResponse::new(*status, body.clone())),
            Self::Timeout => Err(GatewayError::Timeout(timeout)),
            Self::Transport(msg) => Err(GatewayError::Transport(msg.clone())),
        }
    }
}

struct Route {
    method: Method,
    fragment: String,
    replies: VecDeque<Reply>,
}

/// Gateway answering from a script and recording every request.
#[derive(Default)]
pub struct ScriptedGateway {
    routes: Mutex<Vec<Route>>,
    requests: Mutex<Vec<GatewayRequest>>,
}

impl ScriptedGateway {
    /// Creates an empty script.
    pub fn new() -> Self {
        Self::default()
    }

    /// Queues a reply for requests whose URL contains `fragment`.
    ///
    /// # Panics
    ///
    /// Panics if the route table lock is poisoned.
    #[must_use]
    pub fn on(self, method: Method, fragment: &str, reply: Reply) -> Self {
        {
            let mut routes = self.routes.lock().unwrap();
            if let Some(route) = routes
                .iter_mut()
                .find(|r| r.method == method && r.fragment == fragment)
            {
                route.replies.push_back(reply);
            } else {
                routes.push(Route {
                    method,
                    fragment: fragment.to_string(),
                    replies: VecDeque::from([reply]),
                });
            }
        }
        self
    }

    /// Returns all requests seen so far.
    ///
    /// # Panics
    ///
    /// Panics if the request log lock is poisoned.
    pub fn requests(&self) -> Vec<GatewayRequest> {
        self.requests.lock().unwrap().clone()
    }

    /// Counts requests with the given method whose URL contains `fragment`.
    pub fn count(&self, method: Method, fragment: &str) -> usize {
        self.requests()
            .iter()
            .filter(|r| r.method == method && r.url.contains(fragment))
            .count()
    }
}

#[async_trait]
impl HttpGateway for ScriptedGateway {
    async fn request(&self, request: GatewayRequest) -> Result<GatewayResponse, GatewayError> {
        let timeout = request.timeout;
        let reply = {
            let mut routes = self.routes.lock().unwrap();
            routes
                .iter_mut()
                .find(|r| r.method == request.method && request.url.contains(&r.fragment))
                .and_then(|route| {
                    if route.replies.len() > 1 {
                        route.replies.pop_front()
                    } else {
                        route.replies.front().cloned()
                    }
                })
        };
        self.requests.lock().unwrap().push(request);

        match reply {
            Some(reply) => reply.resolve(timeout),
            None => Ok(GatewayResponse::new(404, "")),
        }
    }
}
