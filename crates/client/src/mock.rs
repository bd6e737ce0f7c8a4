//! Scripted `Network` for tests.
//!
//! Unrouted URLs fail like a dropped connection, so a fresh mock behaves as
//! an offline network.

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use tokio::sync::Semaphore;

use crate::fetch::Network;
use crate::request::GatewayRequest;
use waystation_core::{Error, HttpResponse};

#[derive(Default)]
pub struct MockNetwork {
    routes: Mutex<HashMap<String, Option<HttpResponse>>>,
    gates: Mutex<HashMap<String, Arc<Semaphore>>>,
    calls: Mutex<Vec<String>>,
}

impl MockNetwork {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn respond(&self, url: &str, response: HttpResponse) {
        self.routes.lock().unwrap().insert(url.to_string(), Some(response));
    }

    pub fn ok(&self, url: &str, body: &str) {
        self.respond(url, HttpResponse::new(200, "OK", body));
    }

    pub fn fail(&self, url: &str) {
        self.routes.lock().unwrap().insert(url.to_string(), None);
    }

    /// Hold fetches of `url` until permits are added to the returned gate.
    pub fn gate(&self, url: &str) -> Arc<Semaphore> {
        let gate = Arc::new(Semaphore::new(0));
        self.gates.lock().unwrap().insert(url.to_string(), Arc::clone(&gate));
        gate
    }

    pub fn calls(&self, url: &str) -> usize {
        self.calls.lock().unwrap().iter().filter(|u| *u == url).count()
    }

    pub fn total_calls(&self) -> usize {
        self.calls.lock().unwrap().len()
    }
}

#[async_trait::async_trait]
impl Network for MockNetwork {
    async fn fetch(&self, request: &GatewayRequest) -> Result<HttpResponse, Error> {
        let url = request.url.as_str().to_string();
        self.calls.lock().unwrap().push(url.clone());

        let gate = self.gates.lock().unwrap().get(&url).cloned();
        if let Some(gate) = gate {
            gate.acquire()
                .await
                .map_err(|e| Error::HttpError(e.to_string()))?
                .forget();
        }

        let route = self.routes.lock().unwrap().get(&url).cloned();
        match route {
            Some(Some(response)) => Ok(response),
            _ => Err(Error::HttpError(format!("network error: connection refused for {url}"))),
        }
    }
}
