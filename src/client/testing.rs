use std::collections::VecDeque;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use super::{
    BoxFuture, FailureKind, HttpResponse, HttpTransport, RetryPolicy, Sleeper, SmmClient,
    TransportFailure,
};
use crate::domain::ApiKey;

type Request = (String, Vec<(String, String)>);

#[derive(Debug, Default)]
struct Script {
    requests: Vec<Request>,
    replies: VecDeque<Result<HttpResponse, TransportFailure>>,
}

/// Replays queued replies in order and records every request it sees.
#[derive(Debug, Clone, Default)]
pub(crate) struct ScriptedTransport {
    script: Arc<Mutex<Script>>,
}

impl ScriptedTransport {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    pub(crate) fn reply(&self, status: u16, body: &str) {
        self.script
            .lock()
            .unwrap()
            .replies
            .push_back(Ok(HttpResponse {
                status,
                body: body.to_owned(),
            }));
    }

    pub(crate) fn fail(&self, kind: FailureKind) {
        self.script
            .lock()
            .unwrap()
            .replies
            .push_back(Err(TransportFailure {
                kind,
                source: format!("scripted {kind} failure").into(),
            }));
    }

    pub(crate) fn requests(&self) -> Vec<Request> {
        self.script.lock().unwrap().requests.clone()
    }

    /// `action` values of the recorded requests, in order.
    pub(crate) fn actions(&self) -> Vec<String> {
        self.requests()
            .iter()
            .filter_map(|(_, params)| {
                params
                    .iter()
                    .find(|(name, _)| name == "action")
                    .map(|(_, value)| value.clone())
            })
            .collect()
    }
}

impl HttpTransport for ScriptedTransport {
    fn post_form<'a>(
        &'a self,
        url: &'a str,
        params: Vec<(String, String)>,
    ) -> BoxFuture<'a, Result<HttpResponse, TransportFailure>> {
        let mut script = self.script.lock().unwrap();
        script.requests.push((url.to_owned(), params));
        let reply = script
            .replies
            .pop_front()
            .unwrap_or_else(|| panic!("no scripted reply for request to {url}"));
        Box::pin(async move { reply })
    }
}

/// Records requested sleeps and returns immediately.
#[derive(Debug, Clone, Default)]
pub(crate) struct RecordingSleeper {
    delays: Arc<Mutex<Vec<Duration>>>,
}

impl RecordingSleeper {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    pub(crate) fn delays(&self) -> Vec<Duration> {
        self.delays.lock().unwrap().clone()
    }
}

impl Sleeper for RecordingSleeper {
    fn sleep(&self, duration: Duration) -> BoxFuture<'_, ()> {
        self.delays.lock().unwrap().push(duration);
        Box::pin(async {})
    }
}

pub(crate) fn test_client(
    transport: &ScriptedTransport,
    sleeper: &RecordingSleeper,
    retry: RetryPolicy,
    dry_run: bool,
) -> SmmClient {
    SmmClient {
        api_key: Some(ApiKey::new("test_key").unwrap()),
        endpoint: "https://example.invalid/api/v2".to_owned(),
        dry_run,
        retry,
        http: Arc::new(transport.clone()),
        sleeper: Arc::new(sleeper.clone()),
    }
}

pub(crate) fn assert_param(params: &[(String, String)], name: &str, expected: &str) {
    let value = params
        .iter()
        .find(|(key, _)| key == name)
        .map(|(_, value)| value.as_str());
    assert_eq!(value, Some(expected), "param {name}");
}
