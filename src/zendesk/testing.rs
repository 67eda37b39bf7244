//! Scripted transport for driving the client without a network.

use super::{Transport, check_status};
use crate::error::Result;
use reqwest::{Method, StatusCode, Url};
use serde_json::Value;
use std::cell::RefCell;
use std::collections::VecDeque;

#[derive(Debug, Clone)]
pub struct RecordedCall {
    pub method: Method,
    pub url: Url,
}

impl RecordedCall {
    pub fn param(&self, name: &str) -> Option<String> {
        self.url
            .query_pairs()
            .find(|(key, _)| key == name)
            .map(|(_, value)| value.into_owned())
    }
}

enum Reply {
    Body(Value),
    Status(u16),
}

/// Replays queued replies in order and records every call it receives.
#[derive(Default)]
pub struct FakeTransport {
    replies: RefCell<VecDeque<Reply>>,
    calls: RefCell<Vec<RecordedCall>>,
}

impl FakeTransport {
    pub fn push_ok(&self, body: Value) {
        self.replies.borrow_mut().push_back(Reply::Body(body));
    }

    pub fn push_status(&self, status: u16) {
        self.replies.borrow_mut().push_back(Reply::Status(status));
    }

    pub fn calls(&self) -> Vec<RecordedCall> {
        self.calls.borrow().clone()
    }
}

impl Transport for FakeTransport {
    async fn send(&self, method: Method, url: Url) -> Result<Value> {
        self.calls.borrow_mut().push(RecordedCall {
            method,
            url: url.clone(),
        });

        let reply = self
            .replies
            .borrow_mut()
            .pop_front()
            .unwrap_or_else(|| panic!("unexpected request to {}", url));

        match reply {
            Reply::Body(body) => Ok(body),
            Reply::Status(code) => {
                let status = StatusCode::from_u16(code).expect("valid status code");
                check_status(status, &url)?;
                Ok(Value::Null)
            }
        }
    }
}
