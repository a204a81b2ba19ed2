use super::*;
use crate::error::{Error, ValidationError};
use crate::session::test_helpers::*;
use crate::types::{NotificationKind, PollOutcome, UploadOptions};
use std::time::Duration;
use wiremock::matchers::{body_json, method, path};
use wiremock::{Mock, ResponseTemplate};

mod submit;

fn texts_of_kind(session: &Session, kind: NotificationKind) -> Vec<String> {
    session
        .notifications()
        .into_iter()
        .filter(|n| n.kind == kind)
        .map(|n| n.text)
        .collect()
}

fn error_texts(session: &Session) -> Vec<String> {
    texts_of_kind(session, NotificationKind::Error)
}

fn success_texts(session: &Session) -> Vec<String> {
    texts_of_kind(session, NotificationKind::Success)
}
