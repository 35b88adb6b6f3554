//! Requester identity.
//!
//! Users are authenticated by the gateway in front of this server, which forwards the authenticated user id in the
//! `mm_user_id` header. Handlers that act on behalf of a user take a [`Requester`] argument.
use actix_web::{dev::Payload, FromRequest, HttpRequest};
use futures::future::{ready, Ready};
use log::*;
use match_engine::db_types::UserId;

use crate::errors::ServerError;

pub const REQUESTER_HEADER: &str = "mm_user_id";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Requester(pub UserId);

impl Requester {
    pub fn user_id(&self) -> &UserId {
        &self.0
    }

    fn from_headers(req: &HttpRequest) -> Result<Self, ServerError> {
        let value = req.headers().get(REQUESTER_HEADER).ok_or(ServerError::MissingRequester)?;
        let id = value.to_str().map_err(|e| {
            debug!("💻️ Could not read {REQUESTER_HEADER} header. {e}");
            ServerError::MissingRequester
        })?;
        let id = id.trim();
        if id.is_empty() {
            return Err(ServerError::MissingRequester);
        }
        Ok(Self(UserId::from(id)))
    }
}

impl FromRequest for Requester {
    type Error = ServerError;
    type Future = Ready<Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, _payload: &mut Payload) -> Self::Future {
        ready(Self::from_headers(req))
    }
}
