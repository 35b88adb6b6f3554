use actix_web::{body::MessageBody, http::StatusCode, test, test::TestRequest, web::ServiceConfig, App};
use log::debug;

use crate::auth::REQUESTER_HEADER;

/// Sends `req` to an app configured with `configure`, on behalf of `user` if one is given.
pub async fn send_request<F>(req: TestRequest, user: Option<&str>, configure: F) -> (StatusCode, String)
where F: FnOnce(&mut ServiceConfig) {
    let _ = env_logger::try_init();
    let req = match user {
        Some(user) => req.insert_header((REQUESTER_HEADER, user)),
        None => req,
    };
    let app = App::new().configure(configure);
    let service = test::init_service(app).await;
    debug!("Making request");
    let res = test::call_service(&service, req.to_request()).await;
    let status = res.status();
    let body = res.into_body().try_into_bytes().map(|b| String::from_utf8_lossy(&b).into_owned()).unwrap_or_default();
    (status, body)
}
