//! Request handler definitions
//!
//! Define each route and it handler here.
//! Handlers that are more than a line or two MUST go into a separate module. Keep this module neat and tidy 🙏
//!
//! Every handler is async. Since each worker thread processes its requests sequentially, a handler that blocks the
//! current thread stalls every other request on that worker. Database work, timeouts and notification hand-off are
//! all expressed as futures for this reason.
//!
//! All `/api` routes act on behalf of the [`Requester`], who is identified by the `mm_user_id` header.
use std::str::FromStr;

use actix_web::{get, web, HttpResponse, Responder};
use log::*;
use match_engine::{db_types::InterestId, InterestFlowApi, InterestManagement, MatchingDatabase, StatsApi};

use crate::{
    auth::Requester,
    data_objects::{InterestTarget, JsonResponse},
    errors::ServerError,
};

// Web-actix cannot handle generics in handlers, so it's implemented manually using the `route!` macro
#[macro_export]
macro_rules! route {
    ($name:ident => $method:ident $path:literal impl $($bounds:ty),+) => {
        paste::paste! { pub struct [<$name:camel Route>]< $( [< T $bounds:camel> ],)+ >( $( core::marker::PhantomData<fn() -> [< T $bounds:camel> ] >,)+ );}
        paste::paste! { impl< $( [< T $bounds:camel> ],)+ > [<$name:camel Route>]< $( [< T $bounds:camel> ],)+ > {
            #[allow(clippy::new_without_default)]
            pub fn new() -> Self {
                Self($( core::marker::PhantomData::<fn() -> [< T $bounds:camel> ] >,)+)
            }
        }}
        paste::paste! { impl<$( [< T $bounds:camel >] , )+> actix_web::dev::HttpServiceFactory for [<$name:camel Route>]<$([<T $bounds:camel>],)+>
        where
            $([<T $bounds:camel>]: $bounds + 'static,)+
        {
            fn register(self, config: &mut actix_web::dev::AppService) {
                let res = actix_web::Resource::new($path)
                    .name(stringify!($name))
                    .guard(actix_web::guard::$method())
                    .to($name::< $( [< T $bounds:camel >], )+>);
                actix_web::dev::HttpServiceFactory::register(res, config);
            }
        }}
    };
}

// ----------------------------------------------   Health  ----------------------------------------------------
#[get("/health")]
pub async fn health() -> impl Responder {
    trace!("💻️ Received health check request");
    HttpResponse::Ok().body("👍️\n")
}

//----------------------------------------------   Interests  ----------------------------------------------------
route!(submit_interest => Post "/interests" impl MatchingDatabase);
/// Route handler for signalling interest.
///
/// The requester signals interest in `to_user_id` within `group_id`. The reply carries the new `like_id` and, if the
/// target had already signalled the requester, `is_match: true` and the `match_id`.
///
/// Every denial has its own status code and `code` field, so clients can show a cooldown countdown, a credit
/// purchase prompt or a duplicate warning as appropriate.
pub async fn submit_interest<B: MatchingDatabase>(
    requester: Requester,
    body: web::Json<InterestTarget>,
    api: web::Data<InterestFlowApi<B>>,
) -> Result<HttpResponse, ServerError> {
    let InterestTarget { to_user_id, group_id } = body.into_inner();
    debug!("💻️ POST interest from {} toward {to_user_id} in {group_id}", requester.user_id());
    let result = api.submit_interest(requester.user_id(), &to_user_id, &group_id).await?;
    Ok(HttpResponse::Ok().json(result))
}

route!(cancel_interest => Delete "/interests/{like_id}" impl MatchingDatabase);
/// Route handler for withdrawing an interest by its `like_id`.
///
/// Only the sender may withdraw, and only within the grace window. If the interest was part of a match, the match
/// ends. The original charge is refunded.
pub async fn cancel_interest<B: MatchingDatabase>(
    requester: Requester,
    path: web::Path<String>,
    api: web::Data<InterestFlowApi<B>>,
) -> Result<HttpResponse, ServerError> {
    let raw = path.into_inner();
    let like_id = InterestId::from_str(&raw).map_err(|e| ServerError::InvalidRequestPath(e.to_string()))?;
    debug!("💻️ DELETE interest {like_id} for {}", requester.user_id());
    let result = api.cancel_interest(like_id, requester.user_id()).await?;
    Ok(HttpResponse::Ok().json(result))
}

route!(withdraw_interest => Post "/withdrawals" impl MatchingDatabase);
/// Withdraws the requester's live interest toward `to_user_id` in `group_id`, for clients that do not keep the
/// `like_id`.
pub async fn withdraw_interest<B: MatchingDatabase>(
    requester: Requester,
    body: web::Json<InterestTarget>,
    api: web::Data<InterestFlowApi<B>>,
) -> Result<HttpResponse, ServerError> {
    let InterestTarget { to_user_id, group_id } = body.into_inner();
    let from = requester.user_id();
    debug!("💻️ POST withdrawal from {from} toward {to_user_id} in {group_id}");
    let result = api.cancel_interest_for_pair(from, &to_user_id, &group_id, from).await?;
    Ok(HttpResponse::Ok().json(result))
}

route!(eligibility => Get "/eligibility" impl MatchingDatabase);
/// Checks whether the requester may signal interest in `to_user_id` within `group_id` right now, without signalling
/// it. A denial is returned exactly as [`submit_interest`] would return it.
pub async fn eligibility<B: MatchingDatabase>(
    requester: Requester,
    query: web::Query<InterestTarget>,
    api: web::Data<InterestFlowApi<B>>,
) -> Result<HttpResponse, ServerError> {
    let InterestTarget { to_user_id, group_id } = query.into_inner();
    trace!("💻️ GET eligibility of {} toward {to_user_id} in {group_id}", requester.user_id());
    api.check_eligibility(requester.user_id(), &to_user_id, &group_id).await?;
    Ok(HttpResponse::Ok().json(JsonResponse::success("Eligible")))
}

//----------------------------------------------   Stats  ----------------------------------------------------
route!(my_stats => Get "/stats" impl InterestManagement);
/// Route handler for the stats endpoint: live interests sent and received, and active matches.
pub async fn my_stats<B: InterestManagement>(
    requester: Requester,
    api: web::Data<StatsApi<B>>,
) -> Result<HttpResponse, ServerError> {
    debug!("💻️ GET stats for {}", requester.user_id());
    let stats = api.stats_for(requester.user_id()).await?;
    Ok(HttpResponse::Ok().json(stats))
}

route!(my_matches => Get "/matches" impl InterestManagement);
pub async fn my_matches<B: InterestManagement>(
    requester: Requester,
    api: web::Data<StatsApi<B>>,
) -> Result<HttpResponse, ServerError> {
    debug!("💻️ GET matches for {}", requester.user_id());
    let matches = api.matches_for(requester.user_id()).await?;
    Ok(HttpResponse::Ok().json(matches))
}

route!(my_inbox => Get "/inbox" impl InterestManagement);
/// Route handler for the inbox: pending interests addressed to the requester. Senders are never included.
pub async fn my_inbox<B: InterestManagement>(
    requester: Requester,
    api: web::Data<StatsApi<B>>,
) -> Result<HttpResponse, ServerError> {
    debug!("💻️ GET inbox for {}", requester.user_id());
    let inbox = api.inbox_for(requester.user_id()).await?;
    Ok(HttpResponse::Ok().json(inbox))
}
