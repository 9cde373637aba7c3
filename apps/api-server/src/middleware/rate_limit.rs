//! Rate limiting middleware.
//!
//! The limiter is looked up in app data as `web::Data<Arc<dyn RateLimiter>>`.
//! Without one registered, requests pass through untouched.

use actix_web::{
    Error, HttpResponse,
    body::EitherBody,
    dev::{Service, ServiceRequest, ServiceResponse, Transform, forward_ready},
    web,
};
use blogicum_shared::ErrorResponse;
use std::future::{Future, Ready, ready};
use std::pin::Pin;
use std::rc::Rc;
use std::sync::Arc;

use blogicum_core::ports::RateLimiter;

/// Rate limiting middleware factory, keyed by client IP.
pub struct RateLimitMiddleware;

impl<S, B> Transform<S, ServiceRequest> for RateLimitMiddleware
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error> + 'static,
    B: 'static,
{
    type Response = ServiceResponse<EitherBody<B>>;
    type Error = Error;
    type Transform = RateLimitMiddlewareService<S>;
    type InitError = ();
    type Future = Ready<Result<Self::Transform, Self::InitError>>;

    fn new_transform(&self, service: S) -> Self::Future {
        ready(Ok(RateLimitMiddlewareService {
            service: Rc::new(service),
        }))
    }
}

pub struct RateLimitMiddlewareService<S> {
    service: Rc<S>,
}

impl<S, B> Service<ServiceRequest> for RateLimitMiddlewareService<S>
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error> + 'static,
    B: 'static,
{
    type Response = ServiceResponse<EitherBody<B>>;
    type Error = Error;
    type Future = Pin<Box<dyn Future<Output = Result<Self::Response, Self::Error>>>>;

    forward_ready!(service);

    fn call(&self, req: ServiceRequest) -> Self::Future {
        let service = Rc::clone(&self.service);
        let limiter = req
            .app_data::<web::Data<Arc<dyn RateLimiter>>>()
            .map(|data| Arc::clone(data.get_ref()));

        Box::pin(async move {
            let Some(limiter) = limiter else {
                return service.call(req).await.map(|res| res.map_into_left_body());
            };

            let key = req
                .connection_info()
                .realip_remote_addr()
                .unwrap_or("unknown")
                .to_string();

            match limiter.check(&key).await {
                Ok(result) if !result.allowed => {
                    // Round up so clients never retry too early
                    let retry_after = result.reset_after.as_secs_f64().ceil().max(1.0) as u64;
                    tracing::warn!(key = %key, retry_after, "Rate limit exceeded");

                    let error = ErrorResponse::new(429, "Too Many Requests").with_detail(format!(
                        "Rate limit exceeded. Try again in {} seconds.",
                        retry_after
                    ));
                    let response = HttpResponse::TooManyRequests()
                        .insert_header(("X-RateLimit-Remaining", "0"))
                        .insert_header(("Retry-After", retry_after.to_string()))
                        .json(error);

                    return Ok(req.into_response(response).map_into_right_body());
                }
                Ok(_) => {}
                Err(e) => tracing::error!(error = %e, "Rate limiter error, failing open"),
            }

            let res = service.call(req).await?;
            Ok(res.map_into_left_body())
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use actix_web::{App, http::StatusCode, test};
    use async_trait::async_trait;
    use blogicum_core::ports::{RateLimitError, RateLimitResult};
    use std::sync::atomic::{AtomicU32, Ordering};
    use std::time::Duration;

    /// Allows the first `limit` calls, then refuses everything.
    struct CountingLimiter {
        limit: u32,
        seen: AtomicU32,
    }

    #[async_trait]
    impl RateLimiter for CountingLimiter {
        async fn check(&self, _key: &str) -> Result<RateLimitResult, RateLimitError> {
            let seen = self.seen.fetch_add(1, Ordering::SeqCst) + 1;
            Ok(RateLimitResult {
                allowed: seen <= self.limit,
                reset_after: Duration::from_millis(1500),
            })
        }
    }

    #[actix_web::test]
    async fn test_requests_over_limit_get_429() {
        let limiter: Arc<dyn RateLimiter> = Arc::new(CountingLimiter {
            limit: 1,
            seen: AtomicU32::new(0),
        });
        let app = test::init_service(
            App::new()
                .app_data(web::Data::new(limiter))
                .wrap(RateLimitMiddleware)
                .route("/", web::get().to(|| async { HttpResponse::Ok().finish() })),
        )
        .await;

        let first = test::call_service(&app, test::TestRequest::get().uri("/").to_request()).await;
        assert_eq!(first.status(), StatusCode::OK);

        let second = test::call_service(&app, test::TestRequest::get().uri("/").to_request()).await;
        assert_eq!(second.status(), StatusCode::TOO_MANY_REQUESTS);
        assert_eq!(second.headers().get("Retry-After").unwrap(), "2");
    }

    #[actix_web::test]
    async fn test_no_limiter_passes_through() {
        let app = test::init_service(
            App::new()
                .wrap(RateLimitMiddleware)
                .route("/", web::get().to(|| async { HttpResponse::Ok().finish() })),
        )
        .await;

        for _ in 0..5 {
            let res = test::call_service(&app, test::TestRequest::get().uri("/").to_request()).await;
            assert_eq!(res.status(), StatusCode::OK);
        }
    }
}
