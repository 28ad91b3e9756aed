use crate::{Engine, RouteError};
use bytes::Bytes;
use http_body_util::{BodyExt, Full};
use hyper::body::Body;
use hyper::{service::Service, Request, Response};
use std::future::Future;
use std::net::SocketAddr;
use std::pin::Pin;
use std::sync::Arc;

/// Serves the requests of one connection.
///
/// The request body is collected in full before routing, then the request
/// is handed to [`Engine::serve`] with the peer address stored in its
/// extensions (see [`Context::remote_addr`](crate::Context::remote_addr)).
#[derive(Debug, Clone)]
pub struct RequestService {
    pub(crate) engine: Arc<Engine>,
    pub(crate) remote_addr: SocketAddr,
}

impl<B> Service<Request<B>> for RequestService
where
    B: Body + Send + 'static,
    B::Data: Send,
    B::Error: Into<RouteError>,
{
    type Response = Response<Full<Bytes>>;
    type Error = RouteError;
    #[allow(clippy::type_complexity)]
    type Future = Pin<Box<dyn Future<Output = Result<Self::Response, Self::Error>> + Send + 'static>>;

    fn call(&self, req: Request<B>) -> Self::Future {
        let engine = self.engine.clone();
        let remote_addr = self.remote_addr;

        let fut = async move {
            let (mut parts, body) = req.into_parts();
            let body = match body.collect().await {
                Ok(collected) => collected.to_bytes(),
                Err(err) => {
                    let err: RouteError = err.into();
                    tracing::error!("couldn't read the request body from {}: {}", remote_addr, err);
                    return Err(err);
                }
            };

            parts.extensions.insert(remote_addr);
            Ok(engine.serve(Request::from_parts(parts, body)))
        };

        Box::pin(fut)
    }
}

/// Hands out a [`RequestService`] per connection, all sharing one engine.
#[derive(Debug, Clone)]
pub struct RequestServiceBuilder {
    engine: Arc<Engine>,
}

impl RequestServiceBuilder {
    pub fn new(engine: impl Into<Arc<Engine>>) -> Self {
        Self { engine: engine.into() }
    }

    pub fn build(&self, remote_addr: SocketAddr) -> RequestService {
        RequestService {
            engine: self.engine.clone(),
            remote_addr,
        }
    }
}

#[cfg(test)]
mod tests {
    use crate::{Context, Engine, RequestServiceBuilder, Routes};
    use http::{Method, StatusCode};
    use http_body_util::{BodyExt, Full};
    use hyper::service::Service;
    use hyper::{body::Bytes, Request, Response};
    use std::net::SocketAddr;
    use std::str::FromStr;

    #[tokio::test]
    async fn should_route_request() {
        const RESPONSE_TEXT: &str = "Hello world!";
        let remote_addr = SocketAddr::from_str("10.0.0.7:8080").unwrap();
        let mut engine = Engine::new();
        engine
            .post("/echo/:name", |ctx: &mut Context| {
                let body = format!(
                    "{} {} {}",
                    ctx.param("name").unwrap_or_default(),
                    String::from_utf8_lossy(ctx.request().body()),
                    ctx.remote_addr().map(|addr| addr.to_string()).unwrap_or_default()
                );
                ctx.string(StatusCode::OK, body);
            })
            .unwrap()
            .get("/", |ctx: &mut Context| ctx.string(StatusCode::OK, RESPONSE_TEXT))
            .unwrap();

        let builder = RequestServiceBuilder::new(engine);
        let service = builder.build(remote_addr);

        let req = Request::builder()
            .method(Method::GET)
            .uri("/")
            .body(Full::new(Bytes::new()))
            .unwrap();
        let resp: Response<Full<Bytes>> = service.call(req).await.unwrap();
        let body = resp.into_body().collect().await.unwrap().to_bytes();
        assert_eq!(RESPONSE_TEXT, String::from_utf8(body.to_vec()).unwrap());

        let req = Request::builder()
            .method(Method::POST)
            .uri("/echo/gon")
            .body(Full::new(Bytes::from("payload")))
            .unwrap();
        let resp = service.call(req).await.unwrap();
        assert_eq!(resp.status(), StatusCode::OK);
        let body = resp.into_body().collect().await.unwrap().to_bytes();
        assert_eq!(&body[..], b"gon payload 10.0.0.7:8080");
    }
}
