use crate::service::request_service::{RequestService, RequestServiceBuilder};
use crate::Engine;
use hyper::service::Service;
use std::convert::Infallible;
use std::future::{ready, Ready};
use std::net::SocketAddr;
use std::sync::Arc;
use tokio::net::TcpStream;

/// A [`Service`] that turns accepted connections into [`RequestService`]s.
///
/// # Examples
///
/// ```no_run
/// use gon::{Context, Engine, RouterService, Routes};
/// use http::StatusCode;
/// use hyper::server::conn::http1;
/// use hyper::service::Service;
/// use hyper_util::rt::TokioIo;
/// use std::net::SocketAddr;
/// use std::sync::Arc;
/// use tokio::net::TcpListener;
///
/// #[tokio::main]
/// async fn main() -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
///     let mut engine = Engine::with_defaults();
///     engine.get("/", |ctx: &mut Context| ctx.string(StatusCode::OK, "Home page"))?;
///
///     let service = Arc::new(RouterService::new(engine));
///
///     let addr = SocketAddr::from(([127, 0, 0, 1], 3001));
///     let listener = TcpListener::bind(addr).await?;
///     println!("App is running on: {}", addr);
///
///     loop {
///         let (stream, _) = listener.accept().await?;
///         let router_service = service.clone();
///
///         tokio::spawn(async move {
///             let request_service = router_service.call(&stream).await.unwrap();
///             let io = TokioIo::new(stream);
///             if let Err(err) = http1::Builder::new().serve_connection(io, request_service).await {
///                 eprintln!("Error serving connection: {:?}", err);
///             }
///         });
///     }
/// }
/// ```
#[derive(Debug, Clone)]
pub struct RouterService {
    builder: RequestServiceBuilder,
}

impl RouterService {
    pub fn new(engine: impl Into<Arc<Engine>>) -> RouterService {
        RouterService {
            builder: RequestServiceBuilder::new(engine),
        }
    }
}

impl Service<&TcpStream> for RouterService {
    type Response = RequestService;
    type Error = Infallible;
    type Future = Ready<Result<Self::Response, Self::Error>>;

    fn call(&self, conn: &TcpStream) -> Self::Future {
        let addr = match conn.peer_addr() {
            Ok(addr) => addr,
            Err(err) => {
                tracing::debug!("couldn't read the peer address: {}", err);
                SocketAddr::from(([0, 0, 0, 0], 0))
            }
        };

        ready(Ok(self.builder.build(addr)))
    }
}
