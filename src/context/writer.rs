use bytes::{Bytes, BytesMut};
use http::{HeaderMap, Response, StatusCode};
use http_body_util::Full;
use std::mem;

/// A buffered response, built up by the handler chain.
///
/// Nothing reaches the client until the chain has finished and the engine
/// turns the writer into a [`Response`].
#[derive(Debug, Default)]
pub struct ResponseWriter {
    status: StatusCode,
    headers: HeaderMap,
    body: BytesMut,
    written: bool,
}

impl ResponseWriter {
    pub fn status(&self) -> StatusCode {
        self.status
    }

    /// Sets the status code. Ignored once the response has been written to.
    pub fn set_status(&mut self, status: StatusCode) {
        if self.written {
            tracing::debug!(
                "response already written, ignoring status change from {} to {}",
                self.status,
                status
            );
            return;
        }
        self.status = status;
    }

    pub fn headers(&self) -> &HeaderMap {
        &self.headers
    }

    pub fn headers_mut(&mut self) -> &mut HeaderMap {
        &mut self.headers
    }

    /// Appends `data` to the body and marks the response as written.
    pub fn write(&mut self, data: &[u8]) {
        self.written = true;
        self.body.extend_from_slice(data);
    }

    /// Marks the response as written without adding to the body, freezing
    /// the status code.
    pub fn write_header_now(&mut self) {
        self.written = true;
    }

    pub fn written(&self) -> bool {
        self.written
    }

    /// Number of body bytes written so far.
    pub fn size(&self) -> usize {
        self.body.len()
    }

    pub fn body(&self) -> &[u8] {
        &self.body
    }

    pub(crate) fn take_response(&mut self) -> Response<Full<Bytes>> {
        let body = self.body.split().freeze();
        let mut resp = Response::new(Full::new(body));
        *resp.status_mut() = mem::take(&mut self.status);
        *resp.headers_mut() = mem::take(&mut self.headers);
        resp
    }

    pub(crate) fn reset(&mut self) {
        self.status = StatusCode::OK;
        self.headers.clear();
        self.body.clear();
        self.written = false;
    }
}
