//! Interface for load-generator operations whose request bodies are encoded values.
//!
//! The HTTP client itself lives outside this crate; operations only describe what to send.

use alloc::format;
use alloc::string::String;

use crate::{Buffer, Builder, VPackError};

/// HTTP method of a benchmark request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RequestType {
    /// `GET`
    Get,
    /// `POST`
    Post,
    /// `PUT`
    Put,
    /// `PATCH`
    Patch,
    /// `DELETE`
    Delete,
    /// `HEAD`
    Head,
    /// `OPTIONS`
    Options,
}

impl RequestType {
    /// The method name as sent on the wire.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Get => "GET",
            Self::Post => "POST",
            Self::Put => "PUT",
            Self::Patch => "PATCH",
            Self::Delete => "DELETE",
            Self::Head => "HEAD",
            Self::Options => "OPTIONS",
        }
    }
}

/// Request body handed to the client.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Payload<'a> {
    /// No body.
    Empty,
    /// Bytes owned by the operation, valid for the borrow.
    Borrowed(&'a [u8]),
    /// A freshly built value the client takes ownership of.
    Owned(Buffer),
}

impl Payload<'_> {
    /// The body bytes.
    #[must_use]
    pub fn as_bytes(&self) -> &[u8] {
        match self {
            Self::Empty => &[],
            Self::Borrowed(b) => b,
            Self::Owned(buf) => buf.as_bytes(),
        }
    }

    /// Returns `true` if the client must release the body after sending it.
    #[must_use]
    pub const fn must_free(&self) -> bool {
        matches!(self, Self::Owned(_))
    }
}

/// Identifies one request within a run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RequestContext {
    /// Worker thread number.
    pub thread: usize,
    /// Requests issued so far by this thread.
    pub thread_counter: usize,
    /// Requests issued so far by all threads.
    pub global_counter: usize,
}

/// One kind of request a load generator issues repeatedly.
///
/// `C` is the client type the operation may use to prepare server state.
pub trait BenchmarkOperation<C: ?Sized> {
    /// Error reported by [`BenchmarkOperation::set_up`].
    type Error;

    /// Prepare server-side state before the run.
    ///
    /// # Errors
    ///
    /// Returns an error if the run cannot start.
    fn set_up(&mut self, client: &mut C) -> Result<(), Self::Error>;

    /// Release resources after the run.
    fn tear_down(&mut self);

    /// Path and query of the request.
    fn url(&self, ctx: RequestContext) -> String;

    /// HTTP method of the request.
    fn request_type(&self, ctx: RequestContext) -> RequestType;

    /// Request body.
    ///
    /// # Errors
    ///
    /// Returns an error if the body cannot be encoded.
    fn payload(&self, ctx: RequestContext) -> Result<Payload<'_>, VPackError>;
}

/// Inserts one generated document per request into a collection.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DocumentCreation {
    collection: String,
    attributes: usize,
}

impl DocumentCreation {
    /// Documents with `attributes` string attributes each.
    #[must_use]
    pub fn new(collection: impl Into<String>, attributes: usize) -> Self {
        Self {
            collection: collection.into(),
            attributes,
        }
    }
}

impl<C: ?Sized> BenchmarkOperation<C> for DocumentCreation {
    type Error = core::convert::Infallible;

    fn set_up(&mut self, _client: &mut C) -> Result<(), Self::Error> {
        Ok(())
    }

    fn tear_down(&mut self) {}

    fn url(&self, _ctx: RequestContext) -> String {
        format!("/_api/document?collection={}", self.collection)
    }

    fn request_type(&self, _ctx: RequestContext) -> RequestType {
        RequestType::Post
    }

    fn payload(&self, ctx: RequestContext) -> Result<Payload<'_>, VPackError> {
        let mut b = Builder::new();
        b.open_object()?;
        b.add_entry("_key", format!("test{}", ctx.global_counter).as_str())?;
        for i in 1..=self.attributes {
            b.add_entry(&format!("value{i}"), format!("some value {i}").as_str())?;
        }
        b.close()?;
        Ok(Payload::Owned(b.finish()?))
    }
}
