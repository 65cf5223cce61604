//! Link chain plumbing.
//!
//! A [`Link`] receives an operation and either answers it or hands it to the
//! rest of the chain through [`Forward`]. Links run in the order they were
//! given to [`LinkChain::from_links`].

use crate::error::LinkError;
use crate::operation::{FetchResult, Operation};
use async_trait::async_trait;
use std::sync::Arc;

/// One stage of the request pipeline.
#[async_trait]
pub trait Link: Send + Sync {
    /// Handle `operation`, optionally forwarding it to the next stage.
    async fn request(
        &self,
        operation: Operation,
        forward: Forward<'_>,
    ) -> Result<FetchResult, LinkError>;
}

/// The remainder of the chain after the current link.
#[derive(Clone, Copy)]
pub struct Forward<'a> {
    rest: &'a [Arc<dyn Link>],
}

impl<'a> Forward<'a> {
    /// A forward with nothing behind it.
    pub fn terminal() -> Self {
        Self { rest: &[] }
    }

    /// Pass `operation` to the next link.
    pub async fn run(self, operation: Operation) -> Result<FetchResult, LinkError> {
        match self.rest.split_first() {
            Some((next, rest)) => next.request(operation, Forward { rest }).await,
            None => Err(LinkError::Unterminated),
        }
    }
}

/// An ordered chain of links.
pub struct LinkChain {
    links: Vec<Arc<dyn Link>>,
}

impl LinkChain {
    pub fn from_links(links: Vec<Arc<dyn Link>>) -> Self {
        Self { links }
    }

    /// Run `operation` through the chain from the first link.
    pub async fn execute(&self, operation: Operation) -> Result<FetchResult, LinkError> {
        Forward { rest: &self.links }.run(operation).await
    }

    pub fn len(&self) -> usize {
        self.links.len()
    }

    pub fn is_empty(&self) -> bool {
        self.links.is_empty()
    }
}
