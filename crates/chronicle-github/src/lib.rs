//! Chronicle GitHub - pull request review API client
//!
//! Posts conversation and review comments on pull requests, skipping bodies
//! that are already present, and lists existing comments page by page.

mod client;
mod link;
mod transport;
mod types;

pub use client::{GitHubClient, Pages, PAGE_DELAY};
pub use link::{next_page, parse_link_header};
pub use transport::{ApiRequest, ApiResponse, HttpTransport, Method, ReqwestTransport};
pub use types::{Comment, NewReviewComment, PostOutcome, PullRequest, RemoteContext, ReviewComment};

/// Result type for remote operations
pub type Result<T> = std::result::Result<T, chronicle_core::error::RemoteError>;
