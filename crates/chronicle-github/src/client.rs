//! Review API client
//!
//! Lists and creates pull-request conversation comments and review comments.
//! Listings are paginated through the `Link` header and produced lazily, with
//! a fixed pause between pages to stay clear of the API's abuse limits.

use std::time::Duration;

use chronicle_core::config::GitHubConfig;
use chronicle_core::error::RemoteError;
use serde::de::DeserializeOwned;
use serde_json::{json, Value};
use tracing::{debug, info, instrument, warn};

use crate::link::next_page;
use crate::transport::{ApiRequest, ApiResponse, HttpTransport, Method, ReqwestTransport};
use crate::types::{Comment, NewReviewComment, PostOutcome, PullRequest, RemoteContext, ReviewComment};
use crate::Result;

/// Pause between consecutive listing pages
pub const PAGE_DELAY: Duration = Duration::from_secs(60);

/// Items requested per listing page
const PER_PAGE: u32 = 100;

/// Timeout for a single request
const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

const API_VERSION: &str = "2022-11-28";

/// Client for the code-hosting review API
pub struct GitHubClient {
    transport: Box<dyn HttpTransport>,
    api_url: String,
    user_agent: String,
    context: RemoteContext,
    page_delay: Duration,
}

impl GitHubClient {
    /// Create a client backed by a blocking HTTP transport
    pub fn new(config: &GitHubConfig, context: RemoteContext) -> Result<Self> {
        let transport = ReqwestTransport::new(REQUEST_TIMEOUT)?;
        Ok(Self::with_transport(config, context, transport))
    }

    /// Create a client over a custom transport
    pub fn with_transport<T: HttpTransport + 'static>(
        config: &GitHubConfig,
        context: RemoteContext,
        transport: T,
    ) -> Self {
        Self {
            transport: Box::new(transport),
            api_url: config.api_url.trim_end_matches('/').to_string(),
            user_agent: config.user_agent.clone(),
            context,
            page_delay: PAGE_DELAY,
        }
    }

    #[cfg(test)]
    pub(crate) fn with_page_delay(mut self, delay: Duration) -> Self {
        self.page_delay = delay;
        self
    }

    #[cfg(test)]
    pub(crate) fn without_page_delay(self) -> Self {
        self.with_page_delay(Duration::ZERO)
    }

    /// The execution context this client acts in
    pub fn context(&self) -> &RemoteContext {
        &self.context
    }

    fn headers(&self) -> Vec<(String, String)> {
        vec![
            (
                "Authorization".to_string(),
                format!("Bearer {}", self.context.token()),
            ),
            (
                "Accept".to_string(),
                "application/vnd.github+json".to_string(),
            ),
            ("User-Agent".to_string(), self.user_agent.clone()),
            ("X-GitHub-Api-Version".to_string(), API_VERSION.to_string()),
        ]
    }

    /// Send a request and reject non-2xx responses
    fn request(&self, method: Method, url: &str, body: Option<Value>) -> Result<ApiResponse> {
        let request = ApiRequest {
            method,
            url: url.to_string(),
            headers: self.headers(),
            body,
        };

        let response = self.transport.send(&request)?;
        if !response.is_success() {
            let payload = serde_json::from_str(&response.body)
                .unwrap_or_else(|_| Value::String(response.body.clone()));
            warn!(status = response.status, url, "API request failed");
            return Err(RemoteError::Api {
                status: response.status,
                payload,
            });
        }

        Ok(response)
    }

    fn fetch_page<T: DeserializeOwned>(&self, url: &str) -> Result<(Vec<T>, Option<String>)> {
        let response = self.request(Method::Get, url, None)?;
        let items: Vec<T> = serde_json::from_str(&response.body)
            .map_err(|e| RemoteError::Decode(e.to_string()))?;
        let next = response.link.as_deref().and_then(next_page);
        debug!(url, count = items.len(), has_next = next.is_some(), "fetched page");
        Ok((items, next))
    }

    fn issue_comments_url(&self, target: &PullRequest) -> String {
        format!(
            "{}/repos/{}/{}/issues/{}/comments",
            self.api_url, target.owner, target.repo, target.number
        )
    }

    fn review_comments_url(&self, target: &PullRequest) -> String {
        format!(
            "{}/repos/{}/{}/pulls/{}/comments",
            self.api_url, target.owner, target.repo, target.number
        )
    }

    fn paginate<T: DeserializeOwned>(&self, url: String) -> Pages<'_, T> {
        Pages {
            client: self,
            next_url: Some(format!("{}?per_page={}", url, PER_PAGE)),
            buffer: Vec::new().into_iter(),
            pages_fetched: 0,
        }
    }

    /// Lazily list the conversation comments on a pull request
    pub fn list_comments(&self, target: &PullRequest) -> Pages<'_, Comment> {
        self.paginate(self.issue_comments_url(target))
    }

    /// Lazily list the review comments on a pull request
    pub fn list_review_comments(&self, target: &PullRequest) -> Pages<'_, ReviewComment> {
        self.paginate(self.review_comments_url(target))
    }

    /// Post a conversation comment.
    ///
    /// Unless `allow_duplicate` is set, an existing comment with a
    /// byte-identical body turns this into a no-op.
    #[instrument(skip(self, body), fields(pr = target.number, body_len = body.len()))]
    pub fn post_comment(
        &self,
        target: &PullRequest,
        body: &str,
        allow_duplicate: bool,
    ) -> Result<PostOutcome> {
        if !allow_duplicate {
            for comment in self.list_comments(target) {
                let comment = comment?;
                if comment.body() == body {
                    info!(id = comment.id, "identical comment already posted, skipping");
                    return Ok(PostOutcome::Duplicate { id: comment.id });
                }
            }
        }

        let response = self.request(
            Method::Post,
            &self.issue_comments_url(target),
            Some(json!({ "body": body })),
        )?;
        let created: Comment = serde_json::from_str(&response.body)
            .map_err(|e| RemoteError::Decode(e.to_string()))?;
        info!(id = created.id, "posted comment");
        Ok(PostOutcome::Created { id: created.id })
    }

    /// Post a review comment anchored to a file.
    ///
    /// Duplicates are matched on path and body together. The line anchor is
    /// validated before anything is sent.
    #[instrument(skip(self, comment), fields(pr = target.number, path = %comment.path))]
    pub fn post_review_comment(
        &self,
        target: &PullRequest,
        comment: &NewReviewComment,
        allow_duplicate: bool,
    ) -> Result<PostOutcome> {
        let payload = self.review_comment_payload(comment)?;

        if !allow_duplicate {
            for existing in self.list_review_comments(target) {
                let existing = existing?;
                if existing.path == comment.path && existing.body() == comment.body {
                    info!(id = existing.id, "identical review comment already posted, skipping");
                    return Ok(PostOutcome::Duplicate { id: existing.id });
                }
            }
        }

        let response = self.request(Method::Post, &self.review_comments_url(target), Some(payload))?;
        let created: ReviewComment = serde_json::from_str(&response.body)
            .map_err(|e| RemoteError::Decode(e.to_string()))?;
        info!(id = created.id, "posted review comment");
        Ok(PostOutcome::Created { id: created.id })
    }

    fn review_comment_payload(&self, comment: &NewReviewComment) -> Result<Value> {
        let mut payload = json!({
            "body": comment.body,
            "commit_id": self.context.commit(),
            "path": comment.path,
        });

        match (comment.start_line, comment.end_line) {
            (None, Some(end_line)) => return Err(RemoteError::InvalidLineRange { end_line }),
            (Some(start_line), Some(end_line)) if start_line > end_line => {
                return Err(RemoteError::InvertedLineRange {
                    start_line,
                    end_line,
                });
            }
            (Some(start), Some(end)) if start < end => {
                payload["start_line"] = json!(start);
                payload["start_side"] = json!("RIGHT");
                payload["line"] = json!(end);
                payload["side"] = json!("RIGHT");
            }
            (Some(line), _) => {
                payload["line"] = json!(line);
                payload["side"] = json!("RIGHT");
            }
            (None, None) => {
                payload["subject_type"] = json!("file");
            }
        }

        Ok(payload)
    }
}

/// Lazily fetched listing.
///
/// Pages are requested only when the consumer drains the previous one, so
/// stopping early skips the remaining requests and their delays. An error
/// ends the sequence.
pub struct Pages<'a, T> {
    client: &'a GitHubClient,
    next_url: Option<String>,
    buffer: std::vec::IntoIter<T>,
    pages_fetched: usize,
}

impl<T: DeserializeOwned> Iterator for Pages<'_, T> {
    type Item = Result<T>;

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            if let Some(item) = self.buffer.next() {
                return Some(Ok(item));
            }

            let url = self.next_url.take()?;
            if self.pages_fetched > 0 && !self.client.page_delay.is_zero() {
                debug!(delay_secs = self.client.page_delay.as_secs(), "waiting before next page");
                std::thread::sleep(self.client.page_delay);
            }

            match self.client.fetch_page::<T>(&url) {
                Ok((items, next)) => {
                    self.pages_fetched += 1;
                    self.next_url = next;
                    self.buffer = items.into_iter();
                }
                Err(e) => return Some(Err(e)),
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::transport::testing::RecordingTransport;
    use std::sync::Arc;

    fn client(transport: &Arc<RecordingTransport>) -> GitHubClient {
        let config = GitHubConfig::default();
        let context = RemoteContext::new("token", "abc123").unwrap();
        GitHubClient::with_transport(&config, context, Arc::clone(transport)).without_page_delay()
    }

    fn target() -> PullRequest {
        PullRequest::new("owner/repo", 7).unwrap()
    }

    #[test]
    fn test_request_headers() {
        let transport = Arc::new(RecordingTransport::new());
        transport.push(200, json!([]), None);
        let client = client(&transport);

        let comments: Vec<_> = client.list_comments(&target()).collect();
        assert!(comments.is_empty());

        let requests = transport.requests();
        assert_eq!(
            requests[0].url,
            "https://api.github.com/repos/owner/repo/issues/7/comments?per_page=100"
        );
        assert!(requests[0]
            .headers
            .iter()
            .any(|(k, v)| k == "Authorization" && v == "Bearer token"));
    }

    #[test]
    fn test_list_comments_follows_next_link() {
        let transport = Arc::new(RecordingTransport::new());
        transport.push(
            200,
            json!([{"id": 1, "body": "a"}, {"id": 2, "body": "b"}]),
            Some(r#"<https://api.github.com/page2>; rel="next", <https://api.github.com/page2>; rel="last""#),
        );
        transport.push(200, json!([{"id": 3, "body": "c"}]), None);
        let client = client(&transport);

        let ids: Vec<u64> = client
            .list_comments(&target())
            .map(|c| c.unwrap().id)
            .collect();
        assert_eq!(ids, vec![1, 2, 3]);

        let requests = transport.requests();
        assert_eq!(requests.len(), 2);
        assert_eq!(requests[1].url, "https://api.github.com/page2");
    }

    #[test]
    fn test_delay_only_between_pages() {
        let delay = Duration::from_millis(150);
        let transport = Arc::new(RecordingTransport::new());
        transport.push(
            200,
            json!([{"id": 1, "body": "a"}]),
            Some(r#"<https://api.github.com/page2>; rel="next""#),
        );
        transport.push(
            200,
            json!([{"id": 2, "body": "b"}]),
            Some(r#"<https://api.github.com/page3>; rel="next""#),
        );
        transport.push(200, json!([{"id": 3, "body": "c"}]), None);
        let client = client(&transport).with_page_delay(delay);

        let start = std::time::Instant::now();
        let mut pages = client.list_comments(&target());
        assert_eq!(pages.next().unwrap().unwrap().id, 1);
        assert!(start.elapsed() < delay, "first page was delayed");

        let rest: Vec<u64> = pages.map(|c| c.unwrap().id).collect();
        assert_eq!(rest, vec![2, 3]);
        assert!(start.elapsed() >= delay * 2);
        assert_eq!(transport.requests().len(), 3);
    }

    #[test]
    fn test_list_comments_is_lazy() {
        let transport = Arc::new(RecordingTransport::new());
        transport.push(
            200,
            json!([{"id": 1, "body": "a"}]),
            Some(r#"<https://api.github.com/page2>; rel="next""#),
        );
        let client = client(&transport);

        let first = client.list_comments(&target()).next().unwrap().unwrap();
        assert_eq!(first.id, 1);
        assert_eq!(transport.requests().len(), 1);
    }

    #[test]
    fn test_error_response_carries_payload() {
        let transport = Arc::new(RecordingTransport::new());
        transport.push(403, json!({"message": "Resource not accessible"}), None);
        let client = client(&transport);

        let result: Vec<_> = client.list_comments(&target()).collect();
        assert_eq!(result.len(), 1);
        match &result[0] {
            Err(RemoteError::Api { status, payload }) => {
                assert_eq!(*status, 403);
                assert_eq!(payload["message"], "Resource not accessible");
            }
            other => panic!("unexpected result: {:?}", other),
        }
        // No retry after an error
        assert_eq!(transport.requests().len(), 1);
    }

    #[test]
    fn test_post_comment_twice_creates_once() {
        let transport = Arc::new(RecordingTransport::new());
        // First call: empty listing, then creation
        transport.push(200, json!([]), None);
        transport.push(201, json!({"id": 10, "body": "hello"}), None);
        // Second call: listing now contains the comment
        transport.push(200, json!([{"id": 10, "body": "hello"}]), None);
        let client = client(&transport);

        let first = client.post_comment(&target(), "hello", false).unwrap();
        let second = client.post_comment(&target(), "hello", false).unwrap();

        assert_eq!(first, PostOutcome::Created { id: 10 });
        assert_eq!(second, PostOutcome::Duplicate { id: 10 });
        assert_eq!(transport.count(Method::Post), 1);
    }

    #[test]
    fn test_post_comment_allow_duplicate_skips_listing() {
        let transport = Arc::new(RecordingTransport::new());
        transport.push(201, json!({"id": 11, "body": "hello"}), None);
        let client = client(&transport);

        let outcome = client.post_comment(&target(), "hello", true).unwrap();
        assert!(outcome.is_created());
        assert_eq!(transport.count(Method::Get), 0);
    }

    #[test]
    fn test_review_comment_duplicate_is_scoped_to_path() {
        let transport = Arc::new(RecordingTransport::new());
        transport.push(
            200,
            json!([{"id": 5, "body": "same", "path": "other.json", "line": 1}]),
            None,
        );
        transport.push(201, json!({"id": 6, "body": "same", "path": "a.json", "line": 1}), None);
        let client = client(&transport);

        let comment = NewReviewComment {
            body: "same".to_string(),
            path: "a.json".to_string(),
            start_line: Some(1),
            end_line: None,
        };
        let outcome = client.post_review_comment(&target(), &comment, false).unwrap();
        assert_eq!(outcome, PostOutcome::Created { id: 6 });
    }

    #[test]
    fn test_review_comment_range_payload() {
        let transport = Arc::new(RecordingTransport::new());
        transport.push(201, json!({"id": 6, "body": "x", "path": "a.json"}), None);
        let client = client(&transport);

        let comment = NewReviewComment {
            body: "x".to_string(),
            path: "a.json".to_string(),
            start_line: Some(1),
            end_line: Some(5),
        };
        client.post_review_comment(&target(), &comment, true).unwrap();

        let body = transport.requests()[0].body.clone().unwrap();
        assert_eq!(body["start_line"], 1);
        assert_eq!(body["line"], 5);
        assert_eq!(body["commit_id"], "abc123");
        assert_eq!(body["side"], "RIGHT");
    }

    #[test]
    fn test_review_comment_end_without_start_fails_fast() {
        let transport = Arc::new(RecordingTransport::new());
        let client = client(&transport);

        let comment = NewReviewComment {
            body: "x".to_string(),
            path: "a.json".to_string(),
            start_line: None,
            end_line: Some(3),
        };
        let result = client.post_review_comment(&target(), &comment, false);
        assert!(matches!(result, Err(RemoteError::InvalidLineRange { end_line: 3 })));
        assert!(transport.requests().is_empty());
    }

    #[test]
    fn test_review_comment_inverted_range_fails_fast() {
        let transport = Arc::new(RecordingTransport::new());
        let client = client(&transport);

        let comment = NewReviewComment {
            body: "x".to_string(),
            path: "a.json".to_string(),
            start_line: Some(4),
            end_line: Some(2),
        };
        let result = client.post_review_comment(&target(), &comment, true);
        assert!(matches!(
            result,
            Err(RemoteError::InvertedLineRange {
                start_line: 4,
                end_line: 2
            })
        ));
        assert!(transport.requests().is_empty());
    }

    #[test]
    fn test_review_comment_file_level() {
        let transport = Arc::new(RecordingTransport::new());
        transport.push(201, json!({"id": 8, "path": "a.json"}), None);
        let client = client(&transport);

        let comment = NewReviewComment {
            body: "x".to_string(),
            path: "a.json".to_string(),
            start_line: None,
            end_line: None,
        };
        client.post_review_comment(&target(), &comment, true).unwrap();
        let body = transport.requests()[0].body.clone().unwrap();
        assert_eq!(body["subject_type"], "file");
        assert!(body.get("line").is_none());
    }
}
