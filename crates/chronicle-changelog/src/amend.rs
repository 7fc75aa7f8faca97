//! Pull request annotation of staged changes
//!
//! Finds change files a pull request adds to the staging directory and
//! attaches the pull request reference to those that have none, either by
//! rewriting the file or by suggesting the rewrite in a review comment.

use std::path::{Path, PathBuf};

use chronicle_core::error::{ChangelogError, ConfigError};
use chronicle_core::Result;
use chronicle_git::GitRepo;
use chronicle_github::{GitHubClient, NewReviewComment, PostOutcome, PullRequest};
use tracing::{debug, info, instrument, warn};

use crate::store::{ChangeStore, RECORD_EXTENSION};

/// Options for one amend run
#[derive(Debug, Clone)]
pub struct AmendOptions {
    /// Pull request whose reference is attached
    pub pull_request: PullRequest,
    /// Branch the pull request merges into
    pub base_branch: String,
    /// Suggest the change in a review comment instead of patching the file
    pub review_comment: bool,
    /// Add patched files to the git index
    pub stage: bool,
}

/// What happened to one staged change file
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AmendAction {
    /// Already carried a reference; left alone
    Skipped { path: PathBuf },
    /// Reference written into the file
    Patched { path: PathBuf },
    /// Reference suggested in a review comment
    Suggested { path: PathBuf, outcome: PostOutcome },
}

/// Result of an amend run
#[derive(Debug, Clone, Default)]
pub struct AmendReport {
    /// One action per staged file the pull request adds
    pub actions: Vec<AmendAction>,
    /// Reminder posted because the pull request adds no staged change
    pub reminder: Option<PostOutcome>,
}

/// Attaches pull request references to newly staged changes.
///
/// Only staged files are amended. Releases that were already cut keep the
/// references they were cut with.
pub struct AmendWorkflow<'a> {
    store: &'a ChangeStore,
    repo: &'a GitRepo,
    client: Option<&'a GitHubClient>,
}

impl<'a> AmendWorkflow<'a> {
    /// Create a workflow that can only patch files locally
    pub fn new(store: &'a ChangeStore, repo: &'a GitRepo) -> Self {
        Self {
            store,
            repo,
            client: None,
        }
    }

    /// Attach a client for review-comment mode
    pub fn with_client(mut self, client: &'a GitHubClient) -> Self {
        self.client = Some(client);
        self
    }

    /// Run the workflow
    #[instrument(skip(self, options), fields(pr = options.pull_request.number, review = options.review_comment))]
    pub fn run(&self, options: &AmendOptions) -> Result<AmendReport> {
        let client = match (options.review_comment, self.client) {
            (true, None) => {
                return Err(ConfigError::MissingContext("API client for review comments".into()).into())
            }
            (true, Some(client)) => Some(client),
            (false, _) => None,
        };

        let files = self.added_change_files(&options.base_branch)?;
        let reference = options.pull_request.reference();
        let mut report = AmendReport::default();

        // Every file is parsed before anything is patched or posted
        let mut parsed = Vec::with_capacity(files.len());
        for relative in &files {
            let path = self.absolute(relative);
            let change = self.store.read_staged(&path)?;
            parsed.push((relative, path, change));
        }

        for (relative, path, change) in parsed {
            if !change.pull_requests.is_empty() {
                debug!(path = %relative.display(), "change already references a pull request");
                report.actions.push(AmendAction::Skipped {
                    path: relative.clone(),
                });
                continue;
            }

            let amended = change.with_pull_requests(vec![reference.clone()]);
            match client {
                Some(client) => {
                    let current = std::fs::read_to_string(&path).map_err(ChangelogError::Io)?;
                    let comment = suggestion_comment(relative, &current, &amended.to_json()?);
                    let outcome =
                        client.post_review_comment(&options.pull_request, &comment, false)?;
                    report.actions.push(AmendAction::Suggested {
                        path: relative.clone(),
                        outcome,
                    });
                }
                None => {
                    self.store.patch_staged(&path, &amended)?;
                    if options.stage {
                        self.repo.stage_path(&path)?;
                    }
                    report.actions.push(AmendAction::Patched {
                        path: relative.clone(),
                    });
                }
            }
        }

        if files.is_empty() {
            match client {
                Some(client) => {
                    let body = reminder_body(&self.store.layout().next_release_relative());
                    report.reminder =
                        Some(client.post_comment(&options.pull_request, &body, false)?);
                }
                None => warn!("pull request adds no staged changes"),
            }
        }

        info!(
            files = files.len(),
            reminder = report.reminder.is_some(),
            "amend complete"
        );
        Ok(report)
    }

    /// Staged change files added since `base`, relative to the repository root
    fn added_change_files(&self, base: &str) -> Result<Vec<PathBuf>> {
        let staging = self
            .repo
            .relative_to_workdir(&self.store.layout().next_release_dir)?;
        let files: Vec<PathBuf> = self
            .repo
            .added_files_since(base)?
            .into_iter()
            .filter(|p| p.parent() == Some(staging.as_path()))
            .filter(|p| p.extension().and_then(|e| e.to_str()) == Some(RECORD_EXTENSION))
            .collect();
        debug!(count = files.len(), staging = %staging.display(), "found added change files");
        Ok(files)
    }

    fn absolute(&self, relative: &Path) -> PathBuf {
        match self.repo.workdir() {
            Some(workdir) => workdir.join(relative),
            None => self.store.layout().root.join(relative),
        }
    }
}

/// Review comment replacing the whole file with `replacement`
fn suggestion_comment(path: &Path, current: &str, replacement: &str) -> NewReviewComment {
    let line_count = current.lines().count().max(1) as u32;
    let body = format!(
        "This changelog entry does not reference its pull request yet. \
         Accepting this suggestion adds the reference.\n\n\
         ```suggestion\n{}\n```",
        replacement.trim_end()
    );
    NewReviewComment {
        body,
        path: path.to_string_lossy().replace('\\', "/"),
        start_line: Some(1),
        end_line: (line_count > 1).then_some(line_count),
    }
}

/// Conversation comment sent when a pull request adds no staged change
fn reminder_body(staging: &Path) -> String {
    format!(
        "This pull request does not add a changelog entry. If it makes a \
         user-facing change, run `chronicle new` and commit the generated file \
         under `{}`.",
        staging.display()
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{Change, ChangeType};
    use chronicle_core::config::GitHubConfig;
    use chronicle_core::{ChangesLayout, ChronicleError};
    use chronicle_github::{ApiRequest, ApiResponse, HttpTransport, Method, RemoteContext};
    use git2::{Repository, Signature};
    use std::collections::VecDeque;
    use std::sync::{Arc, Mutex};
    use tempfile::TempDir;

    #[derive(Default)]
    struct FakeState {
        responses: VecDeque<ApiResponse>,
        requests: Vec<ApiRequest>,
    }

    #[derive(Clone, Default)]
    struct FakeTransport {
        state: Arc<Mutex<FakeState>>,
    }

    impl FakeTransport {
        fn push(&self, status: u16, body: serde_json::Value) {
            self.state.lock().unwrap().responses.push_back(ApiResponse {
                status,
                link: None,
                body: body.to_string(),
            });
        }

        fn requests(&self) -> Vec<ApiRequest> {
            self.state.lock().unwrap().requests.clone()
        }
    }

    impl HttpTransport for FakeTransport {
        fn send(&self, request: &ApiRequest) -> chronicle_github::Result<ApiResponse> {
            let mut state = self.state.lock().unwrap();
            state.requests.push(request.clone());
            Ok(state.responses.pop_front().unwrap_or(ApiResponse {
                status: 500,
                link: None,
                body: "no canned response".to_string(),
            }))
        }
    }

    struct Fixture {
        temp: TempDir,
        git: Repository,
        store: ChangeStore,
    }

    impl Fixture {
        /// Repository with an initial commit on `base`
        fn new() -> Self {
            let temp = TempDir::new().unwrap();
            let git = Repository::init(temp.path()).unwrap();
            let store = ChangeStore::new(ChangesLayout::with_defaults(temp.path()));
            let fixture = Self { temp, git, store };
            std::fs::write(fixture.temp.path().join("README.md"), "readme").unwrap();
            fixture.commit(&["README.md"]);
            {
                let head = fixture.git.head().unwrap().peel_to_commit().unwrap();
                fixture.git.branch("base", &head, false).unwrap();
            }
            fixture
        }

        fn commit(&self, paths: &[&str]) {
            let mut index = self.git.index().unwrap();
            for path in paths {
                index.add_path(Path::new(path)).unwrap();
            }
            index.write().unwrap();
            let tree = self.git.find_tree(index.write_tree().unwrap()).unwrap();
            let sig = Signature::now("Test", "test@example.com").unwrap();
            let parents = match self.git.head() {
                Ok(head) => vec![head.peel_to_commit().unwrap()],
                Err(_) => vec![],
            };
            let parent_refs: Vec<_> = parents.iter().collect();
            self.git
                .commit(Some("HEAD"), &sig, &sig, "commit", &tree, &parent_refs)
                .unwrap();
        }

        /// Stage a change file and commit it, returning its repository-relative path
        fn commit_change(&self, change: &Change) -> PathBuf {
            let path = self.store.write_staged(change).unwrap();
            let relative = path.strip_prefix(self.temp.path()).unwrap().to_path_buf();
            self.commit(&[relative.to_str().unwrap()]);
            relative
        }

        fn repo(&self) -> GitRepo {
            GitRepo::open(self.temp.path()).unwrap()
        }
    }

    fn options(review_comment: bool) -> AmendOptions {
        AmendOptions {
            pull_request: PullRequest::new("owner/repo", 42).unwrap(),
            base_branch: "base".to_string(),
            review_comment,
            stage: true,
        }
    }

    fn client(transport: &FakeTransport) -> GitHubClient {
        GitHubClient::with_transport(
            &GitHubConfig::default(),
            RemoteContext::new("token", "abc123").unwrap(),
            transport.clone(),
        )
    }

    const REFERENCE: &str = "[#42](https://github.com/owner/repo/pull/42)";

    #[test]
    fn test_patch_mode_backfills_reference() {
        let fixture = Fixture::new();
        let relative = fixture.commit_change(&Change::new(ChangeType::Feature, "Add X").unwrap());
        let repo = fixture.repo();

        let report = AmendWorkflow::new(&fixture.store, &repo)
            .run(&options(false))
            .unwrap();

        assert_eq!(
            report.actions,
            vec![AmendAction::Patched {
                path: relative.clone()
            }]
        );
        let patched = fixture
            .store
            .read_staged(&fixture.temp.path().join(&relative))
            .unwrap();
        assert_eq!(patched.pull_requests, vec![REFERENCE]);
        assert!(repo.is_staged(&relative).unwrap());
    }

    #[test]
    fn test_existing_reference_is_never_overwritten() {
        let fixture = Fixture::new();
        let original = Change::new(ChangeType::BugFix, "Fix Y")
            .unwrap()
            .with_pull_requests(vec!["[#1](https://github.com/owner/repo/pull/1)".into()]);
        let relative = fixture.commit_change(&original);
        let repo = fixture.repo();

        let report = AmendWorkflow::new(&fixture.store, &repo)
            .run(&options(false))
            .unwrap();

        assert_eq!(
            report.actions,
            vec![AmendAction::Skipped {
                path: relative.clone()
            }]
        );
        let after = fixture
            .store
            .read_staged(&fixture.temp.path().join(&relative))
            .unwrap();
        assert_eq!(after, original);
    }

    #[test]
    fn test_files_outside_staging_are_ignored() {
        let fixture = Fixture::new();
        let other = fixture.temp.path().join(".changes/releases/1.0.0.json");
        std::fs::create_dir_all(other.parent().unwrap()).unwrap();
        std::fs::write(&other, "{}").unwrap();
        std::fs::write(fixture.temp.path().join("notes.json"), "{}").unwrap();
        fixture.commit(&[".changes/releases/1.0.0.json", "notes.json"]);
        let repo = fixture.repo();

        let report = AmendWorkflow::new(&fixture.store, &repo)
            .run(&options(false))
            .unwrap();
        assert!(report.actions.is_empty());
        assert!(report.reminder.is_none());
    }

    #[test]
    fn test_review_mode_posts_suggestion() {
        let fixture = Fixture::new();
        let change = Change::new(ChangeType::Feature, "Add X").unwrap();
        let relative = fixture.commit_change(&change);
        let before = std::fs::read_to_string(fixture.temp.path().join(&relative)).unwrap();
        let repo = fixture.repo();

        let transport = FakeTransport::default();
        transport.push(200, serde_json::json!([]));
        transport.push(201, serde_json::json!({"id": 9, "path": relative.to_str().unwrap()}));
        let client = client(&transport);

        let report = AmendWorkflow::new(&fixture.store, &repo)
            .with_client(&client)
            .run(&options(true))
            .unwrap();

        assert_eq!(
            report.actions,
            vec![AmendAction::Suggested {
                path: relative.clone(),
                outcome: PostOutcome::Created { id: 9 },
            }]
        );

        let requests = transport.requests();
        assert_eq!(requests.len(), 2);
        assert_eq!(requests[1].method, Method::Post);
        assert!(requests[1].url.ends_with("/repos/owner/repo/pulls/42/comments"));
        let body = requests[1].body.clone().unwrap();
        assert_eq!(body["path"], relative.to_str().unwrap());
        assert_eq!(body["start_line"], 1);
        assert_eq!(body["line"], before.lines().count());
        let text = body["body"].as_str().unwrap();
        assert!(text.contains("```suggestion\n"));
        assert!(text.contains(REFERENCE));

        // The file itself is untouched
        let after = std::fs::read_to_string(fixture.temp.path().join(&relative)).unwrap();
        assert_eq!(after, before);
    }

    #[test]
    fn test_review_mode_reminds_when_nothing_staged() {
        let fixture = Fixture::new();
        std::fs::write(fixture.temp.path().join("src.rs"), "fn main() {}").unwrap();
        fixture.commit(&["src.rs"]);
        let repo = fixture.repo();

        let transport = FakeTransport::default();
        transport.push(200, serde_json::json!([{"id": 1, "body": "unrelated"}]));
        transport.push(201, serde_json::json!({"id": 2, "body": "reminder"}));
        let client = client(&transport);

        let report = AmendWorkflow::new(&fixture.store, &repo)
            .with_client(&client)
            .run(&options(true))
            .unwrap();

        assert_eq!(report.reminder, Some(PostOutcome::Created { id: 2 }));
        let requests = transport.requests();
        assert!(requests[1].url.ends_with("/repos/owner/repo/issues/42/comments"));
        let body = requests[1].body.clone().unwrap();
        assert!(body["body"].as_str().unwrap().contains("chronicle new"));
    }

    #[test]
    fn test_review_mode_requires_client() {
        let fixture = Fixture::new();
        let relative = fixture.commit_change(&Change::new(ChangeType::Other, "Z").unwrap());
        let repo = fixture.repo();

        let result = AmendWorkflow::new(&fixture.store, &repo).run(&options(true));
        assert!(matches!(
            result,
            Err(ChronicleError::Config(ConfigError::MissingContext(_)))
        ));
        let unchanged = fixture
            .store
            .read_staged(&fixture.temp.path().join(&relative))
            .unwrap();
        assert!(unchanged.pull_requests.is_empty());
    }

    #[test]
    fn test_malformed_file_aborts_before_any_patch() {
        let fixture = Fixture::new();
        let good = fixture.commit_change(&Change::new(ChangeType::BugFix, "Fix Y").unwrap());
        let bad = fixture.temp.path().join(".changes/next-release/zzz-broken.json");
        std::fs::write(&bad, "{ not json").unwrap();
        fixture.commit(&[".changes/next-release/zzz-broken.json"]);
        let repo = fixture.repo();

        let result = AmendWorkflow::new(&fixture.store, &repo).run(&options(false));
        assert!(matches!(
            result,
            Err(ChronicleError::Changelog(ChangelogError::ParseFailed { .. }))
        ));
        let untouched = fixture
            .store
            .read_staged(&fixture.temp.path().join(&good))
            .unwrap();
        assert!(untouched.pull_requests.is_empty());
    }

    #[test]
    fn test_single_line_file_uses_single_anchor() {
        let comment = suggestion_comment(Path::new("a.json"), "{}", "{\"x\": 1}\n");
        assert_eq!(comment.start_line, Some(1));
        assert_eq!(comment.end_line, None);
        assert!(comment.body.ends_with("```suggestion\n{\"x\": 1}\n```"));
    }
}
