use std::fs;
use std::path::Path;

use chrono::Utc;
use git2::build::CheckoutBuilder;
use git2::{AnnotatedCommit, Rebase, Repository, Signature};

use mnemo_core::merge::is_daily_log_name;
use mnemo_core::store::{MemoryStore, HANDOFF_DOC, MEMORY_DOC};

use crate::error::SyncError;
use crate::ledger::{content_hash, DivergenceLedger};

const DEFAULT_REMOTE: &str = "origin";
const DEFAULT_BRANCH: &str = "main";

/// Result of a pull.
#[derive(Debug, Default)]
pub struct PullReport {
    /// The remote-tracking refresh (fetch + fast-forward/rebase) succeeded.
    pub refreshed: bool,
    /// Documents copied repository -> local.
    pub updated: Vec<String>,
    /// Advisory divergence warnings. Never block anything.
    pub warnings: Vec<String>,
}

/// Result of a push.
#[derive(Debug, Default)]
pub struct PushReport {
    /// Documents copied local -> repository.
    pub copied: Vec<String>,
    /// Repository-only documents pulled into the local copy.
    pub pulled_in: Vec<String>,
    pub committed: bool,
    pub pushed: bool,
}

/// Mirrors a project's memory directory against a version-controlled
/// shared repository. Whole-file content comparison decides every copy;
/// a commit is created only when the staged tree actually changed.
///
/// There is no cross-machine locking: concurrent pushes race and the
/// last writer wins at the file level. The pull-before-push sequencing
/// reduces, but does not eliminate, lost updates.
pub struct SyncEngine {
    repo: Repository,
    store: MemoryStore,
}

impl SyncEngine {
    /// Open an existing sync working copy.
    pub fn open(repo_dir: &Path, store: MemoryStore) -> Result<Self, SyncError> {
        let repo = Repository::open(repo_dir)?;
        Ok(Self { repo, store })
    }

    /// Clone the shared repository into a fresh working copy.
    pub fn clone_remote(url: &str, repo_dir: &Path, store: MemoryStore) -> Result<Self, SyncError> {
        if let Some(parent) = repo_dir.parent() {
            fs::create_dir_all(parent)?;
        }
        let repo = Repository::clone(url, repo_dir)?;
        Ok(Self { repo, store })
    }

    pub fn store(&self) -> &MemoryStore {
        &self.store
    }

    /// Session-start direction: refresh from the remote, then copy every
    /// tracked repository document over the local copy when it differs or
    /// is locally absent.
    pub fn pull(&self) -> Result<PullReport, SyncError> {
        let mut report = PullReport::default();
        match self.refresh_remote() {
            Ok(()) => report.refreshed = true,
            Err(e) => tracing::debug!("Remote refresh failed, using current repo state: {e}"),
        }

        let workdir = self.workdir()?;
        let mut ledger = DivergenceLedger::load(&self.store);
        let mut ledger_dirty = false;

        for name in self.tracked_repo_documents()? {
            let repo_bytes = fs::read(workdir.join(&name))?;
            let local = self.store.read_document(&name)?;
            if local.as_deref().map(str::as_bytes) == Some(repo_bytes.as_slice()) {
                continue;
            }
            let repo_hash = content_hash(&repo_bytes);
            if let (Some(local), Some(recorded)) = (&local, ledger.recorded(&name)) {
                let local_hash = content_hash(local.as_bytes());
                if repo_hash != recorded && local_hash != recorded {
                    report.warnings.push(format!(
                        "{name} changed on another machine and locally since the last \
                         sync; keeping the remote copy"
                    ));
                }
            }
            self.store
                .write_document(&name, &String::from_utf8_lossy(&repo_bytes))?;
            ledger.record(&name, repo_hash);
            ledger_dirty = true;
            report.updated.push(name);
        }

        if ledger_dirty {
            ledger.save(&self.store)?;
        }
        Ok(report)
    }

    /// Checkpoint direction: refresh from the remote, copy differing local
    /// documents into the repository, pull in repository-only documents,
    /// then commit and push only when something actually changed.
    pub fn push(&self) -> Result<PushReport, SyncError> {
        if let Err(e) = self.refresh_remote() {
            tracing::debug!("Remote refresh failed before push: {e}");
        }

        let workdir = self.workdir()?;
        let mut report = PushReport::default();
        let mut ledger = DivergenceLedger::load(&self.store);

        for name in self.tracked_local_documents()? {
            let Some(local) = self.store.read_document(&name)? else {
                continue;
            };
            let repo_path = workdir.join(&name);
            let repo_bytes = fs::read(&repo_path).ok();
            if repo_bytes.as_deref() != Some(local.as_bytes()) {
                fs::write(&repo_path, local.as_bytes())?;
                report.copied.push(name.clone());
            }
            ledger.record(&name, content_hash(local.as_bytes()));
        }

        // Documents that only exist in the repository came from another
        // machine; bring them into the local copy.
        for name in self.tracked_repo_documents()? {
            if self.store.read_document(&name)?.is_none() {
                let bytes = fs::read(workdir.join(&name))?;
                self.store
                    .write_document(&name, &String::from_utf8_lossy(&bytes))?;
                ledger.record(&name, content_hash(&bytes));
                report.pulled_in.push(name);
            }
        }

        let message = format!(
            "sync from {} at {}",
            hostname(),
            Utc::now().format("%Y-%m-%dT%H:%M:%SZ")
        );
        report.committed = self.commit_if_changed(&message)?;
        if report.committed {
            self.push_branch()?;
            report.pushed = true;
        }

        ledger.save(&self.store)?;
        Ok(report)
    }

    /// Tracked document names present in the repository working tree.
    pub fn tracked_repo_documents(&self) -> Result<Vec<String>, SyncError> {
        let workdir = self.workdir()?;
        let mut names = Vec::new();
        for entry in fs::read_dir(workdir)? {
            let entry = entry?;
            if !entry.file_type()?.is_file() {
                continue;
            }
            if let Some(name) = entry.file_name().to_str() {
                if is_tracked(name) {
                    names.push(name.to_string());
                }
            }
        }
        names.sort();
        Ok(names)
    }

    fn tracked_local_documents(&self) -> Result<Vec<String>, SyncError> {
        Ok(self
            .store
            .list_documents()?
            .into_iter()
            .filter(|name| is_tracked(name))
            .collect())
    }

    fn workdir(&self) -> Result<&Path, SyncError> {
        self.repo.workdir().ok_or(SyncError::NoWorkdir)
    }

    /// Fetch and integrate the remote branch: fast-forward when possible,
    /// rebase local commits onto the fetched tip when histories diverged,
    /// abort the rebase wholesale on conflict.
    fn refresh_remote(&self) -> Result<(), SyncError> {
        let mut remote = self
            .repo
            .find_remote(DEFAULT_REMOTE)
            .map_err(|_| SyncError::RemoteNotFound(DEFAULT_REMOTE.to_string()))?;
        remote.fetch(&[] as &[&str], None, None)?;
        drop(remote);

        let branch = self.current_branch_name();
        let remote_ref = match self
            .repo
            .find_reference(&format!("refs/remotes/{DEFAULT_REMOTE}/{branch}"))
        {
            Ok(r) => r,
            // Nothing fetched yet (fresh shared repository).
            Err(_) => return Ok(()),
        };
        let fetched = self.repo.reference_to_annotated_commit(&remote_ref)?;
        let (analysis, _) = self.repo.merge_analysis(&[&fetched])?;

        if analysis.is_up_to_date() {
            return Ok(());
        }
        let local_ref = format!("refs/heads/{branch}");
        if analysis.is_unborn() {
            self.repo
                .reference(&local_ref, fetched.id(), true, "sync: adopt remote branch")?;
            self.repo.set_head(&local_ref)?;
            self.force_checkout()?;
        } else if analysis.is_fast_forward() {
            let mut head_ref = self.repo.find_reference(&local_ref)?;
            head_ref.set_target(fetched.id(), "sync: fast-forward")?;
            self.repo.set_head(&local_ref)?;
            self.force_checkout()?;
        } else {
            self.rebase_onto(&fetched)?;
        }
        Ok(())
    }

    fn rebase_onto(&self, upstream: &AnnotatedCommit) -> Result<(), SyncError> {
        let head = self.repo.reference_to_annotated_commit(&self.repo.head()?)?;
        let mut rebase = self.repo.rebase(Some(&head), Some(upstream), None, None)?;
        let committer = self.signature()?;
        match self.apply_rebase_operations(&mut rebase, &committer) {
            Ok(()) => {
                rebase.finish(Some(&committer))?;
                self.force_checkout()?;
                Ok(())
            }
            Err(e) => {
                let _ = rebase.abort();
                Err(e.into())
            }
        }
    }

    fn apply_rebase_operations(
        &self,
        rebase: &mut Rebase,
        committer: &Signature,
    ) -> Result<(), git2::Error> {
        while let Some(op) = rebase.next() {
            op?;
            if self.repo.index()?.has_conflicts() {
                return Err(git2::Error::from_str("conflict during sync rebase"));
            }
            rebase.commit(None, committer, None)?;
        }
        Ok(())
    }

    /// Stage everything; commit only when the staged tree differs from HEAD.
    fn commit_if_changed(&self, message: &str) -> Result<bool, SyncError> {
        let mut index = self.repo.index()?;
        index.add_all(["*"].iter(), git2::IndexAddOption::DEFAULT, None)?;
        index.write()?;
        let tree_id = index.write_tree()?;
        let tree = self.repo.find_tree(tree_id)?;

        let parent = match self.repo.head() {
            Ok(head) => Some(head.peel_to_commit()?),
            Err(_) => None,
        };
        match &parent {
            Some(parent) if parent.tree_id() == tree_id => return Ok(false),
            None if tree.is_empty() => return Ok(false),
            _ => {}
        }

        let sig = self.signature()?;
        let parents: Vec<&git2::Commit> = parent.iter().collect();
        self.repo
            .commit(Some("HEAD"), &sig, &sig, message, &tree, &parents)?;
        Ok(true)
    }

    fn push_branch(&self) -> Result<(), SyncError> {
        let branch = self.current_branch_name();
        let mut remote = self
            .repo
            .find_remote(DEFAULT_REMOTE)
            .map_err(|_| SyncError::RemoteNotFound(DEFAULT_REMOTE.to_string()))?;
        let refspec = format!("refs/heads/{branch}:refs/heads/{branch}");
        remote.push(&[refspec.as_str()], None)?;
        Ok(())
    }

    fn current_branch_name(&self) -> String {
        self.repo
            .find_reference("HEAD")
            .ok()
            .and_then(|head| head.symbolic_target().map(String::from))
            .and_then(|target| target.strip_prefix("refs/heads/").map(String::from))
            .unwrap_or_else(|| DEFAULT_BRANCH.to_string())
    }

    fn signature(&self) -> Result<Signature<'static>, git2::Error> {
        self.repo
            .signature()
            .or_else(|_| Signature::now("mnemo", &format!("mnemo@{}", hostname())))
    }

    fn force_checkout(&self) -> Result<(), git2::Error> {
        let mut checkout = CheckoutBuilder::default();
        checkout.force();
        self.repo.checkout_head(Some(&mut checkout))
    }
}

fn is_tracked(name: &str) -> bool {
    name == MEMORY_DOC || name == HANDOFF_DOC || is_daily_log_name(name)
}

/// Best-effort local machine name for commit messages.
pub fn hostname() -> String {
    std::env::var("HOSTNAME")
        .ok()
        .map(|h| h.trim().to_string())
        .filter(|h| !h.is_empty())
        .or_else(|| {
            fs::read_to_string("/etc/hostname")
                .ok()
                .map(|h| h.trim().to_string())
                .filter(|h| !h.is_empty())
        })
        .unwrap_or_else(|| "unknown-host".to_string())
}

/// Open the engine when a sync working copy exists, otherwise clone it
/// when a remote URL is configured. `None` means syncing is not set up,
/// which callers treat as a silent no-op.
pub fn open_or_clone(
    repo_dir: &Path,
    remote_url: Option<&str>,
    store: MemoryStore,
) -> Option<SyncEngine> {
    if repo_dir.join(".git").exists() {
        return match SyncEngine::open(repo_dir, store) {
            Ok(engine) => Some(engine),
            Err(e) => {
                tracing::debug!("Cannot open sync repository: {e}");
                None
            }
        };
    }
    let url = remote_url?;
    match SyncEngine::clone_remote(url, repo_dir, store) {
        Ok(engine) => Some(engine),
        Err(e) => {
            tracing::debug!("Cannot clone sync repository {url}: {e}");
            None
        }
    }
}
