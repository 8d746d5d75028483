use std::collections::BTreeMap;
use std::sync::Arc;

use strand_dag::{collect_objects, load_commit, Ancestry, ObjectSet};
use strand_index::{Status, Workspace};
use strand_merge::{plan_merge, ConflictResolution, MergeOutcome, MergeSignature};
use strand_pack::UploadPack;
use strand_refs::{validate_branch_name, BranchAndHead, RefKind, RefStore};
use strand_store::{Blob, Commit, Index, ObjectStore, StoreError};
use strand_sync::{BranchUpdate, FetchResult, PushResult, Transport};
use strand_types::ObjectId;
use tracing::{debug, info, warn};

use crate::config::EngineConfig;
use crate::error::{EngineError, EngineResult};
use crate::log::render_log;
use crate::store::Store;

/// High-level Strand API over an injected [`Store`].
///
/// Every branch update goes through the store's compare-and-swap, so several
/// engines may share one store. A lost race surfaces as
/// [`EngineError::Conflict`]; the engine never retries.
pub struct Engine {
    store: Arc<dyn Store>,
    config: EngineConfig,
}

impl Engine {
    pub fn new(store: Arc<dyn Store>) -> Self {
        Self::with_config(store, EngineConfig::default())
    }

    pub fn with_config(store: Arc<dyn Store>, config: EngineConfig) -> Self {
        Self { store, config }
    }

    pub fn store(&self) -> &Arc<dyn Store> {
        &self.store
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    // ---- Content operations ----

    /// Commit the workspace's pending changes to `branch`.
    ///
    /// The workspace must be bound to the branch's current head (unbound for
    /// an empty branch).
    pub fn commit(
        &self,
        workspace: &mut Workspace,
        branch: &str,
        author: &str,
        message: &str,
    ) -> EngineResult<ObjectId> {
        validate_branch_name(branch)?;
        let head = self.store.get_ref(RefKind::Local, branch)?;
        if head != workspace.commit() {
            warn!(branch, "commit rejected: workspace is stale");
            return Err(EngineError::Conflict(format!(
                "workspace ({}) is not checked out for head of '{branch}' ({})",
                display_id(workspace.commit()),
                display_id(head),
            )));
        }

        let mut index = match head {
            Some(head) => load_commit(&*self.store, head)?.index().clone(),
            None => Index::new(),
        };
        for (name, blob) in workspace.pending_blobs() {
            self.store.put_blob(blob)?;
            index.insert(name.to_string(), blob.id());
        }
        for name in workspace.removed() {
            index.remove(name);
        }

        let commit = Commit::builder(author)
            .committer(self.config.committer_for(author))
            .parent(head)
            .message(self.config.commit_message(message))
            .index(index)
            .build()?;
        let id = self.store.put_commit(&commit)?;
        self.store.set_ref(RefKind::Local, branch, head, id)?;
        workspace.commit_transition(&commit);
        info!(branch, commit = %id.short_hex(), entries = commit.index().len(), "committed");
        Ok(id)
    }

    /// Merge commit `incoming` into the local `branch`.
    ///
    /// `resolution` must be `Leave`, `UseIncoming` or `UseExisting`.
    pub fn merge(
        &self,
        incoming: ObjectId,
        branch: &str,
        author: &str,
        message: &str,
        resolution: ConflictResolution,
    ) -> EngineResult<MergeOutcome> {
        let resolution = resolution.for_commit_merge()?;
        self.merge_into(incoming, branch, author, message, resolution)
    }

    /// Merge the remote-tracking head of `remote_branch` into `local_branch`.
    ///
    /// `resolution` must be `Leave`, `UseLocalBranch` or `UseRemoteBranch`.
    pub fn merge_branch(
        &self,
        remote_branch: &str,
        local_branch: &str,
        author: &str,
        message: &str,
        resolution: ConflictResolution,
    ) -> EngineResult<MergeOutcome> {
        let resolution = resolution.for_branch_merge()?;
        let incoming = self.remote_branch_head(remote_branch)?;
        self.merge_into(incoming, local_branch, author, message, resolution)
    }

    fn merge_into(
        &self,
        incoming: ObjectId,
        branch: &str,
        author: &str,
        message: &str,
        resolution: ConflictResolution,
    ) -> EngineResult<MergeOutcome> {
        validate_branch_name(branch)?;
        let head = self.store.get_ref(RefKind::Local, branch)?;
        let signature = MergeSignature::new(author, self.config.commit_message(message))
            .with_committer(self.config.committer_for(author));
        let plan = plan_merge(&*self.store, head, incoming, resolution, &signature)?;

        for commit in &plan.writes {
            self.store.put_commit(commit)?;
        }
        if plan.outcome.moved() {
            self.store
                .set_ref(RefKind::Local, branch, head, plan.outcome.head)?;
        }
        info!(
            branch,
            kind = ?plan.outcome.kind,
            head = %plan.outcome.head.short_hex(),
            conflicts = plan.outcome.conflicts.len(),
            "merged"
        );
        Ok(plan.outcome)
    }

    /// Pending changes of `workspace` measured against the current head of
    /// `branch`, which need not be the commit the workspace is bound to.
    pub fn status(&self, workspace: &Workspace, branch: &str) -> EngineResult<Status> {
        let pending = workspace.status();
        let Some(head) = self.store.get_ref(RefKind::Local, branch)? else {
            return Ok(Status {
                added: pending.added,
                ..Status::default()
            });
        };
        let index = load_commit(&*self.store, head)?.index().clone();

        let mut status = Status {
            removed: pending
                .removed
                .into_iter()
                .filter(|name| index.contains_key(name))
                .collect(),
            ..Status::default()
        };
        for (name, blob) in workspace.pending_blobs() {
            match index.get(name) {
                None => {
                    status.added.insert(name.to_string());
                }
                Some(id) if *id != blob.id() => {
                    status.modified.insert(name.to_string());
                }
                Some(_) => {}
            }
        }
        Ok(status)
    }

    /// Bind `workspace` to `commit_id`, discarding its pending changes.
    pub fn checkout(&self, workspace: &mut Workspace, commit_id: ObjectId) -> EngineResult<()> {
        let commit = self.read_commit(commit_id)?;
        let mut contents = BTreeMap::new();
        for (name, blob_id) in commit.index() {
            let blob = self.store.get_blob(blob_id)?.ok_or_else(|| {
                EngineError::NotFound(format!("blob {blob_id} ({name}) cannot be found"))
            })?;
            contents.insert(name.clone(), blob);
        }
        workspace.checkout_transition(&commit, contents)?;
        debug!(commit = %commit_id.short_hex(), "checked out");
        Ok(())
    }

    pub fn checkout_local_branch_head(&self, workspace: &mut Workspace, branch: &str) -> EngineResult<()> {
        let head = self.local_branch_head(branch)?;
        self.checkout(workspace, head)
    }

    pub fn checkout_remote_branch_head(&self, workspace: &mut Workspace, branch: &str) -> EngineResult<()> {
        let head = self.remote_branch_head(branch)?;
        self.checkout(workspace, head)
    }

    // ---- Synchronization ----

    /// Fetch new history for `branches` into the remote-tracking refs.
    ///
    /// With no branches named, every remote-tracking branch is fetched.
    pub fn fetch<T: Transport + ?Sized>(
        &self,
        transport: &T,
        branches: &[&str],
    ) -> EngineResult<FetchResult> {
        let advertised = if branches.is_empty() {
            self.store.list_refs(RefKind::Remote)?
        } else {
            branches
                .iter()
                .map(|branch| -> EngineResult<BranchAndHead> {
                    validate_branch_name(branch)?;
                    let head = self.store.get_ref(RefKind::Remote, branch)?;
                    Ok(BranchAndHead::new(*branch, head))
                })
                .collect::<EngineResult<Vec<_>>>()?
        };
        let mut result = FetchResult::default();
        if advertised.is_empty() {
            return Ok(result);
        }

        let packs = transport.fetch(&advertised)?;
        debug!(branches = advertised.len(), packs = packs.len(), "fetch response");
        for pack in packs {
            let Some(known) = advertised.iter().find(|b| b.branch == pack.branch) else {
                warn!(branch = %pack.branch, "ignoring pack for a branch that was not requested");
                continue;
            };
            let stats = pack.apply(&*self.store)?;
            self.store
                .set_ref(RefKind::Remote, &pack.branch, known.head, pack.head)?;
            info!(
                branch = %pack.branch,
                head = %pack.head.short_hex(),
                commits = stats.commits,
                blobs = stats.blobs,
                "fetched"
            );
            result.commits_received += stats.commits;
            result.blobs_received += stats.blobs;
            result.updated.push(BranchUpdate {
                branch: pack.branch,
                old_head: known.head,
                new_head: pack.head,
            });
        }
        Ok(result)
    }

    /// Push `commit_id` to `remote_branch`.
    ///
    /// The commit must descend from the remote-tracking head. When the
    /// remote already has everything the transport is not contacted.
    pub fn push<T: Transport + ?Sized>(
        &self,
        transport: &T,
        commit_id: ObjectId,
        remote_branch: &str,
    ) -> EngineResult<PushResult> {
        validate_branch_name(remote_branch)?;
        self.read_commit(commit_id)?;
        let remote_head = self.store.get_ref(RefKind::Remote, remote_branch)?;

        let mut objects = ObjectSet::new();
        if !collect_objects(&*self.store, commit_id, remote_head, &mut objects)? {
            warn!(
                branch = remote_branch,
                commit = %commit_id.short_hex(),
                remote = ?remote_head.map(|id| id.short_hex()),
                "push rejected: non fast-forward"
            );
            return Err(EngineError::Conflict(format!(
                "non fast-forward push of {} to '{remote_branch}'",
                commit_id.short_hex()
            )));
        }

        let mut result = PushResult {
            branch: remote_branch.to_string(),
            head: commit_id,
            sent: false,
            commits_sent: objects.commits.len(),
            blobs_sent: objects.blobs.len(),
        };
        if objects.commits.is_empty() {
            debug!(branch = remote_branch, "push: nothing to send");
            return Ok(result);
        }

        transport.push(UploadPack::new(remote_branch, commit_id, objects))?;
        self.store
            .set_ref(RefKind::Remote, remote_branch, remote_head, commit_id)?;
        result.sent = true;
        info!(
            branch = remote_branch,
            head = %commit_id.short_hex(),
            commits = result.commits_sent,
            blobs = result.blobs_sent,
            "pushed"
        );
        Ok(result)
    }

    // ---- History ----

    /// First-parent history of `branch`, most recent first.
    pub fn log(&self, branch: &str) -> EngineResult<Vec<Commit>> {
        let head = self.local_branch_head(branch)?;
        Ok(Ancestry::new(&*self.store, Some(head)).collect::<Result<Vec<_>, _>>()?)
    }

    /// Text rendering of [`log`](Self::log).
    pub fn dump_log(&self, branch: &str) -> EngineResult<String> {
        Ok(render_log(&self.log(branch)?))
    }

    // ---- Branches ----

    pub fn local_branches(&self) -> EngineResult<Vec<BranchAndHead>> {
        Ok(self.store.list_refs(RefKind::Local)?)
    }

    pub fn remote_branches(&self) -> EngineResult<Vec<BranchAndHead>> {
        Ok(self.store.list_refs(RefKind::Remote)?)
    }

    /// Returns `true` if the branch existed.
    pub fn remove_local_branch(&self, branch: &str) -> EngineResult<bool> {
        Ok(self.store.remove_ref(RefKind::Local, branch)?)
    }

    /// Returns `true` if the branch existed.
    pub fn remove_remote_branch(&self, branch: &str) -> EngineResult<bool> {
        Ok(self.store.remove_ref(RefKind::Remote, branch)?)
    }

    pub fn local_branch_head(&self, branch: &str) -> EngineResult<ObjectId> {
        self.branch_head(RefKind::Local, branch)
    }

    pub fn remote_branch_head(&self, branch: &str) -> EngineResult<ObjectId> {
        self.branch_head(RefKind::Remote, branch)
    }

    fn branch_head(&self, kind: RefKind, branch: &str) -> EngineResult<ObjectId> {
        self.store.get_ref(kind, branch)?.ok_or_else(|| {
            EngineError::NotFound(format!("{kind} branch '{branch}' cannot be found or is empty"))
        })
    }

    // ---- Objects ----

    pub fn read_blob(&self, id: ObjectId) -> EngineResult<Blob> {
        self.store
            .get_blob(&id)
            .map_err(wrong_kind_is_invalid)?
            .ok_or_else(|| EngineError::NotFound(format!("blob {id} cannot be found")))
    }

    pub fn read_commit(&self, id: ObjectId) -> EngineResult<Commit> {
        self.store
            .get_commit(&id)
            .map_err(wrong_kind_is_invalid)?
            .ok_or_else(|| EngineError::NotFound(format!("commit {id} cannot be found")))
    }
}

impl std::fmt::Debug for Engine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Engine").field("config", &self.config).finish()
    }
}

/// A caller naming an object of the other kind passed a bad id.
fn wrong_kind_is_invalid(e: StoreError) -> EngineError {
    match e {
        StoreError::KindMismatch { .. } => EngineError::InvalidArgument(e.to_string()),
        other => other.into(),
    }
}

fn display_id(id: Option<ObjectId>) -> String {
    id.map_or_else(|| "none".to_string(), |id| id.short_hex())
}
