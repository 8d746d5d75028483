//! End-to-end flows across two engines joined by a transport.

use std::net::TcpListener;
use std::sync::Arc;
use std::thread;

use anyhow::Result;
use strand_pack::UploadPack;
use strand_sync::SyncResult;

use crate::*;

fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_max_level(tracing::Level::DEBUG)
        .with_test_writer()
        .try_init();
}

/// A local engine, a remote engine, and a direct transport between them.
struct Pair {
    local: Engine,
    remote: Engine,
    transport: DirectTransport<InMemoryStore>,
}

impl Pair {
    fn new() -> Self {
        init_tracing();
        let remote_store = Arc::new(InMemoryStore::new());
        Self {
            local: Engine::new(Arc::new(InMemoryStore::new())),
            remote: Engine::new(remote_store.clone()),
            transport: DirectTransport::new(remote_store),
        }
    }
}

fn text(ws: &Workspace, name: &str) -> Option<String> {
    ws.get(name).and_then(|content| match content {
        BlobContent::Text(text) => Some(text.clone()),
        _ => None,
    })
}

/// Transport that must never be used.
struct Unreachable;

impl Transport for Unreachable {
    fn fetch(&self, _: &[BranchAndHead]) -> SyncResult<Vec<UploadPack>> {
        panic!("fetch should not reach the transport");
    }

    fn push(&self, _: UploadPack) -> SyncResult<()> {
        panic!("push should not reach the transport");
    }
}

// ---- Test 1: History is immutable across checkouts ----
#[test]
fn history_is_immutable() -> Result<()> {
    init_tracing();
    let engine = Engine::new(Arc::new(InMemoryStore::new()));
    let mut ws = Workspace::new();

    ws.add("a", "X")?;
    let first = engine.commit(&mut ws, "L", "alice", "first")?;
    engine.checkout_local_branch_head(&mut ws, "L")?;
    assert_eq!(text(&ws, "a").as_deref(), Some("X"));

    ws.add("a", "Y")?;
    engine.commit(&mut ws, "L", "alice", "second")?;
    engine.checkout_local_branch_head(&mut ws, "L")?;
    assert_eq!(text(&ws, "a").as_deref(), Some("Y"));

    engine.checkout(&mut ws, first)?;
    assert_eq!(text(&ws, "a").as_deref(), Some("X"));
    Ok(())
}

// ---- Test 2: Disjoint changes on two sides merge cleanly ----
#[test]
fn diverged_branches_merge_without_conflicts() -> Result<()> {
    let pair = Pair::new();

    // shared base, published to the remote
    let mut local_ws = Workspace::new();
    local_ws.add("base", "0")?;
    let base = pair.local.commit(&mut local_ws, "main", "alice", "base")?;
    pair.local.push(&pair.transport, base, "main")?;

    // the remote adds `a`
    let mut remote_ws = Workspace::new();
    pair.remote.checkout_local_branch_head(&mut remote_ws, "main")?;
    remote_ws.add("a", "A")?;
    let theirs = pair.remote.commit(&mut remote_ws, "main", "bob", "add a")?;

    // locally we add `b`
    local_ws.add("b", "B")?;
    pair.local.commit(&mut local_ws, "main", "alice", "add b")?;

    let fetched = pair.local.fetch(&pair.transport, &["main"])?;
    assert_eq!(fetched.updated.len(), 1);
    assert_eq!(pair.local.remote_branch_head("main")?, theirs);

    let outcome = pair
        .local
        .merge_branch("main", "main", "alice", "merge", ConflictResolution::Leave)?;
    assert!(outcome.conflicts.is_empty());
    assert!(matches!(outcome.kind, MergeKind::Merged { .. }));

    pair.local.checkout_local_branch_head(&mut local_ws, "main")?;
    assert_eq!(local_ws.list(), ["a", "b", "base"]);

    // the merge commit's first parent is the original local commit, not the
    // reparented copy, so its first-parent history never reaches `theirs`
    let merge = pair.local.read_commit(outcome.head)?;
    let MergeKind::Merged { reparented: Some(copy), .. } = outcome.kind else {
        panic!("expected a reparented commit, got {:?}", outcome.kind);
    };
    assert_ne!(merge.parent(), Some(copy));
    assert_eq!(pair.local.read_commit(copy)?.parent(), Some(theirs));
    let err = pair.local.push(&Unreachable, outcome.head, "main").unwrap_err();
    assert!(matches!(err, EngineError::Conflict(_)));
    assert_eq!(pair.remote.local_branch_head("main")?, theirs);
    Ok(())
}

// ---- Test 3: Remote rejects a push that does not extend its head ----
#[test]
fn non_fast_forward_push_is_rejected_by_remote() -> Result<()> {
    let pair = Pair::new();
    let mut local_ws = Workspace::new();
    local_ws.add("f", "1")?;
    let base = pair.local.commit(&mut local_ws, "main", "alice", "base")?;
    pair.local.push(&pair.transport, base, "main")?;

    let mut remote_ws = Workspace::new();
    pair.remote.checkout_local_branch_head(&mut remote_ws, "main")?;
    remote_ws.add("f", "remote")?;
    let theirs = pair.remote.commit(&mut remote_ws, "main", "bob", "remote edit")?;

    // our tracking ref still says `base`, so the push looks fine locally
    local_ws.add("f", "local")?;
    let ours = pair.local.commit(&mut local_ws, "main", "alice", "local edit")?;
    let err = pair.local.push(&pair.transport, ours, "main").unwrap_err();
    assert!(matches!(err, EngineError::Conflict(_)));

    assert_eq!(pair.remote.local_branch_head("main")?, theirs);
    assert_eq!(pair.local.remote_branch_head("main")?, base);
    Ok(())
}

// ---- Test 4: Local non-fast-forward push never reaches the transport ----
#[test]
fn push_not_descending_from_tracking_head_is_conflict() -> Result<()> {
    init_tracing();
    let engine = Engine::new(Arc::new(InMemoryStore::new()));
    let mut ws = Workspace::new();
    ws.add("a", "1")?;
    let tracked = engine.commit(&mut ws, "main", "alice", "tracked")?;
    engine
        .store()
        .set_ref(RefKind::Remote, "main", None, tracked)?;

    let mut other = Workspace::new();
    other.add("a", "unrelated")?;
    let unrelated = engine.commit(&mut other, "other", "alice", "unrelated")?;

    let err = engine.push(&Unreachable, unrelated, "main").unwrap_err();
    assert!(matches!(err, EngineError::Conflict(_)));
    assert_eq!(engine.remote_branch_head("main")?, tracked);
    Ok(())
}

// ---- Test 5: Pushing what the remote has sends nothing ----
#[test]
fn push_with_nothing_to_send_skips_transport() -> Result<()> {
    let pair = Pair::new();
    let mut ws = Workspace::new();
    ws.add("a", "1")?;
    let head = pair.local.commit(&mut ws, "main", "alice", "one")?;
    let first = pair.local.push(&pair.transport, head, "main")?;
    assert!(first.sent);
    assert_eq!(first.commits_sent, 1);

    let again = pair.local.push(&Unreachable, head, "main")?;
    assert!(!again.sent);
    assert_eq!(again.commits_sent, 0);
    Ok(())
}

// ---- Test 6: Fetch with no names covers every tracked branch ----
#[test]
fn fetch_all_tracked_branches() -> Result<()> {
    let pair = Pair::new();
    let mut ws = Workspace::new();
    ws.add("a", "1")?;
    let head = pair.local.commit(&mut ws, "main", "alice", "one")?;
    pair.local.push(&pair.transport, head, "main")?;
    pair.local.push(&pair.transport, head, "release")?;

    for branch in ["main", "release"] {
        let mut remote_ws = Workspace::new();
        pair.remote.checkout_local_branch_head(&mut remote_ws, branch)?;
        remote_ws.add("a", branch)?;
        pair.remote.commit(&mut remote_ws, branch, "bob", "update")?;
    }

    let fetched = pair.local.fetch(&pair.transport, &[])?;
    let mut branches: Vec<&str> = fetched.updated.iter().map(|u| u.branch.as_str()).collect();
    branches.sort();
    assert_eq!(branches, ["main", "release"]);
    assert_eq!(fetched.commits_received, 2);

    assert!(pair.local.fetch(&pair.transport, &[])?.is_up_to_date());
    Ok(())
}

// ---- Test 7: Fetching an unknown branch starts tracking it ----
#[test]
fn fetch_new_branch_then_checkout() -> Result<()> {
    let pair = Pair::new();
    let mut remote_ws = Workspace::new();
    remote_ws.add("doc", serde_json::json!({"title": "hello", "tags": ["x"]}))?;
    pair.remote.commit(&mut remote_ws, "docs", "bob", "doc")?;

    // no tracking refs yet, so an unnamed fetch has nothing to ask for
    assert!(pair.local.fetch(&pair.transport, &[])?.is_up_to_date());

    pair.local.fetch(&pair.transport, &["docs"])?;
    let mut ws = Workspace::new();
    pair.local.checkout_remote_branch_head(&mut ws, "docs")?;
    assert!(matches!(ws.get("doc"), Some(BlobContent::Structured(_))));
    Ok(())
}

// ---- Test 8: Racing commits on one branch have a single winner ----
#[test]
fn racing_engines_on_shared_store() -> Result<()> {
    init_tracing();
    let store: Arc<dyn Store> = Arc::new(InMemoryStore::new());
    let seed = Engine::new(Arc::clone(&store));
    let mut ws = Workspace::new();
    ws.add("counter", "0")?;
    let base = seed.commit(&mut ws, "main", "seed", "base")?;

    let handles: Vec<_> = (0..4)
        .map(|n| {
            let engine = Engine::new(Arc::clone(&store));
            let mut ws = ws.clone();
            thread::spawn(move || {
                ws.add("counter", n.to_string()).map_err(EngineError::from)?;
                engine.commit(&mut ws, "main", &format!("writer-{n}"), "bump")
            })
        })
        .collect();
    let results: Vec<EngineResult<ObjectId>> = handles
        .into_iter()
        .map(|h| h.join().expect("writer thread panicked"))
        .collect();

    let winners: Vec<ObjectId> = results.iter().filter_map(|r| r.as_ref().ok().copied()).collect();
    assert_eq!(winners.len(), 1);
    assert!(results
        .iter()
        .filter(|r| r.is_err())
        .all(|r| matches!(r, Err(EngineError::Conflict(_)))));
    let head = seed.local_branch_head("main")?;
    assert_eq!(head, winners[0]);
    assert_eq!(seed.read_commit(head)?.parent(), Some(base));
    Ok(())
}

// ---- Test 9: The same flows over the framed TCP transport ----
#[test]
fn push_and_fetch_over_tcp() -> Result<()> {
    init_tracing();
    let remote_store = Arc::new(InMemoryStore::new());
    let listener = TcpListener::bind("127.0.0.1:0")?;
    let addr = listener.local_addr()?;
    listener.set_nonblocking(true)?;
    let server = PackServer::new(Arc::clone(&remote_store), TransportConfig::default());
    thread::spawn(move || -> Result<()> {
        let runtime = tokio::runtime::Runtime::new()?;
        runtime.block_on(async move {
            let listener = tokio::net::TcpListener::from_std(listener)?;
            server.serve_tcp(listener).await?;
            Ok::<_, anyhow::Error>(())
        })
    });

    let local = Engine::new(Arc::new(InMemoryStore::new()));
    let remote = Engine::new(remote_store);
    let transport = FramedTransport::connect(addr, &TransportConfig::default())?;

    let mut ws = Workspace::new();
    ws.add("bin", vec![0u8, 159, 146, 150])?;
    let head = local.commit(&mut ws, "main", "alice", "binary")?;
    local.push(&transport, head, "main")?;
    assert_eq!(remote.local_branch_head("main")?, head);

    let mut remote_ws = Workspace::new();
    remote.checkout_local_branch_head(&mut remote_ws, "main")?;
    remote_ws.add("bin", vec![1u8])?;
    let theirs = remote.commit(&mut remote_ws, "main", "bob", "edit")?;

    let fetched = local.fetch(&transport, &["main"])?;
    assert_eq!(fetched.updated[0].new_head, theirs);
    assert_eq!(local.read_commit(theirs)?.parent(), Some(head));

    // the stale local branch cannot be pushed over the remote edit
    ws.add("bin", vec![2u8])?;
    let ours = local.commit(&mut ws, "main", "alice", "conflicting")?;
    let err = local.push(&transport, ours, "main").unwrap_err();
    assert!(matches!(err, EngineError::Conflict(_)));
    Ok(())
}
