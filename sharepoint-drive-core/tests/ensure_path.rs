use std::collections::BTreeSet;
use std::sync::{Arc, Mutex};

use mockall::Sequence;
use sharepoint_drive_core::contract::{ItemRef, MockRemoteResourceClient};
use sharepoint_drive_core::error::{DriveError, PathError, RemoteError};
use sharepoint_drive_core::path::LogicalPath;
use sharepoint_drive_core::resolver::{LookupErrorPolicy, PathResolver};

#[derive(Debug, Clone, PartialEq, Eq)]
enum Call {
    Find(String),
    Create { parent: String, name: String },
}

/// A mock drive backed by a set of existing paths. Every call is logged;
/// `fail_create` names a prefix whose creation fails once.
struct Drive {
    existing: Arc<Mutex<BTreeSet<String>>>,
    calls: Arc<Mutex<Vec<Call>>>,
    fail_create: Arc<Mutex<Option<String>>>,
}

impl Drive {
    fn with_existing(paths: &[&str]) -> Self {
        Drive {
            existing: Arc::new(Mutex::new(paths.iter().map(|p| p.to_string()).collect())),
            calls: Arc::new(Mutex::new(Vec::new())),
            fail_create: Arc::new(Mutex::new(None)),
        }
    }

    fn failing_once_at(self, prefix: &str) -> Self {
        *self.fail_create.lock().unwrap() = Some(prefix.to_string());
        self
    }

    fn mock(&self) -> MockRemoteResourceClient {
        let mut client = MockRemoteResourceClient::new();

        let existing = self.existing.clone();
        let calls = self.calls.clone();
        client.expect_find_by_path().returning(move |drive_path: &str| {
            calls.lock().unwrap().push(Call::Find(drive_path.to_string()));
            let logical = drive_path
                .strip_prefix("root:/")
                .and_then(|p| p.strip_suffix(':'))
                .expect("lookup path in drive form");
            Ok(existing
                .lock()
                .unwrap()
                .contains(logical)
                .then(|| ItemRef::new(format!("id:{logical}"))))
        });

        let existing = self.existing.clone();
        let calls = self.calls.clone();
        let fail_create = self.fail_create.clone();
        client
            .expect_create_container()
            .returning(move |parent: &str, name: &str| {
                calls.lock().unwrap().push(Call::Create {
                    parent: parent.to_string(),
                    name: name.to_string(),
                });
                let full = if parent.is_empty() {
                    name.to_string()
                } else {
                    format!("{parent}/{name}")
                };
                let mut fail = fail_create.lock().unwrap();
                if fail.as_deref() == Some(full.as_str()) {
                    *fail = None;
                    return Err(RemoteError::api(503, "serviceNotAvailable", "try later"));
                }
                existing.lock().unwrap().insert(full.clone());
                Ok(ItemRef::new(format!("id:{full}")))
            });

        client
    }

    fn calls(&self) -> Vec<Call> {
        self.calls.lock().unwrap().clone()
    }

    fn clear_calls(&self) {
        self.calls.lock().unwrap().clear();
    }

    fn exists(&self, path: &str) -> bool {
        self.existing.lock().unwrap().contains(path)
    }

    fn creates(&self) -> usize {
        self.calls()
            .iter()
            .filter(|c| matches!(c, Call::Create { .. }))
            .count()
    }
}

fn path(p: &str) -> LogicalPath {
    LogicalPath::parse(p).expect("valid test path")
}

#[tokio::test]
async fn creates_every_prefix_of_a_new_path() {
    let drive = Drive::with_existing(&[]);
    let client = drive.mock();
    let resolver = PathResolver::new(&client);

    let report = resolver
        .ensure_path(&path("a/b/c"))
        .await
        .expect("ensure_path should succeed");

    assert!(drive.exists("a"));
    assert!(drive.exists("a/b"));
    assert!(drive.exists("a/b/c"));
    assert_eq!(report.created, ["a", "a/b", "a/b/c"]);
    assert!(report.existing.is_empty());
}

#[tokio::test]
async fn all_new_path_costs_six_calls_in_lookup_then_create_order() {
    let drive = Drive::with_existing(&[]);
    let client = drive.mock();

    let report = PathResolver::new(&client)
        .ensure_path(&path("a/b/c"))
        .await
        .unwrap();

    let expected = vec![
        Call::Find("root:/a:".into()),
        Call::Create { parent: "".into(), name: "a".into() },
        Call::Find("root:/a/b:".into()),
        Call::Create { parent: "a".into(), name: "b".into() },
        Call::Find("root:/a/b/c:".into()),
        Call::Create { parent: "a/b".into(), name: "c".into() },
    ];
    assert_eq!(drive.calls(), expected);
    assert_eq!(report.round_trips(), 6);
}

#[tokio::test]
async fn all_existing_path_costs_three_lookups() {
    let drive = Drive::with_existing(&["a", "a/b", "a/b/c"]);
    let client = drive.mock();

    let report = PathResolver::new(&client)
        .ensure_path(&path("a/b/c"))
        .await
        .unwrap();

    assert_eq!(drive.calls().len(), 3);
    assert_eq!(drive.creates(), 0);
    assert_eq!(report.existing, ["a", "a/b", "a/b/c"]);
    assert!(report.created.is_empty());
}

#[tokio::test]
async fn mixed_path_costs_two_n_minus_m() {
    let drive = Drive::with_existing(&["folders"]);
    let client = drive.mock();

    let report = PathResolver::new(&client)
        .ensure_path(&path("folders/path/xxx/yyy"))
        .await
        .unwrap();

    // N = 4, M = 1
    assert_eq!(drive.calls().len(), 7);
    assert_eq!(report.round_trips(), 7);
    assert_eq!(report.existing, ["folders"]);
    assert_eq!(report.created, ["folders/path", "folders/path/xxx", "folders/path/xxx/yyy"]);
}

#[tokio::test]
async fn second_call_is_lookups_only() {
    let drive = Drive::with_existing(&[]);
    let client = drive.mock();
    let resolver = PathResolver::new(&client);

    resolver.ensure_path(&path("a/b/c")).await.unwrap();
    drive.clear_calls();
    let second = resolver.ensure_path(&path("a/b/c")).await.unwrap();

    assert_eq!(drive.creates(), 0);
    assert_eq!(drive.calls().len(), 3);
    assert!(second.created.is_empty());
    assert!(drive.exists("a/b/c"));
}

#[tokio::test]
async fn parent_is_resolved_before_child_is_created() {
    let mut client = MockRemoteResourceClient::new();
    let mut seq = Sequence::new();

    client
        .expect_find_by_path()
        .withf(|p: &str| p == "root:/a:")
        .times(1)
        .in_sequence(&mut seq)
        .returning(|_| Ok(None));
    client
        .expect_create_container()
        .withf(|parent: &str, name: &str| parent.is_empty() && name == "a")
        .times(1)
        .in_sequence(&mut seq)
        .returning(|_, _| Ok(ItemRef::new("id-a")));
    client
        .expect_find_by_path()
        .withf(|p: &str| p == "root:/a/b:")
        .times(1)
        .in_sequence(&mut seq)
        .returning(|_| Ok(None));
    client
        .expect_create_container()
        .withf(|parent: &str, name: &str| parent == "a" && name == "b")
        .times(1)
        .in_sequence(&mut seq)
        .returning(|_, _| Ok(ItemRef::new("id-b")));

    PathResolver::new(&client)
        .ensure_path(&path("a/b"))
        .await
        .expect("ordered walk should succeed");
}

#[tokio::test]
async fn failed_create_leaves_earlier_prefixes_and_aborts() {
    let drive = Drive::with_existing(&[]).failing_once_at("a/b");
    let client = drive.mock();

    let err = PathResolver::new(&client)
        .ensure_path(&path("a/b/c"))
        .await
        .expect_err("creation of b fails");

    match &err {
        DriveError::RemoteOperation {
            path,
            satisfied,
            total,
            ..
        } => {
            assert_eq!(path, "a/b");
            assert_eq!(*satisfied, 1);
            assert_eq!(*total, 3);
        }
        other => panic!("expected RemoteOperation, got {other:?}"),
    }
    assert!(err.is_partial_path_created());
    assert!(drive.exists("a"));
    assert!(!drive.exists("a/b"));
    // Nothing is attempted for c.
    assert!(!drive
        .calls()
        .iter()
        .any(|c| matches!(c, Call::Find(p) if p == "root:/a/b/c:")));
}

#[tokio::test]
async fn retry_after_partial_failure_completes_the_path() {
    let drive = Drive::with_existing(&[]).failing_once_at("a/b");
    let client = drive.mock();
    let resolver = PathResolver::new(&client);

    resolver.ensure_path(&path("a/b/c")).await.unwrap_err();
    drive.clear_calls();

    let report = resolver.ensure_path(&path("a/b/c")).await.unwrap();

    assert_eq!(report.existing, ["a"]);
    assert_eq!(report.created, ["a/b", "a/b/c"]);
    assert!(drive.exists("a/b/c"));
}

#[tokio::test]
async fn retry_after_remote_side_created_b_creates_only_c() {
    // b was created remotely even though the call reported failure.
    let drive = Drive::with_existing(&["a", "a/b"]);
    let client = drive.mock();

    let report = PathResolver::new(&client)
        .ensure_path(&path("a/b/c"))
        .await
        .unwrap();

    assert_eq!(report.existing, ["a", "a/b"]);
    assert_eq!(report.created, ["a/b/c"]);
    assert_eq!(
        drive.calls().into_iter().filter(|c| matches!(c, Call::Create { .. })).collect::<Vec<_>>(),
        vec![Call::Create { parent: "a/b".into(), name: "c".into() }]
    );
}

#[tokio::test]
async fn empty_segment_is_rejected_before_any_remote_call() {
    let mut client = MockRemoteResourceClient::new();
    client.expect_find_by_path().never();
    client.expect_create_container().never();

    let err = PathResolver::new(&client)
        .ensure_segments(&["a", "", "b"])
        .await
        .expect_err("empty segment must be rejected");

    assert!(matches!(
        err,
        DriveError::InvalidPath(PathError::EmptySegment { index: 1 })
    ));
}

#[tokio::test]
async fn segment_containing_delimiter_is_rejected_before_any_remote_call() {
    let mut client = MockRemoteResourceClient::new();
    client.expect_find_by_path().never();
    client.expect_create_container().never();

    let err = PathResolver::new(&client)
        .ensure_segments(&["a/b", "c"])
        .await
        .expect_err("a segment holds a single name");

    assert!(matches!(
        err,
        DriveError::InvalidPath(PathError::DelimiterInSegment { index: 0 })
    ));
}

#[tokio::test]
async fn file_occupying_folder_name_counts_as_present() {
    // `report.txt` is a file, yet the walk treats it as a satisfied prefix and
    // tries to create the child underneath it.
    let mut client = MockRemoteResourceClient::new();
    client
        .expect_find_by_path()
        .withf(|p: &str| p == "root:/report.txt:")
        .returning(|_| Ok(Some(ItemRef::new("file-id"))));
    client
        .expect_find_by_path()
        .withf(|p: &str| p == "root:/report.txt/child:")
        .returning(|_| Ok(None));
    client
        .expect_create_container()
        .withf(|parent: &str, name: &str| parent == "report.txt" && name == "child")
        .times(1)
        .returning(|_, _| Err(RemoteError::api(400, "invalidRequest", "parent is not a folder")));

    let err = PathResolver::new(&client)
        .ensure_path(&path("report.txt/child"))
        .await
        .expect_err("child under a file fails remotely");

    assert!(matches!(err, DriveError::RemoteOperation { satisfied: 1, .. }));
}

#[tokio::test]
async fn lookup_errors_are_swallowed_by_default() {
    let mut client = MockRemoteResourceClient::new();
    client
        .expect_find_by_path()
        .times(1)
        .returning(|_| Err(RemoteError::Transport("connection reset".into())));
    client
        .expect_create_container()
        .times(1)
        .returning(|_, name| Ok(ItemRef::new(name)));

    let report = PathResolver::new(&client)
        .ensure_path(&path("a"))
        .await
        .expect("lookup error taken as not found");

    assert_eq!(report.created, ["a"]);
    assert_eq!(report.misclassified_lookups, 1);
}

#[tokio::test]
async fn lookup_errors_abort_under_propagate_policy() {
    let mut client = MockRemoteResourceClient::new();
    client
        .expect_find_by_path()
        .times(1)
        .returning(|_| Err(RemoteError::api(403, "accessDenied", "no access")));
    client.expect_create_container().never();

    let resolver = PathResolver::with_policy(&client, LookupErrorPolicy::Propagate);
    let err = resolver.ensure_path(&path("a/b")).await.unwrap_err();

    match err {
        DriveError::Lookup { path, source } => {
            assert_eq!(path, "a");
            assert!(!source.is_not_found());
        }
        other => panic!("expected Lookup, got {other:?}"),
    }
}

#[tokio::test]
async fn not_found_errors_lead_to_creation_under_propagate_policy() {
    let mut client = MockRemoteResourceClient::new();
    client
        .expect_find_by_path()
        .times(1)
        .returning(|_| Err(RemoteError::api(404, "itemNotFound", "missing")));
    client
        .expect_create_container()
        .times(1)
        .returning(|_, name| Ok(ItemRef::new(name)));

    let report = PathResolver::with_policy(&client, LookupErrorPolicy::Propagate)
        .ensure_path(&path("a"))
        .await
        .unwrap();

    assert_eq!(report.created, ["a"]);
    assert_eq!(report.misclassified_lookups, 0);
}
