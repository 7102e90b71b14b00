use bindlab::error::WorkspaceError;
use bindlab::workspace::templates::{
    FORWARD_ZONE_TEMPLATE, INITIAL_FORWARD_ZONE_ID, INITIAL_MAIN_CONFIG_ID,
    INITIAL_REVERSE_ZONE_ID,
};
use bindlab::workspace::{ArtifactId, ArtifactKind, WorkspaceStore};

fn ids(store: &WorkspaceStore) -> Vec<String> {
    store
        .list_artifacts()
        .iter()
        .map(|a| a.id.as_str().to_string())
        .collect()
}

/// Small deterministic generator so the operation sequences are reproducible
struct Lcg(u64);

impl Lcg {
    fn next(&mut self) -> u64 {
        self.0 = self
            .0
            .wrapping_mul(6364136223846793005)
            .wrapping_add(1442695040888963407);
        self.0 >> 33
    }
}

#[test]
fn test_workspace_never_becomes_empty() {
    for seed in 0..25 {
        let mut rng = Lcg(seed);
        let mut store = WorkspaceStore::seeded();

        for step in 0..200 {
            if rng.next() % 3 == 0 {
                let kind = ArtifactKind::ALL[(rng.next() % 3) as usize];
                store
                    .create_artifact(&format!("file-{}-{}", seed, step), kind)
                    .unwrap();
            } else {
                let index = (rng.next() as usize) % store.len();
                let id = store.list_artifacts()[index].id.clone();
                let before = store.clone();
                match store.delete_artifact(&id) {
                    Ok(_) => assert!(!store.contains(&id)),
                    Err(e) => {
                        assert_eq!(e, WorkspaceError::LastArtifact);
                        assert_eq!(before.len(), 1);
                        assert_eq!(ids(&store), ids(&before));
                        assert_eq!(store.list_artifacts(), before.list_artifacts());
                        assert_eq!(store.active_id(), before.active_id());
                    }
                }
            }

            assert!(!store.is_empty());
            assert!(store.get_active().is_some());
        }
    }
}

#[test]
fn test_deleting_active_picks_first_survivor() {
    let mut store = WorkspaceStore::seeded();
    let a = store.create_artifact("a.zone", ArtifactKind::ForwardZone).unwrap();
    let b = store.create_artifact("b.zone", ArtifactKind::ReverseZone).unwrap();

    store.set_active(&a);
    store.delete_artifact(&a).unwrap();
    assert_eq!(store.active_id().unwrap().as_str(), INITIAL_MAIN_CONFIG_ID);

    // Deleting the first artifact moves the front of the order along
    store
        .delete_artifact(&ArtifactId::new(INITIAL_MAIN_CONFIG_ID))
        .unwrap();
    assert_eq!(store.active_id().unwrap().as_str(), INITIAL_FORWARD_ZONE_ID);

    store.set_active(&b);
    store.delete_artifact(&b).unwrap();
    assert_eq!(store.active_id().unwrap().as_str(), INITIAL_FORWARD_ZONE_ID);
}

#[test]
fn test_deleting_inactive_keeps_selection() {
    let mut store = WorkspaceStore::seeded();
    store.set_active(&ArtifactId::new(INITIAL_REVERSE_ZONE_ID));

    store
        .delete_artifact(&ArtifactId::new(INITIAL_FORWARD_ZONE_ID))
        .unwrap();
    assert_eq!(store.active_id().unwrap().as_str(), INITIAL_REVERSE_ZONE_ID);
}

#[test]
fn test_create_then_delete_down_to_one() {
    let mut store = WorkspaceStore::seeded();

    let created = store
        .create_artifact("db.internal", ArtifactKind::ForwardZone)
        .unwrap();
    assert_eq!(store.active_id(), Some(&created));
    assert_eq!(store.get(&created).unwrap().content, FORWARD_ZONE_TEMPLATE);
    assert_eq!(store.get(&created).unwrap().name, "db.internal");

    store.delete_artifact(&created).unwrap();
    assert_eq!(store.active_id().unwrap().as_str(), INITIAL_MAIN_CONFIG_ID);

    store
        .delete_artifact(&ArtifactId::new(INITIAL_MAIN_CONFIG_ID))
        .unwrap();
    store
        .delete_artifact(&ArtifactId::new(INITIAL_FORWARD_ZONE_ID))
        .unwrap();

    let last = ArtifactId::new(INITIAL_REVERSE_ZONE_ID);
    let content = store.get(&last).unwrap().content.clone();
    assert_eq!(
        store.delete_artifact(&last).unwrap_err(),
        WorkspaceError::LastArtifact
    );

    assert_eq!(ids(&store), vec![INITIAL_REVERSE_ZONE_ID.to_string()]);
    assert_eq!(store.get(&last).unwrap().content, content);
    assert_eq!(store.active_id(), Some(&last));
}

#[test]
fn test_unknown_ids_are_reported() {
    let mut store = WorkspaceStore::seeded();
    let ghost = ArtifactId::new("ghost");

    assert!(!store.set_active(&ghost));
    assert_eq!(
        store.delete_artifact(&ghost).unwrap_err(),
        WorkspaceError::ArtifactNotFound(ghost.clone())
    );
    assert_eq!(
        store.update_content(&ghost, "x").unwrap_err(),
        WorkspaceError::ArtifactNotFound(ghost.clone())
    );
    assert_eq!(store.len(), 3);
}

#[test]
fn test_edits_do_not_move_selection() {
    let mut store = WorkspaceStore::seeded();
    let forward = ArtifactId::new(INITIAL_FORWARD_ZONE_ID);

    store.update_content(&forward, "$TTL 60\n").unwrap();
    store.rename_artifact(&forward, "db.example.org").unwrap();

    let artifact = store.get(&forward).unwrap();
    assert_eq!(artifact.content, "$TTL 60\n");
    assert_eq!(artifact.name, "db.example.org");
    assert_eq!(store.active_id().unwrap().as_str(), INITIAL_MAIN_CONFIG_ID);
}
