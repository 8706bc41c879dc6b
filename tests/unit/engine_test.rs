use std::cell::RefCell;
use std::rc::Rc;
use std::sync::Arc;
use std::time::Duration;

use tabsync::database::connection::Database;
use tabsync::engine::TabSyncEngine;
use tabsync::hosts::emulated::EmulatedHost;
use tabsync::hosts::multi_view::MultiViewHost;
use tabsync::managers::reconciliation::SUPPRESSION_WINDOW;
use tabsync::services::snapshot_store::SnapshotStore;
use tabsync::surface::memory::{ManualClock, MemoryEnvironment, MemoryRouter};
use tabsync::surface::AmbientSurface;
use tabsync::types::errors::EngineError;
use tabsync::types::tab::{SurfaceOwnership, Tab};

fn emulated_engine() -> (Arc<MemoryRouter>, Arc<ManualClock>, TabSyncEngine) {
    let router = Arc::new(MemoryRouter::new("/"));
    let clock = Arc::new(ManualClock::new());
    let engine = TabSyncEngine::new(
        Box::new(EmulatedHost::new(router.clone())),
        router.clone(),
        clock.clone(),
        None,
    )
    .unwrap();
    (router, clock, engine)
}

fn multi_view_engine() -> (Arc<MemoryEnvironment>, TabSyncEngine) {
    let env = Arc::new(MemoryEnvironment::new());
    let router = Arc::new(MemoryRouter::new("/"));
    let clock = Arc::new(ManualClock::new());
    let engine = TabSyncEngine::new(
        Box::new(MultiViewHost::new(env.clone())),
        router,
        clock,
        None,
    )
    .unwrap();
    (env, engine)
}

fn memory_store() -> (Arc<Database>, SnapshotStore) {
    let db = Arc::new(Database::open_in_memory().unwrap());
    (db.clone(), SnapshotStore::new(db))
}

fn settle(engine: &mut TabSyncEngine, clock: &ManualClock) {
    clock.advance(SUPPRESSION_WINDOW + Duration::from_millis(1));
    engine.tick().unwrap();
}

#[test]
fn test_bootstrap_without_snapshot_creates_root_tab() {
    let (_router, _clock, engine) = emulated_engine();
    assert_eq!(engine.tabs().len(), 1);
    let active = engine.active_tab().unwrap();
    assert_eq!(active.location, "/");
    assert_eq!(active.title, "Dashboard");
    assert_eq!(active.ownership, SurfaceOwnership::Shared);
}

#[test]
fn test_create_tab_activates_and_moves_router() {
    let (router, _clock, mut engine) = emulated_engine();
    let tab = engine.create_tab(Some("/reports")).unwrap();

    assert_eq!(engine.tabs().len(), 2);
    assert_eq!(engine.active_id(), tab.id);
    assert_eq!(router.current_location(), "/reports");
    assert!(engine.is_reconciling());
}

#[test]
fn test_create_tab_snapshots_outgoing_location() {
    let (router, clock, mut engine) = emulated_engine();
    let first = engine.active_id().to_string();

    // The user navigated the active tab before opening the new one.
    router.set_location("/analytics?range=7d");
    engine.create_tab(Some("/reports")).unwrap();

    let outgoing = engine.tabs().iter().find(|t| t.id == first).unwrap();
    assert_eq!(outgoing.location, "/analytics?range=7d");
    assert_eq!(outgoing.title, "Analytics");

    // Switching back restores exactly where the user left it.
    settle(&mut engine, &clock);
    engine.switch_tab(&first).unwrap();
    assert_eq!(router.current_location(), "/analytics?range=7d");
}

#[test]
fn test_close_inactive_tab_leaves_surface_untouched() {
    let (router, clock, mut engine) = emulated_engine();
    let first = engine.active_id().to_string();
    engine.create_tab(Some("/reports")).unwrap();
    settle(&mut engine, &clock);

    engine.close_tab(&first).unwrap();
    assert_eq!(engine.tabs().len(), 1);
    assert_eq!(router.current_location(), "/reports");
    assert!(!engine.is_reconciling());
}

#[test]
fn test_close_active_tab_repoints_to_neighbor() {
    let (router, clock, mut engine) = emulated_engine();
    let first = engine.active_id().to_string();
    let second = engine.create_tab(Some("/reports")).unwrap();
    settle(&mut engine, &clock);

    engine.close_tab(&second.id).unwrap();
    assert_eq!(engine.active_id(), first);
    assert_eq!(router.current_location(), "/");
}

#[test]
fn test_close_last_tab_replaces_with_fresh_default() {
    let (router, _clock, mut engine) = emulated_engine();
    let only = engine.active_id().to_string();

    engine.navigate_tab(&only, "/analytics").unwrap();
    engine.close_tab(&only).unwrap();

    assert_eq!(engine.tabs().len(), 1);
    let fresh = engine.active_tab().unwrap();
    assert_ne!(fresh.id, only);
    assert_eq!(fresh.location, "/");
    assert_eq!(router.current_location(), "/");
}

#[test]
fn test_close_unknown_tab_is_silent_noop() {
    let (_router, _clock, mut engine) = emulated_engine();
    engine.close_tab("missing").unwrap();
    assert_eq!(engine.tabs().len(), 1);
}

#[test]
fn test_switch_unknown_tab_is_not_found() {
    let (_router, _clock, mut engine) = emulated_engine();
    assert!(matches!(
        engine.switch_tab("missing"),
        Err(EngineError::NotFound(_))
    ));
}

#[test]
fn test_switch_to_active_tab_has_no_effects() {
    let (router, _clock, mut engine) = emulated_engine();
    let active = engine.active_id().to_string();

    engine.switch_tab(&active).unwrap();
    assert!(router.pushes().is_empty());
    assert!(!engine.is_reconciling());
}

#[test]
fn test_navigate_malformed_location_surfaces_error() {
    let (_router, _clock, mut engine) = emulated_engine();
    let active = engine.active_id().to_string();
    let before = engine.active_tab().unwrap().location.clone();

    assert!(matches!(
        engine.navigate_tab(&active, "relative/path"),
        Err(EngineError::MalformedLocation(_))
    ));
    assert_eq!(engine.active_tab().unwrap().location, before);
}

#[test]
fn test_navigate_unknown_tab_is_silent_noop() {
    let (router, _clock, mut engine) = emulated_engine();
    engine.navigate_tab("missing", "/reports").unwrap();
    assert!(router.pushes().is_empty());
}

#[test]
fn test_tick_commits_same_directory_change_immediately() {
    let (router, _clock, mut engine) = emulated_engine();
    let active = engine.active_id().to_string();

    router.set_location("/?tab=settings");
    engine.tick().unwrap();

    let tab = engine.tabs().iter().find(|t| t.id == active).unwrap();
    assert_eq!(tab.location, "/?tab=settings");
}

#[test]
fn test_tick_confirms_cross_directory_change_on_second_tick() {
    let (router, _clock, mut engine) = emulated_engine();
    let active = engine.active_id().to_string();

    router.set_location("/analytics");
    engine.tick().unwrap();
    assert_eq!(engine.active_tab().unwrap().location, "/");

    engine.tick().unwrap();
    let tab = engine.tabs().iter().find(|t| t.id == active).unwrap();
    assert_eq!(tab.location, "/analytics");
    assert_eq!(tab.title, "Analytics");
}

#[test]
fn test_switch_does_not_echo_back_as_navigation() {
    let (router, clock, mut engine) = emulated_engine();
    let first = engine.active_id().to_string();
    let second = engine.create_tab(Some("/reports")).unwrap();
    settle(&mut engine, &clock);

    engine.switch_tab(&first).unwrap();
    assert!(engine.is_reconciling());

    // Ticks during the window observe the router mid-transition; none of
    // them may rewrite either tab.
    router.set_location("/reports");
    engine.tick().unwrap();
    router.set_location("/");
    engine.tick().unwrap();

    clock.advance(SUPPRESSION_WINDOW + Duration::from_millis(1));
    engine.tick().unwrap();
    engine.tick().unwrap();

    assert_eq!(engine.active_tab().unwrap().location, "/");
    let other = engine.tabs().iter().find(|t| t.id == second.id).unwrap();
    assert_eq!(other.location, "/reports");
}

#[test]
fn test_listener_receives_sequence_and_active_id() {
    let (_router, _clock, mut engine) = emulated_engine();
    let seen: Rc<RefCell<Vec<(usize, String)>>> = Rc::new(RefCell::new(Vec::new()));
    let sink = seen.clone();
    engine.on_tabs_changed(move |tabs, active_id| {
        sink.borrow_mut().push((tabs.len(), active_id.to_string()));
    });

    let tab = engine.create_tab(Some("/reports")).unwrap();
    let events = seen.borrow();
    assert_eq!(events.len(), 1);
    assert_eq!(events[0], (2, tab.id));
}

#[test]
fn test_persists_and_rehydrates_across_engines() {
    let (db, store) = memory_store();
    let router = Arc::new(MemoryRouter::new("/"));
    let clock = Arc::new(ManualClock::new());

    let second_id;
    {
        let mut engine = TabSyncEngine::new(
            Box::new(EmulatedHost::new(router.clone())),
            router.clone(),
            clock.clone(),
            Some(store),
        )
        .unwrap();
        second_id = engine.create_tab(Some("/reports")).unwrap().id;
    }

    let engine = TabSyncEngine::new(
        Box::new(EmulatedHost::new(router.clone())),
        router.clone(),
        clock,
        Some(SnapshotStore::new(db)),
    )
    .unwrap();
    assert_eq!(engine.tabs().len(), 2);
    assert_eq!(engine.active_id(), second_id);
    assert_eq!(engine.active_tab().unwrap().location, "/reports");
}

#[test]
fn test_bootstrap_normalizes_stray_active_flags() {
    let (db, store) = memory_store();
    let tabs = vec![
        Tab {
            id: "t1".to_string(),
            location: "/".to_string(),
            title: "Dashboard".to_string(),
            active: true,
            ownership: SurfaceOwnership::Shared,
        },
        Tab {
            id: "t2".to_string(),
            location: "/reports".to_string(),
            title: "Reports".to_string(),
            active: true,
            ownership: SurfaceOwnership::Shared,
        },
    ];
    store.save(&tabs).unwrap();

    let router = Arc::new(MemoryRouter::new("/"));
    let engine = TabSyncEngine::new(
        Box::new(EmulatedHost::new(router.clone())),
        router,
        Arc::new(ManualClock::new()),
        Some(SnapshotStore::new(db)),
    )
    .unwrap();

    assert_eq!(engine.active_id(), "t1");
    let flagged: Vec<&str> = engine
        .tabs()
        .iter()
        .filter(|t| t.active)
        .map(|t| t.id.as_str())
        .collect();
    assert_eq!(flagged, vec!["t1"]);
}

#[test]
fn test_bootstrap_falls_back_on_corrupt_snapshot() {
    let db = Arc::new(Database::open_in_memory().unwrap());
    db.connection()
        .execute(
            "INSERT INTO snapshots (key, data, updated_at) VALUES ('tabsync.tabs', 'nonsense', 0)",
            [],
        )
        .unwrap();

    let router = Arc::new(MemoryRouter::new("/"));
    let engine = TabSyncEngine::new(
        Box::new(EmulatedHost::new(router.clone())),
        router,
        Arc::new(ManualClock::new()),
        Some(SnapshotStore::new(db)),
    )
    .unwrap();

    assert_eq!(engine.tabs().len(), 1);
    assert_eq!(engine.active_tab().unwrap().location, "/");
}

#[test]
fn test_dispose_stops_ambient_observation() {
    let (router, _clock, mut engine) = emulated_engine();
    engine.dispose();
    assert!(engine.is_disposed());

    router.set_location("/analytics");
    engine.tick().unwrap();
    engine.tick().unwrap();
    assert_eq!(engine.active_tab().unwrap().location, "/");
}

#[test]
fn test_multi_view_create_opens_dedicated_view() {
    let (env, mut engine) = multi_view_engine();
    let tab = engine.create_tab(Some("/reports")).unwrap();

    assert_eq!(tab.ownership, SurfaceOwnership::Owned);
    assert_eq!(env.view_location(&tab.id).as_deref(), Some("/reports"));
    assert_eq!(env.focused(), Some(tab.id));
}

#[test]
fn test_multi_view_close_last_tab_defaults_to_root() {
    let (env, mut engine) = multi_view_engine();
    let only = engine.active_id().to_string();

    engine.close_tab(&only).unwrap();
    assert_eq!(engine.tabs().len(), 1);
    let fresh = engine.active_tab().unwrap();
    assert_ne!(fresh.id, only);
    assert_eq!(fresh.location, "/");
    assert_eq!(env.view_location(&fresh.id).as_deref(), Some("/"));
}

#[test]
fn test_view_navigation_report_updates_registry_only() {
    let (env, mut engine) = multi_view_engine();
    let tab = engine.create_tab(Some("/reports")).unwrap();
    let commands_before = env.commands().len();

    engine
        .notify_view_navigation(&tab.id, "/analytics?range=30d")
        .unwrap();

    let updated = engine.tabs().iter().find(|t| t.id == tab.id).unwrap();
    assert_eq!(updated.location, "/analytics?range=30d");
    assert_eq!(updated.title, "Analytics");
    // The report already reflects the view's state; no command goes back.
    assert_eq!(env.commands().len(), commands_before);
}

#[test]
fn test_view_navigation_report_for_unknown_tab_is_ignored() {
    let (_env, mut engine) = multi_view_engine();
    engine.notify_view_navigation("missing", "/reports").unwrap();
    engine.notify_view_navigation("missing", "garbage").unwrap();
    assert_eq!(engine.tabs().len(), 1);
}

#[test]
fn test_failed_host_command_leaves_registry_intact() {
    let (router, _clock, mut engine) = emulated_engine();
    router.fail_next_push();

    assert!(engine.create_tab(Some("/reports")).is_err());
    assert_eq!(engine.tabs().len(), 1);
    assert_eq!(engine.active_tab().unwrap().location, "/");
}
