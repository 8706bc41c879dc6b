//! TabSync console demo.
//!
//! Drives the engine against the in-memory hosts: an emulated single-surface
//! host with snapshot persistence, and a multi-view host with one surface
//! per tab.

use std::sync::Arc;

use tabsync::database::connection::Database;
use tabsync::engine::TabSyncEngine;
use tabsync::hosts::emulated::EmulatedHost;
use tabsync::hosts::multi_view::MultiViewHost;
use tabsync::services::snapshot_store::SnapshotStore;
use tabsync::surface::memory::{ManualClock, MemoryEnvironment, MemoryRouter};
use tabsync::surface::AmbientSurface;
use tabsync::types::tab::Tab;

fn main() {
    println!();
    println!("TabSync v{} — demo mode", env!("CARGO_PKG_VERSION"));
    println!();

    demo_emulated_host();
    demo_multi_view_host();

    println!("Done.");
}

fn section(name: &str) {
    println!("───────────────────────────────────────────────");
    println!("  {}", name);
    println!("───────────────────────────────────────────────");
}

fn print_tabs(tabs: &[Tab], active_id: &str) {
    for tab in tabs {
        let marker = if tab.id == active_id { "*" } else { " " };
        println!("  {} [{}] {}", marker, tab.title, tab.location);
    }
}

fn demo_emulated_host() {
    section("Emulated host (single shared surface)");

    let router = Arc::new(MemoryRouter::new("/"));
    let clock = Arc::new(ManualClock::new());
    let db = Arc::new(Database::open_in_memory().expect("in-memory database"));
    let store = SnapshotStore::new(db.clone());

    let mut engine = TabSyncEngine::new(
        Box::new(EmulatedHost::new(router.clone())),
        router.clone(),
        clock.clone(),
        Some(store),
    )
    .expect("engine bootstrap");

    engine.create_tab(Some("/reports")).expect("create tab");
    engine.create_tab(Some("/analytics")).expect("create tab");
    println!("Created two tabs; router is at {}", router.current_location());
    print_tabs(engine.tabs(), engine.active_id());

    let first = engine.tabs()[0].id.clone();
    engine.switch_tab(&first).expect("switch tab");
    println!("Switched back; router is at {}", router.current_location());
    print_tabs(engine.tabs(), engine.active_id());

    // Rehydrate a second engine from the same snapshot slot.
    let router2 = Arc::new(MemoryRouter::new("/"));
    let engine2 = TabSyncEngine::new(
        Box::new(EmulatedHost::new(router2.clone())),
        router2,
        Arc::new(ManualClock::new()),
        Some(SnapshotStore::new(db)),
    )
    .expect("engine rehydrate");
    println!("Rehydrated {} tabs from the snapshot", engine2.tabs().len());
    println!();
}

fn demo_multi_view_host() {
    section("Multi-view host (one surface per tab)");

    let env = Arc::new(MemoryEnvironment::new());
    let router = Arc::new(MemoryRouter::new("/"));
    let clock = Arc::new(ManualClock::new());

    let mut engine = TabSyncEngine::new(
        Box::new(MultiViewHost::new(env.clone())),
        router,
        clock,
        None,
    )
    .expect("engine bootstrap");

    let tab = engine.create_tab(Some("/settings")).expect("create tab");
    engine
        .notify_view_navigation(&tab.id, "/settings?theme=dark")
        .expect("view navigation");
    print_tabs(engine.tabs(), engine.active_id());
    println!("Environment commands: {:?}", env.commands());
    println!();
}
