// TabSync persistence layer
// SQLite-backed storage for registry snapshots.

pub mod connection;
pub mod migrations;
