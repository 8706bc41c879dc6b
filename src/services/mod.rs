// TabSync support services
// Pure helpers and persistence used by the engine core.

pub mod snapshot_store;
pub mod title_resolver;
