// TabSync state managers
// The registry is the sole mutable data model; the reconciliation loop
// keeps it converged with the ambient location of the shared surface.

pub mod reconciliation;
pub mod tab_registry;
