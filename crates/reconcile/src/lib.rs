//! Reconciliation: grouping scraped records into canonical boards with
//! per-field provenance (the coalescer), then choosing one value per field
//! across conflicting sources (the resolver). Both halves are pure; the
//! orchestrator owns all store writes.

mod coalesce;
mod resolve;
mod terrain;

pub use coalesce::{coalesce, identities, provenance_rows, CoalesceConfig, CoalesceOutput};
pub use resolve::{resolve_board, resolve_field, FieldResolution, ResolvedSpecs};
pub use terrain::terrain_for_category;
