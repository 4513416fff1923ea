//! AI ingestion: proposal wire types, normalization, reconciliation.

pub mod normalize;
pub mod proposal;
pub mod reconcile;

pub use normalize::{estimate_points_served, normalize_proposal, NormalizedProposal};
pub use proposal::{BoardScanMetadata, CircuitProposal};
pub use reconcile::{append_parsed_circuits, ingest_proposals, IngestSummary};
