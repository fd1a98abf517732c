pub mod constants;
pub mod route;
pub mod scoring;

pub use route::{MoleculeNode, ReactionMetadata, ReactionNode, RouteNode, RouteSet, TargetRoutes};
pub use scoring::ScoringType;
