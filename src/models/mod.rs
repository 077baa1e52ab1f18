pub mod profile;
pub mod query;

pub use profile::BusinessProfile;
pub use query::{Entities, QueryAnalysis, QueryType};
