// Record processing: schema normalization, enrichment, keying

pub mod diagnostics;
pub mod enrich;
pub mod identity;
pub mod normalize;
