//! Chart builders and the serialisable chart specification they produce.

pub mod builders;
pub mod spec;

pub use builders::ChartBuilder;
pub use spec::ChartSpec;
