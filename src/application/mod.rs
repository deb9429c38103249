// Application layer - Use cases and the seams to external collaborators
pub mod chart_instance;
pub mod chart_service;
pub mod data_source;
pub mod renderer;

#[cfg(test)]
pub mod test_support;
