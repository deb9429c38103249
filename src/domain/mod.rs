// Domain layer - Pure chart scaling and windowing logic
pub mod chart;
pub mod error;
pub mod interval;
pub mod scale;
pub mod sensor;
pub mod transform;
pub mod window;
