pub mod band;
pub mod bounds;
pub mod notifier;
