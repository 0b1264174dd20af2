pub mod actions;
pub mod aggregator;
pub mod scheduler;
pub mod state;
pub mod view;
