pub mod hand_flow;
pub mod notifications;
pub mod scheduler;
pub mod sync;
pub mod tables;
