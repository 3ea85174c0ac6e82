pub mod batch;
pub mod expiration;
pub mod settlement;
pub mod strikes;
