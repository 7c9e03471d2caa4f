pub mod debug;
pub mod gesture;
pub mod health;
pub mod scores;
pub mod songs;
pub mod sse;
pub mod validation;
