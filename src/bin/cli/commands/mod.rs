pub mod progress;
pub mod serve;
pub mod sources;
pub mod study;
