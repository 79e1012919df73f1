pub mod application;
pub mod candidate;
pub mod job;
pub mod partner;
pub mod user;
