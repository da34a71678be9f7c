pub mod ask;
pub mod check;
pub mod config;
pub mod serve;
