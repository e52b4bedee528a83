pub mod cleanup;
pub mod config;
pub mod controller;
pub mod error;
pub mod flash;
pub mod fragment;
pub mod google;
pub mod logger;
pub mod store;
pub mod ui;
pub mod worker;
