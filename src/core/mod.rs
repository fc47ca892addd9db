pub mod catalog;
pub mod config;
pub mod driver;
pub mod effects;
pub mod instance;
pub mod manager;
pub mod presenter;
pub mod save;
