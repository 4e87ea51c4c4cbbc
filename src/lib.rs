pub mod backend;
pub mod config;
pub mod i18n;
pub mod lifetime_discount;
pub mod pages;
pub mod server;
pub mod wizard;
