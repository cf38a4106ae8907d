pub mod adb;
pub mod cancel;
pub mod commands;
pub mod config;
pub mod error;
pub mod logging;
pub mod models;
pub mod uiauto;

#[cfg(test)]
pub(crate) mod testing;
