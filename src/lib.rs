//! Pakistan Data Twin: a desktop dashboard of Pakistani socio-economic
//! indicators with a GDP forecast.

pub mod app;
pub mod charts;
pub mod color;
pub mod config;
pub mod dashboard;
pub mod data;
pub mod error;
pub mod forecast;
pub mod pages;
pub mod state;
pub mod ui;
