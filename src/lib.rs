pub mod app;
pub mod async_task;
pub mod cli;
pub mod command;
pub mod config;
pub mod context_menu;
pub mod demo;
pub mod error;
pub mod event;
pub mod executor;
pub mod explorer;
pub mod grid;
pub mod i18n;
pub mod icons;
pub mod main_lib;
pub mod screenshot;
pub mod snapshot;
pub mod theme;
pub mod tree;
pub mod ui;
