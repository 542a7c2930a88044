#![forbid(unsafe_code)]

pub mod app_services;
pub mod progress_service;
pub mod topic_session;

pub use sprout_core::Clock;

pub use app_services::{AppServices, AppServicesError};
pub use progress_service::ProgressService;
pub use topic_session::TopicSessionService;
