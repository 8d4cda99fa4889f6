#![forbid(unsafe_code)]

pub mod app_services;
pub mod auth_service;
pub mod error;
pub mod subject_service;
pub mod tips;

pub use attend_core::Clock;

pub use app_services::AppServices;
pub use auth_service::AuthService;
pub use error::{AppServicesError, AuthError, SubjectServiceError, TipError, TipsServiceError};
pub use subject_service::SubjectService;
pub use tips::{ChatTipAdvisor, TipAdvisor, TipsService};
