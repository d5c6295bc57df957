pub mod captcha;
pub mod client;

pub use captcha::{CaptchaError, CaptchaWidget};
pub use client::{ApiClient, ApiError, StatusCode};
