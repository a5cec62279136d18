//! Application settings singleton

pub mod model;
pub mod repository;

pub use model::{
    AppSettings, SettingsPatch, DEFAULT_CONTRACT_TERM_MONTHS, DEFAULT_NOTIFY_BEFORE_DUE_DAYS,
    DEFAULT_RENT_INDEX,
};
pub use repository::SettingsRepository;
