pub mod report;
pub mod settings;
pub mod submit;

pub use settings::AppConfig;
