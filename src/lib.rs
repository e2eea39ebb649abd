pub mod app;
pub mod charts;
pub mod config;
pub mod dashboard;
pub mod errors;
pub mod handlers;
pub mod labels;
pub mod models;
pub mod normalize;
pub mod sentiment;
pub mod sources;
pub mod state;
pub mod ui;
pub mod upstream;

pub use app::router;
pub use config::DashboardConfig;
pub use labels::LabelLocale;
pub use models::Series;
pub use normalize::{RawPayload, normalize, normalize_with};
pub use state::AppState;
