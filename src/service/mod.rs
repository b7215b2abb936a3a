pub mod analytics;
pub mod clicks;
pub mod resolver;

pub use analytics::AnalyticsService;
pub use clicks::ClickRecorder;
pub use resolver::ResolverService;
