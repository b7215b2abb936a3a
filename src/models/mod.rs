mod click;
mod link;
mod report;

pub use click::{Click, NewClick};
pub use link::{Link, PendingLink};
pub use report::{AggregatedStat, Report};
