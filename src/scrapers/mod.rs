pub mod gotsport;
pub mod schedule_parser;
pub mod standings_parser;

use crate::error::MonitorError;

/// Anything that can hand back the raw schedule page
#[allow(async_fn_in_trait)]
pub trait ScheduleSource {
    async fn fetch_page(&self) -> Result<String, MonitorError>;
}
