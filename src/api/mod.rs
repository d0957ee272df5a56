pub mod ntfy_api;

use crate::error::MonitorError;
use crate::models::NotificationMessage;

/// A push channel that delivers one message per call
#[allow(async_fn_in_trait)]
pub trait Notifier {
    async fn send(&self, message: &NotificationMessage) -> Result<(), MonitorError>;
}
