use std::time::Duration;

/// One "send this message" request, immutable once built
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NotificationIntent {
    pub message: String,
    pub title: Option<String>,
    /// Requested channel ids in caller order; empty selects the default set
    pub target_channels: Vec<String>,
    /// Overrides `relay.request_timeout_secs` for this request
    pub timeout: Option<Duration>,
}

impl NotificationIntent {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            title: None,
            target_channels: Vec::new(),
            timeout: None,
        }
    }

    pub fn with_title(mut self, title: Option<String>) -> Self {
        self.title = title.filter(|t| !t.is_empty());
        self
    }

    pub fn with_channels<I, S>(mut self, channels: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.target_channels = channels.into_iter().map(Into::into).collect();
        self
    }

    pub fn with_timeout(mut self, timeout: Option<Duration>) -> Self {
        self.timeout = timeout;
        self
    }
}
