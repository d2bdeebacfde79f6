//! Dispatch core: fan one notification intent out to its channels and
//! aggregate the per-channel outcomes.

mod dispatcher;
mod intent;
mod outcome;

pub use dispatcher::Dispatcher;
pub use intent::NotificationIntent;
pub use outcome::{ALL_CHANNELS_FAILED, ChannelOutcome, DispatchResult, NO_CHANNELS_CONFIGURED, Status};
