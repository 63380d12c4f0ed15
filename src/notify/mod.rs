mod channel;
mod feed;

pub use channel::{ChannelConnector, FeedConnector, NotificationChannel, NotifyError};
pub use feed::StatusFeed;
