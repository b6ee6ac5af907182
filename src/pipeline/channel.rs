//! Named in-process distribution channel
//!
//! The capture stage publishes its stream under a channel name and every
//! consumer stage (preview, recording) attaches by naming the same channel.
//! The media runtime does the fan-out; the device is opened only once.

use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ChannelError {
    #[error("channel name must not be empty")]
    Empty,
    #[error("channel name '{0}' must not contain whitespace")]
    Whitespace(String),
}

/// Name of a logical link between one producer and any number of consumers
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Channel(String);

impl Channel {
    pub fn new(name: impl Into<String>) -> Result<Self, ChannelError> {
        let name = name.into();
        if name.is_empty() {
            return Err(ChannelError::Empty);
        }
        if name.chars().any(char::is_whitespace) {
            return Err(ChannelError::Whitespace(name));
        }
        Ok(Self(name))
    }

    /// Channel named after the capture device, so one device maps to one channel
    pub fn for_device(device: &str) -> Result<Self, ChannelError> {
        Self::new(device)
    }

    pub fn name(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for Channel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for Channel {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_channel_from_device() {
        let channel = Channel::for_device("/dev/video0").unwrap();
        assert_eq!(channel.name(), "/dev/video0");
        assert_eq!(channel.to_string(), "/dev/video0");
    }

    #[test]
    fn test_channel_rejects_bad_names() {
        assert_eq!(Channel::new(""), Err(ChannelError::Empty));
        assert!(matches!(
            Channel::new("cam 0"),
            Err(ChannelError::Whitespace(_))
        ));
    }

    #[test]
    fn test_consumers_share_a_channel() {
        let producer = Channel::new("cam0").unwrap();
        let preview = producer.clone();
        let recording = Channel::new("cam0").unwrap();
        assert_eq!(producer, preview);
        assert_eq!(producer, recording);
    }
}
