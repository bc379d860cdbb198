//! Client configuration.

use relay_shared::frame::{DEFAULT_MAX_FRAME_LEN, FrameCodec};

/// Where to connect and how large a frame may be.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClientConfig {
    pub host: String,
    pub port: u16,
    pub max_frame_len: usize,
}

impl ClientConfig {
    pub fn new(host: impl Into<String>, port: u16) -> Self {
        Self {
            host: host.into(),
            port,
            max_frame_len: DEFAULT_MAX_FRAME_LEN,
        }
    }

    pub fn server_addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }

    pub fn codec(&self) -> FrameCodec {
        FrameCodec::new(self.max_frame_len)
    }
}
