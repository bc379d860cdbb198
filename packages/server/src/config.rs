//! Server configuration.

use relay_shared::frame::{DEFAULT_MAX_FRAME_LEN, FrameCodec};

pub const DEFAULT_HOST: &str = "127.0.0.1";
pub const DEFAULT_PORT: u16 = 5050;

/// Startup configuration for the relay server. Not reloadable at runtime.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServerConfig {
    /// Host address to bind to (e.g., "127.0.0.1")
    pub host: String,
    /// Port number to bind to; 0 picks an ephemeral port
    pub port: u16,
    /// Largest payload accepted from or sent to a peer
    pub max_frame_len: usize,
}

impl ServerConfig {
    pub fn new(host: impl Into<String>, port: u16) -> Self {
        Self {
            host: host.into(),
            port,
            ..Self::default()
        }
    }

    pub fn bind_addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }

    pub fn codec(&self) -> FrameCodec {
        FrameCodec::new(self.max_frame_len)
    }
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: DEFAULT_HOST.to_string(),
            port: DEFAULT_PORT,
            max_frame_len: DEFAULT_MAX_FRAME_LEN,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_binds_localhost_5050() {
        // テスト項目: デフォルト設定は 127.0.0.1:5050 にバインドする
        // given (前提条件):
        let config = ServerConfig::default();

        // when (操作):
        let addr = config.bind_addr();

        // then (期待する結果):
        assert_eq!(addr, "127.0.0.1:5050");
        assert_eq!(config.codec().max_frame_len(), DEFAULT_MAX_FRAME_LEN);
    }

    #[test]
    fn test_new_keeps_default_frame_limit() {
        // テスト項目: new で host と port だけを上書きできる
        // given (前提条件) / when (操作):
        let config = ServerConfig::new("0.0.0.0", 3000);

        // then (期待する結果):
        assert_eq!(config.bind_addr(), "0.0.0.0:3000");
        assert_eq!(config.max_frame_len, DEFAULT_MAX_FRAME_LEN);
    }
}
