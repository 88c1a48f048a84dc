//! Listener configuration.

use serde::{Deserialize, Serialize};

/// Configuration for the HTTP listeners.
///
/// With only `bind` set, one listener accepts both credential kinds. With
/// `tenant_bind` set as well, `bind` accepts only bearer tokens and
/// `tenant_bind` accepts only URL tokens.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    /// Bind address of the main listener.
    #[serde(default = "default_bind")]
    pub bind: String,

    /// Bind address of the dedicated tenant listener.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tenant_bind: Option<String>,

    /// Externally reachable base URL, used in discovery documents.
    /// Derived from `bind` when absent.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub public_url: Option<String>,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind: default_bind(),
            tenant_bind: None,
            public_url: None,
        }
    }
}

impl ServerConfig {
    /// Base URL advertised to clients.
    pub fn public_base_url(&self) -> String {
        match &self.public_url {
            Some(url) => url.trim_end_matches('/').to_string(),
            None => local_url(&self.bind),
        }
    }

    /// Base URL tenant clients connect to.
    pub fn tenant_base_url(&self) -> String {
        match &self.tenant_bind {
            Some(bind) => local_url(bind),
            None => self.public_base_url(),
        }
    }

    /// Whether bearer and URL tokens are served on separate listeners.
    pub fn has_split_listeners(&self) -> bool {
        self.tenant_bind.is_some()
    }
}

fn local_url(bind: &str) -> String {
    format!("http://{}", bind.replace("0.0.0.0", "localhost"))
}

fn default_bind() -> String {
    "0.0.0.0:3001".to_string()
}
