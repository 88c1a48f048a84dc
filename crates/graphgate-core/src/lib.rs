//! # graphgate-core
//!
//! Types shared by every graphgate crate.
//!
//! - [`AuthContext`]: the normalized result of credential verification. Every
//!   tool handler receives one as an explicit argument.
//! - [`isolation`]: maps client-visible graph names onto the shared backend
//!   namespace and back.
//! - [`config`]: the `graphgate.yaml` configuration model.
//!
//! ## Isolation model
//!
//! | Context | Client asks for | Backend sees |
//! |---------|-----------------|--------------|
//! | Trusted | `users`         | `users`      |
//! | Tenant `acme` | `users`   | `acme_users` |
//! | Tenant `widgets` | `users` | `widgets_users` |

pub mod auth_context;
pub mod config;
pub mod isolation;

pub use auth_context::{AuthContext, AuthKind};
pub use config::{AuthConfig, BackendConfig, ConfigError, GraphGateConfig, ServerConfig};
pub use isolation::{display_name, owns, resolve_backend_name, visible_names};
