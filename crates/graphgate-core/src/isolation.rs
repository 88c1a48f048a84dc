//! Tenant isolation for graph names.
//!
//! Tenants share one backend namespace. A tenant context sees only graphs
//! stored under its own prefix (`<tenant>_`), and sees them with the prefix
//! removed. Trusted contexts see backend names unchanged.
//!
//! Tenant identifiers may not contain [`SEPARATOR`]. Otherwise tenant `acme`
//! would own every graph of a tenant named `acme_eu`.

use crate::auth_context::AuthContext;

/// Joins a tenant identifier and a client-visible graph name.
pub const SEPARATOR: char = '_';

/// Whether `tenant_id` can be used as an isolation prefix.
pub fn is_valid_tenant_id(tenant_id: &str) -> bool {
    !tenant_id.is_empty() && !tenant_id.contains(SEPARATOR)
}

/// The prefix under which a tenant's graphs are stored.
pub fn tenant_prefix(tenant_id: &str) -> String {
    format!("{}{}", tenant_id, SEPARATOR)
}

/// Map a client-visible graph name to the backend graph name.
pub fn resolve_backend_name(ctx: &AuthContext, requested_name: &str) -> String {
    match ctx.tenant_id() {
        Some(tenant) => format!("{}{}", tenant_prefix(tenant), requested_name),
        None => requested_name.to_string(),
    }
}

/// Map a backend graph name to the name shown to the client.
///
/// Names outside the tenant's namespace are returned unchanged. Callers
/// building listings must drop those names with [`owns`] first.
pub fn display_name(ctx: &AuthContext, backend_name: &str) -> String {
    if let Some(tenant) = ctx.tenant_id() {
        if let Some(stripped) = backend_name.strip_prefix(&tenant_prefix(tenant)) {
            return stripped.to_string();
        }
    }
    backend_name.to_string()
}

/// Whether `backend_name` is visible to `ctx`.
///
/// A tenant owns names that start with its prefix and have something after
/// it. Trusted contexts own everything.
pub fn owns(ctx: &AuthContext, backend_name: &str) -> bool {
    match ctx.tenant_id() {
        Some(tenant) => backend_name
            .strip_prefix(&tenant_prefix(tenant))
            .is_some_and(|rest| !rest.is_empty()),
        None => true,
    }
}

/// Filter a backend listing down to what `ctx` may see, in display form.
pub fn visible_names<I, S>(ctx: &AuthContext, backend_names: I) -> Vec<String>
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    backend_names
        .into_iter()
        .filter(|name| owns(ctx, name.as_ref()))
        .map(|name| display_name(ctx, name.as_ref()))
        .collect()
}
