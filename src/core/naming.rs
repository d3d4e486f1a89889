//! Resource naming and addressing.
//!
//! Pure function of the template name plus fresh randomness; never
//! consults the cluster, so a failed provisioning attempt can re-derive
//! names without side effects.

use uuid::Uuid;

/// The derived identity of one provisioning request
#[derive(Debug, Clone)]
pub struct ResourceNames {
    /// Short uniqueness token (8 hex chars)
    pub token: String,

    /// DNS-safe cluster resource name shared by all three resources
    pub workload_name: String,

    /// External host: `{token}.{domain}`
    pub host: String,

    /// Externally reachable URL
    pub access_url: String,
}

/// Derive names and addressing for a new instance.
///
/// Workload name is the lowercased template name with spaces as hyphens,
/// sanitized to a valid resource name, suffixed with the token. Template
/// names full of invalid characters are sanitized, not rejected.
pub fn derive(template_name: &str, domain: &str, ingress_port: u16) -> ResourceNames {
    let token = Uuid::new_v4().simple().to_string()[..8].to_string();
    let workload_name = format!("{}-{}", sanitize(template_name), token);
    let host = format!("{}.{}", token, domain);
    let access_url = format!("http://{}:{}", host, ingress_port);

    ResourceNames {
        token,
        workload_name,
        host,
        access_url,
    }
}

/// Reduce a display name to a DNS-label-safe prefix
fn sanitize(name: &str) -> String {
    let cleaned: String = name
        .to_lowercase()
        .chars()
        .map(|c| if c == ' ' { '-' } else { c })
        .filter(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || *c == '-')
        .collect();

    let trimmed = cleaned.trim_matches('-');
    if trimmed.is_empty() {
        "workload".to_string()
    } else {
        trimmed.to_string()
    }
}
