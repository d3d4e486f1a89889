//! Manifest builders for the three cluster resources.
//!
//! Pure functions: each takes the derived names and the template snapshot
//! and returns the resource body as JSON. Keeping them side-effect free
//! makes the create path retryable and the shapes testable without a
//! cluster.

use std::collections::BTreeMap;

use serde_json::{json, Value};

/// Label identifying resources managed by this orchestrator
pub const MANAGED_BY: &str = "launchpad";

/// Per-image startup argument overrides, keyed by image substring.
///
/// Known image families get their built-in auth disabled so the route is
/// usable without a credential exchange. A lookup table rather than
/// branching so new families are a data change.
const IMAGE_ARG_OVERRIDES: &[(&str, fn(u16) -> Vec<String>)] = &[
    ("code-server", code_server_args),
    ("jupyter", jupyter_args),
];

fn code_server_args(port: u16) -> Vec<String> {
    vec![
        "--auth".into(),
        "none".into(),
        "--bind-addr".into(),
        format!("0.0.0.0:{}", port),
    ]
}

fn jupyter_args(port: u16) -> Vec<String> {
    vec![
        "jupyter".into(),
        "notebook".into(),
        "--ip=0.0.0.0".into(),
        format!("--port={}", port),
        "--no-browser".into(),
        "--allow-root".into(),
        "--NotebookApp.token=''".into(),
        "--NotebookApp.password=''".into(),
    ]
}

/// Startup arguments for a known image family, if any
pub fn startup_args(image: &str, port: u16) -> Option<Vec<String>> {
    IMAGE_ARG_OVERRIDES
        .iter()
        .find(|(needle, _)| image.contains(needle))
        .map(|(_, build)| build(port))
}

/// Qualify a relative image reference with the configured registry.
///
/// An empty registry leaves the reference untouched.
pub fn image_path(registry: &str, image: &str) -> String {
    if registry.is_empty() {
        image.to_string()
    } else {
        format!("{}/{}", registry, image)
    }
}

fn labels(name: &str) -> Value {
    json!({ "app": name, "managed-by": MANAGED_BY })
}

/// Workload (apps/v1 Deployment) manifest: single replica, fixed resource
/// requests/limits, env entries from the template's defaults
pub fn workload(
    name: &str,
    namespace: &str,
    image: &str,
    port: u16,
    env: &BTreeMap<String, String>,
) -> Value {
    let env_entries: Vec<Value> = env
        .iter()
        .map(|(k, v)| json!({ "name": k, "value": v }))
        .collect();

    let mut container = json!({
        "name": name,
        "image": image,
        "ports": [{ "containerPort": port }],
        "env": env_entries,
        "resources": {
            "requests": { "memory": "256Mi", "cpu": "100m" },
            "limits": { "memory": "1Gi", "cpu": "500m" }
        }
    });

    if let Some(args) = startup_args(image, port) {
        container["args"] = json!(args);
    }

    json!({
        "apiVersion": "apps/v1",
        "kind": "Deployment",
        "metadata": {
            "name": name,
            "namespace": namespace,
            "labels": labels(name)
        },
        "spec": {
            "replicas": 1,
            "selector": { "matchLabels": labels(name) },
            "template": {
                "metadata": { "labels": labels(name) },
                "spec": { "containers": [container] }
            }
        }
    })
}

/// Internal service (v1 Service) manifest selecting the workload's labels
pub fn service(name: &str, namespace: &str, port: u16) -> Value {
    json!({
        "apiVersion": "v1",
        "kind": "Service",
        "metadata": {
            "name": name,
            "namespace": namespace,
            "labels": { "app": name }
        },
        "spec": {
            "selector": { "app": name },
            "ports": [{ "port": port, "targetPort": port }]
        }
    })
}

/// External route (networking.k8s.io/v1 Ingress) manifest for the
/// instance's unique host
pub fn route(name: &str, namespace: &str, host: &str, port: u16) -> Value {
    json!({
        "apiVersion": "networking.k8s.io/v1",
        "kind": "Ingress",
        "metadata": {
            "name": name,
            "namespace": namespace,
            "labels": { "app": name },
            "annotations": {
                "nginx.ingress.kubernetes.io/proxy-read-timeout": "3600",
                "nginx.ingress.kubernetes.io/proxy-send-timeout": "3600"
            }
        },
        "spec": {
            "ingressClassName": "nginx",
            "rules": [{
                "host": host,
                "http": {
                    "paths": [{
                        "path": "/",
                        "pathType": "Prefix",
                        "backend": {
                            "service": {
                                "name": name,
                                "port": { "number": port }
                            }
                        }
                    }]
                }
            }]
        }
    })
}
