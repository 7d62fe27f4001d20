//! Kubernetes ingress JSON, as printed by `kubectl get ingress -o json`.
//!
//! Only the fields needed to enumerate hosts and paths are modelled; everything else in
//! the document is ignored. Both `networking.k8s.io/v1` and the older `v1beta1` backend
//! shapes are understood.
use eyre::{Context, Result};
use serde::Deserialize;

use crate::core::model::{RoutingPath, RoutingResource, RoutingRule};

#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum IngressDocument {
    List { items: Vec<Ingress> },
    Single(Ingress),
}

#[derive(Debug, Deserialize)]
struct Ingress {
    metadata: ObjectMeta,
    #[serde(default)]
    spec: IngressSpec,
}

#[derive(Debug, Default, Deserialize)]
struct ObjectMeta {
    #[serde(default)]
    name: String,
}

#[derive(Debug, Default, Deserialize)]
struct IngressSpec {
    #[serde(default)]
    rules: Vec<IngressRule>,
}

#[derive(Debug, Deserialize)]
struct IngressRule {
    #[serde(default)]
    host: Option<String>,
    #[serde(default)]
    http: Option<HttpRuleValue>,
}

#[derive(Debug, Deserialize)]
struct HttpRuleValue {
    #[serde(default)]
    paths: Vec<HttpPath>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct HttpPath {
    #[serde(default)]
    path: Option<String>,
    #[serde(default)]
    path_type: Option<String>,
    #[serde(default)]
    backend: Backend,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct Backend {
    // networking.k8s.io/v1
    #[serde(default)]
    service: Option<ServiceBackend>,
    #[serde(default)]
    resource: Option<TypedReference>,
    // networking.k8s.io/v1beta1
    #[serde(default)]
    service_name: Option<String>,
    #[serde(default)]
    service_port: Option<serde_json::Value>,
}

#[derive(Debug, Deserialize)]
struct ServiceBackend {
    name: String,
    #[serde(default)]
    port: Option<ServiceBackendPort>,
}

#[derive(Debug, Deserialize)]
struct ServiceBackendPort {
    #[serde(default)]
    number: Option<i64>,
    #[serde(default)]
    name: Option<String>,
}

#[derive(Debug, Deserialize)]
struct TypedReference {
    kind: String,
    name: String,
}

impl Backend {
    fn describe(&self) -> String {
        if let Some(service) = &self.service {
            let port = service.port.as_ref().and_then(|port| {
                port.number
                    .map(|n| n.to_string())
                    .or_else(|| port.name.clone())
            });
            return match port {
                Some(port) => format!("{}:{}", service.name, port),
                None => service.name.clone(),
            };
        }
        if let Some(resource) = &self.resource {
            return format!("{}/{}", resource.kind, resource.name);
        }
        if let Some(name) = &self.service_name {
            let port = match &self.service_port {
                Some(serde_json::Value::String(port)) => Some(port.clone()),
                Some(serde_json::Value::Null) | None => None,
                Some(other) => Some(other.to_string()),
            };
            return match port {
                Some(port) => format!("{name}:{port}"),
                None => name.clone(),
            };
        }
        "<no backend>".to_string()
    }
}

impl From<Ingress> for RoutingResource {
    fn from(ingress: Ingress) -> Self {
        let rules = ingress
            .spec
            .rules
            .into_iter()
            .map(|rule| {
                let paths = rule
                    .http
                    .map(|http| http.paths)
                    .unwrap_or_default()
                    .into_iter()
                    .map(|path| {
                        let mut backend = path.backend.describe();
                        if let Some(path_type) = &path.path_type {
                            backend.push_str(&format!(" ({path_type})"));
                        }
                        RoutingPath::new(path.path.unwrap_or_default(), backend)
                    })
                    .collect();
                RoutingRule::new(rule.host.unwrap_or_default(), paths)
            })
            .collect();
        RoutingResource::new(ingress.metadata.name, rules)
    }
}

/// Parse an `IngressList` or a single `Ingress` into routing resources, keeping order.
pub fn parse_ingress_json(bytes: &[u8]) -> Result<Vec<RoutingResource>> {
    let document: IngressDocument =
        serde_json::from_slice(bytes).context("Failed to parse ingress JSON")?;
    let ingresses = match document {
        IngressDocument::List { items } => items,
        IngressDocument::Single(ingress) => vec![ingress],
    };
    Ok(ingresses.into_iter().map(RoutingResource::from).collect())
}

#[cfg(test)]
mod tests {
    use super::*;

    const V1_LIST: &str = r#"
{
  "apiVersion": "v1",
  "kind": "List",
  "items": [
    {
      "apiVersion": "networking.k8s.io/v1",
      "kind": "Ingress",
      "metadata": { "name": "web", "namespace": "default" },
      "spec": {
        "rules": [
          {
            "host": "a.example.com",
            "http": {
              "paths": [
                {
                  "path": "/svc/",
                  "pathType": "Prefix",
                  "backend": { "service": { "name": "web", "port": { "number": 80 } } }
                },
                {
                  "path": "/assets",
                  "pathType": "ImplementationSpecific",
                  "backend": { "resource": { "apiGroup": "k8s.example.com", "kind": "StorageBucket", "name": "static" } }
                }
              ]
            }
          },
          {
            "http": {
              "paths": [
                { "backend": { "service": { "name": "fallback", "port": { "name": "http" } } } }
              ]
            }
          }
        ]
      }
    },
    { "metadata": { "name": "empty" }, "spec": {} }
  ]
}
"#;

    #[test]
    fn test_parse_v1_list() {
        let resources = parse_ingress_json(V1_LIST.as_bytes()).unwrap();
        assert_eq!(resources.len(), 2);

        let web = &resources[0];
        assert_eq!(web.name, "web");
        assert_eq!(web.rules.len(), 2);
        assert_eq!(web.rules[0].host, "a.example.com");
        assert_eq!(
            web.rules[0].paths,
            vec![
                RoutingPath::new("/svc/", "web:80 (Prefix)"),
                RoutingPath::new("/assets", "StorageBucket/static (ImplementationSpecific)"),
            ]
        );

        // Missing host and path stay empty rather than being invented
        assert_eq!(web.rules[1].host, "");
        assert_eq!(web.rules[1].paths[0], RoutingPath::new("", "fallback:http"));

        assert!(resources[1].rules.is_empty());
    }

    #[test]
    fn test_parse_single_v1beta1_ingress() {
        let json = r#"
{
  "apiVersion": "networking.k8s.io/v1beta1",
  "kind": "Ingress",
  "metadata": { "name": "legacy" },
  "spec": {
    "rules": [
      {
        "host": "old.example.com",
        "http": {
          "paths": [
            { "path": "/", "backend": { "serviceName": "old", "servicePort": 8080 } },
            { "path": "/admin", "backend": { "serviceName": "admin", "servicePort": "https" } }
          ]
        }
      }
    ]
  }
}
"#;
        let resources = parse_ingress_json(json.as_bytes()).unwrap();
        assert_eq!(resources.len(), 1);
        assert_eq!(resources[0].name, "legacy");
        let paths = &resources[0].rules[0].paths;
        assert_eq!(paths[0], RoutingPath::new("/", "old:8080"));
        assert_eq!(paths[1], RoutingPath::new("/admin", "admin:https"));
    }

    #[test]
    fn test_rule_without_http_has_no_paths() {
        let json = r#"{"metadata":{"name":"n"},"spec":{"rules":[{"host":"h"}]}}"#;
        let resources = parse_ingress_json(json.as_bytes()).unwrap();
        assert_eq!(resources[0].rules[0].host, "h");
        assert!(resources[0].rules[0].paths.is_empty());
    }

    #[test]
    fn test_invalid_json_is_error() {
        assert!(parse_ingress_json(b"not json").is_err());
        assert!(parse_ingress_json(br#"{"items": 3}"#).is_err());
    }
}
