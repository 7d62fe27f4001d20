//! Narrowing a routing collection down to one host + path prefix.
//!
//! Resolution walks three independent levels (ingress, rule, path). A level with a
//! single candidate is taken without asking; a level with several is listed 1-based in
//! input order and the operator picks one. The list shown is the list indexed, so a
//! number always maps back to the entry printed next to it.
use std::collections::BTreeSet;

use crate::{
    core::{
        error::{ProbeError, ProbeResult, SelectionLevel},
        model::{ResolvedTarget, RoutingPath, RoutingResource, RoutingRule},
    },
    ports::prompt::InteractivePrompt,
};

/// Pick one of `labels`, returning its 0-based offset.
///
/// One candidate is returned without prompting, zero is `NoCandidates`.
pub async fn choose<P>(
    prompt: &mut P,
    level: SelectionLevel,
    title: &str,
    labels: &[String],
) -> ProbeResult<usize>
where
    P: InteractivePrompt + ?Sized,
{
    let count = labels.len();
    match count {
        0 => Err(ProbeError::NoCandidates { level }),
        1 => {
            tracing::debug!("Only one {} candidate, selecting {}", level, labels[0]);
            Ok(0)
        }
        _ => {
            prompt.present(title, labels).await?;
            loop {
                let index = prompt.select_index(count).await?;
                if (1..=count).contains(&index) {
                    tracing::debug!(
                        "Operator selected {} [{}] {}",
                        level,
                        index,
                        labels[index - 1]
                    );
                    return Ok(index - 1);
                }
                tracing::warn!("Selection {} is outside 1..={}, asking again", index, count);
            }
        }
    }
}

fn display_host(host: &str) -> &str {
    if host.is_empty() { "*" } else { host }
}

fn resource_label(resource: &RoutingResource) -> String {
    let hosts: BTreeSet<&str> = resource
        .rules
        .iter()
        .map(|rule| display_host(&rule.host))
        .collect();
    if hosts.is_empty() {
        format!("{} (no rules)", resource.name)
    } else {
        format!(
            "{} ({})",
            resource.name,
            hosts.into_iter().collect::<Vec<_>>().join(", ")
        )
    }
}

fn rule_label(rule: &RoutingRule) -> String {
    let prefixes: Vec<&str> = rule.paths.iter().map(|p| p.path_prefix.as_str()).collect();
    format!("{} [{}]", display_host(&rule.host), prefixes.join(", "))
}

fn path_label(rule: &RoutingRule, path: &RoutingPath) -> String {
    format!(
        "{}{} -> {}",
        display_host(&rule.host),
        path.path_prefix,
        path.backend_description
    )
}

async fn select_resource<'a, P>(
    resources: &'a [RoutingResource],
    preferred_name: Option<&str>,
    prompt: &mut P,
) -> ProbeResult<&'a RoutingResource>
where
    P: InteractivePrompt + ?Sized,
{
    if let Some(name) = preferred_name {
        return resources
            .iter()
            .find(|resource| resource.name == name)
            .ok_or_else(|| ProbeError::NotFound {
                level: SelectionLevel::Ingress,
                name: name.to_string(),
            });
    }

    let labels: Vec<String> = resources.iter().map(resource_label).collect();
    let index = choose(prompt, SelectionLevel::Ingress, "ingress", &labels).await?;
    Ok(&resources[index])
}

async fn select_rule<'a, P>(
    resource: &'a RoutingResource,
    prompt: &mut P,
) -> ProbeResult<&'a RoutingRule>
where
    P: InteractivePrompt + ?Sized,
{
    let labels: Vec<String> = resource.rules.iter().map(rule_label).collect();
    let title = format!("rules of {}", resource.name);
    let index = choose(prompt, SelectionLevel::Rule, &title, &labels).await?;
    Ok(&resource.rules[index])
}

async fn select_path<'a, P>(
    rule: &'a RoutingRule,
    prompt: &mut P,
) -> ProbeResult<&'a RoutingPath>
where
    P: InteractivePrompt + ?Sized,
{
    let labels: Vec<String> = rule.paths.iter().map(|path| path_label(rule, path)).collect();
    let title = format!("paths of {}", display_host(&rule.host));
    let index = choose(prompt, SelectionLevel::Path, &title, &labels).await?;
    Ok(&rule.paths[index])
}

/// Resolve `resources` to exactly one host and path prefix.
///
/// `preferred_name` must match a resource name exactly when given. Host and prefix are
/// copied verbatim from the chosen entries.
pub async fn resolve_target<P>(
    resources: &[RoutingResource],
    preferred_name: Option<&str>,
    prompt: &mut P,
) -> ProbeResult<ResolvedTarget>
where
    P: InteractivePrompt + ?Sized,
{
    let resource = select_resource(resources, preferred_name, prompt).await?;
    let rule = select_rule(resource, prompt).await?;
    let path = select_path(rule, prompt).await?;

    tracing::info!(
        "Resolved ingress {} to {}{} ({})",
        resource.name,
        rule.host,
        path.path_prefix,
        path.backend_description
    );

    Ok(ResolvedTarget {
        host: rule.host.clone(),
        path_prefix: path.path_prefix.clone(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::testing::ScriptedPrompt;

    fn path(prefix: &str) -> RoutingPath {
        RoutingPath::new(prefix, format!("svc{prefix}:80"))
    }

    fn single() -> Vec<RoutingResource> {
        vec![RoutingResource::new(
            "web",
            vec![RoutingRule::new("a.example.com", vec![path("/svc/")])],
        )]
    }

    #[tokio::test]
    async fn test_single_candidates_never_prompt() {
        let mut prompt = ScriptedPrompt::new(vec![]);
        let target = resolve_target(&single(), None, &mut prompt).await.unwrap();

        assert_eq!(target.host, "a.example.com");
        assert_eq!(target.path_prefix, "/svc/");
        assert_eq!(prompt.select_calls, 0);
        assert!(prompt.presented.is_empty());
    }

    #[tokio::test]
    async fn test_path_index_is_one_based() {
        let resources = vec![RoutingResource::new(
            "web",
            vec![RoutingRule::new(
                "a.example.com",
                vec![path("/p0"), path("/p1"), path("/p2")],
            )],
        )];
        let mut prompt = ScriptedPrompt::new(vec![2]);

        let target = resolve_target(&resources, None, &mut prompt).await.unwrap();
        assert_eq!(target.path_prefix, "/p1");
        assert_eq!(prompt.select_calls, 1);
        assert_eq!(prompt.last_count, Some(3));

        let (title, choices) = &prompt.presented[0];
        assert_eq!(title, "paths of a.example.com");
        assert_eq!(choices[1], "a.example.com/p1 -> svc/p1:80");
    }

    #[tokio::test]
    async fn test_every_level_prompts_when_ambiguous() {
        let resources = vec![
            RoutingResource::new("first", vec![RoutingRule::new("x.example.com", vec![path("/")])]),
            RoutingResource::new(
                "second",
                vec![
                    RoutingRule::new("a.example.com", vec![path("/a")]),
                    RoutingRule::new("b.example.com", vec![path("/b0"), path("/b1")]),
                ],
            ),
        ];
        let mut prompt = ScriptedPrompt::new(vec![2, 2, 1]);

        let target = resolve_target(&resources, None, &mut prompt).await.unwrap();
        assert_eq!(
            target,
            ResolvedTarget {
                host: "b.example.com".to_string(),
                path_prefix: "/b0".to_string(),
            }
        );
        assert_eq!(prompt.select_calls, 3);
        assert_eq!(prompt.presented[0].1[1], "second (a.example.com, b.example.com)");
        assert_eq!(prompt.presented[1].1[1], "b.example.com [/b0, /b1]");
    }

    #[tokio::test]
    async fn test_out_of_range_selection_is_asked_again() {
        let resources = vec![RoutingResource::new(
            "web",
            vec![RoutingRule::new("h", vec![path("/a"), path("/b")])],
        )];
        let mut prompt = ScriptedPrompt::new(vec![0, 3, 2]);

        let target = resolve_target(&resources, None, &mut prompt).await.unwrap();
        assert_eq!(target.path_prefix, "/b");
        assert_eq!(prompt.select_calls, 3);
        // The list is shown once, numbering never changes between attempts
        assert_eq!(prompt.presented.len(), 1);
    }

    #[tokio::test]
    async fn test_preferred_name_selects_resource() {
        let resources = vec![
            RoutingResource::new("api", vec![RoutingRule::new("api.example.com", vec![path("/")])]),
            RoutingResource::new("web", vec![RoutingRule::new("web.example.com", vec![path("/")])]),
        ];
        let mut prompt = ScriptedPrompt::new(vec![]);

        let target = resolve_target(&resources, Some("web"), &mut prompt).await.unwrap();
        assert_eq!(target.host, "web.example.com");
        assert_eq!(prompt.select_calls, 0);
    }

    #[tokio::test]
    async fn test_preferred_name_not_found() {
        let mut prompt = ScriptedPrompt::new(vec![]);
        let err = resolve_target(&single(), Some("missing"), &mut prompt)
            .await
            .unwrap_err();

        match err {
            ProbeError::NotFound { level, name } => {
                assert_eq!(level, SelectionLevel::Ingress);
                assert_eq!(name, "missing");
            }
            other => panic!("Expected NotFound, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_empty_rules_is_no_candidates() {
        let resources = vec![RoutingResource::new("empty", vec![])];
        let mut prompt = ScriptedPrompt::new(vec![]);

        let err = resolve_target(&resources, None, &mut prompt).await.unwrap_err();
        assert!(matches!(
            err,
            ProbeError::NoCandidates {
                level: SelectionLevel::Rule
            }
        ));
        assert_eq!(prompt.select_calls, 0);
    }

    #[tokio::test]
    async fn test_empty_paths_is_no_candidates() {
        let resources = vec![RoutingResource::new("web", vec![RoutingRule::new("h", vec![])])];
        let mut prompt = ScriptedPrompt::new(vec![]);

        let err = resolve_target(&resources, None, &mut prompt).await.unwrap_err();
        assert!(matches!(
            err,
            ProbeError::NoCandidates {
                level: SelectionLevel::Path
            }
        ));
    }

    #[tokio::test]
    async fn test_empty_collection_is_no_candidates() {
        let mut prompt = ScriptedPrompt::new(vec![]);
        let err = resolve_target(&[], None, &mut prompt).await.unwrap_err();
        assert!(matches!(
            err,
            ProbeError::NoCandidates {
                level: SelectionLevel::Ingress
            }
        ));
    }

    #[tokio::test]
    async fn test_exhausted_input() {
        let resources = vec![RoutingResource::new(
            "web",
            vec![RoutingRule::new("h", vec![path("/a"), path("/b")])],
        )];
        let mut prompt = ScriptedPrompt::new(vec![]);

        let err = resolve_target(&resources, None, &mut prompt).await.unwrap_err();
        assert!(matches!(err, ProbeError::InputExhausted));
    }
}
