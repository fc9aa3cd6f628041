use std::collections::BTreeMap;

use bitpup_core::{LookupMiss, PackageManifest};

use super::*;

fn manifest(id: &str, deps: &[&str]) -> PackageManifest {
    PackageManifest {
        id: id.to_string(),
        display_name: id.to_string(),
        version: "1.0".to_string(),
        install_commands: String::new(),
        artifact_url: format!("https://dl.example.test/{id}.tar.gz"),
        dependencies: deps.iter().map(|dep| dep.to_string()).collect(),
    }
}

fn graph(entries: &[(&str, &[&str])]) -> BTreeMap<String, PackageManifest> {
    entries
        .iter()
        .map(|(id, deps)| (id.to_string(), manifest(id, deps)))
        .collect()
}

fn roots(ids: &[&str]) -> Vec<String> {
    ids.iter().map(|id| id.to_string()).collect()
}

fn resolve_in(available: &BTreeMap<String, PackageManifest>, ids: &[&str]) -> Resolution {
    resolve_install_plan(&roots(ids), |id| {
        available.get(id).cloned().ok_or(LookupMiss::NoSources)
    })
}

fn ids(plan: &InstallPlan) -> Vec<&str> {
    plan.packages().iter().map(|p| p.id.as_str()).collect()
}

fn assert_dependency_first(plan: &InstallPlan) {
    let packages = plan.packages();
    for (index, package) in packages.iter().enumerate() {
        for dep in &package.dependencies {
            if let Some(dep_index) = packages.iter().position(|p| &p.id == dep) {
                assert!(
                    dep_index < index,
                    "dependency '{dep}' must precede '{}'",
                    package.id
                );
            }
        }
    }
}

#[test]
fn shared_dependency_is_installed_once_and_first() {
    let available = graph(&[("A", &["B", "C"]), ("B", &["C"]), ("C", &[])]);

    let resolution = resolve_in(&available, &["A"]);
    assert_eq!(ids(&resolution.plan), vec!["C", "B", "A"]);
    assert!(resolution.unresolved.is_empty());
}

#[test]
fn transitive_chain_resolves_leaf_first() {
    let available = graph(&[("app", &["lib"]), ("lib", &["zlib"]), ("zlib", &[])]);

    let resolution = resolve_in(&available, &["app"]);
    assert_eq!(ids(&resolution.plan), vec!["zlib", "lib", "app"]);
}

#[test]
fn diamond_graph_keeps_first_discovery_position() {
    let available = graph(&[
        ("top", &["left", "right"]),
        ("left", &["base"]),
        ("right", &["base"]),
        ("base", &[]),
    ]);

    let resolution = resolve_in(&available, &["top"]);
    assert_eq!(ids(&resolution.plan), vec!["base", "left", "right", "top"]);
    assert_dependency_first(&resolution.plan);
}

#[test]
fn root_that_is_also_a_dependency_appears_once() {
    let available = graph(&[("A", &["B"]), ("B", &[])]);

    let resolution = resolve_in(&available, &["A", "B"]);
    assert_eq!(ids(&resolution.plan), vec!["B", "A"]);

    let resolution = resolve_in(&available, &["B", "A"]);
    assert_eq!(ids(&resolution.plan), vec!["B", "A"]);
}

#[test]
fn duplicate_declared_dependencies_are_visited_once() {
    let available = graph(&[("A", &["B", "B"]), ("B", &[])]);

    let mut lookups = Vec::new();
    let resolution = resolve_install_plan(&roots(&["A"]), |id| {
        lookups.push(id.to_string());
        available.get(id).cloned().ok_or(LookupMiss::NoSources)
    });
    assert_eq!(ids(&resolution.plan), vec!["B", "A"]);
    assert_eq!(lookups, vec!["A", "B"]);
}

#[test]
fn two_node_cycle_terminates_with_each_once() {
    let available = graph(&[("A", &["B"]), ("B", &["A"])]);

    let resolution = resolve_in(&available, &["A"]);
    assert_eq!(ids(&resolution.plan), vec!["B", "A"]);

    let resolution = resolve_in(&available, &["B"]);
    assert_eq!(ids(&resolution.plan), vec!["A", "B"]);
}

#[test]
fn self_dependency_terminates() {
    let available = graph(&[("loop", &["loop"])]);

    let resolution = resolve_in(&available, &["loop"]);
    assert_eq!(ids(&resolution.plan), vec!["loop"]);
}

#[test]
fn unresolved_root_does_not_block_siblings() {
    let available = graph(&[("X", &[])]);

    let resolution = resolve_in(&available, &["X", "Y"]);
    assert_eq!(ids(&resolution.plan), vec!["X"]);
    assert_eq!(resolution.unresolved.len(), 1);
    assert_eq!(resolution.unresolved[0].id, "Y");
    assert!(!resolution.unresolved.is_empty());
}

#[test]
fn unresolved_dependency_is_reported_and_dependent_still_planned() {
    let available = graph(&[("app", &["ghost", "lib"]), ("lib", &[])]);

    let resolution = resolve_in(&available, &["app"]);
    assert_eq!(ids(&resolution.plan), vec!["lib", "app"]);
    assert_eq!(
        resolution
            .unresolved
            .iter()
            .map(|u| u.id.as_str())
            .collect::<Vec<_>>(),
        vec!["ghost"]
    );
}

#[test]
fn unresolved_id_is_reported_once_across_roots() {
    let available = graph(&[("a", &["ghost"]), ("b", &["ghost"])]);

    let resolution = resolve_in(&available, &["a", "b"]);
    assert_eq!(ids(&resolution.plan), vec!["a", "b"]);
    assert_eq!(resolution.unresolved.len(), 1);
}

#[test]
fn lookup_miss_is_carried_through() {
    let resolution = resolve_install_plan(&roots(&["fd"]), |_| {
        Err(LookupMiss::MissingRedirect {
            url: "https://r.example.test/fd.choco.yml".to_string(),
        })
    });
    assert!(resolution.plan.is_empty());
    assert_eq!(resolution.unresolved[0].miss.reason_code(), "missing-redirect");
}

#[test]
fn deep_chain_resolves_without_recursion() {
    let depth = 20_000;
    let resolution = resolve_install_plan(&roots(&["pkg0"]), |id| {
        let index: usize = id.trim_start_matches("pkg").parse().expect("numeric id");
        let deps = if index + 1 < depth {
            vec![format!("pkg{}", index + 1)]
        } else {
            Vec::new()
        };
        Ok(PackageManifest {
            id: id.to_string(),
            display_name: id.to_string(),
            version: String::new(),
            install_commands: String::new(),
            artifact_url: String::new(),
            dependencies: deps,
        })
    });

    assert_eq!(resolution.plan.len(), depth);
    assert_eq!(resolution.plan.packages()[0].id, format!("pkg{}", depth - 1));
    assert_eq!(resolution.plan.packages()[depth - 1].id, "pkg0");
}

#[test]
fn ordering_holds_for_wider_acyclic_graph() {
    let available = graph(&[
        ("web", &["http", "tls", "log"]),
        ("http", &["net", "log"]),
        ("tls", &["crypto", "net"]),
        ("crypto", &["libc"]),
        ("net", &["libc"]),
        ("log", &[]),
        ("libc", &[]),
        ("cli", &["log", "term"]),
        ("term", &["libc"]),
    ]);

    let resolution = resolve_in(&available, &["web", "cli"]);
    assert_dependency_first(&resolution.plan);
    assert_eq!(resolution.plan.len(), 9);
    let mut planned = ids(&resolution.plan);
    planned.sort();
    planned.dedup();
    assert_eq!(planned.len(), 9);
}
