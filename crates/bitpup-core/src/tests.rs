use super::*;

#[test]
fn parse_full_thread_document() {
    let content = r#"
name: Ripgrep
version: "14.1.0"
maintainer: someone
install:
  commands: |
    install -m755 rg $ROOT/usr/bin/rg
source:
  package: https://example.test/ripgrep-14.1.0.tar.gz
  raw: https://example.test/raw
dependencies:
  - pcre2
  - zlib
"#;

    let manifest = PackageManifest::from_thread_yaml("ripgrep", content);
    assert_eq!(manifest.id, "ripgrep");
    assert_eq!(manifest.display_name, "Ripgrep");
    assert_eq!(manifest.version, "14.1.0");
    assert_eq!(
        manifest.install_commands,
        "install -m755 rg $ROOT/usr/bin/rg\n"
    );
    assert_eq!(
        manifest.artifact_url,
        "https://example.test/ripgrep-14.1.0.tar.gz"
    );
    assert_eq!(manifest.dependencies, vec!["pcre2", "zlib"]);
}

#[test]
fn lookup_id_is_kept_when_thread_name_differs() {
    let manifest = PackageManifest::from_thread_yaml("rg", "name: ripgrep\nversion: '1'\n");
    assert_eq!(manifest.id, "rg");
    assert_eq!(manifest.display_name, "ripgrep");
}

#[test]
fn missing_fields_default_to_empty() {
    let manifest = PackageManifest::from_thread_yaml("bare", "name: bare\n");
    assert_eq!(manifest.version, "");
    assert_eq!(manifest.install_commands, "");
    assert_eq!(manifest.artifact_url, "");
    assert!(manifest.dependencies.is_empty());
    assert!(!manifest.has_artifact());
}

#[test]
fn numeric_and_boolean_scalars_are_read_as_text() {
    let manifest = PackageManifest::from_thread_yaml("tool", "name: true\nversion: 2\n");
    assert_eq!(manifest.display_name, "true");
    assert_eq!(manifest.version, "2");

    let manifest = PackageManifest::from_thread_yaml("tool", "version: 1.5\n");
    assert_eq!(manifest.version, "1.5");
}

#[test]
fn wrongly_shaped_fields_read_as_absent() {
    let content = r#"
name: [not, a, scalar]
version: "3"
install: just a string
source:
  package: {nested: map}
dependencies: not-a-list
"#;

    let manifest = PackageManifest::from_thread_yaml("odd", content);
    assert_eq!(manifest.display_name, "");
    assert_eq!(manifest.version, "3");
    assert_eq!(manifest.install_commands, "");
    assert_eq!(manifest.artifact_url, "");
    assert!(manifest.dependencies.is_empty());
}

#[test]
fn dependency_duplicates_are_kept_and_non_scalars_dropped() {
    let content = r#"
dependencies:
  - zlib
  - {name: nested}
  - zlib
  - "  "
  - openssl
"#;

    let manifest = PackageManifest::from_thread_yaml("app", content);
    assert_eq!(manifest.dependencies, vec!["zlib", "zlib", "openssl"]);
}

#[test]
fn non_mapping_thread_document_yields_empty_manifest() {
    let manifest = PackageManifest::from_thread_yaml("web", "<html>404 Not Found</html>");
    assert_eq!(manifest.id, "web");
    assert_eq!(manifest.version, "");
    assert!(manifest.dependencies.is_empty());

    let manifest = PackageManifest::from_thread_yaml("web", "key: [unterminated");
    assert_eq!(manifest.id, "web");
    assert_eq!(manifest.display_name, "");
}

#[test]
fn artifact_file_name_includes_version_when_present() {
    let mut manifest = PackageManifest::from_thread_yaml("fd", "version: 10.2.0\n");
    assert_eq!(manifest.artifact_file_name(), "fd-10.2.0.choco.pkg");
    manifest.version.clear();
    assert_eq!(manifest.artifact_file_name(), "fd.choco.pkg");
}

#[test]
fn redirect_url_reads_url_field() {
    assert_eq!(
        redirect_url("url: https://threads.example.test/fd.yml\nother: 1\n").as_deref(),
        Some("https://threads.example.test/fd.yml")
    );
}

#[test]
fn redirect_url_is_none_when_missing_or_blank() {
    assert_eq!(redirect_url("name: fd\n"), None);
    assert_eq!(redirect_url("url: \"  \"\n"), None);
    assert_eq!(redirect_url("url:\n"), None);
    assert_eq!(redirect_url("just text"), None);
    assert_eq!(redirect_url(""), None);
}

#[test]
fn pointer_document_url_joins_base_and_id() {
    assert_eq!(
        pointer_document_url("https://r.example.test/pool/main/amd64/stable/", "fd"),
        "https://r.example.test/pool/main/amd64/stable/fd.choco.yml"
    );
}

#[test]
fn normalize_arch_maps_known_machines() {
    assert_eq!(normalize_arch("x86_64"), "amd64");
    assert_eq!(normalize_arch("aarch64\n"), "arm64");
    assert_eq!(normalize_arch("armv7l"), "armhf");
    assert_eq!(normalize_arch("arm"), "armhf");
}

#[test]
fn normalize_arch_passes_unknown_machines_through() {
    assert_eq!(normalize_arch("riscv64"), "riscv64");
    assert_eq!(normalize_arch("ppc64le"), "ppc64le");
}

#[test]
fn validate_package_id_accepts_ordinary_names() {
    for id in ["fd", "lib-ssl3", "python3.12", "gtk+", "foo_bar"] {
        validate_package_id(id).expect("id must be accepted");
    }
}

#[test]
fn validate_package_id_rejects_path_like_names() {
    for id in ["", ".", "..", "../etc", "a/b", "a\\b", "two words", "tab\there"] {
        let err = validate_package_id(id).expect_err("id must be rejected");
        assert!(err.to_string().contains("invalid package id"));
    }
}

#[test]
fn lookup_miss_messages_name_the_url() {
    let miss = LookupMiss::MissingRedirect {
        url: "https://r.example.test/fd.choco.yml".to_string(),
    };
    assert_eq!(miss.reason_code(), "missing-redirect");
    assert!(miss.to_string().contains("https://r.example.test/fd.choco.yml"));
}
