use super::*;

fn owned(values: &[&str]) -> Vec<String> {
    values.iter().map(|value| (*value).to_string()).collect()
}

#[test]
fn classify_by_substring() {
    assert_eq!(classify("arm64-v8a"), ArchTag::Aarch64);
    assert_eq!(classify("aarch64-linux"), ArchTag::Aarch64);
    assert_eq!(classify("armeabi-v7a"), ArchTag::Armv7l);
    assert_eq!(classify("armeabi"), ArchTag::Armv7l);
    assert_eq!(classify("x86_64"), ArchTag::Unsupported);
    assert_eq!(classify(""), ArchTag::Unsupported);
}

#[test]
fn classify_is_case_as_given() {
    assert_eq!(classify("ARM64-v8a"), ArchTag::Unsupported);
    assert_eq!(classify("ARMEABI"), ArchTag::Unsupported);
}

#[test]
fn resolve_consults_only_first_list_element() {
    assert_eq!(
        resolve(&owned(&["arm64-v8a", "armeabi-v7a"]), "ignored"),
        ArchTag::Aarch64
    );
    assert_eq!(
        resolve(&owned(&["x86_64", "arm64-v8a"]), "ignored"),
        ArchTag::Unsupported
    );
    assert_eq!(
        resolve(&owned(&["armeabi-v7a", "arm64-v8a"]), "ignored"),
        ArchTag::Armv7l
    );
}

#[test]
fn resolve_falls_back_to_legacy_abi() {
    assert_eq!(resolve(&[], "arm64-v8a"), ArchTag::Aarch64);
    assert_eq!(resolve(&[], "armeabi"), ArchTag::Armv7l);
    assert_eq!(resolve(&[], "mips"), ArchTag::Unsupported);
}

#[test]
fn payload_subtree_names() {
    assert_eq!(ArchTag::Aarch64.payload_subtree(), Some("aarch64"));
    assert_eq!(ArchTag::Armv7l.payload_subtree(), Some("armv7l"));
    assert_eq!(ArchTag::Unsupported.payload_subtree(), None);
    assert!(ArchTag::Aarch64.is_supported());
    assert!(!ArchTag::Unsupported.is_supported());
}

#[test]
fn tar_routing_table() {
    let decision = route("bin/foo", SourceKind::Tar).expect("must route");
    assert_eq!(decision.root, DestRoot::Bin);
    assert_eq!(decision.rel_path, "foo");
    assert!(decision.executable);

    let decision = route("lib/bar/baz.so", SourceKind::Tar).expect("must route");
    assert_eq!(decision.root, DestRoot::Lib);
    assert_eq!(decision.rel_path, "baz.so");
    assert!(!decision.executable);

    let decision = route("fs/etc/passwd", SourceKind::Tar).expect("must route");
    assert_eq!(decision.root, DestRoot::Rootfs);
    assert_eq!(decision.rel_path, "etc/passwd");
    assert!(!decision.executable);

    assert_eq!(route("other/ignored", SourceKind::Tar), None);
}

#[test]
fn tar_routing_flattens_nested_bin_paths() {
    let decision = route("bin/tools/helper", SourceKind::Tar).expect("must route");
    assert_eq!(decision.root, DestRoot::Bin);
    assert_eq!(decision.rel_path, "helper");
    assert!(decision.executable);
}

#[test]
fn tar_routing_rejects_bare_prefixes() {
    assert_eq!(route("bin/", SourceKind::Tar), None);
    assert_eq!(route("lib/", SourceKind::Tar), None);
    assert_eq!(route("fs/", SourceKind::Tar), None);
    assert_eq!(route("bin", SourceKind::Tar), None);
}

#[test]
fn tree_routing_by_first_component() {
    let decision = route("aarch64/bin/su", SourceKind::Tree).expect("must route");
    assert_eq!(decision.root, DestRoot::Bin);
    assert_eq!(decision.rel_path, "su");
    assert!(decision.executable);

    let decision = route("aarch64/lib/libfakeroot.so", SourceKind::Tree).expect("must route");
    assert_eq!(decision.root, DestRoot::Lib);
    assert_eq!(decision.rel_path, "libfakeroot.so");
    assert!(!decision.executable);

    let decision = route("armv7l/rootfs/etc/motd", SourceKind::Tree).expect("must route");
    assert_eq!(decision.root, DestRoot::Rootfs);
    assert_eq!(decision.rel_path, "etc/motd");

    assert_eq!(route("aarch64/doc/readme", SourceKind::Tree), None);
    assert_eq!(route("aarch64", SourceKind::Tree), None);
}

#[test]
fn tree_executable_heuristic_is_substring_based() {
    // A bin directory nested under lib still marks the file executable; the
    // destination root stays lib.
    let decision = route("aarch64/lib/bin/helper", SourceKind::Tree).expect("must route");
    assert_eq!(decision.root, DestRoot::Lib);
    assert_eq!(decision.rel_path, "helper");
    assert!(decision.executable);
}

#[test]
fn tree_routing_flattens_bin_and_lib() {
    let decision = route("aarch64/bin/nested/tool", SourceKind::Tree).expect("must route");
    assert_eq!(decision.rel_path, "tool");
    let decision = route("aarch64/lib/sub/dir/x.so", SourceKind::Tree).expect("must route");
    assert_eq!(decision.rel_path, "x.so");
}

#[test]
fn parse_config() {
    let config = ManagerConfig::from_toml_str(
        "app_root = \"/data/usupack\"\nassets_dir = \"/opt/usupack/assets\"\nabi = \"arm64-v8a\"\n",
    )
    .expect("must parse");
    assert_eq!(
        config.app_root.as_deref(),
        Some(std::path::Path::new("/data/usupack"))
    );
    assert_eq!(
        config.assets_dir.as_deref(),
        Some(std::path::Path::new("/opt/usupack/assets"))
    );
    assert_eq!(config.abi.as_deref(), Some("arm64-v8a"));
}

#[test]
fn parse_config_all_fields_optional() {
    let config = ManagerConfig::from_toml_str("").expect("must parse");
    assert_eq!(config, ManagerConfig::default());
}

#[test]
fn parse_config_rejects_unknown_keys() {
    let err = ManagerConfig::from_toml_str("unknown_key = 1\n").expect_err("must reject");
    assert!(format!("{err:#}").contains("failed to parse usupack config"));
}

#[test]
fn parse_config_rejects_empty_abi() {
    let err = ManagerConfig::from_toml_str("abi = \"  \"\n").expect_err("must reject");
    assert!(format!("{err:#}").contains("'abi' must not be empty"));
}

#[test]
fn install_error_messages() {
    let err = InstallError::UnsupportedArchitecture("x86_64".to_string());
    assert_eq!(err.to_string(), "unsupported architecture: x86_64");

    let err = InstallError::SourceUnreadable(std::io::Error::new(
        std::io::ErrorKind::NotFound,
        "missing",
    ));
    assert_eq!(err.to_string(), "payload source could not be opened");

    let err = InstallError::CorruptArchive(std::io::Error::new(
        std::io::ErrorKind::InvalidData,
        "bad magic",
    ));
    assert_eq!(err.to_string(), "payload archive is corrupt");
}

#[test]
fn cancel_token_flips_once() {
    let token = CancelToken::new();
    assert!(!token.is_cancelled());
    token.cancel();
    assert!(token.is_cancelled());
    let clone = token.clone();
    assert!(clone.is_cancelled());
}
