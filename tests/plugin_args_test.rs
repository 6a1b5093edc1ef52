use std::path::Path;

use nc_cni::plugin::{build_runtime_conf, format_cni_args, CniCommand, PluginArgs};

#[test]
fn test_runtime_conf_creation() {
    let rt = build_runtime_conf("web-0", "prod", "sandbox-1", "/var/run/netns/web-0", "nc-1");

    assert_eq!(rt.container_id, "sandbox-1");
    assert_eq!(rt.netns, "/var/run/netns/web-0");
    assert_eq!(rt.ifname, "nc-1");
    assert_eq!(
        rt.args,
        vec![
            ("K8S_POD_NAMESPACE".to_string(), "prod".to_string()),
            ("K8S_POD_NAME".to_string(), "web-0".to_string()),
        ]
    );
}

#[test]
fn test_runtime_conf_tolerates_empty_sandbox() {
    let rt = build_runtime_conf("web-0", "prod", "", "", "nc-1");

    assert!(rt.container_id.is_empty());
    assert!(rt.netns.is_empty());
    assert_eq!(rt.ifname, "nc-1");
}

#[test]
fn test_plugin_env() {
    let rt = build_runtime_conf("web-0", "prod", "sandbox-1", "/var/run/netns/web-0", "nc-1");
    let env = PluginArgs::new(CniCommand::Update, &rt, Path::new("/opt/cni/bin")).as_env();

    let expected: Vec<(String, String)> = [
        ("CNI_COMMAND", "UPDATE"),
        ("CNI_CONTAINERID", "sandbox-1"),
        ("CNI_NETNS", "/var/run/netns/web-0"),
        ("CNI_ARGS", "K8S_POD_NAMESPACE=prod;K8S_POD_NAME=web-0"),
        ("CNI_IFNAME", "nc-1"),
        ("CNI_PATH", "/opt/cni/bin"),
    ]
    .iter()
    .map(|(k, v)| (k.to_string(), v.to_string()))
    .collect();

    assert_eq!(env, expected);
}

#[test]
fn test_plugin_env_is_deterministic() {
    let rt = build_runtime_conf("a", "b", "c", "d", "e");
    let path = Path::new("/opt/cni/bin");

    let first = PluginArgs::new(CniCommand::Add, &rt, path).as_env();
    let second = PluginArgs::new(CniCommand::Add, &rt, path).as_env();

    assert_eq!(first, second);
    assert_eq!(first[0], ("CNI_COMMAND".to_string(), "ADD".to_string()));
}

#[test]
fn test_cni_command_names() {
    assert_eq!(CniCommand::Add.to_string(), "ADD");
    assert_eq!(CniCommand::Del.to_string(), "DEL");
    assert_eq!(CniCommand::Check.to_string(), "CHECK");
    assert_eq!(CniCommand::Update.as_str(), "UPDATE");
}

#[test]
fn test_format_cni_args() {
    assert_eq!(format_cni_args(&[]), "");
    assert_eq!(
        format_cni_args(&[("IgnoreUnknown".to_string(), "1".to_string())]),
        "IgnoreUnknown=1"
    );
}
