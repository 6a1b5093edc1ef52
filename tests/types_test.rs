use nc_cni::types::{IpConfiguration, NetworkContainerType};
use nc_cni::{NcError, NetworkContainerRequest, PluginError, PodInfo};

fn request_with_context(context: &str) -> NetworkContainerRequest {
    NetworkContainerRequest {
        version: String::new(),
        network_container_type: NetworkContainerType::Docker,
        network_container_id: "nc-1".to_string(),
        ip_configuration: IpConfiguration::default(),
        orchestrator_context: context.as_bytes().to_vec(),
    }
}

#[test]
fn test_request_deserialization() -> Result<(), Box<dyn std::error::Error>> {
    let json = r#"{
        "Version": "0",
        "NetworkContainerType": "AzureContainerInstance",
        "NetworkContainerid": "f47ac10b",
        "IPConfiguration": {
            "IPSubnet": {"IPAddress": "10.0.0.4", "PrefixLength": 24},
            "DNSServers": ["168.63.129.16"],
            "GatewayIPAddress": "10.0.0.1"
        },
        "OrchestratorContext": {"PodName": "web-0", "PodNamespace": "prod"}
    }"#;

    let request: NetworkContainerRequest = serde_json::from_str(json)?;

    assert_eq!(request.network_container_type, NetworkContainerType::AzureContainerInstance);
    assert_eq!(request.network_container_id, "f47ac10b");
    assert_eq!(request.ip_configuration.ip_subnet.ip_address, "10.0.0.4");
    assert_eq!(request.ip_configuration.ip_subnet.prefix_length, 24);
    assert_eq!(request.ip_configuration.gateway_ip_address, "10.0.0.1");
    assert_eq!(
        request.pod_info()?,
        PodInfo {
            pod_name: "web-0".to_string(),
            pod_namespace: "prod".to_string(),
        }
    );

    Ok(())
}

#[test]
fn test_orchestrator_type_names() -> Result<(), Box<dyn std::error::Error>> {
    let web: NetworkContainerType = serde_json::from_str(r#""WebApps""#)?;
    let cow: NetworkContainerType = serde_json::from_str(r#""COW""#)?;
    let other: NetworkContainerType = serde_json::from_str(r#""SomethingNew""#)?;

    assert_eq!(web, NetworkContainerType::WebApps);
    assert_eq!(cow, NetworkContainerType::Cow);
    assert_eq!(other, NetworkContainerType::Unknown);
    assert_eq!(cow.to_string(), "COW");

    assert!(!web.supports_interface_update());
    assert!(cow.supports_interface_update());
    assert!(NetworkContainerType::Docker.supports_interface_update());

    Ok(())
}

#[test]
fn test_pod_info_missing_fields_are_empty() -> Result<(), Box<dyn std::error::Error>> {
    let pod = request_with_context(r#"{"PodName": "only-name"}"#).pod_info()?;
    assert_eq!(pod.pod_name, "only-name");
    assert_eq!(pod.pod_namespace, "");

    let pod = request_with_context(r#"{"podName": "a", "podNamespace": "b"}"#).pod_info()?;
    assert_eq!(pod.pod_name, "a");
    assert_eq!(pod.pod_namespace, "b");

    Ok(())
}

#[test]
fn test_pod_info_keys_are_case_insensitive() -> Result<(), Box<dyn std::error::Error>> {
    let pod = request_with_context(r#"{"podname": "a", "podnamespace": "b"}"#).pod_info()?;
    assert_eq!(pod.pod_name, "a");
    assert_eq!(pod.pod_namespace, "b");

    let pod = request_with_context(r#"{"PODNAME": "c", "PODNAMESPACE": "d", "Extra": [1]}"#).pod_info()?;
    assert_eq!(pod.pod_name, "c");
    assert_eq!(pod.pod_namespace, "d");

    Ok(())
}

#[test]
fn test_pod_info_null_context_and_values_are_empty() -> Result<(), Box<dyn std::error::Error>> {
    assert_eq!(request_with_context("null").pod_info()?, PodInfo::default());

    let pod = request_with_context(r#"{"PodName": null, "PodNamespace": "ns"}"#).pod_info()?;
    assert_eq!(pod.pod_name, "");
    assert_eq!(pod.pod_namespace, "ns");

    Ok(())
}

#[test]
fn test_pod_info_undecodable_context() {
    for context in ["", "[1, 2]", "not json", r#"{"PodName": 7}"#] {
        let err = request_with_context(context).pod_info().unwrap_err();
        assert!(
            matches!(err, NcError::OrchestratorContext { orchestrator: NetworkContainerType::Docker, .. }),
            "context {:?} gave {:?}",
            context,
            err
        );
    }
}

#[test]
fn test_missing_context_is_undecodable() -> Result<(), Box<dyn std::error::Error>> {
    let json = r#"{
        "NetworkContainerType": "Docker",
        "NetworkContainerid": "nc-2",
        "IPConfiguration": {"IPSubnet": {"IPAddress": "10.1.0.4", "PrefixLength": 16}}
    }"#;

    let request: NetworkContainerRequest = serde_json::from_str(json)?;

    assert!(request.orchestrator_context.is_empty());
    assert!(request.pod_info().is_err());

    Ok(())
}

#[test]
fn test_plugin_error_parse_and_display() -> Result<(), Box<dyn std::error::Error>> {
    let err: PluginError = serde_json::from_str(r#"{"msg":"boom"}"#)?;
    assert_eq!(err.msg, "boom");
    assert_eq!(err.code, 0);
    assert_eq!(err.to_string(), "boom");

    let err: PluginError = serde_json::from_str(
        r#"{"cniVersion":"0.4.0","code":7,"msg":"invalid config","details":"missing master"}"#,
    )?;
    assert_eq!(err.code, 7);
    assert_eq!(err.cni_version, "0.4.0");
    assert_eq!(err.to_string(), "invalid config; missing master");

    let encoded = serde_json::to_value(PluginError::new("short"))?;
    assert_eq!(encoded, serde_json::json!({"code": 0, "msg": "short"}));

    Ok(())
}
