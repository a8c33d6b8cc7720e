//! Process-wide configuration tests.

use std::io::Write;
use std::sync::Arc;
use std::thread;

use serial_test::serial;
use stratus_sdk::prelude::*;

fn fresh() {
    set_config(Configuration::new());
}

// === Reads ===

#[test]
#[serial]
fn test_config_is_shared_until_replaced() {
    reset_config();
    let first = config();
    let second = config();
    assert!(Arc::ptr_eq(&first, &second));

    let third = configure(ConfigOptions::new().region("eu-west-1"));
    assert!(!Arc::ptr_eq(&first, &third));
    assert!(Arc::ptr_eq(&third, &config()));
}

#[test]
#[serial]
fn test_configure_leaves_old_snapshot_untouched() {
    fresh();
    let before = config();
    let after = configure(ConfigOptions::new().access_key_id("FOO"));

    assert_eq!(after.access_key_id(), Some("FOO"));
    assert_eq!(before.access_key_id(), None);
    assert_eq!(config().access_key_id(), Some("FOO"));
}

#[test]
#[serial]
fn test_configure_accumulates() {
    fresh();
    configure(ConfigOptions::new().access_key_id("AKID"));
    configure(ConfigOptions::new().secret_access_key("SECRET"));

    assert!(config().credentials().is_complete());
}

// === Named Options ===

#[test]
#[serial]
fn test_configure_from_pairs() {
    fresh();
    let config = configure_from_pairs([
        ("ec2_endpoint", "ec2.us-west-2.amazonaws.com"),
        ("use_ssl", "false"),
    ])
    .unwrap();

    assert_eq!(config.ec2_region(), "us-west-2");
    assert_eq!(config.scheme(), "http");
}

#[test]
#[serial]
fn test_configure_from_pairs_rejects_unknown_name() {
    fresh();
    let before = config();
    let result = configure_from_pairs([("region", "eu-west-1"), ("bogus_option", "x")]);

    assert!(matches!(result, Err(ConfigError::UnknownOption(name)) if name == "bogus_option"));
    assert!(Arc::ptr_eq(&before, &config()));
}

#[test]
#[serial]
fn test_configure_from_file() {
    fresh();
    let mut file = tempfile::Builder::new().suffix(".toml").tempfile().unwrap();
    writeln!(file, "stub_requests = true").unwrap();
    writeln!(file, "glacier_endpoint = \"glacier.ap-northeast-1.amazonaws.com\"").unwrap();

    let options = ConfigOptions::load(file.path()).unwrap();
    let config = configure(options);

    assert!(config.stub_requests());
    assert_eq!(config.glacier_region(), "ap-northeast-1");
}

// === Stub ===

#[test]
#[serial]
fn test_stub_sets_flag() {
    fresh();
    assert!(!config().stub_requests());
    let stubbed = stub();
    assert!(stubbed.stub_requests());
    assert!(config().stub_requests());
}

// === Concurrency ===

#[test]
#[serial]
fn test_concurrent_configure_loses_no_update() {
    fresh();
    let services: Vec<Service> = Service::ALL.iter().copied().take(8).collect();

    let handles: Vec<_> = services
        .iter()
        .copied()
        .map(|service| {
            thread::spawn(move || {
                configure(ConfigOptions::new().region_for(service, "custom-1"));
            })
        })
        .collect();
    for handle in handles {
        handle.join().unwrap();
    }

    let config = config();
    for service in services {
        assert_eq!(config.region(service), "custom-1", "{} lost", service);
    }
}

#[test]
#[serial]
fn test_config_visible_across_threads() {
    fresh();
    let configured = configure(ConfigOptions::new().region("sa-east-1"));
    let seen = thread::spawn(config).join().unwrap();
    assert!(Arc::ptr_eq(&configured, &seen));
}
