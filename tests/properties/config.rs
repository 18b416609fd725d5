use crate::properties::strategies::{chain_type_strategy, network_strategy, sdk_options_strategy};
use proptest::{prelude::*, test_runner::Config};
use selendra_sdk::{ChainType, Network, SdkConfig, SdkError, SdkOptions, SelendraSdk};
use serde_json::json;

proptest! {
	#![proptest_config(Config {
		failure_persistence: None,
		..Config::default()
	})]

	#[test]
	fn test_merge_fills_only_absent_fields(options in sdk_options_strategy()) {
		let config = SdkConfig::merge(&options);

		prop_assert_eq!(config.chain_type, options.chain_type.unwrap_or_default());
		prop_assert_eq!(config.network, options.network.unwrap_or_default());
		prop_assert_eq!(config.timeout, options.timeout.unwrap_or(30_000));
		prop_assert_eq!(config.retry_attempts, options.retry_attempts.unwrap_or(3));
		prop_assert_eq!(config.retry_delay, options.retry_delay.unwrap_or(1000));
		prop_assert_eq!(config.auto_reconnect, options.auto_reconnect.unwrap_or(true));
		prop_assert_eq!(config.debug, options.debug.unwrap_or(false));

		match &options.endpoint {
			Some(endpoint) => prop_assert_eq!(config.endpoint.as_deref(), Some(endpoint.as_str())),
			None => prop_assert_eq!(
				config.endpoint.as_deref(),
				config.network.default_endpoint(config.chain_type)
			),
		}
	}

	#[test]
	fn test_valid_options_build_an_sdk(options in sdk_options_strategy()) {
		let sdk = SelendraSdk::new(options.clone());
		prop_assert!(sdk.is_ok());
		let sdk = sdk.unwrap();
		prop_assert_eq!(sdk.config(), SdkConfig::merge(&options));
		prop_assert!(!sdk.is_connected());
	}

	#[test]
	fn test_applying_empty_options_changes_nothing(options in sdk_options_strategy()) {
		let mut config = SdkConfig::merge(&options);
		let before = config.clone();
		config.apply(&SdkOptions::default());
		prop_assert_eq!(config, before);
	}

	#[test]
	fn test_chain_type_and_network_parse_from_display(
		chain_type in chain_type_strategy(),
		network in network_strategy(),
	) {
		prop_assert_eq!(chain_type.to_string().parse::<ChainType>(), Ok(chain_type));
		prop_assert_eq!(network.to_string().parse::<Network>(), Ok(network));
	}

	#[test]
	fn test_negative_retry_values_are_rejected(
		value in i64::MIN..0,
		key in prop::sample::select(vec!["retryAttempts", "retryDelay"]),
	) {
		let raw = format!(r#"{{ "{}": {} }}"#, key, value);
		let result = SelendraSdk::from_json(&raw);
		prop_assert!(matches!(result, Err(SdkError::InvalidConfiguration(_))));
	}

	#[test]
	fn test_non_positive_timeout_is_rejected(timeout in -1_000_000i64..=0) {
		let raw = json!({ "timeout": timeout }).to_string();
		let result = SelendraSdk::from_json(&raw);
		prop_assert!(matches!(result, Err(SdkError::InvalidConfiguration(_))));
	}
}
