use alloy::primitives::U256;
use proptest::{prelude::*, test_runner::Config};
use selendra_sdk::utils::units::{format_amount, parse_amount, to_display_float};

proptest! {
	#![proptest_config(Config {
		failure_persistence: None,
		..Config::default()
	})]

	#[test]
	fn test_formatted_amounts_parse_back(value in any::<u128>(), decimals in 1u8..=30) {
		let value = U256::from(value);
		let formatted = format_amount(value, decimals).unwrap();
		prop_assert_eq!(parse_amount(&formatted, decimals).unwrap(), value);
	}

	#[test]
	fn test_whole_units_scale_exactly(whole in 0u64..1_000_000, decimals in 1u8..=18) {
		let parsed = parse_amount(&whole.to_string(), decimals).unwrap();
		prop_assert_eq!(parsed, U256::from(whole) * U256::from(10u64).pow(U256::from(decimals)));
		prop_assert_eq!(to_display_float(parsed, decimals).unwrap(), whole as f64);
	}

	#[test]
	fn test_display_float_is_monotonic(a in any::<u64>(), b in any::<u64>()) {
		let (low, high) = if a <= b { (a, b) } else { (b, a) };
		let low = to_display_float(U256::from(low), 18).unwrap();
		let high = to_display_float(U256::from(high), 18).unwrap();
		prop_assert!(low <= high);
	}
}
