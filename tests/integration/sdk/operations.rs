//! Data operation tests for the SDK facade.

use alloy::{
	dyn_abi::DynSolValue,
	primitives::{hex, keccak256, Address, Bytes, B256, U256},
};
use std::sync::{
	atomic::{AtomicBool, AtomicUsize, Ordering},
	Arc,
};
use selendra_sdk::{
	services::blockchain::{ChainAddress, ProviderError},
	AccountBalance, ChainType, EventKind, SdkError, SdkEvent, TokenInfo,
};
use std::str::FromStr;

use crate::integration::mocks::*;

const ALICE: &str = "5GrwvaEF5zXb26Fz9rcQpDWS57CtERHpNehXCPcNoHGKutQY";
const RECIPIENT: &str = "0x742d35Cc6634C0532925a3b844Bc454e4438f44e";
const TOKEN: &str = "0x5FbDB2315678afecb367f032d93F642f64180aa3";
const DEV_KEY: &str = "0xac0974bec39a17e36ba4a6b4d238ff944bacb478cbed5efcae784d7bf4f2ff80";
const DEV_ADDRESS: &str = "0xf39Fd6e51aad88F6F4ce6aB8827279cffFb92266";

fn encode_outputs(values: Vec<DynSolValue>) -> Bytes {
	DynSolValue::Tuple(values).abi_encode_params().into()
}

#[tokio::test]
async fn test_formatted_evm_balance() {
	let signals = signal_channel();
	let mut client = handshaken_evm_client(&signals);
	client
		.expect_get_balance()
		.withf(|address| *address == Address::from_str(RECIPIENT).unwrap())
		.returning(|_| Ok(U256::from(1_500_000_000_000_000_000u128)));
	let sdk = connected_evm_sdk(client).await;

	assert_eq!(
		sdk.get_balance(RECIPIENT).await.unwrap(),
		U256::from(1_500_000_000_000_000_000u128)
	);
	assert_eq!(sdk.get_formatted_balance(RECIPIENT, None).await.unwrap(), 1.5);
	assert_eq!(
		sdk.get_formatted_balance(RECIPIENT, Some(12)).await.unwrap(),
		1_500_000.0
	);
}

#[tokio::test]
async fn test_substrate_balances() {
	let signals = signal_channel();
	let mut client = handshaken_substrate_client(&signals);
	client.expect_account_balance().returning(|_| {
		Ok(AccountBalance {
			free: 10_000_000_000_000_000_000,
			reserved: 2_000_000_000_000_000_000,
			frozen: 1_000_000_000_000_000_000,
		})
	});
	let sdk = connected_substrate_sdk(client).await;

	assert_eq!(
		sdk.get_balance(ALICE).await.unwrap(),
		U256::from(10_000_000_000_000_000_000u128)
	);
	let balance = sdk.get_account_balance(ALICE).await.unwrap();
	assert_eq!(balance.reserved, 2_000_000_000_000_000_000);
	assert_eq!(balance.transferable(), 9_000_000_000_000_000_000);
	assert_eq!(sdk.get_formatted_balance(ALICE, None).await.unwrap(), 10.0);
}

#[tokio::test]
async fn test_invalid_address_is_emitted_and_returned() {
	let signals = signal_channel();
	let sdk = connected_substrate_sdk(handshaken_substrate_client(&signals)).await;
	let mut events = sdk.events().receiver();

	let error = sdk.get_account_balance("not-an-address").await.unwrap_err();
	assert!(matches!(
		error,
		SdkError::Provider(ProviderError::InvalidArgument(_))
	));
	assert_eq!(drain(&mut events), vec![SdkEvent::Error(error)]);
}

#[tokio::test]
async fn test_chain_specific_operations_check_chain_type() {
	let signals = signal_channel();
	let evm = connected_evm_sdk(handshaken_evm_client(&signals)).await;
	let error = evm.get_account_balance(ALICE).await.unwrap_err();
	assert!(matches!(
		error,
		SdkError::WrongChainType {
			expected: ChainType::Substrate,
			actual: ChainType::EVM,
			..
		}
	));

	let signals = signal_channel();
	let substrate = connected_substrate_sdk(handshaken_substrate_client(&signals)).await;
	for result in [
		substrate.get_erc20_balance(TOKEN, RECIPIENT).await.map(|_| ()),
		substrate.estimate_gas(None, RECIPIENT, "1").await.map(|_| ()),
		substrate.get_erc20_info(TOKEN).await.map(|_| ()),
		substrate.get_nonce(DEV_ADDRESS).await.map(|_| ()),
		substrate
			.approve_erc20(DEV_KEY, TOKEN, RECIPIENT, U256::from(1u64))
			.await
			.map(|_| ()),
		substrate
			.get_erc20_allowance(TOKEN, DEV_ADDRESS, RECIPIENT)
			.await
			.map(|_| ()),
	] {
		assert!(matches!(
			result,
			Err(SdkError::WrongChainType {
				expected: ChainType::EVM,
				actual: ChainType::Substrate,
				..
			})
		));
	}
}

#[tokio::test]
async fn test_builder_changes_wait_for_next_connect() {
	let signals = signal_channel();
	let sdk = connected_evm_sdk(handshaken_evm_client(&signals)).await;

	sdk.with_chain_type(ChainType::Substrate)
		.with_endpoint("ws://127.0.0.1:9955");

	// The live connection is still the EVM one
	assert!(sdk.is_connected());
	assert_eq!(sdk.provider().unwrap().chain_type(), ChainType::EVM);
	assert_eq!(sdk.chain_type(), ChainType::Substrate);
	let info = sdk.connection_info();
	assert_eq!(info.endpoint.as_deref(), Some(EVM_ENDPOINT));
	assert_eq!(info.chain_type, ChainType::EVM);

	// Chain specific calls follow the configured chain type
	let result = sdk.estimate_gas(None, RECIPIENT, "1").await;
	assert!(matches!(result, Err(SdkError::WrongChainType { .. })));

	// Once disconnected the configuration shows through
	sdk.disconnect().await.unwrap();
	let info = sdk.connection_info();
	assert_eq!(info.endpoint.as_deref(), Some("ws://127.0.0.1:9955"));
	assert_eq!(info.chain_type, ChainType::Substrate);
}

#[tokio::test]
async fn test_erc20_info() {
	let signals = signal_channel();
	let mut client = handshaken_evm_client(&signals);
	client.expect_call().returning(|to, input| {
		assert_eq!(to, Address::from_str(TOKEN).unwrap());
		let output = match hex::encode(&input[..4]).as_str() {
			"06fdde03" => encode_outputs(vec![DynSolValue::String("Selendra USD".into())]),
			"95d89b41" => encode_outputs(vec![DynSolValue::String("sUSD".into())]),
			"313ce567" => encode_outputs(vec![DynSolValue::Uint(U256::from(6), 8)]),
			"18160ddd" => encode_outputs(vec![DynSolValue::Uint(U256::from(1_000_000_000_000u64), 256)]),
			"70a08231" => encode_outputs(vec![DynSolValue::Uint(U256::from(42_000_000u64), 256)]),
			other => panic!("unexpected selector {}", other),
		};
		Ok(output)
	});
	let sdk = connected_evm_sdk(client).await;

	assert_eq!(
		sdk.get_erc20_info(TOKEN).await.unwrap(),
		TokenInfo {
			name: "Selendra USD".to_string(),
			symbol: "sUSD".to_string(),
			decimals: 6,
			total_supply: U256::from(1_000_000_000_000u64),
		}
	);
	assert_eq!(
		sdk.get_erc20_balance(TOKEN, RECIPIENT).await.unwrap(),
		U256::from(42_000_000u64)
	);
}

#[tokio::test]
async fn test_send_transfer() {
	let signals = signal_channel();
	let mut client = handshaken_evm_client(&signals);
	client
		.expect_send_transaction()
		.withf(|signer, to, value, input| {
			signer.address() == Address::from_str(DEV_ADDRESS).unwrap()
				&& *to == Address::from_str(RECIPIENT).unwrap()
				&& *value == U256::from(1_500_000_000_000_000_000u128)
				&& input.is_empty()
		})
		.times(1)
		.returning(|_, _, _, _| Ok(B256::repeat_byte(0xab)));
	let sdk = connected_evm_sdk(client).await;

	let tx_hash = sdk.send_transfer(DEV_KEY, RECIPIENT, "1.5").await.unwrap();
	assert_eq!(tx_hash, B256::repeat_byte(0xab));
}

#[tokio::test]
async fn test_send_erc20_transfer_encodes_call() {
	let signals = signal_channel();
	let mut client = handshaken_evm_client(&signals);
	client
		.expect_send_transaction()
		.withf(|_, to, value, input| {
			*to == Address::from_str(TOKEN).unwrap()
				&& value.is_zero()
				&& hex::encode(&input[..4]) == "a9059cbb"
				&& input.len() == 4 + 32 * 2
		})
		.times(1)
		.returning(|_, _, _, _| Ok(B256::repeat_byte(0x01)));
	let sdk = connected_evm_sdk(client).await;

	let tx_hash = sdk
		.send_erc20_transfer(DEV_KEY, TOKEN, RECIPIENT, U256::from(1_000_000u64))
		.await
		.unwrap();
	assert_eq!(tx_hash, B256::repeat_byte(0x01));
}

#[tokio::test]
async fn test_invalid_private_key() {
	let signals = signal_channel();
	let sdk = connected_evm_sdk(handshaken_evm_client(&signals)).await;

	let errors = Arc::new(AtomicUsize::new(0));
	let counter = Arc::clone(&errors);
	sdk.subscribe(EventKind::Error, move |_| {
		counter.fetch_add(1, Ordering::SeqCst);
	});

	let error = sdk
		.send_transfer("0xdeadbeef", RECIPIENT, "1")
		.await
		.unwrap_err();
	assert!(matches!(
		error,
		SdkError::Provider(ProviderError::InvalidArgument(_))
	));
	assert!(!error.to_string().contains("deadbeef"));
	assert_eq!(errors.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn test_call_contract_function() {
	let signals = signal_channel();
	let mut client = handshaken_evm_client(&signals);
	client.expect_call().returning(|_, input| {
		let selector = keccak256("getValue(uint256)");
		assert_eq!(&input[..4], &selector[..4]);
		Ok(encode_outputs(vec![
			DynSolValue::Uint(U256::from(7), 256),
			DynSolValue::Bool(true),
		]))
	});
	let sdk = connected_evm_sdk(client).await;

	let outputs = sdk
		.call_contract_function(
			TOKEN,
			&["function getValue(uint256 key) view returns (uint256, bool)"],
			"getValue",
			&[DynSolValue::Uint(U256::from(1), 256)],
		)
		.await
		.unwrap();
	assert_eq!(
		outputs,
		vec![DynSolValue::Uint(U256::from(7), 256), DynSolValue::Bool(true)]
	);

	let missing = sdk
		.call_contract_function(
			TOKEN,
			&["function getValue(uint256 key) view returns (uint256, bool)"],
			"setValue",
			&[],
		)
		.await;
	assert!(matches!(
		missing,
		Err(SdkError::Provider(ProviderError::InvalidArgument(_)))
	));
}

#[tokio::test]
async fn test_execute_contract_transaction_with_value() {
	let signals = signal_channel();
	let mut client = handshaken_evm_client(&signals);
	client
		.expect_send_transaction()
		.withf(|_, _, value, input| {
			*value == U256::from(5u64) && input.len() == 4 + 32
		})
		.times(1)
		.returning(|_, _, _, _| Ok(B256::repeat_byte(0x02)));
	let sdk = connected_evm_sdk(client).await;

	let tx_hash = sdk
		.execute_contract_transaction(
			DEV_KEY,
			TOKEN,
			&["function deposit(uint256 id) payable"],
			"deposit",
			&[DynSolValue::Uint(U256::from(9), 256)],
			Some(U256::from(5u64)),
		)
		.await
		.unwrap();
	assert_eq!(tx_hash, B256::repeat_byte(0x02));
}

#[tokio::test]
async fn test_estimate_gas() {
	let signals = signal_channel();
	let mut client = handshaken_evm_client(&signals);
	client
		.expect_estimate_gas()
		.withf(|from, _, value, _| {
			*from == Some(Address::from_str(DEV_ADDRESS).unwrap())
				&& *value == U256::from(1_000_000_000_000_000_000u128)
		})
		.returning(|_, _, _, _| Ok(21_000));
	let sdk = connected_evm_sdk(client).await;

	assert_eq!(
		sdk.estimate_gas(Some(DEV_ADDRESS), RECIPIENT, "1").await.unwrap(),
		21_000
	);
}

#[tokio::test]
async fn test_backend_failure_is_operation_error() {
	let signals = signal_channel();
	let mut client = handshaken_evm_client(&signals);
	client
		.expect_get_balance()
		.returning(|_| Err(anyhow::anyhow!("header not found")));
	let sdk = connected_evm_sdk(client).await;
	let mut events = sdk.events().receiver();

	let error = sdk.get_balance(RECIPIENT).await.unwrap_err();
	assert!(matches!(
		error,
		SdkError::Provider(ProviderError::OperationError(_))
	));
	assert!(error.to_string().contains("header not found"));
	assert_eq!(drain(&mut events), vec![SdkEvent::Error(error)]);
}

#[tokio::test]
async fn test_health_check_on_live_connections() {
	let signals = signal_channel();
	let evm = connected_evm_sdk(handshaken_evm_client(&signals)).await;
	assert!(evm.is_healthy());
	let status = evm.health_check().await;
	assert!(status.healthy);
	assert_eq!(status.chain_type, ChainType::EVM);
	assert!(status.latency_ms.is_some());
	assert!(status.error.is_none());

	let signals = signal_channel();
	let substrate = connected_substrate_sdk(handshaken_substrate_client(&signals)).await;
	assert!(substrate.is_healthy());
	let status = substrate.health_check().await;
	assert!(status.healthy);
	assert_eq!(status.chain_type, ChainType::Substrate);
}

#[tokio::test]
async fn test_health_check_reports_unresponsive_node() {
	let signals = signal_channel();
	let node_down = Arc::new(AtomicBool::new(false));
	let mut client = MockEvmClient::new();
	let down = Arc::clone(&node_down);
	client.expect_chain_id().returning(move || {
		if down.load(Ordering::SeqCst) {
			Err(anyhow::anyhow!("connection reset by peer"))
		} else {
			Ok(TEST_CHAIN_ID)
		}
	});
	client
		.expect_network_version()
		.returning(|| Ok(TEST_CHAIN_ID.to_string()));
	client.expect_close().returning(|| Ok(()));
	let sender = signals.clone();
	client
		.expect_signals()
		.returning(move || sender.subscribe());
	let sdk = connected_evm_sdk(client).await;
	let mut events = sdk.events().receiver();

	node_down.store(true, Ordering::SeqCst);
	let status = sdk.health_check().await;
	assert!(!status.healthy);
	assert!(status.latency_ms.is_some());
	assert!(status
		.error
		.as_deref()
		.is_some_and(|error| error.contains("connection reset by peer")));
	// Still connected; the check only reports
	assert!(sdk.is_healthy());
	assert!(drain(&mut events).is_empty());

	sdk.disconnect().await.unwrap();
	assert!(!sdk.is_healthy());
	let status = sdk.health_check().await;
	assert_eq!(status.error.as_deref(), Some("No EVM connection"));
	assert_eq!(status.latency_ms, None);
}

#[tokio::test]
async fn test_address_conversion() {
	let signals = signal_channel();
	let sdk = connected_substrate_sdk(handshaken_substrate_client(&signals)).await;

	let mapped = sdk.convert_evm_to_substrate(RECIPIENT).unwrap();
	assert_ne!(mapped, ALICE);
	assert_eq!(
		sdk.convert_substrate_to_evm(&mapped).unwrap(),
		Address::from_str(RECIPIENT).unwrap()
	);

	// Native accounts derive their EVM address from the account hash
	let alice = sdk.convert_substrate_to_evm(ALICE).unwrap();
	let alice_bytes = subxt::utils::AccountId32::from_str(ALICE).unwrap().0;
	assert_eq!(alice.as_slice(), &keccak256(alice_bytes)[12..]);

	let mut events = sdk.events().receiver();
	let error = sdk.convert_evm_to_substrate(ALICE).unwrap_err();
	assert!(matches!(
		error,
		SdkError::Provider(ProviderError::InvalidArgument(_))
	));
	assert_eq!(drain(&mut events), vec![SdkEvent::Error(error)]);
}

#[tokio::test]
async fn test_validate_address() {
	let signals = signal_channel();
	let sdk = connected_evm_sdk(handshaken_evm_client(&signals)).await;

	assert_eq!(
		sdk.validate_address(RECIPIENT).unwrap(),
		ChainAddress::Evm(Address::from_str(RECIPIENT).unwrap())
	);
	assert_eq!(
		sdk.validate_address(ALICE).unwrap().chain_type(),
		ChainType::Substrate
	);
	for bad in ["0x0000000000000000000000000000000000000000", "0x1234", "alice"] {
		assert!(matches!(
			sdk.validate_address(bad),
			Err(SdkError::Provider(ProviderError::InvalidArgument(_)))
		));
	}
}

#[tokio::test]
async fn test_approve_erc20_encodes_spender_and_amount() {
	let signals = signal_channel();
	let mut client = handshaken_evm_client(&signals);
	client
		.expect_send_transaction()
		.withf(|signer, to, value, input| {
			signer.address() == Address::from_str(DEV_ADDRESS).unwrap()
				&& *to == Address::from_str(TOKEN).unwrap()
				&& value.is_zero()
				&& hex::encode(&input[..4]) == "095ea7b3"
				&& input.len() == 4 + 32 * 2
				&& &input[16..36] == Address::from_str(RECIPIENT).unwrap().as_slice()
				&& U256::from_be_slice(&input[36..68]) == U256::from(250_000u64)
		})
		.times(1)
		.returning(|_, _, _, _| Ok(B256::repeat_byte(0x0a)));
	let sdk = connected_evm_sdk(client).await;

	let tx_hash = sdk
		.approve_erc20(DEV_KEY, TOKEN, RECIPIENT, U256::from(250_000u64))
		.await
		.unwrap();
	assert_eq!(tx_hash, B256::repeat_byte(0x0a));
}

#[tokio::test]
async fn test_erc20_allowance() {
	let signals = signal_channel();
	let mut client = handshaken_evm_client(&signals);
	client
		.expect_call()
		.withf(|to, input| {
			*to == Address::from_str(TOKEN).unwrap()
				&& hex::encode(&input[..4]) == "dd62ed3e"
				&& &input[16..36] == Address::from_str(DEV_ADDRESS).unwrap().as_slice()
				&& &input[48..68] == Address::from_str(RECIPIENT).unwrap().as_slice()
		})
		.times(1)
		.returning(|_, _| Ok(encode_outputs(vec![DynSolValue::Uint(U256::from(250_000u64), 256)])));
	let sdk = connected_evm_sdk(client).await;

	assert_eq!(
		sdk.get_erc20_allowance(TOKEN, DEV_ADDRESS, RECIPIENT)
			.await
			.unwrap(),
		U256::from(250_000u64)
	);
}

#[tokio::test]
async fn test_get_nonce() {
	let signals = signal_channel();
	let mut client = handshaken_evm_client(&signals);
	client
		.expect_nonce()
		.withf(|address| *address == Address::from_str(DEV_ADDRESS).unwrap())
		.times(1)
		.returning(|_| Ok(7));
	let sdk = connected_evm_sdk(client).await;

	assert_eq!(sdk.get_nonce(DEV_ADDRESS).await.unwrap(), 7);
	assert!(matches!(
		sdk.get_nonce(ALICE).await,
		Err(SdkError::Provider(ProviderError::InvalidArgument(_)))
	));
}
