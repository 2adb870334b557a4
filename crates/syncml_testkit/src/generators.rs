//! Property-based test generators using proptest.
//!
//! Provides strategies for generating SyncML request data and management
//! operations.

use proptest::prelude::*;
use syncml_protocol::{Operation, OperationKind};
use syncml_server::{Policy, PolicyFeature};

const FEATURE_CODES: [&str; 5] = ["CAMERA", "VPN", "WIFI", "BLUETOOTH", "DEVICE_LOCK"];

/// Strategy for device identity URIs.
pub fn device_id_strategy() -> impl Strategy<Value = String> {
    "[0-9a-f]{8}-[0-9a-f]{4}-[0-9a-f]{4}".prop_map(|s| format!("urn:uuid:{s}"))
}

/// Strategy for item data as devices send it: printable text, possibly
/// containing markup characters.
pub fn item_data_strategy() -> impl Strategy<Value = String> {
    "[ -~]{0,48}"
}

/// Strategy for alert data that is not the disenrollment alert.
pub fn alert_data_strategy() -> impl Strategy<Value = Option<String>> {
    prop::option::of(prop_oneof![
        Just("1200".to_string()),
        Just("1201".to_string()),
        Just("com.microsoft:mdm.unenrollment.userrequesT".to_string()),
        "[a-z.:]{0,32}",
    ])
}

/// Strategy for operation kinds that map to a single command.
pub fn command_kind_strategy() -> impl Strategy<Value = OperationKind> {
    prop_oneof![
        Just(OperationKind::Info),
        Just(OperationKind::Command),
        Just(OperationKind::Config),
        Just(OperationKind::Profile),
    ]
}

/// Strategy for a single-command operation with an optional JSON string
/// payload.
pub fn command_operation_strategy() -> impl Strategy<Value = Operation> {
    (
        command_kind_strategy(),
        "\\./[A-Za-z]{1,12}(/[A-Za-z]{1,12}){0,3}",
        prop::option::of(item_data_strategy()),
    )
        .prop_map(|(kind, code, payload)| {
            let op = Operation::new(kind, code);
            match payload {
                Some(text) => op.with_payload(serde_json::Value::String(text).to_string()),
                None => op,
            }
        })
}

/// Strategy for feature codes.
pub fn feature_code_strategy() -> impl Strategy<Value = String> {
    prop::sample::select(FEATURE_CODES.to_vec()).prop_map(str::to_string)
}

/// Strategy for policy features with printable values.
pub fn policy_feature_strategy() -> impl Strategy<Value = PolicyFeature> {
    (
        feature_code_strategy(),
        "\\./Vendor/MSFT/Policy/Config/[A-Za-z]{1,12}",
        prop::sample::select(vec!["chr", "int", "bool"]),
        item_data_strategy(),
    )
        .prop_map(|(code, node_uri, format, value)| PolicyFeature {
            code,
            node_uri,
            format: format.to_string(),
            value,
        })
}

/// Strategy for an effective policy.
pub fn policy_strategy() -> impl Strategy<Value = Policy> {
    (
        any::<u64>(),
        "[a-z]{1,16}",
        prop::collection::vec(policy_feature_strategy(), 0..6),
    )
        .prop_map(|(id, name, features)| Policy { id, name, features })
}

/// Strategy for policy operations: no payload, a bare feature list, an
/// object with a feature list, or an object without one.
pub fn policy_operation_strategy() -> impl Strategy<Value = Operation> {
    let codes = || prop::collection::vec(feature_code_strategy(), 0..4);
    prop_oneof![
        Just(None),
        codes().prop_map(|c| Some(serde_json::json!(c))),
        codes().prop_map(|c| Some(serde_json::json!({ "features": c }))),
        any::<u32>().prop_map(|r| Some(serde_json::json!({ "revision": r }))),
    ]
    .prop_map(|payload| {
        let op = Operation::new(OperationKind::Policy, "POLICY_BUNDLE");
        match payload {
            Some(value) => op.with_payload(value.to_string()),
            None => op,
        }
    })
}

/// Strategy for any operation kind.
pub fn operation_strategy() -> impl Strategy<Value = Operation> {
    prop_oneof![
        4 => command_operation_strategy(),
        1 => policy_operation_strategy(),
    ]
}

/// Strategy for a batch of operations with sequential ids.
pub fn operations_strategy(max: usize) -> impl Strategy<Value = Vec<Operation>> {
    prop::collection::vec(operation_strategy(), 0..=max).prop_map(|ops| {
        ops.into_iter()
            .enumerate()
            .map(|(i, op)| op.with_id(i as u64 + 1))
            .collect()
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(64))]

        #[test]
        fn device_ids_are_urns(id in device_id_strategy()) {
            prop_assert!(id.starts_with("urn:uuid:"));
        }

        #[test]
        fn payloads_are_json(op in operation_strategy()) {
            if let Some(payload) = op.payload {
                prop_assert!(serde_json::from_str::<serde_json::Value>(&payload).is_ok());
            }
        }

        #[test]
        fn policy_payloads_are_json(op in policy_operation_strategy()) {
            prop_assert_eq!(op.kind, OperationKind::Policy);
            if let Some(payload) = op.payload {
                prop_assert!(serde_json::from_str::<serde_json::Value>(&payload).is_ok());
            }
        }

        #[test]
        fn batch_ids_are_sequential(ops in operations_strategy(8)) {
            for (i, op) in ops.iter().enumerate() {
                prop_assert_eq!(op.id, i as u64 + 1);
            }
        }
    }
}
