//! Building replies from pending operations.

use crate::collaborators::PolicyEvaluator;
use crate::error::{ServerError, ServerResult};
use serde_json::Value;
use sha2::{Digest, Sha256};
use std::sync::Arc;
use syncml_protocol::constants::status_codes;
use syncml_protocol::{
    ComplianceNote, ItemMeta, Operation, OperationKind, ProtocolError, ReplyGenerator, ReplyItem,
    SyncmlMessage, SyncmlReply,
};

/// Builds and serializes replies.
///
/// Without operations the reply is a bare acknowledgement. With operations,
/// each one becomes a SyncML command; policy operations are expanded into the
/// device's effective policy features.
pub struct OperationReplyBuilder {
    policy: Arc<dyn PolicyEvaluator>,
    generator: Arc<dyn ReplyGenerator>,
    device_type: String,
}

impl OperationReplyBuilder {
    /// Creates a builder.
    pub fn new(
        policy: Arc<dyn PolicyEvaluator>,
        generator: Arc<dyn ReplyGenerator>,
        device_type: impl Into<String>,
    ) -> Self {
        Self {
            policy,
            generator,
            device_type: device_type.into(),
        }
    }

    /// Builds the reply document for `message`.
    pub fn build(
        &self,
        message: &SyncmlMessage,
        operations: Option<&[Operation]>,
    ) -> ServerResult<SyncmlReply> {
        let mut reply = SyncmlReply::answering(message);

        if let Some(ref alert) = message.body.alert {
            reply.push_status(
                message.header.msg_id,
                alert.cmd_id,
                "Alert",
                status_codes::OK,
            );
        }

        for operation in operations.unwrap_or_default() {
            self.append_operation(&mut reply, message.device_uri(), operation)?;
        }

        Ok(reply)
    }

    /// Builds the reply and serializes it.
    pub fn generate(
        &self,
        message: &SyncmlMessage,
        operations: Option<&[Operation]>,
    ) -> ServerResult<String> {
        let reply = self.build(message, operations)?;
        self.generator
            .generate(&reply)
            .map_err(ServerError::EncodingFailure)
    }

    fn append_operation(
        &self,
        reply: &mut SyncmlReply,
        device_id: &str,
        operation: &Operation,
    ) -> ServerResult<()> {
        if operation.kind == OperationKind::Policy {
            return self.append_policy(reply, device_id, operation);
        }

        let mut item = ReplyItem::target(&operation.code);
        if let Some(data) = payload_data(operation)? {
            item = item
                .with_meta(ItemMeta {
                    format: Some("chr".to_string()),
                    ..ItemMeta::default()
                })
                .with_data(data);
        }

        reply.push_command(operation.kind.command_name(), vec![item]);
        Ok(())
    }

    fn append_policy(
        &self,
        reply: &mut SyncmlReply,
        device_id: &str,
        operation: &Operation,
    ) -> ServerResult<()> {
        let payload = policy_payload(operation)?;
        let selected = payload.as_ref().and_then(selected_features);

        let Some(policy) = self
            .policy
            .effective_policy(device_id)
            .map_err(ServerError::PolicyUnavailable)?
        else {
            reply.push_note(ComplianceNote {
                operation_id: operation.id,
                feature_code: operation.code.clone(),
                reason: "no effective policy".to_string(),
            });
            return Ok(());
        };

        let canonical = match payload {
            Some(ref value) => serde_json::to_string(value),
            None => serde_json::to_string(&policy),
        }
        .map_err(|e| {
            ServerError::EncodingFailure(ProtocolError::encoding_failed(format!(
                "policy operation {}: {e}",
                operation.id
            )))
        })?;
        let digest = checksum(&canonical);

        let mut items = Vec::with_capacity(policy.features.len());
        for feature in &policy.features {
            if let Some(ref codes) = selected {
                if !codes.iter().any(|c| c == &feature.code) {
                    continue;
                }
            }

            let supported = self
                .policy
                .is_feature_supported(&self.device_type, &feature.code)
                .map_err(ServerError::FeatureUnavailable)?;
            if !supported {
                reply.push_note(ComplianceNote {
                    operation_id: operation.id,
                    feature_code: feature.code.clone(),
                    reason: format!("not supported on {}", self.device_type),
                });
                continue;
            }

            items.push(
                ReplyItem::target(&feature.node_uri)
                    .with_meta(ItemMeta {
                        format: Some(feature.format.clone()),
                        mime_type: Some("text/plain".to_string()),
                        checksum: Some(digest.clone()),
                    })
                    .with_data(&feature.value),
            );
        }

        if !items.is_empty() {
            reply.push_command(operation.kind.command_name(), items);
        }
        Ok(())
    }
}

/// Extracts the data carried by an operation's JSON payload.
///
/// A JSON string is sent as-is, an object's `value` member is sent as text,
/// anything else is sent as compact JSON.
fn payload_data(operation: &Operation) -> ServerResult<Option<String>> {
    let Some(ref payload) = operation.payload else {
        return Ok(None);
    };

    let value: Value = serde_json::from_str(payload).map_err(|e| {
        ServerError::EncodingFailure(ProtocolError::encoding_failed(format!(
            "payload of operation {}: {e}",
            operation.id
        )))
    })?;

    let data = match &value {
        Value::String(s) => s.clone(),
        Value::Object(map) => match map.get("value") {
            Some(Value::String(s)) => s.clone(),
            Some(other) => other.to_string(),
            None => value.to_string(),
        },
        other => other.to_string(),
    };
    Ok(Some(data))
}

/// Parses the JSON payload of a policy operation.
fn policy_payload(operation: &Operation) -> ServerResult<Option<Value>> {
    let Some(ref payload) = operation.payload else {
        return Ok(None);
    };

    serde_json::from_str(payload).map(Some).map_err(|e| {
        ServerError::EncodingFailure(ProtocolError::encoding_failed(format!(
            "payload of policy operation {}: {e}",
            operation.id
        )))
    })
}

/// Feature codes a policy payload restricts the policy to.
///
/// Either a bare array of codes or an object with a `features` array.
/// Any other payload applies the whole policy.
fn selected_features(payload: &Value) -> Option<Vec<String>> {
    let codes = match payload {
        Value::Array(codes) => codes,
        Value::Object(map) => map.get("features")?.as_array()?,
        _ => return None,
    };
    Some(
        codes
            .iter()
            .filter_map(Value::as_str)
            .map(str::to_string)
            .collect(),
    )
}

fn checksum(value: &str) -> String {
    Sha256::digest(value.as_bytes())
        .iter()
        .map(|b| format!("{:02x}", b))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::collaborators::{Policy, PolicyFeature};
    use crate::memory::StaticPolicyEvaluator;
    use syncml_protocol::{
        device_info_operations, Alert, CommandName, Source, SyncmlBody, SyncmlHeader,
        XmlReplyGenerator,
    };

    const DEVICE: &str = "urn:uuid:dev-1";

    fn message() -> SyncmlMessage {
        SyncmlMessage::new(SyncmlHeader::new(3, 1, Source::new(DEVICE, "alice")))
            .with_body(SyncmlBody::default().with_alert(Alert::new("1201").with_code(1201)))
    }

    fn camera_policy() -> Policy {
        Policy {
            id: 7,
            name: "lockdown".into(),
            features: vec![
                PolicyFeature {
                    code: "CAMERA".into(),
                    node_uri: "./Vendor/MSFT/Policy/Config/Camera/AllowCamera".into(),
                    format: "int".into(),
                    value: "0".into(),
                },
                PolicyFeature {
                    code: "VPN".into(),
                    node_uri: "./Vendor/MSFT/VPNv2/corp".into(),
                    format: "chr".into(),
                    value: "corp.example.com".into(),
                },
            ],
        }
    }

    fn builder(policy: StaticPolicyEvaluator) -> OperationReplyBuilder {
        OperationReplyBuilder::new(Arc::new(policy), Arc::new(XmlReplyGenerator::new()), "windows")
    }

    #[test]
    fn acknowledgement_has_only_statuses() {
        let reply = builder(StaticPolicyEvaluator::new())
            .build(&message(), None)
            .unwrap();

        assert!(reply.is_acknowledgement());
        let cmds: Vec<_> = reply.body.statuses.iter().map(|s| s.cmd.as_str()).collect();
        assert_eq!(cmds, vec!["SyncHdr", "Alert"]);
    }

    #[test]
    fn empty_list_is_acknowledgement() {
        let reply = builder(StaticPolicyEvaluator::new())
            .build(&message(), Some(&[]))
            .unwrap();
        assert!(reply.is_acknowledgement());
    }

    #[test]
    fn device_info_becomes_gets() {
        let ops = device_info_operations();
        let reply = builder(StaticPolicyEvaluator::new())
            .build(&message(), Some(&ops))
            .unwrap();

        assert_eq!(reply.body.commands.len(), ops.len());
        assert!(reply
            .body
            .commands
            .iter()
            .all(|c| c.name == CommandName::Get && c.items.len() == 1));
        assert_eq!(reply.body.commands[0].items[0].target, ops[0].code);
    }

    #[test]
    fn payload_values() {
        let ops = vec![
            Operation::new(OperationKind::Command, "./Device/Vendor/MSFT/RemoteWipe/doWipe"),
            Operation::new(OperationKind::Config, "./Vendor/MSFT/Node").with_payload(r#""text""#),
            Operation::new(OperationKind::Config, "./Vendor/MSFT/Other")
                .with_payload(r#"{"value": 4}"#),
        ];
        let reply = builder(StaticPolicyEvaluator::new())
            .build(&message(), Some(&ops))
            .unwrap();

        let data: Vec<_> = reply
            .body
            .commands
            .iter()
            .map(|c| c.items[0].data.clone())
            .collect();
        assert_eq!(data, vec![None, Some("text".into()), Some("4".into())]);
        assert_eq!(reply.body.commands[0].name, CommandName::Exec);
    }

    #[test]
    fn invalid_payload_is_encoding_failure() {
        let ops = vec![Operation::new(OperationKind::Config, "./Node").with_payload("{not json")];
        let err = builder(StaticPolicyEvaluator::new())
            .build(&message(), Some(&ops))
            .unwrap_err();
        assert!(matches!(err, ServerError::EncodingFailure(_)));
    }

    #[test]
    fn policy_expands_supported_features() {
        let evaluator = StaticPolicyEvaluator::new().with_unsupported("windows", "VPN");
        evaluator.set_policy(DEVICE, camera_policy());

        let ops = vec![Operation::new(OperationKind::Policy, "POLICY_BUNDLE").with_id(11)];
        let reply = builder(evaluator).build(&message(), Some(&ops)).unwrap();

        assert_eq!(reply.body.commands.len(), 1);
        let item = &reply.body.commands[0].items[0];
        assert_eq!(item.data.as_deref(), Some("0"));
        let meta = item.meta.as_ref().unwrap();
        assert_eq!(meta.format.as_deref(), Some("int"));
        assert_eq!(meta.checksum.as_deref().map(str::len), Some(64));

        assert_eq!(reply.body.notes.len(), 1);
        assert_eq!(reply.body.notes[0].feature_code, "VPN");
        assert_eq!(reply.body.notes[0].operation_id, 11);
    }

    #[test]
    fn policy_payload_selects_features() {
        let evaluator = StaticPolicyEvaluator::new();
        evaluator.set_policy(DEVICE, camera_policy());

        let ops = vec![Operation::new(OperationKind::Policy, "POLICY_BUNDLE").with_payload(r#"["VPN"]"#)];
        let reply = builder(evaluator).build(&message(), Some(&ops)).unwrap();

        let targets: Vec<_> = reply.body.commands[0]
            .items
            .iter()
            .map(|i| i.target.as_str())
            .collect();
        assert_eq!(targets, vec!["./Vendor/MSFT/VPNv2/corp"]);
    }

    #[test]
    fn policy_object_payload_selects_features() {
        let evaluator = StaticPolicyEvaluator::new();
        evaluator.set_policy(DEVICE, camera_policy());

        let ops = vec![Operation::new(OperationKind::Policy, "POLICY_BUNDLE")
            .with_payload(r#"{"features": ["CAMERA"], "revision": 3}"#)];
        let reply = builder(evaluator).build(&message(), Some(&ops)).unwrap();

        let item = &reply.body.commands[0].items[0];
        assert_eq!(reply.body.commands[0].items.len(), 1);
        assert_eq!(item.target, "./Vendor/MSFT/Policy/Config/Camera/AllowCamera");
        assert_eq!(
            item.meta.as_ref().unwrap().checksum.as_deref(),
            Some(checksum(r#"{"features":["CAMERA"],"revision":3}"#).as_str())
        );
    }

    #[test]
    fn policy_payload_without_selection_applies_all() {
        let evaluator = StaticPolicyEvaluator::new();
        evaluator.set_policy(DEVICE, camera_policy());

        let ops = vec![Operation::new(OperationKind::Policy, "POLICY_BUNDLE")
            .with_payload(r#"{"revision": 3}"#)];
        let reply = builder(evaluator).build(&message(), Some(&ops)).unwrap();

        assert_eq!(reply.body.commands[0].items.len(), 2);
    }

    #[test]
    fn policy_items_share_checksum() {
        let evaluator = StaticPolicyEvaluator::new();
        evaluator.set_policy(DEVICE, camera_policy());

        let ops = vec![Operation::new(OperationKind::Policy, "POLICY_BUNDLE")];
        let reply = builder(evaluator).build(&message(), Some(&ops)).unwrap();

        let expected = checksum(&serde_json::to_string(&camera_policy()).unwrap());
        assert!(reply.body.commands[0]
            .items
            .iter()
            .all(|i| i.meta.as_ref().unwrap().checksum.as_deref() == Some(expected.as_str())));
    }

    #[test]
    fn invalid_policy_payload_is_encoding_failure() {
        let ops = vec![Operation::new(OperationKind::Policy, "POLICY_BUNDLE").with_payload("[")];
        let err = builder(StaticPolicyEvaluator::new())
            .build(&message(), Some(&ops))
            .unwrap_err();
        assert!(matches!(err, ServerError::EncodingFailure(_)));
    }

    #[test]
    fn missing_policy_is_noted() {
        let ops = vec![Operation::new(OperationKind::Policy, "POLICY_BUNDLE")];
        let reply = builder(StaticPolicyEvaluator::new())
            .build(&message(), Some(&ops))
            .unwrap();

        assert!(reply.is_acknowledgement());
        assert_eq!(reply.body.notes[0].reason, "no effective policy");
    }

    #[test]
    fn checksum_is_sha256_hex() {
        assert_eq!(
            checksum("abc"),
            "ba7816bf8f01cfea414140de5dae2223b00361a396177a9cb410ff61f20015ad"
        );
    }

    #[test]
    fn generate_serializes() {
        let xml = builder(StaticPolicyEvaluator::new())
            .generate(&message(), Some(&device_info_operations()))
            .unwrap();
        assert!(xml.contains("<Get><CmdID>3</CmdID>"));
        assert!(xml.contains("./DevDetail/SwV"));
    }
}
