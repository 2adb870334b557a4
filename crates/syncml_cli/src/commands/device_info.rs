//! Device-info command implementation.

use serde::Serialize;
use syncml_protocol::{device_info_operations, Operation};

/// Device-info operation representation for output.
#[derive(Debug, Serialize)]
pub struct OperationInfo {
    /// Operation id.
    pub id: u64,
    /// SyncML command that delivers the operation.
    pub command: &'static str,
    /// Node URI read from the device.
    pub uri: String,
}

impl From<&Operation> for OperationInfo {
    fn from(op: &Operation) -> Self {
        Self {
            id: op.id,
            command: op.kind.command_name().as_str(),
            uri: op.code.clone(),
        }
    }
}

/// Runs the device-info command.
pub fn run(format: &str) -> Result<(), Box<dyn std::error::Error>> {
    let operations: Vec<OperationInfo> =
        device_info_operations().iter().map(OperationInfo::from).collect();

    match format {
        "json" => {
            println!("{}", serde_json::to_string_pretty(&operations)?);
        }
        _ => {
            print_text_output(&operations);
        }
    }

    Ok(())
}

fn print_text_output(operations: &[OperationInfo]) {
    println!("Device info requested at enrollment ({} operations)", operations.len());
    println!("================");
    println!();

    for op in operations {
        println!("[{}] {:4} {}", op.id, op.command, op.uri);
    }
}
