//! Classify command implementation.

use syncml_protocol::Phase;

/// Runs the classify command.
pub fn run(msg_id: u32, session_id: u32, alert: Option<&str>) {
    println!("{}", describe(msg_id, session_id, alert));
}

fn describe(msg_id: u32, session_id: u32, alert: Option<&str>) -> String {
    let phase = Phase::classify(msg_id, session_id, alert);
    format!("session={session_id} msg={msg_id} phase={phase}")
}
