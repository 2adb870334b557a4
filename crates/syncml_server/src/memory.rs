//! In-memory collaborators.
//!
//! These back the CLI and the test suites, and are usable as-is for
//! single-process deployments. All of them are thread-safe.

use crate::collaborators::{
    CachedCredential, CredentialCache, DeviceRegistry, NotificationService, OperationSource,
    Policy, PolicyEvaluator, ServiceResult,
};
use crate::device::DeviceRecord;
use parking_lot::RwLock;
use std::collections::{HashMap, HashSet};
use std::time::{Duration, Instant};
use syncml_protocol::{Operation, OperationStatus, Status, SyncmlMessage};

/// Device registry backed by a hash map.
///
/// At most one `enroll` per identifier succeeds; later attempts return
/// `false` until the device is disenrolled.
#[derive(Debug, Default)]
pub struct InMemoryDeviceRegistry {
    devices: RwLock<HashMap<String, DeviceRecord>>,
}

impl InMemoryDeviceRegistry {
    /// Creates an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the number of enrolled devices.
    pub fn len(&self) -> usize {
        self.devices.read().len()
    }

    /// Returns true if no device is enrolled.
    pub fn is_empty(&self) -> bool {
        self.devices.read().is_empty()
    }
}

impl DeviceRegistry for InMemoryDeviceRegistry {
    fn enroll(&self, record: DeviceRecord) -> ServiceResult<bool> {
        let mut devices = self.devices.write();
        if devices.contains_key(&record.identifier) {
            return Ok(false);
        }
        devices.insert(record.identifier.clone(), record);
        Ok(true)
    }

    fn get(&self, identifier: &str) -> ServiceResult<Option<DeviceRecord>> {
        Ok(self.devices.read().get(identifier).cloned())
    }

    fn modify(&self, record: DeviceRecord) -> ServiceResult<bool> {
        let mut devices = self.devices.write();
        match devices.get_mut(&record.identifier) {
            Some(existing) => {
                *existing = record;
                Ok(true)
            }
            None => Ok(false),
        }
    }

    fn disenroll(&self, identifier: &str) -> ServiceResult<bool> {
        Ok(self.devices.write().remove(identifier).is_some())
    }
}

/// Credential cache with a fixed entry lifetime.
#[derive(Debug)]
pub struct InMemoryCredentialCache {
    entries: RwLock<HashMap<String, (CachedCredential, Instant)>>,
    ttl: Duration,
}

impl InMemoryCredentialCache {
    /// Creates a cache whose entries live for `ttl`.
    pub fn new(ttl: Duration) -> Self {
        Self {
            entries: RwLock::new(HashMap::new()),
            ttl,
        }
    }

    /// Caches `token` as issued to `username`.
    pub fn insert(&self, token: impl Into<String>, username: impl Into<String>) {
        let credential = CachedCredential {
            username: username.into(),
        };
        self.entries
            .write()
            .insert(token.into(), (credential, Instant::now()));
    }
}

impl Default for InMemoryCredentialCache {
    fn default() -> Self {
        Self::new(Duration::from_secs(60 * 60))
    }
}

impl CredentialCache for InMemoryCredentialCache {
    fn lookup(&self, token: &str) -> ServiceResult<Option<CachedCredential>> {
        Ok(self
            .entries
            .read()
            .get(token)
            .filter(|(_, issued)| issued.elapsed() <= self.ttl)
            .map(|(credential, _)| credential.clone()))
    }
}

/// Per-device operation queue.
///
/// Operations stay `Pending` until they are marked in progress after a
/// reply carrying them was generated. The next batch of statuses from the
/// device settles them: `Completed` if every command status is 2xx, `Error`
/// otherwise.
#[derive(Debug, Default)]
pub struct InMemoryOperationQueue {
    queues: RwLock<HashMap<String, Vec<Operation>>>,
    next_id: RwLock<u64>,
}

impl InMemoryOperationQueue {
    /// Creates an empty queue.
    pub fn new() -> Self {
        Self::default()
    }

    /// Queues an operation for a device and returns its assigned id.
    pub fn enqueue(&self, device_id: impl Into<String>, mut operation: Operation) -> u64 {
        let id = {
            let mut next = self.next_id.write();
            *next += 1;
            *next
        };
        operation.id = id;
        operation.status = OperationStatus::Pending;
        self.queues
            .write()
            .entry(device_id.into())
            .or_default()
            .push(operation);
        id
    }

    /// Returns every operation queued for a device, in queue order.
    pub fn operations(&self, device_id: &str) -> Vec<Operation> {
        self.queues
            .read()
            .get(device_id)
            .cloned()
            .unwrap_or_default()
    }
}

impl OperationSource for InMemoryOperationQueue {
    fn update_statuses(&self, device_id: &str, statuses: &[Status]) -> ServiceResult<()> {
        let command_statuses: Vec<_> = statuses.iter().filter(|s| s.cmd != "SyncHdr").collect();
        if command_statuses.is_empty() {
            return Ok(());
        }

        let settled = if command_statuses
            .iter()
            .all(|s| (200..300).contains(&s.data))
        {
            OperationStatus::Completed
        } else {
            OperationStatus::Error
        };

        if let Some(queue) = self.queues.write().get_mut(device_id) {
            for op in queue
                .iter_mut()
                .filter(|op| op.status == OperationStatus::InProgress)
            {
                op.status = settled;
            }
        }
        Ok(())
    }

    fn pending_operations(&self, message: &SyncmlMessage) -> ServiceResult<Vec<Operation>> {
        Ok(self
            .queues
            .read()
            .get(message.device_uri())
            .map(|queue| {
                queue
                    .iter()
                    .filter(|op| op.status == OperationStatus::Pending)
                    .cloned()
                    .collect::<Vec<_>>()
            })
            .unwrap_or_default())
    }

    fn mark_in_progress(&self, device_id: &str, operations: &[Operation]) -> ServiceResult<()> {
        if operations.is_empty() {
            return Ok(());
        }
        if let Some(queue) = self.queues.write().get_mut(device_id) {
            for op in queue.iter_mut().filter(|op| {
                op.status == OperationStatus::Pending
                    && operations.iter().any(|sent| sent.id == op.id)
            }) {
                op.status = OperationStatus::InProgress;
            }
        }
        Ok(())
    }
}

/// Records which operations were delivered to each device.
#[derive(Debug, Default)]
pub struct InMemoryNotificationService {
    delivered: RwLock<HashMap<String, Vec<u64>>>,
}

impl InMemoryNotificationService {
    /// Creates an empty service.
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the ids of operations delivered to a device.
    pub fn delivered(&self, device_id: &str) -> Vec<u64> {
        self.delivered
            .read()
            .get(device_id)
            .cloned()
            .unwrap_or_default()
    }
}

impl NotificationService for InMemoryNotificationService {
    fn mark_delivered(&self, device_id: &str, operations: &[Operation]) -> ServiceResult<()> {
        if operations.is_empty() {
            return Ok(());
        }
        self.delivered
            .write()
            .entry(device_id.to_string())
            .or_default()
            .extend(operations.iter().map(|op| op.id));
        Ok(())
    }
}

/// Policy evaluator with fixed per-device policies.
///
/// Every feature is supported unless marked otherwise.
#[derive(Debug, Default)]
pub struct StaticPolicyEvaluator {
    policies: RwLock<HashMap<String, Policy>>,
    unsupported: HashSet<(String, String)>,
}

impl StaticPolicyEvaluator {
    /// Creates an evaluator with no policies.
    pub fn new() -> Self {
        Self::default()
    }

    /// Marks a feature as unsupported on a device type.
    pub fn with_unsupported(
        mut self,
        device_type: impl Into<String>,
        feature_code: impl Into<String>,
    ) -> Self {
        self.unsupported
            .insert((device_type.into(), feature_code.into()));
        self
    }

    /// Sets the effective policy of a device.
    pub fn set_policy(&self, device_id: impl Into<String>, policy: Policy) {
        self.policies.write().insert(device_id.into(), policy);
    }
}

impl PolicyEvaluator for StaticPolicyEvaluator {
    fn effective_policy(&self, device_id: &str) -> ServiceResult<Option<Policy>> {
        Ok(self.policies.read().get(device_id).cloned())
    }

    fn is_feature_supported(&self, device_type: &str, feature_code: &str) -> ServiceResult<bool> {
        Ok(!self
            .unsupported
            .contains(&(device_type.to_string(), feature_code.to_string())))
    }
}
