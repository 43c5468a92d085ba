//! Ordered execution of remote assignment writes.
//!
//! A batch is an explicit list of intents executed one at a time, each
//! awaited before the next starts. Execution stops at the first failure;
//! writes already applied stay applied, and the report says exactly which
//! intents succeeded, which failed and which never ran.

use rota_core::{
    errors::RotaResult,
    models::{assignment::Assignment, rota::AssignmentSlot},
    service::RotaService,
};
use serde::{Deserialize, Serialize};
use tracing::{error, info, warn};
use uuid::Uuid;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "op", rename_all = "camelCase")]
pub enum WriteIntent {
    #[serde(rename_all = "camelCase")]
    Reassign {
        rota_id: Uuid,
        index: usize,
        pharmacist_id: Uuid,
    },
    #[serde(rename_all = "camelCase")]
    Append { rota_id: Uuid, assignment: Assignment },
    #[serde(rename_all = "camelCase")]
    Remove { rota_id: Uuid, index: usize },
}

impl WriteIntent {
    pub fn rota_id(&self) -> Uuid {
        match self {
            WriteIntent::Reassign { rota_id, .. }
            | WriteIntent::Append { rota_id, .. }
            | WriteIntent::Remove { rota_id, .. } => *rota_id,
        }
    }

    async fn apply<S: RotaService + ?Sized>(&self, service: &S) -> RotaResult<()> {
        match self {
            WriteIntent::Reassign {
                rota_id,
                index,
                pharmacist_id,
            } => {
                service
                    .update_rota_assignment(*rota_id, AssignmentSlot::At(*index), Some(*pharmacist_id), None)
                    .await
            }
            WriteIntent::Append { rota_id, assignment } => {
                service
                    .update_rota_assignment(
                        *rota_id,
                        AssignmentSlot::Append,
                        Some(assignment.pharmacist_id()),
                        Some(assignment.clone()),
                    )
                    .await
            }
            WriteIntent::Remove { rota_id, index } => {
                service
                    .update_rota_assignment(*rota_id, AssignmentSlot::At(*index), None, None)
                    .await
            }
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct WriteBatch {
    intents: Vec<WriteIntent>,
}

impl WriteBatch {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, intent: WriteIntent) {
        self.intents.push(intent);
    }

    pub fn len(&self) -> usize {
        self.intents.len()
    }

    pub fn is_empty(&self) -> bool {
        self.intents.is_empty()
    }

    pub fn intents(&self) -> &[WriteIntent] {
        &self.intents
    }
}

impl From<Vec<WriteIntent>> for WriteBatch {
    fn from(intents: Vec<WriteIntent>) -> Self {
        Self { intents }
    }
}

impl IntoIterator for WriteBatch {
    type Item = WriteIntent;
    type IntoIter = std::vec::IntoIter<WriteIntent>;

    fn into_iter(self) -> Self::IntoIter {
        self.intents.into_iter()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FailedIntent {
    pub intent: WriteIntent,
    pub error: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BatchReport {
    pub applied: Vec<WriteIntent>,
    pub failed: Option<FailedIntent>,
    pub pending: Vec<WriteIntent>,
}

impl BatchReport {
    pub fn is_complete(&self) -> bool {
        self.failed.is_none()
    }

    /// Some writes landed and some did not; remote state needs re-syncing.
    pub fn is_partial(&self) -> bool {
        self.failed.is_some() && !self.applied.is_empty()
    }

    /// Intents that did not land, in their original order.
    pub fn unapplied(&self) -> Vec<WriteIntent> {
        self.failed
            .iter()
            .map(|failed| failed.intent.clone())
            .chain(self.pending.iter().cloned())
            .collect()
    }
}

pub async fn execute<S: RotaService + ?Sized>(service: &S, batch: WriteBatch) -> BatchReport {
    let mut report = BatchReport::default();
    let mut intents = batch.into_iter();

    while let Some(intent) = intents.next() {
        match intent.apply(service).await {
            Ok(()) => {
                info!("Applied write {:?}", intent);
                report.applied.push(intent);
            }
            Err(err) => {
                if report.applied.is_empty() {
                    warn!("Write {:?} failed before any change was made: {}", intent, err);
                } else {
                    error!(
                        "Write {:?} failed after {} writes were applied; remote rotas need reconciliation: {}",
                        intent,
                        report.applied.len(),
                        err
                    );
                }
                report.failed = Some(FailedIntent {
                    intent,
                    error: err.to_string(),
                });
                report.pending = intents.by_ref().collect();
                break;
            }
        }
    }

    report
}
