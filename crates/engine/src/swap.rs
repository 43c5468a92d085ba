//! Drag-and-drop exchange of two pharmacists between grid cells.
//!
//! The protocol is an explicit state machine: a source is armed, a target is
//! hovered, and the drop commits. The local working copy is swapped first
//! and then two remote writes run in order; if either fails the local copy
//! is put back.

use chrono::NaiveDate;
use rota_core::{
    errors::{RotaError, RotaResult},
    models::{rota::AssignmentSlot, time_slot::TimeRange},
    service::RotaService,
};
use serde::{Deserialize, Serialize};
use tracing::{debug, error, info, warn};
use uuid::Uuid;

use crate::index::AssignmentIndex;

/// One grid cell, identified the way the grid draws it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SwapCell {
    pub location: String,
    pub date: NaiveDate,
    pub slot: TimeRange,
    #[serde(default)]
    pub pharmacist_id: Option<Uuid>,
}

impl SwapCell {
    /// Same location, date and slot, whoever occupies it.
    pub fn same_cell(&self, other: &SwapCell) -> bool {
        self.location == other.location && self.date == other.date && self.slot == other.slot
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum SwapState {
    #[default]
    Idle,
    Armed { source: SwapCell },
    Targeted { source: SwapCell, target: SwapCell },
    Committing { source: SwapCell, target: SwapCell },
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "outcome", rename_all = "camelCase")]
pub enum SwapOutcome {
    Swapped,
    /// The drop was not a valid swap gesture; nothing changed.
    Ignored,
    /// Nothing was written.
    Aborted { reason: String },
    /// A remote write failed and the local copy was restored.
    #[serde(rename_all = "camelCase")]
    RolledBack {
        error: String,
        partially_applied: bool,
    },
}

#[derive(Debug, Default)]
pub struct SwapProtocol {
    state: SwapState,
}

struct Located {
    rota_id: Uuid,
    index: usize,
    pharmacist_id: Uuid,
}

impl SwapProtocol {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn state(&self) -> &SwapState {
        &self.state
    }

    /// Starts a drag from `source`. Empty cells cannot be dragged.
    pub fn arm(&mut self, source: SwapCell) -> RotaResult<()> {
        if source.pharmacist_id.is_none() {
            return Err(RotaError::Validation(
                "Only an occupied cell can be dragged".to_string(),
            ));
        }
        if matches!(self.state, SwapState::Committing { .. }) {
            return Err(RotaError::Conflict("A swap is already in progress".to_string()));
        }
        debug!("Armed swap from {} on {} {}", source.location, source.date, source.slot);
        self.state = SwapState::Armed { source };
        Ok(())
    }

    /// Moves the drag over `target`. Only an occupied cell other than the
    /// source's own cell is a drop target.
    pub fn hover(&mut self, target: SwapCell) {
        let source = match &self.state {
            SwapState::Armed { source } | SwapState::Targeted { source, .. } => source.clone(),
            _ => return,
        };
        self.state = if target.pharmacist_id.is_some() && !target.same_cell(&source) {
            SwapState::Targeted { source, target }
        } else {
            SwapState::Armed { source }
        };
    }

    /// The drag left the current target.
    pub fn leave(&mut self) {
        if let SwapState::Targeted { source, .. } = &self.state {
            self.state = SwapState::Armed {
                source: source.clone(),
            };
        }
    }

    pub fn cancel(&mut self) {
        if !matches!(self.state, SwapState::Committing { .. }) {
            self.state = SwapState::Idle;
        }
    }

    /// Completes the gesture on the hovered target.
    ///
    /// Always returns to `Idle`. On success the caller should refresh from
    /// remote so the index reflects stored state.
    pub async fn drop_on<S: RotaService + ?Sized>(
        &mut self,
        index: &mut AssignmentIndex,
        service: &S,
    ) -> SwapOutcome {
        let (source, target) = match std::mem::take(&mut self.state) {
            SwapState::Targeted { source, target } => (source, target),
            _ => return SwapOutcome::Ignored,
        };
        self.state = SwapState::Committing {
            source: source.clone(),
            target: target.clone(),
        };

        let outcome = commit(index, service, &source, &target).await;
        self.state = SwapState::Idle;
        outcome
    }
}

fn locate(index: &AssignmentIndex, cell: &SwapCell) -> Option<Located> {
    let pharmacist_id = cell.pharmacist_id?;
    let (rota_id, position) = index.locate(pharmacist_id, &cell.location, cell.date, &cell.slot)?;
    Some(Located {
        rota_id,
        index: position,
        pharmacist_id,
    })
}

async fn commit<S: RotaService + ?Sized>(
    index: &mut AssignmentIndex,
    service: &S,
    source_cell: &SwapCell,
    target_cell: &SwapCell,
) -> SwapOutcome {
    if source_cell.same_cell(target_cell) {
        debug!("Swap within one cell on {} ignored", source_cell.location);
        return SwapOutcome::Ignored;
    }
    let (Some(source), Some(target)) = (locate(index, source_cell), locate(index, target_cell)) else {
        warn!(
            "Swap aborted: could not find the records behind {} and {}",
            source_cell.location, target_cell.location
        );
        return SwapOutcome::Aborted {
            reason: "Assignment not found".to_string(),
        };
    };
    if source.rota_id == target.rota_id && source.index == target.index {
        return SwapOutcome::Aborted {
            reason: "Source and target are the same assignment".to_string(),
        };
    }

    index.set_pharmacist(source.rota_id, source.index, target.pharmacist_id);
    index.set_pharmacist(target.rota_id, target.index, source.pharmacist_id);

    let revert = |index: &mut AssignmentIndex| {
        index.set_pharmacist(source.rota_id, source.index, source.pharmacist_id);
        index.set_pharmacist(target.rota_id, target.index, target.pharmacist_id);
    };

    let first = service
        .update_rota_assignment(
            source.rota_id,
            AssignmentSlot::At(source.index),
            Some(target.pharmacist_id),
            None,
        )
        .await;
    if let Err(err) = first {
        warn!("Swap failed on the source write; nothing was stored: {}", err);
        revert(index);
        return SwapOutcome::RolledBack {
            error: err.to_string(),
            partially_applied: false,
        };
    }

    let second = service
        .update_rota_assignment(
            target.rota_id,
            AssignmentSlot::At(target.index),
            Some(source.pharmacist_id),
            None,
        )
        .await;
    if let Err(err) = second {
        error!(
            "Swap failed on the target write after rota {} index {} was updated; needs reconciliation: {}",
            source.rota_id, source.index, err
        );
        revert(index);
        return SwapOutcome::RolledBack {
            error: err.to_string(),
            partially_applied: true,
        };
    }

    info!(
        "Swapped {} and {} between {} and {}",
        source.pharmacist_id, target.pharmacist_id, source_cell.location, target_cell.location
    );
    SwapOutcome::Swapped
}
