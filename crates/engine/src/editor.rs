//! Orchestrates one editing session against a remote rota service.
//!
//! Every write path ends with a full refresh, so the index always reflects
//! what the remote side actually stored.

use std::{collections::HashSet, sync::Arc};

use chrono::NaiveDate;
use rota_core::{
    errors::RotaResult,
    models::{
        pharmacist::Pharmacist,
        rota::{Rota, RotaStatus},
        time_slot::TimeRange,
    },
    service::RotaService,
};
use serde::Serialize;
use tracing::{debug, warn};
use uuid::Uuid;

use crate::{
    conflict::{Conflict, ConflictDetector},
    deselection::DeselectionResolver,
    edit::{CellEdit, EditPlanner, PlanWarning},
    generation::{self, GenerationGuard},
    index::AssignmentIndex,
    publish::{self, PublishOutcome},
    sequencer::{self, BatchReport},
    session::{Actor, EditSession},
    swap::{SwapCell, SwapOutcome, SwapProtocol},
};

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct EditReport {
    #[serde(flatten)]
    pub report: BatchReport,
    pub warnings: Vec<PlanWarning>,
}

pub struct RotaEditor<S: RotaService + ?Sized> {
    service: Arc<S>,
    session: EditSession,
    index: AssignmentIndex,
    pharmacists: Vec<Pharmacist>,
    swap: SwapProtocol,
    guard: GenerationGuard,
}

impl<S: RotaService + ?Sized> RotaEditor<S> {
    pub async fn load(
        service: Arc<S>,
        session: EditSession,
        guard: GenerationGuard,
    ) -> RotaResult<Self> {
        let pharmacists = service.list_pharmacists().await?;
        let index = AssignmentIndex::empty(session.week, session.view);
        let mut editor = Self {
            service,
            session,
            index,
            pharmacists,
            swap: SwapProtocol::new(),
            guard,
        };
        editor.refresh().await?;
        Ok(editor)
    }

    pub fn session(&self) -> &EditSession {
        &self.session
    }

    pub fn session_mut(&mut self) -> &mut EditSession {
        &mut self.session
    }

    pub fn index(&self) -> &AssignmentIndex {
        &self.index
    }

    pub fn pharmacists(&self) -> &[Pharmacist] {
        &self.pharmacists
    }

    /// Refetches every rota and rebuilds the index.
    ///
    /// When editing a published week the snapshot is re-synced from the
    /// remote copies of the same rotas.
    pub async fn refresh(&mut self) -> RotaResult<()> {
        let remote = self.remote_rotas().await?;

        if let Some(snapshot) = self.session.snapshot() {
            let ids: HashSet<Uuid> = snapshot.iter().map(|rota| rota.id).collect();
            let synced: Vec<Rota> = remote
                .iter()
                .filter(|rota| ids.contains(&rota.id))
                .cloned()
                .collect();
            if synced.is_empty() {
                warn!(
                    "Published rotas for week of {} are gone from the remote side; keeping the local snapshot",
                    self.session.week.start
                );
            } else {
                self.session.replace_snapshot(synced);
            }
        }

        self.index = AssignmentIndex::build(
            self.session.week,
            self.session.view,
            &remote,
            self.session.snapshot(),
        );
        Ok(())
    }

    async fn remote_rotas(&self) -> RotaResult<Vec<Rota>> {
        let mut rotas = self.service.list_rotas(RotaStatus::Draft).await?;
        rotas.extend(self.service.list_rotas(RotaStatus::Published).await?);
        Ok(rotas)
    }

    pub fn is_day_active(&self, date: NaiveDate) -> bool {
        DeselectionResolver::new(&self.session, &self.index).is_day_active(date)
    }

    pub fn active_dates(&self) -> Vec<NaiveDate> {
        DeselectionResolver::new(&self.session, &self.index).active_dates()
    }

    pub fn has_conflict(&self, pharmacist_id: Uuid, date: NaiveDate, slot: &TimeRange) -> bool {
        ConflictDetector::new(&self.index).has_conflict(pharmacist_id, date, slot)
    }

    pub fn week_conflicts(&self) -> Vec<Conflict> {
        ConflictDetector::new(&self.index).week_conflicts()
    }

    /// Plans and runs one cell edit, then re-syncs from remote whatever the
    /// outcome.
    pub async fn apply_edit(&mut self, edit: &CellEdit) -> RotaResult<EditReport> {
        let plan = EditPlanner::new(&self.session, &self.index, &self.pharmacists).plan(edit)?;
        let report = sequencer::execute(self.service.as_ref(), plan.batch).await;
        self.refresh().await?;

        debug!(
            "Edit of {} on {}: {} applied, complete: {}",
            edit.location,
            edit.date,
            report.applied.len(),
            report.is_complete()
        );
        Ok(EditReport {
            report,
            warnings: plan.warnings,
        })
    }

    pub fn arm_swap(&mut self, source: SwapCell) -> RotaResult<()> {
        self.swap.arm(source)
    }

    pub fn hover_swap(&mut self, target: SwapCell) {
        self.swap.hover(target);
    }

    pub fn leave_swap(&mut self) {
        self.swap.leave();
    }

    pub fn cancel_swap(&mut self) {
        self.swap.cancel();
    }

    pub async fn drop_swap(&mut self) -> RotaResult<SwapOutcome> {
        let outcome = self
            .swap
            .drop_on(&mut self.index, self.service.as_ref())
            .await;
        if matches!(
            outcome,
            SwapOutcome::Swapped | SwapOutcome::RolledBack { .. }
        ) {
            self.refresh().await?;
        }
        Ok(outcome)
    }

    /// Publishes the newest draft of every date in the session's week.
    pub async fn publish(&mut self, actor: &Actor) -> RotaResult<PublishOutcome> {
        let remote = self.remote_rotas().await?;
        let drafts = AssignmentIndex::build(self.session.week, RotaStatus::Draft, &remote, None);
        let outcome = publish::publish(
            self.service.as_ref(),
            &drafts.rota_ids(),
            &self.session.free_cell_text,
            actor,
            self.session.week,
        )
        .await?;
        self.refresh().await?;
        Ok(outcome)
    }

    pub async fn generate(&mut self, regenerate: bool) -> RotaResult<Vec<Uuid>> {
        let ids = generation::generate(
            &self.guard,
            self.service.as_ref(),
            &self.session,
            &self.pharmacists,
            regenerate,
        )
        .await?;
        self.refresh().await?;
        Ok(ids)
    }
}
