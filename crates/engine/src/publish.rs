//! Freezing a draft week into a published snapshot.
//!
//! Free-text overrides are split by the date inside each key and stored on
//! that date's draft rota before the single remote publish call copies the
//! whole week.

use std::collections::BTreeMap;

use chrono::NaiveDate;
use rota_core::{
    errors::RotaResult,
    free_cell::FreeCellKey,
    models::time_slot::Week,
    service::RotaService,
};
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};
use uuid::Uuid;

use crate::session::Actor;

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PublishOutcome {
    pub published_rota_ids: Vec<Uuid>,
    /// Override keys that could not be attached to any rota of the week.
    pub discarded_keys: Vec<String>,
}

/// Free-text entries grouped by the date embedded in their key.
#[derive(Debug, Default, PartialEq)]
pub struct Partition {
    pub by_date: BTreeMap<NaiveDate, BTreeMap<String, String>>,
    pub unparseable: Vec<String>,
}

pub fn partition_free_cell_text(free_cell_text: &BTreeMap<String, String>) -> Partition {
    let mut partition = Partition::default();
    for (key, text) in free_cell_text {
        match FreeCellKey::parse(key) {
            Ok(parsed) => {
                partition
                    .by_date
                    .entry(parsed.date())
                    .or_default()
                    .insert(key.clone(), text.clone());
            }
            Err(err) => {
                debug!("Skipping free cell key: {}", err);
                partition.unparseable.push(key.clone());
            }
        }
    }
    partition
}

/// Publishes the week made of `week_rotas` (draft rota id per date).
///
/// Every rota in the week gets its partition saved, including an empty one,
/// so stale text from earlier saves is cleared. An empty week publishes
/// nothing.
pub async fn publish<S: RotaService + ?Sized>(
    service: &S,
    week_rotas: &[(NaiveDate, Uuid)],
    free_cell_text: &BTreeMap<String, String>,
    actor: &Actor,
    week: Week,
) -> RotaResult<PublishOutcome> {
    let Some(&(_, seed)) = week_rotas.first() else {
        warn!("Nothing to publish for week of {}", week.start);
        return Ok(PublishOutcome::default());
    };

    let Partition {
        mut by_date,
        unparseable,
    } = partition_free_cell_text(free_cell_text);

    for &(date, rota_id) in week_rotas {
        let entries = by_date.remove(&date).unwrap_or_default();
        debug!("Saving {} free cell entries to rota {}", entries.len(), rota_id);
        service.save_free_cell_text(rota_id, entries).await?;
    }

    let mut discarded_keys = unparseable;
    for (date, entries) in by_date {
        warn!(
            "Discarding {} free cell entries for {}: no rota in week of {}",
            entries.len(),
            date,
            week.start
        );
        discarded_keys.extend(entries.into_keys());
    }

    let published_rota_ids = service.publish_rota(seed, &actor.name, week.start).await?;
    info!(
        "{} published week of {} ({} rotas)",
        actor.name,
        week.start,
        published_rota_ids.len()
    );

    Ok(PublishOutcome {
        published_rota_ids,
        discarded_keys,
    })
}
