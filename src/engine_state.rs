//! Campaign board state container
//!
//! In-memory campaign list backing the drop sheet view. The persistence layer
//! owns the real records; this mirrors them so rows can be recomputed and
//! toggles applied without a round trip. Writes are last-writer-wins.

use std::collections::HashMap;

use chrono::NaiveDate;
use tracing::{debug, info, warn};

use crate::clock::Clock;
use crate::engine::DropSheetEngine;
use crate::error::{EngineError, Result};
use crate::types::{Campaign, CampaignSummary, MilestoneKey, Milestones};

/// New value for an optional date field: a string sets it, null clears it.
/// Anything else is ignored and the stored date is kept.
fn date_update(key: &str, value: &serde_json::Value) -> Option<Option<String>> {
    match value {
        serde_json::Value::Null => Some(None),
        serde_json::Value::String(s) => Some(Some(s.clone())),
        other => {
            warn!(field = key, value = %other, "ignoring non-string date update");
            None
        }
    }
}

#[derive(Default, Debug)]
pub struct CampaignBoard {
    /// Campaigns indexed by ID for O(1) lookup
    campaigns: HashMap<String, Campaign>,

    /// Display order (load order, then insertion order)
    campaign_order: Vec<String>,
}

impl CampaignBoard {
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace the whole board.
    /// A repeated ID keeps the later record, at the later record's position.
    pub fn load_campaigns(&mut self, campaigns: Vec<Campaign>) {
        self.clear();
        for campaign in campaigns {
            let id = campaign.id.clone();
            if self.campaigns.insert(id.clone(), campaign).is_some() {
                warn!(campaign = %id, "duplicate campaign id, keeping the later record");
                self.campaign_order.retain(|c| c != &id);
            }
            self.campaign_order.push(id);
        }
        info!(count = self.campaigns.len(), "loaded campaigns");
    }

    /// Add a campaign, replacing any existing one with the same ID
    pub fn add_campaign(&mut self, campaign: Campaign) {
        let id = campaign.id.clone();
        self.campaigns.insert(id.clone(), campaign);
        if !self.campaign_order.contains(&id) {
            self.campaign_order.push(id);
        }
    }

    /// Apply a partial update from the UI.
    /// Unknown fields are ignored for forward compatibility.
    pub fn update_campaign(&mut self, id: &str, updates: serde_json::Value) -> Result<()> {
        let campaign = self
            .campaigns
            .get_mut(id)
            .ok_or_else(|| EngineError::CampaignNotFound(id.to_string()))?;

        let obj = updates
            .as_object()
            .ok_or_else(|| EngineError::InvalidUpdate("updates must be an object".to_string()))?;

        for (key, value) in obj {
            match key.as_str() {
                "name" => {
                    if let Some(v) = value.as_str() {
                        campaign.name = v.to_string();
                    }
                }
                "mailType" => {
                    if let Some(v) = value.as_str() {
                        campaign.mail_type = v.to_string();
                    }
                }
                "inHomeDate" => {
                    if let Some(v) = date_update(key, value) {
                        campaign.in_home_date = v;
                    }
                }
                "firstValidDate" => {
                    if let Some(v) = date_update(key, value) {
                        campaign.first_valid_date = v;
                    }
                }
                "vendorMailDate" => {
                    if let Some(v) = date_update(key, value) {
                        campaign.vendor_mail_date = v;
                    }
                }
                "notes" => {
                    if let Some(v) = value.as_str() {
                        campaign.notes = v.to_string();
                    }
                }
                "milestones" => {
                    if !value.is_object() && !value.is_null() {
                        return Err(EngineError::InvalidUpdate(
                            "milestones must be an object".to_string(),
                        ));
                    }
                    let milestones: Milestones = serde_json::from_value(value.clone())
                        .map_err(|e| EngineError::InvalidUpdate(format!("milestones: {}", e)))?;
                    campaign.milestones = milestones;
                }
                _ => {}
            }
        }

        debug!(campaign = id, "campaign updated");
        Ok(())
    }

    pub fn delete_campaign(&mut self, id: &str) -> Result<()> {
        if self.campaigns.remove(id).is_none() {
            return Err(EngineError::CampaignNotFound(id.to_string()));
        }
        self.campaign_order.retain(|c| c != id);
        Ok(())
    }

    /// Toggle one milestone of a stored campaign and return the new map.
    /// A rejected toggle leaves the stored campaign untouched.
    pub fn toggle_milestone<C: Clock + ?Sized>(
        &mut self,
        id: &str,
        step: MilestoneKey,
        engine: &DropSheetEngine,
        clock: &C,
    ) -> Result<Milestones> {
        let campaign = self
            .campaigns
            .get_mut(id)
            .ok_or_else(|| EngineError::CampaignNotFound(id.to_string()))?;

        let next = engine.toggle_milestone(&campaign.milestones, step, clock)?;
        campaign.milestones = next.clone();
        Ok(next)
    }

    pub fn get(&self, id: &str) -> Option<&Campaign> {
        self.campaigns.get(id)
    }

    pub fn campaigns_ordered(&self) -> Vec<Campaign> {
        self.campaign_order
            .iter()
            .filter_map(|id| self.campaigns.get(id).cloned())
            .collect()
    }

    /// Drop sheet rows in display order
    pub fn summaries(&self, engine: &DropSheetEngine, today: NaiveDate) -> Vec<CampaignSummary> {
        self.campaign_order
            .iter()
            .filter_map(|id| self.campaigns.get(id))
            .map(|c| engine.summarize(c, today))
            .collect()
    }

    pub fn len(&self) -> usize {
        self.campaigns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.campaigns.is_empty()
    }

    pub fn clear(&mut self) {
        self.campaigns.clear();
        self.campaign_order.clear();
    }
}
