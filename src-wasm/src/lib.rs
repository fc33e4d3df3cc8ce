//! Drop Sheet - WASM Engine
//!
//! Exposes the deadline and milestone engine to the web UI as a `DropSheet`
//! class. The UI owns persistence; every mutating call returns the new state
//! so it can be written back.
//!
//! ## Usage from JavaScript
//!
//! ```javascript
//! import init, { DropSheet } from 'drop_sheet_wasm';
//!
//! await init();
//! const sheet = DropSheet.withConfig({ holidays: ['2026-01-01'] });
//! const dates = sheet.calculateMilestoneDates('2026-01-15', 'Core/Newsletter');
//! const { milestones, rejected } = sheet.toggleMilestone(campaign.milestones, 'data_approved');
//! ```

mod utils;

use chrono::NaiveDate;
use drop_sheet_engine::date_utils::{get_lag_days, parse_date};
use drop_sheet_engine::{
    Campaign, CampaignBoard, Clock, DeadlineChain, DropSheetEngine, EngineConfig, EngineError,
    MilestoneKey, Milestones,
};
use serde::Serialize;
use wasm_bindgen::prelude::*;

use crate::utils::{to_js, BrowserClock};

// Import console.log for debugging
#[wasm_bindgen]
extern "C" {
    #[wasm_bindgen(js_namespace = console)]
    pub fn log(s: &str);
}

/// Log macro for console output
#[macro_export]
macro_rules! console_log {
    ($($t:tt)*) => (crate::log(&format_args!($($t)*).to_string()))
}

fn js_err(e: EngineError) -> JsValue {
    JsValue::from_str(&e.to_string())
}

fn parse_step(step: &str) -> Result<MilestoneKey, JsValue> {
    step.parse::<MilestoneKey>().map_err(js_err)
}

fn milestones_from_js(milestones_val: JsValue) -> Result<Milestones, JsValue> {
    if milestones_val.is_undefined() || milestones_val.is_null() {
        return Ok(Milestones::new());
    }
    serde_wasm_bindgen::from_value(milestones_val)
        .map_err(|e| JsValue::from_str(&format!("Failed to deserialize milestones: {}", e)))
}

/// Result of a toggle: the map to persist, plus the blocking message when the
/// toggle was rejected (in which case `milestones` is the unchanged input).
#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct ToggleResponse {
    milestones: Milestones,
    rejected: Option<String>,
}

impl ToggleResponse {
    fn from_result(
        previous: Milestones,
        result: Result<Milestones, EngineError>,
    ) -> Result<Self, JsValue> {
        match result {
            Ok(milestones) => Ok(Self {
                milestones,
                rejected: None,
            }),
            Err(e @ EngineError::DependencyNotMet { .. }) => {
                console_log!("[WASM] Toggle rejected: {}", e);
                Ok(Self {
                    milestones: previous,
                    rejected: Some(e.to_string()),
                })
            }
            Err(e) => Err(js_err(e)),
        }
    }
}

/// The drop sheet engine exposed to JavaScript
///
/// Holds the engine configuration and the in-memory campaign board.
#[wasm_bindgen]
pub struct DropSheet {
    engine: DropSheetEngine,
    board: CampaignBoard,
}

#[wasm_bindgen]
impl DropSheet {
    /// Create an engine with the built-in postal holiday calendar
    #[wasm_bindgen(constructor)]
    pub fn new() -> DropSheet {
        utils::set_panic_hook();
        DropSheet {
            engine: DropSheetEngine::default(),
            board: CampaignBoard::new(),
        }
    }

    /// Create an engine from a config object (`holidays`, `leadTimes`, `dependencies`)
    #[wasm_bindgen(js_name = withConfig)]
    pub fn with_config(config_val: JsValue) -> Result<DropSheet, JsValue> {
        utils::set_panic_hook();
        let config: EngineConfig = serde_wasm_bindgen::from_value(config_val)
            .map_err(|e| JsValue::from_str(&format!("Failed to deserialize config: {}", e)))?;

        console_log!("[WASM] DropSheet configured with {} holidays", config.holidays.len());
        Ok(DropSheet {
            engine: DropSheetEngine::new(config),
            board: CampaignBoard::new(),
        })
    }

    // === Dates ===

    /// `{ mailDropDate, artDueDate, artSubmissionDueDate }`, each a date string or null
    #[wasm_bindgen(js_name = calculateMilestoneDates)]
    pub fn calculate_milestone_dates(
        &self,
        in_home_date: &str,
        mail_type: &str,
    ) -> Result<JsValue, JsValue> {
        to_js(&self.engine.calculate_milestone_dates(in_home_date, mail_type))
    }

    /// `{ inHomeDate, ...chain }` or null
    #[wasm_bindgen(js_name = calculateDatesFromFirstValid)]
    pub fn calculate_dates_from_first_valid(
        &self,
        first_valid_date: &str,
        mail_type: &str,
    ) -> Result<JsValue, JsValue> {
        to_js(&self.engine.calculate_dates_from_first_valid(first_valid_date, mail_type))
    }

    /// Signed calendar days `actual` follows `target`; undefined if either is not a date
    #[wasm_bindgen(js_name = getLagDays)]
    pub fn get_lag_days(&self, target_date: &str, actual_date: &str) -> Option<i32> {
        let target = parse_date(target_date)?;
        let actual = parse_date(actual_date)?;
        i32::try_from(get_lag_days(target, actual)).ok()
    }

    // === Milestones ===

    #[wasm_bindgen(js_name = isStepEnabled)]
    pub fn is_step_enabled(&self, milestones_val: JsValue, step: &str) -> Result<bool, JsValue> {
        let milestones = milestones_from_js(milestones_val)?;
        Ok(self.engine.is_step_enabled(&milestones, parse_step(step)?))
    }

    /// Returns `{ milestones, rejected }`
    #[wasm_bindgen(js_name = toggleMilestone)]
    pub fn toggle_milestone(
        &self,
        milestones_val: JsValue,
        step: &str,
    ) -> Result<JsValue, JsValue> {
        let milestones = milestones_from_js(milestones_val)?;
        let step = parse_step(step)?;
        let result = self.engine.toggle_milestone(&milestones, step, &BrowserClock);
        to_js(&ToggleResponse::from_result(milestones, result)?)
    }

    /// `{ status, lagDays? }` for a milestone map and a chain from `calculateMilestoneDates`
    #[wasm_bindgen(js_name = scheduleHealth)]
    pub fn schedule_health(
        &self,
        milestones_val: JsValue,
        chain_val: JsValue,
        vendor_mail_date: Option<String>,
    ) -> Result<JsValue, JsValue> {
        let milestones = milestones_from_js(milestones_val)?;
        let chain: DeadlineChain = serde_wasm_bindgen::from_value(chain_val)
            .map_err(|e| JsValue::from_str(&format!("Failed to deserialize dates: {}", e)))?;

        let health = self.engine.compute_schedule_health(
            &milestones,
            &chain,
            vendor_mail_date.as_deref(),
            BrowserClock.today(),
        );
        to_js(&health)
    }

    // === Campaign board ===

    /// Replace all campaigns (bulk load from the API)
    #[wasm_bindgen(js_name = loadCampaigns)]
    pub fn load_campaigns(&mut self, campaigns_val: JsValue) -> Result<(), JsValue> {
        let campaigns: Vec<Campaign> = serde_wasm_bindgen::from_value(campaigns_val)
            .map_err(|e| JsValue::from_str(&format!("Failed to deserialize campaigns: {}", e)))?;

        self.board.load_campaigns(campaigns);
        console_log!("[WASM] Loaded {} campaigns", self.board.len());
        Ok(())
    }

    #[wasm_bindgen(js_name = addCampaign)]
    pub fn add_campaign(&mut self, campaign_val: JsValue) -> Result<(), JsValue> {
        let campaign: Campaign = serde_wasm_bindgen::from_value(campaign_val)
            .map_err(|e| JsValue::from_str(&format!("Failed to deserialize campaign: {}", e)))?;

        self.board.add_campaign(campaign);
        Ok(())
    }

    /// Apply a partial update object to one campaign
    #[wasm_bindgen(js_name = updateCampaign)]
    pub fn update_campaign(&mut self, id: &str, updates_val: JsValue) -> Result<(), JsValue> {
        let updates: serde_json::Value = serde_wasm_bindgen::from_value(updates_val)
            .map_err(|e| JsValue::from_str(&format!("Failed to deserialize updates: {}", e)))?;

        self.board.update_campaign(id, updates).map_err(js_err)
    }

    #[wasm_bindgen(js_name = deleteCampaign)]
    pub fn delete_campaign(&mut self, id: &str) -> Result<(), JsValue> {
        self.board.delete_campaign(id).map_err(js_err)
    }

    /// Toggle a stored campaign's milestone. Returns `{ milestones, rejected }`.
    #[wasm_bindgen(js_name = toggleCampaignMilestone)]
    pub fn toggle_campaign_milestone(&mut self, id: &str, step: &str) -> Result<JsValue, JsValue> {
        let step = parse_step(step)?;
        let previous = self
            .board
            .get(id)
            .map(|c| c.milestones.clone())
            .ok_or_else(|| js_err(EngineError::CampaignNotFound(id.to_string())))?;

        let result = self.board.toggle_milestone(id, step, &self.engine, &BrowserClock);
        to_js(&ToggleResponse::from_result(previous, result)?)
    }

    /// Drop sheet rows for every stored campaign, as of today in the browser
    pub fn summaries(&self) -> Result<JsValue, JsValue> {
        to_js(&self.board.summaries(&self.engine, BrowserClock.today()))
    }

    /// Rows as of a given "YYYY-MM-DD" date
    #[wasm_bindgen(js_name = summariesAsOf)]
    pub fn summaries_as_of(&self, today: &str) -> Result<JsValue, JsValue> {
        let today: NaiveDate = parse_date(today)
            .ok_or_else(|| JsValue::from_str(&format!("Invalid date: {}", today)))?;
        to_js(&self.board.summaries(&self.engine, today))
    }

    #[wasm_bindgen(js_name = campaignCount)]
    pub fn campaign_count(&self) -> usize {
        self.board.len()
    }

    /// Dispose and free resources
    pub fn dispose(&mut self) {
        self.board.clear();
        console_log!("[WASM] DropSheet disposed");
    }
}

impl Default for DropSheet {
    fn default() -> Self {
        Self::new()
    }
}

/// Module initialization - called when WASM module is loaded
#[wasm_bindgen(start)]
pub fn main() {
    utils::set_panic_hook();
}
