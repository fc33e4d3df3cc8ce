//! Drop Sheet engine facade
//!
//! Holds the injected configuration and exposes every calculation with the
//! calendar, lead times and dependency graph already applied. Stateless
//! otherwise; safe to share between callers.

use chrono::NaiveDate;

use crate::clock::Clock;
use crate::config::EngineConfig;
use crate::date_utils::{self, parse_date};
use crate::deadlines;
use crate::error::Result;
use crate::health;
use crate::milestones;
use crate::types::{
    Campaign, CampaignSummary, DeadlineChain, FirstValidDates, MilestoneKey, Milestones,
    ScheduleHealth, StepView,
};

#[derive(Clone, Debug, Default)]
pub struct DropSheetEngine {
    config: EngineConfig,
}

impl DropSheetEngine {
    pub fn new(config: EngineConfig) -> Self {
        Self { config }
    }

    pub fn from_json(config_json: &str) -> Result<Self> {
        Ok(Self::new(EngineConfig::from_json(config_json)?))
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    // === Dates ===

    pub fn is_holiday(&self, date: &NaiveDate) -> bool {
        date_utils::is_holiday(date, &self.config.holidays)
    }

    pub fn subtract_business_days(&self, date: NaiveDate, days: u32) -> NaiveDate {
        date_utils::subtract_business_days(date, days, &self.config.holidays)
    }

    pub fn calculate_milestone_dates(
        &self,
        in_home_date_str: &str,
        mail_type: &str,
    ) -> DeadlineChain {
        deadlines::calculate_milestone_dates(
            in_home_date_str,
            mail_type,
            &self.config.holidays,
            &self.config.lead_times,
        )
    }

    pub fn calculate_dates_from_first_valid(
        &self,
        first_valid_date_str: &str,
        mail_type: &str,
    ) -> Option<FirstValidDates> {
        deadlines::calculate_dates_from_first_valid(
            first_valid_date_str,
            mail_type,
            &self.config.holidays,
            &self.config.lead_times,
        )
    }

    // === Milestones ===

    pub fn is_step_enabled(&self, milestones: &Milestones, step: MilestoneKey) -> bool {
        milestones::is_step_enabled(milestones, step, &self.config.dependencies)
    }

    pub fn toggle_milestone<C: Clock + ?Sized>(
        &self,
        milestones: &Milestones,
        step: MilestoneKey,
        clock: &C,
    ) -> Result<Milestones> {
        milestones::toggle_milestone(milestones, step, &self.config.dependencies, clock)
    }

    pub fn compute_schedule_health(
        &self,
        milestones: &Milestones,
        chain: &DeadlineChain,
        vendor_mail_date_str: Option<&str>,
        today: NaiveDate,
    ) -> ScheduleHealth {
        health::compute_schedule_health(milestones, chain, vendor_mail_date_str, today)
    }

    // === Campaign rows ===

    /// In-home date the campaign's deadlines hang off: the explicit one if it
    /// parses, otherwise the one derived from the first valid date.
    pub fn effective_in_home_date(&self, campaign: &Campaign) -> Option<NaiveDate> {
        campaign
            .in_home_date
            .as_deref()
            .and_then(parse_date)
            .or_else(|| {
                campaign
                    .first_valid_date
                    .as_deref()
                    .and_then(|fv| self.calculate_dates_from_first_valid(fv, &campaign.mail_type))
                    .map(|dates| dates.in_home_date)
            })
    }

    /// Build the drop sheet row for one campaign
    pub fn summarize(&self, campaign: &Campaign, today: NaiveDate) -> CampaignSummary {
        let in_home_date = self.effective_in_home_date(campaign);
        let dates = match in_home_date {
            Some(in_home) => deadlines::chain_from_in_home(
                in_home,
                deadlines::MailTypeClass::classify(&campaign.mail_type),
                &self.config.holidays,
                &self.config.lead_times,
            ),
            None => DeadlineChain::default(),
        };

        let milestones = &campaign.milestones;
        let vendor_mail = campaign.vendor_mail_date.as_deref();
        let lag_days = health::late_by_days(&dates, vendor_mail);

        let steps = MilestoneKey::ACTIVE
            .iter()
            .map(|&key| {
                let status = milestones.status(key);
                StepView {
                    key,
                    label: key.label().to_string(),
                    state: status.tag(),
                    completed_at: status.completed_at(),
                    enabled: self.is_step_enabled(milestones, key),
                }
            })
            .collect();

        CampaignSummary {
            id: campaign.id.clone(),
            in_home_date,
            dates,
            health: self.compute_schedule_health(milestones, &dates, vendor_mail, today),
            is_late: lag_days.is_some(),
            lag_days,
            is_behind_schedule: health::is_behind_schedule(
                milestones,
                dates.behind_schedule_deadline(),
                today,
            ),
            steps,
            completed_count: milestones.completed_count(&MilestoneKey::ACTIVE),
            total_steps: MilestoneKey::ACTIVE.len(),
        }
    }
}
