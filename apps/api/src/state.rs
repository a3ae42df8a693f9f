use std::sync::Arc;

use anyhow::{Context, Result};
use serde_json::Value;
use tokio::sync::RwLock;
use tracing::info;

use crate::errors::AppError;
use crate::layout::{
    default_floor_plan, FloorPlan, TeamArea, MAP_SETTING_KEY, TEAM_AREA_SETTING_KEY,
};
use crate::settings::store::{SettingInput, SettingsStore};
use crate::teams::binding::SeatBinder;

/// Shared application state injected into all route handlers via Axum extractors.
///
/// The floor plan and team area are the parsed forms of the `"map"` and
/// `"teamarea"` settings; every mutation writes back to the settings store.
/// Lock order is always plan → team area → settings.
#[derive(Clone)]
pub struct AppState {
    pub settings: Arc<RwLock<SettingsStore>>,
    pub plan: Arc<RwLock<FloorPlan>>,
    /// Single owner of the running team-label maximum; all registrations go through here.
    pub team_area: Arc<RwLock<TeamArea>>,
    /// Pluggable team-to-seat binding strategy, picked from config at startup.
    pub binder: Arc<dyn SeatBinder>,
}

impl AppState {
    /// Builds state from seed settings. A seeded `"map"` or `"teamarea"`
    /// must parse; when absent the defaults are used and written back.
    pub fn new(seeds: Vec<SettingInput>, binder: Arc<dyn SeatBinder>) -> Result<Self> {
        let mut settings = SettingsStore::new();
        settings.set_multiple(seeds);

        let plan = match settings.get(MAP_SETTING_KEY) {
            Some(setting) => serde_json::from_value::<FloorPlan>(setting.value.clone())
                .context("Seed setting 'map' is not a valid floor plan")?,
            None => default_floor_plan(),
        };
        let team_area = match settings.get(TEAM_AREA_SETTING_KEY) {
            Some(setting) => serde_json::from_value::<TeamArea>(setting.value.clone())
                .context("Seed setting 'teamarea' is not a valid team area")?,
            None => TeamArea::default(),
        };

        settings.set(MAP_SETTING_KEY, serde_json::to_value(&plan)?);
        settings.set(TEAM_AREA_SETTING_KEY, serde_json::to_value(&team_area)?);

        info!(
            rooms = plan.rooms().len(),
            placements = plan.placements().len(),
            seats = plan.seat_count(),
            "Floor plan loaded"
        );

        Ok(AppState {
            settings: Arc::new(RwLock::new(settings)),
            plan: Arc::new(RwLock::new(plan)),
            team_area: Arc::new(RwLock::new(team_area)),
            binder,
        })
    }

    /// Writes the current floor plan back to the `"map"` setting.
    pub async fn persist_plan(&self, plan: &FloorPlan) -> Result<(), AppError> {
        let value = serde_json::to_value(plan).context("Failed to serialize floor plan")?;
        self.settings.write().await.set(MAP_SETTING_KEY, value);
        Ok(())
    }

    pub async fn persist_team_area(&self, area: &TeamArea) -> Result<(), AppError> {
        let value = serde_json::to_value(area).context("Failed to serialize team area")?;
        self.settings.write().await.set(TEAM_AREA_SETTING_KEY, value);
        Ok(())
    }

    /// Upserts a setting. The `"map"` and `"teamarea"` keys are parsed first
    /// and replace the live floor plan / team area parameters.
    pub async fn apply_setting(&self, key: &str, value: Value) -> Result<(), AppError> {
        match key {
            MAP_SETTING_KEY => {
                let parsed: FloorPlan = serde_json::from_value(value)
                    .map_err(|e| AppError::Validation(format!("Invalid floor plan: {e}")))?;
                let mut plan = self.plan.write().await;
                *plan = parsed;
                self.persist_plan(&plan).await?;
                info!(placements = plan.placements().len(), "Floor plan replaced");
            }
            TEAM_AREA_SETTING_KEY => {
                let parsed: TeamArea = serde_json::from_value(value)
                    .map_err(|e| AppError::Validation(format!("Invalid team area: {e}")))?;
                let mut area = self.team_area.write().await;
                area.update_parameters(parsed);
                self.persist_team_area(&area).await?;
            }
            _ => {
                self.settings.write().await.set(key, value);
            }
        }
        Ok(())
    }
}
