//! Thermostat service implementation.

use std::sync::Arc;

use tracing::instrument;

use super::{
    GetThermostatsDataRequest, GetThermostatsDataResponse, SetMinorModeRequest, SetModeResponse,
    SetSystemModeRequest,
};
use crate::client::RequestPipeline;
use crate::errors::NetatmoResult;
use crate::time::Clock;
use crate::types::Device;

const GET_THERMOSTATS_DATA_PATH: &str = "api/getthermostatsdata";
const SET_SYSTEM_MODE_PATH: &str = "api/setsystemmode";
const SET_MINOR_MODE_PATH: &str = "api/setminormode";

/// Thermostat data and mode operations.
#[derive(Clone)]
pub struct ThermostatService {
    pipeline: Arc<RequestPipeline>,
    clock: Arc<dyn Clock>,
}

impl ThermostatService {
    pub(crate) fn new(pipeline: Arc<RequestPipeline>, clock: Arc<dyn Clock>) -> Self {
        Self { pipeline, clock }
    }

    /// Fetch every station and its modules.
    #[instrument(skip(self, request))]
    pub async fn get_thermostats_data(
        &self,
        request: GetThermostatsDataRequest,
    ) -> NetatmoResult<Vec<Device>> {
        let response: GetThermostatsDataResponse = self
            .pipeline
            .execute(GET_THERMOSTATS_DATA_PATH, request.to_fields())
            .await?;

        Ok(response.body.devices)
    }

    /// Switch the system mode (winter, summer, frostguard).
    #[instrument(
        skip(self, request),
        fields(device_id = %request.device_id, system_mode = %request.system_mode)
    )]
    pub async fn set_system_mode(&self, request: SetSystemModeRequest) -> NetatmoResult<()> {
        request.validate()?;

        let _: SetModeResponse = self
            .pipeline
            .execute(SET_SYSTEM_MODE_PATH, request.to_fields())
            .await?;

        Ok(())
    }

    /// Activate or deactivate a minor mode (manual, away, hot water boost).
    ///
    /// Field combinations are validated against the vendor's rules before
    /// anything goes on the wire; see [`SetMinorModeRequest`].
    #[instrument(
        skip(self, request),
        fields(
            device_id = %request.device_id,
            setpoint_mode = %request.setpoint_mode,
            activate = request.activate
        )
    )]
    pub async fn set_minor_mode(&self, request: SetMinorModeRequest) -> NetatmoResult<()> {
        request.validate(self.clock.now())?;

        let _: SetModeResponse = self
            .pipeline
            .execute(SET_MINOR_MODE_PATH, request.to_fields())
            .await?;

        Ok(())
    }
}
