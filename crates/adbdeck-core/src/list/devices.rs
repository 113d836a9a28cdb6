use std::fmt;

use adbdeck_api::{AdbClient, DeviceInfo, RebootMode};

use super::ListController;
use crate::client::DeviceClient;
use crate::error::CoreError;
use crate::model::{Device, DeviceMode};
use crate::refresh::RecordSource;

/// Device views have no bulk operations.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum NoBatch {}

impl fmt::Display for NoBatch {
    fn fmt(&self, _: &mut fmt::Formatter<'_>) -> fmt::Result {
        match *self {}
    }
}

/// Enumerates devices through adb or fastboot.
#[derive(Debug, Clone)]
pub struct DeviceSource<C = AdbClient> {
    client: C,
    mode: DeviceMode,
}

impl<C: DeviceClient> DeviceSource<C> {
    pub fn adb(client: C) -> Self {
        Self {
            client,
            mode: DeviceMode::Adb,
        }
    }

    pub fn fastboot(client: C) -> Self {
        Self {
            client,
            mode: DeviceMode::Fastboot,
        }
    }

    pub fn mode(&self) -> DeviceMode {
        self.mode
    }

    pub fn client(&self) -> &C {
        &self.client
    }
}

impl<C: DeviceClient> RecordSource for DeviceSource<C> {
    type Record = Device;

    fn label(&self) -> &'static str {
        match self.mode {
            DeviceMode::Adb => "devices",
            DeviceMode::Fastboot => "fastboot devices",
        }
    }

    async fn enumerate(&self) -> Result<Vec<Device>, CoreError> {
        let entries = match self.mode {
            DeviceMode::Adb => self.client.devices().await?,
            DeviceMode::Fastboot => self.client.fastboot_devices().await?,
        };
        Ok(entries
            .into_iter()
            .map(|e| Device::from_entry(e, self.mode))
            .collect())
    }
}

pub type DevicesView<C = AdbClient> = ListController<DeviceSource<C>, NoBatch>;

impl<C: DeviceClient> ListController<DeviceSource<C>, NoBatch> {
    /// Resolve the device an action targets: `serial` when given, else the
    /// only ready device. The device must be in the current snapshot and
    /// ready.
    pub fn target(&self, serial: Option<&str>) -> Result<Device, CoreError> {
        let records = self.records();
        let device = match serial {
            Some(serial) => records.iter().find(|d| d.serial == serial).ok_or_else(|| {
                CoreError::InvalidInput {
                    message: format!("no device with serial {serial}"),
                }
            })?,
            None => {
                let mut ready = records.iter().filter(|d| d.state.is_ready());
                match (ready.next(), ready.next()) {
                    (Some(device), None) => device,
                    (None, _) => {
                        return Err(CoreError::DeviceUnavailable {
                            message: "no ready device connected".into(),
                        });
                    }
                    (Some(_), Some(_)) => {
                        return Err(CoreError::InvalidInput {
                            message: "more than one device connected; pass a serial".into(),
                        });
                    }
                }
            }
        };
        if !device.state.is_ready() {
            return Err(CoreError::DeviceUnavailable {
                message: format!("{} is {}", device.serial, device.state),
            });
        }
        Ok(device.clone())
    }

    /// Build and hardware summary. Only adb devices can report one.
    pub async fn device_info(&self, serial: Option<&str>) -> Result<DeviceInfo, CoreError> {
        if self.source().mode() == DeviceMode::Fastboot {
            return Err(self.reject("device info", "device info needs an adb connection"));
        }
        let device = self.target(serial).map_err(|e| self.rejected("device info", e))?;
        self.source()
            .client()
            .device_info(&device.serial)
            .await
            .map_err(|e| self.rejected("device info", CoreError::from(e).during("device info")))
    }

    /// Reboot one device into `mode` through whichever tool this view
    /// lists devices with.
    pub async fn reboot(&self, serial: Option<&str>, mode: RebootMode) -> Result<String, CoreError> {
        let device = self.target(serial).map_err(|e| self.rejected("reboot", e))?;
        let client = self.source().client();
        let serial = device.serial.as_str();
        match self.source().mode() {
            DeviceMode::Adb => {
                self.run_operation("reboot", async { client.reboot(serial, mode).await.map_err(CoreError::from) })
                    .await
            }
            DeviceMode::Fastboot => {
                self.run_operation("reboot", async {
                    client.fastboot_reboot(serial, mode).await.map_err(CoreError::from)
                })
                .await
            }
        }
    }
}
