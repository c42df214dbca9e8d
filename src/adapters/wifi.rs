//! WiFi station bring-up.
//!
//! One blocking association attempt at boot. Failure is non-fatal: the
//! controller runs offline and door events born while disconnected are
//! dropped by the control loop's connectivity gate.
//!
//! ESP-IDF only; host targets have no network adapter (tests drive the
//! telemetry port with mocks instead).

#[cfg(target_os = "espidf")]
pub use espidf_impl::connect_station;

#[cfg(target_os = "espidf")]
mod espidf_impl {
    use anyhow::{Context, anyhow};
    use esp_idf_hal::modem::Modem;
    use esp_idf_svc::eventloop::EspSystemEventLoop;
    use esp_idf_svc::nvs::EspDefaultNvsPartition;
    use esp_idf_svc::wifi::{BlockingWifi, ClientConfiguration, Configuration, EspWifi};
    use log::info;

    /// Associate with `ssid` and wait for the interface to come up.
    /// Blocks for the duration of DHCP; returns the held driver.
    pub fn connect_station(
        modem: Modem,
        ssid: &str,
        password: &str,
    ) -> anyhow::Result<BlockingWifi<EspWifi<'static>>> {
        let sys_loop = EspSystemEventLoop::take().context("event loop")?;
        let nvs = EspDefaultNvsPartition::take().context("NVS partition")?;

        let mut wifi = BlockingWifi::wrap(
            EspWifi::new(modem, sys_loop.clone(), Some(nvs)).context("wifi driver")?,
            sys_loop,
        )
        .context("blocking wifi")?;

        wifi.set_configuration(&Configuration::Client(ClientConfiguration {
            ssid: ssid
                .try_into()
                .map_err(|()| anyhow!("SSID too long (max 32 bytes)"))?,
            password: password
                .try_into()
                .map_err(|()| anyhow!("password too long (max 64 bytes)"))?,
            ..Default::default()
        }))?;

        wifi.start()?;
        wifi.connect()?;
        wifi.wait_netif_up()?;

        info!("WIFI | associated with '{ssid}', interface up");
        Ok(wifi)
    }
}
