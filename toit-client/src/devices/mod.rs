use std::io::Write;

use toit_shared::{api::ListDevicesRequest, model::Device};
use tracing::debug;

use crate::{error::Error, server::DeviceService};

/// Lists every device visible to the caller, in the order the API returns them.
///
/// `client` must already carry the caller's bearer token. A single page is assumed.
pub async fn list_devices<S>(client: &mut S) -> Result<Vec<Device>, Error>
where
    S: DeviceService + ?Sized,
{
    let response = client
        .list_devices(ListDevicesRequest {})
        .await?
        .ok_or(Error::MissingResponse("list devices"))?;

    debug!(count = response.devices.len(), "Listed devices");
    Ok(response.devices)
}

/// Writes one display name per line.
pub fn write_names<W: Write + ?Sized>(out: &mut W, devices: &[Device]) -> std::io::Result<()> {
    for device in devices {
        writeln!(out, "{}", device.display_name())?;
    }
    out.flush()
}
