use tracing::info;

use crate::app::adb::parse::parse_adb_devices;
use crate::app::adb::runner::CommandRunner;
use crate::app::error::AppError;
use crate::app::models::DeviceSummary;

pub fn list_devices(runner: &dyn CommandRunner, trace_id: &str) -> Result<Vec<DeviceSummary>, AppError> {
    let args = vec!["devices".to_string(), "-l".to_string()];
    let output = runner.run(&args, trace_id)?;
    Ok(parse_adb_devices(&output.stdout))
}

/// Picks the device a run is bound to. A requested serial must be online; without one,
/// exactly one online device must be attached.
pub fn select_device(
    devices: &[DeviceSummary],
    requested: Option<&str>,
    trace_id: &str,
) -> Result<DeviceSummary, AppError> {
    let requested = requested.map(str::trim).filter(|serial| !serial.is_empty());
    if let Some(serial) = requested {
        return match devices.iter().find(|device| device.serial == serial) {
            Some(device) if device.is_online() => Ok(device.clone()),
            Some(device) => Err(AppError::no_device(
                format!("Device {serial} is {}", device.state),
                trace_id,
            )),
            None => Err(AppError::no_device(
                format!("Device {serial} is not connected"),
                trace_id,
            )),
        };
    }

    let online: Vec<&DeviceSummary> = devices.iter().filter(|device| device.is_online()).collect();
    match online.as_slice() {
        [] => {
            let others = devices
                .iter()
                .map(|device| format!("{} ({})", device.serial, device.state))
                .collect::<Vec<_>>();
            let detail = if others.is_empty() {
                String::new()
            } else {
                format!("; attached but unusable: {}", others.join(", "))
            };
            Err(AppError::no_device(
                format!("No online adb devices found{detail}"),
                trace_id,
            ))
        }
        [single] => Ok((*single).clone()),
        many => {
            let serials = many
                .iter()
                .map(|device| device.serial.as_str())
                .collect::<Vec<_>>()
                .join(", ");
            Err(AppError::validation(
                format!("Multiple online devices found ({serials}). Set ANDROID_SERIAL or pass --serial."),
                trace_id,
            ))
        }
    }
}

pub fn ensure_device_connected(
    runner: &dyn CommandRunner,
    requested: Option<&str>,
    trace_id: &str,
) -> Result<DeviceSummary, AppError> {
    let devices = list_devices(runner, trace_id)?;
    let device = select_device(&devices, requested, trace_id)?;
    info!(
        trace_id = %trace_id,
        serial = %device.serial,
        model = device.model.as_deref().unwrap_or("unknown"),
        "device connected"
    );
    Ok(device)
}
