//! List available audio input devices.

use crate::recording::alsa;
use anyhow::anyhow;
use cpal::traits::{DeviceTrait, HostTrait};

/// Lists all available audio input devices on the system.
///
/// Prints device IDs usable as the `device` value in storytime.toml.
///
/// # Errors
/// - If the audio host cannot be initialized
pub fn handle_list_devices() -> Result<(), anyhow::Error> {
    // Enumerate devices while ALSA warnings are silenced; skip any device
    // that fails to report a name.
    let (devices, default_name) = alsa::with_silenced_stderr(|| {
        let host = cpal::default_host();
        let devices: Vec<cpal::Device> = host
            .input_devices()
            .map_err(|e| anyhow!("Failed to enumerate audio devices: {e}"))?
            .filter(|d| d.name().is_ok())
            .collect();
        let default_name = host.default_input_device().and_then(|d| d.name().ok());
        Ok((devices, default_name))
    })?;

    if devices.is_empty() {
        println!("No audio input devices found on this system.");
        return Ok(());
    }

    println!();
    println!(" ✶ storytime ");
    println!();
    println!("Available audio input devices:");
    println!();

    for (index, device) in devices.iter().enumerate() {
        let name = device.name().unwrap_or_else(|_| "Unknown".to_string());

        let mut tags = Vec::new();
        if default_name.as_deref() == Some(name.as_str()) {
            tags.push("DEFAULT".to_string());
        }
        match device.default_input_config() {
            Ok(config) => tags.push(format!(
                "{}Hz, {} ch",
                config.sample_rate().0,
                config.channels()
            )),
            Err(_) => tags.push("configuration unavailable".to_string()),
        }

        println!("  {index}: {name} [{}]", tags.join(" · "));
    }
    println!();

    Ok(())
}
