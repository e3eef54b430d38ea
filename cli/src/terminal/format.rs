use std::time::Duration;

use camprobe_common::models::FoundDevice;
use colored::*;

use crate::terminal::colors;

pub type Detail = (String, ColoredString);

pub fn device_to_details(device: &FoundDevice) -> Vec<Detail> {
    let mut details: Vec<Detail> = Vec::new();

    if let Some(category) = &device.category {
        details.push(("Vendor".to_string(), category.color(colors::VENDOR)));
    }

    let auth: ColoredString = match &device.credential {
        Some(credential) => credential.to_string().color(colors::CREDENTIAL).bold(),
        None => "none required".color(colors::TEXT_DEFAULT),
    };
    details.push(("Auth".to_string(), auth));

    if let Some(confidence) = device.confidence {
        details.push(("Score".to_string(), confidence.to_string().color(colors::ACCENT)));
    }

    details
}

pub fn elapsed(duration: Duration) -> ColoredString {
    format!("{:.2}s", duration.as_secs_f64()).bold().yellow()
}

// ╔════════════════════════════════════════════╗
// ║ ████████╗███████╗███████╗████████╗███████╗ ║
// ║ ╚══██╔══╝██╔════╝██╔════╝╚══██╔══╝██╔════╝ ║
// ║    ██║   █████╗  ███████╗   ██║   ███████╗ ║
// ║    ██║   ██╔══╝  ╚════██║   ██║   ╚════██║ ║
// ║    ██║   ███████╗███████║   ██║   ███████║ ║
// ║    ╚═╝   ╚══════╝╚══════╝   ╚═╝   ╚══════╝ ║
// ╚════════════════════════════════════════════╝

#[cfg(test)]
mod tests {
    use super::*;
    use camprobe_common::models::Credential;

    #[test]
    fn open_device_has_auth_line_only() {
        let details = device_to_details(&FoundDevice::new("rtsp://10.0.0.9:554/live"));
        let keys: Vec<&str> = details.iter().map(|(key, _)| key.as_str()).collect();
        assert_eq!(keys, vec!["Auth"]);
    }

    #[test]
    fn full_device_lists_every_detail() {
        let mut device = FoundDevice::new("http://10.0.0.9:80/");
        device.category = Some("hikvision".into());
        device.credential = Some(Credential::new("admin", "12345"));
        device.confidence = Some(7);

        let details = device_to_details(&device);
        let keys: Vec<&str> = details.iter().map(|(key, _)| key.as_str()).collect();
        assert_eq!(keys, vec!["Vendor", "Auth", "Score"]);
        assert!(details[1].1.to_string().contains("admin:12345"));
    }
}
