//! Active device list scraping
//!
//! The DHCP host page embeds the list as a JavaScript string:
//! `var activeusers = 'computer/Name/192.168.0.10/aa:bb:cc:dd:ee:ff/802.11/6|...';`
//! Entries are `|` separated, fields `/` separated. The firmware replaces
//! spaces in names with `-` and drops `|` and `/`, so no escaping is needed.

use std::sync::OnceLock;

use regex::Regex;

use crate::models::ActiveDevice;

fn active_users_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| {
        Regex::new(r"var\s+activeusers\s*=\s*'([^']*)'\s*;").expect("valid activeusers pattern")
    })
}

/// Pull the `activeusers` payload out of the page markup
pub fn extract_active_payload(markup: &str) -> Option<&str> {
    active_users_pattern()
        .captures(markup)
        .and_then(|c| c.get(1))
        .map(|m| m.as_str())
}

/// Parse the payload into devices, in payload order.
///
/// Entries without exactly six fields, or whose last field is not an
/// integer, are firmware noise and skipped. Duplicates are kept.
pub fn parse_active_devices(payload: &str) -> Vec<ActiveDevice> {
    payload
        .split('|')
        .filter(|entry| !entry.is_empty())
        .filter_map(parse_entry)
        .collect()
}

fn parse_entry(entry: &str) -> Option<ActiveDevice> {
    let fields: Vec<&str> = entry.split('/').map(str::trim).collect();
    let [_device_type, name, ip, mac, net, net_number] = fields.as_slice() else {
        return None;
    };

    let net_number = net_number.parse::<i32>().ok()?;

    Some(ActiveDevice {
        name: name.to_string(),
        ip: ip.to_string(),
        mac: mac.to_string(),
        net: net.to_string(),
        net_number,
    })
}
