//! Parsers for FreeBSD tool output
//!
//! Pure functions over captured stdout. Unrecognized records are skipped,
//! never reported as errors: tool output varies between releases and a
//! partial inventory beats none.

use std::sync::LazyLock;

use regex::Regex;

use netpilot_drivers::{ClassCode, HardwareDescriptor};

use crate::interface::{
    InterfaceKind, InterfaceRecord, InterfaceStatistics, InterfaceStatus, WirelessInfo, WirelessNetwork,
};

/// PCI base class for network controllers.
const PCI_NETWORK_BASE_CLASS: u32 = 0x02;

/// USB vendors whose devices are treated as network hardware even without a
/// communications class descriptor.
const KNOWN_USB_NETWORK_VENDORS: &[u16] = &[
    0x0b95, // ASIX
    0x0bda, // Realtek
    0x148f, // Ralink
    0x0df6, // Sitecom
    0x0789, // Logitec
    0x083a, // Accton
    0x2019, // Planex
];

static PCI_HEADER: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^(?P<tag>\w+@pci[0-9:]*[0-9]):?\s+(?P<fields>.*)$").unwrap());
static PCI_CLASS: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\bclass=0x(?P<class>[0-9a-fA-F]{6})").unwrap());
static PCI_VENDOR: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\bvendor=0x(?P<id>[0-9a-fA-F]{4})").unwrap());
static PCI_DEVICE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\bdevice=0x(?P<id>[0-9a-fA-F]{4})").unwrap());
static PCI_CHIP: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\bchip=0x(?P<chip>[0-9a-fA-F]{8})").unwrap());
static PCI_NAME: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"^\s+(?P<field>vendor|device)\s*=\s*['"](?P<name>[^'"]*)['"]"#).unwrap()
});

static USB_HEADER: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^(?P<addr>ugen[0-9.]+):(?:\s*<(?P<desc>[^>]*)>)?").unwrap());
static USB_FIELD: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^\s*(?P<key>\w+)\s*=\s*0x(?P<value>[0-9a-fA-F]+)(?:\s*<(?P<text>[^>]*)>)?").unwrap()
});

static IF_FLAGS: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"flags=\w+<(?P<flags>[^>]*)>").unwrap());
static IF_MAC: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\bether (?P<mac>[0-9a-fA-F:]{17})").unwrap());
static IF_MTU: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\bmtu (?P<mtu>\d+)").unwrap());
static IF_INET: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\binet (?P<addr>\d+\.\d+\.\d+\.\d+)").unwrap());
static IF_MEDIA: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"(?m)^\s*media: (?P<media>.*)$").unwrap());
static IF_SPEED: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"(?i)\b(?P<value>\d+)(?P<giga>g)?base").unwrap());
static IF_STATUS: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"(?m)^\s*status: (?P<status>.+?)\s*$").unwrap());
static IF_OPTIONS: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?m)^\s*options=\w+<(?P<options>[^>]*)>").unwrap());
static IF_SSID: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r#"\bssid (?:"(?P<quoted>[^"]*)"|(?P<bare>\S+))"#).unwrap());
static IF_CHANNEL: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\bchannel (?P<channel>\d+)").unwrap());
static IF_SIGNAL: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\bsignal (?P<dbm>-?\d+)\s*dBm").unwrap());

static SCAN_LINE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"^(?P<ssid>.*?)\s*(?P<bssid>[0-9a-fA-F]{2}(?::[0-9a-fA-F]{2}){5})\s+(?P<chan>\d+)\s+\S+\s+(?P<signal>-?\d+):-?\d+\s+\d+\s*(?P<rest>.*)$",
    )
    .unwrap()
});

/// Split tool output into records that start at an unindented line.
fn records(output: &str) -> Vec<Vec<&str>> {
    let mut records: Vec<Vec<&str>> = Vec::new();
    for line in output.lines() {
        if line.trim().is_empty() {
            continue;
        }
        if !line.starts_with(char::is_whitespace) {
            records.push(vec![line]);
        } else if let Some(record) = records.last_mut() {
            record.push(line);
        }
    }
    records
}

fn hex_u16(digits: &str) -> Option<u16> {
    u16::from_str_radix(digits, 16).ok()
}

/// Parse `pciconf -lv`, keeping only network-class devices.
pub fn parse_pciconf(output: &str) -> Vec<HardwareDescriptor> {
    let mut devices = Vec::new();

    for record in records(output) {
        let Some(header) = PCI_HEADER.captures(record[0]) else {
            continue;
        };
        let fields = &header["fields"];

        let Some(class) = PCI_CLASS
            .captures(fields)
            .and_then(|c| u32::from_str_radix(&c["class"], 16).ok())
        else {
            continue;
        };
        if class >> 16 != PCI_NETWORK_BASE_CLASS {
            continue;
        }

        let ids = match (PCI_VENDOR.captures(fields), PCI_DEVICE.captures(fields)) {
            (Some(v), Some(d)) => hex_u16(&v["id"]).zip(hex_u16(&d["id"])),
            // Older releases print chip=0xDDDDVVVV
            _ => PCI_CHIP
                .captures(fields)
                .and_then(|c| u32::from_str_radix(&c["chip"], 16).ok())
                .map(|chip| ((chip & 0xffff) as u16, (chip >> 16) as u16)),
        };
        let Some((vendor, device)) = ids else {
            continue;
        };

        let mut descriptor = HardwareDescriptor::pci(vendor, device, ClassCode((class >> 8) as u16))
            .with_bus_address(&header["tag"]);
        for line in &record[1..] {
            if let Some(name) = PCI_NAME.captures(line) {
                let value = Some(name["name"].to_string());
                match &name["field"] {
                    "vendor" => descriptor.vendor_name = value,
                    _ => descriptor.device_name = value,
                }
            }
        }

        tracing::debug!(device = %descriptor.id_pair(), bus_address = %&header["tag"], "Found PCI network device");
        devices.push(descriptor);
    }

    devices
}

/// Parse `usbconfig dump_all_desc`.
///
/// A device qualifies when its device or interface class is
/// communications (`0x02`) or its vendor is a known USB network vendor.
pub fn parse_usbconfig(output: &str) -> Vec<HardwareDescriptor> {
    let mut devices = Vec::new();

    for record in records(output) {
        let Some(header) = USB_HEADER.captures(record[0]) else {
            continue;
        };

        let mut vendor = None;
        let mut product = None;
        let mut device_class = None;
        let mut interface_classes = Vec::new();
        let mut manufacturer = None;

        for line in &record[1..] {
            let Some(field) = USB_FIELD.captures(line) else {
                continue;
            };
            let value = hex_u16(&field["value"]);
            match &field["key"] {
                "idVendor" => vendor = value,
                "idProduct" => product = value,
                "bDeviceClass" if device_class.is_none() => device_class = value,
                "bInterfaceClass" => interface_classes.extend(value),
                "iManufacturer" => {
                    manufacturer = field
                        .name("text")
                        .map(|t| t.as_str().trim())
                        .filter(|t| !t.is_empty() && *t != "no string")
                        .map(str::to_string);
                }
                _ => {}
            }
        }

        let (Some(vendor), Some(product)) = (vendor, product) else {
            continue;
        };

        let communications = ClassCode::USB_COMMUNICATIONS.0;
        let is_network = device_class == Some(communications) || interface_classes.contains(&communications);
        if !is_network && !KNOWN_USB_NETWORK_VENDORS.contains(&vendor) {
            continue;
        }

        let class = if is_network {
            Some(ClassCode::USB_COMMUNICATIONS)
        } else {
            device_class
                .filter(|c| *c != 0)
                .or_else(|| interface_classes.first().copied())
                .map(ClassCode)
        };

        let mut descriptor = HardwareDescriptor::usb(vendor, product, class).with_bus_address(&header["addr"]);
        descriptor.vendor_name = manufacturer;
        descriptor.device_name = header.name("desc").map(|d| d.as_str().to_string());

        tracing::debug!(device = %descriptor.id_pair(), bus_address = %&header["addr"], "Found USB network device");
        devices.push(descriptor);
    }

    devices
}

fn parse_status(output: &str) -> InterfaceStatus {
    if let Some(status) = IF_STATUS.captures(output) {
        return match &status["status"] {
            "active" | "associated" | "running" => InterfaceStatus::Active,
            "no carrier" => InterfaceStatus::NoCarrier,
            _ => InterfaceStatus::Inactive,
        };
    }

    let up = IF_FLAGS
        .captures(output)
        .is_some_and(|f| f["flags"].split(',').any(|flag| flag == "UP"));
    if up { InterfaceStatus::Up } else { InterfaceStatus::Down }
}

fn parse_speed(media: &str) -> Option<String> {
    let caps = IF_SPEED.captures(media)?;
    let value: u32 = caps["value"].parse().ok()?;
    Some(if caps.name("giga").is_some() {
        format!("{}G", value)
    } else if value >= 1000 && value % 1000 == 0 {
        format!("{}G", value / 1000)
    } else if value >= 1000 {
        format!("{:.1}G", f64::from(value) / 1000.0)
    } else {
        format!("{}M", value)
    })
}

fn parse_wireless(output: &str) -> Option<WirelessInfo> {
    let info = WirelessInfo {
        ssid: IF_SSID
            .captures(output)
            .and_then(|c| c.name("quoted").or_else(|| c.name("bare")))
            .map(|m| m.as_str().to_string()),
        channel: IF_CHANNEL.captures(output).and_then(|c| c["channel"].parse().ok()),
        signal_dbm: IF_SIGNAL.captures(output).and_then(|c| c["dbm"].parse().ok()),
    };
    (info.ssid.is_some() || info.channel.is_some() || info.signal_dbm.is_some()).then_some(info)
}

/// Parse `ifconfig <name>`. Returns `None` for non-ethernet-like interfaces.
pub fn parse_ifconfig(name: &str, output: &str) -> Option<InterfaceRecord> {
    let mac = IF_MAC.captures(output)?["mac"].to_lowercase();

    let kind = if name.starts_with("wlan") || output.to_lowercase().contains("wireless") {
        InterfaceKind::Wifi
    } else {
        InterfaceKind::Ethernet
    };

    let mut record = InterfaceRecord::new(name, kind).with_status(parse_status(output));
    record.mac = Some(mac);
    record.mtu = IF_MTU.captures(output).and_then(|c| c["mtu"].parse().ok());
    record.addresses = IF_INET
        .captures_iter(output)
        .map(|c| c["addr"].to_string())
        .collect();

    if let Some(media) = IF_MEDIA.captures(output) {
        let media = &media["media"];
        record.speed = parse_speed(media);
        record.duplex = if media.contains("full-duplex") {
            Some("full".to_string())
        } else if media.contains("half-duplex") {
            Some("half".to_string())
        } else {
            None
        };
    }

    if let Some(options) = IF_OPTIONS.captures(output) {
        record.capabilities = options["options"]
            .split(',')
            .map(str::trim)
            .filter(|o| !o.is_empty())
            .map(str::to_string)
            .collect();
    }

    if kind == InterfaceKind::Wifi {
        record.wireless = parse_wireless(output);
    }

    Some(record)
}

/// Parse `netstat -I <name> -b`, reading the link-level row.
pub fn parse_netstat(output: &str) -> Option<InterfaceStatistics> {
    let mut lines = output.lines().filter(|l| !l.trim().is_empty());
    let header: Vec<&str> = lines.next()?.split_whitespace().collect();
    let column = |name: &str| header.iter().position(|h| *h == name);

    let row: Vec<&str> = lines
        .map(|l| l.split_whitespace().collect::<Vec<_>>())
        .find(|fields| fields.len() == header.len())?;
    let value = |name: &str| -> Option<u64> { row.get(column(name)?)?.parse().ok() };

    Some(InterfaceStatistics {
        bytes_in: value("Ibytes")?,
        bytes_out: value("Obytes")?,
        packets_in: value("Ipkts")?,
        packets_out: value("Opkts")?,
        errors_in: value("Ierrs")?,
        errors_out: value("Oerrs")?,
    })
}

/// Characters that appear in the CAPS column of a scan result.
const SCAN_CAP_FLAGS: &str = "EIPSsBRDT";

fn encryption(rest: &str) -> String {
    let tokens: Vec<&str> = rest.split_whitespace().collect();
    if tokens.contains(&"RSN") {
        return "WPA2".to_string();
    }
    if tokens.contains(&"WPA") {
        return "WPA".to_string();
    }
    let privacy = tokens
        .first()
        .is_some_and(|caps| caps.chars().all(|c| SCAN_CAP_FLAGS.contains(c)) && caps.contains('P'));
    let label = if privacy { "WEP" } else { "Open" };
    label.to_string()
}

/// Parse `ifconfig <name> scan`.
pub fn parse_scan(output: &str) -> Vec<WirelessNetwork> {
    output
        .lines()
        .filter_map(|line| SCAN_LINE.captures(line))
        .filter_map(|caps| {
            Some(WirelessNetwork {
                ssid: caps["ssid"].trim().to_string(),
                bssid: caps["bssid"].to_lowercase(),
                signal_dbm: caps["signal"].parse().ok()?,
                channel: caps["chan"].parse().ok()?,
                encryption: encryption(&caps["rest"]),
            })
        })
        .collect()
}
