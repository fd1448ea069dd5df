//! Network interface records

use serde::Serialize;

/// Link state reported by `ifconfig`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum InterfaceStatus {
    Up,
    Down,
    Active,
    Inactive,
    NoCarrier,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum InterfaceKind {
    Ethernet,
    Wifi,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct WirelessInfo {
    pub ssid: Option<String>,
    pub channel: Option<u32>,
    pub signal_dbm: Option<i32>,
}

/// Link-level counters from `netstat -I <if> -b`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct InterfaceStatistics {
    pub bytes_in: u64,
    pub bytes_out: u64,
    pub packets_in: u64,
    pub packets_out: u64,
    pub errors_in: u64,
    pub errors_out: u64,
}

/// One configured network interface.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct InterfaceRecord {
    pub name: String,
    pub status: InterfaceStatus,
    pub mac: Option<String>,
    pub kind: InterfaceKind,
    pub mtu: Option<u32>,
    pub addresses: Vec<String>,
    /// e.g. `1G`, `100M`
    pub speed: Option<String>,
    /// `full` or `half`
    pub duplex: Option<String>,
    pub capabilities: Vec<String>,
    pub wireless: Option<WirelessInfo>,
    pub statistics: Option<InterfaceStatistics>,
}

impl InterfaceRecord {
    pub fn new(name: impl Into<String>, kind: InterfaceKind) -> Self {
        Self {
            name: name.into(),
            status: InterfaceStatus::Down,
            mac: None,
            kind,
            mtu: None,
            addresses: Vec::new(),
            speed: None,
            duplex: None,
            capabilities: Vec::new(),
            wireless: None,
            statistics: None,
        }
    }

    pub fn with_status(mut self, status: InterfaceStatus) -> Self {
        self.status = status;
        self
    }

    pub fn is_wifi(&self) -> bool {
        self.kind == InterfaceKind::Wifi
    }

    pub fn is_active(&self) -> bool {
        self.status == InterfaceStatus::Active
    }
}

/// A network seen by `ifconfig <if> scan`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct WirelessNetwork {
    pub ssid: String,
    pub bssid: String,
    pub signal_dbm: i32,
    pub channel: u32,
    /// `WPA2`, `WPA`, `WEP` or `Open`
    pub encryption: String,
}
