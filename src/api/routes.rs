use crate::protocol::{seconds_param, value_param};

/// A resolved request
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Route {
    Root,
    PumpOn,
    PumpOff,
    AutoOn,
    AutoOff,
    WaterOnce { seconds: Option<i64> },
    SetThreshold { value: Option<i64> },
    Status,
    Favicon,
    /// Nothing matched; serve the status page
    Fallback,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Endpoint {
    Root,
    PumpOn,
    PumpOff,
    AutoOn,
    AutoOff,
    WaterOnce,
    SetThreshold,
    Status,
    Favicon,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Matching {
    Exact,
    Prefix,
}

#[derive(Debug, Clone, Copy)]
struct RouteEntry {
    pattern: &'static [u8],
    matching: Matching,
    endpoint: Endpoint,
}

impl RouteEntry {
    const fn exact(pattern: &'static [u8], endpoint: Endpoint) -> Self {
        Self {
            pattern,
            matching: Matching::Exact,
            endpoint,
        }
    }

    const fn prefix(pattern: &'static [u8], endpoint: Endpoint) -> Self {
        Self {
            pattern,
            matching: Matching::Prefix,
            endpoint,
        }
    }

    fn matches(&self, path: &[u8]) -> bool {
        match self.matching {
            Matching::Exact => path == self.pattern,
            Matching::Prefix => path.starts_with(self.pattern),
        }
    }
}

// Shared by every deployment, in match order
const CONTROL_ROUTES: &[RouteEntry] = &[
    RouteEntry::prefix(b"/on", Endpoint::PumpOn),
    RouteEntry::prefix(b"/off", Endpoint::PumpOff),
    RouteEntry::prefix(b"/auto_on", Endpoint::AutoOn),
    RouteEntry::prefix(b"/auto_off", Endpoint::AutoOff),
    RouteEntry::prefix(b"/water_once", Endpoint::WaterOnce),
    RouteEntry::prefix(b"/set_threshold", Endpoint::SetThreshold),
    RouteEntry::prefix(b"/status", Endpoint::Status),
];

/// Ordered route table, first match wins
#[derive(Debug, Clone)]
pub struct RouteTable {
    entries: Vec<RouteEntry>,
}

impl RouteTable {
    /// Control routes only; everything else falls back to the page
    pub fn standard() -> Self {
        Self {
            entries: CONTROL_ROUTES.to_vec(),
        }
    }

    /// Adds an exact `/` route ahead of the control routes and a 404 for
    /// `/favicon.ico` after them
    pub fn access_point() -> Self {
        let mut entries = vec![RouteEntry::exact(b"/", Endpoint::Root)];
        entries.extend_from_slice(CONTROL_ROUTES);
        entries.push(RouteEntry::prefix(b"/favicon.ico", Endpoint::Favicon));
        Self { entries }
    }

    pub fn resolve(&self, path: &[u8]) -> Route {
        let Some(entry) = self.entries.iter().find(|entry| entry.matches(path)) else {
            return Route::Fallback;
        };

        match entry.endpoint {
            Endpoint::Root => Route::Root,
            Endpoint::PumpOn => Route::PumpOn,
            Endpoint::PumpOff => Route::PumpOff,
            Endpoint::AutoOn => Route::AutoOn,
            Endpoint::AutoOff => Route::AutoOff,
            Endpoint::WaterOnce => Route::WaterOnce {
                seconds: seconds_param(path),
            },
            Endpoint::SetThreshold => Route::SetThreshold {
                value: value_param(path),
            },
            Endpoint::Status => Route::Status,
            Endpoint::Favicon => Route::Favicon,
        }
    }
}
