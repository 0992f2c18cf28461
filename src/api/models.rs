use serde::Serialize;

/// Body of `GET /status`
///
/// Field order is part of the wire contract: clients parse the text.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct StatusSnapshot {
    pub pump: bool,
    pub moisture: u8,
    pub threshold: u8,
    pub auto: bool,
}

impl StatusSnapshot {
    pub fn to_json(&self) -> String {
        // Four plain fields cannot fail to serialize
        serde_json::to_string(self).unwrap_or_default()
    }
}
