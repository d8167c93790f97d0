use serde::de::{MapAccess, Visitor};
use serde::ser::SerializeMap;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use serde_json::Value;
use std::fmt;

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// Tool kinds
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ToolKind {
    EndCall,
    TransferCall,
    SendSms,
    BookAppointmentCal,
    CheckAvailabilityCal,
    Custom,
}

/// How many entries of one kind may live in `generalTools`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Cardinality {
    /// At most one entry; absence means disabled.
    Singleton,
    /// Any number of entries, told apart by `name`.
    KeyedByName,
}

impl ToolKind {
    pub const SINGLETONS: [ToolKind; 4] = [
        ToolKind::TransferCall,
        ToolKind::SendSms,
        ToolKind::BookAppointmentCal,
        ToolKind::CheckAvailabilityCal,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            Self::EndCall => "end_call",
            Self::TransferCall => "transfer_call",
            Self::SendSms => "send_sms",
            Self::BookAppointmentCal => "book_appointment_cal",
            Self::CheckAvailabilityCal => "check_availability_cal",
            Self::Custom => "custom",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        Some(match s {
            "end_call" => Self::EndCall,
            "transfer_call" => Self::TransferCall,
            "send_sms" => Self::SendSms,
            "book_appointment_cal" => Self::BookAppointmentCal,
            "check_availability_cal" => Self::CheckAvailabilityCal,
            "custom" => Self::Custom,
            _ => return None,
        })
    }

    pub fn cardinality(self) -> Cardinality {
        match self {
            Self::TransferCall
            | Self::SendSms
            | Self::BookAppointmentCal
            | Self::CheckAvailabilityCal => Cardinality::Singleton,
            Self::EndCall | Self::Custom => Cardinality::KeyedByName,
        }
    }
}

impl std::fmt::Display for ToolKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// Tool payloads
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

/// A tool the dashboard knows how to edit, tagged by `type`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Tool {
    EndCall(EndCallTool),
    TransferCall(TransferCallTool),
    SendSms(SendSmsTool),
    BookAppointmentCal(CalComTool),
    CheckAvailabilityCal(CalComTool),
    Custom(CustomTool),
}

impl Tool {
    pub fn kind(&self) -> ToolKind {
        match self {
            Tool::EndCall(_) => ToolKind::EndCall,
            Tool::TransferCall(_) => ToolKind::TransferCall,
            Tool::SendSms(_) => ToolKind::SendSms,
            Tool::BookAppointmentCal(_) => ToolKind::BookAppointmentCal,
            Tool::CheckAvailabilityCal(_) => ToolKind::CheckAvailabilityCal,
            Tool::Custom(_) => ToolKind::Custom,
        }
    }

    pub fn name(&self) -> &str {
        match self {
            Tool::EndCall(t) => &t.name,
            Tool::TransferCall(t) => &t.name,
            Tool::SendSms(t) => &t.name,
            Tool::BookAppointmentCal(t) | Tool::CheckAvailabilityCal(t) => &t.name,
            Tool::Custom(t) => &t.name,
        }
    }

    pub fn description(&self) -> &str {
        match self {
            Tool::EndCall(t) => &t.description,
            Tool::TransferCall(t) => &t.description,
            Tool::SendSms(t) => &t.description,
            Tool::BookAppointmentCal(t) | Tool::CheckAvailabilityCal(t) => &t.description,
            Tool::Custom(t) => &t.description,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct EndCallTool {
    pub name: String,
    pub description: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct TransferCallTool {
    pub name: String,
    pub description: String,
    /// E.164 number.
    pub transfer_destination: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct SendSmsTool {
    pub name: String,
    pub description: String,
    pub content: String,
    pub sms_type: SmsType,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SmsType {
    #[default]
    Static,
    Prompt,
}

/// Shared by `book_appointment_cal` and `check_availability_cal`.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct CalComTool {
    pub name: String,
    pub description: String,
    pub cal_api_key: String,
    #[serde(with = "event_type_id")]
    pub event_type_id: String,
    pub timezone: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct CustomTool {
    pub name: String,
    pub description: String,
    pub url: String,
    pub method: HttpMethod,
    pub headers: Headers,
    pub timeout_ms: u64,
    pub speak_during_execution: bool,
    pub speak_after_execution: bool,
    /// Spoken while the call is in flight when `speak_during_execution` is set.
    pub execution_message_description: String,
    /// JSON schema for the call arguments.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub parameters: Option<Value>,
}

impl Default for CustomTool {
    fn default() -> Self {
        Self {
            name: String::new(),
            description: String::new(),
            url: String::new(),
            method: HttpMethod::Post,
            headers: Headers::default(),
            timeout_ms: 120_000,
            speak_during_execution: false,
            speak_after_execution: true,
            execution_message_description: String::new(),
            parameters: None,
        }
    }
}

/// Request headers in entry order. On the wire this is a JSON object.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Headers(Vec<(String, String)>);

impl Headers {
    /// Set `key`. An existing key keeps its position and takes the new value.
    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<String>) {
        let key = key.into();
        let value = value.into();
        match self.0.iter_mut().find(|(k, _)| *k == key) {
            Some((_, v)) => *v = value,
            None => self.0.push((key, value)),
        }
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.0
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.0.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for Headers {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut headers = Headers::default();
        for (k, v) in iter {
            headers.insert(k, v);
        }
        headers
    }
}

impl Serialize for Headers {
    fn serialize<S: Serializer>(&self, s: S) -> Result<S::Ok, S::Error> {
        let mut map = s.serialize_map(Some(self.0.len()))?;
        for (k, v) in &self.0 {
            map.serialize_entry(k, v)?;
        }
        map.end()
    }
}

impl<'de> Deserialize<'de> for Headers {
    fn deserialize<D: Deserializer<'de>>(d: D) -> Result<Self, D::Error> {
        struct HeadersVisitor;

        impl<'de> Visitor<'de> for HeadersVisitor {
            type Value = Headers;

            fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str("a map of header names to values")
            }

            fn visit_map<A: MapAccess<'de>>(self, mut access: A) -> Result<Headers, A::Error> {
                let mut headers = Headers::default();
                while let Some((k, v)) = access.next_entry::<String, Option<String>>()? {
                    headers.insert(k, v.unwrap_or_default());
                }
                Ok(headers)
            }

            fn visit_unit<E: serde::de::Error>(self) -> Result<Headers, E> {
                Ok(Headers::default())
            }

            fn visit_none<E: serde::de::Error>(self) -> Result<Headers, E> {
                Ok(Headers::default())
            }
        }

        d.deserialize_any(HeadersVisitor)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum HttpMethod {
    Get,
    #[default]
    Post,
    Put,
    Patch,
    Delete,
}

/// `eventTypeId` lives as a string in the record but the backend wants a
/// number whenever it is one.
mod event_type_id {
    use serde::{Deserialize, Deserializer, Serializer};
    use serde_json::Value;

    pub fn serialize<S: Serializer>(id: &str, s: S) -> Result<S::Ok, S::Error> {
        match id.trim().parse::<u64>() {
            Ok(n) => s.serialize_u64(n),
            Err(_) => s.serialize_str(id),
        }
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(d: D) -> Result<String, D::Error> {
        Ok(match Value::deserialize(d)? {
            Value::String(s) => s,
            Value::Number(n) => n.to_string(),
            Value::Null => String::new(),
            other => other.to_string(),
        })
    }
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// List entries
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

/// One element of `generalTools`.
///
/// Entries whose `type` the dashboard does not model (e.g. `mcp_tool`) are
/// kept verbatim so saving never drops them. So are entries of a known
/// `type` whose fields do not decode; they still count as that kind.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum ToolEntry {
    Known(Tool),
    Opaque(Value),
}

impl<'de> Deserialize<'de> for ToolEntry {
    fn deserialize<D: Deserializer<'de>>(d: D) -> Result<Self, D::Error> {
        Ok(ToolEntry::from_value(Value::deserialize(d)?))
    }
}

impl ToolEntry {
    /// Decode one raw entry. Top-level `null` fields fall back to their
    /// defaults; anything still undecodable is kept as `Opaque`.
    pub fn from_value(raw: Value) -> Self {
        let mut cleaned = raw.clone();
        if let Value::Object(fields) = &mut cleaned {
            fields.retain(|_, v| !v.is_null());
        }
        match serde_json::from_value::<Tool>(cleaned) {
            Ok(tool) => ToolEntry::Known(tool),
            Err(e) => {
                tracing::debug!(error = %e, "keeping tool entry undecoded");
                ToolEntry::Opaque(raw)
            }
        }
    }

    /// Kind by `type` discriminator, for opaque entries too.
    pub fn kind(&self) -> Option<ToolKind> {
        match self {
            ToolEntry::Known(t) => Some(t.kind()),
            ToolEntry::Opaque(_) => self.type_name().and_then(ToolKind::parse),
        }
    }

    /// The raw `type` discriminator, also for opaque entries.
    pub fn type_name(&self) -> Option<&str> {
        match self {
            ToolEntry::Known(t) => Some(t.kind().as_str()),
            ToolEntry::Opaque(v) => v.get("type").and_then(Value::as_str),
        }
    }

    pub fn name(&self) -> Option<&str> {
        match self {
            ToolEntry::Known(t) => Some(t.name()),
            ToolEntry::Opaque(v) => v.get("name").and_then(Value::as_str),
        }
    }

    pub fn is_kind(&self, kind: ToolKind) -> bool {
        self.kind() == Some(kind)
    }

    pub fn as_tool(&self) -> Option<&Tool> {
        match self {
            ToolEntry::Known(t) => Some(t),
            ToolEntry::Opaque(_) => None,
        }
    }
}

impl From<Tool> for ToolEntry {
    fn from(t: Tool) -> Self {
        ToolEntry::Known(t)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn known_and_opaque_entries_deserialize() {
        let tools: Vec<ToolEntry> = serde_json::from_value(json!([
            { "type": "end_call", "name": "end_call", "description": "Hang up" },
            { "type": "transfer_call", "name": "t1", "transferDestination": "+15551234567" },
            { "type": "mcp_tool", "name": "lookup", "server": "crm" }
        ]))
        .unwrap();

        assert_eq!(tools[0].kind(), Some(ToolKind::EndCall));
        assert_eq!(tools[1].name(), Some("t1"));
        assert!(matches!(tools[2], ToolEntry::Opaque(_)));
        assert_eq!(tools[2].type_name(), Some("mcp_tool"));
        assert_eq!(tools[2].name(), Some("lookup"));
    }

    #[test]
    fn opaque_entry_survives_round_trip() {
        let raw = json!({ "type": "mcp_tool", "name": "lookup", "server": "crm" });
        let entry: ToolEntry = serde_json::from_value(raw.clone()).unwrap();
        assert_eq!(serde_json::to_value(&entry).unwrap(), raw);
    }

    #[test]
    fn event_type_id_serializes_as_number_when_numeric() {
        let tool = Tool::BookAppointmentCal(CalComTool {
            name: "book".into(),
            event_type_id: "12345".into(),
            ..Default::default()
        });
        let v = serde_json::to_value(&tool).unwrap();
        assert_eq!(v["type"], "book_appointment_cal");
        assert_eq!(v["eventTypeId"], 12345);

        let back: Tool = serde_json::from_value(v).unwrap();
        assert_eq!(back, tool);

        let slug = Tool::CheckAvailabilityCal(CalComTool {
            event_type_id: "intro-call".into(),
            ..Default::default()
        });
        assert_eq!(serde_json::to_value(&slug).unwrap()["eventTypeId"], "intro-call");
    }

    #[test]
    fn null_fields_fall_back_to_defaults() {
        let tools: Vec<ToolEntry> = serde_json::from_value(json!([
            { "type": "transfer_call", "name": "t1", "description": null,
              "transferDestination": "+15551234567" },
            { "type": "custom", "name": "lookup", "url": "https://x.test",
              "headers": null, "timeoutMs": null }
        ]))
        .unwrap();

        match &tools[0] {
            ToolEntry::Known(Tool::TransferCall(t)) => {
                assert_eq!(t.description, "");
                assert_eq!(t.transfer_destination, "+15551234567");
            }
            other => panic!("unexpected entry: {other:?}"),
        }
        match &tools[1] {
            ToolEntry::Known(Tool::Custom(t)) => {
                assert!(t.headers.is_empty());
                assert_eq!(t.timeout_ms, 120_000);
            }
            other => panic!("unexpected entry: {other:?}"),
        }
    }

    #[test]
    fn undecodable_known_type_keeps_its_kind() {
        let raw = json!({ "type": "transfer_call", "name": 7, "transferDestination": [] });
        let entry: ToolEntry = serde_json::from_value(raw.clone()).unwrap();
        assert!(matches!(entry, ToolEntry::Opaque(_)));
        assert!(entry.is_kind(ToolKind::TransferCall));
        assert_eq!(serde_json::to_value(&entry).unwrap(), raw);
    }

    #[test]
    fn headers_keep_entry_order() {
        let raw = r#"{"X-Tenant":"acme","Authorization":"Bearer x","Accept":null}"#;
        let headers: Headers = serde_json::from_str(raw).unwrap();
        let keys: Vec<_> = headers.iter().map(|(k, _)| k).collect();
        assert_eq!(keys, vec!["X-Tenant", "Authorization", "Accept"]);
        assert_eq!(headers.get("Accept"), Some(""));

        let out = serde_json::to_string(&headers).unwrap();
        assert_eq!(out, r#"{"X-Tenant":"acme","Authorization":"Bearer x","Accept":""}"#);
    }

    #[test]
    fn tool_entry_keeps_header_order_from_the_wire() {
        let raw = r#"{"type":"custom","name":"f","headers":{"Z-Last":"1","A-First":"2"}}"#;
        let entry: ToolEntry = serde_json::from_str(raw).unwrap();
        match entry.as_tool() {
            Some(Tool::Custom(c)) => {
                let keys: Vec<_> = c.headers.iter().map(|(k, _)| k).collect();
                assert_eq!(keys, vec!["Z-Last", "A-First"]);
            }
            other => panic!("unexpected entry: {other:?}"),
        }
    }

    #[test]
    fn repeated_header_keeps_first_position() {
        let headers: Headers = [("A", "1"), ("B", "2"), ("A", "3")].into_iter().collect();
        let pairs: Vec<_> = headers.iter().collect();
        assert_eq!(pairs, vec![("A", "3"), ("B", "2")]);
    }

    #[test]
    fn singleton_kinds() {
        for kind in ToolKind::SINGLETONS {
            assert_eq!(kind.cardinality(), Cardinality::Singleton);
            assert_eq!(ToolKind::parse(kind.as_str()), Some(kind));
        }
        assert_eq!(ToolKind::Custom.cardinality(), Cardinality::KeyedByName);
    }
}
