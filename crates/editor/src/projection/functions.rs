use callie_domain::agent::{
    AgentRecord, CalComTool, CustomTool, HttpMethod, SendSmsTool, SmsType, Tool, ToolKind,
    TransferCallTool,
};
use serde::{Deserialize, Serialize};

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// Functions panel
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

/// One sub-object per singleton tool plus the list of custom functions.
///
/// A singleton's `*_enabled` flag is "an entry of that type exists". When
/// it does not, the details hold placeholders the toggle-on path uses.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FunctionsView {
    pub transfer_enabled: bool,
    pub transfer_details: TransferDetails,
    pub sms_enabled: bool,
    pub sms_details: SmsDetails,
    pub booking_enabled: bool,
    pub booking_details: CalDetails,
    pub check_availability_enabled: bool,
    pub check_availability_details: CalDetails,
    pub custom_functions: Vec<CustomFunction>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TransferDetails {
    pub name: String,
    pub description: String,
    pub phone_number: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SmsDetails {
    pub name: String,
    pub description: String,
    pub content: String,
    pub sms_type: SmsType,
}

/// Booking and availability share this shape.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CalDetails {
    pub name: String,
    pub description: String,
    pub cal_com_api_key: String,
    pub event_type_id: String,
    pub timezone: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HeaderPair {
    pub key: String,
    pub value: String,
}

/// Editable form of a `custom` tool.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct CustomFunction {
    /// UI-only, synthesized from `name`.
    pub id: String,
    pub name: String,
    pub description: String,
    pub endpoint_url: String,
    pub method: HttpMethod,
    pub headers: Vec<HeaderPair>,
    /// Parameter JSON schema as typed by the user.
    pub parameters_json: String,
    pub timeout_ms: u64,
    pub speak_during_execution: bool,
    pub speak_during_message: String,
    pub speak_after_execution: bool,
}

impl Default for CustomFunction {
    fn default() -> Self {
        Self::from_tool(&CustomTool::default())
    }
}

// ── placeholders ────────────────────────────────────────────────────

impl Default for TransferDetails {
    fn default() -> Self {
        Self {
            name: "transfer_call".into(),
            description: "Transfer the caller to a live agent.".into(),
            phone_number: String::new(),
        }
    }
}

impl Default for SmsDetails {
    fn default() -> Self {
        Self {
            name: "send_sms".into(),
            description: "Send the caller a text message.".into(),
            content: String::new(),
            sms_type: SmsType::Static,
        }
    }
}

impl CalDetails {
    pub fn booking() -> Self {
        Self::placeholder("book_appointment", "Book an appointment on the calendar.")
    }

    pub fn check_availability() -> Self {
        Self::placeholder("check_availability", "Check open slots on the calendar.")
    }

    fn placeholder(name: &str, description: &str) -> Self {
        Self {
            name: name.into(),
            description: description.into(),
            cal_com_api_key: String::new(),
            event_type_id: String::new(),
            timezone: "UTC".into(),
        }
    }
}

// ── tool <-> details ────────────────────────────────────────────────

impl TransferDetails {
    pub fn from_tool(t: &TransferCallTool) -> Self {
        Self {
            name: t.name.clone(),
            description: t.description.clone(),
            phone_number: t.transfer_destination.clone(),
        }
    }

    pub fn to_tool(&self) -> Tool {
        Tool::TransferCall(TransferCallTool {
            name: self.name.clone(),
            description: self.description.clone(),
            transfer_destination: self.phone_number.clone(),
        })
    }
}

impl SmsDetails {
    pub fn from_tool(t: &SendSmsTool) -> Self {
        Self {
            name: t.name.clone(),
            description: t.description.clone(),
            content: t.content.clone(),
            sms_type: t.sms_type,
        }
    }

    pub fn to_tool(&self) -> Tool {
        Tool::SendSms(SendSmsTool {
            name: self.name.clone(),
            description: self.description.clone(),
            content: self.content.clone(),
            sms_type: self.sms_type,
        })
    }
}

impl CalDetails {
    pub fn from_tool(t: &CalComTool) -> Self {
        Self {
            name: t.name.clone(),
            description: t.description.clone(),
            cal_com_api_key: t.cal_api_key.clone(),
            event_type_id: t.event_type_id.clone(),
            timezone: t.timezone.clone(),
        }
    }

    pub fn to_cal_tool(&self) -> CalComTool {
        CalComTool {
            name: self.name.clone(),
            description: self.description.clone(),
            cal_api_key: self.cal_com_api_key.clone(),
            event_type_id: self.event_type_id.clone(),
            timezone: self.timezone.clone(),
        }
    }
}

impl CustomFunction {
    pub fn from_tool(t: &CustomTool) -> Self {
        Self {
            id: t.name.clone(),
            name: t.name.clone(),
            description: t.description.clone(),
            endpoint_url: t.url.clone(),
            method: t.method,
            headers: t
                .headers
                .iter()
                .map(|(key, value)| HeaderPair {
                    key: key.to_owned(),
                    value: value.to_owned(),
                })
                .collect(),
            parameters_json: t
                .parameters
                .as_ref()
                .and_then(|p| serde_json::to_string_pretty(p).ok())
                .unwrap_or_default(),
            timeout_ms: t.timeout_ms,
            speak_during_execution: t.speak_during_execution,
            speak_during_message: t.execution_message_description.clone(),
            speak_after_execution: t.speak_after_execution,
        }
    }
}

// ── deriver ─────────────────────────────────────────────────────────

impl FunctionsView {
    pub fn derive(rec: &AgentRecord) -> Self {
        let tools = || rec.llm.general_tools.iter().filter_map(|e| e.as_tool());

        let transfer = tools().find_map(|t| match t {
            Tool::TransferCall(t) => Some(TransferDetails::from_tool(t)),
            _ => None,
        });
        let sms = tools().find_map(|t| match t {
            Tool::SendSms(t) => Some(SmsDetails::from_tool(t)),
            _ => None,
        });
        let booking = tools().find_map(|t| match t {
            Tool::BookAppointmentCal(t) => Some(CalDetails::from_tool(t)),
            _ => None,
        });
        let availability = tools().find_map(|t| match t {
            Tool::CheckAvailabilityCal(t) => Some(CalDetails::from_tool(t)),
            _ => None,
        });

        // An entry that did not decode still counts as present.
        let present = |kind: ToolKind| rec.llm.general_tools.iter().any(|e| e.is_kind(kind));

        Self {
            transfer_enabled: present(ToolKind::TransferCall),
            transfer_details: transfer.unwrap_or_default(),
            sms_enabled: present(ToolKind::SendSms),
            sms_details: sms.unwrap_or_default(),
            booking_enabled: present(ToolKind::BookAppointmentCal),
            booking_details: booking.unwrap_or_else(CalDetails::booking),
            check_availability_enabled: present(ToolKind::CheckAvailabilityCal),
            check_availability_details: availability.unwrap_or_else(CalDetails::check_availability),
            custom_functions: tools()
                .filter_map(|t| match t {
                    Tool::Custom(c) => Some(CustomFunction::from_tool(c)),
                    _ => None,
                })
                .collect(),
        }
    }

    pub fn is_enabled(&self, kind: ToolKind) -> bool {
        match kind {
            ToolKind::TransferCall => self.transfer_enabled,
            ToolKind::SendSms => self.sms_enabled,
            ToolKind::BookAppointmentCal => self.booking_enabled,
            ToolKind::CheckAvailabilityCal => self.check_availability_enabled,
            ToolKind::EndCall | ToolKind::Custom => false,
        }
    }
}
