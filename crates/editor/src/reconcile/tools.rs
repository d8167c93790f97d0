//! Functions panel reconciliation.
//!
//! Singleton tools are matched by kind: enabling upserts, disabling
//! removes every entry of that kind, detail edits merge over the existing
//! entry. Custom functions are replaced as a whole list. Entries the panel
//! does not manage (`end_call`, opaque tools) are never touched.

use callie_domain::agent::{
    AgentRecord, CustomTool, Headers, LlmMutation, Mutation, SmsType, Tool, ToolEntry, ToolKind,
};
use serde::Deserialize;

use crate::projection::{CalDetails, CustomFunction, FunctionsView, HeaderPair, SmsDetails, TransferDetails};

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(tag = "field", content = "value", rename_all = "camelCase")]
pub enum FunctionsChange {
    TransferEnabled(bool),
    TransferDetails(TransferPatch),
    SmsEnabled(bool),
    SmsDetails(SmsPatch),
    BookingEnabled(bool),
    BookingDetails(CalPatch),
    CheckAvailabilityEnabled(bool),
    CheckAvailabilityDetails(CalPatch),
    CustomFunctions(Vec<CustomFunction>),
}

/// Fields left `None` keep their current value.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct TransferPatch {
    pub name: Option<String>,
    pub description: Option<String>,
    pub phone_number: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct SmsPatch {
    pub name: Option<String>,
    pub description: Option<String>,
    pub content: Option<String>,
    pub sms_type: Option<SmsType>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct CalPatch {
    pub name: Option<String>,
    pub description: Option<String>,
    pub cal_com_api_key: Option<String>,
    pub event_type_id: Option<String>,
    pub timezone: Option<String>,
}

impl TransferPatch {
    fn merge(self, mut d: TransferDetails) -> TransferDetails {
        merge_field(&mut d.name, self.name);
        merge_field(&mut d.description, self.description);
        merge_field(&mut d.phone_number, self.phone_number);
        d
    }
}

impl SmsPatch {
    fn merge(self, mut d: SmsDetails) -> SmsDetails {
        merge_field(&mut d.name, self.name);
        merge_field(&mut d.description, self.description);
        merge_field(&mut d.content, self.content);
        merge_field(&mut d.sms_type, self.sms_type);
        d
    }
}

impl CalPatch {
    fn merge(self, mut d: CalDetails) -> CalDetails {
        merge_field(&mut d.name, self.name);
        merge_field(&mut d.description, self.description);
        merge_field(&mut d.cal_com_api_key, self.cal_com_api_key);
        merge_field(&mut d.event_type_id, self.event_type_id);
        merge_field(&mut d.timezone, self.timezone);
        d
    }
}

fn merge_field<T>(slot: &mut T, value: Option<T>) {
    if let Some(v) = value {
        *slot = v;
    }
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// Reconciler
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

pub fn functions(rec: &AgentRecord, change: FunctionsChange) -> Vec<Mutation> {
    let tools = &rec.llm.general_tools;
    let view = FunctionsView::derive(rec);

    let next = match change {
        FunctionsChange::TransferEnabled(on) => {
            toggle(tools, ToolKind::TransferCall, on, || view.transfer_details.to_tool())
        }
        FunctionsChange::SmsEnabled(on) => {
            toggle(tools, ToolKind::SendSms, on, || view.sms_details.to_tool())
        }
        FunctionsChange::BookingEnabled(on) => toggle(tools, ToolKind::BookAppointmentCal, on, || {
            Tool::BookAppointmentCal(view.booking_details.to_cal_tool())
        }),
        FunctionsChange::CheckAvailabilityEnabled(on) => {
            toggle(tools, ToolKind::CheckAvailabilityCal, on, || {
                Tool::CheckAvailabilityCal(view.check_availability_details.to_cal_tool())
            })
        }

        FunctionsChange::TransferDetails(patch) => edit(&view, tools, ToolKind::TransferCall, || {
            patch.merge(view.transfer_details.clone()).to_tool()
        }),
        FunctionsChange::SmsDetails(patch) => edit(&view, tools, ToolKind::SendSms, || {
            patch.merge(view.sms_details.clone()).to_tool()
        }),
        FunctionsChange::BookingDetails(patch) => {
            edit(&view, tools, ToolKind::BookAppointmentCal, || {
                Tool::BookAppointmentCal(patch.merge(view.booking_details.clone()).to_cal_tool())
            })
        }
        FunctionsChange::CheckAvailabilityDetails(patch) => {
            edit(&view, tools, ToolKind::CheckAvailabilityCal, || {
                Tool::CheckAvailabilityCal(
                    patch
                        .merge(view.check_availability_details.clone())
                        .to_cal_tool(),
                )
            })
        }

        FunctionsChange::CustomFunctions(list) => Some(replace_custom(tools, &list)),
    };

    match next {
        Some(list) => vec![LlmMutation::GeneralTools(list).into()],
        None => Vec::new(),
    }
}

fn toggle(
    tools: &[ToolEntry],
    kind: ToolKind,
    on: bool,
    build: impl FnOnce() -> Tool,
) -> Option<Vec<ToolEntry>> {
    if on {
        Some(upsert_singleton(tools, build()))
    } else {
        Some(remove_kind(tools, kind))
    }
}

/// Detail edits only land while the tool is enabled; a disabled tool has
/// no entry to merge into.
fn edit(
    view: &FunctionsView,
    tools: &[ToolEntry],
    kind: ToolKind,
    build: impl FnOnce() -> Tool,
) -> Option<Vec<ToolEntry>> {
    if !view.is_enabled(kind) {
        tracing::debug!(kind = %kind, "ignoring detail edit for a disabled tool");
        return None;
    }
    Some(upsert_singleton(tools, build()))
}

// ── list operations ─────────────────────────────────────────────────

/// Replace the entry of `tool`'s kind in place, or append it. Any further
/// entries of the same kind are dropped.
pub fn upsert_singleton(tools: &[ToolEntry], tool: Tool) -> Vec<ToolEntry> {
    let kind = tool.kind();
    let mut out = Vec::with_capacity(tools.len() + 1);
    let mut slot = Some(ToolEntry::Known(tool));

    for entry in tools {
        if entry.is_kind(kind) {
            if let Some(t) = slot.take() {
                out.push(t);
            }
        } else {
            out.push(entry.clone());
        }
    }
    if let Some(t) = slot {
        out.push(t);
    }
    out
}

/// Drop every entry of `kind`, whatever its name.
pub fn remove_kind(tools: &[ToolEntry], kind: ToolKind) -> Vec<ToolEntry> {
    tools.iter().filter(|e| !e.is_kind(kind)).cloned().collect()
}

/// Keep every non-custom entry in order, then append the rebuilt custom
/// tools in the order given. Duplicate names are kept.
pub fn replace_custom(tools: &[ToolEntry], list: &[CustomFunction]) -> Vec<ToolEntry> {
    tools
        .iter()
        .filter(|e| !e.is_kind(ToolKind::Custom))
        .cloned()
        .chain(list.iter().map(|f| Tool::Custom(custom_tool(f)).into()))
        .collect()
}

pub fn custom_tool(f: &CustomFunction) -> CustomTool {
    CustomTool {
        name: f.name.clone(),
        description: f.description.clone(),
        url: f.endpoint_url.clone(),
        method: f.method,
        headers: collapse_headers(&f.headers),
        timeout_ms: f.timeout_ms,
        speak_during_execution: f.speak_during_execution,
        speak_after_execution: f.speak_after_execution,
        execution_message_description: f.speak_during_message.clone(),
        parameters: parse_parameters(&f.name, &f.parameters_json),
    }
}

/// Entry order is kept. Blank keys are dropped; a repeated key keeps its
/// first position and its last value.
pub fn collapse_headers(pairs: &[HeaderPair]) -> Headers {
    pairs
        .iter()
        .filter(|p| !p.key.trim().is_empty())
        .map(|p| (p.key.trim(), p.value.as_str()))
        .collect()
}

fn parse_parameters(name: &str, raw: &str) -> Option<serde_json::Value> {
    if raw.trim().is_empty() {
        return None;
    }
    match serde_json::from_str(raw) {
        Ok(v) => Some(v),
        Err(e) => {
            tracing::warn!(function = name, error = %e, "dropping unparseable parameter schema");
            None
        }
    }
}
