//! Phone-number assignment diff computed at publish time.

use callie_client::{PhoneAssignmentUpdate, PhoneNumberDto};

/// Compute the updates that make `inbound`/`outbound` the only numbers
/// routed to `agent_id` in each direction.
///
/// A number keeps assignments that belong to other agents unless it is the
/// one being selected. One update is produced per number whose inbound or
/// outbound assignment actually changes.
pub fn plan_assignments(
    phones: &[PhoneNumberDto],
    agent_id: &str,
    inbound: Option<&str>,
    outbound: Option<&str>,
) -> Vec<PhoneAssignmentUpdate> {
    phones
        .iter()
        .filter_map(|phone| {
            let next_inbound = assign(
                &phone.phone_number,
                phone.inbound_agent_id.as_deref(),
                agent_id,
                inbound,
            );
            let next_outbound = assign(
                &phone.phone_number,
                phone.outbound_agent_id.as_deref(),
                agent_id,
                outbound,
            );

            let unchanged = next_inbound.as_deref() == phone.inbound_agent_id.as_deref()
                && next_outbound.as_deref() == phone.outbound_agent_id.as_deref();
            (!unchanged).then(|| PhoneAssignmentUpdate {
                phone_number: phone.phone_number.clone(),
                inbound_agent_id: next_inbound,
                outbound_agent_id: next_outbound,
            })
        })
        .collect()
}

fn assign(
    number: &str,
    current: Option<&str>,
    agent_id: &str,
    selected: Option<&str>,
) -> Option<String> {
    if selected == Some(number) {
        Some(agent_id.to_owned())
    } else if current == Some(agent_id) {
        None
    } else {
        current.map(str::to_owned)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn phone(number: &str, inbound: Option<&str>, outbound: Option<&str>) -> PhoneNumberDto {
        PhoneNumberDto {
            phone_number: number.into(),
            inbound_agent_id: inbound.map(Into::into),
            outbound_agent_id: outbound.map(Into::into),
            ..Default::default()
        }
    }

    #[test]
    fn assigns_selected_and_releases_previous() {
        let phones = vec![
            phone("+1001", Some("agent-a"), None),
            phone("+1002", None, Some("agent-a")),
            phone("+1003", Some("agent-b"), Some("agent-b")),
        ];

        let updates = plan_assignments(&phones, "agent-a", Some("+1003"), Some("+1003"));

        assert_eq!(
            updates,
            vec![
                PhoneAssignmentUpdate {
                    phone_number: "+1001".into(),
                    inbound_agent_id: None,
                    outbound_agent_id: None,
                },
                PhoneAssignmentUpdate {
                    phone_number: "+1002".into(),
                    inbound_agent_id: None,
                    outbound_agent_id: None,
                },
                PhoneAssignmentUpdate {
                    phone_number: "+1003".into(),
                    inbound_agent_id: Some("agent-a".into()),
                    outbound_agent_id: Some("agent-a".into()),
                },
            ]
        );
    }

    #[test]
    fn unchanged_numbers_produce_no_update() {
        let phones = vec![
            phone("+1001", Some("agent-a"), None),
            phone("+1002", Some("agent-b"), None),
        ];
        let updates = plan_assignments(&phones, "agent-a", Some("+1001"), None);
        assert!(updates.is_empty());
    }

    #[test]
    fn other_direction_is_preserved() {
        let phones = vec![phone("+1001", Some("agent-b"), Some("agent-b"))];
        let updates = plan_assignments(&phones, "agent-a", Some("+1001"), None);
        assert_eq!(
            updates,
            vec![PhoneAssignmentUpdate {
                phone_number: "+1001".into(),
                inbound_agent_id: Some("agent-a".into()),
                outbound_agent_id: Some("agent-b".into()),
            }]
        );
    }

    #[test]
    fn clearing_selection_unassigns() {
        let phones = vec![phone("+1001", Some("agent-a"), Some("agent-a"))];
        let updates = plan_assignments(&phones, "agent-a", None, None);
        assert_eq!(updates.len(), 1);
        assert_eq!(updates[0].inbound_agent_id, None);
        assert_eq!(updates[0].outbound_agent_id, None);
    }
}
