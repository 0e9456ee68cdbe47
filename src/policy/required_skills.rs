//! RequiredSkillsPolicy — determines what skills / position a manager must have.

use std::collections::HashSet;

use crate::domain::{Language, Position, Segment, TicketType};

/// Result of evaluating the policy for a given ticket.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SkillRequirement {
    pub required_skills: HashSet<String>,
    /// `None` means any position is fine.
    pub min_position: Option<Position>,
}

/// Pure function: given ticket attributes, return skill/position requirements.
///
/// Rules are additive: a VIP ticket in Kazakh requires both "VIP" and "KZ".
pub fn determine_required_skills(
    segment: Segment,
    ticket_type: TicketType,
    language: Language,
) -> SkillRequirement {
    let mut skills = HashSet::new();
    let mut min_position = None;

    if matches!(segment, Segment::VIP | Segment::Priority) {
        skills.insert("VIP".to_string());
    }

    if ticket_type == TicketType::DataChange {
        min_position = Some(Position::ChiefSpecialist);
    }

    match language {
        Language::KZ => {
            skills.insert("KZ".to_string());
        }
        Language::ENG => {
            skills.insert("ENG".to_string());
        }
        Language::RU => {}
    }

    SkillRequirement { required_skills: skills, min_position }
}

/// Check whether a manager meets the requirement.
pub fn manager_satisfies(
    manager_skills: &HashSet<String>,
    manager_position: Position,
    requirement: &SkillRequirement,
) -> bool {
    if !requirement.required_skills.is_subset(manager_skills) {
        return false;
    }

    if requirement.min_position == Some(Position::ChiefSpecialist) && manager_position != Position::ChiefSpecialist {
        return false;
    }

    true
}
