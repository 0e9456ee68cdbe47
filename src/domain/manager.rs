//! Manager entity — an employee who handles tickets.

use std::collections::HashSet;

use super::enums::Position;

#[derive(Debug, Clone)]
pub struct Manager {
    pub id: i32,
    pub name: String,
    pub position: Position,
    pub office_id: i32,
    pub skills: HashSet<String>,
    pub current_load: i32,
}

impl Manager {
    pub fn has_skill(&self, skill: &str) -> bool {
        self.skills.contains(skill)
    }

    pub fn is_chief_specialist(&self) -> bool {
        matches!(self.position, Position::ChiefSpecialist)
    }
}
