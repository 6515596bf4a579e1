//! Pure filters over the cached task list.

mod matching;
mod recommend;

pub use matching::*;
pub use recommend::*;

#[cfg(test)]
pub(crate) fn test_task(
    id: &str,
    title: &str,
    cause_area: crate::models::CauseArea,
    skills: &[crate::models::Skill],
    location: &str,
) -> crate::models::Task {
    use crate::models::{NgoSummary, Task, TaskStatus};

    Task {
        id: id.to_string(),
        ngo_id: "ngo-1".to_string(),
        ngo: NgoSummary {
            organization_name: "Hope Foundation".to_string(),
            city: "Mumbai".to_string(),
            logo: None,
        },
        title: title.to_string(),
        description: format!("{} volunteers wanted for a community programme.", title),
        cause_area,
        required_skills: skills.to_vec(),
        location: location.to_string(),
        hours_per_week: 5,
        duration_months: 6,
        status: TaskStatus::Active,
        created_at: "2024-01-15T00:00:00.000000Z".to_string(),
        updated_at: "2024-01-15T00:00:00.000000Z".to_string(),
    }
}

#[cfg(test)]
pub(crate) fn test_volunteer(
    city: &str,
    skills: &[crate::models::Skill],
) -> crate::models::VolunteerProfile {
    crate::models::VolunteerProfile {
        id: "vol-1".to_string(),
        first_name: "Priya".to_string(),
        last_name: "Sharma".to_string(),
        phone: "+91 98765 43211".to_string(),
        city: city.to_string(),
        bio: None,
        skills: skills.to_vec(),
        availability: None,
        profile_photo: None,
        created_at: "2024-02-10T00:00:00.000000Z".to_string(),
        updated_at: "2024-02-10T00:00:00.000000Z".to_string(),
    }
}
