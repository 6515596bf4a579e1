//! NGO and volunteer profiles, and the role-tagged user identity.

use serde::{Deserialize, Serialize};

use super::{CauseArea, Skill};

/// Account role. Each authenticated identity owns exactly one profile row of its role.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    Ngo,
    Volunteer,
}

impl Role {
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::Ngo => "ngo",
            Role::Volunteer => "volunteer",
        }
    }
}

/// Profile row in `ngo_profiles`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NgoProfile {
    pub id: String,
    pub organization_name: String,
    pub contact_person: String,
    pub phone: String,
    pub city: String,
    pub description: String,
    pub cause_areas: Vec<CauseArea>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub website: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub logo: Option<String>,
    pub created_at: String,
    pub updated_at: String,
}

/// Profile row in `volunteer_profiles`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VolunteerProfile {
    pub id: String,
    pub first_name: String,
    pub last_name: String,
    pub phone: String,
    pub city: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub bio: Option<String>,
    pub skills: Vec<Skill>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub availability: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub profile_photo: Option<String>,
    pub created_at: String,
    pub updated_at: String,
}

/// The signed-in user, discriminated by role.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "role", rename_all = "lowercase")]
pub enum User {
    Ngo(NgoProfile),
    Volunteer(VolunteerProfile),
}

impl User {
    pub fn id(&self) -> &str {
        match self {
            User::Ngo(profile) => &profile.id,
            User::Volunteer(profile) => &profile.id,
        }
    }

    pub fn role(&self) -> Role {
        match self {
            User::Ngo(_) => Role::Ngo,
            User::Volunteer(_) => Role::Volunteer,
        }
    }

    pub fn as_ngo(&self) -> Option<&NgoProfile> {
        match self {
            User::Ngo(profile) => Some(profile),
            User::Volunteer(_) => None,
        }
    }

    pub fn as_volunteer(&self) -> Option<&VolunteerProfile> {
        match self {
            User::Volunteer(profile) => Some(profile),
            User::Ngo(_) => None,
        }
    }
}

/// Validated NGO sign-up data. The profile id is assigned by the backend identity.
#[derive(Debug, Clone)]
pub struct NgoRegistration {
    pub email: String,
    pub password: String,
    pub organization_name: String,
    pub contact_person: String,
    pub phone: String,
    pub city: String,
    pub description: String,
    pub cause_areas: Vec<CauseArea>,
    pub website: Option<String>,
    pub logo: Option<String>,
}

impl NgoRegistration {
    pub fn into_profile(self, id: String, now: String) -> NgoProfile {
        NgoProfile {
            id,
            organization_name: self.organization_name,
            contact_person: self.contact_person,
            phone: self.phone,
            city: self.city,
            description: self.description,
            cause_areas: self.cause_areas,
            website: self.website,
            logo: self.logo,
            created_at: now.clone(),
            updated_at: now,
        }
    }
}

/// Validated volunteer sign-up data.
#[derive(Debug, Clone)]
pub struct VolunteerRegistration {
    pub email: String,
    pub password: String,
    pub first_name: String,
    pub last_name: String,
    pub phone: String,
    pub city: String,
    pub bio: Option<String>,
    pub skills: Vec<Skill>,
    pub availability: Option<String>,
    pub profile_photo: Option<String>,
}

impl VolunteerRegistration {
    pub fn into_profile(self, id: String, now: String) -> VolunteerProfile {
        VolunteerProfile {
            id,
            first_name: self.first_name,
            last_name: self.last_name,
            phone: self.phone,
            city: self.city,
            bio: self.bio,
            skills: self.skills,
            availability: self.availability,
            profile_photo: self.profile_photo,
            created_at: now.clone(),
            updated_at: now,
        }
    }
}

/// Request body for `POST /api/auth/register/ngo`.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct RegisterNgoRequest {
    pub organization_name: String,
    pub contact_person: String,
    pub email: String,
    pub password: String,
    pub confirm_password: String,
    pub phone: String,
    pub city: String,
    pub description: String,
    pub cause_areas: Vec<String>,
    pub website: Option<String>,
    pub logo: Option<String>,
}

/// Request body for `POST /api/auth/register/volunteer`.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct RegisterVolunteerRequest {
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub password: String,
    pub confirm_password: String,
    pub phone: String,
    pub city: String,
    pub bio: Option<String>,
    pub skills: Vec<String>,
    pub availability: Option<String>,
    pub profile_photo: Option<String>,
}

/// Request body for `POST /api/auth/login`.
#[derive(Debug, Clone, Deserialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
    pub role: Role,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_user_serializes_with_role_tag() {
        let user = User::Volunteer(VolunteerProfile {
            id: "vol-1".to_string(),
            first_name: "Priya".to_string(),
            last_name: "Sharma".to_string(),
            phone: "+91 98765 43211".to_string(),
            city: "Bangalore".to_string(),
            bio: None,
            skills: vec![Skill::TeachingTutoring],
            availability: Some("Weekends".to_string()),
            profile_photo: None,
            created_at: "2024-02-10T00:00:00+00:00".to_string(),
            updated_at: "2024-02-10T00:00:00+00:00".to_string(),
        });

        let json = serde_json::to_value(&user).unwrap();
        assert_eq!(json["role"], "volunteer");
        assert_eq!(json["firstName"], "Priya");
        assert_eq!(json["skills"][0], "Teaching & Tutoring");
        assert!(json.get("bio").is_none());

        let back: User = serde_json::from_value(json).unwrap();
        assert_eq!(back.role(), Role::Volunteer);
        assert_eq!(back.id(), "vol-1");
    }
}
