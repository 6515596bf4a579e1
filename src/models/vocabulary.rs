//! Fixed vocabularies shared by profiles, tasks and the filters.

use serde::{Deserialize, Serialize};

/// Location value for tasks that are not bound to a city.
pub const REMOTE: &str = "Remote";

/// Cities a profile or task may name. `Remote` is only meaningful for tasks
/// but is accepted everywhere.
pub const CITIES: [&str; 13] = [
    "Mumbai",
    "Delhi",
    "Bangalore",
    "Hyderabad",
    "Chennai",
    "Kolkata",
    "Pune",
    "Ahmedabad",
    "Jaipur",
    "Lucknow",
    "Surat",
    "Kochi",
    REMOTE,
];

pub fn is_known_city(city: &str) -> bool {
    CITIES.contains(&city)
}

/// Cause area an NGO works in and a task belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum CauseArea {
    #[serde(rename = "Education & Literacy")]
    EducationLiteracy,
    #[serde(rename = "Healthcare & Medical")]
    HealthcareMedical,
    #[serde(rename = "Environment & Wildlife")]
    EnvironmentWildlife,
    #[serde(rename = "Women Empowerment")]
    WomenEmpowerment,
    #[serde(rename = "Child Welfare")]
    ChildWelfare,
    #[serde(rename = "Elderly Care")]
    ElderlyCare,
    #[serde(rename = "Animal Welfare")]
    AnimalWelfare,
    #[serde(rename = "Community Development")]
    CommunityDevelopment,
    #[serde(rename = "Disaster Relief")]
    DisasterRelief,
    #[serde(rename = "Skill Development & Training")]
    SkillDevelopmentTraining,
}

impl CauseArea {
    pub const ALL: [CauseArea; 10] = [
        CauseArea::EducationLiteracy,
        CauseArea::HealthcareMedical,
        CauseArea::EnvironmentWildlife,
        CauseArea::WomenEmpowerment,
        CauseArea::ChildWelfare,
        CauseArea::ElderlyCare,
        CauseArea::AnimalWelfare,
        CauseArea::CommunityDevelopment,
        CauseArea::DisasterRelief,
        CauseArea::SkillDevelopmentTraining,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            CauseArea::EducationLiteracy => "Education & Literacy",
            CauseArea::HealthcareMedical => "Healthcare & Medical",
            CauseArea::EnvironmentWildlife => "Environment & Wildlife",
            CauseArea::WomenEmpowerment => "Women Empowerment",
            CauseArea::ChildWelfare => "Child Welfare",
            CauseArea::ElderlyCare => "Elderly Care",
            CauseArea::AnimalWelfare => "Animal Welfare",
            CauseArea::CommunityDevelopment => "Community Development",
            CauseArea::DisasterRelief => "Disaster Relief",
            CauseArea::SkillDevelopmentTraining => "Skill Development & Training",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|area| area.as_str() == s)
    }
}

/// Skill a volunteer offers and a task requires.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Skill {
    #[serde(rename = "Teaching & Tutoring")]
    TeachingTutoring,
    #[serde(rename = "Medical & Healthcare")]
    MedicalHealthcare,
    #[serde(rename = "Counseling & Mental Health")]
    CounselingMentalHealth,
    #[serde(rename = "Marketing & Communications")]
    MarketingCommunications,
    #[serde(rename = "Fundraising")]
    Fundraising,
    #[serde(rename = "Event Management")]
    EventManagement,
    #[serde(rename = "Administrative Support")]
    AdministrativeSupport,
    #[serde(rename = "Technical/IT Support")]
    TechnicalSupport,
    #[serde(rename = "Content Writing")]
    ContentWriting,
    #[serde(rename = "Graphic Design")]
    GraphicDesign,
    #[serde(rename = "Photography & Videography")]
    PhotographyVideography,
    #[serde(rename = "Social Media Management")]
    SocialMediaManagement,
    #[serde(rename = "Legal Assistance")]
    LegalAssistance,
    #[serde(rename = "Accounting & Finance")]
    AccountingFinance,
    #[serde(rename = "Manual Labor & Field Work")]
    ManualLaborFieldWork,
}

impl Skill {
    pub const ALL: [Skill; 15] = [
        Skill::TeachingTutoring,
        Skill::MedicalHealthcare,
        Skill::CounselingMentalHealth,
        Skill::MarketingCommunications,
        Skill::Fundraising,
        Skill::EventManagement,
        Skill::AdministrativeSupport,
        Skill::TechnicalSupport,
        Skill::ContentWriting,
        Skill::GraphicDesign,
        Skill::PhotographyVideography,
        Skill::SocialMediaManagement,
        Skill::LegalAssistance,
        Skill::AccountingFinance,
        Skill::ManualLaborFieldWork,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Skill::TeachingTutoring => "Teaching & Tutoring",
            Skill::MedicalHealthcare => "Medical & Healthcare",
            Skill::CounselingMentalHealth => "Counseling & Mental Health",
            Skill::MarketingCommunications => "Marketing & Communications",
            Skill::Fundraising => "Fundraising",
            Skill::EventManagement => "Event Management",
            Skill::AdministrativeSupport => "Administrative Support",
            Skill::TechnicalSupport => "Technical/IT Support",
            Skill::ContentWriting => "Content Writing",
            Skill::GraphicDesign => "Graphic Design",
            Skill::PhotographyVideography => "Photography & Videography",
            Skill::SocialMediaManagement => "Social Media Management",
            Skill::LegalAssistance => "Legal Assistance",
            Skill::AccountingFinance => "Accounting & Finance",
            Skill::ManualLaborFieldWork => "Manual Labor & Field Work",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|skill| skill.as_str() == s)
    }
}

/// All vocabularies, as served to clients building forms.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Vocabulary {
    pub cities: Vec<&'static str>,
    pub cause_areas: Vec<CauseArea>,
    pub skills: Vec<Skill>,
}

impl Vocabulary {
    pub fn current() -> Self {
        Self {
            cities: CITIES.to_vec(),
            cause_areas: CauseArea::ALL.to_vec(),
            skills: Skill::ALL.to_vec(),
        }
    }
}
