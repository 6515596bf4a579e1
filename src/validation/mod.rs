//! Form validation for registration and task forms.
//!
//! Runs before any backend call. Each check contributes a `FieldError`; a form
//! with any errors is rejected as a whole with every error listed.

use validator::{ValidateEmail, ValidateUrl};

use crate::errors::{AppError, FieldError};
use crate::models::{
    is_known_city, CauseArea, CreateTaskRequest, NgoRegistration, RegisterNgoRequest,
    RegisterVolunteerRequest, Skill, TaskChanges, TaskDraft, TaskStatus, UpdateTaskRequest,
    VolunteerRegistration,
};

pub const MIN_PASSWORD_LEN: usize = 8;
pub const MIN_PHONE_LEN: usize = 10;
pub const MIN_ORGANIZATION_NAME_LEN: usize = 3;
pub const MIN_NGO_DESCRIPTION_LEN: usize = 50;
pub const MAX_BIO_LEN: usize = 200;
pub const MIN_TASK_TITLE_LEN: usize = 10;
pub const MIN_TASK_DESCRIPTION_LEN: usize = 100;
pub const HOURS_PER_WEEK: std::ops::RangeInclusive<i64> = 1..=40;
pub const DURATION_MONTHS: std::ops::RangeInclusive<i64> = 1..=24;

/// Collects field errors for one form.
#[derive(Debug, Default)]
struct Checker {
    fields: Vec<FieldError>,
}

impl Checker {
    fn check(&mut self, ok: bool, field: &str, message: &str) {
        if !ok {
            self.fields.push(FieldError::new(field, message));
        }
    }

    fn min_len(&mut self, value: &str, min: usize, field: &str, message: &str) {
        self.check(value.trim().chars().count() >= min, field, message);
    }

    fn email(&mut self, value: &str) {
        self.check(is_valid_email(value), "email", "Invalid email address");
    }

    fn password(&mut self, password: &str, confirm: &str) {
        self.check(
            password.chars().count() >= MIN_PASSWORD_LEN,
            "password",
            "Password must be at least 8 characters",
        );
        self.check(password == confirm, "confirmPassword", "Passwords don't match");
    }

    fn city(&mut self, value: &str, field: &str, message: &str) {
        self.check(is_known_city(value.trim()), field, message);
    }

    fn finish<T>(self, form: &str, value: T) -> Result<T, AppError> {
        if self.fields.is_empty() {
            Ok(value)
        } else {
            Err(AppError::Validation {
                message: format!("{} is invalid", form),
                fields: self.fields,
            })
        }
    }
}

/// An address the form accepts: well-formed, with a dotted domain.
pub fn is_valid_email(email: &str) -> bool {
    let email = email.trim();
    email.validate_email()
        && email
            .rsplit_once('@')
            .is_some_and(|(_, domain)| domain.contains('.'))
}

/// An absolute http(s) URL.
pub fn is_valid_url(url: &str) -> bool {
    (url.starts_with("https://") || url.starts_with("http://")) && url.validate_url()
}

fn non_blank(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

fn parse_list<T: Copy + PartialEq>(
    names: &[String],
    parse: fn(&str) -> Option<T>,
    checker: &mut Checker,
    field: &str,
    empty_message: &str,
) -> Vec<T> {
    let mut parsed = Vec::new();
    for name in names {
        match parse(name.trim()) {
            Some(item) if !parsed.contains(&item) => parsed.push(item),
            Some(_) => {}
            None => checker.check(false, field, &format!("Unknown value {:?}", name)),
        }
    }
    checker.check(!names.is_empty(), field, empty_message);
    parsed
}

/// Validate the NGO sign-up form.
pub fn validate_ngo_registration(req: RegisterNgoRequest) -> Result<NgoRegistration, AppError> {
    let mut c = Checker::default();

    c.min_len(
        &req.organization_name,
        MIN_ORGANIZATION_NAME_LEN,
        "organizationName",
        "Organization name must be at least 3 characters",
    );
    c.min_len(&req.contact_person, 1, "contactPerson", "Contact person name is required");
    c.email(&req.email);
    c.password(&req.password, &req.confirm_password);
    c.min_len(&req.phone, MIN_PHONE_LEN, "phone", "Phone number must be at least 10 characters");
    c.city(&req.city, "city", "Please select a city");
    c.min_len(
        &req.description,
        MIN_NGO_DESCRIPTION_LEN,
        "description",
        "Description must be at least 50 characters",
    );
    let cause_areas = parse_list(
        &req.cause_areas,
        CauseArea::parse,
        &mut c,
        "causeAreas",
        "Please select at least one cause area",
    );
    let website = non_blank(req.website);
    if let Some(url) = &website {
        c.check(is_valid_url(url), "website", "Invalid URL");
    }

    c.finish(
        "NGO registration",
        NgoRegistration {
            email: req.email.trim().to_string(),
            password: req.password,
            organization_name: req.organization_name.trim().to_string(),
            contact_person: req.contact_person.trim().to_string(),
            phone: req.phone.trim().to_string(),
            city: req.city.trim().to_string(),
            description: req.description.trim().to_string(),
            cause_areas,
            website,
            logo: non_blank(req.logo),
        },
    )
}

/// Validate the volunteer sign-up form.
pub fn validate_volunteer_registration(
    req: RegisterVolunteerRequest,
) -> Result<VolunteerRegistration, AppError> {
    let mut c = Checker::default();

    c.min_len(&req.first_name, 1, "firstName", "First name is required");
    c.min_len(&req.last_name, 1, "lastName", "Last name is required");
    c.email(&req.email);
    c.password(&req.password, &req.confirm_password);
    c.min_len(&req.phone, MIN_PHONE_LEN, "phone", "Phone number must be at least 10 characters");
    c.city(&req.city, "city", "Please select a city");
    let bio = non_blank(req.bio);
    if let Some(bio) = &bio {
        c.check(
            bio.chars().count() <= MAX_BIO_LEN,
            "bio",
            "Bio must be less than 200 characters",
        );
    }
    let skills = parse_list(
        &req.skills,
        Skill::parse,
        &mut c,
        "skills",
        "Please select at least one skill",
    );

    c.finish(
        "Volunteer registration",
        VolunteerRegistration {
            email: req.email.trim().to_string(),
            password: req.password,
            first_name: req.first_name.trim().to_string(),
            last_name: req.last_name.trim().to_string(),
            phone: req.phone.trim().to_string(),
            city: req.city.trim().to_string(),
            bio,
            skills,
            availability: non_blank(req.availability),
            profile_photo: non_blank(req.profile_photo),
        },
    )
}

/// Validate the create-task form.
pub fn validate_task(req: CreateTaskRequest) -> Result<TaskDraft, AppError> {
    let mut c = Checker::default();

    check_title(&mut c, &req.title);
    check_description(&mut c, &req.description);
    let cause_area = CauseArea::parse(req.cause_area.trim());
    c.check(cause_area.is_some(), "causeArea", "Please select a cause area");
    let required_skills = parse_list(
        &req.required_skills,
        Skill::parse,
        &mut c,
        "requiredSkills",
        "Please select at least one skill",
    );
    c.city(&req.location, "location", "Please select a location");
    check_hours(&mut c, req.hours_per_week);
    check_duration(&mut c, req.duration_months);

    let checked = c.finish("Task", cause_area)?;
    let Some(cause_area) = checked else {
        return Err(AppError::validation("Please select a cause area"));
    };
    Ok(TaskDraft {
        title: req.title.trim().to_string(),
        description: req.description.trim().to_string(),
        cause_area,
        required_skills,
        location: req.location.trim().to_string(),
        hours_per_week: req.hours_per_week,
        duration_months: req.duration_months,
    })
}

/// Validate a partial task update; only present fields are checked.
pub fn validate_task_update(req: UpdateTaskRequest) -> Result<TaskChanges, AppError> {
    let mut c = Checker::default();
    let mut changes = TaskChanges::default();

    if let Some(title) = req.title {
        check_title(&mut c, &title);
        changes.title = Some(title.trim().to_string());
    }
    if let Some(description) = req.description {
        check_description(&mut c, &description);
        changes.description = Some(description.trim().to_string());
    }
    if let Some(name) = req.cause_area {
        changes.cause_area = CauseArea::parse(name.trim());
        c.check(changes.cause_area.is_some(), "causeArea", "Please select a cause area");
    }
    if let Some(names) = req.required_skills {
        changes.required_skills = Some(parse_list(
            &names,
            Skill::parse,
            &mut c,
            "requiredSkills",
            "Please select at least one skill",
        ));
    }
    if let Some(location) = req.location {
        c.city(&location, "location", "Please select a location");
        changes.location = Some(location.trim().to_string());
    }
    if let Some(hours) = req.hours_per_week {
        check_hours(&mut c, hours);
        changes.hours_per_week = Some(hours);
    }
    if let Some(months) = req.duration_months {
        check_duration(&mut c, months);
        changes.duration_months = Some(months);
    }
    if let Some(status) = req.status {
        changes.status = TaskStatus::parse(status.trim());
        c.check(
            changes.status.is_some(),
            "status",
            "Status must be active or inactive",
        );
    }

    c.check(!changes.is_empty() || !c.fields.is_empty(), "task", "No changes provided");
    c.finish("Task update", changes)
}

fn check_title(c: &mut Checker, title: &str) {
    c.min_len(
        title,
        MIN_TASK_TITLE_LEN,
        "title",
        "Task title must be at least 10 characters",
    );
}

fn check_description(c: &mut Checker, description: &str) {
    c.min_len(
        description,
        MIN_TASK_DESCRIPTION_LEN,
        "description",
        "Description must be at least 100 characters",
    );
}

fn check_hours(c: &mut Checker, hours: i64) {
    c.check(
        HOURS_PER_WEEK.contains(&hours),
        "hoursPerWeek",
        "Hours per week must be between 1 and 40",
    );
}

fn check_duration(c: &mut Checker, months: i64) {
    c.check(
        DURATION_MONTHS.contains(&months),
        "durationMonths",
        "Duration must be between 1 and 24 months",
    );
}

#[cfg(test)]
mod tests {
    use super::*;

    fn field_names(err: AppError) -> Vec<String> {
        match err {
            AppError::Validation { fields, .. } => fields.into_iter().map(|f| f.field).collect(),
            other => panic!("expected validation error, got {other}"),
        }
    }

    fn ngo_form() -> RegisterNgoRequest {
        RegisterNgoRequest {
            organization_name: "Hope Foundation".to_string(),
            contact_person: "Rajesh Kumar".to_string(),
            email: "ngo@example.com".to_string(),
            password: "password123".to_string(),
            confirm_password: "password123".to_string(),
            phone: "+91 98765 43210".to_string(),
            city: "Mumbai".to_string(),
            description: "Empowering communities through education and healthcare since 2015."
                .to_string(),
            cause_areas: vec!["Education & Literacy".to_string()],
            website: Some("".to_string()),
            logo: None,
        }
    }

    fn task_form() -> CreateTaskRequest {
        CreateTaskRequest {
            title: "English Teacher for Children".to_string(),
            description: "We are looking for passionate volunteers to teach English to children \
                          from underprivileged backgrounds in our community centre."
                .to_string(),
            cause_area: "Education & Literacy".to_string(),
            required_skills: vec!["Teaching & Tutoring".to_string()],
            location: "Mumbai".to_string(),
            hours_per_week: 5,
            duration_months: 6,
        }
    }

    #[test]
    fn test_valid_ngo_registration() {
        let reg = validate_ngo_registration(ngo_form()).unwrap();
        assert_eq!(reg.cause_areas, vec![CauseArea::EducationLiteracy]);
        assert_eq!(reg.website, None);
    }

    #[test]
    fn test_ngo_registration_reports_every_field() {
        let mut form = ngo_form();
        form.organization_name = "AB".to_string();
        form.confirm_password = "different".to_string();
        form.city = "Atlantis".to_string();
        form.cause_areas.clear();
        form.website = Some("hopefoundation.org".to_string());

        let fields = field_names(validate_ngo_registration(form).unwrap_err());
        assert_eq!(
            fields,
            vec!["organizationName", "confirmPassword", "city", "causeAreas", "website"]
        );
    }

    #[test]
    fn test_volunteer_bio_limit_and_skills() {
        let form = RegisterVolunteerRequest {
            first_name: "Priya".to_string(),
            last_name: "Sharma".to_string(),
            email: "volunteer@example.com".to_string(),
            password: "password123".to_string(),
            confirm_password: "password123".to_string(),
            phone: "+91 98765 43211".to_string(),
            city: "Bangalore".to_string(),
            bio: Some("x".repeat(201)),
            skills: vec!["Teaching & Tutoring".to_string(), "Juggling".to_string()],
            availability: Some("Weekends".to_string()),
            profile_photo: None,
        };

        let fields = field_names(validate_volunteer_registration(form.clone()).unwrap_err());
        assert_eq!(fields, vec!["bio", "skills"]);

        let ok = RegisterVolunteerRequest {
            bio: Some("x".repeat(200)),
            skills: vec!["Teaching & Tutoring".to_string()],
            ..form
        };
        let reg = validate_volunteer_registration(ok).unwrap();
        assert_eq!(reg.skills, vec![Skill::TeachingTutoring]);
    }

    #[test]
    fn test_task_ranges() {
        assert!(validate_task(task_form()).is_ok());

        let mut form = task_form();
        form.hours_per_week = 41;
        form.duration_months = 0;
        form.title = "Short".to_string();
        let fields = field_names(validate_task(form).unwrap_err());
        assert_eq!(fields, vec!["title", "hoursPerWeek", "durationMonths"]);

        let mut form = task_form();
        form.hours_per_week = 40;
        form.duration_months = 24;
        form.location = "Remote".to_string();
        assert!(validate_task(form).is_ok());
    }

    #[test]
    fn test_task_update_checks_present_fields_only() {
        let changes = validate_task_update(UpdateTaskRequest {
            status: Some("inactive".to_string()),
            ..Default::default()
        })
        .unwrap();
        assert_eq!(changes.status, Some(TaskStatus::Inactive));
        assert_eq!(changes.title, None);

        let fields = field_names(
            validate_task_update(UpdateTaskRequest {
                hours_per_week: Some(0),
                ..Default::default()
            })
            .unwrap_err(),
        );
        assert_eq!(fields, vec!["hoursPerWeek"]);

        let fields = field_names(validate_task_update(UpdateTaskRequest::default()).unwrap_err());
        assert_eq!(fields, vec!["task"]);
    }

    #[test]
    fn test_email_and_url_shapes() {
        assert!(is_valid_email("ngo@example.com"));
        assert!(!is_valid_email("ngo@example"));
        assert!(!is_valid_email("@example.com"));
        assert!(!is_valid_email("ngo@@example.com"));
        assert!(!is_valid_email("ngo @example.com"));
        assert!(is_valid_email(" Ngo@Example.com "));
        assert!(is_valid_url("https://hopefoundation.org"));
        assert!(is_valid_url("http://hopefoundation.org/about"));
        assert!(!is_valid_url("ftp://hopefoundation.org"));
        assert!(!is_valid_url("https://"));
        assert!(!is_valid_url("https://hope foundation.org"));
    }
}
