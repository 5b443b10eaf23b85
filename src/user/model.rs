use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use super::Id;

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Eq)]
pub struct User {
    pub id: Id,
    pub username: String,
    pub email: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub avatar: Option<String>,
    #[serde(flatten)]
    pub profile: Profile,
}

impl User {
    pub fn new(
        id: Id,
        username: impl Into<String>,
        email: impl Into<String>,
        avatar: Option<String>,
    ) -> Self {
        Self {
            id,
            username: username.into(),
            email: email.into(),
            avatar,
            profile: Profile::default(),
        }
    }

    pub fn with_profile(self, profile: Profile) -> Self {
        Self { profile, ..self }
    }
}

/// What the directory shows about a developer besides their handle.
#[derive(Serialize, Deserialize, Clone, Debug, Default, PartialEq, Eq)]
#[serde(rename_all = "camelCase", default)]
pub struct Profile {
    pub skills: Vec<String>,
    pub currently_studying: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub experience: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub specialization: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub registration_date: Option<NaiveDate>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub about_me: Option<String>,
}

#[derive(Deserialize, Clone, Debug)]
pub struct NewUser {
    pub username: String,
    pub email: String,
    #[serde(default)]
    pub avatar: Option<String>,
    #[serde(flatten)]
    pub profile: Profile,
}

/// Partial profile edit. Absent fields stay as they are.
#[derive(Deserialize, Clone, Debug, Default)]
#[serde(rename_all = "camelCase")]
pub struct ProfileUpdate {
    pub username: Option<String>,
    pub avatar: Option<String>,
    pub skills: Option<Vec<String>>,
    pub currently_studying: Option<Vec<String>>,
    pub experience: Option<String>,
    pub specialization: Option<String>,
    pub about_me: Option<String>,
}

impl ProfileUpdate {
    pub fn apply(self, user: User) -> User {
        let profile = user.profile;
        User {
            username: self.username.unwrap_or(user.username),
            avatar: self.avatar.or(user.avatar),
            profile: Profile {
                skills: self.skills.map(tidy).unwrap_or(profile.skills),
                currently_studying: self
                    .currently_studying
                    .map(tidy)
                    .unwrap_or(profile.currently_studying),
                experience: self.experience.or(profile.experience),
                specialization: self.specialization.or(profile.specialization),
                about_me: self.about_me.or(profile.about_me),
                ..profile
            },
            ..user
        }
    }
}

// trims entries and drops the blank ones
fn tidy(items: Vec<String>) -> Vec<String> {
    items
        .into_iter()
        .map(|s| s.trim().to_owned())
        .filter(|s| !s.is_empty())
        .collect()
}

/// Who is talking to whom. Callers only hand this out for a signed-in
/// session.
#[derive(Clone, Debug)]
pub struct Identity {
    pub current: Id,
    pub counterpart: Id,
    pub logged_in: bool,
}

impl Identity {
    pub fn new(current: Id, counterpart: Id) -> Self {
        Self {
            current,
            counterpart,
            logged_in: true,
        }
    }
}

fn strings(items: &[&str]) -> Vec<String> {
    items.iter().map(|s| s.to_string()).collect()
}

pub(super) fn sample_users() -> Vec<User> {
    vec![
        User::new(
            Id::from("1"),
            "john_dev",
            "john@example.com",
            Some("/lovable-uploads/71218a01-a00f-4c50-b88e-5016985aa63f.png".into()),
        )
        .with_profile(Profile {
            skills: strings(&["React", "TypeScript", "Node.js", "Express", "MongoDB"]),
            currently_studying: strings(&["GraphQL", "AWS"]),
            experience: Some("3-5".into()),
            specialization: Some("Full Stack Web Development".into()),
            registration_date: NaiveDate::from_ymd_opt(2023, 5, 15),
            about_me: Some("Full Stack Developer with 5 years of experience".into()),
        }),
        User::new(
            Id::from("2"),
            "jane_dev",
            "jane@example.com",
            Some("/lovable-uploads/a5c8f24b-7c7c-491f-8c25-b774ac29eea0.png".into()),
        )
        .with_profile(Profile {
            skills: strings(&["Python", "Django", "Flask", "PostgreSQL"]),
            currently_studying: strings(&["Docker", "Kubernetes"]),
            experience: Some("1-3".into()),
            specialization: Some("Backend Development".into()),
            registration_date: NaiveDate::from_ymd_opt(2023, 6, 22),
            about_me: Some("Backend Developer specializing in Python".into()),
        }),
    ]
}
