//! User profile and the forms that create and edit it.

use std::fmt;
use std::str::FromStr;

pub const DEFAULT_AGE: u8 = 25;
pub const DEFAULT_LEVEL: u8 = 5;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ExperienceLevel {
    Beginner,
    #[default]
    Intermediate,
    Advanced,
}

impl ExperienceLevel {
    pub const ALL: [ExperienceLevel; 3] = [
        ExperienceLevel::Beginner,
        ExperienceLevel::Intermediate,
        ExperienceLevel::Advanced,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            ExperienceLevel::Beginner => "beginner",
            ExperienceLevel::Intermediate => "intermediate",
            ExperienceLevel::Advanced => "advanced",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Tone {
    #[default]
    Academic,
    Simplified,
}

impl Tone {
    pub const ALL: [Tone; 2] = [Tone::Academic, Tone::Simplified];

    pub fn as_str(self) -> &'static str {
        match self {
            Tone::Academic => "academic",
            Tone::Simplified => "simplified",
        }
    }
}

macro_rules! impl_str_enum {
    ($ty:ty, $what:literal) => {
        impl fmt::Display for $ty {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(self.as_str())
            }
        }

        impl FromStr for $ty {
            type Err = String;

            fn from_str(value: &str) -> Result<Self, Self::Err> {
                let value = value.trim();
                <$ty>::ALL
                    .into_iter()
                    .find(|item| item.as_str().eq_ignore_ascii_case(value))
                    .ok_or_else(|| {
                        let options: Vec<&str> =
                            <$ty>::ALL.iter().map(|item| item.as_str()).collect();
                        format!("Unknown {}: {value} (choose {})", $what, options.join(", "))
                    })
            }
        }
    };
}

impl_str_enum!(ExperienceLevel, "experience level");
impl_str_enum!(Tone, "tone");

/// Age in years, 1 to 120.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct Age(u8);

impl Age {
    pub const MIN: u8 = 1;
    pub const MAX: u8 = 120;

    pub fn get(self) -> u8 {
        self.0
    }
}

impl Default for Age {
    fn default() -> Self {
        Age(DEFAULT_AGE)
    }
}

impl TryFrom<u32> for Age {
    type Error = String;

    fn try_from(value: u32) -> Result<Self, Self::Error> {
        if (u32::from(Self::MIN)..=u32::from(Self::MAX)).contains(&value) {
            Ok(Age(value as u8))
        } else {
            Err(format!("Age must be between {} and {}", Self::MIN, Self::MAX))
        }
    }
}

impl fmt::Display for Age {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A 1-10 slider value (creativity, output length).
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct Level(u8);

impl Level {
    pub const MIN: u8 = 1;
    pub const MAX: u8 = 10;

    pub fn get(self) -> u8 {
        self.0
    }
}

impl Default for Level {
    fn default() -> Self {
        Level(DEFAULT_LEVEL)
    }
}

impl TryFrom<u32> for Level {
    type Error = String;

    fn try_from(value: u32) -> Result<Self, Self::Error> {
        if (u32::from(Self::MIN)..=u32::from(Self::MAX)).contains(&value) {
            Ok(Level(value as u8))
        } else {
            Err(format!("Level must be between {} and {}", Self::MIN, Self::MAX))
        }
    }
}

impl fmt::Display for Level {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UserProfile {
    pub name: String,
    pub email: String,
    pub age: Age,
    pub experience: ExperienceLevel,
    pub tone: Tone,
    pub creativity: Level,
    pub length: Level,
}

/// Values entered on the login page.
///
/// The password is accepted for form parity but never stored or checked.
#[derive(Clone, Default)]
pub struct ProfileForm {
    pub name: String,
    pub email: String,
    pub password: String,
    pub age: Age,
    pub experience: ExperienceLevel,
    pub creativity: Level,
    pub length: Level,
    pub tone: Tone,
}

impl ProfileForm {
    /// Build the profile; name and email are required.
    pub fn into_profile(self) -> Result<UserProfile, String> {
        if self.name.trim().is_empty() || self.email.trim().is_empty() {
            return Err("Please fill in Name and Email".to_string());
        }
        Ok(UserProfile {
            name: self.name,
            email: self.email,
            age: self.age,
            experience: self.experience,
            tone: self.tone,
            creativity: self.creativity,
            length: self.length,
        })
    }
}

impl fmt::Debug for ProfileForm {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ProfileForm")
            .field("name", &self.name)
            .field("email", &self.email)
            .field("password", &"<redacted>")
            .field("age", &self.age)
            .field("experience", &self.experience)
            .field("creativity", &self.creativity)
            .field("length", &self.length)
            .field("tone", &self.tone)
            .finish()
    }
}

/// Fields editable from the settings panel. Email is fixed at login.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProfileSettings {
    pub name: String,
    pub age: Age,
    pub experience: ExperienceLevel,
    pub creativity: Level,
    pub length: Level,
    pub tone: Tone,
}

impl UserProfile {
    pub fn settings(&self) -> ProfileSettings {
        ProfileSettings {
            name: self.name.clone(),
            age: self.age,
            experience: self.experience,
            creativity: self.creativity,
            length: self.length,
            tone: self.tone,
        }
    }

    pub fn apply_settings(&mut self, settings: ProfileSettings) {
        self.name = settings.name;
        self.age = settings.age;
        self.experience = settings.experience;
        self.creativity = settings.creativity;
        self.length = settings.length;
        self.tone = settings.tone;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn form_defaults_match_login_widgets() {
        let form = ProfileForm::default();
        assert_eq!(form.age.get(), 25);
        assert_eq!(form.experience, ExperienceLevel::Intermediate);
        assert_eq!(form.creativity.get(), 5);
        assert_eq!(form.length.get(), 5);
        assert_eq!(form.tone, Tone::Academic);
    }

    #[test]
    fn name_and_email_are_required() {
        let form = ProfileForm {
            name: "Ada".to_string(),
            ..ProfileForm::default()
        };
        assert_eq!(
            form.into_profile().unwrap_err(),
            "Please fill in Name and Email"
        );

        let form = ProfileForm {
            name: "   ".to_string(),
            email: "a@b.com".to_string(),
            ..ProfileForm::default()
        };
        assert!(form.into_profile().is_err());
    }

    #[test]
    fn password_is_not_kept_on_profile() {
        let profile = ProfileForm {
            name: "Ada".to_string(),
            email: "a@b.com".to_string(),
            password: "hunter2".to_string(),
            ..ProfileForm::default()
        }
        .into_profile()
        .unwrap();
        assert!(!format!("{profile:?}").contains("hunter2"));
    }

    #[test]
    fn bounded_values_reject_out_of_range_input() {
        assert!(Age::try_from(0).is_err());
        assert!(Age::try_from(121).is_err());
        assert_eq!(Age::try_from(120).unwrap().get(), 120);
        assert!(Level::try_from(0).is_err());
        assert!(Level::try_from(11).is_err());
        assert_eq!(Level::try_from(1).unwrap().get(), 1);
    }

    #[test]
    fn enums_parse_case_insensitively() {
        assert_eq!(
            "Advanced".parse::<ExperienceLevel>().unwrap(),
            ExperienceLevel::Advanced
        );
        assert_eq!("simplified".parse::<Tone>().unwrap(), Tone::Simplified);
        let err = "expert".parse::<ExperienceLevel>().unwrap_err();
        assert!(err.contains("beginner, intermediate, advanced"));
    }

    #[test]
    fn settings_round_trip_leaves_email_alone() {
        let mut profile = ProfileForm {
            name: "Ada".to_string(),
            email: "a@b.com".to_string(),
            ..ProfileForm::default()
        }
        .into_profile()
        .unwrap();

        let mut settings = profile.settings();
        settings.name = "Ada L.".to_string();
        settings.tone = Tone::Simplified;
        settings.creativity = Level::try_from(9).unwrap();
        profile.apply_settings(settings);

        assert_eq!(profile.name, "Ada L.");
        assert_eq!(profile.email, "a@b.com");
        assert_eq!(profile.tone, Tone::Simplified);
        assert_eq!(profile.creativity.get(), 9);
    }
}
