use serde::{Deserialize, Serialize};

pub const NOT_PROVIDED: &str = "Not provided";

fn or_not_provided(value: Option<&str>) -> String {
    value
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .unwrap_or(NOT_PROVIDED)
        .to_string()
}

/// Patient details attached to a user profile.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PatientRecord {
    pub id: i64,
    #[serde(default)]
    pub blood_group: Option<String>,
    #[serde(default)]
    pub height: Option<f64>,
    #[serde(default)]
    pub weight: Option<f64>,
    #[serde(default)]
    pub allergies: Option<String>,
    #[serde(default)]
    pub medical_history: Option<String>,
    #[serde(default)]
    pub emergency_contact_name: Option<String>,
    #[serde(default)]
    pub emergency_contact_number: Option<String>,
}

impl PatientRecord {
    /// `"168 cm • 60 kg"`, either half alone, or `None` when neither is known.
    pub fn measurements(&self) -> Option<String> {
        let height = self.height.map(|h| format!("{} cm", h));
        let weight = self.weight.map(|w| format!("{} kg", w));
        match (height, weight) {
            (Some(h), Some(w)) => Some(format!("{} • {}", h, w)),
            (Some(one), None) | (None, Some(one)) => Some(one),
            (None, None) => None,
        }
    }
}

/// `GET /users/user-profile`: the signed-in user plus their patient record.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UserProfile {
    pub id: i64,
    #[serde(default)]
    pub first_name: String,
    #[serde(default)]
    pub last_name: String,
    #[serde(default)]
    pub age: Option<u32>,
    #[serde(default)]
    pub gender: Option<String>,
    #[serde(default)]
    pub mobile_no: Option<String>,
    #[serde(default)]
    pub gmail: Option<String>,
    #[serde(default)]
    pub user_role: Option<String>,
    #[serde(default)]
    pub patient: Option<PatientRecord>,
}

impl UserProfile {
    pub fn full_name(&self) -> String {
        format!("{} {}", self.first_name.trim(), self.last_name.trim())
            .trim()
            .to_string()
    }

    pub fn display(&self) -> ProfileDisplay {
        let patient = self.patient.as_ref();
        ProfileDisplay {
            full_name: self.full_name(),
            personal: PersonalSection {
                age: self
                    .age
                    .map(|age| age.to_string())
                    .unwrap_or_else(|| NOT_PROVIDED.to_string()),
                gender: or_not_provided(self.gender.as_deref()),
                mobile_no: or_not_provided(self.mobile_no.as_deref()),
                email: or_not_provided(self.gmail.as_deref()),
            },
            medical: patient.map(|p| MedicalSection {
                blood_group: or_not_provided(p.blood_group.as_deref()),
                measurements: p.measurements().unwrap_or_else(|| NOT_PROVIDED.to_string()),
                allergies: or_not_provided(p.allergies.as_deref()),
                medical_history: p
                    .medical_history
                    .as_deref()
                    .map(str::trim)
                    .filter(|h| !h.is_empty())
                    .unwrap_or("No medical history recorded")
                    .to_string(),
            }),
            emergency: patient.map(|p| EmergencySection {
                contact_name: or_not_provided(p.emergency_contact_name.as_deref()),
                contact_number: or_not_provided(p.emergency_contact_number.as_deref()),
            }),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PersonalSection {
    pub age: String,
    pub gender: String,
    pub mobile_no: String,
    pub email: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MedicalSection {
    pub blood_group: String,
    pub measurements: String,
    pub allergies: String,
    pub medical_history: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EmergencySection {
    pub contact_name: String,
    pub contact_number: String,
}

/// The profile page's tabs, with blanks already filled in.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ProfileDisplay {
    pub full_name: String,
    pub personal: PersonalSection,
    pub medical: Option<MedicalSection>,
    pub emergency: Option<EmergencySection>,
}
