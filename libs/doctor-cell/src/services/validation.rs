use chrono::{Datelike, Local};

use shared_models::validation::ValidationErrors;

use crate::models::{
    ClinicAddress, ClinicInfo, ClinicWithAddress, CreateDoctorProfileForm, CreateDoctorProfileRequest,
    DoctorDetails, InstituteDetails, QualificationDetails,
};

const EARLIEST_COMPLETION_YEAR: i32 = 1950;

fn required(errors: &mut ValidationErrors, field: &str, value: &str, label: &str) -> String {
    let value = value.trim();
    if value.is_empty() {
        errors.add(field, format!("{} is required", label));
    }
    value.to_string()
}

fn optional(value: &str) -> Option<String> {
    let value = value.trim();
    (!value.is_empty()).then(|| value.to_string())
}

/// Checks the profile form and converts its numeric fields.
pub fn validate_profile(form: &CreateDoctorProfileForm) -> Result<CreateDoctorProfileRequest, ValidationErrors> {
    validate_profile_as_of(form, Local::now().year())
}

pub fn validate_profile_as_of(
    form: &CreateDoctorProfileForm,
    current_year: i32,
) -> Result<CreateDoctorProfileRequest, ValidationErrors> {
    let mut errors = ValidationErrors::new();

    let doctor = &form.doctor;
    let speciality = required(&mut errors, "speciality", &doctor.speciality, "Speciality");
    let experience = match doctor.experience.trim() {
        "" => {
            errors.add("experience", "Years of experience is required");
            0
        }
        text => match text.parse::<i64>() {
            Ok(years) if years >= 0 => years,
            _ => {
                errors.add("experience", "Years of experience must be a whole number of years");
                0
            }
        },
    };
    let consultation_fee = match doctor.consultation_fee.trim() {
        "" => {
            errors.add("consultation_fee", "Consultation fee is required");
            0.0
        }
        text => match text.parse::<f64>() {
            Ok(fee) if fee.is_finite() && fee >= 0.0 => fee,
            _ => {
                errors.add("consultation_fee", "Consultation fee must be a non-negative amount");
                0.0
            }
        },
    };

    let qualification = &form.qualification;
    let qualification_name = required(
        &mut errors,
        "qualification_name",
        &qualification.qualification_name,
        "Qualification name",
    );
    let course_duration = required(
        &mut errors,
        "course_duration",
        &qualification.course_duration,
        "Course duration",
    );
    let year_completed = match qualification.year_completed.trim() {
        "" => {
            errors.add("year_completed", "Year completed is required");
            0
        }
        text => match text.parse::<i32>() {
            Ok(year) if (EARLIEST_COMPLETION_YEAR..=current_year).contains(&year) => year,
            _ => {
                errors.add(
                    "year_completed",
                    format!("Year completed must be between {} and {}", EARLIEST_COMPLETION_YEAR, current_year),
                );
                0
            }
        },
    };

    let institute_name = required(&mut errors, "institute_name", &form.institute.name, "Institute name");
    let institute_type = required(&mut errors, "institute_type", &form.institute.kind, "Institute type");

    let clinic = &form.doctor_clinic_with_address;
    let clinic_name = required(&mut errors, "clinic_name", &clinic.clinic_info.clinic_name, "Clinic name");
    let clinic_phone = required(&mut errors, "clinic_phone", &clinic.clinic_info.clinic_phone, "Clinic phone");

    let address = &clinic.clinic_address;
    let street_address = required(&mut errors, "street_address", &address.street_address, "Street address");
    let city = required(&mut errors, "city", &address.city, "City");
    let state = required(&mut errors, "state", &address.state, "State");
    let country = required(&mut errors, "country", &address.country, "Country");
    let pincode = match address.pincode.trim() {
        "" => {
            errors.add("pincode", "Pincode is required");
            None
        }
        text => match text.parse::<i64>() {
            Ok(pincode) => Some(pincode),
            Err(_) => {
                errors.add("pincode", "Pincode must be numeric");
                None
            }
        },
    };

    errors.into_result()?;

    Ok(CreateDoctorProfileRequest {
        doctor: DoctorDetails {
            speciality,
            experience,
            consultation_fee,
            bio: doctor.bio.trim().to_string(),
        },
        qualification: QualificationDetails {
            qualification_name,
            course_duration,
            year_completed,
        },
        institute: InstituteDetails {
            name: institute_name,
            kind: institute_type,
        },
        doctor_clinic_with_address: ClinicWithAddress {
            clinic_info: ClinicInfo {
                clinic_name,
                clinic_phone: Some(clinic_phone),
                is_primary_location: clinic.clinic_info.is_primary_location,
                consultation_hours_notes: optional(&clinic.clinic_info.consultation_hours_notes),
            },
            clinic_address: ClinicAddress {
                street_address,
                area_name: optional(&address.area_name),
                city,
                state,
                pincode,
                country,
                address_type: address.address_type.trim().to_string(),
            },
        },
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn complete_form() -> CreateDoctorProfileForm {
        serde_json::from_value(json!({
            "doctor": {
                "speciality": "Cardiology",
                "experience": "8",
                "consultation_fee": "450.50",
                "bio": "  Heart specialist  "
            },
            "qualification": {
                "qualification_name": "MBBS",
                "course_duration": "5 years",
                "year_completed": "2012"
            },
            "institute": { "name": "State Medical College", "type": "college" },
            "doctor_clinic_with_address": {
                "clinic_info": { "clinic_name": "City Care", "clinic_phone": "+15550001111" },
                "clinic_address": {
                    "street_address": "1 Main St",
                    "city": "Springfield",
                    "state": "IL",
                    "pincode": "62701",
                    "country": "USA"
                }
            }
        }))
        .unwrap()
    }

    #[test]
    fn test_numbers_are_converted() {
        let request = validate_profile_as_of(&complete_form(), 2025).unwrap();

        assert_eq!(request.doctor.experience, 8);
        assert_eq!(request.doctor.consultation_fee, 450.5);
        assert_eq!(request.doctor.bio, "Heart specialist");
        assert_eq!(request.qualification.year_completed, 2012);
        assert_eq!(request.doctor_clinic_with_address.clinic_address.pincode, Some(62701));
        assert_eq!(request.doctor_clinic_with_address.clinic_address.area_name, None);

        let body = serde_json::to_value(&request).unwrap();
        assert_eq!(body["institute"]["type"], "college");
        assert_eq!(body["doctor_clinic_with_address"]["clinic_address"]["address_type"], "other");
    }

    #[test]
    fn test_missing_sections_are_reported_per_field() {
        let errors = validate_profile_as_of(&CreateDoctorProfileForm::default(), 2025).unwrap_err();

        for field in [
            "speciality",
            "experience",
            "consultation_fee",
            "qualification_name",
            "course_duration",
            "year_completed",
            "institute_name",
            "clinic_name",
            "clinic_phone",
            "street_address",
            "city",
            "state",
            "pincode",
            "country",
        ] {
            assert!(errors.get(field).is_some(), "expected an error for {}", field);
        }
        assert!(errors.get("institute_type").is_none());
    }

    #[test]
    fn test_bad_numbers_are_rejected() {
        let mut form = complete_form();
        form.doctor.experience = "eight".to_string();
        form.doctor.consultation_fee = "-1".to_string();
        form.qualification.year_completed = "2031".to_string();
        form.doctor_clinic_with_address.clinic_address.pincode = "62A01".to_string();

        let errors = validate_profile_as_of(&form, 2025).unwrap_err();
        assert!(errors.get("experience").is_some());
        assert!(errors.get("consultation_fee").is_some());
        assert_eq!(
            errors.get("year_completed"),
            Some("Year completed must be between 1950 and 2025")
        );
        assert_eq!(errors.get("pincode"), Some("Pincode must be numeric"));
    }
}
