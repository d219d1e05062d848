use chrono::Utc;
use std::fmt::Debug;
use training_admin::{
    ServiceError,
    models::{
        AprendizProcessInstructorDto, Audit, CenterDto, Dto, EnterpriseDto, Entity,
        FormPermissionsDto, PersonDto, Sede, SedeDto, SetActiveDto, StateDto, User, UserDto, Value,
    },
};
use validator::Validate;

// --- Test Utilities ---

fn round_trip<D: Dto + PartialEq + Debug>(dto: D) {
    let back = D::from_entity(dto.clone().into_entity());
    assert_eq!(back, dto);
}

fn stamped_audit() -> Audit {
    Audit {
        active: false,
        create_date: Some(Utc::now()),
        update_date: Some(Utc::now()),
        delete_date: Some(Utc::now()),
    }
}

fn first_invalid_field<T: Validate>(value: &T) -> String {
    let err: ServiceError = value.validate().unwrap_err().into();
    match err {
        ServiceError::Validation { field, .. } => field,
        other => panic!("expected a validation error, got {:?}", other),
    }
}

// --- Mapping ---

#[test]
fn test_mapping_keeps_every_field() {
    round_trip(PersonDto {
        id: 4,
        first_name: "Ana".to_string(),
        last_name: "Ruiz".to_string(),
        document_type: "CC".to_string(),
        document_number: "1001".to_string(),
        email: "ana@example.com".to_string(),
        phone: Some("555-0100".to_string()),
        audit: stamped_audit(),
    });
    round_trip(UserDto {
        id: 2,
        username: "ana".to_string(),
        email: "ana@example.com".to_string(),
        password: "$argon2id$v=19$hash".to_string(),
        person_id: 4,
        audit: stamped_audit(),
    });
    round_trip(CenterDto {
        id: 1,
        name: "North".to_string(),
        address: "123 St".to_string(),
        code_center: Some("C-1".to_string()),
        regional_id: Some(3),
        audit: stamped_audit(),
    });
    round_trip(StateDto {
        id: 8,
        type_state: "Finalizado".to_string(),
        description: None,
        audit: Audit::default(),
    });
    round_trip(AprendizProcessInstructorDto {
        id: 10,
        aprendiz_id: 1,
        instructor_id: 2,
        process_id: 3,
        enterprise_id: 4,
        type_modality_id: 5,
        state_id: 6,
        verification_id: 7,
        registery_sofia_id: 8,
        concept_id: 9,
        audit: stamped_audit(),
    });
}

#[test]
fn test_entity_columns_follow_table_layout() {
    let sede = SedeDto {
        name: "Sede Norte".to_string(),
        code_sede: "SN".to_string(),
        address: "Calle 10".to_string(),
        center_id: 2,
        ..SedeDto::default()
    }
    .into_entity();

    let columns = sede.columns();
    let names: Vec<_> = columns.iter().map(|(name, _)| *name).collect();

    assert_eq!(
        names,
        vec!["name", "code_sede", "address", "phone", "email_contact", "center_id"]
    );
    assert_eq!(columns[3].1, Value::Text(None));
    assert_eq!(columns[5].1, Value::Int(Some(2)));
    assert_eq!(Sede::TABLE, "sede");
    assert_eq!(User::TABLE, "app_user");
    assert_eq!(User::NAME, "User");
}

// --- Deserialization ---

#[test]
fn test_audit_fields_are_optional_on_input() {
    let dto: CenterDto =
        serde_json::from_str(r#"{ "name": "North", "address": "123 St" }"#).unwrap();

    assert_eq!(dto.id, 0);
    assert!(dto.audit.active);
    assert!(dto.audit.create_date.is_none());
    assert!(dto.audit.delete_date.is_none());
}

#[test]
fn test_audit_is_flattened_into_the_payload() {
    let json = serde_json::to_value(StateDto {
        id: 1,
        type_state: "Activo".to_string(),
        description: None,
        audit: Audit::default(),
    })
    .unwrap();

    assert_eq!(json["active"], true);
    assert!(json.get("audit").is_none());
}

// --- Validation Rules ---

#[test]
fn test_required_strings_reject_whitespace() {
    let dto = PersonDto {
        first_name: "  ".to_string(),
        last_name: "Ruiz".to_string(),
        document_type: "CC".to_string(),
        document_number: "1001".to_string(),
        email: "ana@example.com".to_string(),
        ..PersonDto::default()
    };

    assert_eq!(first_invalid_field(&dto), "first_name");
}

#[test]
fn test_email_fields_are_checked() {
    let dto = EnterpriseDto {
        name: "Acme".to_string(),
        nit: "900.123".to_string(),
        locate: "Bogota".to_string(),
        email: Some("not-an-email".to_string()),
        ..EnterpriseDto::default()
    };

    assert_eq!(first_invalid_field(&dto), "email");
}

#[test]
fn test_foreign_keys_must_be_positive() {
    let optional_fk = CenterDto {
        name: "North".to_string(),
        address: "123 St".to_string(),
        regional_id: Some(0),
        ..CenterDto::default()
    };
    assert_eq!(first_invalid_field(&optional_fk), "regional_id");

    let without_fk = CenterDto {
        regional_id: None,
        ..optional_fk
    };
    assert!(without_fk.validate().is_ok());

    let fact = AprendizProcessInstructorDto {
        aprendiz_id: 1,
        instructor_id: 1,
        process_id: 1,
        enterprise_id: 1,
        type_modality_id: 1,
        state_id: 1,
        verification_id: 1,
        registery_sofia_id: 1,
        concept_id: 0,
        ..AprendizProcessInstructorDto::default()
    };
    assert_eq!(first_invalid_field(&fact), "concept_id");
}

#[test]
fn test_set_active_and_assignment_payloads() {
    assert_eq!(
        first_invalid_field(&SetActiveDto {
            id: 0,
            active: false
        }),
        "id"
    );
    assert_eq!(
        first_invalid_field(&FormPermissionsDto {
            form_id: 1,
            permission_ids: vec![],
        }),
        "permission_ids"
    );
}
