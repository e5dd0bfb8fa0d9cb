use scc_toolkit::validation::{
    validate_ftd_csv, validate_ip, validate_ips, validate_tenant_name, validate_username,
    validate_users_csv, validate_uuid, validate_ztp_csv, CsvValidationError,
};
use std::io::Write;
use std::path::PathBuf;
use tempfile::{tempdir, NamedTempFile, TempDir};

fn csv_file(contents: &str) -> NamedTempFile {
    let mut file = NamedTempFile::new().unwrap();
    file.write_all(contents.as_bytes()).unwrap();
    file
}

#[test]
fn ftd_csv_with_valid_rows_passes() {
    let file = csv_file(
        "name,licenses,virtual,performance_tier\n\
         branch-1,BASE;THREAT,false,\n\
         branch-2,BASE,true,FTDv20\n",
    );
    validate_ftd_csv(file.path()).unwrap();
}

#[test]
fn ftd_csv_missing_a_column_is_rejected() {
    let file = csv_file("name,licenses,virtual\nbranch-1,BASE,false\n");
    match validate_ftd_csv(file.path()) {
        Err(CsvValidationError::MissingColumn { column, .. }) => {
            assert_eq!(column, "performance_tier")
        }
        other => panic!("expected missing column, got {:?}", other),
    }
}

#[test]
fn virtual_ftd_needs_a_known_performance_tier() {
    let file = csv_file(
        "name,licenses,virtual,performance_tier\n\
         branch-1,BASE,false,\n\
         branch-2,BASE,true,FTDv99\n",
    );
    match validate_ftd_csv(file.path()) {
        Err(CsvValidationError::InvalidRow { row, reason, .. }) => {
            assert_eq!(row, 2);
            assert!(reason.contains("FTDv99"), "{}", reason);
        }
        other => panic!("expected invalid row, got {:?}", other),
    }
}

#[test]
fn unknown_license_is_rejected_for_physical_ftd() {
    let file = csv_file("name,licenses,virtual,performance_tier\nbranch-1,BASE;GOLD,false,\n");
    assert!(matches!(
        validate_ftd_csv(file.path()),
        Err(CsvValidationError::InvalidRow { row: 1, .. })
    ));
}

#[test]
fn missing_file_is_reported() {
    let dir: TempDir = tempdir().unwrap();
    let path: PathBuf = dir.path().join("absent.csv");
    assert!(matches!(
        validate_ztp_csv(&path),
        Err(CsvValidationError::NotFound(p)) if p == path
    ));
}

#[test]
fn ztp_csv_checks_name_serial_and_password() {
    let valid = csv_file(
        "name,serial_number,admin_password,licenses\n\
         edge*1,JAD1234,Secret123!,BASE;MALWARE\n",
    );
    validate_ztp_csv(valid.path()).unwrap();

    let bad_name = csv_file("name,serial_number,admin_password,licenses\nedge 1,JAD1234,pw,BASE\n");
    assert!(validate_ztp_csv(bad_name.path()).is_err());

    let no_serial = csv_file("name,serial_number,admin_password,licenses\nedge1,,pw,BASE\n");
    assert!(validate_ztp_csv(no_serial.path()).is_err());

    let spaced_password =
        csv_file("name,serial_number,admin_password,licenses\nedge1,JAD1,pass word,BASE\n");
    assert!(validate_ztp_csv(spaced_password.path()).is_err());
}

#[test]
fn users_csv_matches_username_style_to_user_kind() {
    let valid = csv_file(
        "username,role,api_only_user\n\
         automation,ROLE_SUPER_ADMIN,true\n\
         jane@example.com,ROLE_READ_ONLY,false\n",
    );
    validate_users_csv(valid.path()).unwrap();

    let api_user_with_email =
        csv_file("username,role,api_only_user\nbot@example.com,ROLE_ADMIN,true\n");
    assert!(validate_users_csv(api_user_with_email.path()).is_err());

    let unknown_role = csv_file("username,role,api_only_user\njane@example.com,ROLE_OWNER,false\n");
    assert!(validate_users_csv(unknown_role.path()).is_err());
}

#[test]
fn scalar_validators() {
    assert!(validate_uuid("3fa85f64-5717-4562-b3fc-2c963f66afa6").is_ok());
    assert!(validate_uuid("3fa85f6457174562b3fc2c963f66afa6").is_err());

    assert!(validate_tenant_name("acme_corp-01").is_ok());
    assert!(validate_tenant_name("acme corp").is_err());
    assert!(validate_tenant_name(&"a".repeat(51)).is_err());

    assert!(validate_username("someone@example.com", false).is_ok());
    assert!(validate_username("someone", false).is_err());

    assert_eq!(validate_ip(" 10.1.1.1 ").unwrap().to_string(), "10.1.1.1");
    assert!(validate_ip("10.1.1.256").is_err());
    assert_eq!(validate_ips("10.0.0.1, ::1").unwrap().len(), 2);
    assert!(validate_ips("10.0.0.1,,10.0.0.2").is_err());
}
