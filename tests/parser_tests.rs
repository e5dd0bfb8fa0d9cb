use scc_toolkit::models::{License, PerformanceTier, UserRole, CDFMC_MANAGED_FTD};
use scc_toolkit::parsers::{FtdParser, FtdZtpParser, UsersParser};
use std::io::Write;
use tempfile::NamedTempFile;

const POLICY_UID: &str = "5a2f4c3e-8a41-4b59-9d4e-0c1f0d9b7e21";

fn csv_file(contents: &str) -> NamedTempFile {
    let mut file = NamedTempFile::new().unwrap();
    file.write_all(contents.as_bytes()).unwrap();
    file
}

#[test]
fn ftd_rows_become_create_inputs() {
    let file = csv_file(
        "name,licenses,virtual,performance_tier\n\
         branch-1,BASE;THREAT,false,FTDv50\n\
         cloud-1,BASE,TRUE,FTDv10\n",
    );
    let inputs = FtdParser::new(POLICY_UID)
        .get_ftds_to_onboard(Some(file.path()))
        .unwrap();

    assert_eq!(inputs.len(), 2);
    assert_eq!(inputs[0].name, "branch-1");
    assert_eq!(inputs[0].device_type, CDFMC_MANAGED_FTD);
    assert_eq!(inputs[0].fmc_access_policy_uid, POLICY_UID);
    assert_eq!(inputs[0].licenses, vec![License::Base, License::Threat]);
    assert!(!inputs[0].is_virtual);
    // tier only applies to virtual devices
    assert_eq!(inputs[0].performance_tier, None);

    assert!(inputs[1].is_virtual);
    assert_eq!(inputs[1].performance_tier, Some(PerformanceTier::FtdV10));
}

#[test]
fn ztp_rows_carry_serial_and_password() {
    let file = csv_file(
        "name,serial_number,admin_password,licenses\n\
         edge-1,JAD0001,Secret1!,BASE;URLFilter\n",
    );
    let inputs = FtdZtpParser::new(POLICY_UID)
        .get_ztp_onboarding_inputs(Some(file.path()))
        .unwrap();

    assert_eq!(inputs.len(), 1);
    assert_eq!(inputs[0].serial_number, "JAD0001");
    assert_eq!(inputs[0].admin_password.as_deref(), Some("Secret1!"));
    assert_eq!(inputs[0].licenses, vec![License::Base, License::UrlFilter]);
}

#[test]
fn user_rows_become_user_inputs() {
    let file = csv_file(
        "username,role,api_only_user\n\
         automation,ROLE_SUPER_ADMIN,true\n\
         ops@example.com,ROLE_DEPLOY_ONLY,\n",
    );
    let users = UsersParser::get_users(Some(file.path())).unwrap();

    assert_eq!(users.len(), 2);
    assert_eq!(users[0].role, UserRole::RoleSuperAdmin);
    assert!(users[0].api_only_user);
    assert_eq!(users[1].username, "ops@example.com");
    assert!(!users[1].api_only_user);
}

#[test]
fn invalid_row_reports_its_position() {
    let file = csv_file(
        "username,role,api_only_user\n\
         automation,ROLE_ADMIN,true\n\
         automation2,ROLE_ADMIN,maybe\n",
    );
    let err = UsersParser::parse_csv(file.path()).unwrap_err();
    assert!(err.to_string().contains("row 2"), "{}", err);
}
