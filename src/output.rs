//! Operator-facing tables and messages

use comfy_table::{presets::UTF8_FULL, CellAlignment, ContentArrangement, Table};

use crate::models::{AsaCompatibleVersion, FtdVersion};

fn new_table(headers: &[&str]) -> Table {
    let mut table = Table::new();
    table.load_preset(UTF8_FULL);
    table.set_content_arrangement(ContentArrangement::Dynamic);
    table.set_header(headers.to_vec());
    table
}

fn center_columns(table: &mut Table) {
    for column in table.column_iter_mut() {
        column.set_cell_alignment(CellAlignment::Center);
    }
}

pub fn ftd_versions_table(versions: &[FtdVersion]) -> Table {
    let mut table = new_table(&["Version", "Upgrade Package UID", "Suggested Release"]);
    for version in versions {
        table.add_row(vec![
            version.software_version.as_str(),
            version.upgrade_package_uid.as_str(),
            if version.is_suggested_version { "Yes" } else { "No" },
        ]);
    }
    center_columns(&mut table);
    table
}

pub fn asa_versions_table(versions: &[AsaCompatibleVersion]) -> Table {
    let mut table = new_table(&["Software Version", "ASDM Version"]);
    for version in versions {
        table.add_row(vec![
            version.software_version.as_deref().unwrap_or("-"),
            version.asdm_version.as_deref().unwrap_or("-"),
        ]);
    }
    center_columns(&mut table);
    table
}

pub fn print_ftd_versions(versions: &[FtdVersion]) {
    println!("Compatible FTD versions");
    println!("{}", ftd_versions_table(versions));
}

pub fn print_asa_versions(versions: &[AsaCompatibleVersion]) {
    println!("Compatible ASA versions");
    println!("{}", asa_versions_table(versions));
}

/// Masks all but the last four characters of a secret
pub fn mask_secret(secret: &str) -> String {
    let visible = 4;
    let count = secret.chars().count();
    if count <= visible {
        return "*".repeat(count);
    }
    let tail: String = secret.chars().skip(count - visible).collect();
    format!("{}{}", "*".repeat(count - visible), tail)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ftd_table_marks_suggested_release() {
        let versions = vec![
            FtdVersion {
                software_version: "7.4.1".into(),
                upgrade_package_uid: "pkg-1".into(),
                is_suggested_version: true,
            },
            FtdVersion {
                software_version: "7.2.5".into(),
                upgrade_package_uid: "pkg-2".into(),
                is_suggested_version: false,
            },
        ];
        let rendered = ftd_versions_table(&versions).to_string();
        assert!(rendered.contains("Upgrade Package UID"));
        assert!(rendered.contains("pkg-1"));
        assert!(rendered.contains("Yes"));
        assert!(rendered.contains("No"));
    }

    #[test]
    fn masks_secrets() {
        assert_eq!(mask_secret("abcdefgh"), "****efgh");
        assert_eq!(mask_secret("abc"), "***");
    }
}
