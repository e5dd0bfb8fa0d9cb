//! `object-group add-ips`: add host IPs to a network object group on an ASA

use anyhow::Result;
use std::net::IpAddr;

use crate::cli::ObjectGroupCommand;
use crate::commands::{select_device, Session, ONLINE_ASA_QUERY};
use crate::prompt;
use crate::services::CliApiService;
use crate::validation::validate_ip;

pub const DEFAULT_OBJECT_NAME: &str = "block_network_group";

pub async fn run(session: &Session, command: &ObjectGroupCommand) -> Result<()> {
    match command {
        ObjectGroupCommand::AddIps {
            obj_name,
            device_uid,
            ips_to_add,
        } => {
            let device_uid = match device_uid {
                Some(uid) => uid.clone(),
                None => select_device(&session.inventory(), ONLINE_ASA_QUERY).await?.uid,
            };
            let obj_name = match obj_name {
                Some(name) => name.clone(),
                None => prompt::text("Enter the object name", Some(DEFAULT_OBJECT_NAME))?,
            };
            let ips = match ips_to_add {
                Some(list) => list.0.clone(),
                None => prompt_ips(&obj_name)?,
            };

            let cli = CliApiService::new(&session.client, session.poll.clone());
            let output = cli
                .execute_command_and_get_result(&[device_uid], &object_group_commands(&obj_name, &ips))
                .await?;
            if !output.trim().is_empty() {
                println!("{}", output.trim_end());
            }
            println!("Done");
        }
    }
    Ok(())
}

/// ASA configuration adding each IP as a host to the network object group
pub fn object_group_commands(obj_name: &str, ips: &[IpAddr]) -> String {
    std::iter::once(format!("object-group network {}", obj_name))
        .chain(ips.iter().map(|ip| format!(" network-object host {}", ip)))
        .collect::<Vec<_>>()
        .join("\n")
}

fn prompt_ips(obj_name: &str) -> Result<Vec<IpAddr>> {
    let message = format!(
        "Enter an IP address to add to {} (or press Enter to finish)",
        obj_name
    );
    let mut ips = Vec::new();
    loop {
        let answer = prompt::optional_text(&message)?;
        if answer.is_empty() {
            if !ips.is_empty() {
                return Ok(ips);
            }
            eprintln!("At least one IP address is required");
            continue;
        }
        match validate_ip(&answer) {
            Ok(ip) => ips.push(ip),
            Err(reason) => eprintln!("{}", reason),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builds_one_host_line_per_ip() {
        let ips: Vec<IpAddr> = vec!["10.0.0.1".parse().unwrap(), "2001:db8::1".parse().unwrap()];
        assert_eq!(
            object_group_commands("blocked", &ips),
            "object-group network blocked\n network-object host 10.0.0.1\n network-object host 2001:db8::1"
        );
    }
}
