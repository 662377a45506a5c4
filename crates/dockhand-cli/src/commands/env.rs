use std::path::Path;

use dockhand_core::DeployConfig;
use dockhand_machine::MachineClient;

/// Resolve and print a machine's exported environment, one
/// `NAME=value` per line.
pub async fn env(machine: Option<&str>) -> anyhow::Result<()> {
    let machine = match machine {
        Some(machine) => machine.to_owned(),
        None => DeployConfig::load(Path::new("."))?.machine,
    };

    let client = MachineClient::new();
    let env = client.env(&machine).await?;

    let mut vars: Vec<_> = env.iter().collect();
    vars.sort();
    for (name, value) in vars {
        println!("{name}={value}");
    }

    Ok(())
}
