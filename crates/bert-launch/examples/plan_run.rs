//! Print the train and test command lines for a dataset without running them.
//!
//! ```bash
//! cargo run -p bert-launch --example plan_run -- workplace/data-bin/dialogre
//! ```

use bert_launch::{LaunchConfig, Launcher, Mode, RunInventory};

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let databin = std::env::args()
        .nth(1)
        .unwrap_or_else(|| "workplace/data-bin/dialogre".to_string());

    let launcher = Launcher::new(LaunchConfig::from_env()?);
    println!("Run directory: {}", launcher.config().output_dir().display());
    println!();

    for mode in Mode::ALL {
        let invocation = launcher.plan_mode(&databin, mode);
        println!("[{mode}]");
        println!("  {}", invocation.render());

        let inventory = RunInventory::collect(&invocation);
        for finding in inventory.findings(&invocation) {
            println!("  ! {finding}");
        }
        println!();
    }

    Ok(())
}
