//! `ohbuild --list-platforms`

use anyhow::Result;

use ohbuild::core::platform::{ids, lookup};

pub fn execute() -> Result<()> {
    println!("{:<16} {:<14} {:<8} publish", "platform", "os", "arch");
    for id in ids() {
        let attrs = lookup(id)?;
        println!(
            "{:<16} {:<14} {:<8} {}",
            id,
            attrs.os_family,
            attrs.architecture,
            if attrs.publishable { "yes" } else { "no" }
        );
    }
    Ok(())
}
