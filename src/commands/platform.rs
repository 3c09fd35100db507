use anyhow::Result;

use crate::host::HostContext;

/// Print the detected host platform
pub fn platform(host: &HostContext) -> Result<()> {
    println!("{}", host.platform);
    if !host.platform.is_supported() {
        println!("This platform has no managed runtimes.");
    }
    Ok(())
}
