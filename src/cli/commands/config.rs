//! Config Command
//!
//! Show, locate, and initialize configuration files.

use crate::config::ConfigLoader;
use crate::types::Result;

pub fn show(as_json: bool) -> Result<()> {
    ConfigLoader::show_config(as_json)
}

pub fn path() {
    ConfigLoader::show_path();
}

pub fn init(force: bool) -> Result<()> {
    let path = ConfigLoader::init_project(force)?;
    println!("Created {}", path.display());
    println!("Edit it to point at your ticket source, then run: ticketlens patterns");
    Ok(())
}
