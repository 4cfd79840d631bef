//! Command line surface

use clap::{Parser, Subcommand};
use native_fs::{CopyOptions, File, LinkType};
use std::path::PathBuf;

#[derive(Debug, Parser)]
#[command(name = "nfprobe", version, about = "Inspect and manipulate paths through the native file API")]
pub struct Cli {
    /// Configuration file (defaults to the per-user config.toml)
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Print everything known about a path
    Info { path: String },
    /// Print whether a path exists
    Exists { path: String },
    /// Create an empty file
    Touch { path: String },
    /// Create a directory
    Mkdir {
        path: String,
        /// Create missing parents too
        #[arg(short, long)]
        parents: bool,
    },
    /// Remove a file or empty directory
    Rm {
        path: String,
        /// Remove a directory tree
        #[arg(short, long)]
        recursive: bool,
    },
    /// Truncate or extend a file
    Truncate { path: String, size: u64 },
    /// Copy a file
    Cp {
        path: String,
        dest: String,
        /// Fail if the destination exists
        #[arg(short = 'n', long)]
        no_clobber: bool,
    },
    /// Move or rename a file
    Mv {
        path: String,
        dest: String,
        #[arg(short = 'n', long)]
        no_clobber: bool,
    },
    /// Create a link at DEST pointing to PATH
    Ln {
        path: String,
        dest: String,
        #[arg(short, long)]
        symbolic: bool,
    },
    /// Print volume space for the volume holding a path
    Space { path: String },
}

fn copy_options(no_clobber: bool) -> CopyOptions {
    if no_clobber {
        CopyOptions::fail_on_overwrite()
    } else {
        CopyOptions::replace()
    }
}

fn yes_no(flag: bool) -> &'static str {
    if flag {
        "yes"
    } else {
        "no"
    }
}

fn info(file: &File) -> native_fs::Result<Vec<String>> {
    if !file.exists()? {
        return Ok(vec![format!("{}: does not exist", file)]);
    }

    let kind = if file.is_device()? {
        "device"
    } else if file.is_directory()? {
        "directory"
    } else {
        "file"
    };

    let mut lines = vec![
        format!("path:       {}", file),
        format!("native:     {}", file.native().display()),
        format!("type:       {}", kind),
        format!("link:       {}", yes_no(file.is_link()?)),
        format!("hidden:     {}", yes_no(file.is_hidden()?)),
        format!("readable:   {}", yes_no(file.can_read()?)),
        format!("writeable:  {}", yes_no(file.can_write()?)),
        format!("executable: {}", yes_no(file.can_execute()?)),
        format!("size:       {}", file.size()?),
        format!("modified:   {}", file.last_modified()?.to_rfc3339()),
    ];

    match file.created() {
        Ok(created) => lines.push(format!("created:    {}", created.to_rfc3339())),
        Err(e) => tracing::debug!("Creation time unavailable: {}", e),
    }
    Ok(lines)
}

/// Run one command, returning the lines to print
pub fn execute(command: &Command) -> anyhow::Result<Vec<String>> {
    let lines = match command {
        Command::Info { path } => info(&File::new(path))?,
        Command::Exists { path } => vec![File::new(path).exists()?.to_string()],
        Command::Touch { path } => {
            let created = File::new(path).create_file()?;
            vec![if created { "created" } else { "already exists" }.to_string()]
        }
        Command::Mkdir { path, parents } => {
            let dir = File::new(path);
            let created = if *parents {
                dir.create_directories()?
            } else {
                dir.create_directory()?
            };
            vec![if created { "created" } else { "already exists" }.to_string()]
        }
        Command::Rm { path, recursive } => {
            let file = File::new(path);
            if *recursive {
                file.remove_recursive()?;
            } else {
                file.remove()?;
            }
            vec![format!("removed {}", file)]
        }
        Command::Truncate { path, size } => {
            let file = File::new(path);
            file.set_size(*size)?;
            vec![format!("{}: {} bytes", file, file.size()?)]
        }
        Command::Cp { path, dest, no_clobber } => {
            File::new(path).copy_to(dest, copy_options(*no_clobber))?;
            vec![format!("{} -> {}", path, dest)]
        }
        Command::Mv { path, dest, no_clobber } => {
            let mut file = File::new(path);
            file.rename_to(dest, copy_options(*no_clobber))?;
            vec![format!("{} -> {}", path, file)]
        }
        Command::Ln { path, dest, symbolic } => {
            let link_type = if *symbolic {
                LinkType::Symbolic
            } else {
                LinkType::Hard
            };
            File::new(path).link_to(dest, link_type)?;
            vec![format!("{} -> {}", dest, path)]
        }
        Command::Space { path } => {
            let file = File::new(path);
            vec![
                format!("total:  {}", file.total_space()?),
                format!("usable: {}", file.usable_space()?),
                format!("free:   {}", file.free_space()?),
            ]
        }
    };
    Ok(lines)
}
